//! # Mental Hold'em
//!
//! Texas Hold'em played without a trusted dealer, on top of a verifiable
//! mental poker card engine.
//!
//! Players jointly own the deck: each one contributes a public key, every
//! player re-masks and permutes the deck in turn, and a card only opens once
//! every player has handed over a reveal token for it. The engine checks
//! every step against a pluggable [`MentalPokerVerifier`]; the round
//! controller sequences a hand of Hold'em over it and keeps the chips.
//!
//! ## Core Modules
//!
//! - [`engine`]: Masked deck, shuffles, reveal tokens and one-time draws
//! - [`game`]: Round phases, betting, timeouts and payout
//! - [`wallet`]: Player wallets, table escrow and the house account
//! - [`config`]: Stakes, timing and environment configuration
//! - [`events`]: Notifications for external observers
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use mental_holdem::{
//!     InsecureVerifier, MockPlayer, Phase, RoundConfig, SystemClock, TexasHoldemRound,
//! };
//!
//! let config = RoundConfig { num_players: 2, ..RoundConfig::default() };
//! let mut round = TexasHoldemRound::new(
//!     "admin".into(),
//!     config,
//!     Arc::new(InsecureVerifier),
//!     b"params".to_vec(),
//!     Arc::new(SystemClock),
//! )
//! .unwrap();
//!
//! for name in ["alice", "bob"] {
//!     let player = MockPlayer::new(name);
//!     round.deposit(&player.address(), 100).unwrap();
//!     round
//!         .join_game(
//!             &player.address(),
//!             10,
//!             player.public_key().clone(),
//!             player.memo().clone(),
//!             &player.key_proof(b"params"),
//!         )
//!         .unwrap();
//! }
//! assert_eq!(round.phase(), Phase::PickButton);
//! ```

pub mod config;
pub mod engine;
pub mod events;
pub mod game;
pub mod primitives;
pub mod wallet;

pub use config::{ConfigError, RoundConfig};
pub use engine::{
    EngineError, GameInstance, InsecureVerifier, MentalPokerVerifier, MockPlayer,
    OneTimeDrawInstance, PlayingCard, VerifierError,
};
pub use events::GameEvent;
pub use game::{
    Clock, ManualClock, Phase, RoundError, RoundView, SystemClock, TexasHoldemRound,
    WinnerDecider,
};
pub use primitives::{Address, Bytes, CardHash, Chips};
pub use wallet::{Treasury, WalletError};
