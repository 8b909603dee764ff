//! Verifiable mental poker card engine.
//!
//! A [`GameInstance`] holds the masked deck and the bookkeeping around it:
//! who joined, who shuffled, which reveal tokens were handed over and which
//! cards are open. Every cryptographic check is delegated to a
//! [`MentalPokerVerifier`]. [`OneTimeDrawInstance`] layers the
//! draw/fold/show-hand flows used by the Hold'em round on top.

pub mod errors;
pub mod instance;
pub mod mock;
pub mod models;
pub mod one_time_draw;
pub mod verifier;

pub use errors::{EngineError, EngineResult};
pub use instance::GameInstance;
pub use mock::{InsecureVerifier, MockPlayer};
pub use models::{Card, PlayerRecord, PlayingCard, RevealContribution};
pub use one_time_draw::OneTimeDrawInstance;
pub use verifier::{MentalPokerVerifier, VerifierError};
