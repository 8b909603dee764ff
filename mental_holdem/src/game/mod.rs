//! Texas Hold'em round controller.
//!
//! This module provides the betting game built on the card engine:
//! - Phase sequencing from joining to payout
//! - Turn order, deadlines and purging of stalled players
//! - Pot and table fee accounting through the treasury
//! - Public views of a running round

pub mod clock;
pub mod entities;
pub mod errors;
pub mod round;
pub mod winner;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entities::{Phase, RoundState, RoundView, SeatIndex, SeatView};
pub use errors::{RoundError, RoundResult};
pub use round::{ROUND_ADDRESS, TexasHoldemRound};
pub use winner::{NoWinner, ShowdownView, ShownHand, WinnerDecider};
