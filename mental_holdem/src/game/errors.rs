//! Round controller error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::entities::Phase;
use crate::{
    config::ConfigError,
    engine::EngineError,
    primitives::{Address, Chips},
    wallet::WalletError,
};

/// Errors raised by the round controller. Every error aborts the action and
/// rolls back everything it did.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RoundError {
    #[error("{0} is not allowed to do that")]
    Unauthorized(Address),
    #[error("action not allowed while {0}")]
    InvalidPhase(Phase),
    #[error("not {0}'s turn")]
    OutOfTurnAction(Address),
    #[error("{0} is not seated")]
    NotAPlayer(Address),
    #[error("{0} is out of the hand")]
    PlayerDone(Address),
    #[error("payment mismatch: expected ${expected}, got ${got}")]
    PaymentMismatch { expected: Chips, got: Chips },
    #[error("raise to ${got} is below the minimum of ${minimum}")]
    InvalidRaise { minimum: Chips, got: Chips },
    #[error("can't check with ${bet} against ${to_match}")]
    CannotCheck { to_match: Chips, bet: Chips },
    #[error("deadline {0} has not passed yet")]
    DeadlineNotReached(DateTime<Utc>),
    #[error("engine is controlled by {0}")]
    ForeignEngine(Address),
    #[error("engine seats {got} players, table needs {expected}")]
    EngineSize { expected: usize, got: usize },
    #[error("engine already has {0} players joined")]
    EngineInUse(usize),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Result type for round controller actions
pub type RoundResult<T> = Result<T, RoundError>;
