//! Wallet error types.

use thiserror::Error;

use crate::primitives::{Address, Chips};

/// Wallet errors
#[derive(Debug, Error, Eq, PartialEq)]
pub enum WalletError {
    /// Insufficient balance
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Chips, required: Chips },

    /// Escrow cannot cover a payout
    #[error("Insufficient escrow: available {available}, required {required}")]
    InsufficientEscrow { available: Chips, required: Chips },

    /// Wallet not found
    #[error("Wallet not found for {0}")]
    WalletNotFound(Address),

    /// Invalid amount (must be positive)
    #[error("Invalid amount: {0}")]
    InvalidAmount(Chips),

    /// Arithmetic overflow on a balance
    #[error("Balance overflow for {0}")]
    Overflow(Address),
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
