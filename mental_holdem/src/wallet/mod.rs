//! Wallet module providing chip custody for a single table.
//!
//! This module implements:
//! - Player wallets funded by deposits
//! - A table escrow holding table fees and the pot while a game runs
//! - A house account receiving commission and forfeited chips
//! - A double-entry ledger recording every movement
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use mental_holdem::wallet::{EntryType, Treasury};
//!
//! let mut treasury = Treasury::new("house".into());
//! treasury.deposit(&"alice".into(), 100, Utc::now()).unwrap();
//!
//! // Pay the table fee into escrow
//! let balance = treasury
//!     .transfer_to_escrow(&"alice".into(), 10, EntryType::TableFee, Utc::now())
//!     .unwrap();
//! assert_eq!(balance, 90);
//! assert_eq!(treasury.escrow_balance(), 10);
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{WalletError, WalletResult};
pub use manager::Treasury;
pub use models::{EntryDirection, EntryType, WalletEntry};
