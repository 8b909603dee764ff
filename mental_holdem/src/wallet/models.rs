//! Wallet data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::primitives::{Address, Chips};

/// Wallet entry model (double-entry ledger). Every movement between a
/// wallet and the table escrow is recorded once from the wallet's side.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WalletEntry {
    pub id: u64,
    pub account: Address,
    pub amount: Chips,
    pub balance_after: Chips,
    pub direction: EntryDirection,
    pub entry_type: EntryType,
    pub created_at: DateTime<Utc>,
}

/// Entry direction, from the wallet's point of view
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Debit,
    Credit,
}

impl fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryDirection::Debit => write!(f, "debit"),
            EntryDirection::Credit => write!(f, "credit"),
        }
    }
}

/// Entry type
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Deposit,
    TableFee,
    Blind,
    Bet,
    Refund,
    Payout,
    Commission,
    Forfeit,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryType::Deposit => write!(f, "deposit"),
            EntryType::TableFee => write!(f, "table_fee"),
            EntryType::Blind => write!(f, "blind"),
            EntryType::Bet => write!(f, "bet"),
            EntryType::Refund => write!(f, "refund"),
            EntryType::Payout => write!(f, "payout"),
            EntryType::Commission => write!(f, "commission"),
            EntryType::Forfeit => write!(f, "forfeit"),
        }
    }
}
