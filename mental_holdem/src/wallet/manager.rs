//! In-memory treasury with escrow and a double-entry ledger.

use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;

use super::{
    errors::{WalletError, WalletResult},
    models::{EntryDirection, EntryType, WalletEntry},
};
use crate::primitives::{Address, Chips};

/// Chip custody for one table.
///
/// Chips are only ever moved between a wallet and the escrow, so the sum of
/// all wallets plus the escrow never changes except through deposits.
#[derive(Clone, Debug)]
pub struct Treasury {
    wallets: HashMap<Address, Chips>,
    escrow: Chips,
    house: Address,
    entries: Vec<WalletEntry>,
}

impl Treasury {
    /// Create a new treasury
    ///
    /// # Arguments
    ///
    /// * `house` - Account receiving commission and forfeits
    pub fn new(house: Address) -> Self {
        Self {
            wallets: HashMap::new(),
            escrow: 0,
            house,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn house(&self) -> &Address {
        &self.house
    }

    /// Balance of `account`, zero for unknown accounts.
    #[must_use]
    pub fn balance(&self, account: &Address) -> Chips {
        self.wallets.get(account).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn house_balance(&self) -> Chips {
        self.balance(&self.house)
    }

    #[must_use]
    pub fn escrow_balance(&self) -> Chips {
        self.escrow
    }

    /// Total chips held by wallets and the escrow.
    #[must_use]
    pub fn total_supply(&self) -> Chips {
        self.wallets.values().sum::<Chips>() + self.escrow
    }

    /// Credit `amount` new chips to `account`
    ///
    /// # Returns
    ///
    /// * `WalletResult<Chips>` - New wallet balance or error
    pub fn deposit(
        &mut self,
        account: &Address,
        amount: Chips,
        now: DateTime<Utc>,
    ) -> WalletResult<Chips> {
        ensure_positive(amount)?;
        let balance = self.credit(account, amount)?;
        self.record(account, amount, balance, EntryDirection::Credit, EntryType::Deposit, now);
        Ok(balance)
    }

    /// Transfer chips from a wallet into the table escrow
    ///
    /// # Arguments
    ///
    /// * `account` - Paying account
    /// * `amount` - Amount to transfer
    /// * `entry_type` - What the payment is for
    /// * `now` - Entry timestamp
    ///
    /// # Returns
    ///
    /// * `WalletResult<Chips>` - New wallet balance or error
    ///
    /// # Errors
    ///
    /// * `WalletError::InvalidAmount` - Zero amount
    /// * `WalletError::WalletNotFound` - Account never funded
    /// * `WalletError::InsufficientBalance` - Not enough chips
    pub fn transfer_to_escrow(
        &mut self,
        account: &Address,
        amount: Chips,
        entry_type: EntryType,
        now: DateTime<Utc>,
    ) -> WalletResult<Chips> {
        ensure_positive(amount)?;
        let wallet = self
            .wallets
            .get_mut(account)
            .ok_or_else(|| WalletError::WalletNotFound(account.clone()))?;
        if *wallet < amount {
            return Err(WalletError::InsufficientBalance {
                available: *wallet,
                required: amount,
            });
        }
        *wallet -= amount;
        let balance = *wallet;
        self.escrow += amount;

        debug!("{account} paid {amount} into escrow ({entry_type})");
        self.record(account, amount, balance, EntryDirection::Debit, entry_type, now);
        Ok(balance)
    }

    /// Transfer chips from the table escrow to a wallet
    ///
    /// # Errors
    ///
    /// * `WalletError::InvalidAmount` - Zero amount
    /// * `WalletError::InsufficientEscrow` - Escrow cannot cover the amount
    pub fn transfer_from_escrow(
        &mut self,
        account: &Address,
        amount: Chips,
        entry_type: EntryType,
        now: DateTime<Utc>,
    ) -> WalletResult<Chips> {
        ensure_positive(amount)?;
        if self.escrow < amount {
            return Err(WalletError::InsufficientEscrow {
                available: self.escrow,
                required: amount,
            });
        }
        let balance = self.credit(account, amount)?;
        self.escrow -= amount;

        debug!("{account} received {amount} from escrow ({entry_type})");
        self.record(account, amount, balance, EntryDirection::Credit, entry_type, now);
        Ok(balance)
    }

    /// Move chips from escrow to the house account. Zero is a no-op.
    pub fn pay_house(
        &mut self,
        amount: Chips,
        entry_type: EntryType,
        now: DateTime<Utc>,
    ) -> WalletResult<Chips> {
        if amount == 0 {
            return Ok(self.house_balance());
        }
        let house = self.house.clone();
        self.transfer_from_escrow(&house, amount, entry_type, now)
    }

    /// All ledger entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[WalletEntry] {
        &self.entries
    }

    /// Ledger entries for one account, oldest first.
    pub fn entries_for<'a>(&'a self, account: &'a Address) -> impl Iterator<Item = &'a WalletEntry> {
        self.entries.iter().filter(move |entry| &entry.account == account)
    }

    fn credit(&mut self, account: &Address, amount: Chips) -> WalletResult<Chips> {
        let wallet = self.wallets.entry(account.clone()).or_insert(0);
        *wallet = wallet
            .checked_add(amount)
            .ok_or_else(|| WalletError::Overflow(account.clone()))?;
        Ok(*wallet)
    }

    fn record(
        &mut self,
        account: &Address,
        amount: Chips,
        balance_after: Chips,
        direction: EntryDirection,
        entry_type: EntryType,
        created_at: DateTime<Utc>,
    ) {
        let id = self.entries.len() as u64 + 1;
        self.entries.push(WalletEntry {
            id,
            account: account.clone(),
            amount,
            balance_after,
            direction,
            entry_type,
            created_at,
        });
    }
}

fn ensure_positive(amount: Chips) -> WalletResult<()> {
    if amount == 0 {
        Err(WalletError::InvalidAmount(amount))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(accounts: &[(&str, Chips)]) -> Treasury {
        let mut treasury = Treasury::new(Address::new("house"));
        for (account, amount) in accounts {
            treasury
                .deposit(&Address::new(account), *amount, Utc::now())
                .unwrap();
        }
        treasury
    }

    #[test]
    fn test_escrow_round_trip_conserves_chips() {
        let mut treasury = funded(&[("alice", 100), ("bob", 50)]);
        let alice = Address::new("alice");
        let bob = Address::new("bob");

        assert_eq!(
            treasury.transfer_to_escrow(&alice, 30, EntryType::Bet, Utc::now()),
            Ok(70)
        );
        assert_eq!(
            treasury.transfer_to_escrow(&bob, 30, EntryType::Bet, Utc::now()),
            Ok(20)
        );
        assert_eq!(treasury.escrow_balance(), 60);

        treasury
            .transfer_from_escrow(&bob, 55, EntryType::Payout, Utc::now())
            .unwrap();
        treasury.pay_house(5, EntryType::Commission, Utc::now()).unwrap();

        assert_eq!(treasury.escrow_balance(), 0);
        assert_eq!(treasury.balance(&bob), 75);
        assert_eq!(treasury.house_balance(), 5);
        assert_eq!(treasury.total_supply(), 150);
    }

    #[test]
    fn test_insufficient_funds() {
        let mut treasury = funded(&[("alice", 10)]);
        let alice = Address::new("alice");
        assert_eq!(
            treasury.transfer_to_escrow(&alice, 11, EntryType::TableFee, Utc::now()),
            Err(WalletError::InsufficientBalance {
                available: 10,
                required: 11
            })
        );
        assert_eq!(
            treasury.transfer_to_escrow(&Address::new("ghost"), 1, EntryType::TableFee, Utc::now()),
            Err(WalletError::WalletNotFound(Address::new("ghost")))
        );
        assert_eq!(
            treasury.transfer_from_escrow(&alice, 1, EntryType::Refund, Utc::now()),
            Err(WalletError::InsufficientEscrow {
                available: 0,
                required: 1
            })
        );
        assert_eq!(
            treasury.transfer_to_escrow(&alice, 0, EntryType::Bet, Utc::now()),
            Err(WalletError::InvalidAmount(0))
        );
    }

    #[test]
    fn test_ledger_records_every_movement() {
        let mut treasury = funded(&[("alice", 100)]);
        let alice = Address::new("alice");
        treasury
            .transfer_to_escrow(&alice, 10, EntryType::TableFee, Utc::now())
            .unwrap();
        treasury
            .transfer_from_escrow(&alice, 10, EntryType::Refund, Utc::now())
            .unwrap();

        let kinds: Vec<(EntryDirection, EntryType)> = treasury
            .entries_for(&alice)
            .map(|e| (e.direction, e.entry_type))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (EntryDirection::Credit, EntryType::Deposit),
                (EntryDirection::Debit, EntryType::TableFee),
                (EntryDirection::Credit, EntryType::Refund),
            ]
        );
        assert_eq!(treasury.entries().last().unwrap().balance_after, 100);
        assert_eq!(treasury.entries().last().unwrap().id, 3);
    }
}
