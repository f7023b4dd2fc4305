//! Native-currency balances in base units (wei).

use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::error::MarketError;

/// Account balances held by the execution environment.
///
/// All arithmetic is checked; a failed transfer leaves both sides unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    accounts: HashMap<Address, U256>,
}

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account`, zero if never credited.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.accounts.get(&account).copied().unwrap_or(U256::ZERO)
    }

    /// Add `amount` to `account` (genesis funding and incoming transfers).
    pub fn credit(&mut self, account: Address, amount: U256) -> Result<(), MarketError> {
        let current = self.balance_of(account);
        let updated = current
            .checked_add(amount)
            .ok_or(MarketError::BalanceOverflow(account))?;
        self.accounts.insert(account, updated);
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), MarketError> {
        if amount.is_zero() || from == to {
            return Ok(());
        }
        let available = self.balance_of(from);
        let from_after = available
            .checked_sub(amount)
            .ok_or(MarketError::InsufficientBalance {
                account: from,
                available,
                required: amount,
            })?;
        let to_after = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(MarketError::BalanceOverflow(to))?;
        self.accounts.insert(from, from_after);
        self.accounts.insert(to, to_after);
        Ok(())
    }

    /// Sum of all balances.
    pub fn total_supply(&self) -> U256 {
        self.accounts
            .values()
            .fold(U256::ZERO, |acc, b| acc.saturating_add(*b))
    }
}
