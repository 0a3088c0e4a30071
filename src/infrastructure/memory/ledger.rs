//! In-memory token ledger
//!
//! Balances and allowances for every token live in one map, keyed by token
//! and account. Stands in for the per-token ledgers a live deployment talks
//! to; the trait surface is what the executor sees, the inherent methods are
//! what tests and the in-memory venue use for setup and settlement.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::venue::TokenLedger;
use crate::shared::errors::VenueError;
use crate::shared::types::Address;

#[derive(Default)]
struct LedgerState {
    /// (token, account) -> balance
    balances: HashMap<(Address, Address), u128>,
    /// (token, owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address, Address), u128>,
}

#[derive(Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self, token: Address, account: Address, amount: u128) {
        let mut state = self.state.write().unwrap();
        *state.balances.entry((token, account)).or_insert(0) += amount;
    }

    pub fn balance_of(&self, token: Address, account: Address) -> u128 {
        self.state
            .read()
            .unwrap()
            .balances
            .get(&(token, account))
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> u128 {
        self.state
            .read()
            .unwrap()
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or(0)
    }

    /// Balance-checked move; `false` when `from` cannot cover `amount`
    pub fn transfer(&self, token: Address, from: Address, to: Address, amount: u128) -> bool {
        let mut state = self.state.write().unwrap();
        let from_balance = state.balances.get(&(token, from)).copied().unwrap_or(0);
        if from_balance < amount {
            return false;
        }
        state.balances.insert((token, from), from_balance - amount);
        *state.balances.entry((token, to)).or_insert(0) += amount;
        true
    }

    /// Consume part of an owner's allowance toward `spender`; `false` when
    /// the remaining allowance does not cover `amount`
    pub fn debit_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> bool {
        let mut state = self.state.write().unwrap();
        let key = (token, owner, spender);
        let remaining = state.allowances.get(&key).copied().unwrap_or(0);
        if remaining < amount {
            return false;
        }
        state.allowances.insert(key, remaining - amount);
        true
    }
}

#[async_trait]
impl TokenLedger for InMemoryLedger {
    async fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<bool, VenueError> {
        Ok(self.transfer(token, from, to, amount))
    }

    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<bool, VenueError> {
        let mut state = self.state.write().unwrap();
        state.allowances.insert((token, owner, spender), amount);
        Ok(true)
    }
}
