//! Collaborator interfaces
//!
//! The aggregator never owns pools, routers or token balances. Everything it
//! touches on the outside lives behind these traits, so the core can be
//! exercised against the in-memory environment exactly as it would run
//! against live venues.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::pricing;
use crate::shared::errors::VenueError;
use crate::shared::types::{Address, PoolReserves};

/// An external swap venue ("router") over one family of pools
#[async_trait]
pub trait VenueRouter: Send + Sync {
    fn address(&self) -> Address;

    /// The factory backing this venue's pools
    async fn factory(&self) -> Result<Arc<dyn PoolFactory>, VenueError>;

    /// Venue price formula. The default is the standard 0.3% constant-product
    /// rule; venues with a different fee schedule override this.
    async fn quote_out(
        &self,
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<u128, VenueError> {
        pricing::amount_out(amount_in, reserve_in, reserve_out)
            .map_err(|e| VenueError::Call(e.to_string()))
    }

    /// Execute a multi-hop swap along `path`, delivering at least
    /// `amount_out_min` of the final token to `recipient` before `deadline`
    /// (unix seconds), or fail without moving anything.
    ///
    /// Returns the realized amount at every hop boundary, starting with the
    /// input amount.
    async fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
        recipient: Address,
        deadline: i64,
    ) -> Result<Vec<u128>, VenueError>;
}

/// Per-venue registry mapping a token pair to its pool
#[async_trait]
pub trait PoolFactory: Send + Sync {
    fn address(&self) -> Address;

    /// Pool for an unordered token pair, `None` if the venue has none
    async fn pool(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<Arc<dyn LiquidityPool>>, VenueError>;
}

/// A single constant-product pool
#[async_trait]
pub trait LiquidityPool: Send + Sync {
    /// First token in the pool's fixed reserve ordering
    fn token0(&self) -> Address;

    fn token1(&self) -> Address;

    async fn reserves(&self) -> Result<PoolReserves, VenueError>;
}

/// Token custody operations the executor issues
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Move `amount` of `token` from `from` to `to`. `Ok(false)` means the
    /// ledger rejected the movement (insufficient balance or allowance).
    async fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<bool, VenueError>;

    /// Let `spender` pull up to `amount` of `token` out of `owner`'s balance
    async fn approve(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: u128,
    ) -> Result<bool, VenueError>;
}
