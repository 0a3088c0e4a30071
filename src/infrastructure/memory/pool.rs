//! In-memory constant-product pools and their factory

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::venue::{LiquidityPool, PoolFactory};
use crate::shared::errors::VenueError;
use crate::shared::types::{Address, PoolReserves};

/// A single pool. Token order is fixed at creation: `token0` is the
/// numerically smaller address, matching the usual factory convention.
pub struct InMemoryPool {
    address: Address,
    token0: Address,
    token1: Address,
    state: RwLock<PoolReserves>,
}

impl InMemoryPool {
    pub fn new(token_a: Address, reserve_a: u128, token_b: Address, reserve_b: u128) -> Self {
        let (token0, reserve0, token1, reserve1) = if token_a < token_b {
            (token_a, reserve_a, token_b, reserve_b)
        } else {
            (token_b, reserve_b, token_a, reserve_a)
        };
        Self {
            address: Address::random(),
            token0,
            token1,
            state: RwLock::new(PoolReserves {
                reserve0,
                reserve1,
                updated_at: Utc::now().timestamp(),
            }),
        }
    }

    /// The pool's own ledger account, where its inventory sits
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn contains(&self, token_a: Address, token_b: Address) -> bool {
        (self.token0 == token_a && self.token1 == token_b)
            || (self.token0 == token_b && self.token1 == token_a)
    }

    pub fn reserves_now(&self) -> PoolReserves {
        *self.state.read().unwrap()
    }

    /// Apply a settled trade to the reserves
    pub(crate) fn apply_swap(&self, token_in: Address, amount_in: u128, amount_out: u128) {
        let mut state = self.state.write().unwrap();
        if token_in == self.token0 {
            state.reserve0 += amount_in;
            state.reserve1 -= amount_out;
        } else {
            state.reserve1 += amount_in;
            state.reserve0 -= amount_out;
        }
        state.updated_at = Utc::now().timestamp();
    }
}

#[async_trait]
impl LiquidityPool for InMemoryPool {
    fn token0(&self) -> Address {
        self.token0
    }

    fn token1(&self) -> Address {
        self.token1
    }

    async fn reserves(&self) -> Result<PoolReserves, VenueError> {
        Ok(self.reserves_now())
    }
}

/// Pool lookup by unordered token pair
pub struct InMemoryFactory {
    address: Address,
    pools: RwLock<Vec<Arc<InMemoryPool>>>,
}

impl InMemoryFactory {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            pools: RwLock::new(Vec::new()),
        }
    }

    pub fn add_pool(&self, pool: Arc<InMemoryPool>) {
        self.pools.write().unwrap().push(pool);
    }

    pub fn find_pool(&self, token_a: Address, token_b: Address) -> Option<Arc<InMemoryPool>> {
        self.pools
            .read()
            .unwrap()
            .iter()
            .find(|p| p.contains(token_a, token_b))
            .cloned()
    }
}

#[async_trait]
impl PoolFactory for InMemoryFactory {
    fn address(&self) -> Address {
        self.address
    }

    async fn pool(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<Option<Arc<dyn LiquidityPool>>, VenueError> {
        Ok(self
            .find_pool(token_a, token_b)
            .map(|p| p as Arc<dyn LiquidityPool>))
    }
}
