//! In-memory swap venue
//!
//! One object plays router and owns its factory, settling swaps against the
//! in-memory ledger with the same constant-product formula the quote path
//! uses. The payer account stands in for the call-context identity a live
//! venue reads off the transport; the aggregator wires its custody account
//! in before use.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::ledger::InMemoryLedger;
use super::pool::{InMemoryFactory, InMemoryPool};
use crate::domain::pricing;
use crate::domain::venue::{LiquidityPool, PoolFactory, VenueRouter};
use crate::shared::errors::VenueError;
use crate::shared::types::Address;

pub struct InMemoryVenue {
    name: String,
    address: Address,
    fee_bps: u32,
    payer: RwLock<Option<Address>>,
    factory: Arc<InMemoryFactory>,
    ledger: Arc<InMemoryLedger>,
}

impl InMemoryVenue {
    pub fn builder(name: &str, ledger: Arc<InMemoryLedger>) -> VenueBuilder {
        VenueBuilder {
            name: name.to_string(),
            address: Address::random(),
            fee_bps: pricing::STANDARD_FEE_BPS,
            ledger,
            pools: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Account whose approval the venue spends when pulling the input token
    pub fn set_payer(&self, payer: Address) {
        *self.payer.write().unwrap() = Some(payer);
    }

    pub fn factory_handle(&self) -> Arc<InMemoryFactory> {
        self.factory.clone()
    }
}

#[async_trait]
impl VenueRouter for InMemoryVenue {
    fn address(&self) -> Address {
        self.address
    }

    async fn factory(&self) -> Result<Arc<dyn PoolFactory>, VenueError> {
        Ok(self.factory.clone() as Arc<dyn PoolFactory>)
    }

    async fn quote_out(
        &self,
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
    ) -> Result<u128, VenueError> {
        pricing::amount_out_with_fee(amount_in, reserve_in, reserve_out, self.fee_bps)
            .map_err(|e| VenueError::Call(e.to_string()))
    }

    async fn swap_exact_tokens_for_tokens(
        &self,
        amount_in: u128,
        amount_out_min: u128,
        path: &[Address],
        recipient: Address,
        deadline: i64,
    ) -> Result<Vec<u128>, VenueError> {
        let now = Utc::now().timestamp();
        if deadline < now {
            return Err(VenueError::Expired(deadline));
        }
        if path.len() < 2 {
            return Err(VenueError::Call("path needs at least two tokens".to_string()));
        }
        if amount_in == 0 {
            return Err(VenueError::Call("amount_in must be positive".to_string()));
        }
        let payer = (*self.payer.read().unwrap())
            .ok_or_else(|| VenueError::Call("no payer wired to venue".to_string()))?;

        // Price every hop against current reserves before anything moves
        let mut amounts = vec![amount_in];
        let mut hops: Vec<Arc<InMemoryPool>> = Vec::new();
        for pair in path.windows(2) {
            let pool = self.factory.find_pool(pair[0], pair[1]).ok_or_else(|| {
                VenueError::Call(format!("no pool for {} / {}", pair[0], pair[1]))
            })?;
            let reserves = pool.reserves_now();
            let (reserve_in, reserve_out) = if pool.token0() == pair[0] {
                (reserves.reserve0, reserves.reserve1)
            } else {
                (reserves.reserve1, reserves.reserve0)
            };
            if reserve_in == 0 || reserve_out == 0 {
                return Err(VenueError::Call(format!(
                    "pool {} has no liquidity",
                    pool.address()
                )));
            }
            let hop_in = *amounts.last().unwrap();
            let hop_out =
                pricing::amount_out_with_fee(hop_in, reserve_in, reserve_out, self.fee_bps)
                    .map_err(|e| VenueError::Call(e.to_string()))?;
            amounts.push(hop_out);
            hops.push(pool);
        }

        let final_out = *amounts.last().unwrap();
        if final_out < amount_out_min {
            // Nothing has been moved yet: a rejected swap leaves ledger and
            // reserves exactly as they were
            return Err(VenueError::Slippage {
                wanted: amount_out_min,
                got: final_out,
            });
        }

        if !self
            .ledger
            .debit_allowance(path[0], payer, self.address, amount_in)
        {
            return Err(VenueError::Call(format!(
                "allowance from {} does not cover {}",
                payer, amount_in
            )));
        }

        // Settle: the input flows payer -> pool0, then each pool pays the
        // next one directly and the last pool pays the recipient
        if !self
            .ledger
            .transfer(path[0], payer, hops[0].address(), amount_in)
        {
            return Err(VenueError::Call(format!(
                "settlement transfer of {} failed",
                path[0]
            )));
        }
        for (i, pool) in hops.iter().enumerate() {
            let out_to = if i == hops.len() - 1 {
                recipient
            } else {
                hops[i + 1].address()
            };
            if !self
                .ledger
                .transfer(path[i + 1], pool.address(), out_to, amounts[i + 1])
            {
                return Err(VenueError::Call(format!(
                    "settlement payout of {} failed",
                    path[i + 1]
                )));
            }
            pool.apply_swap(path[i], amounts[i], amounts[i + 1]);
        }

        debug!(venue = %self.address, ?amounts, "swap settled");
        Ok(amounts)
    }
}

pub struct VenueBuilder {
    name: String,
    address: Address,
    fee_bps: u32,
    ledger: Arc<InMemoryLedger>,
    pools: Vec<InMemoryPool>,
}

impl VenueBuilder {
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    pub fn with_fee(mut self, fee_bps: u32) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    /// Add a pool and fund its ledger account with the starting reserves
    pub fn with_pool(
        mut self,
        token_a: Address,
        reserve_a: u128,
        token_b: Address,
        reserve_b: u128,
    ) -> Self {
        self.pools
            .push(InMemoryPool::new(token_a, reserve_a, token_b, reserve_b));
        self
    }

    pub fn build(self) -> Arc<InMemoryVenue> {
        let factory = Arc::new(InMemoryFactory::new(Address::random()));
        for pool in self.pools {
            let reserves = pool.reserves_now();
            self.ledger.mint(pool.token0(), pool.address(), reserves.reserve0);
            self.ledger.mint(pool.token1(), pool.address(), reserves.reserve1);
            factory.add_pool(Arc::new(pool));
        }
        Arc::new(InMemoryVenue {
            name: self.name,
            address: self.address,
            fee_bps: self.fee_bps,
            payer: RwLock::new(None),
            factory,
            ledger: self.ledger,
        })
    }
}
