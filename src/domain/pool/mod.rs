//! Read-only pool reserve access
//!
//! Pools expose reserves in a fixed, factory-defined token order. Pricing
//! needs them lined up with the trade direction instead, so this is the one
//! place where the flip happens.

use crate::domain::venue::PoolFactory;
use crate::shared::errors::VenueError;
use crate::shared::types::{Address, OrientedReserves};

/// Resolve the pool for `(token_in, token_out)` on `factory` and return its
/// reserves oriented to that direction. `None` when the factory has no pool
/// for the pair.
pub async fn oriented_reserves(
    factory: &dyn PoolFactory,
    token_in: Address,
    token_out: Address,
) -> Result<Option<OrientedReserves>, VenueError> {
    let Some(pool) = factory.pool(token_in, token_out).await? else {
        return Ok(None);
    };

    let reserves = pool.reserves().await?;
    let (reserve_in, reserve_out) = if pool.token0() == token_in {
        (reserves.reserve0, reserves.reserve1)
    } else {
        (reserves.reserve1, reserves.reserve0)
    };

    Ok(Some(OrientedReserves {
        reserve_in,
        reserve_out,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{InMemoryFactory, InMemoryPool};
    use std::sync::Arc;

    fn low_high() -> (Address, Address) {
        let (a, b) = (Address::random(), Address::random());
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    #[tokio::test]
    async fn orients_both_directions() {
        let (token0, token1) = low_high();
        let factory = InMemoryFactory::new(Address::random());
        factory.add_pool(Arc::new(InMemoryPool::new(token0, 1_000, token1, 3_000)));

        let forward = oriented_reserves(&factory, token0, token1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(forward.reserve_in, 1_000);
        assert_eq!(forward.reserve_out, 3_000);

        let backward = oriented_reserves(&factory, token1, token0)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(backward.reserve_in, 3_000);
        assert_eq!(backward.reserve_out, 1_000);
    }

    #[tokio::test]
    async fn missing_pool_is_none() {
        let factory = InMemoryFactory::new(Address::random());
        let found = oriented_reserves(&factory, Address::random(), Address::random())
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
