//! Best-venue price discovery
//!
//! Scans every registered venue for the direct pool of a pair and keeps the
//! best output. Quoting only prices direct two-token paths; connector routes
//! are an execution-side capability gated by the connector allow-list.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::pool;
use crate::domain::venue::VenueRegistry;
use crate::shared::errors::SwapError;
use crate::shared::types::{Address, Quote};

pub struct QuoteEngine {
    registry: Arc<VenueRegistry>,
}

impl QuoteEngine {
    pub fn new(registry: Arc<VenueRegistry>) -> Self {
        Self { registry }
    }

    /// Best (amount_out, venue) across all registered venues for swapping
    /// `amount_in` of `token_in` into `token_out`.
    ///
    /// Venues are scanned in registration order and replaced only on strict
    /// improvement, so the earliest venue wins ties. Venues without a usable
    /// pool are skipped; a venue whose collaborator calls fail is skipped
    /// with a warning rather than sinking the whole scan. The empty result
    /// (`venue: None`, `amount_out: 0`) is valid and means no liquidity was
    /// found anywhere.
    ///
    /// Read-only: reserves are re-read on every call, nothing is cached or
    /// locked between a quote and a later swap.
    pub async fn best_quote(
        &self,
        amount_in: u128,
        token_in: Address,
        token_out: Address,
    ) -> Result<Quote, SwapError> {
        if amount_in == 0 {
            return Err(SwapError::InvalidArgument(
                "amount_in must be positive".to_string(),
            ));
        }
        if token_in.is_zero() || token_out.is_zero() {
            return Err(SwapError::InvalidArgument(
                "token addresses must be non-null".to_string(),
            ));
        }
        if token_in == token_out {
            return Err(SwapError::InvalidArgument(
                "token_in and token_out must differ".to_string(),
            ));
        }

        let routers = self.registry.routers().await;
        if routers.is_empty() {
            return Err(SwapError::InvalidArgument("no router defined".to_string()));
        }

        let path = vec![token_in, token_out];
        let mut best_amount = 0u128;
        let mut best_venue: Option<Address> = None;

        for entry in &routers {
            let venue = entry.address();

            let oriented =
                match pool::oriented_reserves(entry.factory.as_ref(), token_in, token_out).await {
                    Ok(Some(reserves)) => reserves,
                    Ok(None) => {
                        debug!(%venue, "no pool for pair, skipping");
                        continue;
                    }
                    Err(e) => {
                        warn!(%venue, error = %e, "reserve read failed, skipping venue");
                        continue;
                    }
                };

            if oriented.reserve_in == 0 || oriented.reserve_out == 0 {
                debug!(%venue, "pool has no liquidity, skipping");
                continue;
            }

            let candidate = match entry
                .router
                .quote_out(amount_in, oriented.reserve_in, oriented.reserve_out)
                .await
            {
                Ok(out) => out,
                Err(e) => {
                    warn!(%venue, error = %e, "venue quote failed, skipping");
                    continue;
                }
            };

            debug!(%venue, candidate, "venue quoted");
            if candidate > best_amount {
                best_amount = candidate;
                best_venue = Some(venue);
            }
        }

        Ok(Quote {
            amount_out: best_amount,
            venue: best_venue,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::venue::{VenueRegistry, VenueRouter};
    use crate::infrastructure::memory::{InMemoryLedger, InMemoryVenue};

    async fn registry_with(
        owner: Address,
        venues: &[Arc<InMemoryVenue>],
    ) -> Arc<VenueRegistry> {
        let registry = Arc::new(VenueRegistry::new(owner));
        let routers: Vec<Arc<dyn VenueRouter>> = venues
            .iter()
            .map(|v| v.clone() as Arc<dyn VenueRouter>)
            .collect();
        registry.set_routers(owner, routers).await.unwrap();
        registry
    }

    #[tokio::test]
    async fn picks_the_deepest_venue() {
        let owner = Address::random();
        let ledger = Arc::new(InMemoryLedger::new());
        let (weth, usdc) = (Address::random(), Address::random());

        let thin = InMemoryVenue::builder("thin", ledger.clone())
            .with_pool(weth, 1_000, usdc, 3_000)
            .build();
        let deep = InMemoryVenue::builder("deep", ledger.clone())
            .with_pool(weth, 100_000, usdc, 300_000)
            .build();

        let registry = registry_with(owner, &[thin.clone(), deep.clone()]).await;
        let engine = QuoteEngine::new(registry);

        let quote = engine.best_quote(100, weth, usdc).await.unwrap();
        assert_eq!(quote.venue, Some(deep.address()));
        // Deep pool barely moves: floor(997 * 100 * 300000 / (100000 * 1000 + 997 * 100)) = 299
        assert_eq!(quote.amount_out, 299);
        assert_eq!(quote.path, vec![weth, usdc]);
    }

    #[tokio::test]
    async fn tie_breaks_to_earliest_venue() {
        let owner = Address::random();
        let ledger = Arc::new(InMemoryLedger::new());
        let (weth, usdc) = (Address::random(), Address::random());

        let first = InMemoryVenue::builder("first", ledger.clone())
            .with_pool(weth, 10_000, usdc, 30_000)
            .build();
        let second = InMemoryVenue::builder("second", ledger.clone())
            .with_pool(weth, 10_000, usdc, 30_000)
            .build();

        let registry = registry_with(owner, &[first.clone(), second.clone()]).await;
        let engine = QuoteEngine::new(registry);

        let quote = engine.best_quote(500, weth, usdc).await.unwrap();
        assert_eq!(quote.venue, Some(first.address()));
    }

    #[tokio::test]
    async fn skips_venues_without_a_pool() {
        let owner = Address::random();
        let ledger = Arc::new(InMemoryLedger::new());
        let (weth, usdc, dai) = (Address::random(), Address::random(), Address::random());

        // Has a pool, but for a different pair
        let unrelated = InMemoryVenue::builder("unrelated", ledger.clone())
            .with_pool(weth, 10_000, dai, 10_000)
            .build();
        let target = InMemoryVenue::builder("target", ledger.clone())
            .with_pool(weth, 10_000, usdc, 30_000)
            .build();

        let registry = registry_with(owner, &[unrelated, target.clone()]).await;
        let engine = QuoteEngine::new(registry);

        let quote = engine.best_quote(100, weth, usdc).await.unwrap();
        assert_eq!(quote.venue, Some(target.address()));
    }

    #[tokio::test]
    async fn skips_pools_with_zero_reserves() {
        let owner = Address::random();
        let ledger = Arc::new(InMemoryLedger::new());
        let (weth, usdc) = (Address::random(), Address::random());

        let drained = InMemoryVenue::builder("drained", ledger.clone())
            .with_pool(weth, 0, usdc, 0)
            .build();

        let registry = registry_with(owner, &[drained]).await;
        let engine = QuoteEngine::new(registry);

        let quote = engine.best_quote(100, weth, usdc).await.unwrap();
        assert!(quote.is_empty());
        assert_eq!(quote.amount_out, 0);
    }

    #[tokio::test]
    async fn rejects_bad_arguments_before_touching_venues() {
        let owner = Address::random();
        let registry = Arc::new(VenueRegistry::new(owner));
        let engine = QuoteEngine::new(registry.clone());
        let (weth, usdc) = (Address::random(), Address::random());

        // Empty registry
        let err = engine.best_quote(100, weth, usdc).await.unwrap_err();
        assert_eq!(
            err,
            SwapError::InvalidArgument("no router defined".to_string())
        );

        let ledger = Arc::new(InMemoryLedger::new());
        let venue = InMemoryVenue::builder("v", ledger)
            .with_pool(weth, 1_000, usdc, 1_000)
            .build();
        registry
            .set_routers(owner, vec![venue as Arc<dyn VenueRouter>])
            .await
            .unwrap();

        assert!(matches!(
            engine.best_quote(0, weth, usdc).await,
            Err(SwapError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.best_quote(100, weth, weth).await,
            Err(SwapError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.best_quote(100, Address::ZERO, usdc).await,
            Err(SwapError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.best_quote(100, weth, Address::ZERO).await,
            Err(SwapError::InvalidArgument(_))
        ));

        // Clearing the router list brings "no router defined" back
        registry.set_routers(owner, vec![]).await.unwrap();
        let err = engine.best_quote(100, weth, usdc).await.unwrap_err();
        assert_eq!(
            err,
            SwapError::InvalidArgument("no router defined".to_string())
        );
    }

    #[tokio::test]
    async fn quote_is_idempotent() {
        let owner = Address::random();
        let ledger = Arc::new(InMemoryLedger::new());
        let (weth, usdc) = (Address::random(), Address::random());

        let venue = InMemoryVenue::builder("v", ledger)
            .with_pool(weth, 10_000, usdc, 30_000)
            .build();
        let registry = registry_with(owner, &[venue]).await;
        let engine = QuoteEngine::new(registry);

        let a = engine.best_quote(250, weth, usdc).await.unwrap();
        let b = engine.best_quote(250, weth, usdc).await.unwrap();
        assert_eq!(a, b);
    }
}
