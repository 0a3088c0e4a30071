//! Application service wiring the registry, quote engine and executor

use std::sync::Arc;

use crate::domain::execution::SwapExecutor;
use crate::domain::quote::QuoteEngine;
use crate::domain::venue::{TokenLedger, VenueRegistry, VenueRouter};
use crate::shared::errors::SwapError;
use crate::shared::types::{Address, Quote, SwapReceipt};

/// One aggregator instance: allow-lists, price discovery and execution
/// behind a single facade. Quote and swap stay decoupled; a quote holds no
/// lock and reserves may move before the swap lands, which is what the
/// min-out guard is for.
pub struct AggregatorService {
    registry: Arc<VenueRegistry>,
    engine: QuoteEngine,
    executor: SwapExecutor,
}

impl AggregatorService {
    pub fn new(owner: Address, ledger: Arc<dyn TokenLedger>) -> Self {
        Self::with_custody(owner, ledger, Address::random())
    }

    /// Deterministic custody account, used by tests and the demo wiring
    pub fn with_custody(
        owner: Address,
        ledger: Arc<dyn TokenLedger>,
        custody: Address,
    ) -> Self {
        let registry = Arc::new(VenueRegistry::new(owner));
        let engine = QuoteEngine::new(registry.clone());
        let executor = SwapExecutor::new(registry.clone(), ledger, custody);
        Self {
            registry,
            engine,
            executor,
        }
    }

    pub fn registry(&self) -> &Arc<VenueRegistry> {
        &self.registry
    }

    /// Ledger account that holds input tokens while a swap is in flight
    pub fn custody(&self) -> Address {
        self.executor.custody()
    }

    pub async fn quote(
        &self,
        amount_in: u128,
        token_in: Address,
        token_out: Address,
    ) -> Result<Quote, SwapError> {
        self.engine.best_quote(amount_in, token_in, token_out).await
    }

    pub async fn swap(
        &self,
        caller: Address,
        amount_in: u128,
        amount_out_min: u128,
        venue: Address,
        path: &[Address],
        deadline: i64,
    ) -> Result<SwapReceipt, SwapError> {
        self.executor
            .swap(caller, amount_in, amount_out_min, venue, path, deadline)
            .await
    }

    pub async fn set_routers(
        &self,
        caller: Address,
        routers: Vec<Arc<dyn VenueRouter>>,
    ) -> Result<(), SwapError> {
        self.registry.set_routers(caller, routers).await
    }

    pub async fn set_connectors(
        &self,
        caller: Address,
        connectors: Vec<Address>,
    ) -> Result<(), SwapError> {
        self.registry.set_connectors(caller, connectors).await
    }
}
