//! Venue and connector allow-lists
//!
//! Process-wide registry of permitted routers (each with its factory) and
//! permitted connector tokens. Both lists start empty, are replaced wholesale
//! by the owner, and are read by every quote and swap.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use super::interfaces::{PoolFactory, VenueRouter};
use crate::shared::errors::SwapError;
use crate::shared::types::Address;

/// A registered venue: the router handle plus the factory it reported at
/// registration time. The factory is re-derived on every `set_routers`, so an
/// entry can never carry a stale or missing factory.
#[derive(Clone)]
pub struct RouterEntry {
    pub router: Arc<dyn VenueRouter>,
    pub factory: Arc<dyn PoolFactory>,
}

impl RouterEntry {
    pub fn address(&self) -> Address {
        self.router.address()
    }
}

#[derive(Default)]
struct RegistryState {
    routers: Vec<RouterEntry>,
    connectors: Vec<Address>,
}

/// Owner-gated allow-lists with atomic wholesale replacement.
///
/// Readers always observe either the previous list or the new one in full;
/// the write lock is held only for the final swap, never across external
/// calls.
pub struct VenueRegistry {
    owner: Address,
    state: RwLock<RegistryState>,
}

impl VenueRegistry {
    /// Empty registry administered by `owner`
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Replace the router list wholesale.
    ///
    /// Every router's factory is re-queried first; if any venue fails to
    /// report one, the whole operation aborts with `ExternalCallFailed` and
    /// the previous list stays in place.
    pub async fn set_routers(
        &self,
        caller: Address,
        routers: Vec<Arc<dyn VenueRouter>>,
    ) -> Result<(), SwapError> {
        self.ensure_owner(caller)?;

        let mut entries = Vec::with_capacity(routers.len());
        for router in routers {
            let address = router.address();
            let factory = router.factory().await.map_err(|e| {
                SwapError::ExternalCallFailed(format!("factory lookup for {}: {}", address, e))
            })?;
            entries.push(RouterEntry { router, factory });
        }

        let count = entries.len();
        let mut state = self.state.write().await;
        state.routers = entries;
        drop(state);

        info!(count, "router allow-list replaced");
        Ok(())
    }

    /// Replace the connector list wholesale. Connectors are not validated
    /// here; they only gate 3-token paths at execution time.
    pub async fn set_connectors(
        &self,
        caller: Address,
        connectors: Vec<Address>,
    ) -> Result<(), SwapError> {
        self.ensure_owner(caller)?;

        let count = connectors.len();
        let mut state = self.state.write().await;
        state.connectors = connectors;
        drop(state);

        info!(count, "connector allow-list replaced");
        Ok(())
    }

    /// Snapshot of the registered venues in insertion order (the quote scan
    /// order)
    pub async fn routers(&self) -> Vec<RouterEntry> {
        self.state.read().await.routers.clone()
    }

    pub async fn connectors(&self) -> Vec<Address> {
        self.state.read().await.connectors.clone()
    }

    /// Linear scan; venue lists stay small (tens, not thousands)
    pub async fn router_by_address(&self, address: Address) -> Option<RouterEntry> {
        self.state
            .read()
            .await
            .routers
            .iter()
            .find(|e| e.address() == address)
            .cloned()
    }

    pub async fn is_allowed_router(&self, address: Address) -> bool {
        self.router_by_address(address).await.is_some()
    }

    pub async fn is_allowed_connector(&self, token: Address) -> bool {
        self.state.read().await.connectors.contains(&token)
    }

    fn ensure_owner(&self, caller: Address) -> Result<(), SwapError> {
        if caller != self.owner {
            return Err(SwapError::Unauthorized(format!(
                "caller {} is not the registry owner",
                caller
            )));
        }
        Ok(())
    }
}
