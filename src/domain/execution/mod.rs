//! Swap execution
//!
//! Validates a caller-chosen venue and path against the allow-lists, then
//! runs the custody protocol: pull the input, grant the venue its spending
//! approval, delegate the swap. Every effect either completes or is
//! compensated, so a failed swap leaves no partial transfers and no stranded
//! approvals behind.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::domain::venue::{TokenLedger, VenueRegistry};
use crate::shared::errors::{SwapError, VenueError};
use crate::shared::types::{Address, SwapReceipt};

pub struct SwapExecutor {
    registry: Arc<VenueRegistry>,
    ledger: Arc<dyn TokenLedger>,
    /// The executor's own ledger account, holding input tokens in flight
    custody: Address,
}

impl SwapExecutor {
    pub fn new(registry: Arc<VenueRegistry>, ledger: Arc<dyn TokenLedger>, custody: Address) -> Self {
        Self {
            registry,
            ledger,
            custody,
        }
    }

    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Execute `amount_in` of `path[0]` against `venue`, delivering at least
    /// `amount_out_min` of the destination token to `caller` before
    /// `deadline` (unix seconds).
    ///
    /// All preconditions are checked before anything moves; every side-effect
    /// failure afterwards unwinds what was already done and surfaces the
    /// original error.
    pub async fn swap(
        &self,
        caller: Address,
        amount_in: u128,
        amount_out_min: u128,
        venue: Address,
        path: &[Address],
        deadline: i64,
    ) -> Result<SwapReceipt, SwapError> {
        if amount_in == 0 {
            return Err(SwapError::InvalidArgument(
                "amount_in must be positive".to_string(),
            ));
        }
        if amount_out_min == 0 {
            return Err(SwapError::InvalidArgument(
                "amount_out_min must be positive".to_string(),
            ));
        }

        let entry = self
            .registry
            .router_by_address(venue)
            .await
            .ok_or_else(|| SwapError::Unauthorized(format!("router {} is not allowed", venue)))?;

        let source = self.validate_path(path).await?;

        // 1. Pull the input into custody
        let pulled = self
            .ledger
            .transfer_from(source, caller, self.custody, amount_in)
            .await
            .map_err(|e| SwapError::TransferFailed(e.to_string()))?;
        if !pulled {
            return Err(SwapError::TransferFailed(format!(
                "ledger rejected pulling {} of {} from {}",
                amount_in, source, caller
            )));
        }

        // 2. Let the venue spend it
        let approved = match self
            .ledger
            .approve(source, self.custody, venue, amount_in)
            .await
        {
            Ok(ok) => ok,
            Err(e) => {
                self.refund(source, caller, amount_in).await;
                return Err(SwapError::ApprovalFailed(e.to_string()));
            }
        };
        if !approved {
            self.refund(source, caller, amount_in).await;
            return Err(SwapError::ApprovalFailed(format!(
                "ledger rejected approving {} for venue {}",
                amount_in, venue
            )));
        }

        // 3. Delegate the swap; the venue enforces amount_out_min
        let amounts = match entry
            .router
            .swap_exact_tokens_for_tokens(amount_in, amount_out_min, path, caller, deadline)
            .await
        {
            Ok(amounts) => amounts,
            Err(e) => {
                self.unwind(source, caller, venue, amount_in).await;
                return Err(match e {
                    VenueError::Slippage { wanted, got } => {
                        SwapError::SlippageExceeded { wanted, got }
                    }
                    other => SwapError::ExternalCallFailed(other.to_string()),
                });
            }
        };

        // The realized output is the final hop, whatever the path length
        let amount_out = *amounts.last().ok_or_else(|| {
            SwapError::ExternalCallFailed("venue returned no per-hop amounts".to_string())
        })?;

        let receipt = SwapReceipt {
            id: Uuid::new_v4(),
            venue,
            path: path.to_vec(),
            amount_in,
            amount_out,
            amounts,
        };
        info!(
            id = %receipt.id,
            %venue,
            amount_in,
            amount_out,
            "swap settled"
        );
        Ok(receipt)
    }

    /// Path shape and allow-list checks; returns the source token
    async fn validate_path(&self, path: &[Address]) -> Result<Address, SwapError> {
        if path.len() != 2 && path.len() != 3 {
            return Err(SwapError::InvalidArgument(format!(
                "path must have 2 or 3 tokens, got {}",
                path.len()
            )));
        }

        let source = path[0];
        if source.is_zero() {
            return Err(SwapError::InvalidArgument(
                "source token must be non-null".to_string(),
            ));
        }

        let destination = if path.len() == 3 {
            let connector = path[1];
            if !self.registry.is_allowed_connector(connector).await {
                return Err(SwapError::Unauthorized(format!(
                    "connector {} is not allowed",
                    connector
                )));
            }
            path[2]
        } else {
            path[1]
        };

        if destination.is_zero() {
            return Err(SwapError::InvalidArgument(
                "destination token must be non-null".to_string(),
            ));
        }
        if destination == source {
            return Err(SwapError::InvalidArgument(
                "source and destination tokens must differ".to_string(),
            ));
        }

        Ok(source)
    }

    /// Compensate a failed venue call: revoke the approval, then refund
    async fn unwind(&self, token: Address, caller: Address, venue: Address, amount: u128) {
        match self.ledger.approve(token, self.custody, venue, 0).await {
            Ok(true) => {}
            Ok(false) => error!(%venue, %token, "approval revocation rejected during unwind"),
            Err(e) => error!(%venue, %token, error = %e, "approval revocation failed during unwind"),
        }
        self.refund(token, caller, amount).await;
    }

    async fn refund(&self, token: Address, caller: Address, amount: u128) {
        match self
            .ledger
            .transfer_from(token, self.custody, caller, amount)
            .await
        {
            Ok(true) => {}
            Ok(false) => error!(%caller, %token, amount, "refund rejected during unwind"),
            Err(e) => error!(%caller, %token, amount, error = %e, "refund failed during unwind"),
        }
    }
}
