//! Error handling for the application

use thiserror::Error;

/// Errors surfaced by the aggregator core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("approval failed: {0}")]
    ApprovalFailed(String),

    #[error("slippage exceeded: wanted at least {wanted}, venue returned {got}")]
    SlippageExceeded { wanted: u128, got: u128 },

    #[error("external call failed: {0}")]
    ExternalCallFailed(String),
}

/// Errors raised by external collaborators (venues, factories, pools, ledgers)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VenueError {
    #[error("venue call failed: {0}")]
    Call(String),

    #[error("output below minimum: wanted at least {wanted}, computed {got}")]
    Slippage { wanted: u128, got: u128 },

    #[error("deadline expired at {0}")]
    Expired(i64),
}

impl From<VenueError> for SwapError {
    fn from(err: VenueError) -> Self {
        match err {
            VenueError::Slippage { wanted, got } => SwapError::SlippageExceeded { wanted, got },
            VenueError::Expired(deadline) => {
                SwapError::ExternalCallFailed(format!("deadline expired at {}", deadline))
            }
            VenueError::Call(msg) => SwapError::ExternalCallFailed(msg),
        }
    }
}
