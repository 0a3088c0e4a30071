//! Deroute - multi-venue AMM swap aggregator
//!
//! Quote the best output for a token pair across allow-listed venues, then
//! execute the swap with slippage protection.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::AggregatorService;
pub use domain::execution::SwapExecutor;
pub use domain::quote::QuoteEngine;
pub use domain::venue::VenueRegistry;
pub use shared::errors::SwapError;
pub use shared::types::{Address, Quote, SwapReceipt};
