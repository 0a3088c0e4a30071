//! Venue domain - collaborator interfaces and the router/connector registry

mod interfaces;
mod registry;

pub use interfaces::{LiquidityPool, PoolFactory, TokenLedger, VenueRouter};
pub use registry::{RouterEntry, VenueRegistry};
