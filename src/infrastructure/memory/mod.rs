//! In-memory environment - venues, pools and a token ledger for tests and
//! the demo CLI

mod ledger;
mod pool;
mod venue;

pub use ledger::InMemoryLedger;
pub use pool::{InMemoryFactory, InMemoryPool};
pub use venue::{InMemoryVenue, VenueBuilder};
