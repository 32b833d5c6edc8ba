//! The community marketplace: listings, the transactions completed on them
//! and activity statistics.

mod directory;
mod listing;
mod query;
mod stats;
mod store;
mod transaction;

pub use directory::*;
pub use listing::*;
pub use query::*;
pub use stats::*;
pub use store::MarketplaceStore;
pub use transaction::*;
