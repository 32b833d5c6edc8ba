//! Election results: the loaded datasets and the read-side queries over them.

mod dataset;
mod query;
mod store;

pub use dataset::*;
pub use query::*;
pub use store::ElectionStore;
