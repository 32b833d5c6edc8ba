//! Community votes: definitions, derived status, ballots and results.

mod results;
mod store;
mod vote;

pub use results::*;
pub use store::VotingStore;
pub use vote::*;
