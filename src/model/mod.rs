use std::sync::Arc;

use rocket::{Build, Rocket};

pub mod api;
pub mod caller;
pub mod election;
pub mod id;
pub mod marketplace;
pub mod seed;
pub mod voting;

use election::ElectionStore;
use marketplace::MarketplaceStore;
use voting::VotingStore;

/// Every in-memory store the API serves from.
///
/// Each store is managed separately, so a route only asks for the state it uses.
#[derive(Clone)]
pub struct Stores {
    pub elections: Arc<ElectionStore>,
    pub votes: Arc<VotingStore>,
    pub marketplace: Arc<MarketplaceStore>,
}

impl Stores {
    /// Hand the stores to Rocket as managed state.
    pub fn manage(self, rocket: Rocket<Build>) -> Rocket<Build> {
        rocket
            .manage(self.elections)
            .manage(self.votes)
            .manage(self.marketplace)
    }
}

#[cfg(test)]
impl Stores {
    /// The moment tests run at: vote-1 and vote-2 are open, vote-3 has closed.
    pub fn example_time() -> chrono::DateTime<chrono::Utc> {
        "2024-12-10T12:00:00Z".parse().unwrap()
    }

    /// Demo data, with time standing still at [`Stores::example_time`].
    pub fn example() -> Self {
        Self::example_with_clock(Arc::new(crate::clock::FixedClock::new(Self::example_time())))
    }

    pub fn example_with_clock(clock: crate::clock::SharedClock) -> Self {
        Self {
            elections: Arc::new(ElectionStore::example()),
            votes: Arc::new(VotingStore::with_votes(
                clock.clone(),
                seed::demo_votes().unwrap(),
            )),
            marketplace: Arc::new(MarketplaceStore::from_seed(
                clock,
                seed::demo_marketplace().unwrap(),
            )),
        }
    }

    pub fn empty_example() -> Self {
        let clock: crate::clock::SharedClock =
            Arc::new(crate::clock::FixedClock::new(Self::example_time()));
        Self {
            elections: Arc::new(ElectionStore::new()),
            votes: Arc::new(VotingStore::new(clock.clone())),
            marketplace: Arc::new(MarketplaceStore::new(clock)),
        }
    }
}
