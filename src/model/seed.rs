//! Demo content bundled into the binary.

use rocket::serde::json::serde_json;

use super::{marketplace::MarketplaceSeed, voting::Vote};

const DEMO_VOTES: &str = include_str!("../../data/seed/votes.json");
const DEMO_MARKETPLACE: &str = include_str!("../../data/seed/marketplace.json");

pub fn demo_votes() -> serde_json::Result<Vec<Vote>> {
    serde_json::from_str(DEMO_VOTES)
}

pub fn demo_marketplace() -> serde_json::Result<MarketplaceSeed> {
    serde_json::from_str(DEMO_MARKETPLACE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_data_parses() {
        let votes = demo_votes().unwrap();
        assert_eq!(votes.len(), 3);
        assert!(votes.iter().all(|v| v.options.len() == 3));

        let market = demo_marketplace().unwrap();
        assert_eq!(market.listings.len(), 7);
        assert_eq!(market.transactions.len(), 4);
        assert_eq!(market.cities.len(), 4);
    }
}
