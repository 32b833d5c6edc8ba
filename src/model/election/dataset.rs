use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionType {
    Parliament,
    Local,
    European,
}

/// One party's share of the vote in some area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyVotingResult {
    pub party_id: String,
    pub party_name: String,
    pub votes: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementElectionData {
    pub settlement_id: String,
    pub settlement_name: String,
    pub election_id: String,
    pub election_date: NaiveDate,
    pub election_type: ElectionType,
    pub registered_voters: u64,
    pub total_voters: u64,
    /// Stored as-is; not recomputed from the voter counts.
    pub participation_rate: f64,
    pub lead_votes: u64,
    pub valid_votes: u64,
    pub invalid_votes: u64,
    pub party_results: Vec<PartyVotingResult>,
}

impl SettlementElectionData {
    pub fn party_result(&self, party_id: &str) -> Option<&PartyVotingResult> {
        self.party_results.iter().find(|p| p.party_id == party_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionElectionData {
    pub region_id: String,
    pub region_name: String,
    pub election_id: String,
    pub total_registered_voters: u64,
    pub total_voters: u64,
    pub participation_rate: f64,
    /// Highest vote count first.
    #[serde(default)]
    pub aggregated_party_results: Vec<PartyVotingResult>,
    pub settlement_results: Vec<SettlementElectionData>,
}

/// A complete election, as loaded from one JSON file. Never modified after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionDataSet {
    pub election_id: String,
    pub election_date: NaiveDate,
    pub election_type: ElectionType,
    pub election_name: String,
    #[serde(default)]
    pub total_registered_voters: u64,
    #[serde(default)]
    pub total_participation: u64,
    #[serde(default)]
    pub participation_rate: f64,
    pub region_results: Vec<RegionElectionData>,
    #[serde(default)]
    pub national_party_results: Vec<PartyVotingResult>,
}

impl ElectionDataSet {
    pub fn region(&self, region_id: &str) -> Option<&RegionElectionData> {
        self.region_results.iter().find(|r| r.region_id == region_id)
    }

    /// Every settlement, in region order.
    pub fn settlements(&self) -> impl Iterator<Item = &SettlementElectionData> {
        self.region_results
            .iter()
            .flat_map(|r| r.settlement_results.iter())
    }
}

#[cfg(test)]
impl ElectionDataSet {
    pub fn example() -> Self {
        rocket::serde::json::serde_json::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/elections/2022-parliament.json"
        )))
        .unwrap()
    }
}
