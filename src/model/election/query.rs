use serde::{Deserialize, Serialize};

use super::{ElectionDataSet, ElectionType, PartyVotingResult, SettlementElectionData};
use chrono::NaiveDate;

pub const DEFAULT_RESULTS_LIMIT: usize = 100;
pub const MAX_RESULTS_LIMIT: usize = 1000;
pub const DEFAULT_RANKING_LIMIT: usize = 20;
pub const MAX_RANKING_LIMIT: usize = 100;

/// Query string of the settlement results route.
///
/// Unparseable numbers are treated as absent.
#[derive(Debug, Clone, Default, FromForm)]
pub struct ResultsQuery {
    #[field(name = "regionId")]
    pub region_id: Option<String>,
    #[field(name = "partyId")]
    pub party_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ResultsQuery {
    /// The effective limit: positive, at most [`MAX_RESULTS_LIMIT`].
    pub fn limit(&self) -> usize {
        effective_limit(self.limit, DEFAULT_RESULTS_LIMIT, MAX_RESULTS_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct RankingQuery {
    #[field(name = "regionId")]
    pub region_id: Option<String>,
    pub limit: Option<usize>,
}

impl RankingQuery {
    pub fn limit(&self) -> usize {
        effective_limit(self.limit, DEFAULT_RANKING_LIMIT, MAX_RANKING_LIMIT)
    }
}

fn effective_limit(requested: Option<usize>, default: usize, max: usize) -> usize {
    requested.filter(|&l| l > 0).unwrap_or(default).min(max)
}

/// A window onto a longer list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub limit: usize,
    pub offset: usize,
    pub total: usize,
}

/// Flatten, filter and slice the settlement results of an election.
///
/// A region id that names no region leaves the list unfiltered.
pub fn settlement_results(
    dataset: &ElectionDataSet,
    query: &ResultsQuery,
) -> Page<SettlementElectionData> {
    let region = query
        .region_id
        .as_deref()
        .and_then(|region_id| dataset.region(region_id));
    let settlements: Vec<&SettlementElectionData> = match region {
        Some(region) => region.settlement_results.iter().collect(),
        None => dataset.settlements().collect(),
    };

    let total = settlements.len();
    let limit = query.limit();
    let offset = query.offset();
    let items = settlements
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|settlement| {
            let mut settlement = settlement.clone();
            if let Some(party_id) = &query.party_id {
                settlement.party_results.retain(|p| &p.party_id == party_id);
            }
            settlement
        })
        .collect();

    Page {
        items,
        limit,
        offset,
        total,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRank {
    pub settlement_id: String,
    pub settlement_name: String,
    pub votes: u64,
    pub percentage: f64,
    /// 1-based position in the full ranking.
    pub rank: usize,
}

/// Settlements ranked by one party's vote count, best first.
///
/// Settlements where the party got no votes are left out. Returns the
/// truncated ranking and the number of settlements ranked before truncation.
pub fn rank_by_party(
    dataset: &ElectionDataSet,
    party_id: &str,
    query: &RankingQuery,
) -> (Vec<SettlementRank>, usize) {
    let mut ranking: Vec<SettlementRank> = dataset
        .region_results
        .iter()
        .filter(|region| match &query.region_id {
            Some(region_id) => &region.region_id == region_id,
            None => true,
        })
        .flat_map(|region| region.settlement_results.iter())
        .filter_map(|settlement| {
            let result = settlement.party_result(party_id)?;
            (result.votes > 0).then(|| SettlementRank {
                settlement_id: settlement.settlement_id.clone(),
                settlement_name: settlement.settlement_name.clone(),
                votes: result.votes,
                percentage: result.percentage,
                rank: 0,
            })
        })
        .collect();

    // Stable, so ties keep region order.
    ranking.sort_by(|a, b| b.votes.cmp(&a.votes));
    for (i, entry) in ranking.iter_mut().enumerate() {
        entry.rank = i + 1;
    }

    let total = ranking.len();
    ranking.truncate(query.limit());
    (ranking, total)
}

pub fn find_settlement<'a>(
    dataset: &'a ElectionDataSet,
    settlement_id: &str,
) -> Option<&'a SettlementElectionData> {
    dataset
        .settlements()
        .find(|s| s.settlement_id == settlement_id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSummary {
    pub region_id: String,
    pub region_name: String,
    pub total_voters: u64,
    pub participation_rate: String,
    pub settlement_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_party: Option<PartyVotingResult>,
}

pub fn region_summaries(dataset: &ElectionDataSet) -> Vec<RegionSummary> {
    dataset
        .region_results
        .iter()
        .map(|region| RegionSummary {
            region_id: region.region_id.clone(),
            region_name: region.region_name.clone(),
            total_voters: region.total_voters,
            participation_rate: format!("{:.1}", region.participation_rate),
            settlement_count: region.settlement_results.len(),
            top_party: region.aggregated_party_results.first().cloned(),
        })
        .collect()
}

/// An entry in the list of loaded elections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSummary {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub election_type: ElectionType,
    pub total_voters: u64,
    pub participation_rate: String,
}

impl From<&ElectionDataSet> for ElectionSummary {
    fn from(dataset: &ElectionDataSet) -> Self {
        Self {
            id: dataset.election_id.clone(),
            name: dataset.election_name.clone(),
            date: dataset.election_date,
            election_type: dataset.election_type,
            total_voters: dataset.total_participation,
            participation_rate: format!("{:.1}", dataset.participation_rate),
        }
    }
}
