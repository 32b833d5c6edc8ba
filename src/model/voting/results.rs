use serde::{Deserialize, Serialize};

use super::{EligibilityType, Vote, VoteOption, VoteStatus};
use crate::model::caller::TRUSTED_BADGE_CATEGORIES;

/// `part` as a whole-number percentage of `whole`, rounding halves up.
/// Zero when `whole` is zero.
pub fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    #[serde(flatten)]
    pub option: VoteOption,
    /// Share of all ballots on the vote.
    pub percentage: u32,
    /// Share of this option's ballots cast by trusted members.
    pub trusted_percentage: u32,
    pub new_member_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    pub total_votes: u64,
    pub total_trusted_votes: u64,
    pub total_new_member_votes: u64,
    pub trusted_percentage: u32,
    pub new_member_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResults {
    pub vote_id: String,
    pub title: String,
    pub status: VoteStatus,
    pub eligibility_type: EligibilityType,
    pub options: Vec<OptionResult>,
    pub summary: ResultsSummary,
}

impl VoteResults {
    pub fn new(vote: &Vote, status: VoteStatus) -> Self {
        let options = vote
            .options
            .iter()
            .map(|option| OptionResult {
                option: option.clone(),
                percentage: percentage(option.votes, vote.total_votes),
                trusted_percentage: percentage(option.trusted_votes, option.votes),
                new_member_percentage: percentage(option.new_member_votes, option.votes),
            })
            .collect();

        Self {
            vote_id: vote.id.clone(),
            title: vote.title.clone(),
            status,
            eligibility_type: vote.eligibility_type,
            options,
            summary: ResultsSummary {
                total_votes: vote.total_votes,
                total_trusted_votes: vote.total_trusted_votes,
                total_new_member_votes: vote.total_new_member_votes,
                trusted_percentage: percentage(vote.total_trusted_votes, vote.total_votes),
                new_member_percentage: percentage(vote.total_new_member_votes, vote.total_votes),
            },
        }
    }
}

/// Whether a caller may cast a ballot on a vote, ignoring its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub vote_id: String,
    pub eligibility_type: EligibilityType,
    pub user_is_trusted: bool,
    pub can_vote: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub trusted_categories: Vec<String>,
}

impl Eligibility {
    pub fn new(vote: &Vote, user_is_trusted: bool) -> Self {
        let can_vote = !vote.is_trusted_only() || user_is_trusted;
        let reason = (!can_vote).then(|| {
            format!(
                "A trusted badge is required to vote (categories: {})",
                TRUSTED_BADGE_CATEGORIES.join(", ")
            )
        });
        Self {
            vote_id: vote.id.clone(),
            eligibility_type: vote.eligibility_type,
            user_is_trusted,
            can_vote,
            reason,
            trusted_categories: TRUSTED_BADGE_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}
