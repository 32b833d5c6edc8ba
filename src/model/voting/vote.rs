use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::caller::UserBadge;

/// Who may see and cast ballots on a vote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EligibilityType {
    #[default]
    All,
    Trusted,
}

/// Derived from the current time and the vote's window; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum VoteStatus {
    #[field(value = "upcoming")]
    Upcoming,
    #[field(value = "active")]
    Active,
    #[field(value = "closed")]
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOption {
    pub id: String,
    pub label: String,
    pub votes: u64,
    pub trusted_votes: u64,
    pub new_member_votes: u64,
}

impl VoteOption {
    fn new(index: usize, label: String) -> Self {
        Self {
            id: format!("opt-{}", index + 1),
            label,
            votes: 0,
            trusted_votes: 0,
            new_member_votes: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub title: String,
    pub description: String,
    pub eligibility_type: EligibilityType,
    pub options: Vec<VoteOption>,
    pub total_votes: u64,
    pub total_trusted_votes: u64,
    pub total_new_member_votes: u64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_by: String,
    pub creator_name: String,
    pub constituency_id: String,
    pub created_at: DateTime<Utc>,
    /// Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl Vote {
    /// Status over the half-open window `[starts_at, ends_at)`.
    pub fn status_at(&self, now: DateTime<Utc>) -> VoteStatus {
        if now < self.starts_at {
            VoteStatus::Upcoming
        } else if now >= self.ends_at {
            VoteStatus::Closed
        } else {
            VoteStatus::Active
        }
    }

    pub fn option(&self, option_id: &str) -> Option<&VoteOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    pub fn is_trusted_only(&self) -> bool {
        self.eligibility_type == EligibilityType::Trusted
    }

    /// Count one ballot. The option must exist.
    pub(super) fn record(&mut self, option_id: &str, trusted: bool) -> bool {
        let Some(option) = self.options.iter_mut().find(|o| o.id == option_id) else {
            return false;
        };
        option.votes += 1;
        self.total_votes += 1;
        if trusted {
            option.trusted_votes += 1;
            self.total_trusted_votes += 1;
        } else {
            option.new_member_votes += 1;
            self.total_new_member_votes += 1;
        }
        true
    }
}

/// A vote together with its status at the time of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteView {
    #[serde(flatten)]
    pub vote: Vote,
    pub status: VoteStatus,
}

/// A single vote as seen by one caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDetail {
    #[serde(flatten)]
    pub vote: VoteView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_vote: Option<String>,
    pub can_vote: bool,
    pub user_is_trusted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub eligibility_type: EligibilityType,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub constituency_id: String,
}

impl CreateVoteRequest {
    pub(super) fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err("Missing required fields: title, description");
        }
        if self.options.len() < 2 {
            return Err("At least two options are required");
        }
        if self.options.iter().any(|label| label.trim().is_empty()) {
            return Err("Option labels cannot be empty");
        }
        if self.starts_at >= self.ends_at {
            return Err("startsAt must be before endsAt");
        }
        Ok(())
    }

    pub(super) fn into_vote(
        self,
        id: String,
        created_by: String,
        creator_name: String,
        now: DateTime<Utc>,
    ) -> Vote {
        Vote {
            id,
            title: self.title,
            description: self.description,
            eligibility_type: self.eligibility_type,
            options: self
                .options
                .into_iter()
                .enumerate()
                .map(|(i, label)| VoteOption::new(i, label))
                .collect(),
            total_votes: 0,
            total_trusted_votes: 0,
            total_new_member_votes: 0,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            created_by,
            creator_name,
            constituency_id: self.constituency_id,
            created_at: now,
            transaction_hash: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub option_id: String,
    /// Overrides the badges from the request headers when present.
    #[serde(default)]
    pub user_badges: Option<Vec<UserBadge>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastReceipt {
    pub vote_id: String,
    pub option_id: String,
    pub is_trusted_vote: bool,
    pub transaction_hash: String,
}

#[cfg(test)]
impl Vote {
    pub fn example() -> Self {
        crate::model::seed::demo_votes()
            .unwrap()
            .into_iter()
            .find(|v| v.id == "vote-1")
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn status_window_is_half_open() {
        let vote = Vote::example();
        let second = Duration::seconds(1);
        assert_eq!(vote.status_at(vote.starts_at - second), VoteStatus::Upcoming);
        assert_eq!(vote.status_at(vote.starts_at), VoteStatus::Active);
        assert_eq!(vote.status_at(vote.ends_at - second), VoteStatus::Active);
        assert_eq!(vote.status_at(vote.ends_at), VoteStatus::Closed);
    }

    #[test]
    fn record_counts_trusted_and_new_members() {
        let mut vote = Vote::example();
        assert!(vote.record("opt-1", true));
        assert!(vote.record("opt-1", false));
        assert!(!vote.record("opt-9", true));

        let option = vote.option("opt-1").unwrap();
        assert_eq!(option.votes, 44);
        assert_eq!(option.trusted_votes, 36);
        assert_eq!(option.new_member_votes, 8);
        assert_eq!(vote.total_votes, 122);
        assert_eq!(vote.total_trusted_votes, 99);
        assert_eq!(vote.total_new_member_votes, 23);
    }

    #[test]
    fn create_validation() {
        let request = |options: &[&str], days: i64| CreateVoteRequest {
            title: "Játszótér".to_string(),
            description: "Hova kerüljön?".to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            eligibility_type: EligibilityType::All,
            starts_at: "2025-01-01T00:00:00Z".parse().unwrap(),
            ends_at: "2025-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
                + Duration::days(days),
            constituency_id: "budapest-01".to_string(),
        };
        assert!(request(&["Park", "Iskola"], 7).validate().is_ok());
        assert!(request(&["Park"], 7).validate().is_err());
        assert!(request(&["Park", "Iskola"], 0).validate().is_err());
        assert!(request(&["Park", " "], 7).validate().is_err());

        let vote = request(&["Park", "Iskola"], 7).into_vote(
            "vote-x".to_string(),
            "rep-1".to_string(),
            "Kovács János".to_string(),
            Utc::now(),
        );
        let ids: Vec<_> = vote.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["opt-1", "opt-2"]);
        assert_eq!(vote.total_votes, 0);
    }
}
