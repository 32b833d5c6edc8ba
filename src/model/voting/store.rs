use std::collections::HashMap;

use rocket::tokio::sync::RwLock;

use super::{
    CastReceipt, CastVoteRequest, CreateVoteRequest, Eligibility, Vote, VoteDetail, VoteResults,
    VoteStatus, VoteView,
};
use crate::clock::SharedClock;
use crate::error::{Error, Requirement, Result};
use crate::model::{
    api::Filter,
    caller::{has_trusted_badge, CallerContext},
    id::{generate_id, transaction_hash},
};

#[derive(Debug, Default)]
struct VotingState {
    votes: HashMap<String, Vote>,
    /// user id -> vote id -> chosen option id.
    ballots: HashMap<String, HashMap<String, String>>,
}

impl VotingState {
    fn ballot(&self, user_id: &str, vote_id: &str) -> Option<&String> {
        self.ballots.get(user_id)?.get(vote_id)
    }
}

/// Vote definitions and the ballots cast on them.
pub struct VotingStore {
    clock: SharedClock,
    state: RwLock<VotingState>,
}

fn trusted_only() -> Error {
    Error::Forbidden {
        message: "This vote is only open to members with a trusted badge".to_string(),
        requirement: Requirement::Trust,
    }
}

impl VotingStore {
    pub fn new(clock: SharedClock) -> Self {
        Self::with_votes(clock, Vec::new())
    }

    pub fn with_votes(clock: SharedClock, votes: Vec<Vote>) -> Self {
        let votes = votes.into_iter().map(|v| (v.id.clone(), v)).collect();
        Self {
            clock,
            state: RwLock::new(VotingState {
                votes,
                ballots: HashMap::new(),
            }),
        }
    }

    /// Votes visible to the caller, newest first.
    ///
    /// Trusted-only votes are hidden from callers without a trusted badge.
    pub async fn list(
        &self,
        caller: &CallerContext,
        status: Option<Filter<VoteStatus>>,
        constituency_id: Option<&str>,
    ) -> Vec<VoteView> {
        let now = self.clock.now();
        let trusted = caller.is_trusted();
        let state = self.state.read().await;

        let mut views: Vec<VoteView> = state
            .votes
            .values()
            .filter(|vote| trusted || !vote.is_trusted_only())
            .filter(|vote| constituency_id.map_or(true, |c| vote.constituency_id == c))
            .map(|vote| VoteView {
                status: vote.status_at(now),
                vote: vote.clone(),
            })
            .filter(|view| status.map_or(true, |s| s.matches(&view.status)))
            .collect();
        views.sort_by(|a, b| b.vote.created_at.cmp(&a.vote.created_at));
        views
    }

    pub async fn get(&self, vote_id: &str, caller: &CallerContext) -> Result<VoteDetail> {
        let now = self.clock.now();
        let trusted = caller.is_trusted();
        let state = self.state.read().await;

        let vote = state
            .votes
            .get(vote_id)
            .ok_or_else(|| Error::not_found("Vote", vote_id))?;
        if vote.is_trusted_only() && !trusted {
            return Err(trusted_only());
        }

        let status = vote.status_at(now);
        let my_vote = state.ballot(&caller.user_id, vote_id).cloned();
        Ok(VoteDetail {
            can_vote: status == VoteStatus::Active && my_vote.is_none(),
            my_vote,
            user_is_trusted: trusted,
            vote: VoteView {
                vote: vote.clone(),
                status,
            },
        })
    }

    /// Create a vote. Only representatives may do this.
    pub async fn create(&self, caller: &CallerContext, request: CreateVoteRequest) -> Result<VoteView> {
        if !caller.is_representative() {
            return Err(Error::Forbidden {
                message: "Only representatives can create votes".to_string(),
                requirement: Requirement::Badge("representative"),
            });
        }
        request.validate().map_err(Error::bad_request)?;

        let now = self.clock.now();
        let vote = request.into_vote(
            generate_id("vote", now),
            caller.user_id.clone(),
            caller.user_name.clone(),
            now,
        );
        info!("{} created vote {} ({})", caller.user_id, vote.id, vote.title);

        let view = VoteView {
            status: vote.status_at(now),
            vote: vote.clone(),
        };
        self.state.write().await.votes.insert(vote.id.clone(), vote);
        Ok(view)
    }

    /// Cast the caller's ballot.
    ///
    /// Checks run in a fixed order, so e.g. voting twice on a closed vote
    /// reports the closure rather than the duplicate.
    pub async fn cast(
        &self,
        vote_id: &str,
        caller: &CallerContext,
        request: CastVoteRequest,
    ) -> Result<CastReceipt> {
        let now = self.clock.now();
        let trusted = match &request.user_badges {
            Some(badges) => has_trusted_badge(badges),
            None => caller.is_trusted(),
        };

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let vote = state
            .votes
            .get_mut(vote_id)
            .ok_or_else(|| Error::not_found("Vote", vote_id))?;
        match vote.status_at(now) {
            VoteStatus::Active => {}
            VoteStatus::Upcoming => return Err(Error::bad_request("Voting has not started yet")),
            VoteStatus::Closed => return Err(Error::bad_request("Voting has already closed")),
        }
        if vote.is_trusted_only() && !trusted {
            return Err(trusted_only());
        }
        let existing = state
            .ballots
            .get(&caller.user_id)
            .and_then(|ballots| ballots.get(vote_id));
        if let Some(existing) = existing {
            return Err(Error::AlreadyVoted {
                existing_option: existing.clone(),
            });
        }
        if !vote.record(&request.option_id, trusted) {
            return Err(Error::bad_request(format!(
                "Invalid option: {}",
                request.option_id
            )));
        }
        state
            .ballots
            .entry(caller.user_id.clone())
            .or_default()
            .insert(vote_id.to_string(), request.option_id.clone());

        debug!(
            "{} voted {} on {vote_id} (trusted: {trusted})",
            caller.user_id, request.option_id
        );
        Ok(CastReceipt {
            vote_id: vote_id.to_string(),
            option_id: request.option_id,
            is_trusted_vote: trusted,
            transaction_hash: transaction_hash(now),
        })
    }

    pub async fn results(&self, vote_id: &str) -> Result<VoteResults> {
        let now = self.clock.now();
        let state = self.state.read().await;
        let vote = state
            .votes
            .get(vote_id)
            .ok_or_else(|| Error::not_found("Vote", vote_id))?;
        Ok(VoteResults::new(vote, vote.status_at(now)))
    }

    pub async fn eligibility(&self, vote_id: &str, caller: &CallerContext) -> Result<Eligibility> {
        let state = self.state.read().await;
        let vote = state
            .votes
            .get(vote_id)
            .ok_or_else(|| Error::not_found("Vote", vote_id))?;
        Ok(Eligibility::new(vote, caller.is_trusted()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};

    use super::*;
    use crate::clock::FixedClock;
    use crate::model::{caller::UserBadge, seed};

    fn store() -> (Arc<FixedClock>, VotingStore) {
        let clock = Arc::new(FixedClock::new(
            "2024-12-10T12:00:00Z".parse::<DateTime<Utc>>().unwrap(),
        ));
        let store = VotingStore::with_votes(clock.clone(), seed::demo_votes().unwrap());
        (clock, store)
    }

    fn cast_request(option_id: &str) -> CastVoteRequest {
        CastVoteRequest {
            option_id: option_id.to_string(),
            user_badges: None,
        }
    }

    #[rocket::async_test]
    async fn list_hides_trusted_votes() {
        let (_, store) = store();

        let member = store.list(&CallerContext::example_member(), None, None).await;
        let ids: Vec<_> = member.iter().map(|v| v.vote.id.as_str()).collect();
        assert_eq!(ids, ["vote-1", "vote-3"]);

        let trusted = store.list(&CallerContext::example_trusted(), None, None).await;
        let ids: Vec<_> = trusted.iter().map(|v| v.vote.id.as_str()).collect();
        assert_eq!(ids, ["vote-2", "vote-1", "vote-3"]);

        let closed = store
            .list(&CallerContext::example_trusted(), Some(VoteStatus::Closed.into()), None)
            .await;
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].vote.id, "vote-3");

        let unknown = store
            .list(&CallerContext::example_trusted(), Some(Filter::Unknown), None)
            .await;
        assert!(unknown.is_empty());

        let elsewhere = store
            .list(&CallerContext::example_trusted(), None, Some("pest-02"))
            .await;
        assert!(elsewhere.is_empty());
    }

    #[rocket::async_test]
    async fn cast_once_only() {
        let (_, store) = store();
        let caller = CallerContext::example_member();

        let receipt = store.cast("vote-1", &caller, cast_request("opt-2")).await.unwrap();
        assert!(!receipt.is_trusted_vote);
        assert!(receipt.transaction_hash.starts_with("0x"));

        match store.cast("vote-1", &caller, cast_request("opt-1")).await {
            Err(Error::AlreadyVoted { existing_option }) => assert_eq!(existing_option, "opt-2"),
            other => panic!("expected AlreadyVoted, got {other:?}"),
        }

        let detail = store.get("vote-1", &caller).await.unwrap();
        assert_eq!(detail.my_vote.as_deref(), Some("opt-2"));
        assert!(!detail.can_vote);
        assert_eq!(detail.vote.vote.total_votes, 121);
        assert_eq!(detail.vote.vote.total_new_member_votes, 23);
    }

    #[rocket::async_test]
    async fn cast_checks_in_order() {
        let (clock, store) = store();
        let member = CallerContext::example_member();

        assert!(matches!(
            store.cast("vote-9", &member, cast_request("opt-1")).await,
            Err(Error::NotFound(_))
        ));
        // Closed takes precedence over the invalid option.
        assert!(matches!(
            store.cast("vote-3", &member, cast_request("opt-9")).await,
            Err(Error::BadRequest(_))
        ));
        assert!(matches!(
            store.cast("vote-2", &member, cast_request("opt-1")).await,
            Err(Error::Forbidden {
                requirement: Requirement::Trust,
                ..
            })
        ));
        assert!(matches!(
            store.cast("vote-1", &member, cast_request("opt-9")).await,
            Err(Error::BadRequest(_))
        ));
        // A rejected option records nothing, not even an empty ballot book.
        assert!(store.get("vote-1", &member).await.unwrap().my_vote.is_none());
        assert!(!store.state.read().await.ballots.contains_key(&member.user_id));

        // Badges in the body override the caller's.
        let with_badges = CastVoteRequest {
            option_id: "opt-1".to_string(),
            user_badges: Some(vec![UserBadge {
                id: "b".to_string(),
                category: "community".to_string(),
                name: "Közösségépítő".to_string(),
            }]),
        };
        let receipt = store.cast("vote-2", &member, with_badges).await.unwrap();
        assert!(receipt.is_trusted_vote);

        // Past endsAt the stored definition does not matter.
        clock.advance(Duration::days(30));
        let late = CallerContext::example_trusted();
        assert!(matches!(
            store.cast("vote-1", &late, cast_request("opt-1")).await,
            Err(Error::BadRequest(_))
        ));
    }

    #[rocket::async_test]
    async fn create_requires_representative() {
        let (_, store) = store();
        let request = || CreateVoteRequest {
            title: "Új kutyafuttató".to_string(),
            description: "Hol legyen?".to_string(),
            options: vec!["Liget".to_string(), "Rakpart".to_string()],
            eligibility_type: Default::default(),
            starts_at: "2024-12-11T00:00:00Z".parse().unwrap(),
            ends_at: "2024-12-18T00:00:00Z".parse().unwrap(),
            constituency_id: "budapest-01".to_string(),
        };

        assert!(matches!(
            store.create(&CallerContext::example_trusted(), request()).await,
            Err(Error::Forbidden {
                requirement: Requirement::Badge("representative"),
                ..
            })
        ));

        let rep = CallerContext::example_representative();
        let created = store.create(&rep, request()).await.unwrap();
        assert!(created.vote.id.starts_with("vote-"));
        assert_eq!(created.status, VoteStatus::Upcoming);
        assert_eq!(created.vote.created_by, "rep-1");

        let all = store.list(&rep, None, None).await;
        assert_eq!(all[0].vote.id, created.vote.id);
    }
}
