use std::sync::Arc;

use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{ApiResponse, Filter, Meta},
    caller::CallerContext,
    voting::{
        CastReceipt, CastVoteRequest, CreateVoteRequest, Eligibility, VoteDetail, VoteResults,
        VoteStatus, VoteView, VotingStore,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        list_votes,
        get_vote,
        create_vote,
        cast_vote,
        vote_results,
        vote_eligibility,
    ]
}

#[derive(Debug, Default, FromForm)]
struct VoteFilter {
    status: Option<Filter<VoteStatus>>,
    #[field(name = "constituencyId")]
    constituency_id: Option<String>,
}

#[get("/votes?<filter..>")]
async fn list_votes(
    filter: VoteFilter,
    caller: CallerContext,
    votes: &State<Arc<VotingStore>>,
) -> Json<ApiResponse<Vec<VoteView>>> {
    let list = votes
        .list(&caller, filter.status, filter.constituency_id.as_deref())
        .await;
    let meta = Meta::count(list.len()).user_is_trusted(caller.is_trusted());
    Json(ApiResponse::ok(list).with_meta(meta))
}

#[get("/votes/<vote_id>")]
async fn get_vote(
    vote_id: &str,
    caller: CallerContext,
    votes: &State<Arc<VotingStore>>,
) -> Result<Json<ApiResponse<VoteDetail>>> {
    Ok(Json(ApiResponse::ok(votes.get(vote_id, &caller).await?)))
}

#[post("/votes", data = "<request>", format = "json")]
async fn create_vote(
    request: Json<CreateVoteRequest>,
    caller: CallerContext,
    votes: &State<Arc<VotingStore>>,
) -> Result<(Status, Json<ApiResponse<VoteView>>)> {
    let vote = votes.create(&caller, request.0).await?;
    Ok((
        Status::Created,
        Json(ApiResponse::ok(vote).with_message("Vote created")),
    ))
}

#[post("/votes/<vote_id>/cast", data = "<request>", format = "json")]
async fn cast_vote(
    vote_id: &str,
    request: Json<CastVoteRequest>,
    caller: CallerContext,
    votes: &State<Arc<VotingStore>>,
) -> Result<Json<ApiResponse<CastReceipt>>> {
    let receipt = votes.cast(vote_id, &caller, request.0).await?;
    Ok(Json(ApiResponse::ok(receipt).with_message("Vote recorded")))
}

#[get("/votes/<vote_id>/results")]
async fn vote_results(
    vote_id: &str,
    votes: &State<Arc<VotingStore>>,
) -> Result<Json<ApiResponse<VoteResults>>> {
    Ok(Json(ApiResponse::ok(votes.results(vote_id).await?)))
}

#[get("/votes/<vote_id>/eligibility")]
async fn vote_eligibility(
    vote_id: &str,
    caller: CallerContext,
    votes: &State<Arc<VotingStore>>,
) -> Result<Json<ApiResponse<Eligibility>>> {
    Ok(Json(ApiResponse::ok(
        votes.eligibility(vote_id, &caller).await?,
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use rocket::{
        http::{ContentType, Header, Status},
        local::asynchronous::{Client, LocalRequest},
        serde::json::serde_json::json,
    };

    use crate::clock::FixedClock;
    use crate::model::{api::ErrorBody, Stores};

    use super::*;

    const TRUSTED_BADGES: &str =
        r#"[{"id": "b-1", "category": "community", "name": "Közösségépítő"}]"#;
    const REPRESENTATIVE_BADGES: &str =
        r#"[{"id": "representative", "category": "role", "name": "Képviselő"}]"#;

    fn as_user<'c>(request: LocalRequest<'c>, user_id: &str, badges: &str) -> LocalRequest<'c> {
        request
            .header(Header::new("x-user-id", user_id.to_string()))
            .header(Header::new("x-user-badges", badges.to_string()))
    }

    async fn cast(client: &Client, user_id: &str, badges: &str, vote_id: &str, option_id: &str) -> Status {
        let request = client
            .post(format!("/api/votes/{vote_id}/cast"))
            .header(ContentType::JSON)
            .body(json!({ "optionId": option_id }).to_string());
        as_user(request, user_id, badges).dispatch().await.status()
    }

    #[backend_test]
    async fn list_respects_trust(client: Client) {
        let response = client.get("/api/votes").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body = response
            .into_json::<ApiResponse<Vec<VoteView>>>()
            .await
            .unwrap();
        let meta = body.meta.unwrap();
        assert_eq!(meta.count, 2);
        assert_eq!(meta.user_is_trusted, Some(false));

        let request = as_user(client.get("/api/votes?status=active"), "u-1", TRUSTED_BADGES);
        let body = request
            .dispatch()
            .await
            .into_json::<ApiResponse<Vec<VoteView>>>()
            .await
            .unwrap();
        let ids: Vec<_> = body.data.unwrap().into_iter().map(|v| v.vote.id).collect();
        assert_eq!(ids, ["vote-2", "vote-1"]);
        assert_eq!(body.meta.unwrap().user_is_trusted, Some(true));

        let request = as_user(client.get("/api/votes?status=bogus"), "u-1", TRUSTED_BADGES);
        let response = request.dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body = response
            .into_json::<ApiResponse<Vec<VoteView>>>()
            .await
            .unwrap();
        assert!(body.data.unwrap().is_empty());
        assert_eq!(body.meta.unwrap().count, 0);
    }

    #[backend_test]
    async fn trusted_vote_is_forbidden(client: Client) {
        let response = client.get("/api/votes/vote-2").dispatch().await;
        assert_eq!(response.status(), Status::Forbidden);
        let body = response.into_json::<ErrorBody>().await.unwrap();
        assert_eq!(body.required_trust, Some(true));

        let response = as_user(client.get("/api/votes/vote-2"), "u-1", TRUSTED_BADGES)
            .dispatch()
            .await;
        let detail = response
            .into_json::<ApiResponse<VoteDetail>>()
            .await
            .unwrap()
            .data
            .unwrap();
        assert!(detail.can_vote);
        assert!(detail.user_is_trusted);
        assert_eq!(detail.vote.status, VoteStatus::Active);
    }

    #[backend_test]
    async fn second_ballot_is_rejected(client: Client) {
        assert_eq!(cast(&client, "u-7", "[]", "vote-1", "opt-3").await, Status::Ok);

        let request = client
            .post("/api/votes/vote-1/cast")
            .header(ContentType::JSON)
            .body(json!({ "optionId": "opt-1" }).to_string());
        let response = as_user(request, "u-7", "[]").dispatch().await;
        assert_eq!(response.status(), Status::BadRequest);
        let body = response.into_json::<ErrorBody>().await.unwrap();
        assert_eq!(body.existing_vote.as_deref(), Some("opt-3"));

        let response = as_user(client.get("/api/votes/vote-1"), "u-7", "[]")
            .dispatch()
            .await;
        let detail = response
            .into_json::<ApiResponse<VoteDetail>>()
            .await
            .unwrap()
            .data
            .unwrap();
        assert_eq!(detail.my_vote.as_deref(), Some("opt-3"));
        assert!(!detail.can_vote);
    }

    #[rocket::async_test]
    async fn no_ballots_after_close() {
        let clock = Arc::new(FixedClock::new(Stores::example_time()));
        let stores = Stores::example_with_clock(clock.clone());
        let client = Client::tracked(crate::rocket_for_stores(stores))
            .await
            .unwrap();

        // Exactly at the end of vote-1.
        clock.set("2024-12-31T23:59:59Z".parse().unwrap());
        assert_eq!(cast(&client, "u-1", "[]", "vote-1", "opt-1").await, Status::BadRequest);

        clock.set(Stores::example_time() - Duration::days(30));
        assert_eq!(cast(&client, "u-1", "[]", "vote-1", "opt-1").await, Status::BadRequest);

        clock.set(Stores::example_time());
        assert_eq!(cast(&client, "u-1", "[]", "vote-1", "opt-1").await, Status::Ok);
        assert_eq!(cast(&client, "u-2", "[]", "vote-3", "opt-1").await, Status::BadRequest);
    }

    #[backend_test]
    async fn body_badges_decide_trust(client: Client) {
        assert_eq!(cast(&client, "u-3", "[]", "vote-2", "opt-1").await, Status::Forbidden);

        let request = client
            .post("/api/votes/vote-2/cast")
            .header(ContentType::JSON)
            .body(
                json!({
                    "optionId": "opt-1",
                    "userBadges": [{ "id": "b", "category": "ACTIVITY", "name": "Aktív" }],
                })
                .to_string(),
            );
        let response = as_user(request, "u-3", "[]").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let receipt = response
            .into_json::<ApiResponse<CastReceipt>>()
            .await
            .unwrap()
            .data
            .unwrap();
        assert!(receipt.is_trusted_vote);
        assert_eq!(receipt.option_id, "opt-1");
    }

    #[backend_test]
    async fn results_and_eligibility(client: Client) {
        let response = client.get("/api/votes/vote-1/results").dispatch().await;
        let results = response
            .into_json::<ApiResponse<VoteResults>>()
            .await
            .unwrap()
            .data
            .unwrap();
        let shares: Vec<_> = results.options.iter().map(|o| o.percentage).collect();
        assert_eq!(shares, [35, 48, 17]);
        assert_eq!(results.summary.total_votes, 120);

        let response = client.get("/api/votes/vote-2/eligibility").dispatch().await;
        let eligibility = response
            .into_json::<ApiResponse<Eligibility>>()
            .await
            .unwrap()
            .data
            .unwrap();
        assert!(!eligibility.can_vote);
        assert!(eligibility.reason.is_some());

        let response = client.get("/api/votes/vote-9/results").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[backend_test]
    async fn create(client: Client) {
        let body = json!({
            "title": "Új zebra a Fő utcán",
            "description": "Kell-e gyalogátkelő az iskola elé?",
            "options": ["Igen", "Nem"],
            "eligibilityType": "trusted",
            "startsAt": "2024-12-10T00:00:00Z",
            "endsAt": "2024-12-24T00:00:00Z",
            "constituencyId": "budapest-01",
        })
        .to_string();

        let request = client
            .post("/api/votes")
            .header(ContentType::JSON)
            .body(body.clone());
        let response = as_user(request, "u-1", TRUSTED_BADGES).dispatch().await;
        assert_eq!(response.status(), Status::Forbidden);
        let error = response.into_json::<ErrorBody>().await.unwrap();
        assert_eq!(error.required_badge.as_deref(), Some("representative"));

        let request = client
            .post("/api/votes")
            .header(ContentType::JSON)
            .body(body);
        let response = as_user(request, "rep-2", REPRESENTATIVE_BADGES)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        let created = response
            .into_json::<ApiResponse<VoteView>>()
            .await
            .unwrap();
        assert!(created.message.is_some());
        let vote = created.data.unwrap();
        assert_eq!(vote.status, VoteStatus::Active);
        assert_eq!(vote.vote.options[1].id, "opt-2");
        assert_eq!(vote.vote.created_by, "rep-2");

        let too_few = json!({
            "title": "Egy opció",
            "description": "Csak egy választás",
            "options": ["Igen"],
            "startsAt": "2024-12-10T00:00:00Z",
            "endsAt": "2024-12-24T00:00:00Z",
        })
        .to_string();
        let request = client
            .post("/api/votes")
            .header(ContentType::JSON)
            .body(too_few);
        let response = as_user(request, "rep-2", REPRESENTATIVE_BADGES)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
    }
}
