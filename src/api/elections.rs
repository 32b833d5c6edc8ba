use std::path::Path;
use std::sync::Arc;

use rocket::{serde::json::Json, Route, State};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::{ApiResponse, Meta},
    election::{
        find_settlement, rank_by_party, region_summaries, settlement_results, ElectionDataSet,
        ElectionStore, ElectionSummary, PartyVotingResult, RankingQuery, RegionSummary,
        ResultsQuery, SettlementElectionData, SettlementRank,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        list_elections,
        get_election,
        election_results,
        results_by_party,
        get_settlement,
        election_regions,
        election_parties,
        import_election,
    ]
}

#[get("/elections")]
async fn list_elections(
    elections: &State<Arc<ElectionStore>>,
) -> Json<ApiResponse<Vec<ElectionSummary>>> {
    let list = elections.list().await;
    let meta = Meta::count(list.len());
    Json(ApiResponse::ok(list).with_meta(meta))
}

#[get("/elections/<election_id>")]
async fn get_election(
    election_id: &str,
    elections: &State<Arc<ElectionStore>>,
) -> Result<Json<ApiResponse<Arc<ElectionDataSet>>>> {
    let dataset = elections.get(election_id).await?;
    Ok(Json(ApiResponse::ok(dataset)))
}

#[get("/elections/<election_id>/results?<query..>")]
async fn election_results(
    election_id: &str,
    query: ResultsQuery,
    elections: &State<Arc<ElectionStore>>,
) -> Result<Json<ApiResponse<Vec<SettlementElectionData>>>> {
    let dataset = elections.get(election_id).await?;
    let page = settlement_results(&dataset, &query);
    let meta = Meta::count(page.items.len())
        .window(page.limit, page.offset)
        .total(page.total);
    Ok(Json(ApiResponse::ok(page.items).with_meta(meta)))
}

#[get("/elections/<election_id>/by-party/<party_id>?<query..>")]
async fn results_by_party(
    election_id: &str,
    party_id: &str,
    query: RankingQuery,
    elections: &State<Arc<ElectionStore>>,
) -> Result<Json<ApiResponse<Vec<SettlementRank>>>> {
    let dataset = elections.get(election_id).await?;
    let (ranking, total) = rank_by_party(&dataset, party_id, &query);
    let meta = Meta::count(ranking.len()).total(total);
    Ok(Json(ApiResponse::ok(ranking).with_meta(meta)))
}

#[get("/elections/<election_id>/settlements/<settlement_id>")]
async fn get_settlement(
    election_id: &str,
    settlement_id: &str,
    elections: &State<Arc<ElectionStore>>,
) -> Result<Json<ApiResponse<SettlementElectionData>>> {
    let dataset = elections.get(election_id).await?;
    let settlement = find_settlement(&dataset, settlement_id)
        .cloned()
        .ok_or_else(|| Error::not_found("Settlement", settlement_id))?;
    Ok(Json(ApiResponse::ok(settlement)))
}

#[get("/elections/<election_id>/regions")]
async fn election_regions(
    election_id: &str,
    elections: &State<Arc<ElectionStore>>,
) -> Result<Json<ApiResponse<Vec<RegionSummary>>>> {
    let dataset = elections.get(election_id).await?;
    let regions = region_summaries(&dataset);
    let meta = Meta::count(regions.len());
    Ok(Json(ApiResponse::ok(regions).with_meta(meta)))
}

#[get("/elections/<election_id>/parties")]
async fn election_parties(
    election_id: &str,
    elections: &State<Arc<ElectionStore>>,
) -> Result<Json<ApiResponse<Vec<PartyVotingResult>>>> {
    let dataset = elections.get(election_id).await?;
    let parties = dataset.national_party_results.clone();
    let meta = Meta::count(parties.len());
    Ok(Json(ApiResponse::ok(parties).with_meta(meta)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportRequest {
    #[serde(default)]
    file_path: String,
    #[serde(default)]
    election_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Imported {
    election_id: String,
}

#[post("/elections/import", data = "<request>", format = "json")]
async fn import_election(
    request: Json<ImportRequest>,
    elections: &State<Arc<ElectionStore>>,
) -> Result<Json<ApiResponse<Imported>>> {
    let ImportRequest {
        file_path,
        election_id,
    } = request.0;
    if file_path.is_empty() || election_id.is_empty() {
        return Err(Error::bad_request(
            "Missing required fields: filePath, electionId",
        ));
    }

    elections
        .import_file(Path::new(&file_path), &election_id)
        .await?;
    Ok(Json(ApiResponse::ok(Imported { election_id })))
}
