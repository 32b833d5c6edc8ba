//! Marketplace routes. Unlike the rest of the API, successful responses are
//! the bare resource, without the `ApiResponse` envelope.

use std::sync::Arc;

use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::ApiResponse,
    caller::CallerContext,
    marketplace::{
        CategoryStat, CityMarketStats, ConstituencyMarketStats, CreateListingRequest,
        CreateTransactionRequest, ListingsQuery, ListingsResponse, MarketOverview,
        MarketplaceListing, MarketplaceStore, MarketplaceTransaction, RateTransactionRequest,
        TransactionsQuery, UpdateListingRequest,
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        list_listings,
        get_listing,
        create_listing,
        update_listing,
        delete_listing,
        create_transaction,
        list_transactions,
        rate_transaction,
        city_stats,
        constituency_stats,
        overview_stats,
        categories,
    ]
}

type Market = State<Arc<MarketplaceStore>>;

#[get("/marketplace/listings?<query..>")]
async fn list_listings(query: ListingsQuery, market: &Market) -> Json<ListingsResponse> {
    Json(market.listings(&query).await)
}

#[get("/marketplace/listings/<listing_id>")]
async fn get_listing(listing_id: &str, market: &Market) -> Result<Json<MarketplaceListing>> {
    Ok(Json(market.view_listing(listing_id).await?))
}

#[post("/marketplace/listings", data = "<request>", format = "json")]
async fn create_listing(
    request: Json<CreateListingRequest>,
    caller: CallerContext,
    market: &Market,
) -> Result<(Status, Json<MarketplaceListing>)> {
    let listing = market.create_listing(&caller, request.0).await?;
    Ok((Status::Created, Json(listing)))
}

#[patch("/marketplace/listings/<listing_id>", data = "<update>", format = "json")]
async fn update_listing(
    listing_id: &str,
    update: Json<UpdateListingRequest>,
    market: &Market,
) -> Result<Json<MarketplaceListing>> {
    Ok(Json(market.update_listing(listing_id, update.0).await?))
}

#[delete("/marketplace/listings/<listing_id>")]
async fn delete_listing(listing_id: &str, market: &Market) -> Result<Json<ApiResponse<()>>> {
    market.delete_listing(listing_id).await?;
    Ok(Json(ApiResponse::done("Listing deleted")))
}

#[post("/marketplace/transactions", data = "<request>", format = "json")]
async fn create_transaction(
    request: Json<CreateTransactionRequest>,
    caller: CallerContext,
    market: &Market,
) -> Result<(Status, Json<MarketplaceTransaction>)> {
    let transaction = market.create_transaction(&caller, request.0).await?;
    Ok((Status::Created, Json(transaction)))
}

#[get("/marketplace/transactions?<query..>")]
async fn list_transactions(
    query: TransactionsQuery,
    market: &Market,
) -> Json<Vec<MarketplaceTransaction>> {
    Json(market.transactions(&query).await)
}

#[patch("/marketplace/transactions/<transaction_id>/rate", data = "<request>", format = "json")]
async fn rate_transaction(
    transaction_id: &str,
    request: Json<RateTransactionRequest>,
    market: &Market,
) -> Result<Json<MarketplaceTransaction>> {
    Ok(Json(
        market.rate_transaction(transaction_id, request.0).await?,
    ))
}

#[get("/marketplace/stats/city/<city_id>")]
async fn city_stats(city_id: &str, market: &Market) -> Json<CityMarketStats> {
    Json(market.city_stats(city_id).await)
}

#[get("/marketplace/stats/constituency/<constituency_id>")]
async fn constituency_stats(constituency_id: &str, market: &Market) -> Json<ConstituencyMarketStats> {
    Json(market.constituency_stats(constituency_id).await)
}

#[get("/marketplace/stats/overview")]
async fn overview_stats(market: &Market) -> Json<MarketOverview> {
    Json(market.overview().await)
}

#[get("/marketplace/categories")]
async fn categories(market: &Market) -> Json<Vec<CategoryStat>> {
    Json(market.category_stats().await)
}
