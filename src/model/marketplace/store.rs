use std::collections::HashMap;

use chrono::Duration;
use rocket::tokio::sync::RwLock;

use super::{
    category_stats, city_stats, constituency_stats, overview, CategoryStat, CityMarketStats,
    ConstituencyMarketStats, CreateListingRequest, CreateTransactionRequest, Directory,
    ListingStatus, ListingsQuery, ListingsResponse, MarketOverview, MarketplaceListing,
    MarketplaceSeed, MarketplaceTransaction, RateTransactionRequest, SellerInfo,
    TransactionsQuery, UpdateListingRequest, DEFAULT_LISTING_LIFETIME_DAYS,
};
use crate::clock::SharedClock;
use crate::error::{Error, Result};
use crate::model::{caller::CallerContext, id::generate_id};

#[derive(Debug, Default)]
struct MarketState {
    listings: HashMap<String, MarketplaceListing>,
    transactions: HashMap<String, MarketplaceTransaction>,
}

pub struct MarketplaceStore {
    clock: SharedClock,
    directory: Directory,
    state: RwLock<MarketState>,
}

impl MarketplaceStore {
    /// An empty marketplace that knows no sellers or cities.
    pub fn new(clock: SharedClock) -> Self {
        Self::from_seed(clock, MarketplaceSeed::default())
    }

    pub fn from_seed(clock: SharedClock, seed: MarketplaceSeed) -> Self {
        let directory = Directory::new(seed.sellers, seed.cities, seed.constituencies);
        let state = MarketState {
            listings: seed
                .listings
                .into_iter()
                .map(|l| (l.id.clone(), l))
                .collect(),
            transactions: seed
                .transactions
                .into_iter()
                .map(|t| (t.id.clone(), t))
                .collect(),
        };
        Self {
            clock,
            directory,
            state: RwLock::new(state),
        }
    }

    pub async fn listings(&self, query: &ListingsQuery) -> ListingsResponse {
        query.apply(self.state.read().await.listings.values())
    }

    /// Fetch a listing, counting the view.
    pub async fn view_listing(&self, listing_id: &str) -> Result<MarketplaceListing> {
        let mut state = self.state.write().await;
        let listing = state
            .listings
            .get_mut(listing_id)
            .ok_or_else(|| Error::not_found("Listing", listing_id))?;
        listing.view_count += 1;
        Ok(listing.clone())
    }

    fn seller_for(&self, caller: &CallerContext) -> SellerInfo {
        if let Some(seller) = self.directory.seller(&caller.user_id) {
            return seller.clone();
        }
        SellerInfo {
            user_id: caller.user_id.clone(),
            user_name: caller.user_name.clone(),
            avatar_url: None,
            trust_level: u8::from(caller.is_trusted()),
            member_since: self.clock.now().date_naive(),
            completed_transactions: 0,
            rating: 0.0,
            badges: caller.badges.iter().map(|b| b.id.clone()).collect(),
        }
    }

    pub async fn create_listing(
        &self,
        caller: &CallerContext,
        request: CreateListingRequest,
    ) -> Result<MarketplaceListing> {
        request.validate().map_err(Error::bad_request)?;

        let now = self.clock.now();
        let lifetime = request
            .expires_in_days
            .unwrap_or(DEFAULT_LISTING_LIFETIME_DAYS);
        let listing = MarketplaceListing {
            id: generate_id("listing", now),
            seller: self.seller_for(caller),
            location: self.directory.location(&request.city_id),
            title: request.title,
            description: request.description,
            category: request.category,
            listing_type: request.listing_type,
            status: ListingStatus::Active,
            price: request.price,
            currency: request.currency,
            trade_for: request.trade_for,
            images: request.images,
            quantity: request.quantity,
            unit: request.unit,
            is_organic: request.is_organic,
            harvest_date: request.harvest_date,
            delivery_options: request.delivery_options,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(i64::from(lifetime)),
            view_count: 0,
            favorite_count: 0,
            inquiry_count: 0,
        };
        info!("{} listed {} ({})", caller.user_id, listing.id, listing.title);

        self.state
            .write()
            .await
            .listings
            .insert(listing.id.clone(), listing.clone());
        Ok(listing)
    }

    pub async fn update_listing(
        &self,
        listing_id: &str,
        update: UpdateListingRequest,
    ) -> Result<MarketplaceListing> {
        update.validate().map_err(Error::bad_request)?;
        let now = self.clock.now();
        let mut state = self.state.write().await;
        let listing = state
            .listings
            .get_mut(listing_id)
            .ok_or_else(|| Error::not_found("Listing", listing_id))?;
        update.apply(listing, now);
        Ok(listing.clone())
    }

    pub async fn delete_listing(&self, listing_id: &str) -> Result<()> {
        self.state
            .write()
            .await
            .listings
            .remove(listing_id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("Listing", listing_id))
    }

    /// Take `quantity` units from an active listing.
    ///
    /// A listing whose stock runs out is marked sold.
    pub async fn create_transaction(
        &self,
        caller: &CallerContext,
        request: CreateTransactionRequest,
    ) -> Result<MarketplaceTransaction> {
        let now = self.clock.now();
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let listing = state
            .listings
            .get_mut(&request.listing_id)
            .ok_or_else(|| Error::not_found("Listing", &request.listing_id))?;
        if listing.status != ListingStatus::Active {
            return Err(Error::bad_request("Listing is not available"));
        }
        if request.quantity == 0 || request.quantity > listing.quantity {
            return Err(Error::bad_request(format!(
                "Quantity must be between 1 and {}",
                listing.quantity
            )));
        }

        let transaction = MarketplaceTransaction {
            id: generate_id("trans", now),
            listing_id: listing.id.clone(),
            seller_id: listing.seller.user_id.clone(),
            buyer_id: request.buyer_id.unwrap_or_else(|| caller.user_id.clone()),
            listing_type: listing.listing_type,
            category: listing.category,
            amount: listing
                .price
                .map(|price| u64::from(price) * u64::from(request.quantity)),
            currency: listing.currency,
            quantity: request.quantity,
            unit: listing.unit,
            completed_at: now,
            rating: None,
            review: None,
            location: listing.location.clone(),
        };

        listing.quantity -= request.quantity;
        if listing.quantity == 0 {
            listing.status = ListingStatus::Sold;
        }
        listing.updated_at = now;
        info!(
            "{} took {} from {} ({} left)",
            transaction.buyer_id, transaction.quantity, listing.id, listing.quantity
        );

        state
            .transactions
            .insert(transaction.id.clone(), transaction.clone());
        Ok(transaction)
    }

    pub async fn transactions(&self, query: &TransactionsQuery) -> Vec<MarketplaceTransaction> {
        query.apply(self.state.read().await.transactions.values())
    }

    pub async fn rate_transaction(
        &self,
        transaction_id: &str,
        request: RateTransactionRequest,
    ) -> Result<MarketplaceTransaction> {
        let mut state = self.state.write().await;
        let transaction = state
            .transactions
            .get_mut(transaction_id)
            .ok_or_else(|| Error::not_found("Transaction", transaction_id))?;
        request.validate().map_err(Error::BadRequest)?;
        transaction.rating = Some(request.rating);
        transaction.review = request.review;
        Ok(transaction.clone())
    }

    pub async fn category_stats(&self) -> Vec<CategoryStat> {
        let state = self.state.read().await;
        category_stats(state.listings.values(), state.transactions.values())
    }

    pub async fn city_stats(&self, city_id: &str) -> CityMarketStats {
        let state = self.state.read().await;
        let (listings, transactions) = state.snapshot();
        city_stats(city_id, &self.directory, &listings, &transactions, self.clock.now())
    }

    pub async fn constituency_stats(&self, constituency_id: &str) -> ConstituencyMarketStats {
        let state = self.state.read().await;
        let (listings, transactions) = state.snapshot();
        constituency_stats(
            constituency_id,
            &self.directory,
            &listings,
            &transactions,
            self.clock.now(),
        )
    }

    pub async fn overview(&self) -> MarketOverview {
        let state = self.state.read().await;
        let (listings, transactions) = state.snapshot();
        overview(&listings, &transactions, self.clock.now())
    }
}

impl MarketState {
    fn snapshot(&self) -> (Vec<&MarketplaceListing>, Vec<&MarketplaceTransaction>) {
        (
            self.listings.values().collect(),
            self.transactions.values().collect(),
        )
    }
}
