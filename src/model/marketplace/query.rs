use serde::{Deserialize, Serialize};

use super::{ListingCategory, ListingStatus, ListingType, MarketplaceListing, MarketplaceTransaction};
use crate::model::api::Filter;

pub const DEFAULT_LISTINGS_LIMIT: usize = 50;
pub const DEFAULT_TRANSACTIONS_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromFormField)]
pub enum SortBy {
    #[default]
    #[field(value = "newest")]
    Newest,
    #[field(value = "price_asc")]
    PriceAsc,
    #[field(value = "price_desc")]
    PriceDesc,
    #[field(value = "popularity")]
    Popularity,
}

/// Query string of the listing search.
///
/// Unknown category, type or status values match no listing. Numbers that
/// fail to parse are ignored.
#[derive(Debug, Clone, Default, FromForm)]
pub struct ListingsQuery {
    pub category: Option<Filter<ListingCategory>>,
    #[field(name = "type")]
    pub listing_type: Option<Filter<ListingType>>,
    /// Defaults to active listings.
    pub status: Option<Filter<ListingStatus>>,
    #[field(name = "cityId")]
    pub city_id: Option<String>,
    #[field(name = "constituencyId")]
    pub constituency_id: Option<String>,
    #[field(name = "sellerId")]
    pub seller_id: Option<String>,
    pub search: Option<String>,
    #[field(name = "minPrice")]
    pub min_price: Option<u32>,
    #[field(name = "maxPrice")]
    pub max_price: Option<u32>,
    #[field(name = "isOrganic")]
    pub is_organic: Option<bool>,
    #[field(name = "sortBy")]
    pub sort_by: Option<SortBy>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListingsQuery {
    fn matches(&self, listing: &MarketplaceListing, search: Option<&str>) -> bool {
        fn eq_if_set<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
            wanted.as_ref().map_or(true, |w| w == actual)
        }
        fn filter_if_set<T: PartialEq>(wanted: &Option<Filter<T>>, actual: &T) -> bool {
            wanted.as_ref().map_or(true, |w| w.matches(actual))
        }

        let status = self
            .status
            .unwrap_or_else(|| Filter::Is(ListingStatus::default()));
        if !status.matches(&listing.status)
            || !filter_if_set(&self.category, &listing.category)
            || !filter_if_set(&self.listing_type, &listing.listing_type)
            || !eq_if_set(&self.city_id, &listing.location.city_id)
            || !eq_if_set(&self.seller_id, &listing.seller.user_id)
        {
            return false;
        }
        if let Some(constituency_id) = &self.constituency_id {
            if listing.location.constituency_id.as_ref() != Some(constituency_id) {
                return false;
            }
        }
        if let Some(search) = search {
            if !listing.title.to_lowercase().contains(search)
                && !listing.description.to_lowercase().contains(search)
            {
                return false;
            }
        }
        // Unpriced listings never satisfy a price bound.
        if self.min_price.is_some() || self.max_price.is_some() {
            let Some(price) = listing.positive_price() else {
                return false;
            };
            if self.min_price.map_or(false, |min| price < min)
                || self.max_price.map_or(false, |max| price > max)
            {
                return false;
            }
        }
        if self.is_organic == Some(true) && listing.is_organic != Some(true) {
            return false;
        }
        true
    }

    /// Filter, sort and slice the given listings.
    pub fn apply<'a>(
        &self,
        listings: impl Iterator<Item = &'a MarketplaceListing>,
    ) -> ListingsResponse {
        let search = self
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let mut found: Vec<&MarketplaceListing> = listings
            .filter(|l| self.matches(l, search.as_deref()))
            .collect();

        match self.sort_by.unwrap_or_default() {
            SortBy::Newest => found.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortBy::PriceAsc => found.sort_by_key(|l| l.price.unwrap_or(0)),
            SortBy::PriceDesc => found.sort_by(|a, b| b.price.unwrap_or(0).cmp(&a.price.unwrap_or(0))),
            SortBy::Popularity => found.sort_by(|a, b| b.view_count.cmp(&a.view_count)),
        }

        let total = found.len();
        let limit = self.limit.filter(|&l| l > 0).unwrap_or(DEFAULT_LISTINGS_LIMIT);
        let offset = self.offset.unwrap_or(0);
        ListingsResponse {
            listings: found.into_iter().skip(offset).take(limit).cloned().collect(),
            total,
            limit,
            offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingsResponse {
    pub listings: Vec<MarketplaceListing>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Default, FromForm)]
pub struct TransactionsQuery {
    /// Matches either party.
    #[field(name = "userId")]
    pub user_id: Option<String>,
    #[field(name = "cityId")]
    pub city_id: Option<String>,
    #[field(name = "constituencyId")]
    pub constituency_id: Option<String>,
    pub limit: Option<usize>,
}

impl TransactionsQuery {
    /// Matching transactions, most recent first.
    pub fn apply<'a>(
        &self,
        transactions: impl Iterator<Item = &'a MarketplaceTransaction>,
    ) -> Vec<MarketplaceTransaction> {
        let mut found: Vec<&MarketplaceTransaction> = transactions
            .filter(|t| self.user_id.as_ref().map_or(true, |u| t.involves(u)))
            .filter(|t| self.city_id.as_ref().map_or(true, |c| &t.location.city_id == c))
            .filter(|t| {
                self.constituency_id
                    .as_ref()
                    .map_or(true, |c| t.location.constituency_id.as_ref() == Some(c))
            })
            .collect();
        found.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));

        let limit = self.limit.unwrap_or(DEFAULT_TRANSACTIONS_LIMIT);
        found.into_iter().take(limit).cloned().collect()
    }
}
