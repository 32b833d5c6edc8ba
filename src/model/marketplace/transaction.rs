use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Currency, ListingCategory, ListingLocation, ListingType, ListingUnit};

/// A completed purchase, trade or give-away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceTransaction {
    pub id: String,
    pub listing_id: String,
    pub seller_id: String,
    pub buyer_id: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub category: ListingCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    pub quantity: u32,
    pub unit: ListingUnit,
    pub completed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    pub location: ListingLocation,
}

impl MarketplaceTransaction {
    pub fn involves(&self, user_id: &str) -> bool {
        self.seller_id == user_id || self.buyer_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub listing_id: String,
    /// Defaults to the caller.
    #[serde(default)]
    pub buyer_id: Option<String>,
    pub quantity: u32,
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTransactionRequest {
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
}

impl RateTransactionRequest {
    pub(super) fn validate(&self) -> Result<(), String> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            ));
        }
        Ok(())
    }
}
