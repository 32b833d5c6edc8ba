use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, FromFormField,
)]
#[serde(rename_all = "snake_case")]
pub enum ListingCategory {
    #[field(value = "garden_produce")]
    GardenProduce,
    #[field(value = "homemade_goods")]
    HomemadeGoods,
    #[field(value = "plants")]
    Plants,
    #[field(value = "eggs_dairy")]
    EggsDairy,
    #[field(value = "meat")]
    Meat,
    #[field(value = "honey")]
    Honey,
    #[field(value = "tools")]
    Tools,
    #[field(value = "secondhand")]
    Secondhand,
    #[field(value = "clothing")]
    Clothing,
    #[field(value = "services")]
    Services,
    #[field(value = "childcare")]
    Childcare,
    #[field(value = "tutoring")]
    Tutoring,
}

impl ListingCategory {
    /// Human-readable (Hungarian) name.
    pub fn label(self) -> &'static str {
        match self {
            Self::GardenProduce => "Kerti termények",
            Self::HomemadeGoods => "Házi készítésű",
            Self::Plants => "Növények, palánták",
            Self::EggsDairy => "Tojás, tejtermékek",
            Self::Meat => "Hús, baromfi",
            Self::Honey => "Méz, méhészet",
            Self::Tools => "Szerszámok, gépek",
            Self::Secondhand => "Használt cikkek",
            Self::Clothing => "Ruházat, textil",
            Self::Services => "Szolgáltatások",
            Self::Childcare => "Gyermekfelügyelet",
            Self::Tutoring => "Korrepetálás",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    #[field(value = "sell")]
    Sell,
    #[field(value = "trade")]
    Trade,
    #[field(value = "give_away")]
    GiveAway,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    #[field(value = "active")]
    Active,
    #[field(value = "reserved")]
    Reserved,
    #[field(value = "sold")]
    Sold,
    #[field(value = "expired")]
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingUnit {
    #[serde(rename = "kg")]
    Kg,
    #[serde(rename = "g")]
    G,
    #[serde(rename = "dkg")]
    Dkg,
    #[serde(rename = "l")]
    L,
    #[serde(rename = "dl")]
    Dl,
    #[serde(rename = "ml")]
    Ml,
    #[serde(rename = "db")]
    Db,
    #[serde(rename = "csomag")]
    Csomag,
    #[serde(rename = "doboz")]
    Doboz,
    #[serde(rename = "zsák")]
    Zsak,
    #[serde(rename = "üveg")]
    Uveg,
    #[serde(rename = "köteg")]
    Koteg,
    #[serde(rename = "tálca")]
    Talca,
    #[serde(rename = "óra")]
    Ora,
    #[serde(rename = "alkalom")]
    Alkalom,
}

/// `turul_pont` is a community point currency with no exchange behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "HUF")]
    Huf,
    #[serde(rename = "turul_pont")]
    TurulPont,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOption {
    Pickup,
    LocalDelivery,
    Shipping,
}

/// A snapshot of the seller, taken when the listing was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerInfo {
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub trust_level: u8,
    pub member_since: NaiveDate,
    pub completed_transactions: u32,
    pub rating: f64,
    #[serde(default)]
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingLocation {
    pub city_id: String,
    pub city_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constituency_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constituency_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceListing {
    pub id: String,
    pub seller: SellerInfo,
    pub title: String,
    pub description: String,
    pub category: ListingCategory,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub status: ListingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_for: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Remaining stock, in `unit`s.
    pub quantity: u32,
    pub unit: ListingUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_organic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_date: Option<NaiveDate>,
    pub location: ListingLocation,
    #[serde(default)]
    pub delivery_options: Vec<DeliveryOption>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Informational; listings are not expired automatically.
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub view_count: u32,
    #[serde(default)]
    pub favorite_count: u32,
    #[serde(default)]
    pub inquiry_count: u32,
}

impl MarketplaceListing {
    /// The price, if the listing has a positive one.
    pub fn positive_price(&self) -> Option<u32> {
        self.price.filter(|&p| p > 0)
    }
}

pub const DEFAULT_LISTING_LIFETIME_DAYS: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: ListingCategory,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub trade_for: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub quantity: u32,
    pub unit: ListingUnit,
    #[serde(default)]
    pub is_organic: Option<bool>,
    #[serde(default)]
    pub harvest_date: Option<NaiveDate>,
    pub city_id: String,
    #[serde(default)]
    pub delivery_options: Vec<DeliveryOption>,
    #[serde(default)]
    pub expires_in_days: Option<u32>,
}

impl CreateListingRequest {
    pub(super) fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err("Missing required fields: title, description");
        }
        if self.quantity == 0 {
            return Err("Quantity must be at least 1");
        }
        if self.city_id.trim().is_empty() {
            return Err("Missing required field: cityId");
        }
        Ok(())
    }
}

/// A partial update; absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub status: Option<ListingStatus>,
    #[serde(default)]
    pub trade_for: Option<String>,
}

impl UpdateListingRequest {
    pub(super) fn validate(&self) -> Result<(), &'static str> {
        let blank = |s: &Option<String>| s.as_deref().map_or(false, |s| s.trim().is_empty());
        if blank(&self.title) || blank(&self.description) {
            return Err("Title and description cannot be empty");
        }
        Ok(())
    }

    pub(super) fn apply(self, listing: &mut MarketplaceListing, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            listing.title = title;
        }
        if let Some(description) = self.description {
            listing.description = description;
        }
        if let Some(price) = self.price {
            listing.price = Some(price);
        }
        if let Some(quantity) = self.quantity {
            listing.quantity = quantity;
        }
        if let Some(status) = self.status {
            listing.status = status;
        }
        if let Some(trade_for) = self.trade_for {
            listing.trade_for = Some(trade_for);
        }
        listing.updated_at = now;
    }
}
