use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ListingLocation, MarketplaceListing, MarketplaceTransaction, SellerInfo};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub city_id: String,
    pub city_name: String,
    pub constituency_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constituency {
    pub constituency_id: String,
    pub constituency_name: String,
}

/// Known sellers, cities and constituencies. Fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    sellers: HashMap<String, SellerInfo>,
    cities: HashMap<String, City>,
    constituencies: HashMap<String, Constituency>,
}

impl Directory {
    pub fn new(
        sellers: Vec<SellerInfo>,
        cities: Vec<City>,
        constituencies: Vec<Constituency>,
    ) -> Self {
        Self {
            sellers: sellers.into_iter().map(|s| (s.user_id.clone(), s)).collect(),
            cities: cities.into_iter().map(|c| (c.city_id.clone(), c)).collect(),
            constituencies: constituencies
                .into_iter()
                .map(|c| (c.constituency_id.clone(), c))
                .collect(),
        }
    }

    pub fn seller(&self, user_id: &str) -> Option<&SellerInfo> {
        self.sellers.get(user_id)
    }

    pub fn city(&self, city_id: &str) -> Option<&City> {
        self.cities.get(city_id)
    }

    pub fn city_name<'a>(&'a self, city_id: &'a str) -> &'a str {
        self.city(city_id).map_or(city_id, |c| c.city_name.as_str())
    }

    pub fn constituency_name<'a>(&'a self, constituency_id: &'a str) -> &'a str {
        self.constituencies
            .get(constituency_id)
            .map_or(constituency_id, |c| c.constituency_name.as_str())
    }

    /// Where a listing in the given city is. Unknown cities are named by
    /// their id and belong to no constituency.
    pub fn location(&self, city_id: &str) -> ListingLocation {
        match self.city(city_id) {
            Some(city) => ListingLocation {
                city_id: city.city_id.clone(),
                city_name: city.city_name.clone(),
                constituency_id: Some(city.constituency_id.clone()),
                constituency_name: Some(self.constituency_name(&city.constituency_id).to_string()),
                coordinates: None,
            },
            None => ListingLocation {
                city_id: city_id.to_string(),
                city_name: city_id.to_string(),
                constituency_id: None,
                constituency_name: None,
                coordinates: None,
            },
        }
    }
}

/// Everything needed to start a marketplace with content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceSeed {
    #[serde(default)]
    pub sellers: Vec<SellerInfo>,
    #[serde(default)]
    pub cities: Vec<City>,
    #[serde(default)]
    pub constituencies: Vec<Constituency>,
    #[serde(default)]
    pub listings: Vec<MarketplaceListing>,
    #[serde(default)]
    pub transactions: Vec<MarketplaceTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::seed;

    #[test]
    fn locations() {
        let seed = seed::demo_marketplace().unwrap();
        let directory = Directory::new(seed.sellers, seed.cities, seed.constituencies);

        let szeged = directory.location("szeged");
        assert_eq!(szeged.city_name, "Szeged");
        assert_eq!(szeged.constituency_id.as_deref(), Some("OEVK-02"));
        assert_eq!(szeged.constituency_name.as_deref(), Some("Csongrád 1."));

        let unknown = directory.location("tiszafured");
        assert_eq!(unknown.city_name, "tiszafured");
        assert!(unknown.constituency_id.is_none());

        assert_eq!(directory.constituency_name("OEVK-99"), "OEVK-99");
        assert!(directory.seller("user-002").is_some());
    }
}
