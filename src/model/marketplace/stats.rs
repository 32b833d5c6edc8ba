//! Activity statistics, computed from the stored listings and transactions.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Directory, ListingCategory, ListingStatus, MarketplaceListing, MarketplaceTransaction};
use crate::model::voting::percentage;

pub const TOP_CATEGORIES: usize = 5;
pub const MONTHLY_TREND_DAYS: i64 = 30;
pub const WEEKLY_TREND_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: ListingCategory,
    pub category_label: String,
    pub listing_count: usize,
    pub transaction_count: usize,
    /// Share of all listings considered, as a whole percentage.
    pub percentage_of_total: u32,
}

/// Per-category counts, most listed category first.
pub fn category_stats<'a>(
    listings: impl IntoIterator<Item = &'a MarketplaceListing>,
    transactions: impl IntoIterator<Item = &'a MarketplaceTransaction>,
) -> Vec<CategoryStat> {
    let mut counts: BTreeMap<ListingCategory, (usize, usize)> = BTreeMap::new();
    for listing in listings {
        counts.entry(listing.category).or_default().0 += 1;
    }
    for transaction in transactions {
        counts.entry(transaction.category).or_default().1 += 1;
    }

    let total: usize = counts.values().map(|(l, _)| l).sum();
    let mut stats: Vec<CategoryStat> = counts
        .into_iter()
        .map(|(category, (listing_count, transaction_count))| CategoryStat {
            category,
            category_label: category.label().to_string(),
            listing_count,
            transaction_count,
            percentage_of_total: percentage(listing_count as u64, total as u64),
        })
        .collect();
    stats.sort_by(|a, b| b.listing_count.cmp(&a.listing_count));
    stats
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMarketActivity {
    pub date: NaiveDate,
    pub new_listings: usize,
    pub transactions: usize,
    /// Distinct users who listed something or took part in a transaction.
    pub active_users: usize,
}

/// One entry per day for the `days` days up to and including today, oldest first.
pub fn activity_trend(
    listings: &[&MarketplaceListing],
    transactions: &[&MarketplaceTransaction],
    now: DateTime<Utc>,
    days: i64,
) -> Vec<DailyMarketActivity> {
    let today = now.date_naive();
    (0..days)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let mut users: HashSet<&str> = HashSet::new();
            let mut new_listings = 0;
            for listing in listings.iter().filter(|l| l.created_at.date_naive() == date) {
                new_listings += 1;
                users.insert(&listing.seller.user_id);
            }
            let mut count = 0;
            for transaction in transactions
                .iter()
                .filter(|t| t.completed_at.date_naive() == date)
            {
                count += 1;
                users.insert(&transaction.seller_id);
                users.insert(&transaction.buyer_id);
            }
            DailyMarketActivity {
                date,
                new_listings,
                transactions: count,
                active_users: users.len(),
            }
        })
        .collect()
}

fn since(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

fn count_active(listings: &[&MarketplaceListing]) -> usize {
    listings
        .iter()
        .filter(|l| l.status == ListingStatus::Active)
        .count()
}

fn completed_since(transactions: &[&MarketplaceTransaction], from: DateTime<Utc>) -> usize {
    transactions.iter().filter(|t| t.completed_at >= from).count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMarketStats {
    pub city_id: String,
    pub city_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constituency_id: Option<String>,
    pub active_listings: usize,
    pub total_sellers: usize,
    pub total_buyers: usize,
    pub weekly_new_listings: usize,
    pub weekly_transactions: usize,
    pub monthly_transactions: usize,
    pub top_categories: Vec<CategoryStat>,
    pub activity_trend: Vec<DailyMarketActivity>,
}

pub fn city_stats(
    city_id: &str,
    directory: &Directory,
    listings: &[&MarketplaceListing],
    transactions: &[&MarketplaceTransaction],
    now: DateTime<Utc>,
) -> CityMarketStats {
    let listings: Vec<_> = listings
        .iter()
        .copied()
        .filter(|l| l.location.city_id == city_id)
        .collect();
    let transactions: Vec<_> = transactions
        .iter()
        .copied()
        .filter(|t| t.location.city_id == city_id)
        .collect();

    let week_ago = since(now, WEEKLY_TREND_DAYS);
    let sellers: HashSet<&str> = listings.iter().map(|l| l.seller.user_id.as_str()).collect();
    let buyers: HashSet<&str> = transactions.iter().map(|t| t.buyer_id.as_str()).collect();
    let mut top_categories = category_stats(listings.iter().copied(), transactions.iter().copied());
    top_categories.truncate(TOP_CATEGORIES);

    CityMarketStats {
        city_id: city_id.to_string(),
        city_name: directory.city_name(city_id).to_string(),
        constituency_id: directory.city(city_id).map(|c| c.constituency_id.clone()),
        active_listings: count_active(&listings),
        total_sellers: sellers.len(),
        total_buyers: buyers.len(),
        weekly_new_listings: listings.iter().filter(|l| l.created_at >= week_ago).count(),
        weekly_transactions: completed_since(&transactions, week_ago),
        monthly_transactions: completed_since(&transactions, since(now, MONTHLY_TREND_DAYS)),
        top_categories,
        activity_trend: activity_trend(&listings, &transactions, now, MONTHLY_TREND_DAYS),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMarketSummary {
    pub city_id: String,
    pub city_name: String,
    pub active_listings: usize,
    pub weekly_transactions: usize,
    pub activity_score: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstituencyMarketStats {
    pub constituency_id: String,
    pub constituency_name: String,
    pub total_cities: usize,
    pub total_active_listings: usize,
    pub total_weekly_transactions: usize,
    /// Highest activity score first.
    pub city_ranking: Vec<CityMarketSummary>,
    pub weekly_trend: Vec<DailyMarketActivity>,
}

pub fn constituency_stats(
    constituency_id: &str,
    directory: &Directory,
    listings: &[&MarketplaceListing],
    transactions: &[&MarketplaceTransaction],
    now: DateTime<Utc>,
) -> ConstituencyMarketStats {
    let in_constituency = |c: &Option<String>| c.as_deref() == Some(constituency_id);
    let listings: Vec<_> = listings
        .iter()
        .copied()
        .filter(|l| in_constituency(&l.location.constituency_id))
        .collect();
    let transactions: Vec<_> = transactions
        .iter()
        .copied()
        .filter(|t| in_constituency(&t.location.constituency_id))
        .collect();
    let week_ago = since(now, WEEKLY_TREND_DAYS);

    // Every city with any activity here, in id order so ties rank stably.
    let cities: BTreeSet<&str> = listings
        .iter()
        .map(|l| l.location.city_id.as_str())
        .chain(transactions.iter().map(|t| t.location.city_id.as_str()))
        .collect();
    let mut city_ranking: Vec<CityMarketSummary> = cities
        .into_iter()
        .map(|city_id| {
            let active_listings = listings
                .iter()
                .filter(|l| l.location.city_id == city_id && l.status == ListingStatus::Active)
                .count();
            let weekly_transactions = transactions
                .iter()
                .filter(|t| t.location.city_id == city_id && t.completed_at >= week_ago)
                .count();
            CityMarketSummary {
                city_id: city_id.to_string(),
                city_name: directory.city_name(city_id).to_string(),
                active_listings,
                weekly_transactions,
                activity_score: active_listings * 2 + weekly_transactions * 3,
            }
        })
        .collect();
    city_ranking.sort_by(|a, b| b.activity_score.cmp(&a.activity_score));

    ConstituencyMarketStats {
        constituency_id: constituency_id.to_string(),
        constituency_name: directory.constituency_name(constituency_id).to_string(),
        total_cities: city_ranking.len(),
        total_active_listings: count_active(&listings),
        total_weekly_transactions: completed_since(&transactions, week_ago),
        city_ranking,
        weekly_trend: activity_trend(&listings, &transactions, now, WEEKLY_TREND_DAYS),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOverview {
    pub total_active_listings: usize,
    pub total_sellers: usize,
    pub total_buyers: usize,
    pub weekly_transactions: usize,
    pub monthly_transactions: usize,
    pub top_categories: Vec<CategoryStat>,
    pub activity_trend: Vec<DailyMarketActivity>,
    /// Mean of all given ratings, to one decimal place. Absent with no ratings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
}

pub fn overview(
    listings: &[&MarketplaceListing],
    transactions: &[&MarketplaceTransaction],
    now: DateTime<Utc>,
) -> MarketOverview {
    let sellers: HashSet<&str> = listings.iter().map(|l| l.seller.user_id.as_str()).collect();
    let buyers: HashSet<&str> = transactions.iter().map(|t| t.buyer_id.as_str()).collect();
    let ratings: Vec<u8> = transactions.iter().filter_map(|t| t.rating).collect();
    let average_rating = (!ratings.is_empty()).then(|| {
        let mean = ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64;
        (mean * 10.0).round() / 10.0
    });
    let mut top_categories = category_stats(listings.iter().copied(), transactions.iter().copied());
    top_categories.truncate(TOP_CATEGORIES);

    MarketOverview {
        total_active_listings: count_active(listings),
        total_sellers: sellers.len(),
        total_buyers: buyers.len(),
        weekly_transactions: completed_since(transactions, since(now, WEEKLY_TREND_DAYS)),
        monthly_transactions: completed_since(transactions, since(now, MONTHLY_TREND_DAYS)),
        top_categories,
        activity_trend: activity_trend(listings, transactions, now, MONTHLY_TREND_DAYS),
        average_rating,
    }
}
