use std::path::{Path, PathBuf};
use std::sync::Arc;

use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::clock::{SharedClock, SystemClock};
use crate::model::{
    election::ElectionStore, marketplace::MarketplaceStore, seed, voting::VotingStore, Stores,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    elections_dir: PathBuf,
    seed_demo_data: bool,
    expose_internal_errors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            elections_dir: PathBuf::from("data/elections"),
            seed_demo_data: false,
            expose_internal_errors: false,
        }
    }
}

impl Config {
    /// Directory holding one JSON dataset per election, loaded at ignition.
    pub fn elections_dir(&self) -> &Path {
        &self.elections_dir
    }

    /// Whether to populate the voting and marketplace stores with demo data.
    pub fn seed_demo_data(&self) -> bool {
        self.seed_demo_data
    }

    /// Whether internal error messages may be sent to clients.
    pub fn expose_internal_errors(&self) -> bool {
        self.expose_internal_errors
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that builds the in-memory stores: election datasets from the
/// configured directory, plus the demo votes and marketplace if requested.
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "In-memory stores",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let clock: SharedClock = Arc::new(SystemClock);

        info!("Loading election data from {}...", config.elections_dir().display());
        let elections = ElectionStore::new();
        let loaded = elections.load_dir(config.elections_dir()).await;
        info!("...loaded {loaded} election dataset(s)");

        let (votes, marketplace) = if config.seed_demo_data() {
            let votes = match seed::demo_votes() {
                Ok(votes) => votes,
                Err(e) => {
                    error!("Failed to parse demo votes: {e}");
                    return Err(rocket);
                }
            };
            let market = match seed::demo_marketplace() {
                Ok(market) => market,
                Err(e) => {
                    error!("Failed to parse demo marketplace: {e}");
                    return Err(rocket);
                }
            };
            info!(
                "Seeded {} vote(s), {} listing(s) and {} transaction(s)",
                votes.len(),
                market.listings.len(),
                market.transactions.len()
            );
            (
                VotingStore::with_votes(clock.clone(), votes),
                MarketplaceStore::from_seed(clock.clone(), market),
            )
        } else {
            (
                VotingStore::new(clock.clone()),
                MarketplaceStore::new(clock.clone()),
            )
        };

        let stores = Stores {
            elections: Arc::new(elections),
            votes: Arc::new(votes),
            marketplace: Arc::new(marketplace),
        };
        Ok(stores.manage(rocket))
    }
}
