#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

use config::{ConfigFairing, StoreFairing};
use logging::LoggerFairing;
use model::Stores;

/// Build the server. Configuration is read from `Rocket.toml` and `ROCKET_*`
/// environment variables; the stores are populated during ignition.
pub fn build() -> Rocket<Build> {
    base_rocket().attach(StoreFairing)
}

/// Build the server around already populated stores.
pub fn rocket_for_stores(stores: Stores) -> Rocket<Build> {
    stores.manage(base_rocket())
}

fn base_rocket() -> Rocket<Build> {
    rocket::build()
        .attach(ConfigFairing)
        .attach(LoggerFairing)
        .mount("/api", api::routes())
        .register("/", api::catchers())
}
