//! Blue Jays Go core - team data synchronization for MLB team displays.
//!
//! This crate provides:
//! - ESPN site API client for the team list and per-team detail endpoints
//! - Repository mapping ESPN payloads to the `Team` domain model, absorbing
//!   every transport failure
//! - `TeamStore`: observable selected team, team list and logo index, with a
//!   concurrent fan-out/fan-in build of the logo index
//! - Environment-based configuration
//!
//! Presentation code only subscribes to the store and issues its commands.

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod store;

pub use clients::{EspnClient, TeamsApi};
pub use config::{Config, EspnConfig};
pub use error::{ConfigError, EspnError};
pub use models::{LogoEntry, Team};
pub use repository::{EspnTeamRepository, TeamRepository};
pub use store::{LoadStatus, LogoIndex, SelectionPolicy, StoreOptions, TeamStore};

use std::sync::Arc;

/// Wire a store to ESPN as described by `config`
pub fn launch_espn_store(config: &Config) -> TeamStore {
    let repository = EspnTeamRepository::new(EspnClient::with_config(&config.espn));
    TeamStore::launch(Arc::new(repository), config.store.clone())
}
