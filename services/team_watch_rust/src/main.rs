//! Team Watch Service
//!
//! Headless observer of the team store. It loads the selected team, the
//! league's team list and the logo index from ESPN, then logs every state
//! change until interrupted. It issues no commands beyond startup.

use anyhow::{Context, Result};
use bluejays_rust_core::{launch_espn_store, Config};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "Starting Team Watch Service ({}/{}, default team {})...",
        config.espn.sport, config.espn.league, config.store.default_team
    );

    let store = launch_espn_store(&config);

    let mut current_team = store.subscribe_current_team();
    let mut abbreviations = store.subscribe_abbreviations();
    let mut logo_index = store.subscribe_logo_index();
    let mut team_status = store.subscribe_team_status();

    loop {
        tokio::select! {
            Ok(()) = current_team.changed() => {
                if let Some(team) = current_team.borrow_and_update().as_ref() {
                    info!(
                        "{} ({}) {} next game: {}",
                        team.name,
                        team.abbreviation,
                        team.record(),
                        team.next_game_time()
                            .map(|t| t.to_rfc2822())
                            .unwrap_or_else(|| "none scheduled".to_string())
                    );
                }
            }
            Ok(()) = abbreviations.changed() => {
                let codes = abbreviations.borrow_and_update();
                info!("Teams: {}", codes.join(", "));
            }
            Ok(()) = logo_index.changed() => {
                let index = logo_index.borrow_and_update();
                let missing = index.values().filter(|entry| entry.url.is_empty()).count();
                info!("Logo index: {} teams, {} without logo", index.len(), missing);
            }
            Ok(()) = team_status.changed() => {
                info!("Selected team status: {}", *team_status.borrow_and_update());
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, shutting down");
                break;
            }
        }
    }

    Ok(())
}
