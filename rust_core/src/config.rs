//! Configuration constants and environment loading
//!
//! This module manages all runtime configuration:
//! - ESPN endpoint (base URL, sport and league path segments)
//! - Initial team selection
//! - Logo fan-out concurrency
//! - Stale-response policy for team selection

use crate::error::ConfigError;
use crate::store::{SelectionPolicy, StoreOptions};
use std::env;

/// Default ESPN site API root
pub const DEFAULT_ESPN_BASE_URL: &str = "https://site.api.espn.com";

pub const DEFAULT_SPORT: &str = "baseball";
pub const DEFAULT_LEAGUE: &str = "mlb";

pub const DEFAULT_USER_AGENT: &str = "BlueJays/1.0";

/// Team selected when the store starts
pub const DEFAULT_TEAM: &str = "TOR";

/// Default number of concurrent detail requests during logo enrichment
pub const DEFAULT_LOGO_CONCURRENCY: usize = 8;

/// Upper bound for `LOGO_FETCH_CONCURRENCY`; MLB has 30 teams
pub const MAX_LOGO_CONCURRENCY: usize = 64;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where and how to reach the ESPN API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EspnConfig {
    pub base_url: String,
    pub sport: String,
    pub league: String,
    pub user_agent: String,
}

impl Default for EspnConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ESPN_BASE_URL.to_string(),
            sport: DEFAULT_SPORT.to_string(),
            league: DEFAULT_LEAGUE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub espn: EspnConfig,
    pub store: StoreOptions,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let text = |key: &'static str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let espn = EspnConfig {
            base_url: text("ESPN_BASE_URL", DEFAULT_ESPN_BASE_URL),
            sport: text("ESPN_SPORT", DEFAULT_SPORT),
            league: text("ESPN_LEAGUE", DEFAULT_LEAGUE),
            user_agent: text("ESPN_USER_AGENT", DEFAULT_USER_AGENT),
        };

        let logo_concurrency = match lookup("LOGO_FETCH_CONCURRENCY") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid {
                    key: "LOGO_FETCH_CONCURRENCY",
                    value: raw.clone(),
                })?
                .clamp(1, MAX_LOGO_CONCURRENCY),
            None => DEFAULT_LOGO_CONCURRENCY,
        };

        let selection_policy = match lookup("TEAM_SELECTION_POLICY") {
            Some(raw) => raw.parse::<SelectionPolicy>().map_err(|_| ConfigError::Invalid {
                key: "TEAM_SELECTION_POLICY",
                value: raw.clone(),
            })?,
            None => SelectionPolicy::default(),
        };

        Ok(Self {
            espn,
            store: StoreOptions {
                default_team: text("DEFAULT_TEAM", DEFAULT_TEAM).to_uppercase(),
                logo_concurrency,
                selection_policy,
            },
            log_level: text("LOG_LEVEL", DEFAULT_LOG_LEVEL),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&'static str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.espn, EspnConfig::default());
        assert_eq!(config.store.default_team, "TOR");
        assert_eq!(config.store.logo_concurrency, DEFAULT_LOGO_CONCURRENCY);
        assert_eq!(config.store.selection_policy, SelectionPolicy::LatestSelection);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ESPN_BASE_URL", "http://127.0.0.1:9000"),
            ("ESPN_LEAGUE", "nhl"),
            ("ESPN_SPORT", "hockey"),
            ("DEFAULT_TEAM", "nyy"),
            ("LOGO_FETCH_CONCURRENCY", "4"),
            ("TEAM_SELECTION_POLICY", "completion"),
        ])
        .unwrap();

        assert_eq!(config.espn.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.espn.sport, "hockey");
        assert_eq!(config.espn.league, "nhl");
        assert_eq!(config.store.default_team, "NYY");
        assert_eq!(config.store.logo_concurrency, 4);
        assert_eq!(config.store.selection_policy, SelectionPolicy::CompletionOrder);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = load(&[("ESPN_BASE_URL", "  "), ("DEFAULT_TEAM", "")]).unwrap();
        assert_eq!(config.espn.base_url, DEFAULT_ESPN_BASE_URL);
        assert_eq!(config.store.default_team, DEFAULT_TEAM);
    }

    #[test]
    fn test_concurrency_is_clamped() {
        let config = load(&[("LOGO_FETCH_CONCURRENCY", "0")]).unwrap();
        assert_eq!(config.store.logo_concurrency, 1);

        let config = load(&[("LOGO_FETCH_CONCURRENCY", "1000")]).unwrap();
        assert_eq!(config.store.logo_concurrency, MAX_LOGO_CONCURRENCY);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = load(&[("LOGO_FETCH_CONCURRENCY", "lots")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "LOGO_FETCH_CONCURRENCY", .. }
        ));

        let err = load(&[("TEAM_SELECTION_POLICY", "random")]).unwrap_err();
        assert!(err.to_string().contains("TEAM_SELECTION_POLICY"));
    }
}
