use super::TeamsApi;
use crate::config::EspnConfig;
use crate::error::EspnError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// ESPN site API client for one sport/league.
///
/// Every call is a single GET with no retry and no client-side timeout.
#[derive(Clone)]
pub struct EspnClient {
    client: Client,
    teams_url: String,
}

impl std::fmt::Debug for EspnClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EspnClient")
            .field("teams_url", &self.teams_url)
            .finish()
    }
}

// ============================================================================
// Transfer shapes
// ============================================================================

/// `GET .../teams` envelope: sports -> leagues -> team wrappers
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeagueResponse {
    #[serde(default)]
    pub sports: Vec<SportEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SportEntry {
    #[serde(default)]
    pub leagues: Vec<LeagueEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeagueEntry {
    #[serde(default)]
    pub teams: Vec<TeamWrapper>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeamWrapper {
    pub team: TeamSummary,
}

impl LeagueResponse {
    /// Flatten the envelope, keeping ESPN's order
    pub fn into_teams(self) -> Vec<TeamSummary> {
        self.sports
            .into_iter()
            .flat_map(|sport| sport.leagues)
            .flat_map(|league| league.teams)
            .map(|wrapper| wrapper.team)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Logo {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    #[serde(default)]
    pub id: String,
    pub abbreviation: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub logos: Vec<Logo>,
}

/// `GET .../teams/{code}` envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeamResponse {
    pub team: TeamDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetail {
    #[serde(default)]
    pub id: String,
    pub abbreviation: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub logos: Vec<Logo>,
    #[serde(default)]
    pub record: Option<Record>,
    #[serde(default)]
    pub next_event: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Record {
    #[serde(default)]
    pub items: Vec<RecordItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecordItem {
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Event {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
}

// ============================================================================
// Client
// ============================================================================

impl EspnClient {
    /// Client for MLB on the public ESPN host
    pub fn new() -> Self {
        Self::with_config(&EspnConfig::default())
    }

    pub fn with_config(config: &EspnConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_else(|_| Client::new());

        let teams_url = format!(
            "{}/apis/site/v2/sports/{}/{}/teams",
            config.base_url.trim_end_matches('/'),
            config.sport,
            config.league
        );

        Self { client, teams_url }
    }

    pub fn teams_url(&self) -> &str {
        &self.teams_url
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, EspnError> {
        debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EspnError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Default for EspnClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TeamsApi for EspnClient {
    async fn list_teams(&self) -> Result<Vec<TeamSummary>, EspnError> {
        let envelope: LeagueResponse = self.fetch(&self.teams_url).await?;
        Ok(envelope.into_teams())
    }

    async fn get_team_detail(&self, code: &str) -> Result<TeamDetail, EspnError> {
        validate_code(code)?;
        let url = format!("{}/{}", self.teams_url, code);
        let envelope: TeamResponse = self.fetch(&url).await?;
        Ok(envelope.team)
    }
}

/// Team codes are path segments; anything but ASCII letters and digits is refused
fn validate_code(code: &str) -> Result<(), EspnError> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EspnError::InvalidCode(code.to_string()));
    }
    Ok(())
}
