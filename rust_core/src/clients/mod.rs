//! Remote API clients
//!
//! `TeamsApi` is the seam between the repository and the network: the
//! repository only ever talks to this trait, so tests can swap in a fake API.

pub mod espn;

use crate::error::EspnError;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

// Re-export commonly used types
pub use espn::{EspnClient, TeamDetail, TeamSummary};

/// Read-only team endpoints of a sports data provider
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TeamsApi: Send + Sync {
    /// All teams of the configured league, in provider order
    async fn list_teams(&self) -> Result<Vec<TeamSummary>, EspnError>;

    /// Detail for one team code; failures are reported, never defaulted
    async fn get_team_detail(&self, code: &str) -> Result<TeamDetail, EspnError>;
}
