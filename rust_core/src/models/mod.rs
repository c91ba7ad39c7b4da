// Domain models shared by the repository, the store and the watch service
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accent color used when a team has no color of its own
pub const PLACEHOLDER_COLOR: &str = "#000000";

// ============================================================================
// Team
// ============================================================================

/// A team as presented to observers of the store.
///
/// Built fresh from the latest ESPN detail response on every repository call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Stable key, e.g. "TOR"
    pub abbreviation: String,
    /// Empty when ESPN lists no logos
    pub logo_url: String,
    pub wins: u32,
    pub losses: u32,
    /// Date of the next scheduled event, as ESPN formats it
    pub next_game: Option<String>,
    /// Hex color without the leading '#'
    pub color: Option<String>,
}

impl Team {
    /// "90-72" style record line
    pub fn record(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }

    /// Parse `next_game` into a timestamp.
    ///
    /// ESPN mixes full RFC 3339 ("2025-09-30T23:07:00Z") with a
    /// minute-precision form ("2025-09-30T23:07Z"); both are accepted.
    pub fn next_game_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.next_game.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ"))
            .ok()
            .map(|dt| dt.and_utc())
    }
}

// ============================================================================
// Logo index
// ============================================================================

/// Display assets for one team in the logo index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoEntry {
    pub url: String,
    /// '#'-prefixed hex color
    pub color: String,
}

impl LogoEntry {
    /// Entry for a team whose detail lookup came back empty
    pub fn placeholder() -> Self {
        Self {
            url: String::new(),
            color: PLACEHOLDER_COLOR.to_string(),
        }
    }

    pub fn from_team(team: Option<&Team>) -> Self {
        let Some(team) = team else {
            return Self::placeholder();
        };
        let color = match team.color.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => format!("#{}", c.trim_start_matches('#')),
            _ => PLACEHOLDER_COLOR.to_string(),
        };
        Self {
            url: team.logo_url.clone(),
            color,
        }
    }
}
