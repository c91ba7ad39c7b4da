//! Team repository
//!
//! Translates ESPN transfer shapes into the domain `Team` and absorbs every
//! client failure. Callers get a list (possibly empty) or an `Option`, never
//! a transport error, so "unknown team" and "network down" look the same
//! from above.

use crate::clients::{TeamDetail, TeamsApi};
use crate::models::Team;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Team lookups as seen by the store
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Abbreviations of every known team, in provider order
    async fn get_teams(&self) -> Vec<String>;

    /// Detail for one team, `None` on any failure
    async fn get_team_details(&self, code: &str) -> Option<Team>;
}

/// `TeamRepository` backed by a `TeamsApi` (normally `EspnClient`)
pub struct EspnTeamRepository<A> {
    api: A,
}

impl<A: TeamsApi> EspnTeamRepository<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<A: TeamsApi> TeamRepository for EspnTeamRepository<A> {
    async fn get_teams(&self) -> Vec<String> {
        match self.api.list_teams().await {
            Ok(teams) => {
                debug!("Fetched {} teams", teams.len());
                teams.into_iter().map(|t| t.abbreviation).collect()
            }
            Err(e) if e.is_rejected() => {
                debug!("Team list rejected: {}", e);
                Vec::new()
            }
            Err(e) => {
                warn!("Failed to list teams: {}", e);
                Vec::new()
            }
        }
    }

    async fn get_team_details(&self, code: &str) -> Option<Team> {
        match self.api.get_team_detail(code).await {
            Ok(detail) => Some(team_from_detail(detail)),
            // Unknown or retired codes come back as 4xx
            Err(e) if e.is_rejected() => {
                debug!("Team {} rejected: {}", code, e);
                None
            }
            Err(e) => {
                warn!("Failed to fetch team {}: {}", code, e);
                None
            }
        }
    }
}

/// Map an ESPN detail payload to the domain model
pub fn team_from_detail(detail: TeamDetail) -> Team {
    let (wins, losses) = detail
        .record
        .as_ref()
        .and_then(|r| r.items.first())
        .map(|item| parse_record(&item.summary))
        .unwrap_or((0, 0));

    Team {
        id: detail.id,
        name: detail.display_name,
        abbreviation: detail.abbreviation,
        logo_url: detail
            .logos
            .into_iter()
            .next()
            .map(|logo| logo.href)
            .unwrap_or_default(),
        wins,
        losses,
        next_game: detail.next_event.into_iter().next().map(|event| event.date),
        color: detail.color.filter(|c| !c.trim().is_empty()),
    }
}

/// Parse a "<wins>-<losses>" summary.
///
/// A summary without a separator is malformed and yields (0, 0); otherwise
/// each side falls back to 0 on its own.
pub fn parse_record(summary: &str) -> (u32, u32) {
    let mut tokens = summary.split('-');
    let (Some(wins), Some(losses)) = (tokens.next(), tokens.next()) else {
        return (0, 0);
    };
    (
        wins.trim().parse().unwrap_or(0),
        losses.trim().parse().unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::espn::{Event, Logo, Record, RecordItem};
    use crate::clients::{MockTeamsApi, TeamSummary};
    use crate::error::EspnError;

    fn summary(id: &str, code: &str, name: &str) -> TeamSummary {
        TeamSummary {
            id: id.to_string(),
            abbreviation: code.to_string(),
            display_name: name.to_string(),
            logos: vec![Logo {
                href: "https://logo.png".to_string(),
            }],
        }
    }

    fn detail() -> TeamDetail {
        TeamDetail {
            id: "123".to_string(),
            abbreviation: "TOR".to_string(),
            display_name: "Toronto Blue Jays".to_string(),
            color: Some("134a8e".to_string()),
            logos: vec![
                Logo {
                    href: "https://logo.png".to_string(),
                },
                Logo {
                    href: "https://logo-dark.png".to_string(),
                },
            ],
            record: Some(Record {
                items: vec![RecordItem {
                    summary: "90-72".to_string(),
                }],
            }),
            next_event: vec![Event {
                name: "Yankees vs Blue Jays".to_string(),
                date: "2025-09-30".to_string(),
            }],
        }
    }

    fn failing_api() -> MockTeamsApi {
        let mut api = MockTeamsApi::new();
        api.expect_list_teams().returning(|| {
            Err(EspnError::Status {
                status: 500,
                body: String::new(),
            })
        });
        api.expect_get_team_detail().returning(|_| {
            Err(EspnError::Status {
                status: 400,
                body: r#"{"code":400,"message":"Failed to get league teams summary"}"#.to_string(),
            })
        });
        api
    }

    #[test]
    fn test_parse_record() {
        assert_eq!(parse_record("90-72"), (90, 72));
        assert_eq!(parse_record(" 90 - 72 "), (90, 72));
        assert_eq!(parse_record("90"), (0, 0));
        assert_eq!(parse_record(""), (0, 0));
        assert_eq!(parse_record("90-x"), (90, 0));
        assert_eq!(parse_record("w-72"), (0, 72));
        assert_eq!(parse_record("50-40-2"), (50, 40));
    }

    #[test]
    fn test_team_from_detail() {
        let team = team_from_detail(detail());
        assert_eq!(team.id, "123");
        assert_eq!(team.name, "Toronto Blue Jays");
        assert_eq!(team.abbreviation, "TOR");
        assert_eq!(team.logo_url, "https://logo.png");
        assert_eq!(team.wins, 90);
        assert_eq!(team.losses, 72);
        assert_eq!(team.next_game.as_deref(), Some("2025-09-30"));
        assert_eq!(team.color.as_deref(), Some("134a8e"));
    }

    #[test]
    fn test_team_from_sparse_detail() {
        let sparse = TeamDetail {
            logos: vec![],
            record: None,
            next_event: vec![],
            color: Some("  ".to_string()),
            ..detail()
        };
        let team = team_from_detail(sparse);
        assert_eq!(team.logo_url, "");
        assert_eq!((team.wins, team.losses), (0, 0));
        assert!(team.next_game.is_none());
        assert!(team.color.is_none());
    }

    #[test]
    fn test_team_from_detail_with_empty_record_items() {
        let team = team_from_detail(TeamDetail {
            record: Some(Record::default()),
            ..detail()
        });
        assert_eq!((team.wins, team.losses), (0, 0));
    }

    #[tokio::test]
    async fn test_get_team_details() {
        let mut api = MockTeamsApi::new();
        api.expect_get_team_detail()
            .times(1)
            .returning(|_| Ok(detail()));
        let repository = EspnTeamRepository::new(api);

        let team = repository.get_team_details("tor").await.unwrap();
        assert_eq!(team.abbreviation, "TOR");
        assert_eq!(team.name, "Toronto Blue Jays");
        assert_eq!((team.wins, team.losses), (90, 72));
    }

    #[tokio::test]
    async fn test_get_teams_preserves_order() {
        let mut api = MockTeamsApi::new();
        api.expect_list_teams().returning(|| {
            Ok(vec![
                summary("14", "TOR", "Toronto Blue Jays"),
                summary("10", "NYY", "New York Yankees"),
                summary("19", "LAD", "Los Angeles Dodgers"),
            ])
        });
        let repository = EspnTeamRepository::new(api);

        assert_eq!(repository.get_teams().await, vec!["TOR", "NYY", "LAD"]);
    }

    #[tokio::test]
    async fn test_get_teams_empty_response() {
        let mut api = MockTeamsApi::new();
        api.expect_list_teams().returning(|| Ok(Vec::new()));
        let repository = EspnTeamRepository::new(api);

        assert!(repository.get_teams().await.is_empty());
    }

    #[tokio::test]
    async fn test_api_errors_become_absence() {
        let repository = EspnTeamRepository::new(failing_api());

        assert!(repository.get_teams().await.is_empty());
        assert_eq!(repository.get_team_details("fakeTeam").await, None);
    }

    #[tokio::test]
    async fn test_rejected_and_broken_requests_both_become_absence() {
        let mut api = MockTeamsApi::new();
        api.expect_list_teams().returning(|| {
            Err(EspnError::Status {
                status: 404,
                body: String::new(),
            })
        });
        api.expect_get_team_detail()
            .returning(|code| Err(EspnError::InvalidCode(code.to_string())));
        let repository = EspnTeamRepository::new(api);

        assert!(repository.get_teams().await.is_empty());
        assert_eq!(repository.get_team_details("T/R").await, None);
    }

    #[tokio::test]
    async fn test_repeated_lookup_is_stable() {
        let mut api = MockTeamsApi::new();
        api.expect_get_team_detail()
            .times(2)
            .returning(|_| Ok(detail()));
        let repository = EspnTeamRepository::new(api);

        let first = repository.get_team_details("TOR").await;
        let second = repository.get_team_details("TOR").await;
        assert!(first.is_some());
        assert_eq!(first, second);
    }
}
