//! Tournament, team and group data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bracket::TournamentFormat;
use crate::sport::SportConfig;

/// Tournament ID type
pub type TournamentId = i64;

/// Team ID type
pub type TeamId = i64;

/// Group ID type
pub type GroupId = i64;

/// A tournament and the sport it is played under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub sport: SportConfig,
    pub created_at: DateTime<Utc>,
}

/// Tournament creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    pub name: String,
    pub format: TournamentFormat,
    /// Sport rules; presets come from [`SportConfig::preset`]
    pub sport: SportConfig,
}

impl NewTournament {
    /// Tournament using the preset rules for `sport`
    pub fn with_preset(
        name: impl Into<String>,
        format: TournamentFormat,
        sport: crate::sport::SportKind,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            sport: SportConfig::preset(sport),
        }
    }
}

/// A registered team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub short_name: Option<String>,
    /// Lower is stronger
    pub seed: Option<i32>,
    /// Assigned by group-stage schedule generation
    pub group_id: Option<GroupId>,
}

/// Team registration request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub seed: Option<i32>,
}

impl NewTeam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: None,
            seed: None,
        }
    }

    pub fn seeded(name: impl Into<String>, seed: i32) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(name)
        }
    }
}

/// New seed for one registered team; `None` clears it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUpdate {
    pub team_id: TeamId,
    #[serde(default)]
    pub seed: Option<i32>,
}

/// Group of a group-stage tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub tournament_id: TournamentId,
    pub name: String,
    /// In draft order
    pub team_ids: Vec<TeamId>,
}

/// Group produced by schedule generation, before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub team_ids: Vec<TeamId>,
}

/// Groups and matches of a tournament, as stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub groups: Vec<Group>,
    pub matches: Vec<crate::matches::models::Match>,
}

/// Sort teams the way the bracket generator expects: seed ascending,
/// unseeded last, ties broken by id.
pub fn sort_by_seed(teams: &mut [Team]) {
    teams.sort_by_key(|t| (t.seed.is_none(), t.seed, t.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(id: TeamId, seed: Option<i32>) -> Team {
        Team {
            id,
            tournament_id: 1,
            name: format!("Team {id}"),
            short_name: None,
            seed,
            group_id: None,
        }
    }

    #[test]
    fn test_sort_by_seed_puts_unseeded_last() {
        let mut teams = vec![
            team(1, None),
            team(2, Some(3)),
            team(3, Some(1)),
            team(4, None),
            team(5, Some(1)),
        ];
        sort_by_seed(&mut teams);
        let ids: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 5, 2, 1, 4]);
    }

    #[test]
    fn test_new_tournament_json() {
        let json = serde_json::json!({
            "name": "Spring Cup",
            "format": "group_knockout",
            "sport": serde_json::to_value(SportConfig::volleyball()).unwrap(),
        });
        let parsed: NewTournament = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.format, TournamentFormat::GroupKnockout);
        assert_eq!(parsed.sport, SportConfig::volleyball());
    }
}
