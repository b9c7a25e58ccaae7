//! League table for a round-robin group.

use serde::{Deserialize, Serialize};

use super::models::TeamId;
use crate::matches::models::Match;
use crate::sport::MatchStatus;

const POINTS_FOR_WIN: u32 = 3;
const POINTS_FOR_DRAW: u32 = 1;

/// One row of a league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub team_id: TeamId,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub scored: u32,
    pub conceded: u32,
    pub points: u32,
}

impl Standing {
    fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            scored: 0,
            conceded: 0,
            points: 0,
        }
    }

    pub fn difference(&self) -> i64 {
        i64::from(self.scored) - i64::from(self.conceded)
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.scored += scored;
        self.conceded += conceded;
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            std::cmp::Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
            std::cmp::Ordering::Less => self.lost += 1,
        }
    }
}

/// Build the table for `team_ids` (in seed/draft order) from the completed
/// matches played between them. Sorted by points, difference, scored, then
/// the order of `team_ids`.
pub fn standings(team_ids: &[TeamId], matches: &[Match]) -> Vec<Standing> {
    let mut rows: Vec<Standing> = team_ids.iter().copied().map(Standing::new).collect();
    let position = |id: TeamId| team_ids.iter().position(|&t| t == id);

    for m in matches.iter().filter(|m| m.status == MatchStatus::Completed) {
        let (Some(home), Some(away)) = (m.home_team_id, m.away_team_id) else {
            continue;
        };
        let (Some(h), Some(a)) = (position(home), position(away)) else {
            continue;
        };

        rows[h].record(m.home_score, m.away_score);
        rows[a].record(m.away_score, m.home_score);
    }

    let mut ranked: Vec<(usize, Standing)> = rows.into_iter().enumerate().collect();
    ranked.sort_by(|(ia, a), (ib, b)| {
        b.points
            .cmp(&a.points)
            .then(b.difference().cmp(&a.difference()))
            .then(b.scored.cmp(&a.scored))
            .then(ia.cmp(ib))
    });
    ranked.into_iter().map(|(_, s)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::Stage;
    use crate::matches::models::NewMatch;

    fn played(id: i64, home: TeamId, away: TeamId, hs: u32, aws: u32) -> Match {
        let mut m = NewMatch {
            home_team_id: Some(home),
            away_team_id: Some(away),
            stage: Stage::Group,
            round: 1,
            match_number: id as u32,
            group_index: Some(0),
            is_bye: false,
        }
        .into_match(id, 1, Some(1));
        m.home_score = hs;
        m.away_score = aws;
        m.status = MatchStatus::Completed;
        m
    }

    #[test]
    fn test_points_and_order() {
        let matches = vec![
            played(1, 10, 20, 2, 1),
            played(2, 30, 40, 0, 0),
            played(3, 10, 30, 1, 1),
            played(4, 20, 40, 3, 0),
        ];
        let table = standings(&[10, 20, 30, 40], &matches);

        let order: Vec<TeamId> = table.iter().map(|s| s.team_id).collect();
        assert_eq!(order, vec![10, 20, 30, 40]);
        assert_eq!(table[0].points, 4);
        assert_eq!(table[1].points, 3);
        assert_eq!(table[1].difference(), 2);
        assert_eq!(table[2].drawn, 2);
        assert_eq!(table[3].lost, 1);
    }

    #[test]
    fn test_ignores_unfinished_and_foreign_matches() {
        let mut live = played(1, 10, 20, 5, 0);
        live.status = MatchStatus::Live;
        let foreign = played(2, 10, 99, 4, 0);

        let table = standings(&[10, 20], &[live, foreign]);
        assert!(table.iter().all(|s| s.played == 0));
        assert_eq!(table[0].team_id, 10, "ties keep seed order");
    }

    #[test]
    fn test_difference_breaks_tie() {
        let matches = vec![played(1, 10, 30, 1, 0), played(2, 20, 30, 4, 0)];
        let table = standings(&[10, 20, 30], &matches);
        assert_eq!(table[0].team_id, 20);
        assert_eq!(table[1].team_id, 10);
    }
}
