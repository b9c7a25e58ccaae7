//! Sport rule engine.
//!
//! Every sport exposes the same capability set through [`SportRules`]. The
//! closed [`Sport`] enum dispatches to one variant per built-in sport plus a
//! configuration-driven generic variant. The shared scoring operations
//! (validate, apply, undo, next period) live on [`Sport`] and call into the
//! per-sport hooks.

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::{SportConfig, SportKind};
use super::state::{MAX_SCORE, MatchState, MatchStatus, Side};

/// Reasons a scoring action is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RuleViolation {
    #[error("match is not live (status: {status})")]
    MatchNotLive { status: MatchStatus },
    #[error("{points} is not an allowed score increment (allowed: {allowed:?})")]
    InvalidPoints { points: u32, allowed: Vec<u32> },
    #[error("{side} score cannot exceed {max}")]
    ScoreLimit { side: Side, max: u32 },
}

/// Whether a match is over according to the rules, and who leads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Rules say the match is decided
    pub ended: bool,
    /// Winner (or tentative winner when not ended)
    pub winner: Option<Side>,
    /// Rules explicitly permit the current level score as a result
    pub tie_allowed: bool,
}

/// Result of applying a score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub state: MatchState,
    pub period_ended: bool,
    pub outcome: MatchOutcome,
}

/// A scoring button offered to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableAction {
    pub side: Side,
    pub points: u32,
    pub label: String,
}

/// Per-sport hooks. Defaults describe a sport whose periods and match
/// only end on an explicit signal.
#[enum_dispatch]
pub trait SportRules {
    fn config(&self) -> &SportConfig;

    fn should_end_period(&self, _state: &MatchState) -> bool {
        false
    }

    fn should_end_match(&self, _state: &MatchState) -> MatchOutcome {
        MatchOutcome::default()
    }

    fn format_score(&self, state: &MatchState) -> String {
        format!("{} - {}", state.home_score, state.away_score)
    }

    fn format_period_score(&self, state: &MatchState, period: u32) -> String {
        let (home, away) = state.period_score(period);
        format!("{home} - {away}")
    }
}

/// Points accumulate; regulation end only yields a tentative winner so
/// overtime stays possible.
#[derive(Debug, Clone)]
pub struct PointsSport {
    config: SportConfig,
}

impl SportRules for PointsSport {
    fn config(&self) -> &SportConfig {
        &self.config
    }

    fn should_end_match(&self, state: &MatchState) -> MatchOutcome {
        if state.current_period >= self.config.periods {
            MatchOutcome {
                ended: false,
                winner: state.leader(),
                tie_allowed: false,
            }
        } else {
            MatchOutcome::default()
        }
    }
}

/// Sets played to a target with a winning margin; best-of match
#[derive(Debug, Clone)]
pub struct SetSport {
    config: SportConfig,
}

impl SetSport {
    /// Winner of a 1-indexed period if it has been closed out
    fn period_winner(&self, state: &MatchState, period: u32) -> Option<Side> {
        let target = self.config.period_target(period)?;
        let margin = self.config.min_period_margin.max(1);
        let (home, away) = state.period_score(period);

        if home >= target && home >= away.saturating_add(margin) {
            Some(Side::Home)
        } else if away >= target && away >= home.saturating_add(margin) {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Periods won by each side, (home, away)
    pub fn periods_won(&self, state: &MatchState) -> (u32, u32) {
        let played = state
            .current_period
            .max(state.home_period_scores.len() as u32);
        (1..=played).fold((0, 0), |(home, away), period| {
            match self.period_winner(state, period) {
                Some(Side::Home) => (home + 1, away),
                Some(Side::Away) => (home, away + 1),
                None => (home, away),
            }
        })
    }
}

impl SportRules for SetSport {
    fn config(&self) -> &SportConfig {
        &self.config
    }

    fn should_end_period(&self, state: &MatchState) -> bool {
        self.period_winner(state, state.current_period).is_some()
    }

    fn should_end_match(&self, state: &MatchState) -> MatchOutcome {
        let (home, away) = self.periods_won(state);
        let periods = self.config.periods;

        if home * 2 > periods {
            MatchOutcome {
                ended: true,
                winner: Some(Side::Home),
                tie_allowed: false,
            }
        } else if away * 2 > periods {
            MatchOutcome {
                ended: true,
                winner: Some(Side::Away),
                tie_allowed: false,
            }
        } else {
            MatchOutcome::default()
        }
    }

    fn format_score(&self, state: &MatchState) -> String {
        let (home, away) = self.periods_won(state);
        format!("{home} - {away}")
    }
}

/// Draws are a legal result once regulation is over
#[derive(Debug, Clone)]
pub struct TieSport {
    config: SportConfig,
}

impl SportRules for TieSport {
    fn config(&self) -> &SportConfig {
        &self.config
    }

    fn should_end_match(&self, state: &MatchState) -> MatchOutcome {
        if state.current_period < self.config.periods {
            return MatchOutcome::default();
        }

        match state.leader() {
            Some(side) => MatchOutcome {
                ended: false,
                winner: Some(side),
                tie_allowed: false,
            },
            None => MatchOutcome {
                ended: false,
                winner: None,
                tie_allowed: self.config.allow_tie,
            },
        }
    }
}

/// Configuration only; nothing ends without an explicit signal
#[derive(Debug, Clone)]
pub struct GenericSport {
    config: SportConfig,
}

impl SportRules for GenericSport {
    fn config(&self) -> &SportConfig {
        &self.config
    }
}

/// Closed set of rule variants
#[enum_dispatch(SportRules)]
#[derive(Debug, Clone)]
pub enum Sport {
    Basketball(PointsSport),
    Volleyball(SetSport),
    Soccer(TieSport),
    Generic(GenericSport),
}

impl From<SportConfig> for Sport {
    fn from(config: SportConfig) -> Self {
        match config.kind {
            SportKind::Basketball => PointsSport { config }.into(),
            SportKind::Volleyball => SetSport { config }.into(),
            SportKind::Soccer => TieSport { config }.into(),
            SportKind::Generic => GenericSport { config }.into(),
        }
    }
}

impl Sport {
    pub fn periods(&self) -> u32 {
        self.config().periods
    }

    /// Check that `points` may be scored right now
    pub fn validate_action(
        &self,
        state: &MatchState,
        _side: Side,
        points: u32,
    ) -> Result<(), RuleViolation> {
        if state.status != MatchStatus::Live {
            return Err(RuleViolation::MatchNotLive {
                status: state.status,
            });
        }

        if self.config().increment_label(points).is_none() {
            return Err(RuleViolation::InvalidPoints {
                points,
                allowed: self.config().allowed_points(),
            });
        }

        Ok(())
    }

    /// Add `points` to `side` in the current period and report what the
    /// rules make of the new state. Never advances the period.
    pub fn apply_score(
        &self,
        state: &MatchState,
        side: Side,
        points: u32,
    ) -> Result<ScoreOutcome, RuleViolation> {
        self.validate_action(state, side, points)?;

        let mut next = state.clone();
        next.add(side, next.current_period, points)
            .ok_or(RuleViolation::ScoreLimit {
                side,
                max: MAX_SCORE,
            })?;

        let period_ended = self.should_end_period(&next);
        let outcome = self.should_end_match(&next);

        Ok(ScoreOutcome {
            state: next,
            period_ended,
            outcome,
        })
    }

    /// Remove previously scored points. Totals and buckets never go
    /// below zero.
    pub fn undo_score(&self, state: &MatchState, side: Side, points: u32, period: u32) -> MatchState {
        let mut next = state.clone();
        next.subtract(side, period, points);
        next
    }

    /// Scoring options for a live match
    pub fn available_actions(&self, state: &MatchState) -> Vec<AvailableAction> {
        if state.status != MatchStatus::Live {
            return Vec::new();
        }

        self.config()
            .score_increments
            .iter()
            .flat_map(|inc| {
                Side::BOTH.into_iter().map(move |side| AvailableAction {
                    side,
                    points: inc.points,
                    label: inc.label.clone(),
                })
            })
            .collect()
    }

    /// Open the next period. No-op once the configured count is reached.
    pub fn next_period(&self, state: &MatchState) -> MatchState {
        let mut next = state.clone();
        if next.current_period >= self.periods() {
            return next;
        }

        next.ensure_period(next.current_period);
        next.current_period += 1;
        next.ensure_period(next.current_period);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sport::ScoreIncrement;

    fn volleyball() -> Sport {
        Sport::from(SportConfig::volleyball())
    }

    fn play_set(sport: &Sport, state: MatchState, home: u32, away: u32) -> MatchState {
        let mut state = state;
        for _ in 0..home {
            state = sport.apply_score(&state, Side::Home, 1).unwrap().state;
        }
        for _ in 0..away {
            state = sport.apply_score(&state, Side::Away, 1).unwrap().state;
        }
        state
    }

    #[test]
    fn test_validate_rejects_when_not_live() {
        let sport = Sport::from(SportConfig::basketball());
        let state = MatchState::new();
        let err = sport.validate_action(&state, Side::Home, 2).unwrap_err();
        assert_eq!(
            err,
            RuleViolation::MatchNotLive {
                status: MatchStatus::Scheduled
            }
        );
    }

    #[test]
    fn test_validate_rejects_unknown_increment() {
        let sport = Sport::from(SportConfig::basketball());
        let err = sport
            .validate_action(&MatchState::live(), Side::Away, 4)
            .unwrap_err();
        assert!(matches!(err, RuleViolation::InvalidPoints { points: 4, .. }));
        assert!(err.to_string().contains("not an allowed"));
    }

    #[test]
    fn test_apply_score_updates_total_and_bucket() {
        let sport = Sport::from(SportConfig::basketball());
        let outcome = sport.apply_score(&MatchState::live(), Side::Home, 3).unwrap();
        assert_eq!(outcome.state.home_score, 3);
        assert_eq!(outcome.state.home_period_scores, vec![3]);
        assert_eq!(outcome.state.away_period_scores, vec![0]);
        assert!(!outcome.period_ended);
        assert!(!outcome.outcome.ended);
    }

    #[test]
    fn test_volleyball_period_ends_at_25_with_margin() {
        let sport = volleyball();
        let state = play_set(&sport, MatchState::live(), 24, 20);
        let outcome = sport.apply_score(&state, Side::Home, 1).unwrap();
        assert!(outcome.period_ended);
        assert!(!outcome.outcome.ended);
    }

    #[test]
    fn test_volleyball_needs_two_point_margin() {
        let sport = volleyball();
        let state = play_set(&sport, MatchState::live(), 24, 24);
        let outcome = sport.apply_score(&state, Side::Home, 1).unwrap();
        assert!(!outcome.period_ended, "25-24 must not close the set");

        let outcome = sport.apply_score(&outcome.state, Side::Home, 1).unwrap();
        assert!(outcome.period_ended, "26-24 closes the set");
    }

    #[test]
    fn test_volleyball_match_ends_after_three_sets() {
        let sport = volleyball();
        let mut state = MatchState::live();
        for set in 1..=3 {
            state = play_set(&sport, state, 25, 20);
            assert!(sport.should_end_period(&state));
            if set < 3 {
                assert!(!sport.should_end_match(&state).ended);
                state = sport.next_period(&state);
            }
        }

        let outcome = sport.should_end_match(&state);
        assert!(outcome.ended);
        assert_eq!(outcome.winner, Some(Side::Home));
        assert_eq!(sport.format_score(&state), "3 - 0");
    }

    #[test]
    fn test_volleyball_deciding_set_uses_reduced_target() {
        let sport = volleyball();
        let mut state = MatchState::live();
        for _ in 1..5 {
            state = sport.next_period(&state);
        }
        assert_eq!(state.current_period, 5);

        let state = play_set(&sport, state, 15, 13);
        assert!(sport.should_end_period(&state));
    }

    #[test]
    fn test_basketball_tentative_winner_never_ends() {
        let sport = Sport::from(SportConfig::basketball());
        let mut state = MatchState::live();
        state = sport.apply_score(&state, Side::Away, 2).unwrap().state;
        assert_eq!(sport.should_end_match(&state), MatchOutcome::default());

        for _ in 1..4 {
            state = sport.next_period(&state);
        }
        let outcome = sport.should_end_match(&state);
        assert!(!outcome.ended);
        assert_eq!(outcome.winner, Some(Side::Away));
    }

    #[test]
    fn test_soccer_allows_tie_after_regulation() {
        let sport = Sport::from(SportConfig::soccer());
        let state = sport.next_period(&MatchState::live());
        let outcome = sport.should_end_match(&state);
        assert!(!outcome.ended);
        assert!(outcome.tie_allowed);
        assert_eq!(outcome.winner, None);

        let state = sport.apply_score(&state, Side::Home, 1).unwrap().state;
        let outcome = sport.should_end_match(&state);
        assert_eq!(outcome.winner, Some(Side::Home));
        assert!(!outcome.tie_allowed);
    }

    #[test]
    fn test_generic_never_ends() {
        let mut config = SportConfig::generic(3, "Round");
        config.points_to_win_period = Some(5);
        let sport = Sport::from(config);
        let state = play_set(&sport, MatchState::live(), 10, 0);
        assert!(!sport.should_end_period(&state));
        assert!(!sport.should_end_match(&state).ended);
    }

    #[test]
    fn test_undo_reverses_apply() {
        let sport = Sport::from(SportConfig::basketball());
        let start = MatchState::live();
        let scored = sport.apply_score(&start, Side::Home, 2).unwrap().state;
        let undone = sport.undo_score(&scored, Side::Home, 2, 1);
        assert_eq!(undone, start);
    }

    #[test]
    fn test_undo_clamps_out_of_order() {
        let sport = Sport::from(SportConfig::basketball());
        let scored = sport.apply_score(&MatchState::live(), Side::Home, 1).unwrap().state;
        let undone = sport.undo_score(&scored, Side::Home, 3, 1);
        assert_eq!(undone.home_score, 0);
        assert_eq!(undone.home_period_scores, vec![0]);
    }

    #[test]
    fn test_next_period_extends_arrays_and_stops_at_limit() {
        let sport = Sport::from(SportConfig::soccer());
        let second = sport.next_period(&MatchState::live());
        assert_eq!(second.current_period, 2);
        assert_eq!(second.home_period_scores, vec![0, 0]);
        assert_eq!(second.away_period_scores, vec![0, 0]);

        let still_second = sport.next_period(&second);
        assert_eq!(still_second, second);
    }

    #[test]
    fn test_available_actions_cross_product() {
        let sport = Sport::from(SportConfig::basketball());
        let actions = sport.available_actions(&MatchState::live());
        assert_eq!(actions.len(), 6);
        assert!(actions
            .iter()
            .any(|a| a.side == Side::Away && a.points == 3 && a.label == "Three pointer"));

        assert!(sport.available_actions(&MatchState::new()).is_empty());
    }

    #[test]
    fn test_format_period_score() {
        let sport = Sport::from(SportConfig::basketball());
        let state = sport.apply_score(&MatchState::live(), Side::Away, 2).unwrap().state;
        assert_eq!(sport.format_period_score(&state, 1), "0 - 2");
        assert_eq!(sport.format_period_score(&state, 4), "0 - 0");
        assert_eq!(sport.format_score(&state), "0 - 2");
    }

    #[test]
    fn test_oversized_increment_is_rejected_not_overflowed() {
        let mut config = SportConfig::generic(2, "Half");
        config.score_increments = vec![ScoreIncrement::new(3_000_000_000, "Jackpot")];
        let sport = Sport::from(config);

        let err = sport
            .apply_score(&MatchState::live(), Side::Home, 3_000_000_000)
            .unwrap_err();
        assert_eq!(
            err,
            RuleViolation::ScoreLimit {
                side: Side::Home,
                max: MAX_SCORE
            }
        );
    }

    #[test]
    fn test_score_stops_at_max() {
        let sport = Sport::from(SportConfig::basketball());
        let mut state = MatchState::live();
        state.away_score = MAX_SCORE - 2;
        state.away_period_scores = vec![MAX_SCORE - 2];

        let state = sport.apply_score(&state, Side::Away, 2).unwrap().state;
        assert_eq!(state.away_score, MAX_SCORE);
        assert!(matches!(
            sport.apply_score(&state, Side::Away, 1),
            Err(RuleViolation::ScoreLimit { .. })
        ));
    }

    #[test]
    fn test_large_margin_does_not_overflow() {
        let mut config = SportConfig::volleyball();
        config.min_period_margin = u32::MAX;
        let sport = Sport::from(config);
        let state = play_set(&sport, MatchState::live(), 25, 0);
        assert!(!sport.should_end_period(&state));
    }
}
