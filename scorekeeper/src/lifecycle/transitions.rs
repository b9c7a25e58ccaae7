//! Status transitions and scoring steps for a single match.

use chrono::{DateTime, Utc};

use super::{LifecycleError, LifecycleResult, MatchAction};
use crate::matches::models::{Match, ScoreEvent};
use crate::sport::{MatchStatus, ScoreOutcome, Side, Sport};
use crate::tournament::models::TeamId;

fn illegal(action: MatchAction, status: MatchStatus) -> LifecycleError {
    LifecycleError::IllegalTransition { action, status }
}

/// Scheduled or paused → live. `started_at` is only set the first time.
pub fn start(m: &mut Match, now: DateTime<Utc>) -> LifecycleResult<()> {
    match m.status {
        MatchStatus::Scheduled | MatchStatus::Paused => {
            m.status = MatchStatus::Live;
            m.started_at.get_or_insert(now);
            Ok(())
        }
        status => Err(illegal(MatchAction::Start, status)),
    }
}

/// Live → paused
pub fn pause(m: &mut Match) -> LifecycleResult<()> {
    if m.status != MatchStatus::Live {
        return Err(illegal(MatchAction::Pause, m.status));
    }

    m.status = MatchStatus::Paused;
    Ok(())
}

/// Any non-terminal status → completed. The higher score wins; a level
/// score records no winner. Returns the recorded winner.
pub fn end(m: &mut Match, now: DateTime<Utc>) -> LifecycleResult<Option<TeamId>> {
    if m.status.is_terminal() {
        return Err(illegal(MatchAction::End, m.status));
    }

    m.winner_id = m.state().leader().and_then(|side| m.team(side));
    m.status = MatchStatus::Completed;
    m.ended_at = Some(now);
    Ok(m.winner_id)
}

/// Validate and apply a score through the sport rules
pub fn score(m: &mut Match, sport: &Sport, side: Side, points: u32) -> LifecycleResult<ScoreOutcome> {
    let outcome = sport.apply_score(&m.state(), side, points)?;
    m.set_state(outcome.state.clone());
    Ok(outcome)
}

/// Reverse `latest`, the most recent non-undone event of `m` if any
pub fn undo(m: &mut Match, sport: &Sport, latest: Option<&ScoreEvent>) -> LifecycleResult<()> {
    if m.status.is_terminal() {
        return Err(illegal(MatchAction::Undo, m.status));
    }

    let event = match latest {
        Some(event) if !event.undone => event,
        _ => return Err(LifecycleError::NoEventToUndo),
    };

    let state = sport.undo_score(&m.state(), event.team_side, event.points, event.period);
    m.set_state(state);
    Ok(())
}

/// Open the next period while below the sport's period count
pub fn advance_period(m: &mut Match, sport: &Sport) -> LifecycleResult<()> {
    if m.status.is_terminal() {
        return Err(illegal(MatchAction::AdvancePeriod, m.status));
    }

    if m.current_period >= sport.periods() {
        return Err(LifecycleError::FinalPeriodReached {
            periods: sport.periods(),
        });
    }

    let state = sport.next_period(&m.state());
    m.set_state(state);
    Ok(())
}

/// Only matches that never started may be deleted
pub fn ensure_deletable(m: &Match) -> LifecycleResult<()> {
    if m.status != MatchStatus::Scheduled {
        return Err(LifecycleError::NotDeletable(m.status));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::Stage;
    use crate::matches::models::NewMatch;
    use crate::sport::{RuleViolation, SportConfig};

    fn new_match() -> Match {
        NewMatch {
            home_team_id: Some(10),
            away_team_id: Some(20),
            stage: Stage::Group,
            round: 1,
            match_number: 1,
            group_index: None,
            is_bye: false,
        }
        .into_match(1, 1, None)
    }

    fn live_match() -> Match {
        let mut m = new_match();
        start(&mut m, Utc::now()).unwrap();
        m
    }

    fn event(side: Side, points: u32, period: u32) -> ScoreEvent {
        ScoreEvent {
            id: 1,
            match_id: 1,
            team_side: side,
            points,
            period,
            action: "Point".to_string(),
            undone: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_start_records_time_once() {
        let mut m = new_match();
        let first = Utc::now();
        start(&mut m, first).unwrap();
        pause(&mut m).unwrap();
        start(&mut m, first + chrono::Duration::minutes(5)).unwrap();
        assert_eq!(m.status, MatchStatus::Live);
        assert_eq!(m.started_at, Some(first));
    }

    #[test]
    fn test_start_rejected_when_live() {
        let mut m = live_match();
        assert_eq!(
            start(&mut m, Utc::now()),
            Err(LifecycleError::IllegalTransition {
                action: MatchAction::Start,
                status: MatchStatus::Live
            })
        );
    }

    #[test]
    fn test_pause_only_from_live() {
        let mut m = new_match();
        assert!(pause(&mut m).is_err());
        start(&mut m, Utc::now()).unwrap();
        assert!(pause(&mut m).is_ok());
        assert!(pause(&mut m).is_err());
    }

    #[test]
    fn test_completed_is_terminal() {
        let sport = Sport::from(SportConfig::soccer());
        let mut m = live_match();
        end(&mut m, Utc::now()).unwrap();

        assert!(matches!(
            start(&mut m, Utc::now()),
            Err(LifecycleError::IllegalTransition { .. })
        ));
        assert!(matches!(pause(&mut m), Err(LifecycleError::IllegalTransition { .. })));
        assert!(matches!(
            advance_period(&mut m, &sport),
            Err(LifecycleError::IllegalTransition { .. })
        ));
        assert!(matches!(
            end(&mut m, Utc::now()),
            Err(LifecycleError::IllegalTransition { .. })
        ));
        assert!(matches!(
            undo(&mut m, &sport, Some(&event(Side::Home, 1, 1))),
            Err(LifecycleError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_end_from_every_non_terminal_status() {
        let scheduled = new_match();
        let live = live_match();
        let mut paused = live_match();
        pause(&mut paused).unwrap();

        for mut m in [scheduled, live, paused] {
            assert!(end(&mut m, Utc::now()).is_ok());
            assert_eq!(m.status, MatchStatus::Completed);
            assert!(m.ended_at.is_some());
        }
    }

    #[test]
    fn test_end_winner_is_higher_score() {
        let sport = Sport::from(SportConfig::basketball());
        let mut m = live_match();
        score(&mut m, &sport, Side::Away, 3).unwrap();
        assert_eq!(end(&mut m, Utc::now()), Ok(Some(20)));
        assert_eq!(m.winner_id, Some(20));
    }

    #[test]
    fn test_end_tied_has_no_winner() {
        let sport = Sport::from(SportConfig::basketball());
        let mut m = live_match();
        score(&mut m, &sport, Side::Away, 2).unwrap();
        score(&mut m, &sport, Side::Home, 2).unwrap();
        assert_eq!(end(&mut m, Utc::now()), Ok(None));
        assert_eq!(m.winner_id, None);
    }

    #[test]
    fn test_score_requires_live() {
        let sport = Sport::from(SportConfig::basketball());
        let mut m = new_match();
        let err = score(&mut m, &sport, Side::Home, 2).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err,
            LifecycleError::Rule(RuleViolation::MatchNotLive {
                status: MatchStatus::Scheduled
            })
        );
    }

    #[test]
    fn test_undo_restores_scores() {
        let sport = Sport::from(SportConfig::basketball());
        let mut m = live_match();
        score(&mut m, &sport, Side::Home, 3).unwrap();
        undo(&mut m, &sport, Some(&event(Side::Home, 3, 1))).unwrap();
        assert_eq!(m.home_score, 0);
        assert_eq!(m.home_period_scores, vec![0]);
    }

    #[test]
    fn test_undo_of_undone_event_rejected() {
        let sport = Sport::from(SportConfig::basketball());
        let mut m = live_match();
        let mut ev = event(Side::Home, 1, 1);
        ev.undone = true;
        assert_eq!(undo(&mut m, &sport, Some(&ev)), Err(LifecycleError::NoEventToUndo));
        assert_eq!(undo(&mut m, &sport, None), Err(LifecycleError::NoEventToUndo));
    }

    #[test]
    fn test_advance_period_limit() {
        let sport = Sport::from(SportConfig::soccer());
        let mut m = live_match();
        advance_period(&mut m, &sport).unwrap();
        assert_eq!(m.current_period, 2);
        assert_eq!(m.home_period_scores.len(), 2);
        assert_eq!(
            advance_period(&mut m, &sport),
            Err(LifecycleError::FinalPeriodReached { periods: 2 })
        );
    }

    #[test]
    fn test_delete_only_when_scheduled() {
        assert!(ensure_deletable(&new_match()).is_ok());
        assert_eq!(
            ensure_deletable(&live_match()),
            Err(LifecycleError::NotDeletable(MatchStatus::Live))
        );
    }
}
