//! End-to-end match flows through the manager, actors, the in-memory store
//! and a recording notifier.

use std::sync::Arc;
use std::time::Duration;

use scorekeeper::bracket::{BracketOptions, TournamentFormat};
use scorekeeper::db::{MatchRepository, MemoryStore};
use scorekeeper::lifecycle::LifecycleError;
use scorekeeper::matches::{ActorConfig, Match, MatchError, MatchManager};
use scorekeeper::realtime::{
    MatchNotifier, NotificationHub, RealtimeMessage, RecordingNotifier, Room,
};
use scorekeeper::sport::{MatchStatus, RuleViolation, Side, SportKind};
use scorekeeper::tournament::{NewTeam, NewTournament, TournamentService};

struct Fixture {
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    manager: MatchManager,
    matches: Vec<Match>,
}

async fn fixture(sport: SportKind, teams: usize, config: ActorConfig) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let service = TournamentService::new(store.clone());

    let tournament = service
        .create(&NewTournament::with_preset(
            "League",
            TournamentFormat::RoundRobin,
            sport,
        ))
        .await
        .unwrap();
    for i in 0..teams {
        service
            .add_team(tournament.id, &NewTeam::seeded(format!("Team {i}"), i as i32 + 1))
            .await
            .unwrap();
    }
    let schedule = service
        .generate_schedule(tournament.id, &BracketOptions::default())
        .await
        .unwrap();

    let manager = MatchManager::new(store.clone(), notifier.clone(), config);
    Fixture {
        store,
        notifier,
        manager,
        matches: schedule.matches,
    }
}

#[tokio::test]
async fn test_basketball_match_flow() {
    let f = fixture(SportKind::Basketball, 2, ActorConfig::default()).await;
    let id = f.matches[0].id;

    let started = f.manager.start(id).await.unwrap();
    assert_eq!(started.status, MatchStatus::Live);
    assert!(started.started_at.is_some());

    f.manager.score(id, Side::Home, 3).await.unwrap();
    f.manager.score(id, Side::Away, 2).await.unwrap();
    let recorded = f.manager.score(id, Side::Home, 2).await.unwrap();
    assert_eq!(recorded.snapshot.home_score, 5);
    assert_eq!(recorded.event.action, "Field goal");
    assert_eq!(recorded.event.period, 1);

    let after_period = f.manager.advance_period(id).await.unwrap();
    assert_eq!(after_period.current_period, 2);
    assert_eq!(after_period.home_period_scores, vec![5, 0]);

    let ended = f.manager.end(id).await.unwrap();
    assert_eq!(ended.status, MatchStatus::Completed);
    assert_eq!(ended.winner_id, ended.home_team_id);

    let kinds: Vec<&str> = f
        .notifier
        .notifications()
        .iter()
        .map(|n| n.event.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "match_started",
            "score_event",
            "score_event",
            "score_event",
            "period_changed",
            "match_ended"
        ]
    );

    let stored = f.store.get_match(id).await.unwrap().unwrap();
    assert_eq!(stored, ended);
}

#[tokio::test]
async fn test_failures_do_not_notify() {
    let f = fixture(SportKind::Basketball, 2, ActorConfig::default()).await;
    let id = f.matches[0].id;

    let err = f.manager.score(id, Side::Home, 2).await.unwrap_err();
    assert!(matches!(
        err,
        MatchError::Lifecycle(LifecycleError::Rule(RuleViolation::MatchNotLive { .. }))
    ));
    assert!(matches!(f.manager.pause(id).await, Err(MatchError::Lifecycle(_))));
    assert!(matches!(
        f.manager.undo(id).await,
        Err(MatchError::Lifecycle(LifecycleError::NoEventToUndo))
    ));

    f.manager.start(id).await.unwrap();
    assert!(matches!(
        f.manager.score(id, Side::Home, 4).await,
        Err(MatchError::Lifecycle(LifecycleError::Rule(
            RuleViolation::InvalidPoints { points: 4, .. }
        )))
    ));

    assert_eq!(f.notifier.len(), 1, "only the start was published");
    assert!(matches!(f.manager.get(9999).await, Err(MatchError::NotFound(9999))));
    assert!(matches!(f.manager.start(9999).await, Err(MatchError::NotFound(9999))));
    assert_eq!(f.notifier.len(), 1);
}

#[tokio::test]
async fn test_undo_reverts_latest_event() {
    let f = fixture(SportKind::Basketball, 2, ActorConfig::default()).await;
    let id = f.matches[0].id;
    f.manager.start(id).await.unwrap();
    f.manager.score(id, Side::Home, 3).await.unwrap();
    f.manager.score(id, Side::Away, 1).await.unwrap();
    f.notifier.take();

    let undone = f.manager.undo(id).await.unwrap();
    assert_eq!((undone.home_score, undone.away_score), (3, 0));

    let events = f.manager.events(id).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(!events[0].undone);
    assert!(events[1].undone);

    let undone = f.manager.undo(id).await.unwrap();
    assert_eq!((undone.home_score, undone.away_score), (0, 0));
    assert!(matches!(
        f.manager.undo(id).await,
        Err(MatchError::Lifecycle(LifecycleError::NoEventToUndo))
    ));

    let published = f.notifier.take();
    assert_eq!(published.len(), 2);
    assert!(published.iter().all(|n| n.event.kind() == "match_update"));
}

#[tokio::test]
async fn test_volleyball_three_sets() {
    let f = fixture(SportKind::Volleyball, 2, ActorConfig::default()).await;
    let id = f.matches[0].id;
    f.manager.start(id).await.unwrap();

    for set in 1..=3 {
        for _ in 0..20 {
            f.manager.score(id, Side::Away, 1).await.unwrap();
        }
        for point in 1..=25 {
            let recorded = f.manager.score(id, Side::Home, 1).await.unwrap();
            assert_eq!(recorded.period_ended, point == 25, "set {set}, point {point}");
            if point == 25 && set == 3 {
                assert!(recorded.outcome.ended);
                assert_eq!(recorded.outcome.winner, Some(Side::Home));
            }
        }
        if set < 3 {
            f.manager.advance_period(id).await.unwrap();
        }
    }

    let ended = f.manager.end(id).await.unwrap();
    assert_eq!(ended.winner_id, ended.home_team_id);
}

#[tokio::test]
async fn test_available_actions_only_while_live() {
    let f = fixture(SportKind::Basketball, 2, ActorConfig::default()).await;
    let id = f.matches[0].id;
    assert!(f.manager.available_actions(id).await.unwrap().is_empty());

    f.manager.start(id).await.unwrap();
    let actions = f.manager.available_actions(id).await.unwrap();
    assert_eq!(actions.len(), 6);
}

#[tokio::test]
async fn test_delete_only_scheduled() {
    let f = fixture(SportKind::Soccer, 3, ActorConfig::default()).await;
    let (first, second) = (f.matches[0].id, f.matches[1].id);

    f.manager.start(first).await.unwrap();
    assert!(matches!(
        f.manager.delete(first).await,
        Err(MatchError::Lifecycle(LifecycleError::NotDeletable(MatchStatus::Live)))
    ));

    f.notifier.take();
    f.manager.delete(second).await.unwrap();
    let published = f.notifier.take();
    assert_eq!(published.len(), 1);
    assert_eq!(
        published[0].event,
        RealtimeMessage::MatchDeleted { match_id: second }
    );
    assert!(matches!(f.manager.get(second).await, Err(MatchError::NotFound(_))));
    assert!(matches!(f.manager.start(second).await, Err(MatchError::NotFound(_))));
}

#[tokio::test]
async fn test_concurrent_scores_are_serialized() {
    let f = fixture(SportKind::Basketball, 2, ActorConfig::default()).await;
    let id = f.matches[0].id;
    f.manager.start(id).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..50 {
        let manager = f.manager.clone();
        let side = if i % 2 == 0 { Side::Home } else { Side::Away };
        tasks.push(tokio::spawn(async move { manager.score(id, side, 1).await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let m = f.manager.get(id).await.unwrap();
    assert_eq!(m.home_score + m.away_score, 50);
    assert_eq!(f.manager.events(id).await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_idle_actor_is_respawned() {
    let config = ActorConfig {
        idle_timeout: Duration::from_millis(20),
        inbox_capacity: 8,
    };
    let f = fixture(SportKind::Basketball, 2, config).await;
    let id = f.matches[0].id;

    f.manager.start(id).await.unwrap();
    assert_eq!(f.manager.active_actors().await, 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(f.manager.active_actors().await, 0);

    let paused = f.manager.pause(id).await.unwrap();
    assert_eq!(paused.status, MatchStatus::Paused);
    assert_eq!(f.manager.active_actors().await, 1);
}

#[tokio::test]
async fn test_hub_routes_to_match_and_tournament_rooms() {
    let store = Arc::new(MemoryStore::new());
    let hub = Arc::new(NotificationHub::default());
    let service = TournamentService::new(store.clone());
    let t = service
        .create(&NewTournament::with_preset(
            "Cup",
            TournamentFormat::SingleElimination,
            SportKind::Soccer,
        ))
        .await
        .unwrap();
    for name in ["A", "B"] {
        service.add_team(t.id, &NewTeam::new(name)).await.unwrap();
    }
    let schedule = service
        .generate_schedule(t.id, &BracketOptions::default())
        .await
        .unwrap();
    let id = schedule.matches[0].id;

    let mut match_room = hub.subscribe(Room::Match(id));
    let mut tournament_room = hub.subscribe(Room::Tournament(t.id));
    let manager = MatchManager::new(
        store.clone(),
        hub.clone() as Arc<dyn MatchNotifier>,
        ActorConfig::default(),
    );

    manager.start(id).await.unwrap();
    manager.score(id, Side::Away, 1).await.unwrap();

    let started = match_room.receiver.recv().await.unwrap();
    assert_eq!(started.kind(), "match_started");
    let scored = match_room.receiver.recv().await.unwrap();
    assert_eq!(scored.kind(), "score_event");

    for expected_status in [MatchStatus::Live, MatchStatus::Live] {
        match tournament_room.receiver.recv().await.unwrap() {
            RealtimeMessage::TournamentMatchUpdate {
                tournament_id,
                match_id,
                status,
                ..
            } => {
                assert_eq!((tournament_id, match_id), (t.id, id));
                assert_eq!(status, expected_status);
            }
            other => panic!("unexpected tournament message {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_regeneration_replaces_matches() {
    let f = fixture(SportKind::Soccer, 4, ActorConfig::default()).await;
    let old = f.matches[0].id;
    f.manager.start(old).await.unwrap();
    f.manager.score(old, Side::Home, 1).await.unwrap();

    let service = TournamentService::new(f.store.clone());
    let tournament_id = f.matches[0].tournament_id;
    let schedule = service
        .generate_schedule(tournament_id, &BracketOptions::default())
        .await
        .unwrap();

    assert_eq!(schedule.matches.len(), 6);
    assert!(schedule.matches.iter().all(|m| m.status == MatchStatus::Scheduled));
    assert!(matches!(f.manager.start(old).await, Err(MatchError::NotFound(_))));
}
