//! Per-match actor. One task owns each live match id and processes its
//! commands strictly in order, so load, transition, store and notify never
//! interleave for the same match.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use super::errors::{MatchError, MatchResult};
use super::messages::{MatchCommand, ScoreRecorded};
use super::models::{Match, MatchId, NewScoreEvent};
use crate::db::Store;
use crate::lifecycle;
use crate::realtime::{MatchNotifier, Notification, RealtimeMessage};
use crate::sport::{Side, Sport, SportRules};

/// Actor tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorConfig {
    /// Stop after this long without commands
    pub idle_timeout: Duration,
    /// Pending commands per actor
    pub inbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(300),
            inbox_capacity: 64,
        }
    }
}

/// Match actor handle for sending commands
#[derive(Clone)]
pub struct MatchHandle {
    sender: mpsc::Sender<MatchCommand>,
    match_id: MatchId,
}

impl MatchHandle {
    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    /// Send a command; fails once the actor has stopped
    pub async fn send(&self, command: MatchCommand) -> Result<(), MatchError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| MatchError::Unavailable(self.match_id))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub(crate) fn same_actor(&self, other: &MatchHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }
}

/// Actor owning writes to a single match
pub struct MatchActor {
    id: MatchId,
    store: Arc<dyn Store>,
    notifier: Arc<dyn MatchNotifier>,
    inbox: mpsc::Receiver<MatchCommand>,
    idle_timeout: Duration,
    is_closed: bool,
}

impl MatchActor {
    pub fn new(
        id: MatchId,
        store: Arc<dyn Store>,
        notifier: Arc<dyn MatchNotifier>,
        config: ActorConfig,
    ) -> (Self, MatchHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));

        let actor = Self {
            id,
            store,
            notifier,
            inbox,
            idle_timeout: config.idle_timeout,
            is_closed: false,
        };

        (actor, MatchHandle { sender, match_id: id })
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        log::debug!("Match {} actor starting", self.id);

        while !self.is_closed {
            match timeout(self.idle_timeout, self.inbox.recv()).await {
                Ok(Some(command)) => self.handle_command(command).await,
                Ok(None) => break,
                Err(_) => {
                    log::debug!("Match {} actor idle, stopping", self.id);
                    break;
                }
            }
        }

        // Refuse new work, then answer whatever was already queued
        self.inbox.close();
        while let Ok(command) = self.inbox.try_recv() {
            self.handle_command(command).await;
        }

        log::debug!("Match {} actor stopped", self.id);
    }

    async fn handle_command(&mut self, command: MatchCommand) {
        if self.is_closed {
            let _ = match command {
                MatchCommand::Start { response }
                | MatchCommand::Pause { response }
                | MatchCommand::End { response }
                | MatchCommand::Undo { response }
                | MatchCommand::AdvancePeriod { response } => {
                    response.send(Err(MatchError::NotFound(self.id))).map_err(|_| ())
                }
                MatchCommand::Score { response, .. } => {
                    response.send(Err(MatchError::NotFound(self.id))).map_err(|_| ())
                }
                MatchCommand::Delete { response } => {
                    response.send(Err(MatchError::NotFound(self.id))).map_err(|_| ())
                }
            };
            return;
        }

        match command {
            MatchCommand::Start { response } => {
                let _ = response.send(self.start().await);
            }

            MatchCommand::Pause { response } => {
                let _ = response.send(self.pause().await);
            }

            MatchCommand::End { response } => {
                let _ = response.send(self.end().await);
            }

            MatchCommand::Score {
                side,
                points,
                response,
            } => {
                let _ = response.send(self.score(side, points).await);
            }

            MatchCommand::Undo { response } => {
                let _ = response.send(self.undo().await);
            }

            MatchCommand::AdvancePeriod { response } => {
                let _ = response.send(self.advance_period().await);
            }

            MatchCommand::Delete { response } => {
                let result = self.delete().await;
                if result.is_ok() {
                    self.is_closed = true;
                }
                let _ = response.send(result);
            }
        }
    }

    /// Fresh copy of the match and its sport rules
    async fn load(&self) -> MatchResult<(Match, Sport)> {
        let m = self
            .store
            .get_match(self.id)
            .await?
            .ok_or(MatchError::NotFound(self.id))?;
        let config = self
            .store
            .sport_for_match(self.id)
            .await?
            .ok_or(MatchError::NotFound(self.id))?;

        Ok((m, Sport::from(config)))
    }

    fn publish(&self, m: &Match, event: RealtimeMessage) {
        self.notifier.publish(Notification::for_match(m, event));
    }

    async fn start(&self) -> MatchResult<Match> {
        let (mut m, _) = self.load().await?;
        lifecycle::start(&mut m, Utc::now())?;
        self.store.update_match(&m).await?;

        log::info!("Match {} started", m.id);
        self.publish(&m, RealtimeMessage::match_started(&m));
        Ok(m)
    }

    async fn pause(&self) -> MatchResult<Match> {
        let (mut m, _) = self.load().await?;
        lifecycle::pause(&mut m)?;
        self.store.update_match(&m).await?;

        log::info!("Match {} paused", m.id);
        self.publish(&m, RealtimeMessage::match_paused(&m));
        Ok(m)
    }

    async fn end(&self) -> MatchResult<Match> {
        let (mut m, _) = self.load().await?;
        let winner = lifecycle::end(&mut m, Utc::now())?;
        self.store.update_match(&m).await?;

        log::info!(
            "Match {} ended {}-{}, winner {:?}",
            m.id,
            m.home_score,
            m.away_score,
            winner
        );
        self.publish(&m, RealtimeMessage::match_ended(&m));
        Ok(m)
    }

    async fn score(&self, side: Side, points: u32) -> MatchResult<ScoreRecorded> {
        let (mut m, sport) = self.load().await?;
        let outcome = lifecycle::score(&mut m, &sport, side, points)?;

        let action = sport
            .config()
            .increment_label(points)
            .unwrap_or("Score")
            .to_string();
        let event = self
            .store
            .record_score(
                &m,
                NewScoreEvent {
                    match_id: m.id,
                    team_side: side,
                    points,
                    period: m.current_period,
                    action,
                },
            )
            .await?;

        log::debug!(
            "Match {}: {} +{} ({}), now {}",
            m.id,
            side,
            points,
            event.action,
            sport.format_score(&m.state())
        );
        if outcome.period_ended {
            log::info!("Match {}: period {} decided", m.id, m.current_period);
        }

        self.publish(&m, RealtimeMessage::score_event(&m, event.clone()));
        Ok(ScoreRecorded {
            snapshot: m,
            event,
            period_ended: outcome.period_ended,
            outcome: outcome.outcome,
        })
    }

    async fn undo(&self) -> MatchResult<Match> {
        let (mut m, sport) = self.load().await?;
        let latest = self.store.latest_active_event(m.id).await?;
        lifecycle::undo(&mut m, &sport, latest.as_ref())?;

        // undo() only succeeds with an event present
        let Some(event) = latest else {
            return Err(lifecycle::LifecycleError::NoEventToUndo.into());
        };
        self.store.undo_event(&m, event.id).await?;

        log::info!("Match {}: undid event {} ({} {})", m.id, event.id, event.team_side, event.points);
        self.publish(&m, RealtimeMessage::match_update(&m));
        Ok(m)
    }

    async fn advance_period(&self) -> MatchResult<Match> {
        let (mut m, sport) = self.load().await?;
        lifecycle::advance_period(&mut m, &sport)?;
        self.store.update_match(&m).await?;

        log::info!(
            "Match {}: {} {} begins",
            m.id,
            sport.config().period_label,
            m.current_period
        );
        self.publish(&m, RealtimeMessage::period_changed(&m));
        Ok(m)
    }

    async fn delete(&self) -> MatchResult<()> {
        let (m, _) = self.load().await?;
        lifecycle::ensure_deletable(&m)?;
        self.store.delete_match(m.id).await?;

        log::info!("Match {} deleted", m.id);
        self.notifier.publish(Notification::deleted(m.tournament_id, m.id));
        Ok(())
    }
}
