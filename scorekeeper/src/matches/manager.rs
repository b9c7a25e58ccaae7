//! Match manager: routes commands to per-match actors, spawning them on
//! demand.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, oneshot};

use super::actor::{ActorConfig, MatchActor, MatchHandle};
use super::errors::{MatchError, MatchResult};
use super::messages::{MatchCommand, ScoreRecorded};
use super::models::{Match, MatchId, ScoreEvent};
use crate::db::Store;
use crate::realtime::MatchNotifier;
use crate::sport::{AvailableAction, Side, Sport};

/// Entry point for everything that reads or changes a match
#[derive(Clone)]
pub struct MatchManager {
    store: Arc<dyn Store>,
    notifier: Arc<dyn MatchNotifier>,
    config: ActorConfig,
    actors: Arc<RwLock<HashMap<MatchId, MatchHandle>>>,
}

impl MatchManager {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn MatchNotifier>, config: ActorConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            actors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Handle of the running actor for `id`, spawning one if needed
    async fn handle(&self, id: MatchId) -> MatchHandle {
        if let Some(handle) = self.actors.read().await.get(&id)
            && !handle.is_closed()
        {
            return handle.clone();
        }

        let mut actors = self.actors.write().await;
        if let Some(handle) = actors.get(&id)
            && !handle.is_closed()
        {
            return handle.clone();
        }

        let (actor, handle) =
            MatchActor::new(id, self.store.clone(), self.notifier.clone(), self.config);
        tokio::spawn(actor.run());
        actors.insert(id, handle.clone());
        handle
    }

    /// Drop `handle` from the registry unless it was already replaced
    async fn evict(&self, handle: &MatchHandle) {
        let mut actors = self.actors.write().await;
        if actors
            .get(&handle.match_id())
            .is_some_and(|current| current.same_actor(handle))
        {
            actors.remove(&handle.match_id());
        }
    }

    /// Send a command built by `command` and wait for the answer. An actor
    /// that stopped between lookup and send is replaced once.
    async fn request<T>(
        &self,
        id: MatchId,
        command: impl Fn(oneshot::Sender<MatchResult<T>>) -> MatchCommand,
    ) -> MatchResult<T> {
        for _ in 0..2 {
            let handle = self.handle(id).await;
            let (tx, rx) = oneshot::channel();

            if handle.send(command(tx)).await.is_err() {
                self.evict(&handle).await;
                continue;
            }

            return rx.await.map_err(|_| MatchError::Unavailable(id))?;
        }

        Err(MatchError::Unavailable(id))
    }

    pub async fn start(&self, id: MatchId) -> MatchResult<Match> {
        self.request(id, |response| MatchCommand::Start { response }).await
    }

    pub async fn pause(&self, id: MatchId) -> MatchResult<Match> {
        self.request(id, |response| MatchCommand::Pause { response }).await
    }

    pub async fn end(&self, id: MatchId) -> MatchResult<Match> {
        self.request(id, |response| MatchCommand::End { response }).await
    }

    pub async fn score(&self, id: MatchId, side: Side, points: u32) -> MatchResult<ScoreRecorded> {
        self.request(id, |response| MatchCommand::Score {
            side,
            points,
            response,
        })
        .await
    }

    pub async fn undo(&self, id: MatchId) -> MatchResult<Match> {
        self.request(id, |response| MatchCommand::Undo { response }).await
    }

    pub async fn advance_period(&self, id: MatchId) -> MatchResult<Match> {
        self.request(id, |response| MatchCommand::AdvancePeriod { response })
            .await
    }

    /// Delete a scheduled match and retire its actor
    pub async fn delete(&self, id: MatchId) -> MatchResult<()> {
        self.request(id, |response| MatchCommand::Delete { response })
            .await?;
        self.actors.write().await.remove(&id);
        Ok(())
    }

    pub async fn get(&self, id: MatchId) -> MatchResult<Match> {
        self.store
            .get_match(id)
            .await?
            .ok_or(MatchError::NotFound(id))
    }

    /// Score event log, oldest first
    pub async fn events(&self, id: MatchId) -> MatchResult<Vec<ScoreEvent>> {
        self.get(id).await?;
        Ok(self.store.list_events(id).await?)
    }

    /// Scoring buttons for the current state; empty unless live
    pub async fn available_actions(&self, id: MatchId) -> MatchResult<Vec<AvailableAction>> {
        let m = self.get(id).await?;
        let config = self
            .store
            .sport_for_match(id)
            .await?
            .ok_or(MatchError::NotFound(id))?;

        Ok(Sport::from(config).available_actions(&m.state()))
    }

    /// Number of actors currently registered
    pub async fn active_actors(&self) -> usize {
        self.actors
            .read()
            .await
            .values()
            .filter(|h| !h.is_closed())
            .count()
    }

    /// Forget actors that have stopped
    pub async fn prune(&self) -> usize {
        let mut actors = self.actors.write().await;
        let before = actors.len();
        actors.retain(|_, h| !h.is_closed());
        before - actors.len()
    }
}
