//! WebSocket rooms for live score updates.
//!
//! Viewers connect to a match room or a tournament room and receive every
//! realtime message published for it, as JSON text frames:
//!
//! - `GET /ws/matches/{match_id}`: match-scoped events (`score_event`,
//!   `match_started`, `match_update`, ...), preceded by a `match_update`
//!   snapshot of the current state.
//! - `GET /ws/tournaments/{tournament_id}`: one `tournament_match_update`
//!   per change to any match of the tournament.
//!
//! The sockets are receive-only; anything the client sends is ignored apart
//! from close frames.
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws/matches/12');
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'score_event') updateScoreboard(msg);
//! };
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use scorekeeper::matches::MatchId;
use scorekeeper::realtime::{RealtimeMessage, Room, Subscription};
use scorekeeper::tournament::TournamentId;

use super::AppState;
use super::errors::{match_error, tournament_error};
use crate::metrics;

static ACTIVE_CONNECTIONS: AtomicU64 = AtomicU64::new(0);

/// Subscribe to a match room
pub async fn match_socket(
    ws: WebSocketUpgrade,
    Path(match_id): Path<MatchId>,
    State(state): State<AppState>,
) -> Response {
    if let Err(e) = state.matches.get(match_id).await {
        return match_error(e).into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, Room::Match(match_id), state))
}

/// Subscribe to a tournament room
pub async fn tournament_socket(
    ws: WebSocketUpgrade,
    Path(tournament_id): Path<TournamentId>,
    State(state): State<AppState>,
) -> Response {
    if let Err(e) = state.tournaments.get(tournament_id).await {
        return tournament_error(e).into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, Room::Tournament(tournament_id), state))
}

fn room_kind(room: Room) -> &'static str {
    match room {
        Room::Match(_) => "match",
        Room::Tournament(_) => "tournament",
    }
}

/// Join `room`, then read the match snapshot. Anything published after the
/// snapshot was read is already queued on the subscription.
pub async fn subscribe_with_snapshot(
    state: &AppState,
    room: Room,
) -> (Subscription, Option<RealtimeMessage>) {
    let subscription = state.hub.subscribe(room);

    let snapshot = match room {
        Room::Match(match_id) => match state.matches.get(match_id).await {
            Ok(m) => Some(RealtimeMessage::match_update(&m)),
            Err(e) => {
                debug!("No snapshot for {}: {}", room, e);
                None
            }
        },
        Room::Tournament(_) => None,
    };

    (subscription, snapshot)
}

/// Forward room messages to the socket until either side goes away
async fn handle_socket(socket: WebSocket, room: Room, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (mut subscription, snapshot) = subscribe_with_snapshot(&state, room).await;
    let subscriber_id = subscription.id;

    metrics::websocket_connections_total(room_kind(room));
    metrics::websocket_connections_active(ACTIVE_CONNECTIONS.fetch_add(1, Ordering::Relaxed) + 1);
    info!("WebSocket connected: {} (subscriber {})", room, subscriber_id);

    let mut send_task = tokio::spawn(async move {
        let mut pending = snapshot.into_iter();

        loop {
            let message = match pending.next() {
                Some(message) => message,
                None => match subscription.receiver.recv().await {
                    Some(message) => message,
                    None => break,
                },
            };

            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to serialize {}: {}", message.kind(), e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics::websocket_messages_sent();
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => debug!("Ignoring client frame on {}", room),
            }
        }
    });

    // Whichever side finishes first tears down the other
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.unsubscribe(room, subscriber_id);
    metrics::websocket_connections_active(
        ACTIVE_CONNECTIONS
            .fetch_sub(1, Ordering::Relaxed)
            .saturating_sub(1),
    );
    info!("WebSocket disconnected: {} (subscriber {})", room, subscriber_id);
}
