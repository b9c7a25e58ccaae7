//! HTTP/WebSocket API for the scoring server.
//!
//! # Architecture
//!
//! - **Axum**: async web framework for HTTP/WebSocket
//! - **Tower**: middleware for CORS, request IDs and the admin gate
//! - **Actor model**: every match write goes through the match's actor task
//!
//! # Modules
//!
//! - [`tournaments`]: tournaments, teams, schedule generation, standings
//! - [`matches`]: match reads and lifecycle operations
//! - [`websocket`]: realtime match and tournament rooms
//! - [`middleware`]: admin password gate for mutating endpoints
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sk_server::api::{AppState, create_router};
//! use sk_server::api::middleware::hash_password;
//! use scorekeeper::db::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::new(
//!     Arc::new(MemoryStore::new()),
//!     hash_password("change me").map_err(|e| e.to_string())?,
//!     Default::default(),
//!     None,
//! );
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:6969").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod matches;
pub mod middleware;
pub mod request_id;
pub mod tournaments;
pub mod websocket;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
};
use scorekeeper::db::{Database, Store};
use scorekeeper::matches::{ActorConfig, MatchManager};
use scorekeeper::realtime::NotificationHub;
use scorekeeper::tournament::TournamentService;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::metrics;

/// Application state shared across all HTTP handlers and WebSocket
/// connections. Cloned per request; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub matches: Arc<MatchManager>,
    pub tournaments: Arc<TournamentService>,
    pub hub: Arc<NotificationHub>,
    /// Argon2 PHC string of the admin password
    pub admin_password_hash: Arc<str>,
    /// Present when running on PostgreSQL, for the health check
    pub database: Option<Database>,
}

impl AppState {
    /// Wire the match manager, tournament service and hub around `store`
    pub fn new(
        store: Arc<dyn Store>,
        admin_password_hash: String,
        actors: ActorConfig,
        database: Option<Database>,
    ) -> Self {
        let hub = Arc::new(NotificationHub::default());
        let matches = MatchManager::new(store.clone(), hub.clone(), actors);

        Self {
            matches: Arc::new(matches),
            tournaments: Arc::new(TournamentService::new(store)),
            hub,
            admin_password_hash: admin_password_hash.into(),
            database,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET    /health                                  - Health check
/// GET    /api/v1/tournaments                      - List tournaments
/// POST   /api/v1/tournaments                      - Create tournament (admin)
/// GET    /api/v1/tournaments/{id}                 - Get tournament
/// GET    /api/v1/tournaments/{id}/teams           - List teams
/// POST   /api/v1/tournaments/{id}/teams           - Register team (admin)
/// PUT    /api/v1/tournaments/{id}/teams/seeds     - Bulk seed edit (admin)
/// GET    /api/v1/tournaments/{id}/groups          - List groups
/// POST   /api/v1/tournaments/{id}/generate        - (Re)generate schedule (admin)
/// GET    /api/v1/tournaments/{id}/matches         - List matches
/// GET    /api/v1/tournaments/{id}/standings       - Group tables
/// GET    /api/v1/matches/{id}                     - Get match
/// GET    /api/v1/matches/{id}/events              - Score event log
/// GET    /api/v1/matches/{id}/actions             - Scoring buttons
/// POST   /api/v1/matches/{id}/start               - Start or resume (admin)
/// POST   /api/v1/matches/{id}/pause               - Pause (admin)
/// POST   /api/v1/matches/{id}/end                 - End (admin)
/// POST   /api/v1/matches/{id}/score               - Record score (admin)
/// POST   /api/v1/matches/{id}/undo                - Undo last score (admin)
/// POST   /api/v1/matches/{id}/next-period         - Advance period (admin)
/// DELETE /api/v1/matches/{id}                     - Delete scheduled match (admin)
/// GET    /ws/matches/{id}                         - Match room
/// GET    /ws/tournaments/{id}                     - Tournament room
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws/matches/{match_id}", get(websocket::match_socket))
        .route(
            "/ws/tournaments/{tournament_id}",
            get(websocket::tournament_socket),
        );

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{id}", get(tournaments::get_tournament))
        .route("/tournaments/{id}/teams", get(tournaments::list_teams))
        .route("/tournaments/{id}/groups", get(tournaments::list_groups))
        .route("/tournaments/{id}/matches", get(tournaments::list_matches))
        .route("/tournaments/{id}/standings", get(tournaments::standings))
        .route("/matches/{id}", get(matches::get_match))
        .route("/matches/{id}/events", get(matches::list_events))
        .route("/matches/{id}/actions", get(matches::available_actions));

    let admin_routes = Router::new()
        .route("/tournaments", post(tournaments::create_tournament))
        .route("/tournaments/{id}/teams", post(tournaments::add_team))
        .route("/tournaments/{id}/teams/seeds", put(tournaments::update_seeds))
        .route("/tournaments/{id}/generate", post(tournaments::generate_schedule))
        .route("/matches/{id}", delete(matches::delete_match))
        .route("/matches/{id}/start", post(matches::start_match))
        .route("/matches/{id}/pause", post(matches::pause_match))
        .route("/matches/{id}/end", post(matches::end_match))
        .route("/matches/{id}/score", post(matches::score))
        .route("/matches/{id}/undo", post(matches::undo))
        .route("/matches/{id}/next-period", post(matches::next_period))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::admin_middleware,
        ));

    Router::new().merge(public_routes).merge(admin_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable`
/// otherwise.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (storage, db_healthy) = match &state.database {
        Some(db) => ("postgres", db.health_check().await.is_ok()),
        None => ("memory", true),
    };

    let actors = state.matches.active_actors().await;
    metrics::active_match_actors(actors);

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "database": db_healthy,
        "matchActors": actors,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
