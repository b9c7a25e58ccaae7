//! Admin gate for mutating endpoints.
//!
//! Scorekeepers authenticate with a shared admin password sent in the
//! `x-admin-password` header. The server only knows its Argon2 hash as a PHC
//! string (`ADMIN_PASSWORD_HASH`), produced by `sk_server --hash-password`.
//!
//! ```rust,no_run
//! use axum::{Router, routing::post, middleware};
//! # use sk_server::api::middleware::admin_middleware;
//! # use sk_server::api::AppState;
//! # async fn start_match() {}
//! # let state: AppState = unimplemented!();
//!
//! let admin_routes: Router<AppState> = Router::new()
//!     .route("/matches/{match_id}/start", post(start_match))
//!     .layer(middleware::from_fn_with_state(state, admin_middleware));
//! # let _ = admin_routes;
//! ```

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;
use super::errors::error_response;
use crate::logging;

/// Header carrying the admin password
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Argon2id PHC string for `password` with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

/// Check `password` against a PHC string. The cost parameters come from the
/// hash itself.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reject requests whose admin password does not verify against the
/// configured hash.
///
/// - **Missing header**: `401 Unauthorized`
/// - **Wrong password**: `403 Forbidden`
/// - **Unusable configured hash**: `500 Internal Server Error`
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let password = request
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok());

    let Some(password) = password else {
        return error_response(StatusCode::UNAUTHORIZED, "Admin password required")
            .into_response();
    };

    match verify_password(password, &state.admin_password_hash) {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            logging::log_rejected_admin(request.uri().path());
            error_response(StatusCode::FORBIDDEN, "Invalid admin password").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Configured admin password hash is unusable");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                .into_response()
        }
    }
}
