//! Structured logging setup.
//!
//! The library crate logs through the `log` facade; the subscriber installed
//! here picks those records up alongside the server's own `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging. Levels come from `RUST_LOG`.
///
/// # Example
///
/// ```no_run
/// use sk_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a privileged change made through the admin API
///
/// ```
/// use sk_server::logging::log_admin_action;
///
/// log_admin_action("score", "match", 42, Some("home +2"));
/// ```
pub fn log_admin_action(action: &str, entity: &str, id: i64, detail: Option<&str>) {
    tracing::info!(
        admin_action = action,
        entity = entity,
        entity_id = id,
        detail = detail,
        "ADMIN: {} {} {}",
        action,
        entity,
        id
    );
}

/// Log rejected admin credentials
pub fn log_rejected_admin(path: &str) {
    tracing::warn!(http_path = path, "SECURITY: rejected admin password");
}

/// Log performance metric
///
/// ```
/// use sk_server::logging::log_performance;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// let duration = start.elapsed().as_millis() as u64;
/// log_performance("generate_schedule", duration, Some("tournament 7"));
/// ```
pub fn log_performance(operation: &str, duration_ms: u64, metadata: Option<&str>) {
    if duration_ms > 1000 {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "PERFORMANCE: Slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            metadata = metadata,
            "Performance metric"
        );
    }
}
