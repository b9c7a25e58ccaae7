//! Prometheus metrics for the scoring server.
//!
//! Metrics are exposed in Prometheus text format on a separate listener
//! (`METRICS_BIND`). Recording is a no-op until [`init_metrics`] installs the
//! exporter, so handlers and tests call these helpers unconditionally.
//!
//! ```rust,no_run
//! use sk_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//! metrics::http_requests_total("POST", "/api/v1/matches/{id}/score", 200);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter listening on `addr`
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Increments the HTTP request counter. `path` is the matched route
/// template, not the raw URI.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// WebSocket Metrics
// ============================================================================

/// Set current active WebSocket connections count.
pub fn websocket_connections_active(count: u64) {
    metrics::gauge!("websocket_connections_active").set(count as f64);
}

/// Increment total WebSocket connections counter.
pub fn websocket_connections_total(room_kind: &str) {
    metrics::counter!("websocket_connections_total",
        "room" => room_kind.to_string()
    )
    .increment(1);
}

pub fn websocket_messages_sent() {
    metrics::counter!("websocket_messages_sent").increment(1);
}

// ============================================================================
// Scoring Metrics
// ============================================================================

/// Count a successful match operation (`start`, `score`, `undo`, ...)
pub fn match_transitions_total(action: &str) {
    metrics::counter!("match_transitions_total",
        "action" => action.to_string()
    )
    .increment(1);
}

/// Count a rejected match operation
pub fn match_rejections_total(action: &str) {
    metrics::counter!("match_rejections_total",
        "action" => action.to_string()
    )
    .increment(1);
}

pub fn score_events_total(side: &str, points: u32) {
    metrics::counter!("score_events_total",
        "side" => side.to_string()
    )
    .increment(1);
    metrics::histogram!("score_event_points").record(f64::from(points));
}

pub fn schedule_generations_total(format: &str, matches: usize) {
    metrics::counter!("schedule_generations_total",
        "format" => format.to_string()
    )
    .increment(1);
    metrics::histogram!("schedule_matches").record(matches as f64);
}

/// Set current number of running match actors.
pub fn active_match_actors(count: usize) {
    metrics::gauge!("active_match_actors").set(count as f64);
}
