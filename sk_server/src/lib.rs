//! # sk_server
//!
//! HTTP and WebSocket front end for the [`scorekeeper`] tournament scoring
//! kernel.
//!
//! - [`api`]: axum router, handlers and realtime rooms
//! - [`config`]: environment-driven server configuration
//! - [`logging`]: `tracing` subscriber setup and structured log helpers
//! - [`metrics`]: Prometheus counters and gauges

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
