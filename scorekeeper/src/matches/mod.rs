//! Match orchestration.
//!
//! Every write to a match goes through [`MatchManager`], which forwards it
//! to the match's [`MatchActor`]. The actor loads the match, applies a
//! [`lifecycle`](crate::lifecycle) transition, stores the result and then
//! publishes exactly one notification. Failed operations publish nothing.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use scorekeeper::db::MemoryStore;
//! use scorekeeper::matches::{ActorConfig, MatchManager};
//! use scorekeeper::realtime::NotificationHub;
//! use scorekeeper::sport::Side;
//!
//! # async fn run(match_id: i64) -> Result<(), Box<dyn std::error::Error>> {
//! let manager = MatchManager::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(NotificationHub::default()),
//!     ActorConfig::default(),
//! );
//! manager.start(match_id).await?;
//! manager.score(match_id, Side::Home, 2).await?;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod errors;
pub mod manager;
pub mod messages;
pub mod models;

pub use actor::{ActorConfig, MatchActor, MatchHandle};
pub use errors::{MatchError, MatchResult};
pub use manager::MatchManager;
pub use messages::{MatchCommand, ScoreRecorded};
pub use models::{EventId, Match, MatchId, NewMatch, NewScoreEvent, ScoreEvent};
