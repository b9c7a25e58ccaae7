//! # Scorekeeper
//!
//! Tournament scheduling and live match scoring.
//!
//! The kernel is two sets of pure functions: a bracket generator that turns a
//! team count and a format into groups and matches, and a per-sport rule
//! engine that decides how a match's score, periods and status evolve.
//! Around it sit a match lifecycle state machine, per-match actors that
//! serialize writes, a realtime notification hub and storage backends.
//!
//! ## Core Modules
//!
//! - [`bracket`]: round robin, single elimination and group + knockout schedules
//! - [`sport`]: sport configuration, presets and scoring rules
//! - [`lifecycle`]: status transitions (start, pause, end, score, undo, periods)
//! - [`matches`]: match models, actors and the [`MatchManager`]
//! - [`tournament`]: tournaments, teams and schedule generation
//! - [`realtime`]: notification contract and subscriber hub
//! - [`db`]: repository traits, in-memory and PostgreSQL stores
//!
//! ## Example
//!
//! ```
//! use scorekeeper::{MatchState, Side, Sport, SportConfig};
//!
//! let volleyball = Sport::from(SportConfig::volleyball());
//! let mut state = MatchState::live();
//! for _ in 0..24 {
//!     state = volleyball.apply_score(&state, Side::Home, 1).unwrap().state;
//! }
//! let outcome = volleyball.apply_score(&state, Side::Home, 1).unwrap();
//! assert!(outcome.period_ended);
//! assert_eq!(outcome.state.home_score, 25);
//! ```

pub mod bracket;
pub use bracket::{Bracket, BracketError, BracketOptions, Stage, TournamentFormat};

pub mod sport;
pub use sport::{MatchState, MatchStatus, RuleViolation, Side, Sport, SportConfig, SportKind};

pub mod lifecycle;
pub use lifecycle::{LifecycleError, MatchAction};

pub mod matches;
pub use matches::{Match, MatchError, MatchManager, ScoreEvent};

pub mod tournament;
pub use tournament::{Team, Tournament, TournamentError, TournamentService};

pub mod realtime;
pub use realtime::{MatchNotifier, NotificationHub, RealtimeMessage};

pub mod db;
pub use db::{MemoryStore, PgStore, Store};
