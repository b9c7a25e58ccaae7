//! Sport rule engine.
//!
//! Pure functions over a [`MatchState`]: validation of scoring actions,
//! applying and undoing scores, period advancement and per-sport end
//! conditions. Nothing here persists or notifies.
//!
//! ## Example
//!
//! ```
//! use scorekeeper::sport::{MatchState, Side, Sport, SportConfig};
//!
//! let sport = Sport::from(SportConfig::basketball());
//! let outcome = sport.apply_score(&MatchState::live(), Side::Home, 3).unwrap();
//! assert_eq!(outcome.state.home_score, 3);
//! ```

pub mod config;
pub mod rules;
pub mod state;

pub use config::{MAX_PERIODS, MAX_SCORE_INCREMENT, ScoreIncrement, SportConfig, SportKind};
pub use rules::{
    AvailableAction, MatchOutcome, RuleViolation, ScoreOutcome, Sport, SportRules,
};
pub use state::{MAX_SCORE, MatchState, MatchStatus, Side};
