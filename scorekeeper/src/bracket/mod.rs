//! Tournament structure generator.
//!
//! Turns a team count and a format into groups and a match schedule. The
//! generator works on team *indices* in seed order (0 = strongest); callers
//! sort their teams by seed before generating and map indices back to teams
//! afterwards.
//!
//! ## Example
//!
//! ```
//! use scorekeeper::bracket::{generate, BracketOptions, TournamentFormat};
//!
//! let bracket = generate(TournamentFormat::SingleElimination, 8, &BracketOptions::default()).unwrap();
//! assert_eq!(bracket.matches.len(), 7);
//! ```

pub mod elimination;
pub mod groups;
pub mod models;
pub mod round_robin;

pub use elimination::{seeding_order, single_elimination};
pub use groups::{group_knockout, snake_draft};
pub use models::{
    Bracket, BracketGroup, BracketMatch, BracketOptions, Stage, TournamentFormat, group_name,
};
pub use round_robin::round_robin;

use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

/// Bracket generation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    #[error("need at least 2 teams, got {0}")]
    NotEnoughTeams(usize),

    #[error("invalid bracket options: {0}")]
    InvalidOptions(String),
}

/// Generate a schedule using the thread-local RNG for unseeded draws
pub fn generate(
    format: TournamentFormat,
    team_count: usize,
    options: &BracketOptions,
) -> Result<Bracket, BracketError> {
    generate_with_rng(format, team_count, options, &mut rand::rng())
}

/// Generate a schedule. `rng` is only consulted when
/// `options.use_seeding` is false.
pub fn generate_with_rng<R: Rng + ?Sized>(
    format: TournamentFormat,
    team_count: usize,
    options: &BracketOptions,
    rng: &mut R,
) -> Result<Bracket, BracketError> {
    if team_count < 2 {
        return Err(BracketError::NotEnoughTeams(team_count));
    }

    let mut participants: Vec<usize> = (0..team_count).collect();
    if !options.use_seeding {
        participants.shuffle(rng);
    }

    let mut bracket = match format {
        TournamentFormat::RoundRobin => Bracket {
            groups: Vec::new(),
            matches: round_robin(team_count)
                .into_iter()
                .map(|mut m| {
                    m.home = m.home.map(|slot| participants[slot]);
                    m.away = m.away.map(|slot| participants[slot]);
                    m
                })
                .collect(),
        },
        TournamentFormat::SingleElimination | TournamentFormat::DoubleElimination => Bracket {
            groups: Vec::new(),
            matches: single_elimination(&participants, options.third_place_match),
        },
        TournamentFormat::GroupKnockout => group_knockout(
            &participants,
            options.group_count,
            options.advancing_per_group,
            options.third_place_match,
        )?,
    };

    for (i, m) in bracket.matches.iter_mut().enumerate() {
        m.match_number = i as u32 + 1;
    }

    log::debug!(
        "Generated {} bracket for {} teams: {} groups, {} matches",
        format,
        team_count,
        bracket.groups.len(),
        bracket.matches.len()
    );

    Ok(bracket)
}
