//! Tournaments, teams and schedules.
//!
//! [`TournamentService`] sorts registered teams by seed, runs the
//! [`bracket`](crate::bracket) generator and stores the resulting groups and
//! matches atomically, replacing any previous schedule.

pub mod models;
pub mod service;
pub mod standings;

pub use models::{
    Group, GroupId, NewGroup, NewTeam, NewTournament, Schedule, SeedUpdate, Team, TeamId,
    Tournament, TournamentId, sort_by_seed,
};
pub use service::{
    GroupStandings, TournamentError, TournamentResult, TournamentService, plan_schedule,
};
pub use standings::{Standing, standings};
