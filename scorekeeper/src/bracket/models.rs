//! Bracket data models.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Tournament format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Everyone plays everyone once
    RoundRobin,
    /// Knockout bracket
    SingleElimination,
    /// Accepted for compatibility, scheduled as single elimination
    DoubleElimination,
    /// Round-robin groups feeding a knockout bracket
    GroupKnockout,
}

impl TournamentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentFormat::RoundRobin => "round_robin",
            TournamentFormat::SingleElimination => "single_elimination",
            TournamentFormat::DoubleElimination => "double_elimination",
            TournamentFormat::GroupKnockout => "group_knockout",
        }
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TournamentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(TournamentFormat::RoundRobin),
            "single_elimination" => Ok(TournamentFormat::SingleElimination),
            "double_elimination" => Ok(TournamentFormat::DoubleElimination),
            "group_knockout" => Ok(TournamentFormat::GroupKnockout),
            other => Err(format!("Unknown tournament format: {other}")),
        }
    }
}

/// Named phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Group,
    RoundOf16,
    Quarterfinal,
    Semifinal,
    ThirdPlace,
    Final,
}

impl Stage {
    /// Knockout stage for a round, counted back from the final.
    /// Rounds earlier than the round of 16 share the group label.
    pub fn from_rounds_remaining(remaining: u32) -> Self {
        match remaining {
            0 => Stage::Final,
            1 => Stage::Semifinal,
            2 => Stage::Quarterfinal,
            3 => Stage::RoundOf16,
            _ => Stage::Group,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Group => "group",
            Stage::RoundOf16 => "round_of_16",
            Stage::Quarterfinal => "quarterfinal",
            Stage::Semifinal => "semifinal",
            Stage::ThirdPlace => "third_place",
            Stage::Final => "final",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(Stage::Group),
            "round_of_16" => Ok(Stage::RoundOf16),
            "quarterfinal" => Ok(Stage::Quarterfinal),
            "semifinal" => Ok(Stage::Semifinal),
            "third_place" => Ok(Stage::ThirdPlace),
            "final" => Ok(Stage::Final),
            other => Err(format!("Unknown stage: {other}")),
        }
    }
}

/// Generation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketOptions {
    /// Place teams by seed order. When false, participants are shuffled first.
    pub use_seeding: bool,
    /// Number of groups (group + knockout only)
    pub group_count: usize,
    /// Teams per group that reach the knockout (group + knockout only)
    pub advancing_per_group: usize,
    /// Add a third-place playoff next to the final
    pub third_place_match: bool,
}

impl Default for BracketOptions {
    fn default() -> Self {
        Self {
            use_seeding: true,
            group_count: 2,
            advancing_per_group: 2,
            third_place_match: false,
        }
    }
}

/// One scheduled match over team indices. `None` means to be decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub home: Option<usize>,
    pub away: Option<usize>,
    pub round: u32,
    /// 1-based schedule order
    pub match_number: u32,
    pub stage: Stage,
    /// Index into [`Bracket::groups`]
    pub group: Option<usize>,
    pub is_bye: bool,
}

impl BracketMatch {
    pub(crate) fn new(
        home: Option<usize>,
        away: Option<usize>,
        round: u32,
        stage: Stage,
    ) -> Self {
        Self {
            home,
            away,
            round,
            match_number: 0,
            stage,
            group: None,
            is_bye: home.is_some() != away.is_some(),
        }
    }

    /// Both sides to be decided
    pub(crate) fn placeholder(round: u32, stage: Stage) -> Self {
        Self::new(None, None, round, stage)
    }

    /// Team that advances without playing, for byes
    pub fn bye_team(&self) -> Option<usize> {
        if self.is_bye {
            self.home.or(self.away)
        } else {
            None
        }
    }

    pub fn involves(&self, team: usize) -> bool {
        self.home == Some(team) || self.away == Some(team)
    }
}

/// A group of team indices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketGroup {
    pub index: usize,
    pub name: String,
    pub teams: Vec<usize>,
}

impl BracketGroup {
    pub(crate) fn new(index: usize, teams: Vec<usize>) -> Self {
        Self {
            index,
            name: group_name(index),
            teams,
        }
    }
}

/// "Group A" .. "Group Z", then numbered
pub fn group_name(index: usize) -> String {
    if index < 26 {
        format!("Group {}", (b'A' + index as u8) as char)
    } else {
        format!("Group {}", index + 1)
    }
}

/// Generator output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub groups: Vec<BracketGroup>,
    pub matches: Vec<BracketMatch>,
}

impl Bracket {
    pub fn byes(&self) -> impl Iterator<Item = &BracketMatch> {
        self.matches.iter().filter(|m| m.is_bye)
    }

    pub fn rounds(&self) -> u32 {
        self.matches.iter().map(|m| m.round).max().unwrap_or(0)
    }

    pub fn matches_in_round(&self, round: u32) -> impl Iterator<Item = &BracketMatch> {
        self.matches.iter().filter(move |m| m.round == round)
    }
}
