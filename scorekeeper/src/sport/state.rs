//! Score state shared by the rule engine and the match lifecycle.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Which of the two competing slots an action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }

    pub fn opponent(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Side::Home),
            "away" => Ok(Side::Away),
            other => Err(format!("Unknown side: {other}")),
        }
    }
}

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Not started yet
    Scheduled,
    /// In play, scoring allowed
    Live,
    /// Interrupted, can be resumed
    Paused,
    /// Finished
    Completed,
    /// Called off
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Paused => "paused",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "live" => Ok(MatchStatus::Live),
            "paused" => Ok(MatchStatus::Paused),
            "completed" => Ok(MatchStatus::Completed),
            "cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(format!("Unknown match status: {other}")),
        }
    }
}

/// Highest total a side can reach. Scores are stored as `INTEGER`.
pub const MAX_SCORE: u32 = i32::MAX as u32;

/// Scoring view of a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub home_score: u32,
    pub away_score: u32,
    /// Index 0 is period 1
    pub home_period_scores: Vec<u32>,
    pub away_period_scores: Vec<u32>,
    /// 1-indexed
    pub current_period: u32,
    pub status: MatchStatus,
}

impl MatchState {
    /// Fresh state for a match that has not started
    pub fn new() -> Self {
        Self {
            home_score: 0,
            away_score: 0,
            home_period_scores: vec![0],
            away_period_scores: vec![0],
            current_period: 1,
            status: MatchStatus::Scheduled,
        }
    }

    /// Fresh state already in play
    pub fn live() -> Self {
        Self {
            status: MatchStatus::Live,
            ..Self::new()
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_score,
            Side::Away => self.away_score,
        }
    }

    pub fn period_scores(&self, side: Side) -> &[u32] {
        match side {
            Side::Home => &self.home_period_scores,
            Side::Away => &self.away_period_scores,
        }
    }

    /// Score of both sides in a 1-indexed period
    pub fn period_score(&self, period: u32) -> (u32, u32) {
        let idx = period.saturating_sub(1) as usize;
        (
            self.home_period_scores.get(idx).copied().unwrap_or(0),
            self.away_period_scores.get(idx).copied().unwrap_or(0),
        )
    }

    /// Side with the higher total, `None` when level
    pub fn leader(&self) -> Option<Side> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Grow both period arrays to cover `period` (never shrinks)
    pub(crate) fn ensure_period(&mut self, period: u32) {
        let len = period.max(1) as usize;
        if self.home_period_scores.len() < len {
            self.home_period_scores.resize(len, 0);
        }
        if self.away_period_scores.len() < len {
            self.away_period_scores.resize(len, 0);
        }
    }

    /// Add `points` to `side` in `period`. Returns `None`, leaving the state
    /// untouched, when the side's total would pass [`MAX_SCORE`].
    pub(crate) fn add(&mut self, side: Side, period: u32, points: u32) -> Option<()> {
        let idx = (period.max(1) - 1) as usize;
        let total = self.score(side).checked_add(points).filter(|t| *t <= MAX_SCORE)?;
        let bucket = self
            .period_scores(side)
            .get(idx)
            .copied()
            .unwrap_or(0)
            .checked_add(points)?;

        self.ensure_period(period);
        let (score, buckets) = match side {
            Side::Home => (&mut self.home_score, &mut self.home_period_scores),
            Side::Away => (&mut self.away_score, &mut self.away_period_scores),
        };
        *score = total;
        buckets[idx] = bucket;
        Some(())
    }

    pub(crate) fn subtract(&mut self, side: Side, period: u32, points: u32) {
        let idx = period.max(1) as usize - 1;
        let (total, buckets) = match side {
            Side::Home => (&mut self.home_score, &mut self.home_period_scores),
            Side::Away => (&mut self.away_score, &mut self.away_period_scores),
        };
        *total = total.saturating_sub(points);
        if let Some(bucket) = buckets.get_mut(idx) {
            *bucket = bucket.saturating_sub(points);
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}
