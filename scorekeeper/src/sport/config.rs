//! Sport configuration models and built-in presets.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Built-in rule variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportKind {
    /// Points accumulate, periods end on the clock (basketball-like)
    Basketball,
    /// Set/game scoring with per-set targets (volleyball-like)
    Volleyball,
    /// Ties are a legal result (soccer-like)
    Soccer,
    /// Behaviour driven purely by configuration
    Generic,
}

impl SportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SportKind::Basketball => "basketball",
            SportKind::Volleyball => "volleyball",
            SportKind::Soccer => "soccer",
            SportKind::Generic => "generic",
        }
    }
}

impl fmt::Display for SportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basketball" => Ok(SportKind::Basketball),
            "volleyball" => Ok(SportKind::Volleyball),
            "soccer" | "football" => Ok(SportKind::Soccer),
            "generic" => Ok(SportKind::Generic),
            other => Err(format!("Unknown sport: {other}")),
        }
    }
}

/// Largest single score increment a sport may define
pub const MAX_SCORE_INCREMENT: u32 = 1000;

/// Largest period count a sport may define
pub const MAX_PERIODS: u32 = 100;

/// A single allowed score increment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreIncrement {
    /// Points added by this action
    pub points: u32,
    /// Human-readable label ("Three pointer", "Goal")
    pub label: String,
}

impl ScoreIncrement {
    pub fn new(points: u32, label: impl Into<String>) -> Self {
        Self {
            points,
            label: label.into(),
        }
    }
}

/// Immutable description of how a sport is scored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportConfig {
    /// Rule variant
    pub kind: SportKind,

    /// Number of regular periods (quarters, halves, best-of sets)
    pub periods: u32,

    /// Label for a period ("Quarter", "Set")
    pub period_label: String,

    /// Allowed score increments, in display order
    pub score_increments: Vec<ScoreIncrement>,

    /// Points needed to win a period. `None` means periods only end
    /// on an explicit signal.
    pub points_to_win_period: Option<u32>,

    /// Reduced target for the last period (e.g. 15 in a fifth set)
    pub final_period_points: Option<u32>,

    /// Minimum lead needed to close out a period with a target
    pub min_period_margin: u32,

    /// Whether a match may finish level
    pub allow_tie: bool,
}

impl SportConfig {
    /// Four quarters, 1/2/3 point scoring
    pub fn basketball() -> Self {
        Self {
            kind: SportKind::Basketball,
            periods: 4,
            period_label: "Quarter".to_string(),
            score_increments: vec![
                ScoreIncrement::new(1, "Free throw"),
                ScoreIncrement::new(2, "Field goal"),
                ScoreIncrement::new(3, "Three pointer"),
            ],
            points_to_win_period: None,
            final_period_points: None,
            min_period_margin: 0,
            allow_tie: false,
        }
    }

    /// Best of five sets to 25 (15 in the deciding set), win by two
    pub fn volleyball() -> Self {
        Self {
            kind: SportKind::Volleyball,
            periods: 5,
            period_label: "Set".to_string(),
            score_increments: vec![ScoreIncrement::new(1, "Point")],
            points_to_win_period: Some(25),
            final_period_points: Some(15),
            min_period_margin: 2,
            allow_tie: false,
        }
    }

    /// Two halves, goals only, draws allowed
    pub fn soccer() -> Self {
        Self {
            kind: SportKind::Soccer,
            periods: 2,
            period_label: "Half".to_string(),
            score_increments: vec![ScoreIncrement::new(1, "Goal")],
            points_to_win_period: None,
            final_period_points: None,
            min_period_margin: 0,
            allow_tie: true,
        }
    }

    /// Configuration-only sport with single point increments
    pub fn generic(periods: u32, period_label: impl Into<String>) -> Self {
        Self {
            kind: SportKind::Generic,
            periods,
            period_label: period_label.into(),
            score_increments: vec![ScoreIncrement::new(1, "Point")],
            points_to_win_period: None,
            final_period_points: None,
            min_period_margin: 0,
            allow_tie: false,
        }
    }

    /// Preset for a built-in kind
    pub fn preset(kind: SportKind) -> Self {
        match kind {
            SportKind::Basketball => Self::basketball(),
            SportKind::Volleyball => Self::volleyball(),
            SportKind::Soccer => Self::soccer(),
            SportKind::Generic => Self::generic(2, "Period"),
        }
    }

    /// Label of the increment worth `points`, if it is allowed
    pub fn increment_label(&self, points: u32) -> Option<&str> {
        self.score_increments
            .iter()
            .find(|inc| inc.points == points)
            .map(|inc| inc.label.as_str())
    }

    /// Allowed point values
    pub fn allowed_points(&self) -> Vec<u32> {
        self.score_increments.iter().map(|inc| inc.points).collect()
    }

    /// Target for a 1-indexed period, taking the reduced last-period
    /// target into account
    pub fn period_target(&self, period: u32) -> Option<u32> {
        let target = self.points_to_win_period?;
        if period == self.periods {
            Some(self.final_period_points.unwrap_or(target))
        } else {
            Some(target)
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.periods == 0 || self.periods > MAX_PERIODS {
            return Err(format!("Sport must have between 1 and {MAX_PERIODS} periods"));
        }

        if self.score_increments.is_empty() {
            return Err("Sport must allow at least one score increment".to_string());
        }

        if self
            .score_increments
            .iter()
            .any(|inc| inc.points == 0 || inc.points > MAX_SCORE_INCREMENT)
        {
            return Err(format!(
                "Score increments must be between 1 and {MAX_SCORE_INCREMENT}"
            ));
        }

        let mut points = self.allowed_points();
        points.sort_unstable();
        if points.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err("Score increments must have distinct point values".to_string());
        }

        if matches!(self.points_to_win_period, Some(0)) || matches!(self.final_period_points, Some(0))
        {
            return Err("Period targets must be positive".to_string());
        }

        Ok(())
    }
}

impl Default for SportConfig {
    fn default() -> Self {
        Self::generic(2, "Period")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volleyball_period_targets() {
        let config = SportConfig::volleyball();
        assert_eq!(config.period_target(1), Some(25));
        assert_eq!(config.period_target(4), Some(25));
        assert_eq!(config.period_target(5), Some(15));
    }

    #[test]
    fn test_basketball_has_no_period_target() {
        let config = SportConfig::basketball();
        assert_eq!(config.period_target(1), None);
        assert_eq!(config.allowed_points(), vec![1, 2, 3]);
        assert_eq!(config.increment_label(3), Some("Three pointer"));
        assert_eq!(config.increment_label(4), None);
    }

    #[test]
    fn test_sport_kind_parsing() {
        assert_eq!("Volleyball".parse::<SportKind>(), Ok(SportKind::Volleyball));
        assert_eq!("football".parse::<SportKind>(), Ok(SportKind::Soccer));
        assert!("curling".parse::<SportKind>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_periods() {
        let mut config = SportConfig::soccer();
        config.periods = 0;
        assert!(config.validate().is_err());
        assert!(SportConfig::soccer().validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_score_increments() {
        let mut huge = SportConfig::generic(2, "Half");
        huge.score_increments = vec![ScoreIncrement::new(3_000_000_000, "Jackpot")];
        assert!(huge.validate().is_err());

        let mut duplicate = SportConfig::basketball();
        duplicate
            .score_increments
            .push(ScoreIncrement::new(2, "Another two"));
        assert!(duplicate.validate().is_err());

        let mut largest = SportConfig::generic(2, "Half");
        largest.score_increments = vec![ScoreIncrement::new(MAX_SCORE_INCREMENT, "Max")];
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_periods() {
        let mut config = SportConfig::generic(MAX_PERIODS, "Round");
        assert!(config.validate().is_ok());
        config.periods = MAX_PERIODS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serializes_kind_lowercase() {
        let json = serde_json::to_value(SportConfig::soccer()).unwrap();
        assert_eq!(json["kind"], "soccer");
        assert_eq!(json["allow_tie"], true);
    }
}
