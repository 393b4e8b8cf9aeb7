//! Initializing score trend: how each level can move while variables get assigned.

use std::fmt;

use super::traits::ScoreParseError;

/// Direction a single score level can take while the remaining
/// unassigned variables are initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrendLevel {
    /// No guarantee.
    #[default]
    Any,
    /// Assigning more variables never decreases this level.
    OnlyUp,
    /// Assigning more variables never increases this level.
    OnlyDown,
}

impl TrendLevel {
    fn parse(token: &str) -> Result<Self, ScoreParseError> {
        match token.trim() {
            "ANY" => Ok(TrendLevel::Any),
            "ONLY_UP" => Ok(TrendLevel::OnlyUp),
            "ONLY_DOWN" => Ok(TrendLevel::OnlyDown),
            other => Err(ScoreParseError::new(format!(
                "Unknown score trend level '{}': expected ANY, ONLY_UP or ONLY_DOWN",
                other
            ))),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            TrendLevel::Any => "ANY",
            TrendLevel::OnlyUp => "ONLY_UP",
            TrendLevel::OnlyDown => "ONLY_DOWN",
        }
    }
}

/// Per-level trend annotation used to estimate score bounds.
///
/// # Examples
///
/// ```
/// use scoreflow_core::score::{InitializingScoreTrend, TrendLevel};
///
/// let trend = InitializingScoreTrend::parse("ONLY_DOWN/ANY").unwrap();
/// assert_eq!(trend.level(0), TrendLevel::OnlyDown);
/// assert_eq!(trend.level(1), TrendLevel::Any);
///
/// // A single token applies to every level.
/// let uniform = InitializingScoreTrend::parse("ONLY_DOWN").unwrap();
/// assert!(uniform.is_only_down());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitializingScoreTrend {
    levels: Vec<TrendLevel>,
}

impl InitializingScoreTrend {
    pub fn new(levels: Vec<TrendLevel>) -> Self {
        Self { levels }
    }

    /// Same trend for every level.
    pub fn uniform(level: TrendLevel) -> Self {
        Self {
            levels: vec![level],
        }
    }

    /// Parses a slash-separated list such as `"ONLY_DOWN/ANY"`.
    pub fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let levels = s
            .split('/')
            .map(TrendLevel::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { levels })
    }

    /// Trend of the level at `index`.
    ///
    /// A uniform trend applies its single token to every level; levels past
    /// the end of a multi-level trend are `Any`.
    pub fn level(&self, index: usize) -> TrendLevel {
        match self.levels.as_slice() {
            [single] => *single,
            levels => levels.get(index).copied().unwrap_or_default(),
        }
    }

    pub fn is_only_up(&self) -> bool {
        !self.levels.is_empty() && self.levels.iter().all(|l| *l == TrendLevel::OnlyUp)
    }

    pub fn is_only_down(&self) -> bool {
        !self.levels.is_empty() && self.levels.iter().all(|l| *l == TrendLevel::OnlyDown)
    }
}

impl fmt::Display for InitializingScoreTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.levels.iter().map(|l| l.as_str()).collect();
        write!(f, "{}", parts.join("/"))
    }
}
