//! The `Score` trait and its string form.

use std::fmt::{Debug, Display};
use std::ops::{Add, Neg, Sub};

use super::trend::{InitializingScoreTrend, TrendLevel};

/// What a level index of a [`Score`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreLevel {
    /// Must be non-negative for the solution to be feasible.
    Hard,
    Medium,
    Soft,
}

/// An ordered vector of integer levels, highest priority first.
///
/// Constraint weights, per-match impacts and session totals are all scores.
/// The engine applies an impact with `+`, undoes it with `-`, and scales a
/// constraint weight by a match weight with [`times`](Score::times).
/// Comparison is lexicographic over the levels.
pub trait Score:
    Copy
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + PartialEq
    + Eq
    + PartialOrd
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// True when every hard level is non-negative.
    fn is_feasible(&self) -> bool;

    fn zero() -> Self;

    fn levels_count() -> usize;

    fn to_level_numbers(&self) -> Vec<i64>;

    /// # Panics
    /// Panics if `levels.len() != levels_count()`.
    fn from_level_numbers(levels: &[i64]) -> Self;

    /// Scales every level by a float, rounding to the nearest integer.
    fn multiply(&self, multiplicand: f64) -> Self;

    fn times(&self, multiplicand: i64) -> Self;

    fn abs(&self) -> Self;

    /// # Panics
    /// Panics if `index >= levels_count()`.
    fn level_label(index: usize) -> ScoreLevel;

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Best score still reachable once the remaining variables are assigned.
    ///
    /// A level whose trend is `OnlyDown` keeps its value; any other level is
    /// unbounded above.
    fn optimistic_bound(&self, trend: &InitializingScoreTrend) -> Self {
        bound_levels(self, trend, TrendLevel::OnlyDown, i64::MAX)
    }

    /// Worst score still reachable once the remaining variables are assigned.
    fn pessimistic_bound(&self, trend: &InitializingScoreTrend) -> Self {
        bound_levels(self, trend, TrendLevel::OnlyUp, i64::MIN)
    }
}

fn bound_levels<Sc: Score + ?Sized>(
    score: &Sc,
    trend: &InitializingScoreTrend,
    kept: TrendLevel,
    open: i64,
) -> Sc {
    let levels: Vec<i64> = score
        .to_level_numbers()
        .into_iter()
        .enumerate()
        .map(|(i, value)| if trend.level(i) == kept { value } else { open })
        .collect();
    Sc::from_level_numbers(&levels)
}

/// Scores with a text form such as `"0hard/-100soft"`.
///
/// Levels are separated by `/` and each value carries its level suffix.
/// `SimpleScore` has no suffix and reads as a bare integer.
pub trait ParseableScore: Score {
    fn parse(text: &str) -> Result<Self, ScoreParseError>;

    fn to_string_repr(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreParseError {
    pub message: String,
}

impl ScoreParseError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScoreParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid score: {}", self.message)
    }
}

impl std::error::Error for ScoreParseError {}

/// Reads one `/`-separated part of a score string.
pub(crate) fn parse_level(
    type_name: &str,
    text: &str,
    part: Option<&str>,
    suffix: &str,
) -> Result<i64, ScoreParseError> {
    let Some(part) = part else {
        return Err(ScoreParseError::new(format!(
            "{type_name} '{text}' is missing its {suffix} level"
        )));
    };
    let digits = part.trim().strip_suffix(suffix).ok_or_else(|| {
        ScoreParseError::new(format!(
            "{type_name} '{text}': level '{part}' does not end with '{suffix}'"
        ))
    })?;
    digits.parse::<i64>().map_err(|err| {
        ScoreParseError::new(format!("{type_name} '{text}': level '{part}': {err}"))
    })
}
