//! Score paired with an init score.

use std::cmp::Ordering;
use std::fmt;

use super::traits::{ParseableScore, Score, ScoreParseError};
use super::trend::InitializingScoreTrend;

/// A score together with its initialization marker.
///
/// `init_score` is zero when every planning variable is assigned and
/// `-n` when `n` variables are still unassigned. Scores with a lower
/// init score always compare worse, whatever their levels say.
///
/// # Examples
///
/// ```
/// use scoreflow_core::{HardSoftScore, InitializedScore, ParseableScore};
///
/// let partial = InitializedScore::new(-2, HardSoftScore::of(0, -3));
/// assert_eq!(partial.to_string(), "-2init/0hard/-3soft");
///
/// let complete = InitializedScore::<HardSoftScore>::parse("0hard/-10soft").unwrap();
/// assert!(complete.is_solution_initialized());
/// assert!(complete > partial);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitializedScore<S> {
    init_score: i32,
    score: S,
}

impl<S: Score> InitializedScore<S> {
    pub fn new(init_score: i32, score: S) -> Self {
        Self { init_score, score }
    }

    /// A fully initialized score.
    pub fn initialized(score: S) -> Self {
        Self {
            init_score: 0,
            score,
        }
    }

    #[inline]
    pub fn init_score(&self) -> i32 {
        self.init_score
    }

    #[inline]
    pub fn score(&self) -> S {
        self.score
    }

    pub fn is_solution_initialized(&self) -> bool {
        self.init_score >= 0
    }

    pub fn with_init_score(self, init_score: i32) -> Self {
        Self { init_score, ..self }
    }

    /// Feasible only once fully initialized.
    pub fn is_feasible(&self) -> bool {
        self.is_solution_initialized() && self.score.is_feasible()
    }

    pub fn optimistic_bound(&self, trend: &InitializingScoreTrend) -> Self {
        Self::initialized(self.score.optimistic_bound(trend))
    }

    pub fn pessimistic_bound(&self, trend: &InitializingScoreTrend) -> Self {
        Self::initialized(self.score.pessimistic_bound(trend))
    }
}

impl<S: Score> Ord for InitializedScore<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.init_score
            .cmp(&other.init_score)
            .then_with(|| self.score.cmp(&other.score))
    }
}

impl<S: Score> PartialOrd for InitializedScore<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Score> fmt::Display for InitializedScore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.init_score == 0 {
            write!(f, "{}", self.score)
        } else {
            write!(f, "{}init/{}", self.init_score, self.score)
        }
    }
}

impl<S: ParseableScore> InitializedScore<S> {
    /// Parses `"-2init/0hard/-3soft"` or a plain score string.
    pub fn parse(s: &str) -> Result<Self, ScoreParseError> {
        let s = s.trim();
        let (first, rest) = match s.split_once('/') {
            Some((first, rest)) => (first, Some(rest)),
            None => (s, None),
        };
        let Some(init) = first.strip_suffix("init") else {
            return S::parse(s).map(Self::initialized);
        };
        let init_score = init
            .trim()
            .parse::<i32>()
            .map_err(|e| ScoreParseError::new(format!("Invalid init score '{}': {}", init, e)))?;
        let rest = rest.ok_or_else(|| {
            ScoreParseError::new(format!("Score '{}' has an init score but no levels", s))
        })?;
        Ok(Self::new(init_score, S::parse(rest)?))
    }

    pub fn to_string_repr(&self) -> String {
        if self.init_score == 0 {
            self.score.to_string_repr()
        } else {
            format!("{}init/{}", self.init_score, self.score.to_string_repr())
        }
    }
}

impl<S: Score> From<S> for InitializedScore<S> {
    fn from(score: S) -> Self {
        Self::initialized(score)
    }
}
