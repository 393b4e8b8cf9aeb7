//! Weights of configurable constraints.
//!
//! A configurable constraint fixes its polarity and match weigher in code
//! and reads its weight from a [`WeightProvider`] once, when the session
//! factory is built. Keys are either a bare constraint name or
//! `package/name`; the qualified key wins.

use std::sync::Arc;

use indexmap::IndexMap;
use scoreflow_config::{ConfigError, ScoringConfig};
use scoreflow_core::{ConstraintRef, ParseableScore, Score};

/// Source of configurable constraint weights.
pub trait WeightProvider<Sc: Score>: Send + Sync {
    /// Weight stored under exactly `key`.
    fn weight(&self, key: &str) -> Option<Sc>;

    fn resolve(&self, constraint: &ConstraintRef) -> Option<Sc> {
        self.weight(&constraint.full_name())
            .or_else(|| self.weight(&constraint.name))
    }
}

impl<Sc: Score, P: WeightProvider<Sc> + ?Sized> WeightProvider<Sc> for Arc<P> {
    fn weight(&self, key: &str) -> Option<Sc> {
        (**self).weight(key)
    }
}

/// In-memory weight table, in insertion order.
///
/// ```
/// use scoreflow_core::{ConstraintRef, HardSoftScore};
/// use scoreflow_scoring::{ConstraintWeightOverrides, WeightProvider};
///
/// let weights = ConstraintWeightOverrides::new()
///     .with("Room stability", HardSoftScore::of_soft(1))
///     .with("timetabling/Room stability", HardSoftScore::of_soft(5));
///
/// let stability = ConstraintRef::new("timetabling", "Room stability");
/// assert_eq!(weights.resolve(&stability), Some(HardSoftScore::of_soft(5)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintWeightOverrides<Sc: Score> {
    weights: IndexMap<String, Sc>,
}

impl<Sc: Score> ConstraintWeightOverrides<Sc> {
    pub fn new() -> Self {
        Self {
            weights: IndexMap::new(),
        }
    }

    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Sc)>) -> Self {
        pairs.into_iter().collect()
    }

    /// Weights from the `constraint_weights` table of a scoring config.
    pub fn from_config(config: &ScoringConfig) -> Result<Self, ConfigError>
    where
        Sc: ParseableScore,
    {
        Ok(Self::from_pairs(config.constraint_weights::<Sc>()?))
    }

    pub fn with(mut self, key: impl Into<String>, weight: Sc) -> Self {
        self.insert(key, weight);
        self
    }

    /// Sets a weight, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, weight: Sc) -> Option<Sc> {
        self.weights.insert(key.into(), weight)
    }

    pub fn remove(&mut self, key: &str) -> Option<Sc> {
        self.weights.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<Sc> {
        self.weights.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Sc)> {
        self.weights.iter().map(|(key, weight)| (key.as_str(), *weight))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl<Sc: Score> Default for ConstraintWeightOverrides<Sc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Sc: Score, K: Into<String>> FromIterator<(K, Sc)> for ConstraintWeightOverrides<Sc> {
    fn from_iter<I: IntoIterator<Item = (K, Sc)>>(pairs: I) -> Self {
        let mut overrides = Self::new();
        overrides.extend(pairs);
        overrides
    }
}

/// Later entries replace earlier ones with the same key.
impl<Sc: Score, K: Into<String>> Extend<(K, Sc)> for ConstraintWeightOverrides<Sc> {
    fn extend<I: IntoIterator<Item = (K, Sc)>>(&mut self, pairs: I) {
        for (key, weight) in pairs {
            self.weights.insert(key.into(), weight);
        }
    }
}

impl<Sc: Score> IntoIterator for ConstraintWeightOverrides<Sc> {
    type Item = (String, Sc);
    type IntoIter = indexmap::map::IntoIter<String, Sc>;

    fn into_iter(self) -> Self::IntoIter {
        self.weights.into_iter()
    }
}

impl<Sc: Score> WeightProvider<Sc> for ConstraintWeightOverrides<Sc> {
    fn weight(&self, key: &str) -> Option<Sc> {
        self.get(key)
    }
}
