//! Constraint identity and polarity.

use std::fmt;

use crate::score::Score;

/// Identity of a constraint: a package plus a name unique within it.
///
/// An empty package is allowed; the full name is then the bare name.
///
/// ```
/// use scoreflow_core::ConstraintRef;
///
/// let conflict = ConstraintRef::new("timetabling", "Room conflict");
/// assert_eq!(conflict.full_name(), "timetabling/Room conflict");
/// assert_eq!(ConstraintRef::new("", "Room conflict").full_name(), "Room conflict");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintRef {
    pub package: String,
    pub name: String,
}

impl ConstraintRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// `package/name`, used as the uniqueness key within a constraint set.
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstraintRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.package.is_empty() {
            write!(f, "{}/", self.package)?;
        }
        f.write_str(&self.name)
    }
}

/// How a constraint's matches move the score.
///
/// # Example
///
/// ```
/// use scoreflow_core::{HardSoftScore, ImpactType};
///
/// let weight = HardSoftScore::ONE_HARD;
/// assert_eq!(ImpactType::Penalty.apply(weight, 30), HardSoftScore::of(-30, 0));
/// assert_eq!(ImpactType::Reward.apply(weight, 2), HardSoftScore::of(2, 0));
/// assert_eq!(ImpactType::Mixed.apply(weight, -2), HardSoftScore::of(-2, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImpactType {
    /// Subtract `weight * match weight` from the score.
    Penalty,
    /// Add `weight * match weight` to the score.
    Reward,
    /// Add `weight * match weight`, where the match weight may have either sign.
    Mixed,
}

impl ImpactType {
    /// Score delta of one match.
    #[inline]
    pub fn apply<Sc: Score>(self, constraint_weight: Sc, match_weight: i64) -> Sc {
        let impact = constraint_weight.times(match_weight);
        match self {
            ImpactType::Penalty => -impact,
            ImpactType::Reward | ImpactType::Mixed => impact,
        }
    }

    /// Penalties and rewards only accept non-negative match weights.
    #[inline]
    pub fn accepts(self, match_weight: i64) -> bool {
        match self {
            ImpactType::Penalty | ImpactType::Reward => match_weight >= 0,
            ImpactType::Mixed => true,
        }
    }
}
