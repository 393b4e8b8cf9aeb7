//! Joiners: matching conditions between a stream's tuples and the facts
//! of another stream.
//!
//! A joiner is written against the left stream's element types and the
//! right fact type. Equality joiners produce a hash key that narrows the
//! candidate set; every other joiner is a residual test on the candidates.
//!
//! # Ordering
//!
//! Indexable joiners (`equal`, comparisons, `overlapping`) must come before
//! any `filtering` joiner in an [`and`](EqualJoiner::and) chain. Compiling a
//! constraint that breaks this rule fails with
//! [`DefinitionError::JoinerOrder`](scoreflow_core::DefinitionError::JoinerOrder).
//!
//! # Example
//!
//! ```
//! use scoreflow_scoring::stream::joiner::{equal, less_than};
//!
//! #[derive(Debug)]
//! struct Lecture { id: u32, room: u32, period: u32 }
//!
//! // Same room and period, each unordered pair once.
//! let conflict = equal(|l: &Lecture| (l.room, l.period))
//!     .and(less_than(|l: &Lecture| l.id, |l: &Lecture| l.id));
//! # let _ = conflict;
//! ```

mod comparison;
mod equal;
mod filtering;
mod overlapping;

#[cfg(test)]
mod tests;

use std::fmt::Debug;
use std::hash::Hash;

use crate::tuple::Tuple;

pub use comparison::{
    greater_than, greater_than_or_equal, less_than, less_than_or_equal, Comparison,
    ComparisonJoiner,
};
pub use equal::{equal, equal_bi, EqualJoiner};
pub use filtering::{filtering, FilteringJoiner};
pub use overlapping::{overlapping, overlapping_bi, OverlappingJoiner};

/// Hash key produced by the equality part of a joiner.
pub trait JoinKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T: Eq + Hash + Clone + Debug + Send + Sync + 'static> JoinKey for T {}

/// Kind of a joiner in a chain, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinerKind {
    Equal,
    Comparison,
    Overlapping,
    Filtering,
}

impl JoinerKind {
    pub fn is_indexable(self) -> bool {
        !matches!(self, JoinerKind::Filtering)
    }

    pub fn label(self) -> &'static str {
        match self {
            JoinerKind::Equal => "equal",
            JoinerKind::Comparison => "comparison",
            JoinerKind::Overlapping => "overlapping",
            JoinerKind::Filtering => "filtering",
        }
    }
}

/// Matching condition between a left tuple of element types `L` (a
/// marker tuple such as `(A,)` or `(A, B)`) and a right fact `R`.
pub trait Joiner<L, R>: Send + Sync + 'static {
    /// Hash key of the equality part; `()` when there is none.
    type Key: JoinKey;

    fn left_key(&self, left: &Tuple) -> Self::Key;

    fn right_key(&self, right: &Tuple) -> Self::Key;

    /// Residual predicates, evaluated for pairs whose keys are equal.
    fn test(&self, left: &Tuple, right: &Tuple) -> bool;

    /// Appends the kinds of this joiner chain in declaration order.
    fn describe(&self, kinds: &mut Vec<JoinerKind>);
}

/// The empty joiner: every left tuple matches every right fact.
impl<L: 'static, R: 'static> Joiner<L, R> for () {
    type Key = ();

    #[inline]
    fn left_key(&self, _left: &Tuple) {}

    #[inline]
    fn right_key(&self, _right: &Tuple) {}

    #[inline]
    fn test(&self, _left: &Tuple, _right: &Tuple) -> bool {
        true
    }

    fn describe(&self, _kinds: &mut Vec<JoinerKind>) {}
}

/// The first indexable joiner declared after a filtering joiner, if any.
pub(crate) fn order_violation<L, R, J: Joiner<L, R>>(joiner: &J) -> Option<&'static str> {
    let mut kinds = Vec::new();
    joiner.describe(&mut kinds);
    let first_filter = kinds.iter().position(|k| !k.is_indexable())?;
    kinds[first_filter..]
        .iter()
        .find(|k| k.is_indexable())
        .map(|k| k.label())
}

/// Two joiners combined with AND semantics.
///
/// Created by the `and` method of every joiner.
pub struct AndJoiner<J1, J2> {
    first: J1,
    second: J2,
}

impl<J1, J2> AndJoiner<J1, J2> {
    pub(crate) fn new(first: J1, second: J2) -> Self {
        Self { first, second }
    }

    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

impl<L, R, J1, J2> Joiner<L, R> for AndJoiner<J1, J2>
where
    L: 'static,
    R: 'static,
    J1: Joiner<L, R>,
    J2: Joiner<L, R>,
{
    type Key = (J1::Key, J2::Key);

    #[inline]
    fn left_key(&self, left: &Tuple) -> Self::Key {
        (self.first.left_key(left), self.second.left_key(left))
    }

    #[inline]
    fn right_key(&self, right: &Tuple) -> Self::Key {
        (self.first.right_key(right), self.second.right_key(right))
    }

    #[inline]
    fn test(&self, left: &Tuple, right: &Tuple) -> bool {
        self.first.test(left, right) && self.second.test(left, right)
    }

    fn describe(&self, kinds: &mut Vec<JoinerKind>) {
        self.first.describe(kinds);
        self.second.describe(kinds);
    }
}

/// Joiners that can swap their left and right sides.
pub trait Reversible {
    type Reversed;

    fn reversed(self) -> Self::Reversed;
}

impl<J1: Reversible, J2: Reversible> Reversible for AndJoiner<J1, J2> {
    type Reversed = AndJoiner<J1::Reversed, J2::Reversed>;

    fn reversed(self) -> Self::Reversed {
        AndJoiner::new(self.first.reversed(), self.second.reversed())
    }
}
