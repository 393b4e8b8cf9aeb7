//! Comparison joiners (`less_than`, `greater_than_or_equal`, ...).
//!
//! Comparisons are residual tests: they run on the candidates left after
//! the equality joiners of the same chain narrowed the index bucket.

use std::cmp::Ordering;

use super::{AndJoiner, Joiner, JoinerKind, Reversible};
use crate::tuple::Tuple;

/// Relation that must hold between `left(a)` and `right(b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Comparison {
    #[inline]
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (_, None) => false,
            (Comparison::LessThan, Some(o)) => o == Ordering::Less,
            (Comparison::LessThanOrEqual, Some(o)) => o != Ordering::Greater,
            (Comparison::GreaterThan, Some(o)) => o == Ordering::Greater,
            (Comparison::GreaterThanOrEqual, Some(o)) => o != Ordering::Less,
        }
    }

    /// The relation seen from the other side.
    pub fn flipped(self) -> Self {
        match self {
            Comparison::LessThan => Comparison::GreaterThan,
            Comparison::LessThanOrEqual => Comparison::GreaterThanOrEqual,
            Comparison::GreaterThan => Comparison::LessThan,
            Comparison::GreaterThanOrEqual => Comparison::LessThanOrEqual,
        }
    }
}

pub struct ComparisonJoiner<Fl, Fr> {
    left: Fl,
    right: Fr,
    comparison: Comparison,
}

impl<Fl, Fr> ComparisonJoiner<Fl, Fr> {
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

impl<Fl, Fr> Reversible for ComparisonJoiner<Fl, Fr> {
    type Reversed = ComparisonJoiner<Fr, Fl>;

    fn reversed(self) -> Self::Reversed {
        ComparisonJoiner {
            left: self.right,
            right: self.left,
            comparison: self.comparison.flipped(),
        }
    }
}

/// Matches when `left(a) < right(b)`.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::joiner::{less_than, Comparison};
///
/// struct Lecture { id: u32 }
///
/// let ordered = less_than(|a: &Lecture| a.id, |b: &Lecture| b.id);
/// assert_eq!(ordered.comparison(), Comparison::LessThan);
/// ```
pub fn less_than<Fl, Fr>(left: Fl, right: Fr) -> ComparisonJoiner<Fl, Fr> {
    ComparisonJoiner {
        left,
        right,
        comparison: Comparison::LessThan,
    }
}

/// Matches when `left(a) <= right(b)`.
pub fn less_than_or_equal<Fl, Fr>(left: Fl, right: Fr) -> ComparisonJoiner<Fl, Fr> {
    ComparisonJoiner {
        left,
        right,
        comparison: Comparison::LessThanOrEqual,
    }
}

/// Matches when `left(a) > right(b)`.
pub fn greater_than<Fl, Fr>(left: Fl, right: Fr) -> ComparisonJoiner<Fl, Fr> {
    ComparisonJoiner {
        left,
        right,
        comparison: Comparison::GreaterThan,
    }
}

/// Matches when `left(a) >= right(b)`.
pub fn greater_than_or_equal<Fl, Fr>(left: Fl, right: Fr) -> ComparisonJoiner<Fl, Fr> {
    ComparisonJoiner {
        left,
        right,
        comparison: Comparison::GreaterThanOrEqual,
    }
}

macro_rules! impl_comparison_joiner {
    ($($t:ident : $idx:tt),+) => {
        impl<$($t: 'static,)+ R: 'static, T, Fl, Fr> Joiner<($($t,)+), R> for ComparisonJoiner<Fl, Fr>
        where
            T: PartialOrd,
            Fl: Fn($(&$t),+) -> T + Send + Sync + 'static,
            Fr: Fn(&R) -> T + Send + Sync + 'static,
        {
            type Key = ();

            #[inline]
            fn left_key(&self, _left: &Tuple) {}

            #[inline]
            fn right_key(&self, _right: &Tuple) {}

            #[inline]
            fn test(&self, left: &Tuple, right: &Tuple) -> bool {
                let l = (self.left)($(left.fact::<$t>($idx)),+);
                let r = (self.right)(right.fact::<R>(0));
                self.comparison.holds(l.partial_cmp(&r))
            }

            fn describe(&self, kinds: &mut Vec<JoinerKind>) {
                kinds.push(JoinerKind::Comparison);
            }
        }
    };
}

impl_comparison_joiner!(A: 0);
impl_comparison_joiner!(A: 0, B: 1);
impl_comparison_joiner!(A: 0, B: 1, C: 2);
impl_comparison_joiner!(A: 0, B: 1, C: 2, D: 3);
