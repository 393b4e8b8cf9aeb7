//! Arbitrary-predicate joiner.

use super::{AndJoiner, Joiner, JoinerKind};
use crate::tuple::Tuple;

/// Matches when `predicate(left elements.., right)` holds.
///
/// Filtering joiners cannot be indexed and must be declared after every
/// indexable joiner of the same chain.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::joiner::{equal, filtering};
///
/// struct Lecture { room: u32, students: u32 }
///
/// let crowded = equal(|l: &Lecture| l.room)
///     .and(filtering(|a: &Lecture, b: &Lecture| a.students + b.students > 100));
/// # let _ = crowded;
/// ```
pub fn filtering<F>(predicate: F) -> FilteringJoiner<F> {
    FilteringJoiner { predicate }
}

pub struct FilteringJoiner<F> {
    predicate: F,
}

impl<F> FilteringJoiner<F> {
    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

macro_rules! impl_filtering_joiner {
    ($($t:ident : $idx:tt),+) => {
        impl<$($t: 'static,)+ R: 'static, F> Joiner<($($t,)+), R> for FilteringJoiner<F>
        where
            F: Fn($(&$t,)+ &R) -> bool + Send + Sync + 'static,
        {
            type Key = ();

            #[inline]
            fn left_key(&self, _left: &Tuple) {}

            #[inline]
            fn right_key(&self, _right: &Tuple) {}

            #[inline]
            fn test(&self, left: &Tuple, right: &Tuple) -> bool {
                (self.predicate)($(left.fact::<$t>($idx),)+ right.fact::<R>(0))
            }

            fn describe(&self, kinds: &mut Vec<JoinerKind>) {
                kinds.push(JoinerKind::Filtering);
            }
        }
    };
}

impl_filtering_joiner!(A: 0);
impl_filtering_joiner!(A: 0, B: 1);
impl_filtering_joiner!(A: 0, B: 1, C: 2);
impl_filtering_joiner!(A: 0, B: 1, C: 2, D: 3);
