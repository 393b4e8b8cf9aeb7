//! Interval overlap joiner.

use super::{AndJoiner, Joiner, JoinerKind, Reversible};
use crate::tuple::Tuple;

/// Matches when the half-open ranges `[start, end)` of both sides overlap.
/// Both streams must carry the same fact type.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::joiner::overlapping;
///
/// struct Shift { start: i64, end: i64 }
///
/// let clash = overlapping(|s: &Shift| s.start, |s: &Shift| s.end);
/// # let _ = clash;
/// ```
pub fn overlapping<Fs: Clone, Fe: Clone>(start: Fs, end: Fe) -> OverlappingJoiner<Fs, Fe, Fs, Fe> {
    OverlappingJoiner {
        left_start: start.clone(),
        left_end: end.clone(),
        right_start: start,
        right_end: end,
    }
}

/// Matches when `[left_start(a), left_end(a))` overlaps
/// `[right_start(b), right_end(b))`.
pub fn overlapping_bi<Ls, Le, Rs, Re>(
    left_start: Ls,
    left_end: Le,
    right_start: Rs,
    right_end: Re,
) -> OverlappingJoiner<Ls, Le, Rs, Re> {
    OverlappingJoiner {
        left_start,
        left_end,
        right_start,
        right_end,
    }
}

pub struct OverlappingJoiner<Ls, Le, Rs, Re> {
    left_start: Ls,
    left_end: Le,
    right_start: Rs,
    right_end: Re,
}

impl<Ls, Le, Rs, Re> OverlappingJoiner<Ls, Le, Rs, Re> {
    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

impl<Ls, Le, Rs, Re> Reversible for OverlappingJoiner<Ls, Le, Rs, Re> {
    type Reversed = OverlappingJoiner<Rs, Re, Ls, Le>;

    fn reversed(self) -> Self::Reversed {
        OverlappingJoiner {
            left_start: self.right_start,
            left_end: self.right_end,
            right_start: self.left_start,
            right_end: self.left_end,
        }
    }
}

macro_rules! impl_overlapping_joiner {
    ($($t:ident : $idx:tt),+) => {
        impl<$($t: 'static,)+ R: 'static, T, Ls, Le, Rs, Re> Joiner<($($t,)+), R>
            for OverlappingJoiner<Ls, Le, Rs, Re>
        where
            T: PartialOrd,
            Ls: Fn($(&$t),+) -> T + Send + Sync + 'static,
            Le: Fn($(&$t),+) -> T + Send + Sync + 'static,
            Rs: Fn(&R) -> T + Send + Sync + 'static,
            Re: Fn(&R) -> T + Send + Sync + 'static,
        {
            type Key = ();

            #[inline]
            fn left_key(&self, _left: &Tuple) {}

            #[inline]
            fn right_key(&self, _right: &Tuple) {}

            fn test(&self, left: &Tuple, right: &Tuple) -> bool {
                let right_fact = right.fact::<R>(0);
                let left_start = (self.left_start)($(left.fact::<$t>($idx)),+);
                let left_end = (self.left_end)($(left.fact::<$t>($idx)),+);
                left_start < (self.right_end)(right_fact) && (self.right_start)(right_fact) < left_end
            }

            fn describe(&self, kinds: &mut Vec<JoinerKind>) {
                kinds.push(JoinerKind::Overlapping);
            }
        }
    };
}

impl_overlapping_joiner!(A: 0);
impl_overlapping_joiner!(A: 0, B: 1);
impl_overlapping_joiner!(A: 0, B: 1, C: 2);
impl_overlapping_joiner!(A: 0, B: 1, C: 2, D: 3);
