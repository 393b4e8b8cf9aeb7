//! Equality joiner.

use super::{AndJoiner, JoinKey, Joiner, JoinerKind, Reversible};
use crate::tuple::Tuple;

/// Creates a joiner that matches when the same mapping agrees on both
/// sides. Both streams must carry the same fact type.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::joiner::equal;
///
/// #[derive(Debug)]
/// struct Shift { employee: Option<u32> }
///
/// let same_employee = equal(|s: &Shift| s.employee);
/// # let _ = same_employee;
/// ```
pub fn equal<F: Clone>(mapping: F) -> EqualJoiner<F, F> {
    EqualJoiner {
        left: mapping.clone(),
        right: mapping,
    }
}

/// Creates a joiner that matches when `left(a) == right(b)`.
///
/// For multi-element left streams, `left` takes every left element.
pub fn equal_bi<Fl, Fr>(left: Fl, right: Fr) -> EqualJoiner<Fl, Fr> {
    EqualJoiner { left, right }
}

pub struct EqualJoiner<Fl, Fr> {
    left: Fl,
    right: Fr,
}

impl<Fl, Fr> EqualJoiner<Fl, Fr> {
    pub fn and<J>(self, other: J) -> AndJoiner<Self, J> {
        AndJoiner::new(self, other)
    }
}

impl<Fl, Fr> Reversible for EqualJoiner<Fl, Fr> {
    type Reversed = EqualJoiner<Fr, Fl>;

    fn reversed(self) -> Self::Reversed {
        EqualJoiner {
            left: self.right,
            right: self.left,
        }
    }
}

macro_rules! impl_equal_joiner {
    ($($t:ident : $idx:tt),+) => {
        impl<$($t: 'static,)+ R: 'static, K, Fl, Fr> Joiner<($($t,)+), R> for EqualJoiner<Fl, Fr>
        where
            K: JoinKey,
            Fl: Fn($(&$t),+) -> K + Send + Sync + 'static,
            Fr: Fn(&R) -> K + Send + Sync + 'static,
        {
            type Key = K;

            #[inline]
            fn left_key(&self, left: &Tuple) -> K {
                (self.left)($(left.fact::<$t>($idx)),+)
            }

            #[inline]
            fn right_key(&self, right: &Tuple) -> K {
                (self.right)(right.fact::<R>(0))
            }

            #[inline]
            fn test(&self, _left: &Tuple, _right: &Tuple) -> bool {
                true
            }

            fn describe(&self, kinds: &mut Vec<JoinerKind>) {
                kinds.push(JoinerKind::Equal);
            }
        }
    };
}

impl_equal_joiner!(A: 0);
impl_equal_joiner!(A: 0, B: 1);
impl_equal_joiner!(A: 0, B: 1, C: 2);
impl_equal_joiner!(A: 0, B: 1, C: 2, D: 3);
