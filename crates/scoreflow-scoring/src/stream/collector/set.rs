//! Fixed-size collector lists of a group-by.

use std::sync::Arc;

use smallvec::SmallVec;

use super::{Accumulator, Collector};
use crate::tuple::{Element, Tuple};

/// Zero to four collectors applied side by side to every group.
///
/// Implemented for `()` and for tuples `(C1,)` through `(C1, C2, C3, C4)`.
/// Results are appended to a group's output tuple after its keys.
pub trait CollectorSet<Args>: Send + Sync + 'static {
    type Values: Send + Sync + 'static;
    type Accumulators: Send + Sync + 'static;

    fn extract(&self, tuple: &Tuple) -> Self::Values;

    fn create_accumulators(&self) -> Self::Accumulators;

    fn accumulate(accumulators: &mut Self::Accumulators, values: &Self::Values);

    fn retract(accumulators: &mut Self::Accumulators, values: &Self::Values);

    fn finish(accumulators: &Self::Accumulators, out: &mut SmallVec<[Element; 4]>);
}

impl<Args: 'static> CollectorSet<Args> for () {
    type Values = ();
    type Accumulators = ();

    fn extract(&self, _tuple: &Tuple) {}

    fn create_accumulators(&self) {}

    fn accumulate(_: &mut (), _: &()) {}

    fn retract(_: &mut (), _: &()) {}

    fn finish(_: &(), _: &mut SmallVec<[Element; 4]>) {}
}

macro_rules! impl_collector_set {
    ($($c:ident : $idx:tt),+) => {
        impl<Args: 'static, $($c: Collector<Args>),+> CollectorSet<Args> for ($($c,)+) {
            type Values = ($($c::Value,)+);
            type Accumulators = ($($c::Accumulator,)+);

            #[inline]
            fn extract(&self, tuple: &Tuple) -> Self::Values {
                ($(self.$idx.extract(tuple),)+)
            }

            fn create_accumulators(&self) -> Self::Accumulators {
                ($(self.$idx.create_accumulator(),)+)
            }

            #[inline]
            fn accumulate(accumulators: &mut Self::Accumulators, values: &Self::Values) {
                $(accumulators.$idx.accumulate(&values.$idx);)+
            }

            #[inline]
            fn retract(accumulators: &mut Self::Accumulators, values: &Self::Values) {
                $(accumulators.$idx.retract(&values.$idx);)+
            }

            fn finish(accumulators: &Self::Accumulators, out: &mut SmallVec<[Element; 4]>) {
                $(out.push(Arc::new(accumulators.$idx.finish()));)+
            }
        }
    };
}

impl_collector_set!(C1: 0);
impl_collector_set!(C1: 0, C2: 1);
impl_collector_set!(C1: 0, C2: 1, C3: 2);
impl_collector_set!(C1: 0, C2: 1, C3: 2, C4: 3);
