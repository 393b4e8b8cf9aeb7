//! Collectors for grouping and aggregating tuples.
//!
//! A collector turns every tuple of a group into a value
//! ([`Collector::extract`]) and folds the values into one result through an
//! [`Accumulator`]. Accumulators must be order-independent and must undo an
//! `accumulate` exactly with `retract`: group nodes never recompute a group
//! from scratch.
//!
//! Most collectors are a mapping closure over the stream's elements plus a
//! [`Reducer`] that does the folding; [`count`] needs no mapping.
//!
//! # Example
//!
//! ```
//! use scoreflow_scoring::stream::collector::{sum, Accumulator, Reducer, SumReducer};
//!
//! let mut acc = Reducer::<i64>::create_accumulator(&SumReducer);
//! acc.accumulate(&5);
//! acc.accumulate(&3);
//! assert_eq!(acc.finish(), 8);
//!
//! acc.retract(&3);
//! assert_eq!(acc.finish(), 5);
//! # let _ = sum(|x: &i64| *x);
//! ```

mod container;
mod count;
mod custom;
mod extremum;
mod set;
mod sum;

#[cfg(test)]
mod tests;

use crate::tuple::{Tuple, TupleValue};

pub use container::{to_list, to_set, ToListAccumulator, ToListReducer, ToSetAccumulator, ToSetReducer};
pub use count::{
    count, count_distinct, CountAccumulator, CountCollector, CountDistinctAccumulator,
    CountDistinctReducer,
};
pub use custom::{custom, CustomAccumulator, CustomReducer};
pub use extremum::{max, min, ExtremumAccumulator, MaxReducer, MinReducer};
pub use set::CollectorSet;
pub use sum::{
    average, sum, AverageAccumulator, AverageReducer, AverageValue, SortedFloats, SumAccumulator,
    SumReducer,
};

/// Incremental fold of extracted values into a result.
pub trait Accumulator<V, R>: Send + Sync + 'static {
    fn accumulate(&mut self, value: &V);

    /// Exact inverse of `accumulate` for a value previously accumulated.
    fn retract(&mut self, value: &V);

    fn finish(&self) -> R;

    fn reset(&mut self);
}

/// Aggregation over the tuples of a group.
///
/// `Args` is the marker tuple of the grouped stream's element types, e.g.
/// `(Lecture,)` or `(Lecture, Room)`.
pub trait Collector<Args>: Send + Sync + 'static {
    type Value: Send + Sync + 'static;
    type Result: TupleValue;
    type Accumulator: Accumulator<Self::Value, Self::Result>;

    fn extract(&self, tuple: &Tuple) -> Self::Value;

    fn create_accumulator(&self) -> Self::Accumulator;
}

/// Folding half of a mapping collector, independent of the stream arity.
pub trait Reducer<T>: Send + Sync + 'static {
    type Result: TupleValue;
    type Accumulator: Accumulator<T, Self::Result>;

    fn create_accumulator(&self) -> Self::Accumulator;
}

/// A mapping over the stream's elements feeding a [`Reducer`].
pub struct MappingCollector<F, Red> {
    mapping: F,
    reducer: Red,
}

impl<F, Red> MappingCollector<F, Red> {
    pub(crate) fn new(mapping: F, reducer: Red) -> Self {
        Self { mapping, reducer }
    }
}

macro_rules! impl_mapping_collector {
    ($($t:ident : $idx:tt),+) => {
        impl<$($t: 'static,)+ T, F, Red> Collector<($($t,)+)> for MappingCollector<F, Red>
        where
            T: Send + Sync + 'static,
            F: Fn($(&$t),+) -> T + Send + Sync + 'static,
            Red: Reducer<T>,
        {
            type Value = T;
            type Result = Red::Result;
            type Accumulator = Red::Accumulator;

            #[inline]
            fn extract(&self, tuple: &Tuple) -> T {
                (self.mapping)($(tuple.fact::<$t>($idx)),+)
            }

            fn create_accumulator(&self) -> Self::Accumulator {
                self.reducer.create_accumulator()
            }
        }
    };
}

impl_mapping_collector!(A: 0);
impl_mapping_collector!(A: 0, B: 1);
impl_mapping_collector!(A: 0, B: 1, C: 2);
impl_mapping_collector!(A: 0, B: 1, C: 2, D: 3);
