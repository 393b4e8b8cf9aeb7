//! Minimum and maximum collectors.
//!
//! The accumulator keeps its group as an ordered multiset, so accumulate,
//! retract and finish are all O(log group size).

use std::collections::BTreeMap;
use std::fmt::Debug;

use super::{Accumulator, MappingCollector, Reducer};

/// Creates a collector yielding the smallest mapped value of a group.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::collector::{Accumulator, MinReducer, Reducer};
///
/// let mut acc = Reducer::<u32>::create_accumulator(&MinReducer);
/// acc.accumulate(&4);
/// acc.accumulate(&2);
/// acc.accumulate(&9);
/// assert_eq!(acc.finish(), Some(2));
///
/// acc.retract(&2);
/// assert_eq!(acc.finish(), Some(4));
/// ```
pub fn min<F>(mapping: F) -> MappingCollector<F, MinReducer> {
    MappingCollector::new(mapping, MinReducer)
}

/// Creates a collector yielding the largest mapped value of a group.
pub fn max<F>(mapping: F) -> MappingCollector<F, MaxReducer> {
    MappingCollector::new(mapping, MaxReducer)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinReducer;

#[derive(Debug, Clone, Copy, Default)]
pub struct MaxReducer;

impl<T> Reducer<T> for MinReducer
where
    T: Ord + Clone + Debug + Send + Sync + 'static,
{
    type Result = Option<T>;
    type Accumulator = ExtremumAccumulator<T>;

    fn create_accumulator(&self) -> Self::Accumulator {
        ExtremumAccumulator::new(Extremum::Min)
    }
}

impl<T> Reducer<T> for MaxReducer
where
    T: Ord + Clone + Debug + Send + Sync + 'static,
{
    type Result = Option<T>;
    type Accumulator = ExtremumAccumulator<T>;

    fn create_accumulator(&self) -> Self::Accumulator {
        ExtremumAccumulator::new(Extremum::Max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extremum {
    Min,
    Max,
}

pub struct ExtremumAccumulator<T> {
    // Value -> number of accumulated copies.
    values: BTreeMap<T, usize>,
    extremum: Extremum,
}

impl<T: Ord> ExtremumAccumulator<T> {
    fn new(extremum: Extremum) -> Self {
        Self {
            values: BTreeMap::new(),
            extremum,
        }
    }
}

impl<T> Accumulator<T, Option<T>> for ExtremumAccumulator<T>
where
    T: Ord + Clone + Send + Sync + 'static,
{
    fn accumulate(&mut self, value: &T) {
        *self.values.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &T) {
        if let Some(count) = self.values.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.values.remove(value);
            }
        }
    }

    fn finish(&self) -> Option<T> {
        let entry = match self.extremum {
            Extremum::Min => self.values.first_key_value(),
            Extremum::Max => self.values.last_key_value(),
        };
        entry.map(|(value, _)| value.clone())
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}
