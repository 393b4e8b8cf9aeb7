//! Collectors gathering a group's values into a container.
//!
//! Both results are ordered by value, never by arrival, so a group that
//! sees a fact retracted and re-inserted yields the same container.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use super::{Accumulator, MappingCollector, Reducer};

/// Creates a collector listing the mapped values of a group in ascending
/// order, duplicates included.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::collector::{Accumulator, Reducer, ToListReducer};
///
/// let mut acc = Reducer::<u32>::create_accumulator(&ToListReducer);
/// acc.accumulate(&7);
/// acc.accumulate(&3);
/// acc.accumulate(&7);
/// assert_eq!(acc.finish(), vec![3, 7, 7]);
///
/// acc.retract(&7);
/// assert_eq!(acc.finish(), vec![3, 7]);
/// ```
pub fn to_list<F>(mapping: F) -> MappingCollector<F, ToListReducer> {
    MappingCollector::new(mapping, ToListReducer)
}

/// Creates a collector yielding the distinct mapped values of a group.
pub fn to_set<F>(mapping: F) -> MappingCollector<F, ToSetReducer> {
    MappingCollector::new(mapping, ToSetReducer)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ToListReducer;

impl<T> Reducer<T> for ToListReducer
where
    T: Ord + Clone + Debug + Send + Sync + 'static,
{
    type Result = Vec<T>;
    type Accumulator = ToListAccumulator<T>;

    fn create_accumulator(&self) -> Self::Accumulator {
        ToListAccumulator { values: Vec::new() }
    }
}

pub struct ToListAccumulator<T> {
    values: Vec<T>,
}

impl<T> Accumulator<T, Vec<T>> for ToListAccumulator<T>
where
    T: Ord + Clone + Send + Sync + 'static,
{
    fn accumulate(&mut self, value: &T) {
        let at = self.values.partition_point(|v| v <= value);
        self.values.insert(at, value.clone());
    }

    fn retract(&mut self, value: &T) {
        if let Ok(at) = self.values.binary_search(value) {
            self.values.remove(at);
        }
    }

    fn finish(&self) -> Vec<T> {
        self.values.clone()
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ToSetReducer;

impl<T> Reducer<T> for ToSetReducer
where
    T: Ord + Clone + Debug + Send + Sync + 'static,
{
    type Result = BTreeSet<T>;
    type Accumulator = ToSetAccumulator<T>;

    fn create_accumulator(&self) -> Self::Accumulator {
        ToSetAccumulator {
            occurrences: BTreeMap::new(),
        }
    }
}

pub struct ToSetAccumulator<T> {
    // Value -> number of accumulated copies.
    occurrences: BTreeMap<T, usize>,
}

impl<T> Accumulator<T, BTreeSet<T>> for ToSetAccumulator<T>
where
    T: Ord + Clone + Send + Sync + 'static,
{
    fn accumulate(&mut self, value: &T) {
        *self.occurrences.entry(value.clone()).or_insert(0) += 1;
    }

    fn retract(&mut self, value: &T) {
        if let Some(count) = self.occurrences.get_mut(value) {
            *count -= 1;
            if *count == 0 {
                self.occurrences.remove(value);
            }
        }
    }

    fn finish(&self) -> BTreeSet<T> {
        self.occurrences.keys().cloned().collect()
    }

    fn reset(&mut self) {
        self.occurrences.clear();
    }
}
