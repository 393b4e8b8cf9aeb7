//! Counting collectors.

use std::collections::HashMap;
use std::hash::Hash;

use super::{Accumulator, Collector, MappingCollector, Reducer};
use crate::tuple::Tuple;

/// Creates a collector that counts the tuples of a group.
///
/// Works on streams of every arity.
pub fn count() -> CountCollector {
    CountCollector
}

/// A collector that counts tuples.
///
/// Created by the [`count()`] function.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountCollector;

impl<Args: 'static> Collector<Args> for CountCollector {
    type Value = ();
    type Result = usize;
    type Accumulator = CountAccumulator;

    #[inline]
    fn extract(&self, _tuple: &Tuple) {}

    fn create_accumulator(&self) -> CountAccumulator {
        CountAccumulator { count: 0 }
    }
}

pub struct CountAccumulator {
    count: usize,
}

impl Accumulator<(), usize> for CountAccumulator {
    #[inline]
    fn accumulate(&mut self, _: &()) {
        self.count += 1;
    }

    #[inline]
    fn retract(&mut self, _: &()) {
        self.count = self.count.saturating_sub(1);
    }

    #[inline]
    fn finish(&self) -> usize {
        self.count
    }

    #[inline]
    fn reset(&mut self) {
        self.count = 0;
    }
}

/// Creates a collector that counts the distinct mapped values of a group.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::collector::count_distinct;
///
/// struct Lecture { teacher: u32 }
///
/// let teachers = count_distinct(|l: &Lecture| l.teacher);
/// # let _ = teachers;
/// ```
pub fn count_distinct<F>(mapping: F) -> MappingCollector<F, CountDistinctReducer> {
    MappingCollector::new(mapping, CountDistinctReducer)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountDistinctReducer;

impl<T> Reducer<T> for CountDistinctReducer
where
    T: Eq + Hash + Clone + Send + Sync + 'static,
{
    type Result = usize;
    type Accumulator = CountDistinctAccumulator<T>;

    fn create_accumulator(&self) -> Self::Accumulator {
        CountDistinctAccumulator {
            occurrences: HashMap::new(),
        }
    }
}

/// Per-value occurrence counts; a value is dropped when its count hits zero.
pub struct CountDistinctAccumulator<T> {
    occurrences: HashMap<T, usize>,
}

impl<T> Accumulator<T, usize> for CountDistinctAccumulator<T>
where
    T: Eq + Hash + Clone + Send + Sync + 'static,
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

    #[inline]
    fn finish(&self) -> usize {
        self.occurrences.len()
    }

    fn reset(&mut self) {
        self.occurrences.clear();
    }
}
