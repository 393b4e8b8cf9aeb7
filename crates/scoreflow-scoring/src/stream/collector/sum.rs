//! Sum and average collectors.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::{AddAssign, SubAssign};

use num_traits::ToPrimitive;

use super::{Accumulator, MappingCollector, Reducer};

/// Creates a collector that sums the mapped values of a group.
///
/// Retraction subtracts, so the value type must have exact inverse
/// arithmetic (integers, or scores).
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::collector::sum;
///
/// struct Lecture { students: u32 }
///
/// let attendance = sum(|l: &Lecture| l.students);
/// # let _ = attendance;
/// ```
pub fn sum<F>(mapping: F) -> MappingCollector<F, SumReducer> {
    MappingCollector::new(mapping, SumReducer)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SumReducer;

impl<T> Reducer<T> for SumReducer
where
    T: Default + Copy + AddAssign + SubAssign + Debug + Send + Sync + 'static,
{
    type Result = T;
    type Accumulator = SumAccumulator<T>;

    fn create_accumulator(&self) -> Self::Accumulator {
        SumAccumulator { sum: T::default() }
    }
}

pub struct SumAccumulator<T> {
    sum: T,
}

impl<T> Accumulator<T, T> for SumAccumulator<T>
where
    T: Default + Copy + AddAssign + SubAssign + Send + Sync + 'static,
{
    #[inline]
    fn accumulate(&mut self, value: &T) {
        self.sum += *value;
    }

    #[inline]
    fn retract(&mut self, value: &T) {
        self.sum -= *value;
    }

    #[inline]
    fn finish(&self) -> T {
        self.sum
    }

    #[inline]
    fn reset(&mut self) {
        self.sum = T::default();
    }
}

/// Creates a collector averaging the mapped values of a group.
///
/// Integer values are summed exactly. Float values are kept sorted and
/// summed in that order, so the mean depends only on the values present.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::collector::{Accumulator, AverageReducer, Reducer};
///
/// let mut acc = Reducer::<f64>::create_accumulator(&AverageReducer);
/// acc.accumulate(&0.1);
/// acc.accumulate(&1e17);
/// acc.retract(&1e17);
/// assert_eq!(acc.finish(), 0.1);
/// ```
pub fn average<F>(mapping: F) -> MappingCollector<F, AverageReducer> {
    MappingCollector::new(mapping, AverageReducer)
}

/// Number type an [`average`] can be taken over.
pub trait AverageValue: Copy + Send + Sync + 'static {
    /// Running state from which the mean is computed.
    type Sum: Default + Send + Sync + 'static;

    fn add_to(self, sum: &mut Self::Sum);

    fn remove_from(self, sum: &mut Self::Sum);

    fn mean(sum: &Self::Sum, count: usize) -> f64;
}

macro_rules! impl_integer_average {
    ($($int:ty),+) => {
        $(
            impl AverageValue for $int {
                type Sum = i128;

                #[inline]
                fn add_to(self, sum: &mut i128) {
                    *sum += self as i128;
                }

                #[inline]
                fn remove_from(self, sum: &mut i128) {
                    *sum -= self as i128;
                }

                fn mean(sum: &i128, count: usize) -> f64 {
                    sum.to_f64().unwrap_or(f64::NAN) / count as f64
                }
            }
        )+
    };
}

impl_integer_average!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float_average {
    ($($float:ty),+) => {
        $(
            impl AverageValue for $float {
                type Sum = SortedFloats;

                fn add_to(self, sum: &mut SortedFloats) {
                    sum.insert(self.to_f64().unwrap_or(f64::NAN));
                }

                fn remove_from(self, sum: &mut SortedFloats) {
                    sum.remove(self.to_f64().unwrap_or(f64::NAN));
                }

                fn mean(sum: &SortedFloats, count: usize) -> f64 {
                    sum.total() / count as f64
                }
            }
        )+
    };
}

impl_float_average!(f32, f64);

/// Float values of a group in `total_cmp` order.
#[derive(Debug, Clone, Default)]
pub struct SortedFloats {
    values: Vec<f64>,
}

impl SortedFloats {
    fn insert(&mut self, value: f64) {
        let at = self
            .values
            .partition_point(|v| v.total_cmp(&value) == Ordering::Less);
        self.values.insert(at, value);
    }

    fn remove(&mut self, value: f64) {
        if let Ok(at) = self.values.binary_search_by(|v| v.total_cmp(&value)) {
            self.values.remove(at);
        }
    }

    fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AverageReducer;

impl<T: AverageValue> Reducer<T> for AverageReducer {
    type Result = f64;
    type Accumulator = AverageAccumulator<T>;

    fn create_accumulator(&self) -> Self::Accumulator {
        AverageAccumulator {
            sum: T::Sum::default(),
            count: 0,
        }
    }
}

pub struct AverageAccumulator<T: AverageValue> {
    sum: T::Sum,
    count: usize,
}

impl<T: AverageValue> Accumulator<T, f64> for AverageAccumulator<T> {
    fn accumulate(&mut self, value: &T) {
        value.add_to(&mut self.sum);
        self.count += 1;
    }

    fn retract(&mut self, value: &T) {
        value.remove_from(&mut self.sum);
        self.count = self.count.saturating_sub(1);
    }

    /// NaN for an empty group; grouped streams never emit one.
    fn finish(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            T::mean(&self.sum, self.count)
        }
    }

    fn reset(&mut self) {
        self.sum = T::Sum::default();
        self.count = 0;
    }
}
