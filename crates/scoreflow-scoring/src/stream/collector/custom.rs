//! User-defined collectors from closures.

use std::sync::Arc;

use super::{Accumulator, MappingCollector, Reducer};
use crate::tuple::TupleValue;

/// Creates a collector from a mapping and four container functions.
///
/// `accumulate` and `retract` must be exact inverses, and `finish` must not
/// depend on the order values arrived in.
///
/// # Example
///
/// ```
/// use scoreflow_scoring::stream::collector::custom;
///
/// struct Lecture { students: u32 }
///
/// // Largest class size, tracked as a sorted multiset.
/// let largest = custom(
///     |l: &Lecture| l.students,
///     Vec::<u32>::new,
///     |sizes: &mut Vec<u32>, v: &u32| {
///         let at = sizes.partition_point(|s| s < v);
///         sizes.insert(at, *v);
///     },
///     |sizes: &mut Vec<u32>, v: &u32| {
///         if let Ok(at) = sizes.binary_search(v) {
///             sizes.remove(at);
///         }
///     },
///     |sizes: &Vec<u32>| sizes.last().copied().unwrap_or(0),
/// );
/// # let _ = largest;
/// ```
pub fn custom<F, V, C, R, S, Ac, Rt, Fi>(
    mapping: F,
    supplier: S,
    accumulate: Ac,
    retract: Rt,
    finish: Fi,
) -> MappingCollector<F, CustomReducer<S, Ac, Rt, Fi>>
where
    S: Fn() -> C,
    Ac: Fn(&mut C, &V),
    Rt: Fn(&mut C, &V),
    Fi: Fn(&C) -> R,
{
    MappingCollector::new(
        mapping,
        CustomReducer {
            functions: Arc::new(Functions {
                supplier,
                accumulate,
                retract,
                finish,
            }),
        },
    )
}

struct Functions<S, Ac, Rt, Fi> {
    supplier: S,
    accumulate: Ac,
    retract: Rt,
    finish: Fi,
}

pub struct CustomReducer<S, Ac, Rt, Fi> {
    functions: Arc<Functions<S, Ac, Rt, Fi>>,
}

impl<T, C, R, S, Ac, Rt, Fi> Reducer<T> for CustomReducer<S, Ac, Rt, Fi>
where
    C: Send + Sync + 'static,
    R: TupleValue,
    S: Fn() -> C + Send + Sync + 'static,
    Ac: Fn(&mut C, &T) + Send + Sync + 'static,
    Rt: Fn(&mut C, &T) + Send + Sync + 'static,
    Fi: Fn(&C) -> R + Send + Sync + 'static,
{
    type Result = R;
    type Accumulator = CustomAccumulator<C, S, Ac, Rt, Fi>;

    fn create_accumulator(&self) -> Self::Accumulator {
        CustomAccumulator {
            container: (self.functions.supplier)(),
            functions: Arc::clone(&self.functions),
        }
    }
}

pub struct CustomAccumulator<C, S, Ac, Rt, Fi> {
    container: C,
    functions: Arc<Functions<S, Ac, Rt, Fi>>,
}

impl<T, C, R, S, Ac, Rt, Fi> Accumulator<T, R> for CustomAccumulator<C, S, Ac, Rt, Fi>
where
    C: Send + Sync + 'static,
    S: Fn() -> C + Send + Sync + 'static,
    Ac: Fn(&mut C, &T) + Send + Sync + 'static,
    Rt: Fn(&mut C, &T) + Send + Sync + 'static,
    Fi: Fn(&C) -> R + Send + Sync + 'static,
{
    fn accumulate(&mut self, value: &T) {
        (self.functions.accumulate)(&mut self.container, value);
    }

    fn retract(&mut self, value: &T) {
        (self.functions.retract)(&mut self.container, value);
    }

    fn finish(&self) -> R {
        (self.functions.finish)(&self.container)
    }

    fn reset(&mut self) {
        self.container = (self.functions.supplier)();
    }
}
