use std::sync::Arc;

use smallvec::SmallVec;

use super::*;
use crate::tuple::{Element, Tuple};

#[derive(Debug)]
struct Lecture {
    teacher: &'static str,
    students: u32,
}

fn lecture(teacher: &'static str, students: u32) -> Tuple {
    Tuple::of(Arc::new(Lecture { teacher, students }))
}

struct Fed<'c, C: Collector<(Lecture,)>> {
    collector: &'c C,
    acc: C::Accumulator,
}

impl<C: Collector<(Lecture,)>> Fed<'_, C> {
    fn insert(&mut self, tuple: &Tuple) {
        let value = self.collector.extract(tuple);
        self.acc.accumulate(&value);
    }

    fn retract(&mut self, tuple: &Tuple) {
        let value = self.collector.extract(tuple);
        self.acc.retract(&value);
    }

    fn result(&self) -> C::Result {
        self.acc.finish()
    }

    fn reset(&mut self) {
        self.acc.reset();
    }
}

fn feed<'c, C: Collector<(Lecture,)>>(collector: &'c C, tuples: &[Tuple]) -> Fed<'c, C> {
    let mut fed = Fed {
        collector,
        acc: collector.create_accumulator(),
    };
    for tuple in tuples {
        fed.insert(tuple);
    }
    fed
}

// ============================================================================
// Inverse-arithmetic collectors
// ============================================================================

#[test]
fn test_count_round_trip() {
    let tuples = [lecture("ada", 10), lecture("bob", 20)];
    let collector = count();
    let mut fed = feed(&collector, &tuples);
    assert_eq!(fed.result(), 2);

    let extra = lecture("cy", 5);
    fed.insert(&extra);
    fed.retract(&extra);
    assert_eq!(fed.result(), 2);

    fed.reset();
    assert_eq!(fed.result(), 0);
}

#[test]
fn test_sum_and_average() {
    let tuples = [lecture("ada", 10), lecture("bob", 20), lecture("cy", 30)];

    let total = sum(|l: &Lecture| l.students);
    let mut acc = feed(&total, &tuples);
    assert_eq!(acc.result(), 60);
    acc.retract(&tuples[0]);
    assert_eq!(acc.result(), 50);

    let mean = average(|l: &Lecture| l.students);
    let mut acc = feed(&mean, &tuples);
    assert_eq!(acc.result(), 20.0);
    acc.retract(&tuples[2]);
    assert_eq!(acc.result(), 15.0);
}

#[test]
fn test_float_average_retract_matches_recompute() {
    let mut acc = Reducer::<f64>::create_accumulator(&AverageReducer);
    acc.accumulate(&0.1);
    acc.accumulate(&1e17);
    acc.retract(&1e17);

    let mut fresh = Reducer::<f64>::create_accumulator(&AverageReducer);
    fresh.accumulate(&0.1);
    assert_eq!(acc.finish(), fresh.finish());
    assert_eq!(acc.finish(), 0.1);
}

#[test]
fn test_float_average_ignores_arrival_order() {
    let values = [1e17, 0.1, -1e17, 0.2, 3.5];
    let mean = |order: &[f64]| {
        let mut acc = Reducer::<f64>::create_accumulator(&AverageReducer);
        for value in order {
            acc.accumulate(value);
        }
        acc.finish()
    };
    let mut reversed = values;
    reversed.reverse();
    assert_eq!(mean(&values), mean(&reversed));
}

#[test]
fn test_integer_average_is_exact_and_empty_is_nan() {
    let mut acc = Reducer::<i64>::create_accumulator(&AverageReducer);
    acc.accumulate(&i64::MAX);
    acc.accumulate(&i64::MAX);
    assert_eq!(acc.finish(), i64::MAX as f64);
    acc.reset();
    assert!(acc.finish().is_nan());
}

#[test]
fn test_count_distinct_tracks_multiplicity() {
    let tuples = [lecture("ada", 10), lecture("ada", 20), lecture("bob", 30)];
    let collector = count_distinct(|l: &Lecture| l.teacher);
    let mut acc = feed(&collector, &tuples);
    assert_eq!(acc.result(), 2);

    acc.retract(&tuples[0]);
    assert_eq!(acc.result(), 2);
    acc.retract(&tuples[1]);
    assert_eq!(acc.result(), 1);
}

// ============================================================================
// Value-keeping collectors
// ============================================================================

#[test]
fn test_min_max_after_extremum_retract() {
    let tuples = [lecture("ada", 10), lecture("bob", 40), lecture("cy", 25)];

    let smallest = min(|l: &Lecture| l.students);
    let mut acc = feed(&smallest, &tuples);
    assert_eq!(acc.result(), Some(10));
    acc.retract(&tuples[0]);
    assert_eq!(acc.result(), Some(25));

    let largest = max(|l: &Lecture| l.students);
    let mut acc = feed(&largest, &tuples);
    assert_eq!(acc.result(), Some(40));
    acc.retract(&tuples[2]);
    assert_eq!(acc.result(), Some(40));
    acc.retract(&tuples[1]);
    assert_eq!(acc.result(), Some(10));
    acc.retract(&tuples[0]);
    assert_eq!(acc.result(), None);
}

#[test]
fn test_min_with_duplicate_extremum() {
    let mut acc = Reducer::<u32>::create_accumulator(&MinReducer);
    acc.accumulate(&3);
    acc.accumulate(&3);
    acc.accumulate(&7);
    acc.retract(&3);
    assert_eq!(acc.finish(), Some(3));
}

#[test]
fn test_to_list_and_to_set() {
    let tuples = [lecture("ada", 10), lecture("bob", 20), lecture("ada", 30)];

    let names = to_list(|l: &Lecture| l.teacher);
    let mut acc = feed(&names, &tuples);
    assert_eq!(acc.result(), vec!["ada", "ada", "bob"]);
    acc.retract(&tuples[0]);
    assert_eq!(acc.result(), vec!["ada", "bob"]);

    let teachers = to_set(|l: &Lecture| l.teacher);
    let mut acc = feed(&teachers, &tuples);
    assert_eq!(acc.result().len(), 2);
    acc.retract(&tuples[1]);
    assert!(!acc.result().contains("bob"));
}

#[test]
fn test_to_list_reinsert_keeps_position() {
    let tuples = [lecture("bob", 10), lecture("ada", 20), lecture("cy", 30)];
    let names = to_list(|l: &Lecture| l.teacher);
    let mut acc = feed(&names, &tuples);
    let before = acc.result();

    acc.retract(&tuples[0]);
    acc.insert(&tuples[0]);
    assert_eq!(acc.result(), before);
    assert_eq!(before, vec!["ada", "bob", "cy"]);
}

#[test]
fn test_custom_collector() {
    let tuples = [lecture("ada", 10), lecture("bob", 20)];
    let collector = custom(
        |l: &Lecture| l.students,
        || 0u64,
        |acc: &mut u64, v: &u32| *acc += u64::from(*v) * 2,
        |acc: &mut u64, v: &u32| *acc -= u64::from(*v) * 2,
        |acc: &u64| *acc,
    );
    let mut acc = feed(&collector, &tuples);
    assert_eq!(acc.result(), 60);
    acc.reset();
    assert_eq!(acc.result(), 0);
}

// ============================================================================
// Collector sets
// ============================================================================

fn fold<CS: CollectorSet<(Lecture,)>>(set: &CS, inserted: &[Tuple], retracted: &[Tuple]) -> Tuple {
    let mut accumulators = set.create_accumulators();
    for tuple in inserted {
        CS::accumulate(&mut accumulators, &set.extract(tuple));
    }
    for tuple in retracted {
        CS::retract(&mut accumulators, &set.extract(tuple));
    }
    let mut out: SmallVec<[Element; 4]> = SmallVec::new();
    CS::finish(&accumulators, &mut out);
    Tuple::from_elements(out)
}

#[test]
fn test_collector_set_appends_results_in_order() {
    let set = (count(), sum(|l: &Lecture| l.students));
    let tuples = [lecture("ada", 10), lecture("bob", 20)];

    let result = fold(&set, &tuples, &[]);
    assert_eq!(result.fact::<usize>(0), &2);
    assert_eq!(result.fact::<u32>(1), &30);
}

#[test]
fn test_collector_set_retracts_every_member() {
    let set = (
        count(),
        max(|l: &Lecture| l.students),
        to_list(|l: &Lecture| l.teacher),
    );
    let tuples = [lecture("ada", 10), lecture("bob", 20)];

    let result = fold(&set, &tuples, &tuples[1..]);
    assert_eq!(result.fact::<usize>(0), &1);
    assert_eq!(result.fact::<Option<u32>>(1), &Some(10));
    assert_eq!(result.fact::<Vec<&'static str>>(2), &vec!["ada"]);
}
