//! Property-based tests for the incremental scoring laws.
//!
//! Every property runs against random timetables: lectures spread over a
//! handful of rooms, periods and teachers, some with unassigned variables.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use scoreflow_core::{ConstraintRef, HardSoftScore};
use scoreflow_scoring::stream::collector::{
    count, count_distinct, custom, max, min, sum, Accumulator, AverageReducer, Collector,
    CountDistinctReducer, MaxReducer, MinReducer, Reducer, SumReducer, ToListReducer,
    ToSetReducer,
};
use scoreflow_scoring::stream::joiner::{equal, equal_bi, less_than_or_equal, Reversible};
use scoreflow_scoring::{Constraint, ConstraintFactory, Session, SessionFactory};
use scoreflow_test::timetabling::{Lecture, Room};

const ROOMS: u32 = 4;

fn rooms() -> Vec<Room> {
    (0..ROOMS).map(|id| Room::new(id, 20 * (id + 1))).collect()
}

fn timetable(f: &ConstraintFactory<HardSoftScore>) -> Vec<Constraint<HardSoftScore>> {
    vec![
        f.for_each_unique_pair::<Lecture, _>(equal(|l: &Lecture| (l.room, l.period)))
            .penalize(HardSoftScore::ONE_HARD)
            .as_constraint("Room conflict"),
        f.for_each_unique_pair::<Lecture, _>(equal(|l: &Lecture| (l.teacher, l.period)))
            .penalize(HardSoftScore::ONE_HARD)
            .as_constraint("Teacher conflict"),
        f.for_each::<Lecture>()
            .join_each::<Room, _>(equal_bi(|l: &Lecture| l.room, |r: &Room| Some(r.id)))
            .filter(|l: &Lecture, r: &Room| l.students > r.capacity)
            .penalize_with(HardSoftScore::ONE_SOFT, |l: &Lecture, r: &Room| {
                i64::from(l.students - r.capacity)
            })
            .as_constraint("Room capacity"),
        f.for_each::<Lecture>()
            .group_by_key_collect2(
                |l: &Lecture| l.teacher,
                count(),
                count_distinct(|l: &Lecture| l.period),
            )
            .penalize_with(HardSoftScore::ONE_SOFT, |_: &u32, n: &usize, periods: &usize| {
                (*n * *periods) as i64
            })
            .as_constraint("Teacher load"),
        f.for_each::<Room>()
            .if_not_exists::<Lecture, _>(equal_bi(|r: &Room| Some(r.id), |l: &Lecture| l.room))
            .penalize(HardSoftScore::ONE_SOFT)
            .as_constraint("Unused room"),
        f.for_each_including_null_vars::<Lecture>()
            .group_by_key_collect2(
                |l: &Lecture| l.period,
                max(|l: &Lecture| l.students),
                min(|l: &Lecture| l.students),
            )
            .impact_with(
                HardSoftScore::ONE_SOFT,
                |_: &Option<u32>, high: &Option<u32>, low: &Option<u32>| {
                    i64::from(low.unwrap_or(0)) - i64::from(high.unwrap_or(0)) / 2
                },
            )
            .as_constraint("Period spread"),
    ]
}

fn factory() -> SessionFactory<HardSoftScore> {
    SessionFactory::builder().build(timetable).unwrap()
}

type Snapshot = (HardSoftScore, i32, Vec<(String, HardSoftScore, usize)>);

fn snapshot(session: &mut Session<HardSoftScore>) -> Snapshot {
    let score = session.calculate_score().unwrap();
    let totals = session
        .constraint_match_totals()
        .unwrap()
        .into_iter()
        .map(|total| (total.name().to_string(), total.score, total.match_count))
        .collect();
    (score, session.init_score(), totals)
}

fn session_with(lectures: impl IntoIterator<Item = Lecture>) -> Session<HardSoftScore> {
    let mut session = factory().create_session();
    for room in rooms() {
        session.insert(room).unwrap();
    }
    for lecture in lectures {
        session.insert(lecture).unwrap();
    }
    session
}

prop_compose! {
    fn lecture(id: u32)(
        students in 1u32..100,
        teacher in 0u32..3,
        room in proptest::option::weighted(0.9, 0..ROOMS),
        period in proptest::option::weighted(0.9, 0u32..3),
    ) -> Lecture {
        Lecture { id, students, teacher, room, period }
    }
}

fn lectures(max: usize) -> impl Strategy<Value = Vec<Lecture>> {
    (1..=max).prop_flat_map(|n| (0..n as u32).map(lecture).collect::<Vec<_>>())
}

/// One mutation of the working solution. `Put` inserts or updates.
#[derive(Clone, Debug)]
enum Step {
    Put(Lecture),
    Remove(u32),
}

fn steps() -> impl Strategy<Value = Vec<Step>> {
    let step = prop_oneof![
        3 => (0u32..10).prop_flat_map(lecture).prop_map(Step::Put),
        1 => (0u32..10).prop_map(Step::Remove),
    ];
    proptest::collection::vec(step, 1..40)
}

fn ids_of<T: 'static>(session: &mut Session<HardSoftScore>, name: &str, position: usize, id: fn(&T) -> u32) -> Vec<u32> {
    let mut ids: Vec<u32> = session
        .constraint_matches(&ConstraintRef::new("", name))
        .unwrap()
        .iter()
        .map(|m| {
            m.justification.facts[position]
                .as_entity::<T>()
                .map(id)
                .unwrap()
        })
        .collect();
    ids.sort_unstable();
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // ========================================================================
    // Session laws
    // ========================================================================

    #[test]
    fn incremental_score_equals_rebuilt_session(steps in steps()) {
        let mut session = session_with([]);
        let mut model: BTreeMap<u32, Lecture> = BTreeMap::new();

        for step in steps {
            match step {
                Step::Put(lecture) => {
                    if model.contains_key(&lecture.id) {
                        session.update(lecture.clone()).unwrap();
                    } else {
                        session.insert(lecture.clone()).unwrap();
                    }
                    model.insert(lecture.id, lecture);
                }
                Step::Remove(id) => {
                    if model.remove(&id).is_some() {
                        session.retract_by_id::<Lecture>(&id).unwrap();
                    }
                }
            }
        }

        let mut rebuilt = session_with(model.into_values());
        prop_assert_eq!(snapshot(&mut session), snapshot(&mut rebuilt));
    }

    #[test]
    fn insert_then_retract_restores_state(lectures in lectures(8), extra in lecture(1000)) {
        let mut session = session_with(lectures);
        let before = snapshot(&mut session);

        session.insert(extra).unwrap();
        session.retract_by_id::<Lecture>(&1000).unwrap();

        prop_assert_eq!(snapshot(&mut session), before);
    }

    #[test]
    fn update_equals_retract_then_insert(lectures in lectures(8), replacement in lecture(0)) {
        let mut updated = session_with(lectures.clone());
        updated.update(replacement.clone()).unwrap();

        let mut replaced = session_with(lectures);
        replaced.retract_by_id::<Lecture>(&0).unwrap();
        replaced.insert(replacement).unwrap();

        prop_assert_eq!(snapshot(&mut updated), snapshot(&mut replaced));
    }

    // ========================================================================
    // Stream laws
    // ========================================================================

    #[test]
    fn join_is_commutative_under_reversed_joiner(lectures in lectures(10)) {
        let fits = || {
            equal_bi(|l: &Lecture| l.room, |r: &Room| Some(r.id))
                .and(less_than_or_equal(|l: &Lecture| l.students, |r: &Room| r.capacity))
        };
        let factory = SessionFactory::builder()
            .build(move |f: &ConstraintFactory<HardSoftScore>| {
                vec![
                    f.for_each::<Lecture>()
                        .join_each::<Room, _>(fits())
                        .penalize(HardSoftScore::ONE_SOFT)
                        .as_constraint("Lecture fits room"),
                    f.for_each::<Room>()
                        .join_each::<Lecture, _>(fits().reversed())
                        .penalize(HardSoftScore::ONE_SOFT)
                        .as_constraint("Room fits lecture"),
                ]
            })
            .unwrap();
        let mut session = factory.create_session();
        for room in rooms() {
            session.insert(room).unwrap();
        }
        for lecture in lectures {
            session.insert(lecture).unwrap();
        }

        let pairs = |session: &mut Session<HardSoftScore>, name: &str, lecture_at: usize| {
            let mut pairs: Vec<(u32, u32)> = session
                .constraint_matches(&ConstraintRef::new("", name))
                .unwrap()
                .iter()
                .map(|m| {
                    let entities = &m.justification.facts;
                    (
                        entities[lecture_at].as_entity::<Lecture>().unwrap().id,
                        entities[1 - lecture_at].as_entity::<Room>().unwrap().id,
                    )
                })
                .collect();
            pairs.sort_unstable();
            pairs
        };

        let forward = pairs(&mut session, "Lecture fits room", 0);
        let backward = pairs(&mut session, "Room fits lecture", 1);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn exists_and_not_exists_partition_the_stream(lectures in lectures(10), taken in proptest::sample::subsequence((0..ROOMS).collect::<Vec<_>>(), 0..=ROOMS as usize)) {
        let factory = SessionFactory::builder()
            .build(|f: &ConstraintFactory<HardSoftScore>| {
                vec![
                    f.for_each::<Room>()
                        .if_exists::<Lecture, _>(equal_bi(|r: &Room| Some(r.id), |l: &Lecture| l.room))
                        .penalize(HardSoftScore::ONE_SOFT)
                        .as_constraint("Used room"),
                    f.for_each::<Room>()
                        .if_not_exists::<Lecture, _>(equal_bi(|r: &Room| Some(r.id), |l: &Lecture| l.room))
                        .penalize(HardSoftScore::ONE_SOFT)
                        .as_constraint("Unused room"),
                ]
            })
            .unwrap();
        let mut session = factory.create_session();
        for room in rooms().into_iter().filter(|r| !taken.contains(&r.id)) {
            session.insert(room).unwrap();
        }
        for lecture in lectures {
            session.insert(lecture).unwrap();
        }

        let used = ids_of::<Room>(&mut session, "Used room", 0, |r| r.id);
        let unused = ids_of::<Room>(&mut session, "Unused room", 0, |r| r.id);

        let used_set: BTreeSet<u32> = used.iter().copied().collect();
        prop_assert!(unused.iter().all(|id| !used_set.contains(id)));

        let mut all: Vec<u32> = used.into_iter().chain(unused).collect();
        all.sort_unstable();
        let expected: Vec<u32> = (0..ROOMS).filter(|id| !taken.contains(id)).collect();
        prop_assert_eq!(all, expected);
    }

    #[test]
    fn group_keys_are_unique_and_vanish_with_their_last_fact(lectures in lectures(10)) {
        let factory = SessionFactory::builder()
            .build(|f: &ConstraintFactory<HardSoftScore>| {
                vec![f
                    .for_each::<Lecture>()
                    .group_by_key_collect(|l: &Lecture| l.teacher, sum(|l: &Lecture| l.students))
                    .penalize(HardSoftScore::ONE_SOFT)
                    .as_constraint("Teacher groups")]
            })
            .unwrap();
        let mut session = factory.create_session();
        for lecture in &lectures {
            session.insert(lecture.clone()).unwrap();
        }

        let teachers = ids_of::<u32>(&mut session, "Teacher groups", 0, |t| *t);
        let mut unique = teachers.clone();
        unique.dedup();
        prop_assert_eq!(&unique, &teachers);

        let Some(&gone) = teachers.first() else {
            return Ok(());
        };
        for lecture in lectures.iter().filter(|l| l.teacher == gone && l.room.is_some() && l.period.is_some()) {
            session.retract(lecture).unwrap();
        }
        let remaining = ids_of::<u32>(&mut session, "Teacher groups", 0, |t| *t);
        prop_assert_eq!(remaining, teachers[1..].to_vec());
    }

    // ========================================================================
    // Collector laws
    // ========================================================================

    #[test]
    fn collectors_ignore_accumulation_order(values in proptest::collection::vec(0u32..50, 0..30), seed in any::<u64>()) {
        let shuffled = permuted(&values, seed);
        prop_assert_eq!(fold_all(&values, &[]), fold_all(&shuffled, &[]));
    }

    #[test]
    fn collector_retract_undoes_accumulate(kept in proptest::collection::vec(0u32..50, 0..20), dropped in proptest::collection::vec(0u32..50, 0..20)) {
        let all: Vec<u32> = kept.iter().chain(&dropped).copied().collect();
        let folded = fold_all(&all, &dropped);
        prop_assert_eq!(&folded, &fold_all(&kept, &[]));

        let (_, low, high, distinct, ..) = folded;
        prop_assert_eq!(low, kept.iter().min().copied());
        prop_assert_eq!(high, kept.iter().max().copied());
        prop_assert_eq!(distinct, kept.iter().collect::<BTreeSet<_>>().len());
    }

    #[test]
    fn float_average_ignores_order_and_retraction(kept in floats(), dropped in floats(), seed in any::<u64>()) {
        let all: Vec<f64> = kept.iter().chain(&dropped).copied().collect();
        let expected = float_average(&kept, &[]);

        prop_assert_eq!(float_average(&all, &dropped), expected);
        prop_assert_eq!(float_average(&permuted(&all, seed), &dropped), expected);
    }
}

// ============================================================================
// Collector helpers
// ============================================================================

/// Rotation plus reversal gives a reproducible permutation.
fn permuted<T: Clone>(values: &[T], seed: u64) -> Vec<T> {
    let mut shuffled = values.to_vec();
    if !shuffled.is_empty() {
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
    }
    if seed % 2 == 0 {
        shuffled.reverse();
    }
    shuffled
}

fn floats() -> impl Strategy<Value = Vec<f64>> {
    let value = prop_oneof![-1e17f64..1e17, -1.0f64..1.0, Just(0.1)];
    proptest::collection::vec(value, 0..20)
}

/// Sum, min, max, distinct count, average bits, list, set and a custom sum
/// of squares.
type Folded = (u32, Option<u32>, Option<u32>, usize, u64, Vec<u32>, BTreeSet<u32>, u64);

fn fold_all(inserted: &[u32], retracted: &[u32]) -> Folded {
    let squares = custom(
        |v: &u32| u64::from(*v),
        || 0u64,
        |acc: &mut u64, v: &u64| *acc += v * v,
        |acc: &mut u64, v: &u64| *acc -= v * v,
        |acc: &u64| *acc,
    );

    let mut total = Reducer::<u32>::create_accumulator(&SumReducer);
    let mut low = Reducer::<u32>::create_accumulator(&MinReducer);
    let mut high = Reducer::<u32>::create_accumulator(&MaxReducer);
    let mut distinct = Reducer::<u32>::create_accumulator(&CountDistinctReducer);
    let mut mean = Reducer::<u32>::create_accumulator(&AverageReducer);
    let mut list = Reducer::<u32>::create_accumulator(&ToListReducer);
    let mut set = Reducer::<u32>::create_accumulator(&ToSetReducer);
    let mut square_sum = Collector::<(u32,)>::create_accumulator(&squares);

    for value in inserted {
        total.accumulate(value);
        low.accumulate(value);
        high.accumulate(value);
        distinct.accumulate(value);
        mean.accumulate(value);
        list.accumulate(value);
        set.accumulate(value);
        square_sum.accumulate(&u64::from(*value));
    }
    for value in retracted {
        total.retract(value);
        low.retract(value);
        high.retract(value);
        distinct.retract(value);
        mean.retract(value);
        list.retract(value);
        set.retract(value);
        square_sum.retract(&u64::from(*value));
    }

    (
        total.finish(),
        low.finish(),
        high.finish(),
        distinct.finish(),
        mean.finish().to_bits(),
        list.finish(),
        set.finish(),
        Accumulator::<u64, u64>::finish(&square_sum),
    )
}

fn float_average(inserted: &[f64], retracted: &[f64]) -> u64 {
    let mut mean = Reducer::<f64>::create_accumulator(&AverageReducer);
    for value in inserted {
        mean.accumulate(value);
    }
    for value in retracted {
        mean.retract(value);
    }
    mean.finish().to_bits()
}
