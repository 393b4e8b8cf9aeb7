use std::collections::VecDeque;
use std::sync::Arc;

use scoreflow_core::StateError;

use super::*;
use crate::stream::collector::{count, sum};
use crate::stream::joiner::{equal, equal_bi};
use crate::tuple::{Element, Tuple, TupleArena, TupleId};

#[derive(Debug)]
struct Lecture {
    id: u32,
    room: u32,
    size: u32,
}

#[derive(Debug)]
struct Room {
    id: u32,
}

fn lecture(id: u32, room: u32, size: u32) -> Lecture {
    Lecture { id, room, size }
}

const CHILDREN: [Target; 1] = [Target::Terminal(0)];

/// A single live node wired to one terminal.
struct Harness {
    name: &'static str,
    node: Box<dyn Node>,
    arena: TupleArena,
    queue: VecDeque<Operation>,
    released: Vec<TupleId>,
}

impl Harness {
    fn new(spec: &dyn NodeSpec) -> Self {
        Self {
            name: spec.name(),
            node: spec.instantiate(),
            arena: TupleArena::new(),
            queue: VecDeque::new(),
            released: Vec::new(),
        }
    }

    fn fact<T: std::fmt::Debug + Send + Sync + 'static>(&mut self, value: T) -> TupleId {
        self.arena.insert(Tuple::of(Arc::new(value)))
    }

    fn insert(&mut self, side: Side, id: TupleId) -> Vec<(Signal, Tuple)> {
        self.apply(side, id, Signal::Insert).unwrap()
    }

    fn retract(&mut self, side: Side, id: TupleId) -> Vec<(Signal, Tuple)> {
        self.apply(side, id, Signal::Retract).unwrap()
    }

    fn apply(
        &mut self,
        side: Side,
        id: TupleId,
        signal: Signal,
    ) -> Result<Vec<(Signal, Tuple)>, StateError> {
        let mut cx = Propagation {
            node: self.name,
            arena: &mut self.arena,
            queue: &mut self.queue,
            released: &mut self.released,
            children: &CHILDREN,
        };
        match signal {
            Signal::Insert => self.node.insert(side, id, &mut cx)?,
            Signal::Retract => self.node.retract(side, id, &mut cx)?,
        }

        let mut outputs = Vec::new();
        while let Some(op) = self.queue.pop_front() {
            assert_eq!(op.target, Target::Terminal(0));
            let tuple = self.arena.get(op.tuple).cloned().expect("output tuple is live");
            outputs.push((op.signal, tuple));
        }
        for id in self.released.drain(..) {
            assert!(self.arena.release(id));
        }
        Ok(outputs)
    }
}

fn lecture_ids(outputs: &[(Signal, Tuple)]) -> Vec<(Signal, u32)> {
    outputs
        .iter()
        .map(|(signal, tuple)| (*signal, tuple.fact::<Lecture>(0).id))
        .collect()
}

// ============================================================================
// Filter, map, flatten
// ============================================================================

#[test]
fn test_filter_retracts_only_what_passed() {
    let spec = FilterSpec::new(|t: &Tuple| t.fact::<Lecture>(0).size > 10);
    let mut h = Harness::new(&spec);
    let big = h.fact(lecture(1, 1, 30));
    let small = h.fact(lecture(2, 1, 5));

    assert_eq!(lecture_ids(&h.insert(Side::Left, big)), vec![(Signal::Insert, 1)]);
    assert!(h.insert(Side::Left, small).is_empty());
    assert!(h.retract(Side::Left, small).is_empty());
    assert_eq!(lecture_ids(&h.retract(Side::Left, big)), vec![(Signal::Retract, 1)]);
}

#[test]
fn test_map_releases_output_on_retract() {
    let spec = MapSpec::new(|t: &Tuple| -> Element { Arc::new(t.fact::<Lecture>(0).room) });
    let mut h = Harness::new(&spec);
    let id = h.fact(lecture(1, 7, 10));

    let inserted = h.insert(Side::Left, id);
    assert_eq!(inserted.len(), 1);
    assert_eq!(*inserted[0].1.fact::<u32>(0), 7);
    assert_eq!(h.arena.len(), 2);

    let retracted = h.retract(Side::Left, id);
    assert_eq!(retracted[0].0, Signal::Retract);
    assert_eq!(h.arena.len(), 1);
}

#[test]
fn test_map_retract_of_unknown_tuple_fails() {
    let spec = MapSpec::new(|t: &Tuple| -> Element { Arc::new(t.fact::<Lecture>(0).room) });
    let mut h = Harness::new(&spec);
    let id = h.fact(lecture(1, 7, 10));

    let err = h.apply(Side::Left, id, Signal::Retract).unwrap_err();
    assert!(matches!(err, StateError::UnknownTuple { node: "map" }));
}

#[test]
fn test_flatten_last_expands_and_retracts_every_item() {
    let spec = FlattenSpec::new(|t: &Tuple| -> Vec<Element> {
        let lecture = t.fact::<Lecture>(0);
        (0..lecture.room).map(|slot| Arc::new(slot) as Element).collect()
    });
    let mut h = Harness::new(&spec);
    let id = h.fact(lecture(1, 3, 10));

    let inserted = h.insert(Side::Left, id);
    let slots: Vec<u32> = inserted.iter().map(|(_, t)| *t.fact::<u32>(0)).collect();
    assert_eq!(slots, vec![0, 1, 2]);

    let retracted = h.retract(Side::Left, id);
    assert_eq!(retracted.len(), 3);
    assert!(retracted.iter().all(|(signal, _)| *signal == Signal::Retract));
    assert_eq!(h.arena.len(), 1);
}

// ============================================================================
// Join
// ============================================================================

#[test]
fn test_join_pairs_on_key_from_both_sides() {
    let spec = JoinSpec::<(Lecture,), Room, _>::new(equal_bi(|l: &Lecture| l.room, |r: &Room| r.id));
    let mut h = Harness::new(&spec);
    let l1 = h.fact(lecture(1, 1, 10));
    let r1 = h.fact(Room { id: 1 });
    let r2 = h.fact(Room { id: 2 });

    assert!(h.insert(Side::Right, r1).is_empty());
    assert!(h.insert(Side::Right, r2).is_empty());

    let joined = h.insert(Side::Left, l1);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].1.arity(), 2);
    assert_eq!(joined[0].1.fact::<Room>(1).id, 1);

    let retracted = h.retract(Side::Right, r1);
    assert_eq!(retracted.len(), 1);
    assert_eq!(retracted[0].0, Signal::Retract);
    assert!(retracted[0].1.same_elements(&joined[0].1));

    // Left no longer has partners.
    assert!(h.retract(Side::Left, l1).is_empty());
}

#[test]
fn test_join_of_a_stream_with_itself_includes_self_pairs() {
    let spec = JoinSpec::<(Lecture,), Lecture, _>::new(equal(|l: &Lecture| l.room));
    let mut h = Harness::new(&spec);
    let a = h.fact(lecture(1, 1, 10));
    let b = h.fact(lecture(2, 1, 10));

    let mut count = 0;
    for id in [a, b] {
        count += h.insert(Side::Left, id).len();
        count += h.insert(Side::Right, id).len();
    }
    assert_eq!(count, 4);
}

#[test]
fn test_join_evaluate_matches_incremental_output() {
    let spec = JoinSpec::<(Lecture,), Room, _>::new(equal_bi(|l: &Lecture| l.room, |r: &Room| r.id));
    let lectures = vec![
        Tuple::of(Arc::new(lecture(1, 1, 10))),
        Tuple::of(Arc::new(lecture(2, 2, 10))),
        Tuple::of(Arc::new(lecture(3, 1, 10))),
    ];
    let rooms = vec![Tuple::of(Arc::new(Room { id: 1 }))];

    let joined = spec.evaluate(&[&lectures, &rooms]);
    let ids: Vec<u32> = joined.iter().map(|t| t.fact::<Lecture>(0).id).collect();
    assert_eq!(ids, vec![1, 3]);
}

// ============================================================================
// Existence
// ============================================================================

#[test]
fn test_if_exists_propagates_only_zero_crossings() {
    let spec = ExistsSpec::<(Lecture,), Room, _>::new(
        equal_bi(|l: &Lecture| l.room, |r: &Room| r.id),
        true,
        false,
    );
    let mut h = Harness::new(&spec);
    let l1 = h.fact(lecture(1, 1, 10));
    let r1 = h.fact(Room { id: 1 });
    let r1_again = h.fact(Room { id: 1 });

    assert!(h.insert(Side::Left, l1).is_empty());
    assert_eq!(lecture_ids(&h.insert(Side::Right, r1)), vec![(Signal::Insert, 1)]);
    assert!(h.insert(Side::Right, r1_again).is_empty());
    assert!(h.retract(Side::Right, r1).is_empty());
    assert_eq!(lecture_ids(&h.retract(Side::Right, r1_again)), vec![(Signal::Retract, 1)]);
}

#[test]
fn test_if_not_exists_passes_unmatched_left() {
    let spec = ExistsSpec::<(Lecture,), Room, _>::new(
        equal_bi(|l: &Lecture| l.room, |r: &Room| r.id),
        false,
        false,
    );
    let mut h = Harness::new(&spec);
    let l1 = h.fact(lecture(1, 1, 10));
    let r1 = h.fact(Room { id: 1 });

    assert_eq!(lecture_ids(&h.insert(Side::Left, l1)), vec![(Signal::Insert, 1)]);
    assert_eq!(lecture_ids(&h.insert(Side::Right, r1)), vec![(Signal::Retract, 1)]);
    assert_eq!(lecture_ids(&h.retract(Side::Right, r1)), vec![(Signal::Insert, 1)]);
    assert_eq!(lecture_ids(&h.retract(Side::Left, l1)), vec![(Signal::Retract, 1)]);
}

#[test]
fn test_exists_other_never_counts_the_fact_itself() {
    let spec = ExistsSpec::<(Lecture,), Lecture, _>::new(equal(|l: &Lecture| l.room), false, true);
    let mut h = Harness::new(&spec);
    let a = h.fact(lecture(1, 1, 10));
    let b = h.fact(lecture(2, 1, 10));

    assert_eq!(lecture_ids(&h.insert(Side::Left, a)), vec![(Signal::Insert, 1)]);
    assert!(h.insert(Side::Right, a).is_empty());
    assert!(h.insert(Side::Left, b).is_empty());
    assert_eq!(lecture_ids(&h.insert(Side::Right, b)), vec![(Signal::Retract, 1)]);
}

// ============================================================================
// Group and distinct
// ============================================================================

#[test]
fn test_group_replaces_output_on_every_change() {
    let spec = GroupSpec::<_, _, _, (Lecture,)>::new(
        |t: &Tuple| (t.fact::<Lecture>(0).room,),
        (count(), sum(|l: &Lecture| l.size)),
    );
    let mut h = Harness::new(&spec);
    let a = h.fact(lecture(1, 4, 10));
    let b = h.fact(lecture(2, 4, 15));

    let first = h.insert(Side::Left, a);
    assert_eq!(first.len(), 1);
    assert_eq!(*first[0].1.fact::<u32>(0), 4);
    assert_eq!(*first[0].1.fact::<usize>(1), 1);
    assert_eq!(*first[0].1.fact::<u32>(2), 10);

    let second = h.insert(Side::Left, b);
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].0, Signal::Retract);
    assert!(second[0].1.same_elements(&first[0].1));
    assert_eq!(second[1].0, Signal::Insert);
    assert_eq!(*second[1].1.fact::<usize>(1), 2);
    assert_eq!(*second[1].1.fact::<u32>(2), 25);

    let third = h.retract(Side::Left, a);
    assert_eq!(*third[1].1.fact::<u32>(2), 15);

    let last = h.retract(Side::Left, b);
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].0, Signal::Retract);
    // Only the two input facts remain.
    assert_eq!(h.arena.len(), 2);
}

#[test]
fn test_group_retract_of_unknown_member_fails() {
    let spec = GroupSpec::<_, _, _, (Lecture,)>::new(|_: &Tuple| (), (count(),));
    let mut h = Harness::new(&spec);
    let a = h.fact(lecture(1, 1, 1));

    h.insert(Side::Left, a);
    h.retract(Side::Left, a);
    let err = h.apply(Side::Left, a, Signal::Retract).unwrap_err();
    assert!(matches!(err, StateError::UnknownTuple { node: "group_by" }));
}

#[test]
fn test_group_evaluate_keeps_first_seen_key_order() {
    let spec = GroupSpec::<_, _, _, (Lecture,)>::new(
        |t: &Tuple| (t.fact::<Lecture>(0).room,),
        (count(),),
    );
    let input = vec![
        Tuple::of(Arc::new(lecture(1, 3, 1))),
        Tuple::of(Arc::new(lecture(2, 1, 1))),
        Tuple::of(Arc::new(lecture(3, 3, 1))),
    ];
    let groups = spec.evaluate(&[&input]);
    let summary: Vec<(u32, usize)> = groups
        .iter()
        .map(|t| (*t.fact::<u32>(0), *t.fact::<usize>(1)))
        .collect();
    assert_eq!(summary, vec![(3, 2), (1, 1)]);
}

#[test]
fn test_distinct_hands_over_to_next_equal_tuple() {
    let spec = DistinctSpec::new(|t: &Tuple| t.fact::<Lecture>(0).room);
    let mut h = Harness::new(&spec);
    let a = h.fact(lecture(1, 1, 10));
    let b = h.fact(lecture(2, 1, 10));

    assert_eq!(lecture_ids(&h.insert(Side::Left, a)), vec![(Signal::Insert, 1)]);
    assert!(h.insert(Side::Left, b).is_empty());
    assert_eq!(
        lecture_ids(&h.retract(Side::Left, a)),
        vec![(Signal::Retract, 1), (Signal::Insert, 2)]
    );
    assert_eq!(lecture_ids(&h.retract(Side::Left, b)), vec![(Signal::Retract, 2)]);
}
