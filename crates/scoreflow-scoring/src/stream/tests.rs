use std::sync::Arc;

use scoreflow_config::NullityPolicy;
use scoreflow_core::{Fact, HardSoftScore, ImpactType, PlanningId, SimpleScore};

use super::collector::{count, sum};
use super::joiner::{equal, equal_bi};
use super::plan::{FactoryContext, StreamOp};
use super::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Lecture {
    id: u32,
    room: u32,
    teacher: u32,
}

impl PlanningId for Lecture {
    type Id = u32;
    fn planning_id(&self) -> u32 {
        self.id
    }
}

impl Fact for Lecture {}

#[derive(Debug)]
struct Room {
    id: u32,
}

impl PlanningId for Room {
    type Id = u32;
    fn planning_id(&self) -> u32 {
        self.id
    }
}

impl Fact for Room {}

fn factory() -> ConstraintFactory<HardSoftScore> {
    ConstraintFactory::with_context(FactoryContext {
        nullity: NullityPolicy::ExcludeUninitialized,
        default_package: "timetabling".to_string(),
    })
}

// ============================================================================
// Distinctness
// ============================================================================

#[test]
fn test_source_and_filter_are_distinct() {
    let f = factory();
    let lectures = f.for_each::<Lecture>();
    assert!(lectures.guarantees_distinct());
    assert!(lectures.filter(|l: &Lecture| l.room > 0).guarantees_distinct());
}

#[test]
fn test_map_and_flatten_drop_distinctness() {
    let f = factory();
    assert!(!f.for_each::<Lecture>().map(|l: &Lecture| l.room).guarantees_distinct());
    assert!(!f
        .for_each::<Lecture>()
        .flatten_last(|l: &Lecture| vec![l.room, l.teacher])
        .guarantees_distinct());
}

#[test]
fn test_group_and_distinct_restore_distinctness() {
    let f = factory();
    let rooms = f.for_each::<Lecture>().map(|l: &Lecture| l.room);
    assert!(rooms.clone().distinct().guarantees_distinct());
    assert!(rooms.group_by(|room: &u32| *room).guarantees_distinct());
}

#[test]
fn test_distinct_on_distinct_stream_adds_no_node() {
    let f = factory();
    let lectures = f.for_each::<Lecture>();
    let same = lectures.clone().distinct();
    assert!(Arc::ptr_eq(&lectures.node, &same.node));
}

#[test]
fn test_join_distinct_only_when_both_sides_are() {
    let f = factory();
    let rooms = f.for_each::<Lecture>().map(|l: &Lecture| l.room);
    let joined = f
        .for_each::<Lecture>()
        .join(rooms, equal_bi(|l: &Lecture| l.room, |r: &u32| *r));
    assert!(!joined.guarantees_distinct());

    let pairs = f.for_each_unique_pair::<Lecture, _>(equal(|l: &Lecture| l.room));
    assert!(pairs.guarantees_distinct());
}

// ============================================================================
// Plan shape
// ============================================================================

#[test]
fn test_exists_adds_right_source_with_policy() {
    let f = factory();
    let strict = f
        .for_each::<Lecture>()
        .if_exists::<Room, _>(equal_bi(|l: &Lecture| l.room, |r: &Room| r.id));
    let lenient = f
        .for_each::<Lecture>()
        .if_exists_including_null_vars::<Room, _>(equal_bi(|l: &Lecture| l.room, |r: &Room| r.id));

    let policy_of = |stream: &UniConstraintStream<Lecture, HardSoftScore>| match &stream.node.parents[1].op {
        StreamOp::Source { policy, .. } => *policy,
        StreamOp::Operation(_) => panic!("right parent is not a source"),
    };
    assert_eq!(strict.node.name(), "if_exists");
    assert_eq!(policy_of(&strict), NullityPolicy::ExcludeUninitialized);
    assert_eq!(policy_of(&lenient), NullityPolicy::IncludeUninitialized);
}

#[test]
fn test_unique_pair_joins_source_with_itself() {
    let f = factory();
    let pairs = f.for_each_unique_pair::<Lecture, _>(());
    assert_eq!(pairs.node.name(), "join");
    assert_eq!(pairs.node.parents.len(), 2);
}

#[test]
fn test_group_by_arities() {
    let f = factory();
    let by_room = f
        .for_each::<Lecture>()
        .group_by_key_collect2(|l: &Lecture| l.room, count(), sum(|l: &Lecture| l.teacher));
    assert_eq!(by_room.node.name(), "group_by");

    let global = f.for_each::<Lecture>().group_by_collect(count());
    assert!(global.guarantees_distinct());
}

#[test]
fn test_wide_streams_check_existence_and_group() {
    let f = factory();
    let pairs = f
        .for_each::<Lecture>()
        .join_each::<Room, _>(equal_bi(|l: &Lecture| l.room, |r: &Room| r.id));

    let taught = pairs
        .clone()
        .if_not_exists::<Lecture, _>(equal_bi(|l: &Lecture, _: &Room| l.teacher, |o: &Lecture| o.id));
    assert_eq!(taught.node.name(), "if_not_exists");

    let per_room = pairs.clone().group_by_key_collect(|_: &Lecture, r: &Room| r.id, count());
    assert_eq!(per_room.node.name(), "group_by");

    let triples = pairs
        .join_each::<Room, _>(())
        .if_exists::<Lecture, _>(equal_bi(|a: &Lecture, _: &Room, _: &Room| a.teacher, |o: &Lecture| o.teacher))
        .group_by_collect(sum(|a: &Lecture, _: &Room, _: &Room| a.room));
    assert!(triples.guarantees_distinct());
}

// ============================================================================
// Terminals
// ============================================================================

#[test]
fn test_as_constraint_uses_default_package() {
    let constraint = factory()
        .for_each::<Lecture>()
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Room conflict");

    assert_eq!(constraint.constraint_ref().full_name(), "timetabling/Room conflict");
    assert_eq!(constraint.impact_type(), ImpactType::Penalty);
    assert_eq!(constraint.weight(), ConstraintWeight::Fixed(HardSoftScore::ONE_HARD));
    assert_eq!(constraint.state(), ConstraintState::Unbuilt);
}

#[test]
fn test_as_constraint_in_overrides_package() {
    let constraint = factory()
        .for_each::<Lecture>()
        .reward_configurable()
        .as_constraint_in("custom", "Preferred room");

    assert_eq!(constraint.constraint_ref().package, "custom");
    assert!(constraint.is_configurable());
    assert_eq!(constraint.impact_type(), ImpactType::Reward);
}

#[test]
fn test_match_weigher_reads_typed_elements() {
    let constraint = ConstraintFactory::<SimpleScore>::new()
        .for_each::<Lecture>()
        .impact_with(SimpleScore::of(1), |l: &Lecture| l.room as i64 - 5)
        .as_constraint("Room distance");

    let tuple = crate::tuple::Tuple::of(Arc::new(Lecture {
        id: 1,
        room: 2,
        teacher: 0,
    }));
    assert_eq!((constraint.weigher)(&tuple), -3);
    assert_eq!(constraint.impact_type(), ImpactType::Mixed);
}
