use std::sync::Arc;

use super::*;

#[derive(Debug, PartialEq)]
struct Room(u32);

#[derive(Debug, PartialEq)]
struct Period(u32);

fn tuple_of<T: TupleValue>(value: T) -> Tuple {
    Tuple::of(Arc::new(value))
}

#[test]
fn test_fact_downcasts_by_position() {
    let pair = tuple_of(Room(1)).concat(&tuple_of(Period(7)));
    assert_eq!(pair.arity(), 2);
    assert_eq!(pair.fact::<Room>(0), &Room(1));
    assert_eq!(pair.fact::<Period>(1), &Period(7));
    assert!(pair.get::<Room>(1).is_none());
    assert!(pair.get::<Room>(5).is_none());
}

#[test]
#[should_panic(expected = "is not a")]
fn test_fact_panics_on_wrong_type() {
    tuple_of(Room(1)).fact::<Period>(0);
}

#[test]
fn test_with_last_keeps_prefix() {
    let pair = tuple_of(Room(1)).concat(&tuple_of(Period(7)));
    let replaced = pair.with_last(Arc::new(Period(8)));
    assert!(Arc::ptr_eq(&pair.elements()[0], &replaced.elements()[0]));
    assert_eq!(replaced.fact::<Period>(1), &Period(8));
}

#[test]
fn test_same_elements_is_identity_not_equality() {
    let a = tuple_of(Room(1));
    let b = tuple_of(Room(1));
    assert!(a.same_elements(&a.clone()));
    assert!(!a.same_elements(&b));
}

#[test]
fn test_arena_reuses_slots_with_new_generation() {
    let mut arena = TupleArena::new();
    let first = arena.insert(tuple_of(Room(1)));
    assert_eq!(arena.len(), 1);

    assert!(arena.release(first));
    assert!(!arena.release(first));
    assert!(arena.get(first).is_none());

    let second = arena.insert(tuple_of(Room(2)));
    assert_ne!(first, second);
    assert!(arena.get(first).is_none());
    assert_eq!(arena.get(second).unwrap().fact::<Room>(0), &Room(2));
    assert_eq!(arena.len(), 1);
}
