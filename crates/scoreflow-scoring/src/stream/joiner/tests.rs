use std::sync::Arc;

use super::*;
use crate::tuple::Tuple;

#[derive(Debug, Clone)]
struct Shift {
    employee: u32,
    start: i64,
    end: i64,
}

#[derive(Debug)]
struct Employee {
    id: u32,
}

fn shift(employee: u32, start: i64, end: i64) -> Tuple {
    Tuple::of(Arc::new(Shift {
        employee,
        start,
        end,
    }))
}

fn employee(id: u32) -> Tuple {
    Tuple::of(Arc::new(Employee { id }))
}

fn matches<L, R, J: Joiner<L, R>>(joiner: &J, left: &Tuple, right: &Tuple) -> bool {
    joiner.left_key(left) == joiner.right_key(right) && joiner.test(left, right)
}

// ============================================================================
// Single joiners
// ============================================================================

#[test]
fn test_equal_uses_key_only() {
    let joiner = equal(|s: &Shift| s.employee);
    let a = shift(1, 0, 8);
    let b = shift(1, 8, 16);
    let c = shift(2, 0, 8);
    assert!(matches::<(Shift,), Shift, _>(&joiner, &a, &b));
    assert!(!matches::<(Shift,), Shift, _>(&joiner, &a, &c));
}

#[test]
fn test_equal_bi_across_types() {
    let joiner = equal_bi(|s: &Shift| s.employee, |e: &Employee| e.id);
    assert!(matches::<(Shift,), Employee, _>(&joiner, &shift(3, 0, 1), &employee(3)));
    assert!(!matches::<(Shift,), Employee, _>(&joiner, &shift(3, 0, 1), &employee(4)));
}

#[test]
fn test_equal_on_bi_left() {
    let joiner = equal_bi(|s: &Shift, e: &Employee| s.employee + e.id, |e: &Employee| e.id);
    let left = shift(1, 0, 1).concat(&employee(2));
    assert!(matches::<(Shift, Employee), Employee, _>(&joiner, &left, &employee(3)));
}

#[test]
fn test_comparisons() {
    let a = shift(1, 0, 8);
    let b = shift(1, 8, 16);
    let lt = less_than(|s: &Shift| s.start, |s: &Shift| s.start);
    let le = less_than_or_equal(|s: &Shift| s.start, |s: &Shift| s.start);
    let gt = greater_than(|s: &Shift| s.start, |s: &Shift| s.start);
    let ge = greater_than_or_equal(|s: &Shift| s.start, |s: &Shift| s.start);

    assert!(matches::<(Shift,), Shift, _>(&lt, &a, &b));
    assert!(!matches::<(Shift,), Shift, _>(&lt, &a, &a));
    assert!(matches::<(Shift,), Shift, _>(&le, &a, &a));
    assert!(matches::<(Shift,), Shift, _>(&gt, &b, &a));
    assert!(matches::<(Shift,), Shift, _>(&ge, &b, &b));
    assert!(!matches::<(Shift,), Shift, _>(&ge, &a, &b));
}

#[test]
fn test_comparison_with_incomparable_values_never_matches() {
    let joiner = less_than(|_: &Shift| f64::NAN, |_: &Shift| 1.0);
    assert!(!matches::<(Shift,), Shift, _>(&joiner, &shift(1, 0, 1), &shift(1, 0, 1)));
}

#[test]
fn test_overlapping_half_open() {
    let joiner = overlapping(|s: &Shift| s.start, |s: &Shift| s.end);
    let morning = shift(1, 0, 8);
    let day = shift(1, 6, 14);
    let evening = shift(1, 8, 16);
    assert!(matches::<(Shift,), Shift, _>(&joiner, &morning, &day));
    assert!(!matches::<(Shift,), Shift, _>(&joiner, &morning, &evening));
}

#[test]
fn test_filtering() {
    let joiner = filtering(|a: &Shift, b: &Shift| a.end - a.start + b.end - b.start > 12);
    assert!(matches::<(Shift,), Shift, _>(&joiner, &shift(1, 0, 8), &shift(1, 8, 16)));
    assert!(!matches::<(Shift,), Shift, _>(&joiner, &shift(1, 0, 4), &shift(1, 8, 12)));
}

// ============================================================================
// Chains
// ============================================================================

#[test]
fn test_and_combines_keys_and_tests() {
    let joiner = equal(|s: &Shift| s.employee).and(less_than(|s: &Shift| s.start, |s: &Shift| s.start));
    let a = shift(1, 0, 8);
    let b = shift(1, 8, 16);
    let other = shift(2, 8, 16);
    assert_eq!(Joiner::<(Shift,), Shift>::left_key(&joiner, &a), (1, ()));
    assert!(matches::<(Shift,), Shift, _>(&joiner, &a, &b));
    assert!(!matches::<(Shift,), Shift, _>(&joiner, &b, &a));
    assert!(!matches::<(Shift,), Shift, _>(&joiner, &a, &other));
}

#[test]
fn test_order_violation_detects_index_after_filter() {
    let valid = equal(|s: &Shift| s.employee).and(filtering(|_: &Shift, _: &Shift| true));
    assert_eq!(order_violation::<(Shift,), Shift, _>(&valid), None);

    let invalid = filtering(|_: &Shift, _: &Shift| true).and(equal(|s: &Shift| s.employee));
    assert_eq!(order_violation::<(Shift,), Shift, _>(&invalid), Some("equal"));

    let nested = equal(|s: &Shift| s.employee)
        .and(filtering(|_: &Shift, _: &Shift| true))
        .and(overlapping(|s: &Shift| s.start, |s: &Shift| s.end));
    assert_eq!(order_violation::<(Shift,), Shift, _>(&nested), Some("overlapping"));
}

#[test]
fn test_reversed_swaps_sides() {
    let joiner = equal_bi(|s: &Shift| s.employee, |e: &Employee| e.id)
        .and(less_than(|s: &Shift| s.start as u32, |e: &Employee| e.id));
    let reversed = joiner.reversed();
    let e = employee(5);
    assert!(matches::<(Employee,), Shift, _>(&reversed, &e, &shift(5, 2, 3)));
    assert!(!matches::<(Employee,), Shift, _>(&reversed, &e, &shift(5, 9, 10)));
    assert!(!matches::<(Employee,), Shift, _>(&reversed, &e, &shift(4, 2, 3)));
}
