//! Long random walks over a rostering problem.
//!
//! Each walk drives an incremental session in `FullAssert` mode (which
//! checks every score against a from-scratch evaluation) and a separate
//! recompute session with the same mutations, and compares the two after
//! every step. Seeds are fixed so a failure replays exactly.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use scoreflow_config::{BackendKind, EnvironmentMode};
use scoreflow_core::HardSoftScore;
use scoreflow_scoring::stream::collector::{count, sum, to_set};
use scoreflow_scoring::stream::joiner::{equal, equal_bi, overlapping};
use scoreflow_scoring::{Constraint, ConstraintFactory, Session, SessionFactory};
use scoreflow_test::shifts::{Employee, Shift};

const SKILLS: [&str; 3] = ["nurse", "driver", "cook"];

fn rostering(f: &ConstraintFactory<HardSoftScore>) -> Vec<Constraint<HardSoftScore>> {
    let assigned = f.for_each::<Shift>();
    vec![
        f.for_each_unique_pair::<Shift, _>(
            equal(|s: &Shift| s.employee)
                .and(overlapping(|s: &Shift| s.start, |s: &Shift| s.end)),
        )
        .penalize(HardSoftScore::ONE_HARD)
        .as_constraint("Overlapping shifts"),
        assigned
            .clone()
            .join_each::<Employee, _>(equal_bi(|s: &Shift| s.employee, |e: &Employee| Some(e.id)))
            .filter(|s: &Shift, e: &Employee| {
                s.required_skill
                    .as_deref()
                    .is_some_and(|skill| !e.has_skill(skill))
            })
            .penalize(HardSoftScore::ONE_HARD)
            .as_constraint("Missing skill"),
        f.for_each_including_null_vars::<Shift>()
            .filter(|s: &Shift| s.employee.is_none())
            .penalize(HardSoftScore::of_hard(2))
            .as_constraint("Unassigned shift"),
        assigned
            .clone()
            .group_by_key_collect2(
                |s: &Shift| s.employee,
                sum(|s: &Shift| s.duration()),
                count(),
            )
            .filter(|_: &Option<u32>, hours: &u32, _: &usize| *hours > 16)
            .penalize_with(HardSoftScore::ONE_SOFT, |_: &Option<u32>, hours: &u32, shifts: &usize| {
                i64::from(*hours - 16) * *shifts as i64
            })
            .as_constraint("Overtime"),
        assigned
            .group_by_key_collect(|s: &Shift| s.employee, to_set(|s: &Shift| s.start / 24))
            .reward_with(HardSoftScore::ONE_SOFT, |_: &Option<u32>, days| days.len() as i64)
            .as_constraint("Working days"),
        f.for_each::<Employee>()
            .if_not_exists::<Shift, _>(equal_bi(|e: &Employee| Some(e.id), |s: &Shift| s.employee))
            .penalize(HardSoftScore::ONE_SOFT)
            .as_constraint("Idle employee"),
        f.for_each::<Employee>()
            .flatten_last(|e: &Employee| e.skills.clone())
            .distinct()
            .group_by_collect(count())
            .reward_with(HardSoftScore::ONE_SOFT, |n: &usize| *n as i64)
            .as_constraint("Skill coverage"),
    ]
}

fn session(backend: BackendKind, mode: EnvironmentMode) -> Session<HardSoftScore> {
    SessionFactory::builder()
        .with_backend(backend)
        .with_environment_mode(mode)
        .build(rostering)
        .unwrap()
        .create_session()
}

fn random_shift(rng: &mut ChaCha8Rng, id: u32) -> Shift {
    let start = rng.random_range(0..72);
    let mut shift = Shift::new(id, start, start + rng.random_range(4..10));
    if rng.random_bool(0.5) {
        shift = shift.requiring(SKILLS[rng.random_range(0..SKILLS.len())]);
    }
    if rng.random_bool(0.8) {
        shift = shift.assigned_to(rng.random_range(0..5));
    }
    shift
}

fn random_employee(rng: &mut ChaCha8Rng, id: u32) -> Employee {
    let mut employee = Employee::new(id, "employee");
    for skill in SKILLS {
        if rng.random_bool(0.4) {
            employee = employee.with_skill(skill);
        }
    }
    employee
}

/// Applies `mutation` to both sessions.
fn both<F>(incremental: &mut Session<HardSoftScore>, recompute: &mut Session<HardSoftScore>, mutation: F)
where
    F: Fn(&mut Session<HardSoftScore>),
{
    mutation(incremental);
    mutation(recompute);
}

fn walk(seed: u64, steps: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut incremental = session(BackendKind::Incremental, EnvironmentMode::FullAssert);
    let mut recompute = session(BackendKind::Recompute, EnvironmentMode::NonReproducible);
    let mut shifts: BTreeMap<u32, Shift> = BTreeMap::new();
    let mut employees: BTreeMap<u32, Employee> = BTreeMap::new();

    for step in 0..steps {
        match rng.random_range(0..10) {
            0..=4 => {
                let id: u32 = rng.random_range(0..20);
                let shift = random_shift(&mut rng, id);
                let present = shifts.insert(shift.id, shift.clone()).is_some();
                both(&mut incremental, &mut recompute, |s| {
                    if present {
                        s.update(shift.clone()).unwrap();
                    } else {
                        s.insert(shift.clone()).unwrap();
                    }
                });
            }
            5 | 6 => {
                let id: u32 = rng.random_range(0..20);
                if shifts.remove(&id).is_some() {
                    both(&mut incremental, &mut recompute, |s| {
                        s.retract_by_id::<Shift>(&id).unwrap();
                    });
                }
            }
            7 | 8 => {
                let id: u32 = rng.random_range(0..5);
                let employee = random_employee(&mut rng, id);
                let present = employees.insert(employee.id, employee.clone()).is_some();
                both(&mut incremental, &mut recompute, |s| {
                    if present {
                        s.update(employee.clone()).unwrap();
                    } else {
                        s.insert(employee.clone()).unwrap();
                    }
                });
            }
            _ => {
                let id: u32 = rng.random_range(0..5);
                if employees.remove(&id).is_some() {
                    both(&mut incremental, &mut recompute, |s| {
                        s.retract_by_id::<Employee>(&id).unwrap();
                    });
                }
            }
        }

        let expected = recompute.calculate_score().unwrap();
        let actual = incremental
            .calculate_score()
            .unwrap_or_else(|err| panic!("seed {seed}, step {step}: {err}"));
        assert_eq!(actual, expected, "seed {seed}, step {step}");
        assert_eq!(incremental.init_score(), recompute.init_score());
    }

    assert_eq!(
        incremental.constraint_match_totals().unwrap(),
        recompute.constraint_match_totals().unwrap()
    );
    assert_eq!(incremental.fact_count(), shifts.len() + employees.len());
}

#[test]
fn test_random_walks_agree_with_recompute() {
    for seed in [7, 42, 1234, 9001] {
        walk(seed, 400);
    }
}

#[test]
fn test_walk_then_clear_by_retraction() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut session = session(BackendKind::Incremental, EnvironmentMode::FullAssert);

    for id in 0..5 {
        session.insert(random_employee(&mut rng, id)).unwrap();
    }
    for id in 0..30 {
        session.insert(random_shift(&mut rng, id)).unwrap();
    }
    assert_ne!(session.calculate_score().unwrap(), HardSoftScore::ZERO);

    for id in 0..30 {
        session.retract_by_id::<Shift>(&id).unwrap();
    }
    for id in 0..5 {
        session.retract_by_id::<Employee>(&id).unwrap();
    }
    assert_eq!(session.calculate_score().unwrap(), HardSoftScore::ZERO);
    assert_eq!(session.fact_count(), 0);
}
