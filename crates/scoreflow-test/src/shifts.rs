//! Employee rostering fixtures.
//!
//! # Example
//!
//! ```
//! use scoreflow_test::shifts::Shift;
//!
//! let early = Shift::new(1, 6, 14).assigned_to(7);
//! let late = Shift::new(2, 13, 21);
//! assert!(early.overlaps(&late));
//! assert_eq!(early.duration(), 8);
//! ```

use scoreflow_core::{Fact, PlanningId};

/// An employee with a set of skills.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Employee {
    pub id: u32,
    pub name: String,
    pub skills: Vec<String>,
}

impl Employee {
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            skills: Vec::new(),
        }
    }

    pub fn with_skill(mut self, skill: &str) -> Self {
        self.skills.push(skill.to_string());
        self
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

impl PlanningId for Employee {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

impl Fact for Employee {}

/// A shift over `[start, end)` hours; `employee` is its planning variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shift {
    pub id: u32,
    pub start: u32,
    pub end: u32,
    pub required_skill: Option<String>,
    pub employee: Option<u32>,
}

impl Shift {
    pub fn new(id: u32, start: u32, end: u32) -> Self {
        Self {
            id,
            start,
            end,
            required_skill: None,
            employee: None,
        }
    }

    pub fn requiring(mut self, skill: &str) -> Self {
        self.required_skill = Some(skill.to_string());
        self
    }

    pub fn assigned_to(mut self, employee: u32) -> Self {
        self.employee = Some(employee);
        self
    }

    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Shift) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl PlanningId for Shift {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

impl Fact for Shift {
    fn uninitialized_variable_count(&self) -> u32 {
        u32::from(self.employee.is_none())
    }
}
