//! University timetabling fixtures.
//!
//! A lecture is assigned a room and a period; both start unassigned.
//!
//! # Example
//!
//! ```
//! use scoreflow_core::Fact;
//! use scoreflow_test::timetabling::Lecture;
//!
//! let lecture = Lecture::new(1, 40);
//! assert_eq!(lecture.uninitialized_variable_count(), 2);
//! assert_eq!(lecture.in_room(3).uninitialized_variable_count(), 1);
//! ```

use scoreflow_core::{Fact, PlanningId};

/// A room with a seat capacity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Room {
    pub id: u32,
    pub capacity: u32,
}

impl Room {
    pub fn new(id: u32, capacity: u32) -> Self {
        Self { id, capacity }
    }
}

impl PlanningId for Room {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

impl Fact for Room {}

/// A teaching period.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Period {
    pub id: u32,
    pub day: u32,
}

impl Period {
    pub fn new(id: u32, day: u32) -> Self {
        Self { id, day }
    }
}

impl PlanningId for Period {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

impl Fact for Period {}

/// A lecture; `room` and `period` are its planning variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Lecture {
    pub id: u32,
    pub students: u32,
    pub teacher: u32,
    pub room: Option<u32>,
    pub period: Option<u32>,
}

impl Lecture {
    /// Creates an unassigned lecture taught by teacher 0.
    pub fn new(id: u32, students: u32) -> Self {
        Self {
            id,
            students,
            teacher: 0,
            room: None,
            period: None,
        }
    }

    pub fn taught_by(mut self, teacher: u32) -> Self {
        self.teacher = teacher;
        self
    }

    pub fn in_room(mut self, room: u32) -> Self {
        self.room = Some(room);
        self
    }

    pub fn at(mut self, period: u32) -> Self {
        self.period = Some(period);
        self
    }

    pub fn is_assigned(&self) -> bool {
        self.room.is_some() && self.period.is_some()
    }
}

impl PlanningId for Lecture {
    type Id = u32;

    fn planning_id(&self) -> u32 {
        self.id
    }
}

impl Fact for Lecture {
    fn uninitialized_variable_count(&self) -> u32 {
        u32::from(self.room.is_none()) + u32::from(self.period.is_none())
    }
}
