//! Shared test fixtures for scoreflow crates.
//!
//! This crate provides fact types for testing.
//! It does NOT depend on `scoreflow-scoring` to avoid circular dependencies.
//!
//! - [`timetabling`] - lectures with optional room and period assignments
//! - [`shifts`] - shifts assigned to employees
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! scoreflow-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```
//! use scoreflow_test::timetabling::{Lecture, Room};
//!
//! let room = Room::new(1, 30);
//! let lecture = Lecture::new(10, 5).in_room(room.id).at(2);
//! assert!(lecture.is_assigned());
//! ```

pub mod shifts;
pub mod timetabling;

pub use shifts::{Employee, Shift};
pub use timetabling::{Lecture, Period, Room};
