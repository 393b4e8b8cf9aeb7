//! Core domain traits

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for unique identification of facts.
///
/// The session uses the id to detect double inserts and to find the stored
/// value on update and retract.
///
/// # Example
///
/// ```
/// use scoreflow_core::PlanningId;
///
/// #[derive(Clone)]
/// struct Task {
///     id: i64,
///     name: String,
/// }
///
/// impl PlanningId for Task {
///     type Id = i64;
///     fn planning_id(&self) -> i64 { self.id }
/// }
/// ```
pub trait PlanningId {
    /// The type of the unique identifier.
    type Id: Eq + Hash + Clone + Debug + Send + Sync + 'static;

    /// Returns the unique identifier for this object.
    ///
    /// This must never return a value that changes while the fact is inserted.
    fn planning_id(&self) -> Self::Id;
}

/// A domain object that can be inserted into a scoring session.
///
/// Facts are owned by the caller's working solution; the session keeps a
/// shared read-only copy of the value last inserted or updated under each id.
///
/// Planning entities whose variables may still be unassigned override
/// [`uninitialized_variable_count`](Fact::uninitialized_variable_count); it
/// feeds the init score and the nullity filter of `for_each`.
///
/// # Example
///
/// ```
/// use scoreflow_core::{Fact, PlanningId};
///
/// #[derive(Debug)]
/// struct Lecture {
///     id: u32,
///     room: Option<u32>,
/// }
///
/// impl PlanningId for Lecture {
///     type Id = u32;
///     fn planning_id(&self) -> u32 { self.id }
/// }
///
/// impl Fact for Lecture {
///     fn uninitialized_variable_count(&self) -> u32 {
///         u32::from(self.room.is_none())
///     }
/// }
///
/// assert!(!Lecture { id: 1, room: None }.is_initialized());
/// assert!(Lecture { id: 1, room: Some(2) }.is_initialized());
/// ```
pub trait Fact: PlanningId + Debug + Send + Sync + 'static {
    /// Number of planning variables of this fact that are still unassigned.
    fn uninitialized_variable_count(&self) -> u32 {
        0
    }

    fn is_initialized(&self) -> bool {
        self.uninitialized_variable_count() == 0
    }
}
