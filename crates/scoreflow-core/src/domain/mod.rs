//! Domain model traits for facts fed into a scoring session.

mod traits;


pub use traits::{Fact, PlanningId};
