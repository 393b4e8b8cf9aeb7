//! Fluent constraint stream API.
//!
//! A constraint is declared as a chain of stream operations ending in a
//! terminal (`penalize`, `reward` or `impact`) and a name:
//!
//! ```text
//! ConstraintFactory
//!     .for_each::<A>()                  -> UniConstraintStream<A, Sc>
//!     .join(other, joiner)              -> BiConstraintStream<A, B, Sc>
//!     .group_by_key_collect(key, count()) -> BiConstraintStream<K, usize, Sc>
//!     .penalize_with(weight, |k, n| ..) -> ConstraintBuilder<Sc>
//!     .as_constraint("name")            -> Constraint<Sc>
//! ```
//!
//! Streams only describe the computation. Typed closures are wrapped into
//! untyped node specs over [`Tuple`](crate::tuple::Tuple)s, so the session
//! can compile every constraint into one shared node graph and choose a
//! propagation backend without the stream types knowing about it.
//!
//! Stream values are cheap to clone. A stream reused by several constraints
//! is evaluated once.
//!
//! # Example
//!
//! ```
//! use scoreflow_scoring::stream::collector::count;
//! use scoreflow_scoring::ConstraintFactory;
//! use scoreflow_core::{Fact, HardSoftScore, PlanningId};
//!
//! #[derive(Debug)]
//! struct Lecture { id: u32, teacher: u32 }
//!
//! impl PlanningId for Lecture {
//!     type Id = u32;
//!     fn planning_id(&self) -> u32 { self.id }
//! }
//! impl Fact for Lecture {}
//!
//! let factory = ConstraintFactory::<HardSoftScore>::new();
//! let overload = factory
//!     .for_each::<Lecture>()
//!     .group_by_key_collect(|l: &Lecture| l.teacher, count())
//!     .filter(|_: &u32, lectures: &usize| *lectures > 4)
//!     .penalize_with(HardSoftScore::ONE_SOFT, |_: &u32, lectures: &usize| *lectures as i64 - 4)
//!     .as_constraint("Teacher overload");
//! assert_eq!(overload.name(), "Teacher overload");
//! ```

#[macro_use]
mod arity_stream_macros;
mod bi_stream;
pub(crate) mod builder;
pub mod collector;
mod factory;
pub mod joiner;
pub(crate) mod plan;
mod quad_stream;
mod tri_stream;
mod uni_stream;

#[cfg(test)]
mod tests;

pub use bi_stream::BiConstraintStream;
pub use builder::{Constraint, ConstraintBuilder, ConstraintState, ConstraintWeight};
pub use factory::ConstraintFactory;
pub use quad_stream::QuadConstraintStream;
pub use tri_stream::TriConstraintStream;
pub use uni_stream::UniConstraintStream;
