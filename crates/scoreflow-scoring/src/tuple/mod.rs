//! Tuples flowing through the node graph.
//!
//! A tuple is an ordered group of 1 to 4 shared elements. Elements are
//! type-erased behind [`TupleValue`] so a single node graph can carry facts
//! of every domain type; typed stream methods downcast them back with
//! [`Tuple::fact`].

mod arena;

#[cfg(test)]
mod tests;

use std::any::{type_name, Any};
use std::fmt::{self, Debug};
use std::sync::Arc;

use smallvec::SmallVec;

pub(crate) use arena::TupleArena;
pub use arena::TupleId;

/// A value that can sit in a tuple slot.
///
/// Implemented for every `Debug + Send + Sync + 'static` type: facts,
/// group keys and collector results alike.
pub trait TupleValue: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    /// Name of the concrete type, for match explanations.
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Debug + Send + Sync> TupleValue for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// A shared tuple element.
pub type Element = Arc<dyn TupleValue>;

pub(crate) type Elements = SmallVec<[Element; 4]>;

/// Ordered group of elements produced by a stream.
#[derive(Clone, Default)]
pub struct Tuple {
    elements: Elements,
}

impl Tuple {
    pub(crate) fn of(element: Element) -> Self {
        let mut elements = Elements::new();
        elements.push(element);
        Self { elements }
    }

    pub(crate) fn from_elements(elements: Elements) -> Self {
        Self { elements }
    }

    /// Number of elements.
    #[inline]
    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Downcasts element `index` to `T`, if it is one.
    pub fn get<T: 'static>(&self, index: usize) -> Option<&T> {
        let value: &dyn TupleValue = &**self.elements.get(index)?;
        value.as_any().downcast_ref::<T>()
    }

    /// Downcasts element `index` to `T`.
    ///
    /// # Panics
    ///
    /// Panics if the element is missing or of another type. Typed streams
    /// only ever call this with the type they were declared with.
    #[inline]
    pub fn fact<T: 'static>(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!(
                "tuple element {} is not a {} (tuple: {:?})",
                index,
                type_name::<T>(),
                self
            ),
        }
    }

    /// Appends the elements of `other` after this tuple's elements.
    pub(crate) fn concat(&self, other: &Tuple) -> Tuple {
        let mut elements = self.elements.clone();
        elements.extend(other.elements.iter().cloned());
        Tuple { elements }
    }

    /// Copy of this tuple with its last element replaced.
    pub(crate) fn with_last(&self, element: Element) -> Tuple {
        let mut elements = self.elements.clone();
        if let Some(last) = elements.last_mut() {
            *last = element;
        }
        Tuple { elements }
    }

    /// True when both tuples hold the very same element instances.
    pub fn same_elements(&self, other: &Tuple) -> bool {
        self.arity() == other.arity()
            && self
                .elements
                .iter()
                .zip(other.elements.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("");
        for element in &self.elements {
            tuple.field(element);
        }
        tuple.finish()
    }
}
