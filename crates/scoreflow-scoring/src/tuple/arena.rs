//! Generational storage for live tuples.

use super::Tuple;

/// Handle of a tuple stored in a [`TupleArena`].
///
/// Slots are reused after release; the generation makes a stale handle
/// miss instead of aliasing the slot's next tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TupleId {
    slot: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    tuple: Option<Tuple>,
}

#[derive(Default)]
pub(crate) struct TupleArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl TupleArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, tuple: Tuple) -> TupleId {
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.tuple = Some(tuple);
            return TupleId {
                slot,
                generation: entry.generation,
            };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            tuple: Some(tuple),
        });
        TupleId {
            slot,
            generation: 0,
        }
    }

    #[inline]
    pub(crate) fn get(&self, id: TupleId) -> Option<&Tuple> {
        self.slots
            .get(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.tuple.as_ref())
    }

    /// Frees the slot of `id`. Returns false for a stale or unknown handle.
    pub(crate) fn release(&mut self, id: TupleId) -> bool {
        let Some(entry) = self.slots.get_mut(id.slot as usize) else {
            return false;
        };
        if entry.generation != id.generation || entry.tuple.is_none() {
            return false;
        }
        entry.tuple = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.slot);
        self.live -= 1;
        true
    }

    /// Number of live tuples.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}
