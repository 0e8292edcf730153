//! Node arena with stable indices.
//!
//! Skip-list nodes form a cyclic graph: forward links at every height plus a
//! backward link at the base level. Instead of pointers, nodes live in an
//! [`Arena`] and refer to each other by [`Index`] handle. The slots come
//! from a [`slab::Slab`]; the arena narrows its `usize` keys to `Idx` and
//! keeps them clear of the `NONE` sentinel.

use slab::Slab;

use crate::Index;

/// Growable slot storage handing out stable [`Index`] handles.
///
/// # Requirements met
///
/// - **Stable indices**: a handle remains valid until explicitly removed
/// - **O(1)** insert, remove, get
/// - **Slot reuse**: removed slots are handed out again, most recent first
///
/// # Example
///
/// ```
/// use nexus_sortedset::Arena;
///
/// let mut arena: Arena<&str> = Arena::with_capacity(4);
/// let a = arena.insert("a");
/// let b = arena.insert("b");
///
/// assert_eq!(arena.remove(a), Some("a"));
/// assert_eq!(arena.get(a), None);
/// assert_eq!(arena[b], "b");
///
/// // Freed slot is reused
/// assert_eq!(arena.insert("c"), a);
/// ```
#[derive(Debug, Clone)]
pub struct Arena<T, Idx: Index = u32> {
    slots: Slab<T>,
    _idx: core::marker::PhantomData<Idx>,
}

impl<T, Idx: Index> Arena<T, Idx> {
    /// Creates an empty arena.
    #[inline]
    pub fn new() -> Self {
        Self {
            slots: Slab::new(),
            _idx: core::marker::PhantomData,
        }
    }

    /// Creates an empty arena with room for `capacity` elements before reallocating.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds the number of handles `Idx` can address.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity <= Idx::CAPACITY,
            "capacity {capacity} exceeds the {} slots the handle type addresses",
            Idx::CAPACITY
        );
        Self {
            slots: Slab::with_capacity(capacity),
            _idx: core::marker::PhantomData,
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slots are occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the number of slots that can be occupied without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Reserves room for at least `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Stores `value` and returns its handle.
    ///
    /// # Panics
    ///
    /// Panics if every handle `Idx` can address is in use.
    pub fn insert(&mut self, value: T) -> Idx {
        let Some(idx) = Idx::from_slot(self.slots.vacant_key()) else {
            panic!("arena index space exhausted");
        };
        let slot = self.slots.insert(value);
        debug_assert_eq!(slot, idx.slot());
        idx
    }

    /// Removes and returns the value at `idx`, if occupied.
    #[inline]
    pub fn remove(&mut self, idx: Idx) -> Option<T> {
        self.slots.try_remove(idx.slot())
    }

    /// Returns a reference to the value at `idx`, if occupied.
    #[inline]
    pub fn get(&self, idx: Idx) -> Option<&T> {
        self.slots.get(idx.slot())
    }

    /// Returns a mutable reference to the value at `idx`, if occupied.
    #[inline]
    pub fn get_mut(&mut self, idx: Idx) -> Option<&mut T> {
        self.slots.get_mut(idx.slot())
    }

    /// Returns `true` if `idx` refers to an occupied slot.
    #[inline]
    pub fn contains(&self, idx: Idx) -> bool {
        self.slots.contains(idx.slot())
    }

    /// Drops every element and forgets all handles.
    ///
    /// Handles issued before the call are invalid afterwards, even though
    /// the same integers will be handed out again.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<T, Idx: Index> Default for Arena<T, Idx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Idx: Index> core::ops::Index<Idx> for Arena<T, Idx> {
    type Output = T;

    #[inline]
    fn index(&self, idx: Idx) -> &T {
        self.get(idx).expect("invalid index")
    }
}

impl<T, Idx: Index> core::ops::IndexMut<Idx> for Arena<T, Idx> {
    #[inline]
    fn index_mut(&mut self, idx: Idx) -> &mut T {
        self.get_mut(idx).expect("invalid index")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let arena: Arena<u64> = Arena::new();
        assert!(arena.is_empty());
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.get(0), None);
    }

    #[test]
    fn insert_get_remove() {
        let mut arena: Arena<u64> = Arena::with_capacity(8);
        let a = arena.insert(10);
        let b = arena.insert(20);

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&10));
        assert_eq!(arena[b], 20);

        arena[b] = 21;
        assert_eq!(arena.remove(b), Some(21));
        assert_eq!(arena.remove(b), None);
        assert!(!arena.contains(b));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn removed_slots_are_reused() {
        let mut arena: Arena<u64> = Arena::new();
        let handles: Vec<u32> = (0..4).map(|i| arena.insert(i)).collect();

        arena.remove(handles[1]);
        arena.remove(handles[3]);

        // Most recently freed first
        assert_eq!(arena.insert(100), handles[3]);
        assert_eq!(arena.insert(101), handles[1]);
        assert_eq!(arena.insert(102), 4);
        assert_eq!(arena.len(), 5);
    }

    #[test]
    fn none_handle_is_never_valid() {
        let mut arena: Arena<u64, u16> = Arena::new();
        arena.insert(1);
        assert_eq!(arena.get(u16::NONE), None);
        assert_eq!(arena.remove(u16::NONE), None);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut arena: Arena<String> = Arena::new();
        let a = arena.insert("a".into());
        arena.insert("b".into());
        arena.remove(a);

        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.insert("c".into()), 0);
    }

    #[test]
    fn small_index_type_fills_up() {
        let mut arena: Arena<u8, u8> = Arena::new();
        // u8::MAX is the sentinel, so 255 slots are addressable
        for i in 0..255u16 {
            assert_eq!(arena.insert(i as u8), i as u8);
        }
        assert_eq!(arena.len(), 255);
    }

    #[test]
    fn full_arena_reuses_freed_slot() {
        let mut arena: Arena<u8, u8> = Arena::new();
        for i in 0..255u16 {
            arena.insert(i as u8);
        }
        assert_eq!(arena.remove(17), Some(17));
        assert_eq!(arena.insert(99), 17);
        assert_eq!(arena[17], 99);
        assert_eq!(arena.len(), 255);
    }

    #[test]
    #[should_panic(expected = "arena index space exhausted")]
    fn exhausted_index_space_panics() {
        let mut arena: Arena<u8, u8> = Arena::new();
        for i in 0..=255u16 {
            arena.insert(i as u8);
        }
    }

    #[test]
    #[should_panic(expected = "invalid index")]
    fn indexing_vacant_slot_panics() {
        let mut arena: Arena<u64> = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let _ = arena[a];
    }
}
