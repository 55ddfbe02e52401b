use alloc::vec::Vec;
use core::mem;

use super::handle::{Handle, Link};

/// One slot of the arena. A vacant slot links to the next vacant one, so the
/// free list is threaded through the slab itself.
#[derive(Clone)]
enum Slot<T> {
    Occupied(T),
    Vacant(Link),
}

/// Slab of slots addressed by [`Handle`]. Vacated slots are refilled, most
/// recent first, before the backing vector grows.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    /// Head of the free list.
    vacant: Link,
    occupied: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self::from_slots(Vec::new())
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self::from_slots(Vec::with_capacity(capacity))
    }

    const fn from_slots(slots: Vec<Slot<T>>) -> Self {
        Self {
            slots,
            vacant: None,
            occupied: 0,
        }
    }

    /// Slots the backing vector can hold before it reallocates.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of occupied slots.
    pub(crate) const fn len(&self) -> usize {
        self.occupied
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        let handle = if let Some(handle) = self.vacant {
            let slot = &mut self.slots[handle.to_index()];
            let Slot::Vacant(next) = *slot else {
                panic!("`Arena::alloc()` - free list reaches occupied slot {handle:?}");
            };
            *slot = Slot::Occupied(element);
            self.vacant = next;
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is full ({} slots)",
                Handle::MAX + 1
            );
            self.slots.push(Slot::Occupied(element));
            Handle::from_index(self.slots.len() - 1)
        };
        self.occupied += 1;
        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        let Slot::Occupied(element) = &self.slots[handle.to_index()] else {
            panic!("`Arena::get()` - slot {handle:?} is vacant");
        };
        element
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        let Slot::Occupied(element) = &mut self.slots[handle.to_index()] else {
            panic!("`Arena::get_mut()` - slot {handle:?} is vacant");
        };
        element
    }

    /// Moves the element out and pushes its slot onto the free list.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let slot = mem::replace(&mut self.slots[handle.to_index()], Slot::Vacant(self.vacant));
        let Slot::Occupied(element) = slot else {
            panic!("`Arena::take()` - slot {handle:?} is already vacant");
        };
        self.vacant = Some(handle);
        self.occupied -= 1;
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant = None;
        self.occupied = 0;
    }
}
