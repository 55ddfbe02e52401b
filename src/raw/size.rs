use core::num::NonZero;

use super::handle::Handle;

/// Number of nodes in a subtree, the root of that subtree included.
///
/// A node always counts itself, so a subtree size is never zero and the
/// counter is backed by a `NonZero`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
pub(crate) struct Size(NonZero<usize>);

impl Size {
    /// A subtree cannot hold more nodes than the arena can address.
    pub(crate) const MAX: usize = Handle::MAX + 1;
    pub(crate) const ONE: Self = Self::from_usize(1);

    #[inline]
    pub(crate) const fn from_usize(size: usize) -> Self {
        assert!(size <= Self::MAX, "`Size::from_usize()` - `size` > `Size::MAX`!");
        match NonZero::new(size) {
            Some(size) => Self(size),
            None => panic!("`Size::from_usize()` - a subtree holds at least one node!"),
        }
    }

    #[inline]
    pub(crate) const fn to_usize(self) -> usize {
        self.0.get()
    }

    /// Size of an optional subtree; an absent child contributes nothing.
    #[inline]
    pub(crate) const fn of(size: Option<Self>) -> usize {
        match size {
            Some(size) => size.to_usize(),
            None => 0,
        }
    }

    #[inline]
    pub(crate) fn increment(&mut self) {
        self.grow(1);
    }

    /// Decrements by one, but never below one.
    #[inline]
    pub(crate) fn decrement(&mut self) {
        self.shrink(1);
    }

    #[inline]
    pub(crate) fn grow(&mut self, by: usize) {
        *self = Self::from_usize(self.to_usize() + by);
    }

    /// Shrinks by `by`, saturating at one.
    #[inline]
    pub(crate) fn shrink(&mut self, by: usize) {
        *self = Self::from_usize(self.to_usize().saturating_sub(by).max(1));
    }
}
