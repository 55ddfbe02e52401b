use super::RangeSizeTree;
use crate::raw::RawRangeSizeTree;

impl RangeSizeTree {
    /// Creates an empty tree with room for at least `capacity` nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_size_tree::RangeSizeTree;
    ///
    /// let tree = RangeSizeTree::with_capacity(16);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 16);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        RangeSizeTree {
            raw: RawRangeSizeTree::with_capacity(capacity),
        }
    }

    /// Returns how many nodes the tree can hold before reallocating. Slots
    /// freed by [`remove`](RangeSizeTree::remove) are reused first.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
