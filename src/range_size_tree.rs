use alloc::vec::Vec;
use core::fmt;

use crate::NotFound;
use crate::raw::{Handle, RawRangeSizeTree};

mod capacity;
mod node_ref;

pub use node_ref::{NodeRef, RemovedNode};

/// A binary search tree over `i64` keys that keeps duplicates and counts keys
/// in ranges.
///
/// Every node records the size of the subtree below it. The tree is not
/// rebalanced: inserting sorted keys builds a chain, and operations then take
/// time proportional to its length. Traversals never recurse, so a degenerate
/// tree is slow but safe.
///
/// Equal keys always descend to the left, so all occurrences of a key lie on
/// one search path, and the later an occurrence was inserted the further left
/// it sits in in-order position.
///
/// # Examples
///
/// ```
/// use range_size_tree::RangeSizeTree;
///
/// let mut tree = RangeSizeTree::new();
/// for key in [3, 1, 5, 1, 2, 4, 6] {
///     tree.put(key);
/// }
///
/// //        3
/// //      /   \
/// //     1     5
/// //    / \   / \
/// //   1   2 4   6
/// let ones = tree.get(1);
/// assert_eq!(ones.len(), 2);
/// assert_eq!(ones[0].parent().map(|n| n.key()), Some(1));
/// assert_eq!(ones[1].parent().map(|n| n.key()), Some(3));
///
/// assert_eq!(tree.range_size(3, 7), 4);
/// assert_eq!(tree.range_size(6, 1), 7);
///
/// // The deepest duplicate goes first.
/// let removed = tree.remove(1).unwrap();
/// assert!(removed.was_leaf());
/// assert_eq!(removed.parent_key(), Some(1));
/// assert_eq!(tree.get(1).len(), 1);
/// ```
#[derive(Clone)]
pub struct RangeSizeTree {
    raw: RawRangeSizeTree,
}

impl RangeSizeTree {
    /// Largest number of nodes a tree can hold. Inserting past it panics.
    pub const MAX_LEN: usize = Handle::MAX + 1;

    /// Makes a new, empty `RangeSizeTree`. Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_size_tree::RangeSizeTree;
    ///
    /// let tree = RangeSizeTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        RangeSizeTree {
            raw: RawRangeSizeTree::new(),
        }
    }

    /// Inserts `key`. Duplicates are kept; an equal key is placed in the left
    /// subtree of the node it meets.
    ///
    /// # Panics
    ///
    /// Panics if the tree already holds [`MAX_LEN`](Self::MAX_LEN) nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_size_tree::RangeSizeTree;
    ///
    /// let mut tree = RangeSizeTree::new();
    /// tree.put(2);
    /// tree.put(2);
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(tree.root().unwrap().left().unwrap().key(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(h) where h is the height of the tree.
    pub fn put(&mut self, key: i64) {
        let handle = self.raw.put(key);
        log::trace!("put {key} at {handle:?}, {} nodes", self.raw.len());
    }

    /// Returns every node holding `key`, ordered left to right as an in-order
    /// walk would meet them. An empty tree or a missing key gives an empty
    /// vector.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_size_tree::RangeSizeTree;
    ///
    /// let tree = RangeSizeTree::from([3, 1, 1]);
    /// let ones = tree.get(1);
    ///
    /// // The second 1 hangs left of the first one, so it comes first.
    /// assert_eq!(ones[1].left(), Some(ones[0]));
    /// assert!(tree.get(9).is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(h)
    #[must_use]
    pub fn get(&self, key: i64) -> Vec<NodeRef<'_>> {
        self.raw.get(key).into_iter().map(|handle| NodeRef::new(&self.raw, handle)).collect()
    }

    /// Removes the first deepest occurrence of `key`: the leftmost node with
    /// that key, which is the first element of [`get`](Self::get).
    ///
    /// A leaf simply leaves. A node with one child is replaced by that child.
    /// A node with two children is replaced by the smallest node of its right
    /// subtree, which takes over both of the removed node's subtrees.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if no node holds `key`; the tree is not modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_size_tree::RangeSizeTree;
    ///
    /// let mut tree = RangeSizeTree::from([5, 1, 2]);
    /// let removed = tree.remove(5).unwrap();
    ///
    /// assert_eq!(removed.key(), 5);
    /// assert_eq!(tree.root().unwrap().key(), 1);
    /// assert_eq!(tree.len(), 2);
    /// assert!(tree.remove(5).is_err());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(h)
    pub fn remove(&mut self, key: i64) -> Result<RemovedNode, NotFound> {
        let Some(detached) = self.raw.remove(key) else {
            log::debug!("remove {key}: not found");
            return Err(NotFound { key });
        };
        let removed = RemovedNode::from(detached);
        log::trace!("removed {key} (subtree of {}), {} nodes left", removed.subtree_size(), self.raw.len());
        Ok(removed)
    }

    /// Counts the nodes whose key lies between `a` and `b`, both inclusive.
    /// The bounds may come in either order.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_size_tree::RangeSizeTree;
    ///
    /// let tree = RangeSizeTree::from([5, 3, 7, 2, 4, 6, 8, 1, 3, 5, 8, 10]);
    /// assert_eq!(tree.range_size(3, 7), 7);
    /// assert_eq!(tree.range_size(7, 3), 7);
    /// assert_eq!(tree.range_size(8, 8), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(h) when `a == b`, O(n) otherwise.
    #[must_use]
    pub fn range_size(&self, a: i64, b: i64) -> usize {
        let count = self.raw.range_size(a, b);
        log::trace!("range_size({a}, {b}) = {count}");
        count
    }

    /// Returns `true` if the tree holds no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of nodes, duplicates included.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_size_tree::RangeSizeTree;
    ///
    /// let tree = RangeSizeTree::from([4, 4, 4]);
    /// assert_eq!(tree.len(), 3);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// The root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.raw.root().map(|handle| NodeRef::new(&self.raw, handle))
    }

    /// The node with the smallest key. With duplicates it is the first node
    /// [`get`](Self::get) returns for that key.
    ///
    /// # Examples
    ///
    /// ```
    /// use range_size_tree::RangeSizeTree;
    ///
    /// let tree = RangeSizeTree::from([3, 1, 5, 1]);
    /// let min = tree.min().unwrap();
    /// assert_eq!(min.key(), 1);
    /// assert_eq!(min, tree.get(1)[0]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(h)
    #[must_use]
    pub fn min(&self) -> Option<NodeRef<'_>> {
        self.raw.min().map(|handle| NodeRef::new(&self.raw, handle))
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.raw.clear();
    }
}

impl Default for RangeSizeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats the keys in in-order sequence.
impl fmt::Debug for RangeSizeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.raw.keys_in_order()).finish()
    }
}

impl Extend<i64> for RangeSizeTree {
    fn extend<I: IntoIterator<Item = i64>>(&mut self, iter: I) {
        for key in iter {
            self.put(key);
        }
    }
}

impl<'a> Extend<&'a i64> for RangeSizeTree {
    fn extend<I: IntoIterator<Item = &'a i64>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

/// Inserts the keys in iteration order, so the first key becomes the root.
impl FromIterator<i64> for RangeSizeTree {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut tree = RangeSizeTree::new();
        tree.extend(iter);
        tree
    }
}

/// Inserts the keys in array order.
///
/// ```
/// use range_size_tree::RangeSizeTree;
///
/// let tree = RangeSizeTree::from([2, 1, 3]);
/// assert_eq!(tree.root().unwrap().key(), 2);
/// ```
impl<const N: usize> From<[i64; N]> for RangeSizeTree {
    fn from(keys: [i64; N]) -> Self {
        keys.into_iter().collect()
    }
}
