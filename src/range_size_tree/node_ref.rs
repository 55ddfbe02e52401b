use core::fmt;
use core::ptr;

use crate::raw::{Detached, Handle, Node, RawRangeSizeTree};

/// A read-only view of one node inside a [`RangeSizeTree`](crate::RangeSizeTree).
///
/// `NodeRef`s are produced by [`get`](crate::RangeSizeTree::get),
/// [`root`](crate::RangeSizeTree::root) and [`min`](crate::RangeSizeTree::min),
/// and can walk to neighbouring nodes. Two `NodeRef`s are equal when they
/// denote the same node of the same tree, so duplicates of a key stay
/// distinguishable.
///
/// # Examples
///
/// ```
/// use range_size_tree::RangeSizeTree;
///
/// let tree = RangeSizeTree::from([3, 1, 5]);
/// let root = tree.root().unwrap();
///
/// assert_eq!(root.key(), 3);
/// assert_eq!(root.subtree_size(), 3);
/// assert_eq!(root.left().map(|n| n.key()), Some(1));
/// assert_eq!(root.right().unwrap().parent(), Some(root));
/// ```
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a RawRangeSizeTree,
    handle: Handle,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(tree: &'a RawRangeSizeTree, handle: Handle) -> Self {
        Self { tree, handle }
    }

    fn node(&self) -> &'a Node {
        self.tree.node(self.handle)
    }

    fn link(&self, handle: Option<Handle>) -> Option<NodeRef<'a>> {
        handle.map(|handle| NodeRef::new(self.tree, handle))
    }

    /// The key stored in this node.
    #[must_use]
    pub fn key(&self) -> i64 {
        self.node().key()
    }

    /// Number of nodes in the subtree rooted here, this node included.
    #[must_use]
    pub fn subtree_size(&self) -> usize {
        self.node().size().to_usize()
    }

    /// The left child, holding keys no greater than this one.
    #[must_use]
    pub fn left(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().left())
    }

    /// The right child, holding strictly greater keys.
    #[must_use]
    pub fn right(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().right())
    }

    /// The structural parent, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.link(self.node().parent())
    }

    /// Returns `true` if this node has no parent.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node().parent().is_none()
    }

    /// Returns `true` if this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.handle == other.handle
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", &self.key())
            .field("subtree_size", &self.subtree_size())
            .finish()
    }
}

/// A node detached by [`RangeSizeTree::remove`](crate::RangeSizeTree::remove).
///
/// It reports the node as it stood at the moment of removal: its key, the
/// size of its subtree, and the keys of the parent and children it was linked
/// to. Those neighbours are still in the tree, possibly relinked.
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
/// assert_eq!(removed.subtree_size(), 3);
/// assert!(removed.was_root());
/// assert_eq!(removed.left_key(), Some(1));
/// assert_eq!(removed.right_key(), None);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RemovedNode {
    key: i64,
    subtree_size: usize,
    parent_key: Option<i64>,
    left_key: Option<i64>,
    right_key: Option<i64>,
}

impl RemovedNode {
    /// The key the removed node held.
    #[must_use]
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Size of the subtree that was rooted at this node, itself included.
    #[must_use]
    pub fn subtree_size(&self) -> usize {
        self.subtree_size
    }

    /// Key of the former parent, `None` if the node was the root.
    #[must_use]
    pub fn parent_key(&self) -> Option<i64> {
        self.parent_key
    }

    /// Key of the former left child.
    #[must_use]
    pub fn left_key(&self) -> Option<i64> {
        self.left_key
    }

    /// Key of the former right child.
    #[must_use]
    pub fn right_key(&self) -> Option<i64> {
        self.right_key
    }

    /// Returns `true` if the node was the root when it was removed.
    #[must_use]
    pub fn was_root(&self) -> bool {
        self.parent_key.is_none()
    }

    /// Returns `true` if the node had no children when it was removed.
    #[must_use]
    pub fn was_leaf(&self) -> bool {
        self.left_key.is_none() && self.right_key.is_none()
    }
}

impl From<Detached> for RemovedNode {
    fn from(detached: Detached) -> Self {
        Self {
            key: detached.node.key(),
            subtree_size: detached.node.size().to_usize(),
            parent_key: detached.parent_key,
            left_key: detached.left_key,
            right_key: detached.right_key,
        }
    }
}
