use super::handle::Link;
use super::size::Size;

/// The side of its parent a node hangs from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// One stored key occurrence.
///
/// Children are owned through the arena; `parent` is a back-link used only to
/// walk upwards when sizes change.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    key: i64,
    left: Link,
    right: Link,
    parent: Link,
    // Nodes in the subtree rooted here, this one included.
    size: Size,
}

impl Node {
    /// Creates a detached leaf.
    pub(crate) const fn new(key: i64) -> Self {
        Self {
            key,
            left: None,
            right: None,
            parent: None,
            size: Size::ONE,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> i64 {
        self.key
    }

    #[inline]
    pub(crate) const fn size(&self) -> Size {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub(crate) fn size_mut(&mut self) -> &mut Size {
        &mut self.size
    }

    #[inline]
    pub(crate) const fn left(&self) -> Link {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Link {
        self.right
    }

    #[inline]
    pub(crate) const fn parent(&self) -> Link {
        self.parent
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub(crate) fn set_left(&mut self, left: Link) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Link) {
        self.right = right;
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Link) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Link) {
        self.parent = parent;
    }

    /// Returns true if the node has neither child.
    pub(crate) const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Which way a search for `key` leaves this node. Equal keys go left.
    #[inline]
    pub(crate) const fn descend(&self, key: i64) -> Side {
        if key <= self.key { Side::Left } else { Side::Right }
    }
}
