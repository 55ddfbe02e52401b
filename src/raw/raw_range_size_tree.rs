use alloc::vec::Vec;
use core::iter;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::{Handle, Link};
use super::node::{Node, Side};
use super::size::Size;

/// Explicit traversal stack. The tree is unbalanced, so walks never recurse.
type Stack = SmallVec<[Handle; 32]>;

/// The unbalanced, size-augmented BST backing `RangeSizeTree`.
#[derive(Clone)]
pub(crate) struct RawRangeSizeTree {
    /// Arena owning every node; links between nodes are handles into it.
    nodes: Arena<Node>,
    /// Handle to the root node, if the tree is non-empty.
    root: Link,
}

/// How a node's slot is refilled once the node leaves the tree.
enum Replacement {
    /// The node was a leaf; its slot becomes empty.
    Vacate,
    /// The node had one child, which moves up with its whole subtree.
    Promote(Handle),
    /// The node had two children. `successor` is the topmost minimum-key node
    /// on the left spine of the right subtree and `chain_bottom` is the
    /// leftmost node below it (the successor itself when it has no left child).
    Successor {
        successor: Handle,
        chain_bottom: Handle,
        left: Handle,
        right: Handle,
    },
}

/// A node taken out of the tree. `node` keeps the links it had when it was
/// removed, and the keys those links pointed at are read before its slot is
/// freed.
pub(crate) struct Detached {
    pub(crate) node: Node,
    pub(crate) parent_key: Option<i64>,
    pub(crate) left_key: Option<i64>,
    pub(crate) right_key: Option<i64>,
}

/// Everything `remove` needs, read before the first link is rewritten.
struct Splice {
    target: Handle,
    parent: Link,
    size: Size,
    replacement: Replacement,
}

impl RawRangeSizeTree {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a new tree with room for `capacity` nodes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns the number of nodes, read from the root's subtree size.
    pub(crate) fn len(&self) -> usize {
        let len = Size::of(self.root.map(|root| self.nodes.get(root).size()));
        debug_assert_eq!(len, self.nodes.len(), "root size disagrees with the arena");
        len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) const fn root(&self) -> Link {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node {
        self.nodes.get(handle)
    }

    /// Inserts `key`, descending left on ties. Returns the new node's handle.
    pub(crate) fn put(&mut self, key: i64) -> Handle {
        // Allocate first: a full arena panics before any size has moved.
        let handle = self.nodes.alloc(Node::new(key));

        let Some(mut current) = self.root else {
            self.root = Some(handle);
            return handle;
        };

        loop {
            let node = self.nodes.get_mut(current);
            node.size_mut().increment();
            let side = node.descend(key);
            if let Some(child) = node.child(side) {
                current = child;
            } else {
                node.set_child(side, Some(handle));
                self.nodes.get_mut(handle).set_parent(Some(current));
                return handle;
            }
        }
    }

    /// Nodes a search for `key` visits, root first.
    ///
    /// A match keeps descending left, so every occurrence of `key` lies on
    /// this path, shallowest first.
    fn search_path(&self, key: i64) -> impl Iterator<Item = Handle> + '_ {
        iter::successors(self.root, move |&handle| {
            let node = self.nodes.get(handle);
            node.child(node.descend(key))
        })
    }

    fn occurrences(&self, key: i64) -> impl Iterator<Item = Handle> + '_ {
        self.search_path(key).filter(move |&handle| self.nodes.get(handle).key() == key)
    }

    /// All nodes holding `key`, left to right in in-order position.
    pub(crate) fn get(&self, key: i64) -> Vec<Handle> {
        let mut found: Vec<Handle> = self.occurrences(key).collect();
        // Deeper matches sit further left.
        found.reverse();
        found
    }

    /// The first deepest occurrence of `key`: the last match on the search path.
    pub(crate) fn deepest_occurrence(&self, key: i64) -> Link {
        self.occurrences(key).last()
    }

    /// Number of nodes holding exactly `key`.
    pub(crate) fn count(&self, key: i64) -> usize {
        self.occurrences(key).count()
    }

    /// Counts nodes with keys in the inclusive range spanned by `a` and `b`.
    pub(crate) fn range_size(&self, a: i64, b: i64) -> usize {
        if a == b {
            return self.count(a);
        }

        let (low, high) = (a.min(b), a.max(b));
        let mut stack: Stack = self.root.into_iter().collect();
        let mut count = 0;
        while let Some(handle) = stack.pop() {
            let node = self.nodes.get(handle);
            if (low..=high).contains(&node.key()) {
                count += 1;
            }
            stack.extend(node.left());
            stack.extend(node.right());
        }
        count
    }

    /// Follows left links from `from` to the end.
    pub(crate) fn leftmost(&self, mut from: Handle) -> Handle {
        while let Some(left) = self.nodes.get(from).left() {
            from = left;
        }
        from
    }

    /// Smallest node of the whole tree.
    pub(crate) fn min(&self) -> Link {
        self.root.map(|root| self.leftmost(root))
    }

    /// Keys in in-order sequence.
    pub(crate) fn keys_in_order(&self) -> Vec<i64> {
        let mut keys = Vec::with_capacity(self.len());
        let mut stack = Stack::new();
        let mut current = self.root;
        loop {
            while let Some(handle) = current {
                stack.push(handle);
                current = self.nodes.get(handle).left();
            }
            let Some(handle) = stack.pop() else {
                return keys;
            };
            let node = self.nodes.get(handle);
            keys.push(node.key());
            current = node.right();
        }
    }

    /// Removes the first deepest occurrence of `key` and hands the detached
    /// node back. The node's own links still describe where it was.
    pub(crate) fn remove(&mut self, key: i64) -> Option<Detached> {
        let target = self.deepest_occurrence(key)?;
        let splice = self.plan_removal(target);
        self.apply(splice);

        // `apply` leaves the target's own links alone, and every node they
        // name is still live.
        let node = self.nodes.get(target);
        let key_of = |link: Link| link.map(|handle| self.nodes.get(handle).key());
        let (parent_key, left_key, right_key) = (key_of(node.parent()), key_of(node.left()), key_of(node.right()));

        Some(Detached {
            node: self.nodes.take(target),
            parent_key,
            left_key,
            right_key,
        })
    }

    fn plan_removal(&self, target: Handle) -> Splice {
        let node = self.nodes.get(target);
        let replacement = match (node.left(), node.right()) {
            (None, None) => Replacement::Vacate,
            (Some(child), None) | (None, Some(child)) => Replacement::Promote(child),
            (Some(left), Some(right)) => {
                let chain_bottom = self.leftmost(right);
                let min = self.nodes.get(chain_bottom).key();
                // Every node holding the minimum sits on the left spine, in one run
                // that ends at `chain_bottom`; take the top of that run.
                let mut successor = right;
                while self.nodes.get(successor).key() != min {
                    successor = self.nodes.get(successor).left().expect("left spine ends at its minimum");
                }
                Replacement::Successor {
                    successor,
                    chain_bottom,
                    left,
                    right,
                }
            }
        };

        Splice {
            target,
            parent: node.parent(),
            size: node.size(),
            replacement,
        }
    }

    fn apply(&mut self, splice: Splice) {
        let Splice {
            target,
            parent,
            size,
            replacement,
        } = splice;

        self.resize_upwards(parent, None, Size::decrement);

        let replacement = match replacement {
            Replacement::Vacate => None,
            Replacement::Promote(child) => Some(child),
            Replacement::Successor {
                successor,
                chain_bottom,
                left,
                right,
            } => {
                self.adopt_subtrees(target, successor, chain_bottom, left, right);
                let mut adopted = size;
                adopted.decrement();
                self.nodes.get_mut(successor).set_size(adopted);
                Some(successor)
            }
        };

        self.replace_child(parent, target, replacement);
    }

    /// Moves `successor` out of the right subtree and gives it the removed
    /// node's subtrees.
    fn adopt_subtrees(&mut self, target: Handle, successor: Handle, chain_bottom: Handle, left: Handle, right: Handle) {
        if successor != right {
            log::debug!("relocating successor {successor:?} out of the right subtree of {target:?}");
            let node = self.nodes.get(successor);
            let spine_parent = node.parent().expect("successor below the right child has a parent");
            let successor_right = node.right();
            let detached = node.size().to_usize() - Size::of(successor_right.map(|h| self.nodes.get(h).size()));

            // The spine above loses the successor and its left run; its right
            // subtree takes the vacated slot.
            self.resize_upwards(Some(spine_parent), Some(target), |size| size.shrink(detached));
            self.nodes.get_mut(spine_parent).set_left(successor_right);
            if let Some(successor_right) = successor_right {
                self.nodes.get_mut(successor_right).set_parent(Some(spine_parent));
            }

            self.nodes.get_mut(successor).set_right(Some(right));
            self.nodes.get_mut(right).set_parent(Some(successor));
        }

        // Everything on the left is smaller than the minimum of the right, so
        // it hangs below the run of equal minimum keys.
        if chain_bottom != successor {
            let grown = self.nodes.get(left).size().to_usize();
            self.resize_upwards(Some(chain_bottom), Some(successor), |size| size.grow(grown));
        }
        self.nodes.get_mut(chain_bottom).set_left(Some(left));
        self.nodes.get_mut(left).set_parent(Some(chain_bottom));
    }

    /// Applies `resize` to `from` and each ancestor above it, stopping before
    /// `stop` (or after the root when `stop` is `None`).
    fn resize_upwards(&mut self, mut from: Link, stop: Link, resize: impl Fn(&mut Size)) {
        while let Some(handle) = from {
            if Some(handle) == stop {
                return;
            }
            let node = self.nodes.get_mut(handle);
            resize(node.size_mut());
            from = node.parent();
        }
    }

    /// Points `parent`'s link to `old` (or the root) at `new` instead.
    fn replace_child(&mut self, parent: Link, old: Handle, new: Link) {
        match parent {
            Some(parent) => {
                let node = self.nodes.get_mut(parent);
                let side = if node.left() == Some(old) { Side::Left } else { Side::Right };
                node.set_child(side, new);
            }
            None => self.root = new,
        }
        if let Some(new) = new {
            self.nodes.get_mut(new).set_parent(parent);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use proptest::prelude::*;

    impl RawRangeSizeTree {
        /// Checks sizes, key ordering and parent links of every node. Panics
        /// with every violation found.
        pub(crate) fn validate_invariants(&self) {
            let Some(root) = self.root else {
                assert_eq!(self.nodes.len(), 0, "empty tree should hold no nodes");
                return;
            };

            let mut errors: Vec<String> = Vec::new();
            if let Some(parent) = self.nodes.get(root).parent() {
                errors.push(alloc::format!("root {root:?} has parent {parent:?}"));
            }

            let visited = self.validate_node(root, i64::MIN, i64::MAX, &mut errors);
            if visited != self.nodes.len() {
                errors.push(alloc::format!("reached {visited} nodes, arena holds {}", self.nodes.len()));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        // Returns the actual subtree size. Keys must fall in `low..=high`.
        fn validate_node(&self, handle: Handle, low: i64, high: i64, errors: &mut Vec<String>) -> usize {
            let node = self.nodes.get(handle);
            let key = node.key();
            if !(low..=high).contains(&key) {
                errors.push(alloc::format!("key {key} at {handle:?} outside {low}..={high}"));
            }

            let mut actual = 1;
            for (child, side) in [(node.left(), Side::Left), (node.right(), Side::Right)] {
                let Some(child) = child else { continue };
                if self.nodes.get(child).parent() != Some(handle) {
                    errors.push(alloc::format!("{child:?} does not point back to parent {handle:?}"));
                }
                actual += match side {
                    Side::Left => self.validate_node(child, low, key, errors),
                    Side::Right => self.validate_node(child, key.saturating_add(1), high, errors),
                };
            }

            if node.size().to_usize() != actual {
                errors.push(alloc::format!(
                    "size mismatch at {handle:?} (key {key}): stored={}, actual={actual}",
                    node.size().to_usize()
                ));
            }
            actual
        }

        fn keys_of(&self, handles: &[Handle]) -> Vec<i64> {
            handles.iter().map(|&h| self.nodes.get(h).key()).collect()
        }

        fn key_of(&self, link: Link) -> Option<i64> {
            link.map(|h| self.nodes.get(h).key())
        }
    }

    fn tree_of(keys: &[i64]) -> RawRangeSizeTree {
        let mut tree = RawRangeSizeTree::new();
        for &key in keys {
            tree.put(key);
        }
        tree.validate_invariants();
        tree
    }

    #[derive(Clone, Debug)]
    enum Op {
        Put(i64),
        Remove(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i64..64).prop_map(Op::Put),
            2 => (0i64..64).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_operations(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = RawRangeSizeTree::new();
            let mut model: BTreeMap<i64, usize> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Put(key) => {
                        tree.put(key);
                        *model.entry(key).or_default() += 1;
                    }
                    Op::Remove(key) => {
                        let removed = tree.remove(key);
                        match model.get_mut(&key) {
                            Some(count) => {
                                prop_assert_eq!(removed.map(|detached| detached.node.key()), Some(key));
                                *count -= 1;
                                if *count == 0 {
                                    model.remove(&key);
                                }
                            }
                            None => prop_assert!(removed.is_none()),
                        }
                    }
                }
                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.values().sum::<usize>());
            }

            let expected: Vec<i64> = model.iter().flat_map(|(&key, &count)| iter::repeat_n(key, count)).collect();
            prop_assert_eq!(tree.keys_in_order(), expected);
        }

        #[test]
        fn range_size_matches_model(keys in prop::collection::vec(-50i64..50, 0..200), a in -60i64..60, b in -60i64..60) {
            let tree = tree_of(&keys);
            let (low, high) = (a.min(b), a.max(b));
            let expected = keys.iter().filter(|&&key| low <= key && key <= high).count();
            prop_assert_eq!(tree.range_size(a, b), expected);
            prop_assert_eq!(tree.range_size(b, a), expected);
            prop_assert_eq!(tree.range_size(a, a), tree.get(a).len());
        }

        #[test]
        fn removing_everything_empties_the_tree(keys in prop::collection::vec(0i64..32, 0..200), seed in any::<u64>()) {
            let mut tree = tree_of(&keys);
            let mut order = keys.clone();
            // Deterministic shuffle driven by the seed.
            let mut state = seed | 1;
            for i in (1..order.len()).rev() {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                order.swap(i, (state % (i as u64 + 1)) as usize);
            }

            for key in order {
                prop_assert!(tree.remove(key).is_some());
                tree.validate_invariants();
            }
            prop_assert!(tree.is_empty());
            prop_assert_eq!(tree.len(), 0);
        }
    }

    #[test]
    fn empty_tree_queries() {
        let mut tree = RawRangeSizeTree::new();
        tree.validate_invariants();

        assert!(tree.is_empty());
        assert_eq!(tree.range_size(1, 1), 0);
        assert_eq!(tree.range_size(-5, 5), 0);
        assert!(tree.get(1).is_empty());
        assert!(tree.remove(1).is_none());
        assert!(tree.min().is_none());
    }

    #[test]
    fn put_increments_sizes_along_the_path() {
        let tree = tree_of(&[5, 3, 8, 1, 4]);
        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).size().to_usize(), 5);

        let three = tree.node(root).left().unwrap();
        assert_eq!(tree.node(three).key(), 3);
        assert_eq!(tree.node(three).size().to_usize(), 3);

        let eight = tree.node(root).right().unwrap();
        assert_eq!(tree.node(eight).size(), Size::ONE);
    }

    #[test]
    fn duplicates_descend_left() {
        let tree = tree_of(&[4, 4, 4]);
        let root = tree.root().unwrap();
        let middle = tree.node(root).left().unwrap();
        let bottom = tree.node(middle).left().unwrap();

        assert!(tree.node(root).right().is_none());
        assert_eq!(tree.get(4), vec![bottom, middle, root]);
        assert_eq!(tree.deepest_occurrence(4), Some(bottom));
    }

    #[test]
    fn get_orders_left_to_right() {
        let tree = tree_of(&[3, 1, 5, 1, 2]);
        let found = tree.get(1);

        assert_eq!(tree.keys_of(&found), vec![1, 1]);
        assert_eq!(tree.key_of(tree.node(found[0]).parent()), Some(1));
        assert_eq!(tree.key_of(tree.node(found[1]).parent()), Some(3));
        assert_eq!(tree.count(1), 2);
        assert!(tree.get(7).is_empty());
    }

    #[test]
    fn remove_root_with_only_a_left_subtree() {
        let mut tree = tree_of(&[5, 1, 2]);
        let removed = tree.remove(5).unwrap();
        tree.validate_invariants();

        assert_eq!(removed.node.key(), 5);
        assert_eq!(removed.node.size().to_usize(), 3);
        assert_eq!((removed.parent_key, removed.left_key, removed.right_key), (None, Some(1), None));
        assert_eq!(tree.key_of(tree.root()), Some(1));
        assert_eq!(tree.keys_in_order(), vec![1, 2]);
        assert!(!tree.is_empty());
    }

    #[test]
    fn remove_sole_root() {
        let mut tree = tree_of(&[7]);
        assert_eq!(tree.remove(7).map(|detached| detached.node.key()), Some(7));
        tree.validate_invariants();
        assert!(tree.is_empty());
    }

    #[test]
    fn remove_takes_the_deepest_duplicate() {
        // 3 / 1 (1, 2) / 5 (4, 6)
        let mut tree = tree_of(&[3, 1, 5, 1, 2, 4, 6]);
        let shallow = tree.get(1)[1];

        let removed = tree.remove(1).unwrap();
        tree.validate_invariants();

        assert_eq!(removed.node.parent(), Some(shallow));
        assert!(removed.node.is_leaf());
        assert_eq!(removed.parent_key, Some(1));
        assert_eq!(tree.get(1), vec![shallow]);
        assert!(tree.node(shallow).left().is_none());
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn remove_two_children_with_adjacent_successor() {
        let mut tree = tree_of(&[3, 1, 5, 6]);
        tree.remove(3).unwrap();
        tree.validate_invariants();

        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).key(), 5);
        assert_eq!(tree.key_of(tree.node(root).left()), Some(1));
        assert_eq!(tree.key_of(tree.node(root).right()), Some(6));
        assert_eq!(tree.node(root).size().to_usize(), 3);
    }

    #[test]
    fn remove_two_children_relocates_successor_right_subtree() {
        // 10 / 5 / 20 (15 (12 (_, 13)), 25)
        let mut tree = tree_of(&[10, 5, 20, 15, 25, 12, 13]);
        tree.remove(10).unwrap();
        tree.validate_invariants();

        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).key(), 12);
        assert_eq!(tree.keys_in_order(), vec![5, 12, 13, 15, 20, 25]);
        let fifteen = tree.get(15)[0];
        assert_eq!(tree.key_of(tree.node(fifteen).left()), Some(13));
        assert_eq!(tree.node(fifteen).size().to_usize(), 2);
    }

    #[test]
    fn remove_two_children_with_duplicate_minimum() {
        // The right subtree of 10 holds 20, then 15 twice down its left spine.
        let mut tree = tree_of(&[10, 5, 20, 15, 15, 17]);
        tree.remove(10).unwrap();
        tree.validate_invariants();

        assert_eq!(tree.keys_in_order(), vec![5, 15, 15, 17, 20]);
        assert_eq!(tree.get(15).len(), 2);
        assert_eq!(tree.range_size(15, 15), 2);
        assert_eq!(tree.key_of(tree.root()), Some(15));
    }

    #[test]
    fn range_size_counts_inclusive_bounds() {
        let tree = tree_of(&[3, 1, 5, 1, 2, 4, 6]);
        assert_eq!(tree.range_size(3, 7), 4);
        assert_eq!(tree.range_size(7, 3), 4);
        assert_eq!(tree.range_size(1, 6), 7);
        assert_eq!(tree.range_size(1, 1), 2);
        assert_eq!(tree.range_size(8, 100), 0);
    }

    #[test]
    fn degenerate_chain_does_not_recurse() {
        // Ascending keys build a right-leaning chain.
        let mut tree = RawRangeSizeTree::new();
        for key in 0..5_000 {
            tree.put(key);
        }
        assert_eq!(tree.len(), 5_000);
        assert_eq!(tree.range_size(0, 4_999), 5_000);
        assert_eq!(tree.range_size(100, 199), 100);
        assert_eq!(tree.keys_in_order().len(), 5_000);
        assert_eq!(tree.min().map(|h| tree.node(h).key()), Some(0));

        // Each removal takes the root and promotes its right child.
        for key in 0..5_000 {
            assert_eq!(tree.remove(key).map(|detached| detached.node.key()), Some(key));
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn slots_are_recycled() {
        let mut tree = tree_of(&[2, 1, 3]);
        tree.remove(1).unwrap();
        let before = tree.capacity();
        tree.put(0);
        tree.validate_invariants();
        assert_eq!(tree.capacity(), before);
        assert_eq!(tree.len(), 3);
    }
}
