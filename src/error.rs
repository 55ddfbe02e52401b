use thiserror::Error;

/// Returned by [`RangeSizeTree::remove`](crate::RangeSizeTree::remove) when no
/// node holds the requested key. The tree is left untouched.
///
/// # Examples
///
/// ```
/// use range_size_tree::{NotFound, RangeSizeTree};
///
/// let mut tree = RangeSizeTree::new();
/// assert_eq!(tree.remove(4), Err(NotFound { key: 4 }));
/// assert_eq!(NotFound { key: 4 }.to_string(), "key 4 is not present in the tree");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
#[error("key {key} is not present in the tree")]
pub struct NotFound {
    /// The key that was asked for.
    pub key: i64,
}
