//! A size-augmented binary search tree with duplicate keys for Rust.
//!
//! This crate provides [`RangeSizeTree`], an unbalanced BST over `i64` keys in
//! which every node tracks the size of its subtree:
//!
//! - [`put`](RangeSizeTree::put) - Insert a key; duplicates descend to the left
//! - [`get`](RangeSizeTree::get) - All occurrences of a key, left to right
//! - [`remove`](RangeSizeTree::remove) - Remove the first deepest occurrence of a key
//! - [`range_size`](RangeSizeTree::range_size) - Count the keys in an inclusive range
//!
//! # Example
//!
//! ```
//! use range_size_tree::{NotFound, RangeSizeTree};
//!
//! let mut tree = RangeSizeTree::new();
//! for key in [3, 1, 5, 1, 2, 4, 6] {
//!     tree.put(key);
//! }
//!
//! assert_eq!(tree.get(1).len(), 2);
//! assert_eq!(tree.range_size(1, 1), 2);
//! assert_eq!(tree.range_size(3, 7), 4);
//!
//! let removed = tree.remove(3).unwrap();
//! assert_eq!(removed.subtree_size(), 7);
//! assert_eq!(tree.root().unwrap().key(), 4);
//!
//! assert_eq!(tree.remove(42), Err(NotFound { key: 42 }));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Arena storage** - Nodes live in one slab; parent links are plain indices
//! - **No recursion** - Every walk uses an explicit stack, so degenerate trees are safe
//!
//! # Logging
//!
//! Mutations and queries are reported through the [`log`] facade at `trace`
//! level, failed removals at `debug` level. The crate never installs a logger.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod range_size_tree;

pub use error::NotFound;
pub use range_size_tree::{NodeRef, RangeSizeTree, RemovedNode};
