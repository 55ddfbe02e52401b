mod arena;
mod handle;
mod node;
mod raw_range_size_tree;
mod size;

pub(crate) use handle::Handle;
pub(crate) use node::Node;
pub(crate) use raw_range_size_tree::{Detached, RawRangeSizeTree};
