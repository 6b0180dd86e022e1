//! # Recyclable Collections
//!
//! Index-linked data structures that never allocate after warm-up.
//!
//! ## Design Philosophy
//!
//! - Nodes live in an arena and link to each other by index, not pointer
//! - Removed nodes are cached and reused instead of freed
//! - Handles carry a generation counter so stale references are detected

mod node;
mod range_multi_map;
mod recyclable_list;

pub use node::NodeRef;
pub use range_multi_map::{Range, RangeIter, RangeMultiMap};
pub use recyclable_list::{Iter, RecyclableList};
