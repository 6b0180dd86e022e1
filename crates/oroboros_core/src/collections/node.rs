//! # Node Handles
//!
//! Nodes of a [`RecyclableList`](super::RecyclableList) live in an arena and
//! are addressed by lightweight handles consisting of:
//! - The id of the owning list
//! - An index into the list's node arena
//! - A generation counter for detecting stale references

use std::sync::atomic::{AtomicU32, Ordering};

/// Sentinel index meaning "no node".
pub(crate) const NIL: u32 = u32::MAX;

/// Source of unique list ids. Id 0 is never handed out.
static NEXT_LIST_ID: AtomicU32 = AtomicU32::new(1);

/// Allocates a process-unique list id.
pub(crate) fn next_list_id() -> u32 {
    NEXT_LIST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Handle to a live node of a [`RecyclableList`](super::RecyclableList).
///
/// A handle stays valid until its node is removed. Once the node slot is
/// recycled for another value, the generation no longer matches and the old
/// handle is rejected by every list operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef {
    list: u32,
    index: u32,
    generation: u32,
}

impl NodeRef {
    #[inline]
    pub(crate) const fn new(list: u32, index: u32, generation: u32) -> Self {
        Self {
            list,
            index,
            generation,
        }
    }

    /// Returns the id of the list that created this node.
    #[inline]
    #[must_use]
    pub const fn list_id(self) -> u32 {
        self.list
    }

    /// Returns the arena index of the node.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation the node had when this handle was issued.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// Where a node slot currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeState {
    /// Reachable from the head/tail chain.
    Live,
    /// Parked in the node cache, waiting for reuse.
    Cached,
    /// Dropped from the cache; the slot is only kept to preserve indices.
    Vacant,
}

/// One arena slot.
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) prev: u32,
    pub(crate) next: u32,
    pub(crate) generation: u32,
    pub(crate) state: NodeState,
}

impl<T> Node<T> {
    #[inline]
    pub(crate) const fn new(value: T, generation: u32) -> Self {
        Self {
            value,
            prev: NIL,
            next: NIL,
            generation,
            state: NodeState::Live,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_ids_are_unique() {
        let a = next_list_id();
        let b = next_list_id();
        assert_ne!(a, b);
        assert_ne!(a, 0);
    }

    #[test]
    fn test_node_ref_accessors() {
        let node = NodeRef::new(7, 12345, 67890);
        assert_eq!(node.list_id(), 7);
        assert_eq!(node.index(), 12345);
        assert_eq!(node.generation(), 67890);
    }
}
