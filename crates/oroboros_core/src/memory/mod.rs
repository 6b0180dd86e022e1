//! # Memory Pools
//!
//! Recycling of raw instances, keyed by type.
//!
//! ## Design Philosophy
//!
//! Instances are constructed once and then cycled between callers and an
//! idle queue:
//! - No allocation once a pool is warm
//! - Release hook always runs before an instance is vended again
//! - Safe to share across threads

mod pool;
mod recyclable;
mod registry;
mod strict;

pub use pool::{MemoryPoolStats, TypeMemoryPool};
pub use recyclable::Recyclable;
pub use registry::MemoryPoolRegistry;
pub use strict::StrictCheck;
