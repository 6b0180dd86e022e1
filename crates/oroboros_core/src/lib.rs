//! # OROBOROS Core Pooling
//!
//! Allocation-free building blocks for object recycling, designed for:
//! - Thousands of short-lived objects per frame
//! - Zero allocator pressure once pools are warm
//! - Deterministic, reproducible behavior in tests
//!
//! ## Architecture Rules
//!
//! 1. **No allocation in the steady state** - removed list nodes and released
//!    instances are cached and reused
//! 2. **Handles, not pointers** - list nodes live in an arena and are
//!    addressed by generation-checked [`NodeRef`]s
//! 3. **Explicit context** - memory pools live in a [`MemoryPoolRegistry`]
//!    the application constructs and passes around
//!
//! ## Example
//!
//! ```rust,ignore
//! use oroboros_core::{MemoryPoolRegistry, StrictCheck};
//!
//! let registry = MemoryPoolRegistry::new(StrictCheck::DebugOnly);
//! let hits = registry.register_default::<HitEvent>();
//! let event = hits.get();
//! hits.release(event)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod collections;
pub mod error;
pub mod memory;

pub use collections::{NodeRef, Range, RangeIter, RangeMultiMap, RecyclableList};
pub use error::{PoolError, PoolResult};
pub use memory::{MemoryPoolRegistry, MemoryPoolStats, Recyclable, StrictCheck, TypeMemoryPool};
