//! # OROBOROS Object Pools
//!
//! Named, typed pools for objects that are expensive to create (textures,
//! meshes, audio sources, network buffers) and are reused instead.
//!
//! ## Design Principles
//!
//! 1. **Usage tracking** - every object knows how many callers hold it
//! 2. **Policy-driven eviction** - expired first, then lowest priority,
//!    then oldest use; held and locked objects are never evicted
//! 3. **Soft capacity** - going over capacity asks for eviction, it never
//!    fails a create
//! 4. **Explicit context** - pools live in an [`ObjectPoolRegistry`] the
//!    application owns, not in a global
//!
//! ## Thread Safety
//!
//! Object pools and their registry have a single owner (the game-loop
//! thread). The [`MemoryPoolRegistry`](oroboros_core::MemoryPoolRegistry)
//! they recycle their bookkeeping through is shared and thread-safe.
//!
//! ## Example
//!
//! ```rust,ignore
//! use oroboros_pool::{ObjectPoolRegistry, PoolSettings, PoolSystemConfig, SystemClock};
//!
//! let config = PoolSystemConfig::from_toml_file("data/pools.toml")?;
//! let mut pools = ObjectPoolRegistry::from_config(config, Arc::new(SystemClock::new()))?;
//!
//! let meshes = pools.create_pool_from_config::<Mesh>("terrain")?;
//! let mesh = match meshes.get(Some("chunk")) {
//!     Some(mesh) => mesh,
//!     None => {
//!         let mesh = Arc::new(Mesh::build("chunk"));
//!         meshes.create(Arc::clone(&mesh), true)?;
//!         mesh
//!     }
//! };
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod entry;
pub mod eviction;
pub mod key;
pub mod named_pool;
pub mod object;
pub mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{PoolSettings, PoolSystemConfig};
pub use diagnostics::{PoolInfo, PoolObjectInfo};
pub use entry::EntryOptions;
pub use eviction::{default_release_filter, EvictionCandidate, ReleaseFilter};
pub use key::PoolKey;
pub use named_pool::NamedObjectPool;
pub use object::{ObjectId, PoolObject};
pub use registry::ObjectPoolRegistry;

pub use oroboros_core::{MemoryPoolRegistry, PoolError, PoolResult, StrictCheck};
