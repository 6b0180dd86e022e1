//! # Object Pool Registry
//!
//! Owns every [`NamedObjectPool`], keyed by `(type, name)`.
//!
//! The registry is the explicit context the rest of the application holds
//! on to: it carries the shared [`MemoryPoolRegistry`], the clock and the
//! loaded configuration, forwards the frame tick to every pool, and fans
//! resource-pressure requests out in pool-priority order.
//!
//! ## Thread Safety
//!
//! NOT thread-safe. Drive it from one thread; it may be moved between
//! threads.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use oroboros_core::{MemoryPoolRegistry, PoolError, PoolResult};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::{PoolSettings, PoolSystemConfig};
use crate::diagnostics::{PoolInfo, PoolObjectInfo};
use crate::key::PoolKey;
use crate::named_pool::NamedObjectPool;
use crate::object::PoolObject;

/// Type-erased view of a [`NamedObjectPool`].
trait ErasedObjectPool: Send {
    fn key(&self) -> &PoolKey;
    fn priority(&self) -> i32;
    fn info(&self) -> PoolInfo;
    fn tick(&mut self, scaled_elapsed: Duration, real_elapsed: Duration) -> PoolResult<usize>;
    fn release_evictable(&mut self) -> PoolResult<usize>;
    fn release_all_unused(&mut self) -> PoolResult<usize>;
    fn shutdown(&mut self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: PoolObject> ErasedObjectPool for NamedObjectPool<T> {
    fn key(&self) -> &PoolKey {
        NamedObjectPool::key(self)
    }

    fn priority(&self) -> i32 {
        NamedObjectPool::priority(self)
    }

    fn info(&self) -> PoolInfo {
        NamedObjectPool::info(self)
    }

    fn tick(&mut self, scaled_elapsed: Duration, real_elapsed: Duration) -> PoolResult<usize> {
        NamedObjectPool::tick(self, scaled_elapsed, real_elapsed)
    }

    fn release_evictable(&mut self) -> PoolResult<usize> {
        NamedObjectPool::release_evictable(self)
    }

    fn release_all_unused(&mut self) -> PoolResult<usize> {
        NamedObjectPool::release_all_unused(self)
    }

    fn shutdown(&mut self) -> usize {
        NamedObjectPool::shutdown(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Registry of named object pools.
///
/// # Example
///
/// ```rust,ignore
/// let config = PoolSystemConfig::from_toml_file("data/pools.toml")?;
/// let mut pools = ObjectPoolRegistry::from_config(config, Arc::new(SystemClock::new()))?;
///
/// pools.create_pool_from_config::<Bullet>("player")?;
///
/// // every frame
/// pools.tick(frame.scaled_delta, frame.real_delta)?;
///
/// // on low-memory notification
/// pools.release_all_unused()?;
/// ```
pub struct ObjectPoolRegistry {
    pools: HashMap<PoolKey, Box<dyn ErasedObjectPool>>,
    memory: Arc<MemoryPoolRegistry>,
    clock: Arc<dyn Clock>,
    config: PoolSystemConfig,
}

impl ObjectPoolRegistry {
    /// Creates an empty registry sharing `memory` and `clock`, with default
    /// configuration.
    #[must_use]
    pub fn new(memory: Arc<MemoryPoolRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pools: HashMap::new(),
            memory,
            clock,
            config: PoolSystemConfig::default(),
        }
    }

    /// Creates an empty registry, and its memory pool registry, from
    /// configuration.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] if the configuration is invalid.
    pub fn from_config(config: PoolSystemConfig, clock: Arc<dyn Clock>) -> PoolResult<Self> {
        config.validate()?;
        let memory = Arc::new(MemoryPoolRegistry::new(config.strict_check));
        Ok(Self {
            pools: HashMap::new(),
            memory,
            clock,
            config,
        })
    }

    /// Shared memory pool registry.
    #[inline]
    #[must_use]
    pub const fn memory(&self) -> &Arc<MemoryPoolRegistry> {
        &self.memory
    }

    /// Clock shared by every pool.
    #[inline]
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Loaded configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &PoolSystemConfig {
        &self.config
    }

    /// Number of pools.
    #[inline]
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Creates the pool of `T` called `name`.
    ///
    /// # Errors
    ///
    /// [`PoolError::DuplicatePool`] if it already exists,
    /// [`PoolError::InvalidArgument`] if `settings` are invalid.
    pub fn create_pool<T: PoolObject>(
        &mut self,
        name: &str,
        settings: &PoolSettings,
    ) -> PoolResult<&mut NamedObjectPool<T>> {
        let key = PoolKey::of::<T>(name);
        let slot = match self.pools.entry(key) {
            Entry::Occupied(occupied) => {
                return Err(PoolError::DuplicatePool(occupied.key().to_string()));
            }
            Entry::Vacant(vacant) => vacant,
        };

        let pool = NamedObjectPool::<T>::new(name, settings, &self.memory, Arc::clone(&self.clock))?;
        info!(
            pool = %pool.key(),
            capacity = pool.capacity(),
            priority = pool.priority(),
            allow_multi_get = pool.allow_multi_get(),
            "Object pool created"
        );

        slot.insert(Box::new(pool))
            .as_any_mut()
            .downcast_mut::<NamedObjectPool<T>>()
            .ok_or_else(|| type_mismatch::<T>(name))
    }

    /// Creates the pool of `T` called `name` with the settings configured
    /// for its key (or the default pool settings).
    ///
    /// # Errors
    ///
    /// Same as [`create_pool`](Self::create_pool).
    pub fn create_pool_from_config<T: PoolObject>(
        &mut self,
        name: &str,
    ) -> PoolResult<&mut NamedObjectPool<T>> {
        let key = PoolKey::of::<T>(name).to_string();
        let settings = self.config.settings_for(&key).clone();
        self.create_pool::<T>(name, &settings)
    }

    /// `true` if the pool of `T` called `name` exists.
    #[must_use]
    pub fn contains_pool<T: PoolObject>(&self, name: &str) -> bool {
        self.pools.contains_key(&PoolKey::of::<T>(name))
    }

    /// The pool of `T` called `name`.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotFound`] if it does not exist.
    pub fn pool<T: PoolObject>(&self, name: &str) -> PoolResult<&NamedObjectPool<T>> {
        let key = PoolKey::of::<T>(name);
        self.pools
            .get(&key)
            .ok_or_else(|| PoolError::NotFound(format!("object pool '{key}'")))?
            .as_any()
            .downcast_ref::<NamedObjectPool<T>>()
            .ok_or_else(|| type_mismatch::<T>(name))
    }

    /// The pool of `T` called `name`, mutably.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotFound`] if it does not exist.
    pub fn pool_mut<T: PoolObject>(&mut self, name: &str) -> PoolResult<&mut NamedObjectPool<T>> {
        let key = PoolKey::of::<T>(name);
        let pool = match self.pools.get_mut(&key) {
            Some(pool) => pool,
            None => return Err(PoolError::NotFound(format!("object pool '{key}'"))),
        };
        pool.as_any_mut()
            .downcast_mut::<NamedObjectPool<T>>()
            .ok_or_else(|| type_mismatch::<T>(name))
    }

    /// Destroys the pool of `T` called `name`, releasing every object it
    /// tracks (held ones included) with `is_shutdown` set.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotFound`] if it does not exist.
    pub fn destroy_pool<T: PoolObject>(&mut self, name: &str) -> PoolResult<()> {
        let key = PoolKey::of::<T>(name);
        let mut pool = self
            .pools
            .remove(&key)
            .ok_or_else(|| PoolError::NotFound(format!("object pool '{key}'")))?;
        let released = pool.shutdown();
        info!(pool = %key, released, "Object pool destroyed");
        Ok(())
    }

    /// Per-object records of the pool of `T` called `name`.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotFound`] if it does not exist.
    pub fn snapshot<T: PoolObject>(&self, name: &str) -> PoolResult<Vec<PoolObjectInfo>> {
        Ok(self.pool::<T>(name)?.snapshot())
    }

    /// Summaries of every pool, ordered by pool priority.
    #[must_use]
    pub fn pool_infos(&self) -> Vec<PoolInfo> {
        let mut pools: Vec<&dyn ErasedObjectPool> = self.pools.values().map(|pool| &**pool).collect();
        pools.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.key().sort_key().cmp(&b.key().sort_key()))
        });
        pools.into_iter().map(|pool| pool.info()).collect()
    }

    /// Forwards the frame tick to every pool, in no particular order.
    /// Allocation-free once the pools are warm.
    ///
    /// Returns the number of objects released.
    ///
    /// # Errors
    ///
    /// Stops at the first pool that fails.
    pub fn tick(&mut self, scaled_elapsed: Duration, real_elapsed: Duration) -> PoolResult<usize> {
        let mut released = 0;
        for pool in self.pools.values_mut() {
            released += pool.tick(scaled_elapsed, real_elapsed)?;
        }
        Ok(released)
    }

    /// Runs a capacity eviction pass on every pool, lowest pool priority
    /// first.
    ///
    /// # Errors
    ///
    /// Stops at the first pool that fails.
    pub fn release_evictable(&mut self) -> PoolResult<usize> {
        let mut released = 0;
        for pool in self.pools_by_priority() {
            released += pool.release_evictable()?;
        }
        debug!(released, "Released evictable objects in all pools");
        Ok(released)
    }

    /// Releases every evictable object in every pool, lowest pool priority
    /// first.
    ///
    /// # Errors
    ///
    /// Stops at the first pool that fails.
    pub fn release_all_unused(&mut self) -> PoolResult<usize> {
        let mut released = 0;
        for pool in self.pools_by_priority() {
            released += pool.release_all_unused()?;
        }
        debug!(released, "Released all unused objects in all pools");
        Ok(released)
    }

    /// Destroys every pool. The registry stays usable.
    ///
    /// Returns the number of objects released.
    pub fn shutdown(&mut self) -> usize {
        if self.pools.is_empty() {
            return 0;
        }

        let pools = self.pools.len();
        let mut released = 0;
        for pool in self.pools_by_priority() {
            released += pool.shutdown();
        }
        self.pools.clear();
        info!(pools, released, "Object pool registry shut down");
        released
    }

    fn pools_by_priority(&mut self) -> Vec<&mut Box<dyn ErasedObjectPool>> {
        let mut pools: Vec<_> = self.pools.values_mut().collect();
        pools.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.key().sort_key().cmp(&b.key().sort_key()))
        });
        pools
    }
}

impl Default for ObjectPoolRegistry {
    fn default() -> Self {
        Self::new(
            Arc::new(MemoryPoolRegistry::default()),
            Arc::new(SystemClock::new()),
        )
    }
}

impl Drop for ObjectPoolRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ObjectPoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPoolRegistry")
            .field("pools", &self.pools.len())
            .field("memory", &self.memory)
            .finish_non_exhaustive()
    }
}

fn type_mismatch<T: PoolObject>(name: &str) -> PoolError {
    PoolError::ContractViolation(format!(
        "object pool '{}' holds another type",
        PoolKey::of::<T>(name)
    ))
}
