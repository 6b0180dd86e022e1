//! # Memory Pool Registry
//!
//! Type-keyed collection of [`TypeMemoryPool`]s shared by every subsystem
//! that recycles raw instances.
//!
//! The registry is an explicit context object: construct one at startup,
//! share it behind an `Arc`, and register each poolable type with its
//! factory before use. Lookups are guarded by a `parking_lot::RwLock`; hot
//! paths should grab a typed handle once with [`MemoryPoolRegistry::pool`]
//! and talk to the pool directly afterwards.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::pool::{ErasedMemoryPool, MemoryPoolStats, TypeMemoryPool};
use super::recyclable::Recyclable;
use super::strict::StrictCheck;
use crate::error::{PoolError, PoolResult};

/// Thread-safe registry of memory pools, one per registered type.
pub struct MemoryPoolRegistry {
    pools: RwLock<HashMap<TypeId, Arc<dyn ErasedMemoryPool>>>,
    /// Resolved strict mode, handed to every pool at registration.
    strict: bool,
}

impl MemoryPoolRegistry {
    /// Creates an empty registry.
    ///
    /// The strict mode is resolved once, here. Requesting strict checks in a
    /// build without the `strict_checks` feature logs a warning and runs
    /// without them.
    #[must_use]
    pub fn new(strict_check: StrictCheck) -> Self {
        let requested = strict_check.resolve();
        let strict = requested && cfg!(feature = "strict_checks");

        if strict {
            info!(
                mode = ?strict_check,
                "Memory pool strict checking enabled, this will drastically affect performance"
            );
        } else if requested {
            warn!(
                mode = ?strict_check,
                "Memory pool strict checking requested but compiled out (enable the `strict_checks` feature)"
            );
        }

        Self {
            pools: RwLock::new(HashMap::new()),
            strict,
        }
    }

    /// Returns `true` if pools created by this registry run contract checks.
    #[inline]
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Registers a pool for `T` built with `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::DuplicatePool`] if `T` is already registered.
    pub fn register<T: Recyclable>(&self, factory: fn() -> T) -> PoolResult<Arc<TypeMemoryPool<T>>> {
        let mut pools = self.pools.write();
        if pools.contains_key(&TypeId::of::<T>()) {
            return Err(PoolError::DuplicatePool(type_name::<T>().to_string()));
        }
        Ok(self.insert_locked(&mut pools, factory))
    }

    /// Returns the pool for `T`, registering it with `factory` if absent.
    ///
    /// The factory is ignored when the pool already exists.
    pub fn register_or_get<T: Recyclable>(&self, factory: fn() -> T) -> Arc<TypeMemoryPool<T>> {
        if let Ok(pool) = self.pool::<T>() {
            return pool;
        }

        let mut pools = self.pools.write();
        // Another thread may have registered between the two locks.
        if let Some(existing) = pools.get(&TypeId::of::<T>()) {
            if let Ok(pool) = downcast::<T>(existing) {
                return pool;
            }
        }
        self.insert_locked(&mut pools, factory)
    }

    /// Returns the pool for `T`, registering it with `T::default` if absent.
    pub fn register_default<T: Recyclable + Default>(&self) -> Arc<TypeMemoryPool<T>> {
        self.register_or_get(T::default)
    }

    fn insert_locked<T: Recyclable>(
        &self,
        pools: &mut HashMap<TypeId, Arc<dyn ErasedMemoryPool>>,
        factory: fn() -> T,
    ) -> Arc<TypeMemoryPool<T>> {
        let pool = Arc::new(TypeMemoryPool::with_strict_check(factory, self.strict));
        pools.insert(TypeId::of::<T>(), Arc::clone(&pool) as Arc<dyn ErasedMemoryPool>);
        debug!(type_name = pool.type_name(), strict = self.strict, "Memory pool registered");
        pool
    }

    /// Returns a typed handle to the pool for `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] if `T` was never registered.
    pub fn pool<T: Recyclable>(&self) -> PoolResult<Arc<TypeMemoryPool<T>>> {
        let pools = self.pools.read();
        let erased = pools
            .get(&TypeId::of::<T>())
            .ok_or_else(|| PoolError::NotFound(format!("memory pool for '{}'", type_name::<T>())))?;
        downcast::<T>(erased)
    }

    /// Returns `true` if a pool for `T` is registered.
    #[must_use]
    pub fn contains<T: Recyclable>(&self) -> bool {
        self.pools.read().contains_key(&TypeId::of::<T>())
    }

    /// Takes an idle `T`, or constructs one.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] if `T` was never registered.
    pub fn get<T: Recyclable>(&self) -> PoolResult<T> {
        Ok(self.pool::<T>()?.get())
    }

    /// Resets `instance` and returns it to its pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] if `T` was never registered, or
    /// [`PoolError::ContractViolation`] on a detected double release.
    pub fn release<T: Recyclable>(&self, instance: T) -> PoolResult<()> {
        self.pool::<T>()?.release(instance)
    }

    /// Pre-warms the pool for `T` with `count` instances.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] if `T` was never registered.
    pub fn add_count<T: Recyclable>(&self, count: usize) -> PoolResult<()> {
        self.pool::<T>()?.add_count(count);
        Ok(())
    }

    /// Drops up to `count` idle instances of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] if `T` was never registered.
    pub fn remove_count<T: Recyclable>(&self, count: usize) -> PoolResult<usize> {
        Ok(self.pool::<T>()?.remove_count(count))
    }

    /// Drops every idle instance of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::NotFound`] if `T` was never registered.
    pub fn remove_all<T: Recyclable>(&self) -> PoolResult<usize> {
        Ok(self.pool::<T>()?.remove_all())
    }

    /// Number of registered pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.read().len()
    }

    /// Counters of every registered pool, sorted by type name.
    #[must_use]
    pub fn stats(&self) -> Vec<MemoryPoolStats> {
        let mut stats: Vec<_> = self.pools.read().values().map(|pool| pool.stats()).collect();
        stats.sort_unstable_by(|a, b| a.type_name.cmp(b.type_name));
        stats
    }

    /// Drops the idle instances of every pool. Registrations stay.
    pub fn clear_all(&self) -> usize {
        let dropped: usize = self.pools.read().values().map(|pool| pool.remove_all()).sum();
        debug!(dropped, "Memory pools cleared");
        dropped
    }
}

impl Default for MemoryPoolRegistry {
    fn default() -> Self {
        Self::new(StrictCheck::default())
    }
}

impl std::fmt::Debug for MemoryPoolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPoolRegistry")
            .field("pools", &self.pools.read().len())
            .field("strict", &self.strict)
            .finish()
    }
}

fn downcast<T: Recyclable>(erased: &Arc<dyn ErasedMemoryPool>) -> PoolResult<Arc<TypeMemoryPool<T>>> {
    Arc::clone(erased)
        .into_any()
        .downcast::<TypeMemoryPool<T>>()
        .map_err(|_| {
            PoolError::ContractViolation(format!(
                "memory pool registered for '{}' holds another type",
                type_name::<T>()
            ))
        })
}
