//! # Type Memory Pool
//!
//! Recycler of bare instances of one type.
//!
//! Instances that are released go into a lock-free idle queue; the next
//! `get` pops one back out instead of constructing a new instance. Any
//! number of threads may get and release concurrently.

use std::any::{type_name, Any};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_queue::SegQueue;
use serde::Serialize;

use super::recyclable::Recyclable;
use crate::error::PoolResult;
#[cfg(feature = "strict_checks")]
use crate::error::PoolError;

/// Diagnostic counters of one memory pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemoryPoolStats {
    /// Full type name of the pooled type.
    pub type_name: &'static str,
    /// Instances currently waiting in the idle queue.
    pub idle: usize,
    /// Instances handed out and not yet released.
    pub in_use: usize,
    /// Total number of `get` calls.
    pub fetched: u64,
    /// Total number of instances constructed (on demand or pre-warmed).
    pub added: u64,
    /// Total number of idle instances dropped by trimming.
    pub removed: u64,
    /// Total number of `release` calls that requeued an instance.
    pub released: u64,
}

/// Thread-safe pool of idle instances of `T`.
///
/// # Example
///
/// ```rust,ignore
/// let pool = TypeMemoryPool::new(HitEvent::default);
/// pool.add_count(64);                 // pre-warm
///
/// let mut event = pool.get();          // no allocation
/// event.damage = 12;
/// pool.release(event)?;                // reset + requeue
/// ```
pub struct TypeMemoryPool<T> {
    /// Idle instances, already reset.
    idle: SegQueue<T>,
    /// Constructor used when the idle queue is empty.
    factory: fn() -> T,
    type_name: &'static str,
    /// Whether the contract checks run.
    #[cfg(feature = "strict_checks")]
    strict: bool,
    in_use: AtomicUsize,
    fetched: AtomicU64,
    added: AtomicU64,
    removed: AtomicU64,
    released: AtomicU64,
}

impl<T: Recyclable> TypeMemoryPool<T> {
    /// Creates an empty pool without contract checks.
    #[must_use]
    pub fn new(factory: fn() -> T) -> Self {
        Self::with_strict_check(factory, false)
    }

    /// Creates an empty pool. `strict` only has an effect when the crate is
    /// built with the `strict_checks` feature.
    #[must_use]
    #[cfg_attr(not(feature = "strict_checks"), allow(unused_variables))]
    pub fn with_strict_check(factory: fn() -> T, strict: bool) -> Self {
        Self {
            idle: SegQueue::new(),
            factory,
            type_name: type_name::<T>(),
            #[cfg(feature = "strict_checks")]
            strict,
            in_use: AtomicUsize::new(0),
            fetched: AtomicU64::new(0),
            added: AtomicU64::new(0),
            removed: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    /// Returns the full name of the pooled type.
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if this pool runs contract checks.
    #[inline]
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        #[cfg(feature = "strict_checks")]
        {
            self.strict
        }
        #[cfg(not(feature = "strict_checks"))]
        {
            false
        }
    }

    /// Returns the number of idle instances.
    #[inline]
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    /// Returns the number of instances handed out and not yet released.
    #[inline]
    #[must_use]
    pub fn in_use_count(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Takes an idle instance, or constructs a new one if none is idle.
    ///
    /// Every idle instance already went through
    /// [`Recyclable::on_release`].
    pub fn get(&self) -> T {
        self.in_use.fetch_add(1, Ordering::AcqRel);
        self.fetched.fetch_add(1, Ordering::Relaxed);

        if let Some(instance) = self.idle.pop() {
            return instance;
        }

        self.added.fetch_add(1, Ordering::Relaxed);
        (self.factory)()
    }

    /// Runs the instance's release hook, then requeues it.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [`PoolError::ContractViolation`] when more
    /// instances are released than were handed out (double release or a
    /// foreign instance). The instance is dropped in that case.
    pub fn release(&self, mut instance: T) -> PoolResult<()> {
        instance.on_release();

        let outstanding = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| count.checked_sub(1));
        #[cfg(feature = "strict_checks")]
        if self.strict && outstanding.is_err() {
            return Err(PoolError::ContractViolation(format!(
                "instance of '{}' released more times than it was fetched",
                self.type_name
            )));
        }
        #[cfg(not(feature = "strict_checks"))]
        let _ = outstanding;

        self.idle.push(instance);
        self.released.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Pre-warms the pool with `count` freshly constructed instances.
    pub fn add_count(&self, count: usize) {
        self.added.fetch_add(count as u64, Ordering::Relaxed);
        for _ in 0..count {
            self.idle.push((self.factory)());
        }
    }

    /// Drops up to `count` idle instances, returning how many were dropped.
    pub fn remove_count(&self, count: usize) -> usize {
        let mut dropped = 0;
        while dropped < count && self.idle.pop().is_some() {
            dropped += 1;
        }
        self.removed.fetch_add(dropped as u64, Ordering::Relaxed);
        dropped
    }

    /// Drops every idle instance, returning how many were dropped.
    pub fn remove_all(&self) -> usize {
        self.remove_count(usize::MAX)
    }

    /// Returns a snapshot of the pool counters.
    #[must_use]
    pub fn stats(&self) -> MemoryPoolStats {
        MemoryPoolStats {
            type_name: self.type_name,
            idle: self.idle_count(),
            in_use: self.in_use_count(),
            fetched: self.fetched.load(Ordering::Relaxed),
            added: self.added.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}

impl<T> std::fmt::Debug for TypeMemoryPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeMemoryPool")
            .field("type_name", &self.type_name)
            .field("idle", &self.idle.len())
            .field("in_use", &self.in_use.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Type-erased view of a [`TypeMemoryPool`] used by the registry.
pub(crate) trait ErasedMemoryPool: Send + Sync {
    fn stats(&self) -> MemoryPoolStats;
    fn remove_all(&self) -> usize;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Recyclable> ErasedMemoryPool for TypeMemoryPool<T> {
    fn stats(&self) -> MemoryPoolStats {
        TypeMemoryPool::stats(self)
    }

    fn remove_all(&self) -> usize {
        TypeMemoryPool::remove_all(self)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
