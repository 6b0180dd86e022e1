//! # Pooled Entries
//!
//! Bookkeeping wrapper around one tracked object.
//!
//! Wrappers are themselves pooled: a pool fetches them from the shared
//! [`MemoryPoolRegistry`](oroboros_core::MemoryPoolRegistry) when it starts
//! tracking an object and hands them back when it stops.

use std::sync::Arc;
use std::time::Duration;

use oroboros_core::{PoolError, PoolResult, Recyclable};

use crate::object::PoolObject;

/// Initial state of an entry created with
/// [`NamedObjectPool::create_with`](crate::NamedObjectPool::create_with).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// Start out held by the creator (usage count 1).
    pub acquired: bool,
    /// Start out excluded from eviction.
    pub locked: bool,
    /// Eviction priority. Lower numbers are evicted first.
    pub priority: i32,
}

impl EntryOptions {
    /// Options for an idle, unlocked entry with priority 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            acquired: false,
            locked: false,
            priority: 0,
        }
    }

    /// Sets whether the creator already holds the object.
    #[must_use]
    pub const fn acquired(mut self, acquired: bool) -> Self {
        self.acquired = acquired;
        self
    }

    /// Sets the initial lock state.
    #[must_use]
    pub const fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Sets the eviction priority.
    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// One tracked object plus its usage metadata.
pub(crate) struct PooledEntry<T> {
    object: Option<Arc<T>>,
    /// Copy of the object's name at creation, the key in the name index.
    name: String,
    in_use: u32,
    locked: bool,
    priority: i32,
    last_use: Duration,
    /// Creation order inside the pool; final eviction tie-break.
    sequence: u64,
}

impl<T: PoolObject> PooledEntry<T> {
    /// Factory for the memory pool: an empty wrapper.
    pub(crate) fn vacant() -> Self {
        Self {
            object: None,
            name: String::new(),
            in_use: 0,
            locked: false,
            priority: 0,
            last_use: Duration::ZERO,
            sequence: 0,
        }
    }

    /// Starts tracking `object`. Runs the acquire hook if the creator
    /// already holds it.
    pub(crate) fn fill(&mut self, object: Arc<T>, options: EntryOptions, now: Duration, sequence: u64) {
        self.name.clear();
        self.name.push_str(object.name());
        self.in_use = u32::from(options.acquired);
        self.locked = options.locked;
        self.priority = options.priority;
        self.last_use = now;
        self.sequence = sequence;
        if options.acquired {
            object.on_acquire();
        }
        self.object = Some(object);
    }

    /// Hands the object out once more. `None` only for a vacant wrapper.
    pub(crate) fn acquire(&mut self, now: Duration) -> Option<Arc<T>> {
        let object = Arc::clone(self.object.as_ref()?);
        self.in_use += 1;
        self.last_use = now;
        object.on_acquire();
        Some(object)
    }

    /// Takes back one holder's reference.
    ///
    /// # Errors
    ///
    /// [`PoolError::StateError`] if nobody holds the object. The entry is
    /// left unchanged.
    pub(crate) fn recycle(&mut self, now: Duration) -> PoolResult<()> {
        if self.in_use == 0 {
            return Err(PoolError::StateError(format!(
                "object '{}' recycled more times than it was acquired",
                self.name
            )));
        }
        if let Some(object) = &self.object {
            object.on_recycle();
        }
        self.last_use = now;
        self.in_use -= 1;
        Ok(())
    }

    /// Runs the object's release hook.
    pub(crate) fn release(&self, is_shutdown: bool) {
        if let Some(object) = &self.object {
            object.release(is_shutdown);
        }
    }

    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub(crate) const fn in_use(&self) -> u32 {
        self.in_use
    }

    #[inline]
    pub(crate) const fn is_in_use(&self) -> bool {
        self.in_use > 0
    }

    #[inline]
    pub(crate) const fn locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub(crate) fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    #[inline]
    pub(crate) const fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    #[inline]
    pub(crate) const fn last_use(&self) -> Duration {
        self.last_use
    }

    #[inline]
    pub(crate) const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// The object's own eviction veto. Queried live.
    pub(crate) fn custom_release_eligible(&self) -> bool {
        self.object
            .as_ref()
            .is_some_and(|object| object.custom_release_eligible())
    }

    /// Idle, unlocked and not vetoed by the object.
    pub(crate) fn is_releasable(&self) -> bool {
        !self.is_in_use() && !self.locked && self.custom_release_eligible()
    }
}

impl<T: PoolObject> Recyclable for PooledEntry<T> {
    fn on_release(&mut self) {
        self.object = None;
        self.name.clear();
        self.in_use = 0;
        self.locked = false;
        self.priority = 0;
        self.last_use = Duration::ZERO;
        self.sequence = 0;
    }
}
