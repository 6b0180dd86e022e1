//! # Named Object Pool
//!
//! Tracks externally created objects of one type and hands them out again
//! by name.
//!
//! ## Entry lifecycle
//!
//! ```text
//!   create ──► Idle ──get──► InUse ──recycle──► Idle ──evict──► (gone)
//!                ▲                                 │
//!                └─────────────────────────────────┘
//! ```
//!
//! An entry can only be evicted while idle, unlocked and not vetoed by the
//! object itself. Capacity is soft: going over it triggers an eviction pass,
//! but held or locked objects are never taken away to get back under it.
//!
//! ## Thread Safety
//!
//! NOT thread-safe. One owner (usually the game-loop thread) drives a pool.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use oroboros_core::{MemoryPoolRegistry, PoolError, PoolResult, Range, RangeMultiMap, TypeMemoryPool};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::PoolSettings;
use crate::diagnostics::{PoolInfo, PoolObjectInfo};
use crate::entry::{EntryOptions, PooledEntry};
use crate::eviction::{default_release_filter, release_all_candidates, EvictionCandidate, ReleaseFilter};
use crate::key::PoolKey;
use crate::object::{ObjectId, PoolObject};

/// Pool of shared objects of type `T`, looked up by object name.
///
/// # Example
///
/// ```rust,ignore
/// let pool = pools.create_pool::<Sprite>("ui", &PoolSettings::default().with_capacity(64))?;
///
/// pool.create(Arc::new(Sprite::load("button")), false)?;
///
/// if let Some(sprite) = pool.get(Some("button")) {
///     draw(&sprite);
///     pool.recycle(&sprite)?;
/// }
/// ```
pub struct NamedObjectPool<T: PoolObject> {
    key: PoolKey,
    /// Identity -> entry. The authoritative set of tracked objects.
    entries: HashMap<ObjectId, PooledEntry<T>>,
    /// Name -> identities, in creation order.
    by_name: RangeMultiMap<String, ObjectId>,
    entry_pool: Arc<TypeMemoryPool<PooledEntry<T>>>,
    clock: Arc<dyn Clock>,
    allow_multi_get: bool,
    capacity: usize,
    expire_time: Option<Duration>,
    auto_release_interval: Option<Duration>,
    priority: i32,
    since_auto_release: Duration,
    next_sequence: u64,
    // Scratch buffers reused by every eviction pass.
    candidates: Vec<EvictionCandidate>,
    to_release: Vec<ObjectId>,
}

impl<T: PoolObject> NamedObjectPool<T> {
    /// Creates an empty pool.
    ///
    /// Entry wrappers are recycled through `memory`, which registers a pool
    /// for them on first use.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidArgument`] if a time setting is negative or not
    /// finite.
    pub fn new(
        name: impl Into<String>,
        settings: &PoolSettings,
        memory: &MemoryPoolRegistry,
        clock: Arc<dyn Clock>,
    ) -> PoolResult<Self> {
        let expire_time = settings.expire_time()?;
        let auto_release_interval = settings.auto_release_interval()?;

        Ok(Self {
            key: PoolKey::of::<T>(name),
            entries: HashMap::new(),
            by_name: RangeMultiMap::new(),
            entry_pool: memory.register_or_get(PooledEntry::<T>::vacant),
            clock,
            allow_multi_get: settings.allow_multi_get,
            capacity: settings.capacity_or_unbounded(),
            expire_time,
            auto_release_interval,
            priority: settings.priority,
            since_auto_release: Duration::ZERO,
            next_sequence: 0,
            candidates: Vec::new(),
            to_release: Vec::new(),
        })
    }

    /// Pool identity.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> &PoolKey {
        &self.key
    }

    /// Pool name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Number of tracked objects.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Number of tracked objects an eviction pass could release right now.
    #[must_use]
    pub fn releasable_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_releasable()).count()
    }

    /// Whether one object may be held by several callers at once.
    #[inline]
    #[must_use]
    pub const fn allow_multi_get(&self) -> bool {
        self.allow_multi_get
    }

    /// Soft capacity; `usize::MAX` when unbounded.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity and runs an eviction pass if it changed.
    ///
    /// Returns the number of objects released.
    ///
    /// # Errors
    ///
    /// Propagates bookkeeping errors from the eviction pass.
    pub fn set_capacity(&mut self, capacity: usize) -> PoolResult<usize> {
        if self.capacity == capacity {
            return Ok(0);
        }
        self.capacity = capacity;
        self.release_evictable()
    }

    /// Idle time after which objects expire.
    #[inline]
    #[must_use]
    pub const fn expire_time(&self) -> Option<Duration> {
        self.expire_time
    }

    /// Changes the expiry time and runs an eviction pass if it changed.
    ///
    /// Returns the number of objects released.
    ///
    /// # Errors
    ///
    /// Propagates bookkeeping errors from the eviction pass.
    pub fn set_expire_time(&mut self, expire_time: Option<Duration>) -> PoolResult<usize> {
        if self.expire_time == expire_time {
            return Ok(0);
        }
        self.expire_time = expire_time;
        self.release_evictable()
    }

    /// Interval of the periodic eviction pass.
    #[inline]
    #[must_use]
    pub const fn auto_release_interval(&self) -> Option<Duration> {
        self.auto_release_interval
    }

    /// Changes the interval of the periodic eviction pass.
    #[inline]
    pub fn set_auto_release_interval(&mut self, interval: Option<Duration>) {
        self.auto_release_interval = interval;
    }

    /// Pool priority. Bulk operations visit lower numbers first.
    #[inline]
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Changes the pool priority.
    #[inline]
    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    /// Starts tracking `object` as an idle (or, with `acquired`, already
    /// held) entry with priority 0.
    ///
    /// # Errors
    ///
    /// See [`create_with`](Self::create_with).
    pub fn create(&mut self, object: Arc<T>, acquired: bool) -> PoolResult<()> {
        self.create_with(object, EntryOptions::new().acquired(acquired))
    }

    /// Starts tracking `object`.
    ///
    /// Going over capacity runs an eviction pass right away; objects that
    /// cannot be evicted stay, so the pool may end up above capacity.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidArgument`] if the pool already tracks this object.
    pub fn create_with(&mut self, object: Arc<T>, options: EntryOptions) -> PoolResult<()> {
        let id = ObjectId::of(&*object);
        if self.entries.contains_key(&id) {
            return Err(PoolError::InvalidArgument(format!(
                "object '{}' is already tracked by pool '{}'",
                object.name(),
                self.key
            )));
        }

        self.by_name.add_borrowed(object.name(), id)?;

        let mut entry = self.entry_pool.get();
        entry.fill(object, options, self.clock.now(), self.next_sequence);
        self.next_sequence += 1;
        self.entries.insert(id, entry);

        if self.entries.len() > self.capacity {
            self.release_evictable()?;
        }
        Ok(())
    }

    /// `true` if [`get`](Self::get) would return an object. `None` looks up
    /// objects with an empty name.
    #[must_use]
    pub fn can_get(&self, name: Option<&str>) -> bool {
        self.find_available(name.unwrap_or("")).is_some()
    }

    /// Hands out an object called `name`, oldest first.
    ///
    /// Without multi-get only idle objects qualify. Returns `None` when
    /// nothing qualifies; that is the normal "create a new one" signal.
    pub fn get(&mut self, name: Option<&str>) -> Option<Arc<T>> {
        let id = self.find_available(name.unwrap_or(""))?;
        let now = self.clock.now();
        self.entries.get_mut(&id)?.acquire(now)
    }

    fn find_available(&self, name: &str) -> Option<ObjectId> {
        self.by_name.values(name).copied().find(|id| {
            self.entries
                .get(id)
                .is_some_and(|entry| self.allow_multi_get || !entry.is_in_use())
        })
    }

    /// Gives back one hold on `object`.
    ///
    /// If that leaves the object idle while the pool is over capacity, an
    /// eviction pass runs.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotFound`] if the pool does not track `object`,
    /// [`PoolError::StateError`] if nobody holds it.
    pub fn recycle(&mut self, object: &T) -> PoolResult<()> {
        let now = self.clock.now();
        let idle = {
            let entry = self.entry_mut(object)?;
            entry.recycle(now)?;
            !entry.is_in_use()
        };

        if idle && self.entries.len() > self.capacity {
            self.release_evictable()?;
        }
        Ok(())
    }

    /// Excludes `object` from (or readmits it to) eviction.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotFound`] if the pool does not track `object`.
    pub fn set_locked(&mut self, object: &T, locked: bool) -> PoolResult<()> {
        self.entry_mut(object)?.set_locked(locked);
        Ok(())
    }

    /// Changes the eviction priority of `object`.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotFound`] if the pool does not track `object`.
    pub fn set_object_priority(&mut self, object: &T, priority: i32) -> PoolResult<()> {
        self.entry_mut(object)?.set_priority(priority);
        Ok(())
    }

    fn entry_mut(&mut self, object: &T) -> PoolResult<&mut PooledEntry<T>> {
        let key = &self.key;
        self.entries
            .get_mut(&ObjectId::of(object))
            .ok_or_else(|| not_tracked(key, object))
    }

    /// Releases `object` now if it is evictable.
    ///
    /// Returns `Ok(false)` when it is held, locked or vetoed.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotFound`] if the pool does not track `object`.
    pub fn release_entry(&mut self, object: &T) -> PoolResult<bool> {
        let id = ObjectId::of(object);
        if !self.entries.contains_key(&id) {
            return Err(not_tracked(&self.key, object));
        }
        self.evict(id)
    }

    /// Eviction pass aiming for the capacity: requests `count - capacity`
    /// releases (zero when within capacity; expired objects go anyway).
    ///
    /// Returns the number of objects released.
    ///
    /// # Errors
    ///
    /// Propagates bookkeeping errors.
    pub fn release_evictable(&mut self) -> PoolResult<usize> {
        self.release_evictable_count(self.default_release_count())
    }

    /// Eviction pass requesting `count` releases with the default filter.
    ///
    /// # Errors
    ///
    /// Propagates bookkeeping errors.
    pub fn release_evictable_count(&mut self, count: usize) -> PoolResult<usize> {
        self.run_eviction(count, &mut default_release_filter)
    }

    /// Eviction pass aiming for the capacity, with a custom filter.
    ///
    /// # Errors
    ///
    /// Propagates bookkeeping errors.
    pub fn release_evictable_with<F>(&mut self, filter: F) -> PoolResult<usize>
    where
        F: FnMut(&mut Vec<EvictionCandidate>, usize, Option<Duration>, &mut Vec<ObjectId>),
    {
        let count = self.default_release_count();
        self.release_evictable_count_with(count, filter)
    }

    /// Eviction pass requesting `count` releases with a custom filter.
    ///
    /// # Errors
    ///
    /// Propagates bookkeeping errors.
    pub fn release_evictable_count_with<F>(&mut self, count: usize, mut filter: F) -> PoolResult<usize>
    where
        F: FnMut(&mut Vec<EvictionCandidate>, usize, Option<Duration>, &mut Vec<ObjectId>),
    {
        self.run_eviction(count, &mut filter)
    }

    /// Releases every evictable object, whatever the capacity.
    ///
    /// # Errors
    ///
    /// Propagates bookkeeping errors.
    pub fn release_all_unused(&mut self) -> PoolResult<usize> {
        self.run_eviction(usize::MAX, &mut release_all_candidates)
    }

    /// Advances the auto-release timer by `real_elapsed` and runs an
    /// eviction pass once the interval is reached. The scaled frame time is
    /// not used: expiry runs on real time.
    ///
    /// Returns the number of objects released.
    ///
    /// # Errors
    ///
    /// Propagates bookkeeping errors.
    pub fn tick(&mut self, _scaled_elapsed: Duration, real_elapsed: Duration) -> PoolResult<usize> {
        self.since_auto_release = self.since_auto_release.saturating_add(real_elapsed);
        match self.auto_release_interval {
            Some(interval) if self.since_auto_release >= interval => self.release_evictable(),
            _ => Ok(0),
        }
    }

    fn default_release_count(&self) -> usize {
        self.entries.len().saturating_sub(self.capacity)
    }

    fn expire_threshold(&self) -> Option<Duration> {
        self.expire_time
            .and_then(|expire_time| self.clock.now().checked_sub(expire_time))
    }

    fn run_eviction(&mut self, count: usize, filter: &mut ReleaseFilter<'_>) -> PoolResult<usize> {
        self.since_auto_release = Duration::ZERO;
        let threshold = self.expire_threshold();

        let mut candidates = std::mem::take(&mut self.candidates);
        let mut to_release = std::mem::take(&mut self.to_release);
        self.collect_candidates(&mut candidates);

        filter(&mut candidates, count, threshold, &mut to_release);
        let result = self.evict_all(&to_release);

        candidates.clear();
        to_release.clear();
        self.candidates = candidates;
        self.to_release = to_release;

        let released = result?;
        if released > 0 {
            debug!(pool = %self.key, released, remaining = self.entries.len(), "Eviction pass released objects");
        }
        if self.entries.len() > self.capacity {
            warn!(
                pool = %self.key,
                count = self.entries.len(),
                capacity = self.capacity,
                "Object pool still over capacity after eviction"
            );
        }
        Ok(released)
    }

    fn collect_candidates(&self, candidates: &mut Vec<EvictionCandidate>) {
        candidates.clear();
        candidates.extend(
            self.entries
                .iter()
                .filter(|(_, entry)| entry.is_releasable())
                .map(|(id, entry)| EvictionCandidate {
                    id: *id,
                    priority: entry.priority(),
                    last_use: entry.last_use(),
                    sequence: entry.sequence(),
                }),
        );
        candidates.sort_unstable_by_key(|candidate| candidate.sequence);
    }

    fn evict_all(&mut self, ids: &[ObjectId]) -> PoolResult<usize> {
        let mut released = 0;
        for id in ids {
            if self.evict(*id)? {
                released += 1;
            }
        }
        Ok(released)
    }

    /// Stops tracking `id` if it is evictable: unindexes it, runs its
    /// release hook and hands the wrapper back to the memory pool.
    fn evict(&mut self, id: ObjectId) -> PoolResult<bool> {
        if !self.entries.get(&id).is_some_and(PooledEntry::is_releasable) {
            return Ok(false);
        }
        let Some(entry) = self.entries.remove(&id) else {
            return Ok(false);
        };

        let unindexed = self.by_name.remove(entry.name(), &id);
        entry.release(false);
        self.entry_pool.release(entry)?;
        unindexed?;
        Ok(true)
    }

    /// Per-object records, ordered by name and then creation order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PoolObjectInfo> {
        let mut names: Vec<(&String, Range)> = self.by_name.iter().collect();
        names.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut infos = Vec::with_capacity(self.entries.len());
        for (_, range) in names {
            for id in self.by_name.range_iter(range) {
                if let Some(entry) = self.entries.get(id) {
                    infos.push(PoolObjectInfo {
                        name: entry.name().to_owned(),
                        locked: entry.locked(),
                        custom_release_eligible: entry.custom_release_eligible(),
                        priority: entry.priority(),
                        last_use: entry.last_use(),
                        in_use: entry.in_use(),
                    });
                }
            }
        }
        infos
    }

    /// Pool summary.
    #[must_use]
    pub fn info(&self) -> PoolInfo {
        PoolInfo {
            key: self.key.to_string(),
            count: self.count(),
            releasable: self.releasable_count(),
            capacity: self.capacity,
            expire_time: self.expire_time,
            auto_release_interval: self.auto_release_interval,
            priority: self.priority,
            allow_multi_get: self.allow_multi_get,
        }
    }

    /// Releases every tracked object, held or not, with `is_shutdown` set.
    /// The pool is empty and reusable afterwards.
    ///
    /// Returns the number of objects released.
    pub fn shutdown(&mut self) -> usize {
        let mut entries: Vec<_> = self.entries.drain().map(|(_, entry)| entry).collect();
        entries.sort_unstable_by_key(PooledEntry::sequence);
        let released = entries.len();

        for entry in entries {
            entry.release(true);
            if let Err(err) = self.entry_pool.release(entry) {
                warn!(pool = %self.key, error = %err, "Entry wrapper rejected by memory pool");
            }
        }
        self.by_name.clear();
        self.since_auto_release = Duration::ZERO;

        if released > 0 {
            info!(pool = %self.key, released, "Object pool shut down");
        }
        released
    }
}

fn not_tracked<T: PoolObject>(key: &PoolKey, object: &T) -> PoolError {
    PoolError::NotFound(format!(
        "object '{}' in object pool '{key}'",
        object.name()
    ))
}

impl<T: PoolObject> Drop for NamedObjectPool<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T: PoolObject> fmt::Debug for NamedObjectPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedObjectPool")
            .field("key", &self.key.to_string())
            .field("count", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use oroboros_core::StrictCheck;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct Texture {
        name: String,
        pinned: AtomicBool,
        releases: AtomicU32,
    }

    impl Texture {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                pinned: AtomicBool::new(false),
                releases: AtomicU32::new(0),
            })
        }
    }

    impl PoolObject for Texture {
        fn name(&self) -> &str {
            &self.name
        }

        fn custom_release_eligible(&self) -> bool {
            !self.pinned.load(Ordering::Relaxed)
        }

        fn release(&self, _is_shutdown: bool) {
            self.releases.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn pool_with(settings: &PoolSettings) -> (NamedObjectPool<Texture>, Arc<ManualClock>) {
        let memory = MemoryPoolRegistry::new(StrictCheck::Always);
        let clock = Arc::new(ManualClock::default());
        let pool = NamedObjectPool::new("textures", settings, &memory, clock.clone()).unwrap();
        (pool, clock)
    }

    #[test]
    fn test_get_by_name_in_creation_order() {
        let (mut pool, _) = pool_with(&PoolSettings::default());
        let first = Texture::new("grass");
        let second = Texture::new("grass");
        pool.create(first.clone(), false).unwrap();
        pool.create(second.clone(), false).unwrap();
        pool.create(Texture::new("stone"), false).unwrap();

        let got = pool.get(Some("grass")).unwrap();
        assert!(Arc::ptr_eq(&got, &first));
        let got = pool.get(Some("grass")).unwrap();
        assert!(Arc::ptr_eq(&got, &second));

        // Single-get: both grass textures are now held.
        assert!(!pool.can_get(Some("grass")));
        assert!(pool.get(Some("grass")).is_none());
        assert!(pool.can_get(Some("stone")));
        assert!(!pool.can_get(Some("water")));
    }

    #[test]
    fn test_unnamed_lookup() {
        let (mut pool, _) = pool_with(&PoolSettings::default());
        assert!(!pool.can_get(None));
        pool.create(Texture::new(""), false).unwrap();
        assert!(pool.can_get(None));
        assert!(pool.get(None).is_some());
    }

    #[test]
    fn test_multi_get_counts_holders() {
        let (mut pool, _) = pool_with(&PoolSettings::default().with_multi_get(true));
        let texture = Texture::new("atlas");
        pool.create(texture.clone(), false).unwrap();

        pool.get(Some("atlas")).unwrap();
        pool.get(Some("atlas")).unwrap();
        assert_eq!(pool.snapshot()[0].in_use, 2);

        pool.recycle(&texture).unwrap();
        pool.recycle(&texture).unwrap();
        let err = pool.recycle(&texture).unwrap_err();
        assert!(matches!(err, PoolError::StateError(_)));
        assert_eq!(pool.snapshot()[0].in_use, 0);
    }

    #[test]
    fn test_duplicate_and_unknown_objects() {
        let (mut pool, _) = pool_with(&PoolSettings::default());
        let texture = Texture::new("a");
        pool.create(texture.clone(), false).unwrap();
        assert!(matches!(
            pool.create(texture.clone(), false),
            Err(PoolError::InvalidArgument(_))
        ));

        let stranger = Texture::new("a");
        assert!(matches!(pool.recycle(&stranger), Err(PoolError::NotFound(_))));
        assert!(matches!(pool.set_locked(&stranger, true), Err(PoolError::NotFound(_))));
        assert!(matches!(
            pool.set_object_priority(&stranger, 1),
            Err(PoolError::NotFound(_))
        ));
        assert!(matches!(pool.release_entry(&stranger), Err(PoolError::NotFound(_))));
    }

    #[test]
    fn test_release_entry_respects_state() {
        let (mut pool, _) = pool_with(&PoolSettings::default());
        let texture = Texture::new("a");
        pool.create(texture.clone(), true).unwrap();

        assert!(!pool.release_entry(&texture).unwrap());
        pool.recycle(&texture).unwrap();

        pool.set_locked(&texture, true).unwrap();
        assert!(!pool.release_entry(&texture).unwrap());
        pool.set_locked(&texture, false).unwrap();

        texture.pinned.store(true, Ordering::Relaxed);
        assert!(!pool.release_entry(&texture).unwrap());
        texture.pinned.store(false, Ordering::Relaxed);

        assert!(pool.release_entry(&texture).unwrap());
        assert_eq!(pool.count(), 0);
        assert_eq!(texture.releases.load(Ordering::Relaxed), 1);
        assert!(!pool.can_get(Some("a")));
    }

    #[test]
    fn test_shrinking_capacity_evicts() {
        let (mut pool, clock) = pool_with(&PoolSettings::default());
        for priority in 0..4 {
            let texture = Texture::new("t");
            pool.create_with(texture, EntryOptions::new().priority(priority)).unwrap();
            clock.advance(Duration::from_secs(1));
        }

        assert_eq!(pool.set_capacity(1).unwrap(), 3);
        assert_eq!(pool.count(), 1);
        assert_eq!(pool.snapshot()[0].priority, 3);
        assert_eq!(pool.set_capacity(1).unwrap(), 0);
    }

    #[test]
    fn test_expire_time_setter_evicts_expired() {
        let (mut pool, clock) = pool_with(&PoolSettings::default());
        pool.create(Texture::new("old"), false).unwrap();
        clock.advance(Duration::from_secs(100));
        pool.create(Texture::new("new"), false).unwrap();

        assert_eq!(pool.set_expire_time(Some(Duration::from_secs(50))).unwrap(), 1);
        assert!(pool.can_get(Some("new")));
        assert!(!pool.can_get(Some("old")));
    }

    #[test]
    fn test_tick_uses_real_time() {
        let settings = PoolSettings::default()
            .with_expire_secs(0.5)
            .with_auto_release_interval_secs(1.0);
        let (mut pool, clock) = pool_with(&settings);
        pool.create(Texture::new("a"), false).unwrap();
        clock.advance(Duration::from_secs(2));

        // Scaled time alone never fires.
        assert_eq!(pool.tick(Duration::from_secs(10), Duration::ZERO).unwrap(), 0);
        assert_eq!(pool.tick(Duration::ZERO, Duration::from_millis(600)).unwrap(), 0);
        assert_eq!(pool.count(), 1);

        assert_eq!(pool.tick(Duration::ZERO, Duration::from_millis(600)).unwrap(), 1);
        assert_eq!(pool.count(), 0);
    }

    #[test]
    fn test_recycle_over_capacity_evicts() {
        let (mut pool, _) = pool_with(&PoolSettings::default().with_capacity(0));
        let texture = Texture::new("a");
        pool.create(texture.clone(), true).unwrap();
        // Held, so the capacity pass could not take it.
        assert_eq!(pool.count(), 1);

        pool.recycle(&texture).unwrap();
        assert_eq!(pool.count(), 0);
        assert_eq!(texture.releases.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_custom_filter() {
        let (mut pool, _) = pool_with(&PoolSettings::default());
        let keep = Texture::new("keep");
        let drop_me = Texture::new("drop");
        pool.create(keep.clone(), false).unwrap();
        pool.create(drop_me.clone(), false).unwrap();
        let target = ObjectId::of(&*drop_me);

        let released = pool
            .release_evictable_count_with(1, |candidates, count, _, out| {
                assert_eq!(count, 1);
                assert_eq!(candidates.len(), 2);
                out.push(target);
            })
            .unwrap();
        assert_eq!(released, 1);
        assert!(pool.can_get(Some("keep")));
        assert_eq!(drop_me.releases.load(Ordering::Relaxed), 1);
        assert_eq!(keep.releases.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_release_all_unused_skips_held_and_locked() {
        let (mut pool, _) = pool_with(&PoolSettings::default());
        let held = Texture::new("held");
        let locked = Texture::new("locked");
        pool.create(held.clone(), true).unwrap();
        pool.create_with(locked.clone(), EntryOptions::new().locked(true)).unwrap();
        for _ in 0..3 {
            pool.create(Texture::new("idle"), false).unwrap();
        }

        assert_eq!(pool.releasable_count(), 3);
        assert_eq!(pool.release_all_unused().unwrap(), 3);
        assert_eq!(pool.count(), 2);
        assert_eq!(held.releases.load(Ordering::Relaxed), 0);
        assert_eq!(locked.releases.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_snapshot_order() {
        let (mut pool, _) = pool_with(&PoolSettings::default());
        pool.create_with(Texture::new("b"), EntryOptions::new().priority(1)).unwrap();
        pool.create_with(Texture::new("a"), EntryOptions::new().priority(2)).unwrap();
        pool.create_with(Texture::new("b"), EntryOptions::new().priority(3)).unwrap();

        let order: Vec<_> = pool
            .snapshot()
            .into_iter()
            .map(|info| (info.name, info.priority))
            .collect();
        assert_eq!(
            order,
            vec![("a".to_string(), 2), ("b".to_string(), 1), ("b".to_string(), 3)]
        );
    }

    #[test]
    fn test_shutdown_releases_everything_once() {
        let (mut pool, _) = pool_with(&PoolSettings::default());
        let held = Texture::new("held");
        let idle = Texture::new("idle");
        pool.create(held.clone(), true).unwrap();
        pool.create(idle.clone(), false).unwrap();

        assert_eq!(pool.shutdown(), 2);
        assert_eq!(pool.shutdown(), 0);
        drop(pool);

        assert_eq!(held.releases.load(Ordering::Relaxed), 1);
        assert_eq!(idle.releases.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_entry_wrappers_are_recycled() {
        let memory = MemoryPoolRegistry::new(StrictCheck::Always);
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::default());
        let mut pool =
            NamedObjectPool::<Texture>::new("t", &PoolSettings::default(), &memory, clock).unwrap();

        for _ in 0..3 {
            let texture = Texture::new("x");
            pool.create(texture.clone(), false).unwrap();
            assert!(pool.release_entry(&texture).unwrap());
        }

        let stats = memory.pool::<PooledEntry<Texture>>().unwrap().stats();
        assert_eq!(stats.added, 1);
        assert_eq!(stats.fetched, 3);
        assert_eq!(stats.released, 3);
    }
}
