//! # Object Pool Lifecycle Tests
//!
//! End-to-end checks of the pooling rules:
//!
//! 1. **Usage tracking**: random get/recycle interleavings never underflow
//! 2. **Eviction**: held and locked objects survive, expired objects go first
//! 3. **Soft capacity**: creating past capacity never fails
//! 4. **Teardown**: release hooks run exactly once per object
//!
//! Run with: cargo test -p oroboros_pool --test pool_lifecycle_test

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use oroboros_pool::{
    EntryOptions, ManualClock, MemoryPoolRegistry, NamedObjectPool, ObjectPoolRegistry, PoolError,
    PoolObject, PoolSettings, PoolSystemConfig, StrictCheck,
};
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ============================================================================
// FIXTURES
// ============================================================================

/// Release log shared by every shell of one test, in release order.
type ReleaseLog = Arc<Mutex<Vec<(String, bool)>>>;

struct Shell {
    name: String,
    acquires: AtomicU32,
    recycles: AtomicU32,
    log: ReleaseLog,
}

impl Shell {
    fn new(name: &str, log: &ReleaseLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            acquires: AtomicU32::new(0),
            recycles: AtomicU32::new(0),
            log: Arc::clone(log),
        })
    }
}

impl PoolObject for Shell {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_acquire(&self) {
        self.acquires.fetch_add(1, Ordering::Relaxed);
    }

    fn on_recycle(&self) {
        self.recycles.fetch_add(1, Ordering::Relaxed);
    }

    fn release(&self, is_shutdown: bool) {
        self.log.lock().push((self.name.clone(), is_shutdown));
    }
}

struct Decal;

impl PoolObject for Decal {
    fn release(&self, _is_shutdown: bool) {}
}

fn registry() -> (ObjectPoolRegistry, Arc<ManualClock>) {
    let memory = Arc::new(MemoryPoolRegistry::new(StrictCheck::Always));
    let clock = Arc::new(ManualClock::default());
    (ObjectPoolRegistry::new(memory, clock.clone()), clock)
}

fn released_names(log: &ReleaseLog) -> Vec<String> {
    log.lock().iter().map(|(name, _)| name.clone()).collect()
}

// ============================================================================
// USAGE TRACKING
// ============================================================================

#[test]
fn random_interleaving_never_underflows() {
    let (mut pools, _) = registry();
    let log = ReleaseLog::default();
    let pool = pools
        .create_pool::<Shell>("multi", &PoolSettings::default().with_multi_get(true))
        .unwrap();

    let shells: Vec<_> = (0..8).map(|i| Shell::new(&format!("shell-{i}"), &log)).collect();
    for shell in &shells {
        pool.create(Arc::clone(shell), false).unwrap();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(0x0B0B_0505);
    let mut held = vec![0u32; shells.len()];

    for _ in 0..10_000 {
        let index = rng.gen_range(0..shells.len());
        if rng.gen_bool(0.5) {
            let got = pool.get(Some(shells[index].name.as_str())).unwrap();
            assert!(Arc::ptr_eq(&got, &shells[index]));
            held[index] += 1;
        } else if held[index] == 0 {
            let err = pool.recycle(&shells[index]).unwrap_err();
            assert!(matches!(err, PoolError::StateError(_)));
        } else {
            pool.recycle(&shells[index]).unwrap();
            held[index] -= 1;
        }
    }

    let snapshot = pool.snapshot();
    assert_eq!(snapshot.len(), shells.len());
    for (info, expected) in snapshot.iter().zip(&held) {
        assert_eq!(info.in_use, *expected, "usage of {}", info.name);
    }
    for (shell, expected) in shells.iter().zip(&held) {
        let acquires = shell.acquires.load(Ordering::Relaxed);
        let recycles = shell.recycles.load(Ordering::Relaxed);
        assert_eq!(acquires - recycles, *expected);
    }
    assert!(log.lock().is_empty());
}

#[test]
fn single_get_hands_out_each_object_once() {
    let (mut pools, _) = registry();
    let log = ReleaseLog::default();
    let pool = pools.create_pool::<Shell>("single", &PoolSettings::default()).unwrap();

    let first = Shell::new("bolt", &log);
    let second = Shell::new("bolt", &log);
    pool.create(Arc::clone(&first), false).unwrap();
    pool.create(Arc::clone(&second), false).unwrap();

    let a = pool.get(Some("bolt")).unwrap();
    let b = pool.get(Some("bolt")).unwrap();
    assert!(Arc::ptr_eq(&a, &first));
    assert!(Arc::ptr_eq(&b, &second));
    assert!(pool.get(Some("bolt")).is_none());

    pool.recycle(&second).unwrap();
    let c = pool.get(Some("bolt")).unwrap();
    assert!(Arc::ptr_eq(&c, &second));
}

// ============================================================================
// EVICTION
// ============================================================================

#[test]
fn held_and_locked_objects_are_never_evicted() {
    let (mut pools, _) = registry();
    let log = ReleaseLog::default();
    let pool = pools.create_pool::<Shell>("guarded", &PoolSettings::default()).unwrap();

    let held = Shell::new("held", &log);
    let locked = Shell::new("locked", &log);
    let idle = Shell::new("idle", &log);
    pool.create(Arc::clone(&held), true).unwrap();
    pool.create_with(Arc::clone(&locked), EntryOptions::new().locked(true))
        .unwrap();
    pool.create(Arc::clone(&idle), false).unwrap();

    assert_eq!(pool.set_capacity(0).unwrap(), 1);
    assert_eq!(pool.release_all_unused().unwrap(), 0);
    assert_eq!(pool.release_evictable_count(10).unwrap(), 0);
    assert_eq!(pool.count(), 2);
    assert_eq!(released_names(&log), vec!["idle".to_string()]);

    pool.set_locked(&locked, false).unwrap();
    assert_eq!(pool.release_evictable().unwrap(), 1);
    assert_eq!(pool.count(), 1);
}

#[test]
fn expiry_never_takes_held_or_locked_objects() {
    let (mut pools, clock) = registry();
    let log = ReleaseLog::default();
    let pool = pools
        .create_pool::<Shell>("stale_guarded", &PoolSettings::default().with_expire_secs(1.0))
        .unwrap();

    let held = Shell::new("held", &log);
    let locked = Shell::new("locked", &log);
    pool.create(Arc::clone(&held), true).unwrap();
    pool.create_with(Arc::clone(&locked), EntryOptions::new().locked(true))
        .unwrap();

    clock.advance(Duration::from_secs(100));

    assert_eq!(pool.release_evictable_count(2).unwrap(), 0);
    assert_eq!(pool.release_evictable().unwrap(), 0);
    assert_eq!(pool.tick(Duration::ZERO, Duration::from_secs(100)).unwrap(), 0);
    assert_eq!(pool.count(), 2);
    assert!(log.lock().is_empty());
    assert_eq!(held.recycles.load(Ordering::Relaxed), 0);

    // Once idle and unlocked, the expired entry goes.
    pool.recycle(&held).unwrap();
    clock.advance(Duration::from_secs(100));
    assert_eq!(pool.release_evictable().unwrap(), 1);
    assert_eq!(released_names(&log), vec!["held".to_string()]);
    assert_eq!(pool.count(), 1);
}

#[test]
fn expired_objects_go_before_low_priority() {
    let (mut pools, clock) = registry();
    let log = ReleaseLog::default();
    let pool = pools
        .create_pool::<Shell>("expiry", &PoolSettings::default().with_expire_secs(50.0))
        .unwrap();

    let stale = Shell::new("stale", &log);
    let cheap = Shell::new("cheap", &log);
    pool.create_with(Arc::clone(&stale), EntryOptions::new().priority(5))
        .unwrap();
    clock.advance(Duration::from_secs(99));
    pool.create_with(Arc::clone(&cheap), EntryOptions::new().priority(1))
        .unwrap();
    clock.advance(Duration::from_secs(1));

    // One release requested: the expired, higher-priority entry takes it.
    assert_eq!(pool.release_evictable_count(1).unwrap(), 1);
    assert_eq!(released_names(&log), vec!["stale".to_string()]);
    assert!(pool.can_get(Some("cheap")));
}

#[test]
fn lowest_priority_is_evicted_at_capacity() {
    let (mut pools, _) = registry();
    let log = ReleaseLog::default();
    let pool = pools
        .create_pool::<Shell>("ranked", &PoolSettings::default().with_capacity(2))
        .unwrap();

    // Same clock reading for all three, so only priority decides.
    for (name, priority) in [("p3", 3), ("p1", 1), ("p2", 2)] {
        pool.create_with(Shell::new(name, &log), EntryOptions::new().priority(priority))
            .unwrap();
    }

    assert_eq!(pool.count(), 2);
    assert_eq!(released_names(&log), vec!["p1".to_string()]);
    let mut priorities: Vec<_> = pool.snapshot().iter().map(|info| info.priority).collect();
    priorities.sort_unstable();
    assert_eq!(priorities, vec![2, 3]);
}

#[test]
fn capacity_is_soft_when_everything_is_held() {
    let (mut pools, _) = registry();
    let log = ReleaseLog::default();
    let pool = pools
        .create_pool::<Shell>("soft", &PoolSettings::default().with_capacity(3))
        .unwrap();

    let shells: Vec<_> = (0..4).map(|i| Shell::new(&format!("s{i}"), &log)).collect();
    for shell in &shells {
        pool.create(Arc::clone(shell), true).unwrap();
    }
    assert_eq!(pool.count(), 4);
    assert!(pool.info().is_over_capacity());
    assert!(log.lock().is_empty());

    // The first one given back is the one that goes.
    pool.recycle(&shells[2]).unwrap();
    assert_eq!(pool.count(), 3);
    assert_eq!(released_names(&log), vec!["s2".to_string()]);
}

#[test]
fn tick_releases_expired_objects_on_interval() {
    let (mut pools, clock) = registry();
    let log = ReleaseLog::default();
    let settings = PoolSettings::default()
        .with_expire_secs(10.0)
        .with_auto_release_interval_secs(1.0);
    let pool = pools.create_pool::<Shell>("ticking", &settings).unwrap();
    pool.create(Shell::new("old", &log), false).unwrap();
    clock.advance(Duration::from_secs(8));
    pool.create(Shell::new("young", &log), false).unwrap();
    clock.advance(Duration::from_secs(4));

    assert_eq!(pools.tick(Duration::ZERO, Duration::from_millis(500)).unwrap(), 0);
    assert_eq!(pools.tick(Duration::ZERO, Duration::from_millis(500)).unwrap(), 1);
    assert_eq!(released_names(&log), vec!["old".to_string()]);
}

// ============================================================================
// TEARDOWN
// ============================================================================

#[test]
fn destroying_a_pool_twice_releases_once() {
    let (mut pools, _) = registry();
    let log = ReleaseLog::default();
    let pool = pools.create_pool::<Shell>("doomed", &PoolSettings::default()).unwrap();
    pool.create(Shell::new("held", &log), true).unwrap();
    pool.create(Shell::new("idle", &log), false).unwrap();

    pools.destroy_pool::<Shell>("doomed").unwrap();
    assert!(matches!(
        pools.destroy_pool::<Shell>("doomed"),
        Err(PoolError::NotFound(_))
    ));
    drop(pools);

    let entries = log.lock().clone();
    assert_eq!(
        entries,
        vec![("held".to_string(), true), ("idle".to_string(), true)]
    );
}

#[test]
fn dropping_the_registry_shuts_every_pool_down() {
    let (mut pools, _) = registry();
    let log = ReleaseLog::default();
    pools
        .create_pool::<Shell>("late", &PoolSettings::default().with_priority(2))
        .unwrap()
        .create(Shell::new("late", &log), false)
        .unwrap();
    pools
        .create_pool::<Shell>("early", &PoolSettings::default().with_priority(1))
        .unwrap()
        .create(Shell::new("early", &log), true)
        .unwrap();

    drop(pools);
    assert_eq!(released_names(&log), vec!["early".to_string(), "late".to_string()]);
    assert!(log.lock().iter().all(|(_, is_shutdown)| *is_shutdown));
}

#[test]
fn standalone_pool_drop_releases_objects() {
    let memory = MemoryPoolRegistry::new(StrictCheck::Never);
    let log = ReleaseLog::default();
    {
        let mut pool = NamedObjectPool::<Shell>::new(
            "standalone",
            &PoolSettings::default(),
            &memory,
            Arc::new(ManualClock::default()),
        )
        .unwrap();
        pool.create(Shell::new("a", &log), false).unwrap();
    }
    assert_eq!(log.lock().clone(), vec![("a".to_string(), true)]);
}

// ============================================================================
// REGISTRY
// ============================================================================

#[test]
fn pools_are_keyed_by_type_and_name() {
    let (mut pools, _) = registry();
    pools.create_pool::<Shell>("fx", &PoolSettings::default()).unwrap();
    pools.create_pool::<Decal>("fx", &PoolSettings::default()).unwrap();

    assert_eq!(pools.pool_count(), 2);
    assert!(pools.contains_pool::<Shell>("fx"));
    assert!(pools.contains_pool::<Decal>("fx"));
    assert!(!pools.contains_pool::<Decal>("ui"));
    assert!(matches!(
        pools.create_pool::<Decal>("fx", &PoolSettings::default()),
        Err(PoolError::DuplicatePool(_))
    ));
    assert!(matches!(pools.pool::<Decal>("ui"), Err(PoolError::NotFound(_))));

    let decals = pools.pool_mut::<Decal>("fx").unwrap();
    decals.create(Arc::new(Decal), false).unwrap();
    assert!(decals.can_get(None));
    assert_eq!(pools.pool::<Shell>("fx").unwrap().count(), 0);
}

#[test]
fn release_all_unused_visits_pools_by_priority() {
    let (mut pools, _) = registry();
    let log = ReleaseLog::default();
    for (name, priority) in [("c", 30), ("a", 10), ("b", 20)] {
        pools
            .create_pool::<Shell>(name, &PoolSettings::default().with_priority(priority))
            .unwrap()
            .create(Shell::new(name, &log), false)
            .unwrap();
    }

    assert_eq!(pools.release_all_unused().unwrap(), 3);
    assert_eq!(
        released_names(&log),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
    assert!(log.lock().iter().all(|(_, is_shutdown)| !*is_shutdown));

    let infos = pools.pool_infos();
    let priorities: Vec<_> = infos.iter().map(|info| info.priority).collect();
    assert_eq!(priorities, vec![10, 20, 30]);
    assert!(infos.iter().all(|info| info.count == 0));
}

#[test]
fn configured_pools_pick_up_overrides() {
    let key = format!("{}.bullets", std::any::type_name::<Shell>());
    let source = format!(
        r#"
        strict_check = "always"

        [default_pool]
        capacity = 8

        [pools."{key}"]
        allow_multi_get = true
        capacity = 2
        priority = 4
        "#
    );
    let config = PoolSystemConfig::from_toml_str(&source).unwrap();
    let mut pools =
        ObjectPoolRegistry::from_config(config, Arc::new(ManualClock::default())).unwrap();
    assert!(pools.memory().is_strict() || !cfg!(feature = "strict_checks"));

    let bullets = pools.create_pool_from_config::<Shell>("bullets").unwrap();
    assert!(bullets.allow_multi_get());
    assert_eq!(bullets.capacity(), 2);
    assert_eq!(bullets.priority(), 4);

    let casings = pools.create_pool_from_config::<Shell>("casings").unwrap();
    assert!(!casings.allow_multi_get());
    assert_eq!(casings.capacity(), 8);
}
