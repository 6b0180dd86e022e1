//! # Pool Diagnostics
//!
//! Read-only snapshots for debug overlays, logs and resource-pressure
//! handlers. Both record types serialize, so they can be dumped as-is.

use std::time::Duration;

use serde::Serialize;

/// State of one tracked object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolObjectInfo {
    /// Object name.
    pub name: String,
    /// Excluded from eviction by the pool user.
    pub locked: bool,
    /// The object's own eviction veto, queried when the snapshot was taken.
    pub custom_release_eligible: bool,
    /// Entry priority.
    pub priority: i32,
    /// Last acquire, recycle or creation time, on the pool clock.
    pub last_use: Duration,
    /// Number of current holders.
    pub in_use: u32,
}

impl PoolObjectInfo {
    /// `true` if nobody holds the object.
    #[inline]
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.in_use == 0
    }
}

/// Summary of one pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolInfo {
    /// Rendered pool key (`"<type>.<name>"`).
    pub key: String,
    /// Tracked objects.
    pub count: usize,
    /// Tracked objects an eviction pass could release right now.
    pub releasable: usize,
    /// Soft capacity; `usize::MAX` when unbounded.
    pub capacity: usize,
    /// Idle time after which objects expire.
    pub expire_time: Option<Duration>,
    /// Interval of the periodic eviction pass.
    pub auto_release_interval: Option<Duration>,
    /// Pool priority; bulk operations visit lower numbers first.
    pub priority: i32,
    /// Whether one object may be held by several callers.
    pub allow_multi_get: bool,
}

impl PoolInfo {
    /// `true` if the pool tracks more objects than its capacity.
    #[inline]
    #[must_use]
    pub const fn is_over_capacity(&self) -> bool {
        self.count > self.capacity
    }
}
