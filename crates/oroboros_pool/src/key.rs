//! # Pool Keys
//!
//! A pool is identified by the type it holds plus a name, so several pools
//! of the same type can coexist (`Bullet.player`, `Bullet.enemy`).

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// `(type, name)` identity of an object pool.
///
/// Renders as `"<type name>.<name>"`, or just the type name when the name
/// is empty. That rendering is also the key used for per-pool settings in
/// configuration files.
#[derive(Clone, Debug)]
pub struct PoolKey {
    type_id: TypeId,
    type_name: &'static str,
    name: String,
}

impl PoolKey {
    /// Key for a pool of `T` called `name`.
    #[must_use]
    pub fn of<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            name: name.into(),
        }
    }

    /// Runtime type of the pooled objects.
    #[inline]
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Full name of the pooled type.
    #[inline]
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Pool name. May be empty.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable ordering key for deterministic iteration over pools.
    pub(crate) fn sort_key(&self) -> (&'static str, &str) {
        (self.type_name, &self.name)
    }
}

impl PartialEq for PoolKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for PoolKey {}

impl Hash for PoolKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str(self.type_name)
        } else {
            write!(f, "{}.{}", self.type_name, self.name)
        }
    }
}
