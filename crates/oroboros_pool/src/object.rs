//! # Poolable Objects
//!
//! The contract every object managed by a
//! [`NamedObjectPool`](crate::NamedObjectPool) implements, and the identity
//! the pool tracks it by.

/// An object whose lifetime is managed by a named object pool.
///
/// Objects are shared as `Arc<T>`: the pool keeps one reference for as long
/// as it tracks the object and hands clones to callers of `get`. Hooks take
/// `&self`; use interior mutability for state that changes on acquire or
/// recycle.
///
/// # Example
///
/// ```rust,ignore
/// struct ParticleBuffer {
///     name: String,
///     vertices: Mutex<Vec<Vertex>>,
/// }
///
/// impl PoolObject for ParticleBuffer {
///     fn name(&self) -> &str {
///         &self.name
///     }
///
///     fn on_recycle(&self) {
///         self.vertices.lock().clear();
///     }
///
///     fn release(&self, _is_shutdown: bool) {
///         // return GPU memory
///     }
/// }
/// ```
pub trait PoolObject: Send + Sync + 'static {
    /// Lookup name inside the pool. Objects sharing a name are
    /// interchangeable for `get`.
    fn name(&self) -> &str {
        ""
    }

    /// Called each time the object is handed out.
    fn on_acquire(&self) {}

    /// Called each time a holder gives the object back.
    fn on_recycle(&self) {}

    /// Extra veto on eviction. Queried on every eviction pass, never cached.
    fn custom_release_eligible(&self) -> bool {
        true
    }

    /// Frees whatever the object wraps. Called exactly once, when the pool
    /// stops tracking the object. `is_shutdown` is `true` when the whole
    /// pool is being torn down.
    fn release(&self, is_shutdown: bool);
}

/// Identity of a pooled object: the address of its shared allocation.
///
/// Stable for as long as the pool holds the object, since the pool keeps
/// the allocation alive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Returns the identity of `object`.
    ///
    /// Pass the pooled object itself (`&*arc`), not a copy.
    #[inline]
    #[must_use]
    pub fn of<T: PoolObject>(object: &T) -> Self {
        Self(object as *const T as usize)
    }

    /// Creates an identity from a raw value, for custom release filters
    /// and tests that key their own bookkeeping by identity.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_raw(self) -> usize {
        self.0
    }
}
