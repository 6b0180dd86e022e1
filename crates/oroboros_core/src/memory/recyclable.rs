//! # Recyclable Contract
//!
//! What a type must provide to live in a [`TypeMemoryPool`](super::TypeMemoryPool).

/// A type whose instances can be parked in a memory pool and handed out again.
///
/// The pool calls [`on_release`](Recyclable::on_release) before an instance
/// goes back into the idle queue, so no instance is ever vended with the
/// previous user's state still attached.
///
/// The `Send + 'static` bound is the type-shape contract: pools are shared
/// across threads and keyed by `TypeId`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct HitEvent { target: u32, damage: u32 }
///
/// impl Recyclable for HitEvent {
///     fn on_release(&mut self) {
///         *self = Self::default();
///     }
/// }
/// ```
pub trait Recyclable: Send + 'static {
    /// Resets the instance before it is returned to the idle queue.
    fn on_release(&mut self);
}
