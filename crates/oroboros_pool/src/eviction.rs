//! # Eviction
//!
//! Choosing which idle objects a pool lets go of.
//!
//! A pass first gathers the candidates (idle, unlocked, not vetoed by the
//! object) and then asks a release filter which of them to drop. The
//! default filter:
//!
//! 1. drops every candidate whose last use is at or before the expiry
//!    threshold, whatever the requested count;
//! 2. fills the rest of the requested count with the remaining candidates
//!    in ascending `(priority, last use, creation order)`.
//!
//! Evicting fewer objects than requested is normal, not an error.

use std::time::Duration;

use crate::object::ObjectId;

/// Snapshot of one evictable entry, as seen by a release filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvictionCandidate {
    /// Identity of the tracked object.
    pub id: ObjectId,
    /// Entry priority. Lower numbers go first.
    pub priority: i32,
    /// Last time the object was acquired, recycled or created.
    pub last_use: Duration,
    /// Creation order inside the pool.
    pub sequence: u64,
}

impl EvictionCandidate {
    /// Total eviction order: priority, then oldest use, then oldest creation.
    #[inline]
    #[must_use]
    pub const fn order_key(&self) -> (i32, Duration, u64) {
        (self.priority, self.last_use, self.sequence)
    }
}

/// Release filter callback.
///
/// Receives the candidates in creation order (the filter may reorder or
/// drain them), the requested count, and the expiry threshold (`None` when
/// nothing can be expired). Pushes the identities to release into the last
/// argument. Identities that are not evictable are skipped by the pool.
pub type ReleaseFilter<'a> =
    dyn FnMut(&mut Vec<EvictionCandidate>, usize, Option<Duration>, &mut Vec<ObjectId>) + 'a;

/// The standard release filter: expired first, then lowest priority.
pub fn default_release_filter(
    candidates: &mut Vec<EvictionCandidate>,
    count: usize,
    expire_threshold: Option<Duration>,
    to_release: &mut Vec<ObjectId>,
) {
    let mut remaining = count;

    if let Some(threshold) = expire_threshold {
        let before = to_release.len();
        candidates.retain(|candidate| {
            if candidate.last_use <= threshold {
                to_release.push(candidate.id);
                false
            } else {
                true
            }
        });
        remaining = remaining.saturating_sub(to_release.len() - before);
    }

    if remaining == 0 || candidates.is_empty() {
        return;
    }

    if remaining < candidates.len() {
        candidates.select_nth_unstable_by_key(remaining - 1, EvictionCandidate::order_key);
        candidates.truncate(remaining);
    }
    candidates.sort_unstable_by_key(EvictionCandidate::order_key);
    to_release.extend(candidates.iter().map(|candidate| candidate.id));
}

/// Filter used by `release_all_unused`: every candidate goes.
pub(crate) fn release_all_candidates(
    candidates: &mut Vec<EvictionCandidate>,
    _count: usize,
    _expire_threshold: Option<Duration>,
    to_release: &mut Vec<ObjectId>,
) {
    to_release.extend(candidates.drain(..).map(|candidate| candidate.id));
}
