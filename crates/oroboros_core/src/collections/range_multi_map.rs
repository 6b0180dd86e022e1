//! # Range Multi-Map
//!
//! One key to an ordered sequence of values, without a `Vec` per key.
//!
//! Every value of every key lives in one shared [`RecyclableList`]. A key owns
//! a contiguous span of that list, closed by a terminator node whose value is
//! a meaningless placeholder:
//!
//! ```text
//!   list:   [a1][a2][a3][ T ][b1][ T ][c1][c2][ T ]
//!            └─── key A ──┘   └ key B┘  └─ key C ─┘
//!   map:    A -> (a1, T)   B -> (b1, T)   C -> (c1, T)
//! ```
//!
//! New values for an existing key are inserted right before its terminator,
//! so a key's terminator never changes identity and values keep insertion
//! order. Removal never allocates; freed nodes go back to the list's cache.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use super::node::NodeRef;
use super::recyclable_list::RecyclableList;
use crate::error::{PoolError, PoolResult};

/// A half-open span `[first, terminator)` of live nodes owned by one key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    first: NodeRef,
    terminator: NodeRef,
}

impl Range {
    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidArgument`] if `first == terminator`.
    pub fn new(first: NodeRef, terminator: NodeRef) -> PoolResult<Self> {
        if first == terminator {
            return Err(PoolError::InvalidArgument(
                "range is invalid: first node equals terminator".to_string(),
            ));
        }
        Ok(Self { first, terminator })
    }

    /// Returns the first value node of the range.
    #[inline]
    #[must_use]
    pub const fn first(self) -> NodeRef {
        self.first
    }

    /// Returns the terminator node closing the range.
    #[inline]
    #[must_use]
    pub const fn terminator(self) -> NodeRef {
        self.terminator
    }
}

/// Multi-value map storing each key's values as a range of a shared list.
///
/// # Thread Safety
///
/// NOT thread-safe; single owner.
#[derive(Debug)]
pub struct RangeMultiMap<K, V> {
    list: RecyclableList<V>,
    ranges: HashMap<K, Range>,
}

impl<K, V> RangeMultiMap<K, V>
where
    K: Eq + Hash,
    V: Default,
{
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            list: RecyclableList::new(),
            ranges: HashMap::new(),
        }
    }

    /// Creates an empty map with room for `keys` keys and `values` values
    /// before anything has to grow.
    #[must_use]
    pub fn with_capacity(keys: usize, values: usize) -> Self {
        Self {
            list: RecyclableList::with_capacity(keys + values),
            ranges: HashMap::with_capacity(keys),
        }
    }

    /// Returns the number of keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns `true` if the map has no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Returns the total number of values across all keys.
    #[inline]
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.list.len() - self.ranges.len()
    }

    /// Returns the shared backing list.
    #[inline]
    #[must_use]
    pub const fn list(&self) -> &RecyclableList<V> {
        &self.list
    }

    /// Returns `true` if `key` has at least one value.
    #[inline]
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ranges.contains_key(key)
    }

    /// Returns the range of `key`, if present.
    #[inline]
    #[must_use]
    pub fn range<Q>(&self, key: &Q) -> Option<Range>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ranges.get(key).copied()
    }

    /// Iterates over the values of `key` in insertion order. Empty if the key
    /// is absent.
    pub fn values<Q>(&self, key: &Q) -> RangeIter<'_, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.range(key) {
            Some(range) => self.range_iter(range),
            None => RangeIter {
                list: &self.list,
                cursor: None,
                terminator: None,
            },
        }
    }

    /// Iterates over the values of a range previously returned by this map.
    #[inline]
    pub fn range_iter(&self, range: Range) -> RangeIter<'_, V> {
        RangeIter {
            list: &self.list,
            cursor: Some(range.first),
            terminator: Some(range.terminator),
        }
    }

    /// Returns the number of values in a range.
    #[inline]
    #[must_use]
    pub fn range_len(&self, range: Range) -> usize {
        self.range_iter(range).count()
    }

    /// Iterates over `(key, range)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, Range)> + '_ {
        self.ranges.iter().map(|(key, range)| (key, *range))
    }

    /// Adds `value` at the end of `key`'s range, creating the key if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::StateError`] if the stored range no longer
    /// matches the backing list (internal corruption).
    pub fn add(&mut self, key: K, value: V) -> PoolResult<()> {
        if let Some(range) = self.ranges.get(&key) {
            self.list.add_before(range.terminator, value)?;
            return Ok(());
        }

        let first = self.list.add_last(value);
        let terminator = self.list.add_last(V::default());
        self.ranges.insert(key, Range::new(first, terminator)?);
        Ok(())
    }

    /// Like [`add`](Self::add), but takes a borrowed key and only builds the
    /// owned key when `key` is new. Adding to an existing key never
    /// allocates once the node cache is warm.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::StateError`] if the stored range no longer
    /// matches the backing list (internal corruption).
    pub fn add_borrowed<Q>(&mut self, key: &Q, value: V) -> PoolResult<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        if let Some(range) = self.ranges.get(key).copied() {
            self.list.add_before(range.terminator, value)?;
            return Ok(());
        }
        self.add(key.to_owned(), value)
    }

    /// Removes every value of `key` together with its terminator.
    ///
    /// Returns `Ok(true)` if the key existed.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::StateError`] if the range is broken (internal
    /// corruption).
    pub fn remove_all<Q>(&mut self, key: &Q) -> PoolResult<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(range) = self.ranges.remove(key) else {
            return Ok(false);
        };

        let mut current = range.first;
        loop {
            let next = self.list.next(current);
            self.list.remove(current)?;
            if current == range.terminator {
                return Ok(true);
            }
            current = next.ok_or_else(|| {
                PoolError::StateError("range ended before its terminator".to_string())
            })?;
        }
    }

    /// Removes every key and value. Nodes stay cached for reuse.
    pub fn clear(&mut self) {
        self.ranges.clear();
        self.list.clear();
    }
}

impl<K, V> RangeMultiMap<K, V>
where
    K: Eq + Hash,
    V: Default + PartialEq,
{
    /// Returns `true` if `key` holds a value equal to `value`.
    #[must_use]
    pub fn contains_value<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.values(key).any(|candidate| candidate == value)
    }

    /// Removes the first value of `key` equal to `value` (scanning from the
    /// front of the range). Removing a key's last value removes the key.
    ///
    /// Returns `Ok(true)` if a value was removed.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::StateError`] if the range is broken (internal
    /// corruption).
    pub fn remove<Q>(&mut self, key: &Q, value: &V) -> PoolResult<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(range) = self.range(key) else {
            return Ok(false);
        };

        let mut cursor = Some(range.first);
        while let Some(node) = cursor {
            if node == range.terminator {
                break;
            }
            let next = self.list.next(node);
            if self.list.get(node) != Some(value) {
                cursor = next;
                continue;
            }

            if node == range.first {
                match next {
                    Some(next) if next == range.terminator => {
                        self.list.remove(next)?;
                        self.ranges.remove(key);
                    }
                    Some(next) => {
                        if let Some(stored) = self.ranges.get_mut(key) {
                            stored.first = next;
                        }
                    }
                    None => {
                        return Err(PoolError::StateError(
                            "range ended before its terminator".to_string(),
                        ))
                    }
                }
            }
            self.list.remove(node)?;
            return Ok(true);
        }

        Ok(false)
    }
}

impl<K, V> Default for RangeMultiMap<K, V>
where
    K: Eq + Hash,
    V: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the values of one [`Range`].
#[derive(Debug)]
pub struct RangeIter<'a, V> {
    list: &'a RecyclableList<V>,
    cursor: Option<NodeRef>,
    terminator: Option<NodeRef>,
}

impl<'a, V: Default> Iterator for RangeIter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cursor?;
        if Some(node) == self.terminator {
            self.cursor = None;
            return None;
        }
        self.cursor = self.list.next(node);
        self.list.get(node)
    }
}
