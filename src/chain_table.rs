//! The core chained hash table.
//!
//! `ChainTable<T>` stores elements in a growable arena of slots and resolves
//! collisions with singly linked chains threaded through the arena by index.
//! A flat bucket table of prime length maps each hash to the head of its
//! chain. Removed slots are recycled through an intrusive free list that
//! reuses the same link field, so removal never shrinks or shuffles the
//! arena and slot indices stay stable until a clear or drain.
//!
//! The table itself never hashes anything: callers pass in a precomputed
//! `u64` hash and an equality closure, which is what lets the `HashMap` and
//! `HashSet` wrappers route all hashing through a single `BuildHasher`.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::prime::next_prime;

/// Sentinel index marking the end of a bucket chain or of the free list.
const NIL: usize = usize::MAX;

/// Capacity requested when none is specified. Rounds up to the prime 11.
pub(crate) const DEFAULT_CAPACITY: usize = 10;

/// One arena slot.
///
/// `next` does double duty: while the slot is occupied it links the bucket
/// chain, while the slot is vacant it links the free list. `hash` is only
/// meaningful while `data` is `Some`.
#[derive(Clone)]
struct Slot<T> {
    hash: u64,
    next: usize,
    data: Option<T>,
}

/// A chained hash table keyed by precomputed hashes and an equality closure.
///
/// The table owns every element it stores. Lookups walk the chain for
/// `hash % capacity`, comparing the cached hash before invoking the equality
/// closure, so unequal elements that merely collide are never confused.
///
/// Capacity is always a prime number. When an insert finds the free list
/// empty and the arena at capacity, the table grows to the next prime at
/// least twice the current population and restitches every occupied slot
/// into a fresh bucket table; elements are never moved within the arena.
///
/// # Examples
///
/// ```rust
/// use chain_hash::ChainTable;
///
/// let mut table: ChainTable<(u32, &str)> = ChainTable::with_capacity(10);
/// table.entry(7, |&(k, _)| k == 1).or_insert((1, "one"));
///
/// assert_eq!(table.find(7, |&(k, _)| k == 1), Some(&(1, "one")));
/// assert_eq!(table.find(7, |&(k, _)| k == 2), None);
/// ```
#[derive(Clone)]
pub struct ChainTable<T> {
    /// Chain heads, one per bucket; `NIL` marks an empty bucket.
    buckets: Vec<usize>,
    /// The slot arena. Grows at the tail, never shrinks.
    slots: Vec<Slot<T>>,
    /// Head of the free list of vacated slots, `NIL` if none.
    free_head: usize,
    free_len: usize,
    len: usize,
}

impl<T> Debug for ChainTable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChainTable")
            .field("len", &self.len)
            .field("capacity", &self.buckets.len())
            .field("arena_slots", &self.slots.len())
            .field("free_slots", &self.free_len)
            .finish_non_exhaustive()
    }
}

impl<T> ChainTable<T> {
    /// Creates a table with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a table that can hold at least `capacity` elements before
    /// resizing.
    ///
    /// The requested capacity is rounded up to the next prime, so the actual
    /// capacity may be slightly larger.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::ChainTable;
    ///
    /// let table: ChainTable<u64> = ChainTable::with_capacity(10);
    /// assert_eq!(table.capacity(), 11);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = next_prime(capacity.max(1));
        ChainTable {
            buckets: vec![NIL; capacity],
            slots: Vec::with_capacity(capacity),
            free_head: NIL,
            free_len: 0,
            len: 0,
        }
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the table can hold before resizing.
    ///
    /// Always prime; equal to the current bucket count.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Removes all elements, keeping the bucket table and arena allocation.
    pub fn clear(&mut self) {
        self.slots.clear();
        for head in &mut self.buckets {
            *head = NIL;
        }
        self.free_head = NIL;
        self.free_len = 0;
        self.len = 0;
    }

    /// Ensures the table can hold at least `additional` more elements
    /// without resizing, rebuilding the bucket table now if it cannot.
    pub fn reserve(&mut self, additional: usize) {
        let required = self.len + additional;
        if required > self.buckets.len() {
            self.rebuild(next_prime(required));
        }
    }

    /// Returns a reference to the element matching `hash` and `eq`, if any.
    ///
    /// A miss is a normal `None`, never an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::ChainTable;
    ///
    /// let mut table: ChainTable<u64> = ChainTable::new();
    /// table.entry(3, |&v| v == 30).or_insert(30);
    ///
    /// assert_eq!(table.find(3, |&v| v == 30), Some(&30));
    /// assert_eq!(table.find(3, |&v| v == 31), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<&T> {
        let mut cursor = self.buckets[self.bucket_of(hash)];
        while cursor != NIL {
            let slot = &self.slots[cursor];
            if slot.hash == hash && slot.data.as_ref().is_some_and(&eq) {
                return slot.data.as_ref();
            }
            cursor = slot.next;
        }
        None
    }

    /// Returns a mutable reference to the element matching `hash` and `eq`,
    /// if any.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<&mut T> {
        let mut cursor = self.buckets[self.bucket_of(hash)];
        while cursor != NIL {
            let matched = {
                let slot = &self.slots[cursor];
                if slot.hash == hash && slot.data.as_ref().is_some_and(&eq) {
                    true
                } else {
                    cursor = slot.next;
                    false
                }
            };
            if matched {
                return self.slots[cursor].data.as_mut();
            }
        }
        None
    }

    /// Removes and returns the element matching `hash` and `eq`, if any.
    ///
    /// The vacated slot is pushed onto the free list and will be reused by a
    /// later insert before the arena grows again.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::ChainTable;
    ///
    /// let mut table: ChainTable<u64> = ChainTable::new();
    /// table.entry(9, |&v| v == 90).or_insert(90);
    ///
    /// assert_eq!(table.remove(9, |&v| v == 90), Some(90));
    /// assert_eq!(table.remove(9, |&v| v == 90), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Option<T> {
        let bucket = self.bucket_of(hash);
        let mut prev = NIL;
        let mut cursor = self.buckets[bucket];
        while cursor != NIL {
            let slot = &self.slots[cursor];
            if slot.hash == hash && slot.data.as_ref().is_some_and(&eq) {
                return self.unlink(bucket, prev, cursor);
            }
            prev = cursor;
            cursor = slot.next;
        }
        None
    }

    /// Looks up the chain for `hash`, returning an [`Entry`] that is either
    /// occupied by the element matching `eq` or vacant.
    ///
    /// Inserting through the vacant entry may trigger a resize; the target
    /// bucket is recomputed against the post-resize capacity before linking.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chain_hash::ChainTable;
    /// use chain_hash::chain_table::Entry;
    ///
    /// let mut table: ChainTable<(u32, u32)> = ChainTable::new();
    ///
    /// match table.entry(5, |&(k, _)| k == 5) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert((5, 50));
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// assert!(matches!(table.entry(5, |&(k, _)| k == 5), Entry::Occupied(_)));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&T) -> bool) -> Entry<'_, T> {
        let bucket = self.bucket_of(hash);
        let mut prev = NIL;
        let mut cursor = self.buckets[bucket];
        while cursor != NIL {
            let slot = &self.slots[cursor];
            if slot.hash == hash && slot.data.as_ref().is_some_and(&eq) {
                return Entry::Occupied(OccupiedEntry {
                    table: self,
                    bucket,
                    prev,
                    index: cursor,
                });
            }
            prev = cursor;
            cursor = slot.next;
        }
        Entry::Vacant(VacantEntry { table: self, hash })
    }

    /// Returns an iterator over the elements of the table, in arbitrary
    /// order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.slots.iter(),
        }
    }

    /// Returns an iterator that removes and yields every element.
    ///
    /// The table is empty afterwards, even if the iterator is dropped
    /// part-way.
    pub fn drain(&mut self) -> Drain<'_, T> {
        for head in &mut self.buckets {
            *head = NIL;
        }
        self.free_head = NIL;
        self.free_len = 0;
        self.len = 0;
        Drain {
            slots: self.slots.drain(..),
        }
    }

    #[inline(always)]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// Allocates a slot for `value` and prepends it to its bucket chain.
    ///
    /// The caller must already have walked the chain and established that no
    /// equal element is present.
    fn insert_unchecked(&mut self, hash: u64, value: T) -> usize {
        let index = if self.free_head != NIL {
            let index = self.free_head;
            self.free_head = self.slots[index].next;
            self.free_len -= 1;
            let slot = &mut self.slots[index];
            slot.hash = hash;
            slot.data = Some(value);
            index
        } else {
            if self.slots.len() == self.buckets.len() {
                self.grow();
            }
            let index = self.slots.len();
            self.slots.push(Slot {
                hash,
                next: NIL,
                data: Some(value),
            });
            index
        };

        // Recomputed after any grow above; the old bucket index is stale.
        let bucket = self.bucket_of(hash);
        self.slots[index].next = self.buckets[bucket];
        self.buckets[bucket] = index;
        self.len += 1;
        index
    }

    /// Detaches the slot at `index` from its chain and pushes it onto the
    /// free list, returning the element it held.
    ///
    /// `prev` is the predecessor in the chain, or `NIL` when the slot is the
    /// chain head.
    fn unlink(&mut self, bucket: usize, prev: usize, index: usize) -> Option<T> {
        let value = self.slots[index].data.take()?;
        let next = self.slots[index].next;
        if prev == NIL {
            self.buckets[bucket] = next;
        } else {
            self.slots[prev].next = next;
        }

        let slot = &mut self.slots[index];
        slot.next = self.free_head;
        self.free_head = index;
        self.free_len += 1;
        self.len -= 1;
        Some(value)
    }

    fn grow(&mut self) {
        self.rebuild(next_prime(self.len * 2));
    }

    /// Replaces the bucket table with one of `new_capacity` buckets and
    /// restitches every occupied slot into it by its cached hash.
    ///
    /// Vacant slots are skipped, which leaves their free-list threading
    /// intact. No element is moved within the arena.
    fn rebuild(&mut self, new_capacity: usize) {
        let mut buckets = vec![NIL; new_capacity];
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.data.is_none() {
                continue;
            }
            let bucket = (slot.hash % new_capacity as u64) as usize;
            slot.next = buckets[bucket];
            buckets[bucket] = index;
        }
        self.buckets = buckets;
        self.slots
            .reserve(new_capacity.saturating_sub(self.slots.len()));
    }
}

#[cfg(any(test, feature = "stats"))]
impl<T> ChainTable<T> {
    /// Returns the number of arena slots currently allocated, occupied or
    /// not.
    ///
    /// Available in tests or with the `stats` feature.
    pub fn arena_slots(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of vacated slots waiting on the free list.
    ///
    /// Available in tests or with the `stats` feature.
    pub fn free_slots(&self) -> usize {
        self.free_len
    }

    /// Computes a histogram of chain lengths over the current bucket table.
    ///
    /// `histogram[n]` is the number of buckets whose chain holds exactly `n`
    /// elements. Available in tests or with the `stats` feature.
    pub fn chain_histogram(&self) -> Vec<usize> {
        let mut histogram = Vec::new();
        for &head in &self.buckets {
            let mut length = 0;
            let mut cursor = head;
            while cursor != NIL {
                length += 1;
                cursor = self.slots[cursor].next;
            }
            if histogram.len() <= length {
                histogram.resize(length + 1, 0);
            }
            histogram[length] += 1;
        }
        histogram
    }
}

#[cfg(test)]
impl<T> ChainTable<T> {
    /// Walks every chain and the free list, asserting the structural
    /// invariants: counts match, every slot is reachable exactly once, no
    /// vacant slot is chained, and every chained slot sits in the bucket its
    /// hash selects.
    fn check_invariants(&self) {
        let mut seen = vec![false; self.slots.len()];

        let mut reachable = 0;
        for (bucket, &head) in self.buckets.iter().enumerate() {
            let mut cursor = head;
            while cursor != NIL {
                assert!(cursor < self.slots.len(), "chain link out of bounds");
                assert!(!seen[cursor], "slot {cursor} linked twice");
                seen[cursor] = true;

                let slot = &self.slots[cursor];
                assert!(slot.data.is_some(), "vacant slot {cursor} in a chain");
                assert_eq!(
                    self.bucket_of(slot.hash),
                    bucket,
                    "slot {cursor} chained under the wrong bucket"
                );
                reachable += 1;
                cursor = slot.next;
            }
        }
        assert_eq!(reachable, self.len, "len out of sync with chains");

        let mut free = 0;
        let mut cursor = self.free_head;
        while cursor != NIL {
            assert!(cursor < self.slots.len(), "free link out of bounds");
            assert!(!seen[cursor], "slot {cursor} on free list and a chain");
            seen[cursor] = true;
            assert!(
                self.slots[cursor].data.is_none(),
                "occupied slot {cursor} on the free list"
            );
            free += 1;
            cursor = self.slots[cursor].next;
        }
        assert_eq!(free, self.free_len, "free_len out of sync with free list");
        assert!(seen.iter().all(|&reached| reached), "orphaned arena slot");
    }
}

impl<T> Default for ChainTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A view into a single chain position, which may be vacant or occupied.
///
/// Constructed by [`ChainTable::entry`].
pub enum Entry<'a, T> {
    /// No element matched; holds the hash the walk was keyed by.
    Vacant(VacantEntry<'a, T>),
    /// An element matched the hash and equality closure.
    Occupied(OccupiedEntry<'a, T>),
}

impl<'a, T> Entry<'a, T> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the element.
    pub fn or_insert(self, default: T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the closure's value if the entry is vacant and returns a
    /// mutable reference to the element.
    pub fn or_insert_with(self, default: impl FnOnce() -> T) -> &'a mut T {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to the element if the entry is occupied, returning the
    /// mutable reference, or `None` if the entry was vacant.
    pub fn and_modify(self, f: impl FnOnce(&mut T)) -> Option<&'a mut T> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }
}

impl<'a, T> Entry<'a, T>
where
    T: Default,
{
    /// Inserts `T::default()` if the entry is vacant and returns a mutable
    /// reference to the element.
    pub fn or_default(self) -> &'a mut T {
        self.or_insert_with(T::default)
    }
}

/// A vacant chain position; inserting through it links a new slot at the
/// head of the target bucket's chain.
pub struct VacantEntry<'a, T> {
    table: &'a mut ChainTable<T>,
    hash: u64,
}

impl<'a, T> VacantEntry<'a, T> {
    /// Inserts `value` and returns a mutable reference to it.
    ///
    /// Allocation draws from the free list first, then the arena tail,
    /// growing the table if the arena is at capacity.
    pub fn insert(self, value: T) -> &'a mut T {
        let index = self.table.insert_unchecked(self.hash, value);
        match self.table.slots[index].data.as_mut() {
            Some(value) => value,
            None => unreachable!(),
        }
    }
}

/// An occupied chain position. Holds the slot's index and its predecessor
/// in the chain, so removal needs no second walk.
pub struct OccupiedEntry<'a, T> {
    table: &'a mut ChainTable<T>,
    bucket: usize,
    prev: usize,
    index: usize,
}

impl<'a, T> OccupiedEntry<'a, T> {
    /// Returns a reference to the element.
    pub fn get(&self) -> &T {
        match self.table.slots[self.index].data.as_ref() {
            Some(value) => value,
            None => unreachable!(),
        }
    }

    /// Returns a mutable reference to the element.
    pub fn get_mut(&mut self) -> &mut T {
        match self.table.slots[self.index].data.as_mut() {
            Some(value) => value,
            None => unreachable!(),
        }
    }

    /// Consumes the entry, returning a mutable reference tied to the table.
    pub fn into_mut(self) -> &'a mut T {
        match self.table.slots[self.index].data.as_mut() {
            Some(value) => value,
            None => unreachable!(),
        }
    }

    /// Removes the element, unlinking the slot from its chain and recycling
    /// it through the free list.
    pub fn remove(self) -> T {
        let OccupiedEntry {
            table,
            bucket,
            prev,
            index,
        } = self;
        match table.unlink(bucket, prev, index) {
            Some(value) => value,
            None => unreachable!(),
        }
    }
}

/// An iterator over the elements of a `ChainTable`.
///
/// Scans the arena in slot order, skipping vacant slots; the order has no
/// relation to insertion order.
pub struct Iter<'a, T> {
    slots: core::slice::Iter<'a, Slot<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let slot = self.slots.next()?;
            if let Some(value) = slot.data.as_ref() {
                return Some(value);
            }
        }
    }
}

/// A draining iterator over the elements of a `ChainTable`.
pub struct Drain<'a, T> {
    slots: alloc::vec::Drain<'a, Slot<T>>,
}

impl<'a, T> Iterator for Drain<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let slot = self.slots.next()?;
            if let Some(value) = slot.data {
                return Some(value);
            }
        }
    }
}
