//! DoubleHashTable: open addressing over a flat slot array, double hashing,
//! tombstone deletion and doubling growth.

use crate::error::TableError;
use crate::hash;
use crate::primes::{largest_prime_index, PRIMES};
use crate::slot::Slot;
use core::fmt;
use log::debug;

/// Slot count used by [`DoubleHashTable::new`].
pub const DEFAULT_CAPACITY: usize = 8;

/// String-keyed table storing every entry directly in its slot array.
///
/// Collisions are resolved by double hashing: attempt `i` for a key probes
/// `(h1 + i * h2) mod capacity`. Removal leaves a tombstone so that probe
/// chains running through the removed slot stay intact. The table doubles
/// once `len() >= capacity() / 2` and never shrinks.
///
/// Equality is structural: two tables compare equal only when capacity,
/// `len()` and every slot (including empty and tombstoned ones) match. The
/// same logical contents reached through different insertion histories can
/// therefore compare unequal.
#[derive(Debug, Clone)]
pub struct DoubleHashTable<V> {
    slots: Vec<Slot<V>>,
    size: usize,
    prime_index: usize,
}

/// Bounded double-hashing probe sequence for one key.
struct Probe {
    next: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl Iterator for Probe {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let at = self.next;
        self.next = (self.next + self.step) % self.capacity;
        Some(at)
    }
}

fn empty_slots<V>(capacity: usize) -> Vec<Slot<V>> {
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, Slot::default);
    slots
}

impl<V> DoubleHashTable<V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a table with `capacity` slots. A capacity of zero is raised to
    /// one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: empty_slots(capacity),
            size: 0,
            prime_index: largest_prime_index(capacity, 0),
        }
    }

    /// Number of entries as counted by insert and remove.
    ///
    /// Re-inserting a key that is already present overwrites it in place but
    /// still counts as an insert; the count is recompacted to the number of
    /// live entries at the next growth.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn probe(&self, acc: u64) -> Probe {
        let capacity = self.capacity();
        Probe {
            next: hash::home_from(acc, capacity),
            step: hash::step_from(acc, PRIMES[self.prime_index]) % capacity,
            capacity,
            remaining: capacity,
        }
    }

    /// Lookup-mode probe: stops at an empty slot or the matching key and
    /// walks past tombstones.
    fn find_index(&self, key: &str) -> Result<Option<usize>, TableError> {
        let acc = hash::accumulate(key)?;
        for at in self.probe(acc) {
            match &self.slots[at] {
                Slot::Empty => return Ok(None),
                slot if slot.holds(key) => return Ok(Some(at)),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Insert-mode probe: the slot already holding `key`, else the first
    /// tombstone on the chain, else the empty slot that ends it. `None` when
    /// the bounded probe finds neither.
    fn insert_index(&self, key: &str, acc: u64) -> Option<usize> {
        let mut reusable = None;
        for at in self.probe(acc) {
            match &self.slots[at] {
                Slot::Empty => return Some(reusable.unwrap_or(at)),
                Slot::Tombstone => {
                    reusable.get_or_insert(at);
                }
                slot if slot.holds(key) => return Some(at),
                Slot::Occupied { .. } => {}
            }
        }
        reusable
    }

    // `key` must be non-empty.
    fn place(&mut self, key: String, value: V) {
        let acc = hash::fold(&key);
        let at = loop {
            match self.insert_index(&key, acc) {
                Some(at) => break at,
                None => self.grow(),
            }
        };
        self.slots[at] = Slot::Occupied { key, value };
        self.size += 1;
        if self.size >= self.capacity() / 2 {
            self.grow();
        }
    }

    fn grow(&mut self) {
        let capacity = self.capacity() * 2;
        self.prime_index = largest_prime_index(capacity, self.prime_index);
        let old = std::mem::replace(&mut self.slots, empty_slots(capacity));
        self.size = 0;
        debug!(
            "growing table from {} to {} slots, rehashing {} live entries",
            old.len(),
            capacity,
            old.iter().filter(|s| matches!(s, Slot::Occupied { .. })).count()
        );
        for slot in old {
            if let Slot::Occupied { key, value } = slot {
                self.place(key, value);
            }
        }
    }

    /// Store `value` under `key`, overwriting any value already there.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: V) -> Result<(), TableError> {
        let key = key.into();
        if key.is_empty() {
            return Err(TableError::InvalidKey);
        }
        self.place(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&V, TableError> {
        match self.find_index(key)?.map(|at| &self.slots[at]) {
            Some(Slot::Occupied { value, .. }) => Ok(value),
            _ => Err(TableError::KeyNotFound(key.to_string())),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        matches!(self.find_index(key), Ok(Some(_)))
    }

    /// Tombstone the slot holding `key` and return its value.
    pub fn remove(&mut self, key: &str) -> Result<V, TableError> {
        let buried = match self.find_index(key)? {
            Some(at) => self.slots[at].bury(),
            None => None,
        };
        match buried {
            Some((_, value)) => {
                debug_assert!(self.size > 0);
                self.size -= 1;
                Ok(value)
            }
            None => Err(TableError::KeyNotFound(key.to_string())),
        }
    }

    /// Apply `pairs` in order. Keys already present have their value
    /// replaced in place without touching `len()`; other keys go through a
    /// full insert. Stops at the first empty key, keeping earlier pairs.
    pub fn update<I, K>(&mut self, pairs: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        for (key, value) in pairs {
            let key = key.into();
            match self.find_index(&key)? {
                Some(at) => {
                    if let Slot::Occupied { value: slot_value, .. } = &mut self.slots[at] {
                        *slot_value = value;
                    }
                }
                None => self.place(key, value),
            }
        }
        Ok(())
    }

    /// Drop every entry, keeping the current capacity.
    pub fn clear(&mut self) {
        self.slots = empty_slots(self.capacity());
        self.size = 0;
    }

    /// Live entries in slot order. The order shifts whenever the table grows.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }
}

impl<V> Default for DoubleHashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for DoubleHashTable<V> {
    fn eq(&self, other: &Self) -> bool {
        self.capacity() == other.capacity() && self.size == other.size && self.slots == other.slots
    }
}

impl<V: Eq> Eq for DoubleHashTable<V> {}

impl<V: fmt::Display> fmt::Display for DoubleHashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (at, slot) in self.slots.iter().enumerate() {
            match slot {
                Slot::Empty => writeln!(f, "[{at}]: <empty>")?,
                Slot::Tombstone => writeln!(f, "[{at}]: <tombstone>")?,
                Slot::Occupied { key, value } => writeln!(f, "[{at}]: {key} -> {value}")?,
            }
        }
        Ok(())
    }
}

/// Iterator over live `(key, value)` pairs of a `DoubleHashTable`.
pub struct Iter<'a, V> {
    it: core::slice::Iter<'a, Slot<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.by_ref().find_map(|slot| slot.entry())
    }
}

pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<'a, V> IntoIterator for &'a DoubleHashTable<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
