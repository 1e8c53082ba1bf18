//! double-hash-table: a string-keyed, open-addressing hash table with double
//! hashing and tombstone deletion, plus a sliding-window request counter
//! built on it.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the probing rules small enough to reason about slot by slot.
//! - Layers:
//!   - `hash` and `primes`: the rolling string hash and the prime table that
//!     sizes the secondary step.
//!   - `Slot`: a three-state cell (empty, occupied, tombstone).
//!   - `DoubleHashTable<V>`: the slot array, probing, growth and iteration.
//!   - `RequestTracker`: per-identity `(count, expiry)` windows stored in a
//!     `DoubleHashTable<Window>`.
//!
//! Constraints
//! - Single-threaded: mutation takes `&mut self`; callers who share a table
//!   across threads wrap it in their own lock.
//! - Keys are non-empty `String`s; the empty key is rejected with
//!   `TableError::InvalidKey`.
//! - Load factor one half: the table doubles once `len() >= capacity() / 2`
//!   and never shrinks.
//!
//! Probing
//! - Attempt `i` for a key visits `(h1 + i * h2) mod capacity`, where `h1`
//!   is the rolling hash modulo capacity and `h2` is an odd step derived from
//!   the largest tabulated prime not above capacity.
//! - Lookups stop at an empty slot or the matching key and walk past
//!   tombstones. Inserts take the matching key's slot if it is on the chain,
//!   otherwise the first tombstone, otherwise the terminating empty slot.
//! - Probes are bounded to `capacity` attempts. When an insert finds no usable
//!   slot in that many attempts (possible when the step shares a factor with
//!   the capacity) the table grows and retries.
//!
//! Hash width
//! - The rolling hash accumulates in `u64` with wrapping arithmetic over
//!   Unicode scalar values, so slot layout is identical on every platform.
//!
//! Counting semantics
//! - `insert` on a key that is already present overwrites the value and still
//!   increments `len()`; the next growth recompacts `len()` to the number of
//!   live entries. `update` on an existing key never touches `len()`.
//!
//! Equality
//! - `DoubleHashTable` equality is structural (capacity, `len()` and every
//!   slot), so equal contents with different histories may compare unequal.
//!
//! Notes and non-goals
//! - No persistence, no shrinking, no non-string keys.
//! - No `get_mut`; values change through `insert` or `update`.

mod error;
pub mod hash;
pub mod primes;
mod slot;
mod table;
mod table_proptest;
mod tracker;

// Public surface
pub use error::TableError;
pub use table::{DoubleHashTable, Iter, Keys, Values, DEFAULT_CAPACITY};
pub use tracker::{RequestTracker, Window};
