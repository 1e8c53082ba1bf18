//! RequestTracker: sliding-window request counting on top of DoubleHashTable.

use crate::error::TableError;
use crate::table::DoubleHashTable;
use log::trace;

/// Per-identity counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Repeats seen inside the current window; the opening request counts as 0.
    pub count: u64,
    /// Last tick still inside the window.
    pub expires_at: u64,
}

/// Counts repeated `(request, client)` pairs. Every call inside the window
/// bumps the count and pushes expiry to `now + max_time`; a call after expiry
/// starts over at zero.
#[derive(Debug, Clone)]
pub struct RequestTracker {
    max_time: u64,
    store: DoubleHashTable<Window>,
}

impl RequestTracker {
    pub fn new(max_time: u64) -> Self {
        Self {
            max_time,
            store: DoubleHashTable::new(),
        }
    }

    pub fn with_capacity(max_time: u64, capacity: usize) -> Self {
        Self {
            max_time,
            store: DoubleHashTable::with_capacity(capacity),
        }
    }

    pub fn max_time(&self) -> u64 {
        self.max_time
    }

    /// Record a request at tick `now` and return its count within the
    /// current window.
    ///
    /// The identity is `request_id` immediately followed by `client_id`, so
    /// it fails with `InvalidKey` only when both are empty.
    pub fn record(
        &mut self,
        now: u64,
        request_id: &str,
        client_id: &str,
    ) -> Result<u64, TableError> {
        let key = format!("{request_id}{client_id}");
        let expires_at = now.saturating_add(self.max_time);
        let window = match self.store.get(&key).copied() {
            Ok(seen) if now > seen.expires_at => {
                trace!("window for {key:?} lapsed at {}, resetting", seen.expires_at);
                let fresh = Window { count: 0, expires_at };
                self.store.update([(key, fresh)])?;
                fresh
            }
            Ok(seen) => {
                let next = Window {
                    count: seen.count.saturating_add(1),
                    expires_at,
                };
                self.store.update([(key, next)])?;
                next
            }
            Err(TableError::KeyNotFound(_)) => {
                trace!("opening window for {key:?} until {expires_at}");
                let fresh = Window { count: 0, expires_at };
                self.store.insert(key, fresh)?;
                fresh
            }
            Err(e) => return Err(e),
        };
        Ok(window.count)
    }

    /// Current window for an identity, if one has been opened.
    pub fn window(&self, request_id: &str, client_id: &str) -> Option<Window> {
        self.store.get(&format!("{request_id}{client_id}")).ok().copied()
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Forget every identity.
    pub fn clear(&mut self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: first call opens a window at zero; calls inside it count
    /// up; a call past expiry resets.
    #[test]
    fn sliding_window_scenario() {
        let mut t = RequestTracker::new(10);
        assert_eq!(t.record(0, "r", "c"), Ok(0));
        assert_eq!(t.record(5, "r", "c"), Ok(1));
        assert_eq!(t.window("r", "c").map(|w| w.expires_at), Some(15));
        assert_eq!(t.record(25, "r", "c"), Ok(0));
        assert_eq!(
            t.window("r", "c"),
            Some(Window {
                count: 0,
                expires_at: 35
            })
        );
        assert_eq!(t.len(), 1);
    }

    /// Invariant: expiry itself is still inside the window.
    #[test]
    fn call_at_exact_expiry_counts() {
        let mut t = RequestTracker::new(10);
        t.record(0, "r", "c").unwrap();
        assert_eq!(t.record(10, "r", "c"), Ok(1));
        assert_eq!(t.record(20, "r", "c"), Ok(2));
        assert_eq!(t.record(31, "r", "c"), Ok(0));
    }

    #[test]
    fn identities_are_counted_separately() {
        let mut t = RequestTracker::new(100);
        assert_eq!(t.record(1, "req", "alice"), Ok(0));
        assert_eq!(t.record(2, "req", "bob"), Ok(0));
        assert_eq!(t.record(3, "req", "alice"), Ok(1));
        assert_eq!(t.record(4, "other", "alice"), Ok(0));
        assert_eq!(t.len(), 3);
    }

    /// Invariant: the identity is plain concatenation, so splits of the same
    /// string share a counter.
    #[test]
    fn identity_is_concatenation() {
        let mut t = RequestTracker::new(10);
        t.record(0, "ab", "c").unwrap();
        assert_eq!(t.record(1, "a", "bc"), Ok(1));
        assert_eq!(t.record(2, "abc", ""), Ok(2));
    }

    #[test]
    fn empty_identity_is_rejected() {
        let mut t = RequestTracker::new(10);
        assert_eq!(t.record(0, "", ""), Err(TableError::InvalidKey));
        assert!(t.is_empty());
        assert_eq!(t.window("", ""), None);
    }

    #[test]
    fn clear_forgets_all_windows() {
        let mut t = RequestTracker::new(10);
        t.record(0, "r", "c").unwrap();
        t.record(1, "r", "c").unwrap();
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.record(2, "r", "c"), Ok(0));
    }

    #[test]
    fn expiry_saturates() {
        let mut t = RequestTracker::new(u64::MAX);
        t.record(5, "r", "c").unwrap();
        assert_eq!(t.window("r", "c").map(|w| w.expires_at), Some(u64::MAX));
        assert_eq!(t.record(u64::MAX, "r", "c"), Ok(1));
    }

    /// Invariant: repeated hits on one identity update in place and do not
    /// grow the store.
    #[test]
    fn repeats_do_not_inflate_store() {
        let mut t = RequestTracker::with_capacity(10, 8);
        for now in 0..100 {
            t.record(now, "r", "c").unwrap();
        }
        assert_eq!(t.len(), 1);
        assert_eq!(t.store.capacity(), 8);
        assert_eq!(t.max_time(), 10);
    }
}
