//! A single cell of the table's backing array.

/// Each cell is in exactly one of three states. Probing treats `Empty` as the
/// end of a chain; `Tombstone` keeps a chain intact after a removal and is
/// free for reuse by inserts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Slot<V> {
    #[default]
    Empty,
    Occupied {
        key: String,
        value: V,
    },
    Tombstone,
}

impl<V> Slot<V> {
    #[inline]
    pub(crate) fn holds(&self, k: &str) -> bool {
        matches!(self, Slot::Occupied { key, .. } if key == k)
    }

    #[inline]
    pub(crate) fn entry(&self) -> Option<(&str, &V)> {
        match self {
            Slot::Occupied { key, value } => Some((key.as_str(), value)),
            _ => None,
        }
    }

    /// Replace the cell with a tombstone and hand back what it held.
    pub(crate) fn bury(&mut self) -> Option<(String, V)> {
        match std::mem::replace(self, Slot::Tombstone) {
            Slot::Occupied { key, value } => Some((key, value)),
            other => {
                *self = other;
                None
            }
        }
    }
}
