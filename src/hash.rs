//! The two string hashes behind the probe sequence.
//!
//! Both start from the same polynomial accumulator,
//! `acc = acc * 181 + codepoint`, computed with `u64` wrapping arithmetic so
//! values are identical on every platform.

use crate::error::TableError;

const MULTIPLIER: u64 = 181;

/// Rolling accumulator over the key's characters.
pub(crate) fn accumulate(key: &str) -> Result<u64, TableError> {
    if key.is_empty() {
        return Err(TableError::InvalidKey);
    }
    Ok(fold(key))
}

/// Unchecked accumulator for keys already known to be non-empty.
#[inline]
pub(crate) fn fold(key: &str) -> u64 {
    key.chars().fold(0u64, |acc, c| {
        acc.wrapping_mul(MULTIPLIER).wrapping_add(u64::from(c as u32))
    })
}

#[inline]
pub(crate) fn home_from(acc: u64, capacity: usize) -> usize {
    (acc % capacity as u64) as usize
}

#[inline]
pub(crate) fn step_from(acc: u64, prime: u64) -> usize {
    let step = prime - acc % prime;
    (if step % 2 == 0 { step + 1 } else { step }) as usize
}

/// First probe position: the accumulator reduced modulo `capacity`.
pub fn primary_hash(key: &str, capacity: usize) -> Result<usize, TableError> {
    debug_assert!(capacity > 0);
    accumulate(key).map(|acc| home_from(acc, capacity))
}

/// Probe step: `prime - (acc mod prime)`, bumped to the next odd number when
/// even. Never zero.
pub fn secondary_hash(key: &str, prime: u64) -> Result<usize, TableError> {
    debug_assert!(prime > 1);
    accumulate(key).map(|acc| step_from(acc, prime))
}
