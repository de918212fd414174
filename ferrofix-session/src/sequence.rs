/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Sequence number management.
//!
//! [`SequenceCounters`] holds the two per-session counters as atomics.
//! [`SequenceProvider`] decides where counters start when a session is
//! created.

use crate::id::SessionId;
use std::sync::atomic::{AtomicU32, Ordering};

/// Next outgoing and next expected incoming sequence numbers.
///
/// Every operation is a single atomic instruction; no locks are taken.
#[derive(Debug)]
pub struct SequenceCounters {
    next_outgoing: AtomicU32,
    next_incoming: AtomicU32,
}

impl SequenceCounters {
    /// Creates counters with explicit starting values.
    #[must_use]
    pub const fn new(next_outgoing: u32, next_incoming: u32) -> Self {
        Self {
            next_outgoing: AtomicU32::new(next_outgoing),
            next_incoming: AtomicU32::new(next_incoming),
        }
    }

    /// Next outgoing sequence number, without allocating it.
    #[inline]
    #[must_use]
    pub fn next_outgoing(&self) -> u32 {
        self.next_outgoing.load(Ordering::SeqCst)
    }

    /// Next expected incoming sequence number.
    #[inline]
    #[must_use]
    pub fn next_incoming(&self) -> u32 {
        self.next_incoming.load(Ordering::SeqCst)
    }

    /// Allocates the next outgoing number (fetch-and-increment).
    #[inline]
    pub fn allocate_outgoing(&self) -> u32 {
        self.next_outgoing.fetch_add(1, Ordering::SeqCst)
    }

    /// Accepts `received` only if it equals the expected number, moving the
    /// expectation to `received + 1` in the same compare-and-swap.
    ///
    /// Of several concurrent callers passing the same value, exactly one
    /// sees [`SequenceResult::Ok`].
    pub fn check_and_increment(&self, received: u32) -> SequenceResult {
        match self.next_incoming.compare_exchange(
            received,
            received.wrapping_add(1),
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => SequenceResult::Ok,
            Err(expected) if received < expected => SequenceResult::TooLow { expected, received },
            Err(expected) => SequenceResult::Gap { expected, received },
        }
    }

    /// Compares `received` against the expectation without changing it.
    #[must_use]
    pub fn validate_incoming(&self, received: u32) -> SequenceResult {
        let expected = self.next_incoming();
        if received == expected {
            SequenceResult::Ok
        } else if received < expected {
            SequenceResult::TooLow { expected, received }
        } else {
            SequenceResult::Gap { expected, received }
        }
    }

    #[inline]
    pub fn set_next_outgoing(&self, seq: u32) {
        self.next_outgoing.store(seq, Ordering::SeqCst);
    }

    #[inline]
    pub fn set_next_incoming(&self, seq: u32) {
        self.next_incoming.store(seq, Ordering::SeqCst);
    }

    /// Moves the incoming expectation forward to `seq`; never moves it back.
    ///
    /// Returns true if the counter changed.
    pub fn advance_incoming(&self, seq: u32) -> bool {
        self.next_incoming.fetch_max(seq, Ordering::SeqCst) < seq
    }

    /// Resets both counters to 1.
    pub fn reset(&self) {
        self.set_next_outgoing(1);
        self.set_next_incoming(1);
    }
}

impl Default for SequenceCounters {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Result of sequence number validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceResult {
    /// Sequence number is as expected.
    Ok,
    /// Sequence number is lower than expected (possible duplicate).
    TooLow {
        /// Expected sequence number.
        expected: u32,
        /// Received sequence number.
        received: u32,
    },
    /// Sequence number is higher than expected (gap detected).
    Gap {
        /// Expected sequence number.
        expected: u32,
        /// Received sequence number.
        received: u32,
    },
}

impl SequenceResult {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    #[must_use]
    pub const fn is_gap(&self) -> bool {
        matches!(self, Self::Gap { .. })
    }

    #[must_use]
    pub const fn is_too_low(&self) -> bool {
        matches!(self, Self::TooLow { .. })
    }
}

/// Source of starting sequence numbers for new sessions.
///
/// Injected into the protocol handlers so that persistence, if any, lives
/// outside the engine.
pub trait SequenceProvider: Send + Sync {
    /// First outgoing sequence number for `id`.
    fn next_outgoing(&self, id: &SessionId) -> u32;

    /// First expected incoming sequence number for `id`.
    fn next_incoming(&self, id: &SessionId) -> u32;
}

/// Starts every session at 1/1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetSequenceProvider;

impl SequenceProvider for ResetSequenceProvider {
    fn next_outgoing(&self, _id: &SessionId) -> u32 {
        1
    }

    fn next_incoming(&self, _id: &SessionId) -> u32 {
        1
    }
}

/// Starts every session at fixed values. Mostly useful in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSequenceProvider {
    pub outgoing: u32,
    pub incoming: u32,
}

impl FixedSequenceProvider {
    #[must_use]
    pub const fn new(outgoing: u32, incoming: u32) -> Self {
        Self { outgoing, incoming }
    }
}

impl SequenceProvider for FixedSequenceProvider {
    fn next_outgoing(&self, _id: &SessionId) -> u32 {
        self.outgoing
    }

    fn next_incoming(&self, _id: &SessionId) -> u32 {
        self.incoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_allocate_outgoing() {
        let counters = SequenceCounters::default();
        assert_eq!(counters.allocate_outgoing(), 1);
        assert_eq!(counters.allocate_outgoing(), 2);
        assert_eq!(counters.next_outgoing(), 3);
    }

    #[test]
    fn test_check_and_increment() {
        let counters = SequenceCounters::new(1, 5);
        assert_eq!(counters.check_and_increment(5), SequenceResult::Ok);
        assert_eq!(counters.next_incoming(), 6);
        assert_eq!(
            counters.check_and_increment(4),
            SequenceResult::TooLow {
                expected: 6,
                received: 4
            }
        );
        assert_eq!(
            counters.check_and_increment(9),
            SequenceResult::Gap {
                expected: 6,
                received: 9
            }
        );
        assert_eq!(counters.next_incoming(), 6);
    }

    #[test]
    fn test_check_and_increment_race_has_one_winner() {
        for _ in 0..50 {
            let counters = Arc::new(SequenceCounters::new(1, 7));
            let winners = Arc::new(AtomicUsize::new(0));
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let counters = Arc::clone(&counters);
                    let winners = Arc::clone(&winners);
                    std::thread::spawn(move || {
                        if counters.check_and_increment(7).is_ok() {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(winners.load(Ordering::SeqCst), 1);
            assert_eq!(counters.next_incoming(), 8);
        }
    }

    #[test]
    fn test_validate_incoming() {
        let counters = SequenceCounters::new(1, 5);
        assert!(counters.validate_incoming(4).is_too_low());
        assert!(counters.validate_incoming(5).is_ok());
        assert!(counters.validate_incoming(10).is_gap());
        assert_eq!(counters.next_incoming(), 5);
    }

    #[test]
    fn test_advance_incoming_only_moves_forward() {
        let counters = SequenceCounters::new(1, 5);
        assert!(counters.advance_incoming(9));
        assert_eq!(counters.next_incoming(), 9);
        assert!(!counters.advance_incoming(3));
        assert_eq!(counters.next_incoming(), 9);
    }

    #[test]
    fn test_reset() {
        let counters = SequenceCounters::new(100, 200);
        counters.reset();
        assert_eq!(counters.next_outgoing(), 1);
        assert_eq!(counters.next_incoming(), 1);
    }

    #[test]
    fn test_providers() {
        let id = SessionId::new("US", "THEM");
        assert_eq!(ResetSequenceProvider.next_outgoing(&id), 1);
        let fixed = FixedSequenceProvider::new(10, 20);
        assert_eq!(fixed.next_outgoing(&id), 10);
        assert_eq!(fixed.next_incoming(&id), 20);
    }
}
