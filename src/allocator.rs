use crate::serial::{SerialBatch, SerialNumber};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// The shared serial pool is drained; every further request fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("serial pool exhausted")]
pub struct Exhausted;

/// Exclusive hand-out of a pre-generated serial batch.
///
/// This is the single synchronization point of the engine: every concurrent
/// equipment cycle funnels through [`allocate_one`](Self::allocate_one).
/// Serials are claimed through an atomic cursor over the immutable batch, so
/// a successful claim is one indivisible step: no serial is ever skipped,
/// duplicated, or handed to two callers, and hand-out order is the batch's
/// ascending sequence order.
#[derive(Debug)]
pub struct SerialAllocator {
    batch: SerialBatch,
    next: AtomicUsize,
}

impl SerialAllocator {
    pub fn new(batch: SerialBatch) -> Self {
        Self {
            batch,
            next: AtomicUsize::new(0),
        }
    }

    /// Claim the earliest not-yet-allocated serial.
    ///
    /// Never blocks. Once the pool is empty this returns [`Exhausted`] on
    /// every call.
    pub fn allocate_one(&self) -> Result<SerialNumber, Exhausted> {
        let len = self.batch.len();
        let mut claimed = self.next.load(Ordering::Relaxed);

        loop {
            if claimed >= len {
                return Err(Exhausted);
            }

            match self.next.compare_exchange_weak(
                claimed,
                claimed + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug_assert!(claimed < len, "claimed cursor {claimed} past batch end {len}");
                    return self.batch.get(claimed).ok_or(Exhausted);
                }
                Err(observed) => claimed = observed,
            }
        }
    }

    /// Serials still available for allocation.
    pub fn remaining(&self) -> usize {
        self.batch.len().saturating_sub(self.next.load(Ordering::Acquire))
    }

    /// Serials handed out so far.
    pub fn allocated(&self) -> usize {
        self.next.load(Ordering::Acquire).min(self.batch.len())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
