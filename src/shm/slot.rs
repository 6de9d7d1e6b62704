//! Latest-wins publication slot: a seqlock over one payload value.
//!
//! The writer bumps the sequence to an odd value, overwrites the payload,
//! then bumps it to the next even value and raises the ready flag. A reader
//! trusts a payload copy only if the sequence it observed before and after
//! the copy is the same even value; anything else is a torn read and is
//! retried.

use std::cell::UnsafeCell;
use std::hint;
use std::ptr;
use std::sync::atomic::{fence, AtomicU64, AtomicU8, Ordering};

use crate::orderbook::types::{BookSnapshot, Metrics};

/// Bounded retries before a reader gives up on a stable observation. The
/// writer publishes in microseconds, so contention beyond this means the
/// producer died mid-write and latest-wins semantics allow returning
/// nothing.
const READ_RETRIES: usize = 64;

/// A single-producer, multi-reader latest-wins slot.
///
/// Lives at the start of a shared-memory region; its all-zero state
/// (sequence 0, ready 0) reads as "nothing published yet".
#[repr(C)]
pub struct SeqSlot<T> {
    /// Even when stable, odd while a write is in progress. Monotonically
    /// increasing.
    sequence: AtomicU64,
    /// Raised after the first publication.
    ready: AtomicU8,
    _pad: [u8; 7],
    payload: UnsafeCell<T>,
}

// SAFETY: readers only copy the payload out, and every copy is validated
// against the sequence; the single producer is the only writer.
unsafe impl<T: Copy + Send> Sync for SeqSlot<T> {}

impl<T: Copy> SeqSlot<T> {
    /// Publish a new value. Single producer only.
    pub fn publish(&self, value: &T) {
        let seq = self.sequence.load(Ordering::Relaxed);
        self.sequence.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        // SAFETY: this is the sole producer; concurrent readers see the odd
        // sequence (or a mismatch) and discard whatever they copied.
        unsafe { ptr::write(self.payload.get(), *value) };

        self.sequence.store(seq.wrapping_add(2), Ordering::Release);
        self.ready.store(1, Ordering::Release);
    }

    /// Read the latest published value, or `None` if nothing has been
    /// published yet or no stable observation was possible within the retry
    /// budget.
    #[must_use]
    pub fn read(&self) -> Option<T> {
        if self.ready.load(Ordering::Acquire) == 0 {
            return None;
        }

        for _ in 0..READ_RETRIES {
            let before = self.sequence.load(Ordering::Acquire);
            if before & 1 == 1 {
                hint::spin_loop();
                continue;
            }

            // SAFETY: a torn copy is detected by the sequence double-check
            // below and never returned.
            let value = unsafe { ptr::read_volatile(self.payload.get()) };

            fence(Ordering::Acquire);
            let after = self.sequence.load(Ordering::Relaxed);
            if before == after {
                return Some(value);
            }
            hint::spin_loop();
        }
        None
    }

    /// The current sequence number (even iff stable).
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// Whether anything has been published yet.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire) != 0
    }
}

/// Region header for the book snapshot channel (`/hft_orderbook`).
pub type SharedBookSlot = SeqSlot<BookSnapshot>;

/// Region header for the metrics channel (`/hft_metrics`).
pub type SharedMetricsSlot = SeqSlot<Metrics>;
