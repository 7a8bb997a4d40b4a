//! Non-blocking reporting of runtime anomalies.
//!
//! The per-sample path never logs or allocates. When a resistor has to clamp
//! a non-physical value it hands a small `Copy` event to a [`DiagnosticSink`];
//! the sink decides what to do with it.
//!
//! ```text
//! Audio thread                         Any other thread
//! ┌──────────────────────┐            ┌──────────────────────┐
//! │ ResistorModel        │            │ host / UI / logger   │
//! │   evaluate()         │   ───►     │   ClampLog::total()  │
//! │   clamp → report()   │  lockfree  │   ClampLog::recent() │
//! └──────────────────────┘            └──────────────────────┘
//! ```

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// A resistance value that had to be clamped to stay physical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampEvent {
    /// Zero-based index of the sample that produced the value.
    pub sample_index: u64,
    /// The raw, non-physical resistance (≤ 0 or non-finite).
    pub raw_resistance: f64,
    /// The value actually returned.
    pub clamped_to: f64,
}

/// Receiver for clamp events.
///
/// `report` runs on the audio thread. Implementations used in real time must
/// not block or allocate.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, event: ClampEvent);
}

impl<F> DiagnosticSink for F
where
    F: Fn(ClampEvent) + Send + Sync,
{
    fn report(&self, event: ClampEvent) {
        self(event)
    }
}

/// Forwards events to the `log` facade at `warn` level.
///
/// Loggers generally lock and allocate, so this is for offline rendering
/// and debugging, not for a live audio callback.
#[derive(Debug, Clone)]
pub struct LogSink {
    label: String,
}

impl LogSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl DiagnosticSink for LogSink {
    fn report(&self, event: ClampEvent) {
        log::warn!(
            "{}: resistance {} Ω at sample {} clamped to {} Ω",
            self.label,
            event.raw_resistance,
            event.sample_index,
            event.clamped_to
        );
    }
}

#[derive(Debug, Default)]
struct Slot {
    sample_index: AtomicU64,
    raw_bits: AtomicU64,
    clamped_bits: AtomicU64,
}

/// Lock-free ring of the most recent clamp events plus a running total.
///
/// Writers never block and never allocate. Several resistors (even on
/// different threads) may share one log; a reader racing a writer can see a
/// half-updated slot, which only affects the diagnostic detail, never the
/// total count.
#[derive(Debug)]
pub struct ClampLog {
    slots: Box<[Slot]>,
    /// Total events ever written; also the next write position.
    write_idx: AtomicUsize,
    /// Mask for fast modulo: `idx & mask` instead of `idx % capacity`.
    mask: usize,
}

impl ClampLog {
    /// Create a log holding at least `min_capacity` recent events (rounded up
    /// to a power of two).
    pub fn new(min_capacity: usize) -> Self {
        let capacity = min_capacity.next_power_of_two().max(4);
        let slots = (0..capacity)
            .map(|_| Slot::default())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            write_idx: AtomicUsize::new(0),
            mask: capacity - 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of events reported since creation.
    pub fn total(&self) -> usize {
        self.write_idx.load(Ordering::Acquire)
    }

    /// The most recent event, if any.
    pub fn latest(&self) -> Option<ClampEvent> {
        let idx = self.total();
        if idx == 0 {
            return None;
        }
        Some(self.read_slot(idx.wrapping_sub(1) & self.mask))
    }

    /// Up to `capacity` most recent events, oldest first.
    ///
    /// Allocates; call from a non-real-time thread.
    pub fn recent(&self) -> Vec<ClampEvent> {
        let end = self.total();
        let start = end.saturating_sub(self.capacity());
        (start..end).map(|i| self.read_slot(i & self.mask)).collect()
    }

    fn read_slot(&self, slot: usize) -> ClampEvent {
        let s = &self.slots[slot];
        ClampEvent {
            sample_index: s.sample_index.load(Ordering::Relaxed),
            raw_resistance: f64::from_bits(s.raw_bits.load(Ordering::Relaxed)),
            clamped_to: f64::from_bits(s.clamped_bits.load(Ordering::Relaxed)),
        }
    }
}

impl DiagnosticSink for ClampLog {
    #[inline]
    fn report(&self, event: ClampEvent) {
        // Claim a slot first so concurrent writers never share one.
        let idx = self.write_idx.fetch_add(1, Ordering::AcqRel);
        let s = &self.slots[idx & self.mask];
        s.sample_index.store(event.sample_index, Ordering::Relaxed);
        s.raw_bits.store(event.raw_resistance.to_bits(), Ordering::Relaxed);
        s.clamped_bits.store(event.clamped_to.to_bits(), Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
