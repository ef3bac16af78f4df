//! Lock-free single-producer/single-consumer byte ring buffer
//!
//! One fixed role per side: exactly one context advances `head` (the
//! producer) and exactly one context advances `tail` (the consumer). On a
//! single core with interrupts as the only concurrency, that role split is
//! what makes the buffer safe without masking interrupts - the producer
//! never touches `tail`, the consumer never touches `head`, and each index
//! is a single aligned word.
//!
//! Capacity must be a power of two so the index arithmetic reduces to a
//! mask; one slot is sacrificed to distinguish full from empty, so a
//! buffer of size N holds N-1 bytes.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Fixed-capacity circular byte queue with drop accounting
///
/// `N` must be a power of two and at least 2; violations are rejected at
/// compile time when the type is instantiated.
pub struct RingBuffer<const N: usize> {
    buf: UnsafeCell<[u8; N]>,
    /// Next slot the producer will write. Written by the producer only.
    head: AtomicUsize,
    /// Next slot the consumer will read. Written by the consumer only.
    tail: AtomicUsize,
    /// Bytes discarded because the buffer was full
    dropped: AtomicU32,
}

// SAFETY: `buf` is only written through `push` (producer role) and only
// read through `pop` (consumer role); the head/tail handshake ensures the
// two sides never touch the same slot concurrently.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    const CAPACITY_VALID: () = assert!(
        N.is_power_of_two() && N >= 2,
        "ring buffer size must be a power of two"
    );

    /// Create an empty buffer
    pub const fn new() -> Self {
        // Forces the compile-time capacity check for this N
        let () = Self::CAPACITY_VALID;
        Self {
            buf: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Usable capacity in bytes (one slot is reserved)
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Reset to empty and clear the drop counter
    ///
    /// Only safe against concurrent access when neither side is active,
    /// i.e. during (re)initialization.
    pub fn reset(&self) {
        self.head.store(0, Ordering::Relaxed);
        self.tail.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Whether the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Whether a push would be rejected
    pub fn is_full(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (head + 1) & (N - 1) == tail
    }

    /// Number of bytes currently queued
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) & (N - 1)
    }

    /// Append one byte. Returns `false` (and stores nothing) if the
    /// buffer is full. Producer side only.
    pub fn push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & (N - 1);
        if next == self.tail.load(Ordering::Acquire) {
            return false;
        }
        // SAFETY: `head` is owned by the producer; the consumer will not
        // read this slot until the Release store below publishes it.
        unsafe {
            (*self.buf.get())[head] = byte;
        }
        self.head.store(next, Ordering::Release);
        true
    }

    /// Remove and return the oldest byte, or `None` if empty. Consumer
    /// side only.
    pub fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: the Acquire load above pairs with the producer's
        // Release store, so the slot at `tail` is fully written.
        let byte = unsafe { (*self.buf.get())[tail] };
        self.tail.store((tail + 1) & (N - 1), Ordering::Release);
        Some(byte)
    }

    /// Account for bytes that could not be queued
    pub fn add_dropped(&self, count: u32) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Total bytes discarded because the buffer was full
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
