//! Fixed-capacity byte ring buffer with all-or-nothing transfers.
//!
//! ```text
//!            head (next read)         tail (next write)
//!              │                        │
//!   ┌────┬────┬▼───┬────┬────┬────┬────┬▼───┐
//!   │free│free│ d0 │ d1 │ d2 │ d3 │ d4 │free│   len = 5, capacity = 8
//!   └────┴────┴────┴────┴────┴────┴────┴────┘
//! ```
//!
//! Writes are rejected when the whole payload does not fit, reads are
//! rejected when fewer bytes are stored than requested.  A rejected call
//! leaves the buffer exactly as it was, so a multi-byte sample is either
//! stored completely or not at all.  Old data is never overwritten: sample
//! loss shows up at the caller as [`BufferError::CapacityExceeded`].
//!
//! ## Concurrency
//!
//! There is no internal locking.  In this firmware the buffer is touched only
//! from the main loop.  A drain path running in another context (ISR, DMA
//! completion, second task) must add its own ordering guarantee, e.g. a
//! single-producer/single-consumer split with release/acquire on the
//! cursors.  Nothing here provides one.

use core::fmt;

use crate::error::BufferError;

/// Smallest storage that still distinguishes "one byte stored" from "full".
pub const MIN_CAPACITY: usize = 2;

/// Byte FIFO over caller-supplied storage.
pub struct RingBuffer<'a> {
    mem: &'a mut [u8],
    /// Number of occupied bytes.
    len: usize,
    /// Index of the next byte to read.
    head: usize,
    /// Index of the next byte to write.
    tail: usize,
}

impl<'a> RingBuffer<'a> {
    /// Take ownership of `mem` as backing storage and reset it.
    ///
    /// Storage shorter than [`MIN_CAPACITY`] is a configuration error.
    pub fn new(mem: &'a mut [u8]) -> Result<Self, BufferError> {
        if mem.len() < MIN_CAPACITY {
            return Err(BufferError::TooSmall {
                capacity: mem.len(),
            });
        }

        let mut buf = Self {
            mem,
            len: 0,
            head: 0,
            tail: 0,
        };
        buf.init();
        Ok(buf)
    }

    /// Zero the storage and empty the buffer.  Safe to call at any time.
    pub fn init(&mut self) {
        self.mem.fill(0);
        self.len = 0;
        self.head = 0;
        self.tail = 0;
    }

    /// Total storage in bytes.  Fixed for the lifetime of the buffer.
    pub fn capacity(&self) -> usize {
        self.mem.len()
    }

    /// Number of stored bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Bytes that can still be written.
    pub fn free(&self) -> usize {
        self.capacity() - self.len
    }

    /// Append all of `data`, or nothing.
    pub fn write(&mut self, data: &[u8]) -> Result<(), BufferError> {
        let free = self.free();
        if data.len() > free {
            return Err(BufferError::CapacityExceeded {
                requested: data.len(),
                free,
            });
        }

        // Copy up to the end of storage, then wrap for the remainder.
        let first = data.len().min(self.capacity() - self.tail);
        let (front, wrapped) = data.split_at(first);
        self.mem[self.tail..self.tail + first].copy_from_slice(front);
        self.mem[..wrapped.len()].copy_from_slice(wrapped);

        self.tail = (self.tail + data.len()) % self.capacity();
        self.len += data.len();
        Ok(())
    }

    /// Remove the oldest `out.len()` bytes into `out`, or nothing.
    pub fn read(&mut self, out: &mut [u8]) -> Result<(), BufferError> {
        if out.len() > self.len {
            return Err(BufferError::Underflow {
                requested: out.len(),
                available: self.len,
            });
        }

        let first = out.len().min(self.capacity() - self.head);
        let (front, wrapped) = out.split_at_mut(first);
        front.copy_from_slice(&self.mem[self.head..self.head + first]);
        let rest = wrapped.len();
        wrapped.copy_from_slice(&self.mem[..rest]);

        self.head = (self.head + out.len()) % self.capacity();
        self.len -= out.len();
        Ok(())
    }
}

impl fmt::Debug for RingBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}
