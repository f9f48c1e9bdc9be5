//! Capacity-bounded FIFO channel over the ring buffer.

use crate::ring::RingBuffer;

/// A capacity-`N` FIFO of discrete messages, one slot per element.
///
/// Enqueue never overwrites unread data; it fails instead when the
/// underlying buffer reports zero free capacity. Strict FIFO holds
/// with at most one concurrent enqueuer and one concurrent dequeuer;
/// cross-thread use must go through an external lock around the whole
/// queue.
#[derive(Debug, Clone, Default)]
pub struct BoundedQueue<T, const N: usize> {
    ring: RingBuffer<T, N>,
}

impl<T, const N: usize> BoundedQueue<T, N> {
    pub const fn new() -> Self {
        Self {
            ring: RingBuffer::new(),
        }
    }

    /// Queue one element. Returns the element back when the queue is
    /// at capacity.
    pub fn enqueue(&mut self, item: T) -> Result<(), T> {
        if self.ring.free() < 1 {
            return Err(item);
        }
        self.ring.push(item)
    }

    /// Take the oldest element, or `None` when the queue is empty.
    pub fn dequeue(&mut self) -> Option<T> {
        if self.ring.occupied() < 1 {
            return None;
        }
        self.ring.pop()
    }

    pub fn len(&self) -> usize {
        self.ring.occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}
