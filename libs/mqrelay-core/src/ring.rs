//! Fixed-capacity circular storage with wraparound bulk operations.

/// Circular buffer over exactly `N` slots.
///
/// `begin` is the next read offset and `end` the next write offset,
/// both always in `[0, N)`. When the cursors coincide the buffer is
/// either empty or completely full; the `full` flag disambiguates.
///
/// Invariant: `occupied() + free() == N` after every operation.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    slots: [Option<T>; N],
    begin: usize,
    end: usize,
    full: bool,
}

impl<T, const N: usize> RingBuffer<T, N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { None }; N],
            begin: 0,
            end: 0,
            full: false,
        }
    }

    /// Number of readable elements.
    pub fn occupied(&self) -> usize {
        if self.end == self.begin {
            return if self.full { N } else { 0 };
        }

        if self.end > self.begin {
            self.end - self.begin
        } else {
            N + self.end - self.begin
        }
    }

    /// Number of writable slots.
    pub fn free(&self) -> usize {
        N - self.occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    pub fn is_full(&self) -> bool {
        self.occupied() == N
    }

    /// Move a single element in. Returns the element back when no slot
    /// is free.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.free() == 0 {
            return Err(item);
        }

        self.slots[self.end] = Some(item);
        self.end = (self.end + 1) % N;

        if self.begin == self.end {
            self.full = true;
        }
        Ok(())
    }

    /// Move the oldest element out, if any.
    pub fn pop(&mut self) -> Option<T> {
        if self.occupied() == 0 {
            return None;
        }

        self.full = false;

        let item = self.slots[self.begin].take();
        self.begin = (self.begin + 1) % N;
        item
    }

    /// Write up to `min(data.len(), free())` elements starting at the
    /// write cursor, wrapping around the storage boundary in at most
    /// two contiguous segments. Returns the count actually written;
    /// never overwrites unread data and never grows storage.
    pub fn write(&mut self, data: &[T]) -> usize
    where
        T: Clone,
    {
        let n = data.len().min(self.free());
        if n == 0 {
            return 0;
        }

        let first_chunk = n.min(N - self.end);
        for item in &data[..first_chunk] {
            self.slots[self.end] = Some(item.clone());
            self.end = (self.end + 1) % N;
        }

        if first_chunk < n {
            for item in &data[first_chunk..n] {
                self.slots[self.end] = Some(item.clone());
                self.end = (self.end + 1) % N;
            }
        }

        if self.begin == self.end {
            self.full = true;
        }
        n
    }

    /// Read up to `min(n, occupied())` elements into `dest`, oldest
    /// first, wrapping in at most two segments. Returns the count
    /// actually read; reading from an empty buffer returns 0 without
    /// mutation.
    pub fn read_into(&mut self, dest: &mut Vec<T>, n: usize) -> usize {
        let n = n.min(self.occupied());
        if n == 0 {
            return 0;
        }

        self.full = false;

        let first_chunk = n.min(N - self.begin);
        for _ in 0..first_chunk {
            if let Some(item) = self.slots[self.begin].take() {
                dest.push(item);
            }
            self.begin = (self.begin + 1) % N;
        }

        if first_chunk < n {
            for _ in 0..(n - first_chunk) {
                if let Some(item) = self.slots[self.begin].take() {
                    dest.push(item);
                }
                self.begin = (self.begin + 1) % N;
            }
        }
        n
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
