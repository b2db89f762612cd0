//! Append-only chunked storage
//!
//! Grows by appending fixed-size chunks. Existing chunks are never
//! reallocated or copied, so the element at index `i` stays where it is for
//! the lifetime of the arena once written. Indices are the stable handles:
//! `at(i)` returns the same value before and after any number of pushes.
//!
//! The arena itself is not synchronized. Series wrap it in a reader-writer
//! lock, which orders the length update of a push before any read that
//! observes the new length.

use crate::error::{Result, StorageError};
use std::ops::{Index, Range};

/// Append-only sequence backed by fixed-capacity chunks
#[derive(Debug, Clone)]
pub struct ChunkedArena<T> {
    /// Elements per chunk
    chunk_size: usize,
    /// Chunks, each allocated with exactly `chunk_size` capacity
    chunks: Vec<Vec<T>>,
    /// Number of written elements
    len: usize,
}

impl<T> ChunkedArena<T> {
    /// Create an empty arena with the given chunk size
    ///
    /// A chunk size of zero is treated as one.
    ///
    /// # Example
    /// ```
    /// use sigscope_core::series::arena::ChunkedArena;
    ///
    /// let mut arena = ChunkedArena::new(4);
    /// let index = arena.push(1.5);
    /// assert_eq!(arena.at(index), Ok(&1.5));
    /// assert_eq!(arena.capacity(), 4);
    /// ```
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunks: Vec::new(),
            len: 0,
        }
    }

    /// Append a value and return its index
    ///
    /// Allocates exactly one new chunk when the current ones are full.
    /// Existing chunks are never touched.
    pub fn push(&mut self, value: T) -> usize {
        if self.len == self.capacity() {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            tracing::debug!(
                chunks = self.chunks.len(),
                chunk_size = self.chunk_size,
                "Allocated arena chunk"
            );
        }
        let index = self.len;
        // Invariant: only the last chunk has room, and it never grows past chunk_size
        if let Some(chunk) = self.chunks.last_mut() {
            chunk.push(value);
        }
        self.len += 1;
        index
    }

    /// Checked element access
    pub fn at(&self, index: usize) -> Result<&T> {
        self.get(index).ok_or(StorageError::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    /// Element access returning `None` past the end
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let (chunk, offset) = self.locate(index);
        self.chunks.get(chunk).and_then(|c| c.get(offset))
    }

    /// Number of written elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no element has been written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated element slots, always a multiple of the chunk size
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.chunk_size
    }

    /// Elements per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of allocated chunks
    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// First element
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Last element
    pub fn back(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate over all elements in index order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.chunks.iter().flat_map(|chunk| chunk.iter())
    }

    /// Iterate over the elements in `range`, clamped to the written length
    pub fn iter_range(&self, range: Range<usize>) -> impl Iterator<Item = &T> + '_ {
        let end = range.end.min(self.len);
        let start = range.start.min(end);
        let cs = self.chunk_size;
        let first_chunk = start / cs;
        let chunks = if start < end {
            &self.chunks[first_chunk..(end - 1) / cs + 1]
        } else {
            &self.chunks[0..0]
        };

        chunks.iter().enumerate().flat_map(move |(i, chunk)| {
            let base = (first_chunk + i) * cs;
            let lo = start.saturating_sub(base).min(chunk.len());
            let hi = end.saturating_sub(base).min(chunk.len());
            chunk[lo..hi].iter()
        })
    }

    /// Index of the first element for which `pred` is false
    ///
    /// The arena must be partitioned by `pred` (all `true` elements before
    /// all `false` ones), as with [`slice::partition_point`].
    pub fn partition_point<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let mut lo = 0;
        let mut hi = self.len;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if pred(&self[mid]) {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Approximate heap and inline bytes held by the arena
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.heap_usage()
    }

    /// Bytes allocated for the chunk table and the chunks themselves
    ///
    /// Excludes the arena struct, for owners that already count it inline.
    pub fn heap_usage(&self) -> usize {
        self.chunks.capacity() * std::mem::size_of::<Vec<T>>()
            + self.capacity() * std::mem::size_of::<T>()
    }

    /// Insert a value at `index`, shifting later elements up by one
    ///
    /// Breaks index stability for every element at or after `index`. Only
    /// used by the unordered insert mode of sparse series.
    pub(crate) fn insert(&mut self, index: usize, value: T) {
        let last = self.push(value);
        let index = index.min(last);
        for i in (index + 1..=last).rev() {
            self.swap(i, i - 1);
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let (ca, oa) = self.locate(a);
        let (cb, ob) = self.locate(b);
        if ca == cb {
            self.chunks[ca].swap(oa, ob);
            return;
        }
        let (lo, hi) = if ca < cb { (ca, cb) } else { (cb, ca) };
        let (left, right) = self.chunks.split_at_mut(hi);
        let (x, y) = if ca < cb {
            (&mut left[lo][oa], &mut right[0][ob])
        } else {
            (&mut right[0][oa], &mut left[lo][ob])
        };
        std::mem::swap(x, y);
    }

    fn locate(&self, index: usize) -> (usize, usize) {
        (index / self.chunk_size, index % self.chunk_size)
    }
}

impl<T> Default for ChunkedArena<T> {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CHUNK_SIZE)
    }
}

impl<T> Index<usize> for ChunkedArena<T> {
    type Output = T;

    /// Unchecked-style indexing; panics past the end
    fn index(&self, index: usize) -> &T {
        let (chunk, offset) = self.locate(index);
        &self.chunks[chunk][offset]
    }
}

impl<T> Extend<T> for ChunkedArena<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}
