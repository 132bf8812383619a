use std::{iter::FusedIterator, num::NonZeroU64, ops::Range};

use serde::{Deserialize, Serialize};

/// The chunk start offsets along one dimension.
///
/// Produces `0, C, 2C, ...` while less than the dimension size `T`.
/// The chunk starting at `s` ends at `min(s + C, T)`, so the final chunk may be smaller than `C`.
///
/// A [`ChunkStarts`] is [`Copy`] and can be iterated any number of times.
///
/// ```
/// # use std::num::NonZeroU64;
/// # use chunkplan_grid::ChunkStarts;
/// let starts = ChunkStarts::new(7, NonZeroU64::new(3).unwrap());
/// assert_eq!(starts.iter().collect::<Vec<_>>(), vec![0, 3, 6]);
/// assert_eq!(starts.extent(6), 6..7);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkStarts {
    size: u64,
    chunk_size: NonZeroU64,
}

impl ChunkStarts {
    /// Create the chunk starts of a dimension with `size` elements and chunks of `chunk_size`.
    #[must_use]
    pub const fn new(size: u64, chunk_size: NonZeroU64) -> Self {
        Self { size, chunk_size }
    }

    /// The size of the dimension.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// The chunk size.
    #[must_use]
    pub const fn chunk_size(&self) -> NonZeroU64 {
        self.chunk_size
    }

    /// The number of chunks.
    #[must_use]
    pub const fn num_chunks(&self) -> u64 {
        self.size.div_ceil(self.chunk_size.get())
    }

    /// The index of the chunk containing the element at `offset`.
    ///
    /// Monotonic in `offset` and independent of iteration order.
    #[must_use]
    pub const fn chunk_index(&self, offset: u64) -> u64 {
        offset / self.chunk_size.get()
    }

    /// The start of the chunk at `chunk_index`.
    ///
    /// Returns [`None`] if `chunk_index` is out of bounds.
    #[must_use]
    pub fn chunk_start(&self, chunk_index: u64) -> Option<u64> {
        (chunk_index < self.num_chunks()).then(|| chunk_index * self.chunk_size.get())
    }

    /// The extent `[start, end)` of the chunk starting at `start`.
    ///
    /// The end is clamped to the dimension size.
    #[must_use]
    pub fn extent(&self, start: u64) -> Range<u64> {
        start..start.saturating_add(self.chunk_size.get()).min(self.size)
    }

    /// The extent of the chunk at `chunk_index`.
    ///
    /// Returns [`None`] if `chunk_index` is out of bounds.
    #[must_use]
    pub fn chunk_extent(&self, chunk_index: u64) -> Option<Range<u64>> {
        self.chunk_start(chunk_index).map(|start| self.extent(start))
    }

    /// Create a new iterator over the chunk starts.
    #[must_use]
    pub fn iter(&self) -> ChunkStartsIterator {
        <Self as IntoIterator>::into_iter(*self)
    }
}

impl IntoIterator for ChunkStarts {
    type Item = u64;
    type IntoIter = ChunkStartsIterator;

    fn into_iter(self) -> Self::IntoIter {
        ChunkStartsIterator {
            chunk_size: self.chunk_size.get(),
            range: 0..self.num_chunks(),
        }
    }
}

impl IntoIterator for &ChunkStarts {
    type Item = u64;
    type IntoIter = ChunkStartsIterator;

    fn into_iter(self) -> Self::IntoIter {
        (*self).into_iter()
    }
}

/// Serial chunk starts iterator.
///
/// See [`ChunkStarts`].
#[derive(Clone, Debug)]
pub struct ChunkStartsIterator {
    chunk_size: u64,
    range: Range<u64>,
}

impl Iterator for ChunkStartsIterator {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|index| index * self.chunk_size)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let length =
            usize::try_from(self.range.end.saturating_sub(self.range.start)).unwrap_or(usize::MAX);
        (length, Some(length))
    }
}

impl DoubleEndedIterator for ChunkStartsIterator {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(|index| index * self.chunk_size)
    }
}

impl ExactSizeIterator for ChunkStartsIterator {}

impl FusedIterator for ChunkStartsIterator {}
