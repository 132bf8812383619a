use std::{borrow::Cow, fmt::Display, ops::Range};

use serde::Serialize;

use crate::SourceSegment;

/// A non-empty read range `[start, end)` inside one source, along one dimension.
///
/// Serializes as a `[source_index, start, end]` triple.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "(usize, u64, u64)")]
pub struct DimensionSlice {
    source_index: usize,
    start: u64,
    end: u64,
}

impl DimensionSlice {
    /// Create a new dimension slice.
    ///
    /// Returns [`None`] if the slice is empty (`start >= end`).
    #[must_use]
    pub fn new(source_index: usize, start: u64, end: u64) -> Option<Self> {
        (start < end).then_some(Self {
            source_index,
            start,
            end,
        })
    }

    /// The index of the source.
    #[must_use]
    pub const fn source_index(&self) -> usize {
        self.source_index
    }

    /// The start offset within the source.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// The end offset within the source.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// The number of elements in the slice. Always positive.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns true if the slice is empty, which never holds for a constructed slice.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// The offset range within the source.
    #[must_use]
    pub const fn range(&self) -> Range<u64> {
        self.start..self.end
    }
}

impl From<DimensionSlice> for (usize, u64, u64) {
    fn from(slice: DimensionSlice) -> Self {
        (slice.source_index, slice.start, slice.end)
    }
}

impl Display for DimensionSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.source_index, self.start, self.end)
    }
}

/// Partitions chunk ranges along one dimension into source read ranges.
///
/// Along the concatenation dimension, a resolver holds the segments of every source.
/// Along any other dimension, it holds a single segment of source `0` spanning the whole dimension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceResolver<'a> {
    segments: Cow<'a, [SourceSegment]>,
}

impl<'a> SliceResolver<'a> {
    /// Create a slice resolver over `segments`.
    ///
    /// `segments` must be sorted, contiguous, and non-overlapping, as produced by a [`ConcatenationMap`](crate::ConcatenationMap).
    #[must_use]
    pub fn new(segments: &'a [SourceSegment]) -> Self {
        Self {
            segments: Cow::Borrowed(segments),
        }
    }

    /// Create a slice resolver over a dimension of a single source with `size` elements.
    #[must_use]
    pub fn whole(size: u64) -> SliceResolver<'static> {
        SliceResolver {
            segments: Cow::Owned(vec![SourceSegment::new(0, 0, size)]),
        }
    }

    /// The segments of the resolver.
    #[must_use]
    pub fn segments(&self) -> &[SourceSegment] {
        &self.segments
    }

    /// Return the source read ranges covering the chunk range `chunk`, in ascending source order.
    ///
    /// Each overlapping segment `(i, s, e)` contributes `(i, max(s, chunk.start) - s, min(e, chunk.end) - s)`.
    /// Empty segments and segments that do not overlap `chunk` contribute nothing.
    pub fn slices(&self, chunk: Range<u64>) -> impl Iterator<Item = DimensionSlice> + '_ {
        let Range { start, end } = chunk;
        let first = self
            .segments
            .partition_point(|segment| segment.end() <= start);
        self.segments[first..]
            .iter()
            .take_while(move |segment| segment.start() < end)
            .filter_map(move |segment| {
                DimensionSlice::new(
                    segment.index(),
                    start.max(segment.start()) - segment.start(),
                    end.min(segment.end()) - segment.start(),
                )
            })
    }

    /// Return the source read ranges covering the chunk range `chunk`.
    ///
    /// See [`slices`](Self::slices).
    #[must_use]
    pub fn resolve(&self, chunk: Range<u64>) -> Vec<DimensionSlice> {
        self.slices(chunk).collect()
    }
}
