use std::ops::Range;

use serde::{Deserialize, Serialize};

/// The global offset range `[start, end)` occupied by one source along the concatenation dimension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSegment {
    index: usize,
    start: u64,
    end: u64,
}

impl SourceSegment {
    /// Create a new source segment.
    ///
    /// An `end` before `start` is clamped to `start`.
    #[must_use]
    pub fn new(index: usize, start: u64, end: u64) -> Self {
        Self {
            index,
            start,
            end: end.max(start),
        }
    }

    /// The index of the source.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The global start offset of the source.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// The global end offset of the source.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// The number of elements of the source along the concatenation dimension.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns true if the source is empty along the concatenation dimension.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The global offset range of the source.
    #[must_use]
    pub const fn range(&self) -> Range<u64> {
        self.start..self.end
    }
}

/// The segments of sources joined end-to-end along one dimension.
///
/// Segments are sorted, contiguous, non-overlapping, and cover `[0, total)`.
/// Empty sources have an empty segment.
///
/// ```
/// # use chunkplan::ConcatenationMap;
/// let map = ConcatenationMap::new([2, 1, 3, 1]);
/// assert_eq!(map.total(), 7);
/// assert_eq!(map.segments()[2].range(), 3..6);
/// assert_eq!(map.locate(3).map(|segment| segment.index()), Some(2));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConcatenationMap {
    segments: Vec<SourceSegment>,
}

impl ConcatenationMap {
    /// Create a concatenation map from the sizes of each source along the concatenation dimension, in concatenation order.
    ///
    /// Offsets saturate at [`u64::MAX`].
    #[must_use]
    pub fn new(sizes: impl IntoIterator<Item = u64>) -> Self {
        let mut end = 0u64;
        let segments = sizes
            .into_iter()
            .enumerate()
            .map(|(index, size)| {
                let start = end;
                end = end.saturating_add(size);
                SourceSegment::new(index, start, end)
            })
            .collect();
        Self { segments }
    }

    /// The segments, in concatenation order.
    #[must_use]
    pub fn segments(&self) -> &[SourceSegment] {
        &self.segments
    }

    /// The number of sources.
    #[must_use]
    pub fn num_sources(&self) -> usize {
        self.segments.len()
    }

    /// The total size of the concatenation dimension.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.segments.last().map_or(0, SourceSegment::end)
    }

    /// The segment of the source containing the global `offset`.
    ///
    /// Returns [`None`] if `offset` is not less than [`total`](Self::total).
    /// Empty segments never contain an offset.
    #[must_use]
    pub fn locate(&self, offset: u64) -> Option<&SourceSegment> {
        let position = self
            .segments
            .partition_point(|segment| segment.end <= offset);
        self.segments
            .get(position)
            .filter(|segment| segment.range().contains(&offset))
    }
}

/// How sources are ordered for concatenation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ConcatOrder {
    /// The sources are already in concatenation order.
    Manual,
    /// The sources must be ordered by their ordering value along the concatenation dimension.
    ///
    /// Every source must have an ordering value.
    /// Sources are never reordered, so their ordering values must already be ascending.
    #[default]
    ByIndex,
}

/// Sources joined along a concatenation dimension.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concatenation {
    dimension: String,
    map: ConcatenationMap,
}

impl Concatenation {
    /// Create a new concatenation along `dimension`.
    #[must_use]
    pub fn new(dimension: impl Into<String>, map: ConcatenationMap) -> Self {
        Self {
            dimension: dimension.into(),
            map,
        }
    }

    /// The concatenation dimension.
    #[must_use]
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// The concatenation map.
    #[must_use]
    pub fn map(&self) -> &ConcatenationMap {
        &self.map
    }
}
