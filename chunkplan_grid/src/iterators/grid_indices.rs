use std::iter::FusedIterator;

use rayon::iter::plumbing::{bridge, Consumer, Producer, ProducerCallback, UnindexedConsumer};
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

use crate::{unravel_index, ChunkIndicesTinyVec, GridShape};

/// An iterator over the chunk indices of a chunk grid.
///
/// Iterates over the last dimension fastest (i.e. C-contiguous order).
/// For example, a grid with shape `[2, 3]` produces
/// ```text
/// (0, 0)  (0, 1)  (0, 2)  (1, 0)  (1, 1)  (1, 2)
/// ```
///
/// Indices are computed on demand from a linearised position, so the grid is never materialised.
#[derive(Clone, Debug)]
pub struct GridIndices {
    pub(crate) grid_shape: GridShape,
    pub(crate) range: std::ops::Range<usize>,
}

impl GridIndices {
    /// Create a new grid indices struct over a grid with `grid_shape`.
    ///
    /// Grids with more than [`usize::MAX`] chunks are truncated to [`usize::MAX`] chunks.
    #[must_use]
    pub fn new(grid_shape: GridShape) -> Self {
        let length = grid_shape
            .iter()
            .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
            .and_then(|length| usize::try_from(length).ok())
            .unwrap_or(usize::MAX);
        Self {
            grid_shape,
            range: 0..length,
        }
    }

    /// The grid shape.
    #[must_use]
    pub fn grid_shape(&self) -> &[u64] {
        &self.grid_shape
    }

    /// Return the number of chunk indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.range.end.saturating_sub(self.range.start)
    }

    /// Returns true if the number of chunk indices is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create a new serial iterator.
    #[must_use]
    pub fn iter(&self) -> GridIndicesIterator<'_> {
        <&Self as IntoIterator>::into_iter(self)
    }
}

impl<'a> IntoIterator for &'a GridIndices {
    type Item = ChunkIndicesTinyVec;
    type IntoIter = GridIndicesIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        GridIndicesIterator {
            grid_shape: &self.grid_shape,
            range: self.range.clone(),
        }
    }
}

impl IntoIterator for GridIndices {
    type Item = ChunkIndicesTinyVec;
    type IntoIter = GridIndicesIntoIterator;

    fn into_iter(self) -> Self::IntoIter {
        GridIndicesIntoIterator {
            grid_shape: self.grid_shape,
            range: self.range,
        }
    }
}

impl IntoParallelIterator for GridIndices {
    type Item = ChunkIndicesTinyVec;
    type Iter = ParGridIndicesIntoIterator;

    fn into_par_iter(self) -> Self::Iter {
        ParGridIndicesIntoIterator {
            grid_shape: self.grid_shape,
            range: self.range,
        }
    }
}

/// Serial grid indices iterator.
///
/// See [`GridIndices`].
#[derive(Clone, Debug)]
pub struct GridIndicesIterator<'a> {
    pub(crate) grid_shape: &'a [u64],
    pub(crate) range: std::ops::Range<usize>,
}

/// Serial grid indices iterator.
///
/// See [`GridIndices`].
#[derive(Clone, Debug)]
pub struct GridIndicesIntoIterator {
    pub(crate) grid_shape: GridShape,
    pub(crate) range: std::ops::Range<usize>,
}

macro_rules! impl_grid_indices_iterator {
    ($iterator_type:ty) => {
        impl Iterator for $iterator_type {
            type Item = ChunkIndicesTinyVec;

            fn next(&mut self) -> Option<Self::Item> {
                if self.range.start >= self.range.end {
                    return None;
                }
                let index = self.range.start as u64;
                self.range.start += 1;
                unravel_index(index, &self.grid_shape)
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                let length = self.range.end.saturating_sub(self.range.start);
                (length, Some(length))
            }
        }

        impl DoubleEndedIterator for $iterator_type {
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.range.end > self.range.start {
                    self.range.end -= 1;
                    unravel_index(self.range.end as u64, &self.grid_shape)
                } else {
                    None
                }
            }
        }

        impl ExactSizeIterator for $iterator_type {}

        impl FusedIterator for $iterator_type {}
    };
}

impl_grid_indices_iterator!(GridIndicesIterator<'_>);
impl_grid_indices_iterator!(GridIndicesIntoIterator);

/// Parallel grid indices iterator.
///
/// See [`GridIndices`].
#[derive(Debug)]
pub struct ParGridIndicesIntoIterator {
    pub(crate) grid_shape: GridShape,
    pub(crate) range: std::ops::Range<usize>,
}

impl ParallelIterator for ParGridIndicesIntoIterator {
    type Item = ChunkIndicesTinyVec;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge(self, consumer)
    }

    fn opt_len(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl IndexedParallelIterator for ParGridIndicesIntoIterator {
    fn with_producer<CB: ProducerCallback<Self::Item>>(self, callback: CB) -> CB::Output {
        callback.callback(self)
    }

    fn drive<C: Consumer<Self::Item>>(self, consumer: C) -> C::Result {
        bridge(self, consumer)
    }

    fn len(&self) -> usize {
        self.range.end.saturating_sub(self.range.start)
    }
}

impl Producer for ParGridIndicesIntoIterator {
    type Item = ChunkIndicesTinyVec;
    type IntoIter = GridIndicesIntoIterator;

    fn into_iter(self) -> Self::IntoIter {
        GridIndicesIntoIterator {
            grid_shape: self.grid_shape,
            range: self.range,
        }
    }

    fn split_at(self, index: usize) -> (Self, Self) {
        let left = ParGridIndicesIntoIterator {
            grid_shape: self.grid_shape.clone(),
            range: self.range.start..self.range.start + index,
        };
        let right = ParGridIndicesIntoIterator {
            grid_shape: self.grid_shape,
            range: (self.range.start + index)..self.range.end,
        };
        (left, right)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use super::*;

    fn to_vecs(indices: Vec<ChunkIndicesTinyVec>) -> Vec<Vec<u64>> {
        indices.into_iter().map(|i| i.to_vec()).collect_vec()
    }

    #[test]
    fn grid_indices_c_order() {
        let indices = GridIndices::new(vec![2, 3]);
        assert_eq!(indices.len(), 6);
        assert!(!indices.is_empty());

        let mut iter = indices.iter();
        assert_eq!(iter.size_hint(), (6, Some(6)));
        assert_eq!(iter.next().unwrap().as_slice(), &[0, 0]);
        assert_eq!(iter.next_back().unwrap().as_slice(), &[1, 2]);
        assert_eq!(iter.next().unwrap().as_slice(), &[0, 1]);
        assert_eq!(iter.size_hint(), (3, Some(3)));

        let expected = vec![
            vec![0, 0],
            vec![0, 1],
            vec![0, 2],
            vec![1, 0],
            vec![1, 1],
            vec![1, 2],
        ];
        assert_eq!(to_vecs(indices.iter().collect()), expected);
        assert_eq!(to_vecs(indices.clone().into_iter().collect()), expected);
        assert_eq!(to_vecs(indices.into_par_iter().collect()), expected);
    }

    #[test]
    fn grid_indices_restartable() {
        let indices = GridIndices::new(vec![3, 1, 2]);
        let first = indices.iter().map(|i| i.to_vec()).collect_vec();
        let second = indices.iter().map(|i| i.to_vec()).collect_vec();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert_eq!(first.last().unwrap(), &vec![2, 0, 1]);
    }

    #[test]
    fn grid_indices_empty() {
        let indices = GridIndices::new(vec![4, 0, 2]);
        assert!(indices.is_empty());
        assert_eq!(indices.iter().next(), None);
        assert_eq!(indices.into_par_iter().count(), 0);
    }

    #[test]
    fn grid_indices_zero_dimensional() {
        let indices = GridIndices::new(vec![]);
        assert_eq!(indices.len(), 1);
        let all = indices.iter().collect_vec();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_empty());
    }

    #[test]
    fn grid_indices_parallel_sum() {
        let indices = GridIndices::new(vec![10, 10, 10, 10, 10]);
        let serial: u64 = indices.iter().map(|i| i.iter().sum::<u64>()).sum();
        let parallel: u64 = indices
            .clone()
            .into_par_iter()
            .map(|i| i.iter().sum::<u64>())
            .sum();
        assert_eq!(serial, parallel);
        assert_eq!(serial, 5 * 45 * 10_000);
    }
}
