use std::ops::Range;

use crate::{
    iterators::GridIndices, ChunkIndices, ChunkStarts, GridShape, IncompatibleDimensionalityError,
};

/// A regular chunk grid over an ordered set of dimensions.
///
/// Each dimension has its own [`ChunkStarts`].
/// A zero-dimensional grid has exactly one chunk with empty chunk indices.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ChunkGrid {
    dimensions: Vec<ChunkStarts>,
}

impl FromIterator<ChunkStarts> for ChunkGrid {
    fn from_iter<T: IntoIterator<Item = ChunkStarts>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl ChunkGrid {
    /// Create a new chunk grid from the chunk starts of each dimension.
    #[must_use]
    pub fn new(dimensions: Vec<ChunkStarts>) -> Self {
        Self { dimensions }
    }

    /// The dimensionality of the grid.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.dimensions.len()
    }

    /// The chunk starts of each dimension.
    #[must_use]
    pub fn dimensions(&self) -> &[ChunkStarts] {
        &self.dimensions
    }

    /// The grid shape (i.e. number of chunks along each dimension).
    #[must_use]
    pub fn grid_shape(&self) -> GridShape {
        self.dimensions.iter().map(ChunkStarts::num_chunks).collect()
    }

    /// The total number of chunks in the grid.
    ///
    /// Saturates at [`u64::MAX`].
    #[must_use]
    pub fn num_chunks(&self) -> u64 {
        self.dimensions
            .iter()
            .map(ChunkStarts::num_chunks)
            .fold(1u64, u64::saturating_mul)
    }

    /// Returns true if `chunk_indices` are within the bounds of the grid.
    #[must_use]
    pub fn chunk_indices_inbounds(&self, chunk_indices: &[u64]) -> bool {
        chunk_indices.len() == self.dimensionality()
            && std::iter::zip(chunk_indices, &self.dimensions)
                .all(|(&index, starts)| index < starts.num_chunks())
    }

    /// The global start offsets of the chunk at `chunk_indices`.
    ///
    /// Returns [`None`] if `chunk_indices` are out of bounds.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if `chunk_indices` do not match the dimensionality of the grid.
    pub fn chunk_starts(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<ChunkIndices>, IncompatibleDimensionalityError> {
        self.check_dimensionality(chunk_indices)?;
        Ok(std::iter::zip(chunk_indices, &self.dimensions)
            .map(|(&index, starts)| starts.chunk_start(index))
            .collect())
    }

    /// The global extent `[start, end)` along each dimension of the chunk at `chunk_indices`.
    ///
    /// Returns [`None`] if `chunk_indices` are out of bounds.
    ///
    /// # Errors
    /// Returns [`IncompatibleDimensionalityError`] if `chunk_indices` do not match the dimensionality of the grid.
    pub fn chunk_extents(
        &self,
        chunk_indices: &[u64],
    ) -> Result<Option<Vec<Range<u64>>>, IncompatibleDimensionalityError> {
        self.check_dimensionality(chunk_indices)?;
        Ok(std::iter::zip(chunk_indices, &self.dimensions)
            .map(|(&index, starts)| starts.chunk_extent(index))
            .collect())
    }

    /// Return the indices of every chunk in the grid.
    ///
    /// The indices are produced lazily in C order (last dimension fastest).
    #[must_use]
    pub fn indices(&self) -> GridIndices {
        GridIndices::new(self.grid_shape())
    }

    fn check_dimensionality(
        &self,
        chunk_indices: &[u64],
    ) -> Result<(), IncompatibleDimensionalityError> {
        if chunk_indices.len() == self.dimensionality() {
            Ok(())
        } else {
            Err(IncompatibleDimensionalityError::new(
                chunk_indices.len(),
                self.dimensionality(),
            ))
        }
    }
}
