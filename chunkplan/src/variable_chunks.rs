use std::iter::FusedIterator;

use chunkplan_grid::{iterators::GridIndicesIntoIterator, ChunkGrid, ChunkIndicesTinyVec};
use rayon::prelude::*;
use chunkplan_key::{ChunkKey, KeyBuilder, MissingDimensionError};

use crate::{ChunkSlices, ChunkSpec, Concatenation, SliceResolver, VariableDescriptor};

/// A lazy iterator over the chunks of one variable.
///
/// Yields the [`ChunkKey`] and [`ChunkSlices`] of each chunk in C order (last dimension fastest).
/// Only the variable's own dimensions are iterated, and only one chunk is held at a time.
///
/// Created by [`Planner::iter_variable_chunks`](crate::Planner::iter_variable_chunks).
#[derive(Clone, Debug)]
pub struct VariableChunks<'a> {
    key_builder: KeyBuilder,
    grid: ChunkGrid,
    dimensions: Vec<(&'a str, SliceResolver<'a>)>,
    indices: GridIndicesIntoIterator,
}

impl<'a> VariableChunks<'a> {
    pub(crate) fn new(
        variable: &'a VariableDescriptor,
        spec: &ChunkSpec,
        concatenation: Option<&'a Concatenation>,
    ) -> Result<Self, MissingDimensionError> {
        let key_builder = KeyBuilder::new(variable.name(), variable.dimensions(), spec)?;
        let grid = spec.chunk_grid(variable)?;
        let dimensions = std::iter::zip(variable.dimensions(), grid.dimensions())
            .map(|(name, starts)| {
                let resolver = match concatenation {
                    Some(concatenation) if concatenation.dimension() == name.as_str() => {
                        SliceResolver::new(concatenation.map().segments())
                    }
                    _ => SliceResolver::whole(starts.size()),
                };
                (name.as_str(), resolver)
            })
            .collect();
        let indices = grid.indices().into_iter();
        Ok(Self {
            key_builder,
            grid,
            dimensions,
            indices,
        })
    }

    /// The variable name.
    #[must_use]
    pub fn variable(&self) -> &str {
        self.key_builder.variable()
    }

    /// The chunk grid of the variable.
    #[must_use]
    pub fn chunk_grid(&self) -> &ChunkGrid {
        &self.grid
    }

    /// The chunk at `chunk_indices`, regardless of the position of the iterator.
    ///
    /// Returns [`None`] if `chunk_indices` are not in the chunk grid of the variable.
    #[must_use]
    pub fn get(&self, chunk_indices: &[u64]) -> Option<(ChunkKey, ChunkSlices)> {
        self.grid
            .chunk_indices_inbounds(chunk_indices)
            .then(|| self.chunk(chunk_indices))
    }

    /// Collect every chunk of the variable in C order, computing up to `concurrent_limit` chunks concurrently.
    ///
    /// The concurrent limit is disabled if set to zero.
    /// Chunks already yielded by the iterator are included.
    #[must_use]
    pub fn collect_concurrent(&self, concurrent_limit: usize) -> Vec<(ChunkKey, ChunkSlices)> {
        let chunk = |chunk_indices: ChunkIndicesTinyVec| self.chunk(&chunk_indices);
        crate::iter_concurrent_limit!(concurrent_limit, self.grid.indices(), map, chunk).collect()
    }

    fn chunk(&self, chunk_indices: &[u64]) -> (ChunkKey, ChunkSlices) {
        let key = self.key_builder.build_from_indices_unchecked(chunk_indices);
        let slices = std::iter::zip(
            std::iter::zip(&self.dimensions, self.grid.dimensions()),
            chunk_indices,
        )
        .map(|(((name, resolver), starts), &chunk_index)| {
            let extent = starts.extent(chunk_index * starts.chunk_size().get());
            ((*name).to_string(), resolver.resolve(extent))
        })
        .collect();
        (key, slices)
    }
}

impl Iterator for VariableChunks<'_> {
    type Item = (ChunkKey, ChunkSlices);

    fn next(&mut self) -> Option<Self::Item> {
        let chunk_indices = self.indices.next()?;
        Some(self.chunk(&chunk_indices))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl DoubleEndedIterator for VariableChunks<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let chunk_indices = self.indices.next_back()?;
        Some(self.chunk(&chunk_indices))
    }
}

impl ExactSizeIterator for VariableChunks<'_> {}

impl FusedIterator for VariableChunks<'_> {}
