use std::num::NonZeroU64;

use chunkplan_grid::{
    resolve_chunk_size, ChunkGrid, ChunkSizeOrigin, ChunkStarts, InvalidChunkSizeError,
};
use chunkplan_key::{ChunkSizeLookup, MissingDimensionError};
use indexmap::IndexMap;

use crate::{DatasetLayout, VariableDescriptor};

/// Requested chunk sizes, keyed by dimension name.
///
/// Dimensions that are not requested fall back to their native chunk size, or to the whole dimension.
pub type ChunkRequest = IndexMap<String, u64>;

/// The resolved chunk size of every dimension of a dataset.
///
/// Resolved once per planning request with precedence: requested > native > whole dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkSpec {
    dimensions: IndexMap<String, (ChunkStarts, ChunkSizeOrigin)>,
}

impl ChunkSpec {
    /// Resolve the chunk size of every dimension of `layout`.
    ///
    /// Requested dimensions that are not in `layout` are ignored with a warning.
    ///
    /// # Errors
    /// Returns an [`InvalidChunkSizeError`] if a requested or native chunk size is zero.
    pub fn resolve(
        layout: &DatasetLayout,
        request: &ChunkRequest,
    ) -> Result<Self, InvalidChunkSizeError> {
        for name in request.keys() {
            if layout.dimension(name).is_none() {
                log::warn!(
                    "A chunk size was requested for dimension `{name}` which is not in the dataset, ignoring."
                );
            }
        }

        let mut dimensions = IndexMap::with_capacity(layout.dimensions().len());
        for (name, dimension) in layout.dimensions() {
            let size = dimension.size();
            let resolved = resolve_chunk_size(
                name,
                size,
                request.get(name).copied(),
                dimension.chunk_size(),
            )?;
            let chunk_size = resolved.chunk_size();
            log::debug!(
                "dimension `{name}` of size {size} has {} chunk size {chunk_size}",
                resolved.origin()
            );
            if resolved.origin() == ChunkSizeOrigin::Requested && chunk_size.get() > size && size > 0
            {
                log::warn!(
                    "The requested chunk size {chunk_size} for dimension `{name}` exceeds its size {size}, it will be a single chunk."
                );
            }
            dimensions.insert(
                name.clone(),
                (ChunkStarts::new(size, chunk_size), resolved.origin()),
            );
        }
        Ok(Self { dimensions })
    }

    /// The number of dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Returns true if there are no dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// The chunk starts of `dimension`.
    #[must_use]
    pub fn chunk_starts(&self, dimension: &str) -> Option<ChunkStarts> {
        self.dimensions.get(dimension).map(|(starts, _)| *starts)
    }

    /// Where the chunk size of `dimension` came from.
    #[must_use]
    pub fn origin(&self, dimension: &str) -> Option<ChunkSizeOrigin> {
        self.dimensions.get(dimension).map(|(_, origin)| *origin)
    }

    /// Iterate over the dimension names and their chunk sizes, in dataset order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NonZeroU64)> {
        self.dimensions
            .iter()
            .map(|(name, (starts, _))| (name.as_str(), starts.chunk_size()))
    }

    /// The chunk grid of `variable`, over its own dimensions only.
    ///
    /// # Errors
    /// Returns a [`MissingDimensionError`] if `variable` uses a dimension that is not in the chunk spec.
    pub fn chunk_grid(
        &self,
        variable: &VariableDescriptor,
    ) -> Result<ChunkGrid, MissingDimensionError> {
        variable
            .dimensions()
            .iter()
            .map(|dimension| {
                self.chunk_starts(dimension)
                    .ok_or_else(|| MissingDimensionError::new(variable.name(), dimension))
            })
            .collect()
    }
}

impl ChunkSizeLookup for ChunkSpec {
    fn chunk_size(&self, dimension: &str) -> Option<NonZeroU64> {
        self.chunk_starts(dimension).map(|starts| starts.chunk_size())
    }
}
