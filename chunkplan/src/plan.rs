use chunkplan_key::{ChunkKey, DimensionChunkKey};
use indexmap::IndexMap;
use serde::Serialize;

use crate::DimensionSlice;

/// The source read ranges of one chunk, keyed by dimension name in the variable's own dimension order.
pub type ChunkSlices = IndexMap<String, Vec<DimensionSlice>>;

/// A chunk plan.
///
/// Maps the [`ChunkKey`] of every chunk of every variable to the source read ranges that supply it.
/// Chunks are ordered by variable, then in C order within a variable.
///
/// A plan may also hold a shared dimension index: for every `<dimension>/<chunk_index>`, the order-preserving union of the slices of every variable along that dimension chunk.
///
/// Serializes to JSON as
/// ```json
/// {
///   "chunks": { "var/0.0": { "time": [[0, 0, 2], [1, 0, 1]], "x": [[0, 0, 3]] } },
///   "dimension_index": { "time/0": [[0, 0, 2], [1, 0, 1]], "x/0": [[0, 0, 3]] }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChunkPlan {
    chunks: IndexMap<ChunkKey, ChunkSlices>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    dimension_index: IndexMap<DimensionChunkKey, Vec<DimensionSlice>>,
}

impl ChunkPlan {
    /// Create an empty chunk plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the slices of the chunk with `key`.
    ///
    /// If `shared_dimension_index` is true, each slice is also appended to the shared dimension index unless it is already present.
    pub(crate) fn insert(
        &mut self,
        key: ChunkKey,
        slices: ChunkSlices,
        shared_dimension_index: bool,
    ) {
        if shared_dimension_index {
            for ((dimension, dimension_slices), chunk_index) in
                std::iter::zip(&slices, key.chunk_indices())
            {
                let union = self
                    .dimension_index
                    .entry(DimensionChunkKey::new(dimension.as_str(), chunk_index))
                    .or_default();
                for slice in dimension_slices {
                    if !union.contains(slice) {
                        union.push(*slice);
                    }
                }
            }
        }
        self.chunks.insert(key, slices);
    }

    /// The number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if the plan has no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The slices of the chunk with `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ChunkSlices> {
        self.chunks.get(key)
    }

    /// The slices of the chunk with `key` along `dimension`.
    #[must_use]
    pub fn slices(&self, key: &str, dimension: &str) -> Option<&[DimensionSlice]> {
        self.get(key)
            .and_then(|slices| slices.get(dimension))
            .map(Vec::as_slice)
    }

    /// The chunks of the plan.
    #[must_use]
    pub fn chunks(&self) -> &IndexMap<ChunkKey, ChunkSlices> {
        &self.chunks
    }

    /// Iterate over the chunk keys.
    pub fn keys(&self) -> impl Iterator<Item = &ChunkKey> {
        self.chunks.keys()
    }

    /// Iterate over the chunk keys of `variable`.
    pub fn keys_for_variable<'a>(
        &'a self,
        variable: &'a str,
    ) -> impl Iterator<Item = &'a ChunkKey> + 'a {
        self.chunks
            .keys()
            .filter(move |key| key.variable() == variable)
    }

    /// The shared dimension index.
    ///
    /// Empty if the plan was built without a shared dimension index.
    #[must_use]
    pub fn dimension_index(&self) -> &IndexMap<DimensionChunkKey, Vec<DimensionSlice>> {
        &self.dimension_index
    }

    /// The union of the slices of every variable in the chunk at `chunk_index` along `dimension`.
    #[must_use]
    pub fn dimension_slices(&self, dimension: &str, chunk_index: u64) -> Option<&[DimensionSlice]> {
        self.dimension_index
            .get(&DimensionChunkKey::new(dimension, chunk_index))
            .map(Vec::as_slice)
    }

    /// Serialize the plan to pretty printed JSON.
    ///
    /// # Errors
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl IntoIterator for ChunkPlan {
    type Item = (ChunkKey, ChunkSlices);
    type IntoIter = indexmap::map::IntoIter<ChunkKey, ChunkSlices>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChunkPlan {
    type Item = (&'a ChunkKey, &'a ChunkSlices);
    type IntoIter = indexmap::map::Iter<'a, ChunkKey, ChunkSlices>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}
