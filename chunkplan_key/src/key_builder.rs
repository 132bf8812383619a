use std::{
    collections::{BTreeMap, HashMap},
    hash::BuildHasher,
    num::NonZeroU64,
};

use crate::{ArityMismatchError, ChunkKey, MissingDimensionError};

/// Look up the resolved chunk size of a dimension.
pub trait ChunkSizeLookup {
    /// Return the chunk size of `dimension`, or [`None`] if the dimension is unknown.
    fn chunk_size(&self, dimension: &str) -> Option<NonZeroU64>;
}

impl<S: BuildHasher> ChunkSizeLookup for HashMap<String, NonZeroU64, S> {
    fn chunk_size(&self, dimension: &str) -> Option<NonZeroU64> {
        self.get(dimension).copied()
    }
}

impl ChunkSizeLookup for BTreeMap<String, NonZeroU64> {
    fn chunk_size(&self, dimension: &str) -> Option<NonZeroU64> {
        self.get(dimension).copied()
    }
}

impl<T: ChunkSizeLookup + ?Sized> ChunkSizeLookup for &T {
    fn chunk_size(&self, dimension: &str) -> Option<NonZeroU64> {
        (**self).chunk_size(dimension)
    }
}

/// Builds the chunk keys of one variable.
///
/// The variable's dimensions are validated against the chunk sizes once, on construction.
/// Afterwards, each chunk key is derived from the global chunk start offsets of a chunk, one per dimension in the variable's own dimension order.
/// A chunk index is `chunk_start / chunk_size`, so keys do not depend on the order in which chunks are visited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBuilder {
    variable: String,
    chunk_sizes: Vec<NonZeroU64>,
}

impl KeyBuilder {
    /// Create a key builder for `variable` with `dimensions`.
    ///
    /// # Errors
    /// Returns a [`MissingDimensionError`] if any of `dimensions` has no chunk size in `chunk_sizes`.
    pub fn new<S: AsRef<str>>(
        variable: impl Into<String>,
        dimensions: &[S],
        chunk_sizes: &impl ChunkSizeLookup,
    ) -> Result<Self, MissingDimensionError> {
        let variable = variable.into();
        let chunk_sizes = dimensions
            .iter()
            .map(|dimension| {
                let dimension = dimension.as_ref();
                chunk_sizes
                    .chunk_size(dimension)
                    .ok_or_else(|| MissingDimensionError::new(variable.clone(), dimension))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            variable,
            chunk_sizes,
        })
    }

    /// The variable name.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The chunk size of each dimension of the variable.
    #[must_use]
    pub fn chunk_sizes(&self) -> &[NonZeroU64] {
        &self.chunk_sizes
    }

    /// The dimensionality of the variable.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.chunk_sizes.len()
    }

    /// Return the chunk indices of the chunk starting at `chunk_starts`.
    ///
    /// # Errors
    /// Returns an [`ArityMismatchError`] if the length of `chunk_starts` does not match the dimensionality of the variable.
    pub fn chunk_indices(&self, chunk_starts: &[u64]) -> Result<Vec<u64>, ArityMismatchError> {
        self.check_arity(chunk_starts.len())?;
        Ok(std::iter::zip(chunk_starts, &self.chunk_sizes)
            .map(|(start, chunk_size)| start / chunk_size.get())
            .collect())
    }

    /// Build the chunk key of the chunk starting at `chunk_starts`.
    ///
    /// # Errors
    /// Returns an [`ArityMismatchError`] if the length of `chunk_starts` does not match the dimensionality of the variable.
    pub fn build(&self, chunk_starts: &[u64]) -> Result<ChunkKey, ArityMismatchError> {
        let chunk_indices = self.chunk_indices(chunk_starts)?;
        Ok(ChunkKey::new(&self.variable, &chunk_indices))
    }

    /// Build the chunk key of the chunk at `chunk_indices`.
    ///
    /// # Errors
    /// Returns an [`ArityMismatchError`] if the length of `chunk_indices` does not match the dimensionality of the variable.
    pub fn build_from_indices(&self, chunk_indices: &[u64]) -> Result<ChunkKey, ArityMismatchError> {
        self.check_arity(chunk_indices.len())?;
        Ok(ChunkKey::new(&self.variable, chunk_indices))
    }

    /// Build the chunk key of the chunk at `chunk_indices` without checking its arity.
    ///
    /// The caller must supply one index per dimension of the variable, otherwise the key is malformed.
    #[must_use]
    pub fn build_from_indices_unchecked(&self, chunk_indices: &[u64]) -> ChunkKey {
        debug_assert_eq!(chunk_indices.len(), self.dimensionality());
        ChunkKey::new(&self.variable, chunk_indices)
    }

    fn check_arity(&self, got: usize) -> Result<(), ArityMismatchError> {
        if got == self.dimensionality() {
            Ok(())
        } else {
            Err(ArityMismatchError::new(
                self.variable.clone(),
                got,
                self.dimensionality(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_sizes() -> HashMap<String, NonZeroU64> {
        [("time", 5), ("lat", 90), ("lon", 180)]
            .into_iter()
            .map(|(dimension, size)| (dimension.to_string(), NonZeroU64::new(size).unwrap()))
            .collect()
    }

    #[test]
    fn key_builder_build() {
        let builder = KeyBuilder::new("var", &["time", "lat", "lon"], &chunk_sizes()).unwrap();
        assert_eq!(builder.variable(), "var");
        assert_eq!(builder.dimensionality(), 3);
        assert_eq!(builder.build(&[0, 0, 0]).unwrap().as_str(), "var/0.0.0");
        assert_eq!(builder.build(&[5, 90, 0]).unwrap().as_str(), "var/1.1.0");
        assert_eq!(
            builder.build_from_indices(&[1, 1, 0]).unwrap().as_str(),
            "var/1.1.0"
        );
        assert_eq!(
            builder.build_from_indices_unchecked(&[0, 1, 0]).as_str(),
            "var/0.1.0"
        );
    }

    #[test]
    fn key_builder_own_dimension_order() {
        let builder = KeyBuilder::new("lat_bnds", &["lat", "bnds"], &{
            let mut sizes = chunk_sizes();
            sizes.insert("bnds".to_string(), NonZeroU64::new(2).unwrap());
            sizes
        })
        .unwrap();
        assert_eq!(builder.build(&[90, 0]).unwrap().as_str(), "lat_bnds/1.0");
    }

    #[test]
    fn key_builder_missing_dimension() {
        let error = KeyBuilder::new("var", &["time", "depth"], &chunk_sizes()).unwrap_err();
        assert_eq!(error, MissingDimensionError::new("var", "depth"));
        assert_eq!(error.variable(), "var");
        assert_eq!(error.dimension(), "depth");
    }

    #[test]
    fn key_builder_arity_mismatch() {
        let builder = KeyBuilder::new("var", &["time", "lat"], &chunk_sizes()).unwrap();
        let error = builder.build(&[0]).unwrap_err();
        assert_eq!(error, ArityMismatchError::new("var", 1, 2));
        assert_eq!(
            error.to_string(),
            "got 1 chunk indices for variable `var`, expected 2"
        );
        assert!(builder.build_from_indices(&[0, 0, 0]).is_err());
    }

    #[test]
    fn key_builder_scalar() {
        let builder = KeyBuilder::new("scalar", &[] as &[&str], &chunk_sizes()).unwrap();
        assert_eq!(builder.build(&[]).unwrap().as_str(), "scalar/0");
    }

    #[test]
    fn key_builder_monotonic() {
        let builder = KeyBuilder::new("var", &["time"], &chunk_sizes()).unwrap();
        let indices: Vec<u64> = (0..50)
            .map(|start| builder.chunk_indices(&[start]).unwrap()[0])
            .collect();
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(indices[4], 0);
        assert_eq!(indices[5], 1);
        assert_eq!(indices[49], 9);
    }

    #[test]
    fn key_builder_btree_lookup() {
        let sizes: BTreeMap<String, NonZeroU64> = chunk_sizes().into_iter().collect();
        let builder = KeyBuilder::new("var", &["lon"], &sizes).unwrap();
        assert_eq!(builder.build(&[180]).unwrap().as_str(), "var/1");
    }
}
