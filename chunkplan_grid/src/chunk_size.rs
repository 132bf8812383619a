use std::num::NonZeroU64;

use derive_more::Display;
use thiserror::Error;

/// Where a resolved chunk size came from.
///
/// Ordered by precedence: a requested size overrides a native size, which overrides the whole dimension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum ChunkSizeOrigin {
    /// Explicitly requested by the caller.
    #[display("requested")]
    Requested,
    /// The existing chunking of the dataset.
    #[display("native")]
    Native,
    /// No chunking was known, so the dimension is a single chunk.
    #[display("whole dimension")]
    WholeDimension,
}

/// An invalid chunk size error.
#[derive(Clone, Debug, Error)]
#[error("invalid {origin} chunk size {chunk_size} for dimension `{dimension}`, chunk sizes must be positive")]
pub struct InvalidChunkSizeError {
    dimension: String,
    chunk_size: u64,
    origin: ChunkSizeOrigin,
}

impl InvalidChunkSizeError {
    /// Create a new invalid chunk size error.
    #[must_use]
    pub fn new(dimension: impl Into<String>, chunk_size: u64, origin: ChunkSizeOrigin) -> Self {
        Self {
            dimension: dimension.into(),
            chunk_size,
            origin,
        }
    }

    /// The dimension with the invalid chunk size.
    #[must_use]
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// The offending chunk size.
    #[must_use]
    pub const fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Where the offending chunk size came from.
    #[must_use]
    pub const fn origin(&self) -> ChunkSizeOrigin {
        self.origin
    }
}

/// A chunk size and where it came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedChunkSize {
    chunk_size: NonZeroU64,
    origin: ChunkSizeOrigin,
}

impl ResolvedChunkSize {
    /// The chunk size.
    #[must_use]
    pub const fn chunk_size(&self) -> NonZeroU64 {
        self.chunk_size
    }

    /// Where the chunk size came from.
    #[must_use]
    pub const fn origin(&self) -> ChunkSizeOrigin {
        self.origin
    }
}

/// Resolve the chunk size of `dimension` with `size` elements.
///
/// The first available of `requested`, `native`, and `size` is used.
/// An empty dimension falling back to its size resolves to a chunk size of one, so that it produces no chunks rather than an error.
///
/// # Errors
/// Returns [`InvalidChunkSizeError`] if the requested or native chunk size is zero.
pub fn resolve_chunk_size(
    dimension: &str,
    size: u64,
    requested: Option<u64>,
    native: Option<u64>,
) -> Result<ResolvedChunkSize, InvalidChunkSizeError> {
    let (chunk_size, origin) = match (requested, native) {
        (Some(requested), _) => (requested, ChunkSizeOrigin::Requested),
        (None, Some(native)) => (native, ChunkSizeOrigin::Native),
        (None, None) => (size.max(1), ChunkSizeOrigin::WholeDimension),
    };
    NonZeroU64::new(chunk_size)
        .map(|chunk_size| ResolvedChunkSize { chunk_size, origin })
        .ok_or_else(|| InvalidChunkSizeError::new(dimension, chunk_size, origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_precedence() {
        let resolved = resolve_chunk_size("time", 10, Some(3), Some(5)).unwrap();
        assert_eq!(resolved.chunk_size().get(), 3);
        assert_eq!(resolved.origin(), ChunkSizeOrigin::Requested);

        let resolved = resolve_chunk_size("time", 10, None, Some(5)).unwrap();
        assert_eq!(resolved.chunk_size().get(), 5);
        assert_eq!(resolved.origin(), ChunkSizeOrigin::Native);

        let resolved = resolve_chunk_size("time", 10, None, None).unwrap();
        assert_eq!(resolved.chunk_size().get(), 10);
        assert_eq!(resolved.origin(), ChunkSizeOrigin::WholeDimension);
    }

    #[test]
    fn chunk_size_empty_dimension() {
        let resolved = resolve_chunk_size("time", 0, None, None).unwrap();
        assert_eq!(resolved.chunk_size().get(), 1);
    }

    #[test]
    fn chunk_size_zero() {
        let err = resolve_chunk_size("lat", 10, Some(0), Some(5)).unwrap_err();
        assert_eq!(err.dimension(), "lat");
        assert_eq!(err.chunk_size(), 0);
        assert_eq!(err.origin(), ChunkSizeOrigin::Requested);
        assert_eq!(
            err.to_string(),
            "invalid requested chunk size 0 for dimension `lat`, chunk sizes must be positive"
        );

        let err = resolve_chunk_size("lat", 10, None, Some(0)).unwrap_err();
        assert_eq!(err.origin(), ChunkSizeOrigin::Native);
    }
}
