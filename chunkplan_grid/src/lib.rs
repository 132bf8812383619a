//! The chunk grid API for the [`chunkplan`](https://docs.rs/chunkplan/latest/chunkplan/index.html) crate.
//!
//! - [`resolve_chunk_size`] picks the chunk size of a dimension from a requested size, a native size, or the whole dimension.
//! - [`ChunkStarts`] is the lazy, restartable sequence of chunk start offsets along one dimension.
//! - [`ChunkGrid`] combines the chunk starts of several dimensions and iterates over their cartesian product with [`iterators::GridIndices`].
//!
//! ## Licence
//! `chunkplan_grid` is licensed under either of
//!  - the Apache License, Version 2.0 [LICENSE-APACHE](https://docs.rs/crate/chunkplan_grid/latest/source/LICENCE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license [LICENSE-MIT](https://docs.rs/crate/chunkplan_grid/latest/source/LICENCE-MIT) or <http://opensource.org/licenses/MIT>, at your option.
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted for inclusion in the work by you, as defined in the Apache-2.0 license, shall be dual licensed as above, without any additional terms or conditions.

mod chunk_size;
pub use chunk_size::{
    resolve_chunk_size, ChunkSizeOrigin, InvalidChunkSizeError, ResolvedChunkSize,
};

mod chunk_starts;
pub use chunk_starts::{ChunkStarts, ChunkStartsIterator};

mod chunk_grid;
pub use chunk_grid::ChunkGrid;

pub mod iterators;

/// An ND index to a chunk in a chunk grid.
pub type ChunkIndices = Vec<u64>;

/// An ND index to a chunk in a chunk grid.
/// Uses [`TinyVec`](tinyvec::TinyVec) for stack allocation up to 4 dimensions.
pub type ChunkIndicesTinyVec = tinyvec::TinyVec<[u64; 4]>;

/// The number of chunks along each dimension of a chunk grid.
pub type GridShape = Vec<u64>;

/// An incompatible dimensionality error.
#[derive(Copy, Clone, Debug, thiserror::Error)]
#[error("incompatible dimensionality {0}, expected {1}")]
pub struct IncompatibleDimensionalityError(usize, usize);

impl IncompatibleDimensionalityError {
    /// Create a new incompatible dimensionality error.
    #[must_use]
    pub const fn new(got: usize, expected: usize) -> Self {
        Self(got, expected)
    }
}

/// Unravel a linearised index to ND indices.
///
/// Returns [`None`] if `index` is not less than the number of elements in `shape`.
#[must_use]
fn unravel_index(mut index: u64, shape: &[u64]) -> Option<ChunkIndicesTinyVec> {
    let total_size: u64 = shape
        .iter()
        .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))?;
    if index >= total_size {
        return None;
    }

    // Specialised routines for dimensions <=3, unrolled and no dynamic allocation
    match shape.len() {
        0 => Some(ChunkIndicesTinyVec::new()),
        1 => Some(tinyvec::tiny_vec!([u64; 4] => index)),
        2 => {
            let i1 = index % shape[1];
            index /= shape[1];
            Some(tinyvec::tiny_vec!([u64; 4] => index, i1))
        }
        3 => {
            let i2 = index % shape[2];
            index /= shape[2];
            let i1 = index % shape[1];
            index /= shape[1];
            Some(tinyvec::tiny_vec!([u64; 4] => index, i1, i2))
        }
        _ => {
            let mut indices = ChunkIndicesTinyVec::with_capacity(shape.len());
            indices.resize(shape.len(), 0);
            for (indices_i, &dim) in std::iter::zip(indices.iter_mut().rev(), shape.iter().rev())
            {
                *indices_i = index % dim;
                index /= dim;
            }
            Some(indices)
        }
    }
}
