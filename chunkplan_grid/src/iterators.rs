//! Chunk grid iterators.
//!
//! [`GridIndices`] iterates over the chunk indices of a [`ChunkGrid`](crate::ChunkGrid), created with [`ChunkGrid::indices`](crate::ChunkGrid::indices).
//!
//! It supports [`into_iter()`](IntoIterator::into_iter) ([`IntoIterator`]) and, when owned, [`rayon`]'s [`into_par_iter()`](rayon::iter::IntoParallelIterator::into_par_iter) ([`IntoParallelIterator`](rayon::iter::IntoParallelIterator)).

mod grid_indices;

pub use grid_indices::{
    GridIndices, GridIndicesIntoIterator, GridIndicesIterator, ParGridIndicesIntoIterator,
};
