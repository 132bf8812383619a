//! The chunk key API for the [`chunkplan`](https://docs.rs/chunkplan/latest/chunkplan/index.html) crate.
//!
//! A [`ChunkKey`] identifies one chunk of one variable in a chunked key-value store.
//! Its format is `<variable>/<i0>.<i1>...<in>`: one non-negative chunk index per dimension, in the variable's own dimension order, dot-separated.
//! A [`KeyBuilder`] validates a variable against a set of chunk sizes once, then derives keys from chunk start offsets.
//!
//! ## Licence
//! `chunkplan_key` is licensed under either of
//!  - the Apache License, Version 2.0 [LICENSE-APACHE](https://docs.rs/crate/chunkplan_key/latest/source/LICENCE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license [LICENSE-MIT](https://docs.rs/crate/chunkplan_key/latest/source/LICENCE-MIT) or <http://opensource.org/licenses/MIT>, at your option.
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted for inclusion in the work by you, as defined in the Apache-2.0 license, shall be dual licensed as above, without any additional terms or conditions.

mod chunk_key;
pub use chunk_key::{ChunkKey, ChunkKeyParseError, DimensionChunkKey};

mod key_builder;
pub use key_builder::{ChunkSizeLookup, KeyBuilder};

use thiserror::Error;

/// The separator between a variable name and its chunk indices.
pub const VARIABLE_SEPARATOR: char = '/';

/// The separator between the chunk indices of a chunk key.
pub const INDEX_SEPARATOR: char = '.';

/// A variable references a dimension that is absent from the chunk sizes or dataset sizes.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("variable `{variable}` references dimension `{dimension}` which has no chunk size or dataset size")]
pub struct MissingDimensionError {
    variable: String,
    dimension: String,
}

impl MissingDimensionError {
    /// Create a new missing dimension error.
    #[must_use]
    pub fn new(variable: impl Into<String>, dimension: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            dimension: dimension.into(),
        }
    }

    /// The variable referencing the missing dimension.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The missing dimension.
    #[must_use]
    pub fn dimension(&self) -> &str {
        &self.dimension
    }
}

/// The number of chunk indices does not match the dimensionality of a variable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("got {got} chunk indices for variable `{variable}`, expected {expected}")]
pub struct ArityMismatchError {
    variable: String,
    got: usize,
    expected: usize,
}

impl ArityMismatchError {
    /// Create a new arity mismatch error.
    #[must_use]
    pub fn new(variable: impl Into<String>, got: usize, expected: usize) -> Self {
        Self {
            variable: variable.into(),
            got,
            expected,
        }
    }

    /// The variable.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// The number of chunk indices supplied.
    #[must_use]
    pub const fn got(&self) -> usize {
        self.got
    }

    /// The dimensionality of the variable.
    #[must_use]
    pub const fn expected(&self) -> usize {
        self.expected
    }
}
