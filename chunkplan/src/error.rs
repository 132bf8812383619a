use chunkplan_grid::InvalidChunkSizeError;
use chunkplan_key::{ArityMismatchError, ChunkKey, ChunkKeyParseError, MissingDimensionError};
use thiserror::Error;

/// An error preventing sources from being concatenated.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InvalidConcatenationError {
    /// A source has no ordering value along the concatenation dimension and no manual order was supplied.
    #[error("source {source_index} has no index along dimension `{dimension}`, concatenate in a manual order instead")]
    MissingIndex {
        /// The concatenation dimension.
        dimension: String,
        /// The index of the offending source.
        source_index: usize,
    },
    /// Sources are not in ascending order of their ordering values.
    #[error("source {source_index} has index {value} along dimension `{dimension}` which does not follow {previous}, sources must already be in ascending order")]
    Unordered {
        /// The concatenation dimension.
        dimension: String,
        /// The index of the offending source.
        source_index: usize,
        /// The ordering value of the offending source.
        value: f64,
        /// The ordering value of the preceding source.
        previous: f64,
    },
    /// A source does not have the concatenation dimension.
    #[error("source {source_index} does not have the concatenation dimension `{dimension}`")]
    MissingDimension {
        /// The concatenation dimension.
        dimension: String,
        /// The index of the offending source.
        source_index: usize,
    },
    /// Sources disagree on the size of a dimension other than the concatenation dimension.
    #[error("source {source_index} has size {size} along dimension `{dimension}`, expected {expected}")]
    MismatchedDimension {
        /// The mismatched dimension.
        dimension: String,
        /// The index of the offending source.
        source_index: usize,
        /// The size of the dimension in the offending source.
        size: u64,
        /// The size of the dimension in an earlier source.
        expected: u64,
    },
    /// Sources disagree on the dimensions of a variable.
    #[error("source {source_index} has dimensions {dimensions:?} for variable `{variable}`, expected {expected:?}")]
    MismatchedVariable {
        /// The mismatched variable.
        variable: String,
        /// The index of the offending source.
        source_index: usize,
        /// The dimensions of the variable in the offending source.
        dimensions: Vec<String>,
        /// The dimensions of the variable in an earlier source.
        expected: Vec<String>,
    },
}

/// An error in a dataset layout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidLayoutError {
    /// A variable uses a dimension that is not a dimension of the dataset.
    #[error(transparent)]
    MissingDimension(#[from] MissingDimensionError),
    /// A variable lists the same dimension more than once.
    #[error("variable `{variable}` lists dimension `{dimension}` more than once")]
    RepeatedDimension {
        /// The variable.
        variable: String,
        /// The repeated dimension.
        dimension: String,
    },
    /// A variable has an empty name.
    #[error("a variable with dimensions {0:?} has an empty name")]
    EmptyVariableName(Vec<String>),
    /// A dimension has an empty name.
    #[error("a dimension of size {0} has an empty name")]
    EmptyDimensionName(u64),
}

/// A chunk planning error.
#[derive(Clone, Debug, Error)]
pub enum PlanError {
    /// A variable references an undefined dimension.
    #[error(transparent)]
    MissingDimension(#[from] MissingDimensionError),
    /// The number of chunk indices does not match the dimensionality of a variable.
    #[error(transparent)]
    ArityMismatch(#[from] ArityMismatchError),
    /// A dataset layout is invalid.
    #[error(transparent)]
    InvalidLayout(#[from] InvalidLayoutError),
    /// Sources cannot be concatenated.
    #[error(transparent)]
    InvalidConcatenation(#[from] InvalidConcatenationError),
    /// A chunk size is not positive.
    #[error(transparent)]
    InvalidChunkSize(#[from] InvalidChunkSizeError),
    /// A chunk key is malformed.
    #[error(transparent)]
    ChunkKeyParse(#[from] ChunkKeyParseError),
    /// No sources were supplied.
    #[error("no source datasets were supplied")]
    NoSources,
    /// Several sources were supplied but have not been concatenated.
    #[error("{0} source datasets must be concatenated before planning chunks")]
    UnmergedSources(usize),
    /// Only unmerged sources can be concatenated.
    #[error("only unmerged source datasets can be concatenated")]
    NotUnmerged,
    /// The variable is not in the dataset.
    #[error("variable `{0}` is not in the dataset")]
    UnknownVariable(String),
    /// The chunk indices of a chunk key are outside the chunk grid of its variable.
    #[error("chunk `{0}` is outside the chunk grid of its variable")]
    ChunkOutOfBounds(ChunkKey),
}
