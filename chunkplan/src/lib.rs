//! `chunkplan` plans how to rewrite one or more multidimensional datasets into a chunked key-value store.
//!
//! Given several sources joined end-to-end along one dimension and a target chunk grid (possibly different from the native chunking of the sources), `chunkplan` computes for every chunk of every variable:
//! - a deterministic [`ChunkKey`] of the form `<variable>/<i0>.<i1>...<in>`, and
//! - the exact, non-overlapping, gap-free source read ranges ([`DimensionSlice`]s) that supply it.
//!
//! `chunkplan` does not read or write any data.
//! It consumes only the [layout](DatasetLayout) of each source: dimension names and sizes, native chunk sizes, and the dimensions of each variable.
//!
//! ## Getting Started
//! ```
//! # use chunkplan::{ChunkRequest, ConcatOrder, DatasetLayout, Planner, SourceDataset};
//! let source = |time, first_time| {
//!     SourceDataset::new(
//!         DatasetLayout::new()
//!             .with_dimension("time", time, None)
//!             .with_dimension("x", 3, None)
//!             .with_variable("var", ["time", "x"]),
//!     )
//!     .with_ordering_value("time", first_time)
//! };
//!
//! // Join the sources along time, then plan chunks of 3 time steps
//! let planner = Planner::from_sources([source(2, 0.0), source(2, 2.0)])?
//!     .concat("time", ConcatOrder::ByIndex)?;
//! let request = ChunkRequest::from([("time".to_string(), 3)]);
//! let plan = planner.map_chunks(&request)?;
//!
//! // The first chunk reads all of source 0 and the first element of source 1
//! let slices = plan.slices("var/0.0", "time").unwrap();
//! assert_eq!(slices.iter().map(|s| (s.source_index(), s.start(), s.end())).collect::<Vec<_>>(), vec![(0, 0, 2), (1, 0, 1)]);
//! # Ok::<_, chunkplan::PlanError>(())
//! ```
//!
//! ## Chunk Sizes
//! The chunk size of each dimension is resolved once per request (see [`ChunkSpec`]):
//! an explicitly requested size, else the native chunk size of the dataset, else the whole dimension.
//!
//! ## Concurrency
//! Variables are planned concurrently with [`rayon`], up to the concurrent limit of [`PlanOptions`] (defaulting to the [global config](config::Config)).
//! The chunks of one variable can also be iterated lazily with [`Planner::iter_variable_chunks`].
//!
//! ## Logging
//! `chunkplan` logs through the [`log`] crate.
//! Chunk size resolution is logged at the `debug` level, and ignored or clamped chunk size requests at the `warn` level.
//!
//! ## Crate Features
//! `chunkplan` has no optional features.
//!
//! ## Licence
//! `chunkplan` is licensed under either of
//!  - the Apache License, Version 2.0 [LICENSE-APACHE](https://docs.rs/crate/chunkplan/latest/source/LICENCE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license [LICENSE-MIT](https://docs.rs/crate/chunkplan/latest/source/LICENCE-MIT) or <http://opensource.org/licenses/MIT>, at your option.
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted for inclusion in the work by you, as defined in the Apache-2.0 license, shall be dual licensed as above, without any additional terms or conditions.

pub mod config;

mod chunk_spec;
mod concatenation;
mod dataset;
mod error;
mod options;
mod plan;
mod planner;
mod slice;
mod variable_chunks;

pub use chunk_spec::{ChunkRequest, ChunkSpec};
pub use concatenation::{ConcatOrder, Concatenation, ConcatenationMap, SourceSegment};
pub use dataset::{DatasetLayout, Dimension, SourceDataset, VariableDescriptor};
pub use error::{InvalidConcatenationError, InvalidLayoutError, PlanError};
pub use options::PlanOptions;
pub use plan::{ChunkPlan, ChunkSlices};
pub use planner::{ConcatenatedDataset, Planner};
pub use slice::{DimensionSlice, SliceResolver};
pub use variable_chunks::VariableChunks;

pub use chunkplan_grid as grid;
pub use chunkplan_grid::{ChunkSizeOrigin, InvalidChunkSizeError};
pub use chunkplan_key as key;
pub use chunkplan_key::{ArityMismatchError, ChunkKey, ChunkKeyParseError, MissingDimensionError};

#[cfg(not(target_arch = "wasm32"))]
use rayon_iter_concurrent_limit::iter_concurrent_limit;

#[cfg(target_arch = "wasm32")]
/// A serial equivalent of [`rayon_iter_concurrent_limit::iter_concurrent_limit`] for WASM compatibility.
#[macro_export]
macro_rules! iter_concurrent_limit {
    ( $concurrent_limit:expr, $iterator:expr, $fn:tt, $op:expr ) => {{
        let _concurrent_limit = $concurrent_limit; // fixes unused lint
        $iterator.into_iter().$fn($op)
    }};
}
