use std::{cmp::Ordering, ops::Range};

use chunkplan_key::{ArityMismatchError, ChunkKey, KeyBuilder};
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::{
    ChunkPlan, ChunkRequest, ChunkSlices, ChunkSpec, ConcatOrder, Concatenation,
    ConcatenationMap, DatasetLayout, Dimension, InvalidConcatenationError, PlanError, PlanOptions,
    SourceDataset, VariableChunks, VariableDescriptor,
};

/// Sources joined along a concatenation dimension, with their merged layout.
///
/// Created by [`Planner::concat`].
#[derive(Clone, Debug, PartialEq)]
pub struct ConcatenatedDataset {
    layout: DatasetLayout,
    concatenation: Concatenation,
}

impl ConcatenatedDataset {
    /// The merged layout of the sources.
    #[must_use]
    pub fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    /// The concatenation of the sources.
    #[must_use]
    pub fn concatenation(&self) -> &Concatenation {
        &self.concatenation
    }
}

/// A chunk planner.
///
/// A planner has one of three entry modes:
///  - [`Single`](Planner::Single): one dataset, every dimension read from source `0`,
///  - [`Unmerged`](Planner::Unmerged): several sources that must be [concatenated](Planner::concat) before planning, and
///  - [`Concatenated`](Planner::Concatenated): several sources joined along one dimension.
///
/// ```
/// # use chunkplan::{ChunkRequest, ConcatOrder, DatasetLayout, Planner, SourceDataset};
/// let source = |size| {
///     SourceDataset::new(
///         DatasetLayout::new()
///             .with_dimension("time", size, None)
///             .with_variable("var", ["time"]),
///     )
/// };
/// let planner = Planner::from_sources([source(2), source(2)])?.concat("time", ConcatOrder::Manual)?;
/// let plan = planner.map_chunks(&ChunkRequest::from([("time".to_string(), 3)]))?;
/// assert_eq!(plan.slices("var/0", "time").unwrap().len(), 2);
/// assert_eq!(plan.slices("var/1", "time").unwrap().len(), 1);
/// # Ok::<_, chunkplan::PlanError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Planner {
    /// A single dataset.
    Single(DatasetLayout),
    /// Several sources that have not been concatenated.
    Unmerged(Vec<SourceDataset>),
    /// Several sources concatenated along one dimension.
    Concatenated(ConcatenatedDataset),
}

impl Planner {
    /// Create a planner for a single dataset.
    ///
    /// # Errors
    /// Returns [`PlanError::InvalidLayout`] if `layout` has an empty name, or a variable uses an undefined or repeated dimension.
    pub fn new(layout: DatasetLayout) -> Result<Self, PlanError> {
        layout.validate()?;
        Ok(Self::Single(layout))
    }

    /// Create a planner from `sources`.
    ///
    /// One source creates a [`Single`](Planner::Single) planner, several sources an [`Unmerged`](Planner::Unmerged) planner.
    ///
    /// # Errors
    /// Returns
    ///  - [`PlanError::NoSources`] if `sources` is empty, or
    ///  - [`PlanError::InvalidLayout`] if the layout of any source is invalid (see [`DatasetLayout::validate`]).
    pub fn from_sources(
        sources: impl IntoIterator<Item = SourceDataset>,
    ) -> Result<Self, PlanError> {
        let mut sources: Vec<SourceDataset> = sources.into_iter().collect();
        for source in &sources {
            source.layout().validate()?;
        }
        match sources.len() {
            0 => Err(PlanError::NoSources),
            1 => Ok(Self::Single(sources.remove(0).into_layout())),
            _ => Ok(Self::Unmerged(sources)),
        }
    }

    /// Concatenate unmerged sources along `dimension` in `order`.
    ///
    /// See [`concat_opt`](Self::concat_opt).
    ///
    /// # Errors
    /// See [`concat_opt`](Self::concat_opt).
    pub fn concat(self, dimension: &str, order: ConcatOrder) -> Result<Self, PlanError> {
        self.concat_opt(dimension, order, &PlanOptions::default())
    }

    /// Explicit options version of [`concat`](Self::concat).
    ///
    /// Sources are joined in the order they were supplied.
    /// The concatenation dimension of the merged layout is the sum of the source sizes and keeps the native chunk size of the first source.
    /// Other dimensions must have the same size in every source that has them.
    /// Variables are the union of the source variables in first-seen order.
    ///
    /// # Errors
    /// Returns
    ///  - [`PlanError::NotUnmerged`] if the planner is not [`Unmerged`](Planner::Unmerged),
    ///  - [`PlanError::InvalidConcatenation`] if a source lacks `dimension`, if the ordering values required by [`ConcatOrder::ByIndex`] are missing or (with validation enabled) not strictly ascending, or if the sources disagree on a dimension size or variable.
    pub fn concat_opt(
        self,
        dimension: &str,
        order: ConcatOrder,
        options: &PlanOptions,
    ) -> Result<Self, PlanError> {
        let Self::Unmerged(sources) = self else {
            return Err(PlanError::NotUnmerged);
        };
        if order == ConcatOrder::ByIndex {
            check_ordering_values(&sources, dimension, options.validate_concatenation_order())?;
        }
        let concatenated = concatenate_layouts(&sources, dimension)?;
        log::debug!(
            "concatenated {} sources along dimension `{dimension}` with total size {}",
            concatenated.concatenation.map().num_sources(),
            concatenated.concatenation.map().total()
        );
        Ok(Self::Concatenated(concatenated))
    }

    /// The layout to plan, or [`None`] if the planner is [`Unmerged`](Planner::Unmerged).
    #[must_use]
    pub fn layout(&self) -> Option<&DatasetLayout> {
        match self {
            Self::Single(layout) => Some(layout),
            Self::Unmerged(_) => None,
            Self::Concatenated(concatenated) => Some(&concatenated.layout),
        }
    }

    /// The concatenation, if the planner is [`Concatenated`](Planner::Concatenated).
    #[must_use]
    pub fn concatenation(&self) -> Option<&Concatenation> {
        match self {
            Self::Concatenated(concatenated) => Some(&concatenated.concatenation),
            Self::Single(_) | Self::Unmerged(_) => None,
        }
    }

    /// The number of sources.
    #[must_use]
    pub fn num_sources(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Unmerged(sources) => sources.len(),
            Self::Concatenated(concatenated) => concatenated.concatenation.map().num_sources(),
        }
    }

    fn planned(&self) -> Result<(&DatasetLayout, Option<&Concatenation>), PlanError> {
        match self {
            Self::Single(layout) => Ok((layout, None)),
            Self::Unmerged(sources) => Err(PlanError::UnmergedSources(sources.len())),
            Self::Concatenated(concatenated) => {
                Ok((&concatenated.layout, Some(&concatenated.concatenation)))
            }
        }
    }

    fn variable(&self, name: &str) -> Result<&VariableDescriptor, PlanError> {
        let (layout, _) = self.planned()?;
        layout
            .variable(name)
            .ok_or_else(|| PlanError::UnknownVariable(name.to_string()))
    }

    /// Resolve the chunk size of every dimension for `request`.
    ///
    /// # Errors
    /// Returns
    ///  - [`PlanError::UnmergedSources`] if the planner is [`Unmerged`](Planner::Unmerged), or
    ///  - [`PlanError::InvalidChunkSize`] if a requested or native chunk size is zero.
    pub fn resolve_chunk_spec(&self, request: &ChunkRequest) -> Result<ChunkSpec, PlanError> {
        let (layout, _) = self.planned()?;
        Ok(ChunkSpec::resolve(layout, request)?)
    }

    /// Plan the chunks of every variable for `request`.
    ///
    /// See [`map_chunks_opt`](Self::map_chunks_opt).
    ///
    /// # Errors
    /// See [`map_chunks_opt`](Self::map_chunks_opt).
    pub fn map_chunks(&self, request: &ChunkRequest) -> Result<ChunkPlan, PlanError> {
        self.map_chunks_opt(request, &PlanOptions::default())
    }

    /// Explicit options version of [`map_chunks`](Self::map_chunks).
    ///
    /// Variables are planned concurrently up to the concurrent limit of `options`.
    /// If the dataset has a single variable, its chunks are planned concurrently instead.
    /// The plan is identical regardless of concurrency.
    ///
    /// # Errors
    /// Returns
    ///  - [`PlanError::UnmergedSources`] if the planner is [`Unmerged`](Planner::Unmerged),
    ///  - [`PlanError::InvalidChunkSize`] if a requested or native chunk size is zero, or
    ///  - [`PlanError::MissingDimension`] if a variable uses an undefined dimension.
    pub fn map_chunks_opt(
        &self,
        request: &ChunkRequest,
        options: &PlanOptions,
    ) -> Result<ChunkPlan, PlanError> {
        let (layout, concatenation) = self.planned()?;
        let spec = ChunkSpec::resolve(layout, request)?;

        let plan_variable = |variable: &VariableDescriptor| -> Result<Vec<_>, PlanError> {
            let chunks = VariableChunks::new(variable, &spec, concatenation)?;
            log::trace!(
                "planning {} chunks of variable `{}`",
                chunks.len(),
                variable.name()
            );
            Ok(chunks.collect())
        };

        let variables = layout.variables();
        let concurrent_limit = options.concurrent_limit();
        let planned = if concurrent_limit == 1 {
            variables
                .iter()
                .map(plan_variable)
                .collect::<Result<Vec<_>, _>>()?
        } else if let [variable] = variables {
            // The chunks of a lone variable are planned concurrently instead
            let chunks = VariableChunks::new(variable, &spec, concatenation)?;
            log::trace!(
                "planning {} chunks of variable `{}` concurrently",
                chunks.len(),
                variable.name()
            );
            vec![chunks.collect_concurrent(concurrent_limit)]
        } else {
            crate::iter_concurrent_limit!(concurrent_limit, variables, map, plan_variable)
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut plan = ChunkPlan::new();
        for (key, slices) in planned.into_iter().flatten() {
            plan.insert(key, slices, options.shared_dimension_index());
        }
        Ok(plan)
    }

    /// Return a lazy iterator over the chunks of `variable` for `request`.
    ///
    /// The iterator can be restarted by calling this method again, or by cloning it before iterating.
    ///
    /// # Errors
    /// Returns
    ///  - [`PlanError::UnmergedSources`] if the planner is [`Unmerged`](Planner::Unmerged),
    ///  - [`PlanError::UnknownVariable`] if `variable` is not in the dataset,
    ///  - [`PlanError::InvalidChunkSize`] if a requested or native chunk size is zero, or
    ///  - [`PlanError::MissingDimension`] if the variable uses an undefined dimension.
    pub fn iter_variable_chunks(
        &self,
        variable: &str,
        request: &ChunkRequest,
    ) -> Result<VariableChunks<'_>, PlanError> {
        let (layout, concatenation) = self.planned()?;
        let variable = self.variable(variable)?;
        let spec = ChunkSpec::resolve(layout, request)?;
        Ok(VariableChunks::new(variable, &spec, concatenation)?)
    }

    /// Return the chunk keys of every variable for `request`, in C order.
    ///
    /// # Errors
    /// Returns
    ///  - [`PlanError::UnmergedSources`] if the planner is [`Unmerged`](Planner::Unmerged),
    ///  - [`PlanError::InvalidChunkSize`] if a requested or native chunk size is zero, or
    ///  - [`PlanError::MissingDimension`] if a variable uses an undefined dimension.
    pub fn chunk_keys(
        &self,
        request: &ChunkRequest,
    ) -> Result<IndexMap<String, Vec<ChunkKey>>, PlanError> {
        let (layout, _) = self.planned()?;
        let spec = ChunkSpec::resolve(layout, request)?;
        layout
            .variables()
            .iter()
            .map(|variable| -> Result<(String, Vec<ChunkKey>), PlanError> {
                let key_builder =
                    KeyBuilder::new(variable.name(), variable.dimensions(), &spec)?;
                let keys = spec
                    .chunk_grid(variable)?
                    .indices()
                    .iter()
                    .map(|chunk_indices| key_builder.build_from_indices_unchecked(&chunk_indices))
                    .collect();
                Ok((variable.name().to_string(), keys))
            })
            .collect()
    }

    /// Return the global extent `[start, end)` along each dimension of the chunk with `key`.
    ///
    /// # Errors
    /// Returns
    ///  - [`PlanError::ChunkKeyParse`] if `key` is malformed,
    ///  - [`PlanError::UnmergedSources`] if the planner is [`Unmerged`](Planner::Unmerged),
    ///  - [`PlanError::UnknownVariable`] if the variable of `key` is not in the dataset,
    ///  - [`PlanError::ArityMismatch`] if the number of chunk indices does not match the dimensionality of the variable,
    ///  - [`PlanError::ChunkOutOfBounds`] if the chunk indices are outside the chunk grid, or
    ///  - [`PlanError::InvalidChunkSize`] if a requested or native chunk size is zero.
    pub fn chunk_region(
        &self,
        key: &str,
        request: &ChunkRequest,
    ) -> Result<IndexMap<String, Range<u64>>, PlanError> {
        let key = ChunkKey::parse(key)?;
        let variable = self.variable(key.variable())?;
        let chunk_indices = variable_chunk_indices(variable, &key)?;
        let spec = self.resolve_chunk_spec(request)?;
        let extents = spec
            .chunk_grid(variable)?
            .chunk_extents(&chunk_indices)
            .map_err(|_| {
                ArityMismatchError::new(
                    variable.name(),
                    chunk_indices.len(),
                    variable.dimensionality(),
                )
            })?
            .ok_or_else(|| PlanError::ChunkOutOfBounds(key.clone()))?;
        Ok(std::iter::zip(variable.dimensions().iter().cloned(), extents).collect())
    }

    /// Return the source read ranges of the chunk with `key`.
    ///
    /// # Errors
    /// See [`chunk_region`](Self::chunk_region).
    pub fn chunk_slices(&self, key: &str, request: &ChunkRequest) -> Result<ChunkSlices, PlanError> {
        let key = ChunkKey::parse(key)?;
        let variable = self.variable(key.variable())?;
        let chunk_indices = variable_chunk_indices(variable, &key)?;
        let chunks = self.iter_variable_chunks(variable.name(), request)?;
        chunks
            .get(&chunk_indices)
            .map(|(_, slices)| slices)
            .ok_or(PlanError::ChunkOutOfBounds(key))
    }
}

/// The chunk indices of `key` with the dimensionality of `variable`.
///
/// The single chunk of a zero-dimensional variable has the key index `0` but no chunk indices.
fn variable_chunk_indices(
    variable: &VariableDescriptor,
    key: &ChunkKey,
) -> Result<Vec<u64>, PlanError> {
    let chunk_indices = key.chunk_indices();
    if variable.dimensionality() == 0 {
        return if chunk_indices == [0] {
            Ok(Vec::new())
        } else {
            Err(PlanError::ChunkOutOfBounds(key.clone()))
        };
    }
    if chunk_indices.len() == variable.dimensionality() {
        Ok(chunk_indices)
    } else {
        Err(ArityMismatchError::new(
            variable.name(),
            chunk_indices.len(),
            variable.dimensionality(),
        )
        .into())
    }
}

fn check_ordering_values(
    sources: &[SourceDataset],
    dimension: &str,
    validate_order: bool,
) -> Result<(), InvalidConcatenationError> {
    let mut previous: Option<f64> = None;
    for (source_index, source) in sources.iter().enumerate() {
        let value = source.ordering_value(dimension).ok_or_else(|| {
            InvalidConcatenationError::MissingIndex {
                dimension: dimension.to_string(),
                source_index,
            }
        })?;
        if let Some(previous) = previous.filter(|_| validate_order) {
            if previous.partial_cmp(&value) != Some(Ordering::Less) {
                return Err(InvalidConcatenationError::Unordered {
                    dimension: dimension.to_string(),
                    source_index,
                    value,
                    previous,
                });
            }
        }
        previous = Some(value);
    }
    Ok(())
}

fn concatenate_layouts(
    sources: &[SourceDataset],
    dimension: &str,
) -> Result<ConcatenatedDataset, InvalidConcatenationError> {
    let mut layout = DatasetLayout::new();
    let mut sizes = Vec::with_capacity(sources.len());
    for (source_index, source) in sources.iter().enumerate() {
        let source_layout = source.layout();
        let join = source_layout.dimension(dimension).ok_or_else(|| {
            InvalidConcatenationError::MissingDimension {
                dimension: dimension.to_string(),
                source_index,
            }
        })?;
        sizes.push(join.size());

        for (name, source_dimension) in source_layout.dimensions() {
            match layout.dimension(name).copied() {
                _ if name == dimension && source_index > 0 => {}
                Some(existing) if existing.size() != source_dimension.size() => {
                    return Err(InvalidConcatenationError::MismatchedDimension {
                        dimension: name.clone(),
                        source_index,
                        size: source_dimension.size(),
                        expected: existing.size(),
                    });
                }
                Some(_) => {}
                None => layout.insert_dimension(name.clone(), *source_dimension),
            }
        }

        for variable in source_layout.variables() {
            if let Some(existing) = layout.variable(variable.name()) {
                if existing.dimensions() != variable.dimensions() {
                    return Err(InvalidConcatenationError::MismatchedVariable {
                        variable: variable.name().to_string(),
                        source_index,
                        dimensions: variable.dimensions().to_vec(),
                        expected: existing.dimensions().to_vec(),
                    });
                }
            } else {
                layout.insert_variable(variable.clone());
            }
        }
    }

    let map = ConcatenationMap::new(sizes);
    let native_chunk_size = layout.dimension(dimension).and_then(Dimension::chunk_size);
    layout.insert_dimension(dimension, Dimension::new(map.total(), native_chunk_size));
    Ok(ConcatenatedDataset {
        layout,
        concatenation: Concatenation::new(dimension, map),
    })
}
