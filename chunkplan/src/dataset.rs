//! Dataset layouts.
//!
//! A [`DatasetLayout`] is everything the planner needs to know about a dataset: its dimensions (name, size, native chunk size) and its variables (name, ordered dimension names).
//! A [`SourceDataset`] is a layout that is one of several sources to be concatenated.

use chunkplan_key::MissingDimensionError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::InvalidLayoutError;

/// A dimension of a dataset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chunk_size: Option<u64>,
}

impl Dimension {
    /// Create a new dimension with `size` elements and an optional native `chunk_size`.
    #[must_use]
    pub const fn new(size: u64, chunk_size: Option<u64>) -> Self {
        Self { size, chunk_size }
    }

    /// The number of elements along the dimension.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// The native chunk size of the dimension in the dataset, if it is chunked.
    #[must_use]
    pub const fn chunk_size(&self) -> Option<u64> {
        self.chunk_size
    }
}

/// A variable of a dataset.
///
/// A variable may use any ordered subset of the dimensions of its dataset.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableDescriptor {
    name: String,
    dimensions: Vec<String>,
}

impl VariableDescriptor {
    /// Create a new variable descriptor.
    #[must_use]
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        dimensions: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            dimensions: dimensions.into_iter().map(Into::into).collect(),
        }
    }

    /// The variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dimension names of the variable, in the variable's own order.
    #[must_use]
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// The dimensionality of the variable.
    #[must_use]
    pub fn dimensionality(&self) -> usize {
        self.dimensions.len()
    }

    /// Returns true if the variable uses `dimension`.
    #[must_use]
    pub fn has_dimension(&self, dimension: &str) -> bool {
        self.dimensions.iter().any(|d| d == dimension)
    }
}

/// The layout of a dataset.
///
/// Dimensions and variables keep their insertion order, which is the order in which they are planned.
///
/// ```
/// # use chunkplan::DatasetLayout;
/// let layout = DatasetLayout::new()
///     .with_dimension("time", 10, Some(5))
///     .with_dimension("lat", 180, None)
///     .with_dimension("bnds", 2, None)
///     .with_variable("pr", ["time", "lat"])
///     .with_variable("lat_bnds", ["lat", "bnds"]);
/// assert!(layout.validate().is_ok());
/// assert_eq!(layout.dimension_size("time"), Some(10));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLayout {
    dimensions: IndexMap<String, Dimension>,
    variables: Vec<VariableDescriptor>,
}

impl DatasetLayout {
    /// Create an empty dataset layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dimension with `size` elements and an optional native `chunk_size`.
    ///
    /// Replaces an existing dimension with the same name, keeping its position.
    #[must_use]
    pub fn with_dimension(
        mut self,
        name: impl Into<String>,
        size: u64,
        chunk_size: Option<u64>,
    ) -> Self {
        self.insert_dimension(name, Dimension::new(size, chunk_size));
        self
    }

    /// Add a variable with `dimensions`.
    ///
    /// Replaces an existing variable with the same name, keeping its position.
    #[must_use]
    pub fn with_variable<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        dimensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.insert_variable(VariableDescriptor::new(name, dimensions));
        self
    }

    /// Insert a dimension.
    pub fn insert_dimension(&mut self, name: impl Into<String>, dimension: Dimension) {
        self.dimensions.insert(name.into(), dimension);
    }

    /// Insert a variable.
    pub fn insert_variable(&mut self, variable: VariableDescriptor) {
        if let Some(existing) = self
            .variables
            .iter_mut()
            .find(|existing| existing.name == variable.name)
        {
            *existing = variable;
        } else {
            self.variables.push(variable);
        }
    }

    /// The dimensions of the dataset.
    #[must_use]
    pub fn dimensions(&self) -> &IndexMap<String, Dimension> {
        &self.dimensions
    }

    /// The dimension named `name`.
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }

    /// The size of the dimension named `name`.
    #[must_use]
    pub fn dimension_size(&self, name: &str) -> Option<u64> {
        self.dimension(name).map(Dimension::size)
    }

    /// The variables of the dataset.
    #[must_use]
    pub fn variables(&self) -> &[VariableDescriptor] {
        &self.variables
    }

    /// The variable named `name`.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VariableDescriptor> {
        self.variables.iter().find(|variable| variable.name == name)
    }

    /// Validate the names of the dataset and the dimensions of its variables.
    ///
    /// Every dimension and variable must have a non-empty name, and every variable must list distinct dimensions of the dataset.
    ///
    /// # Errors
    /// Returns an [`InvalidLayoutError`] for the first dimension or variable that is invalid.
    pub fn validate(&self) -> Result<(), InvalidLayoutError> {
        if let Some(dimension) = self.dimensions.iter().find(|(name, _)| name.is_empty()) {
            return Err(InvalidLayoutError::EmptyDimensionName(dimension.1.size));
        }
        for variable in &self.variables {
            if variable.name.is_empty() {
                return Err(InvalidLayoutError::EmptyVariableName(
                    variable.dimensions.clone(),
                ));
            }
            for (i, dimension) in variable.dimensions.iter().enumerate() {
                if !self.dimensions.contains_key(dimension.as_str()) {
                    return Err(MissingDimensionError::new(&variable.name, dimension).into());
                }
                if variable.dimensions[..i].contains(dimension) {
                    return Err(InvalidLayoutError::RepeatedDimension {
                        variable: variable.name.clone(),
                        dimension: dimension.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A source dataset for concatenation.
///
/// Besides its layout, a source may carry an ordering value per dimension (typically its first coordinate value along that dimension).
/// Ordering values are only consulted by [`ConcatOrder::ByIndex`](crate::ConcatOrder::ByIndex).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDataset {
    layout: DatasetLayout,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    ordering_values: IndexMap<String, f64>,
}

impl SourceDataset {
    /// Create a new source dataset with no ordering values.
    #[must_use]
    pub fn new(layout: DatasetLayout) -> Self {
        Self {
            layout,
            ordering_values: IndexMap::new(),
        }
    }

    /// Set the ordering value of `dimension`.
    #[must_use]
    pub fn with_ordering_value(mut self, dimension: impl Into<String>, value: f64) -> Self {
        self.ordering_values.insert(dimension.into(), value);
        self
    }

    /// The layout of the source.
    #[must_use]
    pub fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    /// The ordering value of `dimension`, if any.
    #[must_use]
    pub fn ordering_value(&self, dimension: &str) -> Option<f64> {
        self.ordering_values.get(dimension).copied()
    }

    /// Consume the source and return its layout.
    #[must_use]
    pub fn into_layout(self) -> DatasetLayout {
        self.layout
    }
}

impl From<DatasetLayout> for SourceDataset {
    fn from(layout: DatasetLayout) -> Self {
        Self::new(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_layout_order() {
        let layout = DatasetLayout::new()
            .with_dimension("time", 4, Some(2))
            .with_dimension("lat", 10, None)
            .with_variable("b", ["lat"])
            .with_variable("a", ["time", "lat"])
            .with_dimension("time", 8, Some(2));
        assert_eq!(
            layout.dimensions().keys().collect::<Vec<_>>(),
            vec!["time", "lat"]
        );
        assert_eq!(layout.dimension_size("time"), Some(8));
        assert_eq!(layout.dimension("time").unwrap().chunk_size(), Some(2));
        assert_eq!(layout.dimension("lat").unwrap().chunk_size(), None);
        assert_eq!(
            layout
                .variables()
                .iter()
                .map(VariableDescriptor::name)
                .collect::<Vec<_>>(),
            vec!["b", "a"]
        );
        assert!(layout.variable("a").unwrap().has_dimension("time"));
        assert!(!layout.variable("b").unwrap().has_dimension("time"));
    }

    #[test]
    fn dataset_layout_replace_variable() {
        let layout = DatasetLayout::new()
            .with_dimension("x", 3, None)
            .with_variable("v", ["x"])
            .with_variable("w", ["x"])
            .with_variable("v", Vec::<String>::new());
        assert_eq!(layout.variables().len(), 2);
        assert_eq!(layout.variables()[0].dimensionality(), 0);
    }

    #[test]
    fn dataset_layout_validate() {
        let layout = DatasetLayout::new()
            .with_dimension("lat", 10, None)
            .with_variable("lat_bnds", ["lat", "bnds"]);
        assert_eq!(
            layout.validate(),
            Err(MissingDimensionError::new("lat_bnds", "bnds").into())
        );
    }

    #[test]
    fn dataset_layout_repeated_dimension() {
        let layout = DatasetLayout::new()
            .with_dimension("x", 4, None)
            .with_variable("cov", ["x", "x"]);
        let error = layout.validate().unwrap_err();
        assert_eq!(
            error,
            InvalidLayoutError::RepeatedDimension {
                variable: "cov".to_string(),
                dimension: "x".to_string(),
            }
        );
        assert_eq!(
            error.to_string(),
            "variable `cov` lists dimension `x` more than once"
        );
    }

    #[test]
    fn dataset_layout_empty_names() {
        let layout = DatasetLayout::new()
            .with_dimension("x", 4, None)
            .with_variable("", ["x"]);
        assert_eq!(
            layout.validate(),
            Err(InvalidLayoutError::EmptyVariableName(vec!["x".to_string()]))
        );
        let layout = DatasetLayout::new().with_dimension("", 4, None);
        assert_eq!(
            layout.validate(),
            Err(InvalidLayoutError::EmptyDimensionName(4))
        );
    }

    #[test]
    fn dataset_layout_serde() {
        let layout = DatasetLayout::new()
            .with_dimension("time", 4, Some(2))
            .with_variable("var", ["time"]);
        let json = serde_json::to_string(&layout).unwrap();
        assert_eq!(
            json,
            r#"{"dimensions":{"time":{"size":4,"chunk_size":2}},"variables":[{"name":"var","dimensions":["time"]}]}"#
        );
        assert_eq!(
            serde_json::from_str::<DatasetLayout>(&json).unwrap(),
            layout
        );
    }

    #[test]
    fn source_dataset_ordering_value() {
        let source = SourceDataset::new(DatasetLayout::new().with_dimension("time", 2, None))
            .with_ordering_value("time", 10.0);
        assert_eq!(source.ordering_value("time"), Some(10.0));
        assert_eq!(source.ordering_value("lat"), None);
        assert_eq!(source.layout().dimension_size("time"), Some(2));
    }
}
