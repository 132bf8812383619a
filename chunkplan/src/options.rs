use crate::config::global_config;

/// Options for planning chunks and concatenating sources.
///
/// The defaults are read from the [global configuration](crate::config::Config).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    shared_dimension_index: bool,
    validate_concatenation_order: bool,
    concurrent_limit: usize,
}

impl Default for PlanOptions {
    fn default() -> Self {
        let config = global_config();
        Self {
            shared_dimension_index: config.shared_dimension_index(),
            validate_concatenation_order: config.validate_concatenation_order(),
            concurrent_limit: config.variable_concurrent_limit(),
        }
    }
}

impl PlanOptions {
    /// Return the shared dimension index setting.
    #[must_use]
    pub fn shared_dimension_index(&self) -> bool {
        self.shared_dimension_index
    }

    /// Set whether or not to build the shared dimension index.
    pub fn set_shared_dimension_index(&mut self, shared_dimension_index: bool) -> &mut Self {
        self.shared_dimension_index = shared_dimension_index;
        self
    }

    /// Set whether or not to build the shared dimension index.
    #[must_use]
    pub fn with_shared_dimension_index(mut self, shared_dimension_index: bool) -> Self {
        self.shared_dimension_index = shared_dimension_index;
        self
    }

    /// Return the validate concatenation order setting.
    #[must_use]
    pub fn validate_concatenation_order(&self) -> bool {
        self.validate_concatenation_order
    }

    /// Set whether or not to validate the concatenation order.
    pub fn set_validate_concatenation_order(
        &mut self,
        validate_concatenation_order: bool,
    ) -> &mut Self {
        self.validate_concatenation_order = validate_concatenation_order;
        self
    }

    /// Set whether or not to validate the concatenation order.
    #[must_use]
    pub fn with_validate_concatenation_order(mut self, validate_concatenation_order: bool) -> Self {
        self.validate_concatenation_order = validate_concatenation_order;
        self
    }

    /// Return the concurrent limit.
    #[must_use]
    pub fn concurrent_limit(&self) -> usize {
        self.concurrent_limit
    }

    /// Set the concurrent limit. The concurrent limit is disabled if zero.
    pub fn set_concurrent_limit(&mut self, concurrent_limit: usize) -> &mut Self {
        self.concurrent_limit = concurrent_limit;
        self
    }

    /// Set the concurrent limit. The concurrent limit is disabled if zero.
    #[must_use]
    pub fn with_concurrent_limit(mut self, concurrent_limit: usize) -> Self {
        self.concurrent_limit = concurrent_limit;
        self
    }
}
