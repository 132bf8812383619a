//! `chunkplan` global configuration options.

use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the chunkplan crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
/// The defaults of [`PlanOptions`](crate::PlanOptions) are read from the global config.
///
/// ## Shared Dimension Index
///  > default: [`true`]
///
/// If enabled, a [`ChunkPlan`](crate::ChunkPlan) also records the union of the slices of every variable under a `<dimension>/<chunk_index>` key.
///
/// ## Validate Concatenation Order
///  > default: [`true`]
///
/// If enabled, sources concatenated with [`ConcatOrder::ByIndex`](crate::ConcatOrder::ByIndex) must have strictly ascending ordering values.
/// Sources are never reordered.
///
/// ## Variable Concurrent Limit
/// > default: [`std::thread::available_parallelism`]`()`
///
/// The maximum number of variables that are planned concurrently.
/// The concurrent limit is disabled if set to zero. Variables are planned serially if set to one.
#[derive(Debug, Clone)]
pub struct Config {
    shared_dimension_index: bool,
    validate_concatenation_order: bool,
    variable_concurrent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shared_dimension_index: true,
            validate_concatenation_order: true,
            variable_concurrent_limit: std::thread::available_parallelism()
                .map_or(1, std::num::NonZeroUsize::get),
        }
    }
}

impl Config {
    /// Get the [shared dimension index](#shared-dimension-index) configuration.
    #[must_use]
    pub fn shared_dimension_index(&self) -> bool {
        self.shared_dimension_index
    }

    /// Set the [shared dimension index](#shared-dimension-index) configuration.
    pub fn set_shared_dimension_index(&mut self, shared_dimension_index: bool) -> &mut Self {
        self.shared_dimension_index = shared_dimension_index;
        self
    }

    /// Get the [validate concatenation order](#validate-concatenation-order) configuration.
    #[must_use]
    pub fn validate_concatenation_order(&self) -> bool {
        self.validate_concatenation_order
    }

    /// Set the [validate concatenation order](#validate-concatenation-order) configuration.
    pub fn set_validate_concatenation_order(
        &mut self,
        validate_concatenation_order: bool,
    ) -> &mut Self {
        self.validate_concatenation_order = validate_concatenation_order;
        self
    }

    /// Get the [variable concurrent limit](#variable-concurrent-limit) configuration.
    #[must_use]
    pub fn variable_concurrent_limit(&self) -> usize {
        self.variable_concurrent_limit
    }

    /// Set the [variable concurrent limit](#variable-concurrent-limit) configuration.
    pub fn set_variable_concurrent_limit(&mut self, concurrent_limit: usize) -> &mut Self {
        self.variable_concurrent_limit = concurrent_limit;
        self
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global chunkplan configuration.
///
/// A poisoned lock is recovered.
/// This might deadlock if the global config is already mutably held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Returns a mutable reference to the global chunkplan configuration.
///
/// This might deadlock if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert!(config.shared_dimension_index());
        assert!(config.validate_concatenation_order());
        assert!(config.variable_concurrent_limit() >= 1);
    }

    #[test]
    fn config_set() {
        let mut config = Config::default();
        config
            .set_shared_dimension_index(false)
            .set_validate_concatenation_order(false)
            .set_variable_concurrent_limit(1);
        assert!(!config.shared_dimension_index());
        assert!(!config.validate_concatenation_order());
        assert_eq!(config.variable_concurrent_limit(), 1);
    }

    #[test]
    fn config_global() {
        let limit = global_config().variable_concurrent_limit();
        assert!(limit >= 1);
        assert!(global_config().shared_dimension_index());
    }
}
