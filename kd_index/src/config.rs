//! Spatial index configuration

use crate::error::{Error, Result};

/// Default smoothing factor for the search metrics
pub const DEFAULT_SMOOTHING: f32 = 0.99;

/// Spatial index configuration
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Weight of the previous value in the search metric moving averages.
    ///
    /// `avg = smoothing * avg + (1 - smoothing) * sample`, `0.0 <= smoothing < 1.0`.
    pub smoothing: f32,
    /// Nodes (and scratch slots) reserved up front
    pub initial_capacity: usize,
    /// Source tag for log entries emitted by this index
    pub label: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            smoothing: DEFAULT_SMOOTHING,
            initial_capacity: 0,
            label: "kd3d::SpatialIndex".to_string(),
        }
    }
}

impl IndexConfig {
    /// Check the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if `smoothing` is not finite or lies
    /// outside `[0.0, 1.0)`.
    pub fn validate(&self) -> Result<()> {
        if !self.smoothing.is_finite() || !(0.0..1.0).contains(&self.smoothing) {
            return Err(Error::InvalidConfig(format!(
                "smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        Ok(())
    }
}
