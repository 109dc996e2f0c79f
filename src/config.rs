//! Configuration for manifold aggregation.
//!
//! This module provides the [`AggregationConfig`] struct which centralizes the
//! convergence controls and input policies shared by the geometric mean and
//! the geometric median.
//!
//! # Example
//!
//! ```
//! use qts_summary::AggregationConfig;
//!
//! // Use default configuration
//! let config = AggregationConfig::default();
//!
//! // Use a preset and tweak it
//! let precise = AggregationConfig::precise().with_max_iterations(5_000);
//! assert!(precise.validate().is_ok());
//! ```

use crate::error::{AggregationError, Result};

/// Configuration for geometric mean and median computation.
///
/// All angular quantities are in radians and measured with the SO(3)
/// geodesic distance, i.e. the rotation angle of the relative rotation.
///
/// # Convergence Parameters
///
/// - `tolerance`: Stop once the tangent-space correction is shorter than this.
/// - `max_iterations`: Hard cap for the mean; the estimate at the cap is
///   returned as-is.
/// - `median_max_iterations`: Same for the median. Weiszfeld converges only
///   linearly, so this cap is larger. Check
///   [`Estimate::converged`](crate::Estimate::converged) when it matters.
/// - `distance_floor`: Guards the Weiszfeld weights `1 / d` against `d = 0`.
///
/// # Input Parameters
///
/// - `input_policy`: Normalize non-unit inputs or reject them.
/// - `zero_norm_eps` / `norm_tolerance`: Thresholds for the checks above.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationConfig {
    // Convergence
    /// Norm of the tangent-space step below which iteration stops.
    pub tolerance: f64,

    /// Maximum number of refinement steps for the mean.
    pub max_iterations: usize,

    /// Maximum number of refinement steps for the median.
    pub median_max_iterations: usize,

    /// Smallest distance used when weighting samples in the median.
    /// Samples closer than this to the estimate count as coincident.
    pub distance_floor: f64,

    // Input handling
    /// Inputs with a norm at or below this are rejected.
    pub zero_norm_eps: f64,

    /// Allowed `|‖q‖ - 1|` under [`InputPolicy::Strict`].
    pub norm_tolerance: f64,

    /// What to do with inputs that are not unit quaternions.
    pub input_policy: InputPolicy,

    // Initialisation
    /// Starting point of the mean iteration.
    pub initial_estimate: InitialEstimate,

    /// Starting point of the median iteration.
    pub median_start: MedianStart,

    /// Handling of samples that coincide with the current median estimate.
    pub coincident_samples: CoincidentSamples,
}

/// Policy for input quaternions whose norm is not 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputPolicy {
    /// Rescale every input to unit norm.
    #[default]
    Normalize,
    /// Reject inputs further than `norm_tolerance` from unit norm.
    Strict,
}

/// Initial estimate for the geometric mean iteration.
///
/// For widely spread samples the mean objective has several local minima,
/// and the start decides which one the iteration settles in. Only
/// [`InitialEstimate::Chordal`] makes that choice independent of sample
/// signs and sample order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialEstimate {
    /// Principal eigenvector of the scatter matrix `Σ q qᵀ`.
    #[default]
    Chordal,
    /// Linear average of the samples after flipping each into the
    /// hemisphere of the first sample, renormalized. A sample exactly
    /// orthogonal to the first is summed with the sign it was given.
    AlignedAverage,
    /// The first sample.
    FirstSample,
}

/// Initial estimate for the geometric median iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MedianStart {
    /// Start from the geometric mean.
    #[default]
    Mean,
    /// Start from the first sample. Depends on sample order.
    FirstSample,
}

/// Weiszfeld degeneracy handling for samples sitting on the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoincidentSamples {
    /// Weight is `1 / max(d, distance_floor)`.
    #[default]
    Floor,
    /// Samples within `distance_floor` are left out of the update and the
    /// remaining weights are renormalized.
    Skip,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            median_max_iterations: 1_000,
            distance_floor: 1e-10,

            zero_norm_eps: 1e-12,
            norm_tolerance: 1e-6,
            input_policy: InputPolicy::Normalize,

            initial_estimate: InitialEstimate::Chordal,
            median_start: MedianStart::Mean,
            coincident_samples: CoincidentSamples::Floor,
        }
    }
}

impl AggregationConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AggregationError::invalid_config(
                "tolerance must be positive and finite",
            ));
        }
        if self.max_iterations == 0 {
            return Err(AggregationError::invalid_config(
                "max_iterations must be at least 1",
            ));
        }
        if self.median_max_iterations == 0 {
            return Err(AggregationError::invalid_config(
                "median_max_iterations must be at least 1",
            ));
        }
        if !(self.distance_floor.is_finite() && self.distance_floor > 0.0) {
            return Err(AggregationError::invalid_config(
                "distance_floor must be positive and finite",
            ));
        }
        if !(self.zero_norm_eps.is_finite() && self.zero_norm_eps >= 0.0) {
            return Err(AggregationError::invalid_config(
                "zero_norm_eps must be non-negative and finite",
            ));
        }
        if !(self.norm_tolerance.is_finite() && self.norm_tolerance > 0.0) {
            return Err(AggregationError::invalid_config(
                "norm_tolerance must be positive and finite",
            ));
        }
        Ok(())
    }

    /// Preset for tight convergence at the cost of more iterations.
    #[must_use]
    pub fn precise() -> Self {
        Self {
            tolerance: 1e-14,
            max_iterations: 1_000,
            median_max_iterations: 10_000,
            distance_floor: 1e-14,
            ..Self::default()
        }
    }

    /// Preset for large series where a few micro-radians do not matter.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 20,
            median_max_iterations: 200,
            distance_floor: 1e-8,
            ..Self::default()
        }
    }

    /// Preset that rejects non-unit input instead of normalizing it.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            input_policy: InputPolicy::Strict,
            ..Self::default()
        }
    }

    /// Set the convergence tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap of the mean.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the iteration cap of the median.
    #[must_use]
    pub const fn with_median_max_iterations(mut self, max_iterations: usize) -> Self {
        self.median_max_iterations = max_iterations;
        self
    }

    /// Set the Weiszfeld distance floor.
    #[must_use]
    pub const fn with_distance_floor(mut self, floor: f64) -> Self {
        self.distance_floor = floor;
        self
    }

    /// Set the input policy.
    #[must_use]
    pub const fn with_input_policy(mut self, policy: InputPolicy) -> Self {
        self.input_policy = policy;
        self
    }

    /// Set the initial estimate for the mean.
    #[must_use]
    pub const fn with_initial_estimate(mut self, initial: InitialEstimate) -> Self {
        self.initial_estimate = initial;
        self
    }

    /// Set the starting point for the median.
    #[must_use]
    pub const fn with_median_start(mut self, start: MedianStart) -> Self {
        self.median_start = start;
        self
    }

    /// Set the coincident sample handling for the median.
    #[must_use]
    pub const fn with_coincident_samples(mut self, handling: CoincidentSamples) -> Self {
        self.coincident_samples = handling;
        self
    }
}
