//! Input validation for quaternion sample sets.
//!
//! Raw quaternions coming out of a table are checked and converted into unit
//! rotations before any aggregation runs. Nothing downstream of
//! [`prepare_samples`] has to worry about NaN, zero or non-unit input.

use crate::config::{AggregationConfig, InputPolicy};
use crate::error::{AggregationError, Result};
use nalgebra::{Quaternion, UnitQuaternion};

/// Validate one raw quaternion and turn it into a rotation.
///
/// `index` is only used for error reporting.
///
/// # Errors
///
/// - [`AggregationError::NonFiniteQuaternion`] if any component is NaN or infinite.
/// - [`AggregationError::ZeroNorm`] if the norm is at or below `zero_norm_eps`.
/// - [`AggregationError::NotNormalized`] under [`InputPolicy::Strict`] when
///   the norm is further than `norm_tolerance` from 1.
pub fn prepare_sample(
    index: usize,
    q: &Quaternion<f64>,
    config: &AggregationConfig,
) -> Result<UnitQuaternion<f64>> {
    if !q.coords.iter().all(|c| c.is_finite()) {
        return Err(AggregationError::NonFiniteQuaternion { index });
    }

    let norm = q.norm();
    if norm <= config.zero_norm_eps {
        return Err(AggregationError::ZeroNorm { index });
    }

    if config.input_policy == InputPolicy::Strict && (norm - 1.0).abs() > config.norm_tolerance {
        return Err(AggregationError::NotNormalized { index, norm });
    }

    Ok(UnitQuaternion::new_normalize(*q))
}

/// Validate a whole sample set.
///
/// # Errors
///
/// Returns [`AggregationError::EmptySampleSet`] for an empty slice, or the
/// first error reported by [`prepare_sample`].
pub fn prepare_samples(
    samples: &[Quaternion<f64>],
    config: &AggregationConfig,
) -> Result<Vec<UnitQuaternion<f64>>> {
    if samples.is_empty() {
        return Err(AggregationError::EmptySampleSet);
    }

    samples
        .iter()
        .enumerate()
        .map(|(index, q)| prepare_sample(index, q, config))
        .collect()
}
