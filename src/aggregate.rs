//! Central tendency of a set of rotations.
//!
//! This module reduces a sample set of unit quaternions to one rotation
//! under two criteria, both measured with the SO(3) geodesic distance `d`:
//!
//! | Statistic | Minimizes | Algorithm |
//! |-----------|-----------|-----------|
//! | [`geometric_mean`] | `Σ d(q, qᵢ)²` | Karcher iteration in the tangent space |
//! | [`geometric_median`] | `Σ d(q, qᵢ)` | Weiszfeld reweighting in the tangent space |
//!
//! Both iterate `q ← q · exp(Σ wᵢ log_q(qᵢ) / Σ wᵢ)` until the step is
//! shorter than `tolerance` or the iteration cap is reached. The log map
//! flips every sample into the hemisphere of the current estimate on each
//! call, so antipodal copies of the same rotation never cancel.
//!
//! Neither objective is convex once the samples spread over more than a
//! quarter turn, so the starting point matters. The default start is the
//! chordal average, which is computed from `Σ q qᵀ` and therefore sees
//! neither the signs nor the order of the samples.
//!
//! The returned quaternion always lies in the hemisphere of the first sample.
//! A single sample therefore comes back unchanged (up to normalization).

use crate::config::{AggregationConfig, CoincidentSamples, InitialEstimate, MedianStart};
use crate::error::Result;
use crate::math::{
    linalg::principal_quaternion,
    quaternion::{align_unit, exp_map, geodesic_distance, log_map, weighted_tangent_mean},
};
use crate::validation::prepare_samples;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Outcome of an iterative aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// The aggregated rotation.
    pub rotation: UnitQuaternion<f64>,

    /// Number of refinement steps taken.
    pub iterations: usize,

    /// Whether the step norm fell below the tolerance before the cap.
    pub converged: bool,

    /// Objective value at `rotation`: sum of squared distances for the
    /// mean, sum of distances for the median.
    pub cost: f64,
}

/// Geometric (Karcher) mean of a set of rotations.
///
/// # Errors
///
/// Returns an error for an invalid config, an empty sample set, or a
/// non-finite / zero-norm sample (see [`prepare_samples`]).
///
/// # Example
///
/// ```
/// use nalgebra::{Quaternion, UnitQuaternion, Vector3};
/// use qts_summary::{geometric_mean, geodesic_distance, AggregationConfig};
///
/// let a = UnitQuaternion::from_scaled_axis(Vector3::z() * 0.2);
/// let b = UnitQuaternion::from_scaled_axis(Vector3::z() * 0.6);
/// let mean = geometric_mean(&[a.into_inner(), b.into_inner()], &AggregationConfig::default())?;
///
/// let expected = UnitQuaternion::from_scaled_axis(Vector3::z() * 0.4);
/// assert!(geodesic_distance(&mean, &expected) < 1e-9);
/// # Ok::<(), qts_summary::AggregationError>(())
/// ```
pub fn geometric_mean(
    samples: &[Quaternion<f64>],
    config: &AggregationConfig,
) -> Result<UnitQuaternion<f64>> {
    geometric_mean_detailed(samples, config).map(|estimate| estimate.rotation)
}

/// Geometric mean with convergence diagnostics.
///
/// # Errors
///
/// Same as [`geometric_mean`].
pub fn geometric_mean_detailed(
    samples: &[Quaternion<f64>],
    config: &AggregationConfig,
) -> Result<Estimate> {
    config.validate()?;
    let samples = prepare_samples(samples, config)?;
    Ok(karcher_mean(&samples, config))
}

/// Geometric median of a set of rotations.
///
/// Unlike the mean, a single far-away sample only pulls the median by a
/// bounded amount.
///
/// # Errors
///
/// Same as [`geometric_mean`].
pub fn geometric_median(
    samples: &[Quaternion<f64>],
    config: &AggregationConfig,
) -> Result<UnitQuaternion<f64>> {
    geometric_median_detailed(samples, config).map(|estimate| estimate.rotation)
}

/// Geometric median with convergence diagnostics.
///
/// Weiszfeld steps shrink only linearly, so near-ties between widely spread
/// samples can hit `median_max_iterations`. The rotation is still usable in
/// that case but [`Estimate::converged`] is `false`.
///
/// # Errors
///
/// Same as [`geometric_mean`].
pub fn geometric_median_detailed(
    samples: &[Quaternion<f64>],
    config: &AggregationConfig,
) -> Result<Estimate> {
    config.validate()?;
    let samples = prepare_samples(samples, config)?;
    Ok(weiszfeld_median(&samples, config))
}

/// Closed-form chordal average: principal eigenvector of `Σ q qᵀ`.
///
/// Cheaper than [`geometric_mean`] and close to it for tightly clustered
/// samples, but it minimizes chordal rather than geodesic distance.
///
/// # Errors
///
/// Same as [`geometric_mean`].
pub fn chordal_mean(
    samples: &[Quaternion<f64>],
    config: &AggregationConfig,
) -> Result<UnitQuaternion<f64>> {
    config.validate()?;
    let samples = prepare_samples(samples, config)?;
    let weights = vec![1.0; samples.len()];
    Ok(chordal_estimate(&samples, &weights))
}

fn chordal_estimate(samples: &[UnitQuaternion<f64>], weights: &[f64]) -> UnitQuaternion<f64> {
    principal_quaternion(samples, weights)
        .map_or_else(UnitQuaternion::identity, |decomposition| decomposition.principal)
}

/// Linear average after flipping every sample towards the first one.
///
/// Each aligned sample has a non-negative inner product with the first, so
/// the sum has an inner product of at least 1 with it and never vanishes.
fn aligned_average(samples: &[UnitQuaternion<f64>]) -> UnitQuaternion<f64> {
    let reference = samples[0];
    let sum = samples.iter().fold(Quaternion::new(0.0, 0.0, 0.0, 0.0), |acc, q| {
        acc + align_unit(&reference, q).into_inner()
    });
    UnitQuaternion::new_normalize(sum)
}

fn initial_mean_estimate(
    samples: &[UnitQuaternion<f64>],
    config: &AggregationConfig,
) -> UnitQuaternion<f64> {
    match config.initial_estimate {
        InitialEstimate::AlignedAverage => aligned_average(samples),
        InitialEstimate::Chordal => chordal_estimate(samples, &vec![1.0; samples.len()]),
        InitialEstimate::FirstSample => samples[0],
    }
}

fn sum_of_squared_distances(rotation: &UnitQuaternion<f64>, samples: &[UnitQuaternion<f64>]) -> f64 {
    samples
        .iter()
        .map(|q| geodesic_distance(rotation, q).powi(2))
        .sum()
}

fn sum_of_distances(rotation: &UnitQuaternion<f64>, samples: &[UnitQuaternion<f64>]) -> f64 {
    samples.iter().map(|q| geodesic_distance(rotation, q)).sum()
}

fn single_sample(sample: UnitQuaternion<f64>) -> Estimate {
    Estimate {
        rotation: sample,
        iterations: 0,
        converged: true,
        cost: 0.0,
    }
}

/// Karcher mean of validated, non-empty samples.
pub(crate) fn karcher_mean(samples: &[UnitQuaternion<f64>], config: &AggregationConfig) -> Estimate {
    debug_assert!(!samples.is_empty());

    let first = samples[0];
    if samples.len() == 1 {
        return single_sample(first);
    }

    let weights = vec![1.0; samples.len()];
    let mut estimate = initial_mean_estimate(samples, config);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        let step = weighted_tangent_mean(&estimate, samples, &weights);
        if step.norm() < config.tolerance {
            converged = true;
            break;
        }
        estimate = exp_map(&estimate, &step);
        iterations += 1;
    }

    if !converged {
        log::debug!(
            "geometric mean stopped at the iteration cap ({}) for {} samples",
            config.max_iterations,
            samples.len()
        );
    }

    let rotation = align_unit(&first, &estimate);
    let cost = sum_of_squared_distances(&rotation, samples);
    log::trace!("geometric mean: {iterations} iterations, cost {cost:.3e}");

    Estimate {
        rotation,
        iterations,
        converged,
        cost,
    }
}

/// One Weiszfeld step at `estimate`, or `None` when the estimate is
/// already optimal.
///
/// Under [`CoincidentSamples::Skip`] the samples sitting on the estimate are
/// left out of the average. They still hold the estimate in place unless the
/// remaining samples pull with a combined unit-vector norm larger than their
/// count, in which case the step is shortened accordingly (Vardi-Zhang).
fn weiszfeld_step(
    estimate: &UnitQuaternion<f64>,
    samples: &[UnitQuaternion<f64>],
    config: &AggregationConfig,
) -> Option<Vector3<f64>> {
    let mut numerator = Vector3::zeros();
    let mut denominator = 0.0;
    let mut coincident = 0_usize;

    for q in samples {
        let tangent = log_map(estimate, q);
        let distance = tangent.norm();
        let weight = match config.coincident_samples {
            CoincidentSamples::Floor => 1.0 / distance.max(config.distance_floor),
            CoincidentSamples::Skip if distance < config.distance_floor => {
                coincident += 1;
                continue;
            }
            CoincidentSamples::Skip => 1.0 / distance,
        };
        numerator += tangent * weight;
        denominator += weight;
    }

    if denominator <= 0.0 {
        return None;
    }

    let step = numerator / denominator;
    if coincident == 0 {
        return Some(step);
    }

    let pull = numerator.norm();
    let held = coincident as f64;
    (pull > held).then(|| step * (1.0 - held / pull))
}

/// Weiszfeld median of validated, non-empty samples.
pub(crate) fn weiszfeld_median(
    samples: &[UnitQuaternion<f64>],
    config: &AggregationConfig,
) -> Estimate {
    debug_assert!(!samples.is_empty());

    let first = samples[0];
    if samples.len() == 1 {
        return single_sample(first);
    }

    let mut estimate = match config.median_start {
        MedianStart::Mean => karcher_mean(samples, config).rotation,
        MedianStart::FirstSample => first,
    };
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.median_max_iterations {
        let Some(step) = weiszfeld_step(&estimate, samples, config) else {
            converged = true;
            break;
        };
        if step.norm() < config.tolerance {
            converged = true;
            break;
        }
        estimate = exp_map(&estimate, &step);
        iterations += 1;
    }

    if !converged {
        log::debug!(
            "geometric median stopped at the iteration cap ({}) for {} samples",
            config.median_max_iterations,
            samples.len()
        );
    }

    let rotation = align_unit(&first, &estimate);
    let cost = sum_of_distances(&rotation, samples);
    log::trace!("geometric median: {iterations} iterations, cost {cost:.3e}");

    Estimate {
        rotation,
        iterations,
        converged,
        cost,
    }
}
