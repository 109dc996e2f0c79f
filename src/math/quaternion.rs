//! Unit quaternion geometry on SO(3).
//!
//! A rotation is represented by a unit quaternion `q`, and `q` and `-q`
//! describe the same rotation. All functions here resolve that ambiguity
//! locally by flipping the second argument into the hemisphere of the first
//! (`dot ≥ 0`) before doing anything else, so none of them cares which sign
//! the caller picked.
//!
//! # Tangent Space Convention
//!
//! Tangent vectors are rotation vectors (axis × angle, in radians) expressed
//! in the body frame of the base point:
//!
//! - `log_map(p, q) = v` with `q ≅ p · exp(v)`
//! - `‖log_map(p, q)‖ = geodesic_distance(p, q) ∈ [0, π]`

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Flip `q` into the hemisphere of `reference`.
///
/// Returns `-q` when `⟨reference, q⟩ < 0`, otherwise `q` unchanged. A zero
/// inner product (rotations exactly π apart) leaves `q` as given.
#[must_use]
#[inline]
pub fn align_sign(reference: &Quaternion<f64>, q: &Quaternion<f64>) -> Quaternion<f64> {
    if reference.dot(q) < 0.0 {
        -*q
    } else {
        *q
    }
}

/// Same as [`align_sign`] for unit quaternions.
#[must_use]
#[inline]
pub fn align_unit(reference: &UnitQuaternion<f64>, q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::new_unchecked(align_sign(reference.quaternion(), q.quaternion()))
}

/// Relative rotation `p⁻¹ · q` with non-negative scalar part.
#[inline]
fn relative(p: &UnitQuaternion<f64>, q: &UnitQuaternion<f64>) -> Quaternion<f64> {
    let aligned = align_sign(p.quaternion(), q.quaternion());
    p.quaternion().conjugate() * aligned
}

/// Geodesic (angular) distance between two rotations in radians.
///
/// This is the rotation angle of `p⁻¹ · q`, always in `[0, π]`, and is
/// invariant to the sign of either argument. Computed with `atan2` so it
/// stays accurate for nearly identical rotations.
#[must_use]
pub fn geodesic_distance(p: &UnitQuaternion<f64>, q: &UnitQuaternion<f64>) -> f64 {
    let delta = relative(p, q);
    2.0 * delta.imag().norm().atan2(delta.w.abs())
}

/// Logarithmic map of `q` at base point `p`.
///
/// Returns the rotation vector `v` such that `p · exp(v)` is the rotation of
/// `q`, taking the shorter way round.
///
/// At exactly π both `v` and `-v` reach `q`. The one whose first non-zero
/// component is positive is returned, so the result does not depend on the
/// sign of either argument there either.
#[must_use]
pub fn log_map(p: &UnitQuaternion<f64>, q: &UnitQuaternion<f64>) -> Vector3<f64> {
    let delta = relative(p, q);
    let mut imag = delta.imag();
    let sin_half = imag.norm();
    if sin_half < f64::MIN_POSITIVE {
        return Vector3::zeros();
    }
    if delta.w.abs() < f64::MIN_POSITIVE {
        imag = canonical_axis(imag);
    }
    let angle = 2.0 * sin_half.atan2(delta.w.abs());
    imag * (angle / sin_half)
}

/// `axis` or `-axis`, whichever has a positive first non-zero component.
fn canonical_axis(axis: Vector3<f64>) -> Vector3<f64> {
    match axis.iter().find(|c| c.abs() >= f64::MIN_POSITIVE) {
        Some(&c) if c < 0.0 => -axis,
        _ => axis,
    }
}

/// Exponential map of the rotation vector `v` at base point `p`.
///
/// The product is renormalized so that repeated steps do not drift off the
/// unit sphere.
#[must_use]
pub fn exp_map(p: &UnitQuaternion<f64>, v: &Vector3<f64>) -> UnitQuaternion<f64> {
    let step = UnitQuaternion::from_scaled_axis(*v);
    UnitQuaternion::new_normalize((p * step).into_inner())
}

/// Weighted average of the log maps of `samples` at `base`.
///
/// Weights do not need to be normalized. Returns the zero vector when the
/// weights sum to zero or less.
#[must_use]
pub fn weighted_tangent_mean(
    base: &UnitQuaternion<f64>,
    samples: &[UnitQuaternion<f64>],
    weights: &[f64],
) -> Vector3<f64> {
    debug_assert_eq!(samples.len(), weights.len());

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Vector3::zeros();
    }

    let sum = samples
        .iter()
        .zip(weights.iter())
        .fold(Vector3::zeros(), |acc, (q, &w)| acc + log_map(base, q) * w);
    sum / total
}
