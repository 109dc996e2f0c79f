//! Property tests for the manifold aggregator.
//!
//! These tests check the invariances a rotation average must have (sign,
//! order, identity) and the robustness of the median against outliers.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use qts_summary::{
    geodesic_distance, geometric_mean, geometric_mean_detailed, geometric_median,
    geometric_median_detailed, AggregationConfig,
};
use std::f64::consts::PI;

// =============================================================================
// SAMPLE GENERATORS
// =============================================================================

/// Reproducible value in `[-1, 1)` from a seed and an index.
fn noise(seed: u64, i: usize, channel: u64) -> f64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    (seed, i, channel).hash(&mut hasher);
    let h = hasher.finish();
    (h & 0xFFFF) as f64 / 32768.0 - 1.0
}

/// Rotation by `angle` radians about `axis`.
fn rotation(axis: [f64; 3], angle: f64) -> Quaternion<f64> {
    UnitQuaternion::from_scaled_axis(Vector3::new(axis[0], axis[1], axis[2]).normalize() * angle)
        .into_inner()
}

/// `n` rotations scattered within `spread` radians (per axis) of `center`.
fn generate_cluster(n: usize, center: Quaternion<f64>, spread: f64, seed: u64) -> Vec<Quaternion<f64>> {
    let center = UnitQuaternion::new_normalize(center);
    (0..n)
        .map(|i| {
            let v = Vector3::new(noise(seed, i, 0), noise(seed, i, 1), noise(seed, i, 2)) * spread;
            (center * UnitQuaternion::from_scaled_axis(v)).into_inner()
        })
        .collect()
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn unit(q: Quaternion<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::new_normalize(q)
}

/// Flip the sign of every sample whose index is selected by `mask`.
fn flip_signs(samples: &[Quaternion<f64>], mask: impl Fn(usize) -> bool) -> Vec<Quaternion<f64>> {
    samples
        .iter()
        .enumerate()
        .map(|(i, q)| if mask(i) { -*q } else { *q })
        .collect()
}

fn three_orthogonal() -> [Quaternion<f64>; 3] {
    [
        Quaternion::new(1.0, 0.0, 0.0, 0.0),
        Quaternion::new(0.0, 1.0, 0.0, 0.0),
        Quaternion::new(0.0, 0.0, 1.0, 0.0),
    ]
}

// =============================================================================
// SIGN INVARIANCE
// =============================================================================

#[test]
fn test_mean_sign_invariance() {
    let config = AggregationConfig::default();
    let samples = generate_cluster(9, rotation([1.0, 2.0, -1.0], 1.2), 0.6, 7);
    let reference = geometric_mean(&samples, &config).unwrap();

    for mask in [
        Box::new(|i: usize| i % 2 == 1) as Box<dyn Fn(usize) -> bool>,
        Box::new(|i: usize| i == 0),
        Box::new(|_: usize| true),
        Box::new(|i: usize| i % 3 == 0),
    ] {
        let flipped = flip_signs(&samples, mask);
        let mean = geometric_mean(&flipped, &config).unwrap();
        assert!(geodesic_distance(&mean, &reference) < 1e-10);
    }
}

#[test]
fn test_median_sign_invariance() {
    let config = AggregationConfig::default();
    let samples = generate_cluster(8, rotation([0.0, 1.0, 1.0], 2.5), 0.5, 11);
    let reference = geometric_median(&samples, &config).unwrap();

    for mask in [
        Box::new(|i: usize| i % 2 == 0) as Box<dyn Fn(usize) -> bool>,
        Box::new(|i: usize| i == 0),
        Box::new(|i: usize| i > 4),
    ] {
        let flipped = flip_signs(&samples, mask);
        let median = geometric_median(&flipped, &config).unwrap();
        assert!(geodesic_distance(&median, &reference) < 1e-10);
    }
}

#[test]
fn test_flipping_later_samples_keeps_components() {
    // The output follows the first sample's hemisphere, so re-signing any
    // other sample leaves the returned components untouched.
    let config = AggregationConfig::default();
    let samples = generate_cluster(6, rotation([0.0, 0.0, 1.0], 0.8), 0.4, 3);
    let reference = geometric_mean(&samples, &config).unwrap();
    let flipped = geometric_mean(&flip_signs(&samples, |i| i > 0), &config).unwrap();

    assert!((reference.into_inner() - flipped.into_inner()).norm() < 1e-12);
}

#[test]
fn test_three_orthogonal_sign_flips() {
    // Every pair of samples is exactly a half-turn apart, so no sample lies
    // in another's hemisphere and re-signing one cannot be undone by
    // alignment. The result must still be the same rotation.
    let config = AggregationConfig::default();
    let samples = three_orthogonal();
    let units: Vec<_> = samples.iter().map(|q| unit(*q)).collect();
    let mean = geometric_mean(&samples, &config).unwrap();
    let median = geometric_median(&samples, &config).unwrap();

    for bits in 1..8_usize {
        let flipped = flip_signs(&samples, |i| bits & (1 << i) != 0);
        let flipped_mean = geometric_mean(&flipped, &config).unwrap();
        let flipped_median = geometric_median(&flipped, &config).unwrap();
        assert!(geodesic_distance(&flipped_mean, &mean) < 1e-9, "mask {bits:03b}");
        assert!(geodesic_distance(&flipped_median, &median) < 1e-9, "mask {bits:03b}");

        let d: Vec<f64> = units.iter().map(|q| geodesic_distance(&flipped_mean, q)).collect();
        assert!((d[0] - d[1]).abs() < 1e-9, "mask {bits:03b}: distances {d:?}");
        assert!((d[1] - d[2]).abs() < 1e-9, "mask {bits:03b}: distances {d:?}");
    }
}

// =============================================================================
// IDENTITY AND ORDER INVARIANCE
// =============================================================================

#[test]
fn test_identity_property() {
    let config = AggregationConfig::default();
    let q = rotation([0.3, -0.7, 0.2], 2.1);

    for n in [1, 2, 5, 17] {
        let copies = vec![q; n];
        let mean = geometric_mean(&copies, &config).unwrap();
        let median = geometric_median(&copies, &config).unwrap();
        assert!(geodesic_distance(&mean, &unit(q)) < 1e-12, "mean, n = {n}");
        assert!(geodesic_distance(&median, &unit(q)) < 1e-12, "median, n = {n}");

        // Same rotation given with mixed signs
        let mixed = flip_signs(&copies, |i| i % 2 == 1);
        let mean = geometric_mean(&mixed, &config).unwrap();
        let median = geometric_median(&mixed, &config).unwrap();
        assert!(geodesic_distance(&mean, &unit(q)) < 1e-12, "mixed mean, n = {n}");
        assert!(geodesic_distance(&median, &unit(q)) < 1e-12, "mixed median, n = {n}");
    }
}

#[test]
fn test_order_invariance() {
    let config = AggregationConfig::default();
    let samples = generate_cluster(7, rotation([1.0, 0.0, 0.0], 0.3), 0.7, 21);
    let mean = geometric_mean(&samples, &config).unwrap();
    let median = geometric_median(&samples, &config).unwrap();

    let mut reversed = samples.clone();
    reversed.reverse();
    let mut rotated = samples.clone();
    rotated.rotate_left(3);

    for permuted in [reversed, rotated] {
        let permuted_mean = geometric_mean(&permuted, &config).unwrap();
        let permuted_median = geometric_median(&permuted, &config).unwrap();
        assert!(geodesic_distance(&permuted_mean, &mean) < 1e-8);
        assert!(geodesic_distance(&permuted_median, &median) < 1e-6);
    }
}

#[test]
fn test_wide_spread_order_and_sign_invariance() {
    // Rotations about x by 0, π and θ = 2·atan2(-0.8, 0.6) ≈ -1.855. The
    // objectives have more than one local minimum here; whatever order or
    // signs the samples come in, the global one must be found.
    let config = AggregationConfig::default();
    let samples = [
        Quaternion::new(1.0, 0.0, 0.0, 0.0),
        Quaternion::new(0.0, 1.0, 0.0, 0.0),
        Quaternion::new(0.6, -0.8, 0.0, 0.0),
    ];
    let theta = 2.0 * (-0.8_f64).atan2(0.6);

    // Unwrapped around θ + 2π the three angles are 2π, π and θ + 2π
    let expected_mean = unit(rotation([1.0, 0.0, 0.0], (5.0 * PI + theta) / 3.0));
    // The L1 optimum sits on the third sample
    let expected_median = unit(samples[2]);

    let permutations = [[0, 1, 2], [1, 0, 2], [0, 2, 1], [2, 0, 1], [1, 2, 0], [2, 1, 0]];
    for order in permutations {
        for bits in [0_usize, 0b001, 0b010, 0b110] {
            let permuted: Vec<_> = order.iter().map(|&i| samples[i]).collect();
            let input = flip_signs(&permuted, |i| bits & (1 << i) != 0);

            let mean = geometric_mean_detailed(&input, &config).unwrap();
            assert!(mean.converged);
            assert!(
                geodesic_distance(&mean.rotation, &expected_mean) < 1e-8,
                "order {order:?}, mask {bits:03b}"
            );

            let median = geometric_median_detailed(&input, &config).unwrap();
            assert!(median.converged);
            assert!(
                geodesic_distance(&median.rotation, &expected_median) < 1e-8,
                "order {order:?}, mask {bits:03b}"
            );
        }
    }
}

// =============================================================================
// ROBUSTNESS
// =============================================================================

#[test]
fn test_median_more_robust_than_mean() {
    let config = AggregationConfig::default();
    let a = rotation([0.0, 1.0, 0.0], 0.2);
    let b = rotation([1.0, 0.0, 1.0], 2.6);

    for n in [3, 5, 10] {
        let mut samples = generate_cluster(n - 1, a, 0.05, n as u64);
        samples.push(b);

        let mean = geometric_mean(&samples, &config).unwrap();
        let median = geometric_median(&samples, &config).unwrap();

        let mean_error = geodesic_distance(&mean, &unit(a));
        let median_error = geodesic_distance(&median, &unit(a));
        assert!(
            median_error < mean_error,
            "n = {n}: median {median_error} vs mean {mean_error}"
        );
    }
}

#[test]
fn test_objectives_are_minimized() {
    // Small perturbations of the optimum never lower the objective
    let config = AggregationConfig::precise();
    let samples = generate_cluster(6, rotation([1.0, 1.0, 1.0], 1.0), 0.8, 5);
    let mean = geometric_mean_detailed(&samples, &config).unwrap();
    let median = geometric_median_detailed(&samples, &config).unwrap();
    let units: Vec<_> = samples.iter().map(|q| unit(*q)).collect();

    for axis in [Vector3::x(), Vector3::y(), Vector3::z()] {
        for sign in [-1.0, 1.0] {
            let nudge = UnitQuaternion::from_scaled_axis(axis * (sign * 1e-3));

            let moved = mean.rotation * nudge;
            let cost: f64 = units.iter().map(|q| geodesic_distance(&moved, q).powi(2)).sum();
            assert!(cost >= mean.cost - 1e-12);

            let moved = median.rotation * nudge;
            let cost: f64 = units.iter().map(|q| geodesic_distance(&moved, q)).sum();
            assert!(cost >= median.cost - 1e-12);
        }
    }
}

// =============================================================================
// DEGENERATE CONFIGURATIONS
// =============================================================================

#[test]
fn test_three_orthogonal_rotations() {
    // Identity plus half-turns about x and y: the optimum is equidistant
    // from all three samples.
    let config = AggregationConfig::default();
    let samples = three_orthogonal();
    let units: Vec<_> = samples.iter().map(|q| unit(*q)).collect();

    let permutations = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    let mut means = Vec::new();
    let mut medians = Vec::new();

    for order in permutations {
        let permuted: Vec<_> = order.iter().map(|&i| samples[i]).collect();
        means.push(geometric_mean(&permuted, &config).unwrap());
        medians.push(geometric_median(&permuted, &config).unwrap());
    }

    for result in means.iter().chain(medians.iter()) {
        assert!((result.quaternion().norm() - 1.0).abs() < 1e-12);
        let d: Vec<f64> = units.iter().map(|q| geodesic_distance(result, q)).collect();
        assert!((d[0] - d[1]).abs() < 1e-9, "distances {d:?}");
        assert!((d[1] - d[2]).abs() < 1e-9, "distances {d:?}");
    }

    for result in means.iter().skip(1) {
        assert!(geodesic_distance(result, &means[0]) < 1e-9);
    }
    for result in medians.iter().skip(1) {
        assert!(geodesic_distance(result, &medians[0]) < 1e-9);
    }
}

#[test]
fn test_symmetric_half_turns_terminate() {
    // Half-turns about three orthogonal axes plus their sign flips: the
    // problem is symmetric and ill-posed, but both algorithms must return.
    let config = AggregationConfig::default()
        .with_max_iterations(25)
        .with_median_max_iterations(25);
    let samples = [
        rotation([1.0, 0.0, 0.0], PI),
        rotation([0.0, 1.0, 0.0], PI),
        rotation([0.0, 0.0, 1.0], PI),
        -rotation([1.0, 0.0, 0.0], PI),
        -rotation([0.0, 1.0, 0.0], PI),
        -rotation([0.0, 0.0, 1.0], PI),
    ];

    let first = geometric_mean_detailed(&samples, &config).unwrap();
    let again = geometric_mean_detailed(&samples, &config).unwrap();
    assert_eq!(first, again);
    assert!(first.iterations <= 25);
    assert!(first.rotation.quaternion().norm().is_finite());

    let median = geometric_median_detailed(&samples, &config).unwrap();
    assert!(median.iterations <= 25);
    assert!(median.rotation.quaternion().norm().is_finite());
}
