//! Linear algebra utilities for rotation averaging.
//!
//! This module computes the chordal (Markley) average of a set of unit
//! quaternions: the principal eigenvector of the weighted scatter matrix
//! `M = Σ wᵢ qᵢ qᵢᵀ`, using nalgebra for the symmetric eigendecomposition.
//! Since `q qᵀ = (-q)(-q)ᵀ`, the result does not depend on sample signs,
//! and since the sum is commutative it does not depend on sample order.

use crate::math::quaternion::align_unit;
use nalgebra::{Matrix4, Quaternion, SymmetricEigen, UnitQuaternion, Vector4};

/// Result of the scatter matrix decomposition.
#[derive(Debug, Clone)]
pub struct ScatterDecomposition {
    /// Eigenvalues sorted in descending order.
    pub eigenvalues: [f64; 4],

    /// Eigenvector of the largest eigenvalue, as a rotation.
    pub principal: UnitQuaternion<f64>,
}

impl ScatterDecomposition {
    /// Gap between the two largest eigenvalues, relative to the largest.
    ///
    /// Close to zero when the principal direction is ill-determined, e.g.
    /// for rotations spread symmetrically over a half-turn.
    #[must_use]
    pub fn relative_gap(&self) -> f64 {
        if self.eigenvalues[0] <= 0.0 {
            return 0.0;
        }
        (self.eigenvalues[0] - self.eigenvalues[1]) / self.eigenvalues[0]
    }
}

/// Weighted scatter matrix `Σ wᵢ qᵢ qᵢᵀ` in nalgebra's `[i, j, k, w]` layout.
#[must_use]
pub fn scatter_matrix(samples: &[UnitQuaternion<f64>], weights: &[f64]) -> Matrix4<f64> {
    debug_assert_eq!(samples.len(), weights.len());

    samples
        .iter()
        .zip(weights.iter())
        .fold(Matrix4::zeros(), |acc, (q, &w)| {
            let v = q.quaternion().coords;
            acc + v * v.transpose() * w
        })
}

/// Principal eigenvector of the weighted scatter matrix.
///
/// The returned rotation is flipped into the hemisphere of the first sample.
/// Returns `None` for an empty sample set.
#[must_use]
pub fn principal_quaternion(
    samples: &[UnitQuaternion<f64>],
    weights: &[f64],
) -> Option<ScatterDecomposition> {
    let first = samples.first()?;

    let eigen = SymmetricEigen::new(scatter_matrix(samples, weights));

    // Collect eigenvalue-eigenvector pairs and sort descending
    let mut pairs: Vec<(f64, Vector4<f64>)> = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .map(|(i, &v)| (v, eigen.eigenvectors.column(i).into_owned()))
        .collect();

    pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let eigenvalues = [pairs[0].0, pairs[1].0, pairs[2].0, pairs[3].0];
    let principal = UnitQuaternion::new_normalize(Quaternion::from(pairs[0].1));

    Some(ScatterDecomposition {
        eigenvalues,
        principal: align_unit(first, &principal),
    })
}
