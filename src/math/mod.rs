//! Mathematical utilities for rotation aggregation.
//!
//! This module provides:
//! - [`quaternion`]: sign reconciliation, geodesic distance, log/exp maps
//! - [`linalg`]: eigen-based chordal averaging

pub mod linalg;
pub mod quaternion;

pub use linalg::principal_quaternion;
pub use quaternion::{
    align_sign, exp_map, geodesic_distance, log_map, weighted_tangent_mean,
};
