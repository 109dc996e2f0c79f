//! Quaternion Time Series Summaries
//!
//! Pointwise geometric mean and geometric median of aligned quaternion time
//! series (QTS), computed on the rotation manifold rather than in flat
//! quaternion space.
//!
//! A QTS is a sequence of unit quaternions sampled on a grid. Given N series
//! sharing the same grid, this library produces one series whose value at
//! each grid point is the central rotation of the N input rotations there.
//!
//! # Features
//!
//! - **Sign invariant**: `q` and `-q` are the same rotation and aggregate as such
//! - **Geodesic**: distances are SO(3) rotation angles, averages live in the tangent space
//! - **Robust option**: the Weiszfeld median resists outlying series
//! - **Bounded**: every iteration is capped; non-convergence is reported, never an error
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::{Quaternion, UnitQuaternion, Vector3};
//! use qts_summary::{median_series, AggregationConfig, QuaternionTimeSeries};
//!
//! let turn = |angle: f64| UnitQuaternion::from_scaled_axis(Vector3::z() * angle).into_inner();
//! let time = vec![0.0, 0.1, 0.2];
//!
//! let inputs = vec![
//!     QuaternionTimeSeries::new(time.clone(), &[turn(0.0), turn(0.1), turn(0.2)])?,
//!     QuaternionTimeSeries::new(time.clone(), &[turn(0.1), turn(0.2), turn(0.3)])?,
//!     QuaternionTimeSeries::new(time, &[turn(2.0), turn(2.0), turn(2.0)])?,
//! ];
//!
//! let median = median_series(&inputs, &AggregationConfig::default())?;
//! assert_eq!(median.len(), 3);
//! # Ok::<(), qts_summary::AggregationError>(())
//! ```
//!
//! # Cargo Features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `serde` | `Serialize`/`Deserialize` for [`QuaternionTimeSeries`] |
//! | `parallel` | Grid points are reduced on the rayon thread pool |

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]

pub mod aggregate;
pub mod config;
pub mod error;
pub mod math;
pub mod series;
pub mod summary;
pub mod validation;

// Re-exports for convenient access
pub use aggregate::{
    chordal_mean, geometric_mean, geometric_mean_detailed, geometric_median,
    geometric_median_detailed, Estimate,
};
pub use config::{AggregationConfig, CoincidentSamples, InitialEstimate, InputPolicy, MedianStart};
pub use error::{AggregationError, Result};
pub use math::geodesic_distance;
pub use series::{Component, QuaternionTable, QuaternionTimeSeries, QTS_CLASSES};
pub use summary::{aggregate_series_detailed, mean_series, median_series, SeriesAggregate, Statistic};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
