//! Pointwise summaries of aligned quaternion time series.
//!
//! Given N series sharing the same grid, [`mean_series`] and
//! [`median_series`] build a new series whose value at each grid point is
//! the geometric mean or median of the N input rotations at that point.
//!
//! # Pipeline
//!
//! 1. Validate the config and check that every input has the grid size of
//!    the first one, with all four quaternion columns that long (fails
//!    before any aggregation)
//! 2. For each grid point, gather one quaternion per input and validate it
//! 3. Reduce the sample set with the selected [`Statistic`]
//! 4. Write the results into a QTS-tagged structural copy of the first input
//!
//! Grid points are independent. With the `parallel` feature they are
//! reduced on the rayon thread pool; each point owns its output slot.

use crate::aggregate::{karcher_mean, weiszfeld_median, Estimate};
use crate::config::AggregationConfig;
use crate::error::{AggregationError, Result};
use crate::series::{Component, QuaternionTable};
use crate::validation::prepare_sample;
use nalgebra::UnitQuaternion;

/// Pointwise statistic computed across series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Statistic {
    /// Geometric (Karcher) mean.
    #[default]
    Mean,
    /// Geometric (Weiszfeld) median.
    Median,
}

impl Statistic {
    fn reduce(self, samples: &[UnitQuaternion<f64>], config: &AggregationConfig) -> Estimate {
        match self {
            Self::Mean => karcher_mean(samples, config),
            Self::Median => weiszfeld_median(samples, config),
        }
    }
}

/// Aggregated series together with per-point diagnostics.
#[derive(Debug, Clone)]
pub struct SeriesAggregate<T> {
    /// The aggregated, QTS-tagged series.
    pub series: T,

    /// One estimate per grid point, in grid order.
    pub estimates: Vec<Estimate>,
}

impl<T> SeriesAggregate<T> {
    /// Grid points at which the optimization hit the iteration cap.
    pub fn unconverged_points(&self) -> impl Iterator<Item = usize> + '_ {
        self.estimates
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.converged)
            .map(|(row, _)| row)
    }
}

/// Pointwise geometric mean of aligned quaternion time series.
///
/// # Errors
///
/// - [`AggregationError::NoSeries`] if `inputs` is empty.
/// - [`AggregationError::GridSizeMismatch`] if any input's grid size differs
///   from the first input's.
/// - [`AggregationError::ColumnLengthMismatch`] if a quaternion column of
///   some input is not `n_rows()` long.
/// - [`AggregationError::AtGridPoint`] wrapping a sample validation error.
/// - [`AggregationError::InvalidConfig`] for an invalid config.
///
/// # Example
///
/// ```
/// use nalgebra::Quaternion;
/// use qts_summary::{mean_series, AggregationConfig, QuaternionTimeSeries};
///
/// let time = vec![0.0, 1.0];
/// let a = QuaternionTimeSeries::new(time.clone(), &[Quaternion::identity(); 2])?;
/// let b = QuaternionTimeSeries::new(time, &[Quaternion::identity(); 2])?;
///
/// let mean = mean_series(&[a, b], &AggregationConfig::default())?;
/// assert_eq!(mean.len(), 2);
/// assert!(mean.is_qts());
/// # Ok::<(), qts_summary::AggregationError>(())
/// ```
pub fn mean_series<T>(inputs: &[T], config: &AggregationConfig) -> Result<T>
where
    T: QuaternionTable + Sync,
{
    aggregate_series_detailed(inputs, Statistic::Mean, config).map(|aggregate| aggregate.series)
}

/// Pointwise geometric median of aligned quaternion time series.
///
/// # Errors
///
/// Same as [`mean_series`].
pub fn median_series<T>(inputs: &[T], config: &AggregationConfig) -> Result<T>
where
    T: QuaternionTable + Sync,
{
    aggregate_series_detailed(inputs, Statistic::Median, config).map(|aggregate| aggregate.series)
}

/// Pointwise aggregation with per-point diagnostics.
///
/// # Errors
///
/// Same as [`mean_series`].
pub fn aggregate_series_detailed<T>(
    inputs: &[T],
    statistic: Statistic,
    config: &AggregationConfig,
) -> Result<SeriesAggregate<T>>
where
    T: QuaternionTable + Sync,
{
    config.validate()?;
    let first = inputs.first().ok_or(AggregationError::NoSeries)?;
    let n_grid = first.n_rows();
    check_grid_sizes(inputs, n_grid)?;

    let estimates = reduce_grid(n_grid, |row| {
        let samples = gather_samples(inputs, row, config)
            .map_err(|err| AggregationError::at_grid_point(row, err))?;
        Ok(statistic.reduce(&samples, config))
    })?;

    let mut series = first.clone_as_qts();
    for (row, estimate) in estimates.iter().enumerate() {
        series.set_rotation_at(row, &estimate.rotation);
    }

    let aggregate = SeriesAggregate { series, estimates };
    log::debug!(
        "{statistic:?} over {} series x {n_grid} grid points, {} unconverged",
        inputs.len(),
        aggregate.unconverged_points().count()
    );
    Ok(aggregate)
}

/// Every input must have `expected` grid points in each quaternion column.
fn check_grid_sizes<T: QuaternionTable>(inputs: &[T], expected: usize) -> Result<()> {
    for (series, input) in inputs.iter().enumerate() {
        let actual = input.n_rows();
        if actual != expected {
            return Err(AggregationError::grid_size_mismatch(series, expected, actual));
        }
        for component in Component::ALL {
            let len = input.column(component).len();
            if len != expected {
                return Err(AggregationError::column_length_mismatch(
                    component.name(),
                    expected,
                    len,
                ));
            }
        }
    }
    Ok(())
}

/// The validated rotation of every input at `row`, in input order.
fn gather_samples<T: QuaternionTable>(
    inputs: &[T],
    row: usize,
    config: &AggregationConfig,
) -> Result<Vec<UnitQuaternion<f64>>> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| prepare_sample(index, &input.quaternion_at(row), config))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn reduce_grid<F>(n_grid: usize, reduce_row: F) -> Result<Vec<Estimate>>
where
    F: Fn(usize) -> Result<Estimate> + Sync,
{
    (0..n_grid).map(reduce_row).collect()
}

#[cfg(feature = "parallel")]
fn reduce_grid<F>(n_grid: usize, reduce_row: F) -> Result<Vec<Estimate>>
where
    F: Fn(usize) -> Result<Estimate> + Sync + Send,
{
    use rayon::prelude::*;

    (0..n_grid).into_par_iter().map(reduce_row).collect()
}
