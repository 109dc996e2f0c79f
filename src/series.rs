//! Quaternion time series containers.
//!
//! The aggregation driver only needs a handful of capabilities from a table
//! holding a QTS: row count, read access to the four quaternion columns,
//! scalar writes, and a structural copy tagged as a QTS. These are captured
//! by the [`QuaternionTable`] trait so any columnar container can be plugged
//! in. [`QuaternionTimeSeries`] is the in-crate implementation.
//!
//! # Column Layout
//!
//! | Column | Meaning |
//! |--------|---------|
//! | `time` | Grid coordinate, carried through aggregation untouched |
//! | `w` | Scalar part |
//! | `x`, `y`, `z` | Vector part |

use crate::error::{AggregationError, Result};
use nalgebra::{Quaternion, UnitQuaternion};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Class tags carried by a quaternion time series, most specific first.
pub const QTS_CLASSES: [&str; 4] = ["qts", "tbl_df", "tbl", "data.frame"];

/// One of the four quaternion columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Component {
    /// Scalar part.
    W,
    /// First vector component.
    X,
    /// Second vector component.
    Y,
    /// Third vector component.
    Z,
}

impl Component {
    /// All components in `w, x, y, z` order.
    pub const ALL: [Self; 4] = [Self::W, Self::X, Self::Y, Self::Z];

    /// Column name of the component.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::W => "w",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }

    /// Read this component out of a quaternion.
    #[must_use]
    #[inline]
    pub fn of(self, q: &Quaternion<f64>) -> f64 {
        match self {
            Self::W => q.w,
            Self::X => q.i,
            Self::Y => q.j,
            Self::Z => q.k,
        }
    }
}

/// Minimal table interface needed to aggregate quaternion time series.
///
/// Implementors must keep the four quaternion columns at the same length,
/// reported by [`n_rows`](Self::n_rows).
pub trait QuaternionTable {
    /// Number of grid points.
    fn n_rows(&self) -> usize;

    /// The values of one quaternion column, of length `n_rows()`.
    fn column(&self, component: Component) -> &[f64];

    /// Overwrite one scalar.
    ///
    /// # Panics
    ///
    /// May panic if `row >= n_rows()`.
    fn set_value(&mut self, component: Component, row: usize, value: f64);

    /// A structural copy (same grid, same extra columns) tagged as a QTS.
    #[must_use]
    fn clone_as_qts(&self) -> Self
    where
        Self: Sized;

    /// The raw quaternion stored at `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= n_rows()`.
    fn quaternion_at(&self, row: usize) -> Quaternion<f64> {
        Quaternion::new(
            self.column(Component::W)[row],
            self.column(Component::X)[row],
            self.column(Component::Y)[row],
            self.column(Component::Z)[row],
        )
    }

    /// Write a rotation into the four columns at `row`.
    ///
    /// # Panics
    ///
    /// May panic if `row >= n_rows()`.
    fn set_rotation_at(&mut self, row: usize, rotation: &UnitQuaternion<f64>) {
        for component in Component::ALL {
            self.set_value(component, row, component.of(rotation.quaternion()));
        }
    }
}

/// Columnar quaternion time series.
///
/// Quaternions are stored as given; they are only validated and normalized
/// when aggregated. Column lengths are checked on construction, including
/// deserialization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SeriesColumns"))]
pub struct QuaternionTimeSeries {
    time: Vec<f64>,
    w: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    classes: Vec<String>,
}

impl QuaternionTimeSeries {
    /// Build a series from a time column and one quaternion per time point.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::ColumnLengthMismatch`] if the lengths differ.
    pub fn new(time: Vec<f64>, rotations: &[Quaternion<f64>]) -> Result<Self> {
        if rotations.len() != time.len() {
            return Err(AggregationError::column_length_mismatch(
                "w",
                time.len(),
                rotations.len(),
            ));
        }

        let column = |component: Component| -> Vec<f64> {
            rotations.iter().map(|q| component.of(q)).collect()
        };

        Ok(Self {
            w: column(Component::W),
            x: column(Component::X),
            y: column(Component::Y),
            z: column(Component::Z),
            time,
            classes: qts_classes(&[]),
        })
    }

    /// Build a series from five aligned columns.
    ///
    /// # Errors
    ///
    /// Returns [`AggregationError::ColumnLengthMismatch`] naming the first
    /// quaternion column whose length differs from `time`.
    pub fn from_columns(
        time: Vec<f64>,
        w: Vec<f64>,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
    ) -> Result<Self> {
        let expected = time.len();
        for (component, values) in Component::ALL.into_iter().zip([&w, &x, &y, &z]) {
            if values.len() != expected {
                return Err(AggregationError::column_length_mismatch(
                    component.name(),
                    expected,
                    values.len(),
                ));
            }
        }

        Ok(Self {
            time,
            w,
            x,
            y,
            z,
            classes: qts_classes(&[]),
        })
    }

    /// Replace the class tags.
    #[must_use]
    pub fn with_classes<S: Into<String>>(mut self, classes: impl IntoIterator<Item = S>) -> Self {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the series has no grid points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The time column.
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Class tags, most specific first.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether the series is tagged as a quaternion time series.
    #[must_use]
    pub fn is_qts(&self) -> bool {
        self.classes.first().is_some_and(|c| c == QTS_CLASSES[0])
    }

    /// The quaternion at `row`, if in range.
    #[must_use]
    pub fn rotation(&self, row: usize) -> Option<Quaternion<f64>> {
        (row < self.len()).then(|| self.quaternion_at(row))
    }

    /// Iterate over the stored quaternions in grid order.
    pub fn rotations(&self) -> impl Iterator<Item = Quaternion<f64>> + '_ {
        (0..self.len()).map(|row| self.quaternion_at(row))
    }
}

/// Unchecked wire form of [`QuaternionTimeSeries`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct SeriesColumns {
    time: Vec<f64>,
    w: Vec<f64>,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    #[serde(default)]
    classes: Vec<String>,
}

#[cfg(feature = "serde")]
impl TryFrom<SeriesColumns> for QuaternionTimeSeries {
    type Error = AggregationError;

    fn try_from(columns: SeriesColumns) -> Result<Self> {
        let series = Self::from_columns(columns.time, columns.w, columns.x, columns.y, columns.z)?;
        if columns.classes.is_empty() {
            Ok(series)
        } else {
            Ok(series.with_classes(columns.classes))
        }
    }
}

impl QuaternionTable for QuaternionTimeSeries {
    fn n_rows(&self) -> usize {
        self.len()
    }

    fn column(&self, component: Component) -> &[f64] {
        match component {
            Component::W => &self.w,
            Component::X => &self.x,
            Component::Y => &self.y,
            Component::Z => &self.z,
        }
    }

    fn set_value(&mut self, component: Component, row: usize, value: f64) {
        let column = match component {
            Component::W => &mut self.w,
            Component::X => &mut self.x,
            Component::Y => &mut self.y,
            Component::Z => &mut self.z,
        };
        column[row] = value;
    }

    fn clone_as_qts(&self) -> Self {
        Self {
            classes: qts_classes(&self.classes),
            ..self.clone()
        }
    }
}

/// Standard QTS tags followed by any extra tags from `existing`.
fn qts_classes(existing: &[String]) -> Vec<String> {
    QTS_CLASSES
        .iter()
        .map(|c| (*c).to_string())
        .chain(
            existing
                .iter()
                .filter(|c| !QTS_CLASSES.contains(&c.as_str()))
                .cloned(),
        )
        .collect()
}
