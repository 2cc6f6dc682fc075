//! Year-indexed values and typical-year hourly load series.
//!
//! Every simulated year uses the same hourly calendar template (a "typical year"), so an hourly
//! series is just a fixed-length slice of hourly loads. Series are reference counted because the
//! same building profile is shared by every year in which the building is in the same state.
use crate::units::{Energy, Power};
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use std::ops::Deref;
use std::rc::Rc;

/// A map of values keyed by simulation year
pub type YearlyValues<T> = IndexMap<u32, T>;

/// Hourly loads (kW, numerically equal to kWh per hour) for a typical year
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries(Rc<[Power]>);

impl HourlySeries {
    /// Create a new series from hourly loads
    pub fn new(values: Vec<Power>) -> Self {
        Self(values.into())
    }

    /// A series of zeros with the given number of hours
    pub fn zeros(hours: usize) -> Self {
        Self::new(vec![Power(0.0); hours])
    }

    /// Build a series by scaling a normalised load shape to an annual total
    pub fn from_shape(shape: &LoadShape, annual_energy: Energy) -> Self {
        Self::new(
            shape
                .iter()
                .map(|fraction| Power(fraction * annual_energy.value()))
                .collect(),
        )
    }

    /// The total energy consumed over the year
    pub fn total(&self) -> Energy {
        Energy(self.0.iter().map(Power::value).sum())
    }

    /// The maximum hourly load in the series.
    ///
    /// An empty series has a peak of zero.
    pub fn peak(&self) -> Power {
        self.0.iter().copied().fold(Power(0.0), Power::max)
    }
}

impl Deref for HourlySeries {
    type Target = [Power];

    fn deref(&self) -> &[Power] {
        &self.0
    }
}

/// Elementwise sum of hourly series.
///
/// Returns `None` if there are no series. A single series is shared rather than copied.
///
/// # Panics
///
/// Panics if the series have different lengths. Load shapes are checked for a common length when
/// they are read, so this indicates a bug.
pub fn sum_series<'a, I>(series: I) -> Option<HourlySeries>
where
    I: IntoIterator<Item = &'a HourlySeries>,
{
    let mut iter = series.into_iter();
    let first = iter.next()?;
    let Some(second) = iter.next() else {
        return Some(first.clone());
    };

    let mut total = first.to_vec();
    for series in std::iter::once(second).chain(iter) {
        assert_eq!(
            total.len(),
            series.len(),
            "Cannot sum hourly series of different lengths"
        );
        for (acc, value) in total.iter_mut().zip(series.iter()) {
            *acc += *value;
        }
    }

    Some(HourlySeries::new(total))
}

/// Union-sum of year-keyed maps.
///
/// For every year present in any of the maps, the result contains the sum of the values for that
/// year. Years missing from a map contribute nothing.
pub fn union_sum<'a, T, I>(maps: I) -> YearlyValues<T>
where
    T: Copy + Default + std::ops::AddAssign + 'a,
    I: IntoIterator<Item = &'a YearlyValues<T>>,
{
    let mut out = YearlyValues::new();
    for map in maps {
        for (year, value) in map {
            *out.entry(*year).or_default() += *value;
        }
    }
    out.sort_keys();

    out
}

/// A normalised load shape whose hourly fractions sum to one
#[derive(Debug, Clone, PartialEq)]
pub struct LoadShape(Rc<[f64]>);

impl LoadShape {
    /// Normalise raw hourly values into a load shape.
    ///
    /// Values must be finite and non-negative, and must not all be zero.
    pub fn from_raw(values: &[f64]) -> Result<Self> {
        ensure!(!values.is_empty(), "Load profile cannot be empty");
        ensure!(
            values.iter().all(|v| v.is_finite() && *v >= 0.0),
            "Load profile values must be finite and non-negative"
        );
        let total: f64 = values.iter().sum();
        ensure!(total > 0.0, "Load profile values cannot all be zero");

        Ok(Self(values.iter().map(|v| v / total).collect()))
    }

    /// The number of hours in the shape
    pub fn hours(&self) -> usize {
        self.0.len()
    }
}

impl Deref for LoadShape {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}
