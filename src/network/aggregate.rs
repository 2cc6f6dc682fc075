//! Aggregation of energy use up the network tree.
use crate::building::{Fuel, ScenarioBuilding};
use crate::timeseries::{HourlySeries, YearlyValues, sum_series, union_sum};
use crate::units::{Energy, Power};
use crate::year::YearRange;

/// The energy flowing through a network node, by year.
///
/// For a meter this is its building's consumption. For every other node it is built only from the
/// aggregates of its direct children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadAggregate {
    total_energy_use: YearlyValues<Energy>,
    energy_use_timeseries: YearlyValues<HourlySeries>,
    peak_energy_use: YearlyValues<Power>,
}

impl LoadAggregate {
    /// The load seen by a meter serving `building`.
    ///
    /// The building's consumption of `fuel` passes through the meter only in years in which the
    /// building is connected (`connected[i]`); other years carry no load.
    pub fn from_building(
        building: &ScenarioBuilding,
        fuel: Fuel,
        connected: &[bool],
        years: YearRange,
    ) -> Self {
        let mut energy_use_timeseries = YearlyValues::new();
        for (year, connected) in years.iter().zip(connected) {
            let series = building.hourly_series(fuel, year);
            let series = if *connected {
                series.clone()
            } else {
                HourlySeries::zeros(series.len())
            };
            energy_use_timeseries.insert(year, series);
        }

        let total_energy_use = energy_use_timeseries
            .iter()
            .map(|(year, series)| (*year, series.total()))
            .collect();

        Self::with_coincident_peaks(total_energy_use, energy_use_timeseries)
    }

    /// Aggregate the loads of a node's children.
    ///
    /// Annual totals are summed year by year. Hourly series are summed elementwise, and the peak
    /// for each year is taken from the summed series, so it is the coincident peak of the children
    /// rather than the sum of their individual peaks.
    pub fn from_children(children: &[&LoadAggregate]) -> Self {
        let total_energy_use = union_sum(children.iter().map(|c| &c.total_energy_use));

        let mut energy_use_timeseries = YearlyValues::new();
        for year in total_energy_use.keys() {
            let series = children
                .iter()
                .filter_map(|child| child.energy_use_timeseries.get(year));
            if let Some(total) = sum_series(series) {
                energy_use_timeseries.insert(*year, total);
            }
        }

        Self::with_coincident_peaks(total_energy_use, energy_use_timeseries)
    }

    fn with_coincident_peaks(
        total_energy_use: YearlyValues<Energy>,
        energy_use_timeseries: YearlyValues<HourlySeries>,
    ) -> Self {
        let peak_energy_use = energy_use_timeseries
            .iter()
            .map(|(year, series)| (*year, series.peak()))
            .collect();

        Self {
            total_energy_use,
            energy_use_timeseries,
            peak_energy_use,
        }
    }

    /// Total energy through the node in each year
    pub fn total_energy_use(&self) -> &YearlyValues<Energy> {
        &self.total_energy_use
    }

    /// Summed hourly load through the node in each year
    pub fn energy_use_timeseries(&self) -> &YearlyValues<HourlySeries> {
        &self.energy_use_timeseries
    }

    /// Coincident peak load through the node in each year
    pub fn peak_energy_use(&self) -> &YearlyValues<Power> {
        &self.peak_energy_use
    }

    /// Total energy as a vector aligned to the simulation years (zero for missing years)
    pub fn total_energy_vector(&self, years: YearRange) -> Vec<Energy> {
        years
            .iter()
            .map(|year| {
                self.total_energy_use
                    .get(&year)
                    .copied()
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Peak load as a vector aligned to the simulation years (zero for missing years)
    pub fn peak_vector(&self, years: YearRange) -> Vec<Power> {
        years
            .iter()
            .map(|year| {
                self.peak_energy_use
                    .get(&year)
                    .copied()
                    .unwrap_or_default()
            })
            .collect()
    }
}
