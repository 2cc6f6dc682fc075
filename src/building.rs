//! Buildings are the consumers at the leaves of the utility networks.
//!
//! The end-use energy models which produce building loads live outside this crate. A building is
//! described here only by its hourly load for each fuel, before and after retrofit, and the year
//! in which it is retrofitted.
use crate::id::define_id_type;
use crate::scenario::Scenario;
use crate::timeseries::{HourlySeries, sum_series};
use crate::units::Energy;
use crate::year::YearRange;
use indexmap::IndexMap;
use log::warn;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

define_id_type! {BuildingID}

/// A map of [`Building`]s, keyed by building ID
pub type BuildingMap = IndexMap<BuildingID, Building>;

/// A fuel consumed by buildings
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum Fuel {
    /// Grid electricity
    #[string = "electricity"]
    Electricity,
    /// Natural gas delivered by the gas network
    #[string = "natural_gas"]
    NaturalGas,
    /// Delivered propane (no network)
    #[string = "propane"]
    Propane,
}

/// Whether a load applies before or after a building's retrofit
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum LoadState {
    /// Before retrofit
    #[string = "baseline"]
    Baseline,
    /// After retrofit
    #[string = "retrofit"]
    Retrofit,
}

/// A building served by the segment's utility networks
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    /// Unique identifier for the building
    pub id: BuildingID,
    /// The year in which the building is retrofitted, if it is retrofitted at all
    pub retrofit_year: Option<u32>,
    /// Number of hours in every load series
    pub hours: usize,
    /// Hourly loads for each fuel and state. Missing entries mean no load.
    pub loads: IndexMap<(Fuel, LoadState), HourlySeries>,
}

impl Building {
    /// The hourly load for a fuel in a particular state, or zeros if there is none
    fn load(&self, fuel: Fuel, state: LoadState) -> HourlySeries {
        self.loads
            .get(&(fuel, state))
            .cloned()
            .unwrap_or_else(|| HourlySeries::zeros(self.hours))
    }

    /// Whether the building has a nonzero load for the given fuel and state
    fn has_load(&self, fuel: Fuel, state: LoadState) -> bool {
        self.loads
            .get(&(fuel, state))
            .is_some_and(|series| series.total() > Energy(0.0))
    }
}

/// A building's behaviour within a particular scenario
#[derive(Debug, Clone)]
pub struct ScenarioBuilding<'a> {
    building: &'a Building,
    scenario: Scenario,
    years: YearRange,
    baseline: IndexMap<Fuel, HourlySeries>,
    retrofit: IndexMap<Fuel, HourlySeries>,
}

impl<'a> ScenarioBuilding<'a> {
    /// Resolve a building's loads for the given scenario.
    ///
    /// In scenarios with a non-pipeline alternative, any gas load remaining after retrofit is
    /// moved to propane. In other retrofit scenarios, such a load is dropped with a warning, as the
    /// building has left the gas network.
    pub fn new(building: &'a Building, scenario: Scenario, years: YearRange) -> Self {
        let fuels = [Fuel::Electricity, Fuel::NaturalGas, Fuel::Propane];
        let baseline = fuels
            .iter()
            .map(|fuel| (*fuel, building.load(*fuel, LoadState::Baseline)))
            .collect();

        let mut retrofit: IndexMap<_, _> = fuels
            .iter()
            .map(|fuel| (*fuel, building.load(*fuel, LoadState::Retrofit)))
            .collect();
        if scenario.has_retrofits() && building.has_load(Fuel::NaturalGas, LoadState::Retrofit) {
            let gas = building.load(Fuel::NaturalGas, LoadState::Retrofit);
            retrofit.insert(Fuel::NaturalGas, HourlySeries::zeros(building.hours));
            if scenario.shifts_gas_to_propane() {
                let shifted = sum_series([&retrofit[&Fuel::Propane], &gas]).unwrap_or(gas);
                retrofit.insert(Fuel::Propane, shifted);
            } else {
                warn!(
                    "Building {} has a natural gas load after retrofit, which is dropped in \
                    scenario {scenario}",
                    building.id
                );
            }
        }

        Self {
            building,
            scenario,
            years,
            baseline,
            retrofit,
        }
    }

    /// The building's ID
    pub fn id(&self) -> &BuildingID {
        &self.building.id
    }

    /// The year in which the building is retrofitted in this scenario, if any
    pub fn retrofit_year(&self) -> Option<u32> {
        if self.scenario.has_retrofits() {
            self.building.retrofit_year
        } else {
            None
        }
    }

    /// The year in which the building stops taking gas from the network, if any
    pub fn gas_exit_year(&self) -> Option<u32> {
        self.retrofit_year()
    }

    /// Whether the building is retrofitted in the given year
    pub fn is_retrofit(&self, year: u32) -> bool {
        self.retrofit_year().is_some_and(|retrofit| year >= retrofit)
    }

    /// True in each simulated year from the retrofit year on
    pub fn is_retrofit_vector(&self) -> Vec<bool> {
        self.years.iter().map(|year| self.is_retrofit(year)).collect()
    }

    /// The building's main heating fuel in each simulated year
    pub fn fuel_type_vector(&self) -> Vec<Fuel> {
        self.years
            .iter()
            .map(|year| {
                if self.is_retrofit(year) {
                    Fuel::Electricity
                } else {
                    Fuel::NaturalGas
                }
            })
            .collect()
    }

    /// The hourly load for a fuel in a given year
    pub fn hourly_series(&self, fuel: Fuel, year: u32) -> &HourlySeries {
        let loads = if self.is_retrofit(year) {
            &self.retrofit
        } else {
            &self.baseline
        };
        &loads[&fuel]
    }

    /// The total consumption of a fuel in a given year
    pub fn annual_energy(&self, fuel: Fuel, year: u32) -> Energy {
        self.hourly_series(fuel, year).total()
    }
}

/// Resolve every building's behaviour for a scenario
pub fn buildings_for_scenario(
    buildings: &BuildingMap,
    scenario: Scenario,
    years: YearRange,
) -> IndexMap<BuildingID, ScenarioBuilding<'_>> {
    buildings
        .iter()
        .map(|(id, building)| (id.clone(), ScenarioBuilding::new(building, scenario, years)))
        .collect()
}
