//! The model represents the static input data provided by the user.
use crate::building::BuildingMap;
use crate::network::NetworkTopology;
use crate::network::pipeline::{LeakFactorTable, OmCostTable};
use crate::scenario::Scenario;
use crate::year::YearRange;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// The simulation window
    pub years: YearRange,
    /// Buildings served by the networks
    pub buildings: BuildingMap,
    /// The gas network, if the segment has one
    pub gas_network: Option<NetworkTopology>,
    /// The electric network, if the segment has one
    pub electric_network: Option<NetworkTopology>,
    /// Methane leak rates by pipe type and material
    pub leak_factors: LeakFactorTable,
    /// O&M costs by pipe type and material
    pub om_costs: OmCostTable,
}

impl Model {
    /// Iterate over the scenarios to simulate, in the order given in the model file
    pub fn iter_scenarios(&self) -> impl Iterator<Item = Scenario> + '_ {
        self.parameters.scenarios.iter().copied()
    }

    /// Iterate over the networks present in the model
    pub fn iter_networks(&self) -> impl Iterator<Item = &NetworkTopology> {
        self.gas_network.iter().chain(self.electric_network.iter())
    }

    /// A name for the model, taken from the model file or else the model folder
    pub fn name(&self) -> String {
        self.parameters.name.clone().unwrap_or_else(|| {
            self.model_path.file_name().map_or_else(
                || "model".to_string(),
                |name| name.to_string_lossy().into_owned(),
            )
        })
    }
}
