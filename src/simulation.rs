//! Functionality for running the simulation.
//!
//! Each scenario is simulated independently: buildings are resolved for the scenario, then every
//! network in the model is evaluated from its meters upwards.
use crate::building::{BuildingID, ScenarioBuilding, buildings_for_scenario};
use crate::model::Model;
use crate::network::pipeline::{PipelineContext, PipelineResults};
use crate::network::transformer::UpgradeOutcome;
use crate::network::{BuildContext, NetworkNode, UtilityNetwork};
use crate::output::DataWriter;
use crate::scenario::Scenario;
use crate::units::{Leakage, Money};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use log::{info, warn};
use std::path::Path;

/// The evaluated networks for one scenario
pub struct ScenarioResults<'a> {
    /// The scenario simulated
    pub scenario: Scenario,
    /// Buildings, resolved for the scenario
    pub buildings: IndexMap<BuildingID, ScenarioBuilding<'a>>,
    /// One entry per network in the model
    pub networks: Vec<UtilityNetwork>,
}

impl ScenarioResults<'_> {
    /// Stranded value booked across all networks
    pub fn total_stranded_value(&self) -> Money {
        self.iter_nodes()
            .map(|node| node.asset.total_stranded_value())
            .sum()
    }

    /// Methane leaked from gas pipes over the simulation window
    pub fn total_leakage(&self) -> Leakage {
        self.iter_nodes()
            .filter_map(|node| node.pipeline_results())
            .map(PipelineResults::total_leakage)
            .sum()
    }

    /// Number of transformer upgrades and their total cost
    pub fn transformer_upgrades(&self) -> (u32, Money) {
        self.iter_nodes()
            .filter_map(|node| node.transformer_results())
            .fold((0, Money(0.0)), |(count, cost), results| {
                (
                    count + results.total_upgrades(),
                    cost + results.total_upgrade_cost(),
                )
            })
    }

    /// Number of transformers left overloaded after reaching the upgrade limit
    pub fn overloaded_transformers(&self) -> usize {
        self.iter_nodes()
            .filter_map(|node| node.transformer_results())
            .filter(|results| matches!(results.outcome, UpgradeOutcome::CapacityExceeded { .. }))
            .count()
    }

    fn iter_nodes(&self) -> impl Iterator<Item = &NetworkNode> {
        self.networks.iter().flat_map(UtilityNetwork::iter)
    }

    /// Write a summary of the results to the log
    fn log_summary(&self) {
        let (upgrades, upgrade_cost) = self.transformer_upgrades();
        info!(
            "Scenario {}: stranded value {}, gas leakage {}, {upgrades} transformer upgrade(s) \
            costing {upgrade_cost}",
            self.scenario,
            self.total_stranded_value(),
            self.total_leakage()
        );

        let overloaded = self.overloaded_transformers();
        if overloaded > 0 {
            warn!(
                "Scenario {}: {overloaded} transformer(s) remain overloaded",
                self.scenario
            );
        }
    }
}

/// Evaluate every network in the model for a single scenario.
///
/// # Arguments
///
/// * `model` - The model to run
/// * `scenario` - The scenario to simulate
pub fn run_scenario(model: &Model, scenario: Scenario) -> Result<ScenarioResults<'_>> {
    let buildings = buildings_for_scenario(&model.buildings, scenario, model.years);
    let networks = build_networks(model, scenario, &buildings)
        .with_context(|| format!("Failed to simulate scenario {scenario}"))?;

    Ok(ScenarioResults {
        scenario,
        buildings,
        networks,
    })
}

fn build_networks(
    model: &Model,
    scenario: Scenario,
    buildings: &IndexMap<BuildingID, ScenarioBuilding>,
) -> Result<Vec<UtilityNetwork>> {
    let ctx = BuildContext {
        scenario,
        years: model.years,
        buildings,
        pipelines: PipelineContext {
            leak_factors: &model.leak_factors,
            om_costs: &model.om_costs,
            retrofit_material: &model.parameters.retrofit_pipe_material,
            years: model.years,
        },
        transformer: model.parameters.transformer_constants(),
    };

    model
        .iter_networks()
        .map(|topology| topology.build(&ctx))
        .try_collect()
}

/// Run the simulation.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `output_path` - The folder to which output files will be written
pub fn run(model: &Model, output_path: &Path) -> Result<()> {
    for scenario in model.iter_scenarios() {
        info!("Running scenario: {scenario}");
        let results = run_scenario(model, scenario)?;

        let mut writer = DataWriter::create(output_path, scenario, model.years)?;
        writer.write_buildings(&results.buildings)?;
        for network in &results.networks {
            writer.write_network(network)?;
        }
        writer.flush()?;

        results.log_summary();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::model;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_run_scenario(model: Model) {
        let bau = run_scenario(&model, Scenario::BusinessAsUsual).unwrap();
        assert_eq!(bau.networks.len(), 1);
        assert_eq!(bau.buildings.len(), 3);
        assert_eq!(bau.transformer_upgrades(), (0, Money(0.0)));
        assert_eq!(bau.overloaded_transformers(), 0);

        // Nothing is retired early without retrofits
        assert_eq!(bau.total_stranded_value(), Money(0.0));

        // service1 is shut off once building1 and building2 have both left
        let elec = run_scenario(&model, Scenario::AcceleratedElectrification).unwrap();
        assert!(elec.total_leakage() < bau.total_leakage());
        assert!(elec.total_leakage() > Leakage(0.0));
        assert!(elec.total_stranded_value() > Money(0.0));
    }

    #[rstest]
    fn test_run(model: Model) {
        let dir = tempdir().unwrap();
        run(&model, dir.path()).unwrap();

        for scenario in model.iter_scenarios() {
            let scenario_dir = dir.path().join(scenario.to_string());
            for file_name in [
                "assets.csv",
                "transformers.csv",
                "gas_shutoff.csv",
                "buildings.csv",
            ] {
                assert!(scenario_dir.join(file_name).is_file());
            }
        }
    }
}
