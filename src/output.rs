//! The module responsible for writing output data to disk.
use crate::asset::AssetID;
use crate::building::{BuildingID, Fuel, ScenarioBuilding};
use crate::network::{NetworkKind, NetworkNode, NodeKind, UtilityNetwork};
use crate::scenario::Scenario;
use crate::units::{ApparentPower, Dimensionless, Energy, Leakage, Length, Money, Power};
use crate::year::YearRange;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "streetsim_results";

/// The output file name for per-asset results
const ASSETS_FILE_NAME: &str = "assets.csv";

/// The output file name for transformer upgrade plans
const TRANSFORMERS_FILE_NAME: &str = "transformers.csv";

/// The output file name for gas main shutoffs
const GAS_SHUTOFF_FILE_NAME: &str = "gas_shutoff.csv";

/// The output file name for building retrofit states
const BUILDINGS_FILE_NAME: &str = "buildings.csv";

/// Get the default output folder for the model in the specified directory
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally replacing an existing one.
///
/// # Arguments
///
/// * `output_dir` - The folder to create
/// * `allow_overwrite` - Whether to delete and recreate the folder if it already has contents
///
/// # Returns
///
/// Whether an existing folder was overwritten, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut entries) = fs::read_dir(output_dir) {
        if entries.next().is_none() {
            // Already exists and is empty
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Please delete the folder or pass the \
            --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row of the assets CSV file: one asset in one year
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
struct AssetRow {
    network: NetworkKind,
    node_type: NodeKind,
    asset_id: AssetID,
    parent_id: Option<AssetID>,
    year: u32,
    operational: bool,
    retrofit: bool,
    replacement: bool,
    in_service: bool,
    length: Option<Length>,
    install_cost: Money,
    depreciation: Money,
    stranded_value: Money,
    total_energy: Energy,
    peak_demand: Power,
    leakage: Option<Leakage>,
    operating_expense: Option<Money>,
}

/// Represents a row of the transformers CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct TransformerRow {
    asset_id: AssetID,
    year: u32,
    bank_kva: ApparentPower,
    upgrades: u32,
    upgrade_cost: Money,
    overloading_flag: bool,
    overloading_ratio: Dimensionless,
    is_replacement: bool,
}

/// Represents a row of the gas shutoff CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct GasShutoffRow {
    asset_id: AssetID,
    year: u32,
    shutoff: bool,
}

/// Represents a row of the buildings CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct BuildingRow {
    building_id: BuildingID,
    year: u32,
    is_retrofit: bool,
    fuel_type: Fuel,
    electricity: Energy,
    natural_gas: Energy,
    propane: Energy,
}

/// An object for writing the results of one scenario to file
pub struct DataWriter {
    years: YearRange,
    assets_writer: csv::Writer<File>,
    transformers_writer: csv::Writer<File>,
    gas_shutoff_writer: csv::Writer<File>,
    buildings_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write a scenario's results to.
    ///
    /// Files are placed in a subfolder of `output_path` named after the scenario.
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder for the model's results
    /// * `scenario` - The scenario whose results will be written
    /// * `years` - The simulation window
    pub fn create(output_path: &Path, scenario: Scenario, years: YearRange) -> Result<Self> {
        let scenario_path = output_path.join(scenario.to_string());
        fs::create_dir_all(&scenario_path).with_context(|| {
            format!(
                "Failed to create output folder {}",
                scenario_path.display()
            )
        })?;

        let new_writer = |file_name| {
            let file_path = scenario_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            years,
            assets_writer: new_writer(ASSETS_FILE_NAME)?,
            transformers_writer: new_writer(TRANSFORMERS_FILE_NAME)?,
            gas_shutoff_writer: new_writer(GAS_SHUTOFF_FILE_NAME)?,
            buildings_writer: new_writer(BUILDINGS_FILE_NAME)?,
        })
    }

    /// Write every node of an evaluated network
    pub fn write_network(&mut self, network: &UtilityNetwork) -> Result<()> {
        for node in network.iter() {
            self.write_asset(network.kind(), node)?;

            if let Some(results) = node.transformer_results() {
                for (i, year) in self.years.iter().enumerate() {
                    let row = TransformerRow {
                        asset_id: node.asset.id().clone(),
                        year,
                        bank_kva: results.annual_bank_kva[i],
                        upgrades: results.annual_upgrades[i],
                        upgrade_cost: results.upgrade_cost[i],
                        overloading_flag: results.overloading_flag[i],
                        overloading_ratio: results.overloading_ratio[i],
                        is_replacement: results.is_replacement[i],
                    };
                    self.transformers_writer.serialize(row)?;
                }
            }

            if node.kind != NodeKind::Main {
                continue;
            }
            if let Some(results) = node.pipeline_results() {
                for (year, shutoff) in self.years.iter().zip(&results.shutoff_vector) {
                    let row = GasShutoffRow {
                        asset_id: node.asset.id().clone(),
                        year,
                        shutoff: *shutoff,
                    };
                    self.gas_shutoff_writer.serialize(row)?;
                }
            }
        }

        Ok(())
    }

    /// Write one row per year for a node
    fn write_asset(&mut self, network: NetworkKind, node: &NetworkNode) -> Result<()> {
        let asset = &node.asset;
        let retrofit = asset.retrofit_vector();
        let total_energy = node.load.total_energy_vector(self.years);
        let peak_demand = node.load.peak_vector(self.years);
        let pipeline = node.pipeline_results();

        for (i, year) in self.years.iter().enumerate() {
            let row = AssetRow {
                network,
                node_type: node.kind,
                asset_id: asset.id().clone(),
                parent_id: asset.parent_id().cloned(),
                year,
                operational: asset.operational_vector()[i],
                retrofit: retrofit[i],
                replacement: asset.replacement_vector()[i],
                in_service: node.in_service[i],
                length: node.length(),
                install_cost: asset.install_cost()[i],
                depreciation: asset.depreciation()[i],
                stranded_value: asset.stranded_value()[i],
                total_energy: total_energy[i],
                peak_demand: peak_demand[i],
                leakage: pipeline.map(|results| results.annual_total_leakage[i]),
                operating_expense: pipeline.map(|results| results.operating_expense[i]),
            };
            self.assets_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Write the retrofit state and fuel use of each building
    pub fn write_buildings(
        &mut self,
        buildings: &IndexMap<BuildingID, ScenarioBuilding>,
    ) -> Result<()> {
        for building in buildings.values() {
            let states = building
                .is_retrofit_vector()
                .into_iter()
                .zip(building.fuel_type_vector());
            for (year, (is_retrofit, fuel_type)) in self.years.iter().zip(states) {
                let row = BuildingRow {
                    building_id: building.id().clone(),
                    year,
                    is_retrofit,
                    fuel_type,
                    electricity: building.annual_energy(Fuel::Electricity, year),
                    natural_gas: building.annual_energy(Fuel::NaturalGas, year),
                    propane: building.annual_energy(Fuel::Propane, year),
                };
                self.buildings_writer.serialize(row)?;
            }
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.assets_writer.flush()?;
        self.transformers_writer.flush()?;
        self.gas_shutoff_writer.flush()?;
        self.buildings_writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::{BuildingMap, buildings_for_scenario};
    use crate::fixture::{buildings, gas_network, sim_years};
    use itertools::Itertools;
    use rstest::rstest;
    use serde::de::DeserializeOwned;
    use tempfile::tempdir;

    fn read_rows<T: DeserializeOwned>(dir: &Path, scenario: Scenario, file_name: &str) -> Vec<T> {
        csv::Reader::from_path(dir.join(scenario.to_string()).join(file_name))
            .unwrap()
            .into_deserialize()
            .try_collect()
            .unwrap()
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");
        let overwrite = create_output_directory(&output_dir, false).unwrap();
        assert!(!overwrite);
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");
        fs::create_dir(&output_dir).unwrap();
        let overwrite = create_output_directory(&output_dir, false).unwrap();
        assert!(!overwrite);
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_with_files() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");
        fs::create_dir(&output_dir).unwrap();
        fs::write(output_dir.join("file.txt"), "contents").unwrap();

        // Refuses to overwrite by default
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(output_dir.join("file.txt").exists());

        let overwrite = create_output_directory(&output_dir, true).unwrap();
        assert!(overwrite);
        assert!(output_dir.is_dir());
        assert!(!output_dir.join("file.txt").exists());
    }

    #[rstest]
    fn test_write_network(gas_network: UtilityNetwork, sim_years: YearRange) {
        let scenario = Scenario::AcceleratedElectrification;
        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path(), scenario, sim_years).unwrap();
            writer.write_network(&gas_network).unwrap();
            writer.flush().unwrap();
        }

        let assets: Vec<AssetRow> = read_rows(dir.path(), scenario, ASSETS_FILE_NAME);
        assert_eq!(assets.len(), gas_network.len() * sim_years.len());

        // building1 leaves the gas network in 2030
        let meter1 = assets
            .iter()
            .filter(|row| &*row.asset_id.0 == "meter1")
            .collect_vec();
        assert_eq!(meter1.len(), sim_years.len());
        assert!(meter1[9].in_service);
        assert!(!meter1[10].in_service);
        assert_eq!(meter1[0].parent_id, Some("service1".into()));
        assert_eq!(meter1[0].leakage, None);

        let main = assets
            .iter()
            .find(|row| &*row.asset_id.0 == "main1")
            .unwrap();
        assert_eq!(main.node_type, NodeKind::Main);
        assert_eq!(main.network, NetworkKind::Gas);
        assert_eq!(main.length, Some(Length(100.0)));
        assert!(main.leakage.is_some());

        // building3 never leaves, so main1 is never shut off
        let shutoff: Vec<GasShutoffRow> = read_rows(dir.path(), scenario, GAS_SHUTOFF_FILE_NAME);
        assert_eq!(shutoff.len(), sim_years.len());
        assert!(shutoff.iter().all(|row| !row.shutoff));

        // No transformers in a gas network
        let transformers: Vec<TransformerRow> =
            read_rows(dir.path(), scenario, TRANSFORMERS_FILE_NAME);
        assert!(transformers.is_empty());
    }

    #[rstest]
    fn test_write_buildings(buildings: BuildingMap, sim_years: YearRange) {
        let scenario = Scenario::NaturalElectrification;
        let buildings = buildings_for_scenario(&buildings, scenario, sim_years);
        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path(), scenario, sim_years).unwrap();
            writer.write_buildings(&buildings).unwrap();
            writer.flush().unwrap();
        }

        let rows: Vec<BuildingRow> = read_rows(dir.path(), scenario, BUILDINGS_FILE_NAME);
        assert_eq!(rows.len(), buildings.len() * sim_years.len());

        let building1 = rows
            .iter()
            .filter(|row| &*row.building_id.0 == "building1")
            .collect_vec();
        assert_eq!(building1[0].year, 2020);
        assert!(!building1[9].is_retrofit);
        assert_eq!(building1[9].fuel_type, Fuel::NaturalGas);
        assert!(building1[10].is_retrofit);
        assert_eq!(building1[10].fuel_type, Fuel::Electricity);
        assert_eq!(building1[10].electricity, Energy(25.0));
    }
}
