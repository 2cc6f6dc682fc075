//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::network::pipeline::Material;
use crate::network::transformer::TransformerConstants;
use crate::scenario::Scenario;
use crate::units::{Dimensionless, Money};
use crate::year::YearRange;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::Deserialize;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::from($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_unit_param_default!(default_power_factor, Dimensionless, 0.9);
define_unit_param_default!(default_overloading_factor, Dimensionless, 1.25);
define_param_default!(default_transformer_upgrade_cost, Money, Money(10000.0));
define_param_default!(default_max_transformer_upgrades, u32, 10);
define_param_default!(default_retrofit_pipe_material, Material, "PL".into());

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// A name for the model, used for the default output folder
    #[serde(default)]
    pub name: Option<String>,
    /// The first simulated year
    pub start_year: u32,
    /// The year after the last simulated year
    pub end_year: u32,
    /// The decarbonization pathways to simulate
    pub scenarios: Vec<Scenario>,
    /// Ratio of real to apparent power for transformers
    #[serde(default = "default_power_factor")]
    pub power_factor: Dimensionless,
    /// How far above their rating transformers may be loaded before being upgraded
    #[serde(default = "default_overloading_factor")]
    pub overloading_factor: Dimensionless,
    /// Capital cost of a single transformer upgrade
    #[serde(default = "default_transformer_upgrade_cost")]
    pub transformer_upgrade_cost: Money,
    /// The maximum number of upgrades for any one transformer
    #[serde(default = "default_max_transformer_upgrades")]
    pub max_transformer_upgrades: u32,
    /// Material code for pipes after replacement
    #[serde(default = "default_retrofit_pipe_material")]
    pub retrofit_pipe_material: Material,
}

/// Check that the `scenarios` parameter is valid
fn check_scenarios(scenarios: &[Scenario]) -> Result<()> {
    ensure!(!scenarios.is_empty(), "`scenarios` is empty");
    ensure!(
        scenarios.iter().all_unique(),
        "`scenarios` cannot contain duplicate values"
    );

    Ok(())
}

/// Check that the `power_factor` parameter is valid
fn check_power_factor(value: Dimensionless) -> Result<()> {
    ensure!(
        value > Dimensionless(0.0) && value <= Dimensionless(1.0),
        "power_factor must be greater than zero and no more than one"
    );

    Ok(())
}

/// Check that the `overloading_factor` parameter is valid
fn check_overloading_factor(value: Dimensionless) -> Result<()> {
    ensure!(
        value.value().is_finite() && value > Dimensionless(0.0),
        "overloading_factor must be a finite number greater than zero"
    );

    Ok(())
}

/// Check that the `transformer_upgrade_cost` parameter is valid
fn check_transformer_upgrade_cost(value: Money) -> Result<()> {
    ensure!(
        value.is_finite() && value >= Money(0.0),
        "transformer_upgrade_cost must be a finite, non-negative number"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        // start_year and end_year
        self.years()?;

        check_scenarios(&self.scenarios)?;
        check_power_factor(self.power_factor)?;
        check_overloading_factor(self.overloading_factor)?;
        check_transformer_upgrade_cost(self.transformer_upgrade_cost)?;
        ensure!(
            self.max_transformer_upgrades > 0,
            "max_transformer_upgrades cannot be zero"
        );
        ensure!(
            !self.retrofit_pipe_material.is_empty(),
            "retrofit_pipe_material cannot be empty"
        );

        Ok(())
    }

    /// The simulation window
    pub fn years(&self) -> Result<YearRange> {
        YearRange::new(self.start_year, self.end_year)
    }

    /// Constants used when sizing transformers
    pub fn transformer_constants(&self) -> TransformerConstants {
        TransformerConstants {
            power_factor: self.power_factor,
            overloading_factor: self.overloading_factor,
            upgrade_cost: self.transformer_upgrade_cost,
            max_upgrades: self.max_transformer_upgrades,
        }
    }
}
