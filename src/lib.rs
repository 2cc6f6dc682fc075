//! Common functionality for streetsim.
//!
//! streetsim plans the decarbonization of a street segment: it simulates the buildings on the
//! segment together with the gas and electric networks serving them, year by year, under a set of
//! retrofit scenarios.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod asset;
pub mod building;
pub mod cli;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod network;
pub mod output;
pub mod scenario;
pub mod settings;
pub mod simulation;
pub mod timeseries;
pub mod units;
pub mod year;

#[cfg(test)]
mod fixture;

/// Get the path to the folder where streetsim's configuration files are stored
pub fn get_streetsim_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config dir on this platform, so use the working directory
        return PathBuf::new();
    };

    config_dir.push("streetsim");
    config_dir
}
