//! Code for reading buildings and their loads from CSV files.
use super::{input_err_msg, read_csv};
use crate::building::{Building, BuildingID, BuildingMap, Fuel, LoadState};
use crate::id::IDMap;
use crate::timeseries::{HourlySeries, LoadShape};
use crate::units::Energy;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const BUILDINGS_FILE_NAME: &str = "buildings.csv";
const BUILDING_LOADS_FILE_NAME: &str = "building_loads.csv";
const LOAD_PROFILES_FILE_NAME: &str = "load_profiles.csv";

#[derive(Debug, PartialEq, Deserialize)]
struct BuildingRaw {
    building_id: String,
    #[serde(default)]
    retrofit_year: Option<u32>,
}

#[derive(Debug, PartialEq, Deserialize)]
struct BuildingLoadRaw {
    building_id: String,
    fuel: Fuel,
    state: LoadState,
    annual_energy: Energy,
    profile_id: String,
}

#[derive(Debug, PartialEq, Deserialize)]
struct LoadProfileRaw {
    profile_id: String,
    hour: usize,
    value: f64,
}

/// Read buildings, their loads and the load profiles they use from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A map of [`Building`]s, keyed by ID, or an error.
pub fn read_buildings(model_dir: &Path) -> Result<BuildingMap> {
    let file_path = model_dir.join(LOAD_PROFILES_FILE_NAME);
    let profiles = read_load_profiles_from_iter(read_csv(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(BUILDINGS_FILE_NAME);
    let mut buildings = read_buildings_from_iter(read_csv(&file_path)?)
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(BUILDING_LOADS_FILE_NAME);
    read_building_loads_from_iter(read_csv(&file_path)?, &mut buildings, &profiles)
        .with_context(|| input_err_msg(&file_path))?;

    Ok(buildings)
}

/// Normalise load profiles, checking that they all cover the same number of hours
fn read_load_profiles_from_iter<I>(iter: I) -> Result<HashMap<String, LoadShape>>
where
    I: Iterator<Item = LoadProfileRaw>,
{
    let mut raw: IndexMap<String, Vec<(usize, f64)>> = IndexMap::new();
    for row in iter {
        raw.entry(row.profile_id).or_default().push((row.hour, row.value));
    }

    let mut profiles = HashMap::new();
    let mut hours = None;
    for (profile_id, mut values) in raw {
        values.sort_by_key(|(hour, _)| *hour);
        ensure!(
            values.iter().map(|(hour, _)| *hour).eq(0..values.len()),
            "Profile {profile_id} must have exactly one value for each hour, starting from hour 0"
        );

        let expected_hours = *hours.get_or_insert(values.len());
        ensure!(
            values.len() == expected_hours,
            "Profile {profile_id} has {} hours but other profiles have {expected_hours}",
            values.len()
        );

        let values = values.into_iter().map(|(_, value)| value).collect_vec();
        let shape = LoadShape::from_raw(&values)
            .with_context(|| format!("Invalid values for profile {profile_id}"))?;
        profiles.insert(profile_id, shape);
    }

    Ok(profiles)
}

fn read_buildings_from_iter<I>(iter: I) -> Result<BuildingMap>
where
    I: Iterator<Item = BuildingRaw>,
{
    let mut buildings = BuildingMap::new();
    for row in iter {
        let id = BuildingID::from(row.building_id);
        let building = Building {
            id: id.clone(),
            retrofit_year: row.retrofit_year,
            hours: 0,
            loads: IndexMap::new(),
        };
        ensure!(
            buildings.insert(id.clone(), building).is_none(),
            "Duplicate building ID {id}"
        );
    }

    Ok(buildings)
}

/// Attach hourly loads to buildings by scaling their load profiles.
///
/// Every building is given the common number of hours, even if it has no loads.
fn read_building_loads_from_iter<I>(
    iter: I,
    buildings: &mut BuildingMap,
    profiles: &HashMap<String, LoadShape>,
) -> Result<()>
where
    I: Iterator<Item = BuildingLoadRaw>,
{
    let hours = profiles.values().map(LoadShape::hours).next().unwrap_or(0);
    for building in buildings.values_mut() {
        building.hours = hours;
    }

    for row in iter {
        ensure!(
            row.annual_energy.is_finite() && row.annual_energy >= Energy(0.0),
            "Annual energy for building {} must be a finite, non-negative number",
            row.building_id
        );
        let profile = profiles
            .get(&row.profile_id)
            .with_context(|| format!("Unknown profile ID {}", row.profile_id))?;

        // Checks that the building exists
        let id = buildings.get_by_id(&row.building_id)?.id.clone();
        let building = &mut buildings[&id];
        let series = HourlySeries::from_shape(profile, row.annual_energy);
        ensure!(
            building.loads.insert((row.fuel, row.state), series).is_none(),
            "Duplicate load for building {id}, fuel {} and state {}",
            row.fuel,
            row.state
        );
    }

    Ok(())
}
