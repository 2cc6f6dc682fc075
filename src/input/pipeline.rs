//! Code for reading per-material pipe tables.
use super::{input_err_msg, read_csv_optional};
use crate::network::pipeline::{LeakFactorTable, MaterialTable, OmCostTable, PipelineType};
use crate::units::{LeakagePerLength, MoneyPerLength};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const LEAK_FACTORS_FILE_NAME: &str = "leak_factors.csv";
const OM_COSTS_FILE_NAME: &str = "pipeline_om_costs.csv";

#[derive(Debug, PartialEq, Deserialize)]
struct LeakFactorRaw {
    asset_type: PipelineType,
    material: String,
    leak_factor: LeakagePerLength,
}

#[derive(Debug, PartialEq, Deserialize)]
struct OmCostRaw {
    asset_type: PipelineType,
    material: String,
    cost_per_length: MoneyPerLength,
}

/// Read methane leak rates by pipe type and material.
///
/// The file is optional. Without it, pipes do not leak.
pub fn read_leak_factors(model_dir: &Path) -> Result<LeakFactorTable> {
    let file_path = model_dir.join(LEAK_FACTORS_FILE_NAME);
    let rows = read_csv_optional(&file_path)?.map(|row: LeakFactorRaw| {
        (
            row.asset_type,
            row.material,
            row.leak_factor.value(),
            row.leak_factor,
        )
    });
    read_material_table(rows, "leak_factor").with_context(|| input_err_msg(&file_path))
}

/// Read operation and maintenance costs by pipe type and material.
///
/// The file is optional. Without it, pipes cost nothing to operate.
pub fn read_om_costs(model_dir: &Path) -> Result<OmCostTable> {
    let file_path = model_dir.join(OM_COSTS_FILE_NAME);
    let rows = read_csv_optional(&file_path)?.map(|row: OmCostRaw| {
        (
            row.asset_type,
            row.material,
            row.cost_per_length.value(),
            row.cost_per_length,
        )
    });
    read_material_table(rows, "cost_per_length").with_context(|| input_err_msg(&file_path))
}

/// Build a table from rows of (pipe type, material, raw value, value), checking that each key
/// appears once and that values are finite and non-negative
fn read_material_table<I, T>(iter: I, column: &str) -> Result<MaterialTable<T>>
where
    I: Iterator<Item = (PipelineType, String, f64, T)>,
{
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for (pipeline_type, material, raw, value) in iter {
        ensure!(
            raw.is_finite() && raw >= 0.0,
            "{column} for {} pipes of material {material} must be a finite, non-negative number",
            pipeline_type
        );
        ensure!(
            seen.insert((pipeline_type, material.clone())),
            "Duplicate entry for {} pipes of material {material}",
            pipeline_type
        );
        entries.push(((pipeline_type, material.into()), value));
    }

    Ok(entries.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_material_table() {
        let rows = [
            (PipelineType::Main, "BS".to_string(), 0.5, 0.5),
            (PipelineType::Service, "BS".to_string(), 0.1, 0.1),
        ];
        let table = read_material_table(rows.into_iter(), "leak_factor").unwrap();
        assert_eq!(table.get(PipelineType::Main, "BS"), Some(0.5));
        assert_eq!(table.get(PipelineType::Service, "BS"), Some(0.1));
        assert_eq!(table.get(PipelineType::Service, "PL"), None);
    }

    #[test]
    fn test_read_material_table_duplicate() {
        let rows = [
            (PipelineType::Main, "BS".to_string(), 0.5, 0.5),
            (PipelineType::Main, "BS".to_string(), 0.6, 0.6),
        ];
        assert_error!(
            read_material_table(rows.into_iter(), "leak_factor"),
            "Duplicate entry for main pipes of material BS"
        );
    }

    #[test]
    fn test_read_material_table_negative() {
        let rows = [(PipelineType::Main, "BS".to_string(), -1.0, -1.0)];
        assert_error!(
            read_material_table(rows.into_iter(), "cost_per_length"),
            "cost_per_length for main pipes of material BS must be a finite, non-negative number"
        );
    }

    #[test]
    fn test_read_leak_factors() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(LEAK_FACTORS_FILE_NAME)).unwrap();
            writeln!(file, "asset_type,material,leak_factor\nmain,CI,0.25\nservice,PL,0.01").unwrap();
        }

        let table = read_leak_factors(dir.path()).unwrap();
        assert_eq!(
            table.get(PipelineType::Main, "CI"),
            Some(LeakagePerLength(0.25))
        );

        // Missing files give empty tables
        assert!(read_om_costs(dir.path()).unwrap().is_empty());
    }
}
