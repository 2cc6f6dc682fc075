//! Code for reading gas and electric network asset tables.
//!
//! Each level of a network has its own table. All tables share the asset lifecycle columns
//! (`asset_id`, `parent_id`, `install_year`, `replacement_year`, `lifetime`, `install_cost`) and add
//! columns for their level: `building_id` for meters, `material`, `diameter` and `length` for gas
//! pipes, `length` for electric lines and `bank_kva` for transformers.
use super::{input_err_msg, read_csv_optional};
use crate::asset::AssetParameters;
use crate::building::{BuildingID, BuildingMap};
use crate::network::pipeline::PipelineSpec;
use crate::network::{NetworkKind, NetworkTopology, NodeDetail, NodeKind, NodeSpec};
use crate::units::{ApparentPower, Length, Money};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const GAS_TABLES: [(&str, NodeKind); 3] = [
    ("gas_meters.csv", NodeKind::Meter),
    ("gas_services.csv", NodeKind::Service),
    ("gas_mains.csv", NodeKind::Main),
];

const ELECTRIC_TABLES: [(&str, NodeKind); 5] = [
    ("electric_meters.csv", NodeKind::Meter),
    ("electric_services.csv", NodeKind::Service),
    ("secondaries.csv", NodeKind::Secondary),
    ("transformers.csv", NodeKind::Transformer),
    ("primaries.csv", NodeKind::Primary),
];

/// A row of any network table. Columns which do not apply to a table are left empty.
#[derive(Debug, Default, PartialEq, Deserialize)]
struct NodeRaw {
    asset_id: String,
    #[serde(default)]
    parent_id: Option<String>,
    install_year: u32,
    #[serde(default)]
    replacement_year: Option<u32>,
    #[serde(default)]
    lifetime: Option<u32>,
    #[serde(default)]
    install_cost: Option<Money>,
    #[serde(default)]
    building_id: Option<String>,
    #[serde(default)]
    material: Option<String>,
    #[serde(default)]
    diameter: Option<f64>,
    #[serde(default)]
    length: Option<Length>,
    #[serde(default)]
    bank_kva: Option<ApparentPower>,
}

/// Read the gas network tables, if there are any.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `buildings` - The model's buildings, which meters must refer to
///
/// # Returns
///
/// The checked network or `None` if no gas tables are present.
pub fn read_gas_network(
    model_dir: &Path,
    buildings: &BuildingMap,
) -> Result<Option<NetworkTopology>> {
    read_network(model_dir, NetworkKind::Gas, &GAS_TABLES, buildings)
}

/// Read the electric network tables, if there are any.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `buildings` - The model's buildings, which meters must refer to
///
/// # Returns
///
/// The checked network or `None` if no electric tables are present.
pub fn read_electric_network(
    model_dir: &Path,
    buildings: &BuildingMap,
) -> Result<Option<NetworkTopology>> {
    read_network(model_dir, NetworkKind::Electric, &ELECTRIC_TABLES, buildings)
}

fn read_network(
    model_dir: &Path,
    kind: NetworkKind,
    tables: &[(&str, NodeKind)],
    buildings: &BuildingMap,
) -> Result<Option<NetworkTopology>> {
    // A network is only present if its meters table is
    let (meters_file_name, _) = tables[0];
    if !model_dir.join(meters_file_name).is_file() {
        for (file_name, _) in &tables[1..] {
            ensure!(
                !model_dir.join(file_name).exists(),
                "Found {file_name} in {} but no {meters_file_name}; the {kind} network tables must \
                be supplied together",
                model_dir.display()
            );
        }

        return Ok(None);
    }

    let mut specs = Vec::new();
    for (file_name, node_kind) in tables {
        let file_path = model_dir.join(file_name);
        for row in read_csv_optional::<NodeRaw>(&file_path)? {
            let spec = node_spec_from_raw(&row, kind, *node_kind, buildings)
                .with_context(|| input_err_msg(&file_path))?;
            specs.push(spec);
        }
    }

    if specs.is_empty() {
        return Ok(None);
    }

    let topology = NetworkTopology::new(kind, specs)
        .with_context(|| format!("Invalid {kind} network in {}", model_dir.display()))?;

    Ok(Some(topology))
}

/// Convert a table row into a node, checking the columns its level needs
fn node_spec_from_raw(
    row: &NodeRaw,
    network: NetworkKind,
    kind: NodeKind,
    buildings: &BuildingMap,
) -> Result<NodeSpec> {
    let id = &row.asset_id;
    let detail = match (network, kind) {
        (_, NodeKind::Meter) => {
            let building_id = row
                .building_id
                .as_deref()
                .with_context(|| format!("Meter {id} has no building_id"))?;
            ensure!(
                buildings.contains_key(building_id),
                "Meter {id} is connected to unknown building {building_id}"
            );
            NodeDetail::Meter {
                building_id: BuildingID::from(building_id),
            }
        }
        (NetworkKind::Gas, NodeKind::Service | NodeKind::Main) => {
            let material = row
                .material
                .as_deref()
                .with_context(|| format!("Pipe {id} has no material"))?;
            let length = row
                .length
                .with_context(|| format!("Pipe {id} has no length"))?;
            ensure!(
                length.is_finite() && length >= Length(0.0),
                "Pipe {id} must have a finite, non-negative length"
            );
            NodeDetail::Pipeline(PipelineSpec {
                material: material.into(),
                diameter: row.diameter,
                length,
            })
        }
        (_, NodeKind::Transformer) => {
            let bank_kva = row
                .bank_kva
                .with_context(|| format!("Transformer {id} has no bank_kva"))?;
            ensure!(
                bank_kva.is_finite() && bank_kva > ApparentPower(0.0),
                "Transformer {id} must have a bank_kva greater than zero"
            );
            NodeDetail::Transformer { bank_kva }
        }
        _ => {
            if let Some(length) = row.length {
                ensure!(
                    length.is_finite() && length >= Length(0.0),
                    "Line {id} must have a finite, non-negative length"
                );
            }
            NodeDetail::Line { length: row.length }
        }
    };

    let params = AssetParameters {
        asset_id: row.asset_id.as_str().into(),
        parent_id: row.parent_id.as_deref().map(Into::into),
        install_year: row.install_year,
        replacement_year: row.replacement_year,
        lifetime: row.lifetime,
        install_cost: row.install_cost,
    };

    Ok(NodeSpec {
        kind,
        params,
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, buildings};
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn row(id: &str) -> NodeRaw {
        NodeRaw {
            asset_id: id.into(),
            install_year: 2000,
            ..Default::default()
        }
    }

    #[rstest]
    fn test_meter_needs_building(buildings: BuildingMap) {
        assert_error!(
            node_spec_from_raw(&row("m1"), NetworkKind::Gas, NodeKind::Meter, &buildings),
            "Meter m1 has no building_id"
        );

        let mut meter = row("m1");
        meter.building_id = Some("no_such_building".into());
        assert_error!(
            node_spec_from_raw(&meter, NetworkKind::Gas, NodeKind::Meter, &buildings),
            "Meter m1 is connected to unknown building no_such_building"
        );

        let mut meter = row("m1");
        meter.building_id = Some("building1".into());
        meter.parent_id = Some("s1".into());
        let spec =
            node_spec_from_raw(&meter, NetworkKind::Electric, NodeKind::Meter, &buildings).unwrap();
        assert_eq!(spec.params.parent_id, Some("s1".into()));
        assert_eq!(
            spec.detail,
            NodeDetail::Meter {
                building_id: "building1".into()
            }
        );
    }

    #[rstest]
    fn test_pipe_columns(buildings: BuildingMap) {
        let mut pipe = row("main1");
        pipe.length = Some(Length(10.0));
        assert_error!(
            node_spec_from_raw(&pipe, NetworkKind::Gas, NodeKind::Main, &buildings),
            "Pipe main1 has no material"
        );

        let mut pipe = row("main1");
        pipe.material = Some("CI".into());
        pipe.length = Some(Length(10.0));
        let spec = node_spec_from_raw(&pipe, NetworkKind::Gas, NodeKind::Main, &buildings).unwrap();
        assert!(matches!(spec.detail, NodeDetail::Pipeline(ref pipe) if &*pipe.material == "CI"));
    }

    #[rstest]
    fn test_electric_service_is_line(buildings: BuildingMap) {
        let spec =
            node_spec_from_raw(&row("s1"), NetworkKind::Electric, NodeKind::Service, &buildings)
                .unwrap();
        assert_eq!(spec.detail, NodeDetail::Line { length: None });
    }

    #[rstest]
    #[case(None, "Transformer t1 has no bank_kva")]
    #[case(Some(0.0), "Transformer t1 must have a bank_kva greater than zero")]
    fn test_transformer_bank_kva(
        #[case] bank_kva: Option<f64>,
        #[case] msg: &str,
        buildings: BuildingMap,
    ) {
        let mut transformer = row("t1");
        transformer.bank_kva = bank_kva.map(ApparentPower);
        assert_error!(
            node_spec_from_raw(
                &transformer,
                NetworkKind::Electric,
                NodeKind::Transformer,
                &buildings
            ),
            msg
        );
    }

    #[rstest]
    fn test_read_gas_network(buildings: BuildingMap) {
        let dir = tempdir().unwrap();
        let files = [
            (
                "gas_meters.csv",
                "asset_id,parent_id,building_id,install_year\nm1,s1,building1,2000",
            ),
            (
                "gas_services.csv",
                "asset_id,parent_id,install_year,material,length\ns1,main1,2000,PL,20",
            ),
            (
                "gas_mains.csv",
                "asset_id,parent_id,install_year,material,diameter,length,lifetime\n\
                main1,,1990,BS,4,500,60",
            ),
        ];
        for (name, contents) in files {
            let mut file = File::create(dir.path().join(name)).unwrap();
            writeln!(file, "{contents}").unwrap();
        }

        let network = read_gas_network(dir.path(), &buildings).unwrap().unwrap();
        assert_eq!(network.kind(), NetworkKind::Gas);
        assert_eq!(network.specs().len(), 3);
        assert_eq!(network.specs()[2].params.lifetime, Some(60));
        assert_eq!(network.specs()[2].params.parent_id, None);

        // No electric tables
        assert!(
            read_electric_network(dir.path(), &buildings)
                .unwrap()
                .is_none()
        );
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(-1.0)]
    fn test_electric_line_bad_length(#[case] length: f64, buildings: BuildingMap) {
        let mut line = row("sec1");
        line.length = Some(Length(length));
        assert_error!(
            node_spec_from_raw(&line, NetworkKind::Electric, NodeKind::Secondary, &buildings),
            "Line sec1 must have a finite, non-negative length"
        );
    }

    #[rstest]
    fn test_network_tables_without_meters(buildings: BuildingMap) {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join("gas_services.csv")).unwrap();
            writeln!(
                file,
                "asset_id,parent_id,install_year,material,length\ns1,,2000,PL,20"
            )
            .unwrap();
        }

        let msg = format!(
            "Found gas_services.csv in {} but no gas_meters.csv; the gas network tables must be \
            supplied together",
            dir.path().display()
        );
        assert_error!(read_gas_network(dir.path(), &buildings), msg);

        // Nothing at all means no network
        assert!(
            read_electric_network(dir.path(), &buildings)
                .unwrap()
                .is_none()
        );
    }
}
