//! Fixtures for tests

use crate::asset::AssetParameters;
use crate::building::{Building, BuildingMap, Fuel, LoadState, buildings_for_scenario};
use crate::model::{Model, ModelParameters};
use crate::network::node::{NetworkKind, NodeDetail, NodeKind, NodeSpec};
use crate::network::pipeline::{
    LeakFactorTable, Material, OmCostTable, PipelineContext, PipelineSpec, PipelineType,
};
use crate::network::transformer::TransformerConstants;
use crate::network::{BuildContext, NetworkTopology, UtilityNetwork};
use crate::scenario::Scenario;
use crate::timeseries::HourlySeries;
use crate::units::{Dimensionless, LeakagePerLength, Length, Money, MoneyPerLength, Power};
use crate::year::YearRange;
use anyhow::Result;
use indexmap::indexmap;
use rstest::fixture;
use std::path::PathBuf;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn sim_years() -> YearRange {
    YearRange::new(2020, 2040).unwrap()
}

/// Lifecycle attributes for an asset installed before the simulation with a 40 year lifetime
pub fn asset_params(id: &str) -> AssetParameters {
    AssetParameters {
        asset_id: id.into(),
        parent_id: None,
        install_year: 2015,
        replacement_year: None,
        lifetime: Some(40),
        install_cost: Some(Money(1000.0)),
    }
}

fn series(values: &[f64]) -> HourlySeries {
    HourlySeries::new(values.iter().copied().map(Power).collect())
}

fn make_building(id: &str, retrofit_year: Option<u32>) -> Building {
    Building {
        id: id.into(),
        retrofit_year,
        hours: 2,
        loads: indexmap! {
            (Fuel::Electricity, LoadState::Baseline) => series(&[4.0, 6.0]),
            (Fuel::Electricity, LoadState::Retrofit) => series(&[10.0, 15.0]),
            (Fuel::NaturalGas, LoadState::Baseline) => series(&[20.0, 10.0]),
        },
    }
}

/// A building which electrifies in 2030
#[fixture]
pub fn building() -> Building {
    make_building("building1", Some(2030))
}

/// Three buildings: one electrifying in 2030, one in 2035 and one which never does
#[fixture]
pub fn buildings(building: Building) -> BuildingMap {
    [
        building,
        make_building("building2", Some(2035)),
        make_building("building3", None),
    ]
    .into_iter()
    .map(|building| (building.id.clone(), building))
    .collect()
}

fn gas_spec(kind: NodeKind, id: &str, parent: Option<&str>) -> NodeSpec {
    let mut params = asset_params(id);
    params.parent_id = parent.map(Into::into);
    NodeSpec {
        kind,
        params,
        detail: NodeDetail::Pipeline(PipelineSpec {
            material: "BS".into(),
            diameter: Some(2.0),
            length: Length(100.0),
        }),
    }
}

fn gas_meter(id: &str, parent: &str, building_id: &str) -> NodeSpec {
    let mut params = asset_params(id);
    params.parent_id = Some(parent.into());
    NodeSpec {
        kind: NodeKind::Meter,
        params,
        detail: NodeDetail::Meter {
            building_id: building_id.into(),
        },
    }
}

/// A small gas network: one main feeding two services.
///
/// service1 serves building1 and building2; service2 serves building3.
#[fixture]
pub fn gas_specs() -> Vec<NodeSpec> {
    vec![
        gas_meter("meter1", "service1", "building1"),
        gas_meter("meter2", "service1", "building2"),
        gas_meter("meter3", "service2", "building3"),
        gas_spec(NodeKind::Service, "service1", Some("main1")),
        gas_spec(NodeKind::Service, "service2", Some("main1")),
        gas_spec(NodeKind::Main, "main1", None),
    ]
}

#[fixture]
pub fn leak_factors() -> LeakFactorTable {
    [
        ((PipelineType::Service, "BS".into()), LeakagePerLength(0.2)),
        ((PipelineType::Service, "PL".into()), LeakagePerLength(0.01)),
        ((PipelineType::Main, "BS".into()), LeakagePerLength(0.5)),
        ((PipelineType::Main, "PL".into()), LeakagePerLength(0.02)),
    ]
    .into_iter()
    .collect()
}

#[fixture]
pub fn om_costs() -> OmCostTable {
    [
        ((PipelineType::Service, "BS".into()), MoneyPerLength(1.0)),
        ((PipelineType::Service, "PL".into()), MoneyPerLength(0.5)),
        ((PipelineType::Main, "BS".into()), MoneyPerLength(3.0)),
        ((PipelineType::Main, "PL".into()), MoneyPerLength(1.5)),
    ]
    .into_iter()
    .collect()
}

#[fixture]
pub fn transformer_constants() -> TransformerConstants {
    TransformerConstants {
        power_factor: Dimensionless(0.9),
        overloading_factor: Dimensionless(1.25),
        upgrade_cost: Money(10000.0),
        max_upgrades: 10,
    }
}

#[fixture]
pub fn model_parameters() -> ModelParameters {
    toml::from_str(
        r#"
        start_year = 2020
        end_year = 2040
        scenarios = ["bau", "accelerated_elec"]
        "#,
    )
    .unwrap()
}

/// Evaluate a network topology with the fixture lookup tables and constants
pub fn evaluate_network(
    topology: &NetworkTopology,
    buildings: &BuildingMap,
    scenario: Scenario,
    years: YearRange,
) -> Result<UtilityNetwork> {
    let leak_factors = leak_factors();
    let om_costs = om_costs();
    let retrofit_material: Material = "PL".into();
    let buildings = buildings_for_scenario(buildings, scenario, years);
    let ctx = BuildContext {
        scenario,
        years,
        buildings: &buildings,
        pipelines: PipelineContext {
            leak_factors: &leak_factors,
            om_costs: &om_costs,
            retrofit_material: &retrofit_material,
            years,
        },
        transformer: transformer_constants(),
    };
    topology.build(&ctx)
}

/// The fixture gas network, evaluated for accelerated electrification
#[fixture]
pub fn gas_network(
    gas_specs: Vec<NodeSpec>,
    buildings: BuildingMap,
    sim_years: YearRange,
) -> UtilityNetwork {
    let topology = NetworkTopology::new(NetworkKind::Gas, gas_specs).unwrap();
    evaluate_network(
        &topology,
        &buildings,
        Scenario::AcceleratedElectrification,
        sim_years,
    )
    .unwrap()
}

/// A model with the fixture buildings and gas network
#[fixture]
pub fn model(
    model_parameters: ModelParameters,
    buildings: BuildingMap,
    gas_specs: Vec<NodeSpec>,
    leak_factors: LeakFactorTable,
    om_costs: OmCostTable,
) -> Model {
    let years = model_parameters.years().unwrap();
    Model {
        model_path: PathBuf::from("fixture_model"),
        parameters: model_parameters,
        years,
        buildings,
        gas_network: Some(NetworkTopology::new(NetworkKind::Gas, gas_specs).unwrap()),
        electric_network: None,
        leak_factors,
        om_costs,
    }
}
