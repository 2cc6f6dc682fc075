//! Assembly of utility networks from flat asset tables.
//!
//! Each row of a network table names its parent by asset ID. The rows are first checked and
//! arranged into a tree ([`NetworkTopology`]), which only depends on the input data and so is built
//! once per model. The tree is then evaluated for each scenario, children first.
use super::aggregate::LoadAggregate;
use super::node::{NetworkKind, NetworkNode, NodeDetail, NodeKind, NodeResults, NodeSpec};
use super::pipeline::PipelineContext;
use super::shutoff::{combine_exit_years, earliest, pipe_replacement_year, shutoff_year};
use super::transformer::{TransformerConstants, plan_upgrades};
use super::{NodeIndex, UtilityNetwork};
use crate::asset::Asset;
use crate::building::{BuildingID, ScenarioBuilding};
use crate::scenario::Scenario;
use crate::year::YearRange;
use anyhow::{Context, Result, anyhow, bail, ensure};
use indexmap::IndexMap;
use log::warn;
use petgraph::Directed;
use petgraph::algo::toposort;
use petgraph::graph::Graph;
use std::collections::HashMap;

/// A checked tree of network rows, in evaluation order
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkTopology {
    kind: NetworkKind,
    specs: Vec<NodeSpec>,
    /// Positions in `specs`, children before parents
    order: Vec<usize>,
    /// Positions in `specs` of each row's children
    children: Vec<Vec<usize>>,
}

/// Everything needed to evaluate a network for one scenario
pub struct BuildContext<'a> {
    /// The scenario being simulated
    pub scenario: Scenario,
    /// The simulation window
    pub years: YearRange,
    /// Buildings, resolved for the scenario
    pub buildings: &'a IndexMap<BuildingID, ScenarioBuilding<'a>>,
    /// Leakage and O&M lookup tables
    pub pipelines: PipelineContext<'a>,
    /// Transformer sizing constants
    pub transformer: TransformerConstants,
}

impl NetworkTopology {
    /// Arrange network rows into a tree.
    ///
    /// # Arguments
    ///
    /// * `kind` - The utility the network delivers
    /// * `specs` - One entry per asset, in input order
    ///
    /// # Returns
    ///
    /// An error if an asset ID is repeated, if a parent ID does not match any asset or if an asset
    /// is connected to a parent at the wrong level.
    pub fn new(kind: NetworkKind, specs: Vec<NodeSpec>) -> Result<Self> {
        let mut graph = Graph::<usize, (), Directed>::new();
        let mut id_to_node = HashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            let id = &spec.params.asset_id;
            ensure!(
                spec.kind.belongs_to(kind),
                "Asset {id} is a {} and cannot be part of the {} network",
                spec.kind,
                kind
            );
            let node = graph.add_node(i);
            ensure!(
                id_to_node.insert(id.clone(), node).is_none(),
                "Duplicate asset ID {id} in the {} network",
                kind
            );
        }

        let mut children = vec![Vec::new(); specs.len()];
        for (i, spec) in specs.iter().enumerate() {
            let Some(parent_id) = &spec.params.parent_id else {
                continue;
            };
            let id = &spec.params.asset_id;
            let parent = *id_to_node.get(parent_id).with_context(|| {
                format!(
                    "Asset {id} is connected to unknown parent {parent_id} in the {} network",
                    kind
                )
            })?;
            let parent_spec = &specs[graph[parent]];
            ensure!(
                parent_spec.kind.child_kind(kind) == Some(spec.kind),
                "Asset {id} is a {} and cannot be connected to {} {parent_id}",
                spec.kind,
                parent_spec.kind
            );

            // Edges point from child to parent, so a topological sort puts children first
            graph.add_edge(id_to_node[id], parent, ());
            children[graph[parent]].push(i);
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            anyhow!(
                "Cycle detected in the {} network at asset {}",
                kind,
                specs[graph[cycle.node_id()]].params.asset_id
            )
        })?;
        let order = order.into_iter().map(|node| graph[node]).collect();

        Ok(Self {
            kind,
            specs,
            order,
            children,
        })
    }

    /// The utility the network delivers
    pub fn kind(&self) -> NetworkKind {
        self.kind
    }

    /// The input rows, in input order
    pub fn specs(&self) -> &[NodeSpec] {
        &self.specs
    }

    /// Evaluate the network for a scenario.
    ///
    /// Nodes are evaluated children first, and each node reads only the results of its direct
    /// children.
    pub fn build(&self, ctx: &BuildContext) -> Result<UtilityNetwork> {
        let mut position = vec![0; self.specs.len()];
        for (pos, i) in self.order.iter().enumerate() {
            position[*i] = pos;
        }

        let mut nodes: Vec<NetworkNode> = Vec::with_capacity(self.specs.len());
        for i in &self.order {
            let spec = &self.specs[*i];
            let children = self.children[*i]
                .iter()
                .map(|child| NodeIndex(position[*child]))
                .collect();
            let node = match spec.kind {
                NodeKind::Meter => ctx.build_meter(self.kind, spec),
                _ => ctx.build_parent(self.kind, spec, children, &nodes),
            }
            .with_context(|| {
                format!(
                    "Error evaluating asset {} in the {} network for scenario {}",
                    spec.params.asset_id,
                    self.kind,
                    ctx.scenario
                )
            })?;
            nodes.push(node);
        }

        let index = nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.asset.id().clone(), NodeIndex(pos)))
            .collect();

        Ok(UtilityNetwork {
            kind: self.kind,
            nodes,
            index,
        })
    }
}

impl BuildContext<'_> {
    /// Evaluate a meter from its building's loads
    fn build_meter(&self, kind: NetworkKind, spec: &NodeSpec) -> Result<NetworkNode> {
        let NodeDetail::Meter { building_id } = &spec.detail else {
            bail!("Meter {} has no building", spec.params.asset_id);
        };
        let building = self.buildings.get(building_id).with_context(|| {
            format!(
                "Meter {} is connected to unknown building {building_id}",
                spec.params.asset_id
            )
        })?;

        // A gas meter is removed when its building leaves the gas network
        let (replacement_year, gas_exit_year) = match kind {
            NetworkKind::Gas => (
                earliest(spec.params.replacement_year, building.gas_exit_year()),
                building.gas_exit_year(),
            ),
            NetworkKind::Electric => (spec.params.replacement_year, None),
        };
        let asset = Asset::with_replacement_year(&spec.params, replacement_year, self.years)?;

        // Load only flows through a meter while it is installed
        let in_service = asset.operational_vector().to_vec();
        let load = LoadAggregate::from_building(building, kind.fuel(), &in_service, self.years);

        Ok(NetworkNode {
            kind: spec.kind,
            asset,
            detail: spec.detail.clone(),
            children: Vec::new(),
            load,
            in_service,
            gas_exit_year,
            results: NodeResults::None,
        })
    }

    /// Evaluate a line, pipe or transformer from its children
    fn build_parent(
        &self,
        kind: NetworkKind,
        spec: &NodeSpec,
        children: Vec<NodeIndex>,
        built: &[NetworkNode],
    ) -> Result<NetworkNode> {
        let id = &spec.params.asset_id;
        let child_nodes: Vec<&NetworkNode> =
            children.iter().map(|child| &built[child.index()]).collect();
        if child_nodes.is_empty() {
            warn!(
                "{} {id} in the {} network has no connected assets",
                spec.kind,
                kind
            );
        }

        let child_loads: Vec<_> = child_nodes.iter().map(|child| &child.load).collect();
        let load = LoadAggregate::from_children(&child_loads);
        let in_service = (0..self.years.len())
            .map(|i| child_nodes.iter().any(|child| child.in_service[i]))
            .collect();
        let gas_exit_year = match kind {
            NetworkKind::Gas => combine_exit_years(child_nodes.iter().map(|c| c.gas_exit_year)),
            NetworkKind::Electric => None,
        };

        let (asset, results) = match &spec.detail {
            NodeDetail::Pipeline(pipe) => {
                let pipeline_type = spec
                    .kind
                    .pipeline_type()
                    .with_context(|| format!("Asset {id} is not a gas pipe"))?;
                let replacement_year = pipe_replacement_year(
                    self.scenario,
                    spec.params.replacement_year,
                    gas_exit_year,
                );
                let shutoff_year = shutoff_year(self.scenario, gas_exit_year);
                let asset = Asset::with_replacement_year(&spec.params, replacement_year, self.years)?;
                let active: Vec<_> = self
                    .years
                    .iter()
                    .map(|year| {
                        asset.install_year() <= year && shutoff_year.is_none_or(|shut| year < shut)
                    })
                    .collect();
                let results = self.pipelines.compute(
                    id,
                    pipeline_type,
                    pipe,
                    replacement_year,
                    &active,
                    shutoff_year,
                );
                (asset, NodeResults::Pipeline(results))
            }
            NodeDetail::Transformer { bank_kva } => {
                let asset = Asset::new(&spec.params, self.years)?;
                let results = plan_upgrades(
                    &id.0,
                    &load.peak_vector(self.years),
                    *bank_kva,
                    &self.transformer,
                    self.years,
                );
                (asset, NodeResults::Transformer(results))
            }
            NodeDetail::Line { .. } => (Asset::new(&spec.params, self.years)?, NodeResults::None),
            NodeDetail::Meter { .. } => bail!("Asset {id} has building details but is not a meter"),
        };

        Ok(NetworkNode {
            kind: spec.kind,
            asset,
            detail: spec.detail.clone(),
            children,
            load,
            in_service,
            gas_exit_year,
            results,
        })
    }
}
