//! The nodes of a utility network.
use super::NodeIndex;
use super::aggregate::LoadAggregate;
use super::pipeline::{PipelineResults, PipelineSpec, PipelineType};
use super::transformer::TransformerResults;
use crate::asset::{Asset, AssetParameters};
use crate::building::{BuildingID, Fuel};
use crate::units::{ApparentPower, Length};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// The utility a network delivers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum NetworkKind {
    /// Natural gas distribution
    #[string = "gas"]
    Gas,
    /// Electricity distribution
    #[string = "electric"]
    Electric,
}

impl NetworkKind {
    /// The fuel delivered by the network
    pub fn fuel(&self) -> Fuel {
        match self {
            Self::Gas => Fuel::NaturalGas,
            Self::Electric => Fuel::Electricity,
        }
    }
}

/// The level of a node within its network.
///
/// Gas networks run meter → service → main. Electric networks run meter → service → secondary →
/// transformer → primary.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum NodeKind {
    /// A customer meter, attached to a single building
    #[string = "meter"]
    Meter,
    /// A service line connecting meters to the distribution network
    #[string = "service"]
    Service,
    /// A gas distribution main
    #[string = "main"]
    Main,
    /// A low-voltage secondary line
    #[string = "secondary"]
    Secondary,
    /// A distribution transformer
    #[string = "transformer"]
    Transformer,
    /// A medium-voltage primary feeder
    #[string = "primary"]
    Primary,
}

impl NodeKind {
    /// The kind of node which may be connected directly below this one
    pub fn child_kind(&self, network: NetworkKind) -> Option<NodeKind> {
        match (network, self) {
            (_, Self::Service) => Some(Self::Meter),
            (NetworkKind::Gas, Self::Main) | (NetworkKind::Electric, Self::Secondary) => {
                Some(Self::Service)
            }
            (NetworkKind::Electric, Self::Transformer) => Some(Self::Secondary),
            (NetworkKind::Electric, Self::Primary) => Some(Self::Transformer),
            _ => None,
        }
    }

    /// Whether nodes of this kind may appear in the given network
    pub fn belongs_to(&self, network: NetworkKind) -> bool {
        match network {
            NetworkKind::Gas => matches!(self, Self::Meter | Self::Service | Self::Main),
            NetworkKind::Electric => !matches!(self, Self::Main),
        }
    }

    /// The pipe type used to look up leak factors and costs, for gas pipes
    pub fn pipeline_type(&self) -> Option<PipelineType> {
        match self {
            Self::Service => Some(PipelineType::Service),
            Self::Main => Some(PipelineType::Main),
            _ => None,
        }
    }
}

/// Attributes which only apply to some kinds of node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDetail {
    /// The building served by a meter
    Meter {
        /// The building's ID
        building_id: BuildingID,
    },
    /// A gas pipe
    Pipeline(PipelineSpec),
    /// An electric line
    Line {
        /// Length of the line, if known
        length: Option<Length>,
    },
    /// A transformer
    Transformer {
        /// Nameplate size of the installed bank
        bank_kva: ApparentPower,
    },
}

/// A row of a network input table, before the network is assembled
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    /// The node's level in the network
    pub kind: NodeKind,
    /// Lifecycle attributes
    pub params: AssetParameters,
    /// Kind-specific attributes
    pub detail: NodeDetail,
}

/// Results which only apply to some kinds of node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeResults {
    /// Meters and electric lines have no extra results
    None,
    /// Leakage and costs of a gas pipe
    Pipeline(PipelineResults),
    /// Upgrade plan for a transformer
    Transformer(TransformerResults),
}

/// An asset placed in a network, with the load it carries in each year
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkNode {
    /// The node's level in the network
    pub kind: NodeKind,
    /// The asset's lifecycle
    pub asset: Asset,
    /// Kind-specific attributes
    pub detail: NodeDetail,
    /// The nodes connected directly below this one
    pub children: Vec<NodeIndex>,
    /// Energy flowing through the node
    pub load: LoadAggregate,
    /// True in each year in which any building below the node is connected
    pub in_service: Vec<bool>,
    /// For gas nodes, the year by which every building below has left the network. `None` if any
    /// building stays connected (or there are none).
    pub gas_exit_year: Option<u32>,
    /// Kind-specific results
    pub results: NodeResults,
}

impl NetworkNode {
    /// The building served, for meters
    pub fn building_id(&self) -> Option<&BuildingID> {
        match &self.detail {
            NodeDetail::Meter { building_id } => Some(building_id),
            _ => None,
        }
    }

    /// Leakage and cost results, for gas pipes
    pub fn pipeline_results(&self) -> Option<&PipelineResults> {
        match &self.results {
            NodeResults::Pipeline(results) => Some(results),
            _ => None,
        }
    }

    /// Upgrade plan, for transformers
    pub fn transformer_results(&self) -> Option<&TransformerResults> {
        match &self.results {
            NodeResults::Transformer(results) => Some(results),
            _ => None,
        }
    }

    /// The length of the pipe or line, if known
    pub fn length(&self) -> Option<Length> {
        match &self.detail {
            NodeDetail::Pipeline(spec) => Some(spec.length),
            NodeDetail::Line { length } => *length,
            _ => None,
        }
    }
}
