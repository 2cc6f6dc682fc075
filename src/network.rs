//! Utility networks: trees of assets connecting buildings to the wider energy system.
//!
//! Nodes are stored in an arena in children-first order, so every node's children appear before it.
//! Aggregates are computed in that order, with each node reading only its direct children.
use crate::asset::AssetID;
use std::collections::HashMap;

pub mod aggregate;
pub mod builder;
pub mod node;
pub mod pipeline;
pub mod shutoff;
pub mod transformer;
pub use builder::{BuildContext, NetworkTopology};
pub use node::{NetworkKind, NetworkNode, NodeDetail, NodeKind, NodeSpec};

/// The position of a node in its network's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// The position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// A fully evaluated utility network for one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct UtilityNetwork {
    kind: NetworkKind,
    nodes: Vec<NetworkNode>,
    index: HashMap<AssetID, NodeIndex>,
}

impl UtilityNetwork {
    /// The utility delivered by the network
    pub fn kind(&self) -> NetworkKind {
        self.kind
    }

    /// Number of nodes in the network
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the network has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes with children before their parents
    pub fn iter(&self) -> impl Iterator<Item = &NetworkNode> {
        self.nodes.iter()
    }

    /// Iterate over nodes of the given kind
    pub fn iter_kind(&self, kind: NodeKind) -> impl Iterator<Item = &NetworkNode> {
        self.nodes.iter().filter(move |node| node.kind == kind)
    }

    /// Nodes with no parent
    pub fn roots(&self) -> impl Iterator<Item = &NetworkNode> {
        self.nodes
            .iter()
            .filter(|node| node.asset.parent_id().is_none())
    }

    /// Get a node by position
    pub fn node(&self, index: NodeIndex) -> &NetworkNode {
        &self.nodes[index.0]
    }

    /// Get a node by asset ID
    pub fn get(&self, id: &str) -> Option<&NetworkNode> {
        self.index.get(id).map(|index| self.node(*index))
    }

    /// The nodes connected directly below `node`
    pub fn children<'a>(
        &'a self,
        node: &'a NetworkNode,
    ) -> impl Iterator<Item = &'a NetworkNode> + 'a {
        node.children.iter().map(|index| self.node(*index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::gas_network;
    use rstest::rstest;

    #[rstest]
    fn test_children_before_parents(gas_network: UtilityNetwork) {
        let position: HashMap<_, _> = gas_network
            .iter()
            .enumerate()
            .map(|(i, node)| (node.asset.id().clone(), i))
            .collect();
        for node in gas_network.iter() {
            for child in gas_network.children(node) {
                assert!(position[child.asset.id()] < position[node.asset.id()]);
            }
        }
    }

    #[rstest]
    fn test_lookup(gas_network: UtilityNetwork) {
        let main = gas_network.get("main1").unwrap();
        assert_eq!(main.kind, NodeKind::Main);
        assert_eq!(gas_network.children(main).count(), 2);
        assert_eq!(gas_network.roots().count(), 1);
        assert_eq!(gas_network.iter_kind(NodeKind::Meter).count(), 3);
        assert!(gas_network.get("no_such_asset").is_none());
    }
}
