//! Parent-child connectors of a laid-out node map.

use nodemap_core::identifier::NodeId;

use crate::layout::PositionedNode;

/// An edge from a parent node to one of its children.
///
/// The `(parent, child)` pair is the connector's identity, so a connector
/// survives layout passes as long as both endpoints do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connector {
    parent: NodeId,
    child: NodeId,
}

impl Connector {
    pub fn new(parent: NodeId, child: NodeId) -> Self {
        Self { parent, child }
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn child(&self) -> NodeId {
        self.child
    }

    /// Composite reconciliation key.
    pub fn key(&self) -> (NodeId, NodeId) {
        (self.parent, self.child)
    }
}

/// Collects one connector per parent-child pair, in flattened order.
pub fn gather_connectors(nodes: &[PositionedNode]) -> Vec<Connector> {
    nodes
        .iter()
        .filter_map(|node| node.parent().map(|parent| Connector::new(parent, node.id())))
        .collect()
}
