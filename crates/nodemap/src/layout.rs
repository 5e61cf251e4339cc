//! Layout stage of the node map pipeline.
//!
//! ```text
//! Forest + detail level
//!     ↓ compute_layout (engine)
//! Flattened positioned nodes
//!     ↓ compute_bounds / gather_connectors
//! Content bounds, connectors
//! ```
//!
//! The engine annotates the forest in place and returns a flattened,
//! pre-order copy of the annotations so downstream stages never hold a
//! borrow of the forest.

mod bounds;
mod connectors;
mod engine;

pub use bounds::compute_bounds;
pub(crate) use bounds::padded_bounds;
pub use connectors::{Connector, gather_connectors};
pub use engine::{LayoutEngine, compute_layout};

use nodemap_core::{geometry::Point, identifier::NodeId};

/// A node record produced by a layout pass.
///
/// Records are emitted parent-before-children, roots in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    id: NodeId,
    parent: Option<NodeId>,
    depth: usize,
    position: Point,
    subtree_height: f32,
    title: String,
    role: String,
}

impl PositionedNode {
    pub fn new(id: NodeId, parent: Option<NodeId>, depth: usize, position: Point) -> Self {
        Self {
            id,
            parent,
            depth,
            position,
            subtree_height: 0.0,
            title: String::new(),
            role: String::new(),
        }
    }

    pub fn with_subtree_height(mut self, subtree_height: f32) -> Self {
        self.subtree_height = subtree_height;
        self
    }

    pub fn with_label(mut self, title: impl Into<String>, role: impl Into<String>) -> Self {
        self.title = title.into();
        self.role = role.into();
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Target position assigned by the layout pass.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn subtree_height(&self) -> f32 {
        self.subtree_height
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn role(&self) -> &str {
        &self.role
    }
}
