//! Deterministic tree layout engine
//!
//! This module assigns target coordinates to every node of a forest for a
//! given detail level. Roots are laid out left to right; each expanded level
//! stacks its children vertically, centered on the parent, one horizontal
//! step to the right. Levels beyond the detail level collapse onto their
//! nearest visible ancestor.

use log::{debug, trace};

use nodemap_core::{
    forest::{HeightCache, Node},
    geometry::Point,
    identifier::NodeId,
};

use crate::{config::LayoutConfig, layout::PositionedNode};

/// Lays out `forest` at `detail_level` with the given configuration.
///
/// This is a convenience wrapper around [`LayoutEngine::calculate`].
///
/// # Examples
///
/// ```
/// use nodemap::{config::LayoutConfig, layout::compute_layout};
/// use nodemap_core::forest::Node;
///
/// let mut forest = vec![Node::new("a", "Main").with_children(vec![Node::new("a1", "Child")])];
/// let nodes = compute_layout(&mut forest, 1, &LayoutConfig::default());
///
/// assert_eq!(nodes.len(), 2);
/// assert_eq!(nodes[1].position().x(), nodes[0].position().x() + 150.0);
/// ```
pub fn compute_layout(
    forest: &mut [Node],
    detail_level: usize,
    config: &LayoutConfig,
) -> Vec<PositionedNode> {
    LayoutEngine::new(config.clone()).calculate(forest, detail_level)
}

/// Tree layout engine.
///
/// The engine is a layout annotator: it writes the computed fields of the
/// forest's nodes (position, depth, parent, subtree height and the height
/// cache) in place and leaves the presentation payload untouched.
///
/// Node ids must be unique across the forest; duplicates are a caller
/// contract violation and produce an unspecified layout.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create a new layout engine with the given spacing constants
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Calculate the layout of the forest and return its flattened nodes.
    ///
    /// Nodes are returned depth-first, parent before children, roots in
    /// input order. An empty forest yields an empty sequence.
    pub fn calculate(&self, forest: &mut [Node], detail_level: usize) -> Vec<PositionedNode> {
        for root in forest.iter_mut() {
            self.reset(root);
        }

        if detail_level == 0 {
            self.layout_collapsed(forest);
        } else {
            self.layout_expanded(forest, detail_level);
        }

        let mut flattened = Vec::new();
        for root in forest.iter_mut() {
            Self::flatten(root, 0, None, &mut flattened);
        }

        debug!(
            roots_len = forest.len(),
            nodes_len = flattened.len(),
            detail_level;
            "Layout computed"
        );

        flattened
    }

    /// Clears the computed fields of a subtree.
    ///
    /// Subtree heights restart at the base node height rather than zero, so
    /// nodes the height pass never visits (beyond the detail level) still
    /// respect the height floor.
    fn reset(&self, node: &mut Node) {
        let layout = node.layout_mut();
        layout.position = Point::default();
        layout.subtree_height = self.config.node_height();
        layout.height_cache = None;

        for child in node.children_mut() {
            self.reset(child);
        }
    }

    /// Fully collapsed layout: roots in a single row alternating above and
    /// below the center line, every descendant on its root's point.
    fn layout_collapsed(&self, forest: &mut [Node]) {
        let mut x = self.config.main_start_x();

        for (idx, root) in forest.iter_mut().enumerate() {
            let direction = if idx % 2 == 0 { -1.0 } else { 1.0 };
            let position = Point::new(
                x,
                self.config.center_y() + direction * self.config.vertical_offset_collapsed(),
            );

            let layout = root.layout_mut();
            layout.position = position;
            layout.subtree_height = self.config.node_height();

            Self::collapse_onto(root.children_mut(), position);
            x += self.config.collapsed_spacing();
        }
    }

    fn collapse_onto(nodes: &mut [Node], position: Point) {
        for node in nodes {
            node.layout_mut().position = position;
            Self::collapse_onto(node.children_mut(), position);
        }
    }

    fn layout_expanded(&self, forest: &mut [Node], detail_level: usize) {
        let mut cursor_x = self.config.main_start_x();
        let center_y = self.config.center_y();

        for root in forest.iter_mut() {
            root.layout_mut().position = Point::new(cursor_x, center_y);
            self.subtree_height(root, detail_level, 0);
            self.assign_positions(root, center_y, detail_level, 0);

            cursor_x = Self::rightmost_x(root) + self.config.main_spacing();
            trace!(root:% = root.id(), next_x = cursor_x; "Root laid out");
        }
    }

    /// Computes the subtree height bottom-up, memoised per node.
    ///
    /// The memo is keyed on `(detail_level, child_count)` only: a change
    /// deeper in a child's subtree that keeps the child count does not
    /// invalidate it. [`Self::reset`] clears every memo at the start of a
    /// pass, so within [`Self::calculate`] the key is always exact.
    fn subtree_height(&self, node: &mut Node, detail_level: usize, depth: usize) -> f32 {
        let child_count = node.children().len();

        if let Some(cache) = node.layout().height_cache {
            if cache.detail_level == detail_level && cache.child_count == child_count {
                node.layout_mut().subtree_height = cache.subtree_height;
                return cache.subtree_height;
            }
        }

        let node_height = self.config.node_height();
        let height = if depth >= detail_level || child_count == 0 {
            node_height
        } else {
            let children_height: f32 = node
                .children_mut()
                .iter_mut()
                .map(|child| self.subtree_height(child, detail_level, depth + 1))
                .sum();
            let spacing = self.config.vertical_spacing() * (child_count - 1) as f32;
            (children_height + spacing).max(node_height)
        };

        let layout = node.layout_mut();
        layout.height_cache = Some(HeightCache {
            detail_level,
            child_count,
            subtree_height: height,
        });
        layout.subtree_height = height;

        height
    }

    /// Assigns positions top-down. The node's x is already set by its
    /// parent (or the root cursor); this sets its y and places its children.
    fn assign_positions(&self, node: &mut Node, center_y: f32, detail_level: usize, depth: usize) {
        let origin = Point::new(node.layout().position.x(), center_y);
        node.layout_mut().position = origin;

        if node.children().is_empty() {
            return;
        }

        if depth + 1 > detail_level {
            for child in node.children_mut() {
                child.layout_mut().position = origin;
                self.assign_positions(child, origin.y(), detail_level, depth + 1);
            }
            return;
        }

        let spacing = self.config.vertical_spacing();
        let children_height: f32 = node
            .children()
            .iter()
            .map(|child| child.layout().subtree_height)
            .sum();
        let total_height = children_height + spacing * (node.children().len() - 1) as f32;

        let child_x = origin.x() + self.config.child_offset_x();
        let mut start_y = center_y - total_height / 2.0;

        for child in node.children_mut() {
            let child_height = child.layout().subtree_height;
            let child_center_y = start_y + child_height / 2.0;

            child.layout_mut().position = Point::new(child_x, child_center_y);
            self.assign_positions(child, child_center_y, detail_level, depth + 1);

            start_y += child_height + spacing;
        }
    }

    fn rightmost_x(node: &Node) -> f32 {
        node.children()
            .iter()
            .map(Self::rightmost_x)
            .fold(node.layout().position.x(), f32::max)
    }

    /// Depth-first flatten assigning depth and parent.
    fn flatten(
        node: &mut Node,
        depth: usize,
        parent: Option<NodeId>,
        flattened: &mut Vec<PositionedNode>,
    ) {
        let layout = node.layout_mut();
        layout.depth = depth;
        layout.parent = parent;

        let id = node.id();
        flattened.push(
            PositionedNode::new(id, parent, depth, node.layout().position)
                .with_subtree_height(node.layout().subtree_height)
                .with_label(node.title(), node.role()),
        );

        for child in node.children_mut() {
            Self::flatten(child, depth + 1, Some(id), flattened);
        }
    }
}
