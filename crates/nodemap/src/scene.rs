//! Key-stable scene of visual node records.
//!
//! The scene is the arena shared by the layout and animation stages. Each
//! [`SceneNode`] is split into two disjoint halves:
//!
//! - [`TargetGeometry`] is written only by [`Scene::reconcile`] from a fresh
//!   layout pass.
//! - [`DisplayState`] is written only by the animation loop and by direct
//!   manipulation (dragging).
//!
//! Reconciliation merges a new layout into the scene by [`NodeId`], so the
//! displayed position and animation flags of surviving nodes carry over
//! unchanged and structural edits animate instead of jump-cutting.

use indexmap::IndexMap;
use log::debug;

use nodemap_core::{
    geometry::{Bounds, Point},
    identifier::NodeId,
};

use crate::{
    config::RadiusConfig,
    layout::{self, Connector, PositionedNode},
};

/// Layout-owned half of a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetGeometry {
    pub position: Point,
    pub depth: usize,
    pub parent: Option<NodeId>,
    pub subtree_height: f32,
}

/// Animation-owned half of a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayState {
    /// Displayed position, eased towards the target every frame.
    pub position: Point,
    /// Rendered radius computed by the latest frame.
    pub radius: f32,
    /// Freshly created: the radius grows from zero.
    pub is_new: bool,
    /// Growth accumulator in `0..=1` for new nodes.
    pub growth_progress: f32,
    /// Becoming visible because the detail level increased.
    pub expanding: bool,
    /// Becoming hidden because the detail level decreased.
    pub collapsing: bool,
    /// Position is driven by a drag gesture; easing is suspended.
    pub dragging: bool,
}

impl DisplayState {
    /// Display state of a node that first appears at `spawn`.
    pub fn spawned_at(spawn: Point) -> Self {
        Self {
            position: spawn,
            radius: 0.0,
            is_new: true,
            growth_progress: 0.0,
            expanding: false,
            collapsing: false,
            dragging: false,
        }
    }
}

/// A visual node record.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    id: NodeId,
    target: TargetGeometry,
    display: DisplayState,
    title: String,
    role: String,
}

impl SceneNode {
    fn from_layout(node: PositionedNode, display: DisplayState) -> Self {
        Self {
            id: node.id(),
            target: TargetGeometry {
                position: node.position(),
                depth: node.depth(),
                parent: node.parent(),
                subtree_height: node.subtree_height(),
            },
            display,
            title: node.title().to_string(),
            role: node.role().to_string(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn target(&self) -> &TargetGeometry {
        &self.target
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayState {
        &mut self.display
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Distance between the displayed and the target position.
    pub fn displacement(&self) -> f32 {
        self.display.position.distance(self.target.position)
    }
}

/// Counts reported by [`Scene::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub kept: usize,
    pub added: usize,
    pub removed: usize,
    pub connectors_added: usize,
    pub connectors_removed: usize,
}

/// Ordered arena of scene nodes and connectors keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: IndexMap<NodeId, SceneNode>,
    connectors: IndexMap<(NodeId, NodeId), Connector>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a fresh layout into the scene by id.
    ///
    /// - Ids present before and after keep their [`DisplayState`] untouched
    ///   and take the new [`TargetGeometry`].
    /// - New ids start as `is_new` at the point returned by `spawn`, or at
    ///   their target position when `spawn` returns `None`.
    /// - Ids missing from `layout` are dropped.
    ///
    /// Connectors are reconciled the same way, keyed by `(parent, child)`.
    /// The scene order follows `layout`.
    pub fn reconcile<F>(&mut self, layout: Vec<PositionedNode>, mut spawn: F) -> ReconcileSummary
    where
        F: FnMut(&PositionedNode) -> Option<Point>,
    {
        let mut summary = ReconcileSummary::default();

        let connectors = layout::gather_connectors(&layout);
        let mut next_connectors = IndexMap::with_capacity(connectors.len());
        for connector in connectors {
            match self.connectors.swap_remove(&connector.key()) {
                Some(existing) => next_connectors.insert(existing.key(), existing),
                None => {
                    summary.connectors_added += 1;
                    next_connectors.insert(connector.key(), connector)
                }
            };
        }
        summary.connectors_removed = self.connectors.len();
        self.connectors = next_connectors;

        let mut next_nodes = IndexMap::with_capacity(layout.len());
        for node in layout {
            let id = node.id();
            let display = match self.nodes.swap_remove(&id) {
                Some(previous) => {
                    summary.kept += 1;
                    previous.display
                }
                None => {
                    summary.added += 1;
                    let spawn_point = spawn(&node).unwrap_or(node.position());
                    DisplayState::spawned_at(spawn_point)
                }
            };
            next_nodes.insert(id, SceneNode::from_layout(node, display));
        }
        summary.removed = self.nodes.len();
        self.nodes = next_nodes;

        debug!(
            kept = summary.kept,
            added = summary.added,
            removed = summary.removed,
            connectors_len = self.connectors.len();
            "Scene reconciled"
        );

        summary
    }

    /// Flags nodes whose visibility changes between two detail levels.
    ///
    /// Nodes deeper than the lower level and not deeper than the higher one
    /// are marked `expanding` when the level rises and `collapsing` when it
    /// falls. The animation loop clears the flag once the node settles.
    pub fn mark_level_transition(&mut self, from_level: usize, to_level: usize) {
        if from_level == to_level {
            return;
        }
        let (low, high) = (from_level.min(to_level), from_level.max(to_level));
        let expanding = to_level > from_level;

        for node in self.nodes.values_mut() {
            let depth = node.target.depth;
            if depth > low && depth <= high {
                node.display.expanding = expanding;
                node.display.collapsing = !expanding;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    /// Drops a node without a layout pass. Its connectors go with it.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        self.connectors
            .retain(|&(parent, child), _| parent != id && child != id);
        self.nodes.shift_remove(&id)
    }

    /// Nodes in layout order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneNode> {
        self.nodes.values_mut()
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }

    /// Displayed endpoints of a connector, if both nodes are present.
    pub fn connector_segment(&self, connector: &Connector) -> Option<(Point, Point)> {
        let parent = self.nodes.get(&connector.parent())?;
        let child = self.nodes.get(&connector.child())?;
        Some((parent.display.position, child.display.position))
    }

    /// Bounds of all target positions, padded by the main radius.
    pub fn target_bounds(&self, config: &RadiusConfig) -> Bounds {
        layout::padded_bounds(
            self.nodes.values().map(|node| node.target.position),
            config.main(),
        )
    }

    /// Deepest target depth in the scene, 0 when empty.
    pub fn max_depth(&self) -> usize {
        self.nodes
            .values()
            .map(|node| node.target.depth)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use nodemap_core::forest::Node;

    use super::*;
    use crate::{config::LayoutConfig, layout::compute_layout};

    fn layout_of(forest: &mut [Node], level: usize) -> Vec<PositionedNode> {
        compute_layout(forest, level, &LayoutConfig::default())
    }

    #[test]
    fn test_first_reconcile_marks_everything_new() {
        let mut forest = vec![Node::new("ra", "A").with_children(vec![Node::new("ra1", "A1")])];
        let mut scene = Scene::new();

        let summary = scene.reconcile(layout_of(&mut forest, 1), |_| None);

        assert_eq!(summary.added, 2);
        assert_eq!(summary.connectors_added, 1);
        for node in scene.iter() {
            assert!(node.display().is_new);
            assert_eq!(node.display().position, node.target().position);
        }
    }

    #[test]
    fn test_surviving_nodes_keep_display_state_exactly() {
        let mut forest = vec![
            Node::new("rk", "K").with_children(vec![Node::new("rk1", "K1"), Node::new("rk2", "K2")]),
        ];
        let mut scene = Scene::new();
        scene.reconcile(layout_of(&mut forest, 1), |_| None);

        let odd = Point::new(0.1 + 0.2, 1.0 / 3.0);
        {
            let display = scene.get_mut(NodeId::new("rk1")).unwrap().display_mut();
            display.position = odd;
            display.is_new = false;
            display.growth_progress = 1.0;
        }

        // Remove rk2; rk1 moves up to the center line.
        forest[0].children_mut().pop();
        let summary = scene.reconcile(layout_of(&mut forest, 1), |_| None);

        assert_eq!(summary.kept, 2);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.connectors_removed, 1);

        let kept = scene.get(NodeId::new("rk1")).unwrap();
        assert_eq!(kept.display().position.x().to_bits(), odd.x().to_bits());
        assert_eq!(kept.display().position.y().to_bits(), odd.y().to_bits());
        assert!(!kept.display().is_new);
        assert_eq!(kept.target().position.y(), 400.0);
        assert!(scene.get(NodeId::new("rk2")).is_none());
    }

    #[test]
    fn test_only_new_ids_are_new_and_spawn_where_asked() {
        let mut forest = vec![Node::new("rn", "N")];
        let mut scene = Scene::new();
        scene.reconcile(layout_of(&mut forest, 1), |_| None);
        scene.get_mut(NodeId::new("rn")).unwrap().display_mut().is_new = false;

        forest[0].children_mut().push(Node::new("rn1", "N1"));
        let spawn = Point::new(-5.0, -5.0);
        scene.reconcile(layout_of(&mut forest, 1), |node| {
            (node.id() == "rn1").then_some(spawn)
        });

        assert!(!scene.get(NodeId::new("rn")).unwrap().display().is_new);
        let child = scene.get(NodeId::new("rn1")).unwrap();
        assert!(child.display().is_new);
        assert_eq!(child.display().position, spawn);
        assert_eq!(child.display().radius, 0.0);
    }

    #[test]
    fn test_scene_order_follows_layout() {
        let mut forest = vec![Node::new("ro1", "1"), Node::new("ro2", "2")];
        let mut scene = Scene::new();
        scene.reconcile(layout_of(&mut forest, 0), |_| None);

        forest.reverse();
        scene.reconcile(layout_of(&mut forest, 0), |_| None);

        let ids: Vec<String> = scene.iter().map(|n| n.id().to_string()).collect();
        assert_eq!(ids, ["ro2", "ro1"]);
    }

    #[test]
    fn test_level_transition_flags() {
        let mut forest = vec![Node::new("lt", "T").with_children(vec![
            Node::new("lt1", "T1").with_children(vec![Node::new("lt11", "T11")]),
        ])];
        let mut scene = Scene::new();
        scene.reconcile(layout_of(&mut forest, 2), |_| None);

        scene.mark_level_transition(2, 0);
        assert!(!scene.get(NodeId::new("lt")).unwrap().display().collapsing);
        assert!(scene.get(NodeId::new("lt1")).unwrap().display().collapsing);
        assert!(scene.get(NodeId::new("lt11")).unwrap().display().collapsing);

        scene.mark_level_transition(0, 1);
        let child = scene.get(NodeId::new("lt1")).unwrap();
        assert!(child.display().expanding);
        assert!(!child.display().collapsing);
    }

    #[test]
    fn test_remove_drops_connectors() {
        let mut forest = vec![Node::new("rm", "M").with_children(vec![Node::new("rm1", "M1")])];
        let mut scene = Scene::new();
        scene.reconcile(layout_of(&mut forest, 1), |_| None);

        assert!(scene.remove(NodeId::new("rm1")).is_some());
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.connectors().count(), 0);
    }

    #[test]
    fn test_connector_segment_uses_displayed_positions() {
        let mut forest = vec![Node::new("cs", "C").with_children(vec![Node::new("cs1", "C1")])];
        let mut scene = Scene::new();
        scene.reconcile(layout_of(&mut forest, 1), |_| None);
        scene.get_mut(NodeId::new("cs1")).unwrap().display_mut().position = Point::new(1.0, 2.0);

        let connector = *scene.connectors().next().unwrap();
        let (from, to) = scene.connector_segment(&connector).unwrap();
        assert_eq!(from, Point::new(100.0, 400.0));
        assert_eq!(to, Point::new(1.0, 2.0));
    }
}
