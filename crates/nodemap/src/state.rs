//! Application state of an interactive node map.
//!
//! [`MapState`] owns everything a running map needs: the forest, the
//! current detail level, the reconciled [`Scene`], the [`Animator`], the
//! [`Viewport`] and the auto-zoom [`Debouncer`]. Every entry point takes the
//! current time in milliseconds so the whole controller runs on an injected
//! clock.
//!
//! Edits follow one pattern: mutate the forest, then
//! [`update_diagram`](MapState::update_diagram), which lays the forest out,
//! merges the result into the scene by id, kicks the animator and schedules
//! an automatic fit unless the user is panning or zooming by hand.

use std::collections::HashMap;

use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};

use nodemap_core::{
    forest::{self, Node},
    geometry::{Point, Size},
    identifier::NodeId,
};

use crate::{
    animation::{Animate, Animator, FrameOutcome},
    config::AppConfig,
    debounce::Debouncer,
    error::NodeMapError,
    layout::compute_layout,
    scene::Scene,
    viewport::{ViewTransform, Viewport, fit_transform},
};

const NEW_NODE_ROLE: &str = "hybrid";

/// Progress of a drag gesture, reported by [`MapState::drag_to`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStatus {
    /// Distance from where the drag started.
    pub distance: f32,
    /// Whether releasing now would delete the node.
    pub will_delete: bool,
}

/// Result of releasing a dragged node.
#[derive(Debug, Clone)]
pub enum DragOutcome {
    /// Dropped far from its origin: the node and its subtree were removed.
    Deleted(Node),
    /// Dropped near its origin: the node returns to its place.
    SnappedBack,
}

#[derive(Debug, Clone, Copy)]
struct DragGesture {
    id: NodeId,
    origin: Point,
}

/// The state of one interactive node map.
#[derive(Debug)]
pub struct MapState {
    config: AppConfig,
    forest: Vec<Node>,
    detail_level: usize,
    rendered_level: usize,
    scene: Scene,
    animator: Animator,
    viewport: Viewport,
    manual_interaction: bool,
    auto_zoom: Debouncer,
    pending_spawns: HashMap<NodeId, Point>,
    drag: Option<DragGesture>,
    rng: StdRng,
    now_ms: f64,
}

impl MapState {
    /// Creates an empty map for a viewport of `viewport_size` pixels.
    pub fn new(config: AppConfig, viewport_size: Size) -> Self {
        Self::with_rng(config, viewport_size, StdRng::from_os_rng())
    }

    /// Like [`new`](Self::new) with a deterministic id generator.
    pub fn with_seed(config: AppConfig, viewport_size: Size, seed: u64) -> Self {
        Self::with_rng(config, viewport_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: AppConfig, viewport_size: Size, rng: StdRng) -> Self {
        let animator = Animator::new(config.animation().clone(), config.radius().clone());
        let auto_zoom = Debouncer::new(config.viewport().auto_zoom_debounce_ms());
        Self {
            config,
            forest: Vec::new(),
            detail_level: 0,
            rendered_level: 0,
            scene: Scene::new(),
            animator,
            viewport: Viewport::new(viewport_size),
            manual_interaction: false,
            auto_zoom,
            pending_spawns: HashMap::new(),
            drag: None,
            rng,
            now_ms: 0.0,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn forest(&self) -> &[Node] {
        &self.forest
    }

    pub fn detail_level(&self) -> usize {
        self.detail_level
    }

    /// Sets the detail level; it is clamped on the next layout pass.
    pub fn set_detail_level(&mut self, detail_level: usize) {
        self.detail_level = detail_level;
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Latest time passed to any timed entry point.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn observe(&mut self, now_ms: f64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn is_manual_interaction(&self) -> bool {
        self.manual_interaction
    }

    /// Records whether the user is panning or zooming by hand. While set,
    /// no automatic fit runs.
    pub fn set_manual_interaction(&mut self, manual: bool) {
        self.manual_interaction = manual;
    }

    /// Applies a pan or zoom gesture: the transform takes effect immediately
    /// and automatic fitting is suspended.
    pub fn apply_user_transform(&mut self, transform: ViewTransform) {
        self.manual_interaction = true;
        self.viewport.set_transform(transform);
    }

    /// Plain-text outline of the forest.
    pub fn to_outline(&self) -> String {
        forest::to_outline(&self.forest)
    }

    /// Lays the forest out and merges the result into the scene.
    ///
    /// The detail level is clamped to the deepest level of the forest, new
    /// nodes spawn at their pending spawn points, the animator is kicked and
    /// an automatic fit is scheduled unless manual interaction is set.
    pub fn update_diagram(&mut self, now_ms: f64) {
        self.observe(now_ms);
        self.detail_level = self.detail_level.min(forest::max_depth(&self.forest));

        let nodes = compute_layout(&mut self.forest, self.detail_level, self.config.layout());
        let mut spawns = std::mem::take(&mut self.pending_spawns);
        let summary = self
            .scene
            .reconcile(nodes, |node| spawns.remove(&node.id()));
        self.scene
            .mark_level_transition(self.rendered_level, self.detail_level);
        self.rendered_level = self.detail_level;

        self.animator.kick();
        if !self.manual_interaction {
            self.auto_zoom.trigger(now_ms);
        }

        debug!(
            detail_level = self.detail_level,
            nodes_len = self.scene.len(),
            added = summary.added,
            removed = summary.removed;
            "Diagram updated"
        );
    }

    /// Runs one animation frame at `now_ms`.
    ///
    /// Fits the viewport to the content when the animation goes idle or a
    /// debounced automatic fit falls due, unless manual interaction is set.
    pub fn frame(&mut self, now_ms: f64) -> FrameOutcome {
        self.observe(now_ms);
        let outcome = self
            .animator
            .tick(now_ms, &mut self.scene, self.detail_level);
        self.viewport.advance(now_ms);

        let zoom_due = self.auto_zoom.poll(now_ms);
        if (zoom_due || outcome == FrameOutcome::WentIdle) && !self.manual_interaction {
            self.fit_content(now_ms, self.config.viewport().fit_duration_ms());
        }
        outcome
    }

    /// Fits the viewport to the target bounds of the scene unless it is
    /// already fitted or heading there.
    fn fit_content(&mut self, now_ms: f64, duration_ms: f64) -> bool {
        let bounds = self.scene.target_bounds(self.config.radius());
        let Some(target) = fit_transform(bounds, self.viewport.size(), self.config.viewport())
        else {
            return false;
        };
        if self.viewport.target() == target {
            return false;
        }
        self.viewport
            .fit_to_bounds(bounds, self.config.viewport(), now_ms, duration_ms)
            .is_some()
    }

    /// Shows one more level, up to the deepest level of the forest.
    pub fn expand(&mut self, now_ms: f64) -> bool {
        if self.detail_level >= forest::max_depth(&self.forest) {
            return false;
        }
        self.detail_level += 1;
        self.update_diagram(now_ms);
        true
    }

    /// Shows one level less, down to 0.
    pub fn collapse(&mut self, now_ms: f64) -> bool {
        if self.detail_level == 0 {
            return false;
        }
        self.detail_level -= 1;
        self.update_diagram(now_ms);
        true
    }

    /// Adds a new root that grows at `at`, in layout coordinates.
    pub fn add_root(&mut self, title: impl Into<String>, at: Point, now_ms: f64) -> NodeId {
        let id = NodeId::generate("n", &mut self.rng);
        self.forest
            .push(Node::new(id, title).with_role(NEW_NODE_ROLE));
        self.pending_spawns.insert(id, at);
        self.manual_interaction = false;

        info!(id:% = id; "Root added");
        self.update_diagram(now_ms);
        id
    }

    /// Adds a new child to `parent`.
    ///
    /// The child spawns a quarter of the main spacing to the right of and one
    /// vertical spacing below the parent's target position. The detail level
    /// is raised so the child is visible.
    pub fn sprout_child(&mut self, parent: NodeId, now_ms: f64) -> Result<NodeId, NodeMapError> {
        let id = NodeId::generate("n", &mut self.rng);
        let parent_node =
            forest::find_mut(&mut self.forest, parent).ok_or(NodeMapError::UnknownNode(parent))?;

        let layout = self.config.layout();
        let spawn = parent_node.layout().position.add_point(Point::new(
            layout.main_spacing() / 4.0,
            layout.vertical_spacing(),
        ));
        let depth = parent_node.layout().depth + 1;
        parent_node
            .children_mut()
            .push(Node::new(id, "New Child").with_role(NEW_NODE_ROLE));

        self.pending_spawns.insert(id, spawn);
        if depth > self.detail_level {
            self.detail_level = depth;
        }
        self.manual_interaction = false;

        info!(id:% = id, parent:% = parent, depth; "Child sprouted");
        self.update_diagram(now_ms);
        Ok(id)
    }

    /// Renames a node. Surrounding whitespace is trimmed.
    pub fn edit_title(&mut self, id: NodeId, title: &str, now_ms: f64) -> Result<(), NodeMapError> {
        forest::find_mut(&mut self.forest, id)
            .ok_or(NodeMapError::UnknownNode(id))?
            .set_title(title.trim());
        self.update_diagram(now_ms);
        Ok(())
    }

    /// Assigns roles in bulk. Ids not in the forest are ignored.
    ///
    /// Returns the number of nodes updated.
    pub fn apply_role_updates<I, S>(&mut self, updates: I, now_ms: f64) -> usize
    where
        I: IntoIterator<Item = (NodeId, S)>,
        S: Into<String>,
    {
        let mut updated = 0;
        for (id, role) in updates {
            if let Some(node) = forest::find_mut(&mut self.forest, id) {
                node.set_role(role);
                updated += 1;
            }
        }
        debug!(updated; "Roles updated");
        self.update_diagram(now_ms);
        updated
    }

    /// Removes a node and its subtree.
    pub fn delete_node(&mut self, id: NodeId, now_ms: f64) -> Result<Node, NodeMapError> {
        let removed = forest::remove(&mut self.forest, id).ok_or(NodeMapError::UnknownNode(id))?;
        if self.drag.is_some_and(|drag| drag.id == id) {
            self.drag = None;
        }
        self.manual_interaction = false;

        info!(id:% = id, subtree_len = forest::count(std::slice::from_ref(&removed)); "Node deleted");
        self.update_diagram(now_ms);
        Ok(removed)
    }

    /// Starts dragging a node. Its displayed position follows
    /// [`drag_to`](Self::drag_to) and is no longer eased.
    pub fn drag_start(&mut self, id: NodeId) -> Result<(), NodeMapError> {
        let node = self.scene.get_mut(id).ok_or(NodeMapError::UnknownNode(id))?;
        let origin = node.target().position;
        node.display_mut().dragging = true;
        self.drag = Some(DragGesture { id, origin });
        Ok(())
    }

    /// Moves the dragged node to `to`, in layout coordinates.
    ///
    /// Returns `None` when no drag is in progress.
    pub fn drag_to(&mut self, to: Point) -> Option<DragStatus> {
        let drag = self.drag?;
        let node = self.scene.get_mut(drag.id)?;
        node.display_mut().position = to;

        let distance = to.distance(drag.origin);
        Some(DragStatus {
            distance,
            will_delete: distance > self.config.interaction().deletion_threshold(),
        })
    }

    /// Releases the dragged node.
    ///
    /// Farther than the deletion threshold from where the drag started the
    /// node is deleted; otherwise it snaps back. Returns `None` when no drag
    /// is in progress.
    pub fn drag_end(&mut self, now_ms: f64) -> Option<DragOutcome> {
        let drag = self.drag.take()?;
        let node = self.scene.get_mut(drag.id)?;
        let display = node.display_mut();
        display.dragging = false;

        if display.position.distance(drag.origin) > self.config.interaction().deletion_threshold() {
            return self
                .delete_node(drag.id, now_ms)
                .ok()
                .map(DragOutcome::Deleted);
        }

        display.position = drag.origin;
        self.update_diagram(now_ms);
        Some(DragOutcome::SnappedBack)
    }

    /// Fits the viewport to the content again and resumes automatic fitting.
    ///
    /// An empty map transitions back to the identity transform.
    pub fn reset_zoom(&mut self, now_ms: f64) {
        self.observe(now_ms);
        self.manual_interaction = false;
        self.auto_zoom.cancel();
        let duration_ms = self.config.viewport().reset_duration_ms();
        if !self.fit_content(now_ms, duration_ms) && self.scene.is_empty() {
            self.viewport.reset(now_ms, duration_ms);
        }
    }

    /// Changes the viewport size and schedules an automatic fit.
    pub fn resize(&mut self, width: f32, height: f32, now_ms: f64) {
        self.observe(now_ms);
        self.viewport.set_size(Size::new(width, height));
        self.manual_interaction = false;
        self.auto_zoom.trigger(now_ms);
    }

    /// Replaces the forest.
    pub fn load_map(&mut self, forest: Vec<Node>, now_ms: f64) {
        info!(nodes_len = forest::count(&forest); "Map loaded");
        self.forest = forest;
        self.drag = None;
        self.pending_spawns.clear();
        self.manual_interaction = false;
        self.update_diagram(now_ms);
    }

    /// Replaces the forest with the starter template: a root with three
    /// children of three grandchildren each, and an empty second root.
    pub fn new_map(&mut self, now_ms: f64) {
        let forest = new_map_template(&mut self.rng);
        self.load_map(forest, now_ms);
    }
}

impl Animate for MapState {
    fn frame(&mut self, now_ms: f64) -> FrameOutcome {
        MapState::frame(self, now_ms)
    }

    fn is_animating(&self, now_ms: f64) -> bool {
        self.animator.is_running()
            || self.auto_zoom.is_pending()
            || self.viewport.is_transitioning(now_ms)
    }
}

/// Starter forest for a new map.
pub fn new_map_template<R: rand::Rng + ?Sized>(rng: &mut R) -> Vec<Node> {
    let human = |node: Node| node.with_role("human");

    let children = ["a1", "a2", "a3"]
        .into_iter()
        .map(|prefix| {
            let grandchildren = (1..=3)
                .map(|i| human(Node::new(NodeId::generate("gc", rng), format!("Grandchild {i}"))))
                .collect();
            human(Node::new(NodeId::generate(prefix, rng), "Child")).with_children(grandchildren)
        })
        .collect();

    vec![
        human(Node::new(NodeId::generate("a", rng), "Main A")).with_children(children),
        human(Node::new(NodeId::generate("b", rng), "Main B")),
    ]
}
