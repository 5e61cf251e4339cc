//! Frame-driven animation of displayed node positions.
//!
//! The [`Animator`] is an explicit scheduler: it never calls itself back.
//! A driver (an [`AnimationLoop`] or any event loop) asks it for one frame at
//! a time and stops asking once it reports [`FrameOutcome::WentIdle`].
//! [`Animator::kick`] restarts a stopped animator and is idempotent while
//! one is running.
//!
//! Per frame the animator:
//!
//! 1. measures the time since the previous frame (none right after a kick),
//! 2. eases every non-dragged node's displayed position towards its target
//!    by `t = 1 - e^(-k * dt)` of the remaining distance,
//! 3. recomputes every node's rendered radius,
//! 4. counts consecutive frames whose largest remaining displacement stays
//!    under the idle threshold and stops after enough of them.
//!
//! It writes only [`DisplayState`](crate::scene::DisplayState); target
//! geometry belongs to the layout pass.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use log::{debug, trace};

use crate::{
    config::{AnimationConfig, RadiusConfig},
    scene::{DisplayState, Scene},
};

/// Result of a single [`Animator::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The frame ran and another one should be scheduled.
    Continue { max_move: f32 },
    /// The frame ran and the animator has now stopped.
    WentIdle,
    /// The animator was not running; nothing changed.
    Stopped,
}

impl FrameOutcome {
    /// Whether the driver should schedule another frame.
    pub fn wants_next_frame(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Restartable per-frame easing scheduler.
#[derive(Debug, Clone)]
pub struct Animator {
    config: AnimationConfig,
    radius: RadiusConfig,
    running: bool,
    last_frame_ms: Option<f64>,
    idle_frames: u32,
    frames: u64,
}

impl Animator {
    pub fn new(config: AnimationConfig, radius: RadiusConfig) -> Self {
        Self {
            config,
            radius,
            running: false,
            last_frame_ms: None,
            idle_frames: 0,
            frames: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames run since construction.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Requests animation.
    ///
    /// Resets the elapsed-time baseline and the idle counter. Returns `true`
    /// when this call started the animator and `false` when it was already
    /// running, in which case no second loop must be scheduled.
    pub fn kick(&mut self) -> bool {
        self.last_frame_ms = None;
        self.idle_frames = 0;
        if self.running {
            return false;
        }
        self.running = true;
        debug!("Animation started");
        true
    }

    /// Runs one frame at `now_ms` over every node currently in `scene`.
    pub fn tick(&mut self, now_ms: f64, scene: &mut Scene, detail_level: usize) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }
        self.frames += 1;

        let elapsed_ms = self
            .last_frame_ms
            .map_or(0.0, |last| (now_ms - last).max(0.0));
        self.last_frame_ms = Some(now_ms);
        let t = (1.0 - (-f64::from(self.config.decay_rate()) * elapsed_ms / 1000.0).exp()) as f32;

        let idle_threshold = self.config.idle_threshold();
        let mut max_move = 0.0f32;
        for node in scene.iter_mut() {
            let target = *node.target();
            let display = node.display_mut();

            if !display.dragging {
                display.position = display.position.lerp(target.position, t);
                let remaining = display.position.distance(target.position);
                max_move = max_move.max(remaining);
                if remaining < idle_threshold {
                    display.expanding = false;
                    display.collapsing = false;
                }
            }

            display.radius = self.rendered_radius(display, target.depth, detail_level);
        }

        if max_move < idle_threshold {
            self.idle_frames += 1;
        } else {
            self.idle_frames = 0;
        }

        trace!(
            frame = self.frames,
            elapsed_ms,
            max_move,
            idle_frames = self.idle_frames;
            "Animation frame"
        );

        if self.idle_frames >= self.config.idle_frames() {
            self.running = false;
            self.last_frame_ms = None;
            debug!(frames = self.frames; "Animation went idle");
            return FrameOutcome::WentIdle;
        }
        FrameOutcome::Continue { max_move }
    }

    /// Radius of a node for this frame; advances the growth of new nodes.
    ///
    /// Hidden nodes render at 0 even while growing, so nodes created deeper
    /// than the detail level never flash on top of their collapsed ancestor.
    fn rendered_radius(&self, display: &mut DisplayState, depth: usize, detail_level: usize) -> f32 {
        if display.is_new {
            display.growth_progress += self.config.growth_step();
            // Allow for accumulated rounding of the per-frame step.
            if display.growth_progress >= 1.0 - 1e-4 {
                display.growth_progress = 1.0;
                display.is_new = false;
            }
        }
        if !(depth <= detail_level || display.expanding || display.collapsing) {
            return 0.0;
        }
        let standard = self.radius.for_depth(depth);
        if display.is_new {
            standard * display.growth_progress
        } else {
            standard
        }
    }
}

/// Something that can be advanced one animation frame at a time.
pub trait Animate {
    /// Runs one frame at `now_ms`.
    fn frame(&mut self, now_ms: f64) -> FrameOutcome;

    /// Whether more frames would change anything at `now_ms`.
    fn is_animating(&self, now_ms: f64) -> bool;
}

/// Drives an [`Animate`] target with a [`Clock`].
#[derive(Debug, Clone)]
pub struct AnimationLoop<C: Clock> {
    clock: C,
    frame_ms: f64,
}

impl<C: Clock> AnimationLoop<C> {
    /// Creates a loop that schedules a frame every `frame_ms`.
    pub fn new(clock: C, frame_ms: f64) -> Self {
        Self { clock, frame_ms }
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Waits for the next frame and runs it.
    pub fn run_frame<A: Animate>(&mut self, target: &mut A) -> FrameOutcome {
        self.clock.wait_frame(self.frame_ms);
        target.frame(self.clock.now_ms())
    }

    /// Runs frames until the target stops animating or `max_frames` ran.
    ///
    /// Returns the number of frames run.
    pub fn run_until_idle<A: Animate>(&mut self, target: &mut A, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && target.is_animating(self.clock.now_ms()) {
            self.run_frame(target);
            frames += 1;
        }
        debug!(
            frames,
            still_animating = target.is_animating(self.clock.now_ms());
            "Animation loop finished"
        );
        frames
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use nodemap_core::{forest::Node, geometry::Point, identifier::NodeId};

    use super::*;
    use crate::{config::LayoutConfig, layout::compute_layout};

    struct Fixture {
        animator: Animator,
        scene: Scene,
        clock: ManualClock,
    }

    impl Fixture {
        fn new(forest: &mut [Node], level: usize) -> Self {
            let mut scene = Scene::new();
            scene.reconcile(compute_layout(forest, level, &LayoutConfig::default()), |_| {
                Some(Point::new(0.0, 0.0))
            });
            Self {
                animator: Animator::new(AnimationConfig::default(), RadiusConfig::default()),
                scene,
                clock: ManualClock::new(1000.0),
            }
        }

        fn frame(&mut self, level: usize) -> FrameOutcome {
            let outcome = self.animator.tick(self.clock.now_ms(), &mut self.scene, level);
            self.clock.advance(16.0);
            outcome
        }

        fn position(&self, id: &str) -> Point {
            self.scene.get(NodeId::new(id)).unwrap().display().position
        }

        fn target(&self, id: &str) -> Point {
            self.scene.get(NodeId::new(id)).unwrap().target().position
        }

        fn radius(&self, id: &str) -> f32 {
            self.scene.get(NodeId::new(id)).unwrap().display().radius
        }
    }

    #[test]
    fn test_not_running_until_kicked() {
        let mut fx = Fixture::new(&mut [Node::new("an0", "A")], 0);
        assert!(!fx.animator.is_running());
        assert_eq!(fx.frame(0), FrameOutcome::Stopped);
        assert_eq!(fx.position("an0"), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_first_frame_after_kick_only_records_baseline() {
        let mut fx = Fixture::new(&mut [Node::new("an1", "A")], 0);
        assert!(fx.animator.kick());

        assert!(fx.frame(0).wants_next_frame());
        assert_eq!(fx.position("an1"), Point::new(0.0, 0.0));

        fx.frame(0);
        let moved = fx.position("an1");
        assert!(moved.x() > 0.0);
        // One 16 ms step of exponential easing at rate 5/s.
        let t = 1.0 - (-5.0f64 * 0.016).exp();
        assert!(approx_eq!(f32, moved.x(), 100.0 * t as f32, epsilon = 1e-3));
    }

    #[test]
    fn test_duplicate_kick_does_not_start_a_second_loop() {
        let mut fx = Fixture::new(&mut [Node::new("an2", "A")], 0);
        assert!(fx.animator.kick());
        fx.frame(0);
        fx.frame(0);
        let before = fx.position("an2");

        assert!(!fx.animator.kick());
        assert!(fx.animator.is_running());

        // Baseline reset: the frame after the second kick does not ease.
        fx.clock.advance(5000.0);
        fx.frame(0);
        assert_eq!(fx.position("an2"), before);
    }

    #[test]
    fn test_converges_and_goes_idle() {
        let mut fx = Fixture::new(&mut [Node::new("an3", "A")], 0);
        let target = fx.target("an3");
        fx.animator.kick();

        let mut frames = 0;
        let mut converged_at = None;
        while fx.animator.is_running() {
            fx.frame(0);
            frames += 1;
            if converged_at.is_none()
                && fx.position("an3").distance(target) < 0.1
            {
                converged_at = Some(frames);
            }
            assert!(frames < 1000, "animation never went idle");
        }

        let converged_at = converged_at.unwrap();
        assert!(frames - converged_at <= 60);
        assert_eq!(fx.frame(0), FrameOutcome::Stopped);
    }

    #[test]
    fn test_dragged_nodes_are_not_eased() {
        let mut fx = Fixture::new(&mut [Node::new("an4", "A")], 0);
        fx.scene
            .get_mut(NodeId::new("an4"))
            .unwrap()
            .display_mut()
            .dragging = true;
        fx.animator.kick();

        for _ in 0..10 {
            fx.frame(0);
        }
        assert_eq!(fx.position("an4"), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_new_nodes_grow_to_standard_radius() {
        let mut fx = Fixture::new(&mut [Node::new("an5", "A")], 0);
        fx.animator.kick();

        fx.frame(0);
        let first = fx.scene.get(NodeId::new("an5")).unwrap().display().radius;
        assert!(approx_eq!(f32, first, 2.5, epsilon = 1e-4));

        for _ in 0..20 {
            fx.frame(0);
        }
        let display = *fx.scene.get(NodeId::new("an5")).unwrap().display();
        assert!(!display.is_new);
        assert_eq!(display.growth_progress, 1.0);
        assert_eq!(display.radius, 50.0);
    }

    #[test]
    fn test_nodes_beyond_detail_level_are_hidden() {
        let mut forest = vec![Node::new("an6", "A").with_children(vec![Node::new("an61", "B")])];
        let mut fx = Fixture::new(&mut forest, 0);
        for node in fx.scene.iter_mut() {
            node.display_mut().is_new = false;
        }
        fx.animator.kick();
        fx.frame(0);

        assert_eq!(fx.scene.get(NodeId::new("an6")).unwrap().display().radius, 50.0);
        assert_eq!(fx.scene.get(NodeId::new("an61")).unwrap().display().radius, 0.0);

        fx.frame(1);
        assert_eq!(fx.scene.get(NodeId::new("an61")).unwrap().display().radius, 20.0);
    }

    #[test]
    fn test_new_nodes_beyond_detail_level_grow_hidden() {
        let mut forest = vec![Node::new("an10", "A").with_children(vec![Node::new("an101", "B")])];
        let mut fx = Fixture::new(&mut forest, 0);
        fx.animator.kick();

        for _ in 0..30 {
            fx.frame(0);
            assert_eq!(fx.radius("an101"), 0.0);
        }
        let child = *fx.scene.get(NodeId::new("an101")).unwrap().display();
        assert!(!child.is_new);
        assert_eq!(child.growth_progress, 1.0);
        assert_eq!(fx.radius("an10"), 50.0);

        // Growth already finished, so expanding shows the full radius at once.
        fx.frame(1);
        assert_eq!(fx.radius("an101"), 20.0);
    }

    #[test]
    fn test_kick_after_idle_restarts_the_loop() {
        let mut forest = vec![Node::new("an11", "A")];
        let mut fx = Fixture::new(&mut forest, 0);
        fx.animator.kick();
        let mut frames = 0;
        while fx.frame(0) != FrameOutcome::WentIdle {
            frames += 1;
            assert!(frames < 1000, "animation never went idle");
        }
        assert!(!fx.animator.is_running());
        let settled = fx.position("an11");

        // A new root in front pushes the existing one to the right.
        forest.insert(0, Node::new("an12", "B"));
        fx.scene
            .reconcile(compute_layout(&mut forest, 0, &LayoutConfig::default()), |_| None);
        let target = fx.target("an11");
        assert!(target.x() > settled.x());

        assert!(fx.animator.kick());
        assert!(fx.animator.is_running());
        assert!(matches!(fx.frame(0), FrameOutcome::Continue { .. }));
        assert_eq!(fx.position("an11"), settled);
        assert!(matches!(fx.frame(0), FrameOutcome::Continue { .. }));
        assert!(fx.position("an11").x() > settled.x());

        let mut frames = 0;
        let mut converged_at = None;
        while fx.animator.is_running() {
            fx.frame(0);
            frames += 1;
            if converged_at.is_none() && fx.position("an11").distance(target) < 0.1 {
                converged_at = Some(frames);
            }
            assert!(frames < 1000, "animation never went idle again");
        }
        let converged_at = converged_at.unwrap();
        assert!(frames - converged_at <= AnimationConfig::default().idle_frames() as usize);
    }

    #[test]
    fn test_collapsing_nodes_stay_visible_until_settled() {
        let mut forest = vec![Node::new("an7", "A").with_children(vec![Node::new("an71", "B")])];
        let mut fx = Fixture::new(&mut forest, 1);
        for node in fx.scene.iter_mut() {
            node.display_mut().is_new = false;
            node.display_mut().position = node.target().position;
        }

        fx.scene
            .reconcile(compute_layout(&mut forest, 0, &LayoutConfig::default()), |_| None);
        fx.scene.mark_level_transition(1, 0);
        fx.animator.kick();
        fx.frame(0);
        fx.frame(0);
        assert_eq!(fx.scene.get(NodeId::new("an71")).unwrap().display().radius, 20.0);

        while fx.animator.is_running() {
            fx.frame(0);
        }
        let child = fx.scene.get(NodeId::new("an71")).unwrap().display();
        assert!(!child.collapsing);
        assert_eq!(child.radius, 0.0);
    }

    #[test]
    fn test_tolerates_nodes_removed_between_frames() {
        let mut forest = vec![Node::new("an8", "A"), Node::new("an9", "B")];
        let mut fx = Fixture::new(&mut forest, 0);
        fx.animator.kick();
        fx.frame(0);

        fx.scene.remove(NodeId::new("an9"));
        assert!(fx.frame(0).wants_next_frame());
        assert_eq!(fx.scene.len(), 1);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use nodemap_core::{forest::Node, geometry::Point, identifier::NodeId};

    use super::*;
    use crate::{config::LayoutConfig, layout::compute_layout};

    proptest! {
        #[test]
        fn easing_never_overshoots(
            start_x in -2000.0f32..2000.0,
            start_y in -2000.0f32..2000.0,
            frame_ms in 1.0f64..100.0,
            frames in 1usize..50,
        ) {
            let mut forest = vec![Node::new("ep", "E")];
            let mut scene = Scene::new();
            scene.reconcile(
                compute_layout(&mut forest, 0, &LayoutConfig::default()),
                |_| Some(Point::new(start_x, start_y)),
            );
            let target = scene.get(NodeId::new("ep")).unwrap().target().position;

            let mut animator = Animator::new(AnimationConfig::default(), RadiusConfig::default());
            animator.kick();
            let mut previous = scene.get(NodeId::new("ep")).unwrap().display().position.distance(target);
            let mut now = 0.0;
            for _ in 0..frames {
                animator.tick(now, &mut scene, 0);
                now += frame_ms;
                let distance = scene.get(NodeId::new("ep")).unwrap().display().position.distance(target);
                prop_assert!(distance <= previous + 1e-3);
                previous = distance;
            }
        }
    }
}
