//! Configuration types for node map layout, animation and viewport fitting.
//!
//! Every tunable constant of the engine lives here. All types implement
//! [`serde::Deserialize`] with per-field defaults, so a configuration file
//! only needs to name the values it overrides. The engine treats a loaded
//! configuration as immutable.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`LayoutConfig`] - Spacing and anchor constants for the layout engine.
//! - [`RadiusConfig`] - Node radii per depth tier.
//! - [`AnimationConfig`] - Easing rate, idle detection and growth animation.
//! - [`ViewportConfig`] - Padding, scale multiplier and fit timing.
//! - [`InteractionConfig`] - Thresholds for drag gestures.
//!
//! # Example
//!
//! ```
//! # use nodemap::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().node_height(), 40.0);
//! assert_eq!(config.radius().for_depth(0), 50.0);
//! ```

use serde::Deserialize;

/// Top-level configuration combining all sections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    radius: RadiusConfig,

    #[serde(default)]
    animation: AnimationConfig,

    #[serde(default)]
    viewport: ViewportConfig,

    #[serde(default)]
    interaction: InteractionConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        layout: LayoutConfig,
        radius: RadiusConfig,
        animation: AnimationConfig,
        viewport: ViewportConfig,
        interaction: InteractionConfig,
    ) -> Self {
        Self {
            layout,
            radius,
            animation,
            viewport,
            interaction,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the radius configuration.
    pub fn radius(&self) -> &RadiusConfig {
        &self.radius
    }

    /// Returns the animation configuration.
    pub fn animation(&self) -> &AnimationConfig {
        &self.animation
    }

    /// Returns the viewport configuration.
    pub fn viewport(&self) -> &ViewportConfig {
        &self.viewport
    }

    /// Returns the interaction configuration.
    pub fn interaction(&self) -> &InteractionConfig {
        &self.interaction
    }
}

/// Spacing and anchor constants consumed by the layout engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// X coordinate of the first root.
    main_start_x: f32,
    /// Gap between the rightmost descendant of a root and the next root.
    /// Half of it is the horizontal step from a parent to its children.
    main_spacing: f32,
    /// Y coordinate of the horizontal center line.
    center_y: f32,
    /// Base height of a node slot; the floor of every subtree height.
    node_height: f32,
    /// Vertical gap between sibling subtrees.
    vertical_spacing: f32,
    /// Offset of roots above/below the center line when fully collapsed.
    vertical_offset_collapsed: f32,
    /// Horizontal step between roots when fully collapsed.
    collapsed_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            main_start_x: 100.0,
            main_spacing: 300.0,
            center_y: 400.0,
            node_height: 40.0,
            vertical_spacing: 50.0,
            vertical_offset_collapsed: 100.0,
            collapsed_spacing: 275.0,
        }
    }
}

impl LayoutConfig {
    pub fn main_start_x(&self) -> f32 {
        self.main_start_x
    }

    pub fn main_spacing(&self) -> f32 {
        self.main_spacing
    }

    pub fn center_y(&self) -> f32 {
        self.center_y
    }

    pub fn node_height(&self) -> f32 {
        self.node_height
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }

    pub fn vertical_offset_collapsed(&self) -> f32 {
        self.vertical_offset_collapsed
    }

    pub fn collapsed_spacing(&self) -> f32 {
        self.collapsed_spacing
    }

    /// Horizontal distance between a parent and its children.
    pub fn child_offset_x(&self) -> f32 {
        self.main_spacing / 2.0
    }
}

/// Node radii per depth tier.
///
/// Roots use `main`, depth 1 uses `sub`, depth 2 uses `sub_sub`; deeper
/// nodes shrink by one unit per level, never below `min`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RadiusConfig {
    main: f32,
    sub: f32,
    sub_sub: f32,
    min: f32,
}

impl Default for RadiusConfig {
    fn default() -> Self {
        Self {
            main: 50.0,
            sub: 20.0,
            sub_sub: 10.0,
            min: 3.0,
        }
    }
}

impl RadiusConfig {
    /// Radius of a root node; also the per-node padding of content bounds.
    pub fn main(&self) -> f32 {
        self.main
    }

    /// Standard radius of a node at `depth`.
    pub fn for_depth(&self, depth: usize) -> f32 {
        match depth {
            0 => self.main,
            1 => self.sub,
            2 => self.sub_sub,
            deeper => (self.sub_sub - (deeper - 2) as f32).max(self.min),
        }
    }
}

/// Animation loop constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Exponential decay rate `k`, per second.
    decay_rate: f32,
    /// Displacement under which a frame counts as idle, in layout units.
    idle_threshold: f32,
    /// Consecutive idle frames after which the loop stops.
    idle_frames: u32,
    /// Number of frames a new node takes to grow to its full radius.
    growth_frames: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            decay_rate: 5.0,
            idle_threshold: 0.1,
            idle_frames: 60,
            growth_frames: 20,
        }
    }
}

impl AnimationConfig {
    pub fn decay_rate(&self) -> f32 {
        self.decay_rate
    }

    pub fn idle_threshold(&self) -> f32 {
        self.idle_threshold
    }

    pub fn idle_frames(&self) -> u32 {
        self.idle_frames
    }

    pub fn growth_frames(&self) -> u32 {
        self.growth_frames
    }

    /// Growth progress added per frame for new nodes.
    pub fn growth_step(&self) -> f32 {
        1.0 / self.growth_frames.max(1) as f32
    }
}

/// Viewport fitting constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Padding added on every side of the content bounds, in pixels.
    zoom_padding: f32,
    /// Multiplier applied to the fitted scale; below 1 leaves a margin.
    zoom_scale_multiplier: f32,
    /// Duration of the transition started by an automatic fit.
    fit_duration_ms: f64,
    /// Trailing debounce window for automatic fits.
    auto_zoom_debounce_ms: f64,
    /// Duration of the transition back to the identity transform.
    reset_duration_ms: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_padding: 50.0,
            zoom_scale_multiplier: 0.9,
            fit_duration_ms: 500.0,
            auto_zoom_debounce_ms: 200.0,
            reset_duration_ms: 500.0,
        }
    }
}

impl ViewportConfig {
    pub fn zoom_padding(&self) -> f32 {
        self.zoom_padding
    }

    pub fn zoom_scale_multiplier(&self) -> f32 {
        self.zoom_scale_multiplier
    }

    pub fn fit_duration_ms(&self) -> f64 {
        self.fit_duration_ms
    }

    pub fn auto_zoom_debounce_ms(&self) -> f64 {
        self.auto_zoom_debounce_ms
    }

    pub fn reset_duration_ms(&self) -> f64 {
        self.reset_duration_ms
    }
}

/// Drag gesture constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Dropping a dragged node farther than this from where the drag started
    /// deletes it.
    deletion_threshold: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            deletion_threshold: 100.0,
        }
    }
}

impl InteractionConfig {
    pub fn deletion_threshold(&self) -> f32 {
        self.deletion_threshold
    }
}
