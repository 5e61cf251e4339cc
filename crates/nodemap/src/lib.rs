//! Nodemap - layout and animation engine for interactive hierarchical node maps.
//!
//! A node map is a forest of ordered trees. The engine lays the forest out
//! left-to-right with a controllable detail level, merges every new layout
//! into a key-stable scene, eases displayed positions towards their targets
//! frame by frame and fits a viewport to the content.
//!
//! ```text
//! Forest + detail level
//!     ↓ layout
//! Positioned nodes
//!     ↓ reconcile (by id)
//! Scene
//!     ↓ animate / fit viewport
//! Snapshot
//!     ↓ export
//! SVG
//! ```

pub mod animation;
pub mod config;
pub mod debounce;
pub mod export;
pub mod layout;
pub mod scene;
pub mod state;
pub mod viewport;

mod error;

pub use nodemap_core::{forest, geometry, identifier};

pub use error::NodeMapError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use config::AppConfig;
use export::{Exporter, Snapshot, svg::SvgExporter};
use forest::Node;
use geometry::Size;
use state::MapState;

use animation::{AnimationLoop, ManualClock};

/// Frame interval used when settling a map on a simulated clock.
const SIMULATED_FRAME_MS: f64 = 1000.0 / 60.0;

/// Builder for loading, laying out, settling and rendering node maps.
///
/// # Examples
///
/// ```
/// use nodemap::{MapBuilder, config::AppConfig, geometry::Size};
///
/// let source = r#"[{"id": "a", "title": "Main", "children": [{"id": "a1", "title": "Child"}]}]"#;
/// let builder = MapBuilder::new(AppConfig::default());
///
/// let forest = builder.parse_forest(source).expect("Failed to parse");
/// let mut state = builder.layout(forest, 1, Size::new(800.0, 600.0));
/// builder.settle(&mut state, 10_000);
///
/// let svg = builder.render_svg(&state);
/// assert!(svg.contains("<circle"));
/// ```
#[derive(Debug, Default)]
pub struct MapBuilder {
    config: AppConfig,
}

impl MapBuilder {
    /// Create a new map builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a forest from its JSON form: an array of
    /// `{id, title, role, description, children}` objects.
    ///
    /// # Errors
    ///
    /// Returns [`NodeMapError::Forest`] with the source attached when the
    /// JSON is malformed or does not match the node shape.
    pub fn parse_forest(&self, source: &str) -> Result<Vec<Node>, NodeMapError> {
        info!("Parsing forest");
        let forest: Vec<Node> = serde_json::from_str(source)
            .map_err(|err| NodeMapError::new_forest_error(err, source))?;

        debug!(
            roots_len = forest.len(),
            nodes_len = forest::count(&forest),
            max_depth = forest::max_depth(&forest);
            "Forest parsed successfully"
        );
        trace!(forest:?; "Parsed forest");
        Ok(forest)
    }

    /// Read and parse a forest file.
    pub fn read_forest(&self, path: impl AsRef<Path>) -> Result<Vec<Node>, NodeMapError> {
        let source = fs::read_to_string(path)?;
        self.parse_forest(&source)
    }

    /// Serialize a forest to its persisted JSON form. Layout annotations are
    /// not included.
    pub fn forest_to_json(&self, forest: &[Node]) -> Result<String, NodeMapError> {
        serde_json::to_string_pretty(forest)
            .map_err(|err| NodeMapError::Export(Box::new(err)))
    }

    /// Load `forest` into a fresh map state at `detail_level`.
    pub fn layout(&self, forest: Vec<Node>, detail_level: usize, viewport: Size) -> MapState {
        let mut state = MapState::new(self.config.clone(), viewport);
        state.set_detail_level(detail_level);
        state.load_map(forest, 0.0);
        info!(
            detail_level = state.detail_level(),
            nodes_len = state.scene().len();
            "Layout calculated"
        );
        state
    }

    /// Run animation frames on a simulated clock until the map is at rest or
    /// `max_frames` frames ran. Returns the number of frames run.
    pub fn settle(&self, state: &mut MapState, max_frames: usize) -> usize {
        let mut animation =
            AnimationLoop::new(ManualClock::new(state.now_ms()), SIMULATED_FRAME_MS);
        let frames = animation.run_until_idle(state, max_frames);
        info!(frames; "Map settled");
        frames
    }

    /// Render the map at rest to an SVG string.
    pub fn render_svg(&self, state: &MapState) -> String {
        export::svg::render_document(&Self::resting_snapshot(state), &Default::default())
            .to_string()
    }

    /// Render the map at rest to an SVG file.
    pub fn write_svg(&self, state: &MapState, path: impl AsRef<Path>) -> Result<(), NodeMapError> {
        let mut exporter = SvgExporter::new(path);
        exporter.export_snapshot(&Self::resting_snapshot(state))?;
        info!("SVG rendered successfully");
        Ok(())
    }

    fn resting_snapshot(state: &MapState) -> Snapshot<'_> {
        Snapshot::new(
            state.scene(),
            state.detail_level(),
            state.viewport().target(),
            state.viewport().size(),
        )
    }
}
