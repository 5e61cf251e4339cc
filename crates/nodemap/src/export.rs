//! Snapshot export of a node map.
//!
//! ```text
//! Forest
//!     ↓ layout + reconcile
//! Scene (target geometry + display state)
//!     ↓ animate
//! Snapshot (scene, detail level, viewport)
//!     ↓ export (this module)
//! Output file
//! ```
//!
//! # Available Backends
//!
//! - [`svg`]: SVG output via [`svg::SvgExporter`]
//!
//! Export operations return [`Error`], which converts into
//! [`NodeMapError::Export`](crate::NodeMapError::Export) at the crate
//! boundary.

pub mod svg;

use nodemap_core::geometry::Size;

use crate::{scene::Scene, state::MapState, viewport::ViewTransform};

/// Everything an export backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    scene: &'a Scene,
    detail_level: usize,
    transform: ViewTransform,
    size: Size,
}

impl<'a> Snapshot<'a> {
    pub fn new(scene: &'a Scene, detail_level: usize, transform: ViewTransform, size: Size) -> Self {
        Self {
            scene,
            detail_level,
            transform,
            size,
        }
    }

    /// Captures `state` as it is displayed at `now_ms`.
    pub fn of(state: &'a MapState, now_ms: f64) -> Self {
        Self::new(
            state.scene(),
            state.detail_level(),
            state.viewport().transform_at(now_ms),
            state.viewport().size(),
        )
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn detail_level(&self) -> usize {
        self.detail_level
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// Abstraction for snapshot export backends.
pub trait Exporter {
    /// Exports one snapshot to the backend's output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the snapshot cannot be converted to the
    /// target format, or [`Error::Io`] if writing the output fails.
    fn export_snapshot(&mut self, snapshot: &Snapshot<'_>) -> Result<(), Error>;
}

/// Errors that can occur during export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
