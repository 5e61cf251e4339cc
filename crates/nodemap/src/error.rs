//! Error types for node map operations.
//!
//! Layout, bounds and animation are infallible in-memory computations. The
//! fallible surfaces are reading forests, controller edits that name a node
//! and exporting snapshots; they all report through [`NodeMapError`].

use std::io;

use thiserror::Error;

use nodemap_core::identifier::NodeId;

/// The main error type for node map operations.
///
/// # Diagnostic Variants
///
/// The `Forest` variant keeps the offending source text together with the
/// line and column reported by the JSON parser, so front ends can point at
/// the exact location.
#[derive(Debug, Error)]
pub enum NodeMapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid forest: {err}")]
    Forest {
        err: serde_json::Error,
        src: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for NodeMapError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl NodeMapError {
    /// Create a new `Forest` error with the associated source text.
    pub fn new_forest_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Forest {
            err,
            src: src.into(),
        }
    }

    /// Byte offset of a forest parse error within its source, if any.
    pub fn forest_error_offset(&self) -> Option<usize> {
        let Self::Forest { err, src } = self else {
            return None;
        };
        if err.line() == 0 {
            return None;
        }
        let line_start: usize = src
            .split_inclusive('\n')
            .take(err.line() - 1)
            .map(str::len)
            .sum();
        Some((line_start + err.column().saturating_sub(1)).min(src.len()))
    }
}
