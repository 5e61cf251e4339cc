//! Error adapter for converting NodeMapError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Forest parse
//! errors are rendered with a snippet of the offending JSON.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use nodemap::NodeMapError;

const FOREST_HELP: &str =
    "a forest is a JSON array of {\"id\", \"title\", \"role\", \"description\", \"children\"} objects";

/// Adapter for [`NodeMapError::Forest`], pointing into the source text.
pub struct ForestAdapter<'a> {
    error: &'a NodeMapError,
    src: &'a str,
    offset: Option<usize>,
}

impl<'a> ForestAdapter<'a> {
    /// Returns `None` unless `error` is a forest parse error.
    pub fn new(error: &'a NodeMapError) -> Option<Self> {
        let NodeMapError::Forest { src, .. } = error else {
            return None;
        };
        Some(Self {
            error,
            src,
            offset: error.forest_error_offset(),
        })
    }

    fn message(&self) -> String {
        match self.error {
            NodeMapError::Forest { err, .. } => err.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Debug for ForestAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForestAdapter")
            .field("offset", &self.offset)
            .finish()
    }
}

impl fmt::Display for ForestAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid forest: {}", self.message())
    }
}

impl std::error::Error for ForestAdapter<'_> {}

impl MietteDiagnostic for ForestAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("nodemap::forest"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(FOREST_HELP))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let offset = self.offset?;
        let len = usize::from(offset < self.src.len());
        let span = SourceSpan::new(offset.into(), len);
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some("here".to_string()), span),
        )))
    }
}

/// Adapter for non-diagnostic [`NodeMapError`] variants.
pub struct ErrorAdapter<'a>(pub &'a NodeMapError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            NodeMapError::Io(_) => "nodemap::io",
            NodeMapError::Forest { .. } => "nodemap::forest",
            NodeMapError::Config(_) => "nodemap::config",
            NodeMapError::UnknownNode(_) => "nodemap::node",
            NodeMapError::Export(_) => "nodemap::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            NodeMapError::Config(_) => Some(Box::new(
                "check the TOML file passed with --config, or remove it to use defaults",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A forest parse error with source location information.
    Forest(ForestAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Forest(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Forest(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Forest(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Forest(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Forest(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Forest(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`NodeMapError`] into a list of reportable errors.
pub fn to_reportables(err: &NodeMapError) -> Vec<Reportable<'_>> {
    match ForestAdapter::new(err) {
        Some(adapter) => vec![Reportable::Forest(adapter)],
        None => vec![Reportable::Error(ErrorAdapter(err))],
    }
}
