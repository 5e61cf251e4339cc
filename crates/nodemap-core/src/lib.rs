//! Node Map Core Types and Definitions
//!
//! This crate provides the foundational types for node map diagrams. It
//! includes:
//!
//! - **Identifiers**: String-interned node identifiers ([`identifier::NodeId`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Forest**: The hierarchical node model and tree queries ([`forest`] module)

pub mod forest;
pub mod geometry;
pub mod identifier;
