//! Content bounds of a laid-out node map.

use nodemap_core::geometry::{Bounds, Point};

use crate::{config::RadiusConfig, layout::PositionedNode};

/// Computes the axis-aligned box covering every node's target position,
/// padded per node by the main radius in all four directions.
///
/// Displayed (animated) positions are ignored. An empty input yields
/// [`Bounds::empty`], whose width and height are negative; check
/// [`Bounds::is_degenerate`] before fitting to it.
///
/// # Examples
///
/// ```
/// use nodemap::{config::RadiusConfig, layout::{PositionedNode, compute_bounds}};
/// use nodemap_core::{geometry::Point, identifier::NodeId};
///
/// let nodes = vec![PositionedNode::new(NodeId::new("b"), None, 0, Point::new(100.0, 300.0))];
/// let bounds = compute_bounds(&nodes, &RadiusConfig::default());
///
/// assert_eq!(bounds.min_x(), 50.0);
/// assert_eq!(bounds.width(), 100.0);
/// assert!(compute_bounds(&[], &RadiusConfig::default()).is_degenerate());
/// ```
pub fn compute_bounds(nodes: &[PositionedNode], config: &RadiusConfig) -> Bounds {
    padded_bounds(nodes.iter().map(PositionedNode::position), config.main())
}

pub(crate) fn padded_bounds(points: impl IntoIterator<Item = Point>, padding: f32) -> Bounds {
    points
        .into_iter()
        .fold(Bounds::empty(), |bounds, point| {
            bounds.merge(&Bounds::around(point, padding))
        })
}
