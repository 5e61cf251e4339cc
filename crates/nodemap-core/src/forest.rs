//! The node map data model: a forest of ordered trees.
//!
//! A [`Node`] carries two kinds of data. The presentation payload (`id`,
//! `title`, `role`, `description`, `children`) is owned by the surrounding
//! application and is what gets persisted. The [`NodeLayout`] annotations are
//! computed by the layout engine on every pass and are never serialised.
//!
//! A forest is simply a slice of root nodes; there is no synthetic root.

use std::fmt::Write;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::{geometry::Point, identifier::NodeId};

/// Memoised subtree height, valid for one `(detail_level, child_count)` key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightCache {
    pub detail_level: usize,
    pub child_count: usize,
    pub subtree_height: f32,
}

/// Layout-computed annotations of a node.
///
/// Only the layout engine writes these fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeLayout {
    /// Target position assigned by the latest layout pass.
    pub position: Point,
    /// Depth in the forest, 0 for roots.
    pub depth: usize,
    /// Id of the owning node, `None` for roots. Non-owning.
    pub parent: Option<NodeId>,
    /// Vertical space the visible subtree occupies.
    pub subtree_height: f32,
    pub height_cache: Option<HeightCache>,
}

/// A tree element of the node map.
///
/// # Examples
///
/// ```
/// use nodemap_core::forest::Node;
///
/// let root = Node::new("a", "Main A")
///     .with_role("human")
///     .with_children(vec![Node::new("a1", "Child")]);
///
/// assert_eq!(root.children().len(), 1);
/// assert_eq!(root.children()[0].id(), "a1");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    role: String,
    #[serde(default, alias = "desc")]
    description: String,
    #[serde(default)]
    children: Vec<Node>,
    #[serde(skip)]
    layout: NodeLayout,
}

impl Node {
    /// Creates a leaf node with an empty role and description.
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            role: String::new(),
            description: String::new(),
            children: Vec::new(),
            layout: NodeLayout::default(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.role = role.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Children in sibling order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Layout annotations from the latest layout pass.
    pub fn layout(&self) -> &NodeLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut NodeLayout {
        &mut self.layout
    }

    /// Height of this node's subtree in levels: 0 for a leaf.
    pub fn tree_depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.tree_depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Deepest level present in the forest: 0 for an empty forest or a forest
/// of leaf roots.
pub fn max_depth(forest: &[Node]) -> usize {
    forest.iter().map(Node::tree_depth).max().unwrap_or(0)
}

/// Finds a node anywhere in the forest.
pub fn find(forest: &[Node], id: NodeId) -> Option<&Node> {
    iter(forest).map(|(_, node)| node).find(|node| node.id == id)
}

/// Finds a node anywhere in the forest, mutably.
pub fn find_mut(forest: &mut [Node], id: NodeId) -> Option<&mut Node> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Detaches the node with `id` together with its subtree.
pub fn remove(forest: &mut Vec<Node>, id: NodeId) -> Option<Node> {
    if let Some(idx) = forest.iter().position(|node| node.id == id) {
        trace!(id:% = id, idx; "Removing node from sibling list");
        return Some(forest.remove(idx));
    }
    forest
        .iter_mut()
        .find_map(|node| remove(&mut node.children, id))
}

/// Number of nodes in the forest.
pub fn count(forest: &[Node]) -> usize {
    iter(forest).count()
}

/// Pre-order traversal yielding `(depth, node)`, roots in input order.
pub fn iter(forest: &[Node]) -> Iter<'_> {
    Iter {
        stack: forest.iter().rev().map(|node| (0, node)).collect(),
    }
}

/// Iterator returned by [`iter`].
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// Renders the forest as an indented plain-text outline.
///
/// Each node becomes `- [id] title (role): description`, indented by two
/// spaces per level.
///
/// # Examples
///
/// ```
/// use nodemap_core::forest::{Node, to_outline};
///
/// let forest = vec![
///     Node::new("a", "Main").with_role("human").with_children(vec![
///         Node::new("a1", "Child").with_role("ai").with_description("does things"),
///     ]),
/// ];
///
/// assert_eq!(
///     to_outline(&forest),
///     "- [a] Main (human): \n  - [a1] Child (ai): does things\n"
/// );
/// ```
pub fn to_outline(forest: &[Node]) -> String {
    let mut text = String::new();
    for (depth, node) in iter(forest) {
        let _ = writeln!(
            text,
            "{}- [{}] {} ({}): {}",
            "  ".repeat(depth),
            node.id,
            node.title,
            node.role,
            node.description
        );
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Node> {
        vec![
            Node::new("fa", "A").with_children(vec![
                Node::new("fa1", "A1").with_children(vec![Node::new("fa11", "A11")]),
                Node::new("fa2", "A2"),
            ]),
            Node::new("fb", "B"),
        ]
    }

    #[test]
    fn test_max_depth() {
        assert_eq!(max_depth(&[]), 0);
        assert_eq!(max_depth(&[Node::new("solo", "Solo")]), 0);
        assert_eq!(max_depth(&sample()), 2);
    }

    #[test]
    fn test_iter_is_preorder() {
        let forest = sample();
        let order: Vec<_> = iter(&forest)
            .map(|(depth, node)| (depth, node.id().to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "fa".to_string()),
                (1, "fa1".to_string()),
                (2, "fa11".to_string()),
                (1, "fa2".to_string()),
                (0, "fb".to_string()),
            ]
        );
    }

    #[test]
    fn test_find_and_find_mut() {
        let mut forest = sample();
        assert_eq!(find(&forest, NodeId::new("fa11")).unwrap().title(), "A11");
        assert!(find(&forest, NodeId::new("missing")).is_none());

        find_mut(&mut forest, NodeId::new("fa2"))
            .unwrap()
            .set_title("Renamed");
        assert_eq!(find(&forest, NodeId::new("fa2")).unwrap().title(), "Renamed");
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut forest = sample();
        let removed = remove(&mut forest, NodeId::new("fa1")).unwrap();

        assert_eq!(removed.children().len(), 1);
        assert_eq!(count(&forest), 3);
        assert!(find(&forest, NodeId::new("fa11")).is_none());
        assert!(remove(&mut forest, NodeId::new("fa1")).is_none());
    }

    #[test]
    fn test_remove_root() {
        let mut forest = sample();
        remove(&mut forest, NodeId::new("fb")).unwrap();
        assert_eq!(forest.len(), 1);
    }

    #[test]
    fn test_serialization_omits_layout_fields() {
        let mut node = Node::new("ser", "Title").with_role("human");
        node.layout_mut().position = Point::new(10.0, 20.0);
        node.layout_mut().depth = 3;

        let value = serde_json::to_value(&node).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(value["id"], "ser");
        assert_eq!(value["children"], serde_json::json!([]));
    }

    #[test]
    fn test_deserialize_accepts_desc_alias_and_missing_fields() {
        let forest: Vec<Node> = serde_json::from_str(
            r#"[{"id": "d1", "title": "T", "desc": "legacy", "children": [{"id": "d2"}]}]"#,
        )
        .unwrap();

        assert_eq!(forest[0].description(), "legacy");
        assert_eq!(forest[0].children()[0].title(), "");
        assert_eq!(forest[0].layout(), &NodeLayout::default());
    }
}
