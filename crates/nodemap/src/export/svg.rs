//! SVG export backend.

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, error, info};
use svg::{Document, node::element as svg_element};

use nodemap_core::geometry::Point;

use super::{Error, Exporter, Snapshot};
use crate::scene::SceneNode;

/// Shown in place of an empty title so the label keeps a width.
const EMPTY_TITLE: &str = "\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}\u{a0}";

/// Colors and fonts of an SVG snapshot.
#[derive(Debug, Clone)]
pub struct SvgStyle {
    background: String,
    link_stroke: String,
    label_color: String,
    font_family: String,
    font_size: f32,
    human_fill: String,
    ai_fill: String,
    hybrid_fill: String,
    default_fill: String,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
            link_stroke: "#9a9a9a".to_string(),
            label_color: "#222222".to_string(),
            font_family: "sans-serif".to_string(),
            font_size: 14.0,
            human_fill: "#4e79a7".to_string(),
            ai_fill: "#f28e2b".to_string(),
            hybrid_fill: "#59a14f".to_string(),
            default_fill: "#bab0ac".to_string(),
        }
    }
}

impl SvgStyle {
    /// Fill color for a node role.
    pub fn fill_for_role(&self, role: &str) -> &str {
        match role {
            "human" => &self.human_fill,
            "ai" => &self.ai_fill,
            "hybrid" => &self.hybrid_fill,
            _ => &self.default_fill,
        }
    }
}

/// Renders [`Snapshot`]s to SVG documents and writes them to a file.
#[derive(Debug, Clone)]
pub struct SvgExporter {
    file_name: PathBuf,
    style: SvgStyle,
}

impl SvgExporter {
    pub fn new(file_name: impl AsRef<Path>) -> Self {
        Self {
            file_name: file_name.as_ref().to_path_buf(),
            style: SvgStyle::default(),
        }
    }

    /// Renders a snapshot to an SVG document.
    pub fn render_document(&self, snapshot: &Snapshot<'_>) -> Document {
        render_document(snapshot, &self.style)
    }

    /// Writes an SVG document to the exporter's file.
    pub fn write_document(&self, doc: &Document) -> Result<(), Error> {
        let file_name = self.file_name.display().to_string();
        info!(file_name; "Creating SVG file");

        let mut file = File::create(&self.file_name).map_err(|err| {
            error!(file_name, err:err; "Failed to create SVG file");
            Error::Io(err)
        })?;

        write!(file, "{doc}").map_err(|err| {
            error!(file_name, err:err; "Failed to write SVG content");
            Error::Io(err)
        })
    }
}

impl Exporter for SvgExporter {
    fn export_snapshot(&mut self, snapshot: &Snapshot<'_>) -> Result<(), Error> {
        let doc = self.render_document(snapshot);
        debug!("SVG document rendered");
        self.write_document(&doc)
    }
}

/// Renders a snapshot with the given style.
///
/// The document has the snapshot's viewport size. Connectors are lines
/// between displayed positions; nodes are circles of their rendered radius
/// with the title below. Titles of nodes deeper than the detail level are
/// present but fully transparent.
pub fn render_document(snapshot: &Snapshot<'_>, style: &SvgStyle) -> Document {
    let size = snapshot.size();
    let transform = snapshot.transform();
    let scene = snapshot.scene();

    let doc = Document::new()
        .set("viewBox", format!("0 0 {} {}", size.width(), size.height()))
        .set("width", size.width())
        .set("height", size.height())
        .add(
            svg_element::Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", style.background.as_str()),
        );

    let links = scene
        .connectors()
        .filter_map(|connector| scene.connector_segment(connector))
        .fold(
            svg_element::Group::new().set("class", "links"),
            |group, (from, to)| group.add(render_link(from, to, style)),
        );

    let nodes = scene.iter().fold(
        svg_element::Group::new().set("class", "nodes"),
        |group, node| group.add(render_node(node, snapshot.detail_level(), style)),
    );

    let translate = transform.translate();
    let main_group = svg_element::Group::new()
        .set(
            "transform",
            format!(
                "translate({}, {}) scale({})",
                translate.x(),
                translate.y(),
                transform.scale()
            ),
        )
        .add(links)
        .add(nodes);

    debug!(
        nodes_len = scene.len(),
        width = size.width(),
        height = size.height();
        "Rendered SVG snapshot"
    );

    doc.add(main_group)
}

fn render_link(from: Point, to: Point, style: &SvgStyle) -> svg_element::Line {
    svg_element::Line::new()
        .set("class", "link")
        .set("x1", from.x())
        .set("y1", from.y())
        .set("x2", to.x())
        .set("y2", to.y())
        .set("stroke", style.link_stroke.as_str())
        .set("stroke-width", 1.5)
}

fn render_node(node: &SceneNode, detail_level: usize, style: &SvgStyle) -> svg_element::Group {
    let display = node.display();
    let depth = node.target().depth;
    let position = display.position;

    let circle = svg_element::Circle::new()
        .set("r", display.radius)
        .set("fill", style.fill_for_role(node.role()));

    let title = node.title().trim();
    let label = svg_element::Text::new(if title.is_empty() { EMPTY_TITLE } else { title })
        .set("dy", label_offset(depth))
        .set("text-anchor", "middle")
        .set("font-family", style.font_family.as_str())
        .set("font-size", style.font_size)
        .set("fill", style.label_color.as_str())
        .set("opacity", if depth <= detail_level { 1 } else { 0 });

    svg_element::Group::new()
        .set("class", format!("node {}", node.role()))
        .set("id", node.id().to_string())
        .set(
            "transform",
            format!("translate({}, {})", position.x(), position.y()),
        )
        .add(circle)
        .add(label)
}

/// Vertical label offset below a node center: the tier radius plus a gap.
fn label_offset(depth: usize) -> f32 {
    match depth {
        0 => 70.0,
        1 => 40.0,
        _ => 30.0,
    }
}
