//! Drawing the mention graph onto an explicit [`Canvas`].
//!
//! Marker sizes are areas in square points, so a marker of size `s` is
//! drawn as a circle of diameter `sqrt(s)`.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::error::{NetworkError, Result};
use crate::graph_builder::MentionGraph;
use crate::layout::{spring_layout, Layout, Position};
use crate::node_identification::{degrees, get_hub_nodes, Hub};

pub const NODE_COLOR: &str = "#1f78b4";
pub const HUB_COLOR: &str = "#0000ff";
pub const LABEL_COLOR: &str = "#000000";
const EDGE_COLOR: &str = "#000000";

const FIXED_NODE_SIZE: f64 = 50.0;
const DEGREE_NODE_SCALE: f64 = 5.0;
const HUB_NODE_SCALE: f64 = 20.0;
const NODE_ALPHA: f64 = 0.5;
const LABEL_FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub color: &'static str,
    pub alpha: f64,
}

/// A render target. Coordinates are layout coordinates in `[-1, 1]`.
pub trait Canvas {
    fn edge(&mut self, from: Position, to: Position, arrow: bool);
    fn marker(&mut self, at: Position, size: f64, style: MarkerStyle);
    fn label(&mut self, at: Position, text: &str, font_size: f64, color: &str);
}

/// One node as drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub position: Position,
    pub size: f64,
}

/// What [`draw_di_graph`] drew, for composing overlays on the same canvas.
#[derive(Debug, Clone)]
pub struct Drawing {
    pub layout: Layout,
    pub markers: Vec<Marker>,
}

/// Draws every edge and node of `graph` onto `canvas`.
///
/// Uses `positions` when given, otherwise computes a spring layout. With
/// `scale_by_degree` each node's size is `5 × degree` and edges have no
/// arrowheads; otherwise every node has size 50.
pub fn draw_di_graph<C: Canvas>(
    graph: &MentionGraph,
    canvas: &mut C,
    positions: Option<Layout>,
    scale_by_degree: bool,
    layout_config: &LayoutConfig,
) -> Result<Drawing> {
    if graph.node_count() == 0 {
        return Err(NetworkError::InvalidArgument(
            "graph has no nodes".to_string(),
        ));
    }
    let layout = match positions {
        Some(layout) => layout,
        None => spring_layout(graph, layout_config)?,
    };

    let g = &graph.graph;
    for edge in g.edge_indices() {
        if let Some((s, t)) = g.edge_endpoints(edge) {
            let from = position_of(&layout, &g[s])?;
            let to = position_of(&layout, &g[t])?;
            canvas.edge(from, to, !scale_by_degree);
        }
    }

    let style = MarkerStyle {
        color: NODE_COLOR,
        alpha: NODE_ALPHA,
    };
    let mut markers = Vec::with_capacity(graph.node_count());
    for Hub { id, degree } in degrees(graph) {
        let size = if scale_by_degree {
            DEGREE_NODE_SCALE * degree as f64
        } else {
            FIXED_NODE_SIZE
        };
        let position = position_of(&layout, &id)?;
        canvas.marker(position, size, style);
        markers.push(Marker { id, position, size });
    }

    debug!(nodes = markers.len(), scale_by_degree, "graph drawn");
    Ok(Drawing { layout, markers })
}

/// Overlays the `top_n_hubs` hubs: a blue marker of size `20 × degree` and a
/// label with the user's id, at the same positions as the base drawing.
pub fn highlight_important_nodes<C: Canvas>(
    graph: &MentionGraph,
    canvas: &mut C,
    layout: &Layout,
    top_n_hubs: usize,
) -> Result<Vec<Hub>> {
    if graph.node_count() == 0 {
        return Err(NetworkError::InvalidArgument(
            "graph has no nodes".to_string(),
        ));
    }

    let hubs = get_hub_nodes(graph, top_n_hubs);
    let style = MarkerStyle {
        color: HUB_COLOR,
        alpha: 1.0,
    };
    for hub in &hubs {
        let position = position_of(layout, &hub.id)?;
        canvas.marker(position, HUB_NODE_SCALE * hub.degree as f64, style);
        canvas.label(position, &hub.id, LABEL_FONT_SIZE, LABEL_COLOR);
    }
    Ok(hubs)
}

fn position_of(layout: &Layout, id: &str) -> Result<Position> {
    layout
        .get(id)
        .ok_or_else(|| NetworkError::InvalidArgument(format!("no position for node {id}")))
}

/// Writes the graph as Graphviz DOT with `hubs` labelled and enlarged.
pub fn export_to_graphviz(graph: &MentionGraph, hubs: &[Hub], path: &Path) -> Result<()> {
    let hub_degree: HashMap<&str, usize> =
        hubs.iter().map(|h| (h.id.as_str(), h.degree)).collect();

    let node_attrs = |_: &DiGraph<String, ()>, (_, id): (NodeIndex, &String)| -> String {
        match hub_degree.get(id.as_str()) {
            Some(&degree) => format!(
                "label=\"{}\" style=filled fillcolor=\"{HUB_COLOR}\" fontcolor=white width={:.2}",
                id.replace('"', "\\\""),
                points_to_inches(HUB_NODE_SCALE * degree as f64)
            ),
            None => "label=\"\" shape=point".to_string(),
        }
    };

    let viz = Dot::with_attr_getters(
        &graph.graph,
        &[Config::EdgeNoLabel, Config::NodeNoLabel],
        &|_, _| "arrowsize=0.5".to_string(),
        &node_attrs,
    );

    fs::write(path, format!("{:?}", viz)).map_err(|e| NetworkError::io(path, e))?;
    info!(path = %path.display(), "wrote DOT graph");
    Ok(())
}

fn points_to_inches(size: f64) -> f64 {
    size.sqrt() / 72.0
}

/// Canvas that accumulates SVG elements.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    margin: f64,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: 0.05 * width.min(height),
            body: String::new(),
        }
    }

    fn to_pixels(&self, p: Position) -> (f64, f64) {
        let half_w = (self.width - 2.0 * self.margin) / 2.0;
        let half_h = (self.height - 2.0 * self.margin) / 2.0;
        // SVG y grows downwards
        (
            self.margin + half_w * (p.x + 1.0),
            self.margin + half_h * (1.0 - p.y),
        )
    }

    pub fn finish(&self) -> String {
        format!(
            concat!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
                "<defs><marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" ",
                "markerWidth=\"6\" markerHeight=\"6\" orient=\"auto\">",
                "<path d=\"M 0 0 L 10 5 L 0 10 z\"/></marker></defs>\n",
                "<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n",
                "{body}</svg>\n"
            ),
            w = self.width,
            h = self.height,
            body = self.body
        )
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.finish()).map_err(|e| NetworkError::io(path, e))?;
        info!(path = %path.display(), "wrote SVG drawing");
        Ok(())
    }
}

impl Canvas for SvgCanvas {
    fn edge(&mut self, from: Position, to: Position, arrow: bool) {
        let (x1, y1) = self.to_pixels(from);
        let (x2, y2) = self.to_pixels(to);
        let head = if arrow { " marker-end=\"url(#arrow)\"" } else { "" };
        let _ = writeln!(
            self.body,
            "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{EDGE_COLOR}\" stroke-width=\"1\"{head}/>"
        );
    }

    fn marker(&mut self, at: Position, size: f64, style: MarkerStyle) {
        let (cx, cy) = self.to_pixels(at);
        let r = size.max(0.0).sqrt() / 2.0;
        let _ = writeln!(
            self.body,
            "<circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{}\" fill-opacity=\"{}\"/>",
            style.color, style.alpha
        );
    }

    fn label(&mut self, at: Position, text: &str, font_size: f64, color: &str) {
        let (x, y) = self.to_pixels(at);
        let _ = writeln!(
            self.body,
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{font_size}\" fill=\"{color}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
            escape_xml(text)
        );
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
