use super::palette;
use super::result::Lens;
use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::graph::{GraphModel, NodeRole};

/// Rim drawn around a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeEmphasis {
	/// No rim.
	#[default]
	None,
	/// Thin rim.
	Outline,
	/// Thick rim in the highlight colour.
	Strong,
}

/// Styling for one node, in graph node order.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeHint {
	/// CSS colour.
	pub fill: String,
	/// Multiplier on the node's base radius.
	pub radius_scale: f64,
	/// Rim emphasis.
	pub stroke: StrokeEmphasis,
	/// Whether the scene draws the label.
	pub show_label: bool,
	/// `0.0..=1.0`.
	pub opacity: f64,
	/// Higher draws later.
	pub z_order: i32,
	/// Whether the active lens singles this node out.
	pub highlighted: bool,
	/// Extra tooltip line from the lens.
	pub annotation: Option<String>,
}

/// Styling for one edge, in graph edge order.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeHint {
	/// CSS colour.
	pub color: String,
	/// Multiplier on the base stroke width.
	pub width_scale: f64,
	/// Drawn on top and pulled tighter by the layout.
	pub emphasized: bool,
	/// `0.0..=1.0`.
	pub opacity: f64,
	/// Drawn at the edge midpoint.
	pub label: Option<String>,
}

/// One swatch in the legend.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
	/// CSS colour.
	pub color: String,
	/// Legend text.
	pub label: String,
}

impl LegendEntry {
	/// Entry with `color` and `label`.
	pub fn new(color: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			color: color.into(),
			label: label.into(),
		}
	}
}

/// Everything the scene needs to style a graph under one lens.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderHints {
	/// Lens these hints were built for.
	pub lens: Lens,
	/// One per graph node.
	pub nodes: Vec<NodeHint>,
	/// One per graph edge.
	pub edges: Vec<EdgeHint>,
	/// Swatches explaining the colours.
	pub legend: Vec<LegendEntry>,
	/// Problems recovered while applying the result.
	pub notices: Vec<OverlayError>,
}

impl RenderHints {
	/// Plain styling by node kind and role, no lens.
	pub fn base(graph: &GraphModel, config: &OverlayConfig) -> Self {
		let label_all = graph.node_count() <= config.label_all_below;
		let nodes = graph
			.nodes()
			.iter()
			.map(|node| {
				let primary = node.role == NodeRole::Primary;
				NodeHint {
					fill: palette::node_color(node.kind, node.role).to_string(),
					radius_scale: if primary { 1.4 } else { 1.0 },
					stroke: if primary {
						StrokeEmphasis::Outline
					} else {
						StrokeEmphasis::None
					},
					show_label: label_all || primary,
					opacity: 1.0,
					z_order: match node.role {
						NodeRole::Primary => 2,
						NodeRole::Member => 1,
						NodeRole::Neutral => 0,
					},
					highlighted: false,
					annotation: None,
				}
			})
			.collect();
		let edges = graph
			.edges()
			.iter()
			.map(|edge| EdgeHint {
				color: palette::edge_color(edge.kind).to_string(),
				width_scale: 1.0,
				emphasized: false,
				opacity: 0.6,
				label: None,
			})
			.collect();
		Self {
			lens: Lens::Plain,
			nodes,
			edges,
			legend: vec![
				LegendEntry::new(palette::PRIMARY, "Viewed account"),
				LegendEntry::new(palette::USER, "User"),
				LegendEntry::new(palette::REPOSITORY, "Repository"),
			],
			notices: Vec::new(),
		}
	}

	/// Hint for node `idx`.
	pub fn node(&self, idx: usize) -> Option<&NodeHint> {
		self.nodes.get(idx)
	}

	/// Hint for edge `idx`.
	pub fn edge(&self, idx: usize) -> Option<&EdgeHint> {
		self.edges.get(idx)
	}

	/// Indices of nodes the lens highlights.
	pub fn highlighted_nodes(&self) -> Vec<usize> {
		self.nodes
			.iter()
			.enumerate()
			.filter_map(|(i, h)| h.highlighted.then_some(i))
			.collect()
	}

	/// Indices of edges the lens emphasizes.
	pub fn emphasized_edges(&self) -> Vec<usize> {
		self.edges
			.iter()
			.enumerate()
			.filter_map(|(i, h)| h.emphasized.then_some(i))
			.collect()
	}

	pub(crate) fn dim_unhighlighted(&mut self, opacity: f64) {
		for hint in self.nodes.iter_mut().filter(|h| !h.highlighted) {
			hint.opacity = opacity;
			hint.show_label = false;
		}
	}
}
