//! Builds the display list for one frame.
//!
//! [`draw`] is a pure function of its [`Frame`]: the same frame always gives
//! the same [`Scene`]. All geometry except the tooltip is in graph
//! coordinates with stroke widths already divided by the zoom, so the painter
//! only has to apply [`Scene::transform`] and replay.

use crate::graph::{EdgeKind, GraphModel, NodeId};
use crate::interaction::{HoverState, Tooltip, ViewTransform};
use crate::layout::NodeLayout;
use crate::overlay::{LegendEntry, RenderHints, StrokeEmphasis};

/// Canvas fill.
pub const BACKGROUND: &str = "#1a1a2e";

/// Everything one frame depends on.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
	/// The graph being drawn.
	pub graph: &'a GraphModel,
	/// Layout entries, in graph node order.
	pub layout: &'a [NodeLayout],
	/// Styling from the active lens.
	pub hints: &'a RenderHints,
	/// Selected node.
	pub selection: Option<&'a NodeId>,
	/// Hover target and fade.
	pub hover: &'a HoverState,
	/// Tooltip for the hovered node.
	pub tooltip: Option<&'a Tooltip>,
	/// Pan and zoom.
	pub transform: ViewTransform,
	/// Canvas width in screen pixels.
	pub width: f64,
	/// Canvas height in screen pixels.
	pub height: f64,
	/// Seconds since the view started; drives the dash flow on emphasized edges.
	pub time: f64,
	/// A load is in flight.
	pub loading: bool,
	/// Provenance or failure banner.
	pub banner: Option<&'a str>,
}

/// Line dash pattern, in screen pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Dash {
	/// Dash length.
	pub dash: f64,
	/// Gap length.
	pub gap: f64,
	/// Advances over time so dashes flow along the edge.
	pub offset: f64,
}

/// A straight edge, trimmed at both node rims. Graph coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeShape {
	/// Start, at the source rim.
	pub from: (f64, f64),
	/// End, at the target rim.
	pub to: (f64, f64),
	/// CSS colour.
	pub color: String,
	/// Stroke width.
	pub width: f64,
	/// `0.0..=1.0`.
	pub opacity: f64,
	/// Dash pattern for emphasized edges.
	pub dash: Option<Dash>,
	/// Arrowhead triangle: tip, then the two back corners.
	pub arrow: Option<[(f64, f64); 3]>,
	/// Text and its midpoint position.
	pub label: Option<(String, (f64, f64))>,
}

/// Soft halo behind a highlighted node.
#[derive(Clone, Debug, PartialEq)]
pub struct Glow {
	/// Halo radius.
	pub radius: f64,
	/// Halo opacity.
	pub alpha: f64,
}

/// Node rim.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
	/// CSS colour.
	pub color: String,
	/// Line width.
	pub width: f64,
}

/// A node disc in graph coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeShape {
	/// Index of the node in the graph.
	pub index: usize,
	/// Centre in graph units.
	pub center: (f64, f64),
	/// Radius in graph units.
	pub radius: f64,
	/// CSS colour.
	pub fill: String,
	/// `0.0..=1.0`.
	pub opacity: f64,
	/// Rim, if any.
	pub stroke: Option<Stroke>,
	/// Halo, if any.
	pub glow: Option<Glow>,
	/// Selection ring radius and width.
	pub ring: Option<(f64, f64)>,
}

/// A node label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelShape {
	/// Label text.
	pub text: String,
	/// Text anchor in graph units.
	pub position: (f64, f64),
	/// Font size in graph units.
	pub size: f64,
	/// `0.0..=1.0`.
	pub opacity: f64,
}

/// Tooltip box, in screen coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipShape {
	/// Top-left corner.
	pub anchor: (f64, f64),
	/// Bold first line.
	pub title: String,
	/// Second line.
	pub subtitle: String,
	/// Remaining lines.
	pub lines: Vec<String>,
}

/// Display list for one frame, painted back to front.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
	/// Canvas fill.
	pub background: &'static str,
	/// Applied to edges, nodes and labels; the overlays stay in screen space.
	pub transform: ViewTransform,
	/// Edge shapes.
	pub edges: Vec<EdgeShape>,
	/// In paint order.
	pub nodes: Vec<NodeShape>,
	/// Node labels.
	pub labels: Vec<LabelShape>,
	/// Tooltip, in screen space.
	pub tooltip: Option<TooltipShape>,
	/// Legend, in screen space.
	pub legend: Vec<LegendEntry>,
	/// Centered message instead of a graph (loading, empty).
	pub message: Option<String>,
	/// Provenance or failure text along the top.
	pub banner: Option<String>,
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

struct Visual {
	radius: f64,
	opacity: f64,
	glow: Option<Glow>,
	hover_rank: u8,
}

/// Builds the display list for `frame`. Pure; the same frame gives the same scene.
pub fn draw(frame: &Frame<'_>) -> Scene {
	let k = frame.transform.k;
	let t = ease_out_cubic(frame.hover.highlight_t);
	let hover = frame.hover;
	let active = hover.has_active_highlight();

	let visuals: Vec<Visual> = frame
		.layout
		.iter()
		.enumerate()
		.map(|(i, body)| {
			let (scale, opacity) = frame.hints.node(i).map_or((1.0, 1.0), |h| (h.radius_scale, h.opacity));
			let base = body.radius * scale;
			if !active {
				return Visual {
					radius: base,
					opacity,
					glow: None,
					hover_rank: 0,
				};
			}
			let lifted = opacity + (1.0 - opacity) * t;
			if hover.is_hovered(i) {
				Visual {
					radius: base * (1.0 + 0.35 * t),
					opacity: lifted,
					glow: (t > 0.01).then(|| Glow {
						radius: base * (1.8 + 1.2 * t),
						alpha: 0.35 * t,
					}),
					hover_rank: 2,
				}
			} else if hover.is_neighbor(i) {
				Visual {
					radius: base * (1.0 + 0.2 * t),
					opacity: lifted,
					glow: (t > 0.01).then(|| Glow {
						radius: base * (1.4 + 0.6 * t),
						alpha: 0.2 * t,
					}),
					hover_rank: 1,
				}
			} else {
				Visual {
					radius: base * (1.0 - 0.15 * t),
					opacity: opacity * (1.0 - 0.7 * t),
					glow: None,
					hover_rank: 0,
				}
			}
		})
		.collect();

	let edges = draw_edges(frame, &visuals, t, active);

	let mut order: Vec<usize> = (0..frame.layout.len()).collect();
	order.sort_by_key(|&i| {
		let z = frame.hints.node(i).map_or(0, |h| h.z_order);
		(visuals[i].hover_rank, z, i)
	});

	let selected = frame.selection.map(NodeId::as_str);
	let mut nodes = Vec::with_capacity(order.len());
	let mut labels = Vec::new();
	for i in order {
		let body = &frame.layout[i];
		let visual = &visuals[i];
		let hint = frame.hints.node(i);
		let fill = hint.map_or_else(|| "#7f7f7f".to_string(), |h| h.fill.clone());
		let mut stroke = match hint.map_or(StrokeEmphasis::None, |h| h.stroke) {
			StrokeEmphasis::None => None,
			StrokeEmphasis::Outline => Some(Stroke {
				color: "rgba(255, 255, 255, 0.8)".into(),
				width: 1.5 / k,
			}),
			StrokeEmphasis::Strong => Some(Stroke {
				color: "#ffffff".into(),
				width: 2.5 / k,
			}),
		};
		if stroke.is_none() && visual.hover_rank == 2 && t > 0.01 {
			stroke = Some(Stroke {
				color: format!("rgba(255, 255, 255, {})", 0.7 * t),
				width: 1.5 / k,
			});
		}
		let is_selected = selected == Some(body.id.as_str());
		nodes.push(NodeShape {
			index: i,
			center: (body.x, body.y),
			radius: visual.radius,
			fill,
			opacity: visual.opacity,
			stroke,
			glow: visual.glow.clone(),
			ring: is_selected.then(|| (visual.radius + 4.0 / k, 2.0 / k)),
		});

		let show = hint.is_some_and(|h| h.show_label) || visual.hover_rank > 0 || is_selected;
		if let (true, Some(node)) = (show, frame.graph.nodes().get(i)) {
			let opacity = if visual.hover_rank > 0 || is_selected {
				1.0
			} else {
				visual.opacity * 0.8
			};
			labels.push(LabelShape {
				text: node.display.label.clone(),
				position: (body.x + visual.radius + 3.0 / k, body.y + 3.0 / k),
				size: 10.0 / k.max(0.5),
				opacity,
			});
		}
	}

	let tooltip = frame.tooltip.and_then(|tip| {
		let body = frame.layout.iter().find(|b| b.id == tip.node)?;
		let (sx, sy) = frame.transform.graph_to_screen(body.x, body.y);
		Some(TooltipShape {
			anchor: (sx + 12.0, sy + 12.0),
			title: tip.title.clone(),
			subtitle: tip.subtitle.clone(),
			lines: tip.lines.clone(),
		})
	});

	let message = frame.layout.is_empty().then(|| {
		if frame.loading {
			"Loading network...".to_string()
		} else {
			"No connections to show yet".to_string()
		}
	});

	Scene {
		width: frame.width,
		height: frame.height,
		background: BACKGROUND,
		transform: frame.transform,
		edges,
		nodes,
		labels,
		tooltip,
		legend: frame.hints.legend.clone(),
		message,
		banner: frame.banner.map(String::from),
	}
}

fn draw_edges(frame: &Frame<'_>, visuals: &[Visual], t: f64, active: bool) -> Vec<EdgeShape> {
	let k = frame.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(frame.time * 30.0) % (dash + gap);

	let mut edges: Vec<(bool, EdgeShape)> = Vec::with_capacity(frame.graph.edge_count());
	for (e, ((s, tg), edge)) in frame
		.graph
		.edge_endpoints()
		.into_iter()
		.zip(frame.graph.edges())
		.enumerate()
	{
		let (Some(a), Some(b)) = (frame.layout.get(s), frame.layout.get(tg)) else {
			continue;
		};
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		let arrow = if matches!(edge.kind, EdgeKind::Collaborates) {
			0.0
		} else {
			arrow_size
		};
		let (rs, rt) = (visuals[s].radius, visuals[tg].radius);
		if dist < 0.001 || dist <= rs + rt + arrow {
			continue;
		}
		let Some(hint) = frame.hints.edge(e) else {
			continue;
		};

		let mut opacity = hint.opacity;
		let mut width = line_width * hint.width_scale;
		if active {
			if frame.hover.is_highlighted(s) && frame.hover.is_highlighted(tg) {
				opacity += (0.9 - opacity).max(0.0) * t;
				width *= 1.0 + 0.3 * t;
			} else {
				opacity *= 1.0 - 0.75 * t;
				width *= 1.0 - 0.3 * t;
			}
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let tip = (b.x - ux * rt, b.y - uy * rt);
		let head = (arrow > 0.0).then(|| {
			let back = (tip.0 - ux * arrow, tip.1 - uy * arrow);
			let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);
			[tip, (back.0 + px, back.1 + py), (back.0 - px, back.1 - py)]
		});
		edges.push((
			hint.emphasized,
			EdgeShape {
				from: (a.x + ux * rs, a.y + uy * rs),
				to: (tip.0 - ux * arrow, tip.1 - uy * arrow),
				color: hint.color.clone(),
				width,
				opacity,
				dash: hint.emphasized.then(|| Dash {
					dash,
					gap,
					offset: dash_offset,
				}),
				arrow: head,
				label: hint
					.label
					.clone()
					.map(|text| (text, ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0))),
			},
		));
	}
	// Emphasized edges paint over ordinary ones.
	edges.sort_by_key(|(emphasized, _)| *emphasized);
	edges.into_iter().map(|(_, shape)| shape).collect()
}
