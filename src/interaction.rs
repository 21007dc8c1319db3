//! Pointer handling for one view: drag-to-pin, pan and zoom, hover with its
//! tooltip, and the single selection slot.
//!
//! All coordinates handed in are screen pixels relative to the canvas. Hit
//! testing inverts the pan/zoom transform first, so it works the same at any
//! zoom level.

use std::collections::HashSet;

use log::debug;

use crate::config::InteractionConfig;
use crate::error::SimulationError;
use crate::graph::{GraphModel, NodeId, NodeRole};
use crate::layout::LayoutEngine;
use crate::overlay::RenderHints;

/// Pan/zoom transform: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal offset in screen pixels.
	pub x: f64,
	/// Vertical offset in screen pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

impl ViewTransform {
	/// Screen pixels to graph units.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Graph units to screen pixels.
	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(gx * self.k + self.x, gy * self.k + self.y)
	}

	/// Scales by `factor` keeping the graph point under `(sx, sy)` fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, min: f64, max: f64) {
		let k = (self.k * factor).clamp(min, max);
		let ratio = k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = k;
	}
}

/// The pointer gesture in progress.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	/// No button held.
	#[default]
	Idle,
	/// A node is held and pinned under the pointer.
	Dragging {
		/// The node being dragged.
		node: NodeId,
		/// Pin state before the drag; restored on release.
		was_pinned: bool,
		/// Screen position of the press.
		origin: (f64, f64),
		/// Furthest screen distance from `origin` so far.
		travel: f64,
	},
	/// The background is held; the transform follows the pointer.
	Panning {
		/// Screen position of the press.
		origin: (f64, f64),
		/// Transform offset at the press.
		transform_origin: (f64, f64),
		/// Furthest screen distance from `origin` so far.
		travel: f64,
	},
}

/// What a pointer-up amounted to.
#[derive(Clone, Debug, PartialEq)]
pub enum PointerOutcome {
	/// Nothing was in progress.
	None,
	/// A click; `None` means empty canvas.
	Click(Option<NodeId>),
	/// A drag on this node ended.
	DragEnd(NodeId),
	/// A background pan ended.
	PanEnd,
}

/// Hovered node, its neighbours and the highlight fade.
///
/// When hover goes away the previous node and neighbours are kept until the
/// highlight has faded out, so the scene can animate it.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Index of the hovered node.
	pub node: Option<usize>,
	/// Indices of the hovered node's neighbours.
	pub neighbors: HashSet<usize>,
	/// Highlight strength, `0.0..=1.0`.
	pub highlight_t: f64,
	/// Last hovered node, kept while its highlight fades out.
	pub prev_node: Option<usize>,
	/// Neighbours of `prev_node`.
	pub prev_neighbors: HashSet<usize>,
	delay_t: f64,
}

impl HoverState {
	fn set(&mut self, node: Option<usize>, graph: &GraphModel) {
		if self.node == node {
			return;
		}
		let was_hovering = self.node.is_some();

		if was_hovering && node.is_none() {
			self.prev_node = self.node.take();
			self.prev_neighbors = std::mem::take(&mut self.neighbors);
		} else {
			self.prev_node = None;
			self.prev_neighbors.clear();
		}

		self.node = node;
		self.neighbors.clear();
		if let Some(idx) = node {
			if !was_hovering {
				self.delay_t = 0.0;
			}
			self.neighbors.extend(graph.neighbors(idx));
		}
	}

	/// Moves the fade along by `dt` seconds.
	pub fn advance(&mut self, dt: f64, config: &InteractionConfig) {
		if self.node.is_some() {
			self.delay_t = (self.delay_t + dt).min(config.hover_delay);
			if self.delay_t >= config.hover_delay {
				self.highlight_t += (1.0 - self.highlight_t) * config.hover_fade_in * dt;
			}
		} else {
			self.highlight_t -= self.highlight_t * config.hover_fade_out * dt;
			if self.highlight_t < 0.01 {
				self.highlight_t = 0.0;
				self.prev_node = None;
				self.prev_neighbors.clear();
			}
		}
		self.highlight_t = self.highlight_t.clamp(0.0, 1.0);
	}

	/// Hovered or adjacent to the hovered node.
	pub fn is_highlighted(&self, idx: usize) -> bool {
		self.node == Some(idx)
			|| self.neighbors.contains(&idx)
			|| self.prev_node == Some(idx)
			|| self.prev_neighbors.contains(&idx)
	}

	/// Whether `idx` is the hovered node.
	pub fn is_hovered(&self, idx: usize) -> bool {
		self.node == Some(idx) || self.prev_node == Some(idx)
	}

	/// Whether `idx` is adjacent to the hovered node.
	pub fn is_neighbor(&self, idx: usize) -> bool {
		self.neighbors.contains(&idx) || self.prev_neighbors.contains(&idx)
	}

	/// Whether anything should be drawn faded.
	pub fn has_active_highlight(&self) -> bool {
		self.node.is_some() || self.prev_node.is_some()
	}
}

/// Resolved tooltip content for the hovered node.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	/// The node the tooltip describes.
	pub node: NodeId,
	/// Display label.
	pub title: String,
	/// Kind and role, e.g. "User (viewed account)".
	pub subtitle: String,
	/// Metrics and the active lens annotation.
	pub lines: Vec<String>,
}

impl Tooltip {
	fn for_node(graph: &GraphModel, idx: usize, hints: &RenderHints) -> Option<Self> {
		let node = graph.nodes().get(idx)?;
		let display = &node.display;
		let subtitle = match node.role {
			NodeRole::Primary => format!("{} (viewed account)", node.kind.label()),
			_ => node.kind.label().to_string(),
		};

		let mut lines = Vec::new();
		if let Some(language) = &display.language {
			lines.push(format!("Language: {language}"));
		}
		let metrics = &display.metrics;
		for (name, value) in [
			("Followers", metrics.followers),
			("Following", metrics.following),
			("Public repos", metrics.public_repos),
			("Stars", metrics.stars),
			("Forks", metrics.forks),
		] {
			if let Some(value) = value {
				lines.push(format!("{name}: {value}"));
			}
		}
		if let Some(annotation) = hints.node(idx).and_then(|h| h.annotation.as_ref()) {
			lines.push(annotation.clone());
		}

		Some(Self {
			node: node.id.clone(),
			title: display.label.clone(),
			subtitle,
			lines,
		})
	}
}

/// Per-view interaction state. Owns the selection and tooltip slots; routes
/// pin requests to the view's [`LayoutEngine`].
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
	config: InteractionConfig,
	transform: ViewTransform,
	gesture: Gesture,
	selection: Option<NodeId>,
	hover: HoverState,
	tooltip: Option<Tooltip>,
}

impl InteractionController {
	/// An idle controller with the identity transform.
	pub fn new(config: InteractionConfig) -> Self {
		Self {
			config: config.sanitized(),
			..Self::default()
		}
	}

	/// Current pan and zoom.
	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	/// Replaces pan and zoom, e.g. to restore a saved view.
	pub fn set_transform(&mut self, transform: ViewTransform) {
		self.transform = transform;
	}

	/// The gesture in progress.
	pub fn gesture(&self) -> &Gesture {
		&self.gesture
	}

	/// Whether a node is held.
	pub fn is_dragging(&self) -> bool {
		matches!(self.gesture, Gesture::Dragging { .. })
	}

	/// The selected node, if any.
	pub fn selection(&self) -> Option<&NodeId> {
		self.selection.as_ref()
	}

	/// Hover target and fade.
	pub fn hover(&self) -> &HoverState {
		&self.hover
	}

	/// Tooltip for the hovered node.
	pub fn tooltip(&self) -> Option<&Tooltip> {
		self.tooltip.as_ref()
	}

	/// Nearest node under the screen point, if any is within reach. Reach is
	/// the drawn radius, but never less than the configured hit radius.
	pub fn node_at(&self, engine: &LayoutEngine, hints: &RenderHints, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		engine
			.nodes()
			.iter()
			.enumerate()
			.filter_map(|(i, body)| {
				let scale = hints.node(i).map_or(1.0, |h| h.radius_scale);
				let reach = (body.radius * scale).max(self.config.hit_radius);
				let d = ((body.x - gx).powi(2) + (body.y - gy).powi(2)).sqrt();
				(d <= reach).then_some((i, d))
			})
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}

	/// Starts a drag over a node, or a pan over empty canvas.
	pub fn on_pointer_down(
		&mut self,
		sx: f64,
		sy: f64,
		engine: &mut LayoutEngine,
		hints: &RenderHints,
	) -> Result<(), SimulationError> {
		self.cancel(engine)?;
		match self.node_at(engine, hints, sx, sy) {
			Some(i) => {
				let node = engine.nodes()[i].id.clone();
				let was_pinned = engine.is_pinned(node.as_str());
				let (gx, gy) = self.transform.screen_to_graph(sx, sy);
				let warm = engine.config().drag_alpha_target;
				engine.pin(node.as_str(), gx, gy)?;
				engine.set_alpha_target(warm)?;
				debug!("drag start on `{node}` (pinned before: {was_pinned})");
				self.gesture = Gesture::Dragging {
					node,
					was_pinned,
					origin: (sx, sy),
					travel: 0.0,
				};
			}
			None => {
				self.gesture = Gesture::Panning {
					origin: (sx, sy),
					transform_origin: (self.transform.x, self.transform.y),
					travel: 0.0,
				};
			}
		}
		Ok(())
	}

	/// Moves the dragged node or the pan; otherwise updates hover.
	pub fn on_pointer_move(
		&mut self,
		sx: f64,
		sy: f64,
		graph: &GraphModel,
		engine: &mut LayoutEngine,
		hints: &RenderHints,
	) -> Result<(), SimulationError> {
		let projected = self.transform.screen_to_graph(sx, sy);
		match &mut self.gesture {
			Gesture::Dragging {
				node,
				origin,
				travel,
				..
			} => {
				*travel = travel.max(distance(*origin, (sx, sy)));
				engine.pin(node.as_str(), projected.0, projected.1)?;
			}
			Gesture::Panning {
				origin,
				transform_origin,
				travel,
			} => {
				*travel = travel.max(distance(*origin, (sx, sy)));
				self.transform.x = transform_origin.0 + (sx - origin.0);
				self.transform.y = transform_origin.1 + (sy - origin.1);
			}
			Gesture::Idle => {
				let hovered = self.node_at(engine, hints, sx, sy);
				let id = hovered.and_then(|i| graph.nodes().get(i)).map(|n| n.id.clone());
				self.on_hover(id.as_ref().map(NodeId::as_str), graph, hints);
			}
		}
		Ok(())
	}

	/// Ends the gesture. Travel within the click threshold makes it a click.
	pub fn on_pointer_up(&mut self, engine: &mut LayoutEngine) -> Result<PointerOutcome, SimulationError> {
		match std::mem::take(&mut self.gesture) {
			Gesture::Idle => Ok(PointerOutcome::None),
			Gesture::Dragging {
				node,
				was_pinned,
				travel,
				..
			} => {
				release(engine, &node, was_pinned)?;
				if travel <= self.config.click_threshold {
					self.on_click(Some(node.clone()));
					Ok(PointerOutcome::Click(Some(node)))
				} else {
					Ok(PointerOutcome::DragEnd(node))
				}
			}
			Gesture::Panning { travel, .. } => {
				if travel <= self.config.click_threshold {
					self.on_click(None);
					Ok(PointerOutcome::Click(None))
				} else {
					Ok(PointerOutcome::PanEnd)
				}
			}
		}
	}

	/// Pointer left the canvas: the gesture is abandoned and hover cleared.
	pub fn on_pointer_leave(&mut self, graph: &GraphModel, engine: &mut LayoutEngine) -> Result<(), SimulationError> {
		self.cancel(engine)?;
		self.hover.set(None, graph);
		self.tooltip = None;
		Ok(())
	}

	/// Sets or clears the hovered node. At most one tooltip exists; it is
	/// replaced on every change and dropped when hover clears.
	pub fn on_hover(&mut self, node: Option<&str>, graph: &GraphModel, hints: &RenderHints) {
		let idx = node.and_then(|id| graph.index_of(id));
		self.hover.set(idx, graph);
		self.tooltip = idx.and_then(|i| Tooltip::for_node(graph, i, hints));
	}

	/// Replaces the selection; `None` (empty canvas) clears it.
	pub fn on_click(&mut self, node: Option<NodeId>) {
		if self.selection != node {
			debug!("selection: {:?} -> {:?}", self.selection, node);
		}
		self.selection = node;
	}

	/// Zooms about the pointer. Positive `delta_y` zooms out.
	pub fn on_wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.transform
			.zoom_at(sx, sy, factor, self.config.min_zoom, self.config.max_zoom);
	}

	/// Advances the hover fade by `dt` seconds.
	pub fn advance(&mut self, dt: f64) {
		self.hover.advance(dt, &self.config);
	}

	/// Drops state that referred to the previous graph. A drag in progress
	/// is released on `engine` first, so the node's pin and the alpha target
	/// are restored. Selection survives if its node still exists in `graph`.
	pub fn retain(&mut self, graph: &GraphModel, engine: &mut LayoutEngine) -> Result<(), SimulationError> {
		let released = self.cancel(engine);
		self.hover = HoverState::default();
		self.tooltip = None;
		if self.selection.as_ref().is_some_and(|id| !graph.contains(id.as_str())) {
			self.selection = None;
		}
		released
	}

	/// The owning view is going away. Call before disposing `engine`.
	pub fn unmount(&mut self, engine: &mut LayoutEngine) -> Result<(), SimulationError> {
		let released = self.cancel(engine);
		self.hover = HoverState::default();
		self.tooltip = None;
		released
	}

	/// Abandons the gesture. A drag is released only while its simulation
	/// is still running; a disposed one has no pins left to restore.
	fn cancel(&mut self, engine: &mut LayoutEngine) -> Result<(), SimulationError> {
		match std::mem::take(&mut self.gesture) {
			Gesture::Dragging { node, was_pinned, .. } if engine.is_running() => {
				debug!("drag on `{node}` cancelled");
				release(engine, &node, was_pinned)
			}
			_ => Ok(()),
		}
	}
}

fn release(engine: &mut LayoutEngine, node: &NodeId, was_pinned: bool) -> Result<(), SimulationError> {
	if !was_pinned {
		engine.unpin(node.as_str())?;
	}
	engine.set_alpha_target(0.0)
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}
