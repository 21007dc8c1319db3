//! One rendered graph: its model, layout, overlay, interaction state and
//! frame loop, plus the tickets that guard asynchronous loads.
//!
//! A view owns everything it draws. Two views never share mutable state, so
//! the comparison compositor can run them side by side.

use log::{debug, info, warn};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::demo;
use crate::error::{Error, FetchFailure, Result};
use crate::generation::{Generation, GenerationCounter};
use crate::graph::{GraphModel, NodeId, NormalizeReport, normalize};
use crate::interaction::{InteractionController, PointerOutcome};
use crate::layout::{Bounds, LayoutEngine, TickLoop};
use crate::overlay::{self, AlgorithmResult, Lens, RenderHints};
use crate::scene::{self, Frame, Scene};
use crate::source::{GraphType, fallback_result};

/// Notices kept per view; older ones are dropped first.
pub const MAX_NOTICES: usize = 16;

/// Where the graph on screen came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
	/// A load is in flight.
	Loading,
	/// Normalized from the data service.
	Live,
	/// Synthesized locally; always labelled as such.
	Sample,
}

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
	/// Informational.
	Info,
	/// Something was skipped or fell back.
	Warning,
	/// An operation failed.
	Error,
}

/// Non-blocking message for the user.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
	/// Severity.
	pub level: NoticeLevel,
	/// Text for the user.
	pub message: String,
}

impl From<&Error> for Notice {
	fn from(error: &Error) -> Self {
		let level = match error {
			Error::Overlay(_) => NoticeLevel::Info,
			Error::Normalization(_) | Error::Fetch(_) => NoticeLevel::Warning,
			Error::Simulation(_) => NoticeLevel::Error,
		};
		Self {
			level,
			message: error.to_string(),
		}
	}
}

/// Issued by [`GraphView::begin_load`]; only the latest ticket is honoured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
	generation: Generation,
	pub subject: String,
	pub graph_type: GraphType,
}

/// Issued by [`GraphView::begin_overlay`]; only the latest ticket is honoured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayTicket {
	generation: Generation,
	pub lens: Lens,
}

pub struct GraphView {
	label: String,
	subject: String,
	graph_type: GraphType,
	config: EngineConfig,
	bounds: Bounds,
	graph: GraphModel,
	report: NormalizeReport,
	engine: LayoutEngine,
	interaction: InteractionController,
	frames: TickLoop,
	result: Option<AlgorithmResult>,
	hints: RenderHints,
	provenance: Provenance,
	banner: Option<String>,
	notices: Vec<Notice>,
	loads: GenerationCounter,
	overlays: GenerationCounter,
	clock: f64,
}

impl GraphView {
	/// An empty view. Nothing is laid out until a load completes.
	pub fn new(label: impl Into<String>, subject: impl Into<String>, config: EngineConfig, bounds: Bounds) -> Self {
		Self {
			label: label.into(),
			subject: subject.into(),
			graph_type: GraphType::default(),
			engine: LayoutEngine::new(config.forces.clone()),
			interaction: InteractionController::new(config.interaction.clone()),
			config,
			bounds,
			graph: GraphModel::empty(),
			report: NormalizeReport::default(),
			frames: TickLoop::new(),
			result: None,
			hints: RenderHints::default(),
			provenance: Provenance::Loading,
			banner: None,
			notices: Vec::new(),
			loads: GenerationCounter::new(),
			overlays: GenerationCounter::new(),
			clock: 0.0,
		}
	}

	/// Name used in logs, e.g. "primary".
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Login whose network this view shows.
	pub fn subject(&self) -> &str {
		&self.subject
	}

	/// Network currently shown.
	pub fn graph_type(&self) -> GraphType {
		self.graph_type
	}

	/// The graph on screen.
	pub fn graph(&self) -> &GraphModel {
		&self.graph
	}

	/// What the last normalization skipped or merged.
	pub fn report(&self) -> &NormalizeReport {
		&self.report
	}

	/// The layout engine.
	pub fn engine(&self) -> &LayoutEngine {
		&self.engine
	}

	/// Pointer, hover and selection state.
	pub fn interaction(&self) -> &InteractionController {
		&self.interaction
	}

	/// The selected node, if any.
	pub fn selection(&self) -> Option<&NodeId> {
		self.interaction.selection()
	}

	/// Styling for the active lens.
	pub fn hints(&self) -> &RenderHints {
		&self.hints
	}

	/// The active lens.
	pub fn lens(&self) -> Lens {
		self.hints.lens
	}

	/// Where the graph came from.
	pub fn provenance(&self) -> Provenance {
		self.provenance
	}

	/// Text shown along the top, if any.
	pub fn banner(&self) -> Option<&str> {
		self.banner.as_deref()
	}

	/// Notices not yet taken, oldest first.
	pub fn notices(&self) -> &[Notice] {
		&self.notices
	}

	/// Drains the notices collected so far.
	pub fn take_notices(&mut self) -> Vec<Notice> {
		std::mem::take(&mut self.notices)
	}

	/// Canvas size the layout is centred in.
	pub fn bounds(&self) -> Bounds {
		self.bounds
	}

	/// Records a recovered problem. A repeat of a pending notice moves it to
	/// the back instead of adding a copy.
	fn notify(&mut self, error: Error) {
		let notice = Notice::from(&error);
		if let Some(pos) = self.notices.iter().position(|n| *n == notice) {
			self.notices.remove(pos);
		} else {
			warn!("{}: {error}", self.label);
		}
		self.notices.push(notice);
		if self.notices.len() > MAX_NOTICES {
			let excess = self.notices.len() - MAX_NOTICES;
			self.notices.drain(..excess);
		}
	}

	/// Starts loading `graph_type` for the subject. The current simulation is
	/// torn down and any earlier ticket becomes stale.
	pub fn begin_load(&mut self, graph_type: GraphType) -> LoadTicket {
		let generation = self.loads.advance();
		self.overlays.advance();
		self.frames.stop();
		self.graph = GraphModel::empty();
		self.release_interaction();
		self.engine.dispose();
		self.graph_type = graph_type;
		self.report = NormalizeReport::default();
		self.result = None;
		self.hints = RenderHints::default();
		self.provenance = Provenance::Loading;
		self.banner = None;
		debug!(
			"{}: loading {} network of `{}` (generation {})",
			self.label,
			graph_type.label(),
			self.subject,
			generation.get()
		);
		LoadTicket {
			generation,
			subject: self.subject.clone(),
			graph_type,
		}
	}

	/// Delivers the outcome of a load. Returns `false` when the ticket is
	/// stale; nothing changes then. Failures fall back to a labelled
	/// placeholder graph.
	pub fn complete_load(&mut self, ticket: &LoadTicket, response: Result<Value, FetchFailure>) -> bool {
		if !self.loads.is_current(ticket.generation) {
			debug!(
				"{}: dropping stale load (generation {})",
				self.label,
				ticket.generation.get()
			);
			return false;
		}
		let failure = match response {
			Ok(payload) => match self.load_payload(&payload, Provenance::Live) {
				Ok(()) => return true,
				Err(error) => error,
			},
			Err(failure) => Error::from(failure),
		};
		self.notify(failure.clone());
		self.load_placeholder(&failure);
		true
	}

	/// Normalizes `payload` and shows it with a fresh layout.
	pub fn load_payload(&mut self, payload: &Value, provenance: Provenance) -> Result<()> {
		let normalized = normalize(payload, Some(self.subject.as_str()))?;
		info!(
			"{}: {} nodes, {} edges ({:?})",
			self.label,
			normalized.graph.node_count(),
			normalized.graph.edge_count(),
			provenance
		);
		self.report = normalized.report;
		self.install(normalized.graph, provenance);
		Ok(())
	}

	/// Shows a locally built sample network under the sample banner.
	pub fn load_sample(&mut self, payload: &Value) {
		self.loads.advance();
		if let Err(error) = self.load_payload(payload, Provenance::Sample) {
			self.notify(error);
		}
		self.banner = Some(demo::SAMPLE_LABEL.to_string());
	}

	fn load_placeholder(&mut self, cause: &Error) {
		let payload = demo::placeholder(&self.subject);
		if let Err(error) = self.load_payload(&payload, Provenance::Sample) {
			self.notify(error);
		}
		self.banner = Some(format!("{}: {cause}", demo::SAMPLE_LABEL));
	}

	/// Follows refreshed data for the same network, keeping the layout of
	/// nodes that survive.
	pub fn refresh_payload(&mut self, payload: &Value) -> Result<()> {
		let normalized = normalize(payload, Some(self.subject.as_str()))?;
		if !self.engine.is_running() {
			self.report = normalized.report;
			self.install(normalized.graph, Provenance::Live);
			return Ok(());
		}
		self.interaction.retain(&normalized.graph, &mut self.engine)?;
		self.engine.sync(&normalized.graph)?;
		self.graph = normalized.graph;
		self.report = normalized.report;
		self.refresh_hints();
		Ok(())
	}

	fn install(&mut self, graph: GraphModel, provenance: Provenance) {
		self.graph = graph;
		self.release_interaction();
		self.engine.initialize(&self.graph, self.bounds);
		self.provenance = provenance;
		self.banner = None;
		self.refresh_hints();
		self.frames.start();
	}

	/// Ends any gesture against the current simulation before it is replaced,
	/// keeping the selection only if it survives in `self.graph`.
	fn release_interaction(&mut self) {
		if let Err(error) = self.interaction.retain(&self.graph, &mut self.engine) {
			self.notify(Error::from(error));
		}
	}

	/// Starts an overlay request for `lens`; earlier overlay tickets go stale.
	pub fn begin_overlay(&mut self, lens: Lens) -> OverlayTicket {
		OverlayTicket {
			generation: self.overlays.advance(),
			lens,
		}
	}

	/// Delivers an algorithm result. A failure is replaced by a synthesized
	/// result of the same shape. Returns `false` for stale tickets.
	pub fn complete_overlay(
		&mut self,
		ticket: &OverlayTicket,
		response: Result<AlgorithmResult, FetchFailure>,
	) -> bool {
		if !self.overlays.is_current(ticket.generation) {
			debug!("{}: dropping stale {:?} result", self.label, ticket.lens);
			return false;
		}
		match response {
			Ok(result) => self.apply_result(result),
			Err(failure) => {
				self.notify(Error::from(failure));
				self.show_fallback(ticket.lens);
			}
		}
		true
	}

	/// Shows `result` now, without a ticket.
	pub fn apply_result(&mut self, result: AlgorithmResult) {
		self.result = Some(result);
		self.refresh_hints();
	}

	/// Shows `lens` with a locally synthesized result.
	pub fn show_fallback(&mut self, lens: Lens) {
		match fallback_result(lens, &self.graph) {
			Some(result) => self.apply_result(result),
			None => self.clear_overlay(),
		}
	}

	/// Back to the plain lens.
	pub fn clear_overlay(&mut self) {
		self.overlays.advance();
		self.result = None;
		self.refresh_hints();
	}

	fn refresh_hints(&mut self) {
		self.hints = match &self.result {
			Some(result) => overlay::apply(&self.graph, result, &self.config.overlay),
			None => RenderHints::base(&self.graph, &self.config.overlay),
		};
		for problem in self.hints.notices.clone() {
			self.notify(Error::from(problem));
		}
		if self.engine.is_running() {
			if let Err(error) = self.engine.emphasize_links(&self.hints.emphasized_edges()) {
				self.notify(Error::from(error));
			}
		}
	}

	/// Pointer pressed at screen position `(sx, sy)`.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) -> Result<()> {
		self.interaction
			.on_pointer_down(sx, sy, &mut self.engine, &self.hints)?;
		Ok(())
	}

	/// Pointer moved to `(sx, sy)`.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> Result<()> {
		self.interaction
			.on_pointer_move(sx, sy, &self.graph, &mut self.engine, &self.hints)?;
		Ok(())
	}

	/// Pointer released; reports a click, drag end or pan end.
	pub fn pointer_up(&mut self) -> Result<PointerOutcome> {
		Ok(self.interaction.on_pointer_up(&mut self.engine)?)
	}

	/// Pointer left the canvas; ends any gesture.
	pub fn pointer_leave(&mut self) -> Result<()> {
		self.interaction.on_pointer_leave(&self.graph, &mut self.engine)?;
		Ok(())
	}

	/// Zooms about the pointer. Positive `delta_y` zooms out.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.interaction.on_wheel(sx, sy, delta_y);
	}

	/// Hover moved to `node`, or off every node.
	pub fn hover(&mut self, node: Option<&str>) {
		self.interaction.on_hover(node, &self.graph, &self.hints);
	}

	/// Selects `node`; `None` or an unknown id clears the selection.
	pub fn click(&mut self, node: Option<&str>) {
		let node = node.map(NodeId::parse).filter(|id| self.graph.contains(id.as_str()));
		self.interaction.on_click(node);
	}

	/// Moves the layout centre to the new canvas size.
	pub fn resize(&mut self, bounds: Bounds) {
		self.bounds = bounds;
		if self.engine.is_running() {
			if let Err(error) = self.engine.resize(bounds) {
				self.notify(Error::from(error));
			}
		}
	}

	/// Asks for an animation frame. `Some` means the host should schedule a
	/// callback carrying this generation; `None` means one is already pending
	/// or the loop is stopped.
	pub fn request_frame(&mut self) -> Option<Generation> {
		self.frames.request_frame().then(|| self.frames.generation())
	}

	/// Runs one scheduled frame: a layout tick, the hover fade, then the
	/// scene. Returns `None` for callbacks from a stopped or replaced loop.
	pub fn run_frame(&mut self, generation: Generation, dt: f64) -> Option<Scene> {
		if !self.frames.fire(generation) {
			return None;
		}
		if self.engine.is_running() {
			if let Err(error) = self.engine.step() {
				self.notify(Error::from(error));
			}
		}
		self.interaction.advance(dt);
		self.clock += dt;
		Some(self.scene())
	}

	/// The display list for the current state.
	pub fn scene(&self) -> Scene {
		scene::draw(&Frame {
			graph: &self.graph,
			layout: self.engine.nodes(),
			hints: &self.hints,
			selection: self.interaction.selection(),
			hover: self.interaction.hover(),
			tooltip: self.interaction.tooltip(),
			transform: self.interaction.transform(),
			width: self.bounds.width,
			height: self.bounds.height,
			time: self.clock,
			loading: self.provenance == Provenance::Loading,
			banner: self.banner.as_deref(),
		})
	}

	/// Stops the frame loop, disposes the simulation and invalidates every
	/// outstanding ticket. Idempotent.
	pub fn dispose(&mut self) {
		self.frames.stop();
		if let Err(error) = self.interaction.unmount(&mut self.engine) {
			self.notify(Error::from(error));
		}
		self.engine.dispose();
		self.loads.advance();
		self.overlays.advance();
		debug!("{}: view disposed", self.label);
	}

	/// Whether `dispose` has run.
	pub fn is_disposed(&self) -> bool {
		!self.engine.is_running() && !self.frames.is_running()
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::error::NormalizationError;
	use crate::overlay::{PathResult, RankAlgorithm, RankEntry, RankResult};

	fn view() -> GraphView {
		GraphView::new("primary", "me", EngineConfig::default(), Bounds::new(800.0, 600.0))
	}

	fn payload() -> Value {
		json!({
			"nodes": [{ "id": "me" }, { "id": "ana" }, { "id": "bo" }],
			"edges": [
				{ "source": "ana", "target": "me", "type": "follows" },
				{ "source": "bo", "target": "ana", "type": "follows" }
			]
		})
	}

	#[test]
	fn completed_load_starts_simulation() {
		let mut view = view();
		let ticket = view.begin_load(GraphType::Followers);
		assert_eq!(view.provenance(), Provenance::Loading);
		assert_eq!(view.scene().message.as_deref(), Some("Loading network..."));

		assert!(view.complete_load(&ticket, Ok(payload())));
		assert_eq!(view.provenance(), Provenance::Live);
		assert_eq!(view.engine().nodes().len(), 3);
		assert!(view.banner().is_none());
	}

	#[test]
	fn stale_load_is_dropped() {
		let mut view = view();
		let old = view.begin_load(GraphType::Followers);
		let new = view.begin_load(GraphType::Collaboration);
		assert!(!view.complete_load(&old, Ok(payload())));
		assert!(view.graph().is_empty());
		assert!(!view.engine().is_running());
		assert!(view.complete_load(&new, Ok(payload())));
		assert_eq!(view.graph_type(), GraphType::Collaboration);
	}

	#[test]
	fn failed_load_degrades_to_labelled_placeholder() {
		let mut view = view();
		let ticket = view.begin_load(GraphType::Followers);
		view.complete_load(&ticket, Err(FetchFailure::Status("rate limited".into())));
		assert_eq!(view.provenance(), Provenance::Sample);
		assert!(view.graph().contains(demo::SAMPLE_NODE_ID));
		assert!(view.banner().unwrap().starts_with(demo::SAMPLE_LABEL));
		assert_eq!(view.notices()[0].level, NoticeLevel::Warning);
		assert!(view.engine().is_running());
	}

	#[test]
	fn malformed_payload_degrades_too() {
		let mut view = view();
		let ticket = view.begin_load(GraphType::Followers);
		view.complete_load(&ticket, Ok(json!({ "vertices": [] })));
		assert_eq!(view.provenance(), Provenance::Sample);
		assert_eq!(
			view.notices()[0].message,
			NormalizationError::InvalidFormat.to_string()
		);
	}

	#[test]
	fn failed_overlay_uses_fallback_result() {
		let mut view = view();
		view.load_payload(&payload(), Provenance::Live).unwrap();
		let ticket = view.begin_overlay(Lens::Rank);
		assert!(view.complete_overlay(&ticket, Err(FetchFailure::Unavailable("timeout".into()))));
		assert_eq!(view.lens(), Lens::Rank);
		assert!(!view.hints().highlighted_nodes().is_empty());
		assert_eq!(view.notices().len(), 1);
	}

	#[test]
	fn stale_overlay_is_dropped() {
		let mut view = view();
		view.load_payload(&payload(), Provenance::Live).unwrap();
		let old = view.begin_overlay(Lens::Rank);
		let _new = view.begin_overlay(Lens::Path);
		let rank = AlgorithmResult::Rank(RankResult {
			algorithm: RankAlgorithm::PageRank,
			entries: vec![RankEntry {
				node_id: "ana".into(),
				score: 1.0,
			}],
		});
		assert!(!view.complete_overlay(&old, Ok(rank)));
		assert_eq!(view.lens(), Lens::Plain);
	}

	#[test]
	fn path_overlay_emphasizes_layout_links() {
		let mut view = view();
		view.load_payload(&payload(), Provenance::Live).unwrap();
		view.apply_result(AlgorithmResult::Path(PathResult {
			ordered_node_ids: vec!["bo".into(), "ana".into(), "me".into()],
			edge_weights: vec![1.0, 1.0],
		}));
		assert_eq!(view.hints().emphasized_edges(), vec![0, 1]);
		view.clear_overlay();
		assert_eq!(view.lens(), Lens::Plain);
		assert!(view.hints().emphasized_edges().is_empty());
	}

	#[test]
	fn frames_coalesce_and_stop_after_dispose() {
		let mut view = view();
		view.load_payload(&payload(), Provenance::Live).unwrap();
		let generation = view.request_frame().unwrap();
		assert!(view.request_frame().is_none());
		let scene = view.run_frame(generation, 0.016).unwrap();
		assert_eq!(scene.nodes.len(), 3);

		let pending = view.request_frame().unwrap();
		view.dispose();
		assert!(view.run_frame(pending, 0.016).is_none());
		assert!(view.is_disposed());
		assert!(view.engine().nodes().is_empty());
	}

	#[test]
	fn refresh_keeps_surviving_layout() {
		let mut view = view();
		view.load_payload(&payload(), Provenance::Live).unwrap();
		let ana = view.engine().node("ana").unwrap().clone();
		view.refresh_payload(&json!({
			"nodes": [{ "id": "me" }, { "id": "ana" }],
			"edges": [{ "source": "ana", "target": "me" }]
		}))
		.unwrap();
		assert_eq!(view.graph().node_count(), 2);
		let kept = view.engine().node("ana").unwrap();
		assert_eq!((kept.x, kept.y), (ana.x, ana.y));
	}

	#[test]
	fn sample_load_is_labelled_and_cancels_pending_fetch() {
		let mut view = view();
		let ticket = view.begin_load(GraphType::Collaboration);
		view.load_sample(&demo::sample_network("me", GraphType::Collaboration));
		assert_eq!(view.provenance(), Provenance::Sample);
		assert_eq!(view.banner(), Some(demo::SAMPLE_LABEL));
		assert!(!view.complete_load(&ticket, Ok(payload())));
		assert!(view.graph().contains(demo::SAMPLE_NODE_ID));
	}

	#[test]
	fn repeated_overlay_notices_are_not_duplicated() {
		let mut view = view();
		view.load_payload(&payload(), Provenance::Live).unwrap();
		let rank = AlgorithmResult::Rank(RankResult {
			algorithm: RankAlgorithm::PageRank,
			entries: vec![RankEntry {
				node_id: "ghost".into(),
				score: 1.0,
			}],
		});
		for _ in 0..5 {
			view.apply_result(rank.clone());
		}
		assert_eq!(view.notices().len(), 1);
		assert_eq!(view.take_notices().len(), 1);
		assert!(view.notices().is_empty());
	}

	#[test]
	fn notices_are_capped() {
		let mut view = view();
		for i in 0..(MAX_NOTICES + 5) {
			let ticket = view.begin_load(GraphType::Followers);
			view.complete_load(&ticket, Err(FetchFailure::Status(format!("error {i}"))));
		}
		assert_eq!(view.notices().len(), MAX_NOTICES);
		let last = view.notices().last().unwrap();
		assert!(last.message.contains(&format!("error {}", MAX_NOTICES + 4)));
	}

	#[test]
	fn refresh_mid_drag_releases_the_node() {
		let mut view = view();
		view.load_payload(&payload(), Provenance::Live).unwrap();
		let me = view.engine().node("me").unwrap().clone();
		view.pointer_down(me.x, me.y).unwrap();
		view.pointer_move(me.x + 50.0, me.y).unwrap();
		assert!(view.engine().is_pinned("me"));

		view.refresh_payload(&payload()).unwrap();
		assert!(!view.interaction().is_dragging());
		assert!(!view.engine().is_pinned("me"));
		assert_eq!(view.pointer_up().unwrap(), PointerOutcome::None);

		let mut settled = false;
		for _ in 0..5000 {
			let frame = view.request_frame().unwrap();
			view.run_frame(frame, 0.016).unwrap();
			if view.engine().is_settled() {
				settled = true;
				break;
			}
		}
		assert!(settled);
	}

	#[test]
	fn late_responses_after_dispose_are_refused() {
		let mut loading = view();
		let load = loading.begin_load(GraphType::Followers);
		loading.dispose();
		assert!(!loading.complete_load(&load, Ok(payload())));
		assert!(!loading.engine().is_running());
		assert!(loading.graph().is_empty());

		let mut overlaid = view();
		overlaid.load_payload(&payload(), Provenance::Live).unwrap();
		let overlay = overlaid.begin_overlay(Lens::Rank);
		overlaid.dispose();
		assert!(!overlaid.complete_overlay(&overlay, Err(FetchFailure::Unavailable("late".into()))));
		assert_eq!(overlaid.lens(), Lens::Plain);
		assert!(overlaid.notices().is_empty());
		assert!(!overlaid.engine().is_running());
	}

	#[test]
	fn click_on_unknown_node_clears_selection() {
		let mut view = view();
		view.load_payload(&payload(), Provenance::Live).unwrap();
		view.click(Some("ana"));
		view.click(Some("nobody"));
		assert_eq!(view.selection(), None);
		view.click(Some("bo(user)"));
		assert_eq!(view.selection().map(NodeId::as_str), Some("bo"));
	}
}
