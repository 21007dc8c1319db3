use devgraph_canvas::comparison::{ComparisonCompositor, SecondarySource};
use devgraph_canvas::config::{EngineConfig, ForceConfig, OverlayConfig};
use devgraph_canvas::error::SimulationError;
use devgraph_canvas::graph::{EdgeKind, GraphModel, NodeId, NodeKind, NodeRole, normalize};
use devgraph_canvas::interaction::PointerOutcome;
use devgraph_canvas::layout::{Bounds, LayoutEngine};
use devgraph_canvas::overlay::{
	self, AlgorithmResult, CommunityAssignment, CommunityResult, PathResult, RankAlgorithm, RankEntry,
	RankResult,
};
use devgraph_canvas::source::GraphType;
use devgraph_canvas::view::GraphView;
use serde_json::{Value, json};

fn network() -> Value {
	json!({
		"nodes": [
			{ "id": "me", "login": "me" },
			{ "id": "ana(user)", "login": "ana" },
			{ "id": "bo(user)" },
			{ "id": "cy(user)" },
			{ "id": "lib(repo)", "label": "lib" }
		],
		"edges": [
			{ "source": "ana", "target": "me", "type": "follows" },
			{ "source": "bo", "target": "ana", "type": "follows" },
			{ "source": "cy", "target": "bo", "type": "follows" },
			{ "source": "me", "target": "lib", "type": "owns" },
			{ "source": "me", "target": "ghost", "type": "follows" }
		]
	})
}

fn graph() -> GraphModel {
	normalize(&network(), Some("me")).unwrap().graph
}

fn view(label: &str, payload: Value) -> GraphView {
	let mut view = GraphView::new(label, "me", EngineConfig::default(), Bounds::new(800.0, 600.0));
	let ticket = view.begin_load(GraphType::Followers);
	assert!(view.complete_load(&ticket, Ok(payload)));
	view
}

#[test]
fn normalized_edges_never_dangle() {
	let payloads = [
		network(),
		json!([{ "id": "solo" }]),
		json!({
			"user": { "login": "me" },
			"network": {
				"nodes": { "repo:me/x": { "id": "repo:me/x", "type": "repository" } },
				"edges": [
					{ "source": "me", "target": "repo:me/x", "type": "owns" },
					{ "source": "nobody", "target": "repo:me/x" }
				]
			}
		}),
	];
	for payload in payloads {
		let normalized = normalize(&payload, Some("me")).unwrap();
		let graph = &normalized.graph;
		for edge in graph.edges() {
			assert!(graph.contains(edge.source.as_str()), "{} missing", edge.source);
			assert!(graph.contains(edge.target.as_str()), "{} missing", edge.target);
		}
	}
	assert_eq!(normalize(&network(), Some("me")).unwrap().report.dangling_edges, 1);
}

#[test]
fn normalizing_twice_gives_the_same_model() {
	let raw = network();
	assert_eq!(normalize(&raw, Some("me")).unwrap(), normalize(&raw, Some("me")).unwrap());
}

#[test]
fn community_hints_are_deterministic() {
	let graph = graph();
	let result = AlgorithmResult::Community(CommunityResult {
		assignments: ["me", "ana", "bo", "cy", "lib"]
			.iter()
			.enumerate()
			.map(|(i, id)| CommunityAssignment {
				node_id: id.to_string(),
				community_id: (i % 3) as i64,
			})
			.collect(),
		communities: Vec::new(),
	});
	let config = OverlayConfig::default();
	let first = overlay::apply(&graph, &result, &config);
	let second = overlay::apply(&graph, &result, &config);
	assert_eq!(first, second);
	assert_eq!(first.nodes[0].fill, second.nodes[3].fill);
}

#[test]
fn empty_path_highlights_no_edges() {
	let graph = graph();
	let hints = overlay::apply(
		&graph,
		&AlgorithmResult::Path(PathResult::default()),
		&OverlayConfig::default(),
	);
	assert!(hints.emphasized_edges().is_empty());
	assert!(hints.highlighted_nodes().is_empty());
}

#[test]
fn disposed_engine_is_inert() {
	let graph = graph();
	let mut engine = LayoutEngine::new(ForceConfig::default());
	engine.initialize(&graph, Bounds::new(800.0, 600.0));
	let before = engine.tick().unwrap();
	engine.dispose();

	assert!(matches!(
		engine.tick(),
		Err(SimulationError::DisposedEngineReuse(generation)) if generation > before.generation.get()
	));
	assert!(engine.pin("me", 0.0, 0.0).is_err());
	assert!(engine.nodes().is_empty());
	// Disposing again changes nothing.
	engine.dispose();
	assert!(!engine.is_running());
}

#[test]
fn selection_holds_one_node() {
	let mut view = view("primary", network());
	view.click(Some("ana"));
	view.click(Some("bo"));
	assert_eq!(view.selection().map(NodeId::as_str), Some("bo"));

	// A press and release on empty canvas clears it.
	view.pointer_down(-5000.0, -5000.0).unwrap();
	assert_eq!(view.pointer_up().unwrap(), PointerOutcome::Click(None));
	assert_eq!(view.selection(), None);
}

#[test]
fn octocat_owns_hello_world() {
	let payload = json!({
		"nodes": [{ "id": "octocat(user)" }, { "id": "hello-world(repo)" }],
		"edges": [{ "source": "octocat(user)", "target": "hello-world(repo)" }]
	});
	let graph = normalize(&payload, Some("octocat")).unwrap().graph;
	assert_eq!(graph.node_count(), 2);

	let octocat = graph.node("octocat").unwrap();
	assert_eq!(octocat.kind, NodeKind::User);
	assert_eq!(octocat.role, NodeRole::Primary);
	let repo = graph.node("hello-world").unwrap();
	assert_eq!(repo.kind, NodeKind::Repository);

	assert_eq!(graph.edge_count(), 1);
	let edge = &graph.edges()[0];
	assert_eq!((edge.source.as_str(), edge.target.as_str()), ("octocat", "hello-world"));
	assert!(matches!(edge.kind, EdgeKind::Owns | EdgeKind::Generic));
}

#[test]
fn ranking_unknown_ids_highlights_nothing() {
	let graph = normalize(&json!({ "nodes": [{ "id": "c" }] }), None).unwrap().graph;
	let result = AlgorithmResult::Rank(RankResult {
		algorithm: RankAlgorithm::PageRank,
		entries: vec![
			RankEntry {
				node_id: "a".into(),
				score: 0.9,
			},
			RankEntry {
				node_id: "b".into(),
				score: 0.1,
			},
		],
	});
	let hints = overlay::apply(&graph, &result, &OverlayConfig::default());
	assert!(hints.highlighted_nodes().is_empty());
	assert_eq!(hints.nodes.len(), 1);
	assert_eq!(hints.notices.len(), 2);
}

fn run_frames(view: &mut GraphView, count: usize) {
	for _ in 0..count {
		let frame = view.request_frame().unwrap();
		assert!(view.run_frame(frame, 0.016).is_some());
	}
}

#[test]
fn comparison_leaves_the_primary_untouched() {
	// Two identical primaries; only one of them ever gets a secondary.
	let mut compared = ComparisonCompositor::new(view("primary", network()));
	let mut alone = ComparisonCompositor::new(view("primary", network()));
	for comparison in [&mut compared, &mut alone] {
		comparison.primary_mut().click(Some("ana"));
		run_frames(comparison.primary_mut(), 20);
	}
	assert_eq!(
		compared.primary().engine().snapshot().unwrap(),
		alone.primary().engine().snapshot().unwrap()
	);

	compared.enable(SecondarySource::Demo);
	let secondary = compared.secondary_mut().unwrap();
	let target = secondary.engine().nodes()[0].clone();
	secondary.pointer_down(target.x, target.y).unwrap();
	secondary.pointer_move(target.x + 60.0, target.y + 40.0).unwrap();
	run_frames(secondary, 10);
	assert_eq!(
		secondary.pointer_up().unwrap(),
		PointerOutcome::DragEnd(target.id.clone())
	);
	run_frames(secondary, 10);
	run_frames(compared.primary_mut(), 15);
	assert!(compared.disable());

	run_frames(alone.primary_mut(), 15);
	for comparison in [&mut compared, &mut alone] {
		run_frames(comparison.primary_mut(), 30);
	}

	let primary = compared.primary();
	assert_eq!(
		primary.engine().snapshot().unwrap(),
		alone.primary().engine().snapshot().unwrap()
	);
	assert!(primary.engine().snapshot().unwrap().tick >= 65);
	assert_eq!(primary.scene(), alone.primary().scene());
	assert_eq!(primary.selection().map(NodeId::as_str), Some("ana"));
	assert!(compared.secondary().is_none());
}
