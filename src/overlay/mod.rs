//! Algorithm-result overlays.
//!
//! Each `apply_*` is a pure function from a graph and one result to a full
//! [`RenderHints`] set. Neither the graph nor the layout is touched; ids in
//! the result that the graph does not know are reported as notices and
//! otherwise ignored.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

mod hints;
pub mod palette;
mod result;

pub use hints::{EdgeHint, LegendEntry, NodeHint, RenderHints, StrokeEmphasis};
pub use result::{
	AlgorithmResult, CommunityAssignment, CommunityInfo, CommunityResult, Lens, PathResult,
	RankAlgorithm, RankEntry, RankResult, Recommendation, RecommendationResult,
};

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::graph::{GraphModel, NodeId, NodeRole};

fn resolve(graph: &GraphModel, raw: &str) -> Option<usize> {
	graph.index_of(NodeId::parse(raw).as_str())
}

/// Fades edges that leave the highlighted set.
fn dim_edges_outside(hints: &mut RenderHints, graph: &GraphModel, opacity: f64) {
	for (edge, (s, t)) in graph.edge_endpoints().into_iter().enumerate() {
		let inside = hints.nodes[s].highlighted && hints.nodes[t].highlighted;
		if !inside {
			hints.edges[edge].opacity = opacity;
		}
	}
}

/// Dispatches on the result variant.
pub fn apply(graph: &GraphModel, result: &AlgorithmResult, config: &OverlayConfig) -> RenderHints {
	let hints = match result {
		AlgorithmResult::Rank(rank) => apply_rank(graph, rank, config),
		AlgorithmResult::Community(community) => apply_community(graph, community, config),
		AlgorithmResult::Path(path) => apply_path(graph, path, config),
		AlgorithmResult::Recommendation(recs) => apply_recommendation(graph, recs, config),
	};
	debug!(
		"{:?} overlay: {} nodes highlighted, {} edges emphasized, {} notices",
		hints.lens,
		hints.highlighted_nodes().len(),
		hints.emphasized_edges().len(),
		hints.notices.len()
	);
	hints
}

/// Sizes and colours ranked nodes by normalized score; the top entries keep
/// their labels and everything unranked fades.
pub fn apply_rank(graph: &GraphModel, result: &RankResult, config: &OverlayConfig) -> RenderHints {
	let mut hints = RenderHints::base(graph, config);
	hints.lens = Lens::Rank;
	let label_all = graph.node_count() <= config.label_all_below;

	let mut scores: Vec<Option<f64>> = vec![None; graph.node_count()];
	for entry in &result.entries {
		match resolve(graph, &entry.node_id) {
			Some(i) if entry.score.is_finite() => scores[i] = Some(entry.score),
			Some(_) => {}
			None => hints.notices.push(OverlayError::UnknownNode(entry.node_id.clone())),
		}
	}
	let mut ranked: Vec<(usize, f64)> = scores
		.iter()
		.enumerate()
		.filter_map(|(i, s)| s.map(|s| (i, s)))
		.collect();
	if ranked.is_empty() {
		return hints;
	}
	ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
	let max = ranked.iter().map(|&(_, s)| s.abs()).fold(0.0, f64::max);

	let count = ranked.len();
	for (position, &(i, score)) in ranked.iter().enumerate() {
		let t = if max > 0.0 { (score / max).clamp(0.0, 1.0) } else { 0.0 };
		let hint = &mut hints.nodes[i];
		hint.fill = palette::score_color(t);
		hint.radius_scale = 1.0 + config.max_radius_boost * t;
		hint.highlighted = true;
		hint.show_label = label_all || position < config.rank_label_top;
		hint.z_order = 3 + (count - position) as i32;
		if position == 0 {
			hint.stroke = StrokeEmphasis::Strong;
		}
		hint.annotation = Some(format!(
			"{} score {:.3} (#{} of {})",
			result.algorithm.label(),
			score,
			position + 1,
			count
		));
	}
	hints.dim_unhighlighted(config.dimmed_opacity);
	dim_edges_outside(&mut hints, graph, 0.25);

	let name = result.algorithm.label();
	hints.legend = vec![
		LegendEntry::new(palette::score_color(1.0), format!("Highest {name}")),
		LegendEntry::new(palette::score_color(0.0), format!("Lowest {name}")),
		LegendEntry::new(palette::NEUTRAL, "Unranked"),
	];
	hints
}

/// Colours nodes by community. A colour declared by the result wins;
/// otherwise the palette decides. Edges inside one community are emphasized.
pub fn apply_community(graph: &GraphModel, result: &CommunityResult, config: &OverlayConfig) -> RenderHints {
	let mut hints = RenderHints::base(graph, config);
	hints.lens = Lens::Community;

	let declared: HashMap<i64, &CommunityInfo> = result
		.communities
		.iter()
		.map(|c| (c.community_id, c))
		.collect();
	let color_of = |id: i64| {
		declared
			.get(&id)
			.and_then(|c| c.color.clone())
			.unwrap_or_else(|| palette::community_color(id).to_string())
	};
	let label_of = |id: i64| {
		declared
			.get(&id)
			.and_then(|c| c.label.clone())
			.filter(|l| !l.is_empty())
			.unwrap_or_else(|| format!("Community {id}"))
	};

	let mut membership: Vec<Option<i64>> = vec![None; graph.node_count()];
	let mut undeclared = BTreeSet::new();
	for assignment in &result.assignments {
		let Some(i) = resolve(graph, &assignment.node_id) else {
			hints.notices.push(OverlayError::UnknownNode(assignment.node_id.clone()));
			continue;
		};
		if !declared.is_empty() && !declared.contains_key(&assignment.community_id) {
			undeclared.insert(assignment.community_id);
		}
		membership[i] = Some(assignment.community_id);
	}
	hints
		.notices
		.extend(undeclared.into_iter().map(OverlayError::UnknownCommunityId));

	let mut sizes: BTreeMap<i64, usize> = BTreeMap::new();
	for (hint, community) in hints.nodes.iter_mut().zip(&membership) {
		match community {
			Some(id) => {
				*sizes.entry(*id).or_default() += 1;
				hint.fill = color_of(*id);
				hint.highlighted = true;
				hint.z_order = hint.z_order.max(1);
				hint.annotation = Some(format!("Community: {}", label_of(*id)));
			}
			None => hint.fill = palette::NEUTRAL.to_string(),
		}
	}

	for (edge, (s, t)) in graph.edge_endpoints().into_iter().enumerate() {
		let hint = &mut hints.edges[edge];
		match (membership[s], membership[t]) {
			(Some(a), Some(b)) if a == b => {
				hint.color = color_of(a);
				hint.emphasized = true;
				hint.width_scale = 1.8;
				hint.opacity = 0.85;
			}
			_ => hint.opacity = 0.35,
		}
	}

	hints.legend = sizes
		.iter()
		.map(|(&id, &size)| LegendEntry::new(color_of(id), format!("{} ({size})", label_of(id))))
		.collect();
	if membership.iter().any(Option::is_none) {
		hints.legend.push(LegendEntry::new(palette::NEUTRAL, "Unassigned"));
	}
	hints
}

/// Highlights a path. Only edges joining consecutive path nodes (in either
/// direction) count as path edges; an edge between two path nodes that are
/// not neighbours on the path stays ordinary. An empty path highlights
/// nothing.
pub fn apply_path(graph: &GraphModel, result: &PathResult, config: &OverlayConfig) -> RenderHints {
	let mut hints = RenderHints::base(graph, config);
	hints.lens = Lens::Path;
	if result.is_empty() {
		return hints;
	}

	let ids: Vec<NodeId> = result.ordered_node_ids.iter().map(|raw| NodeId::parse(raw)).collect();
	let last = ids.len() - 1;
	let mut step_of: Vec<Option<usize>> = vec![None; graph.node_count()];
	for (step, (id, raw)) in ids.iter().zip(&result.ordered_node_ids).enumerate() {
		match graph.index_of(id.as_str()) {
			Some(i) => {
				step_of[i].get_or_insert(step);
			}
			None => hints.notices.push(OverlayError::UnknownNode(raw.clone())),
		}
	}

	let mut hops: HashMap<(&str, &str), usize> = HashMap::new();
	for (hop, pair) in ids.windows(2).enumerate() {
		let (a, b) = (pair[0].as_str(), pair[1].as_str());
		hops.entry((a, b)).or_insert(hop);
		hops.entry((b, a)).or_insert(hop);
	}

	for (hint, step) in hints.nodes.iter_mut().zip(&step_of) {
		let Some(step) = *step else {
			continue;
		};
		hint.fill = match step {
			0 => palette::PATH_START,
			s if s == last => palette::PATH_END,
			_ => palette::PATH,
		}
		.to_string();
		hint.highlighted = true;
		hint.show_label = true;
		hint.stroke = StrokeEmphasis::Strong;
		hint.radius_scale = hint.radius_scale.max(1.3);
		hint.z_order = 5;
		hint.annotation = Some(format!("Step {} of {}", step + 1, ids.len()));
	}
	hints.dim_unhighlighted(config.dimmed_opacity);

	for (hint, edge) in hints.edges.iter_mut().zip(graph.edges()) {
		match hops.get(&(edge.source.as_str(), edge.target.as_str())) {
			Some(&hop) => {
				hint.color = palette::PATH.to_string();
				hint.emphasized = true;
				hint.width_scale = 2.5;
				hint.opacity = 1.0;
				hint.label = result.edge_weights.get(hop).map(|w| format!("{w:.2}"));
			}
			None => hint.opacity = 0.2,
		}
	}

	hints.legend = vec![
		LegendEntry::new(palette::PATH_START, "Start"),
		LegendEntry::new(palette::PATH, "On path"),
		LegendEntry::new(palette::PATH_END, "End"),
	];
	hints
}

/// Highlights recommended candidates, coloured and sized by compatibility,
/// and emphasizes edges between them and the viewed account.
pub fn apply_recommendation(
	graph: &GraphModel,
	result: &RecommendationResult,
	config: &OverlayConfig,
) -> RenderHints {
	let mut hints = RenderHints::base(graph, config);
	hints.lens = Lens::Recommendation;

	let mut scores: Vec<Option<f64>> = vec![None; graph.node_count()];
	for entry in &result.entries {
		let Some(i) = resolve(graph, &entry.candidate_id) else {
			hints.notices.push(OverlayError::UnknownNode(entry.candidate_id.clone()));
			continue;
		};
		let score = if entry.compatibility_score.is_finite() {
			entry.compatibility_score.clamp(0.0, 100.0)
		} else {
			0.0
		};
		scores[i] = Some(score);
		let t = score / 100.0;
		let hint = &mut hints.nodes[i];
		hint.fill = palette::score_color(t);
		hint.radius_scale = 1.0 + config.max_radius_boost * t;
		hint.highlighted = true;
		hint.show_label = true;
		hint.stroke = StrokeEmphasis::Outline;
		hint.z_order = 3;
		hint.annotation = Some(if entry.shared_attributes.is_empty() {
			format!("{score:.0}% match")
		} else {
			format!("{score:.0}% match; shared: {}", entry.shared_attributes.join(", "))
		});
	}
	if scores.iter().all(Option::is_none) {
		return hints;
	}

	let primary = graph.nodes().iter().position(|n| n.role == NodeRole::Primary);
	if let Some(p) = primary {
		hints.nodes[p].highlighted = true;
		hints.nodes[p].show_label = true;
	}
	hints.dim_unhighlighted(config.dimmed_opacity);

	for (edge, (s, t)) in graph.edge_endpoints().into_iter().enumerate() {
		let candidate = match (Some(s) == primary, Some(t) == primary) {
			(true, false) => scores[t],
			(false, true) => scores[s],
			_ => None,
		};
		let hint = &mut hints.edges[edge];
		match candidate {
			Some(score) => {
				hint.color = palette::score_color(score / 100.0);
				hint.emphasized = true;
				hint.width_scale = 1.5 + score / 100.0;
				hint.opacity = 0.9;
			}
			None => hint.opacity = 0.2,
		}
	}

	hints.legend = vec![
		LegendEntry::new(palette::score_color(1.0), "Strong match"),
		LegendEntry::new(palette::score_color(0.0), "Weak match"),
		LegendEntry::new(palette::PRIMARY, "Viewed account"),
	];
	hints
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::normalize;

	fn graph() -> GraphModel {
		normalize(
			&json!({
				"nodes": [{ "id": "me" }, { "id": "a" }, { "id": "b" }, { "id": "c" }, { "id": "lib(repo)" }],
				"edges": [
					{ "source": "me", "target": "a", "type": "follows" },
					{ "source": "a", "target": "b", "type": "follows" },
					{ "source": "b", "target": "c", "type": "follows" },
					{ "source": "a", "target": "c", "type": "follows" },
					{ "source": "me", "target": "lib" }
				]
			}),
			Some("me"),
		)
		.unwrap()
		.graph
	}

	fn config() -> OverlayConfig {
		OverlayConfig::default()
	}

	fn community() -> CommunityResult {
		CommunityResult {
			assignments: vec![
				CommunityAssignment { node_id: "a".into(), community_id: 1 },
				CommunityAssignment { node_id: "b".into(), community_id: 1 },
				CommunityAssignment { node_id: "c".into(), community_id: 12 },
			],
			communities: Vec::new(),
		}
	}

	#[test]
	fn community_colours_are_stable_across_applications() {
		let (graph, result) = (graph(), community());
		assert_eq!(
			apply_community(&graph, &result, &config()),
			apply_community(&graph, &result, &config())
		);
	}

	#[test]
	fn community_fill_uses_palette_and_neutral_fallback() {
		let graph = graph();
		let hints = apply_community(&graph, &community(), &config());
		let fill = |id: &str| hints.nodes[graph.index_of(id).unwrap()].fill.clone();
		assert_eq!(fill("a"), palette::PALETTE[1]);
		assert_eq!(fill("c"), palette::PALETTE[2]);
		assert_eq!(fill("me"), palette::NEUTRAL);
		assert!(hints.notices.is_empty());
		assert_eq!(hints.legend.last().unwrap().label, "Unassigned");
	}

	#[test]
	fn declared_colour_wins_and_undeclared_community_is_reported() {
		let graph = graph();
		let mut result = community();
		result.communities.push(CommunityInfo {
			community_id: 1,
			label: Some("Core".into()),
			color: Some("#123456".into()),
		});
		let hints = apply_community(&graph, &result, &config());
		assert_eq!(hints.nodes[graph.index_of("a").unwrap()].fill, "#123456");
		assert_eq!(hints.nodes[graph.index_of("c").unwrap()].fill, palette::PALETTE[2]);
		assert_eq!(hints.notices, vec![OverlayError::UnknownCommunityId(12)]);
		assert_eq!(hints.legend[0].label, "Core (2)");
	}

	#[test]
	fn only_intra_community_edges_are_emphasized() {
		let graph = graph();
		let hints = apply_community(&graph, &community(), &config());
		// a -> b
		assert_eq!(hints.emphasized_edges(), vec![1]);
	}

	#[test]
	fn empty_path_highlights_nothing() {
		let graph = graph();
		let hints = apply_path(&graph, &PathResult::default(), &config());
		assert_eq!(hints.lens, Lens::Path);
		assert!(hints.highlighted_nodes().is_empty());
		assert!(hints.emphasized_edges().is_empty());
		assert!(hints.notices.is_empty());
	}

	#[test]
	fn path_marks_consecutive_pairs_only() {
		let graph = graph();
		let path = PathResult {
			ordered_node_ids: vec!["c".into(), "b".into(), "a(user)".into()],
			edge_weights: vec![0.5, 2.0],
		};
		let hints = apply_path(&graph, &path, &config());
		// b -> c and a -> b are walked against their direction; a -> c skips b.
		assert_eq!(hints.emphasized_edges(), vec![1, 2]);
		assert!(!hints.edges[3].emphasized);
		assert_eq!(hints.edges[2].label.as_deref(), Some("0.50"));
		assert_eq!(hints.edges[1].label.as_deref(), Some("2.00"));

		let c = graph.index_of("c").unwrap();
		let a = graph.index_of("a").unwrap();
		assert_eq!(hints.nodes[c].fill, palette::PATH_START);
		assert_eq!(hints.nodes[a].fill, palette::PATH_END);
		assert_eq!(hints.highlighted_nodes().len(), 3);
	}

	#[test]
	fn rank_over_missing_ids_highlights_nothing() {
		let graph = normalize(&json!({ "nodes": [{ "id": "c" }] }), None).unwrap().graph;
		let result = RankResult {
			algorithm: RankAlgorithm::PageRank,
			entries: vec![
				RankEntry { node_id: "a".into(), score: 0.9 },
				RankEntry { node_id: "b".into(), score: 0.1 },
			],
		};
		let hints = apply_rank(&graph, &result, &config());
		assert!(hints.highlighted_nodes().is_empty());
		assert_eq!(hints.nodes.len(), 1);
		assert_eq!(hints.notices.len(), 2);
	}

	#[test]
	fn rank_scales_by_score_and_dims_unranked() {
		let graph = graph();
		let result = RankResult {
			algorithm: RankAlgorithm::PageRank,
			entries: vec![
				RankEntry { node_id: "a".into(), score: 0.8 },
				RankEntry { node_id: "b".into(), score: 0.2 },
			],
		};
		let hints = apply_rank(&graph, &result, &config());
		let a = &hints.nodes[graph.index_of("a").unwrap()];
		let b = &hints.nodes[graph.index_of("b").unwrap()];
		let c = &hints.nodes[graph.index_of("c").unwrap()];
		assert!(a.radius_scale > b.radius_scale);
		assert!(a.z_order > b.z_order);
		assert_eq!(a.stroke, StrokeEmphasis::Strong);
		assert_eq!(c.opacity, config().dimmed_opacity);
		assert!(a.annotation.as_deref().unwrap().starts_with("PageRank score 0.800"));
	}

	#[test]
	fn recommendation_emphasizes_edges_to_candidates() {
		let graph = graph();
		let result = RecommendationResult {
			entries: vec![Recommendation {
				candidate_id: "a".into(),
				compatibility_score: 87.0,
				shared_attributes: vec!["rust".into(), "wasm".into()],
			}],
		};
		let hints = apply_recommendation(&graph, &result, &config());
		assert_eq!(hints.emphasized_edges(), vec![0]);
		let a = &hints.nodes[graph.index_of("a").unwrap()];
		assert_eq!(a.annotation.as_deref(), Some("87% match; shared: rust, wasm"));
		assert!(hints.nodes[graph.index_of("me").unwrap()].highlighted);
	}

	#[test]
	fn apply_dispatches_on_variant() {
		let graph = graph();
		let hints = apply(&graph, &AlgorithmResult::Community(community()), &config());
		assert_eq!(hints, apply_community(&graph, &community(), &config()));
	}
}
