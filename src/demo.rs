//! Deterministic sample networks.
//!
//! Used when there is no signed-in subject, when the data service fails, and
//! for the comparison view when no second account is available. Every sample
//! carries a node labelled [`SAMPLE_LABEL`] so it is never mistaken for live
//! data. Payloads go through the normal normalizer like any service response.

use serde_json::{Map, Value, json};

use crate::source::GraphType;

/// Banner shown over any sample network.
pub const SAMPLE_LABEL: &str = "Sample data";
/// Id of the single node in the placeholder graph.
pub const SAMPLE_NODE_ID: &str = "sample-data";

const HANDLES: &[&str] = &[
	"ada", "brendan", "cyra", "dmitri", "elif", "farah", "goran", "hana", "ivo", "jun", "kemal",
	"lena", "mateo", "noor", "oskar", "priya",
];
const REPOS: &[(&str, &str)] = &[
	("graph-kit", "Rust"),
	("dotfiles", "Shell"),
	("tiny-http", "Go"),
	("notebook", "Python"),
	("pixel-ui", "TypeScript"),
	("parser-lab", "Rust"),
];
const LANGUAGES: &[&str] = &["Rust", "Go", "Python", "TypeScript", "C++"];

/// Deterministic pseudo-random value in `0.0..1.0`.
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn pick(seed: usize, len: usize) -> usize {
	((rand_simple(seed) * len as f64) as usize).min(len.saturating_sub(1))
}

/// Sample network centred on `subject`.
pub fn sample_network(subject: &str, graph_type: GraphType) -> Value {
	match graph_type {
		GraphType::Followers => follower_sample(subject, 12),
		GraphType::Collaboration => collaboration_sample(subject),
	}
}

/// The network shown in the comparison view when no second account exists.
pub fn comparison_network() -> Value {
	follower_sample("demo-user", 9)
}

/// Minimal stand-in for a failed load: the subject and the sample marker.
pub fn placeholder(subject: &str) -> Value {
	json!({
		"nodes": [
			{ "id": subject, "login": subject },
			{ "id": SAMPLE_NODE_ID, "label": SAMPLE_LABEL }
		],
		"edges": [{ "source": SAMPLE_NODE_ID, "target": subject, "type": "generic" }]
	})
}

/// Array-of-nodes payload: followers of `subject` plus a random follow tree
/// among them.
fn follower_sample(subject: &str, followers: usize) -> Value {
	let followers = followers.min(HANDLES.len());
	let mut nodes = vec![json!({
		"id": subject,
		"login": subject,
		"followers": followers,
		"following": followers / 3,
		"language": LANGUAGES[pick(subject.len(), LANGUAGES.len())],
	})];
	let mut edges = Vec::new();
	for (i, handle) in HANDLES.iter().take(followers).enumerate() {
		nodes.push(json!({
			"id": format!("{handle}(user)"),
			"login": handle,
			"followers": (rand_simple(i * 7) * 200.0) as u64,
			"public_repos": (rand_simple(i * 13) * 40.0) as u64,
			"language": LANGUAGES[pick(i * 3, LANGUAGES.len())],
		}));
		edges.push(json!({ "source": handle, "target": subject, "type": "follows" }));
		if i > 0 {
			let target = HANDLES[pick(i, i)];
			edges.push(json!({ "source": handle, "target": target, "type": "follows" }));
		}
	}
	push_marker(&mut nodes, &mut edges, subject);
	json!({ "nodes": nodes, "edges": edges })
}

/// Nested `{network, user}` payload with keyed nodes: the subject's
/// repositories and the people contributing to them.
fn collaboration_sample(subject: &str) -> Value {
	let mut nodes = Map::new();
	let mut edges = Vec::new();
	for (name, language) in REPOS {
		let id = format!("repo:{subject}/{name}");
		nodes.insert(
			id.clone(),
			json!({
				"id": id,
				"label": name,
				"type": "repository",
				"data": {
					"language": language,
					"stargazers_count": (rand_simple(name.len() * 31) * 500.0) as u64,
					"forks_count": (rand_simple(name.len() * 17) * 60.0) as u64,
				}
			}),
		);
		edges.push(json!({ "source": subject, "target": id, "type": "owns" }));
	}
	for (i, handle) in HANDLES.iter().take(8).enumerate() {
		nodes.insert(
			handle.to_string(),
			json!({ "id": handle, "label": handle, "type": "user" }),
		);
		for hop in 0..2 {
			let (repo, _) = REPOS[pick(i * 5 + hop, REPOS.len())];
			edges.push(json!({
				"source": handle,
				"target": format!("repo:{subject}/{repo}"),
				"type": "contributes",
				"weight": 1 + pick(i + hop, 20),
			}));
		}
	}
	nodes.insert(
		SAMPLE_NODE_ID.to_string(),
		json!({ "id": SAMPLE_NODE_ID, "label": SAMPLE_LABEL, "type": "user" }),
	);
	edges.push(json!({ "source": SAMPLE_NODE_ID, "target": subject, "type": "generic" }));
	json!({
		"user": { "id": subject, "login": subject },
		"network": { "nodes": nodes, "edges": edges }
	})
}

fn push_marker(nodes: &mut Vec<Value>, edges: &mut Vec<Value>, subject: &str) {
	nodes.push(json!({ "id": SAMPLE_NODE_ID, "label": SAMPLE_LABEL }));
	edges.push(json!({ "source": SAMPLE_NODE_ID, "target": subject, "type": "generic" }));
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{NodeKind, NodeRole, normalize};

	#[test]
	fn samples_are_deterministic_and_marked() {
		for graph_type in GraphType::ALL {
			let a = sample_network("octocat", graph_type);
			assert_eq!(a, sample_network("octocat", graph_type));
			let graph = normalize(&a, Some("octocat")).unwrap().graph;
			assert_eq!(graph.node(SAMPLE_NODE_ID).unwrap().display.label, SAMPLE_LABEL);
			assert_eq!(graph.primary().unwrap().id.as_str(), "octocat");
		}
	}

	#[test]
	fn collaboration_sample_has_repositories() {
		let normalized = normalize(&sample_network("octocat", GraphType::Collaboration), None).unwrap();
		let graph = normalized.graph;
		assert_eq!(graph.primary().unwrap().role, NodeRole::Primary);
		let repos = graph
			.nodes()
			.iter()
			.filter(|n| n.kind == NodeKind::Repository)
			.count();
		assert_eq!(repos, REPOS.len());
		assert_eq!(normalized.report.dangling_edges, 0);
	}

	#[test]
	fn placeholder_is_tiny_and_marked() {
		let graph = normalize(&placeholder("ghost"), Some("ghost")).unwrap().graph;
		assert_eq!(graph.node_count(), 2);
		assert!(graph.contains(SAMPLE_NODE_ID));
	}
}
