//! Turns upstream network payloads into a [`GraphModel`].
//!
//! Three payload shapes are recognized and detected up front (see
//! [`PayloadShape`]). Individual malformed records are skipped and counted;
//! only an unrecognizable or empty payload is an error.

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::model::{
	DisplayAttributes, Edge, EdgeKind, GraphModel, IdMarker, MetricSnapshot, Node, NodeId, NodeKind,
	NodeRole,
};
use crate::error::NormalizationError;

/// The payload layouts the network services produce.
#[derive(Debug)]
pub enum PayloadShape<'a> {
	/// `[node, ...]` or `{ "nodes": [node, ...], "edges": [...] }`.
	NodeArray {
		/// Node records, in order.
		nodes: &'a [Value],
		/// Edge records, in order.
		edges: &'a [Value],
	},
	/// `{ "nodes": { "<id>": node, ... }, "edges": [...] }`.
	KeyedNodes {
		/// Node records by id.
		nodes: &'a Map<String, Value>,
		/// Edge records, in order.
		edges: &'a [Value],
	},
	/// `{ "user": {...}, "network": { "nodes": ..., "edges": [...] } }`.
	Nested {
		/// The embedded account, used as the primary node.
		viewer: Option<&'a Value>,
		/// The network payload itself.
		inner: Box<PayloadShape<'a>>,
	},
}

impl<'a> PayloadShape<'a> {
	/// Classifies `payload` without reading any record.
	pub fn detect(payload: &'a Value) -> Result<Self, NormalizationError> {
		match payload {
			Value::Null => Err(NormalizationError::EmptyPayload),
			Value::Array(nodes) => Ok(PayloadShape::NodeArray { nodes, edges: &[] }),
			Value::Object(obj) if obj.is_empty() => Err(NormalizationError::EmptyPayload),
			Value::Object(obj) => match obj.get("network") {
				Some(Value::Object(network)) => Ok(PayloadShape::Nested {
					viewer: obj.get("user").filter(|v| !v.is_null()),
					inner: Box::new(Self::detect_flat(network)?),
				}),
				Some(_) => Err(NormalizationError::InvalidFormat),
				None => Self::detect_flat(obj),
			},
			_ => Err(NormalizationError::InvalidFormat),
		}
	}

	fn detect_flat(obj: &'a Map<String, Value>) -> Result<Self, NormalizationError> {
		let edges: &'a [Value] = match obj.get("edges").or_else(|| obj.get("links")) {
			Some(Value::Array(edges)) => edges,
			None | Some(Value::Null) => &[],
			Some(_) => return Err(NormalizationError::InvalidFormat),
		};
		match obj.get("nodes") {
			Some(Value::Array(nodes)) => Ok(PayloadShape::NodeArray { nodes, edges }),
			Some(Value::Object(nodes)) => Ok(PayloadShape::KeyedNodes { nodes, edges }),
			_ => Err(NormalizationError::InvalidFormat),
		}
	}

	/// Short name for logs.
	pub fn name(&self) -> &'static str {
		match self {
			PayloadShape::NodeArray { .. } => "node-array",
			PayloadShape::KeyedNodes { .. } => "keyed-nodes",
			PayloadShape::Nested { .. } => "nested-network",
		}
	}
}

/// Counts of records that did not make it into the model unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeReport {
	/// Node records without a usable id.
	pub skipped_nodes: usize,
	/// Edge records without two usable endpoints.
	pub skipped_edges: usize,
	/// Edges to ids no node record declared.
	pub dangling_edges: usize,
	/// Records folded into an earlier one with the same id.
	pub merged_nodes: usize,
	/// Edges replaced by a later one with the same endpoints and kind.
	pub collapsed_edges: usize,
	/// The viewed account had no record and was added.
	pub synthesized_primary: bool,
}

/// Normalized model plus what was dropped on the way.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
	/// The normalized graph.
	pub graph: GraphModel,
	/// What was skipped or merged on the way.
	pub report: NormalizeReport,
}

/// Normalizes `payload`. `viewed` names the account being explored; it wins
/// over a `user` record embedded in a nested payload.
pub fn normalize(payload: &Value, viewed: Option<&str>) -> Result<Normalized, NormalizationError> {
	let shape = PayloadShape::detect(payload)?;
	debug!("normalizing {} payload", shape.name());

	let mut builder = Builder::default();
	let mut viewer_record = None;
	let edges = collect_nodes(&shape, &mut builder, &mut viewer_record);

	let viewer_node = viewer_record.and_then(|v| parse_node(None, v));
	let viewer_id = match viewed {
		Some(name) if !name.trim().is_empty() => Some(NodeId::parse(name)),
		_ => viewer_node.as_ref().map(|raw| raw.id.clone()),
	};
	if let (Some(id), Some(raw)) = (&viewer_id, viewer_node) {
		if &raw.id == id {
			builder.merge(raw);
		}
	}
	if let Some(id) = &viewer_id {
		builder.mark_primary(id);
	}

	for value in edges {
		builder.add_edge(value);
	}

	let Normalized { graph, report } = builder.finish();
	if report.skipped_nodes + report.skipped_edges + report.dangling_edges > 0 {
		warn!(
			"normalization dropped {} nodes, {} malformed edges, {} dangling edges",
			report.skipped_nodes, report.skipped_edges, report.dangling_edges
		);
	}
	debug!(
		"normalized {} nodes / {} edges ({} merged, {} collapsed)",
		graph.node_count(),
		graph.edge_count(),
		report.merged_nodes,
		report.collapsed_edges
	);
	Ok(Normalized { graph, report })
}

fn collect_nodes<'a>(
	shape: &PayloadShape<'a>,
	builder: &mut Builder,
	viewer: &mut Option<&'a Value>,
) -> &'a [Value] {
	match shape {
		PayloadShape::NodeArray { nodes, edges } => {
			for value in nodes.iter() {
				builder.add_node(parse_node(None, value));
			}
			*edges
		}
		PayloadShape::KeyedNodes { nodes, edges } => {
			for (key, value) in nodes.iter() {
				builder.add_node(parse_node(Some(key.as_str()), value));
			}
			*edges
		}
		PayloadShape::Nested { viewer: v, inner } => {
			*viewer = *v;
			collect_nodes(inner, builder, viewer)
		}
	}
}

/// Attributes are read leniently: a field of the wrong type is treated as
/// absent, so one odd value never costs the whole record.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeRecord {
	id: Option<Value>,
	#[serde(deserialize_with = "lenient_text")]
	login: Option<String>,
	#[serde(deserialize_with = "lenient_text")]
	full_name: Option<String>,
	#[serde(deserialize_with = "lenient_text")]
	label: Option<String>,
	#[serde(deserialize_with = "lenient_text")]
	name: Option<String>,
	#[serde(rename = "type", deserialize_with = "lenient_text")]
	type_name: Option<String>,
	#[serde(deserialize_with = "lenient_text")]
	kind: Option<String>,
	#[serde(deserialize_with = "lenient_text")]
	avatar_url: Option<String>,
	#[serde(deserialize_with = "lenient_text")]
	avatar: Option<String>,
	#[serde(deserialize_with = "lenient_text")]
	language: Option<String>,
	#[serde(deserialize_with = "lenient_count")]
	followers_count: Option<u64>,
	#[serde(deserialize_with = "lenient_count")]
	followers: Option<u64>,
	#[serde(deserialize_with = "lenient_count")]
	following_count: Option<u64>,
	#[serde(deserialize_with = "lenient_count")]
	following: Option<u64>,
	#[serde(deserialize_with = "lenient_count")]
	public_repos_count: Option<u64>,
	#[serde(deserialize_with = "lenient_count")]
	public_repos: Option<u64>,
	#[serde(deserialize_with = "lenient_count")]
	stargazers_count: Option<u64>,
	#[serde(deserialize_with = "lenient_count")]
	stars: Option<u64>,
	#[serde(deserialize_with = "lenient_count")]
	forks_count: Option<u64>,
	#[serde(deserialize_with = "lenient_count")]
	forks: Option<u64>,
	data: Option<Value>,
}

/// Strings pass through, numbers and booleans are shown as written, anything
/// else is absent.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::String(s) => Some(s),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	})
}

/// Counts may arrive as integers, floats or numeric strings. Negative or
/// unparsable values are absent.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
	let count = |f: f64| (f.is_finite() && f >= 0.0).then(|| f as u64);
	Ok(match Value::deserialize(deserializer)? {
		Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(count)),
		Value::String(s) => {
			let s = s.trim();
			s.parse::<u64>().ok().or_else(|| s.parse::<f64>().ok().and_then(count))
		}
		_ => None,
	})
}

impl NodeRecord {
	fn metrics(&self) -> MetricSnapshot {
		MetricSnapshot {
			followers: self.followers_count.or(self.followers),
			following: self.following_count.or(self.following),
			public_repos: self.public_repos_count.or(self.public_repos),
			stars: self.stargazers_count.or(self.stars),
			forks: self.forks_count.or(self.forks),
		}
	}

	fn explicit_kind(&self) -> Option<NodeKind> {
		let raw = self.type_name.as_deref().or(self.kind.as_deref())?;
		match raw.trim().to_ascii_lowercase().as_str() {
			"repository" | "repo" => Some(NodeKind::Repository),
			"user" | "organization" | "org" => Some(NodeKind::User),
			_ => None,
		}
	}
}

#[derive(Debug)]
struct RawNode {
	id: NodeId,
	kind: NodeKind,
	kind_rank: u8,
	label: Option<String>,
	avatar: Option<String>,
	language: Option<String>,
	metrics: MetricSnapshot,
}

fn scalar_id(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Object(obj) => obj.get("id").and_then(scalar_id),
		_ => None,
	}
}

fn parse_node(key: Option<&str>, value: &Value) -> Option<RawNode> {
	let record = match value {
		Value::Object(_) => NodeRecord::deserialize(value).ok()?,
		Value::String(_) | Value::Number(_) => NodeRecord {
			id: Some(value.clone()),
			..Default::default()
		},
		_ => NodeRecord::default(),
	};
	// Account records carry a numeric GitHub id next to the login; the login
	// is the identity the edges use.
	let raw_id = record
		.id
		.as_ref()
		.filter(|v| v.is_string())
		.and_then(scalar_id)
		.or_else(|| record.login.clone())
		.or_else(|| record.full_name.clone())
		.or_else(|| key.map(str::to_string))
		.or_else(|| record.id.as_ref().and_then(scalar_id))?;
	let (id, marker) = NodeId::parse_marked(&raw_id);
	if id.as_str().is_empty() {
		return None;
	}

	// The network service wraps the account record under `data`.
	let nested = record
		.data
		.as_ref()
		.filter(|d| d.is_object())
		.and_then(|d| NodeRecord::deserialize(d).ok());

	let mut metrics = nested.as_ref().map(NodeRecord::metrics).unwrap_or_default();
	metrics.merge(&record.metrics());

	let explicit = record
		.explicit_kind()
		.or_else(|| nested.as_ref().and_then(NodeRecord::explicit_kind));
	let (kind, kind_rank) = match (explicit, marker) {
		(Some(kind), _) => (kind, 2),
		(None, IdMarker::Repository) => (NodeKind::Repository, 1),
		(None, IdMarker::User) => (NodeKind::User, 1),
		(None, IdMarker::None) => (NodeKind::User, 0),
	};

	let pick = |f: fn(&NodeRecord) -> Option<String>| {
		f(&record).or_else(|| nested.as_ref().and_then(f))
	};
	Some(RawNode {
		id,
		kind,
		kind_rank,
		label: pick(|r| r.label.clone().or_else(|| r.name.clone()).or_else(|| r.login.clone())),
		avatar: pick(|r| r.avatar_url.clone().or_else(|| r.avatar.clone())),
		language: pick(|r| r.language.clone()),
		metrics,
	})
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EdgeRecord {
	source: Option<Value>,
	target: Option<Value>,
	from: Option<Value>,
	to: Option<Value>,
	#[serde(rename = "type", deserialize_with = "lenient_text")]
	type_name: Option<String>,
	#[serde(deserialize_with = "lenient_text")]
	kind: Option<String>,
	weight: Option<Value>,
}

fn parse_weight(value: Option<&Value>) -> f64 {
	match value.and_then(Value::as_f64) {
		Some(w) if !w.is_finite() => 1.0,
		Some(w) => w.max(0.0),
		None => 1.0,
	}
}

#[derive(Default)]
struct Builder {
	nodes: Vec<RawNode>,
	node_index: HashMap<NodeId, usize>,
	primary: Option<usize>,
	edges: Vec<Edge>,
	edge_index: HashMap<(NodeId, NodeId, EdgeKind), usize>,
	report: NormalizeReport,
}

impl Builder {
	fn add_node(&mut self, raw: Option<RawNode>) {
		match raw {
			Some(raw) => self.merge(raw),
			None => self.report.skipped_nodes += 1,
		}
	}

	/// Non-null fields win; on conflict the newer record wins.
	fn merge(&mut self, raw: RawNode) {
		let Some(&idx) = self.node_index.get(&raw.id) else {
			self.node_index.insert(raw.id.clone(), self.nodes.len());
			self.nodes.push(raw);
			return;
		};
		self.report.merged_nodes += 1;
		let existing = &mut self.nodes[idx];
		if raw.kind_rank >= existing.kind_rank {
			existing.kind = raw.kind;
			existing.kind_rank = raw.kind_rank;
		}
		if raw.label.is_some() {
			existing.label = raw.label;
		}
		if raw.avatar.is_some() {
			existing.avatar = raw.avatar;
		}
		if raw.language.is_some() {
			existing.language = raw.language;
		}
		existing.metrics.merge(&raw.metrics);
	}

	fn mark_primary(&mut self, id: &NodeId) {
		let idx = match self.node_index.get(id) {
			Some(&idx) => idx,
			None => {
				debug!("synthesizing primary node `{id}`");
				self.report.synthesized_primary = true;
				self.node_index.insert(id.clone(), self.nodes.len());
				self.nodes.push(RawNode {
					id: id.clone(),
					kind: NodeKind::User,
					kind_rank: 0,
					label: None,
					avatar: None,
					language: None,
					metrics: MetricSnapshot::default(),
				});
				self.nodes.len() - 1
			}
		};
		self.primary = Some(idx);
	}

	fn add_edge(&mut self, value: &Value) {
		let Ok(record) = EdgeRecord::deserialize(value) else {
			self.report.skipped_edges += 1;
			return;
		};
		let endpoint = |primary: &Option<Value>, alias: &Option<Value>| {
			primary
				.as_ref()
				.or(alias.as_ref())
				.and_then(scalar_id)
				.map(|raw| NodeId::parse(&raw))
		};
		let (Some(source), Some(target)) = (
			endpoint(&record.source, &record.from),
			endpoint(&record.target, &record.to),
		) else {
			self.report.skipped_edges += 1;
			return;
		};
		let (Some(&s), Some(&t)) = (self.node_index.get(&source), self.node_index.get(&target))
		else {
			self.report.dangling_edges += 1;
			return;
		};

		let kind = match record.type_name.as_deref().or(record.kind.as_deref()) {
			Some(raw) => EdgeKind::parse(raw),
			None if self.nodes[s].kind == NodeKind::User
				&& self.nodes[t].kind == NodeKind::Repository =>
			{
				EdgeKind::Owns
			}
			None => EdgeKind::Generic,
		};
		let weight = parse_weight(record.weight.as_ref());

		// Duplicate (source, target, kind): last-seen weight wins, no summing.
		let key = (source.clone(), target.clone(), kind);
		if let Some(&existing) = self.edge_index.get(&key) {
			self.report.collapsed_edges += 1;
			self.edges[existing].weight = weight;
			return;
		}
		self.edge_index.insert(key, self.edges.len());
		self.edges.push(Edge {
			source,
			target,
			kind,
			weight,
		});
	}

	fn finish(self) -> Normalized {
		let Builder {
			nodes,
			primary,
			edges,
			report,
			..
		} = self;
		let primary_id = primary.map(|i| nodes[i].id.clone());
		let is_member = |id: &NodeId| match &primary_id {
			Some(p) => edges
				.iter()
				.any(|e| (&e.source == p && &e.target == id) || (&e.target == p && &e.source == id)),
			None => false,
		};

		let nodes = nodes
			.into_iter()
			.enumerate()
			.map(|(i, raw)| {
				let role = if Some(i) == primary {
					NodeRole::Primary
				} else if is_member(&raw.id) {
					NodeRole::Member
				} else {
					NodeRole::Neutral
				};
				let label = raw
					.label
					.filter(|l| !l.trim().is_empty())
					.unwrap_or_else(|| raw.id.default_label().to_string());
				Node {
					id: raw.id,
					kind: raw.kind,
					role,
					display: DisplayAttributes {
						label,
						avatar_ref: raw.avatar,
						language: raw.language,
						metrics: raw.metrics,
					},
				}
			})
			.collect();

		Normalized {
			graph: GraphModel::from_parts(nodes, edges),
			report,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn ids(graph: &GraphModel) -> Vec<&str> {
		graph.nodes().iter().map(|n| n.id.as_str()).collect()
	}

	#[test]
	fn detects_each_known_shape() {
		let array = json!({ "nodes": [{ "id": "a" }], "edges": [] });
		let keyed = json!({ "nodes": { "a": { "label": "A" } }, "edges": [] });
		let nested = json!({ "network": { "nodes": [{ "id": "a" }], "edges": [] } });
		let bare = json!(["a", "b"]);

		assert!(matches!(PayloadShape::detect(&array), Ok(PayloadShape::NodeArray { .. })));
		assert!(matches!(PayloadShape::detect(&keyed), Ok(PayloadShape::KeyedNodes { .. })));
		assert!(matches!(PayloadShape::detect(&nested), Ok(PayloadShape::Nested { .. })));
		assert!(matches!(PayloadShape::detect(&bare), Ok(PayloadShape::NodeArray { .. })));
	}

	#[test]
	fn rejects_unknown_shapes() {
		for payload in [json!("nodes"), json!(42), json!({ "vertices": [] }), json!({ "nodes": 3 })] {
			assert_eq!(
				normalize(&payload, None).unwrap_err(),
				NormalizationError::InvalidFormat,
				"{payload}"
			);
		}
		assert_eq!(
			normalize(&json!({ "network": "x" }), None).unwrap_err(),
			NormalizationError::InvalidFormat
		);
	}

	#[test]
	fn null_and_empty_object_are_empty_payloads() {
		assert_eq!(normalize(&Value::Null, None).unwrap_err(), NormalizationError::EmptyPayload);
		assert_eq!(normalize(&json!({}), None).unwrap_err(), NormalizationError::EmptyPayload);
	}

	#[test]
	fn zero_nodes_is_a_valid_graph() {
		let out = normalize(&json!({ "nodes": [], "edges": [] }), None).unwrap();
		assert!(out.graph.is_empty());
		assert_eq!(out.graph.edge_count(), 0);
	}

	#[test]
	fn octocat_scenario() {
		let payload = json!({
			"nodes": [{ "id": "octocat(user)" }, { "id": "hello-world(repo)" }],
			"edges": [{ "source": "octocat(user)", "target": "hello-world(repo)" }]
		});
		let graph = normalize(&payload, Some("octocat")).unwrap().graph;

		assert_eq!(ids(&graph), ["octocat", "hello-world"]);
		let octocat = graph.node("octocat").unwrap();
		assert_eq!(octocat.kind, NodeKind::User);
		assert_eq!(octocat.role, NodeRole::Primary);
		let repo = graph.node("hello-world").unwrap();
		assert_eq!(repo.kind, NodeKind::Repository);
		assert_eq!(repo.role, NodeRole::Member);

		assert_eq!(graph.edge_count(), 1);
		let edge = &graph.edges()[0];
		assert_eq!(edge.source.as_str(), "octocat");
		assert_eq!(edge.target.as_str(), "hello-world");
		assert_eq!(edge.kind, EdgeKind::Owns);
	}

	#[test]
	fn merges_duplicate_records_newest_non_null_wins() {
		let payload = json!({
			"nodes": [
				{ "id": "ana(user)", "label": "Ana", "language": "Rust", "followers_count": 3 },
				{ "id": "ana", "label": null, "avatar_url": "https://a/ana.png", "followers_count": 9 },
				{ "id": "ana", "language": "Go" }
			]
		});
		let out = normalize(&payload, None).unwrap();
		assert_eq!(out.graph.node_count(), 1);
		assert_eq!(out.report.merged_nodes, 2);

		let ana = &out.graph.nodes()[0];
		assert_eq!(ana.display.label, "Ana");
		assert_eq!(ana.display.avatar_ref.as_deref(), Some("https://a/ana.png"));
		assert_eq!(ana.display.language.as_deref(), Some("Go"));
		assert_eq!(ana.display.metrics.followers, Some(9));
	}

	#[test]
	fn oddly_typed_attributes_keep_the_node() {
		let payload = json!({
			"nodes": [
				{ "id": "me" },
				{ "id": "ana", "followers": "12", "stars": -3, "language": ["Rust"] },
				{ "id": "bo", "label": 42, "type": 7, "avatar_url": {} }
			],
			"edges": [
				{ "source": "ana", "target": "me", "type": "follows" },
				{ "source": "bo", "target": "me", "type": 3 }
			]
		});
		let out = normalize(&payload, Some("me")).unwrap();
		assert_eq!(ids(&out.graph), ["me", "ana", "bo"]);
		assert_eq!(out.report.skipped_nodes, 0);
		assert_eq!(out.report.skipped_edges, 0);
		assert_eq!(out.report.dangling_edges, 0);
		assert_eq!(out.graph.edge_count(), 2);

		let ana = out.graph.node("ana").unwrap();
		assert_eq!(ana.display.metrics.followers, Some(12));
		assert_eq!(ana.display.metrics.stars, None);
		assert_eq!(ana.display.language, None);
		let bo = out.graph.node("bo").unwrap();
		assert_eq!(bo.display.label, "42");
		assert_eq!(bo.kind, NodeKind::User);
		assert_eq!(bo.display.avatar_ref, None);
	}

	#[test]
	fn explicit_type_wins_over_marker() {
		let payload = json!({
			"nodes": [
				{ "id": "tool(repo)" },
				{ "id": "tool", "type": "user" },
				{ "id": "lib", "type": "repository" }
			]
		});
		let graph = normalize(&payload, None).unwrap().graph;
		assert_eq!(graph.node("tool").unwrap().kind, NodeKind::User);
		assert_eq!(graph.node("lib").unwrap().kind, NodeKind::Repository);
	}

	#[test]
	fn malformed_and_dangling_edges_are_counted_not_fatal() {
		let payload = json!({
			"nodes": [{ "id": "a" }, { "id": "b" }],
			"edges": [
				{ "source": "a" },
				{ "target": "b" },
				"not-an-edge",
				{ "source": "a", "target": "ghost" },
				{ "source": "a", "target": "b", "type": "follows" }
			]
		});
		let out = normalize(&payload, None).unwrap();
		assert_eq!(out.report.skipped_edges, 3);
		assert_eq!(out.report.dangling_edges, 1);
		assert_eq!(out.graph.edge_count(), 1);
		for edge in out.graph.edges() {
			assert!(out.graph.contains(edge.source.as_str()));
			assert!(out.graph.contains(edge.target.as_str()));
		}
	}

	#[test]
	fn duplicate_edges_collapse_last_weight_wins() {
		let payload = json!({
			"nodes": ["a", "b"],
			"edges": [
				{ "source": "a", "target": "b", "type": "follows", "weight": 2.0 },
				{ "source": "a", "target": "b", "type": "follows", "weight": 5.0 },
				{ "source": "a", "target": "b", "type": "collaborates", "weight": 1.0 },
				{ "source": "b", "target": "a", "type": "follows", "weight": -4.0 }
			]
		});
		let out = normalize(&payload, None).unwrap();
		assert_eq!(out.report.collapsed_edges, 1);
		assert_eq!(out.graph.edge_count(), 3);
		assert_eq!(out.graph.edges()[0].weight, 5.0);
		assert_eq!(out.graph.edges()[2].weight, 0.0);
	}

	#[test]
	fn keyed_payload_from_network_service() {
		let payload = json!({
			"nodes": {
				"octocat": { "id": "octocat", "label": "octocat", "type": "user",
					"data": { "login": "octocat", "followers_count": 20, "avatar_url": "https://a/o.png" } },
				"repo:octocat/hello": { "id": "repo:octocat/hello", "label": "hello", "type": "repository",
					"data": { "language": "Rust", "stargazers_count": 80 } },
				"hubot": { "id": "hubot", "type": "user", "data": { "login": "hubot" } }
			},
			"edges": [
				{ "source": "octocat", "target": "repo:octocat/hello", "type": "owns" },
				{ "source": "hubot", "target": "octocat", "type": "follows" }
			]
		});
		let graph = normalize(&payload, Some("octocat")).unwrap().graph;
		let repo = graph.node("repo:octocat/hello").unwrap();
		assert_eq!(repo.kind, NodeKind::Repository);
		assert_eq!(repo.display.language.as_deref(), Some("Rust"));
		assert_eq!(repo.display.metrics.stars, Some(80));
		let octocat = graph.node("octocat").unwrap();
		assert_eq!(octocat.display.metrics.followers, Some(20));
		assert_eq!(octocat.display.avatar_ref.as_deref(), Some("https://a/o.png"));
		assert_eq!(graph.node("hubot").unwrap().role, NodeRole::Member);
	}

	#[test]
	fn nested_payload_uses_embedded_user_as_primary() {
		let payload = json!({
			"user": { "login": "mona", "name": "Mona Lisa", "followers": 12 },
			"network": {
				"nodes": [{ "id": "x" }, { "id": "y" }],
				"edges": [{ "source": "x", "target": "mona", "type": "follows" }]
			}
		});
		let out = normalize(&payload, None).unwrap();
		let mona = out.graph.node("mona").unwrap();
		assert_eq!(mona.role, NodeRole::Primary);
		assert_eq!(mona.display.label, "Mona Lisa");
		assert_eq!(mona.display.metrics.followers, Some(12));
		assert_eq!(out.graph.edge_count(), 1);
		assert_eq!(out.graph.node("y").unwrap().role, NodeRole::Neutral);
	}

	#[test]
	fn viewed_account_is_synthesized_exactly_once() {
		let payload = json!({ "nodes": [{ "id": "a" }], "edges": [{ "source": "a", "target": "me" }] });
		let out = normalize(&payload, Some("me(user)")).unwrap();
		assert!(out.report.synthesized_primary);
		let primaries: Vec<_> = out
			.graph
			.nodes()
			.iter()
			.filter(|n| n.role == NodeRole::Primary)
			.collect();
		assert_eq!(primaries.len(), 1);
		assert_eq!(primaries[0].id.as_str(), "me");
		assert_eq!(out.graph.edge_count(), 1);
	}

	#[test]
	fn normalization_is_idempotent() {
		let payload = json!({
			"nodes": { "b": {}, "a": { "type": "repo" }, "c(user)": {} },
			"links": [
				{ "from": "a", "to": "b" },
				{ "source": { "id": "c" }, "target": "a", "weight": 3 }
			]
		});
		let first = normalize(&payload, Some("c")).unwrap();
		let second = normalize(&payload, Some("c")).unwrap();
		assert_eq!(first, second);
		assert_eq!(first.graph.edge_count(), 2);
	}
}
