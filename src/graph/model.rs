use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker suffixes that identify a repository in upstream identifiers.
const REPOSITORY_SUFFIXES: &[&str] = &["repo", "repository"];
/// Prefix the network service uses for repository ids (`repo:owner/name`).
const REPOSITORY_PREFIX: &str = "repo:";

/// Canonical node identity.
///
/// Built with [`NodeId::parse`], which strips a trailing parenthesised
/// disambiguation suffix (`octocat(user)` becomes `octocat`). The same rule is
/// applied to ids found in algorithm results so both sides line up.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

/// What the raw identifier said about the node besides its id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdMarker {
	/// No marker.
	None,
	/// A `(user)` suffix.
	User,
	/// A `(repo)` suffix or the `repo:` prefix.
	Repository,
}

impl NodeId {
	/// Canonicalizes an upstream identifier.
	pub fn parse(raw: &str) -> Self {
		Self::parse_marked(raw).0
	}

	/// Canonicalizes an upstream identifier and reports its kind marker.
	pub fn parse_marked(raw: &str) -> (Self, IdMarker) {
		let trimmed = raw.trim();
		let (base, suffix) = split_suffix(trimmed);
		let marker = match suffix {
			Some(s) if REPOSITORY_SUFFIXES.contains(&s.as_str()) => IdMarker::Repository,
			Some(s) if s == "user" => IdMarker::User,
			_ if base.starts_with(REPOSITORY_PREFIX) => IdMarker::Repository,
			_ => IdMarker::None,
		};
		(Self(base.to_string()), marker)
	}

	/// The canonical id.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Label to show when the record carried none.
	pub fn default_label(&self) -> &str {
		self.0.strip_prefix(REPOSITORY_PREFIX).unwrap_or(&self.0)
	}
}

/// Splits `name(suffix)` into `("name", Some("suffix"))`, lowercasing the suffix.
fn split_suffix(raw: &str) -> (&str, Option<String>) {
	if let Some(open) = raw.rfind('(') {
		if raw.ends_with(')') && open > 0 {
			let suffix = raw[open + 1..raw.len() - 1].trim().to_ascii_lowercase();
			return (raw[..open].trim_end(), Some(suffix));
		}
	}
	(raw, None)
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for NodeId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<&str> for NodeId {
	fn from(raw: &str) -> Self {
		Self::parse(raw)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
	/// Person or organisation account.
	User,
	/// Repository.
	Repository,
}

impl NodeKind {
	/// Collision radius in graph units. Repositories render larger.
	pub fn base_radius(self) -> f64 {
		match self {
			NodeKind::User => 5.0,
			NodeKind::Repository => 8.0,
		}
	}

	/// Human-readable kind.
	pub fn label(self) -> &'static str {
		match self {
			NodeKind::User => "User",
			NodeKind::Repository => "Repository",
		}
	}
}

/// Position of a node relative to the viewed account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
	/// The account being viewed. Exactly one per model.
	Primary,
	/// Directly connected to the primary node.
	Member,
	/// Neither of the above.
	Neutral,
}

/// Relationship an edge stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
	/// Source follows target.
	Follows,
	/// Shared work, such as commits to the same repository.
	Collaborates,
	/// Source owns the target repository.
	Owns,
	/// Starring between an account and a repository.
	StarredBy,
	/// Any relationship the payload did not name.
	Generic,
}

impl EdgeKind {
	/// Maps the upstream `type` strings. Unknown strings become `Generic`.
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"follows" | "follow" | "follower" => EdgeKind::Follows,
			"collaborates" | "contributes" | "collaborator" | "contributor" => {
				EdgeKind::Collaborates
			}
			"owns" | "owner" => EdgeKind::Owns,
			"starred" | "starred_by" | "stars" | "starredby" => EdgeKind::StarredBy,
			_ => EdgeKind::Generic,
		}
	}
}

/// Counters copied from the upstream account or repository record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
	/// Followers.
	pub followers: Option<u64>,
	/// Accounts followed.
	pub following: Option<u64>,
	/// Public repositories.
	pub public_repos: Option<u64>,
	/// Stargazers.
	pub stars: Option<u64>,
	/// Forks.
	pub forks: Option<u64>,
}

impl MetricSnapshot {
	/// Field-wise merge: values present in `newer` replace ours.
	pub fn merge(&mut self, newer: &MetricSnapshot) {
		fn take(slot: &mut Option<u64>, newer: Option<u64>) {
			if newer.is_some() {
				*slot = newer;
			}
		}
		take(&mut self.followers, newer.followers);
		take(&mut self.following, newer.following);
		take(&mut self.public_repos, newer.public_repos);
		take(&mut self.stars, newer.stars);
		take(&mut self.forks, newer.forks);
	}
}

/// What the tooltip and labels show for a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayAttributes {
	/// Never empty; falls back to the id.
	pub label: String,
	/// Avatar URL.
	pub avatar_ref: Option<String>,
	/// Primary language of a repository.
	pub language: Option<String>,
	/// Counters shown in the tooltip.
	pub metrics: MetricSnapshot,
}

/// One account or repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Canonical id, unique in the model.
	pub id: NodeId,
	/// Account or repository.
	pub kind: NodeKind,
	/// Relation to the viewed account.
	pub role: NodeRole,
	/// What to show.
	pub display: DisplayAttributes,
}

/// Directed relationship between two nodes of the same model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	/// Start of the edge.
	pub source: NodeId,
	/// End of the edge.
	pub target: NodeId,
	/// Relationship.
	pub kind: EdgeKind,
	/// Non-negative; `1.0` when the payload gave none.
	pub weight: f64,
}

/// Immutable, normalized graph. Every edge endpoint is a node of the model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphModel {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	index: HashMap<NodeId, usize>,
	primary: Option<usize>,
}

impl GraphModel {
	/// Builds a model from already-validated parts. Edges with unknown
	/// endpoints are discarded.
	pub(crate) fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		let index: HashMap<NodeId, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		let edges = edges
			.into_iter()
			.filter(|e| index.contains_key(&e.source) && index.contains_key(&e.target))
			.collect();
		let primary = nodes.iter().position(|n| n.role == NodeRole::Primary);
		Self {
			nodes,
			edges,
			index,
			primary,
		}
	}

	/// A model with no nodes.
	pub fn empty() -> Self {
		Self::default()
	}

	/// In the order the payload first declared them.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Edges, no two with the same endpoints and kind.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Whether there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Position of `id` in [`nodes`](Self::nodes).
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// The node with `id`.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	/// Whether `id` is a node of the model.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// The viewed account, if the model has one.
	pub fn primary(&self) -> Option<&Node> {
		self.primary.map(|i| &self.nodes[i])
	}

	/// Indices of nodes joined to `idx` by an edge in either direction.
	pub fn neighbors(&self, idx: usize) -> Vec<usize> {
		let Some(node) = self.nodes.get(idx) else {
			return Vec::new();
		};
		let mut out: Vec<usize> = self
			.edges
			.iter()
			.filter_map(|e| {
				if e.source == node.id {
					self.index_of(e.target.as_str())
				} else if e.target == node.id {
					self.index_of(e.source.as_str())
				} else {
					None
				}
			})
			.filter(|&n| n != idx)
			.collect();
		out.sort_unstable();
		out.dedup();
		out
	}

	/// Number of edges touching each node, in node order.
	pub fn degrees(&self) -> Vec<usize> {
		let mut degrees = vec![0; self.nodes.len()];
		for edge in &self.edges {
			if let Some(s) = self.index_of(edge.source.as_str()) {
				degrees[s] += 1;
			}
			if let Some(t) = self.index_of(edge.target.as_str()) {
				degrees[t] += 1;
			}
		}
		degrees
	}

	/// `(source, target)` node indices for every edge, in edge order.
	pub fn edge_endpoints(&self) -> Vec<(usize, usize)> {
		self.edges
			.iter()
			.filter_map(|e| Some((self.index_of(e.source.as_str())?, self.index_of(e.target.as_str())?)))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_strips_disambiguation_suffix() {
		assert_eq!(NodeId::parse("octocat(user)").as_str(), "octocat");
		assert_eq!(NodeId::parse("hello-world (repo)").as_str(), "hello-world");
		assert_eq!(NodeId::parse("plain").as_str(), "plain");
		assert_eq!(NodeId::parse("(odd)").as_str(), "(odd)");
	}

	#[test]
	fn parse_reports_repository_markers() {
		assert_eq!(NodeId::parse_marked("x(repo)").1, IdMarker::Repository);
		assert_eq!(NodeId::parse_marked("x(Repository)").1, IdMarker::Repository);
		assert_eq!(NodeId::parse_marked("x(user)").1, IdMarker::User);
		assert_eq!(NodeId::parse_marked("repo:octo/hello").1, IdMarker::Repository);
		assert_eq!(NodeId::parse_marked("octo").1, IdMarker::None);
	}

	#[test]
	fn default_label_drops_repository_prefix() {
		assert_eq!(NodeId::parse("repo:octo/hello").default_label(), "octo/hello");
	}

	#[test]
	fn edge_kind_parse_accepts_upstream_spellings() {
		assert_eq!(EdgeKind::parse("follows"), EdgeKind::Follows);
		assert_eq!(EdgeKind::parse("contributes"), EdgeKind::Collaborates);
		assert_eq!(EdgeKind::parse("OWNS"), EdgeKind::Owns);
		assert_eq!(EdgeKind::parse("starred_by"), EdgeKind::StarredBy);
		assert_eq!(EdgeKind::parse("forked"), EdgeKind::Generic);
	}

	#[test]
	fn metric_merge_prefers_present_newer_values() {
		let mut metrics = MetricSnapshot {
			followers: Some(1),
			stars: Some(7),
			..Default::default()
		};
		metrics.merge(&MetricSnapshot {
			followers: Some(5),
			forks: Some(2),
			..Default::default()
		});
		assert_eq!(metrics.followers, Some(5));
		assert_eq!(metrics.stars, Some(7));
		assert_eq!(metrics.forks, Some(2));
	}
}
