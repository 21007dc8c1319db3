//! Contracts with the collaborators outside the engine: the graph data
//! service, the algorithm services and the session context.
//!
//! Nothing here performs I/O. The host fetches; these types describe what it
//! hands back and what the engine does when that is unusable.

use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchFailure;
use crate::graph::{GraphModel, NodeKind};
use crate::overlay::{
	AlgorithmResult, CommunityAssignment, CommunityInfo, CommunityResult, Lens, PathResult,
	RankAlgorithm, RankEntry, RankResult, RecommendationResult,
};

/// What the identity layer tells us about the visitor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionContext {
	/// Whether the identity layer vouches for the visitor.
	pub authenticated: bool,
	/// Login of the visitor, when known.
	pub username: Option<String>,
}

/// Whether to ask the data service or go straight to illustrative data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataPlan {
	/// Ask the data service.
	Live {
		/// Login whose network to fetch.
		subject: String,
	},
	/// Sample data, labelled as such.
	Illustrative,
}

impl SessionContext {
	/// Live data needs an authenticated visitor with a non-blank login.
	pub fn plan(&self) -> DataPlan {
		match self.username.as_deref().map(str::trim) {
			Some(subject) if self.authenticated && !subject.is_empty() => DataPlan::Live {
				subject: subject.to_string(),
			},
			_ => DataPlan::Illustrative,
		}
	}
}

/// Which network of the subject to show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GraphType {
	/// Who follows whom.
	#[default]
	Followers,
	/// Users and the repositories they commit to.
	Collaboration,
}

impl GraphType {
	/// Every graph type, in button order.
	pub const ALL: [GraphType; 2] = [GraphType::Followers, GraphType::Collaboration];

	/// Button text.
	pub fn label(self) -> &'static str {
		match self {
			GraphType::Followers => "Followers",
			GraphType::Collaboration => "Collaboration",
		}
	}
}

/// Response body of the data and algorithm services:
/// `{"status": "success", "data": ...}` or `{"error": "..."}`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Envelope {
	/// `"success"` on success.
	pub status: Option<String>,
	/// Payload of a successful response.
	pub data: Option<Value>,
	/// Set on failure.
	pub error: Option<String>,
	/// Human-readable detail next to `error`.
	pub message: Option<String>,
}

impl Envelope {
	/// Parses a response body.
	pub fn parse(raw: &str) -> Result<Self, FetchFailure> {
		serde_json::from_str(raw).map_err(|e| FetchFailure::Malformed(e.to_string()))
	}

	/// The `data` member of a successful response.
	pub fn into_data(self) -> Result<Value, FetchFailure> {
		if let Some(error) = self.error {
			return Err(FetchFailure::Status(error));
		}
		match self.status.as_deref() {
			Some("success") | Some("ok") => {}
			Some(other) => {
				return Err(FetchFailure::Status(
					self.message.unwrap_or_else(|| other.to_string()),
				));
			}
			None => return Err(FetchFailure::Malformed("response has no status".into())),
		}
		match self.data {
			Some(Value::Null) | None => Err(FetchFailure::Malformed("response has no data".into())),
			Some(data) => Ok(data),
		}
	}

	/// The `data` member read as an algorithm result of any kind.
	pub fn into_result(self) -> Result<AlgorithmResult, FetchFailure> {
		let data = self.into_data()?;
		serde_json::from_value(data).map_err(|e| FetchFailure::Malformed(e.to_string()))
	}
}

/// A stand-in result of the same shape, used when a service fails so the
/// lens still renders. `None` for [`Lens::Plain`], which needs no result.
pub fn fallback_result(lens: Lens, graph: &GraphModel) -> Option<AlgorithmResult> {
	let result = match lens {
		Lens::Plain => return None,
		Lens::Rank => AlgorithmResult::Rank(degree_ranking(graph)),
		Lens::Community => AlgorithmResult::Community(kind_communities(graph)),
		Lens::Path => AlgorithmResult::Path(PathResult::default()),
		Lens::Recommendation => AlgorithmResult::Recommendation(RecommendationResult::default()),
	};
	Some(result)
}

/// Degree centrality, normalized to the best-connected node.
fn degree_ranking(graph: &GraphModel) -> RankResult {
	let degrees = graph.degrees();
	let max = degrees.iter().copied().max().unwrap_or(0).max(1) as f64;
	RankResult {
		algorithm: RankAlgorithm::Degree,
		entries: graph
			.nodes()
			.iter()
			.zip(degrees)
			.filter(|(_, degree)| *degree > 0)
			.map(|(node, degree)| RankEntry {
				node_id: node.id.to_string(),
				score: degree as f64 / max,
			})
			.collect(),
	}
}

/// Users in one community, repositories in another.
fn kind_communities(graph: &GraphModel) -> CommunityResult {
	let id_of = |kind: NodeKind| match kind {
		NodeKind::User => 0,
		NodeKind::Repository => 1,
	};
	CommunityResult {
		assignments: graph
			.nodes()
			.iter()
			.map(|node| CommunityAssignment {
				node_id: node.id.to_string(),
				community_id: id_of(node.kind),
			})
			.collect(),
		communities: vec![
			CommunityInfo {
				community_id: 0,
				label: Some("Developers".into()),
				color: None,
			},
			CommunityInfo {
				community_id: 1,
				label: Some("Repositories".into()),
				color: None,
			},
		],
	}
}
