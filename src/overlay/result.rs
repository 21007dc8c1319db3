use serde::{Deserialize, Serialize};

/// Output of one external graph algorithm, read-only to the engine.
///
/// Deserializes from JSON with an internal `kind` tag:
/// `{"kind": "path", "ordered_node_ids": [...], "edge_weights": [...]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlgorithmResult {
	/// Influence scores.
	Rank(RankResult),
	/// Community membership.
	Community(CommunityResult),
	/// Shortest path.
	Path(PathResult),
	/// Suggested connections.
	Recommendation(RecommendationResult),
}

impl AlgorithmResult {
	/// The lens this result is shown under.
	pub fn lens(&self) -> Lens {
		match self {
			AlgorithmResult::Rank(_) => Lens::Rank,
			AlgorithmResult::Community(_) => Lens::Community,
			AlgorithmResult::Path(_) => Lens::Path,
			AlgorithmResult::Recommendation(_) => Lens::Recommendation,
		}
	}
}

/// Analytical lens a view is currently showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lens {
	/// Kinds and roles only.
	#[default]
	Plain,
	/// Influence scores.
	Rank,
	/// Community colours.
	Community,
	/// A highlighted path.
	Path,
	/// Suggested connections.
	Recommendation,
}

impl Lens {
	/// In button order.
	pub const ALL: [Lens; 5] = [
		Lens::Plain,
		Lens::Rank,
		Lens::Community,
		Lens::Path,
		Lens::Recommendation,
	];

	/// Button text.
	pub fn label(self) -> &'static str {
		match self {
			Lens::Plain => "Network",
			Lens::Rank => "Influence",
			Lens::Community => "Communities",
			Lens::Path => "Shortest path",
			Lens::Recommendation => "Recommendations",
		}
	}
}

/// Scoring behind a rank result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankAlgorithm {
	/// PageRank.
	#[default]
	#[serde(rename = "pagerank")]
	PageRank,
	/// HITS authority score.
	#[serde(rename = "hits")]
	Hits,
	/// k-core number.
	#[serde(rename = "kcore")]
	KCore,
	/// Degree centrality; what the engine synthesizes when the service fails.
	#[serde(rename = "degree")]
	Degree,
}

impl RankAlgorithm {
	/// Name shown in the legend.
	pub fn label(self) -> &'static str {
		match self {
			RankAlgorithm::PageRank => "PageRank",
			RankAlgorithm::Hits => "HITS",
			RankAlgorithm::KCore => "k-core",
			RankAlgorithm::Degree => "Degree",
		}
	}
}

/// Score of one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
	/// Node the score belongs to.
	#[serde(alias = "nodeId")]
	pub node_id: String,
	/// Higher is more influential; the scale depends on the algorithm.
	pub score: f64,
}

/// Ranked nodes, in any order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RankResult {
	/// How the scores were computed.
	#[serde(default)]
	pub algorithm: RankAlgorithm,
	/// One per scored node.
	#[serde(default)]
	pub entries: Vec<RankEntry>,
}

/// Membership of one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommunityAssignment {
	/// The member node.
	#[serde(alias = "nodeId")]
	pub node_id: String,
	/// Any integer; only equality matters.
	#[serde(alias = "communityId")]
	pub community_id: i64,
}

/// A community the result declares, optionally with its own colour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommunityInfo {
	/// Matches [`CommunityAssignment::community_id`].
	#[serde(alias = "communityId")]
	pub community_id: i64,
	/// Name for the legend.
	#[serde(default)]
	pub label: Option<String>,
	/// CSS colour that overrides the palette.
	#[serde(default)]
	pub color: Option<String>,
}

/// Community detection output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityResult {
	/// Nodes missing here belong to no community.
	#[serde(default)]
	pub assignments: Vec<CommunityAssignment>,
	/// Optional labels and colours per community.
	#[serde(default)]
	pub communities: Vec<CommunityInfo>,
}

/// A path between two nodes. Empty means "no path found".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
	/// From source to target.
	#[serde(default, alias = "orderedNodeIds")]
	pub ordered_node_ids: Vec<String>,
	/// Weight of hop `i`, between `ordered_node_ids[i]` and `[i + 1]`.
	#[serde(default, alias = "edgeWeights")]
	pub edge_weights: Vec<f64>,
}

impl PathResult {
	/// Whether no path was found.
	pub fn is_empty(&self) -> bool {
		self.ordered_node_ids.is_empty()
	}
}

/// A suggested account to follow or work with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
	/// Recommended node.
	#[serde(alias = "candidateId")]
	pub candidate_id: String,
	/// `0..=100`.
	#[serde(alias = "compatibilityScore")]
	pub compatibility_score: f64,
	/// Languages, topics or organisations in common.
	#[serde(default, alias = "sharedAttributes")]
	pub shared_attributes: Vec<String>,
}

/// Ranked recommendations for the viewed account.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
	/// Best candidate first.
	#[serde(default)]
	pub entries: Vec<Recommendation>,
}
