//! Colours used by the overlays.
//!
//! Community colours are a documented function of the community id:
//! `PALETTE[id mod PALETTE.len()]` with a Euclidean modulo, so negative ids
//! are fine and re-rendering the same result never reshuffles colours.

use crate::graph::{EdgeKind, NodeKind, NodeRole};

/// Categorical palette (d3 category10).
pub const PALETTE: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Fill for nodes the active lens says nothing about.
pub const NEUTRAL: &str = "#5c6370";

/// The account being viewed.
pub const PRIMARY: &str = "#ffb347";
/// Other accounts.
pub const USER: &str = "#4e9de0";
/// Repositories.
pub const REPOSITORY: &str = "#3fbf7f";

/// Nodes and edges on a path.
pub const PATH: &str = "#ffd166";
/// First node of a path.
pub const PATH_START: &str = "#06d6a0";
/// Last node of a path.
pub const PATH_END: &str = "#ef476f";

/// Low and high ends of the score ramp used by rank and recommendation.
const SCORE_LOW: (u8, u8, u8) = (0x3a, 0x4a, 0x6b);
const SCORE_HIGH: (u8, u8, u8) = (0xff, 0x6b, 0x3d);

/// `PALETTE[community_id mod 10]`, Euclidean, so negative ids work.
pub fn community_color(community_id: i64) -> &'static str {
	PALETTE[community_id.rem_euclid(PALETTE.len() as i64) as usize]
}

/// Fill under the plain lens.
pub fn node_color(kind: NodeKind, role: NodeRole) -> &'static str {
	match (role, kind) {
		(NodeRole::Primary, _) => PRIMARY,
		(_, NodeKind::Repository) => REPOSITORY,
		(_, NodeKind::User) => USER,
	}
}

/// Stroke colour for an edge kind.
pub fn edge_color(kind: EdgeKind) -> &'static str {
	match kind {
		EdgeKind::Follows => "#64b4ff",
		EdgeKind::Collaborates => "#7ddc9a",
		EdgeKind::Owns => "#9aa5b1",
		EdgeKind::StarredBy => "#f2c94c",
		EdgeKind::Generic => "#8892a0",
	}
}

/// Colour for a score in `0.0..=1.0`; values outside are clamped.
pub fn score_color(t: f64) -> String {
	let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
	let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
	format!(
		"#{:02x}{:02x}{:02x}",
		mix(SCORE_LOW.0, SCORE_HIGH.0),
		mix(SCORE_LOW.1, SCORE_HIGH.1),
		mix(SCORE_LOW.2, SCORE_HIGH.2)
	)
}
