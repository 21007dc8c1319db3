//! Canonical node/edge model and the payload normalizer that builds it.

mod model;
mod normalize;

pub use model::{
	DisplayAttributes, Edge, EdgeKind, GraphModel, IdMarker, MetricSnapshot, Node, NodeId, NodeKind,
	NodeRole,
};
pub use normalize::{NormalizeReport, Normalized, PayloadShape, normalize};
