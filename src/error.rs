//! Error taxonomy for the visualization engine.
//!
//! Only [`SimulationError`] signals a broken caller contract. The other kinds
//! are recovered where they occur (empty graph, neutral styling, placeholder
//! data) and end up as a [`Notice`](crate::view::Notice) on the owning view.

use thiserror::Error;

/// Upstream payload could not be turned into a graph.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NormalizationError {
	/// None of the known payload shapes matched.
	#[error("unrecognized graph payload shape")]
	InvalidFormat,
	/// The payload carried nothing at all (`null`).
	#[error("graph payload is empty")]
	EmptyPayload,
}

/// Misuse of a layout engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
	/// The simulation behind this engine (or handle) has been disposed.
	#[error("layout simulation was disposed (generation {0})")]
	DisposedEngineReuse(u64),
}

/// Problems found while deriving render hints. Always recovered.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OverlayError {
	/// A node was assigned to a community the result never declared.
	#[error("community {0} is not declared by the result; using palette colour")]
	UnknownCommunityId(i64),
	/// The result referenced a node that is not part of the graph.
	#[error("result references unknown node `{0}`")]
	UnknownNode(String),
}

/// An external fetch did not produce usable data.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchFailure {
	/// The service answered with a non-success status.
	#[error("service answered with status `{0}`")]
	Status(String),
	/// The response body did not have the expected shape.
	#[error("malformed response: {0}")]
	Malformed(String),
	/// The request never completed (network error, timeout).
	#[error("service unavailable: {0}")]
	Unavailable(String),
}

/// Crate-level error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
	/// The payload could not be turned into a graph.
	#[error(transparent)]
	Normalization(#[from] NormalizationError),
	/// The layout engine refused an operation.
	#[error(transparent)]
	Simulation(#[from] SimulationError),
	/// An overlay result did not fit the graph.
	#[error(transparent)]
	Overlay(#[from] OverlayError),
	/// A collaborator service failed.
	#[error(transparent)]
	Fetch(#[from] FetchFailure),
}

/// Crate-level result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
