//! Force-directed layout: simulation lifecycle, forces and frame scheduling.

mod engine;
mod forces;
mod schedule;

pub use engine::{Bounds, LayoutEngine, LayoutSnapshot, NodeLayout, SimulationHandle};
pub use schedule::TickLoop;
