use std::collections::HashMap;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::forces::{self, Link};
use crate::config::ForceConfig;
use crate::error::SimulationError;
use crate::generation::{Generation, GenerationCounter};
use crate::graph::{GraphModel, NodeId, NodeRole};

/// Canvas size the layout is centred in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl Bounds {
	/// Canvas of `width` by `height`.
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Middle of the canvas.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}
}

/// Simulated position, velocity and pin state of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeLayout {
	/// Node this entry lays out.
	pub id: NodeId,
	/// Position in graph units.
	pub x: f64,
	/// Vertical position in graph units.
	pub y: f64,
	/// Velocity, in graph units per tick.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Held in place by a drag or an explicit pin.
	pub pinned: bool,
	/// Where a pinned node snaps back to.
	pub fixed_x: Option<f64>,
	/// Vertical snap-back position.
	pub fixed_y: Option<f64>,
	/// Collision radius in graph units.
	pub radius: f64,
}

impl NodeLayout {
	pub(crate) fn new(id: NodeId, x: f64, y: f64, radius: f64) -> Self {
		Self {
			id,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			pinned: false,
			fixed_x: None,
			fixed_y: None,
			radius,
		}
	}

	pub(crate) fn pin(&mut self, x: f64, y: f64) {
		self.pinned = true;
		self.fixed_x = Some(x);
		self.fixed_y = Some(y);
		self.x = x;
		self.y = y;
		self.vx = 0.0;
		self.vy = 0.0;
	}

	pub(crate) fn unpin(&mut self) {
		self.pinned = false;
		self.fixed_x = None;
		self.fixed_y = None;
	}
}

/// Token for one initialized simulation. Becomes stale on `dispose` or the
/// next `initialize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationHandle {
	generation: Generation,
}

impl SimulationHandle {
	/// Generation the handle was issued for.
	pub fn generation(&self) -> Generation {
		self.generation
	}
}

/// Copy of the layout after a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSnapshot {
	/// Simulation the snapshot was taken from.
	pub generation: Generation,
	/// Ticks since `initialize`.
	pub tick: u64,
	/// Cooling parameter after the tick.
	pub alpha: f64,
	/// Whether the layout has come to rest.
	pub settled: bool,
	/// In graph node order.
	pub nodes: Vec<NodeLayout>,
}

impl LayoutSnapshot {
	/// Layout of `id`, if present.
	pub fn node(&self, id: &str) -> Option<&NodeLayout> {
		self.nodes.iter().find(|n| n.id.as_str() == id)
	}

	/// Position of `id`, if present.
	pub fn position(&self, id: &str) -> Option<(f64, f64)> {
		self.node(id).map(|n| (n.x, n.y))
	}

	/// Kinetic energy, `Σ (vx² + vy²)`.
	pub fn energy(&self) -> f64 {
		self.nodes.iter().map(|n| n.vx * n.vx + n.vy * n.vy).sum()
	}
}

struct Simulation {
	bodies: Vec<NodeLayout>,
	index: HashMap<NodeId, usize>,
	links: Vec<Link>,
	emphasized: Vec<bool>,
	edge_endpoints: Vec<(usize, usize)>,
	alpha: f64,
	alpha_target: f64,
	ticks: u64,
	center: (f64, f64),
	rng: StdRng,
}

/// Force-directed layout with an explicit lifecycle:
/// `initialize` → `tick`* → `dispose`. Owns every [`NodeLayout`]; nothing
/// else moves nodes.
pub struct LayoutEngine {
	config: ForceConfig,
	generations: GenerationCounter,
	simulation: Option<Simulation>,
}

impl LayoutEngine {
	/// An idle engine; nothing runs until `initialize`.
	pub fn new(config: ForceConfig) -> Self {
		Self {
			config: config.sanitized(),
			generations: GenerationCounter::new(),
			simulation: None,
		}
	}

	/// Force parameters in use, after sanitizing.
	pub fn config(&self) -> &ForceConfig {
		&self.config
	}

	/// Starts a simulation for `graph`, disposing any running one first.
	pub fn initialize(&mut self, graph: &GraphModel, bounds: Bounds) -> SimulationHandle {
		if self.simulation.is_some() {
			self.dispose();
		}
		let generation = self.generations.advance();
		let mut rng = StdRng::seed_from_u64(self.config.seed);
		let center = bounds.center();
		let spread = self.config.link_distance * (graph.node_count().max(1) as f64).sqrt();

		let bodies: Vec<NodeLayout> = graph
			.nodes()
			.iter()
			.map(|node| {
				let (x, y) = if node.role == NodeRole::Primary {
					center
				} else {
					(
						center.0 + rng.gen_range(-spread..=spread),
						center.1 + rng.gen_range(-spread..=spread),
					)
				};
				NodeLayout::new(node.id.clone(), x, y, node.kind.base_radius())
			})
			.collect();

		let mut simulation = Simulation {
			index: index_of(&bodies),
			bodies,
			links: Vec::new(),
			emphasized: vec![false; graph.edge_count()],
			edge_endpoints: graph.edge_endpoints(),
			alpha: 1.0,
			alpha_target: 0.0,
			ticks: 0,
			center,
			rng,
		};
		simulation.links = build_links(&simulation, &self.config);
		debug!(
			"layout generation {} initialized with {} nodes, {} links",
			generation.get(),
			simulation.bodies.len(),
			simulation.links.len()
		);
		self.simulation = Some(simulation);
		SimulationHandle { generation }
	}

	/// Whether a simulation is live.
	pub fn is_running(&self) -> bool {
		self.simulation.is_some()
	}

	/// Whether `handle` still refers to the running simulation.
	pub fn is_live(&self, handle: SimulationHandle) -> bool {
		self.simulation.is_some() && self.generations.is_current(handle.generation)
	}

	/// Latest generation issued by this engine.
	pub fn generation(&self) -> Generation {
		self.generations.current()
	}

	fn live(&self) -> Result<&Simulation, SimulationError> {
		self.simulation
			.as_ref()
			.ok_or(SimulationError::DisposedEngineReuse(self.generations.current().get()))
	}

	fn live_mut(&mut self) -> Result<&mut Simulation, SimulationError> {
		let generation = self.generations.current().get();
		self.simulation
			.as_mut()
			.ok_or(SimulationError::DisposedEngineReuse(generation))
	}

	/// Advances one tick. Returns `Ok(false)` without touching anything once
	/// the simulation has cooled down.
	pub fn step(&mut self) -> Result<bool, SimulationError> {
		let config = self.config.clone();
		let sim = self.live_mut()?;
		if sim.alpha < config.alpha_min && sim.alpha_target < config.alpha_min {
			return Ok(false);
		}
		sim.alpha += (sim.alpha_target - sim.alpha) * config.alpha_decay;
		let alpha = sim.alpha;

		forces::repulsion(&mut sim.bodies, &config, alpha, &mut sim.rng);
		forces::links(&mut sim.bodies, &sim.links, alpha, &mut sim.rng);
		forces::centering(&mut sim.bodies, sim.center, config.center_strength);
		forces::collision(
			&mut sim.bodies,
			config.collision_padding,
			config.collision_strength,
			&mut sim.rng,
		);
		forces::integrate(&mut sim.bodies, config.velocity_decay);
		sim.ticks += 1;
		Ok(true)
	}

	/// Advances one tick and returns the resulting layout.
	pub fn tick(&mut self) -> Result<LayoutSnapshot, SimulationError> {
		self.step()?;
		self.snapshot()
	}

	/// Copy of the current layout. Fails once disposed.
	pub fn snapshot(&self) -> Result<LayoutSnapshot, SimulationError> {
		let sim = self.live()?;
		Ok(LayoutSnapshot {
			generation: self.generations.current(),
			tick: sim.ticks,
			alpha: sim.alpha,
			settled: sim.alpha < self.config.alpha_min && sim.alpha_target < self.config.alpha_min,
			nodes: sim.bodies.clone(),
		})
	}

	/// Current layout without copying. Empty once disposed.
	pub fn nodes(&self) -> &[NodeLayout] {
		self.simulation.as_ref().map(|s| s.bodies.as_slice()).unwrap_or(&[])
	}

	/// Layout of `id` in the live simulation.
	pub fn node(&self, id: &str) -> Option<&NodeLayout> {
		let sim = self.simulation.as_ref()?;
		sim.index.get(id).map(|&i| &sim.bodies[i])
	}

	/// Cooled below `alpha_min` with nothing holding it warm.
	pub fn is_settled(&self) -> bool {
		self.simulation.as_ref().is_none_or(|s| {
			s.alpha < self.config.alpha_min && s.alpha_target < self.config.alpha_min
		})
	}

	/// Steps until settled or `max_ticks`; returns the ticks taken.
	pub fn run_until_settled(&mut self, max_ticks: u64) -> Result<u64, SimulationError> {
		let mut taken = 0;
		while taken < max_ticks && self.step()? {
			taken += 1;
		}
		Ok(taken)
	}

	/// Fixes `id` at `(x, y)`. Returns `Ok(false)` for unknown ids.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) -> Result<bool, SimulationError> {
		let sim = self.live_mut()?;
		let Some(&i) = sim.index.get(id) else {
			return Ok(false);
		};
		sim.bodies[i].pin(x, y);
		Ok(true)
	}

	/// Releases a pinned node. Returns `Ok(false)` for unknown ids.
	pub fn unpin(&mut self, id: &str) -> Result<bool, SimulationError> {
		let sim = self.live_mut()?;
		let Some(&i) = sim.index.get(id) else {
			return Ok(false);
		};
		sim.bodies[i].unpin();
		Ok(true)
	}

	/// Whether `id` is pinned. Unknown ids are not.
	pub fn is_pinned(&self, id: &str) -> bool {
		self.node(id).is_some_and(|n| n.pinned)
	}

	/// Keeps the simulation warm (drag in progress) or lets it cool (`0.0`).
	pub fn set_alpha_target(&mut self, target: f64) -> Result<(), SimulationError> {
		let sim = self.live_mut()?;
		sim.alpha_target = target.clamp(0.0, 1.0);
		Ok(())
	}

	/// Raises alpha to at least `alpha` so the layout moves again.
	pub fn reheat(&mut self, alpha: f64) -> Result<(), SimulationError> {
		let sim = self.live_mut()?;
		sim.alpha = sim.alpha.max(alpha.clamp(0.0, 1.0));
		Ok(())
	}

	/// Marks graph edges (by index) whose springs should pull harder.
	pub fn emphasize_links(&mut self, edges: &[usize]) -> Result<(), SimulationError> {
		let config = self.config.clone();
		let sim = self.live_mut()?;
		let mut emphasized = vec![false; sim.emphasized.len()];
		for &edge in edges {
			if let Some(slot) = emphasized.get_mut(edge) {
				*slot = true;
			}
		}
		if emphasized == sim.emphasized {
			return Ok(());
		}
		sim.emphasized = emphasized;
		sim.links = build_links(sim, &config);
		sim.alpha = sim.alpha.max(0.3);
		Ok(())
	}

	/// Follows a refreshed graph: surviving nodes keep their layout, new nodes
	/// start next to a placed neighbor, departed nodes are dropped.
	pub fn sync(&mut self, graph: &GraphModel) -> Result<(), SimulationError> {
		let config = self.config.clone();
		let sim = self.live_mut()?;
		let mut old: HashMap<NodeId, NodeLayout> =
			sim.bodies.drain(..).map(|b| (b.id.clone(), b)).collect();

		let mut bodies = Vec::with_capacity(graph.node_count());
		let mut fresh = Vec::new();
		for node in graph.nodes() {
			match old.remove(&node.id) {
				Some(mut body) => {
					body.radius = node.kind.base_radius();
					bodies.push(body);
				}
				None => {
					fresh.push(bodies.len());
					bodies.push(NodeLayout::new(
						node.id.clone(),
						sim.center.0,
						sim.center.1,
						node.kind.base_radius(),
					));
				}
			}
		}
		let endpoints = graph.edge_endpoints();
		for &i in &fresh {
			let anchor = endpoints
				.iter()
				.find_map(|&(s, t)| match (s == i, t == i) {
					(true, _) if !fresh.contains(&t) => Some(t),
					(_, true) if !fresh.contains(&s) => Some(s),
					_ => None,
				})
				.map(|a| (bodies[a].x, bodies[a].y))
				.unwrap_or(sim.center);
			let spread = config.link_distance;
			bodies[i].x = anchor.0 + sim.rng.gen_range(-spread..=spread);
			bodies[i].y = anchor.1 + sim.rng.gen_range(-spread..=spread);
		}
		debug!(
			"layout sync: {} kept, {} added, {} removed",
			bodies.len() - fresh.len(),
			fresh.len(),
			old.len()
		);

		sim.index = index_of(&bodies);
		sim.bodies = bodies;
		sim.edge_endpoints = endpoints;
		sim.emphasized = vec![false; graph.edge_count()];
		sim.links = build_links(sim, &config);
		sim.alpha = sim.alpha.max(0.3);
		Ok(())
	}

	/// Moves the centering target. Positions are left alone.
	pub fn resize(&mut self, bounds: Bounds) -> Result<(), SimulationError> {
		let sim = self.live_mut()?;
		sim.center = bounds.center();
		sim.alpha = sim.alpha.max(0.1);
		Ok(())
	}

	/// Stops the simulation and drops every layout entry. Idempotent.
	pub fn dispose(&mut self) {
		if self.simulation.take().is_some() {
			let generation = self.generations.advance();
			debug!("layout disposed; next generation {}", generation.get());
		}
	}
}

impl Drop for LayoutEngine {
	fn drop(&mut self) {
		self.dispose();
	}
}

fn index_of(bodies: &[NodeLayout]) -> HashMap<NodeId, usize> {
	bodies.iter().enumerate().map(|(i, b)| (b.id.clone(), i)).collect()
}

fn build_links(sim: &Simulation, config: &ForceConfig) -> Vec<Link> {
	let mut degree = vec![0usize; sim.bodies.len()];
	for &(s, t) in &sim.edge_endpoints {
		if s != t {
			degree[s] += 1;
			degree[t] += 1;
		}
	}
	sim.edge_endpoints
		.iter()
		.enumerate()
		.filter(|(_, (s, t))| s != t)
		.map(|(edge, &(s, t))| {
			let base = 1.0 / degree[s].min(degree[t]).max(1) as f64;
			let rims = sim.bodies[s].radius + sim.bodies[t].radius;
			let emphasized = sim.emphasized.get(edge).copied().unwrap_or(false);
			let (strength, distance) = if emphasized {
				(
					(base * config.emphasized_link_factor).min(1.0),
					config.link_distance * 0.6 + rims,
				)
			} else {
				(base, config.link_distance + rims)
			};
			Link {
				source: s,
				target: t,
				edge,
				distance,
				strength,
				bias: degree[s] as f64 / (degree[s] + degree[t]) as f64,
			}
		})
		.collect()
}
