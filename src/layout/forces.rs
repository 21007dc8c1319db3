//! The four forces of the layout, applied in order each tick:
//! repulsion, link springs, centering, collision. Then velocities are
//! integrated. Pinned bodies take part in every force as sources but are
//! reset to their fixed position on integration.

use rand::Rng;
use rand::rngs::StdRng;

use super::engine::NodeLayout;
use crate::config::ForceConfig;

/// Spring between two bodies, precomputed from the graph.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Link {
	pub source: usize,
	pub target: usize,
	/// Index of the edge in the graph model this spring came from.
	pub edge: usize,
	pub distance: f64,
	pub strength: f64,
	/// Share of the correction applied to the target.
	pub bias: f64,
}

fn jiggle(rng: &mut StdRng) -> f64 {
	rng.gen_range(-0.5..0.5) * 1e-6
}

/// Inverse-square many-body force over every pair.
pub(crate) fn repulsion(bodies: &mut [NodeLayout], config: &ForceConfig, alpha: f64, rng: &mut StdRng) {
	let max2 = config.charge_distance_max * config.charge_distance_max;
	for i in 0..bodies.len() {
		for j in (i + 1)..bodies.len() {
			let mut dx = bodies[j].x - bodies[i].x;
			let mut dy = bodies[j].y - bodies[i].y;
			if dx == 0.0 {
				dx = jiggle(rng);
			}
			if dy == 0.0 {
				dy = jiggle(rng);
			}
			let mut l2 = dx * dx + dy * dy;
			if l2 >= max2 {
				continue;
			}
			// Soften very close pairs instead of letting the force explode.
			if l2 < 1.0 {
				l2 = l2.sqrt();
			}
			let w = config.charge_strength * alpha / l2;
			bodies[i].vx += dx * w;
			bodies[i].vy += dy * w;
			bodies[j].vx -= dx * w;
			bodies[j].vy -= dy * w;
		}
	}
}

/// Springs pulling linked bodies toward their rest distance.
pub(crate) fn links(bodies: &mut [NodeLayout], links: &[Link], alpha: f64, rng: &mut StdRng) {
	for link in links {
		let (s, t) = (link.source, link.target);
		let mut dx = bodies[t].x + bodies[t].vx - bodies[s].x - bodies[s].vx;
		let mut dy = bodies[t].y + bodies[t].vy - bodies[s].y - bodies[s].vy;
		if dx == 0.0 {
			dx = jiggle(rng);
		}
		if dy == 0.0 {
			dy = jiggle(rng);
		}
		let l = (dx * dx + dy * dy).sqrt();
		let f = (l - link.distance) / l * alpha * link.strength;
		dx *= f;
		dy *= f;
		bodies[t].vx -= dx * link.bias;
		bodies[t].vy -= dy * link.bias;
		bodies[s].vx += dx * (1.0 - link.bias);
		bodies[s].vy += dy * (1.0 - link.bias);
	}
}

/// Translates free bodies so the layout's mean drifts toward `center`.
pub(crate) fn centering(bodies: &mut [NodeLayout], center: (f64, f64), strength: f64) {
	if bodies.is_empty() {
		return;
	}
	let n = bodies.len() as f64;
	let (sx, sy) = bodies
		.iter()
		.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
	let shift_x = (sx / n - center.0) * strength;
	let shift_y = (sy / n - center.1) * strength;
	for body in bodies.iter_mut().filter(|b| !b.pinned) {
		body.x -= shift_x;
		body.y -= shift_y;
	}
}

/// Pushes overlapping circles apart. The larger body of a pair moves less.
pub(crate) fn collision(bodies: &mut [NodeLayout], padding: f64, strength: f64, rng: &mut StdRng) {
	for i in 0..bodies.len() {
		for j in (i + 1)..bodies.len() {
			let ri = bodies[i].radius + padding;
			let rj = bodies[j].radius + padding;
			let r = ri + rj;
			let mut dx = bodies[i].x + bodies[i].vx - bodies[j].x - bodies[j].vx;
			let mut dy = bodies[i].y + bodies[i].vy - bodies[j].y - bodies[j].vy;
			if dx * dx + dy * dy >= r * r {
				continue;
			}
			if dx == 0.0 {
				dx = jiggle(rng);
			}
			if dy == 0.0 {
				dy = jiggle(rng);
			}
			let l = (dx * dx + dy * dy).sqrt();
			let f = (r - l) / l * strength;
			dx *= f;
			dy *= f;
			let (ri2, rj2) = (ri * ri, rj * rj);
			let share_i = rj2 / (ri2 + rj2);
			bodies[i].vx += dx * share_i;
			bodies[i].vy += dy * share_i;
			bodies[j].vx -= dx * (1.0 - share_i);
			bodies[j].vy -= dy * (1.0 - share_i);
		}
	}
}

/// Applies velocity decay and moves free bodies; pinned ones snap back and
/// lose their velocity.
pub(crate) fn integrate(bodies: &mut [NodeLayout], velocity_decay: f64) {
	for body in bodies.iter_mut() {
		if body.pinned {
			body.x = body.fixed_x.unwrap_or(body.x);
			body.y = body.fixed_y.unwrap_or(body.y);
			body.vx = 0.0;
			body.vy = 0.0;
		} else {
			body.vx *= 1.0 - velocity_decay;
			body.vy *= 1.0 - velocity_decay;
			body.x += body.vx;
			body.y += body.vy;
		}
	}
}
