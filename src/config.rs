//! Tunable constants for the simulation, the pointer handling and the overlays.
//!
//! Everything has a `Default` carrying the tuned values; a host may override
//! any subset by handing JSON to [`EngineConfig::from_json`].

use log::warn;
use serde::Deserialize;

/// Force simulation parameters. Alpha semantics follow the usual
/// d3-force conventions: `alpha` cools toward `alpha_target` and the
/// simulation settles once it drops below `alpha_min`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
	/// Pairwise charge; negative repels.
	pub charge_strength: f64,
	/// Pairs further apart than this ignore each other.
	pub charge_distance_max: f64,
	/// Spring rest length between node rims.
	pub link_distance: f64,
	/// Multiplier on spring strength for same-community and path edges.
	pub emphasized_link_factor: f64,
	/// Pull of every node toward the canvas centre.
	pub center_strength: f64,
	/// Gap kept between node rims.
	pub collision_padding: f64,
	/// Share of an overlap resolved per tick.
	pub collision_strength: f64,
	/// Share of velocity lost per tick.
	pub velocity_decay: f64,
	/// Alpha below which the simulation counts as settled.
	pub alpha_min: f64,
	/// Fraction of the distance to `alpha_target` covered per tick.
	pub alpha_decay: f64,
	/// `alpha_target` while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Seed for initial placement and coincident-point jitter.
	pub seed: u64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge_strength: -150.0,
			charge_distance_max: 600.0,
			link_distance: 40.0,
			emphasized_link_factor: 2.5,
			center_strength: 0.05,
			collision_padding: 2.0,
			collision_strength: 0.7,
			velocity_decay: 0.4,
			alpha_min,
			// 300 ticks from alpha 1.0 down to alpha_min.
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			seed: 0x5eed_c0de,
		}
	}
}

impl ForceConfig {
	/// Parameters for the comparison view: a little looser and on its own
	/// seed so the two canvases never look like copies.
	pub fn secondary() -> Self {
		Self {
			charge_strength: -120.0,
			link_distance: 50.0,
			seed: 0xc0ffee,
			..Self::default()
		}
	}

	/// Replaces values the simulation cannot run with (non-finite numbers,
	/// negative distances, rates outside `0..=1`) by their defaults.
	pub fn sanitized(self) -> Self {
		let d = Self::default();
		let distance = |v: f64| v.is_finite() && v >= 0.0;
		let rate = |v: f64| (0.0..=1.0).contains(&v);
		Self {
			charge_strength: keep("charge_strength", self.charge_strength, d.charge_strength, f64::is_finite),
			charge_distance_max: keep(
				"charge_distance_max",
				self.charge_distance_max,
				d.charge_distance_max,
				distance,
			),
			link_distance: keep("link_distance", self.link_distance, d.link_distance, distance),
			emphasized_link_factor: keep(
				"emphasized_link_factor",
				self.emphasized_link_factor,
				d.emphasized_link_factor,
				distance,
			),
			center_strength: keep("center_strength", self.center_strength, d.center_strength, rate),
			collision_padding: keep("collision_padding", self.collision_padding, d.collision_padding, distance),
			collision_strength: keep("collision_strength", self.collision_strength, d.collision_strength, rate),
			velocity_decay: keep("velocity_decay", self.velocity_decay, d.velocity_decay, rate),
			alpha_min: keep("alpha_min", self.alpha_min, d.alpha_min, rate),
			alpha_decay: keep("alpha_decay", self.alpha_decay, d.alpha_decay, rate),
			drag_alpha_target: keep("drag_alpha_target", self.drag_alpha_target, d.drag_alpha_target, rate),
			seed: self.seed,
		}
	}
}

fn keep(name: &str, value: f64, fallback: f64, valid: impl Fn(f64) -> bool) -> f64 {
	if valid(value) {
		value
	} else {
		warn!("ignoring {name} = {value}, using {fallback}");
		fallback
	}
}

/// Pointer, zoom and hover tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
	/// Screen-space travel (px) under which a press/release counts as a click.
	pub click_threshold: f64,
	/// Minimum hit radius in graph units, so small nodes stay grabbable.
	pub hit_radius: f64,
	/// Smallest zoom factor.
	pub min_zoom: f64,
	/// Largest zoom factor.
	pub max_zoom: f64,
	/// Seconds before a hover highlight starts fading in.
	pub hover_delay: f64,
	/// Fade-in speed, in highlight units per second.
	pub hover_fade_in: f64,
	/// Fade-out speed, in highlight units per second.
	pub hover_fade_out: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			click_threshold: 4.0,
			hit_radius: 12.0,
			min_zoom: 0.1,
			max_zoom: 10.0,
			hover_delay: 0.08,
			hover_fade_in: 1.8,
			hover_fade_out: 1.26,
		}
	}
}

impl InteractionConfig {
	/// Same as [`ForceConfig::sanitized`]. A zoom range that is empty or not
	/// positive falls back to the default range as a whole.
	pub fn sanitized(self) -> Self {
		let d = Self::default();
		let non_negative = |v: f64| v.is_finite() && v >= 0.0;
		let zoom_ok = self.min_zoom.is_finite()
			&& self.max_zoom.is_finite()
			&& self.min_zoom > 0.0
			&& self.min_zoom <= self.max_zoom;
		if !zoom_ok {
			warn!("ignoring zoom range {}..{}", self.min_zoom, self.max_zoom);
		}
		Self {
			click_threshold: keep("click_threshold", self.click_threshold, d.click_threshold, non_negative),
			hit_radius: keep("hit_radius", self.hit_radius, d.hit_radius, non_negative),
			min_zoom: if zoom_ok { self.min_zoom } else { d.min_zoom },
			max_zoom: if zoom_ok { self.max_zoom } else { d.max_zoom },
			hover_delay: keep("hover_delay", self.hover_delay, d.hover_delay, non_negative),
			hover_fade_in: keep("hover_fade_in", self.hover_fade_in, d.hover_fade_in, non_negative),
			hover_fade_out: keep("hover_fade_out", self.hover_fade_out, d.hover_fade_out, non_negative),
		}
	}
}

/// How much the overlays may change node styling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
	/// Graphs at most this large label every node.
	pub label_all_below: usize,
	/// Ranked nodes that keep a label on large graphs.
	pub rank_label_top: usize,
	/// Largest extra radius, as a multiple, for a top score.
	pub max_radius_boost: f64,
	/// Opacity of nodes outside the active lens.
	pub dimmed_opacity: f64,
}

impl Default for OverlayConfig {
	fn default() -> Self {
		Self {
			label_all_below: 40,
			rank_label_top: 10,
			max_radius_boost: 1.5,
			dimmed_opacity: 0.3,
		}
	}
}

/// Everything a [`GraphView`](crate::view::GraphView) needs.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	pub forces: ForceConfig,
	pub interaction: InteractionConfig,
	pub overlay: OverlayConfig,
}

impl EngineConfig {
	/// Defaults with the comparison view's force parameters.
	pub fn secondary() -> Self {
		Self {
			forces: ForceConfig::secondary(),
			..Self::default()
		}
	}

	/// Reads overrides; omitted fields keep their defaults and unusable
	/// values are replaced by them.
	pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
		let config: Self = serde_json::from_str(raw)?;
		Ok(Self {
			forces: config.forces.sanitized(),
			interaction: config.interaction.sanitized(),
			overlay: config.overlay,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn alpha_decay_reaches_alpha_min_in_about_300_ticks() {
		let config = ForceConfig::default();
		let alpha = (1.0 - config.alpha_decay).powi(300);
		assert!((alpha - config.alpha_min).abs() < 1e-9);
	}

	#[test]
	fn partial_json_keeps_defaults() {
		let config =
			EngineConfig::from_json(r#"{ "forces": { "seed": 7 }, "interaction": { "click_threshold": 9 } }"#)
				.unwrap();
		assert_eq!(config.forces.seed, 7);
		assert_eq!(config.forces.link_distance, ForceConfig::default().link_distance);
		assert_eq!(config.interaction.click_threshold, 9.0);
		assert_eq!(config.overlay, OverlayConfig::default());
	}

	#[test]
	fn unusable_overrides_fall_back_to_defaults() {
		let config = EngineConfig::from_json(
			r#"{
				"forces": { "link_distance": -10, "velocity_decay": 3, "charge_strength": -80 },
				"interaction": { "min_zoom": 5, "max_zoom": 2, "hit_radius": -1 }
			}"#,
		)
		.unwrap();
		let forces = ForceConfig::default();
		assert_eq!(config.forces.link_distance, forces.link_distance);
		assert_eq!(config.forces.velocity_decay, forces.velocity_decay);
		assert_eq!(config.forces.charge_strength, -80.0);

		let interaction = InteractionConfig::default();
		assert_eq!(
			(config.interaction.min_zoom, config.interaction.max_zoom),
			(interaction.min_zoom, interaction.max_zoom)
		);
		assert_eq!(config.interaction.hit_radius, interaction.hit_radius);
	}

	#[test]
	fn defaults_survive_sanitizing() {
		assert_eq!(ForceConfig::default().sanitized(), ForceConfig::default());
		assert_eq!(ForceConfig::secondary().sanitized(), ForceConfig::secondary());
		assert_eq!(InteractionConfig::default().sanitized(), InteractionConfig::default());
	}

	#[test]
	fn secondary_forces_differ_from_primary() {
		assert_ne!(EngineConfig::secondary().forces, ForceConfig::default());
	}
}
