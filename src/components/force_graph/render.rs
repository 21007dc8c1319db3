use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::scene::{EdgeShape, NodeShape, Scene, TooltipShape};

/// Replays `scene` onto the canvas.
pub fn paint(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(scene.background);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);

	if let Some(message) = &scene.message {
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.7)");
		ctx.set_font("16px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text(message, scene.width / 2.0, scene.height / 2.0);
		ctx.set_text_align("start");
	} else {
		let t = scene.transform;
		ctx.save();
		let _ = ctx.translate(t.x, t.y);
		let _ = ctx.scale(t.k, t.k);
		for edge in &scene.edges {
			paint_edge(edge, ctx);
		}
		for node in &scene.nodes {
			paint_node(node, ctx);
		}
		for label in &scene.labels {
			ctx.set_global_alpha(label.opacity);
			ctx.set_fill_style_str("white");
			ctx.set_font(&format!("{}px sans-serif", label.size));
			let _ = ctx.fill_text(&label.text, label.position.0, label.position.1);
		}
		ctx.set_global_alpha(1.0);
		ctx.restore();
	}

	paint_legend(scene, ctx);
	if let Some(banner) = &scene.banner {
		paint_banner(banner, scene.width, ctx);
	}
	if let Some(tooltip) = &scene.tooltip {
		paint_tooltip(tooltip, ctx);
	}
}

fn paint_edge(edge: &EdgeShape, ctx: &CanvasRenderingContext2d) {
	ctx.set_global_alpha(edge.opacity);
	ctx.set_stroke_style_str(&edge.color);
	ctx.set_line_width(edge.width);
	if let Some(dash) = &edge.dash {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash.dash),
			&JsValue::from_f64(dash.gap),
		));
		ctx.set_line_dash_offset(dash.offset);
	}
	ctx.begin_path();
	ctx.move_to(edge.from.0, edge.from.1);
	ctx.line_to(edge.to.0, edge.to.1);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if let Some([tip, left, right]) = edge.arrow {
		ctx.set_fill_style_str(&edge.color);
		ctx.begin_path();
		ctx.move_to(tip.0, tip.1);
		ctx.line_to(left.0, left.1);
		ctx.line_to(right.0, right.1);
		ctx.close_path();
		ctx.fill();
	}

	if let Some((text, (x, y))) = &edge.label {
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
		ctx.set_font("9px sans-serif");
		let _ = ctx.fill_text(text, *x + 2.0, *y - 2.0);
	}
	ctx.set_global_alpha(1.0);
}

fn paint_node(node: &NodeShape, ctx: &CanvasRenderingContext2d) {
	let (x, y) = node.center;

	if let Some(glow) = &node.glow {
		if let Ok(gradient) = ctx.create_radial_gradient(x, y, node.radius * 0.3, x, y, glow.radius) {
			let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", glow.alpha));
			let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", glow.alpha * 0.3));
			let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
			ctx.begin_path();
			let _ = ctx.arc(x, y, glow.radius, 0.0, 2.0 * PI);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill();
		}
	}

	ctx.set_global_alpha(node.opacity);
	ctx.begin_path();
	let _ = ctx.arc(x, y, node.radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&node.fill);
	ctx.fill();
	if let Some(stroke) = &node.stroke {
		ctx.set_stroke_style_str(&stroke.color);
		ctx.set_line_width(stroke.width);
		ctx.stroke();
	}
	ctx.set_global_alpha(1.0);

	if let Some((radius, width)) = node.ring {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str("#ffffff");
		ctx.set_line_width(width);
		ctx.stroke();
	}
}

fn paint_legend(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let (x, mut y) = (16.0, scene.height - 16.0 - 18.0 * scene.legend.len() as f64);
	ctx.set_font("12px sans-serif");
	for entry in &scene.legend {
		ctx.begin_path();
		let _ = ctx.arc(x + 5.0, y + 5.0, 5.0, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&entry.color);
		ctx.fill();
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
		let _ = ctx.fill_text(&entry.label, x + 16.0, y + 9.0);
		y += 18.0;
	}
}

fn paint_banner(text: &str, width: f64, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("rgba(255, 179, 71, 0.9)");
	ctx.fill_rect(0.0, 0.0, width, 24.0);
	ctx.set_fill_style_str("#1a1a2e");
	ctx.set_font("bold 12px sans-serif");
	let _ = ctx.fill_text(text, 12.0, 16.0);
}

fn paint_tooltip(tooltip: &TooltipShape, ctx: &CanvasRenderingContext2d) {
	let (x, y) = tooltip.anchor;
	let widest = std::iter::once(&tooltip.title)
		.chain(std::iter::once(&tooltip.subtitle))
		.chain(&tooltip.lines)
		.map(|line| line.chars().count())
		.max()
		.unwrap_or(0);
	let (w, h) = (widest as f64 * 6.5 + 20.0, 40.0 + 16.0 * tooltip.lines.len() as f64);

	ctx.set_fill_style_str("rgba(20, 22, 40, 0.92)");
	ctx.fill_rect(x, y, w, h);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.25)");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(x, y, w, h);

	ctx.set_fill_style_str("white");
	ctx.set_font("bold 12px sans-serif");
	let _ = ctx.fill_text(&tooltip.title, x + 10.0, y + 17.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.6)");
	ctx.set_font("11px sans-serif");
	let _ = ctx.fill_text(&tooltip.subtitle, x + 10.0, y + 32.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
	for (i, line) in tooltip.lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x + 10.0, y + 50.0 + 16.0 * i as f64);
	}
}
