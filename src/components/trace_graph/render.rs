use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::TraceGraphState;
use super::template::{ERROR_STROKE, NodeTemplate, service_color};
use crate::graph::{Direction, NODE_HEIGHT, NODE_WIDTH, Position};

const EDGE_RGB: &str = "100, 180, 255";
const EMPHASIS_RGB: &str = "255, 214, 102";
const LABEL_CHARS: usize = 28;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &TraceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	if let Some(err) = &state.error {
		draw_error(state, ctx, &err.to_string());
		return;
	}

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	let origins: HashMap<&str, Position> = state
		.graph
		.nodes
		.iter()
		.map(|n| (n.node.id(), state.node_origin(n.node.id(), n.node.position)))
		.collect();
	draw_edges(state, ctx, &origins);
	draw_nodes(state, ctx, &origins);
	ctx.restore();
}

/// Where an edge leaves its source and enters its target, given both
/// top-left corners: the faces pointing along the rank direction.
pub fn edge_anchors(direction: Direction, src: Position, dst: Position) -> ((f64, f64), (f64, f64)) {
	let (hw, hh) = (NODE_WIDTH / 2.0, NODE_HEIGHT / 2.0);
	match direction {
		Direction::TopToBottom => ((src.x + hw, src.y + NODE_HEIGHT), (dst.x + hw, dst.y)),
		Direction::BottomToTop => ((src.x + hw, src.y), (dst.x + hw, dst.y + NODE_HEIGHT)),
		Direction::LeftToRight => ((src.x + NODE_WIDTH, src.y + hh), (dst.x, dst.y + hh)),
		Direction::RightToLeft => ((src.x, src.y + hh), (dst.x + NODE_WIDTH, dst.y + hh)),
	}
}

fn draw_edges(state: &TraceGraphState, ctx: &CanvasRenderingContext2d, origins: &HashMap<&str, Position>) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let dimmed = state.graph.has_emphasis;

	for decorated in &state.graph.edges {
		let edge = &decorated.edge;
		let (Some(&src), Some(&dst)) = (
			origins.get(edge.source_id.as_str()),
			origins.get(edge.target_id.as_str()),
		) else {
			continue;
		};
		let ((x1, y1), (x2, y2)) = edge_anchors(state.direction, src, dst);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let (rgb, alpha, width) = if decorated.emphasized {
			(EMPHASIS_RGB, 0.95, line_width * 1.8)
		} else if dimmed {
			(EDGE_RGB, 0.2, line_width)
		} else {
			(EDGE_RGB, 0.6, line_width)
		};

		ctx.set_stroke_style_str(&format!("rgba({}, {})", rgb, alpha));
		ctx.set_line_width(width);
		if decorated.animated {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		} else {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2 - ux * arrow_size, y2 - uy * arrow_size);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba({}, {})", rgb, (alpha + 0.2_f64).min(1.0)));
		let (back_x, back_y) = (x2 - ux * arrow_size, y2 - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(x2, y2);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if let Some(latency) = edge.latency_ms {
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha));
			ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
			let _ = ctx.fill_text(&format_duration(latency), (x1 + x2) / 2.0 + 4.0, (y1 + y2) / 2.0);
		}
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &TraceGraphState, ctx: &CanvasRenderingContext2d, origins: &HashMap<&str, Position>) {
	let (dimmed, t, k) = (
		state.graph.has_emphasis,
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	for decorated in &state.graph.nodes {
		let node = &decorated.node.node;
		let Some(&origin) = origins.get(node.id.as_str()) else {
			continue;
		};
		let template = NodeTemplate::for_kind(&node.node_kind());
		let hover_lit = state.is_hover_lit(&node.id);

		let alpha = if decorated.emphasized || !dimmed {
			template.alpha
		} else {
			template.alpha * 0.35
		};

		if decorated.emphasized || (hover_lit && t > 0.01) {
			draw_glow(ctx, origin, decorated.emphasized, state.is_hovered(&node.id), t);
		}

		ctx.set_global_alpha(alpha);
		rounded_rect(ctx, origin.x, origin.y, NODE_WIDTH, NODE_HEIGHT, template.corner_radius);
		ctx.set_fill_style_str(template.fill);
		ctx.fill();

		if template.service_accent {
			ctx.set_fill_style_str(service_color(&node.payload.service_name));
			ctx.fill_rect(origin.x, origin.y + 4.0, 4.0, NODE_HEIGHT - 8.0);
		}

		let stroke = if node.payload.is_error() {
			ERROR_STROKE
		} else if decorated.emphasized {
			"#ffd666"
		} else {
			template.stroke
		};
		rounded_rect(ctx, origin.x, origin.y, NODE_WIDTH, NODE_HEIGHT, template.corner_radius);
		ctx.set_stroke_style_str(stroke);
		let stroke_width = if decorated.emphasized { 3.0 } else { 1.5 };
		ctx.set_line_width(stroke_width / k.max(0.5));
		ctx.stroke();

		ctx.set_fill_style_str("white");
		ctx.set_font("bold 13px sans-serif");
		let _ = ctx.fill_text(
			&truncate(&node.payload.operation_name, LABEL_CHARS),
			origin.x + 12.0,
			origin.y + 24.0,
		);
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.7)");
		ctx.set_font("11px sans-serif");
		let _ = ctx.fill_text(
			&truncate(&node.payload.service_name, LABEL_CHARS),
			origin.x + 12.0,
			origin.y + 44.0,
		);
		let _ = ctx.fill_text(
			&format_duration(node.payload.duration_ms),
			origin.x + 12.0,
			origin.y + 62.0,
		);
		ctx.set_global_alpha(1.0);
	}
}

fn draw_glow(ctx: &CanvasRenderingContext2d, origin: Position, emphasized: bool, hovered: bool, t: f64) {
	let (cx, cy) = (origin.x + NODE_WIDTH / 2.0, origin.y + NODE_HEIGHT / 2.0);
	let radius = NODE_WIDTH * 0.75;
	let alpha = if emphasized {
		0.35
	} else if hovered {
		0.3 * t
	} else {
		0.18 * t
	};
	let Ok(gradient) = ctx.create_radial_gradient(cx, cy, NODE_HEIGHT * 0.3, cx, cy, radius) else {
		return;
	};
	let rgb = if emphasized { EMPHASIS_RGB } else { "255, 255, 255" };
	let _ = gradient.add_color_stop(0.0, &format!("rgba({}, {})", rgb, alpha));
	let _ = gradient.add_color_stop(0.6, &format!("rgba({}, {})", rgb, alpha * 0.3));
	let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
	ctx.begin_path();
	let _ = ctx.arc(cx, cy, radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

fn draw_error(state: &TraceGraphState, ctx: &CanvasRenderingContext2d, detail: &str) {
	ctx.set_text_align("center");
	ctx.set_fill_style_str(ERROR_STROKE);
	ctx.set_font("bold 16px sans-serif");
	let _ = ctx.fill_text("could not lay out this trace", state.width / 2.0, state.height / 2.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.7)");
	ctx.set_font("12px sans-serif");
	let _ = ctx.fill_text(detail, state.width / 2.0, state.height / 2.0 + 22.0);
	ctx.set_text_align("start");
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn truncate(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_owned();
	}
	let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
	out.push('…');
	out
}

fn format_duration(ms: f64) -> String {
	if ms >= 1000.0 {
		format!("{:.2} s", ms / 1000.0)
	} else if ms >= 1.0 {
		format!("{:.1} ms", ms)
	} else {
		format!("{:.0} µs", ms * 1000.0)
	}
}
