use std::collections::HashMap;

use crate::graph::{
	DecoratedGraph, Direction, HighlightSet, LayoutBounds, LayoutError, NODE_HEIGHT, NODE_WIDTH,
	Position, PositionedGraph,
};

/// Pointer travel (screen px) below which a press-release counts as a click.
pub const CLICK_SLOP: f64 = 4.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub offset_start: (f64, f64),
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Hover glow: the hovered node and its neighbours, fading in and out.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<String>,
	pub lit: HighlightSet,
	pub highlight_t: f64,
	delay_t: f64,
}

/// Everything the canvas needs between frames. Layout output and overlay
/// output are pushed in from outside; this only owns view concerns.
pub struct TraceGraphState {
	pub graph: DecoratedGraph,
	pub bounds: LayoutBounds,
	pub direction: Direction,
	pub error: Option<LayoutError>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
	edges: Vec<(String, String)>,
	offsets: HashMap<String, (f64, f64)>,
}

impl TraceGraphState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			graph: DecoratedGraph::default(),
			bounds: LayoutBounds::default(),
			direction: Direction::default(),
			error: None,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: HoverState::default(),
			width,
			height,
			flow_time: 0.0,
			edges: Vec::new(),
			offsets: HashMap::new(),
		}
	}

	/// A fresh layout replaces everything positional: drag offsets, hover
	/// and the view transform.
	pub fn set_layout(&mut self, result: Result<PositionedGraph, LayoutError>, direction: Direction) {
		self.offsets.clear();
		self.hover = HoverState::default();
		self.drag = DragState::default();
		self.direction = direction;
		match result {
			Ok(positioned) => {
				self.error = None;
				self.bounds = positioned.bounds;
				self.edges = positioned
					.edges
					.iter()
					.map(|e| (e.source_id.clone(), e.target_id.clone()))
					.collect();
			}
			Err(err) => {
				self.error = Some(err);
				self.bounds = LayoutBounds::default();
				self.edges.clear();
			}
		}
		self.fit_to_view();
	}

	/// New overlay output. Positions are taken as-is.
	pub fn set_decorated(&mut self, graph: DecoratedGraph) {
		self.graph = graph;
	}

	/// Scale and center the layout bounds in the canvas, never zooming in
	/// past 1:1.
	pub fn fit_to_view(&mut self) {
		let LayoutBounds { width, height } = self.bounds;
		if width <= 0.0 || height <= 0.0 || self.width <= 0.0 || self.height <= 0.0 {
			self.transform = ViewTransform::default();
			return;
		}
		let k = (self.width / width).min(self.height / height).clamp(MIN_ZOOM, 1.0);
		self.transform = ViewTransform {
			x: (self.width - width * k) / 2.0,
			y: (self.height - height * k) / 2.0,
			k,
		};
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Top-left corner of a node as drawn, including any drag offset.
	pub fn node_origin(&self, id: &str, position: Position) -> Position {
		let (dx, dy) = self.offsets.get(id).copied().unwrap_or((0.0, 0.0));
		Position {
			x: position.x + dx,
			y: position.y + dy,
		}
	}

	/// Topmost node under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.graph.nodes.iter().rev().find_map(|n| {
			let origin = self.node_origin(n.node.id(), n.node.position);
			let inside = gx >= origin.x
				&& gx <= origin.x + NODE_WIDTH
				&& gy >= origin.y
				&& gy <= origin.y + NODE_HEIGHT;
			inside.then(|| n.node.id().to_owned())
		})
	}

	pub fn set_hover(&mut self, node: Option<String>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();
		match &node {
			Some(id) => {
				if !was_hovering {
					self.hover.delay_t = 0.0;
				}
				let mut lit = HighlightSet::from_selection(Some(id));
				for (src, tgt) in &self.edges {
					if src == id {
						lit.highlighted_node_ids.insert(tgt.clone());
					} else if tgt == id {
						lit.highlighted_node_ids.insert(src.clone());
					}
				}
				self.hover.lit = lit;
			}
			// keep `lit` so the glow can fade out
			None => {}
		}
		self.hover.node = node;
	}

	pub fn is_hover_lit(&self, id: &str) -> bool {
		self.hover.highlight_t > 0.0 && self.hover.lit.has_node(id)
	}

	pub fn is_hovered(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id)
	}

	pub fn press(&mut self, x: f64, y: f64) {
		if let Some(id) = self.node_at_position(x, y) {
			self.drag = DragState {
				active: true,
				moved: false,
				offset_start: self.offsets.get(&id).copied().unwrap_or((0.0, 0.0)),
				node_id: Some(id),
				start_x: x,
				start_y: y,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn move_to(&mut self, x: f64, y: f64) {
		if self.drag.active {
			let (sx, sy) = (x - self.drag.start_x, y - self.drag.start_y);
			if !self.drag.moved && (sx * sx + sy * sy).sqrt() < CLICK_SLOP {
				return;
			}
			self.drag.moved = true;
			if let Some(id) = self.drag.node_id.clone() {
				let (ox, oy) = self.drag.offset_start;
				let k = self.transform.k;
				self.offsets.insert(id, (ox + sx / k, oy + sy / k));
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		} else {
			let hovered = self.node_at_position(x, y);
			self.set_hover(hovered);
		}
	}

	/// End a press. Returns the node id if this was a click on a node.
	pub fn release(&mut self) -> Option<String> {
		let clicked = if self.drag.active && !self.drag.moved {
			self.drag.node_id.clone()
		} else {
			None
		};
		self.drag = DragState::default();
		self.pan.active = false;
		clicked
	}

	pub fn leave(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
		self.set_hover(None);
	}

	/// Zoom around a screen point.
	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;

		let (target, delay, speed) = if self.hover.node.is_some() {
			(1.0, 0.08, 1.8)
		} else {
			(0.0, 0.0, 1.26)
		};

		if self.hover.node.is_some() {
			self.hover.delay_t = (self.hover.delay_t + dt).min(delay);
			if self.hover.delay_t >= delay {
				self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			}
		} else {
			self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
			if self.hover.highlight_t < 0.01 {
				self.hover.highlight_t = 0.0;
				self.hover.lit = HighlightSet::default();
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.fit_to_view();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Edge, LayoutOptions, Node, TraceGraph, layout_graph};

	fn state() -> TraceGraphState {
		let graph = TraceGraph::new(
			vec![Node::span("A", "a", "svc"), Node::span("B", "b", "svc")],
			vec![Edge::new("A", "B")],
		);
		let positioned = layout_graph(&graph, &LayoutOptions::default());
		let mut s = TraceGraphState::new(2000.0, 2000.0);
		if let Ok(p) = &positioned {
			s.set_decorated(DecoratedGraph::new(p, &HighlightSet::default()));
		}
		s.set_layout(positioned, Direction::TopToBottom);
		s
	}

	/// Screen point at the center of a node.
	fn center_of(s: &TraceGraphState, id: &str) -> (f64, f64) {
		let node = s.graph.node(id).unwrap();
		let origin = s.node_origin(id, node.node.position);
		let (cx, cy) = (origin.x + NODE_WIDTH / 2.0, origin.y + NODE_HEIGHT / 2.0);
		(cx * s.transform.k + s.transform.x, cy * s.transform.k + s.transform.y)
	}

	#[test]
	fn fit_centers_without_zooming_in() {
		let s = state();
		assert_eq!(s.transform.k, 1.0);
		assert_eq!(s.transform.x, (2000.0 - s.bounds.width) / 2.0);
	}

	#[test]
	fn click_without_movement_reports_node() {
		let mut s = state();
		let (x, y) = center_of(&s, "B");
		s.press(x, y);
		s.move_to(x + 1.0, y);
		assert_eq!(s.release(), Some("B".to_owned()));
	}

	#[test]
	fn drag_moves_only_the_view_copy() {
		let mut s = state();
		let before = s.graph.node("A").unwrap().node.position;
		let (x, y) = center_of(&s, "A");
		s.press(x, y);
		s.move_to(x + 30.0, y + 10.0);
		assert_eq!(s.release(), None);
		assert_eq!(s.graph.node("A").unwrap().node.position, before);
		let moved = s.node_origin("A", before);
		assert_eq!((moved.x - before.x, moved.y - before.y), (30.0, 10.0));
	}

	#[test]
	fn pan_on_background() {
		let mut s = state();
		let start = s.transform.clone();
		s.press(1.0, 1.0);
		s.move_to(11.0, 6.0);
		s.release();
		assert_eq!(s.transform.x, start.x + 10.0);
		assert_eq!(s.transform.y, start.y + 5.0);
	}

	#[test]
	fn hover_lights_neighbours() {
		let mut s = state();
		let (x, y) = center_of(&s, "A");
		s.move_to(x, y);
		assert!(s.is_hovered("A"));
		for _ in 0..60 {
			s.tick(0.016);
		}
		assert!(s.is_hover_lit("B"));
		s.leave();
		for _ in 0..600 {
			s.tick(0.016);
		}
		assert!(!s.is_hover_lit("B"));
	}

	#[test]
	fn zoom_is_clamped() {
		let mut s = state();
		for _ in 0..200 {
			s.zoom(0.0, 0.0, -1.0);
		}
		assert_eq!(s.transform.k, MAX_ZOOM);
	}

	#[test]
	fn layout_error_is_kept_for_display() {
		let mut s = state();
		s.set_layout(
			Err(LayoutError::InvalidConfiguration("nodeSpacing".into())),
			Direction::TopToBottom,
		);
		assert!(s.error.is_some());
		assert_eq!(s.transform, ViewTransform::default());
	}
}
