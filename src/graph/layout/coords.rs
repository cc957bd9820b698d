//! Rank/order slots to node centers.

use super::options::{Direction, LayoutOptions};
use super::{LAYOUT_MARGIN, LayoutBounds, NODE_HEIGHT, NODE_WIDTH, Position};

/// Node center for every real node (indexed like the input), plus the
/// bounds of the whole drawing.
pub(super) fn assign_centers(
	layers: &[Vec<usize>],
	n: usize,
	options: &LayoutOptions,
) -> (Vec<Position>, LayoutBounds) {
	let mut centers = vec![Position::default(); n];
	if layers.is_empty() {
		return (centers, LayoutBounds::default());
	}

	let vertical = options.direction.is_vertical();
	let (rank_extent, cross_extent) = if vertical {
		(NODE_HEIGHT, NODE_WIDTH)
	} else {
		(NODE_WIDTH, NODE_HEIGHT)
	};
	let rank_step = rank_extent + options.rank_spacing;
	let cross_step = cross_extent + options.node_spacing;

	let span = |count: usize| -> f64 {
		if count == 0 {
			0.0
		} else {
			count as f64 * cross_extent + (count - 1) as f64 * options.node_spacing
		}
	};
	let widest = layers.iter().map(|l| span(l.len())).fold(0.0_f64, f64::max);
	let last = layers.len() - 1;

	for (r, layer) in layers.iter().enumerate() {
		let slot = match options.direction {
			Direction::BottomToTop | Direction::RightToLeft => last - r,
			Direction::TopToBottom | Direction::LeftToRight => r,
		};
		let primary = LAYOUT_MARGIN + slot as f64 * rank_step + rank_extent / 2.0;
		let offset = LAYOUT_MARGIN + (widest - span(layer.len())) / 2.0;

		for (i, &v) in layer.iter().enumerate() {
			let cross = offset + i as f64 * cross_step + cross_extent / 2.0;
			centers[v] = if vertical {
				Position { x: cross, y: primary }
			} else {
				Position { x: primary, y: cross }
			};
		}
	}

	let depth = layers.len() as f64 * rank_extent + last as f64 * options.rank_spacing;
	let (w, h) = if vertical { (widest, depth) } else { (depth, widest) };
	let bounds = LayoutBounds {
		width: w + 2.0 * LAYOUT_MARGIN,
		height: h + 2.0 * LAYOUT_MARGIN,
	};
	(centers, bounds)
}

/// Center to top-left corner, which is what the canvas positions by.
pub(super) fn top_left(center: Position) -> Position {
	Position {
		x: center.x - NODE_WIDTH / 2.0,
		y: center.y - NODE_HEIGHT / 2.0,
	}
}
