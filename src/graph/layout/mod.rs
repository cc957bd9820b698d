//! Deterministic layered layout for span graphs.
//!
//! Three phases, all owned here so tie-breaking is explicit:
//!   1. ranking: longest path from the sources, back-edges ignored
//!   2. ordering: barycenter sweeps over a graph with virtual vertices
//!   3. coordinates: ranks along the primary axis, centered slots across it
//!
//! Identical input gives bit-identical output. Ties always fall back to
//! input order; nothing is randomized.

mod coords;
mod options;
mod order;
mod rank;

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::error::LayoutError;
use super::model::{Edge, GraphMeta, Node, TraceGraph, check_edges};

pub use options::{Direction, LayoutOptions};
pub use order::MAX_ORDER_PASSES;

/// Logical node width used for spacing.
pub const NODE_WIDTH: f64 = 220.0;
/// Logical node height used for spacing.
pub const NODE_HEIGHT: f64 = 72.0;
/// Empty border around the drawing.
pub const LAYOUT_MARGIN: f64 = 20.0;

/// Top-left corner of a node, in layout units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal.
	pub x: f64,
	/// Vertical.
	pub y: f64,
}

/// A node with its layout result attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
	/// The untouched input node.
	#[serde(flatten)]
	pub node: Node,
	/// Top-left corner.
	pub position: Position,
	/// Layer index (0 for sources).
	pub rank: usize,
	/// Slot within the rank.
	pub order: usize,
}

impl PositionedNode {
	/// Node id.
	pub fn id(&self) -> &str {
		&self.node.id
	}

	/// Center of the node's footprint.
	pub fn center(&self) -> Position {
		Position {
			x: self.position.x + NODE_WIDTH / 2.0,
			y: self.position.y + NODE_HEIGHT / 2.0,
		}
	}
}

/// Size of the drawing, margins included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutBounds {
	/// Total width.
	pub width: f64,
	/// Total height.
	pub height: f64,
}

/// Diagnostics from one layout run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutStats {
	/// Number of ranks.
	pub ranks: usize,
	/// Remaining crossings between adjacent ranks.
	pub crossings: usize,
	/// Edges ignored for ranking (self-loops and cycle back-edges).
	pub suppressed_edges: usize,
	/// Ordering passes actually run.
	pub passes: usize,
}

/// A graph after layout. Edges and meta are carried over unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionedGraph {
	/// Nodes in input order, with positions.
	pub nodes: Vec<PositionedNode>,
	/// Input edges.
	pub edges: Vec<Edge>,
	/// Input meta.
	pub meta: GraphMeta,
	/// Overall size.
	pub bounds: LayoutBounds,
	/// Run diagnostics.
	pub stats: LayoutStats,
}

impl PositionedGraph {
	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&PositionedNode> {
		self.nodes.iter().find(|n| n.node.id == id)
	}
}

/// Lay out `nodes` connected by `edges`. The output preserves input order.
///
/// Fails without partial output if the options are invalid, a node id is
/// repeated, or an edge references an unknown node.
pub fn layout(
	nodes: &[Node],
	edges: &[Edge],
	options: &LayoutOptions,
) -> Result<Vec<PositionedNode>, LayoutError> {
	Ok(run(nodes, edges, options)?.0)
}

/// [`layout`] over a whole graph, keeping edges and meta and adding bounds
/// and stats.
pub fn layout_graph(graph: &TraceGraph, options: &LayoutOptions) -> Result<PositionedGraph, LayoutError> {
	let (nodes, bounds, stats) = run(&graph.nodes, &graph.edges, options)?;
	Ok(PositionedGraph {
		nodes,
		edges: graph.edges.clone(),
		meta: graph.meta.clone(),
		bounds,
		stats,
	})
}

fn run(
	nodes: &[Node],
	edges: &[Edge],
	options: &LayoutOptions,
) -> Result<(Vec<PositionedNode>, LayoutBounds, LayoutStats), LayoutError> {
	options.validate()?;

	let mut index = HashMap::with_capacity(nodes.len());
	for (i, node) in nodes.iter().enumerate() {
		if index.insert(node.id.as_str(), i).is_some() {
			return Err(LayoutError::DuplicateNodeId {
				node_id: node.id.clone(),
			});
		}
	}
	check_edges(edges, |id| index.contains_key(id))?;

	if nodes.is_empty() {
		return Ok((Vec::new(), LayoutBounds::default(), LayoutStats::default()));
	}

	let arcs: Vec<(usize, usize)> = edges
		.iter()
		.map(|e| (index[e.source_id.as_str()], index[e.target_id.as_str()]))
		.collect();

	let ranked = rank::RankedGraph::build(nodes.len(), &arcs);
	if ranked.suppressed > 0 {
		warn!(
			"layout: ignored {} cyclic edge(s) while ranking {} nodes",
			ranked.suppressed,
			nodes.len()
		);
	}

	let mut layering = order::Layering::new(&ranked);
	let outcome = layering.minimize_crossings();
	let layers = layering.real_layers();
	let (centers, bounds) = coords::assign_centers(&layers, nodes.len(), options);

	let mut slots = vec![0usize; nodes.len()];
	for layer in &layers {
		for (i, &v) in layer.iter().enumerate() {
			slots[v] = i;
		}
	}

	let positioned = nodes
		.iter()
		.enumerate()
		.map(|(i, node)| PositionedNode {
			node: node.clone(),
			position: coords::top_left(centers[i]),
			rank: ranked.ranks[i],
			order: slots[i],
		})
		.collect();

	let stats = LayoutStats {
		ranks: layers.len(),
		crossings: outcome.crossings,
		suppressed_edges: ranked.suppressed,
		passes: outcome.passes,
	};
	debug!(
		"layout: {} nodes, {} edges, {} ranks, {} crossings after {} passes ({})",
		nodes.len(),
		edges.len(),
		stats.ranks,
		stats.crossings,
		stats.passes,
		options.direction
	);
	Ok((positioned, bounds, stats))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn nodes(ids: &[&str]) -> Vec<Node> {
		ids.iter().map(|id| Node::span(*id, format!("op {}", id), "svc")).collect()
	}

	#[test]
	fn chain_ranks_and_primary_axis() {
		let out = layout(
			&nodes(&["A", "B", "C"]),
			&[Edge::new("A", "B"), Edge::new("B", "C")],
			&LayoutOptions::default(),
		)
		.unwrap();
		let ranks: Vec<usize> = out.iter().map(|n| n.rank).collect();
		assert_eq!(ranks, vec![0, 1, 2]);
		assert!(out[0].position.y < out[1].position.y);
		assert!(out[1].position.y < out[2].position.y);
		assert_eq!(out[0].position.x, out[1].position.x);
	}

	#[test]
	fn fan_out_separates_siblings() {
		let options = LayoutOptions::default();
		let out = layout(
			&nodes(&["A", "B", "C"]),
			&[Edge::new("A", "B"), Edge::new("A", "C")],
			&options,
		)
		.unwrap();
		assert_eq!((out[1].rank, out[2].rank), (1, 1));
		assert!((out[2].position.x - out[1].position.x).abs() >= options.node_spacing);
		// B before C by input order
		assert!(out[1].position.x < out[2].position.x);
	}

	#[test]
	fn first_node_sits_inside_the_margin() {
		let out = layout(&nodes(&["solo"]), &[], &LayoutOptions::default()).unwrap();
		assert_eq!(out[0].position, Position { x: LAYOUT_MARGIN, y: LAYOUT_MARGIN });
		assert_eq!(out[0].center().x, LAYOUT_MARGIN + NODE_WIDTH / 2.0);
	}

	#[test]
	fn left_to_right_uses_x_for_ranks() {
		let options = LayoutOptions {
			direction: Direction::LeftToRight,
			..LayoutOptions::default()
		};
		let out = layout(&nodes(&["A", "B"]), &[Edge::new("A", "B")], &options).unwrap();
		assert_eq!(out[0].position.y, out[1].position.y);
		assert_eq!(
			out[1].position.x - out[0].position.x,
			NODE_WIDTH + options.rank_spacing
		);
	}

	#[test]
	fn empty_input_is_fine() {
		let out = layout(&[], &[], &LayoutOptions::default()).unwrap();
		assert!(out.is_empty());
	}

	#[test]
	fn unknown_endpoint_fails_whole_call() {
		let err = layout(&nodes(&["A"]), &[Edge::new("A", "ghost")], &LayoutOptions::default())
			.unwrap_err();
		assert_eq!(
			err,
			LayoutError::ReferentialIntegrity {
				edge_id: "edge:A-ghost".into(),
				node_id: "ghost".into(),
			}
		);
	}

	#[test]
	fn bad_options_fail_before_anything_else() {
		let options = LayoutOptions {
			rank_spacing: 0.0,
			..LayoutOptions::default()
		};
		assert!(matches!(
			layout(&[], &[], &options),
			Err(LayoutError::InvalidConfiguration(_))
		));
	}

	#[test]
	fn duplicate_ids_are_rejected() {
		assert_eq!(
			layout(&nodes(&["A", "A"]), &[], &LayoutOptions::default()),
			Err(LayoutError::DuplicateNodeId { node_id: "A".into() })
		);
	}

	#[test]
	fn cycles_are_laid_out_best_effort() {
		let graph = TraceGraph::new(
			nodes(&["A", "B", "C"]),
			vec![Edge::new("A", "B"), Edge::new("B", "C"), Edge::new("C", "A")],
		);
		let out = layout_graph(&graph, &LayoutOptions::default()).unwrap();
		assert_eq!(out.stats.suppressed_edges, 1);
		assert_eq!(out.stats.ranks, 3);
		assert_eq!(out.edges, graph.edges);
	}

	#[test]
	fn graph_layout_reports_bounds() {
		let graph = TraceGraph::new(nodes(&["A", "B"]), vec![Edge::new("A", "B")]);
		let options = LayoutOptions::default();
		let out = layout_graph(&graph, &options).unwrap();
		assert_eq!(out.bounds.width, NODE_WIDTH + 2.0 * LAYOUT_MARGIN);
		assert_eq!(
			out.bounds.height,
			2.0 * NODE_HEIGHT + options.rank_spacing + 2.0 * LAYOUT_MARGIN
		);
		assert_eq!(out.meta, graph.meta);
	}
}
