//! Emphasis overlay over an already laid-out graph.
//!
//! Decoration is re-derived from scratch on every call and never touches
//! positions, so it can run on each click or assistant turn while layout
//! only reruns when the graph itself changes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::layout::{PositionedGraph, PositionedNode};
use super::model::Edge;

/// Ids to emphasize. Replaced wholesale on every selection or assistant
/// turn, never merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSet {
	/// Emphasized node ids.
	#[serde(default)]
	pub highlighted_node_ids: BTreeSet<String>,
	/// Emphasized edge ids.
	#[serde(default)]
	pub highlighted_edge_ids: BTreeSet<String>,
}

/// Highlight hints as they arrive from the assistant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiHints {
	/// Node ids to highlight.
	#[serde(default)]
	pub highlight_nodes: Vec<String>,
	/// Edge ids to highlight.
	#[serde(default)]
	pub highlight_edges: Vec<String>,
}

impl From<UiHints> for HighlightSet {
	fn from(hints: UiHints) -> Self {
		Self {
			highlighted_node_ids: hints.highlight_nodes.into_iter().collect(),
			highlighted_edge_ids: hints.highlight_edges.into_iter().collect(),
		}
	}
}

impl HighlightSet {
	/// A user click: at most one node.
	pub fn from_selection(selected: Option<&str>) -> Self {
		Self {
			highlighted_node_ids: selected.into_iter().map(str::to_owned).collect(),
			highlighted_edge_ids: BTreeSet::new(),
		}
	}

	/// A node plus everything one edge away, and those edges.
	pub fn neighborhood(node_id: &str, edges: &[Edge]) -> Self {
		let mut set = Self::from_selection(Some(node_id));
		for edge in edges {
			let other = if edge.source_id == node_id {
				&edge.target_id
			} else if edge.target_id == node_id {
				&edge.source_id
			} else {
				continue;
			};
			set.highlighted_node_ids.insert(other.clone());
			set.highlighted_edge_ids.insert(edge.id.clone());
		}
		set
	}

	/// Every node on `path` and each edge joining consecutive path nodes.
	pub fn along_path(path: &[String], edges: &[Edge]) -> Self {
		let mut set = Self {
			highlighted_node_ids: path.iter().cloned().collect(),
			highlighted_edge_ids: BTreeSet::new(),
		};
		for pair in path.windows(2) {
			set.highlighted_edge_ids.extend(
				edges
					.iter()
					.filter(|e| e.source_id == pair[0] && e.target_id == pair[1])
					.map(|e| e.id.clone()),
			);
		}
		set
	}

	/// Nothing highlighted.
	pub fn is_empty(&self) -> bool {
		self.highlighted_node_ids.is_empty() && self.highlighted_edge_ids.is_empty()
	}

	/// Whether a node is emphasized.
	pub fn has_node(&self, id: &str) -> bool {
		self.highlighted_node_ids.contains(id)
	}

	/// Whether an edge is emphasized.
	pub fn has_edge(&self, id: &str) -> bool {
		self.highlighted_edge_ids.contains(id)
	}
}

/// A positioned node with its emphasis flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecoratedNode {
	/// The laid-out node, untouched.
	#[serde(flatten)]
	pub node: PositionedNode,
	/// In the highlighted-node set.
	pub emphasized: bool,
}

/// An edge with its emphasis and effective animation flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecoratedEdge {
	/// The input edge, untouched. Its own `animated` flag stays as built.
	#[serde(flatten)]
	pub edge: Edge,
	/// In the highlighted-edge set.
	pub emphasized: bool,
	/// Builder flag OR emphasized.
	#[serde(rename = "displayAnimated")]
	pub animated: bool,
}

impl AsRef<PositionedNode> for PositionedNode {
	fn as_ref(&self) -> &PositionedNode {
		self
	}
}

impl AsRef<PositionedNode> for DecoratedNode {
	fn as_ref(&self) -> &PositionedNode {
		&self.node
	}
}

impl AsRef<Edge> for Edge {
	fn as_ref(&self) -> &Edge {
		self
	}
}

impl AsRef<Edge> for DecoratedEdge {
	fn as_ref(&self) -> &Edge {
		&self.edge
	}
}

/// Decorate nodes and edges with emphasis. Accepts either plain or already
/// decorated input; previous decoration is discarded, so reapplying the
/// same set yields the same output.
pub fn apply_highlight<N, E>(
	nodes: &[N],
	edges: &[E],
	highlight: &HighlightSet,
) -> (Vec<DecoratedNode>, Vec<DecoratedEdge>)
where
	N: AsRef<PositionedNode>,
	E: AsRef<Edge>,
{
	let nodes = nodes
		.iter()
		.map(|n| {
			let node = n.as_ref();
			DecoratedNode {
				emphasized: highlight.has_node(node.id()),
				node: node.clone(),
			}
		})
		.collect();

	let edges = edges
		.iter()
		.map(|e| {
			let edge = e.as_ref();
			let emphasized = highlight.has_edge(&edge.id);
			DecoratedEdge {
				emphasized,
				animated: edge.animated || emphasized,
				edge: edge.clone(),
			}
		})
		.collect();

	(nodes, edges)
}

/// A laid-out graph with decoration applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecoratedGraph {
	/// Decorated nodes in layout order.
	pub nodes: Vec<DecoratedNode>,
	/// Decorated edges in input order.
	pub edges: Vec<DecoratedEdge>,
	/// Whether anything at all is emphasized.
	pub has_emphasis: bool,
}

impl DecoratedGraph {
	/// Apply `highlight` to a positioned graph.
	pub fn new(graph: &PositionedGraph, highlight: &HighlightSet) -> Self {
		let (nodes, edges) = apply_highlight(&graph.nodes, &graph.edges, highlight);
		let has_emphasis = nodes.iter().any(|n| n.emphasized) || edges.iter().any(|e| e.emphasized);
		Self {
			nodes,
			edges,
			has_emphasis,
		}
	}

	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&DecoratedNode> {
		self.nodes.iter().find(|n| n.node.id() == id)
	}
}
