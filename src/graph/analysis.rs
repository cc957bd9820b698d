//! Span queries the assistant uses to decide what to highlight.

use std::collections::HashMap;

use super::highlight::HighlightSet;
use super::model::TraceGraph;

/// Root-to-leaf path with the largest summed duration, as node ids.
///
/// Only children that add time extend the path; equal totals keep the
/// earlier child in edge order. A node already on the current path is not
/// re-entered, so cyclic input terminates.
pub fn critical_path(graph: &TraceGraph) -> Vec<String> {
	let index: HashMap<&str, usize> = graph
		.nodes
		.iter()
		.enumerate()
		.map(|(i, n)| (n.id.as_str(), i))
		.collect();

	let mut children = vec![Vec::new(); graph.nodes.len()];
	let mut has_parent = vec![false; graph.nodes.len()];
	for edge in &graph.edges {
		if let (Some(&u), Some(&v)) = (
			index.get(edge.source_id.as_str()),
			index.get(edge.target_id.as_str()),
		) {
			children[u].push(v);
			has_parent[v] = true;
		}
	}

	let mut search = PathSearch {
		graph,
		children: &children,
		on_path: vec![false; graph.nodes.len()],
	};

	let mut best = (0.0, Vec::new());
	for root in (0..graph.nodes.len()).filter(|&v| !has_parent[v]) {
		let candidate = search.longest_from(root);
		if candidate.0 > best.0 {
			best = candidate;
		}
	}
	best.1.into_iter().map(|i| graph.nodes[i].id.clone()).collect()
}

struct PathSearch<'a> {
	graph: &'a TraceGraph,
	children: &'a [Vec<usize>],
	on_path: Vec<bool>,
}

impl PathSearch<'_> {
	fn longest_from(&mut self, v: usize) -> (f64, Vec<usize>) {
		if self.on_path[v] {
			return (0.0, Vec::new());
		}
		self.on_path[v] = true;

		let children = self.children;
		let mut tail = (0.0, Vec::new());
		for &child in &children[v] {
			let candidate = self.longest_from(child);
			if candidate.0 > tail.0 {
				tail = candidate;
			}
		}
		self.on_path[v] = false;

		let mut path = Vec::with_capacity(tail.1.len() + 1);
		path.push(v);
		path.extend(tail.1);
		(self.graph.nodes[v].payload.duration_ms + tail.0, path)
	}
}

/// Ids of the `n` longest spans, longest first. Equal durations keep input
/// order.
pub fn slowest_nodes(graph: &TraceGraph, n: usize) -> Vec<String> {
	let mut ranked: Vec<_> = graph.nodes.iter().collect();
	ranked.sort_by(|a, b| b.payload.duration_ms.total_cmp(&a.payload.duration_ms));
	ranked.into_iter().take(n).map(|node| node.id.clone()).collect()
}

/// Ids of failed spans, in input order.
pub fn error_nodes(graph: &TraceGraph) -> Vec<String> {
	graph
		.nodes
		.iter()
		.filter(|n| n.payload.is_error())
		.map(|n| n.id.clone())
		.collect()
}

/// Highlight for the critical path, including its edges.
pub fn critical_path_highlight(graph: &TraceGraph) -> HighlightSet {
	HighlightSet::along_path(&critical_path(graph), &graph.edges)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Edge, Node, SpanStatus};

	fn span(id: &str, duration_ms: f64) -> Node {
		let mut node = Node::span(id, id, "svc");
		node.payload.duration_ms = duration_ms;
		node
	}

	fn sample() -> TraceGraph {
		// root -> fast, root -> slow -> leaf
		TraceGraph::new(
			vec![
				span("root", 100.0),
				span("fast", 5.0),
				span("slow", 60.0),
				span("leaf", 30.0),
			],
			vec![
				Edge::new("root", "fast"),
				Edge::new("root", "slow"),
				Edge::new("slow", "leaf"),
			],
		)
	}

	#[test]
	fn critical_path_follows_the_heaviest_branch() {
		assert_eq!(critical_path(&sample()), vec!["root", "slow", "leaf"]);
	}

	#[test]
	fn critical_path_highlight_includes_edges() {
		let set = critical_path_highlight(&sample());
		assert_eq!(set.highlighted_node_ids.len(), 3);
		assert!(set.has_edge("edge:root-slow"));
		assert!(set.has_edge("edge:slow-leaf"));
		assert!(!set.has_edge("edge:root-fast"));
	}

	#[test]
	fn critical_path_on_cycle_terminates() {
		let graph = TraceGraph::new(
			vec![span("a", 1.0), span("b", 1.0), span("c", 1.0)],
			vec![Edge::new("a", "b"), Edge::new("b", "c"), Edge::new("c", "b")],
		);
		assert_eq!(critical_path(&graph), vec!["a", "b", "c"]);
	}

	#[test]
	fn empty_graph_has_no_path() {
		assert!(critical_path(&TraceGraph::default()).is_empty());
	}

	#[test]
	fn slowest_is_stable_on_ties() {
		let graph = TraceGraph::new(
			vec![span("x", 10.0), span("y", 20.0), span("z", 10.0)],
			vec![],
		);
		assert_eq!(slowest_nodes(&graph, 2), vec!["y", "x"]);
		assert_eq!(slowest_nodes(&graph, 10).len(), 3);
	}

	#[test]
	fn error_spans_in_input_order() {
		let mut graph = sample();
		graph.nodes[3].payload.status = SpanStatus::Error;
		graph.nodes[1].payload.status = SpanStatus::Error;
		assert_eq!(error_nodes(&graph), vec!["fast", "leaf"]);
	}
}
