use proptest::prelude::*;
use trace_graph_canvas::graph::{
	Direction, Edge, LayoutError, LayoutOptions, NODE_HEIGHT, NODE_WIDTH, Node, PositionedNode,
	TraceGraph, layout, layout_graph,
};

fn graph_from(n: usize, arcs: &[(usize, usize)]) -> (Vec<Node>, Vec<Edge>) {
	let nodes = (0..n)
		.map(|i| Node::span(format!("n{}", i), format!("op{}", i), "svc"))
		.collect();
	let edges = arcs
		.iter()
		.map(|&(a, b)| Edge::new(format!("n{}", a), format!("n{}", b)))
		.collect();
	(nodes, edges)
}

fn arb_options() -> impl Strategy<Value = LayoutOptions> {
	(0..Direction::ALL.len(), 1.0..200.0f64, 1.0..200.0f64).prop_map(|(d, node_spacing, rank_spacing)| {
		LayoutOptions {
			direction: Direction::ALL[d],
			node_spacing,
			rank_spacing,
		}
	})
}

/// Node count plus forward-only edges (always acyclic).
fn arb_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
	(2usize..24).prop_flat_map(|n| {
		let arc = (0..n - 1, any::<usize>()).prop_map(move |(a, d)| (a, a + 1 + d % (n - 1 - a)));
		(Just(n), prop::collection::vec(arc, 0..n * 2))
	})
}

/// Node count plus arbitrary edges, self-loops and cycles included.
fn arb_digraph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
	(1usize..20).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..n * 3)))
}

fn cross_axis(node: &PositionedNode, options: &LayoutOptions) -> f64 {
	if options.direction.is_vertical() {
		node.position.x
	} else {
		node.position.y
	}
}

fn primary_axis(node: &PositionedNode, options: &LayoutOptions) -> f64 {
	if options.direction.is_vertical() {
		node.position.y
	} else {
		node.position.x
	}
}

fn assert_no_overlap(out: &[PositionedNode], options: &LayoutOptions) -> Result<(), TestCaseError> {
	let footprint = if options.direction.is_vertical() {
		NODE_WIDTH
	} else {
		NODE_HEIGHT
	};
	for (i, a) in out.iter().enumerate() {
		for b in &out[i + 1..] {
			if a.rank == b.rank {
				let gap = (cross_axis(a, options) - cross_axis(b, options)).abs();
				prop_assert!(gap >= footprint + options.node_spacing - 1e-9);
			} else {
				prop_assert_ne!(primary_axis(a, options), primary_axis(b, options));
			}
		}
	}
	Ok(())
}

proptest! {
	#[test]
	fn layout_is_deterministic((n, arcs) in arb_digraph(), options in arb_options()) {
		let (nodes, edges) = graph_from(n, &arcs);
		let first = layout(&nodes, &edges, &options).unwrap();
		let second = layout(&nodes, &edges, &options).unwrap();
		prop_assert_eq!(first, second);
	}

	#[test]
	fn output_keeps_input_order((n, arcs) in arb_digraph(), options in arb_options()) {
		let (nodes, edges) = graph_from(n, &arcs);
		let out = layout(&nodes, &edges, &options).unwrap();
		let ids: Vec<&str> = out.iter().map(|p| p.id()).collect();
		let expected: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		prop_assert_eq!(ids, expected);
	}

	#[test]
	fn same_rank_nodes_never_overlap((n, arcs) in arb_digraph(), options in arb_options()) {
		let (nodes, edges) = graph_from(n, &arcs);
		let out = layout(&nodes, &edges, &options).unwrap();
		assert_no_overlap(&out, &options)?;
	}

	#[test]
	fn edges_point_to_higher_ranks_in_a_dag((n, arcs) in arb_dag(), options in arb_options()) {
		let (nodes, edges) = graph_from(n, &arcs);
		let graph = TraceGraph::new(nodes, edges);
		let out = layout_graph(&graph, &options).unwrap();
		prop_assert_eq!(out.stats.suppressed_edges, 0);
		for &(a, b) in &arcs {
			prop_assert!(out.nodes[b].rank > out.nodes[a].rank);
		}
	}

	#[test]
	fn every_node_is_inside_the_bounds((n, arcs) in arb_digraph(), options in arb_options()) {
		let (nodes, edges) = graph_from(n, &arcs);
		let out = layout_graph(&TraceGraph::new(nodes, edges), &options).unwrap();
		for node in &out.nodes {
			prop_assert!(node.position.x >= 0.0 && node.position.y >= 0.0);
			prop_assert!(node.position.x + NODE_WIDTH <= out.bounds.width + 1e-9);
			prop_assert!(node.position.y + NODE_HEIGHT <= out.bounds.height + 1e-9);
		}
	}
}

#[test]
fn chain_scenario() {
	let (nodes, edges) = graph_from(3, &[(0, 1), (1, 2)]);
	let out = layout(&nodes, &edges, &LayoutOptions::default()).unwrap();
	assert_eq!(out.iter().map(|p| p.rank).collect::<Vec<_>>(), vec![0, 1, 2]);
	assert!(out[0].position.y < out[1].position.y && out[1].position.y < out[2].position.y);
}

#[test]
fn fan_out_scenario() {
	let options = LayoutOptions::default();
	let (nodes, edges) = graph_from(3, &[(0, 1), (0, 2)]);
	let out = layout(&nodes, &edges, &options).unwrap();
	assert_eq!((out[1].rank, out[2].rank), (1, 1));
	assert!((out[1].position.x - out[2].position.x).abs() >= options.node_spacing);
}

#[test]
fn isolated_nodes_follow_input_order() {
	let (nodes, edges) = graph_from(3, &[]);
	let out = layout(&nodes, &edges, &LayoutOptions::default()).unwrap();
	assert!(out.iter().all(|p| p.rank == 0));
	assert!(out[0].position.x < out[1].position.x && out[1].position.x < out[2].position.x);
}

#[test]
fn dangling_edge_gives_no_partial_output() {
	let (nodes, mut edges) = graph_from(2, &[(0, 1)]);
	edges.push(Edge::new("n1", "missing"));
	let result = layout(&nodes, &edges, &LayoutOptions::default());
	assert!(matches!(result, Err(LayoutError::ReferentialIntegrity { .. })));
}

#[test]
fn empty_graph() {
	assert_eq!(layout(&[], &[], &LayoutOptions::default()), Ok(Vec::new()));
}

#[test]
fn crossing_reduction_untangles_a_swapped_pair() {
	// a -> d, b -> c; input order alone would cross
	let nodes = ["a", "b", "c", "d"].map(|id| Node::span(id, id, "svc")).to_vec();
	let edges = vec![Edge::new("a", "d"), Edge::new("b", "c")];
	let out = layout_graph(&TraceGraph::new(nodes, edges), &LayoutOptions::default()).unwrap();
	assert_eq!(out.stats.crossings, 0);
	let x = |id: &str| out.node(id).unwrap().position.x;
	assert!(x("d") < x("c"));
}

#[test]
fn api_shaped_json_lays_out() {
	let json = r#"{
		"nodes": [
			{"id": "span:1", "kind": "span", "payload": {"operationName": "GET /", "serviceName": "web", "durationMs": 10}},
			{"id": "span:2", "kind": "mystery", "payload": {"operationName": "db", "serviceName": "pg", "durationMs": 4, "status": "error"}}
		],
		"edges": [{"id": "edge:1-2", "sourceId": "span:1", "targetId": "span:2", "latencyMs": 1.5, "animated": true}],
		"meta": {"traceId": "abc", "spanCount": 2, "serviceCount": 2}
	}"#;
	let graph: TraceGraph = serde_json::from_str(json).unwrap();
	let options = LayoutOptions::from_json(r#"{"direction": "LR", "rankSpacing": 40}"#).unwrap();
	let out = layout_graph(&graph, &options).unwrap();
	assert!(out.nodes[0].position.x < out.nodes[1].position.x);
	assert_eq!(out.meta.trace_id.as_deref(), Some("abc"));

	let value = serde_json::to_value(&out.nodes[1]).unwrap();
	assert_eq!(value["id"], "span:2");
	assert!(value["position"]["x"].is_number());
}
