use leptos::prelude::*;

use crate::components::trace_graph::TraceGraphCanvas;
use crate::graph::analysis::{critical_path_highlight, error_nodes, slowest_nodes};
use crate::graph::{Direction, Edge, HighlightSet, LayoutOptions, Node, SpanStatus, TraceGraph, UiHints};

const SERVICES: &[&str] = &["gateway", "users", "orders", "payments", "inventory", "postgres"];
const OPERATIONS: &[&str] = &[
	"HTTP GET /api/orders",
	"authorize",
	"load cart",
	"SELECT orders",
	"reserve stock",
	"charge card",
	"publish event",
];

/// Generate a sample trace (random tree, deterministic across reloads).
fn generate_sample_trace(n: usize) -> TraceGraph {
	let mut starts = vec![0i64; n];
	let mut nodes = Vec::with_capacity(n);
	let mut edges = Vec::with_capacity(n.saturating_sub(1));

	for i in 0..n {
		let parent = (i > 0).then(|| (rand_simple(i) * (i as f64)) as usize);
		if let Some(p) = parent {
			starts[i] = starts[p] + 200 + (rand_simple(i + 7) * 3000.0) as i64;
		}

		let mut node = Node::span(
			format!("span:{}", i),
			OPERATIONS[i % OPERATIONS.len()],
			SERVICES[(i * 7 + 3) % SERVICES.len()],
		);
		node.payload.duration_ms = 2.0 + rand_simple(i + 13) * 120.0;
		node.payload.start_offset = starts[i];
		node.payload.tags.insert("span.index".into(), (i as f64).into());
		if i > 0 && i % 9 == 0 {
			node.payload.status = SpanStatus::Error;
			node.payload.tags.insert("error".into(), true.into());
		}

		if let Some(p) = parent {
			let mut edge = Edge::new(format!("span:{}", p), format!("span:{}", i));
			edge.latency_ms = Some((starts[i] - starts[p]) as f64 / 1000.0);
			edge.animated = node.payload.is_error();
			edges.push(edge);
		}
		nodes.push(node);
	}

	let mut graph = TraceGraph::new(nodes, edges);
	graph.meta.trace_id = Some("sample".into());
	graph
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let trace = generate_sample_trace(24);
	let meta = trace.meta.clone();
	let graph = Signal::stored(trace);
	let highlight = RwSignal::new(HighlightSet::default());
	let direction = RwSignal::new(Direction::TopToBottom);
	let options = Signal::derive(move || LayoutOptions {
		direction: direction.get(),
		..LayoutOptions::default()
	});

	// stand-ins for assistant turns: each one replaces the highlight wholesale
	let show_errors = move |_| {
		let hints = UiHints {
			highlight_nodes: graph.with(error_nodes),
			highlight_edges: Vec::new(),
		};
		highlight.set(hints.into());
	};
	let show_critical_path = move |_| highlight.set(graph.with(critical_path_highlight));
	let show_slowest = move |_| {
		let hints = UiHints {
			highlight_nodes: graph.with(|g| slowest_nodes(g, 5)),
			highlight_edges: Vec::new(),
		};
		highlight.set(hints.into());
	};
	let clear = move |_| highlight.set(HighlightSet::default());
	let on_node_click = Callback::new(move |id: String| {
		highlight.set(HighlightSet::from_selection(Some(&id)));
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<TraceGraphCanvas
					graph=graph
					highlight=highlight
					options=options
					on_node_click=on_node_click
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Trace Graph"</h1>
					<p class="subtitle">
						{format!(
							"{} spans · {} services · {:.1} ms",
							meta.span_count,
							meta.service_count,
							meta.total_duration_ms.unwrap_or(0.0),
						)}
					</p>
					<p class="subtitle">"Click a span to select it. Drag to pan, scroll to zoom."</p>
					<div class="graph-controls">
						<select on:change=move |ev| {
							if let Ok(d) = event_target_value(&ev).parse::<Direction>() {
								direction.set(d);
							}
						}>
							{Direction::ALL
								.into_iter()
								.map(|d| view! { <option value=d.as_str()>{d.as_str()}</option> })
								.collect_view()}
						</select>
						<button on:click=show_errors>"Errors"</button>
						<button on:click=show_critical_path>"Critical path"</button>
						<button on:click=show_slowest>"Slowest"</button>
						<button on:click=clear>"Clear"</button>
					</div>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_trace_is_a_valid_tree() {
		let graph = generate_sample_trace(24);
		assert_eq!(graph.validate(), Ok(()));
		assert_eq!(graph.edges.len(), 23);
		assert_eq!(graph.meta.span_count, 24);
		assert!(!error_nodes(&graph).is_empty());
	}
}
