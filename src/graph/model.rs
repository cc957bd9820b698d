//! Nodes, edges and graphs as delivered by the trace API.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::error::LayoutError;

/// A single tag value. Tags coming from the tracer are loosely typed, so
/// only the three scalar shapes are kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
	/// `true` / `false`
	Bool(bool),
	/// Any JSON number.
	Number(f64),
	/// Any string.
	Text(String),
}

impl From<&str> for TagValue {
	fn from(value: &str) -> Self {
		TagValue::Text(value.to_owned())
	}
}

impl From<f64> for TagValue {
	fn from(value: f64) -> Self {
		TagValue::Number(value)
	}
}

impl From<bool> for TagValue {
	fn from(value: bool) -> Self {
		TagValue::Bool(value)
	}
}

/// Outcome of a span.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
	/// The span completed normally.
	#[default]
	Success,
	/// The span carried an error tag or a 5xx status.
	Error,
}

/// What a node shows: one span (or one static route/service group).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePayload {
	/// Operation name, e.g. `GET /api/users`.
	pub operation_name: String,
	/// Owning service.
	pub service_name: String,
	/// Duration in milliseconds.
	#[serde(default)]
	pub duration_ms: f64,
	/// Start offset relative to the trace (microseconds).
	#[serde(default)]
	pub start_offset: i64,
	/// Success or error.
	#[serde(default)]
	pub status: SpanStatus,
	/// Remaining span tags.
	#[serde(default)]
	pub tags: BTreeMap<String, TagValue>,
}

impl NodePayload {
	/// Whether the span failed.
	pub fn is_error(&self) -> bool {
		self.status == SpanStatus::Error
	}
}

/// Classification of a node's kind string. Anything unknown lands in
/// [`NodeKind::Other`] and is drawn with the default template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
	/// A runtime span.
	Span,
	/// A service / route group.
	Service,
	/// A single route endpoint.
	Route,
	/// A node from the static architecture graph, wrapping its base kind.
	Static(Box<NodeKind>),
	/// Unrecognized kind.
	Other(String),
}

impl NodeKind {
	/// Parse a kind tag. Never fails.
	pub fn parse(kind: &str) -> Self {
		if let Some(base) = kind.strip_prefix("static-") {
			return NodeKind::Static(Box::new(NodeKind::parse(base)));
		}
		match kind {
			"span" => NodeKind::Span,
			"service" => NodeKind::Service,
			"route" => NodeKind::Route,
			other => NodeKind::Other(other.to_owned()),
		}
	}
}

/// Input node. Has no position until it passes through the layout engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Unique within a graph.
	pub id: String,
	/// Rendering template selector (`span`, `service`, ...).
	#[serde(default = "default_node_kind")]
	pub kind: String,
	/// Span data.
	pub payload: NodePayload,
}

fn default_node_kind() -> String {
	"span".to_owned()
}

impl Node {
	/// Convenience constructor for a span node.
	pub fn span(id: impl Into<String>, operation: impl Into<String>, service: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			kind: default_node_kind(),
			payload: NodePayload {
				operation_name: operation.into(),
				service_name: service.into(),
				..NodePayload::default()
			},
		}
	}

	/// Parsed kind.
	pub fn node_kind(&self) -> NodeKind {
		NodeKind::parse(&self.kind)
	}
}

/// Input edge. Carries no geometry; drawn between its endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	/// Unique edge id.
	pub id: String,
	/// Parent / caller node.
	pub source_id: String,
	/// Child / callee node.
	pub target_id: String,
	/// Relationship, e.g. `childOf`.
	#[serde(default = "default_edge_kind")]
	pub kind: String,
	/// Optional latency annotation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub latency_ms: Option<f64>,
	/// Display hint set by the graph builder (error edges).
	#[serde(default)]
	pub animated: bool,
}

fn default_edge_kind() -> String {
	"childOf".to_owned()
}

impl Edge {
	/// A plain `childOf` edge with the conventional `edge:src-dst` id.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		let (source_id, target_id) = (source.into(), target.into());
		Self {
			id: format!("edge:{}-{}", source_id, target_id),
			source_id,
			target_id,
			kind: default_edge_kind(),
			latency_ms: None,
			animated: false,
		}
	}
}

/// Display-only summary; never read by the layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMeta {
	/// Jaeger trace id, if the graph came from a trace.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub trace_id: Option<String>,
	/// End of the last span minus start of the first, in ms.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total_duration_ms: Option<f64>,
	/// Number of spans.
	#[serde(default)]
	pub span_count: usize,
	/// Number of distinct services.
	#[serde(default)]
	pub service_count: usize,
	/// `static`, `overlay`, or absent for runtime traces.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
}

/// A whole graph as produced by the builder. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceGraph {
	/// Nodes, in builder order.
	pub nodes: Vec<Node>,
	/// Edges, in builder order.
	pub edges: Vec<Edge>,
	/// Summary for display.
	#[serde(default)]
	pub meta: GraphMeta,
}

impl TraceGraph {
	/// Build a graph and fill in its summary.
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
		let mut graph = Self {
			nodes,
			edges,
			meta: GraphMeta::default(),
		};
		graph.meta = graph.summarize();
		graph
	}

	/// Check the builder contract: unique node ids, edges naming known nodes.
	pub fn validate(&self) -> Result<(), LayoutError> {
		let mut seen = HashSet::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if !seen.insert(node.id.as_str()) {
				return Err(LayoutError::DuplicateNodeId {
					node_id: node.id.clone(),
				});
			}
		}
		check_edges(&self.edges, |id| seen.contains(id))
	}

	/// Recompute span/service counts and the total duration.
	pub fn summarize(&self) -> GraphMeta {
		let services: HashSet<&str> = self
			.nodes
			.iter()
			.map(|n| n.payload.service_name.as_str())
			.collect();

		let total_duration_ms = if self.nodes.is_empty() {
			None
		} else {
			// start offsets are microseconds, durations milliseconds
			let start = self.nodes.iter().map(|n| n.payload.start_offset).min().unwrap_or(0) as f64;
			let end = self
				.nodes
				.iter()
				.map(|n| n.payload.start_offset as f64 + n.payload.duration_ms * 1000.0)
				.fold(f64::MIN, f64::max);
			Some((end - start) / 1000.0)
		};

		GraphMeta {
			trace_id: self.meta.trace_id.clone(),
			version: self.meta.version.clone(),
			total_duration_ms,
			span_count: self.nodes.len(),
			service_count: services.len(),
		}
	}

	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}
}

/// Fail on the first edge whose endpoint is not known.
pub(crate) fn check_edges<'a>(
	edges: impl IntoIterator<Item = &'a Edge>,
	known: impl Fn(&str) -> bool,
) -> Result<(), LayoutError> {
	for edge in edges {
		for endpoint in [&edge.source_id, &edge.target_id] {
			if !known(endpoint) {
				return Err(LayoutError::ReferentialIntegrity {
					edge_id: edge.id.clone(),
					node_id: endpoint.clone(),
				});
			}
		}
	}
	Ok(())
}
