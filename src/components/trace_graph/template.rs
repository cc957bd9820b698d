use crate::graph::NodeKind;

const SERVICE_COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const ERROR_STROKE: &str = "#e5484d";

/// How a node kind is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTemplate {
	pub name: &'static str,
	pub fill: &'static str,
	pub stroke: &'static str,
	pub corner_radius: f64,
	pub alpha: f64,
	/// Draw the service-colored accent bar on the left edge.
	pub service_accent: bool,
}

pub const DEFAULT_TEMPLATE: NodeTemplate = NodeTemplate {
	name: "default",
	fill: "#2a2a40",
	stroke: "#5a5a7a",
	corner_radius: 6.0,
	alpha: 1.0,
	service_accent: false,
};

const SPAN_TEMPLATE: NodeTemplate = NodeTemplate {
	name: "span",
	fill: "#23304a",
	stroke: "#4f7cc4",
	corner_radius: 6.0,
	alpha: 1.0,
	service_accent: true,
};

const SERVICE_TEMPLATE: NodeTemplate = NodeTemplate {
	name: "service",
	fill: "#33264a",
	stroke: "#9467bd",
	corner_radius: 14.0,
	alpha: 1.0,
	service_accent: false,
};

const ROUTE_TEMPLATE: NodeTemplate = NodeTemplate {
	name: "route",
	fill: "#1f3a33",
	stroke: "#2ca02c",
	corner_radius: 2.0,
	alpha: 1.0,
	service_accent: true,
};

impl NodeTemplate {
	/// Template for a kind. Unknown kinds get [`DEFAULT_TEMPLATE`]; static
	/// architecture nodes reuse their base template, faded.
	pub fn for_kind(kind: &NodeKind) -> NodeTemplate {
		match kind {
			NodeKind::Span => SPAN_TEMPLATE,
			NodeKind::Service => SERVICE_TEMPLATE,
			NodeKind::Route => ROUTE_TEMPLATE,
			NodeKind::Static(base) => NodeTemplate {
				alpha: 0.45,
				..NodeTemplate::for_kind(base)
			},
			NodeKind::Other(_) => DEFAULT_TEMPLATE,
		}
	}
}

/// Stable per-service color.
pub fn service_color(service: &str) -> &'static str {
	let sum = service.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
	SERVICE_COLORS[sum % SERVICE_COLORS.len()]
}
