use thiserror::Error;

/// Structural failures of a layout call. Cycles are not among them; they
/// are handled by suppressing back-edges and only logged.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LayoutError {
	/// An edge names a node id that is not in the node list.
	#[error("edge {edge_id} references unknown node {node_id}")]
	ReferentialIntegrity {
		/// Offending edge.
		edge_id: String,
		/// The missing endpoint.
		node_id: String,
	},

	/// Two nodes share an id.
	#[error("duplicate node id {node_id}")]
	DuplicateNodeId {
		/// The repeated id.
		node_id: String,
	},

	/// Bad spacing or direction.
	#[error("invalid layout configuration: {0}")]
	InvalidConfiguration(String),
}
