//! Span graph model, layered layout and highlight overlay.
//!
//! Data flows one way: [`TraceGraph`] -> [`layout_graph`] ->
//! [`PositionedGraph`] -> [`DecoratedGraph`] (parameterized by a
//! [`HighlightSet`]) -> canvas. Nothing here does I/O or holds shared
//! state, so any of it can run wherever the caller likes.

pub mod analysis;
mod error;
mod highlight;
mod layout;
mod model;

pub use error::LayoutError;
pub use highlight::{DecoratedEdge, DecoratedGraph, DecoratedNode, HighlightSet, UiHints, apply_highlight};
pub use layout::{
	Direction, LAYOUT_MARGIN, LayoutBounds, LayoutOptions, LayoutStats, MAX_ORDER_PASSES, NODE_HEIGHT,
	NODE_WIDTH, Position, PositionedGraph, PositionedNode, layout, layout_graph,
};
pub use model::{Edge, GraphMeta, Node, NodeKind, NodePayload, SpanStatus, TagValue, TraceGraph};
