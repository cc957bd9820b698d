pub mod trace_graph;
