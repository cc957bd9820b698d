mod component;
mod render;
mod state;
mod template;

pub use component::TraceGraphCanvas;
