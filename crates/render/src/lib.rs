//! Rendering Adapter: renderer-agnostic frame description and render loop.
//!
//! # Invariants
//! - The vertex buffer is planned once and never rewritten.
//! - Renderers only read frames; scene state is advanced by the loop.
//! - A frame always carries exactly two draws: mesh triangles, then grid lines.
//!
//! The `Renderer` trait is stable; the wgpu backend and the debug text
//! renderer both consume the same `Frame`.

mod frame;
mod layout;
mod render_loop;
mod renderer;

pub use frame::{DrawCall, DrawKind, Frame, Topology};
pub use layout::{AttributeBinding, LayoutError, LayoutSummary, Region, VertexBufferPlan};
pub use render_loop::{Clock, LoopError, ManualClock, RenderLoop, StopToken, SystemClock, TIME_PERIOD_MS};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "meshview-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
