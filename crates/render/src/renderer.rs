use crate::frame::{DrawCall, Frame, Topology};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads a frame description and produces output. It never
/// mutates scene state; the render loop owns that.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&mut self, frame: &Frame) -> Self::Output;
}

/// Text renderer for headless runs and logs.
///
/// Produces a human-readable summary of each frame's uniforms and draws.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, frame: &Frame) -> String {
        self.frames += 1;
        let eye = frame.eye();
        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} (time={:.0}ms, effect={:.2}) ===\n",
            frame.index, frame.time_ms, frame.effect_value
        ));
        out.push_str(&format!(
            "Camera: eye=({:.3}, {:.3}, {:.3}) target=(0.000, 0.000, 0.000)\n",
            eye.x, eye.y, eye.z
        ));
        for draw in &frame.draws {
            out.push_str(&describe_draw(draw));
        }
        out
    }
}

fn describe_draw(draw: &DrawCall) -> String {
    let topology = match draw.topology {
        Topology::Triangles => "triangles",
        Topology::Lines => "lines",
    };
    let t = draw.world.w_axis;
    format!(
        "  {:?}: {} vertices {}..{} ({}) flat={} world_offset=({:.2}, {:.2}, {:.2})\n",
        draw.kind,
        topology,
        draw.vertices.start,
        draw.vertices.end,
        draw.vertex_count(),
        draw.flat_lighting,
        t.x,
        t.y,
        t.z
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::VertexBufferPlan;
    use meshview_common::{MeshData, ShaderVariant};
    use meshview_scene::SceneState;

    fn frame() -> Frame {
        let mesh = MeshData::new(vec![0.0; 9], vec![0.0; 9]);
        let plan = VertexBufferPlan::new(&mesh, &[0.0; 6]).unwrap();
        let scene = SceneState::new(ShaderVariant::GreenShift, 0.5);
        Frame::new(7, &scene.matrices(), &plan, scene.effect.value(), 250.0)
    }

    #[test]
    fn debug_renderer_header() {
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&frame());
        assert!(output.contains("Frame 7"));
        assert!(output.contains("time=250ms"));
        assert!(output.contains("effect=0.50"));
        assert!(output.starts_with("=== Frame 7"));
        assert_eq!(output.lines().nth(1).map(|l| l.starts_with("Camera: eye=")), Some(true));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn debug_renderer_lists_both_draws() {
        let output = DebugTextRenderer::new().render(&frame());
        assert!(output.contains("Mesh: triangles vertices 0..3 (3) flat=false"));
        assert!(output.contains("Grid: lines vertices 3..5 (2) flat=true"));
        assert!(output.contains("world_offset=(0.00, -2.00, 0.00)"));
    }
}
