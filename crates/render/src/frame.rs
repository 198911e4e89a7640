use crate::layout::VertexBufferPlan;
use glam::{Mat4, Vec3};
use meshview_scene::{FrameMatrices, ObjectTransforms};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    Mesh,
    Grid,
}

/// One draw from the combined vertex buffer with its per-draw uniforms.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub kind: DrawKind,
    pub topology: Topology,
    pub vertices: Range<u32>,
    pub model: Mat4,
    pub world: Mat4,
    pub inverse_transpose: Mat4,
    pub flat_lighting: bool,
}

impl DrawCall {
    pub fn vertex_count(&self) -> u32 {
        self.vertices.end - self.vertices.start
    }

    fn new(kind: DrawKind, vertices: Range<u32>, transforms: &ObjectTransforms) -> Self {
        let (topology, flat_lighting) = match kind {
            DrawKind::Mesh => (Topology::Triangles, false),
            DrawKind::Grid => (Topology::Lines, true),
        };
        Self {
            kind,
            topology,
            vertices,
            model: transforms.model,
            world: transforms.world,
            inverse_transpose: transforms.inverse_transpose,
            flat_lighting,
        }
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Zero-based frame number since the loop started.
    pub index: u64,
    pub camera: Mat4,
    pub projection: Mat4,
    pub effect_value: f32,
    /// Wall-clock milliseconds modulo the effect time period.
    pub time_ms: f32,
    pub draws: [DrawCall; 2],
}

impl Frame {
    pub fn new(
        index: u64,
        matrices: &FrameMatrices,
        plan: &VertexBufferPlan,
        effect_value: f32,
        time_ms: f32,
    ) -> Self {
        Self {
            index,
            camera: matrices.camera,
            projection: matrices.projection,
            effect_value,
            time_ms,
            draws: [
                DrawCall::new(DrawKind::Mesh, plan.mesh_range(), &matrices.mesh),
                DrawCall::new(DrawKind::Grid, plan.grid_range(), &matrices.grid),
            ],
        }
    }

    pub fn mesh(&self) -> &DrawCall {
        &self.draws[0]
    }

    pub fn grid(&self) -> &DrawCall {
        &self.draws[1]
    }

    /// Camera position in world space, recovered from the view matrix.
    pub fn eye(&self) -> Vec3 {
        self.camera.inverse().transform_point3(Vec3::ZERO)
    }
}
