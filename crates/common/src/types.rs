use serde::{Deserialize, Serialize};

/// Components per vertex position or normal.
pub const TRIANGLE_SIZE: usize = 3;

/// Size in bytes of one `f32` in a vertex buffer.
pub const FLOAT_SIZE: usize = std::mem::size_of::<f32>();

/// Triangle-soup mesh: three vertices per triangle, no index buffer.
///
/// `positions` and `normals` are flat `[x, y, z, x, y, z, ...]` arrays of
/// equal length, one normal per position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
}

impl MeshData {
    pub fn new(positions: Vec<f32>, normals: Vec<f32>) -> Self {
        Self { positions, normals }
    }

    /// Number of vertices (not floats).
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / TRIANGLE_SIZE
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut chunks = self.positions.chunks_exact(TRIANGLE_SIZE);
        let first = chunks.next()?;
        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for p in chunks {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some((min, max))
    }
}
