use meshview_common::{FLOAT_SIZE, MeshData, TRIANGLE_SIZE};
use serde::Serialize;
use std::ops::Range;

/// Errors from building the combined vertex buffer.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("mesh has {positions} position floats but {normals} normal floats")]
    LengthMismatch { positions: usize, normals: usize },
    #[error("{region} length {len} is not a multiple of 3")]
    NotVec3 { region: &'static str, len: usize },
    #[error("vertex count {0} does not fit in u32")]
    TooLarge(usize),
}

/// The four consecutive regions of the combined buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    MeshPositions,
    GridPositions,
    MeshNormals,
    /// Copy of the grid positions; the grid is drawn with flat lighting.
    GridNormals,
}

/// How one vec3 attribute reads from the combined buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeBinding {
    /// Name of the vertex shader input.
    pub name: &'static str,
    pub location: u32,
    pub components: u32,
    /// Bytes between consecutive vertices (tightly packed vec3).
    pub stride: u64,
    /// Byte offset of the attribute's first element.
    pub offset: u64,
}

/// One static vertex buffer laid out as
/// `[mesh positions | grid positions | mesh normals | grid normals]`.
///
/// Positions and normals are separate regions, so the same vertex index
/// reads its position from the first half and its normal from the second.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBufferPlan {
    data: Vec<f32>,
    mesh_floats: usize,
    grid_floats: usize,
}

impl VertexBufferPlan {
    pub fn new(mesh: &MeshData, grid_positions: &[f32]) -> Result<Self, LayoutError> {
        if mesh.positions.len() != mesh.normals.len() {
            return Err(LayoutError::LengthMismatch {
                positions: mesh.positions.len(),
                normals: mesh.normals.len(),
            });
        }
        if mesh.positions.len() % TRIANGLE_SIZE != 0 {
            return Err(LayoutError::NotVec3 {
                region: "mesh positions",
                len: mesh.positions.len(),
            });
        }
        if grid_positions.len() % TRIANGLE_SIZE != 0 {
            return Err(LayoutError::NotVec3 {
                region: "grid positions",
                len: grid_positions.len(),
            });
        }
        let total_vertices = (mesh.positions.len() + grid_positions.len()) / TRIANGLE_SIZE;
        if u32::try_from(total_vertices).is_err() {
            return Err(LayoutError::TooLarge(total_vertices));
        }

        let mut data = Vec::with_capacity(2 * (mesh.positions.len() + grid_positions.len()));
        data.extend_from_slice(&mesh.positions);
        data.extend_from_slice(grid_positions);
        data.extend_from_slice(&mesh.normals);
        data.extend_from_slice(grid_positions);

        tracing::debug!(
            mesh_vertices = mesh.positions.len() / TRIANGLE_SIZE,
            grid_vertices = grid_positions.len() / TRIANGLE_SIZE,
            floats = data.len(),
            "planned vertex buffer"
        );

        Ok(Self {
            data,
            mesh_floats: mesh.positions.len(),
            grid_floats: grid_positions.len(),
        })
    }

    /// The whole buffer, ready for upload.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn byte_len(&self) -> u64 {
        (self.data.len() * FLOAT_SIZE) as u64
    }

    pub fn region(&self, region: Region) -> &[f32] {
        let m = self.mesh_floats;
        let g = self.grid_floats;
        let range = match region {
            Region::MeshPositions => 0..m,
            Region::GridPositions => m..m + g,
            Region::MeshNormals => m + g..2 * m + g,
            Region::GridNormals => 2 * m + g..2 * (m + g),
        };
        &self.data[range]
    }

    pub fn position_offset(&self) -> u64 {
        0
    }

    /// Byte offset of the normal region: everything before it is positions.
    pub fn normal_offset(&self) -> u64 {
        ((self.mesh_floats + self.grid_floats) * FLOAT_SIZE) as u64
    }

    /// Size in bytes of the position (or normal) half of the buffer.
    pub fn half_byte_len(&self) -> u64 {
        self.normal_offset()
    }

    pub fn attributes(&self) -> [AttributeBinding; 2] {
        let stride = (TRIANGLE_SIZE * FLOAT_SIZE) as u64;
        [
            AttributeBinding {
                name: "position",
                location: 0,
                components: TRIANGLE_SIZE as u32,
                stride,
                offset: self.position_offset(),
            },
            AttributeBinding {
                name: "normal",
                location: 1,
                components: TRIANGLE_SIZE as u32,
                stride,
                offset: self.normal_offset(),
            },
        ]
    }

    pub fn mesh_vertex_count(&self) -> u32 {
        (self.mesh_floats / TRIANGLE_SIZE) as u32
    }

    pub fn grid_vertex_count(&self) -> u32 {
        (self.grid_floats / TRIANGLE_SIZE) as u32
    }

    /// Vertex indices for the mesh draw.
    pub fn mesh_range(&self) -> Range<u32> {
        0..self.mesh_vertex_count()
    }

    /// Vertex indices for the grid draw, directly after the mesh.
    pub fn grid_range(&self) -> Range<u32> {
        let start = self.mesh_vertex_count();
        start..start + self.grid_vertex_count()
    }

    pub fn summary(&self) -> LayoutSummary {
        LayoutSummary {
            floats: self.data.len(),
            bytes: self.byte_len(),
            mesh_vertices: self.mesh_vertex_count(),
            grid_vertices: self.grid_vertex_count(),
            attributes: self.attributes().to_vec(),
        }
    }
}

/// Serializable overview of a plan, for inspection output.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutSummary {
    pub floats: usize,
    pub bytes: u64,
    pub mesh_vertices: u32,
    pub grid_vertices: u32,
    pub attributes: Vec<AttributeBinding>,
}
