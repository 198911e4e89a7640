//! wgpu render backend for the mesh viewer.
//!
//! Uploads the combined vertex buffer once, then draws the mesh as
//! triangles and the grid as lines every frame, each with its own uniforms.
//!
//! # Invariants
//! - The renderer never mutates scene state.
//! - The vertex buffer is written once at startup and never reallocated.
//! - Shader, attribute and pipeline failures abort startup; nothing retries.

mod context;
mod gpu;
pub mod shaders;
pub mod startup;

pub use context::GpuContext;
pub use gpu::WgpuRenderer;
pub use shaders::{ShaderError, ShaderPair};
pub use startup::{MeshLoaded, ShadersLoaded, Startup, StartupError, Viewer};

/// Errors from GPU setup and pipeline creation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to acquire device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    UnsupportedSurface,
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("nothing to draw: vertex buffer is empty")]
    EmptyVertexBuffer,
    #[error("pipeline validation failed: {0}")]
    Pipeline(String),
}
