//! Shared types for the mesh viewer.
//!
//! # Invariants
//! - `MeshData` positions and normals are parallel triangle-soup arrays.
//! - Every shader variant resolves through one lookup table.

pub mod config;
pub mod types;
pub mod variant;

pub use config::{ConfigError, DEFAULT_MESH, ViewerConfig};
pub use types::{FLOAT_SIZE, MeshData, TRIANGLE_SIZE};
pub use variant::{EffectSpec, ShaderVariant, UnknownVariant};
