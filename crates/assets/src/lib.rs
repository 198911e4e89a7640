//! Mesh loading: Wavefront OBJ text into triangle-soup position/normal arrays.
//!
//! The renderer consumes `MeshData` only; it never sees OBJ indices.

mod obj;

pub use obj::{load_obj, parse_obj};

/// Errors from mesh loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OBJ parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("mesh contains no faces")]
    Empty,
}

impl AssetError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

pub fn crate_info() -> &'static str {
    "meshview-assets v0.1.0"
}
