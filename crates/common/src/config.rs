//! Viewer configuration loaded from YAML.
//!
//! Every field has a default so an empty file (or no file) is valid.
//! Command-line flags are applied on top by the binaries.

use crate::variant::ShaderVariant;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("grid spacing must be positive, got {0}")]
    GridSpacing(f32),
}

/// Mesh shown when neither the config file nor a flag names one. Relative
/// to the workspace root, where `resources/` ships it.
pub const DEFAULT_MESH: &str = "resources/cube.obj";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// OBJ file to display.
    pub mesh: PathBuf,
    pub shader: ShaderVariant,
    /// Load WGSL from this directory instead of the embedded sources.
    pub shader_dir: Option<PathBuf>,
    pub grid_row_spacing: f32,
    pub grid_col_spacing: f32,
    /// Effect value before the slider is touched.
    pub initial_effect: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            mesh: PathBuf::from(DEFAULT_MESH),
            shader: ShaderVariant::default(),
            shader_dir: None,
            grid_row_spacing: 1.0,
            grid_col_spacing: 1.0,
            initial_effect: 0.0,
            width: 800,
            height: 800,
        }
    }
}

impl ViewerConfig {
    /// Load a config file, validating grid spacing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "loaded viewer config");
        Ok(config)
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line values on top of the file. `None` keeps the file value.
    pub fn apply_overrides(
        &mut self,
        mesh: Option<PathBuf>,
        shader: Option<ShaderVariant>,
        shader_dir: Option<PathBuf>,
    ) {
        if let Some(mesh) = mesh {
            self.mesh = mesh;
        }
        if let Some(shader) = shader {
            self.shader = shader;
        }
        if shader_dir.is_some() {
            self.shader_dir = shader_dir;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for spacing in [self.grid_row_spacing, self.grid_col_spacing] {
            if !(spacing.is_finite() && spacing > 0.0) {
                return Err(ConfigError::GridSpacing(spacing));
            }
        }
        Ok(())
    }
}
