//! Typed startup stages. Each stage consumes the previous one, so a shader
//! load cannot begin before the mesh is in memory and the loop cannot start
//! without both.

use crate::context::GpuContext;
use crate::gpu::WgpuRenderer;
use crate::shaders::{ShaderError, ShaderPair};
use crate::RenderError;
use meshview_assets::AssetError;
use meshview_common::{MeshData, ShaderVariant};
use meshview_render::{Clock, LayoutError, LoopError, RenderLoop, VertexBufferPlan};
use meshview_scene::{GridError, build_grid};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("mesh: {0}")]
    Mesh(#[from] AssetError),
    #[error("shaders: {0}")]
    Shader(#[from] ShaderError),
    #[error("grid: {0}")]
    Grid(#[from] GridError),
    #[error("vertex layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("renderer: {0}")]
    Render(#[from] RenderError),
    #[error("render loop: {0}")]
    Loop(#[from] LoopError),
}

/// Entry point of the startup chain.
pub struct Startup;

impl Startup {
    pub fn load_mesh(path: &Path) -> Result<MeshLoaded, StartupError> {
        let mesh = meshview_assets::load_obj(path)?;
        Ok(MeshLoaded { mesh })
    }
}

/// A parsed mesh, waiting for shaders.
#[derive(Debug, Clone)]
pub struct MeshLoaded {
    mesh: MeshData,
}

impl MeshLoaded {
    /// Skip the file read; used by headless tools and tests.
    pub fn from_mesh(mesh: MeshData) -> Self {
        Self { mesh }
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn load_shaders(
        self,
        variant: ShaderVariant,
        shader_dir: Option<&Path>,
    ) -> Result<ShadersLoaded, StartupError> {
        let shaders = ShaderPair::load(variant, shader_dir)?;
        Ok(ShadersLoaded {
            mesh: self.mesh,
            shaders,
        })
    }
}

/// Mesh and shader sources, ready for a device.
#[derive(Debug, Clone)]
pub struct ShadersLoaded {
    mesh: MeshData,
    shaders: ShaderPair,
}

impl ShadersLoaded {
    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn shaders(&self) -> &ShaderPair {
        &self.shaders
    }

    /// Build the grid and the combined vertex buffer and check that the
    /// shaders bind every attribute the layout provides. No GPU involved.
    pub fn prepare(&self, row_spacing: f32, col_spacing: f32) -> Result<VertexBufferPlan, StartupError> {
        let grid = build_grid(row_spacing, col_spacing)?;
        let plan = VertexBufferPlan::new(&self.mesh, &grid)?;
        self.shaders.validate(&plan.attributes())?;
        Ok(plan)
    }

    /// Create the GPU resources and put the render loop into `Running`.
    pub fn start(
        self,
        gpu: &GpuContext,
        row_spacing: f32,
        col_spacing: f32,
        clock: &impl Clock,
    ) -> Result<Viewer, StartupError> {
        let plan = self.prepare(row_spacing, col_spacing)?;
        let (width, height) = gpu.size();
        let renderer = WgpuRenderer::new(
            &gpu.device,
            gpu.format(),
            width,
            height,
            &plan,
            &self.shaders,
        )?;
        let mut render_loop = RenderLoop::new(plan);
        render_loop.start(clock)?;
        Ok(Viewer {
            renderer,
            render_loop,
            variant: self.shaders.variant,
        })
    }
}

/// A started viewer: the backend and the loop that feeds it.
pub struct Viewer {
    pub renderer: WgpuRenderer,
    pub render_loop: RenderLoop,
    pub variant: ShaderVariant,
}
