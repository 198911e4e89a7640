use crate::shaders::{FRAGMENT_ENTRY, ShaderPair, VERTEX_ENTRY};
use crate::RenderError;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use meshview_render::{DrawCall, Frame, VertexBufferPlan};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Per-draw uniform block. Field order and padding match the WGSL
/// `Uniforms` struct in every shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct DrawUniforms {
    model: [[f32; 4]; 4],
    world: [[f32; 4]; 4],
    camera: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    inverse_transpose: [[f32; 4]; 4],
    effect: f32,
    time: f32,
    flat_lighting: u32,
    pad0: u32,
}

impl DrawUniforms {
    pub(crate) fn new(frame: &Frame, draw: &DrawCall) -> Self {
        Self {
            model: draw.model.to_cols_array_2d(),
            world: draw.world.to_cols_array_2d(),
            camera: frame.camera.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            inverse_transpose: draw.inverse_transpose.to_cols_array_2d(),
            effect: frame.effect_value,
            time: frame.time_ms,
            flat_lighting: draw.flat_lighting as u32,
            pad0: 0,
        }
    }

    fn identity() -> Self {
        let id = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            model: id,
            world: id,
            camera: id,
            projection: id,
            inverse_transpose: id,
            effect: 0.0,
            time: 0.0,
            flat_lighting: 0,
            pad0: 0,
        }
    }
}

/// Uniform buffer plus bind group for one of the two draws.
struct DrawBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl DrawBinding {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&DrawUniforms::identity()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }
}

/// wgpu backend for the viewer: one static vertex buffer, one pipeline per
/// primitive topology, one uniform block per draw.
pub struct WgpuRenderer {
    mesh_pipeline: wgpu::RenderPipeline,
    grid_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    half_len: u64,
    normal_offset: u64,
    mesh_binding: DrawBinding,
    grid_binding: DrawBinding,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    /// Upload the vertex buffer and build both pipelines. Shader compile and
    /// pipeline validation errors are captured and returned.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        plan: &VertexBufferPlan,
        shaders: &ShaderPair,
    ) -> Result<Self, RenderError> {
        shaders.validate(&plan.attributes())?;
        if plan.half_byte_len() == 0 {
            return Err(RenderError::EmptyVertexBuffer);
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_uniforms_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("viewer_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("viewer_vertex"),
            source: wgpu::ShaderSource::Wgsl(shaders.vertex.as_str().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(shaders.variant.effect().fragment_file),
            source: wgpu::ShaderSource::Wgsl(shaders.fragment.as_str().into()),
        });

        let [position, normal] = plan.attributes();
        let vertex_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: position.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: position.location,
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: normal.stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: normal.location,
                }],
            },
        ];

        let make_pipeline = |label: &str, primitive: wgpu::PrimitiveState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: Some(VERTEX_ENTRY),
                    compilation_options: Default::default(),
                    buffers: &vertex_buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: Some(FRAGMENT_ENTRY),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let mesh_pipeline = make_pipeline(
            "mesh_pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
        );
        let grid_pipeline = make_pipeline(
            "grid_pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
        );

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            tracing::error!(variant = %shaders.variant, "pipeline creation failed");
            return Err(RenderError::Pipeline(err.to_string()));
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("viewer_vertex_buffer"),
            contents: bytemuck::cast_slice(plan.data()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mesh_binding = DrawBinding::new(device, &bind_group_layout, "mesh_uniforms");
        let grid_binding = DrawBinding::new(device, &bind_group_layout, "grid_uniforms");
        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::info!(
            variant = %shaders.variant,
            bytes = plan.byte_len(),
            normal_offset = normal.offset,
            "wgpu renderer ready"
        );

        Ok(Self {
            mesh_pipeline,
            grid_pipeline,
            vertex_buffer,
            half_len: plan.half_byte_len(),
            normal_offset: normal.offset,
            mesh_binding,
            grid_binding,
            depth_texture,
            surface_format,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Clear to black, then draw the mesh and the grid from the shared buffer.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &Frame,
    ) {
        let mesh = frame.mesh();
        let grid = frame.grid();
        queue.write_buffer(
            &self.mesh_binding.buffer,
            0,
            bytemuck::bytes_of(&DrawUniforms::new(frame, mesh)),
        );
        queue.write_buffer(
            &self.grid_binding.buffer,
            0,
            bytemuck::bytes_of(&DrawUniforms::new(frame, grid)),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("viewer_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("viewer_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..self.half_len));
            pass.set_vertex_buffer(1, self.vertex_buffer.slice(self.normal_offset..));

            if mesh.vertex_count() > 0 {
                pass.set_pipeline(&self.mesh_pipeline);
                pass.set_bind_group(0, &self.mesh_binding.bind_group, &[]);
                pass.draw(mesh.vertices.clone(), 0..1);
            }
            if grid.vertex_count() > 0 {
                pass.set_pipeline(&self.grid_pipeline);
                pass.set_bind_group(0, &self.grid_binding.bind_group, &[]);
                pass.draw(grid.vertices.clone(), 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshview_common::{MeshData, ShaderVariant};
    use meshview_scene::SceneState;

    fn frame() -> Frame {
        let mesh = MeshData::new(vec![0.0; 9], vec![0.0; 9]);
        let plan = VertexBufferPlan::new(&mesh, &[0.0; 6]).unwrap();
        let scene = SceneState::new(ShaderVariant::Cross, 0.4);
        Frame::new(0, &scene.matrices(), &plan, scene.effect.value(), 1234.0)
    }

    #[test]
    fn uniform_block_is_16_byte_aligned() {
        // five mat4 plus four scalars
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 5 * 64 + 16);
        assert_eq!(std::mem::size_of::<DrawUniforms>() % 16, 0);
    }

    #[test]
    fn packs_per_draw_fields() {
        let frame = frame();
        let mesh = DrawUniforms::new(&frame, frame.mesh());
        let grid = DrawUniforms::new(&frame, frame.grid());

        assert_eq!(mesh.flat_lighting, 0);
        assert_eq!(grid.flat_lighting, 1);
        assert_eq!(mesh.effect, 0.4);
        assert_eq!(grid.time, 1234.0);
        assert_eq!(mesh.camera, grid.camera);
        assert_eq!(grid.world[3][1], -2.0);
        assert_eq!(mesh.model[0][0], 0.01);
        assert_eq!(mesh.model[2][2], -0.01);
    }

    #[test]
    fn packed_bytes_start_with_model_columns() {
        let frame = frame();
        let u = DrawUniforms::new(&frame, frame.mesh());
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&u));
        assert_eq!(floats.len(), 84);
        assert_eq!(&floats[..16], &frame.mesh().model.to_cols_array());
        assert_eq!(floats[80], 0.4);
        assert_eq!(floats[81], 1234.0);
    }
}
