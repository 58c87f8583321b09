use crate::mesh::{Mesh, Vertex};
use crate::post::{BloomPass, HDR_FORMAT, uniform_entry};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};
use roomfly_render::{
    DeviceResources, FrameContext, RETICLE_VERTEX_COUNT, RenderError, Reticle, screen_projection,
};
use roomfly_scene::Shape;
use std::ops::Range;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const SHAPES: [Shape; 4] = [Shape::RoomBox, Shape::Cube, Shape::Sphere, Shape::Torus];

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.392,
    g: 0.584,
    b: 0.929,
    a: 1.0,
};

/// Device, queue and the surface format every pipeline targets.
///
/// Owned by the app; a device loss replaces the whole value.
pub struct GpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

impl InstanceData {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4, 6 => Float32x4,
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn new(model: Mat4, color: [f32; 4]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct HudVertex {
    position: [f32; 2],
    color: [f32; 4],
}

impl HudVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

struct MeshBuffers {
    shape: Shape,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn upload(device: &wgpu::Device, shape: Shape) -> Self {
        let mesh = Mesh::for_shape(shape);
        let label = format!("{shape:?}_mesh");
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&label),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            shape,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// wgpu renderer: lit scene into an HDR target, bloom, then the HUD.
pub struct WgpuRenderer {
    scene_pipeline: wgpu::RenderPipeline,
    hud_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    hud_uniform_buffer: wgpu::Buffer,
    hud_bind_group: wgpu::BindGroup,
    hud_vertex_buffer: wgpu::Buffer,
    meshes: Vec<MeshBuffers>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
    bloom: BloomPass,
    reticle: Reticle,
    width: u32,
    height: u32,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let matrix_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("matrix_layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_uniforms"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group =
            matrix_group(device, &matrix_layout, "scene_uniforms", &uniform_buffer);

        let hud_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("hud_uniforms"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: screen_projection(width as f32, height as f32).to_cols_array_2d(),
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let hud_bind_group =
            matrix_group(device, &matrix_layout, "hud_uniforms", &hud_uniform_buffer);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("matrix_pipeline_layout"),
            bind_group_layouts: &[&matrix_layout],
            push_constant_ranges: &[],
        });

        // Scene pipeline
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let scene_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout(), InstanceData::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
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
        });

        // HUD pipeline: alpha blended, no depth, no culling
        let hud_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("hud_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::HUD_SHADER.into()),
        });

        let hud_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("hud_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &hud_shader,
                entry_point: Some("vs_hud"),
                compilation_options: Default::default(),
                buffers: &[HudVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &hud_shader,
                entry_point: Some("fs_hud"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let hud_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("hud_vertex_buffer"),
            size: (RETICLE_VERTEX_COUNT * std::mem::size_of::<HudVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let meshes = SHAPES
            .iter()
            .map(|&shape| MeshBuffers::upload(device, shape))
            .collect();

        // Instance buffer (pre-allocated)
        let max_instances = 256u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);
        let bloom = BloomPass::new(device, surface_format, width, height);

        tracing::info!(width, height, ?surface_format, "wgpu renderer created");

        Self {
            scene_pipeline,
            hud_pipeline,
            uniform_buffer,
            uniform_bind_group,
            hud_uniform_buffer,
            hud_bind_group,
            hud_vertex_buffer,
            meshes,
            instance_buffer,
            max_instances,
            depth_texture,
            bloom,
            reticle: Reticle::default(),
            width,
            height,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.depth_texture = Self::create_depth_texture(device, self.width, self.height);
        self.bloom.resize(device, self.width, self.height);
    }

    /// Render one frame: scene, bloom, reticle.
    pub fn render(
        &mut self,
        gpu: &GpuDevice,
        output: &wgpu::TextureView,
        frame: &FrameContext<'_>,
    ) {
        let _span = tracing::trace_span!("render_frame", frame = frame.frame).entered();
        let queue = &gpu.queue;

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: frame.view.view_projection().to_cols_array_2d(),
            }),
        );
        queue.write_buffer(
            &self.hud_uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: screen_projection(self.width as f32, self.height as f32)
                    .to_cols_array_2d(),
            }),
        );

        let (instances, ranges) = self.collect_instances(frame);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let center = Vec2::new(self.width as f32, self.height as f32) * 0.5;
        let displacement = frame.scene.animation().reticle_displacement;
        let hud: Vec<HudVertex> = self
            .reticle
            .triangles(center, displacement)
            .iter()
            .map(|v| HudVertex {
                position: v.position.to_array(),
                color: v.color,
            })
            .collect();
        queue.write_buffer(&self.hud_vertex_buffer, 0, bytemuck::cast_slice(&hud));

        self.bloom.upload(queue, frame.bloom);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.bloom.scene_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
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

            pass.set_pipeline(&self.scene_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (mesh, range) in self.meshes.iter().zip(&ranges) {
                if range.is_empty() {
                    continue;
                }
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..mesh.index_count, 0, range.clone());
            }
        }

        let hud_pipeline = &self.hud_pipeline;
        let hud_bind_group = &self.hud_bind_group;
        let hud_vertex_buffer = &self.hud_vertex_buffer;
        self.bloom
            .encode(&mut encoder, output, frame.bloom.is_bypass(), |pass| {
                pass.set_pipeline(hud_pipeline);
                pass.set_bind_group(0, hud_bind_group, &[]);
                pass.set_vertex_buffer(0, hud_vertex_buffer.slice(..));
                pass.draw(0..RETICLE_VERTEX_COUNT as u32, 0..1);
            });

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Instance data grouped by shape, with one instance range per mesh.
    fn collect_instances(
        &self,
        frame: &FrameContext<'_>,
    ) -> (Vec<InstanceData>, Vec<Range<u32>>) {
        let mut instances = Vec::new();
        let mut ranges = Vec::with_capacity(self.meshes.len());
        for mesh in &self.meshes {
            let start = instances.len() as u32;
            for (object, model) in frame.scene.instances() {
                if object.shape != mesh.shape {
                    continue;
                }
                if instances.len() >= self.max_instances as usize {
                    tracing::warn!(max = self.max_instances, "instance buffer full");
                    break;
                }
                instances.push(InstanceData::new(model, object.color));
            }
            ranges.push(start..instances.len() as u32);
        }
        (instances, ranges)
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

fn matrix_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

impl DeviceResources for WgpuRenderer {
    type Device = GpuDevice;

    fn create(gpu: &GpuDevice, width: u32, height: u32) -> Result<Self, RenderError> {
        Ok(Self::new(&gpu.device, gpu.surface_format, width, height))
    }

    fn resize(&mut self, gpu: &GpuDevice, width: u32, height: u32) -> Result<(), RenderError> {
        WgpuRenderer::resize(self, &gpu.device, width, height);
        Ok(())
    }
}
