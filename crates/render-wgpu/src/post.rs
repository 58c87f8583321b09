//! Bloom post-process: extract, horizontal blur, vertical blur, combine.
//!
//! The scene is drawn into an HDR target at full resolution. Extraction
//! downsamples into a half-resolution target, the two blur passes ping-pong
//! between the half-resolution targets, and the combine pass writes the
//! final image to the output view. While bloom is bypassed a single copy
//! pass replaces all four.

use crate::shaders;
use bytemuck::{Pod, Zeroable};
use roomfly_bloom::{
    BloomKernel, BloomParameters, BloomPreset, BloomState, MAX_TAPS, half_resolution,
};
use wgpu::util::DeviceExt;

/// Format of the scene and bloom intermediate targets.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// GPU layout of one blur kernel: `xy` offset in UV units, `z` weight.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct KernelUniform {
    pub samples: [[f32; 4]; MAX_TAPS],
    pub count: u32,
    pub _pad: [u32; 3],
}

impl KernelUniform {
    pub fn from_kernel(kernel: &BloomKernel) -> Self {
        let mut uniform = Self::zeroed();
        let count = kernel.len().min(MAX_TAPS);
        for (slot, (offset, weight)) in uniform
            .samples
            .iter_mut()
            .zip(kernel.offsets().iter().zip(kernel.weights()))
            .take(count)
        {
            *slot = [offset[0], offset[1], *weight, 0.0];
        }
        uniform.count = count as u32;
        uniform
    }
}

/// Extract and combine parameters.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PostParams {
    pub threshold: f32,
    pub bloom_intensity: f32,
    pub base_intensity: f32,
    pub bloom_saturation: f32,
    pub base_saturation: f32,
    pub _pad: [f32; 3],
}

impl From<BloomParameters> for PostParams {
    fn from(p: BloomParameters) -> Self {
        Self {
            threshold: p.threshold,
            bloom_intensity: p.bloom_intensity,
            base_intensity: p.base_intensity,
            bloom_saturation: p.bloom_saturation,
            base_saturation: p.base_saturation,
            _pad: [0.0; 3],
        }
    }
}

struct Target {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

fn create_target(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Target {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: HDR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&Default::default());
    Target {
        _texture: texture,
        view,
    }
}

/// Size-dependent textures and the bind groups that read them.
struct Targets {
    scene: Target,
    bloom_a: Target,
    bloom_b: Target,
    extract_group: wgpu::BindGroup,
    blur_h_group: wgpu::BindGroup,
    blur_v_group: wgpu::BindGroup,
    combine_group: wgpu::BindGroup,
    copy_group: wgpu::BindGroup,
}

/// Size-independent objects the targets' bind groups point at.
struct Shared {
    single_layout: wgpu::BindGroupLayout,
    combine_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_buffer: wgpu::Buffer,
    kernel_h_buffer: wgpu::Buffer,
    kernel_v_buffer: wgpu::Buffer,
}

pub struct BloomPass {
    extract_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    combine_pipeline: wgpu::RenderPipeline,
    copy_pipeline: wgpu::RenderPipeline,
    shared: Shared,
    targets: Targets,
    uploaded_generation: Option<u64>,
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

pub(crate) fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    fragment: &str,
    entry_point: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(shaders::post_shader(fragment).into()),
    });
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: Some("vs_fullscreen"),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: Some(entry_point),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("bloom_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let single_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_single_layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let combine_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_combine_layout"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
                texture_entry(3),
            ],
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom_params"),
            contents: bytemuck::bytes_of(&PostParams::from(BloomPreset::Default.parameters())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let kernel_h_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom_kernel_h"),
            contents: bytemuck::bytes_of(&KernelUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let kernel_v_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom_kernel_v"),
            contents: bytemuck::bytes_of(&KernelUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let extract_pipeline = fullscreen_pipeline(
            device,
            "bloom_extract",
            &single_layout,
            shaders::BLOOM_EXTRACT_FS,
            "fs_extract",
            HDR_FORMAT,
        );
        let blur_pipeline = fullscreen_pipeline(
            device,
            "bloom_blur",
            &single_layout,
            shaders::BLOOM_BLUR_FS,
            "fs_blur",
            HDR_FORMAT,
        );
        let combine_pipeline = fullscreen_pipeline(
            device,
            "bloom_combine",
            &combine_layout,
            shaders::BLOOM_COMBINE_FS,
            "fs_combine",
            output_format,
        );
        let copy_pipeline = fullscreen_pipeline(
            device,
            "bloom_bypass_copy",
            &single_layout,
            shaders::COPY_FS,
            "fs_copy",
            output_format,
        );

        let shared = Shared {
            single_layout,
            combine_layout,
            sampler,
            params_buffer,
            kernel_h_buffer,
            kernel_v_buffer,
        };
        let targets = Targets::new(device, &shared, width, height);
        Self {
            extract_pipeline,
            blur_pipeline,
            combine_pipeline,
            copy_pipeline,
            shared,
            targets,
            uploaded_generation: None,
        }
    }

    /// View the scene pass renders into.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets = Targets::new(device, &self.shared, width, height);
    }

    /// Push parameters every frame; kernels only when a new set was published.
    pub fn upload(&mut self, queue: &wgpu::Queue, bloom: &BloomState) {
        queue.write_buffer(
            &self.shared.params_buffer,
            0,
            bytemuck::bytes_of(&PostParams::from(bloom.parameters())),
        );
        if self.uploaded_generation == Some(bloom.generation()) {
            return;
        }
        if let Some(kernels) = bloom.kernels() {
            queue.write_buffer(
                &self.shared.kernel_h_buffer,
                0,
                bytemuck::bytes_of(&KernelUniform::from_kernel(&kernels.horizontal)),
            );
            queue.write_buffer(
                &self.shared.kernel_v_buffer,
                0,
                bytemuck::bytes_of(&KernelUniform::from_kernel(&kernels.vertical)),
            );
            tracing::debug!(generation = bloom.generation(), "uploaded bloom kernels");
        }
        self.uploaded_generation = Some(bloom.generation());
    }

    /// Record the post-process into `encoder`, leaving `output` open for
    /// overlays drawn by the caller in `overlay`.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        output: &wgpu::TextureView,
        bypass: bool,
        overlay: impl FnOnce(&mut wgpu::RenderPass<'_>),
    ) {
        let t = &self.targets;
        if !bypass {
            let extract = &self.extract_pipeline;
            let blur = &self.blur_pipeline;
            fullscreen_pass(encoder, "bloom_extract", &t.bloom_a.view, extract, &t.extract_group);
            fullscreen_pass(encoder, "bloom_blur_h", &t.bloom_b.view, blur, &t.blur_h_group);
            fullscreen_pass(encoder, "bloom_blur_v", &t.bloom_a.view, blur, &t.blur_v_group);
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(if bypass { "bloom_bypass" } else { "bloom_combine" }),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            ..Default::default()
        });
        if bypass {
            pass.set_pipeline(&self.copy_pipeline);
            pass.set_bind_group(0, &t.copy_group, &[]);
        } else {
            pass.set_pipeline(&self.combine_pipeline);
            pass.set_bind_group(0, &t.combine_group, &[]);
        }
        pass.draw(0..3, 0..1);
        overlay(&mut pass);
    }
}

impl Targets {
    fn new(device: &wgpu::Device, shared: &Shared, width: u32, height: u32) -> Self {
        let (half_w, half_h) = half_resolution(width.max(1), height.max(1));
        let scene = create_target(device, "scene_color", width, height);
        let bloom_a = create_target(device, "bloom_a", half_w, half_h);
        let bloom_b = create_target(device, "bloom_b", half_w, half_h);

        let params = &shared.params_buffer;
        let extract_group = single_group(device, shared, "bloom_extract", &scene.view, params);
        let blur_h_group =
            single_group(device, shared, "bloom_blur_h", &bloom_a.view, &shared.kernel_h_buffer);
        let blur_v_group =
            single_group(device, shared, "bloom_blur_v", &bloom_b.view, &shared.kernel_v_buffer);
        let copy_group = single_group(device, shared, "bloom_bypass", &scene.view, params);
        let combine_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bloom_combine"),
            layout: &shared.combine_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&scene.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&shared.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&bloom_a.view),
                },
            ],
        });

        tracing::debug!(width, height, half_w, half_h, "created bloom targets");
        Self {
            scene,
            bloom_a,
            bloom_b,
            extract_group,
            blur_h_group,
            blur_v_group,
            combine_group,
            copy_group,
        }
    }
}

fn single_group(
    device: &wgpu::Device,
    shared: &Shared,
    label: &str,
    source: &wgpu::TextureView,
    uniform: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: &shared.single_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(source),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&shared.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniform.as_entire_binding(),
            },
        ],
    })
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        ..Default::default()
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, group, &[]);
    pass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomfly_bloom::{BloomPreset, BlurKernels};

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<KernelUniform>(), 16 * MAX_TAPS + 16);
        assert_eq!(std::mem::size_of::<PostParams>(), 32);
    }

    #[test]
    fn kernel_packing() {
        let kernels = BlurKernels::for_target(4.0, 15, 800, 450).unwrap();
        let h = KernelUniform::from_kernel(&kernels.horizontal);
        let v = KernelUniform::from_kernel(&kernels.vertical);

        assert_eq!(h.count, 15);
        assert_eq!(h.samples[0], [0.0, 0.0, kernels.horizontal.weights()[0], 0.0]);
        assert!((h.samples[1][0] - 1.5 / 800.0).abs() < 1e-7);
        assert!((v.samples[1][1] - 1.5 / 450.0).abs() < 1e-7);
        // Unused slots stay zero.
        assert!(h.samples[15..].iter().all(|s| *s == [0.0; 4]));

        let total: f32 = h.samples.iter().map(|s| s[2]).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn params_from_preset() {
        let p = PostParams::from(BloomPreset::Saturated.parameters());
        assert_eq!(p.threshold, 0.25);
        assert_eq!(p.bloom_intensity, 2.0);
        assert_eq!(p.bloom_saturation, 2.0);
        assert_eq!(p.base_saturation, 0.0);
    }
}
