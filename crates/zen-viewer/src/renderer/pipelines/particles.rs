use crate::field::{FieldUniformStd140 as FieldUniform, ParticleField, ParticleInstance};
use wgpu::util::DeviceExt;

// Compile-time safety check: the instance attribute offsets below assume
// this stride.
const _: [(); 32] = [(); core::mem::size_of::<ParticleInstance>()];

/// Instanced point-sprite pass for the particle field. One quad per rendered
/// particle, displaced and sized entirely in the vertex shader.
pub struct ParticlePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub field_layout: wgpu::BindGroupLayout,
    quad_vb: wgpu::Buffer,
}

impl ParticlePipeline {
    pub fn new(device: &wgpu::Device, color_fmt: wgpu::TextureFormat) -> Self {
        // Uniform buffer layout for per-frame field data
        let field_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Field UBO Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                // The fragment stage reads color and tension for the glow mix.
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<FieldUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        // Vertex/fragment shader
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/particles.wgsl"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../../shaders/particles.wgsl").into(),
            ),
        });

        // Unit quad, expanded to a screen-space sprite per instance
        let quad_corners: [[f32; 2]; 6] = [
            [-1.0, -1.0],
            [1.0, -1.0],
            [1.0, 1.0],
            [-1.0, -1.0],
            [1.0, 1.0],
            [-1.0, 1.0],
        ];

        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Quad VB"),
            contents: bytemuck::cast_slice(&quad_corners),
            usage: wgpu::BufferUsages::VERTEX,
        });

        // Vertex buffer layouts: quad + per‑instance data
        let vbuf_layouts = [
            // Quad vertices
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    shader_location: 0,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            },
            // Instance attributes
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<ParticleInstance>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    // Rest target (vec3)
                    wgpu::VertexAttribute {
                        shader_location: 1,
                        offset: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                    // Sprite scale
                    wgpu::VertexAttribute {
                        shader_location: 2,
                        offset: 12,
                        format: wgpu::VertexFormat::Float32,
                    },
                    // Trail index
                    wgpu::VertexAttribute {
                        shader_location: 3,
                        offset: 16,
                        format: wgpu::VertexFormat::Float32,
                    },
                    // Per-particle noise seed (vec3)
                    wgpu::VertexAttribute {
                        shader_location: 4,
                        offset: 20,
                        format: wgpu::VertexFormat::Float32x3,
                    },
                ],
            },
        ];

        // Pipeline layout with field uniform bind group
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle PipelineLayout"),
            bind_group_layouts: &[&field_layout],
            push_constant_ranges: &[],
        });

        // Render pipeline definition
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &vbuf_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // Additive sprites do not occlude each other; no depth buffer.
            depth_stencil: None,
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    // Additive: overlapping sprites sum toward white.
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::One,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            field_layout,
            quad_vb,
        }
    }

    pub fn draw<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>, field: &'a ParticleField) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, field.bind_group(), &[]);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
        rpass.set_vertex_buffer(1, field.vertex_buffer().slice(..));
        rpass.draw(0..6, 0..field.instance_count());
    }
}
