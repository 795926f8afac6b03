// Renders pinch-drawn strokes as screen-space capsules with a soft glow halo.

use crate::ink::{InkLayer, SegmentInstance, GLOW_RADIUS_PX, STROKE_WIDTH_PX};
use glam::Vec2;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InkUniforms {
    /// Swap-chain extent in physical pixels.
    pub viewport:  [f32; 2],
    /// Core stroke width, pixels.
    pub stroke_px: f32,
    /// Halo radius beyond the core, pixels.
    pub glow_px:   f32,
}

// Compile‑time safety check: buffer size must match WGSL‑reflected size.
const _: [(); 16] = [(); core::mem::size_of::<InkUniforms>()];

pub struct InkPipeline {
    pipeline:       wgpu::RenderPipeline,
    bind_group:     wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    quad_vb:        wgpu::Buffer,
}

impl InkPipeline {
    pub fn new(device: &wgpu::Device, color_fmt: wgpu::TextureFormat) -> Self {
        // Uniform buffer
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label:               Some("Ink Uniform Buffer"),
            size:                std::mem::size_of::<InkUniforms>() as u64,
            usage:               wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Bind group layout
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label:   Some("Ink BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding:    0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty:                 wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size:   None,
                },
                count: None,
            }],
        });

        // Bind group
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:   Some("Ink Bind Group"),
            layout:  &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding:  0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Unit quad, stretched along each segment in the vertex shader
        let corners: [[f32; 2]; 6] = [
            [-1.0, -1.0], [1.0, -1.0], [1.0, 1.0],
            [-1.0, -1.0], [1.0, 1.0],  [-1.0, 1.0],
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("Ink Quad VB"),
            contents: bytemuck::cast_slice(&corners),
            usage:    wgpu::BufferUsages::VERTEX,
        });

        // Shader module
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label:  Some("Ink WGSL"),
            source: wgpu::ShaderSource::Wgsl(INK_WGSL.into()),
        });

        // Pipeline layout
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label:               Some("Ink Pipeline Layout"),
            bind_group_layouts:  &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Render pipeline
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label:   Some("Ink Pipeline"),
            layout:  Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module:            &shader,
                entry_point:       "vs_main",
                buffers: &[
                    // Quad vertices
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                        step_mode:    wgpu::VertexStepMode::Vertex,
                        attributes:   &[wgpu::VertexAttribute {
                            shader_location: 0,
                            format:          wgpu::VertexFormat::Float32x2,
                            offset:          0,
                        }],
                    },
                    // One segment per instance
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<SegmentInstance>() as u64,
                        step_mode:    wgpu::VertexStepMode::Instance,
                        attributes: &[
                            wgpu::VertexAttribute {
                                shader_location: 1,
                                format:          wgpu::VertexFormat::Float32x2,
                                offset:          0,
                            },
                            wgpu::VertexAttribute {
                                shader_location: 2,
                                format:          wgpu::VertexFormat::Float32x2,
                                offset:          8,
                            },
                            wgpu::VertexAttribute {
                                shader_location: 3,
                                format:          wgpu::VertexFormat::Float32x3,
                                offset:          16,
                            },
                        ],
                    },
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module:            &shader,
                entry_point:       "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format:     color_fmt,
                    blend:      Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive:   wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview:   None,
        });

        Self {
            pipeline,
            bind_group,
            uniform_buffer,
            quad_vb,
        }
    }

    pub fn draw<'a>(
        &'a self,
        rpass:       &mut wgpu::RenderPass<'a>,
        queue:       &wgpu::Queue,
        ink:         &'a InkLayer,
        viewport:    Vec2,
        pixel_ratio: f32,
    ) {
        let Some(segments) = ink.buffer() else {
            return;
        };
        if ink.segment_count() == 0 {
            return;
        }

        // Widths are design-space pixels; scale to physical for hidpi.
        let uniforms = InkUniforms {
            viewport:  [viewport.x, viewport.y],
            stroke_px: STROKE_WIDTH_PX * pixel_ratio,
            glow_px:   GLOW_RADIUS_PX * pixel_ratio,
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
        rpass.set_vertex_buffer(1, segments.slice(..));
        rpass.draw(0..6, 0..ink.segment_count() as u32);
    }
}

pub const INK_WGSL: &str = r#"
struct InkUniforms {
    viewport:  vec2<f32>,
    stroke_px: f32,
    glow_px:   f32,
};
@group(0) @binding(0) var<uniform> U: InkUniforms;

struct VSOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) p_px:  vec2<f32>,  // fragment position, pixels
    @location(2) a_px:  vec2<f32>,  // segment start, pixels
    @location(3) b_px:  vec2<f32>,  // segment end, pixels
}

@vertex
fn vs_main(
    @location(0) corner: vec2<f32>,
    @location(1) a:      vec2<f32>,
    @location(2) b:      vec2<f32>,
    @location(3) color:  vec3<f32>,
) -> VSOut {
    // Pad covers the half stroke plus the glow falloff.
    let pad = U.stroke_px * 0.5 + U.glow_px;

    var axis = b - a;
    let len = length(axis);
    if (len < 1e-4) {
        axis = vec2<f32>(1.0, 0.0);   // degenerate segment: draw a dot
    } else {
        axis = axis / len;
    }
    let norm = vec2<f32>(-axis.y, axis.x);

    // Stretch the unit quad along the segment; extend past both ends for caps.
    let mid = (a + b) * 0.5;
    let p = mid + axis * corner.x * (len * 0.5 + pad) + norm * (corner.y * pad);

    // Pixels (y down) to NDC (y up).
    let ndc = vec2<f32>(
        p.x / U.viewport.x * 2.0 - 1.0,
        1.0 - p.y / U.viewport.y * 2.0,
    );

    var out: VSOut;
    out.clip = vec4<f32>(ndc, 0.0, 1.0);
    out.color = color;
    out.p_px = p;
    out.a_px = a;
    out.b_px = b;
    return out;
}

fn dist_to_segment(p: vec2<f32>, a: vec2<f32>, b: vec2<f32>) -> f32 {
    let ab = b - a;
    let t = clamp(dot(p - a, ab) / max(dot(ab, ab), 1e-6), 0.0, 1.0);
    return length(p - (a + ab * t));
}

@fragment
fn fs_main(in: VSOut) -> @location(0) vec4<f32> {
    let d = dist_to_segment(in.p_px, in.a_px, in.b_px);

    // Opaque core with an anti-aliased edge, plus a wide soft halo.
    let core = 1.0 - smoothstep(U.stroke_px * 0.35, U.stroke_px * 0.5, d);
    let halo = 1.0 - smoothstep(0.0, U.stroke_px * 0.5 + U.glow_px, d);
    let alpha = clamp(core + halo * halo * 0.35, 0.0, 1.0);
    if (alpha < 0.01) {
        discard;
    }
    return vec4<f32>(in.color, alpha);
}
"#;
