//! The main rendering orchestrator. Owns the GPU context and the scene
//! pipelines; the egui pass is encoded separately by the app.

pub mod context;
pub mod pipelines;

use self::{
    context::GfxContext,
    pipelines::{ink::InkPipeline, particles::ParticlePipeline},
};
use crate::{field::ParticleField, ink::InkLayer};
use std::sync::Arc;
use winit::window::Window;

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    pub particles: ParticlePipeline,
    pub ink: InkPipeline,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window).await?;

        let particles = ParticlePipeline::new(&gfx.device, gfx.config.format);
        let ink = InkPipeline::new(&gfx.device, gfx.config.format);

        let egui_renderer =
            egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            particles,
            ink,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
        }
    }

    /// Encodes the scene pass: particles over a black clear, then any
    /// recorded ink strokes on top.
    pub fn render(
        &mut self,
        swap_view: &wgpu::TextureView,
        field: &ParticleField,
        ink_layer: &InkLayer,
        draw_mode: bool,
        pixel_ratio: f32,
    ) {
        let viewport = self.gfx.viewport();
        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.0,
                            g: 0.0,
                            b: 0.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.particles.draw(&mut pass, field);

            // Strokes persist across draw-mode toggles; only visibility changes.
            if draw_mode {
                self.ink
                    .draw(&mut pass, &self.gfx.queue, ink_layer, viewport, pixel_ratio);
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
