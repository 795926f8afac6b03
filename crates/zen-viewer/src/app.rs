use crate::{
    camera::Camera,
    config::Config,
    field::{ParticleField, POINTER_PARKED},
    ink::InkLayer,
    renderer::Renderer,
    tracker::TrackerBridge,
    ui::{self, UiState},
};
use anyhow::Result;
use glam::{Vec2, Vec3};
use handsig::{extract, GestureFrame, HandChannel, LandmarkSet, ReleaseDetector};
use std::sync::Arc;
use std::time::Instant;
use winit::{event::WindowEvent, window::Window};

pub struct App {
    pub renderer: Renderer,
    pub camera: Camera,
    pub field: ParticleField,
    pub ink: InkLayer,
    pub channel: HandChannel,
    pub release: ReleaseDetector,
    pub tracker: TrackerBridge,
    pub ui_state: UiState,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    /// Last pointer position in NDC; `None` until the pointer first moves.
    pointer_ndc: Option<Vec2>,
    /// Palm repulsion center on the z = 0 plane. Retained across hand loss;
    /// the `hand_active` uniform gates it off instead.
    hand_world: Vec3,
    /// Newest raw landmarks, kept for the preview skeleton.
    last_landmarks: Option<LandmarkSet>,
    epoch: Instant,
}

impl App {
    pub async fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        let renderer = Renderer::new(window.clone()).await?;
        let camera = Camera::new(renderer.gfx.aspect());

        let field = ParticleField::new(
            &renderer.gfx.device,
            &renderer.particles.field_layout,
            config.particles,
            Default::default(),
        );

        let mut tracker = TrackerBridge::new(config.tracker_cmd.clone());
        if !config.tracker_off {
            tracker.start();
        }

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            renderer,
            camera,
            field,
            ink: InkLayer::new(),
            channel: HandChannel::new(),
            release: ReleaseDetector::new(),
            tracker,
            ui_state: UiState::default(),
            egui_ctx,
            egui_state,
            pointer_ndc: None,
            hand_world: Vec3::ZERO,
            last_landmarks: None,
            epoch: Instant::now(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.camera.set_aspect(self.renderer.gfx.aspect());
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        // Pointer tracking stays live even over UI panels, like a window-level
        // listener would.
        if let WindowEvent::CursorMoved { position, .. } = event {
            let size = self.renderer.gfx.size;
            self.pointer_ndc = Some(Vec2::new(
                (position.x as f32 / size.width.max(1) as f32) * 2.0 - 1.0,
                -((position.y as f32 / size.height.max(1) as f32) * 2.0 - 1.0),
            ));
        }

        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        if let WindowEvent::Resized(physical_size) = event {
            self.resize(*physical_size);
        }

        false
    }

    /// Stops the detector child process. Called once on exit.
    pub fn shutdown(&mut self) {
        self.tracker.stop();
    }

    /// Drains detector frames in arrival order: extract, publish, check for
    /// the release gesture. A stopped detector publishes a single absent
    /// frame so the scene does not freeze mid-gesture.
    fn process_gestures(&mut self) {
        let viewport = self.renderer.gfx.viewport();
        let now = self.epoch.elapsed().as_secs_f64();

        if !self.tracker.is_running() {
            if self.channel.state().present {
                self.channel.publish(&GestureFrame::absent(), viewport);
                self.last_landmarks = None;
            }
            return;
        }

        for landmarks in self.tracker.poll() {
            let gesture = landmarks
                .as_ref()
                .map(extract)
                .unwrap_or_else(GestureFrame::absent);
            self.channel.publish(&gesture, viewport);
            if gesture.present && self.release.update(gesture.tension, now) {
                self.field.state.trigger_burst();
                log::debug!("Release gesture detected, scattering field");
            }
            self.last_landmarks = landmarks;
        }
    }

    pub fn frame(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        self.process_gestures();

        // Presence and tension notices for the overlay.
        let delta = self.channel.drain_ui();
        if let Some(present) = delta.presence {
            self.ui_state.hand_present = present;
            log::info!("Hand {}", if present { "acquired" } else { "lost" });
        }
        if let Some(tension) = delta.tension {
            self.ui_state.tension = tension;
        }

        let hand = self.channel.state();
        self.field.state.tick(&hand);

        // Interaction points land on the z = 0 plane through the camera as
        // composed last frame; the drift below only affects the next one.
        let pointer_world = match self.pointer_ndc {
            Some(ndc) => self.camera.unproject_to_plane(ndc),
            None => POINTER_PARKED,
        };
        if hand.present {
            let palm = self.field.state.palm;
            let ndc = Vec2::new(palm.x * 2.0 - 1.0, 1.0 - palm.y * 2.0);
            self.hand_world = self.camera.unproject_to_plane(ndc);
        }

        self.camera
            .drift(self.pointer_ndc.unwrap_or(Vec2::ZERO), self.field.state.time);

        if std::mem::take(&mut self.ui_state.clear_requested) {
            self.ink.clear();
        }
        self.ink.tick(&hand, self.ui_state.draw_mode, self.ui_state.color);

        self.field.set_shape(&self.renderer.gfx.queue, self.ui_state.shape);

        let pixel_ratio = (window.scale_factor() as f32).min(2.0);
        let viewport = self.renderer.gfx.viewport();
        let uniform = self.field.make_uniform(
            &self.camera,
            [viewport.x, viewport.y],
            pixel_ratio,
            pointer_world,
            self.hand_world,
            hand.present,
            self.ui_state.color,
        );
        self.field.upload_uniform(&self.renderer.gfx.queue, &uniform);
        self.ink
            .ensure_uploaded(&self.renderer.gfx.device, &self.renderer.gfx.queue);

        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(
            &swap_view,
            &self.field,
            &self.ink,
            self.ui_state.draw_mode,
            pixel_ratio,
        );

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        ui::draw_hud(&self.egui_ctx, &self.ui_state);
        ui::draw_preview(
            &self.egui_ctx,
            &mut self.ui_state,
            &self.tracker.status,
            self.last_landmarks.as_ref(),
            hand.pinching,
        );
        ui::draw_controls(&self.egui_ctx, &mut self.ui_state);

        let egui_output = self.egui_ctx.end_frame();
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        // Tracker intents fire after present, outside any pass encoding.
        if std::mem::take(&mut self.ui_state.tracker_toggle) {
            if self.tracker.is_running() {
                self.tracker.stop();
            } else {
                self.tracker.start();
            }
        }
        if std::mem::take(&mut self.ui_state.tracker_retry) {
            self.tracker.start();
        }

        Ok(())
    }
}
