//! egui overlay: HUD header, hand preview panel, and the bottom control bar.

use crate::shapes::ShapeKind;
use crate::tracker::TrackerStatus;
use handsig::{
    landmarks::{INDEX_TIP, SKELETON},
    LandmarkSet,
};

/// Selectable particle colors, sRGB in `0..=1`.
pub const PALETTE: [[f32; 3]; 6] = [
    [0.0, 1.0, 1.0],     // Cyan
    [1.0, 0.0, 1.0],     // Magenta
    [1.0, 0.843, 0.0],   // Gold
    [0.196, 0.804, 0.196], // Lime
    [1.0, 1.0, 1.0],     // White
    [1.0, 0.271, 0.0],   // OrangeRed
];

/// UI-side state, updated by widget interaction and by presence/tension
/// notices drained from the signal channel.
pub struct UiState {
    pub shape: ShapeKind,
    pub color: [f32; 3],
    pub draw_mode: bool,
    /// One-shot: wipe the ink layer this frame.
    pub clear_requested: bool,
    /// One-shot: the power button was clicked.
    pub tracker_toggle: bool,
    /// One-shot: the retry button was clicked after a tracker failure.
    pub tracker_retry: bool,
    pub tension: f32,
    pub hand_present: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            shape: ShapeKind::default(),
            color: PALETTE[0],
            draw_mode: false,
            clear_requested: false,
            tracker_toggle: false,
            tracker_retry: false,
            tension: 0.0,
            hand_present: false,
        }
    }
}

/// Title and gesture hint, top-left.
pub fn draw_hud(ctx: &egui::Context, state: &UiState) {
    egui::Area::new(egui::Id::new("hud"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(16.0, 16.0))
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new("ZEN PARTICLES")
                    .size(28.0)
                    .strong()
                    .color(egui::Color32::WHITE),
            );
            let hint = if state.hand_present {
                if state.draw_mode {
                    "Pinch thumb & index to WRITE."
                } else {
                    "Fist to gather, Release to scatter."
                }
            } else {
                "Initializing vision... Raise your hand."
            };
            ui.label(egui::RichText::new(hint).color(egui::Color32::from_gray(160)));
            if !state.hand_present {
                ui.label(
                    egui::RichText::new("Waiting for hand tracking...")
                        .small()
                        .color(egui::Color32::from_rgb(96, 165, 250)),
                );
            }
        });
}

/// Hand preview panel, top-right: skeleton overlay plus power/retry controls.
pub fn draw_preview(
    ctx: &egui::Context,
    state: &mut UiState,
    status: &TrackerStatus,
    landmarks: Option<&LandmarkSet>,
    pinching: bool,
) {
    egui::Window::new("hand_preview")
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
        .title_bar(false)
        .resizable(false)
        .show(ctx, |ui| {
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(192.0, 144.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 4.0, egui::Color32::from_black_alpha(200));

            match status {
                TrackerStatus::Running => {
                    if let Some(lm) = landmarks {
                        paint_skeleton(ui.painter(), rect, lm, pinching);
                    }
                    ui.painter().circle_filled(
                        egui::pos2(rect.min.x + 8.0, rect.max.y - 8.0),
                        3.0,
                        egui::Color32::GREEN,
                    );
                    ui.painter().text(
                        egui::pos2(rect.min.x + 16.0, rect.max.y - 8.0),
                        egui::Align2::LEFT_CENTER,
                        "VISION ACTIVE",
                        egui::FontId::monospace(9.0),
                        egui::Color32::from_gray(180),
                    );
                }
                TrackerStatus::Paused => {
                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        "Tracker Paused",
                        egui::FontId::proportional(12.0),
                        egui::Color32::from_gray(110),
                    );
                }
                TrackerStatus::Failed(reason) => {
                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        format!("Tracker error: {reason}"),
                        egui::FontId::proportional(10.0),
                        egui::Color32::from_rgb(248, 113, 113),
                    );
                }
            }

            ui.horizontal(|ui| {
                let power_label = if matches!(status, TrackerStatus::Running) {
                    "Pause"
                } else {
                    "Power"
                };
                if ui.small_button(power_label).clicked() {
                    state.tracker_toggle = true;
                }
                if matches!(status, TrackerStatus::Failed(_))
                    && ui.small_button("Retry").clicked()
                {
                    state.tracker_retry = true;
                }
            });
        });
}

/// Bottom control bar: tension meter, draw tools, shapes and colors.
pub fn draw_controls(ctx: &egui::Context, state: &mut UiState) {
    egui::Window::new("controls")
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
        .title_bar(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("RELAXED").small().weak());
                ui.add(
                    egui::ProgressBar::new(state.tension)
                        .desired_width(220.0)
                        .desired_height(8.0),
                );
                ui.label(egui::RichText::new("TENSE").small().weak());
            });

            ui.separator();

            ui.horizontal(|ui| {
                let draw_label = if state.draw_mode { "Drawing" } else { "Draw" };
                if ui.selectable_label(state.draw_mode, draw_label).clicked() {
                    state.draw_mode = !state.draw_mode;
                }
                // Clearing only makes sense while the ink layer is visible.
                if ui
                    .add_enabled(state.draw_mode, egui::Button::new("Clear"))
                    .clicked()
                {
                    state.clear_requested = true;
                }

                ui.separator();

                for kind in ShapeKind::ALL {
                    if ui.selectable_label(state.shape == kind, kind.label()).clicked() {
                        state.shape = kind;
                    }
                }

                ui.separator();

                for color in PALETTE {
                    color_swatch(ui, state, color);
                }
            });
        });
}

fn color_swatch(ui: &mut egui::Ui, state: &mut UiState, color: [f32; 3]) {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(22.0, 22.0), egui::Sense::click());
    let fill = egui::Color32::from_rgb(
        (color[0] * 255.0) as u8,
        (color[1] * 255.0) as u8,
        (color[2] * 255.0) as u8,
    );
    ui.painter().circle_filled(rect.center(), 9.0, fill);
    if state.color == color {
        ui.painter().circle_stroke(
            rect.center(),
            10.5,
            egui::Stroke::new(2.0, egui::Color32::WHITE),
        );
    }
    if response.clicked() {
        state.color = color;
    }
}

fn paint_skeleton(painter: &egui::Painter, rect: egui::Rect, lm: &LandmarkSet, pinching: bool) {
    // Mirror horizontally so the preview behaves like a mirror.
    let to_screen = |p: glam::Vec2| {
        egui::pos2(
            rect.min.x + (1.0 - p.x).clamp(0.0, 1.0) * rect.width(),
            rect.min.y + p.y.clamp(0.0, 1.0) * rect.height(),
        )
    };

    let bone = egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(0, 255, 0, 76));
    for &(a, b) in SKELETON.iter() {
        painter.line_segment([to_screen(lm.point(a)), to_screen(lm.point(b))], bone);
    }

    // Index fingertip highlight, the "writing point". Cyan while pinching.
    let tip = to_screen(lm.point(INDEX_TIP));
    let fill = if pinching {
        egui::Color32::from_rgb(0, 255, 255)
    } else {
        egui::Color32::WHITE
    };
    painter.circle_filled(tip, 4.0, fill);
    if pinching {
        painter.circle_stroke(tip, 6.0, egui::Stroke::new(2.0, egui::Color32::from_rgb(0, 255, 255)));
    }
}
