// src/ui.rs - Drawing helpers for the gesture canvas
use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use gesture_control::config::BoundingBox;
use gesture_control::landmarks::{HandObservation, HAND_CONNECTIONS};
use gesture_control::output::{Overlay, Rotation};
use gesture_control::Gesture;
use nalgebra::{Point3, Rotation3};
use std::collections::HashMap;
use std::path::Path;

/// Canvas size the overlay bounding boxes are expressed in.
pub const CANVAS_WIDTH: f32 = 640.0;
pub const CANVAS_HEIGHT: f32 = 480.0;

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color32,
    pub secondary: Color32,
    pub background: Color32,
    pub surface: Color32,
    pub error: Color32,
    pub warning: Color32,
    pub success: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color32::from_rgb(70, 130, 240),
            secondary: Color32::from_rgb(255, 152, 0),
            background: Color32::from_rgb(20, 20, 25),
            surface: Color32::from_rgb(30, 30, 35),
            error: Color32::from_rgb(244, 67, 54),
            warning: Color32::from_rgb(255, 152, 0),
            success: Color32::from_rgb(76, 175, 80),
            text_primary: Color32::WHITE,
            text_secondary: Color32::from_rgb(200, 200, 200),
        }
    }
}

impl Theme {
    pub fn gesture_color(&self, gesture: Gesture) -> Color32 {
        match gesture {
            Gesture::OpenPalm => self.primary,
            Gesture::Pinch => self.success,
            Gesture::Fist => self.error,
            Gesture::ThumbsUp => self.secondary,
            Gesture::PeaceSign => Color32::from_rgb(171, 71, 188),
            Gesture::None => Color32::GRAY,
        }
    }
}

pub struct UIComponents {
    pub theme: Theme,
    overlay_textures: HashMap<Overlay, egui::TextureHandle>,
}

impl UIComponents {
    pub fn new(ctx: &egui::Context) -> Self {
        let mut components = Self {
            theme: Theme::default(),
            overlay_textures: HashMap::new(),
        };

        for (overlay, path) in [
            (Overlay::Jordano, "assets/jordano.png"),
            (Overlay::Piolin, "assets/piolin.png"),
        ] {
            match load_texture(ctx, path) {
                Ok(texture) => {
                    components.overlay_textures.insert(overlay, texture);
                }
                Err(e) => {
                    tracing::warn!("Overlay image {} not loaded ({}), using placeholder", path, e);
                }
            }
        }

        components
    }

    /// Paints one frame: background, hand skeleton, overlay, 3D object, status.
    pub fn draw_canvas(&self, ui: &mut egui::Ui, scene: &CanvasScene<'_>) {
        let width = ui.available_width();
        let size = Vec2::new(width, width * CANVAS_HEIGHT / CANVAS_WIDTH);
        let (rect, _response) = ui.allocate_exact_size(size, egui::Sense::hover());
        let painter = ui.painter_at(rect);

        painter.rect_filled(rect, egui::Rounding::same(4.0), Color32::from_rgb(50, 50, 55));

        match scene.hand {
            Some(hand) => self.draw_hand(&painter, rect, hand),
            None => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "No hand in view",
                    egui::FontId::proportional(16.0),
                    Color32::from_rgb(150, 150, 155),
                );
            }
        }

        if let Some((overlay, bbox)) = scene.overlay {
            self.draw_overlay(&painter, rect, overlay, bbox);
        }

        if let Some(rotation) = scene.object_rotation {
            draw_cube(&painter, rect, rotation, self.theme.success);
        }

        // Status line sits bottom-left like the camera window caption
        painter.text(
            Pos2::new(rect.left() + 10.0, rect.bottom() - 20.0),
            egui::Align2::LEFT_CENTER,
            scene.status,
            egui::FontId::proportional(22.0),
            self.theme.text_primary,
        );
    }

    fn draw_hand(&self, painter: &egui::Painter, rect: Rect, hand: &HandObservation) {
        let to_screen = |index: usize| -> Option<Pos2> {
            hand.get(index).map(|lm| {
                Pos2::new(
                    rect.left() + lm.x as f32 * rect.width(),
                    rect.top() + lm.y as f32 * rect.height(),
                )
            })
        };

        for (from, to) in HAND_CONNECTIONS {
            if let (Some(a), Some(b)) = (to_screen(from), to_screen(to)) {
                painter.line_segment([a, b], Stroke::new(4.0, Color32::from_rgb(0, 255, 0)));
            }
        }

        for index in 0..hand.landmarks.len() {
            if let Some(pos) = to_screen(index) {
                painter.circle_filled(pos, 4.0, Color32::from_rgb(255, 0, 0));
            }
        }
    }

    fn draw_overlay(&self, painter: &egui::Painter, rect: Rect, overlay: Overlay, bbox: BoundingBox) {
        let scale = rect.width() / CANVAS_WIDTH;
        let target = Rect::from_min_size(
            Pos2::new(
                rect.left() + bbox.x as f32 * scale,
                rect.top() + bbox.y as f32 * scale,
            ),
            Vec2::new(bbox.width as f32 * scale, bbox.height as f32 * scale),
        );

        match self.overlay_textures.get(&overlay) {
            Some(texture) => {
                painter.image(
                    texture.id(),
                    target,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None => {
                painter.rect_filled(target, egui::Rounding::same(8.0), self.theme.surface);
                painter.rect_stroke(target, egui::Rounding::same(8.0), Stroke::new(2.0, self.theme.secondary));
                painter.text(
                    target.center(),
                    egui::Align2::CENTER_CENTER,
                    format!("{:?}", overlay),
                    egui::FontId::proportional(28.0),
                    self.theme.secondary,
                );
            }
        }
    }

    pub fn draw_audio_indicator(&self, ui: &mut egui::Ui, playing: bool, position_secs: f32) {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(16.0), egui::Sense::hover());
            let color = if playing { self.theme.success } else { Color32::GRAY };
            ui.painter().circle_filled(rect.center(), 6.0, color);

            let minutes = position_secs as u32 / 60;
            let seconds = position_secs as u32 % 60;
            if playing {
                ui.label(format!("Music playing {:02}:{:02}", minutes, seconds));
            } else {
                ui.colored_label(Color32::GRAY, "Music stopped");
            }
        });
    }

    pub fn draw_extension_bar(&self, ui: &mut egui::Ui, flags: [bool; 5]) {
        const NAMES: [&str; 5] = ["Thumb", "Index", "Middle", "Ring", "Pinky"];
        ui.horizontal(|ui| {
            for (name, extended) in NAMES.iter().zip(flags) {
                let color = if extended { self.theme.success } else { self.theme.surface };
                let (rect, _) = ui.allocate_exact_size(Vec2::new(48.0, 24.0), egui::Sense::hover());
                let painter = ui.painter();
                painter.rect_filled(rect, egui::Rounding::same(4.0), color);
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    *name,
                    egui::FontId::proportional(11.0),
                    self.theme.text_primary,
                );
            }
        });
    }
}

/// What to paint for the latest processed frame.
pub struct CanvasScene<'a> {
    pub hand: Option<&'a HandObservation>,
    pub overlay: Option<(Overlay, BoundingBox)>,
    /// `Some` while the 3D object is visible
    pub object_rotation: Option<Rotation>,
    pub status: &'a str,
}

const CUBE_EDGES: [(usize, usize); 12] = [
    (0, 1), (1, 3), (3, 2), (2, 0),
    (4, 5), (5, 7), (7, 6), (6, 4),
    (0, 4), (1, 5), (2, 6), (3, 7),
];

/// Wireframe cube rotated about x then y, orthographic projection.
fn draw_cube(painter: &egui::Painter, rect: Rect, rotation: Rotation, color: Color32) {
    let transform = Rotation3::from_euler_angles(rotation.x, rotation.y, 0.0);
    let half = f64::from(rect.height()) * 0.2;
    let center = rect.center();

    let corners: Vec<Pos2> = (0..8)
        .map(|i| {
            let corner = Point3::new(
                if i & 1 == 0 { -half } else { half },
                if i & 2 == 0 { -half } else { half },
                if i & 4 == 0 { -half } else { half },
            );
            let p = transform * corner;
            Pos2::new(center.x + p.x as f32, center.y - p.y as f32)
        })
        .collect();

    for (a, b) in CUBE_EDGES {
        painter.line_segment([corners[a], corners[b]], Stroke::new(3.0, color));
    }
}

fn load_texture(ctx: &egui::Context, path: impl AsRef<Path>) -> Result<egui::TextureHandle, image::ImageError> {
    let path = path.as_ref();
    let image = image::open(path)?;
    let size = [image.width() as usize, image.height() as usize];
    let rgba = image.to_rgba8();
    let pixels = rgba.as_flat_samples();

    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
    Ok(ctx.load_texture(path.display().to_string(), color_image, Default::default()))
}
