//! 3D viewport panel with OpenGL rendering

mod gl_renderer;
pub use decal_studio_lib::viewport::{camera, mesh, picking};

use std::sync::{Arc, Mutex};

use egui::Ui;
use glam::Vec2;

use decal_studio_lib::state::AppMode;
use decal_studio_lib::studio::{CursorState, Studio};
use gl_renderer::{DecalDraw, GlRenderer, RenderParams};

const BG_COLOR: [u8; 3] = [28, 30, 36];

/// 3D viewport panel with OpenGL rendering
pub struct ViewportPanel {
    gl_renderer: Option<Arc<Mutex<GlRenderer>>>,
    /// Bumped whenever a new garment mesh is installed
    garment_version: u64,
    garment_loaded: bool,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            gl_renderer: None,
            garment_version: 0,
            garment_loaded: false,
        }
    }

    /// Initialize GL renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context) {
        let renderer = GlRenderer::new(gl);
        self.gl_renderer = Some(Arc::new(Mutex::new(renderer)));
    }

    pub fn show(&mut self, ui: &mut Ui, studio: &mut Studio) {
        let (rect, response) = ui.allocate_exact_size(
            ui.available_size(),
            egui::Sense::click_and_drag(),
        );

        studio.set_surface_size(Vec2::new(rect.width(), rect.height()));

        // ── Pointer events ──────────────────────────────────
        // Moves feed the raycaster; presses and releases drive the
        // click-vs-drag logic inside the studio.
        if let Some(pos) = response.hover_pos() {
            let local = pos - rect.min;
            studio.pointer_move(Vec2::new(local.x, local.y));
        }

        let (pressed, released) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
            )
        });
        if pressed && response.hovered() {
            studio.pointer_down();
        }
        if released {
            if let Some(pos) = response.hover_pos() {
                let local = pos - rect.min;
                studio.pointer_up(Vec2::new(local.x, local.y));
            }
        }

        // ── Camera controls ─────────────────────────────────
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            studio.camera.rotate(delta.x * 0.5, delta.y * 0.5);
        }

        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll.abs() > 0.1 {
            studio.camera.zoom(scroll * 0.01);
        }

        // ESC abandons a placement in progress
        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
            studio.cancel_placement();
        }

        if response.hovered() && studio.cursor() == CursorState::Pointer {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        if !ui.is_rect_visible(rect) {
            return;
        }

        self.render_gl(ui, rect, studio);
        self.draw_overlays(ui, rect, studio);
    }

    fn render_gl(&mut self, ui: &mut Ui, rect: egui::Rect, studio: &Studio) {
        let Some(gl_renderer) = &self.gl_renderer else {
            return;
        };

        if studio.model_ready() != self.garment_loaded {
            self.garment_loaded = studio.model_ready();
            self.garment_version += 1;
        }

        let renderer_clone = gl_renderer.clone();
        let camera = camera::ArcBallCamera {
            yaw: studio.camera.yaw,
            pitch: studio.camera.pitch,
            distance: studio.camera.distance,
            target: studio.camera.target,
            fov: studio.camera.fov,
        };

        let garment = studio.garment().cloned();
        let garment_version = self.garment_version;
        let base_color = studio.base_color;

        let draws: Vec<DecalDraw> = studio
            .items
            .iter()
            .map(|item| DecalDraw {
                id: item.id.clone(),
                revision: item.revision,
                mesh: item.geometry.clone(),
                canvas: item.canvas.clone(),
                opacity: item.opacity(),
            })
            .collect();

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();

                let clip = info.clip_rect_in_pixels();
                let viewport = [
                    clip.left_px as f32,
                    clip.from_bottom_px as f32,
                    clip.width_px as f32,
                    clip.height_px as f32,
                ];

                if let Ok(mut r) = renderer_clone.lock() {
                    r.sync_garment(gl, garment.as_ref(), garment_version);
                    r.sync_decals(gl, &draws);
                    let render_params = RenderParams {
                        viewport,
                        bg_color: BG_COLOR,
                        base_color,
                    };
                    r.paint(gl, &camera, &render_params, &draws);
                }
            })),
        };

        ui.painter().add(callback);
    }

    fn draw_overlays(&self, ui: &Ui, rect: egui::Rect, studio: &Studio) {
        let painter = ui.painter_at(rect);

        let hint = match studio.mode() {
            AppMode::Place => Some("Click the garment to place the item, Esc to cancel"),
            AppMode::Select if studio.items.is_empty() && studio.model_ready() => {
                Some("Add text or an image, then click a placed item to edit it")
            }
            _ => None,
        };
        if let Some(hint) = hint {
            painter.text(
                egui::pos2(rect.center().x, rect.bottom() - 20.0),
                egui::Align2::CENTER_BOTTOM,
                hint,
                egui::FontId::proportional(12.0),
                egui::Color32::from_rgb(150, 150, 160),
            );
        }
    }
}
