//! Application shell: toolbar, item list, editor dialogs, export
//! dialog, and the 3D viewport.

mod editors;

use std::path::PathBuf;

use shared::FontStyle;
use tracing::{info, warn};

use decal_studio_lib::assets::{AssetCatalog, FontSpec, LoadPlan};
use decal_studio_lib::export;
use decal_studio_lib::state::AppMode;
use decal_studio_lib::studio::Studio;

use crate::viewport::ViewportPanel;

/// State of the export dialog
struct ExportDialog {
    filename: String,
    error: Option<String>,
}

pub struct StudioApp {
    studio: Studio,
    viewport: ViewportPanel,
    export: ExportDialog,
    load_errors: Vec<String>,
}

impl StudioApp {
    pub fn new(cc: &eframe::CreationContext<'_>, model_path: Option<PathBuf>) -> Self {
        let mut viewport = ViewportPanel::new();
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl);
        }

        let mut studio = Studio::new();
        let plan = build_load_plan(model_path);
        let errors = studio.load_assets(&plan, |p| {
            info!("loading {}/{}: {}", p.current, p.total, p.label);
        });
        let load_errors: Vec<String> = errors.iter().map(|e| e.to_string()).collect();

        if !studio.fonts_ready() {
            install_fallback_fonts(&mut studio);
        }

        Self {
            studio,
            viewport,
            export: ExportDialog {
                filename: "design.glb".to_string(),
                error: None,
            },
            load_errors,
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let idle = self.studio.mode() == AppMode::Select;
            let ready = self.studio.model_ready();

            if ui
                .add_enabled(idle && ready, egui::Button::new("Add text"))
                .clicked()
            {
                self.studio.request_new_text();
            }
            if ui
                .add_enabled(idle && ready, egui::Button::new("Add image"))
                .clicked()
            {
                self.studio.request_new_image();
            }

            ui.separator();

            if ui
                .add_enabled(idle && ready, egui::Button::new("Export…"))
                .clicked()
            {
                self.export.error = None;
                self.studio.begin_export();
            }

            ui.separator();
            ui.label("Garment color:");
            let mut rgb = [
                self.studio.base_color[0],
                self.studio.base_color[1],
                self.studio.base_color[2],
            ];
            if ui.color_edit_button_rgb(&mut rgb).changed() {
                self.studio.base_color = [rgb[0], rgb[1], rgb[2], 1.0];
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if !ready {
                    ui.colored_label(egui::Color32::YELLOW, "No garment model loaded");
                }
                for error in &self.load_errors {
                    ui.colored_label(egui::Color32::LIGHT_RED, error);
                }
            });
        });
    }

    fn item_list(&mut self, ui: &mut egui::Ui) {
        ui.heading("Items");
        ui.separator();

        let mut to_delete: Option<String> = None;
        for item in self.studio.items.iter() {
            ui.horizontal(|ui| {
                let label = match item.kind() {
                    shared::ItemKind::Text => {
                        let text = item
                            .options
                            .as_text()
                            .map(|t| t.text.as_str())
                            .unwrap_or("");
                        format!("T  {text}")
                    }
                    shared::ItemKind::Image => format!(
                        "I  {}×{}",
                        item.canvas.width(),
                        item.canvas.height()
                    ),
                };
                let highlighted = self.studio.hovered_item() == Some(&item.id);
                let widget = egui::Label::new(if highlighted {
                    egui::RichText::new(label).strong()
                } else {
                    egui::RichText::new(label)
                });
                ui.add(widget);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✖").clicked() {
                        to_delete = Some(item.id.clone());
                    }
                });
            });
        }
        if let Some(id) = to_delete {
            self.studio.delete_item(&id);
        }

        if self.studio.items.is_empty() {
            ui.weak("No items yet");
        }
    }

    fn export_dialog(&mut self, ctx: &egui::Context) {
        if self.studio.mode() != AppMode::Export {
            return;
        }

        let mut close = false;
        egui::Window::new("Export design")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("File name");
                    ui.text_edit_singleline(&mut self.export.filename);
                });

                let valid = export::is_valid_filename(&self.export.filename);
                if !valid {
                    ui.colored_label(
                        egui::Color32::LIGHT_RED,
                        "Letters, digits, '-', '.' and '_' only",
                    );
                }
                if let Some(ref error) = self.export.error {
                    ui.colored_label(egui::Color32::LIGHT_RED, error);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.add_enabled(valid, egui::Button::new("Save")).clicked() {
                        match self.save_glb() {
                            Ok(()) => close = true,
                            Err(e) => self.export.error = Some(e),
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if close {
            self.studio.finish_export();
        }
    }

    fn save_glb(&self) -> Result<(), String> {
        let mut filename = self.export.filename.clone();
        if !filename.ends_with(".glb") {
            filename.push_str(".glb");
        }

        let glb = self
            .studio
            .export_glb(&filename)
            .map_err(|e| e.to_string())?;

        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&filename)
            .add_filter("Binary glTF", &["glb"])
            .save_file()
        else {
            return Ok(());
        };
        export::write_glb(&path, &glb).map_err(|e| e.to_string())?;
        info!(path = %path.display(), "design saved");
        Ok(())
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.toolbar(ui);
        });

        egui::SidePanel::left("items")
            .resizable(false)
            .default_width(180.0)
            .show(ctx, |ui| {
                self.item_list(ui);
            });

        editors::show_editors(ctx, &mut self.studio);
        self.export_dialog(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.studio);
            });
    }
}

/// Garment model from the CLI (or ./assets/garment.obj), fonts from
/// ./assets/fonts, one spec per file. "-Italic" and "-Bold" suffixes in
/// the file stem select the variant.
fn build_load_plan(model_path: Option<PathBuf>) -> LoadPlan {
    let model = model_path.or_else(|| {
        let default = PathBuf::from("assets/garment.obj");
        default.exists().then_some(default)
    });

    let mut fonts = Vec::new();
    if let Ok(entries) = std::fs::read_dir("assets/fonts") {
        for entry in entries.flatten() {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !matches!(ext, "ttf" | "otf") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let mut family = stem.to_string();
            let mut weight = 400;
            let mut style = FontStyle::Normal;
            if let Some(base) = family.strip_suffix("-Italic") {
                family = base.to_string();
                style = FontStyle::Italic;
            }
            if let Some(base) = family.strip_suffix("-Bold") {
                family = base.to_string();
                weight = 700;
            }

            fonts.push(FontSpec {
                family,
                weight,
                style,
                path,
            });
        }
    }
    // Deterministic load order for the progress readout
    fonts.sort_by(|a, b| a.path.cmp(&b.path));

    LoadPlan { model, fonts }
}

/// No font files on disk: fall back to the fonts egui embeds so text
/// items still work out of the box.
fn install_fallback_fonts(studio: &mut Studio) {
    let mut catalog = AssetCatalog::default();
    // Keep whatever model did load
    if let Some(mesh) = studio.garment().cloned() {
        catalog.model = Some(mesh);
    }

    let defs = egui::FontDefinitions::default();
    let mut first = true;
    for (name, data) in &defs.font_data {
        let bytes = data.font.to_vec();
        if catalog
            .fonts
            .register_bytes(name, 400, FontStyle::Normal, bytes.clone())
            .is_err()
        {
            warn!(%name, "embedded font failed to parse");
            continue;
        }
        // Default text options ask for this family; alias the first
        // embedded font so they resolve without configuration
        if first {
            let _ = catalog.fonts.register_bytes(
                shared::DEFAULT_FONT_FAMILY,
                400,
                FontStyle::Normal,
                bytes,
            );
            first = false;
        }
    }

    studio.set_catalog(catalog);
}
