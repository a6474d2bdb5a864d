//! Text and image editor dialogs. Both edit the studio's draft options
//! in place; Apply routes through the studio so create drafts spawn a
//! placement preview and update drafts recomposite the target item.

use egui::Context;
use shared::{
    ContentOptions, EditorMode, FontStyle, ImageOptions, TextOptions, BRIGHTNESS_RANGE,
    CONTRAST_RANGE, HUE_RANGE, SATURATION_RANGE,
};

use decal_studio_lib::assets;
use decal_studio_lib::studio::Studio;

pub fn show_editors(ctx: &Context, studio: &mut Studio) {
    if !studio.editor.is_open() {
        return;
    }

    let families: Vec<String> = studio
        .catalog()
        .fonts
        .families()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mode = studio.editor.mode();

    let mut submit = false;
    let mut cancel = false;

    let title = match (studio.editor.kind(), mode) {
        (Some(shared::ItemKind::Text), EditorMode::Create) => "New text",
        (Some(shared::ItemKind::Text), EditorMode::Update) => "Edit text",
        (Some(shared::ItemKind::Image), EditorMode::Create) => "New image",
        (Some(shared::ItemKind::Image), EditorMode::Update) => "Edit image",
        (None, _) => return,
    };

    let can_submit = studio.editor.can_submit();

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            match studio.editor.draft_mut() {
                Some(ContentOptions::Text(options)) => text_fields(ui, options, &families),
                Some(ContentOptions::Image(options)) => image_fields(ui, options),
                None => {}
            }

            ui.separator();
            ui.horizontal(|ui| {
                let label = match mode {
                    EditorMode::Create => "Place",
                    EditorMode::Update => "Apply",
                };
                if ui
                    .add_enabled(can_submit, egui::Button::new(label))
                    .clicked()
                {
                    submit = true;
                }
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
            });
        });

    if submit {
        if let Err(e) = studio.submit_editor() {
            tracing::error!("editor submit failed: {e}");
        }
    } else if cancel {
        studio.cancel_editor();
    }
}

fn text_fields(ui: &mut egui::Ui, options: &mut TextOptions, families: &[String]) {
    egui::Grid::new("text_editor_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Text");
            ui.text_edit_singleline(&mut options.text);
            ui.end_row();

            ui.label("Font");
            egui::ComboBox::from_id_salt("font_family")
                .selected_text(options.font_family.clone())
                .show_ui(ui, |ui| {
                    for family in families {
                        ui.selectable_value(&mut options.font_family, family.clone(), family);
                    }
                });
            ui.end_row();

            ui.label("Size");
            ui.add(egui::Slider::new(&mut options.font_size, 8.0..=200.0).suffix(" px"));
            ui.end_row();

            ui.label("Weight");
            ui.add(egui::Slider::new(&mut options.font_weight, 100..=900).step_by(100.0));
            ui.end_row();

            ui.label("Style");
            ui.horizontal(|ui| {
                ui.selectable_value(&mut options.font_style, FontStyle::Normal, "Normal");
                ui.selectable_value(&mut options.font_style, FontStyle::Italic, "Italic");
            });
            ui.end_row();

            ui.label("Rotation");
            ui.add(egui::Slider::new(&mut options.rotation, -180.0..=180.0).suffix("°"));
            ui.end_row();

            ui.label("Text color");
            ui.color_edit_button_srgba_unmultiplied(&mut options.text_color);
            ui.end_row();

            ui.label("Background");
            ui.color_edit_button_srgba_unmultiplied(&mut options.background_color);
            ui.end_row();

            ui.label("Border");
            ui.horizontal(|ui| {
                ui.add(
                    egui::DragValue::new(&mut options.border_width)
                        .range(0.0..=64.0)
                        .suffix(" px"),
                );
                ui.color_edit_button_srgba_unmultiplied(&mut options.border_color);
            });
            ui.end_row();

            ui.label("Padding");
            ui.horizontal(|ui| {
                ui.add(egui::DragValue::new(&mut options.padding_x).range(0.0..=256.0));
                ui.add(egui::DragValue::new(&mut options.padding_y).range(0.0..=256.0));
            });
            ui.end_row();

            ui.label("Flip");
            ui.horizontal(|ui| {
                ui.checkbox(&mut options.flip.x, "X");
                ui.checkbox(&mut options.flip.y, "Y");
            });
            ui.end_row();
        });
}

fn image_fields(ui: &mut egui::Ui, options: &mut ImageOptions) {
    ui.horizontal(|ui| {
        if ui.button("Choose image…").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Images", &["png", "jpg", "jpeg"])
                .pick_file()
            {
                match std::fs::read(&path).map_err(|e| e.to_string()).and_then(|bytes| {
                    assets::decode_image(&bytes).map_err(|e| e.to_string())
                }) {
                    Ok(data) => options.source = data,
                    Err(e) => tracing::error!("image load failed: {e}"),
                }
            }
        }
        ui.label(format!(
            "{}×{} px",
            options.source.width, options.source.height
        ));
    });

    ui.separator();

    egui::Grid::new("image_editor_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Invert");
            ui.checkbox(&mut options.filters.color_invert, "");
            ui.end_row();

            ui.label("Grayscale");
            ui.checkbox(&mut options.filters.grayscale, "");
            ui.end_row();

            ui.label("Hue");
            ui.add(egui::Slider::new(&mut options.filters.hue, HUE_RANGE).suffix("°"));
            ui.end_row();

            ui.label("Saturation");
            ui.add(egui::Slider::new(
                &mut options.filters.saturation,
                SATURATION_RANGE,
            ));
            ui.end_row();

            ui.label("Brightness");
            ui.add(egui::Slider::new(
                &mut options.filters.brightness,
                BRIGHTNESS_RANGE,
            ));
            ui.end_row();

            ui.label("Contrast");
            ui.add(egui::Slider::new(
                &mut options.filters.contrast,
                CONTRAST_RANGE,
            ));
            ui.end_row();

            ui.label("Flip");
            ui.horizontal(|ui| {
                ui.checkbox(&mut options.transforms.flip.x, "X");
                ui.checkbox(&mut options.transforms.flip.y, "Y");
            });
            ui.end_row();
        });
}
