//! Integration tests for GLB export of a designed garment: scene
//! structure, embedded decal textures, and the export dialog's mode and
//! filename rules, driven through the studio façade.

use glam::Vec2;
use shared::{ContentOptions, FontStyle, ImageData};

use decal_studio_lib::assets::AssetCatalog;
use decal_studio_lib::export::ExportError;
use decal_studio_lib::fixtures::{subdivided_plane, test_font};
use decal_studio_lib::state::AppMode;
use decal_studio_lib::studio::{Studio, StudioError};

const SURFACE: Vec2 = Vec2::new(800.0, 600.0);
const CENTER: Vec2 = Vec2::new(400.0, 300.0);

fn studio() -> Studio {
    let mut catalog = AssetCatalog::default();
    catalog.model = Some(subdivided_plane(2.0, 8));
    catalog
        .fonts
        .register("Roboto", 400, FontStyle::Normal, test_font());

    let mut studio = Studio::new();
    studio.set_catalog(catalog);
    studio.set_surface_size(SURFACE);
    studio
}

/// Place and commit one image item at the viewport center
fn place_image(studio: &mut Studio, width: u32, height: u32) {
    studio.request_new_image();
    if let Some(ContentOptions::Image(options)) = studio.editor.draft_mut() {
        options.source = ImageData::solid(width, height, [200, 40, 40, 255]);
    } else {
        panic!("expected an image draft");
    }
    studio.submit_editor().unwrap();
    studio.pointer_move(CENTER);
    studio.pointer_down();
    assert!(studio.pointer_up(CENTER));
}

fn parse_json_chunk(glb: &[u8]) -> serde_json::Value {
    assert_eq!(&glb[0..4], b"glTF");
    assert_eq!(u32::from_le_bytes([glb[4], glb[5], glb[6], glb[7]]), 2);
    let json_len = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
    serde_json::from_slice(&glb[20..20 + json_len]).unwrap()
}

#[test]
fn test_export_garment_with_committed_decal() {
    let mut s = studio();
    place_image(&mut s, 64, 64);

    let glb = s.export_glb("design.glb").unwrap();
    let json = parse_json_chunk(&glb);

    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["name"], "garment");
    assert!(nodes[1]["name"].as_str().unwrap().starts_with("decal-"));

    // The decal carries an embedded texture with alpha blending; the
    // garment stays untextured
    assert_eq!(json["images"].as_array().unwrap().len(), 1);
    assert_eq!(json["materials"][1]["alphaMode"], "BLEND");
    assert!(json["materials"][0].get("alphaMode").is_none());

    // Whole-file length field matches the byte stream
    let total = u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize;
    assert_eq!(total, glb.len());
}

#[test]
fn test_export_skips_uncommitted_preview() {
    let mut s = studio();
    place_image(&mut s, 64, 64);

    // Second item left mid-placement
    s.request_new_image();
    if let Some(ContentOptions::Image(options)) = s.editor.draft_mut() {
        options.source = ImageData::solid(32, 32, [0, 0, 0, 255]);
    }
    s.submit_editor().unwrap();
    assert_eq!(s.mode(), AppMode::Place);
    assert_eq!(s.items.len(), 2);

    let glb = s.export_glb("design.glb").unwrap();
    let json = parse_json_chunk(&glb);
    assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
}

#[test]
fn test_export_bare_garment() {
    let s = studio();
    let glb = s.export_glb("plain.glb").unwrap();
    let json = parse_json_chunk(&glb);
    assert_eq!(json["nodes"].as_array().unwrap().len(), 1);
    assert!(json.get("images").is_none());
}

#[test]
fn test_export_rejects_bad_filename() {
    let s = studio();
    let err = s.export_glb("my design.glb").unwrap_err();
    assert!(matches!(
        err,
        StudioError::Export(ExportError::InvalidFilename(_))
    ));
}

#[test]
fn test_export_without_model_fails() {
    let s = Studio::new();
    assert!(matches!(
        s.export_glb("design.glb"),
        Err(StudioError::ModelNotLoaded)
    ));
}

#[test]
fn test_export_mode_round_trip() {
    let mut s = studio();
    s.begin_export();
    assert_eq!(s.mode(), AppMode::Export);

    // Viewport clicks are ignored while the dialog is up
    s.pointer_move(CENTER);
    s.pointer_down();
    s.pointer_up(CENTER);
    assert_eq!(s.mode(), AppMode::Export);

    s.finish_export();
    assert_eq!(s.mode(), AppMode::Select);
}

#[test]
fn test_garment_base_color_is_exported() {
    let mut s = studio();
    s.base_color = [0.2, 0.4, 0.9, 1.0];
    let glb = s.export_glb("colored.glb").unwrap();
    let json = parse_json_chunk(&glb);

    let factor = &json["materials"][0]["pbrMetallicRoughness"]["baseColorFactor"];
    let rgba: Vec<f64> = factor
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert!((rgba[0] - 0.2).abs() < 1e-6);
    assert!((rgba[1] - 0.4).abs() < 1e-6);
    assert!((rgba[2] - 0.9).abs() < 1e-6);
}
