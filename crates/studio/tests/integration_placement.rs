//! Integration tests for the full item lifecycle: create -> place ->
//! commit -> edit -> delete, driven through the studio façade exactly
//! the way the app shell drives it.

use glam::{Vec2, Vec3};
use shared::{ContentOptions, FontStyle, ImageData, DECAL_DEPTH};

use decal_studio_lib::assets::AssetCatalog;
use decal_studio_lib::fixtures::{subdivided_plane, test_font};
use decal_studio_lib::state::AppMode;
use decal_studio_lib::studio::{CursorState, Studio};
use decal_studio_lib::validation::MeshValidator;

const SURFACE: Vec2 = Vec2::new(800.0, 600.0);
const CENTER: Vec2 = Vec2::new(400.0, 300.0);

/// Studio with a flat garment in front of the camera and one font
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

fn set_draft_text(studio: &mut Studio, text: &str) {
    if let Some(ContentOptions::Text(options)) = studio.editor.draft_mut() {
        options.text = text.to_string();
    } else {
        panic!("expected a text draft");
    }
}

/// Simulate a clean click (down, no move, up)
fn click(studio: &mut Studio, at: Vec2) -> bool {
    studio.pointer_down();
    studio.pointer_up(at)
}

#[test]
fn test_text_create_place_commit() {
    let mut s = studio();
    assert_eq!(s.mode(), AppMode::Select);

    s.request_new_text();
    assert_eq!(s.mode(), AppMode::TextCreate);
    set_draft_text(&mut s, "Hello");
    s.submit_editor().unwrap();
    assert_eq!(s.mode(), AppMode::Place);
    assert_eq!(s.items.len(), 1);

    // Preview follows the pointer and stays translucent
    s.pointer_move(CENTER);
    let item = s.items.iter().next().unwrap();
    assert!(!item.is_committed());
    assert_eq!(item.opacity(), shared::PREVIEW_OPACITY);
    assert!(item.anchor.length() < 1e-3);
    assert!(!item.geometry.is_empty());

    // Clean click commits
    assert!(click(&mut s, CENTER));
    assert_eq!(s.mode(), AppMode::Select);
    let item = s.items.iter().next().unwrap();
    assert!(item.is_committed());
    assert_eq!(item.opacity(), shared::COMMITTED_OPACITY);
    assert!(MeshValidator::new(&item.geometry).validate_all().is_empty());
}

#[test]
fn test_second_commit_changes_nothing() {
    let mut s = studio();
    s.request_new_text();
    set_draft_text(&mut s, "Once");
    s.submit_editor().unwrap();
    s.pointer_move(CENTER);
    assert!(click(&mut s, CENTER));

    let (id, revision, geometry) = {
        let item = s.items.iter().next().unwrap();
        (item.id.clone(), item.revision, item.geometry.clone())
    };

    // Committing again is a no-op
    s.items.get_mut(&id).unwrap().commit();
    let item = s.items.get(&id).unwrap();
    assert!(item.is_committed());
    assert_eq!(item.opacity(), shared::COMMITTED_OPACITY);
    assert_eq!(item.revision, revision);
    assert_eq!(item.geometry, geometry);
}

#[test]
fn test_empty_text_keeps_editor_open() {
    let mut s = studio();
    s.request_new_text();
    // Submit with no text: nothing happens, the dialog stays open
    s.submit_editor().unwrap();
    assert_eq!(s.mode(), AppMode::TextCreate);
    assert!(s.editor.is_open());
    assert!(s.items.is_empty());

    set_draft_text(&mut s, "Hi");
    s.submit_editor().unwrap();
    assert_eq!(s.mode(), AppMode::Place);
}

#[test]
fn test_image_canvas_size_maps_to_world_units() {
    let mut s = studio();
    s.request_new_image();
    assert_eq!(s.mode(), AppMode::ImageCreate);
    if let Some(ContentOptions::Image(options)) = s.editor.draft_mut() {
        options.source = ImageData::solid(256, 128, [40, 80, 120, 255]);
    } else {
        panic!("expected an image draft");
    }
    s.submit_editor().unwrap();

    // 256x128 px at 1024 px per world unit
    let item = s.items.iter().next().unwrap();
    assert_eq!(item.size, Vec3::new(0.25, 0.125, DECAL_DEPTH));
}

#[test]
fn test_drag_suppresses_commit() {
    let mut s = studio();
    s.request_new_text();
    set_draft_text(&mut s, "Drag me");
    s.submit_editor().unwrap();
    s.pointer_move(CENTER);

    // Press, drag the camera, release: not a click
    s.pointer_down();
    s.pointer_move(CENTER + Vec2::new(40.0, 0.0));
    assert!(!s.pointer_up(CENTER + Vec2::new(40.0, 0.0)));

    assert_eq!(s.mode(), AppMode::Place);
    assert!(!s.items.iter().next().unwrap().is_committed());

    // A clean click afterwards still commits
    s.pointer_move(CENTER);
    assert!(click(&mut s, CENTER));
    assert_eq!(s.mode(), AppMode::Select);
}

#[test]
fn test_click_off_surface_does_not_commit() {
    // Garment small enough that corner rays miss it
    let mut catalog = AssetCatalog::default();
    catalog.model = Some(subdivided_plane(0.2, 2));
    catalog
        .fonts
        .register("Roboto", 400, FontStyle::Normal, test_font());
    let mut s = Studio::new();
    s.set_catalog(catalog);
    s.set_surface_size(SURFACE);

    s.request_new_text();
    set_draft_text(&mut s, "Edge");
    s.submit_editor().unwrap();
    s.pointer_move(CENTER);

    let corner = Vec2::new(5.0, 5.0);
    s.pointer_move(corner);
    click(&mut s, corner);
    assert_eq!(s.mode(), AppMode::Place);
    assert!(!s.items.iter().next().unwrap().is_committed());
}

#[test]
fn test_release_position_decides_commit() {
    // Small garment so the corner ray misses while the center hits
    let mut catalog = AssetCatalog::default();
    catalog.model = Some(subdivided_plane(0.2, 2));
    catalog
        .fonts
        .register("Roboto", 400, FontStyle::Normal, test_font());
    let mut s = Studio::new();
    s.set_catalog(catalog);
    s.set_surface_size(SURFACE);

    s.request_new_text();
    set_draft_text(&mut s, "Stale");
    s.submit_editor().unwrap();

    // Move over the surface, then release off it with no move in
    // between: the stale on-surface hit must not carry the commit
    s.pointer_move(CENTER);
    s.pointer_down();
    assert!(s.pointer_up(Vec2::new(5.0, 5.0)));
    assert_eq!(s.mode(), AppMode::Place);
    assert!(!s.items.iter().next().unwrap().is_committed());

    // Releasing back over the surface commits
    s.pointer_down();
    assert!(s.pointer_up(CENTER));
    assert_eq!(s.mode(), AppMode::Select);
    assert!(s.items.iter().next().unwrap().is_committed());
}

#[test]
fn test_failed_submit_reopens_editor() {
    // Catalog has fonts, just not the default family the draft asks for
    let mut catalog = AssetCatalog::default();
    catalog.model = Some(subdivided_plane(2.0, 8));
    catalog
        .fonts
        .register("Arvo", 400, FontStyle::Normal, test_font());
    let mut s = Studio::new();
    s.set_catalog(catalog);
    s.set_surface_size(SURFACE);

    s.request_new_text();
    set_draft_text(&mut s, "Hello");
    assert!(s.submit_editor().is_err());

    // The dialog reopens with the draft intact instead of stranding
    // the mode with no editor on screen
    assert_eq!(s.mode(), AppMode::TextCreate);
    assert!(s.editor.is_open());
    assert!(s.items.is_empty());

    // Picking a loaded family recovers
    if let Some(ContentOptions::Text(options)) = s.editor.draft_mut() {
        assert_eq!(options.text, "Hello");
        options.font_family = "Arvo".to_string();
    } else {
        panic!("expected the text draft back");
    }
    s.submit_editor().unwrap();
    assert_eq!(s.mode(), AppMode::Place);
    assert_eq!(s.items.len(), 1);
}

#[test]
fn test_edit_keeps_placement() {
    let mut s = studio();
    s.request_new_text();
    set_draft_text(&mut s, "Before");
    s.submit_editor().unwrap();
    s.pointer_move(CENTER);
    click(&mut s, CENTER);

    let (id, anchor) = {
        let item = s.items.iter().next().unwrap();
        (item.id.clone(), item.anchor)
    };

    // Clicking the committed item opens its editor
    s.pointer_move(CENTER);
    click(&mut s, CENTER);
    assert_eq!(s.mode(), AppMode::TextEdit);
    assert!(s.editor.is_open());

    set_draft_text(&mut s, "After");
    s.submit_editor().unwrap();
    assert_eq!(s.mode(), AppMode::Select);

    // Content changed, placement did not
    let item = s.items.get(&id).unwrap();
    assert_eq!(item.anchor, anchor);
    assert_eq!(
        item.options.as_text().map(|t| t.text.as_str()),
        Some("After")
    );
    assert!(item.is_committed());
}

#[test]
fn test_cancel_placement_discards_preview() {
    let mut s = studio();
    s.request_new_text();
    set_draft_text(&mut s, "Oops");
    s.submit_editor().unwrap();
    assert_eq!(s.items.len(), 1);

    s.cancel_placement();
    assert_eq!(s.mode(), AppMode::Select);
    assert!(s.items.is_empty());
}

#[test]
fn test_cancel_editor_returns_to_select() {
    let mut s = studio();
    s.request_new_text();
    s.cancel_editor();
    assert_eq!(s.mode(), AppMode::Select);
    assert!(!s.editor.is_open());
    assert!(s.items.is_empty());
}

#[test]
fn test_hover_makes_committed_item_translucent() {
    let mut s = studio();
    s.request_new_text();
    set_draft_text(&mut s, "Hover");
    s.submit_editor().unwrap();
    s.pointer_move(CENTER);
    click(&mut s, CENTER);

    s.pointer_move(CENTER);
    let id = s.hovered_item().cloned().expect("item under pointer");
    assert_eq!(
        s.items.get(&id).unwrap().opacity(),
        shared::PREVIEW_OPACITY
    );
    assert_eq!(s.cursor(), CursorState::Pointer);

    // Pointer away: opacity restored
    s.pointer_move(Vec2::new(5.0, 5.0));
    assert!(s.hovered_item().is_none());
    assert_eq!(s.cursor(), CursorState::Auto);
    assert_eq!(
        s.items.get(&id).unwrap().opacity(),
        shared::COMMITTED_OPACITY
    );
}

#[test]
fn test_creation_waits_for_assets() {
    let mut s = Studio::new();
    s.set_surface_size(SURFACE);

    // No garment, no fonts: both create actions are ignored
    s.request_new_text();
    assert_eq!(s.mode(), AppMode::Select);
    assert!(!s.editor.is_open());
    s.request_new_image();
    assert_eq!(s.mode(), AppMode::Select);

    // Garment alone unlocks images but not text
    let mut catalog = AssetCatalog::default();
    catalog.model = Some(subdivided_plane(2.0, 8));
    s.set_catalog(catalog);
    s.request_new_text();
    assert_eq!(s.mode(), AppMode::Select);
    s.request_new_image();
    assert_eq!(s.mode(), AppMode::ImageCreate);
}

#[test]
fn test_delete_item() {
    let mut s = studio();
    s.request_new_text();
    set_draft_text(&mut s, "Bye");
    s.submit_editor().unwrap();
    s.pointer_move(CENTER);
    click(&mut s, CENTER);

    let id = s.items.iter().next().unwrap().id.clone();
    assert!(s.delete_item(&id));
    assert!(s.items.is_empty());
    assert!(!s.delete_item(&id));
}

#[test]
fn test_two_items_select_the_right_one() {
    let mut s = studio();

    // Place one item left of center, one right
    for (text, at) in [("L", Vec2::new(250.0, 300.0)), ("R", Vec2::new(550.0, 300.0))] {
        s.request_new_text();
        set_draft_text(&mut s, text);
        s.submit_editor().unwrap();
        s.pointer_move(at);
        click(&mut s, at);
        assert_eq!(s.mode(), AppMode::Select);
    }
    assert_eq!(s.items.len(), 2);

    // Click the right-hand item: its editor opens with its text
    let right = Vec2::new(550.0, 300.0);
    s.pointer_move(right);
    click(&mut s, right);
    assert_eq!(s.mode(), AppMode::TextEdit);
    let draft = s.editor.draft_mut().unwrap().clone();
    assert_eq!(draft.as_text().map(|t| t.text.as_str()), Some("R"));
}
