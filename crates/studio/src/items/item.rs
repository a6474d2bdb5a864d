//! A placed item: composited canvas plus the decal geometry that pins
//! it to the garment surface.

use glam::{Mat4, Vec3};
use image::RgbaImage;
use shared::{
    ContentOptions, ItemId, ItemKind, COMMITTED_OPACITY, DECAL_DEPTH, PREVIEW_OPACITY,
};
use uuid::Uuid;

use crate::compose::{self, ComposeError};
use crate::assets::fonts::FontSet;
use crate::decal::build_decal;
use crate::viewport::mesh::MeshData;

pub struct Item {
    pub id: ItemId,
    pub options: ContentOptions,
    /// Surface point the decal is centered on
    pub anchor: Vec3,
    /// Surface normal at the anchor
    pub normal: Vec3,
    /// World-unit extents of the decal projection box
    pub size: Vec3,
    /// Composited texture for the decal
    pub canvas: RgbaImage,
    /// Decal patch clipped to the garment, in world space
    pub geometry: MeshData,
    committed: bool,
    hovered: bool,
    /// Bumped whenever canvas or geometry change, so GPU-side caches
    /// keyed on (id, revision) know to re-upload
    pub revision: u64,
}

impl Item {
    /// Compose the canvas and build the decal for a fresh (preview) item
    pub fn new(
        options: ContentOptions,
        anchor: Vec3,
        normal: Vec3,
        surface: &MeshData,
        transform: Mat4,
        fonts: &FontSet,
    ) -> Result<Self, ComposeError> {
        let canvas = compose::render(&options, fonts)?;
        let size = canvas_size(&canvas);
        let geometry = build_decal(surface, transform, anchor, normal, size);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            options,
            anchor,
            normal,
            size,
            canvas,
            geometry,
            committed: false,
            hovered: false,
            revision: 0,
        })
    }

    pub fn kind(&self) -> ItemKind {
        self.options.kind()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Preview items and hovered committed items render translucent
    pub fn opacity(&self) -> f32 {
        if self.committed && !self.hovered {
            COMMITTED_OPACITY
        } else {
            PREVIEW_OPACITY
        }
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Finalize placement: the item becomes opaque and stays put
    pub fn commit(&mut self) {
        self.committed = true;
        self.hovered = false;
    }

    /// Replace the content options, recomposite, and rebuild the decal
    /// at the item's stored anchor. Placement does not change on edit.
    pub fn update(
        &mut self,
        options: ContentOptions,
        surface: &MeshData,
        transform: Mat4,
        fonts: &FontSet,
    ) -> Result<(), ComposeError> {
        let canvas = compose::render(&options, fonts)?;
        self.options = options;
        self.size = canvas_size(&canvas);
        self.canvas = canvas;
        self.geometry = build_decal(surface, transform, self.anchor, self.normal, self.size);
        self.revision += 1;
        Ok(())
    }

    /// Move the decal to a new surface point; the canvas is untouched
    pub fn update_position(
        &mut self,
        anchor: Vec3,
        normal: Vec3,
        surface: &MeshData,
        transform: Mat4,
    ) {
        self.anchor = anchor;
        self.normal = normal;
        self.geometry = build_decal(surface, transform, anchor, normal, self.size);
        self.revision += 1;
    }
}

/// Decal box extents from the canvas pixel size, at the fixed
/// pixels-per-unit scale, with the standard projection depth
fn canvas_size(canvas: &RgbaImage) -> Vec3 {
    Vec3::new(
        shared::px_to_world_units(canvas.width() as f32),
        shared::px_to_world_units(canvas.height() as f32),
        DECAL_DEPTH,
    )
}
