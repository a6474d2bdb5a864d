//! Headless studio façade: owns the camera, the placed items, the mode
//! state machine, and the editor controller, and turns pointer events
//! into placement actions. The egui shell and the integration tests
//! both drive this type; nothing here touches the GPU.

use std::fmt;

use glam::{Mat4, Vec2, Vec3};
use shared::{ContentOptions, EditorMode, ItemId, ItemKind};
use tracing::{info, warn};

use crate::assets::{AssetCatalog, LoadPlan, LoadProgress};
use crate::compose::ComposeError;
use crate::export::{self, ExportError, ExportPart};
use crate::intersect::{IntersectionResolver, SurfaceRef};
use crate::items::{selector, Item, ItemManager};
use crate::state::editor::{ItemEditorController, Submission};
use crate::state::{transition, AppEvent, AppMode};
use crate::viewport::camera::ArcBallCamera;
use crate::viewport::mesh::MeshData;

/// The garment is the only pickable surface
const GARMENT: SurfaceRef = SurfaceRef(0);

/// Pointer cursor the shell should show over the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Auto,
    /// Something under the pointer reacts to a click
    Pointer,
}

#[derive(Debug)]
pub enum StudioError {
    /// No garment mesh loaded yet
    ModelNotLoaded,
    Compose(ComposeError),
    Export(ExportError),
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudioError::ModelNotLoaded => write!(f, "garment model is not loaded"),
            StudioError::Compose(e) => write!(f, "compositing failed: {e}"),
            StudioError::Export(e) => write!(f, "export failed: {e}"),
        }
    }
}

impl std::error::Error for StudioError {}

impl From<ComposeError> for StudioError {
    fn from(e: ComposeError) -> Self {
        StudioError::Compose(e)
    }
}

impl From<ExportError> for StudioError {
    fn from(e: ExportError) -> Self {
        StudioError::Export(e)
    }
}

pub struct Studio {
    pub camera: ArcBallCamera,
    pub items: ItemManager,
    pub editor: ItemEditorController,
    catalog: AssetCatalog,
    resolver: IntersectionResolver,
    mode: AppMode,
    /// Item being placed while in Place mode
    preview_id: Option<ItemId>,
    hovered_id: Option<ItemId>,
    /// World transform of the garment mesh
    garment_transform: Mat4,
    /// Base color factor of the garment material
    pub base_color: [f32; 4],
    /// Render surface client size in device pixels
    surface_px: Vec2,
    /// Set on any pointer move between down and up; a click that moved
    /// is a camera drag, not a placement or selection
    moved: bool,
    pointer_down: bool,
}

impl Studio {
    pub fn new() -> Self {
        Self {
            camera: ArcBallCamera::new(),
            items: ItemManager::default(),
            editor: ItemEditorController::default(),
            catalog: AssetCatalog::default(),
            resolver: IntersectionResolver::default(),
            mode: AppMode::Select,
            preview_id: None,
            hovered_id: None,
            garment_transform: Mat4::IDENTITY,
            base_color: [1.0, 1.0, 1.0, 1.0],
            surface_px: Vec2::new(1.0, 1.0),
            moved: false,
            pointer_down: false,
        }
    }

    // ── Assets ───────────────────────────────────────────────

    pub fn load_assets(
        &mut self,
        plan: &LoadPlan,
        progress: impl FnMut(LoadProgress),
    ) -> Vec<crate::assets::AssetError> {
        let (catalog, errors) = AssetCatalog::load(plan, progress);
        self.catalog = catalog;
        errors
    }

    /// Install a prebuilt catalog (tests, drag-and-drop reload)
    pub fn set_catalog(&mut self, catalog: AssetCatalog) {
        self.catalog = catalog;
    }

    pub fn model_ready(&self) -> bool {
        self.catalog.model.is_some()
    }

    pub fn fonts_ready(&self) -> bool {
        !self.catalog.fonts.is_empty()
    }

    pub fn garment(&self) -> Option<&MeshData> {
        self.catalog.model.as_ref()
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn garment_transform(&self) -> Mat4 {
        self.garment_transform
    }

    // ── Mode ─────────────────────────────────────────────────

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    fn apply(&mut self, event: AppEvent) {
        self.mode = transition(self.mode, event);
    }

    // ── Pointer input ────────────────────────────────────────

    pub fn set_surface_size(&mut self, size: Vec2) {
        if size.x > 0.0 && size.y > 0.0 {
            self.surface_px = size;
        }
    }

    pub fn pointer_down(&mut self) {
        self.pointer_down = true;
        self.moved = false;
    }

    /// Pointer motion: updates the surface intersection, drags the
    /// preview item in Place mode, drives hover feedback in Select mode.
    pub fn pointer_move(&mut self, pointer_px: Vec2) {
        if self.pointer_down {
            self.moved = true;
        }
        if self.editor.is_open() {
            return;
        }
        self.resolve_surface(pointer_px);

        match self.mode {
            AppMode::Place => self.drag_preview(),
            AppMode::Select => self.update_hover(pointer_px),
            _ => {}
        }
    }

    /// Pointer release. Returns true when it counted as a click (no
    /// drag happened in between).
    pub fn pointer_up(&mut self, pointer_px: Vec2) -> bool {
        let was_down = self.pointer_down;
        self.pointer_down = false;
        if !was_down || self.moved {
            return false;
        }
        self.click(pointer_px);
        true
    }

    fn click(&mut self, pointer_px: Vec2) {
        if self.editor.is_open() {
            return;
        }
        // The release position decides the hit, not the last move
        self.resolve_surface(pointer_px);
        match self.mode {
            AppMode::Place => {
                self.drag_preview();
                self.commit_placement();
            }
            AppMode::Select => self.select_item(pointer_px),
            _ => {}
        }
    }

    /// Recompute the garment intersection for a pointer position
    fn resolve_surface(&mut self, pointer_px: Vec2) {
        let Some(mesh) = self.catalog.model.as_ref() else {
            return;
        };
        let transform = self.garment_transform;
        self.resolver.resolve(
            pointer_px,
            self.surface_px,
            &self.camera,
            Some((GARMENT, mesh, transform)),
        );
    }

    fn drag_preview(&mut self) {
        let hit = self.resolver.intersection();
        if !hit.intersects {
            return;
        }
        let (anchor, normal) = (hit.point, hit.normal);
        let transform = self.garment_transform;
        let Some(mesh) = self.catalog.model.as_ref() else {
            return;
        };
        if let Some(item) = self
            .preview_id
            .as_ref()
            .and_then(|id| self.items.get_mut(id))
        {
            item.update_position(anchor, normal, mesh, transform);
        }
    }

    fn update_hover(&mut self, pointer_px: Vec2) {
        let ndc = IntersectionResolver::to_ndc(pointer_px, self.surface_px);
        let ray = self
            .camera
            .ray_from_ndc(ndc, self.surface_px.x / self.surface_px.y);
        let hovered = selector::pick_item(&ray, &self.items).cloned();

        if hovered != self.hovered_id {
            self.hovered_id = hovered;
            let hovered = self.hovered_id.clone();
            for item in self.items.iter_mut() {
                item.set_hovered(Some(&item.id) == hovered.as_ref());
            }
        }
    }

    pub fn hovered_item(&self) -> Option<&ItemId> {
        self.hovered_id.as_ref()
    }

    pub fn cursor(&self) -> CursorState {
        let clickable = match self.mode {
            AppMode::Place => self.resolver.intersection().intersects,
            AppMode::Select => self.hovered_id.is_some(),
            _ => false,
        };
        if clickable {
            CursorState::Pointer
        } else {
            CursorState::Auto
        }
    }

    fn commit_placement(&mut self) {
        if !self.resolver.intersection().intersects {
            return;
        }
        if let Some(item) = self
            .preview_id
            .take()
            .and_then(|id| self.items.get_mut(&id))
        {
            item.commit();
            info!(id = %item.id, "item committed");
        }
        self.apply(AppEvent::PlacementCommitted);
    }

    fn select_item(&mut self, pointer_px: Vec2) {
        let ndc = IntersectionResolver::to_ndc(pointer_px, self.surface_px);
        let ray = self
            .camera
            .ray_from_ndc(ndc, self.surface_px.x / self.surface_px.y);
        let Some(id) = selector::pick_item(&ray, &self.items).cloned() else {
            return;
        };
        let Some(item) = self.items.get(&id) else {
            return;
        };

        let event = match item.kind() {
            ItemKind::Text => AppEvent::EditText,
            ItemKind::Image => AppEvent::EditImage,
        };
        self.editor.open_update(id, item.options.clone());
        self.apply(event);
    }

    // ── Editor flow ──────────────────────────────────────────

    /// Text creation stays disabled until both the garment and at
    /// least one font have loaded
    pub fn request_new_text(&mut self) {
        if self.mode != AppMode::Select || !self.model_ready() || !self.fonts_ready() {
            return;
        }
        self.editor.open_create(ItemKind::Text);
        self.apply(AppEvent::NewText);
    }

    pub fn request_new_image(&mut self) {
        if self.mode != AppMode::Select || !self.model_ready() {
            return;
        }
        self.editor.open_create(ItemKind::Image);
        self.apply(AppEvent::NewImage);
    }

    /// Submit the open editor. Creates spawn a preview item that enters
    /// placement; updates recomposite the target item in place. On
    /// failure the draft goes back into the reopened dialog so the mode
    /// and dialog state stay consistent.
    pub fn submit_editor(&mut self) -> Result<(), StudioError> {
        let Some(submission) = self.editor.submit() else {
            // Incomplete draft: dialog stays open
            return Ok(());
        };
        let result = match submission.mode {
            EditorMode::Create => self.spawn_preview(&submission.options),
            EditorMode::Update => self.apply_update(&submission),
        };
        if let Err(ref e) = result {
            warn!(error = %e, "editor submit failed, dialog reopened");
            self.editor.restore(submission);
        }
        result
    }

    fn spawn_preview(&mut self, options: &ContentOptions) -> Result<(), StudioError> {
        let mesh = self.catalog.model.as_ref().ok_or(StudioError::ModelNotLoaded)?;
        let hit = self.resolver.intersection();
        let (anchor, normal) = if hit.intersects {
            (hit.point, hit.normal)
        } else {
            // Off-surface: the preview stays empty until the pointer
            // first crosses the garment
            (Vec3::ZERO, Vec3::Z)
        };

        let item = Item::new(
            options.clone(),
            anchor,
            normal,
            mesh,
            self.garment_transform,
            &self.catalog.fonts,
        )?;
        let id = self.items.add(item).clone();
        info!(%id, "preview item spawned");
        self.preview_id = Some(id);
        self.apply(AppEvent::EditorSubmitted);
        Ok(())
    }

    fn apply_update(&mut self, submission: &Submission) -> Result<(), StudioError> {
        let mesh = self.catalog.model.as_ref().ok_or(StudioError::ModelNotLoaded)?;
        let Some(id) = submission.item_id.as_ref() else {
            warn!("update submission without a target item");
            self.apply(AppEvent::EditorSubmitted);
            return Ok(());
        };
        if let Some(item) = self.items.get_mut(id) {
            item.update(
                submission.options.clone(),
                mesh,
                self.garment_transform,
                &self.catalog.fonts,
            )?;
        }
        self.apply(AppEvent::EditorSubmitted);
        Ok(())
    }

    pub fn cancel_editor(&mut self) {
        self.editor.cancel();
        self.apply(AppEvent::EditorCancelled);
    }

    /// Abandon the placement in progress and discard its preview item
    pub fn cancel_placement(&mut self) {
        if self.mode != AppMode::Place {
            return;
        }
        if let Some(id) = self.preview_id.take() {
            self.items.remove(&id);
        }
        self.apply(AppEvent::PlacementCancelled);
    }

    pub fn delete_item(&mut self, id: &str) -> bool {
        if self.hovered_id.as_deref() == Some(id) {
            self.hovered_id = None;
        }
        self.items.remove(id).is_some()
    }

    // ── Export ───────────────────────────────────────────────

    pub fn begin_export(&mut self) {
        self.apply(AppEvent::ExportRequested);
    }

    pub fn finish_export(&mut self) {
        self.apply(AppEvent::ExportFinished);
    }

    /// Build the GLB bytes for the current design: garment plus every
    /// committed item with its canvas as an embedded texture.
    pub fn export_glb(&self, filename: &str) -> Result<Vec<u8>, StudioError> {
        if !export::is_valid_filename(filename) {
            return Err(ExportError::InvalidFilename(filename.to_string()).into());
        }
        let garment = self.catalog.model.as_ref().ok_or(StudioError::ModelNotLoaded)?;

        let mut parts = vec![ExportPart {
            name: "garment".to_string(),
            mesh: garment,
            texture: None,
            base_color: self.base_color,
            opacity: 1.0,
        }];
        for item in self.items.iter().filter(|i| i.is_committed()) {
            parts.push(ExportPart {
                name: format!("decal-{}", item.id),
                mesh: &item.geometry,
                texture: Some(&item.canvas),
                base_color: [1.0, 1.0, 1.0, 1.0],
                opacity: 1.0,
            });
        }

        let glb = export::build_glb(&parts)?;
        info!(filename, bytes = glb.len(), "design exported");
        Ok(glb)
    }
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}
