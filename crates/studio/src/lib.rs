// Library crate: exposes testable modules for integration tests.
// GUI-specific modules (app shell, GL renderer) remain in the binary crate.

pub mod assets;
pub mod compose;
pub mod decal;
pub mod export;
pub mod fixtures;
pub mod intersect;
pub mod items;
pub mod state;
pub mod studio;
pub mod validation;

/// Subset of viewport types needed headlessly (MeshData, Ray, camera,
/// picking). The GL renderer and the egui viewport widget stay in the
/// binary crate.
pub mod viewport {
    pub mod camera;
    pub mod mesh;
    pub mod picking;
}
