//! Intersection resolver: converts a pointer position on the render
//! surface into a hit point and surface normal on the garment mesh.

use glam::{Mat3, Mat4, Vec2, Vec3};

use crate::viewport::camera::ArcBallCamera;
use crate::viewport::mesh::MeshData;
use crate::viewport::picking::{pick_triangle, Ray};

/// Non-owning reference to the surface a ray hit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceRef(pub u32);

/// Result of the latest raycast against the garment.
///
/// On a miss only `intersects` is cleared; `point` and `normal` keep
/// their previous values, so callers must check the flag before use.
#[derive(Clone, Debug)]
pub struct Intersection {
    pub intersects: bool,
    pub surface: Option<SurfaceRef>,
    /// Hit point in world space
    pub point: Vec3,
    /// Face normal in world space (already through the normal matrix)
    pub normal: Vec3,
}

impl Default for Intersection {
    fn default() -> Self {
        Self {
            intersects: false,
            surface: None,
            point: Vec3::ZERO,
            normal: Vec3::Z,
        }
    }
}

/// Resolves pointer positions to garment-surface intersections
#[derive(Default)]
pub struct IntersectionResolver {
    intersection: Intersection,
}

impl IntersectionResolver {
    pub fn intersection(&self) -> &Intersection {
        &self.intersection
    }

    /// Normalize device pixel coordinates to the [-1, 1] raycast space
    /// using the render surface's client size (not the window size).
    pub fn to_ndc(pointer_px: Vec2, surface_px: Vec2) -> Vec2 {
        Vec2::new(
            pointer_px.x / surface_px.x * 2.0 - 1.0,
            -(pointer_px.y / surface_px.y) * 2.0 + 1.0,
        )
    }

    /// Cast a ray from the camera through the pointer position against
    /// the garment mesh. Tolerates the mesh not being loaded (no-op).
    pub fn resolve(
        &mut self,
        pointer_px: Vec2,
        surface_px: Vec2,
        camera: &ArcBallCamera,
        surface: Option<(SurfaceRef, &MeshData, Mat4)>,
    ) -> &Intersection {
        let Some((surface_ref, mesh, transform)) = surface else {
            self.intersection.intersects = false;
            return &self.intersection;
        };

        let ndc = Self::to_ndc(pointer_px, surface_px);
        let aspect = surface_px.x / surface_px.y;
        let ray = camera.ray_from_ndc(ndc, aspect);

        // Pick in model space: transform the ray by the inverse world
        // matrix instead of transforming every vertex.
        let inverse = transform.inverse();
        let local_ray = Ray {
            origin: inverse.transform_point3(ray.origin),
            direction: inverse.transform_vector3(ray.direction).normalize_or_zero(),
        };

        match pick_triangle(&local_ray, mesh) {
            Some(hit) => {
                // Normal matrix: inverse-transpose of the world transform
                let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
                self.intersection = Intersection {
                    intersects: true,
                    surface: Some(surface_ref),
                    point: transform.transform_point3(hit.point),
                    normal: (normal_matrix * hit.normal).normalize_or_zero(),
                };
            }
            None => {
                self.intersection.intersects = false;
            }
        }

        &self.intersection
    }
}
