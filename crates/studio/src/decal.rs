//! Decal geometry builder: projects an oriented box onto a mesh and
//! clips the covered triangles to the box, producing a thin geometry
//! patch that conforms to the surface.

use glam::{Mat3, Mat4, Vec3};

use crate::viewport::mesh::MeshData;

/// One vertex of a triangle being clipped, tracked in projector space
/// with its interpolated surface normal.
#[derive(Clone, Copy)]
struct DecalVertex {
    position: Vec3,
    normal: Vec3,
}

/// Build a decal mesh for `surface` (in world space, `transform` applied)
/// covering an oriented box centered at `anchor`, aligned to `normal`,
/// with extents `size` (width, height, depth).
///
/// Output vertices are in world space with UVs spanning the box face,
/// so the decal can be drawn with its own texture over the surface.
pub fn build_decal(
    surface: &MeshData,
    transform: Mat4,
    anchor: Vec3,
    normal: Vec3,
    size: Vec3,
) -> MeshData {
    let projector = projector_matrix(anchor, normal);
    let projector_inv = projector.inverse();
    // Normals need the inverse-transpose under non-uniform transforms
    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();

    let half = size * 0.5;
    let mut decal = MeshData::default();

    for tri in 0..surface.triangle_count() {
        let [i0, i1, i2] = surface.triangle(tri);
        let mut polygon: Vec<DecalVertex> = [i0, i1, i2]
            .into_iter()
            .map(|i| DecalVertex {
                position: projector_inv
                    .transform_point3(transform.transform_point3(surface.position(i))),
                normal: (normal_matrix * surface.normal(i)).normalize_or_zero(),
            })
            .collect();

        // Clip against the six box planes in projector space
        for (plane, s) in [
            (Vec3::X, half.x),
            (Vec3::NEG_X, half.x),
            (Vec3::Y, half.y),
            (Vec3::NEG_Y, half.y),
            (Vec3::Z, half.z),
            (Vec3::NEG_Z, half.z),
        ] {
            polygon = clip_polygon(&polygon, plane, s);
            if polygon.is_empty() {
                break;
            }
        }

        // Fan-triangulate the clipped polygon
        for k in 1..polygon.len().saturating_sub(1) {
            for v in [polygon[0], polygon[k], polygon[k + 1]] {
                let uv = glam::Vec2::new(0.5 + v.position.x / size.x, 0.5 + v.position.y / size.y);
                let world = projector.transform_point3(v.position);
                decal.indices.push(decal.vertex_count() as u32);
                decal.push_vertex(world, v.normal, uv);
            }
        }
    }

    decal
}

/// Orientation matrix for the projector box: looks down `-normal` at the
/// anchor. The up vector flips to X when the normal is nearly vertical
/// to keep the basis stable.
fn projector_matrix(anchor: Vec3, normal: Vec3) -> Mat4 {
    let forward = normal.normalize_or_zero();
    let up = if forward.dot(Vec3::Y).abs() > 0.999 {
        Vec3::X
    } else {
        Vec3::Y
    };
    let right = up.cross(forward).normalize_or_zero();
    let up = forward.cross(right).normalize_or_zero();

    Mat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        forward.extend(0.0),
        anchor.extend(1.0),
    )
}

/// Sutherland-Hodgman clip of a polygon against one box plane.
/// A vertex is kept when dot(v, plane) <= s.
fn clip_polygon(polygon: &[DecalVertex], plane: Vec3, s: f32) -> Vec<DecalVertex> {
    let mut out = Vec::with_capacity(polygon.len() + 1);

    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        let da = a.position.dot(plane) - s;
        let db = b.position.dot(plane) - s;

        if da <= 0.0 {
            out.push(a);
        }
        // Edge crosses the plane: emit the intersection point
        if (da <= 0.0) != (db <= 0.0) {
            let t = da / (da - db);
            out.push(DecalVertex {
                position: a.position.lerp(b.position, t),
                normal: a.normal.lerp(b.normal, t).normalize_or_zero(),
            });
        }
    }

    out
}
