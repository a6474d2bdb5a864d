//! Shared test fixtures: small meshes and an embedded font, usable from
//! both unit tests and the integration suites.

use ab_glyph::FontArc;
use glam::{Vec2, Vec3};

use crate::viewport::mesh::MeshData;

/// Quad of the given size centered at `center`, facing `normal`.
/// `normal` must be one of the coordinate axes.
pub fn quad_facing(center: Vec3, width: f32, height: f32, normal: Vec3) -> MeshData {
    let n = normal.normalize_or_zero();
    let up = if n.y.abs() > 0.9 { Vec3::X } else { Vec3::Y };
    let right = up.cross(n).normalize_or_zero();
    let up = n.cross(right).normalize_or_zero();

    let hw = width * 0.5;
    let hh = height * 0.5;

    let mut mesh = MeshData::default();
    mesh.push_vertex(center - right * hw - up * hh, n, Vec2::new(0.0, 0.0));
    mesh.push_vertex(center + right * hw - up * hh, n, Vec2::new(1.0, 0.0));
    mesh.push_vertex(center + right * hw + up * hh, n, Vec2::new(1.0, 1.0));
    mesh.push_vertex(center - right * hw + up * hh, n, Vec2::new(0.0, 1.0));
    mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
    mesh
}

/// Plane in the XY plane facing +Z, subdivided into `segments` quads per
/// side. Used to exercise decal clipping across triangle boundaries.
pub fn subdivided_plane(size: f32, segments: usize) -> MeshData {
    let mut mesh = MeshData::default();
    let step = size / segments as f32;
    let half = size * 0.5;

    for row in 0..=segments {
        for col in 0..=segments {
            let x = -half + col as f32 * step;
            let y = -half + row as f32 * step;
            mesh.push_vertex(
                Vec3::new(x, y, 0.0),
                Vec3::Z,
                Vec2::new(col as f32 / segments as f32, row as f32 / segments as f32),
            );
        }
    }

    let stride = (segments + 1) as u32;
    for row in 0..segments as u32 {
        for col in 0..segments as u32 {
            let i = row * stride + col;
            mesh.indices
                .extend_from_slice(&[i, i + 1, i + stride + 1, i, i + stride + 1, i + stride]);
        }
    }

    mesh
}

/// A real font for headless text rendering, pulled from the fonts egui
/// embeds so tests need no files on disk.
pub fn test_font() -> FontArc {
    let defs = egui::FontDefinitions::default();
    let (_, data) = defs
        .font_data
        .iter()
        .next()
        .expect("egui default fonts are embedded");
    FontArc::try_from_vec(data.font.to_vec()).expect("embedded font parses")
}
