//! Wavefront OBJ parser for the garment model. Handles v/vt/vn/f
//! records, negative and 1-based indices, and fan-triangulates faces
//! with more than three corners. Missing normals are computed per face.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use super::AssetError;
use crate::viewport::mesh::MeshData;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct Corner {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

pub fn parse_obj(text: &str) -> Result<MeshData, AssetError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut faces: Vec<Vec<Corner>> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let keyword = parts.next().unwrap_or("");
        let fields: Vec<&str> = parts.collect();

        let bad = |what: &str| {
            AssetError::ModelParse(format!("line {}: invalid {what}: {line}", line_no + 1))
        };

        match keyword {
            "v" => positions.push(parse_vec3(&fields).ok_or_else(|| bad("vertex"))?),
            "vt" => uvs.push(parse_vec2(&fields).ok_or_else(|| bad("texcoord"))?),
            "vn" => normals.push(parse_vec3(&fields).ok_or_else(|| bad("normal"))?),
            "f" => {
                if fields.len() < 3 {
                    return Err(bad("face"));
                }
                let corners = fields
                    .iter()
                    .map(|f| parse_corner(f, positions.len(), uvs.len(), normals.len()))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| bad("face"))?;
                faces.push(corners);
            }
            // Groups, materials, smoothing, objects: ignored
            _ => {}
        }
    }

    if faces.is_empty() {
        return Err(AssetError::ModelParse("no faces in model".to_string()));
    }

    build_mesh(&positions, &uvs, &normals, &faces)
}

fn parse_vec3(fields: &[&str]) -> Option<Vec3> {
    if fields.len() < 3 {
        return None;
    }
    Some(Vec3::new(
        fields[0].parse().ok()?,
        fields[1].parse().ok()?,
        fields[2].parse().ok()?,
    ))
}

fn parse_vec2(fields: &[&str]) -> Option<Vec2> {
    if fields.len() < 2 {
        return None;
    }
    Some(Vec2::new(fields[0].parse().ok()?, fields[1].parse().ok()?))
}

/// Resolve an OBJ index: 1-based, negative counts from the end
fn resolve(raw: &str, len: usize) -> Option<usize> {
    let idx: i64 = raw.parse().ok()?;
    let resolved = if idx < 0 {
        len as i64 + idx
    } else {
        idx - 1
    };
    (0..len as i64).contains(&resolved).then_some(resolved as usize)
}

fn parse_corner(field: &str, np: usize, nt: usize, nn: usize) -> Option<Corner> {
    let mut it = field.split('/');
    let position = resolve(it.next()?, np)?;
    let uv = match it.next() {
        Some("") | None => None,
        Some(raw) => Some(resolve(raw, nt)?),
    };
    let normal = match it.next() {
        Some("") | None => None,
        Some(raw) => Some(resolve(raw, nn)?),
    };
    Some(Corner {
        position,
        uv,
        normal,
    })
}

fn build_mesh(
    positions: &[Vec3],
    uvs: &[Vec2],
    normals: &[Vec3],
    faces: &[Vec<Corner>],
) -> Result<MeshData, AssetError> {
    let mut mesh = MeshData::default();
    let mut dedup: HashMap<Corner, u32> = HashMap::new();

    for face in faces {
        // Flat normal fallback from the first three corners
        let face_normal = {
            let a = positions[face[0].position];
            let b = positions[face[1].position];
            let c = positions[face[2].position];
            (b - a).cross(c - a).normalize_or_zero()
        };

        let mut emit = |mesh: &mut MeshData, corner: Corner| -> u32 {
            *dedup.entry(corner).or_insert_with(|| {
                let idx = mesh.vertex_count() as u32;
                let normal = corner.normal.map_or(face_normal, |n| normals[n]);
                let uv = corner.uv.map_or(Vec2::ZERO, |t| uvs[t]);
                mesh.push_vertex(positions[corner.position], normal, uv);
                idx
            })
        };

        for k in 1..face.len() - 1 {
            let tri = [
                emit(&mut mesh, face[0]),
                emit(&mut mesh, face[k]),
                emit(&mut mesh, face[k + 1]),
            ];
            mesh.indices.extend_from_slice(&tri);
        }
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_fan_triangulates() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.normal(0), Vec3::Z);
        assert_eq!(mesh.uv(2), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_negative_indices() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
";
        let mesh = parse_obj(obj).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.position(1), Vec3::X);
    }

    #[test]
    fn test_missing_normals_use_face_normal() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let mesh = parse_obj(obj).unwrap();
        assert_eq!(mesh.normal(0), Vec3::Z);
    }

    #[test]
    fn test_no_faces_is_an_error() {
        assert!(parse_obj("v 0 0 0\n").is_err());
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        assert!(parse_obj("v 0 0 0\nf 1 2 3\n").is_err());
    }
}
