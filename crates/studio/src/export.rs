//! GLB (binary glTF) export of the designed garment: the base mesh plus
//! every committed decal, with decal canvases embedded as PNG textures.

use std::fmt;

use image::RgbaImage;

use crate::viewport::mesh::MeshData;

/// GLB magic number: "glTF"
const GLB_MAGIC: u32 = 0x46546C67;
/// GLB version 2
const GLB_VERSION: u32 = 2;
/// JSON chunk type
const CHUNK_TYPE_JSON: u32 = 0x4E4F534A;
/// BIN chunk type
const CHUNK_TYPE_BIN: u32 = 0x004E4942;

/// glTF component types
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;

/// glTF buffer view targets
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

#[derive(Debug)]
pub enum ExportError {
    /// Nothing to export: no garment mesh loaded
    EmptyScene,
    InvalidFilename(String),
    PngEncode(String),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::EmptyScene => write!(f, "nothing to export"),
            ExportError::InvalidFilename(name) => write!(f, "invalid file name '{name}'"),
            ExportError::PngEncode(e) => write!(f, "texture encoding failed: {e}"),
            ExportError::Io(e) => write!(f, "write failed: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Write finished GLB bytes to disk
pub fn write_glb(path: &std::path::Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes).map_err(ExportError::Io)
}

/// Export file names: ASCII letters, digits, '-', '.' and '_' only
pub fn is_valid_filename(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

/// One mesh going into the exported scene
pub struct ExportPart<'a> {
    pub name: String,
    pub mesh: &'a MeshData,
    /// Decal canvas, embedded as a PNG texture; None renders base color
    pub texture: Option<&'a RgbaImage>,
    /// Linear-space base color factor
    pub base_color: [f32; 4],
    pub opacity: f32,
}

/// Build a complete GLB file. Each part becomes a node/mesh with its
/// own material; textured parts get their canvas embedded in the BIN
/// chunk and alpha blending enabled.
pub fn build_glb(parts: &[ExportPart<'_>]) -> Result<Vec<u8>, ExportError> {
    let parts: Vec<&ExportPart<'_>> = parts
        .iter()
        .filter(|p| !p.mesh.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(ExportError::EmptyScene);
    }

    // ── Phase 1: binary buffer ───────────────────────────────
    let mut bin_data: Vec<u8> = Vec::new();

    struct Span {
        offset: usize,
        length: usize,
    }

    struct PartMeta {
        vertex_count: usize,
        index_count: usize,
        pos: Span,
        norm: Span,
        uv: Span,
        idx: Span,
        image: Option<Span>,
        pos_min: [f32; 3],
        pos_max: [f32; 3],
    }

    let mut push_span = |bin: &mut Vec<u8>, bytes: &[u8]| -> Span {
        let offset = bin.len();
        bin.extend_from_slice(bytes);
        while bin.len() % 4 != 0 {
            bin.push(0);
        }
        Span {
            offset,
            length: bytes.len(),
        }
    };

    let mut metas: Vec<PartMeta> = Vec::new();

    for part in &parts {
        let mesh = part.mesh;
        let vertex_count = mesh.vertex_count();

        // De-interleave positions, normals, and UVs
        let mut positions: Vec<f32> = Vec::with_capacity(vertex_count * 3);
        let mut normals: Vec<f32> = Vec::with_capacity(vertex_count * 3);
        let mut uvs: Vec<f32> = Vec::with_capacity(vertex_count * 2);
        let mut pos_min = [f32::MAX; 3];
        let mut pos_max = [f32::MIN; 3];

        for v in 0..vertex_count {
            let p = mesh.position(v);
            let n = mesh.normal(v);
            let t = mesh.uv(v);
            positions.extend_from_slice(&[p.x, p.y, p.z]);
            normals.extend_from_slice(&[n.x, n.y, n.z]);
            // glTF UV origin is top-left
            uvs.extend_from_slice(&[t.x, 1.0 - t.y]);

            for (axis, value) in [p.x, p.y, p.z].into_iter().enumerate() {
                pos_min[axis] = pos_min[axis].min(value);
                pos_max[axis] = pos_max[axis].max(value);
            }
        }

        let pos = push_span(&mut bin_data, &floats_to_bytes(&positions));
        let norm = push_span(&mut bin_data, &floats_to_bytes(&normals));
        let uv = push_span(&mut bin_data, &floats_to_bytes(&uvs));
        let idx = push_span(&mut bin_data, &u32s_to_bytes(&mesh.indices));

        let image = match part.texture {
            Some(canvas) => {
                let png = encode_png(canvas)?;
                Some(push_span(&mut bin_data, &png))
            }
            None => None,
        };

        metas.push(PartMeta {
            vertex_count,
            index_count: mesh.indices.len(),
            pos,
            norm,
            uv,
            idx,
            image,
            pos_min,
            pos_max,
        });
    }

    // ── Phase 2: glTF JSON ───────────────────────────────────
    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();
    let mut images = Vec::new();
    let mut textures = Vec::new();
    let mut materials = Vec::new();
    let mut gltf_meshes = Vec::new();
    let mut nodes = Vec::new();
    let mut node_indices: Vec<usize> = Vec::new();

    for (i, (part, meta)) in parts.iter().zip(&metas).enumerate() {
        let bv_base = buffer_views.len();
        let acc_base = accessors.len();

        for (span, target) in [
            (&meta.pos, Some(ARRAY_BUFFER)),
            (&meta.norm, Some(ARRAY_BUFFER)),
            (&meta.uv, Some(ARRAY_BUFFER)),
            (&meta.idx, Some(ELEMENT_ARRAY_BUFFER)),
        ] {
            let mut view = serde_json::json!({
                "buffer": 0,
                "byteOffset": span.offset,
                "byteLength": span.length,
            });
            if let Some(target) = target {
                view["target"] = serde_json::json!(target);
            }
            buffer_views.push(view);
        }

        accessors.push(serde_json::json!({
            "bufferView": bv_base,
            "byteOffset": 0,
            "componentType": FLOAT,
            "count": meta.vertex_count,
            "type": "VEC3",
            "min": meta.pos_min,
            "max": meta.pos_max
        }));
        accessors.push(serde_json::json!({
            "bufferView": bv_base + 1,
            "byteOffset": 0,
            "componentType": FLOAT,
            "count": meta.vertex_count,
            "type": "VEC3"
        }));
        accessors.push(serde_json::json!({
            "bufferView": bv_base + 2,
            "byteOffset": 0,
            "componentType": FLOAT,
            "count": meta.vertex_count,
            "type": "VEC2"
        }));
        accessors.push(serde_json::json!({
            "bufferView": bv_base + 3,
            "byteOffset": 0,
            "componentType": UNSIGNED_INT,
            "count": meta.index_count,
            "type": "SCALAR"
        }));

        let mut material = serde_json::json!({
            "name": format!("{}-material", part.name),
            "pbrMetallicRoughness": {
                "baseColorFactor": [
                    part.base_color[0],
                    part.base_color[1],
                    part.base_color[2],
                    part.base_color[3] * part.opacity
                ],
                "metallicFactor": 0.0,
                "roughnessFactor": 0.9
            },
            "doubleSided": true
        });

        if let Some(image_span) = &meta.image {
            buffer_views.push(serde_json::json!({
                "buffer": 0,
                "byteOffset": image_span.offset,
                "byteLength": image_span.length,
            }));
            let image_index = images.len();
            images.push(serde_json::json!({
                "name": format!("{}-canvas", part.name),
                "mimeType": "image/png",
                "bufferView": buffer_views.len() - 1
            }));
            let texture_index = textures.len();
            textures.push(serde_json::json!({
                "source": image_index,
                "sampler": 0
            }));
            material["pbrMetallicRoughness"]["baseColorTexture"] =
                serde_json::json!({ "index": texture_index });
            material["alphaMode"] = serde_json::json!("BLEND");
        }

        let material_index = materials.len();
        materials.push(material);

        gltf_meshes.push(serde_json::json!({
            "name": part.name,
            "primitives": [{
                "attributes": {
                    "POSITION": acc_base,
                    "NORMAL": acc_base + 1,
                    "TEXCOORD_0": acc_base + 2
                },
                "indices": acc_base + 3,
                "material": material_index
            }]
        }));

        nodes.push(serde_json::json!({
            "name": part.name,
            "mesh": i
        }));
        node_indices.push(i);
    }

    let mut gltf_json = serde_json::json!({
        "asset": {
            "version": "2.0",
            "generator": "decal-studio"
        },
        "scene": 0,
        "scenes": [{
            "name": "Scene",
            "nodes": node_indices
        }],
        "nodes": nodes,
        "meshes": gltf_meshes,
        "accessors": accessors,
        "bufferViews": buffer_views,
        "buffers": [{
            "byteLength": bin_data.len()
        }],
        "materials": materials
    });

    if !images.is_empty() {
        gltf_json["images"] = serde_json::json!(images);
        gltf_json["textures"] = serde_json::json!(textures);
        gltf_json["samplers"] = serde_json::json!([{
            "magFilter": 9729,
            "minFilter": 9987,
            "wrapS": 33071,
            "wrapT": 33071
        }]);
    }

    let json_str = serde_json::to_string(&gltf_json).unwrap_or_default();
    let mut json_bytes = json_str.into_bytes();

    // Pad JSON to 4-byte alignment with spaces (per GLB spec)
    while json_bytes.len() % 4 != 0 {
        json_bytes.push(b' ');
    }

    // Pad BIN to 4-byte alignment with zeros (per GLB spec)
    while bin_data.len() % 4 != 0 {
        bin_data.push(0);
    }

    // ── Phase 3: assemble GLB ────────────────────────────────
    let json_chunk_length = json_bytes.len() as u32;
    let bin_chunk_length = bin_data.len() as u32;

    let total_length: u32 = 12 // header
        + 8 + json_chunk_length  // JSON chunk header + data
        + 8 + bin_chunk_length;  // BIN chunk header + data

    let mut glb = Vec::with_capacity(total_length as usize);

    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&total_length.to_le_bytes());

    glb.extend_from_slice(&json_chunk_length.to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    glb.extend_from_slice(&json_bytes);

    glb.extend_from_slice(&bin_chunk_length.to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
    glb.extend_from_slice(&bin_data);

    Ok(glb)
}

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut png = Vec::new();
    canvas
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| ExportError::PngEncode(e.to_string()))?;
    Ok(png)
}

fn floats_to_bytes(data: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(data.len() * 4);
    for &f in data {
        bytes.extend_from_slice(&f.to_le_bytes());
    }
    bytes
}

fn u32s_to_bytes(data: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(data.len() * 4);
    for &v in data {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}
