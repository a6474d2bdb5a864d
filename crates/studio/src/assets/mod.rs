//! Asset loading: garment model, font families, and uploaded images.
//! Assets load sequentially with per-task progress reporting; a failed
//! task is recorded and loading moves on, so a missing font never
//! blocks the model.

pub mod fonts;
pub mod model;

use std::fmt;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use shared::{FontStyle, ImageData, MAX_IMAGE_DIMENSION};
use tracing::{info, warn};

use crate::viewport::mesh::MeshData;
use fonts::FontSet;

/// Errors surfaced while loading assets
#[derive(Debug)]
pub enum AssetError {
    Io(PathBuf, std::io::Error),
    FontParse(String, String),
    ModelParse(String),
    ImageDecode(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io(path, e) => write!(f, "failed to read {}: {e}", path.display()),
            AssetError::FontParse(family, e) => write!(f, "font '{family}' failed to parse: {e}"),
            AssetError::ModelParse(e) => write!(f, "model failed to parse: {e}"),
            AssetError::ImageDecode(e) => write!(f, "image failed to decode: {e}"),
        }
    }
}

impl std::error::Error for AssetError {}

/// One font file to load into the catalog
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    pub path: PathBuf,
}

/// Everything the studio loads up front
pub struct LoadPlan {
    pub model: Option<PathBuf>,
    pub fonts: Vec<FontSpec>,
}

/// Progress of the sequential asset load, for the loading overlay
#[derive(Clone, Debug)]
pub struct LoadProgress {
    pub current: usize,
    pub total: usize,
    pub label: String,
}

/// Loaded assets; either side may be missing if its task failed
#[derive(Default)]
pub struct AssetCatalog {
    pub model: Option<MeshData>,
    pub fonts: FontSet,
}

impl AssetCatalog {
    /// Run the load plan task by task, reporting progress before each
    /// task. Failures are collected and returned alongside the partial
    /// catalog.
    pub fn load(plan: &LoadPlan, mut progress: impl FnMut(LoadProgress)) -> (Self, Vec<AssetError>) {
        let total = plan.fonts.len() + usize::from(plan.model.is_some());
        let mut catalog = AssetCatalog::default();
        let mut errors = Vec::new();
        let mut current = 0;

        if let Some(path) = &plan.model {
            current += 1;
            progress(LoadProgress {
                current,
                total,
                label: format!("model {}", path.display()),
            });
            match load_model(path) {
                Ok(mesh) => {
                    info!(path = %path.display(), triangles = mesh.triangle_count(), "model loaded");
                    catalog.model = Some(mesh);
                }
                Err(e) => {
                    warn!(%e, "model load failed");
                    errors.push(e);
                }
            }
        }

        for spec in &plan.fonts {
            current += 1;
            progress(LoadProgress {
                current,
                total,
                label: format!("font {}", spec.family),
            });
            let result = std::fs::read(&spec.path)
                .map_err(|e| AssetError::Io(spec.path.clone(), e))
                .and_then(|bytes| {
                    catalog
                        .fonts
                        .register_bytes(&spec.family, spec.weight, spec.style, bytes)
                });
            if let Err(e) = result {
                warn!(%e, family = %spec.family, "font load failed");
                errors.push(e);
            }
        }

        (catalog, errors)
    }
}

/// Read and parse a garment model from disk (Wavefront OBJ)
pub fn load_model(path: &Path) -> Result<MeshData, AssetError> {
    let text = std::fs::read_to_string(path).map_err(|e| AssetError::Io(path.to_path_buf(), e))?;
    model::parse_obj(&text)
}

/// Decode an uploaded image and scale it down (never up) to fit the
/// maximum texture dimension, preserving aspect ratio.
pub fn decode_image(bytes: &[u8]) -> Result<ImageData, AssetError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| AssetError::ImageDecode(e.to_string()))?
        .to_rgba8();

    let (w, h) = decoded.dimensions();
    let longest = w.max(h);
    let decoded = if longest > MAX_IMAGE_DIMENSION {
        let scale = MAX_IMAGE_DIMENSION as f32 / longest as f32;
        let nw = ((w as f32 * scale).round() as u32).max(1);
        let nh = ((h as f32 * scale).round() as u32).max(1);
        image::imageops::resize(&decoded, nw, nh, FilterType::Triangle)
    } else {
        decoded
    };

    let (w, h) = decoded.dimensions();
    Ok(ImageData::new(w, h, decoded.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_reports_each_task_and_collects_errors() {
        let plan = LoadPlan {
            model: Some(PathBuf::from("/nonexistent/shirt.obj")),
            fonts: vec![FontSpec {
                family: "Roboto".to_string(),
                weight: 400,
                style: FontStyle::Normal,
                path: PathBuf::from("/nonexistent/roboto.ttf"),
            }],
        };

        let mut seen = Vec::new();
        let (catalog, errors) = AssetCatalog::load(&plan, |p| seen.push((p.current, p.total)));

        assert_eq!(seen, vec![(1, 2), (2, 2)]);
        assert_eq!(errors.len(), 2);
        assert!(catalog.model.is_none());
        assert!(catalog.fonts.is_empty());
    }

    #[test]
    fn test_decode_image_downscales_to_bound() {
        let mut png = Vec::new();
        let src = image::RgbaImage::from_pixel(2048, 512, image::Rgba([9, 9, 9, 255]));
        image::DynamicImage::ImageRgba8(src)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let data = decode_image(&png).unwrap();
        assert_eq!(data.width, MAX_IMAGE_DIMENSION);
        assert_eq!(data.height, 256);
    }

    #[test]
    fn test_decode_image_never_upscales() {
        let mut png = Vec::new();
        let src = image::RgbaImage::from_pixel(8, 4, image::Rgba([1, 2, 3, 255]));
        image::DynamicImage::ImageRgba8(src)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let data = decode_image(&png).unwrap();
        assert_eq!((data.width, data.height), (8, 4));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image(b"not an image").is_err());
    }
}
