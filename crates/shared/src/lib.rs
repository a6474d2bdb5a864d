use serde::{Deserialize, Serialize};

/// Unique identifier of a placed item
pub type ItemId = String;

/// Fixed conversion between rendered canvas pixels and world units
pub const PIXELS_PER_UNIT: f32 = 1024.0;

/// Depth of the projection box used when clipping a decal to the garment
pub const DECAL_DEPTH: f32 = 0.1;

/// Uploaded images are uniformly scaled down (never up) to fit this bound
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

/// Opacity of an item that is still being placed (or hovered)
pub const PREVIEW_OPACITY: f32 = 0.5;

/// Opacity of a committed item
pub const COMMITTED_OPACITY: f32 = 1.0;

/// Convert a pixel dimension to world units
pub fn px_to_world_units(px: f32) -> f32 {
    px / PIXELS_PER_UNIT
}

/// RGBA color, 8 bits per channel
pub type Color = [u8; 4];

pub const COLOR_BLACK: Color = [0, 0, 0, 255];
pub const COLOR_WHITE: Color = [255, 255, 255, 255];

/// Kind of content a placed item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Text,
    Image,
}

/// Whether an editor dialog is creating a new item or updating an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    Create,
    Update,
}

/// Font style variants offered by the text editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Horizontal/vertical mirroring flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlipFlags {
    pub x: bool,
    pub y: bool,
}

impl FlipFlags {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

// ── Text items ───────────────────────────────────────────────

pub const DEFAULT_FONT_FAMILY: &str = "Roboto";
pub const DEFAULT_FONT_SIZE: f32 = 14.0;
pub const DEFAULT_FONT_WEIGHT: u16 = 400;

/// Options describing a text item's rendered appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    pub text: String,
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub font_style: FontStyle,
    /// Rotation applied to the composited canvas, in degrees
    pub rotation: f32,
    pub text_color: Color,
    pub background_color: Color,
    pub border_color: Color,
    /// Border rectangle stroke width in pixels; 0 disables the border
    pub border_width: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub flip: FlipFlags,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_weight: DEFAULT_FONT_WEIGHT,
            font_style: FontStyle::Normal,
            rotation: 0.0,
            text_color: COLOR_BLACK,
            background_color: COLOR_WHITE,
            border_color: COLOR_WHITE,
            border_width: 0.0,
            padding_x: 0.0,
            padding_y: 0.0,
            flip: FlipFlags::default(),
        }
    }
}

// ── Image items ──────────────────────────────────────────────

pub const HUE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=360.0;
pub const SATURATION_RANGE: std::ops::RangeInclusive<f32> = 0.0..=4.0;
pub const BRIGHTNESS_RANGE: std::ops::RangeInclusive<f32> = 0.0..=4.0;
pub const CONTRAST_RANGE: std::ops::RangeInclusive<f32> = 0.0..=4.0;

/// Raw RGBA8 pixel data carried by an image item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8, row-major, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Solid-color image, handy for tests and placeholders
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Per-item filter values; every key is always present, zero-effect
/// values are skipped when the filter chain is composed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSettings {
    pub color_invert: bool,
    pub grayscale: bool,
    /// Hue rotation in degrees, 0..=360
    pub hue: f32,
    /// Multiplicative scales, 0..=4, 1.0 = no effect
    pub saturation: f32,
    pub brightness: f32,
    pub contrast: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            color_invert: false,
            grayscale: false,
            hue: 0.0,
            saturation: 1.0,
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

impl FilterSettings {
    /// Keys present in this filter set, in application order
    pub fn keys(&self) -> &'static [&'static str] {
        &[
            "colorInvert",
            "grayscale",
            "hue",
            "saturation",
            "brightness",
            "contrast",
        ]
    }
}

/// Per-item transform values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TransformSettings {
    pub flip: FlipFlags,
}

impl TransformSettings {
    /// Keys present in this transform set, in application order
    pub fn keys(&self) -> &'static [&'static str] {
        &["flip"]
    }
}

/// Options describing an image item's rendered appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOptions {
    pub source: ImageData,
    pub filters: FilterSettings,
    pub transforms: TransformSettings,
}

impl ImageOptions {
    pub fn new(source: ImageData) -> Self {
        Self {
            source,
            filters: FilterSettings::default(),
            transforms: TransformSettings::default(),
        }
    }
}

// ── Content options ──────────────────────────────────────────

/// Tagged union of per-item content; exactly one variant per item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentOptions {
    Text(TextOptions),
    Image(ImageOptions),
}

impl ContentOptions {
    pub fn kind(&self) -> ItemKind {
        match self {
            ContentOptions::Text(_) => ItemKind::Text,
            ContentOptions::Image(_) => ItemKind::Image,
        }
    }

    pub fn as_text(&self) -> Option<&TextOptions> {
        match self {
            ContentOptions::Text(t) => Some(t),
            ContentOptions::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageOptions> {
        match self {
            ContentOptions::Image(i) => Some(i),
            ContentOptions::Text(_) => None,
        }
    }
}
