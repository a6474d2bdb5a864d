//! Image filter registry. Filter values are composed into a compact
//! expression string ("brightness(2) hue-rotate(90deg)") that is both
//! the cache key for a rendered canvas and the recipe for the per-pixel
//! pass that applies it.

use image::RgbaImage;
use shared::ImageOptions;

/// One named filter: contributes a fragment to the composed expression
/// when its setting differs from the zero-effect value.
pub trait Filter {
    fn fragment(&self, options: &ImageOptions) -> Option<String>;
}

struct ColorInvert;
struct Grayscale;
struct Hue;
struct Saturation;
struct Brightness;
struct Contrast;

impl Filter for ColorInvert {
    fn fragment(&self, options: &ImageOptions) -> Option<String> {
        options.filters.color_invert.then(|| "invert(1)".to_string())
    }
}

impl Filter for Grayscale {
    fn fragment(&self, options: &ImageOptions) -> Option<String> {
        options.filters.grayscale.then(|| "grayscale(1)".to_string())
    }
}

impl Filter for Hue {
    fn fragment(&self, options: &ImageOptions) -> Option<String> {
        let deg = options.filters.hue;
        (deg != 0.0).then(|| format!("hue-rotate({deg}deg)"))
    }
}

impl Filter for Saturation {
    fn fragment(&self, options: &ImageOptions) -> Option<String> {
        let v = options.filters.saturation;
        (v != 1.0).then(|| format!("saturate({v})"))
    }
}

impl Filter for Brightness {
    fn fragment(&self, options: &ImageOptions) -> Option<String> {
        let v = options.filters.brightness;
        (v != 1.0).then(|| format!("brightness({v})"))
    }
}

impl Filter for Contrast {
    fn fragment(&self, options: &ImageOptions) -> Option<String> {
        let v = options.filters.contrast;
        (v != 1.0).then(|| format!("contrast({v})"))
    }
}

/// Lookup table from filter key to strategy, in application order
const REGISTRY: &[(&str, &dyn Filter)] = &[
    ("colorInvert", &ColorInvert),
    ("grayscale", &Grayscale),
    ("hue", &Hue),
    ("saturation", &Saturation),
    ("brightness", &Brightness),
    ("contrast", &Contrast),
];

pub fn lookup(key: &str) -> Option<&'static dyn Filter> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, f)| *f)
}

/// Compose the filter expression for an item: one fragment per active
/// filter, joined with single spaces. Zero-effect filters contribute
/// nothing, so default settings compose to the empty string.
pub fn compose(options: &ImageOptions) -> String {
    options
        .filters
        .keys()
        .iter()
        .filter_map(|key| lookup(key).and_then(|f| f.fragment(options)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply a composed filter expression to pixel data. Tokens that do not
/// parse as a known `name(value)` primitive are skipped.
pub fn apply_expression(image: &mut RgbaImage, expression: &str) {
    for token in expression.split_whitespace() {
        let Some((name, value)) = parse_token(token) else {
            continue;
        };
        match name {
            "invert" => invert(image, value),
            "grayscale" => saturate(image, 1.0 - value),
            "hue-rotate" => hue_rotate(image, value),
            "saturate" => saturate(image, value),
            "brightness" => brightness(image, value),
            "contrast" => contrast(image, value),
            _ => {}
        }
    }
}

fn parse_token(token: &str) -> Option<(&str, f32)> {
    let open = token.find('(')?;
    let close = token.rfind(')')?;
    if close <= open {
        return None;
    }
    let name = &token[..open];
    let arg = token[open + 1..close].trim_end_matches("deg");
    arg.parse::<f32>().ok().map(|v| (name, v))
}

fn for_each_rgb(image: &mut RgbaImage, f: impl Fn(f32, f32, f32) -> (f32, f32, f32)) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let (r, g, b) = f(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        pixel.0 = [
            (r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (b.clamp(0.0, 1.0) * 255.0).round() as u8,
            a,
        ];
    }
}

fn invert(image: &mut RgbaImage, amount: f32) {
    for_each_rgb(image, |r, g, b| {
        (
            r + (1.0 - 2.0 * r) * amount,
            g + (1.0 - 2.0 * g) * amount,
            b + (1.0 - 2.0 * b) * amount,
        )
    });
}

fn brightness(image: &mut RgbaImage, amount: f32) {
    for_each_rgb(image, |r, g, b| (r * amount, g * amount, b * amount));
}

fn contrast(image: &mut RgbaImage, amount: f32) {
    let adjust = |c: f32| (c - 0.5) * amount + 0.5;
    for_each_rgb(image, |r, g, b| (adjust(r), adjust(g), adjust(b)));
}

// Luminance weights from the SVG/CSS filter effects matrices
const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

fn saturate(image: &mut RgbaImage, s: f32) {
    let m = [
        [LUMA_R + (1.0 - LUMA_R) * s, LUMA_G * (1.0 - s), LUMA_B * (1.0 - s)],
        [LUMA_R * (1.0 - s), LUMA_G + (1.0 - LUMA_G) * s, LUMA_B * (1.0 - s)],
        [LUMA_R * (1.0 - s), LUMA_G * (1.0 - s), LUMA_B + (1.0 - LUMA_B) * s],
    ];
    apply_matrix(image, m);
}

fn hue_rotate(image: &mut RgbaImage, degrees: f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let m = [
        [
            LUMA_R + cos * (1.0 - LUMA_R) - sin * LUMA_R,
            LUMA_G - cos * LUMA_G - sin * LUMA_G,
            LUMA_B - cos * LUMA_B + sin * (1.0 - LUMA_B),
        ],
        [
            LUMA_R - cos * LUMA_R + sin * 0.143,
            LUMA_G + cos * (1.0 - LUMA_G) + sin * 0.140,
            LUMA_B - cos * LUMA_B - sin * 0.283,
        ],
        [
            LUMA_R - cos * LUMA_R - sin * (1.0 - LUMA_R),
            LUMA_G - cos * LUMA_G + sin * LUMA_G,
            LUMA_B + cos * (1.0 - LUMA_B) + sin * LUMA_B,
        ],
    ];
    apply_matrix(image, m);
}

fn apply_matrix(image: &mut RgbaImage, m: [[f32; 3]; 3]) {
    for_each_rgb(image, |r, g, b| {
        (
            m[0][0] * r + m[0][1] * g + m[0][2] * b,
            m[1][0] * r + m[1][1] * g + m[1][2] * b,
            m[2][0] * r + m[2][1] * g + m[2][2] * b,
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{FilterSettings, ImageData, ImageOptions};

    fn options_with(filters: FilterSettings) -> ImageOptions {
        let mut opts = ImageOptions::new(ImageData::solid(2, 2, [100, 150, 200, 255]));
        opts.filters = filters;
        opts
    }

    #[test]
    fn test_defaults_compose_to_empty() {
        let opts = options_with(FilterSettings::default());
        assert_eq!(compose(&opts), "");
    }

    #[test]
    fn test_integral_values_format_without_decimals() {
        let opts = options_with(FilterSettings {
            brightness: 2.0,
            ..FilterSettings::default()
        });
        assert_eq!(compose(&opts), "brightness(2)");
    }

    #[test]
    fn test_fragments_joined_in_key_order() {
        let opts = options_with(FilterSettings {
            color_invert: true,
            hue: 90.0,
            contrast: 1.5,
            ..FilterSettings::default()
        });
        assert_eq!(compose(&opts), "invert(1) hue-rotate(90deg) contrast(1.5)");
    }

    #[test]
    fn test_unknown_primitive_is_skipped() {
        let mut img = RgbaImage::from_pixel(1, 1, image::Rgba([10, 20, 30, 255]));
        apply_expression(&mut img, "sepia(1) nonsense brightness(1)");
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_invert_flips_channels() {
        let mut img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 255, 100, 128]));
        apply_expression(&mut img, "invert(1)");
        let [r, g, b, a] = img.get_pixel(0, 0).0;
        assert_eq!((r, g, b), (255, 0, 155));
        assert_eq!(a, 128);
    }

    #[test]
    fn test_brightness_scales_and_clamps() {
        let mut img = RgbaImage::from_pixel(1, 1, image::Rgba([100, 200, 0, 255]));
        apply_expression(&mut img, "brightness(2)");
        let [r, g, b, _] = img.get_pixel(0, 0).0;
        assert_eq!((r, g, b), (200, 255, 0));
    }

    #[test]
    fn test_grayscale_full_equalizes_channels() {
        let mut img = RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
        apply_expression(&mut img, "grayscale(1)");
        let [r, g, b, _] = img.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
        // Pure red collapses to its luminance share
        assert!((r as f32 - 0.213 * 255.0).abs() < 2.0);
    }

    #[test]
    fn test_hue_rotate_full_turn_is_identity() {
        let mut img = RgbaImage::from_pixel(1, 1, image::Rgba([80, 120, 200, 255]));
        apply_expression(&mut img, "hue-rotate(360deg)");
        let [r, g, b, _] = img.get_pixel(0, 0).0;
        assert!((r as i32 - 80).abs() <= 1);
        assert!((g as i32 - 120).abs() <= 1);
        assert!((b as i32 - 200).abs() <= 1);
    }

    #[test]
    fn test_contrast_pivot_is_mid_gray() {
        let mut img = RgbaImage::from_pixel(1, 1, image::Rgba([128, 128, 128, 255]));
        apply_expression(&mut img, "contrast(3)");
        let [r, _, _, _] = img.get_pixel(0, 0).0;
        assert!((r as i32 - 128).abs() <= 2);
    }
}
