//! Texture compositor: turns an item's content options into the RGBA
//! canvas that becomes its decal texture. Text goes through the glyph
//! rasterizer; images go through the filter and transform pipelines.

pub mod filters;
pub mod text;
pub mod transforms;

use std::fmt;

use image::RgbaImage;
use shared::{ContentOptions, ImageOptions, TextOptions};

use crate::assets::fonts::FontSet;

#[derive(Debug)]
pub enum ComposeError {
    /// Text items must carry at least one non-whitespace character
    EmptyText,
    /// The requested font family has no loaded variant
    FontNotLoaded(String),
    /// Source pixel buffer does not match its declared dimensions
    MalformedImage,
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::EmptyText => write!(f, "text content is empty"),
            ComposeError::FontNotLoaded(family) => write!(f, "font '{family}' is not loaded"),
            ComposeError::MalformedImage => write!(f, "image pixel buffer is malformed"),
        }
    }
}

impl std::error::Error for ComposeError {}

/// Render an item's canvas from its content options
pub fn render(content: &ContentOptions, fonts: &FontSet) -> Result<RgbaImage, ComposeError> {
    match content {
        ContentOptions::Text(options) => render_text(options, fonts),
        ContentOptions::Image(options) => render_image(options),
    }
}

fn render_text(options: &TextOptions, fonts: &FontSet) -> Result<RgbaImage, ComposeError> {
    if options.text.trim().is_empty() {
        return Err(ComposeError::EmptyText);
    }
    let font = fonts
        .select(&options.font_family, options.font_weight, options.font_style)
        .ok_or_else(|| ComposeError::FontNotLoaded(options.font_family.clone()))?;
    Ok(text::render_text(options, font))
}

/// Image pipeline: source pixels, then the composed filter expression,
/// then transforms over the filtered canvas.
fn render_image(options: &ImageOptions) -> Result<RgbaImage, ComposeError> {
    let src = &options.source;
    let mut canvas = RgbaImage::from_raw(src.width, src.height, src.pixels.clone())
        .ok_or(ComposeError::MalformedImage)?;

    let expression = filters::compose(options);
    if !expression.is_empty() {
        filters::apply_expression(&mut canvas, &expression);
    }
    transforms::apply_all(&mut canvas, options);

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_font;
    use shared::{FilterSettings, FontStyle, ImageData, TextOptions};

    fn fonts() -> FontSet {
        let mut set = FontSet::default();
        set.register("Roboto", 400, FontStyle::Normal, test_font());
        set
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let content = ContentOptions::Text(TextOptions {
            text: "   ".to_string(),
            ..TextOptions::default()
        });
        assert!(matches!(
            render(&content, &fonts()),
            Err(ComposeError::EmptyText)
        ));
    }

    #[test]
    fn test_unknown_font_is_rejected() {
        let content = ContentOptions::Text(TextOptions {
            text: "Hi".to_string(),
            font_family: "Comic Sans".to_string(),
            ..TextOptions::default()
        });
        assert!(matches!(
            render(&content, &fonts()),
            Err(ComposeError::FontNotLoaded(_))
        ));
    }

    #[test]
    fn test_text_renders_a_canvas() {
        let content = ContentOptions::Text(TextOptions {
            text: "Hi".to_string(),
            ..TextOptions::default()
        });
        let canvas = render(&content, &fonts()).unwrap();
        assert!(canvas.width() > 0 && canvas.height() > 0);
    }

    #[test]
    fn test_image_pipeline_applies_filters() {
        let mut options = shared::ImageOptions::new(ImageData::solid(2, 2, [100, 100, 100, 255]));
        options.filters = FilterSettings {
            brightness: 2.0,
            ..FilterSettings::default()
        };
        let canvas = render(&ContentOptions::Image(options), &fonts()).unwrap();
        assert_eq!(canvas.get_pixel(0, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_malformed_image_is_rejected() {
        let options = shared::ImageOptions::new(ImageData {
            width: 10,
            height: 10,
            pixels: vec![0; 16],
        });
        assert!(matches!(
            render(&ContentOptions::Image(options), &fonts()),
            Err(ComposeError::MalformedImage)
        ));
    }
}
