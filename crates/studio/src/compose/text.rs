//! Text canvas renderer: rasterizes a [`TextOptions`] into an RGBA
//! canvas sized to fit the text plus padding and border.

use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont};
use image::{imageops, Rgba, RgbaImage};
use shared::{Color, TextOptions};

/// Measured extent of a text run at a given size
pub struct TextMetrics {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

impl TextMetrics {
    pub fn height(&self) -> f32 {
        self.ascent - self.descent
    }
}

/// Measure a text run: advance widths plus kerning, and the font's
/// vertical extents at the requested pixel size.
pub fn measure(font: &FontArc, text: &str, font_size: f32) -> TextMetrics {
    let scaled = font.as_scaled(PxScale::from(font_size));
    let mut width = 0.0;
    let mut prev = None;

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }

    TextMetrics {
        width,
        ascent: scaled.ascent(),
        descent: scaled.descent(),
    }
}

/// Render the text canvas: background fill, optional border frame,
/// glyphs on the baseline, then rotation and flips over the finished
/// buffer.
pub fn render_text(options: &TextOptions, font: &FontArc) -> RgbaImage {
    let metrics = measure(font, &options.text, options.font_size);
    let inset = options.border_width + options.padding_x;
    let inset_y = options.border_width + options.padding_y;

    let width = (metrics.width + inset * 2.0).ceil().max(1.0) as u32;
    let height = (metrics.height() + inset_y * 2.0).ceil().max(1.0) as u32;

    let mut canvas = RgbaImage::from_pixel(width, height, Rgba(options.background_color));

    if options.border_width > 0.0 {
        draw_border(&mut canvas, options.border_width, options.border_color);
    }

    draw_run(
        &mut canvas,
        font,
        &options.text,
        options.font_size,
        inset,
        inset_y + metrics.ascent,
        options.text_color,
    );

    if options.rotation != 0.0 {
        canvas = rotate(&canvas, options.rotation);
    }
    if options.flip.x {
        imageops::flip_horizontal_in_place(&mut canvas);
    }
    if options.flip.y {
        imageops::flip_vertical_in_place(&mut canvas);
    }

    canvas
}

fn draw_border(canvas: &mut RgbaImage, width: f32, color: Color) {
    let w = width.round().max(1.0) as u32;
    let (cw, ch) = canvas.dimensions();

    for y in 0..ch {
        for x in 0..cw {
            let edge = x < w || y < w || x >= cw.saturating_sub(w) || y >= ch.saturating_sub(w);
            if edge {
                canvas.put_pixel(x, y, Rgba(color));
            }
        }
    }
}

/// Lay out and draw a glyph run with its baseline at `(origin_x, baseline_y)`
fn draw_run(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    font_size: f32,
    origin_x: f32,
    baseline_y: f32,
    color: Color,
) {
    let scale = PxScale::from(font_size);
    let scaled = font.as_scaled(scale);
    let mut caret = origin_x;
    let mut prev = None;

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }

        let glyph = Glyph {
            id,
            scale,
            position: ab_glyph::point(caret, baseline_y),
        };
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                if x >= 0 && y >= 0 && (x as u32) < canvas.width() && (y as u32) < canvas.height() {
                    blend(canvas, x as u32, y as u32, color, coverage);
                }
            });
        }

        caret += scaled.h_advance(id);
        prev = Some(id);
    }
}

/// Source-over blend of `color` at `coverage` onto the canvas pixel
fn blend(canvas: &mut RgbaImage, x: u32, y: u32, color: Color, coverage: f32) {
    let coverage = coverage.clamp(0.0, 1.0) * color[3] as f32 / 255.0;
    let dst = canvas.get_pixel_mut(x, y);
    for c in 0..3 {
        let s = color[c] as f32;
        let d = dst.0[c] as f32;
        dst.0[c] = (s * coverage + d * (1.0 - coverage)).round() as u8;
    }
    let da = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((coverage + da * (1.0 - coverage)) * 255.0).round() as u8;
}

/// Rotate the canvas about its center by `degrees`, growing the output
/// to the rotated bounding box. Uncovered corners stay transparent.
fn rotate(canvas: &RgbaImage, degrees: f32) -> RgbaImage {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);

    let out_w = (w * cos.abs() + h * sin.abs()).ceil().max(1.0) as u32;
    let out_h = (w * sin.abs() + h * cos.abs()).ceil().max(1.0) as u32;

    let (cx, cy) = (w * 0.5, h * 0.5);
    let (ocx, ocy) = (out_w as f32 * 0.5, out_h as f32 * 0.5);

    let mut out = RgbaImage::new(out_w, out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            // Inverse rotation back into source space
            let dx = x as f32 + 0.5 - ocx;
            let dy = y as f32 + 0.5 - ocy;
            let sx = dx * cos + dy * sin + cx;
            let sy = -dx * sin + dy * cos + cy;
            if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                out.put_pixel(x, y, *canvas.get_pixel(sx as u32, sy as u32));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test_font;
    use shared::{COLOR_BLACK, COLOR_WHITE};

    fn options(text: &str) -> TextOptions {
        TextOptions {
            text: text.to_string(),
            font_size: 32.0,
            text_color: COLOR_BLACK,
            background_color: COLOR_WHITE,
            ..TextOptions::default()
        }
    }

    #[test]
    fn test_measure_grows_with_text() {
        let font = test_font();
        let short = measure(&font, "Hi", 32.0);
        let long = measure(&font, "Hello there", 32.0);
        assert!(long.width > short.width);
        assert!(short.ascent > 0.0);
        assert!(short.descent < 0.0);
    }

    #[test]
    fn test_canvas_includes_padding() {
        let font = test_font();
        let mut opts = options("Hello");
        let bare = render_text(&opts, &font);

        opts.padding_x = 10.0;
        opts.padding_y = 6.0;
        let padded = render_text(&opts, &font);

        assert_eq!(padded.width(), bare.width() + 20);
        assert_eq!(padded.height(), bare.height() + 12);
    }

    #[test]
    fn test_glyphs_darken_the_background() {
        let font = test_font();
        let canvas = render_text(&options("Hello"), &font);
        let dark = canvas.pixels().filter(|p| p.0[0] < 128).count();
        assert!(dark > 0, "expected ink on the canvas");
    }

    #[test]
    fn test_border_frames_the_canvas() {
        let font = test_font();
        let mut opts = options("Hi");
        opts.border_width = 3.0;
        opts.border_color = [255, 0, 0, 255];
        let canvas = render_text(&opts, &font);

        assert_eq!(canvas.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(
            canvas.get_pixel(canvas.width() - 1, canvas.height() - 1).0,
            [255, 0, 0, 255]
        );
        // Interior stays background
        let mid = canvas.get_pixel(canvas.width() / 2, canvas.height() / 2);
        assert_ne!(mid.0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_rotation_grows_bounding_box() {
        let font = test_font();
        let mut opts = options("Hello world");
        let flat = render_text(&opts, &font);

        opts.rotation = 45.0;
        let rotated = render_text(&opts, &font);
        assert!(rotated.height() > flat.height());
        // Corners outside the rotated rect are transparent
        assert_eq!(rotated.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions() {
        let font = test_font();
        let mut opts = options("Hello world");
        let flat = render_text(&opts, &font);

        opts.rotation = 90.0;
        let rotated = render_text(&opts, &font);
        assert!((rotated.width() as i32 - flat.height() as i32).abs() <= 1);
        assert!((rotated.height() as i32 - flat.width() as i32).abs() <= 1);
    }
}
