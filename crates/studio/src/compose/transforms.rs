//! Image transform registry. Transforms rework the pixel buffer itself
//! (unlike filters, which only recolor it) and run after the filter pass.

use image::{imageops, RgbaImage};
use shared::ImageOptions;

/// One named transform applied to the composited canvas
pub trait Transform {
    fn apply(&self, canvas: &mut RgbaImage, options: &ImageOptions);
}

struct Flip;

impl Transform for Flip {
    fn apply(&self, canvas: &mut RgbaImage, options: &ImageOptions) {
        let flip = options.transforms.flip;
        if flip.x {
            imageops::flip_horizontal_in_place(canvas);
        }
        if flip.y {
            imageops::flip_vertical_in_place(canvas);
        }
    }
}

/// Lookup table from transform key to strategy, in application order
const REGISTRY: &[(&str, &dyn Transform)] = &[("flip", &Flip)];

pub fn lookup(key: &str) -> Option<&'static dyn Transform> {
    REGISTRY
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, t)| *t)
}

/// Run every registered transform over the canvas in key order
pub fn apply_all(canvas: &mut RgbaImage, options: &ImageOptions) {
    for key in options.transforms.keys() {
        if let Some(transform) = lookup(key) {
            transform.apply(canvas, options);
        }
    }
}
