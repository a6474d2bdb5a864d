//! Font registry: families with their weight/style variants, with
//! closest-variant selection for the text compositor.

use std::collections::HashMap;

use ab_glyph::FontArc;
use shared::FontStyle;

use super::AssetError;

/// One loaded variant of a family
pub struct FontVariant {
    pub weight: u16,
    pub style: FontStyle,
    pub font: FontArc,
}

/// Loaded fonts, keyed by family name
#[derive(Default)]
pub struct FontSet {
    families: HashMap<String, Vec<FontVariant>>,
}

impl FontSet {
    /// Parse font bytes and register them under a family
    pub fn register_bytes(
        &mut self,
        family: &str,
        weight: u16,
        style: FontStyle,
        bytes: Vec<u8>,
    ) -> Result<(), AssetError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| AssetError::FontParse(family.to_string(), e.to_string()))?;
        self.register(family, weight, style, font);
        Ok(())
    }

    pub fn register(&mut self, family: &str, weight: u16, style: FontStyle, font: FontArc) {
        self.families
            .entry(family.to_string())
            .or_default()
            .push(FontVariant {
                weight,
                style,
                font,
            });
    }

    /// Pick the best variant of a family: style matches beat weight
    /// proximity, ties resolve to the closest weight.
    pub fn select(&self, family: &str, weight: u16, style: FontStyle) -> Option<&FontArc> {
        let variants = self.families.get(family)?;
        variants
            .iter()
            .min_by_key(|v| {
                let style_penalty = if v.style == style { 0 } else { 1000 };
                style_penalty + (v.weight as i32 - weight as i32).unsigned_abs() as i32
            })
            .map(|v| &v.font)
    }

    /// Registered family names, sorted for stable UI listings
    pub fn families(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.families.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
