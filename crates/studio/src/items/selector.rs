//! Item selection: hit-tests the pointer ray against each placed
//! item's decal geometry.

use shared::ItemId;

use super::ItemManager;
use crate::viewport::picking::{hits_mesh, Ray};

/// First committed item (in insertion order) whose decal the ray
/// passes through. Previews in placement are never selectable.
pub fn pick_item<'a>(ray: &Ray, items: &'a ItemManager) -> Option<&'a ItemId> {
    items
        .iter()
        .find(|item| item.is_committed() && hits_mesh(ray, &item.geometry))
        .map(|item| &item.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::fonts::FontSet;
    use crate::fixtures::{quad_facing, test_font};
    use crate::items::Item;
    use glam::{Mat4, Vec3};
    use shared::{ContentOptions, FontStyle, ImageData, ImageOptions};

    fn item_at(x: f32) -> Item {
        let surface = quad_facing(Vec3::ZERO, 8.0, 8.0, Vec3::Z);
        let mut fonts = FontSet::default();
        fonts.register("Roboto", 400, FontStyle::Normal, test_font());
        let mut item = Item::new(
            ContentOptions::Image(ImageOptions::new(ImageData::solid(
                512,
                512,
                [0, 0, 0, 255],
            ))),
            Vec3::new(x, 0.0, 0.0),
            Vec3::Z,
            &surface,
            Mat4::IDENTITY,
            &fonts,
        )
        .unwrap();
        item.commit();
        item
    }

    fn ray_at(x: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, 0.0, 5.0),
            direction: Vec3::NEG_Z,
        }
    }

    #[test]
    fn test_picks_item_under_ray() {
        let mut items = ItemManager::default();
        let left = items.add(item_at(-2.0)).clone();
        let right = items.add(item_at(2.0)).clone();

        assert_eq!(pick_item(&ray_at(-2.0), &items), Some(&left));
        assert_eq!(pick_item(&ray_at(2.0), &items), Some(&right));
        assert_eq!(pick_item(&ray_at(0.0), &items), None);
    }

    #[test]
    fn test_uncommitted_preview_is_not_selectable() {
        let mut items = ItemManager::default();
        let surface = quad_facing(Vec3::ZERO, 8.0, 8.0, Vec3::Z);
        let mut fonts = FontSet::default();
        fonts.register("Roboto", 400, FontStyle::Normal, test_font());
        let preview = Item::new(
            ContentOptions::Image(ImageOptions::new(ImageData::solid(
                512,
                512,
                [0, 0, 0, 255],
            ))),
            Vec3::ZERO,
            Vec3::Z,
            &surface,
            Mat4::IDENTITY,
            &fonts,
        )
        .unwrap();
        items.add(preview);
        assert!(pick_item(&ray_at(0.0), &items).is_none());
    }

    #[test]
    fn test_empty_manager_picks_nothing() {
        let items = ItemManager::default();
        assert!(pick_item(&ray_at(0.0), &items).is_none());
    }
}
