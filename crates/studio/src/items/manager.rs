//! Item collection: insertion-ordered, addressed by id.

use shared::ItemId;
use tracing::debug;

use super::Item;

#[derive(Default)]
pub struct ItemManager {
    items: Vec<Item>,
}

impl ItemManager {
    pub fn add(&mut self, item: Item) -> &ItemId {
        debug!(id = %item.id, kind = ?item.kind(), "item added");
        self.items.push(item);
        &self.items[self.items.len() - 1].id
    }

    /// Remove an item, returning it if it existed
    pub fn remove(&mut self, id: &str) -> Option<Item> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        debug!(id, "item removed");
        Some(self.items.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Item> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
