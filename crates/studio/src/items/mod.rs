pub mod item;
pub mod manager;
pub mod selector;

pub use item::Item;
pub use manager::ItemManager;
