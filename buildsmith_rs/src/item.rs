use serde::{Deserialize, Serialize};

/// A single equippable item as the search engine sees it: a unique
/// identifier, a display name, and the total gold cost used for
/// downstream aggregation. Everything else about an item belongs to the
/// data-loading layer and never reaches the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub id: String,
    pub name: String,
    pub gold_total: u32,
}

impl ItemDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, gold_total: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gold_total,
        }
    }
}

/// Ordered pool of candidate items for one search run. The data layer
/// hands this over already deduplicated; the engine only indexes into it.
pub struct ItemPool {
    items: Vec<ItemDescriptor>,
}

impl ItemPool {
    pub fn new(items: Vec<ItemDescriptor>) -> Self {
        Self { items }
    }

    pub fn descriptors(&self) -> &[ItemDescriptor] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
