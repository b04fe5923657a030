use serde::{Deserialize, Serialize};

/// A stack of one item kind held in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Technical identifier, the key shared with the narrative engine.
    pub technical_id: String,
    /// How many are held. Never negative; zero-count stacks are not kept.
    pub count: u32,
    /// Unique items are held at most once.
    pub is_unique: bool,
}

impl Item {
    /// Create a stack, clamping the count for unique items.
    pub fn new(technical_id: impl Into<String>, count: u32, is_unique: bool) -> Self {
        let mut item = Self {
            technical_id: technical_id.into(),
            count: 0,
            is_unique,
        };
        item.set_count(count);
        item
    }

    /// Set the count, clamped to `0..=1` for unique items.
    pub fn set_count(&mut self, count: u32) {
        self.count = if self.is_unique { count.min(1) } else { count };
    }

    /// Whether this stack is keyed by `id` (ASCII case-insensitive).
    pub fn matches(&self, id: &str) -> bool {
        self.technical_id.eq_ignore_ascii_case(id)
    }
}
