//! The canonical item collection.

use std::collections::BTreeSet;

use skein_core::Item;

/// A count change reported by an inventory mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChange {
    /// Technical id as stored in the inventory.
    pub technical_id: String,
    /// Count after the change. Zero means the stack was removed.
    pub count: u32,
}

/// Ordered item stacks keyed by technical id (ASCII case-insensitive).
///
/// Stacks keep insertion order. A stack whose count drops to zero is removed.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    items: Vec<Item>,
    unique_ids: BTreeSet<String>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty inventory that treats the given ids as unique items.
    pub fn with_unique_items<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            items: Vec::new(),
            unique_ids: ids
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether an id names a unique item kind.
    pub fn is_unique(&self, technical_id: &str) -> bool {
        self.unique_ids.contains(&technical_id.to_ascii_lowercase())
    }

    /// Add `count` of an item. Unique items never exceed one.
    ///
    /// Returns the change, or `None` when nothing changed (empty id, zero
    /// count, or a unique item already held).
    pub fn add(&mut self, technical_id: &str, count: u32) -> Option<ItemChange> {
        if technical_id.is_empty() || count == 0 {
            return None;
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.matches(technical_id)) {
            let before = item.count;
            item.set_count(before.saturating_add(count));
            if item.count == before {
                return None;
            }
            return Some(ItemChange {
                technical_id: item.technical_id.clone(),
                count: item.count,
            });
        }

        let item = Item::new(technical_id, count, self.is_unique(technical_id));
        let change = ItemChange {
            technical_id: item.technical_id.clone(),
            count: item.count,
        };
        self.items.push(item);
        Some(change)
    }

    /// Remove `count` of an item, dropping the stack when it reaches zero.
    ///
    /// Returns `None` when the item is not held or `count` is zero.
    pub fn remove(&mut self, technical_id: &str, count: u32) -> Option<ItemChange> {
        if count == 0 {
            return None;
        }
        let pos = self.items.iter().position(|i| i.matches(technical_id))?;
        let item = &mut self.items[pos];
        let remaining = item.count.saturating_sub(count);
        let technical_id = item.technical_id.clone();
        if remaining == 0 {
            self.items.remove(pos);
        } else {
            item.set_count(remaining);
        }
        Some(ItemChange {
            technical_id,
            count: remaining,
        })
    }

    /// Remove every stack. Returns the ids that were held.
    pub fn clear(&mut self) -> Vec<String> {
        self.items.drain(..).map(|i| i.technical_id).collect()
    }

    /// Whether any of the item is held.
    pub fn contains(&self, technical_id: &str) -> bool {
        self.items.iter().any(|i| i.matches(technical_id))
    }

    /// How many of the item are held.
    pub fn count(&self, technical_id: &str) -> u32 {
        self.items
            .iter()
            .find(|i| i.matches(technical_id))
            .map_or(0, |i| i.count)
    }

    /// All stacks, in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Owned copies of all stacks.
    pub fn snapshot(&self) -> Vec<Item> {
        self.items.clone()
    }

    /// Number of distinct stacks.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the inventory holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn stackable_items_accumulate() {
        let mut inv = Inventory::new();
        inv.add("Torch", 1);
        inv.add("Torch", 1);
        assert_eq!(inv.count("Torch"), 2);
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn unique_items_clamp_to_one() {
        let mut inv = Inventory::with_unique_items(["Artefact"]);
        assert!(inv.add("Artefact", 1).is_some());
        assert!(inv.add("Artefact", 1).is_none());
        assert_eq!(inv.count("Artefact"), 1);
    }

    #[test]
    fn unique_insert_clamps_large_count() {
        let mut inv = Inventory::with_unique_items(["artefact"]);
        let change = inv.add("Artefact", 5).unwrap();
        assert_eq!(change.count, 1);
    }

    #[test]
    fn empty_id_is_ignored() {
        let mut inv = Inventory::new();
        assert!(inv.add("", 3).is_none());
        assert!(inv.is_empty());
    }

    #[test]
    fn keys_are_case_insensitive() {
        let mut inv = Inventory::new();
        inv.add("Torch", 1);
        inv.add("TORCH", 2);
        assert_eq!(inv.count("torch"), 3);
        assert_eq!(inv.items()[0].technical_id, "Torch");
    }

    #[test]
    fn remove_drops_empty_stack() {
        let mut inv = Inventory::new();
        inv.add("Torch", 2);
        let change = inv.remove("Torch", 5).unwrap();
        assert_eq!(change.count, 0);
        assert!(!inv.contains("Torch"));
        assert!(inv.remove("Torch", 1).is_none());
    }

    #[test]
    fn remove_partial() {
        let mut inv = Inventory::new();
        inv.add("Coin", 5);
        inv.remove("coin", 2);
        assert_eq!(inv.count("Coin"), 3);
    }

    #[test]
    fn clear_reports_held_ids_in_order() {
        let mut inv = Inventory::new();
        inv.add("Torch", 1);
        inv.add("Rope", 1);
        assert_eq!(inv.clear(), vec!["Torch".to_string(), "Rope".to_string()]);
        assert!(inv.is_empty());
    }

    proptest! {
        #[test]
        fn unique_count_never_exceeds_one(adds in proptest::collection::vec(1u32..50, 1..20)) {
            let mut inv = Inventory::with_unique_items(["Artefact"]);
            for n in adds {
                inv.add("Artefact", n);
                prop_assert!(inv.count("Artefact") <= 1);
            }
            prop_assert_eq!(inv.count("Artefact"), 1);
        }

        #[test]
        fn no_zero_count_stacks(ops in proptest::collection::vec((any::<bool>(), 0u32..5), 0..40)) {
            let mut inv = Inventory::new();
            for (add, n) in ops {
                if add { inv.add("Torch", n); } else { inv.remove("Torch", n); }
                prop_assert!(inv.items().iter().all(|i| i.count > 0));
            }
        }
    }
}
