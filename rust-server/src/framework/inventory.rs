use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::ItemRegistry;
use crate::mission::Location;

// ============================================================================
// Slot Inventory
// ============================================================================

pub const DEFAULT_INVENTORY_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySlot {
    pub item: String,
    pub quantity: i32,
}

impl InventorySlot {
    pub fn new(item: &str, quantity: i32) -> Self {
        Self { item: item.to_string(), quantity }
    }
}

#[derive(Debug, Clone)]
pub struct SlotInventory {
    pub slots: Vec<Option<InventorySlot>>,
}

impl SlotInventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Free capacity for `item`, counting partial stacks and empty slots
    pub fn capacity_for(&self, item: &str, max_stack: i32) -> i32 {
        self.slots.iter().map(|slot| match slot {
            Some(s) if s.item == item => max_stack.saturating_sub(s.quantity).max(0),
            Some(_) => 0,
            None => max_stack,
        }).fold(0, i32::saturating_add)
    }

    /// Add all of `quantity` or nothing. Returns false when it doesn't fit.
    pub fn try_add(&mut self, item: &str, mut quantity: i32, registry: &ItemRegistry) -> bool {
        let max_stack = registry.max_stack(item);
        if quantity <= 0 || self.capacity_for(item, max_stack) < quantity {
            return false;
        }

        // Stack with existing items first
        for slot in self.slots.iter_mut().flatten() {
            if quantity <= 0 {
                break;
            }
            if slot.item == item {
                let add = quantity.min(max_stack.saturating_sub(slot.quantity));
                if add > 0 {
                    slot.quantity += add;
                    quantity -= add;
                }
            }
        }

        // Then fill empty slots
        for slot in &mut self.slots {
            if quantity <= 0 {
                break;
            }
            if slot.is_none() {
                let add = quantity.min(max_stack);
                *slot = Some(InventorySlot::new(item, add));
                quantity -= add;
            }
        }

        true
    }

    pub fn count(&self, item: &str) -> i32 {
        self.slots.iter().flatten()
            .filter(|s| s.item == item)
            .map(|s| s.quantity)
            .fold(0, i32::saturating_add)
    }

    /// Remove exactly `quantity` units, or nothing if the player holds fewer
    pub fn remove(&mut self, item: &str, mut quantity: i32) -> bool {
        if quantity <= 0 || self.count(item) < quantity {
            return false;
        }

        // Take from the last stacks first
        for slot in self.slots.iter_mut().rev() {
            if quantity <= 0 {
                break;
            }
            if let Some(s) = slot {
                if s.item == item {
                    let take = quantity.min(s.quantity);
                    s.quantity -= take;
                    quantity -= take;
                    if s.quantity <= 0 {
                        *slot = None;
                    }
                }
            }
        }

        true
    }
}

// ============================================================================
// World Drop (item placed in the world)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldDrop {
    pub id: String,
    pub item: String,
    pub quantity: i32,
    pub position: Location,
    /// Player whose reward overflowed
    pub owner_id: String,
    pub dropped_at: DateTime<Utc>,
}

impl WorldDrop {
    pub fn new(item: &str, quantity: i32, position: Location, owner_id: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            item: item.to_string(),
            quantity,
            position,
            owner_id: owner_id.to_string(),
            dropped_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, lifetime_secs: i64) -> bool {
        (now - self.dropped_at).num_seconds() >= lifetime_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::item_def::{ItemDefinition, RawItemDefinition};

    fn registry() -> ItemRegistry {
        let mut registry = ItemRegistry::new();
        let raw: RawItemDefinition = toml::from_str("display_name = \"Statue\"\nunique = true").unwrap();
        registry.insert("statue", ItemDefinition::from_raw("statue", &raw));
        let raw: RawItemDefinition = toml::from_str("max_stack = 5").unwrap();
        registry.insert("lockpick", ItemDefinition::from_raw("lockpick", &raw));
        registry
    }

    #[test]
    fn test_add_stacks_before_using_empty_slots() {
        let registry = registry();
        let mut inv = SlotInventory::new(3);
        assert!(inv.try_add("lockpick", 3, &registry));
        assert!(inv.try_add("lockpick", 4, &registry));
        assert_eq!(inv.count("lockpick"), 7);
        assert_eq!(inv.slots.iter().flatten().count(), 2);
    }

    #[test]
    fn test_add_is_all_or_nothing() {
        let registry = registry();
        let mut inv = SlotInventory::new(2);
        assert!(inv.try_add("statue", 1, &registry));
        assert!(inv.try_add("statue", 1, &registry));
        assert!(!inv.try_add("statue", 1, &registry));
        assert!(!inv.try_add("lockpick", 1, &registry));
        assert_eq!(inv.count("statue"), 2);
    }

    #[test]
    fn test_huge_stack_limit_does_not_overflow() {
        let mut registry = ItemRegistry::new();
        let raw: RawItemDefinition = toml::from_str("max_stack = 2147483647").unwrap();
        registry.insert("cash_roll", ItemDefinition::from_raw("cash_roll", &raw));

        let mut inv = SlotInventory::new(3);
        assert_eq!(inv.capacity_for("cash_roll", i32::MAX), i32::MAX);
        assert!(inv.try_add("cash_roll", 10, &registry));
        assert_eq!(inv.capacity_for("cash_roll", i32::MAX), i32::MAX);
        assert!(inv.try_add("cash_roll", i32::MAX - 10, &registry));
        assert_eq!(inv.count("cash_roll"), i32::MAX);
    }

    #[test]
    fn test_remove_requires_enough_units() {
        let registry = registry();
        let mut inv = SlotInventory::new(4);
        inv.try_add("lockpick", 6, &registry);
        assert!(!inv.remove("lockpick", 7));
        assert!(inv.remove("lockpick", 6));
        assert_eq!(inv.count("lockpick"), 0);
        assert!(inv.slots.iter().all(Option::is_none));
    }
}
