//! Lock providers that can veto a slot's participation in a sort.

use clientsort_core::Slot;
use std::collections::HashSet;

/// External collaborator reporting locked slots.
pub trait SlotLocks: Send + Sync {
    /// Whether `slot` must be left alone.
    fn is_locked(&self, slot: &Slot) -> bool;
}

/// No lock provider installed: nothing is locked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocks;

impl SlotLocks for NoLocks {
    fn is_locked(&self, _slot: &Slot) -> bool {
        false
    }
}

/// Locks recorded in the item-locks layout, where the main grid comes first
/// (0..=26) and the hotbar follows (27..=35). Only player inventory slots
/// can be locked, and a held bypass key disables every lock.
#[derive(Debug, Clone, Default)]
pub struct InventoryLocks {
    locked: HashSet<usize>,
    bypass: bool,
}

impl InventoryLocks {
    /// Locks at the given raw indices.
    pub fn new<I: IntoIterator<Item = usize>>(locked: I) -> Self {
        Self {
            locked: locked.into_iter().collect(),
            bypass: false,
        }
    }

    /// Set whether the bypass key is held.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    /// Map a player inventory index to the raw lock index.
    pub fn raw_index(inventory_index: usize) -> usize {
        match inventory_index {
            0..=8 => inventory_index + 27,
            9..=35 => inventory_index - 9,
            _ => inventory_index,
        }
    }
}

impl SlotLocks for InventoryLocks {
    fn is_locked(&self, slot: &Slot) -> bool {
        slot.container.is_player()
            && !self.bypass
            && self.locked.contains(&Self::raw_index(slot.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientsort_core::{ContainerRef, ItemStack};

    fn player(index: usize) -> Slot {
        Slot::new(0, index, ContainerRef::Player, ItemStack::empty())
    }

    #[test]
    fn test_raw_index_remap() {
        assert_eq!(InventoryLocks::raw_index(0), 27);
        assert_eq!(InventoryLocks::raw_index(8), 35);
        assert_eq!(InventoryLocks::raw_index(9), 0);
        assert_eq!(InventoryLocks::raw_index(35), 26);
        assert_eq!(InventoryLocks::raw_index(40), 40);
    }

    #[test]
    fn test_locked_slots() {
        let mut locks = InventoryLocks::new([27, 0]);
        assert!(locks.is_locked(&player(0)));
        assert!(locks.is_locked(&player(9)));
        assert!(!locks.is_locked(&player(1)));

        let chest = Slot::new(0, 0, ContainerRef::Other(1), ItemStack::empty());
        assert!(!locks.is_locked(&chest));

        locks.set_bypass(true);
        assert!(!locks.is_locked(&player(0)));
    }

    #[test]
    fn test_no_locks() {
        assert!(!NoLocks.is_locked(&player(0)));
    }
}
