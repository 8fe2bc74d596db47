//! Read-only snapshot of an open container menu.
//!
//! The host owns the real slots; sorting only inspects these copies and
//! answers with clicks addressed by [`Slot::id`].

use crate::item::ItemStack;
use serde::{Deserialize, Serialize};

/// The backing inventory a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerRef {
    /// The player's own inventory (main grid, hotbar, armor, offhand).
    Player,
    /// Any other container, tagged with a host-assigned identity.
    Other(u32),
}

impl ContainerRef {
    /// Whether this is the player's own inventory.
    pub fn is_player(self) -> bool {
        matches!(self, ContainerRef::Player)
    }
}

/// One slot of a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Position unique within the whole menu.
    pub id: usize,
    /// Position within the backing inventory.
    pub index: usize,
    /// Backing inventory.
    pub container: ContainerRef,
    /// Whether the slot accepts arbitrary items (false for output, armor and similar).
    #[serde(default = "default_true")]
    pub accepts_items: bool,
    /// Current content.
    #[serde(default)]
    pub stack: ItemStack,
}

fn default_true() -> bool {
    true
}

impl Slot {
    /// Create a slot holding `stack`.
    pub fn new(id: usize, index: usize, container: ContainerRef, stack: ItemStack) -> Self {
        Self {
            id,
            index,
            container,
            accepts_items: true,
            stack,
        }
    }

    /// Mark the slot as refusing generic items.
    pub fn restricted(mut self) -> Self {
        self.accepts_items = false;
        self
    }
}

/// All slots of an open menu at the moment a sort starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuSnapshot {
    /// Host menu id, echoed in clicks and remote sort messages.
    pub container_id: i32,
    /// Slots in id order.
    pub slots: Vec<Slot>,
}

impl MenuSnapshot {
    /// Create a snapshot. Slots are expected in id order.
    pub fn new(container_id: i32, slots: Vec<Slot>) -> Self {
        Self {
            container_id,
            slots,
        }
    }

    /// Look up a slot by menu id.
    pub fn slot(&self, id: usize) -> Option<&Slot> {
        self.slots.get(id).filter(|slot| slot.id == id).or_else(|| {
            self.slots.iter().find(|slot| slot.id == id)
        })
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the menu has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
