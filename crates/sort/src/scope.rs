//! Slot scope resolution: which slots sort together.

use crate::options::{ExtraSlotScope, HotbarScope, SortOptions};
use clientsort_core::{ContainerRef, Slot};

/// Inventory indices below this are the player's hotbar.
pub const HOTBAR_SIZE: usize = 9;
/// Inventory indices from here on are extra slots (offhand and beyond).
pub const FIRST_EXTRA_INDEX: usize = 40;

/// Group a slot belongs to for one sort. Slots sort together only when their
/// scopes are equal and not [`Scope::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Main grid of the player inventory.
    Primary,
    /// Player hotbar.
    Hotbar,
    /// Player extra slots (offhand).
    Extra,
    /// Slots of another container.
    Foreign(u32),
    /// Never sorted.
    Invalid,
}

impl Scope {
    /// Whether slots of this scope can take part in a sort.
    pub fn is_valid(self) -> bool {
        self != Scope::Invalid
    }
}

/// Kind of screen the menu is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenKind {
    /// Any regular container screen.
    #[default]
    Standard,
    /// Creative inventory. With `inventory_open` false only the hotbar is
    /// visible and the host drops armor and crafting slots from the menu, so
    /// remote slot ids sit 9 lower than on the server.
    Creative {
        /// The full survival inventory tab is showing.
        inventory_open: bool,
    },
}

/// Classifies slots per the grouping settings and the screen in use.
#[derive(Debug, Clone, Copy)]
pub struct ScopeResolver {
    hotbar: HotbarScope,
    extra: ExtraSlotScope,
    screen: ScreenKind,
}

impl ScopeResolver {
    /// Resolver for `screen` using the grouping settings in `options`.
    pub fn new(options: &SortOptions, screen: ScreenKind) -> Self {
        Self {
            hotbar: options.hotbar_scope,
            extra: options.extra_slot_scope,
            screen,
        }
    }

    /// Scope of `slot`.
    pub fn scope(&self, slot: &Slot) -> Scope {
        if let ScreenKind::Creative {
            inventory_open: false,
        } = self.screen
        {
            return self.collapsed_scope(slot);
        }

        if !slot.accepts_items {
            return Scope::Invalid;
        }
        match slot.container {
            ContainerRef::Other(container) => Scope::Foreign(container),
            ContainerRef::Player if slot.index < HOTBAR_SIZE => self.hotbar_scope(),
            ContainerRef::Player if slot.index >= FIRST_EXTRA_INDEX => match self.extra {
                ExtraSlotScope::Extra => Scope::Extra,
                ExtraSlotScope::Hotbar => self.hotbar_scope(),
                ExtraSlotScope::Inventory => Scope::Primary,
                ExtraSlotScope::None => Scope::Invalid,
            },
            ContainerRef::Player => Scope::Primary,
        }
    }

    fn hotbar_scope(&self) -> Scope {
        match self.hotbar {
            HotbarScope::Hotbar => Scope::Hotbar,
            HotbarScope::Inventory => Scope::Primary,
            HotbarScope::None => Scope::Invalid,
        }
    }

    // Only the hotbar is visible; it is the one group that can sort.
    fn collapsed_scope(&self, slot: &Slot) -> Scope {
        let hotbar_slot = slot.accepts_items
            && slot.container.is_player()
            && slot.index < HOTBAR_SIZE;
        if hotbar_slot && self.hotbar != HotbarScope::None {
            Scope::Hotbar
        } else {
            Scope::Invalid
        }
    }

    /// Shift client slot ids into the server's numbering before a remote sort.
    pub fn translate_mapping(&self, mapping: &mut [i32]) {
        if let ScreenKind::Creative {
            inventory_open: false,
        } = self.screen
        {
            for id in mapping.iter_mut() {
                *id -= HOTBAR_SIZE as i32;
            }
        }
    }
}
