//! Item stack snapshots - identity, count and the auxiliary data sorting looks at

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw registry identifier of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    /// The "nothing" item carried by empty stacks.
    pub const AIR: Self = Self(0);
}

/// Maximum stack size for most items.
pub const DEFAULT_STACK_SIZE: u32 = 64;

/// Leather brown, the color of a dyeable item that was never dyed.
pub const DEFAULT_DYE_COLOR: u32 = 0xA0_65_40;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    /// Item properties the host reports alongside each stack.
    pub struct ItemFlags: u8 {
        /// Item can be dyed (leather armor and friends).
        const DYEABLE = 0b0000_0001;
        /// Item is a container item that absorbs other stacks on a primary click (bundles).
        const BUNDLE = 0b0000_0010;
        /// Item renders with an enchantment glint.
        const FOIL = 0b0000_0100;
    }
}

/// Opaque auxiliary data (tags/components) attached to a stack.
///
/// Two stacks only count as "the same stack" when their components match exactly.
pub type Components = BTreeMap<String, String>;

/// An immutable snapshot of one slot's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStack {
    /// Item identity.
    pub item: ItemId,
    /// Quantity in stack (0 for empty stacks).
    pub count: u32,
    /// Largest count this item can stack to.
    pub max_stack_size: u32,
    /// Default display name of the item.
    pub name: String,
    /// Player-assigned name, if renamed.
    pub custom_name: Option<String>,
    /// Descriptive text lines shown on hover.
    pub tooltip: Vec<String>,
    /// Dye color (RGB) for dyeable items.
    pub dye_color: Option<u32>,
    /// Accumulated damage (0 for undamaged or non-damageable items).
    pub damage: u32,
    /// Item properties.
    pub flags: ItemFlags,
    /// Auxiliary data compared for identity.
    pub components: Components,
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::empty()
    }
}

impl ItemStack {
    /// The empty stack.
    pub fn empty() -> Self {
        Self {
            item: ItemId::AIR,
            count: 0,
            max_stack_size: DEFAULT_STACK_SIZE,
            name: String::new(),
            custom_name: None,
            tooltip: Vec::new(),
            dye_color: None,
            damage: 0,
            flags: ItemFlags::empty(),
            components: Components::new(),
        }
    }

    /// Create a new stack of a plain item.
    pub fn new(item: ItemId, count: u32) -> Self {
        Self {
            item,
            count,
            ..Self::empty()
        }
    }

    /// Set the display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Rename the stack. The custom name is also recorded as a component.
    pub fn with_custom_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.components.insert("custom_name".into(), name.clone());
        self.custom_name = Some(name);
        self
    }

    /// Set the max stack size.
    pub fn with_max_stack_size(mut self, max: u32) -> Self {
        self.max_stack_size = max;
        self
    }

    /// Attach an auxiliary data entry.
    pub fn with_component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.insert(key.into(), value.into());
        self
    }

    /// Set the hover text lines.
    pub fn with_tooltip<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tooltip = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the item dyeable and dye it. The color is also recorded as a component.
    pub fn dyed(mut self, rgb: u32) -> Self {
        self.flags |= ItemFlags::DYEABLE;
        self.dye_color = Some(rgb & 0xFF_FF_FF);
        self.components
            .insert("dyed_color".into(), format!("{:06x}", rgb & 0xFF_FF_FF));
        self
    }

    /// Set accumulated damage. The damage is also recorded as a component.
    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self.components.insert("damage".into(), damage.to_string());
        self
    }

    /// Add item property flags.
    pub fn with_flags(mut self, flags: ItemFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Whether the slot holding this stack is effectively empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item == ItemId::AIR
    }

    /// Check if this stack is at max capacity.
    pub fn is_full(&self) -> bool {
        self.count >= self.max_stack_size
    }

    /// Get remaining space in this stack.
    pub fn remaining_space(&self) -> u32 {
        self.max_stack_size.saturating_sub(self.count)
    }

    /// Name shown to the player: the custom name if present, else the item name.
    pub fn display_name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether the player renamed this stack.
    pub fn has_custom_name(&self) -> bool {
        self.custom_name.is_some()
    }

    /// Dye color, falling back to the undyed default for dyeable items.
    pub fn dye_color_or_default(&self) -> u32 {
        self.dye_color.unwrap_or(DEFAULT_DYE_COLOR)
    }

    /// Whether this is a bundle-like container item.
    pub fn is_bundle(&self) -> bool {
        !self.is_empty() && self.flags.contains(ItemFlags::BUNDLE)
    }

    /// Same item, ignoring count and auxiliary data.
    pub fn is_same_item(&self, other: &ItemStack) -> bool {
        self.item == other.item
    }

    /// Same item and same auxiliary data, ignoring count.
    ///
    /// This is the identity used for merging: two stacks that pass can be
    /// combined into one.
    pub fn is_same_item_same_components(&self, other: &ItemStack) -> bool {
        self.item == other.item && self.components == other.components
    }

    /// Copy of this stack with a different count; zero yields the empty stack.
    pub fn with_count(&self, count: u32) -> ItemStack {
        if count == 0 {
            return ItemStack::empty();
        }
        ItemStack {
            count,
            ..self.clone()
        }
    }
}
