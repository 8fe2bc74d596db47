#![warn(missing_docs)]
//! Core data model shared across the workspace: item stacks, stack identity
//! keys, menu snapshots and the tie-break comparator.

pub mod comparison;
pub mod item;
pub mod matcher;
pub mod menu;

// Re-export commonly used types
pub use comparison::{cmp_ignore_case, compare_equal_items, rgb_to_hsb};
pub use item::{Components, ItemFlags, ItemId, ItemStack, DEFAULT_STACK_SIZE};
pub use matcher::StackMatcher;
pub use menu::{ContainerRef, MenuSnapshot, Slot};
