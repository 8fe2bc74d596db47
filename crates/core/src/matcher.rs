//! Hashable stack identity keys.

use crate::item::{Components, ItemId, ItemStack};

/// A lookup key identifying stacks either exactly (item + components) or by
/// item alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackMatcher {
    item: ItemId,
    components: Option<Components>,
}

impl StackMatcher {
    /// Key matching the item and its exact auxiliary data.
    pub fn exact(stack: &ItemStack) -> Self {
        Self {
            item: stack.item,
            components: Some(stack.components.clone()),
        }
    }

    /// Key matching the item regardless of auxiliary data.
    pub fn ignore_components(stack: &ItemStack) -> Self {
        Self {
            item: stack.item,
            components: None,
        }
    }

    /// Whether `stack` is covered by this key.
    pub fn matches(&self, stack: &ItemStack) -> bool {
        self.item == stack.item
            && self
                .components
                .as_ref()
                .map_or(true, |components| *components == stack.components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_exact_and_plain_keys_differ() {
        let stack = ItemStack::new(ItemId(4), 1).with_component("enchantments", "sharpness:5");
        let exact = StackMatcher::exact(&stack);
        let plain = StackMatcher::ignore_components(&stack);
        assert_ne!(exact, plain);

        let mut keys = HashSet::new();
        keys.insert(exact.clone());
        keys.insert(plain.clone());
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_matching_rules() {
        let enchanted = ItemStack::new(ItemId(4), 1).with_component("enchantments", "sharpness:5");
        let plain_sword = ItemStack::new(ItemId(4), 1);

        assert!(StackMatcher::exact(&enchanted).matches(&enchanted));
        assert!(!StackMatcher::exact(&enchanted).matches(&plain_sword));
        assert!(StackMatcher::ignore_components(&enchanted).matches(&plain_sword));
        assert!(!StackMatcher::ignore_components(&enchanted).matches(&ItemStack::new(ItemId(5), 1)));
    }

    #[test]
    fn test_count_does_not_affect_keys() {
        let a = ItemStack::new(ItemId(1), 1);
        let b = ItemStack::new(ItemId(1), 64);
        assert_eq!(StackMatcher::exact(&a), StackMatcher::exact(&b));
    }
}
