//! Model of the host's pickup-click rules, used to check click sequences
//! without a running game.
//!
//! A primary click picks up, places, merges into or swaps with the slot
//! depending on what is carried. Bundles absorb whatever they are clicked
//! onto with the primary button, which no sort should ever trigger, so the
//! model reports it as an error. A secondary click involving a bundle swaps.

use anyhow::{bail, Context, Result};
use clientsort_core::{ItemStack, MenuSnapshot};
use clientsort_net::{Click, MouseButton};

/// Slots by menu id plus the carried stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickModel {
    slots: Vec<ItemStack>,
    carried: ItemStack,
}

impl ClickModel {
    /// Model over `slots`, indexed by menu slot id, carrying nothing.
    pub fn new(slots: Vec<ItemStack>) -> Self {
        Self {
            slots,
            carried: ItemStack::empty(),
        }
    }

    /// Model over the contents of a menu. Slot ids must be dense from zero.
    pub fn from_menu(menu: &MenuSnapshot) -> Self {
        Self::new(menu.slots.iter().map(|slot| slot.stack.clone()).collect())
    }

    /// Current slot contents.
    pub fn slots(&self) -> &[ItemStack] {
        &self.slots
    }

    /// Current carried stack.
    pub fn carried(&self) -> &ItemStack {
        &self.carried
    }

    /// Apply one click.
    pub fn click(&mut self, click: &Click) -> Result<()> {
        let Some(slot) = self.slots.get_mut(click.slot_id) else {
            bail!("slot {} out of range ({} slots)", click.slot_id, self.slots.len());
        };
        let carried = &mut self.carried;

        match click.button {
            MouseButton::Primary => {
                if carried.is_empty() {
                    std::mem::swap(slot, carried);
                    return Ok(());
                }
                if slot.is_empty() {
                    std::mem::swap(slot, carried);
                    return Ok(());
                }
                if carried.is_bundle() || slot.is_bundle() {
                    bail!("bundle would absorb a stack at slot {}", click.slot_id);
                }
                if slot.is_same_item_same_components(carried) {
                    let moved = slot.remaining_space().min(carried.count);
                    *slot = slot.with_count(slot.count + moved);
                    *carried = carried.with_count(carried.count - moved);
                } else {
                    std::mem::swap(slot, carried);
                }
            }
            MouseButton::Secondary => {
                if !(carried.is_bundle() || slot.is_bundle()) {
                    bail!("unmodelled secondary click at slot {}", click.slot_id);
                }
                std::mem::swap(slot, carried);
            }
        }
        Ok(())
    }

    /// Apply clicks in order, stopping at the first rejected one.
    pub fn run<'a, I>(&mut self, clicks: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Click>,
    {
        for (step, click) in clicks.into_iter().enumerate() {
            self.click(click)
                .with_context(|| format!("click #{step} on slot {}", click.slot_id))?;
        }
        Ok(())
    }

    /// Contents of the given slots, in the given order.
    pub fn contents(&self, slot_ids: &[usize]) -> Vec<ItemStack> {
        slot_ids
            .iter()
            .map(|&id| self.slots.get(id).cloned().unwrap_or_default())
            .collect()
    }
}
