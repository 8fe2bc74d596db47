//! Validation and application of remote sort requests.
//!
//! A request is a flat list of `(origin, destination)` slot id pairs. It is
//! applied only if it describes a closed permutation over slots of one
//! backing container that the player may take from and place into. Any
//! violation rejects the whole request and leaves the menu untouched.

use clientsort_core::{ContainerRef, ItemStack, MenuSnapshot};
use clientsort_net::{decode_client_message, ClientMessage, SortPayload};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Server-side view of an open menu.
pub trait ServerMenu {
    /// Menu id clients address it by.
    fn container_id(&self) -> i32;

    /// Number of slots.
    fn slot_count(&self) -> usize;

    /// Backing container of `slot`.
    fn container_of(&self, slot: usize) -> ContainerRef;

    /// Current content of `slot`.
    fn stack(&self, slot: usize) -> ItemStack;

    /// Whether the player may take from `slot`.
    fn may_pickup(&self, slot: usize) -> bool;

    /// Whether `slot` accepts `stack`.
    fn may_place(&self, slot: usize, stack: &ItemStack) -> bool;

    /// Replace the content of `slot`.
    fn set_stack(&mut self, slot: usize, stack: ItemStack);
}

impl ServerMenu for MenuSnapshot {
    fn container_id(&self) -> i32 {
        self.container_id
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn container_of(&self, slot: usize) -> ContainerRef {
        self.slots[slot].container
    }

    fn stack(&self, slot: usize) -> ItemStack {
        self.slots[slot].stack.clone()
    }

    fn may_pickup(&self, _slot: usize) -> bool {
        true
    }

    fn may_place(&self, slot: usize, stack: &ItemStack) -> bool {
        self.slots[slot].accepts_items || stack.is_empty()
    }

    fn set_stack(&mut self, slot: usize, stack: ItemStack) {
        self.slots[slot].stack = stack;
    }
}

/// Why a slot mapping was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// An origin is missing its destination.
    #[error("slot mapping has odd length {0}")]
    OddLength(usize),
    /// Fewer than two pairs.
    #[error("slot mapping has too few entries ({0})")]
    TooFewEntries(usize),
    /// A slot id outside the menu.
    #[error("slot {slot} out of bounds for {len} slots")]
    OutOfRange {
        /// Offending id.
        slot: i32,
        /// Number of slots in the menu.
        len: usize,
    },
    /// A slot backed by another container than the first slot.
    #[error("slot {0} belongs to a different container")]
    ForeignSlot(i32),
    /// An origin listed twice.
    #[error("duplicate origin slot {0}")]
    DuplicateOrigin(i32),
    /// A destination that is not also an origin, or is listed twice.
    #[error("destination slot {0} is not a requested origin")]
    DestinationWithoutOrigin(i32),
    /// The player may not take from an origin.
    #[error("slot {0} does not allow taking items")]
    MayNotPickup(i32),
    /// A destination refuses its incoming stack.
    #[error("slot {0} does not accept the origin stack")]
    MayNotPlace(i32),
}

fn slot_index(menu: &dyn ServerMenu, slot: i32) -> Result<usize, MappingError> {
    usize::try_from(slot)
        .ok()
        .filter(|&index| index < menu.slot_count())
        .ok_or(MappingError::OutOfRange {
            slot,
            len: menu.slot_count(),
        })
}

fn same_container(
    menu: &dyn ServerMenu,
    slot: i32,
    container: ContainerRef,
) -> Result<usize, MappingError> {
    let index = slot_index(menu, slot)?;
    if menu.container_of(index) != container {
        return Err(MappingError::ForeignSlot(slot));
    }
    Ok(index)
}

/// Check `mapping` against `menu` without touching it.
pub fn validate_mapping(menu: &dyn ServerMenu, mapping: &[i32]) -> Result<(), MappingError> {
    if mapping.len() % 2 != 0 {
        return Err(MappingError::OddLength(mapping.len()));
    }
    if mapping.len() < 4 {
        return Err(MappingError::TooFewEntries(mapping.len()));
    }

    let container = menu.container_of(slot_index(menu, mapping[0])?);
    let mut requested = BTreeSet::new();

    for pair in mapping.chunks_exact(2) {
        let (origin, destination) = (pair[0], pair[1]);
        let origin_index = same_container(menu, origin, container)?;
        if !requested.insert(origin) {
            return Err(MappingError::DuplicateOrigin(origin));
        }
        let destination_index = same_container(menu, destination, container)?;
        if origin == destination {
            continue;
        }
        if !menu.may_pickup(origin_index) {
            return Err(MappingError::MayNotPickup(origin));
        }
        if !menu.may_place(destination_index, &menu.stack(origin_index)) {
            return Err(MappingError::MayNotPlace(destination));
        }
    }

    for pair in mapping.chunks_exact(2) {
        if !requested.remove(&pair[1]) {
            return Err(MappingError::DestinationWithoutOrigin(pair[1]));
        }
    }
    Ok(())
}

/// Validate `mapping` and move every origin's stack to its destination.
///
/// Returns the number of pairs applied.
pub fn apply_mapping(menu: &mut dyn ServerMenu, mapping: &[i32]) -> Result<usize, MappingError> {
    validate_mapping(&*menu, mapping)?;

    let moves: Vec<(usize, ItemStack)> = mapping
        .chunks_exact(2)
        .map(|pair| {
            let origin = slot_index(&*menu, pair[0])?;
            let destination = slot_index(&*menu, pair[1])?;
            Ok((destination, menu.stack(origin)))
        })
        .collect::<Result<_, MappingError>>()?;

    let count = moves.len();
    for (destination, stack) in moves {
        menu.set_stack(destination, stack);
    }
    Ok(count)
}

/// Result of handling one sort request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOutcome {
    /// The permutation was applied; carries the number of pairs.
    Applied(usize),
    /// The request named neither the player's inventory nor the open menu.
    UnknownMenu,
    /// The mapping was refused.
    Rejected(MappingError),
}

/// Menus a player can address with a sort request.
pub struct PlayerMenus<'a> {
    /// The player's own inventory menu, always present.
    pub inventory: &'a mut dyn ServerMenu,
    /// Any other menu the player has open.
    pub open: Option<&'a mut dyn ServerMenu>,
}

impl PlayerMenus<'_> {
    fn target(&mut self, container_id: i32) -> Option<&mut dyn ServerMenu> {
        if self.inventory.container_id() == container_id {
            return Some(&mut *self.inventory);
        }
        match self.open.as_deref_mut() {
            Some(menu) if menu.container_id() == container_id => Some(menu),
            _ => None,
        }
    }
}

/// Apply a sort request from `player` to whichever of their menus it names.
///
/// Refusals are logged and reported, never sent back to the client.
pub fn handle_sort_payload(
    player: &str,
    payload: &SortPayload,
    menus: &mut PlayerMenus<'_>,
) -> SortOutcome {
    let Some(menu) = menus.target(payload.container_id) else {
        warn!(
            player,
            container_id = payload.container_id,
            "Sort request for a menu the player does not have open, ignoring"
        );
        return SortOutcome::UnknownMenu;
    };

    match apply_mapping(menu, &payload.slot_mapping) {
        Ok(moved) => {
            debug!(player, container_id = payload.container_id, moved, "Applied sort request");
            SortOutcome::Applied(moved)
        }
        Err(err) => {
            warn!(player, error = %err, "Sort request contains invalid data, ignoring");
            SortOutcome::Rejected(err)
        }
    }
}

/// Decode a framed client message and handle it.
pub fn handle_frame(
    player: &str,
    frame: &[u8],
    menus: &mut PlayerMenus<'_>,
) -> anyhow::Result<SortOutcome> {
    match decode_client_message(frame)? {
        ClientMessage::ReorderInventory(payload) => {
            Ok(handle_sort_payload(player, &payload, menus))
        }
    }
}
