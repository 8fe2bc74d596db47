//! Client replay: turn a target permutation into pickup clicks.
//!
//! The host moves items with a single carried stack, so a permutation is
//! applied cycle by cycle: pick up the stack a target needs, click the
//! target to swap it in, then carry the displaced stack on to its own
//! target until the chain closes. A shadow copy of each slot's item kind
//! tracks what is carried so container items (bundles) can get the
//! secondary button where a primary click would make them absorb the stack.
//!
//! Input stacks must already be coalesced: at most one partial stack per
//! item identity. The merge rules below rely on it.

use crate::sound::PitchRamp;
use bitflags::bitflags;
use clientsort_core::ItemStack;
use clientsort_net::{Click, MouseButton};
use tracing::trace;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    struct SlotState: u8 {
        /// Holds its final content.
        const DONE = 0b01;
        /// Physically empty right now (originally empty, or picked up).
        const EMPTY = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Held {
    Air,
    Bundle,
    Item,
}

impl Held {
    fn of(stack: &ItemStack) -> Self {
        if stack.is_empty() {
            Held::Air
        } else if stack.is_bundle() {
            Held::Bundle
        } else {
            Held::Item
        }
    }
}

/// Whether no two partial stacks share an identity.
pub fn is_coalesced(stacks: &[ItemStack]) -> bool {
    let partials: Vec<&ItemStack> = stacks
        .iter()
        .filter(|stack| !stack.is_empty() && !stack.is_full())
        .collect();
    partials.iter().enumerate().all(|(i, a)| {
        partials[i + 1..]
            .iter()
            .all(|b| !a.is_same_item_same_components(b))
    })
}

/// Emits the click sequence realising a permutation over a working set.
///
/// Input must be coalesced (see [`is_coalesced`]); [`crate::coalesce`]
/// establishes that.
#[derive(Debug)]
pub struct ReplayEngine<'a> {
    container_id: i32,
    slot_ids: &'a [usize],
    stacks: &'a [ItemStack],
    bundle_secondary_click: bool,
    pitch: Option<PitchRamp>,
    clicks: Vec<Click>,
}

impl<'a> ReplayEngine<'a> {
    /// Engine over working-set `stacks`, whose menu slot ids are `slot_ids`.
    pub fn new(container_id: i32, slot_ids: &'a [usize], stacks: &'a [ItemStack]) -> Self {
        debug_assert_eq!(slot_ids.len(), stacks.len());
        debug_assert!(
            is_coalesced(stacks),
            "replay input holds two partial stacks of one item"
        );
        Self {
            container_id,
            slot_ids,
            stacks,
            bundle_secondary_click: true,
            pitch: None,
            clicks: Vec::new(),
        }
    }

    /// Use the secondary button for swaps involving a bundle.
    pub fn bundle_secondary_click(mut self, enabled: bool) -> Self {
        self.bundle_secondary_click = enabled;
        self
    }

    /// Attach a rising feedback pitch to every click.
    pub fn with_pitch(mut self, pitch: Option<PitchRamp>) -> Self {
        self.pitch = pitch;
        self
    }

    fn click(&mut self, position: usize, button: MouseButton) {
        let pitch = self.pitch.as_mut().map(PitchRamp::next_pitch);
        self.clicks.push(
            Click::primary(self.container_id, self.slot_ids[position])
                .with_button(button)
                .with_pitch(pitch),
        );
    }

    /// Clicks moving the stack at `permutation[i]` into position `i` for every `i`.
    pub fn replay(mut self, permutation: &[usize]) -> Vec<Click> {
        let stacks = self.stacks;
        let count = stacks.len();
        debug_assert_eq!(permutation.len(), count);

        let mut origin_to_target = vec![0; count];
        for (target, &origin) in permutation.iter().enumerate() {
            origin_to_target[origin] = target;
        }

        let mut state = vec![SlotState::empty(); count];
        for (position, slot_state) in state.iter_mut().enumerate() {
            if permutation[position] == position {
                slot_state.insert(SlotState::DONE);
            } else if stacks[position].is_empty() {
                slot_state.insert(SlotState::EMPTY);
            }
        }

        let mut backing: Vec<Held> = stacks.iter().map(Held::of).collect();
        let mut carried = Held::Air;

        for target in 0..count {
            if state[target].contains(SlotState::DONE) {
                continue;
            }
            let origin = permutation[target];
            if state[origin].contains(SlotState::EMPTY) {
                // Nothing to bring here; the current content leaves when its
                // own target is processed.
                state[target].insert(SlotState::DONE);
                continue;
            }

            std::mem::swap(&mut backing[origin], &mut carried);
            self.click(origin, MouseButton::Primary);
            state[origin].insert(SlotState::EMPTY);
            let working = origin;
            let mut current = &stacks[origin];
            let mut id = target;

            loop {
                let resident = &stacks[id];
                if !state[id].contains(SlotState::EMPTY)
                    && resident.is_same_item_same_components(current)
                {
                    if resident.count == current.count {
                        // Already holds an identical stack
                        state[id].insert(SlotState::DONE);
                        id = origin_to_target[id];
                        if state[id].contains(SlotState::DONE) {
                            break;
                        }
                        continue;
                    }
                    if current.count < resident.count {
                        // A partial stack clicked onto a full one of the same
                        // item does nothing, so shuttle through the empty
                        // working slot instead.
                        std::mem::swap(&mut backing[id], &mut carried);
                        for position in [working, id, working, id, working] {
                            self.click(position, MouseButton::Primary);
                        }
                        current = resident;
                        state[id].insert(SlotState::DONE);
                        id = origin_to_target[id];
                        if state[id].contains(SlotState::DONE) {
                            break;
                        }
                        continue;
                    }
                }

                let bundle_involved = (backing[id] == Held::Bundle && carried != Held::Air)
                    || (carried == Held::Bundle && backing[id] != Held::Air);
                let button = if self.bundle_secondary_click && bundle_involved {
                    MouseButton::Secondary
                } else {
                    MouseButton::Primary
                };
                self.click(id, button);
                std::mem::swap(&mut backing[id], &mut carried);
                current = resident;
                state[id].insert(SlotState::DONE);
                if state[id].contains(SlotState::EMPTY) {
                    // Deposited into an empty slot; nothing left to carry
                    break;
                }
                id = origin_to_target[id];
                if state[id].contains(SlotState::DONE) {
                    break;
                }
            }
        }

        trace!(clicks = self.clicks.len(), slots = count, "replay planned");
        self.clicks
    }
}
