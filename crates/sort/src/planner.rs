//! Sort planning: working set selection, coalescing, ordering and dispatch
//! choice.

use crate::catalog::CatalogPositions;
use crate::locks::{NoLocks, SlotLocks};
use crate::options::SortOptions;
use crate::order::SortOrder;
use crate::replay::ReplayEngine;
use crate::scope::{Scope, ScopeResolver, ScreenKind};
use crate::sound::{estimate_clicks, PitchRamp};
use clientsort_core::{ItemStack, MenuSnapshot};
use clientsort_net::{Click, InteractionEvent, QueuedEvent, SortPayload, TriggerKind, Waiter};
use std::sync::Arc;
use tracing::{debug, trace};

/// Menu state a sort is planned against.
#[derive(Debug, Clone, Copy)]
pub struct SortContext<'a> {
    /// Open menu.
    pub menu: &'a MenuSnapshot,
    /// Screen showing the menu.
    pub screen: ScreenKind,
    /// A companion server accepting remote sort messages is reachable.
    pub remote_available: bool,
}

impl<'a> SortContext<'a> {
    /// Context for a regular screen without a companion server.
    pub fn local(menu: &'a MenuSnapshot) -> Self {
        Self {
            menu,
            screen: ScreenKind::Standard,
            remote_available: false,
        }
    }
}

/// How the plan applies the permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Nothing to do.
    Noop,
    /// Clicks replay the permutation on the client.
    Local,
    /// One message asks the companion server to apply it.
    Remote,
}

/// Events realising one sort.
#[derive(Debug)]
pub struct SortPlan {
    /// Events to queue, in order.
    pub events: Vec<QueuedEvent>,
    /// Menu slot ids of the working set.
    pub working_set: Vec<usize>,
    /// Working-set stacks after coalescing.
    pub stacks: Vec<ItemStack>,
    /// Target permutation over the working set.
    pub permutation: Vec<usize>,
    /// How the permutation is applied.
    pub route: Route,
}

impl SortPlan {
    fn noop() -> Self {
        Self {
            events: Vec::new(),
            working_set: Vec::new(),
            stacks: Vec::new(),
            permutation: Vec::new(),
            route: Route::Noop,
        }
    }

    /// Whether the plan does nothing.
    pub fn is_noop(&self) -> bool {
        self.route == Route::Noop
    }

    /// The clicks among the events.
    pub fn clicks(&self) -> impl Iterator<Item = &Click> {
        self.events.iter().filter_map(|queued| queued.event.as_click())
    }
}

/// Plans sorts for one settings snapshot.
pub struct Planner {
    options: SortOptions,
    catalog: Arc<dyn CatalogPositions + Send + Sync>,
    locks: Arc<dyn SlotLocks>,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Planner {
    /// Planner with the given settings and catalog, and no lock provider.
    pub fn new(options: SortOptions, catalog: Arc<dyn CatalogPositions + Send + Sync>) -> Self {
        Self {
            options,
            catalog,
            locks: Arc::new(NoLocks),
        }
    }

    /// Install a lock provider.
    pub fn with_locks(mut self, locks: Arc<dyn SlotLocks>) -> Self {
        self.locks = locks;
        self
    }

    /// Settings in use.
    pub fn options(&self) -> &SortOptions {
        &self.options
    }

    /// Slot ids sorting together with `anchor`, or nothing if the anchor
    /// cannot be sorted.
    pub fn working_set(&self, ctx: &SortContext<'_>, anchor: usize) -> Vec<usize> {
        let resolver = ScopeResolver::new(&self.options, ctx.screen);
        let Some(anchor_slot) = ctx.menu.slot(anchor) else {
            return Vec::new();
        };
        let scope = resolver.scope(anchor_slot);
        if scope == Scope::Invalid {
            return Vec::new();
        }
        ctx.menu
            .slots
            .iter()
            .filter(|slot| resolver.scope(slot) == scope && !self.locks.is_locked(slot))
            .map(|slot| slot.id)
            .collect()
    }

    /// Plan a sort anchored at menu slot `anchor`.
    pub fn plan(&self, ctx: &SortContext<'_>, anchor: usize, order: SortOrder) -> SortPlan {
        let working_set = self.working_set(ctx, anchor);
        if working_set.len() <= 1 {
            trace!(anchor, "nothing to sort");
            return SortPlan::noop();
        }

        let mut stacks: Vec<ItemStack> = working_set
            .iter()
            .filter_map(|&id| ctx.menu.slot(id))
            .map(|slot| slot.stack.clone())
            .collect();
        let container_id = ctx.menu.container_id;

        let mut events = coalesce(&mut stacks, &working_set, container_id);
        let permutation = order.permutation(&stacks, self.catalog.as_ref());

        let route = if ctx.remote_available && self.options.server_acceleration {
            let resolver = ScopeResolver::new(&self.options, ctx.screen);
            let mut mapping: Vec<i32> = permutation
                .iter()
                .enumerate()
                .filter(|&(target, &origin)| target != origin)
                .filter_map(|(target, &origin)| {
                    let origin = i32::try_from(working_set[origin]).ok()?;
                    let destination = i32::try_from(working_set[target]).ok()?;
                    Some([origin, destination])
                })
                .flatten()
                .collect();
            if !mapping.is_empty() {
                resolver.translate_mapping(&mut mapping);
                events.push(QueuedEvent::new(
                    InteractionEvent::Sort(SortPayload {
                        container_id,
                        slot_mapping: mapping,
                    }),
                    Waiter::Tick,
                ));
            }
            Route::Remote
        } else {
            let pitch = PitchRamp::for_options(&self.options, estimate_clicks(&stacks));
            let clicks = ReplayEngine::new(container_id, &working_set, &stacks)
                .bundle_secondary_click(self.options.bundle_secondary_click)
                .with_pitch(pitch)
                .replay(&permutation);
            events.extend(
                clicks
                    .into_iter()
                    .map(|click| QueuedEvent::click(click, Waiter::Tick)),
            );
            Route::Local
        };

        debug!(
            %order,
            slots = working_set.len(),
            events = events.len(),
            ?route,
            "sort planned"
        );
        SortPlan {
            events,
            working_set,
            stacks,
            permutation,
            route,
        }
    }
}

/// Merge partial stacks into earlier partial stacks of the same item.
///
/// Scans from the back; each partial stack is picked up and dropped onto
/// earlier partial stacks of the same item and components until it is used
/// up or they are full, and any remainder goes back. `stacks` is updated to
/// the result. Returns the clicks doing so: each donation batch goes out
/// back to back and waits for the host to confirm it.
pub fn coalesce(stacks: &mut [ItemStack], slot_ids: &[usize], container_id: i32) -> Vec<QueuedEvent> {
    let mut events = Vec::new();
    let click = |position: usize| Click::primary(container_id, slot_ids[position]);

    for donor in (0..stacks.len()).rev() {
        if stacks[donor].is_empty() || stacks[donor].is_full() {
            continue;
        }
        let mut remaining = stacks[donor].count;
        let mut batch = vec![click(donor)];

        let (before, rest) = stacks.split_at_mut(donor);
        let source = &rest[0];
        for (position, target) in before.iter_mut().enumerate() {
            if target.is_empty() || target.is_full() {
                continue;
            }
            if target.is_same_item_same_components(source) {
                let delta = target.remaining_space().min(remaining);
                remaining -= delta;
                target.count += delta;
                batch.push(click(position));
                if remaining == 0 {
                    break;
                }
            }
        }

        if batch.len() <= 1 {
            continue;
        }
        let last = batch.len() - 1;
        events.extend(batch.into_iter().enumerate().map(|(index, click)| {
            let waiter = if index == last {
                Waiter::Signal(TriggerKind::BatchConfirmed)
            } else {
                Waiter::Immediate
            };
            QueuedEvent::click(click, waiter)
        }));

        if remaining > 0 {
            events.push(QueuedEvent::click(click(donor), Waiter::Tick));
        }
        stacks[donor] = stacks[donor].with_count(remaining);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NoCatalog;
    use crate::locks::InventoryLocks;
    use crate::options::HotbarScope;
    use clientsort_core::{ContainerRef, ItemId, Slot};

    fn stone(count: u32) -> ItemStack {
        ItemStack::new(ItemId(1), count).named("Stone")
    }

    fn dirt(count: u32) -> ItemStack {
        ItemStack::new(ItemId(2), count).named("Dirt")
    }

    fn counts(stacks: &[ItemStack]) -> Vec<u32> {
        stacks.iter().map(|s| s.count).collect()
    }

    fn planner() -> Planner {
        Planner::new(SortOptions::default(), Arc::new(NoCatalog))
    }

    /// Chest of `stacks` (ids 0..n) followed by a player hotbar slot.
    fn chest_menu(stacks: Vec<ItemStack>) -> MenuSnapshot {
        let mut slots: Vec<Slot> = stacks
            .into_iter()
            .enumerate()
            .map(|(i, stack)| Slot::new(i, i, ContainerRef::Other(1), stack))
            .collect();
        let id = slots.len();
        slots.push(Slot::new(id, 0, ContainerRef::Player, stone(1)));
        MenuSnapshot::new(4, slots)
    }

    #[test]
    fn test_coalesce_merges_backwards() {
        let mut stacks = vec![stone(60), dirt(3), stone(10), stone(20)];
        let events = coalesce(&mut stacks, &[0, 1, 2, 3], 0);
        // stone(20) at 3 fills 0 (+4) then 2 (+16); nothing left
        assert_eq!(counts(&stacks), vec![64, 3, 26, 0]);
        assert!(stacks[3].is_empty());

        let clicked: Vec<_> = events.iter().filter_map(|e| e.event.as_click()).map(|c| c.slot_id).collect();
        assert_eq!(clicked, vec![3, 0, 2]);
        assert_eq!(events[0].waiter, Waiter::Immediate);
        assert_eq!(events[2].waiter, Waiter::Signal(TriggerKind::BatchConfirmed));
    }

    #[test]
    fn test_coalesce_puts_remainder_back() {
        let mut stacks = vec![stone(60), stone(10)];
        let events = coalesce(&mut stacks, &[5, 6], 2);
        assert_eq!(counts(&stacks), vec![64, 6]);
        let clicked: Vec<_> = events.iter().filter_map(|e| e.event.as_click()).map(|c| c.slot_id).collect();
        assert_eq!(clicked, vec![6, 5, 6]);
        assert_eq!(events[2].waiter, Waiter::Tick);
    }

    #[test]
    fn test_coalesce_respects_components() {
        let mut stacks = vec![
            stone(10),
            stone(10).with_component("custom_name", "Special"),
        ];
        let events = coalesce(&mut stacks, &[0, 1], 0);
        assert!(events.is_empty());
        assert_eq!(counts(&stacks), vec![10, 10]);
    }

    #[test]
    fn test_coalesce_skips_full_stacks() {
        let pearl = |count| {
            ItemStack::new(ItemId(3), count)
                .named("Pearl")
                .with_max_stack_size(16)
        };
        let mut stacks = vec![pearl(16), pearl(4), pearl(16), pearl(8)];
        coalesce(&mut stacks, &[0, 1, 2, 3], 0);
        assert_eq!(counts(&stacks), vec![16, 12, 16, 0]);
    }

    #[test]
    fn test_plan_local_route() {
        let menu = chest_menu(vec![stone(5), dirt(7), ItemStack::empty(), stone(64)]);
        let plan = planner().plan(&SortContext::local(&menu), 0, SortOrder::Alphabet);

        assert_eq!(plan.route, Route::Local);
        // Player hotbar slot stays out of a chest sort
        assert_eq!(plan.working_set, vec![0, 1, 2, 3]);
        assert!(plan.clicks().all(|c| c.container_id == 4 && c.slot_id < 4));
        assert!(plan.clicks().all(|c| c.pitch.is_some()));
        // dirt, stone(64), stone(5), empty
        assert_eq!(plan.permutation, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_plan_remote_route() {
        let menu = chest_menu(vec![stone(5), dirt(7), ItemStack::empty()]);
        let ctx = SortContext {
            remote_available: true,
            ..SortContext::local(&menu)
        };
        let plan = planner().plan(&ctx, 1, SortOrder::Alphabet);
        assert_eq!(plan.route, Route::Remote);
        assert_eq!(plan.events.len(), 1);
        match &plan.events[0].event {
            InteractionEvent::Sort(payload) => {
                assert_eq!(payload.container_id, 4);
                assert_eq!(payload.slot_mapping, vec![1, 0, 0, 1]);
            }
            other => panic!("expected sort message, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_remote_creative_hotbar_shifts_ids() {
        // 45 non-sortable slots, then the hotbar at ids 45..=53
        let mut slots: Vec<Slot> = (0..45)
            .map(|i| Slot::new(i, i, ContainerRef::Other(99), ItemStack::empty()))
            .collect();
        for index in 0..9 {
            let stack = match index {
                0 => ItemStack::new(ItemId(7), 1).named("Zombie Head"),
                1 => ItemStack::new(ItemId(8), 1).named("Apple"),
                _ => ItemStack::empty(),
            };
            slots.push(Slot::new(45 + index, index, ContainerRef::Player, stack));
        }
        let menu = MenuSnapshot::new(0, slots);

        let mapping_for = |screen| {
            let ctx = SortContext {
                menu: &menu,
                screen,
                remote_available: true,
            };
            let plan = planner().plan(&ctx, 45, SortOrder::Alphabet);
            assert_eq!(plan.route, Route::Remote);
            assert_eq!(plan.working_set, (45..54).collect::<Vec<_>>());
            match &plan.events[..] {
                [queued] => match &queued.event {
                    InteractionEvent::Sort(payload) => payload.slot_mapping.clone(),
                    other => panic!("expected sort message, got {other:?}"),
                },
                events => panic!("expected one event, got {events:?}"),
            }
        };

        let hotbar_only = mapping_for(ScreenKind::Creative {
            inventory_open: false,
        });
        assert_eq!(hotbar_only, vec![37, 36, 36, 37]);

        let full_tab = mapping_for(ScreenKind::Creative {
            inventory_open: true,
        });
        assert_eq!(full_tab, vec![46, 45, 45, 46]);
    }

    #[test]
    fn test_plan_remote_disabled_falls_back_to_clicks() {
        let menu = chest_menu(vec![stone(5), dirt(7)]);
        let ctx = SortContext {
            remote_available: true,
            ..SortContext::local(&menu)
        };
        let options = SortOptions {
            server_acceleration: false,
            sound_enabled: false,
            ..SortOptions::default()
        };
        let plan = Planner::new(options, Arc::new(NoCatalog)).plan(&ctx, 0, SortOrder::Alphabet);
        assert_eq!(plan.route, Route::Local);
        assert_eq!(plan.clicks().count(), 3);
        assert!(plan.clicks().all(|c| c.pitch.is_none()));
    }

    #[test]
    fn test_invalid_anchor_is_noop() {
        let mut menu = chest_menu(vec![stone(5), dirt(7)]);
        menu.slots[0] = menu.slots[0].clone().restricted();
        let plan = planner().plan(&SortContext::local(&menu), 0, SortOrder::Alphabet);
        assert!(plan.is_noop());
        assert!(plan.events.is_empty());

        let plan = planner().plan(&SortContext::local(&menu), 99, SortOrder::Alphabet);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_singleton_working_set_is_noop() {
        let menu = chest_menu(vec![stone(5)]);
        let plan = planner().plan(&SortContext::local(&menu), 0, SortOrder::Alphabet);
        assert!(plan.is_noop());

        // The lone hotbar slot is a working set of one as well
        let plan = planner().plan(&SortContext::local(&menu), 1, SortOrder::Alphabet);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_locked_slots_are_excluded() {
        let slots = (0..4)
            .map(|i| Slot::new(i, 9 + i, ContainerRef::Player, stone(1 + i as u32)))
            .collect();
        let menu = MenuSnapshot::new(0, slots);
        // raw index 1 is inventory index 10
        let planner = planner().with_locks(Arc::new(InventoryLocks::new([1])));
        assert_eq!(
            planner.working_set(&SortContext::local(&menu), 0),
            vec![0, 2, 3]
        );
    }

    #[test]
    fn test_hotbar_scope_none_excludes_anchor() {
        let slots = vec![
            Slot::new(0, 0, ContainerRef::Player, stone(1)),
            Slot::new(1, 1, ContainerRef::Player, dirt(1)),
        ];
        let menu = MenuSnapshot::new(0, slots);
        let options = SortOptions {
            hotbar_scope: HotbarScope::None,
            ..SortOptions::default()
        };
        let planner = Planner::new(options, Arc::new(NoCatalog));
        assert!(planner.working_set(&SortContext::local(&menu), 0).is_empty());
    }
}
