//! Menu layouts matching the host's vanilla screens.

use clientsort_core::{ContainerRef, ItemId, ItemStack, MenuSnapshot, Slot};

/// Menu id of the player's own inventory screen.
pub const PLAYER_MENU_ID: i32 = 0;
/// Container tag of the 2x2 crafting grid.
pub const CRAFTING_GRID: u32 = 100;
/// Container tag of the crafting output.
pub const CRAFTING_RESULT: u32 = 101;
/// Container tag used for chests.
pub const CHEST: u32 = 1;

/// Menu id of the player inventory screen slot holding inventory `index`.
pub fn player_slot_id(index: usize) -> Option<usize> {
    match index {
        0..=8 => Some(36 + index),
        9..=35 => Some(index),
        36..=39 => Some(8 - (index - 36)),
        40 => Some(45),
        _ => None,
    }
}

/// A named stack of a plain item.
pub fn item(id: u32, name: &str, count: u32) -> ItemStack {
    ItemStack::new(ItemId(id), count).named(name)
}

/// The 46-slot player inventory screen: crafting output (0), crafting grid
/// (1..=4), armor (5..=8), main grid (9..=35), hotbar (36..=44) and offhand
/// (45). `contents` places stacks by player inventory index.
pub fn player_inventory_menu<I>(contents: I) -> MenuSnapshot
where
    I: IntoIterator<Item = (usize, ItemStack)>,
{
    let mut slots = Vec::with_capacity(46);
    slots.push(
        Slot::new(0, 0, ContainerRef::Other(CRAFTING_RESULT), ItemStack::empty()).restricted(),
    );
    for grid in 0..4 {
        slots.push(Slot::new(
            1 + grid,
            grid,
            ContainerRef::Other(CRAFTING_GRID),
            ItemStack::empty(),
        ));
    }
    for armor in 0..4 {
        // Head first, stored at the highest armor index
        slots.push(
            Slot::new(5 + armor, 39 - armor, ContainerRef::Player, ItemStack::empty())
                .restricted(),
        );
    }
    for index in 9..36 {
        slots.push(Slot::new(index, index, ContainerRef::Player, ItemStack::empty()));
    }
    for index in 0..9 {
        slots.push(Slot::new(36 + index, index, ContainerRef::Player, ItemStack::empty()));
    }
    slots.push(Slot::new(45, 40, ContainerRef::Player, ItemStack::empty()));

    for (index, stack) in contents {
        if let Some(id) = player_slot_id(index) {
            slots[id].stack = stack;
        }
    }
    MenuSnapshot::new(PLAYER_MENU_ID, slots)
}

/// A chest screen with `rows` rows followed by the player main grid and
/// hotbar. `contents` fills the chest from its first slot.
pub fn chest_menu(container_id: i32, rows: usize, contents: Vec<ItemStack>) -> MenuSnapshot {
    let chest_slots = rows * 9;
    let mut contents = contents.into_iter();
    let mut slots: Vec<Slot> = (0..chest_slots)
        .map(|index| {
            let stack = contents.next().unwrap_or_default();
            Slot::new(index, index, ContainerRef::Other(CHEST), stack)
        })
        .collect();
    for index in 9..36 {
        let id = chest_slots + index - 9;
        slots.push(Slot::new(id, index, ContainerRef::Player, ItemStack::empty()));
    }
    for index in 0..9 {
        let id = chest_slots + 27 + index;
        slots.push(Slot::new(id, index, ContainerRef::Player, ItemStack::empty()));
    }
    MenuSnapshot::new(container_id, slots)
}
