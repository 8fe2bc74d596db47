//! Sort settings, passed by value to the resolver, strategies and planner.

use crate::order::SortOrder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How hotbar slots of the player inventory are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HotbarScope {
    /// The hotbar sorts on its own.
    #[default]
    Hotbar,
    /// The hotbar sorts together with the main grid.
    Inventory,
    /// The hotbar never takes part in sorting.
    None,
}

/// How extra slots (offhand) of the player inventory are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtraSlotScope {
    /// Extra slots sort among themselves.
    Extra,
    /// Extra slots follow the hotbar's grouping.
    #[default]
    Hotbar,
    /// Extra slots sort together with the main grid.
    Inventory,
    /// Extra slots never take part in sorting.
    None,
}

/// Where the authoritative game state lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Peer {
    /// In-process integrated server.
    Local,
    /// Dedicated server across the network.
    Remote,
}

/// Modifier keys held when a sort is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Shift held.
    pub shift: bool,
    /// Control held.
    pub ctrl: bool,
    /// Alt held.
    pub alt: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };
}

/// Interaction tick period bounds (milliseconds).
pub const INTERACTION_RATE_RANGE: (u64, u64) = (1, 1000);
/// Playable pitch bounds.
pub const PITCH_RANGE: (f32, f32) = (0.5, 2.0);
/// Bounds of the minimum delay between feedback sounds (milliseconds).
pub const SOUND_RATE_RANGE: (u64, u64) = (0, 1000);

/// All user-tunable sort behaviour.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SortOptions {
    /// Tick period (ms) when playing on a remote server.
    pub interaction_rate_server: u64,
    /// Tick period (ms) when playing on the integrated server.
    pub interaction_rate_client: u64,
    /// Hotbar grouping.
    pub hotbar_scope: HotbarScope,
    /// Offhand grouping.
    pub extra_slot_scope: ExtraSlotScope,
    /// Order used without modifiers.
    pub sort_order: SortOrder,
    /// Order used with shift held.
    pub shift_sort_order: SortOrder,
    /// Order used with control held.
    pub ctrl_sort_order: SortOrder,
    /// Order used with alt held.
    pub alt_sort_order: SortOrder,
    /// Look catalog positions up in the prebuilt index.
    pub optimized_catalog_sorting: bool,
    /// Use the secondary button when a container item is involved in a swap.
    pub bundle_secondary_click: bool,
    /// Let a companion server apply the permutation in one message.
    pub server_acceleration: bool,
    /// Play a sound per replay click.
    pub sound_enabled: bool,
    /// Sound event id.
    pub sound_id: String,
    /// Sound volume (0.0 to 1.0).
    pub sound_volume: f32,
    /// Pitch of the first click sound.
    pub sound_min_pitch: f32,
    /// Pitch the ramp approaches by the last click.
    pub sound_max_pitch: f32,
    /// Minimum delay (ms) between two feedback sounds.
    pub sound_rate: u64,
    /// Let sounds overlap instead of cutting the previous one.
    pub sound_overlap: bool,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            interaction_rate_server: 10,
            interaction_rate_client: 1,
            hotbar_scope: HotbarScope::Hotbar,
            extra_slot_scope: ExtraSlotScope::Hotbar,
            sort_order: SortOrder::Catalog,
            shift_sort_order: SortOrder::Quantity,
            ctrl_sort_order: SortOrder::Alphabet,
            alt_sort_order: SortOrder::RawId,
            optimized_catalog_sorting: true,
            bundle_secondary_click: true,
            server_acceleration: true,
            sound_enabled: true,
            sound_id: "minecraft:block.note_block.hat".to_string(),
            sound_volume: 0.2,
            sound_min_pitch: 0.5,
            sound_max_pitch: 2.0,
            sound_rate: 20,
            sound_overlap: false,
        }
    }
}

impl SortOptions {
    /// Clamp every field into its valid range.
    pub fn validate(&mut self) {
        let (lo, hi) = INTERACTION_RATE_RANGE;
        self.interaction_rate_server = self.interaction_rate_server.clamp(lo, hi);
        self.interaction_rate_client = self.interaction_rate_client.clamp(lo, hi);

        self.sound_volume = clamp_f32(self.sound_volume, 0.0, 1.0, 0.2);
        let (lo, hi) = PITCH_RANGE;
        self.sound_min_pitch = clamp_f32(self.sound_min_pitch, lo, hi, lo);
        self.sound_max_pitch = clamp_f32(self.sound_max_pitch, lo, hi, hi);
        if self.sound_min_pitch > self.sound_max_pitch {
            self.sound_min_pitch = self.sound_max_pitch;
        }

        let (lo, hi) = SOUND_RATE_RANGE;
        self.sound_rate = self.sound_rate.clamp(lo, hi);

        if self.sound_id.trim().is_empty() {
            self.sound_id = Self::default().sound_id;
        }
    }

    /// Order selected by the held modifier keys: shift, then ctrl, then alt.
    pub fn order_for(&self, modifiers: Modifiers) -> SortOrder {
        if modifiers.shift {
            self.shift_sort_order
        } else if modifiers.ctrl {
            self.ctrl_sort_order
        } else if modifiers.alt {
            self.alt_sort_order
        } else {
            self.sort_order
        }
    }

    /// Dispatch tick period for the given peer.
    pub fn tick_interval(&self, peer: Peer) -> Duration {
        match peer {
            Peer::Local => Duration::from_millis(self.interaction_rate_client),
            Peer::Remote => Duration::from_millis(self.interaction_rate_server),
        }
    }

    /// Minimum delay between feedback sounds.
    pub fn sound_interval(&self) -> Duration {
        Duration::from_millis(self.sound_rate)
    }
}

fn clamp_f32(value: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SortOptions::default();
        assert_eq!(options.tick_interval(Peer::Remote), Duration::from_millis(10));
        assert_eq!(options.tick_interval(Peer::Local), Duration::from_millis(1));
        assert_eq!(options.hotbar_scope, HotbarScope::Hotbar);
        assert_eq!(options.extra_slot_scope, ExtraSlotScope::Hotbar);
        assert_eq!(options.order_for(Modifiers::NONE), SortOrder::Catalog);
    }

    #[test]
    fn test_order_for_modifiers() {
        let options = SortOptions::default();
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        let all = Modifiers {
            shift: true,
            ctrl: true,
            alt: true,
        };
        assert_eq!(options.order_for(shift), SortOrder::Quantity);
        assert_eq!(options.order_for(ctrl), SortOrder::Alphabet);
        assert_eq!(options.order_for(alt), SortOrder::RawId);
        assert_eq!(options.order_for(all), SortOrder::Quantity);
    }

    #[test]
    fn test_validate_clamps() {
        let mut options = SortOptions {
            interaction_rate_server: 0,
            interaction_rate_client: 50_000,
            sound_volume: 3.0,
            sound_min_pitch: 1.8,
            sound_max_pitch: 1.2,
            sound_rate: 9_999,
            sound_id: "  ".to_string(),
            ..SortOptions::default()
        };
        options.validate();
        assert_eq!(options.interaction_rate_server, 1);
        assert_eq!(options.interaction_rate_client, 1000);
        assert_eq!(options.sound_volume, 1.0);
        assert_eq!(options.sound_max_pitch, 1.2);
        assert_eq!(options.sound_min_pitch, 1.2);
        assert_eq!(options.sound_rate, 1000);
        assert_eq!(options.sound_id, SortOptions::default().sound_id);
    }

    #[test]
    fn test_validate_nan() {
        let mut options = SortOptions {
            sound_volume: f32::NAN,
            sound_min_pitch: f32::NAN,
            ..SortOptions::default()
        };
        options.validate();
        assert_eq!(options.sound_volume, 0.2);
        assert_eq!(options.sound_min_pitch, 0.5);
    }

    #[test]
    fn test_json_keys() {
        let json = r#"{"hotbarScope":"inventory","extraSlotScope":"none","sortOrder":"rawId","soundEnabled":false}"#;
        let options: SortOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.hotbar_scope, HotbarScope::Inventory);
        assert_eq!(options.extra_slot_scope, ExtraSlotScope::None);
        assert_eq!(options.sort_order, SortOrder::RawId);
        assert!(!options.sound_enabled);
        assert_eq!(options.interaction_rate_server, 10);

        let out = serde_json::to_value(SortOptions::default()).unwrap();
        assert_eq!(out["shiftSortOrder"], "quantity");
        assert_eq!(out["optimizedCatalogSorting"], true);
    }
}
