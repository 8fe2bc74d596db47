#![warn(missing_docs)]
//! Inventory sort planning.
//!
//! Given a menu snapshot and the slot the player pointed at, the planner
//! picks the slots that sort together, merges partial stacks, computes the
//! target order and turns it into either host clicks or a single remote
//! sort message, ready for the dispatcher in `clientsort-net`.

pub mod catalog;
pub mod locks;
pub mod options;
pub mod order;
pub mod planner;
pub mod replay;
pub mod scope;
pub mod sound;

pub use catalog::{
    Catalog, CatalogIndex, CatalogPositions, NoCatalog, ReferenceList, RefreshOutcome, NOT_FOUND,
};
pub use locks::{InventoryLocks, NoLocks, SlotLocks};
pub use options::{
    ExtraSlotScope, HotbarScope, Modifiers, Peer, SortOptions, INTERACTION_RATE_RANGE,
    PITCH_RANGE, SOUND_RATE_RANGE,
};
pub use order::SortOrder;
pub use planner::{coalesce, Planner, Route, SortContext, SortPlan};
pub use replay::{is_coalesced, ReplayEngine};
pub use scope::{Scope, ScopeResolver, ScreenKind, FIRST_EXTRA_INDEX, HOTBAR_SIZE};
pub use sound::{estimate_clicks, PitchRamp, SoundAction, SoundThrottle};
