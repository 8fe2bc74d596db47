#![warn(missing_docs)]
//! Authoritative companion for remote sorting: checks a requested slot
//! permutation against the player's menu and applies it in one step.

mod handler;

pub use handler::{
    apply_mapping, handle_frame, handle_sort_payload, validate_mapping, MappingError,
    PlayerMenus, ServerMenu, SortOutcome,
};
