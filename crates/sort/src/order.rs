//! Ordering strategies.
//!
//! Each strategy reorders an index array by a primary key over the stacks it
//! points at, falling back to [`compare_equal_items`] on ties. Sorting is
//! stable, so input already in order comes back as the identity.

use crate::catalog::CatalogPositions;
use clientsort_core::{cmp_ignore_case, compare_equal_items, ItemId, ItemStack};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// The available ordering rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Leave the order unchanged.
    None,
    /// Case-insensitive display name.
    Alphabet,
    /// Position in the creative catalog.
    #[default]
    #[serde(alias = "creative")]
    Catalog,
    /// Total count of the item across the working set, largest first.
    Quantity,
    /// Numeric registry id.
    RawId,
}

impl SortOrder {
    /// Every order, in menu order.
    pub const ALL: [SortOrder; 5] = [
        SortOrder::None,
        SortOrder::Alphabet,
        SortOrder::Catalog,
        SortOrder::Quantity,
        SortOrder::RawId,
    ];

    /// Reorder `ids`, whose values index into `stacks`.
    pub fn sort(self, ids: &mut [usize], stacks: &[ItemStack], catalog: &dyn CatalogPositions) {
        match self {
            SortOrder::None => {}
            SortOrder::Alphabet => sort_alphabetically(ids, stacks),
            SortOrder::Catalog => {
                let positions = catalog.positions(stacks);
                sort_by_values(ids, stacks, &positions);
            }
            SortOrder::Quantity => sort_by_quantity(ids, stacks),
            SortOrder::RawId => {
                let raw_ids: Vec<u32> = stacks.iter().map(|stack| stack.item.0).collect();
                sort_by_values(ids, stacks, &raw_ids);
            }
        }
    }

    /// Target permutation of `stacks`: entry `i` is the index whose stack
    /// should end up at position `i`.
    pub fn permutation(self, stacks: &[ItemStack], catalog: &dyn CatalogPositions) -> Vec<usize> {
        let mut ids: Vec<usize> = (0..stacks.len()).collect();
        self.sort(&mut ids, stacks, catalog);
        ids
    }

    /// Settings name.
    pub fn name(self) -> &'static str {
        match self {
            SortOrder::None => "none",
            SortOrder::Alphabet => "alphabet",
            SortOrder::Catalog => "catalog",
            SortOrder::Quantity => "quantity",
            SortOrder::RawId => "rawId",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creative" => Ok(SortOrder::Catalog),
            _ => SortOrder::ALL
                .into_iter()
                .find(|order| order.name().eq_ignore_ascii_case(s))
                .ok_or_else(|| format!("unknown sort order '{s}'")),
        }
    }
}

/// Empty stacks go last; `None` when neither is empty.
fn empties_last(a: &ItemStack, b: &ItemStack) -> Option<Ordering> {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Some(Ordering::Equal),
        (true, false) => Some(Ordering::Greater),
        (false, true) => Some(Ordering::Less),
        (false, false) => None,
    }
}

fn sort_by_values(ids: &mut [usize], stacks: &[ItemStack], values: &[u32]) {
    ids.sort_by(|&a, &b| {
        empties_last(&stacks[a], &stacks[b]).unwrap_or_else(|| {
            values[a]
                .cmp(&values[b])
                .then_with(|| compare_equal_items(&stacks[a], &stacks[b]))
        })
    });
}

fn sort_alphabetically(ids: &mut [usize], stacks: &[ItemStack]) {
    ids.sort_by(|&a, &b| {
        let (stack_a, stack_b) = (&stacks[a], &stacks[b]);
        empties_last(stack_a, stack_b).unwrap_or_else(|| {
            cmp_ignore_case(stack_a.display_name(), stack_b.display_name())
                .then_with(|| compare_equal_items(stack_a, stack_b))
        })
    });
}

fn sort_by_quantity(ids: &mut [usize], stacks: &[ItemStack]) {
    let mut totals: HashMap<ItemId, u64> = HashMap::new();
    for stack in stacks.iter().filter(|stack| !stack.is_empty()) {
        *totals.entry(stack.item).or_default() += u64::from(stack.count);
    }
    let total = |stack: &ItemStack| totals.get(&stack.item).copied().unwrap_or_default();

    ids.sort_by(|&a, &b| {
        let (stack_a, stack_b) = (&stacks[a], &stacks[b]);
        empties_last(stack_a, stack_b).unwrap_or_else(|| {
            total(stack_b)
                .cmp(&total(stack_a))
                .then_with(|| compare_equal_items(stack_a, stack_b))
        })
    });
}
