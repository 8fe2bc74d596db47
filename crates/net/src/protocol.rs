//! Remote sort channel message definitions.
//!
//! All messages use postcard serialization for compact binary encoding.

use serde::{Deserialize, Serialize};

/// Maximum number of (origin, destination) pairs in one message.
/// Bounds decoder work for hostile peers; a double chest plus the player
/// inventory stays far below this.
pub const MAX_SLOT_PAIRS: usize = 512;

/// Request to apply a slot permutation server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortPayload {
    /// Menu id the slot ids refer to.
    pub container_id: i32,
    /// Flat list of `(origin, destination)` slot id pairs.
    pub slot_mapping: Vec<i32>,
}

impl SortPayload {
    /// Build a payload from `(origin, destination)` pairs.
    pub fn from_pairs<I>(container_id: i32, pairs: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let slot_mapping = pairs
            .into_iter()
            .flat_map(|(origin, destination)| [origin, destination])
            .collect();
        Self {
            container_id,
            slot_mapping,
        }
    }

    /// Iterate `(origin, destination)` pairs. A trailing unpaired id is ignored.
    pub fn pairs(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.slot_mapping
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
    }

    /// Number of complete pairs.
    pub fn pair_count(&self) -> usize {
        self.slot_mapping.len() / 2
    }

    /// Structural check done before any container lookup: even length and
    /// within the size limit.
    pub fn is_well_formed(&self) -> bool {
        self.slot_mapping.len() % 2 == 0 && self.pair_count() <= MAX_SLOT_PAIRS
    }
}

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Apply a slot permutation to an open menu.
    ReorderInventory(SortPayload),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_roundtrip() {
        let payload = SortPayload::from_pairs(2, [(9, 10), (10, 9)]);
        assert_eq!(payload.slot_mapping, vec![9, 10, 10, 9]);
        assert_eq!(payload.pairs().collect::<Vec<_>>(), vec![(9, 10), (10, 9)]);
        assert_eq!(payload.pair_count(), 2);
        assert!(payload.is_well_formed());
    }

    #[test]
    fn test_odd_mapping_is_malformed() {
        let payload = SortPayload {
            container_id: 0,
            slot_mapping: vec![1, 2, 3],
        };
        assert!(!payload.is_well_formed());
        assert_eq!(payload.pairs().count(), 1);
    }

    #[test]
    fn test_oversized_mapping_is_malformed() {
        let payload = SortPayload::from_pairs(0, (0..=MAX_SLOT_PAIRS as i32).map(|i| (i, i)));
        assert!(!payload.is_well_formed());
    }
}
