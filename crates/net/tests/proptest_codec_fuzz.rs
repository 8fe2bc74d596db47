//! Fuzz-style property tests for the sort channel codec
//!
//! These tests validate that the decoder handles arbitrary network input
//! gracefully without crashing.

use clientsort_net::{
    decode_client_message, encode_client_message, ClientMessage, SortPayload, MAX_SLOT_PAIRS,
};
use proptest::prelude::*;

proptest! {
    /// Property: Arbitrary bytes don't crash the decoder
    #[test]
    fn arbitrary_bytes_dont_crash(
        random_bytes in prop::collection::vec(any::<u8>(), 0..2000),
    ) {
        let _result = decode_client_message(&random_bytes);
        // No panic = success
    }

    /// Property: Well-formed sort messages roundtrip
    #[test]
    fn reorder_roundtrips(
        container_id in any::<i32>(),
        pairs in prop::collection::vec((any::<i32>(), any::<i32>()), 0..64),
    ) {
        let msg = ClientMessage::ReorderInventory(SortPayload::from_pairs(container_id, pairs));

        let encoded = encode_client_message(&msg).unwrap();
        let decoded = decode_client_message(&encoded).unwrap();

        prop_assert_eq!(msg, decoded);
    }

    /// Property: Truncated frames are rejected, never panic
    #[test]
    fn truncated_frames_rejected(
        pairs in prop::collection::vec((0i32..100, 0i32..100), 1..32),
        cut in any::<prop::sample::Index>(),
    ) {
        let msg = ClientMessage::ReorderInventory(SortPayload::from_pairs(0, pairs));
        let encoded = encode_client_message(&msg).unwrap();
        let len = cut.index(encoded.len());

        prop_assert!(decode_client_message(&encoded[..len]).is_err());
    }

    /// Property: Corrupted length prefix doesn't panic
    #[test]
    fn corrupted_length_doesnt_crash(
        length in any::<u32>(),
        tail in prop::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut frame = length.to_le_bytes().to_vec();
        frame.push(0);
        frame.extend_from_slice(&tail);
        let _result = decode_client_message(&frame);
    }

    /// Property: Odd-length mappings never decode
    #[test]
    fn odd_mappings_rejected(
        mapping in prop::collection::vec(any::<i32>(), 0..(2 * MAX_SLOT_PAIRS))
            .prop_map(|mut m| {
                if m.len() % 2 == 0 {
                    m.push(0);
                }
                m
            }),
    ) {
        let msg = ClientMessage::ReorderInventory(SortPayload { container_id: 0, slot_mapping: mapping });
        let encoded = encode_client_message(&msg).unwrap();

        prop_assert!(decode_client_message(&encoded).is_err());
    }
}
