//! Message encoding and decoding with framing.
//!
//! Frame format: `[length: u32 LE][message_type: u8][payload: bytes]`, where
//! `length` covers the tag and payload.

use crate::protocol::ClientMessage;
use anyhow::{bail, Context, Result};

const HEADER_LEN: usize = 5;

/// Encode a client message with length prefix.
pub fn encode_client_message(msg: &ClientMessage) -> Result<Vec<u8>> {
    let payload = postcard::to_allocvec(msg).context("Failed to serialize client message")?;

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());

    // Length (excluding length field itself)
    let length = u32::try_from(1 + payload.len()).context("Client message too large")?;
    frame.extend_from_slice(&length.to_le_bytes());
    frame.push(message_type_tag(msg));
    frame.extend_from_slice(&payload);

    Ok(frame)
}

/// Decode a client message from frame data.
///
/// Rejects short or incomplete frames, unknown tags, payloads whose variant
/// disagrees with the tag, and sort payloads that are not well formed.
pub fn decode_client_message(data: &[u8]) -> Result<ClientMessage> {
    if data.len() < HEADER_LEN {
        bail!("Frame too short: {} bytes (minimum {HEADER_LEN})", data.len());
    }

    let length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if length == 0 {
        bail!("Empty frame");
    }
    let end = 4usize
        .checked_add(length)
        .context("Frame length overflow")?;
    if data.len() < end {
        bail!(
            "Incomplete frame: expected {} bytes, got {}",
            end,
            data.len()
        );
    }

    let tag = data[4];
    if tag != TAG_REORDER_INVENTORY {
        bail!("Unknown message type tag {tag}");
    }

    let msg: ClientMessage =
        postcard::from_bytes(&data[HEADER_LEN..end]).context("Failed to deserialize client message")?;
    if message_type_tag(&msg) != tag {
        bail!("Message type tag {tag} does not match payload");
    }

    match &msg {
        ClientMessage::ReorderInventory(payload) if !payload.is_well_formed() => {
            bail!(
                "Malformed slot mapping ({} entries)",
                payload.slot_mapping.len()
            )
        }
        _ => Ok(msg),
    }
}

const TAG_REORDER_INVENTORY: u8 = 0;

fn message_type_tag(msg: &ClientMessage) -> u8 {
    match msg {
        ClientMessage::ReorderInventory(_) => TAG_REORDER_INVENTORY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SortPayload;

    fn reorder(container_id: i32, mapping: Vec<i32>) -> ClientMessage {
        ClientMessage::ReorderInventory(SortPayload {
            container_id,
            slot_mapping: mapping,
        })
    }

    #[test]
    fn test_encode_decode_reorder() {
        let msg = reorder(3, vec![9, 10, 10, 9]);
        let encoded = encode_client_message(&msg).expect("Failed to encode");
        let decoded = decode_client_message(&encoded).expect("Failed to decode");
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_frame_header() {
        let encoded = encode_client_message(&reorder(0, vec![0, 1, 1, 0])).unwrap();
        let length = u32::from_le_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]);
        assert_eq!(length as usize, encoded.len() - 4);
        assert_eq!(encoded[4], TAG_REORDER_INVENTORY);
    }

    #[test]
    fn test_decode_too_short() {
        let result = decode_client_message(&[0, 0, 0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_incomplete() {
        let encoded = encode_client_message(&reorder(0, vec![0, 1, 1, 0])).unwrap();
        let result = decode_client_message(&encoded[..encoded.len() - 1]);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_tag() {
        let mut encoded = encode_client_message(&reorder(0, vec![0, 1, 1, 0])).unwrap();
        encoded[4] = 7;
        let err = decode_client_message(&encoded).unwrap_err();
        assert!(err.to_string().contains("Unknown message type"));
    }

    #[test]
    fn test_decode_rejects_odd_mapping() {
        let encoded = encode_client_message(&reorder(0, vec![0, 1, 1])).unwrap();
        assert!(decode_client_message(&encoded).is_err());
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let msg = reorder(1, vec![4, 5, 5, 4]);
        let mut encoded = encode_client_message(&msg).unwrap();
        encoded.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(decode_client_message(&encoded).unwrap(), msg);
    }
}
