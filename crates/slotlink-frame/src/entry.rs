use bytes::{BufMut, BytesMut};

use crate::value::Value;

/// Reserved index byte marking an acknowledgment entry.
pub const ACK_INDEX: u8 = 0xFF;

/// Reserved index byte marking a round-update entry.
pub const ROUND_UPDATE_INDEX: u8 = 0xFE;

/// Maximum addressable slot count. Indices at or above this collide with the
/// reserved sentinel bytes.
pub const MAX_SLOTS: usize = ROUND_UPDATE_INDEX as usize;

/// One encodable entry: `[index_byte][payload...]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireEntry {
    /// A slot value. Index byte is the slot index, payload is the value.
    Data { slot: u8, value: Value },
    /// Acknowledgment of a received data entry. Payload is the acked index.
    Ack { slot: u8 },
    /// The sender's current round counter, in `[0, 100)`.
    RoundUpdate { round: u8 },
}

impl WireEntry {
    /// Encoded size: one index byte plus the payload.
    pub fn encoded_len(&self) -> usize {
        1 + match self {
            WireEntry::Data { value, .. } => value.wire_size(),
            WireEntry::Ack { .. } | WireEntry::RoundUpdate { .. } => 1,
        }
    }

    /// Append the encoding to `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            WireEntry::Data { slot, value } => {
                dst.put_u8(*slot);
                value.encode(dst);
            }
            WireEntry::Ack { slot } => {
                dst.put_u8(ACK_INDEX);
                dst.put_u8(*slot);
            }
            WireEntry::RoundUpdate { round } => {
                dst.put_u8(ROUND_UPDATE_INDEX);
                dst.put_u8(*round);
            }
        }
    }
}
