use slotlink_transport::{Frame, Location};
use tracing::trace;

use crate::entry::{ACK_INDEX, ROUND_UPDATE_INDEX};
use crate::error::FrameError;
use crate::value::{Value, ValueKind};

/// One decoded inbound entry, ready for synchronous application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RxEvent {
    /// A slot value addressed to this peer.
    Data { slot: u8, value: Value },
    /// The peer acknowledges receipt of one of our data entries.
    Ack { slot: u8 },
    /// The peer's round counter, for resynchronization.
    RoundUpdate { round: u8 },
}

/// Bounds-checked read cursor over a frame payload. Refuses to advance past
/// the frame length.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take_byte(&mut self) -> Option<u8> {
        let byte = *self.buf.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn take(&mut self, n: usize) -> std::result::Result<&'a [u8], FrameError> {
        if self.remaining() < n {
            return Err(FrameError::Overflow {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}

/// Parse one inbound frame into events.
///
/// `kinds` is the slot table's type tags in index order; it determines each
/// data entry's payload width. Data entries are emitted only when the frame
/// is addressed to `local` (or broadcast); foreign entries are still walked
/// over so subsequent entries stay aligned.
///
/// Parsing stops at the first malformed entry. Events decoded before that
/// point are still returned, alongside the error.
pub fn unpack_frame(
    frame: &Frame,
    local: Location,
    kinds: &[ValueKind],
) -> (Vec<RxEvent>, Option<FrameError>) {
    let mut events = Vec::new();
    let mut cursor = Cursor::new(&frame.payload);
    let accept_data = frame.destination.accepts(local);

    while let Some(index) = cursor.take_byte() {
        match index {
            ACK_INDEX => {
                let acked = match cursor.take(1) {
                    Ok(bytes) => bytes[0],
                    Err(err) => return (events, Some(err)),
                };
                events.push(RxEvent::Ack { slot: acked });
            }
            ROUND_UPDATE_INDEX => {
                let round = match cursor.take(1) {
                    Ok(bytes) => bytes[0],
                    Err(err) => return (events, Some(err)),
                };
                events.push(RxEvent::RoundUpdate { round });
            }
            slot => {
                let Some(kind) = kinds.get(slot as usize) else {
                    return (
                        events,
                        Some(FrameError::InvalidIndex {
                            index: slot,
                            slots: kinds.len(),
                        }),
                    );
                };
                let bytes = match cursor.take(kind.wire_size()) {
                    Ok(bytes) => bytes,
                    Err(err) => return (events, Some(err)),
                };
                if !accept_data {
                    trace!(slot, destination = %frame.destination, "skipping foreign data entry");
                    continue;
                }
                // Width is exact by construction of `take`.
                if let Some(value) = Value::decode(*kind, bytes) {
                    events.push(RxEvent::Data { slot, value });
                }
            }
        }
    }

    (events, None)
}
