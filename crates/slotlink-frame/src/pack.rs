use bytes::BytesMut;
use slotlink_transport::{Destination, Frame};

use crate::entry::WireEntry;

/// Accumulates entries into one outbound frame, first-fit, never splitting an
/// entry across frames.
///
/// The destination tag starts unset; the first entry claims it, and any later
/// entry addressed elsewhere flips the frame to [`Destination::All`]. Once
/// flipped it never reverts.
pub struct FrameBuilder {
    max_payload: usize,
    buf: BytesMut,
    destination: Option<Destination>,
    entries: usize,
}

impl FrameBuilder {
    /// Start an empty frame bounded by `max_payload` bytes.
    pub fn new(max_payload: usize) -> Self {
        Self {
            max_payload,
            buf: BytesMut::with_capacity(max_payload),
            destination: None,
            entries: 0,
        }
    }

    /// Append `entry` if it fits, addressing it to `destination`.
    ///
    /// Returns false (leaving the builder untouched) when the encoded entry
    /// would exceed the frame capacity; the caller finishes this frame and
    /// retries the same entry on a fresh one.
    pub fn try_push(&mut self, entry: &WireEntry, destination: Destination) -> bool {
        if self.buf.len() + entry.encoded_len() > self.max_payload {
            return false;
        }

        entry.encode(&mut self.buf);
        self.entries += 1;
        self.destination = Some(match self.destination {
            None => destination,
            Some(current) if current == destination => current,
            Some(_) => Destination::All,
        });
        true
    }

    /// Number of entries accepted so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Whether no entry has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Bytes used so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Finish the frame. An empty builder yields no frame.
    pub fn finish(self) -> Option<Frame> {
        let destination = self.destination?;
        Some(Frame::new(destination, self.buf.freeze()))
    }
}
