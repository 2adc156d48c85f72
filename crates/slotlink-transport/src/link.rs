use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Default maximum frame payload size in bytes.
///
/// Sized for a narrow half-duplex radio link; large enough for a handful of
/// entries per frame, small enough to keep air time per round bounded.
pub const DEFAULT_MAX_PAYLOAD: usize = 16;

/// One of the two fixed peers on the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// The microcontroller module.
    Mcu,
    /// The host computer.
    Host,
}

impl Location {
    /// The other end of the link.
    pub fn peer(self) -> Location {
        match self {
            Location::Mcu => Location::Host,
            Location::Host => Location::Mcu,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Mcu => write!(f, "mcu"),
            Location::Host => write!(f, "host"),
        }
    }
}

/// Frame-level addressing: a single peer, or every peer on the link.
///
/// Carried out-of-band on the [`Frame`], never encoded into the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Exactly one peer.
    Unit(Location),
    /// Broadcast to all peers.
    All,
}

impl Destination {
    /// Whether a frame with this destination should be applied at `local`.
    pub fn accepts(self, local: Location) -> bool {
        match self {
            Destination::Unit(loc) => loc == local,
            Destination::All => true,
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Unit(loc) => write!(f, "{loc}"),
            Destination::All => write!(f, "all"),
        }
    }
}

/// One link-layer message: a bounded byte payload plus a destination tag.
///
/// A frame is transiently owned by whichever pipeline stage is processing it
/// and moved by value into the transport, never aliased after handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Who this frame is for.
    pub destination: Destination,
    /// The encoded entries.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(destination: Destination, payload: impl Into<Bytes>) -> Self {
        Self {
            destination,
            payload: payload.into(),
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_is_involutive() {
        assert_eq!(Location::Mcu.peer(), Location::Host);
        assert_eq!(Location::Host.peer(), Location::Mcu);
        assert_eq!(Location::Mcu.peer().peer(), Location::Mcu);
    }

    #[test]
    fn unit_destination_accepts_only_its_peer() {
        let dest = Destination::Unit(Location::Host);
        assert!(dest.accepts(Location::Host));
        assert!(!dest.accepts(Location::Mcu));
    }

    #[test]
    fn broadcast_accepts_everyone() {
        assert!(Destination::All.accepts(Location::Mcu));
        assert!(Destination::All.accepts(Location::Host));
    }

    #[test]
    fn frame_length() {
        let frame = Frame::new(Destination::All, Bytes::from_static(&[1, 2, 3]));
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
    }
}
