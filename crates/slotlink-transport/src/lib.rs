//! Link-level types and the transport boundary for slotlink.
//!
//! The radio driver ("message API") lives outside this workspace; everything
//! the engine needs from it is captured by the [`LinkTransport`] trait. This
//! crate also defines the [`Frame`] moved across that boundary and the two
//! communicating [`Location`]s.
//!
//! This is the lowest layer of slotlink. Everything else builds on top of
//! the types provided here.

pub mod error;
pub mod link;
pub mod loopback;
pub mod traits;

pub use error::{Result, TransportError};
pub use link::{Destination, Frame, Location, DEFAULT_MAX_PAYLOAD};
pub use loopback::{loopback_pair, BusyLink, LoopbackLink, LossyLink};
pub use traits::LinkTransport;
