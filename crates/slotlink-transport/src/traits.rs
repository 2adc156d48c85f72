use crate::error::Result;
use crate::link::Frame;

/// The radio driver boundary ("message API").
///
/// Implementations are expected to be non-blocking or bounded: [`send`]
/// either hands the frame to the driver or fails with
/// [`TransportError::Busy`](crate::TransportError::Busy); [`receive`] returns
/// `Ok(None)` immediately when no frame is pending.
///
/// The engine never calls into the transport while holding its state lock,
/// so implementations are free to take their time within the bound.
///
/// [`send`]: LinkTransport::send
/// [`receive`]: LinkTransport::receive
pub trait LinkTransport {
    /// Hand one frame to the driver for transmission.
    fn send(&mut self, frame: Frame) -> Result<()>;

    /// Poll for one inbound frame.
    fn receive(&mut self) -> Result<Option<Frame>>;
}
