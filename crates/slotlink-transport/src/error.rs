/// Errors that can occur at the link transport boundary.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport could not accept the frame right now (radio busy,
    /// driver buffer full). The frame is dropped; delivery tracking is the
    /// engine's concern.
    #[error("transport busy, frame not handed off")]
    Busy,

    /// The other end of the link is gone.
    #[error("link closed")]
    Closed,

    /// The driver reported a hardware-level receive fault.
    #[error("receive fault (driver error bits {bits:#06x})")]
    ReceiveFault { bits: u16 },
}

pub type Result<T> = std::result::Result<T, TransportError>;
