//! Slot-table mailbox messaging for two fixed peers over a narrow,
//! half-duplex, lossy radio link.
//!
//! Application code on each side reads and writes typed values through a
//! shared, statically-defined slot table; the engine schedules due slots,
//! packs them into link-sized frames, tracks delivery via acknowledgment,
//! and applies received values back to the table.
//!
//! # Crate Structure
//!
//! - [`transport`] — Link-level frame, locations, and the radio driver
//!   boundary trait
//! - [`frame`] — Variable-length, type-tagged entry codec
//! - [`engine`] — The mailbox engine: scheduler, pipelines, ack tracking,
//!   watchdog, access façade

/// Re-export transport types.
pub mod transport {
    pub use slotlink_transport::*;
}

/// Re-export frame codec types.
pub mod frame {
    pub use slotlink_frame::*;
}

/// Re-export engine types.
pub mod engine {
    pub use slotlink_engine::*;
}
