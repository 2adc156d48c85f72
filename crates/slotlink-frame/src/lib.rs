//! Entry-level wire codec for slotlink frames.
//!
//! This is the core value-add layer of slotlink. A frame payload is a
//! sequence of variable-length entries:
//! - `[slot_index][value bytes]` — a data entry; value width comes from the
//!   slot's configured kind (4 bytes for float32/uint32, 1 for boolean)
//! - `[0xFF][slot_index]` — an acknowledgment for a previously sent slot
//! - `[0xFE][round]` — the sender's round counter, for drift correction
//!
//! Packing is greedy first-fit in queue order; an entry is never split
//! across frames. Unpacking walks a bounds-checked cursor and never
//! desynchronizes on entries it has to discard.

pub mod entry;
pub mod error;
pub mod pack;
pub mod unpack;
pub mod value;

pub use entry::{WireEntry, ACK_INDEX, MAX_SLOTS, ROUND_UPDATE_INDEX};
pub use error::{FrameError, Result};
pub use pack::FrameBuilder;
pub use unpack::{unpack_frame, RxEvent};
pub use value::{Value, ValueKind};
