/// Errors that can occur during entry encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An index byte references a slot beyond the table bound.
    #[error("invalid slot index {index} (table has {slots} slots)")]
    InvalidIndex { index: u8, slots: usize },

    /// An entry's declared payload would read past the end of the frame.
    #[error("entry needs {needed} more bytes, frame has {remaining}")]
    Overflow { needed: usize, remaining: usize },

    /// A single entry is larger than the frame capacity and can never be
    /// packed.
    #[error("entry of {size} bytes exceeds frame capacity {max}")]
    EntryTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
