use slotlink_frame::ValueKind;

/// Errors surfaced to application callers through the access façade.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The slot index is outside the configured table.
    #[error("slot index {index} out of range (table has {slots} slots)")]
    InvalidIndex { index: usize, slots: usize },

    /// The written value's kind does not match the slot's configured kind.
    #[error("slot {index} holds {expected}, cannot write {got}")]
    KindMismatch {
        index: usize,
        expected: ValueKind,
        got: ValueKind,
    },
}

/// Errors reported when constructing a [`Mailbox`](crate::Mailbox).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The slot table has no entries.
    #[error("slot table is empty")]
    EmptyTable,

    /// The table exceeds the addressable index space (0xFE/0xFF are
    /// reserved sentinels).
    #[error("slot table has {count} slots, maximum is {max}")]
    TooManySlots { count: usize, max: usize },

    /// A slot names the same location as both source and destination.
    #[error("slot {index} has identical source and destination")]
    SelfAddressed { index: usize },

    /// The configured frame capacity cannot hold even the smallest entry.
    #[error("max payload of {max_payload} bytes cannot hold any entry")]
    PayloadTooSmall { max_payload: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
