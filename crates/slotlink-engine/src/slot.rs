use std::num::NonZeroU8;

use serde::{Deserialize, Serialize};
use slotlink_frame::{Value, ValueKind};
use slotlink_transport::Location;

/// How often a slot is scheduled for transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateRate {
    /// Transmit every `n` rounds (1 = every round).
    EveryRounds(NonZeroU8),
    /// Transmit only on explicit local change.
    Async,
}

impl UpdateRate {
    /// Whether a periodic slot is due at `round`. Async slots are never due
    /// by the clock alone; their pending flag drives them.
    pub fn is_due(self, round: u8) -> bool {
        match self {
            UpdateRate::EveryRounds(n) => round % n.get() == 0,
            UpdateRate::Async => false,
        }
    }
}

/// One-shot change notification on a slot. Overwritten, never accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotFlag {
    /// No unconsumed change.
    #[default]
    None,
    /// A local async write is waiting to be transmitted.
    TransmitPending,
    /// A value arrived from the peer and has not been read yet.
    ReceivePending,
}

/// Static description of one slot, fixed at configuration time.
///
/// Both peers carry an identical table; a slot's direction is derived by
/// comparing `source` against the local location, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Human-readable name, for logs and table output only.
    pub name: String,
    /// Initial value; also fixes the slot's kind.
    pub initial: Value,
    /// Transmission schedule.
    pub rate: UpdateRate,
    /// The peer that produces this value.
    pub source: Location,
    /// The peer that consumes it.
    pub destination: Location,
}

impl SlotConfig {
    /// The slot's value kind, implied by its initial value.
    pub fn kind(&self) -> ValueKind {
        self.initial.kind()
    }
}

/// Runtime state of one table entry.
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub config: SlotConfig,
    pub value: Value,
    pub flag: SlotFlag,
}

impl Slot {
    pub fn new(config: SlotConfig) -> Self {
        let value = config.initial;
        Self {
            config,
            value,
            flag: SlotFlag::None,
        }
    }

    /// Whether this peer transmits the slot.
    pub fn outbound(&self, local: Location) -> bool {
        self.config.source == local
    }
}
