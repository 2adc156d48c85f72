use std::fmt;

/// One advisory fault kind. Faults accumulate; none of them aborts the
/// engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Fault {
    /// Transport reported a failure on receive.
    RxMsgApi = 1 << 0,
    /// An inbound entry referenced a slot beyond the table bound.
    RxInvalidIdx = 1 << 1,
    /// An ack arrived for a slot that was not awaiting one.
    RxUnexpectedAck = 1 << 2,
    /// The transmit request queue was full; the request was dropped.
    QueueFull = 1 << 3,
    /// Transport refused a frame on send.
    TxMsgApi = 1 << 4,
    /// Application passed a bad index or mismatched value kind.
    InvalidApiCall = 1 << 5,
    /// Internal engine inconsistency.
    Internal = 1 << 6,
    /// An inbound entry declared more bytes than the frame holds.
    RxMsgOverflow = 1 << 7,
}

impl Fault {
    const ALL: [Fault; 8] = [
        Fault::RxMsgApi,
        Fault::RxInvalidIdx,
        Fault::RxUnexpectedAck,
        Fault::QueueFull,
        Fault::TxMsgApi,
        Fault::InvalidApiCall,
        Fault::Internal,
        Fault::RxMsgOverflow,
    ];

    fn name(self) -> &'static str {
        match self {
            Fault::RxMsgApi => "RX_MSG_API_ERR",
            Fault::RxInvalidIdx => "RX_INVALID_IDX",
            Fault::RxUnexpectedAck => "RX_UNEXPECTED_ACK",
            Fault::QueueFull => "QUEUE_FULL",
            Fault::TxMsgApi => "TX_MSG_API_ERR",
            Fault::InvalidApiCall => "INVALID_API_CALL",
            Fault::Internal => "INTERNAL_ERR",
            Fault::RxMsgOverflow => "RX_MSG_OVERFLOW",
        }
    }
}

/// Accumulating OR'd set of [`Fault`]s. Advisory, never blocking: an
/// external console or telemetry layer queries and clears it.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultSet(u16);

impl FaultSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Record a fault. Recording an already-present fault is a no-op.
    pub fn insert(&mut self, fault: Fault) {
        self.0 |= fault as u16;
    }

    /// Whether the given fault has been recorded.
    pub fn contains(self, fault: Fault) -> bool {
        self.0 & fault as u16 != 0
    }

    /// Whether no fault has been recorded.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Forget all recorded faults.
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Raw bit representation.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Iterate over recorded faults.
    pub fn iter(self) -> impl Iterator<Item = Fault> {
        Fault::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl fmt::Display for FaultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for fault in self.iter() {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{}", fault.name())?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for FaultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaultSet({self})")
    }
}
