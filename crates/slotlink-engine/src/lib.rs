//! The slotlink mailbox engine.
//!
//! A [`Mailbox`] owns a statically-configured slot table shared between two
//! peers over a narrow radio link. A periodic driver calls
//! [`rx_runtime`](Mailbox::rx_runtime) at high frequency,
//! [`tx_runtime`](Mailbox::tx_runtime) once per round, and
//! [`watchdog_check`](Mailbox::watchdog_check) on its own cadence;
//! application code reads and writes slots through the mutex-guarded access
//! façade ([`read`](Mailbox::read) / [`update`](Mailbox::update)) from any
//! thread.

pub mod ack;
pub mod clock;
pub mod engine;
pub mod error;
pub mod faults;
pub mod slot;
pub mod watchdog;

pub use ack::AckTracker;
pub use clock::{AdoptPeer, RoundClock, RoundSyncPolicy, SplitDifference, ROUND_MODULUS};
pub use engine::{Mailbox, MailboxConfig, RetryPolicy, SlotRead, TxRequest};
pub use error::{ConfigError, EngineError, Result};
pub use faults::{Fault, FaultSet};
pub use slot::{SlotConfig, SlotFlag, UpdateRate};
pub use watchdog::{Liveness, Watchdog};
