use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::link::Frame;
use crate::traits::LinkTransport;

/// In-memory link endpoint. Two of these form a bidirectional loopback pair
/// for tests and the simulator.
pub struct LoopbackLink {
    tx: Sender<Frame>,
    rx: Receiver<Frame>,
}

/// Create a connected pair of loopback endpoints.
pub fn loopback_pair() -> (LoopbackLink, LoopbackLink) {
    let (a_tx, b_rx) = channel();
    let (b_tx, a_rx) = channel();
    (
        LoopbackLink { tx: a_tx, rx: a_rx },
        LoopbackLink { tx: b_tx, rx: b_rx },
    )
}

impl LinkTransport for LoopbackLink {
    fn send(&mut self, frame: Frame) -> Result<()> {
        self.tx.send(frame).map_err(|_| TransportError::Closed)
    }

    fn receive(&mut self) -> Result<Option<Frame>> {
        match self.rx.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Closed),
        }
    }
}

/// Deterministically lossy wrapper: drops every `drop_every`-th outbound
/// frame. Used to exercise the ack/unacked machinery without randomness.
pub struct LossyLink<T> {
    inner: T,
    drop_every: usize,
    sent: usize,
}

impl<T> LossyLink<T> {
    /// Wrap a transport, dropping every `drop_every`-th sent frame.
    /// `drop_every == 0` disables loss.
    pub fn new(inner: T, drop_every: usize) -> Self {
        Self {
            inner,
            drop_every,
            sent: 0,
        }
    }

    /// Consume the wrapper and return the inner transport.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: LinkTransport> LinkTransport for LossyLink<T> {
    fn send(&mut self, frame: Frame) -> Result<()> {
        self.sent += 1;
        if self.drop_every != 0 && self.sent % self.drop_every == 0 {
            debug!(seq = self.sent, "lossy link dropped frame");
            return Ok(());
        }
        self.inner.send(frame)
    }

    fn receive(&mut self) -> Result<Option<Frame>> {
        self.inner.receive()
    }
}

/// A transport whose driver is wedged: sends are refused, nothing arrives.
pub struct BusyLink {
    queued: VecDeque<Frame>,
}

impl BusyLink {
    pub fn new() -> Self {
        Self {
            queued: VecDeque::new(),
        }
    }

    /// Stage a frame to be returned by the next `receive` call.
    pub fn stage(&mut self, frame: Frame) {
        self.queued.push_back(frame);
    }
}

impl Default for BusyLink {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkTransport for BusyLink {
    fn send(&mut self, _frame: Frame) -> Result<()> {
        Err(TransportError::Busy)
    }

    fn receive(&mut self) -> Result<Option<Frame>> {
        Ok(self.queued.pop_front())
    }
}
