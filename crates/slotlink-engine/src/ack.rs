use std::collections::VecDeque;

/// Tracks which outbound data entries still await acknowledgment.
///
/// Every packed data entry is marked here; the matching ack from the peer
/// clears it. At the start of the next transmit cycle, indices still marked
/// are reported as unacknowledged deliveries.
#[derive(Debug, Clone)]
pub struct AckTracker {
    awaiting: Vec<bool>,
    attempts: Vec<u8>,
    queue: VecDeque<u8>,
}

impl AckTracker {
    /// A tracker for `slots` table entries, all clear.
    pub fn new(slots: usize) -> Self {
        Self {
            awaiting: vec![false; slots],
            attempts: vec![0; slots],
            queue: VecDeque::with_capacity(slots),
        }
    }

    /// Record that a data entry for `slot` was just packed.
    pub fn mark_sent(&mut self, slot: u8) {
        if let Some(flag) = self.awaiting.get_mut(slot as usize) {
            *flag = true;
            self.queue.push_back(slot);
        }
    }

    /// Process an inbound ack. Returns false if the slot was not awaiting
    /// one (stale or duplicate ack).
    pub fn acknowledge(&mut self, slot: u8) -> bool {
        match self.awaiting.get_mut(slot as usize) {
            Some(flag) if *flag => {
                *flag = false;
                self.attempts[slot as usize] = 0;
                true
            }
            _ => false,
        }
    }

    /// Whether `slot` is awaiting an ack.
    pub fn is_awaiting(&self, slot: u8) -> bool {
        self.awaiting.get(slot as usize).copied().unwrap_or(false)
    }

    /// Drain the verification queue: returns the slots whose sends from the
    /// previous cycle were never acknowledged, clearing their awaiting flags
    /// so stale state cannot accumulate. Acknowledged entries are dropped
    /// silently.
    pub fn drain_unacked(&mut self) -> Vec<u8> {
        let mut unacked = Vec::new();
        while let Some(slot) = self.queue.pop_front() {
            if let Some(flag) = self.awaiting.get_mut(slot as usize) {
                if *flag {
                    *flag = false;
                    unacked.push(slot);
                }
            }
        }
        unacked
    }

    /// Count one delivery attempt for `slot`; returns the running total.
    pub fn record_attempt(&mut self, slot: u8) -> u8 {
        match self.attempts.get_mut(slot as usize) {
            Some(count) => {
                *count = count.saturating_add(1);
                *count
            }
            None => 0,
        }
    }

    /// Forget the attempt count for `slot`.
    pub fn reset_attempts(&mut self, slot: u8) {
        if let Some(count) = self.attempts.get_mut(slot as usize) {
            *count = 0;
        }
    }
}
