/// The round counter wraps in `[0, ROUND_MODULUS)`.
pub const ROUND_MODULUS: u8 = 100;

/// Monotonic round counter driving all scheduling decisions.
///
/// Advances by exactly one per scheduler tick and wraps at
/// [`ROUND_MODULUS`]. Wrapping does not disturb per-slot due-ness: `0 % r`
/// is defined for every configured rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundClock {
    round: u8,
}

impl RoundClock {
    pub fn new() -> Self {
        Self { round: 0 }
    }

    /// The current round.
    pub fn round(self) -> u8 {
        self.round
    }

    /// Advance one round.
    pub fn tick(&mut self) {
        self.round = (self.round + 1) % ROUND_MODULUS;
    }

    /// Overwrite the counter, reducing into range.
    pub fn set_round(&mut self, round: u8) {
        self.round = round % ROUND_MODULUS;
    }
}

/// Strategy for correcting the local round counter from a peer's
/// round-update entry. Must be deterministic.
pub trait RoundSyncPolicy: Send + Sync {
    /// Given the local and peer counters (both in `[0, ROUND_MODULUS)`),
    /// return the corrected local counter.
    fn resync(&self, local: u8, peer: u8) -> u8;
}

/// Adopt the peer's counter verbatim. Idempotent; the default policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdoptPeer;

impl RoundSyncPolicy for AdoptPeer {
    fn resync(&self, _local: u8, peer: u8) -> u8 {
        peer % ROUND_MODULUS
    }
}

/// Move halfway toward the peer along the shortest wrap-aware arc.
/// Converges over repeated updates instead of jumping.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitDifference;

impl RoundSyncPolicy for SplitDifference {
    fn resync(&self, local: u8, peer: u8) -> u8 {
        let m = i16::from(ROUND_MODULUS);
        let mut diff = (i16::from(peer) - i16::from(local)).rem_euclid(m);
        if diff > m / 2 {
            diff -= m;
        }
        // Round the half-step away from zero so a one-round drift still
        // closes instead of stalling forever.
        let step = if diff >= 0 {
            (diff + 1) / 2
        } else {
            (diff - 1) / 2
        };
        (i16::from(local) + step).rem_euclid(m) as u8
    }
}
