//! The retry/acknowledgement engine.
//!
//! Tracks how many transmission attempts the current cycle has burned and
//! how many payloads have been lost since the counters were last zeroed.
//! The state machine consults it on every acknowledgement timeout.

/// What the state machine should do after an acknowledgement timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Re-enter the settle/transmit cycle after this many microseconds.
    Retry(u16),
    /// The budget is spent; raise the terminal transmit-failed event.
    Fail,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RetryEngine {
    limit: u8,
    delay_us: u16,
    attempts: u8,
    lost: u8,
}

impl RetryEngine {
    pub(crate) const fn new(limit: u8, delay_us: u16) -> Self {
        Self {
            limit,
            delay_us,
            attempts: 0,
            lost: 0,
        }
    }

    /// Install a new budget and zero both counters.
    pub(crate) fn configure(&mut self, limit: u8, delay_us: u16) {
        self.limit = limit;
        self.delay_us = delay_us;
        self.attempts = 0;
        self.lost = 0;
    }

    /// Called when a new transmit cycle starts.
    ///
    /// The attempt counter is reset here rather than when the budget runs
    /// out, so it still reads the exhausted budget from inside the
    /// transmit-failed event handler.
    pub(crate) fn begin_cycle(&mut self) {
        self.attempts = 0;
    }

    /// Record one acknowledgement timeout and decide what happens next.
    pub(crate) fn on_ack_timeout(&mut self) -> Verdict {
        self.attempts = self.attempts.saturating_add(1);
        if self.limit == 0 || self.attempts >= self.limit {
            self.lost = self.lost.wrapping_add(1);
            Verdict::Fail
        } else {
            Verdict::Retry(self.delay_us)
        }
    }

    /// Transmission attempts burned by the current (or last finished) cycle.
    pub(crate) const fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Payloads lost since the counters were last zeroed.
    pub(crate) const fn lost(&self) -> u8 {
        self.lost
    }
}
