//! Protocol limits, timing windows, and vendor defaults.

/// Maximum payload length in bytes.
pub const MAX_PAYLOAD_LENGTH: usize = 64;

/// Number of addressable receive pipes.
pub const PIPE_COUNT: usize = 6;

/// Depth of each pipe's transmit queue.
pub const TX_FIFO_DEPTH: usize = 3;

/// Depth of the shared receive queue.
pub const RX_FIFO_DEPTH: usize = 6;

/// Capacity of the bounded event channel drained by
/// [`Tpll::poll_events()`](crate::link::Tpll::poll_events).
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Valid TX settle window, in microseconds.
pub const TX_SETTLE_US_MIN: u16 = 108;
pub const TX_SETTLE_US_MAX: u16 = 4095;

/// Valid RX settle window, in microseconds.
pub const RX_SETTLE_US_MIN: u16 = 85;
pub const RX_SETTLE_US_MAX: u16 = 4095;

/// Valid acknowledgement listen window, in microseconds.
pub const RX_TIMEOUT_US_MIN: u16 = 85;
pub const RX_TIMEOUT_US_MAX: u16 = 4095;

/// Valid wait between a transmission's end and the acknowledgement listen
/// window, in microseconds.
pub const RX_WAIT_US_MIN: u16 = 5;
pub const RX_WAIT_US_MAX: u16 = 4096;

/// Valid wait between a received packet and its acknowledgement reply,
/// in microseconds.
pub const TX_WAIT_US_MIN: u16 = 5;
pub const TX_WAIT_US_MAX: u16 = 4096;

/// Valid preamble length, in bytes.
pub const PREAMBLE_LEN_MIN: u8 = 1;
pub const PREAMBLE_LEN_MAX: u8 = 16;

/// Highest RF channel accepted by the channel setters.
pub const CHANNEL_MAX: u8 = 125;

pub(crate) const DEFAULT_TX_SETTLE_US: u16 = 114;
pub(crate) const DEFAULT_RX_SETTLE_US: u16 = 114;
pub(crate) const DEFAULT_TX_WAIT_US: u16 = 5;
pub(crate) const DEFAULT_RX_WAIT_US: u16 = 5;
pub(crate) const DEFAULT_RX_TIMEOUT_US: u16 = 500;
