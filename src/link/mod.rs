//! The link-layer context and its operations.
//!
//! [`Tpll`] owns all protocol state: the operating configuration, the pipe
//! and address table, the per-pipe payload queues, the retry engine, the
//! state machine, and the bounded event channel. Hardware is dependency
//! injected through the seams in [`hw`](crate::hw), so multiple independent
//! radio contexts can coexist and tests can script the radio.

use embedded_hal::delay::DelayNs;
use heapless::Deque;

use crate::hw::{Monotonic, RadioBackend};
use crate::types::{Event, EventHandler, State};

pub mod constants;
use constants::{
    DEFAULT_RX_SETTLE_US, DEFAULT_RX_TIMEOUT_US, DEFAULT_RX_WAIT_US, DEFAULT_TX_SETTLE_US,
    DEFAULT_TX_WAIT_US, EVENT_QUEUE_DEPTH, PIPE_COUNT, RX_FIFO_DEPTH, TX_FIFO_DEPTH,
};

mod config;
pub use config::{AddressSet, TpllConfig};

mod payload;
pub use payload::Payload;

mod retry;
use retry::RetryEngine;

mod fsm;
mod init;
mod pipe;

/// Microsecond windows driven by the state machine.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Timing {
    pub(crate) tx_settle: u16,
    pub(crate) rx_settle: u16,
    pub(crate) tx_wait: u16,
    pub(crate) rx_wait: u16,
    pub(crate) rx_timeout: u16,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tx_settle: DEFAULT_TX_SETTLE_US,
            rx_settle: DEFAULT_RX_SETTLE_US,
            tx_wait: DEFAULT_TX_WAIT_US,
            rx_wait: DEFAULT_RX_WAIT_US,
            rx_timeout: DEFAULT_RX_TIMEOUT_US,
        }
    }
}

/// A TPLL link-layer context.
///
/// Generic over the injected collaborators: a radio back-end, a monotonic
/// microsecond counter, and a microsecond delay implementation.
pub struct Tpll<RADIO, MONO, DELAY> {
    pub(crate) radio: RADIO,
    pub(crate) clock: MONO,
    pub(crate) delay: DELAY,
    pub(crate) config: TpllConfig,
    pub(crate) addresses: AddressSet,
    /// Bitmask of open receive pipes.
    pub(crate) open_pipes: u8,
    /// Receive-pipe index whose queue feeds `start_tx`.
    pub(crate) tx_pipe: usize,
    pub(crate) tx_queues: [Deque<Payload, TX_FIFO_DEPTH>; PIPE_COUNT],
    /// Received payloads paired with their arrival timestamp.
    pub(crate) rx_queue: Deque<(Payload, u32), RX_FIFO_DEPTH>,
    /// The most recently transmitted payload, kept for `reuse_tx`.
    pub(crate) reuse_slot: Option<Payload>,
    /// Timestamp of the last dequeued payload; cleared by an empty dequeue.
    pub(crate) rx_timestamp: Option<u32>,
    pub(crate) retry: RetryEngine,
    pub(crate) state: State,
    pub(crate) timing: Timing,
    /// Channel hop deferred to the next Idle transition.
    pub(crate) pending_channel: Option<u8>,
    pub(crate) events: Deque<Event, EVENT_QUEUE_DEPTH>,
    pub(crate) handler: Option<EventHandler>,
}

impl<RADIO, MONO, DELAY> Tpll<RADIO, MONO, DELAY>
where
    RADIO: RadioBackend,
    MONO: Monotonic,
    DELAY: DelayNs,
{
    /// Instantiate a context around the given collaborators.
    ///
    /// The context starts Idle with the vendor default configuration and
    /// address set; call [`Tpll::init()`] before starting an operation.
    pub fn new(radio: RADIO, clock: MONO, delay: DELAY) -> Self {
        let config = TpllConfig::default();
        Self {
            radio,
            clock,
            delay,
            config,
            addresses: AddressSet::default(),
            open_pipes: 0,
            tx_pipe: 0,
            tx_queues: core::array::from_fn(|_| Deque::new()),
            rx_queue: Deque::new(),
            reuse_slot: None,
            rx_timestamp: None,
            retry: RetryEngine::new(config.retry_count(), config.retry_delay()),
            state: State::Idle,
            timing: Timing::default(),
            pending_channel: None,
            events: Deque::new(),
            handler: None,
        }
    }

    /// The state machine's current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Transmission attempts burned by the current (or last finished)
    /// transmit cycle.
    pub fn transmit_attempts(&self) -> u8 {
        self.retry.attempts()
    }

    /// Payloads lost since [`Tpll::init()`] zeroed the counters.
    pub fn packets_lost(&self) -> u8 {
        self.retry.lost()
    }

    /// Give the radio back-end back to the caller.
    pub fn release(self) -> RADIO {
        self.radio
    }
}
