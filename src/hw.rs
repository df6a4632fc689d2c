//! Hardware collaborator contracts consumed by the link layer.
//!
//! The link layer never touches registers. It drives an opaque radio
//! back-end through [`RadioBackend`], reads a monotonic microsecond counter
//! through [`Monotonic`], and borrows the caller's
//! [`DelayNs`](embedded_hal::delay::DelayNs) implementation for the
//! settle/wait windows. Pin muxing and clock bring-up stay with the caller.

use crate::types::{Bitrate, CrcLength};

/// Outcome of the operation most recently started on the back-end.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// The transmission finished.
    TxDone,
    /// The listen window elapsed without a packet.
    RxTimeout,
    /// A packet addressed to an enabled hardware pipe arrived.
    RxPacket {
        /// Hardware pipe the packet's address matched.
        pipe: u8,
        /// On-air payload length in bytes.
        length: u8,
        /// Packet id from the on-air header.
        pid: u8,
        /// The sender set the no-acknowledgement flag.
        no_ack: bool,
        /// The packet's CRC checked out.
        crc_ok: bool,
    },
}

/// A single register-level setting pushed down to the back-end.
///
/// Power and modulation-index values are pre-resolved to register encodings
/// by the lookup tables in [`types`](crate::types), so a back-end never sees
/// the logical enums.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioParam {
    /// On-air bitrate.
    Bitrate(Bitrate),
    /// RF channel as an offset from the 2.4 GHz base.
    Channel(u8),
    /// Transmit power register encoding.
    TxPower(u8),
    /// Transmit modulation index register encoding.
    TxMi(u8),
    /// Receive modulation index register encoding.
    RxMi(u8),
    /// CRC checksum width.
    CrcLength(CrcLength),
    /// Preamble length in bytes.
    PreambleLength(u8),
    /// Whether the receiver requires a preamble match before accepting a
    /// packet.
    PreambleDetect(bool),
    /// Address width in bytes, uniform across all pipes.
    AddressWidth(u8),
    /// Resolved on-air address for one receive pipe.
    PipeAddress {
        /// Receive pipe index (0-5).
        pipe: u8,
        /// Prefix byte followed by base-address bytes; only the first
        /// address-width bytes are meaningful.
        bytes: [u8; 5],
    },
    /// Resolved on-air transmit address.
    TxAddress([u8; 5]),
    /// Bitmask of receive pipes with address matching enabled.
    PipeEnable(u8),
}

/// An opaque radio back-end.
///
/// Implementations own the register encoding; the contract is limited to
/// "begin transmit", "begin receive", "operation done", its outcome, and a
/// signal-strength sample. Completion of an operation is expected to raise
/// the interrupt that ends in [`Tpll::radio_irq()`](crate::link::Tpll::radio_irq).
pub trait RadioBackend {
    /// Hardware fault type surfaced through
    /// [`Error::Radio`](crate::types::Error::Radio).
    type Error;

    /// Put `bytes` on the air. An empty slice transmits a bare
    /// acknowledgement frame.
    fn begin_tx(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Start listening. A `timeout_us` of `None` listens until stopped.
    fn begin_rx(&mut self, timeout_us: Option<u16>) -> Result<(), Self::Error>;

    /// Has the operation started by [`RadioBackend::begin_tx`] or
    /// [`RadioBackend::begin_rx`] finished?
    fn is_done(&mut self) -> Result<bool, Self::Error>;

    /// Consume the finished operation's outcome. Received payload bytes are
    /// copied into `buf`.
    fn completion(&mut self, buf: &mut [u8]) -> Result<Completion, Self::Error>;

    /// Signal strength (dBm) sampled during the most recent receive.
    fn rssi(&mut self) -> Result<i32, Self::Error>;

    /// Abort whatever is in flight and quiet the radio.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Apply one register-level setting.
    fn configure(&mut self, param: RadioParam) -> Result<(), Self::Error>;
}

/// A free-running microsecond counter for timeout and timestamp arithmetic.
///
/// Wrap-around is the caller's concern; the link layer only stores and
/// compares raw values.
pub trait Monotonic {
    /// The current counter value in microseconds.
    fn now_us(&mut self) -> u32;
}
