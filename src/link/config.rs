use crate::types::{Bitrate, CrcLength, EventHandler, Mode, TxPower};

use super::constants::PIPE_COUNT;

/// The stored address set: two base addresses, six pipe prefixes, the
/// transmit address, the uniform address width, and the active pipe count.
///
/// A pipe's on-air address is its prefix byte followed by the first
/// `address_width - 1` bytes of its base address. Pipe 0 resolves against
/// `base_address_0`; pipes 1-5 share `base_address_1` and differ only in
/// their prefix byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressSet {
    /// Base address backing pipe 0.
    pub base_address_0: [u8; 4],
    /// Base address shared by pipes 1-5.
    pub base_address_1: [u8; 4],
    /// One prefix byte per pipe.
    pub prefixes: [u8; PIPE_COUNT],
    /// Full transmit address (prefix byte first).
    pub tx_address: [u8; 5],
    /// Address width in bytes, uniform across all pipes.
    pub address_width: u8,
    /// Number of pipes in use.
    pub pipe_count: u8,
}

impl Default for AddressSet {
    /// The vendor default address set.
    fn default() -> Self {
        Self {
            base_address_0: [0xE7; 4],
            base_address_1: [0xC2; 4],
            prefixes: [0xE7, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6],
            tx_address: [0xE7; 5],
            address_width: 5,
            pipe_count: PIPE_COUNT as u8,
        }
    }
}

impl AddressSet {
    /// Compose the resolved on-air address for a receive pipe.
    ///
    /// Only the first `address_width` bytes of the returned array are
    /// meaningful.
    pub fn resolved(&self, pipe: usize) -> [u8; 5] {
        let base = if pipe == 0 {
            &self.base_address_0
        } else {
            &self.base_address_1
        };
        let mut bytes = [0u8; 5];
        bytes[0] = self.prefixes[pipe];
        bytes[1..].copy_from_slice(base);
        bytes
    }

    /// Would two active pipes resolve to the same on-air address?
    ///
    /// Pipes 1-5 share a base address, so duplicate prefixes among them are
    /// always ambiguous. Pipe 0 only collides with another pipe when the
    /// prefixes match *and* the base addresses agree over the shared width.
    pub(crate) fn has_collision(&self) -> bool {
        let count = (self.pipe_count as usize).min(PIPE_COUNT);
        let shared = self.address_width.saturating_sub(1) as usize;
        let bases_alias = self.base_address_0[..shared.min(4)] == self.base_address_1[..shared.min(4)];
        for a in 1..count {
            for b in (a + 1)..count {
                if self.prefixes[a] == self.prefixes[b] {
                    return true;
                }
            }
            if count > 0 && bases_alias && self.prefixes[0] == self.prefixes[a] {
                return true;
            }
        }
        false
    }
}

/// Operating parameters applied by [`Tpll::init()`](crate::link::Tpll::init).
///
/// This struct follows a builder pattern: start from
/// [`TpllConfig::default()`] and chain `with_*` calls.
/// ```
/// use tpll::link::TpllConfig;
/// use tpll::Bitrate;
///
/// let config = TpllConfig::default().with_bitrate(Bitrate::Kbps250);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TpllConfig {
    mode: Mode,
    bitrate: Bitrate,
    crc: CrcLength,
    tx_power: TxPower,
    event_handler: Option<EventHandler>,
    retry_delay: u16,
    retry_count: u8,
    preamble_len: u8,
    payload_len: u8,
    crc_filter_ack: bool,
}

impl Default for TpllConfig {
    /// The vendor default configuration: PTX role, 2 Mbps, 16-bit CRC,
    /// 0 dBm, 150 us retry delay, 5 retries, 8 byte preamble, 32 byte
    /// payloads, no event handler, CRC-filter acknowledgements off.
    fn default() -> Self {
        Self {
            mode: Mode::Ptx,
            bitrate: Bitrate::Mbps2,
            crc: CrcLength::Bit16,
            tx_power: TxPower::Dbm0,
            event_handler: None,
            retry_delay: 150,
            retry_count: 5,
            preamble_len: 8,
            payload_len: 32,
            crc_filter_ack: false,
        }
    }
}

impl TpllConfig {
    /// Returns the value set by [`TpllConfig::with_mode()`].
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The role this context operates in.
    pub fn with_mode(self, mode: Mode) -> Self {
        Self { mode, ..self }
    }

    /// Returns the value set by [`TpllConfig::with_bitrate()`].
    pub const fn bitrate(&self) -> Bitrate {
        self.bitrate
    }

    /// The on-air bitrate.
    pub fn with_bitrate(self, bitrate: Bitrate) -> Self {
        Self { bitrate, ..self }
    }

    /// Returns the value set by [`TpllConfig::with_crc_length()`].
    pub const fn crc_length(&self) -> CrcLength {
        self.crc
    }

    /// The CRC checksum width.
    pub fn with_crc_length(self, crc: CrcLength) -> Self {
        Self { crc, ..self }
    }

    /// Returns the value set by [`TpllConfig::with_tx_power()`].
    pub const fn tx_power(&self) -> TxPower {
        self.tx_power
    }

    /// The logical transmit power.
    pub fn with_tx_power(self, tx_power: TxPower) -> Self {
        Self { tx_power, ..self }
    }

    /// Returns the value set by [`TpllConfig::with_event_handler()`].
    pub const fn event_handler(&self) -> Option<EventHandler> {
        self.event_handler
    }

    /// The callback invoked for every event drained by
    /// [`Tpll::poll_events()`](crate::link::Tpll::poll_events).
    ///
    /// [`Tpll::init()`](crate::link::Tpll::init) rejects a configuration
    /// without one.
    pub fn with_event_handler(self, handler: EventHandler) -> Self {
        Self {
            event_handler: Some(handler),
            ..self
        }
    }

    /// Returns the value set by [`TpllConfig::with_auto_retry()`].
    pub const fn retry_delay(&self) -> u16 {
        self.retry_delay
    }

    /// Returns the value set by [`TpllConfig::with_auto_retry()`].
    pub const fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// The retry budget and the delay between resend attempts.
    ///
    /// A `count` of 0 disables retries: the first acknowledgement timeout is
    /// terminal.
    pub fn with_auto_retry(self, count: u8, delay_us: u16) -> Self {
        Self {
            retry_count: count,
            retry_delay: delay_us,
            ..self
        }
    }

    /// Returns the value set by [`TpllConfig::with_preamble_len()`].
    pub const fn preamble_len(&self) -> u8 {
        self.preamble_len
    }

    /// The on-air preamble length in bytes (1-16).
    pub fn with_preamble_len(self, preamble_len: u8) -> Self {
        Self {
            preamble_len,
            ..self
        }
    }

    /// Returns the value set by [`TpllConfig::with_payload_len()`].
    pub const fn payload_len(&self) -> u8 {
        self.payload_len
    }

    /// The nominal payload length in bytes (1-64).
    pub fn with_payload_len(self, payload_len: u8) -> Self {
        Self {
            payload_len,
            ..self
        }
    }

    /// Returns the value set by [`TpllConfig::with_crc_filter_ack()`].
    pub const fn crc_filter_ack(&self) -> bool {
        self.crc_filter_ack
    }

    /// Acknowledge packets that fail their CRC check (PRX role only).
    ///
    /// The corrupt payload is still dropped without an event; the
    /// acknowledgement merely suppresses a pointless retransmission by the
    /// sender.
    pub fn with_crc_filter_ack(self, enable: bool) -> Self {
        Self {
            crc_filter_ack: enable,
            ..self
        }
    }
}
