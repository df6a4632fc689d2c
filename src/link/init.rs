use embedded_hal::delay::DelayNs;

use crate::hw::{Monotonic, RadioBackend, RadioParam};
use crate::types::{Bitrate, Error, EventHandler, Mode, ModulationIndex, State, TxPower};

use super::constants::{
    CHANNEL_MAX, MAX_PAYLOAD_LENGTH, PREAMBLE_LEN_MAX, PREAMBLE_LEN_MIN,
};
use super::{AddressSet, RetryEngine, Tpll, TpllConfig};

impl<RADIO, MONO, DELAY> Tpll<RADIO, MONO, DELAY>
where
    RADIO: RadioBackend,
    MONO: Monotonic,
    DELAY: DelayNs,
{
    /// Apply an operating configuration.
    ///
    /// Fails with [`Error::NullParam`] when `config` carries no event
    /// handler, and with [`Error::InvalidParam`] when the preamble or
    /// payload length is out of range. On success the pipe table is reset to
    /// the default address set with the configured number of pipes open, the
    /// retry counters are zeroed, the handler is installed, and the machine
    /// is left Idle.
    pub fn init(&mut self, config: &TpllConfig) -> Result<(), Error<RADIO::Error>> {
        let handler = config.event_handler().ok_or(Error::NullParam)?;
        if !(PREAMBLE_LEN_MIN..=PREAMBLE_LEN_MAX).contains(&config.preamble_len()) {
            return Err(Error::InvalidParam);
        }
        if config.payload_len() == 0 || config.payload_len() as usize > MAX_PAYLOAD_LENGTH {
            return Err(Error::InvalidParam);
        }

        self.config = *config;
        self.handler = Some(handler);
        self.addresses = AddressSet::default();
        self.open_pipes = (1u16 << self.addresses.pipe_count).wrapping_sub(1) as u8;
        self.tx_pipe = 0;
        for queue in self.tx_queues.iter_mut() {
            queue.clear();
        }
        self.rx_queue.clear();
        self.reuse_slot = None;
        self.rx_timestamp = None;
        self.retry = RetryEngine::new(config.retry_count(), config.retry_delay());
        self.events.clear();
        self.pending_channel = None;
        self.state = State::Idle;

        self.push_param(RadioParam::Bitrate(config.bitrate()))?;
        self.push_param(RadioParam::CrcLength(config.crc_length()))?;
        self.push_param(RadioParam::TxPower(config.tx_power().register_value()))?;
        self.push_param(RadioParam::PreambleLength(config.preamble_len()))?;
        self.sync_addresses()
    }

    /// Reject with [`Error::Busy`] unless the machine is Idle.
    ///
    /// Parameter changes while an operation is active would corrupt the
    /// in-flight transmission, so they are rejected rather than deferred.
    pub(crate) fn ensure_idle(&self) -> Result<(), Error<RADIO::Error>> {
        if self.state == State::Idle {
            Ok(())
        } else {
            Err(Error::Busy)
        }
    }

    pub(crate) fn push_param(&mut self, param: RadioParam) -> Result<(), Error<RADIO::Error>> {
        self.radio.configure(param).map_err(Error::Radio)
    }

    /// Switch the context's role. Only allowed while Idle.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        self.config = self.config.with_mode(mode);
        Ok(())
    }

    /// Set the on-air bitrate. Only allowed while Idle.
    pub fn set_bitrate(&mut self, bitrate: Bitrate) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        self.config = self.config.with_bitrate(bitrate);
        self.push_param(RadioParam::Bitrate(bitrate))
    }

    /// Set the RF channel (0-125). Only allowed while Idle.
    pub fn set_channel(&mut self, channel: u8) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        if channel > CHANNEL_MAX {
            return Err(Error::InvalidParam);
        }
        self.push_param(RadioParam::Channel(channel))
    }

    /// Request a channel hop.
    ///
    /// While Idle this behaves like [`Tpll::set_channel()`]. While an
    /// operation is active the hop is deferred and applied at the next Idle
    /// transition instead of being rejected.
    pub fn set_new_channel(&mut self, channel: u8) -> Result<(), Error<RADIO::Error>> {
        if channel > CHANNEL_MAX {
            return Err(Error::InvalidParam);
        }
        if self.state == State::Idle {
            self.push_param(RadioParam::Channel(channel))
        } else {
            self.pending_channel = Some(channel);
            Ok(())
        }
    }

    /// Set the transmit power. Only allowed while Idle.
    pub fn set_tx_power(&mut self, power: TxPower) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        self.config = self.config.with_tx_power(power);
        self.push_param(RadioParam::TxPower(power.register_value()))
    }

    /// Set the transmitter's modulation index. Only allowed while Idle.
    pub fn set_tx_mi(&mut self, mi: ModulationIndex) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        self.push_param(RadioParam::TxMi(mi.register_value()))
    }

    /// Set the receiver's modulation index. Only allowed while Idle.
    pub fn set_rx_mi(&mut self, mi: ModulationIndex) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        self.push_param(RadioParam::RxMi(mi.register_value()))
    }

    /// Set the on-air preamble length in bytes (1-16). Only allowed while
    /// Idle.
    pub fn set_preamble_len(&mut self, length: u8) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        if !(PREAMBLE_LEN_MIN..=PREAMBLE_LEN_MAX).contains(&length) {
            return Err(Error::InvalidParam);
        }
        self.config = self.config.with_preamble_len(length);
        self.push_param(RadioParam::PreambleLength(length))
    }

    /// Returns the configured preamble length in bytes.
    pub fn preamble_len(&self) -> u8 {
        self.config.preamble_len()
    }

    /// Enable or disable preamble detection on the receiver. Only allowed
    /// while Idle.
    pub fn set_preamble_detect(&mut self, enable: bool) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        self.push_param(RadioParam::PreambleDetect(enable))
    }

    /// The event handler installed by [`Tpll::init()`], if any.
    pub fn event_handler(&self) -> Option<EventHandler> {
        self.handler
    }

    /// Set the retry budget and the delay between resend attempts.
    ///
    /// A `count` of 0 disables retries. Only allowed while Idle; both
    /// counters are zeroed.
    pub fn set_auto_retry(&mut self, count: u8, delay_us: u16) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        self.config = self.config.with_auto_retry(count, delay_us);
        self.retry.configure(count, delay_us);
        Ok(())
    }
}
