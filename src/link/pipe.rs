use embedded_hal::delay::DelayNs;

use crate::hw::{Monotonic, RadioBackend, RadioParam};
use crate::types::{Error, PipeId};

use super::constants::PIPE_COUNT;
use super::Tpll;

impl<RADIO, MONO, DELAY> Tpll<RADIO, MONO, DELAY>
where
    RADIO: RadioBackend,
    MONO: Monotonic,
    DELAY: DelayNs,
{
    /// Open one receive pipe, or all of them with [`PipeId::All`].
    ///
    /// The all-pipes form cannot partially fail: the stored mask and the
    /// back-end are updated in one step.
    pub fn open_pipe(&mut self, pipe: PipeId) -> Result<(), Error<RADIO::Error>> {
        let mask = match pipe {
            PipeId::All => self.active_mask(),
            other => {
                let index = self.rx_index(other)?;
                self.open_pipes | (1 << index)
            }
        };
        self.open_pipes = mask;
        self.push_param(RadioParam::PipeEnable(mask))
    }

    /// Close one receive pipe, or all of them with [`PipeId::All`].
    pub fn close_pipe(&mut self, pipe: PipeId) -> Result<(), Error<RADIO::Error>> {
        let mask = match pipe {
            PipeId::All => 0,
            other => {
                let index = self.rx_index(other)?;
                self.open_pipes & !(1 << index)
            }
        };
        self.open_pipes = mask;
        self.push_param(RadioParam::PipeEnable(mask))
    }

    /// Is the pipe open? The TX and all-pipes sentinels report `false`.
    pub fn get_pipe_status(&self, pipe: PipeId) -> bool {
        match pipe.index() {
            Some(index) => self.open_pipes & (1 << index) != 0,
            None => false,
        }
    }

    /// Store an address.
    ///
    /// Pipe 0 and the TX pipe take the full address-width bytes; pipes 1-5
    /// store only the one-byte prefix from `address[0]` and keep sharing the
    /// remaining bytes of the second base address. Returns how many bytes
    /// were consumed. Only allowed while Idle.
    pub fn set_address(&mut self, pipe: PipeId, address: &[u8]) -> Result<usize, Error<RADIO::Error>> {
        self.ensure_idle()?;
        let width = self.addresses.address_width as usize;
        match pipe {
            PipeId::Pipe0 => {
                if address.len() < width {
                    return Err(Error::InvalidParam);
                }
                self.addresses.prefixes[0] = address[0];
                self.addresses.base_address_0[..width - 1].copy_from_slice(&address[1..width]);
                self.sync_pipe(0)?;
                Ok(width)
            }
            PipeId::Tx => {
                if address.len() < width {
                    return Err(Error::InvalidParam);
                }
                self.addresses.tx_address[..width].copy_from_slice(&address[..width]);
                let tx_address = self.addresses.tx_address;
                self.push_param(RadioParam::TxAddress(tx_address))?;
                Ok(width)
            }
            PipeId::All => Err(Error::InvalidParam),
            other => {
                let index = self.rx_index(other)?;
                if address.is_empty() {
                    return Err(Error::InvalidParam);
                }
                self.addresses.prefixes[index] = address[0];
                self.sync_pipe(index)?;
                Ok(1)
            }
        }
    }

    /// Read an address back, mirroring the [`Tpll::set_address()`]
    /// asymmetry: the full width for pipe 0 and the TX pipe, the single
    /// prefix byte for pipes 1-5. Returns how many bytes were written into
    /// `address`.
    pub fn get_address(&self, pipe: PipeId, address: &mut [u8]) -> Result<usize, Error<RADIO::Error>> {
        let width = self.addresses.address_width as usize;
        match pipe {
            PipeId::Pipe0 => {
                if address.len() < width {
                    return Err(Error::InvalidParam);
                }
                address[..width].copy_from_slice(&self.addresses.resolved(0)[..width]);
                Ok(width)
            }
            PipeId::Tx => {
                if address.len() < width {
                    return Err(Error::InvalidParam);
                }
                address[..width].copy_from_slice(&self.addresses.tx_address[..width]);
                Ok(width)
            }
            PipeId::All => Err(Error::InvalidParam),
            other => {
                let index = self.rx_index(other)?;
                if address.is_empty() {
                    return Err(Error::InvalidParam);
                }
                address[0] = self.addresses.prefixes[index];
                Ok(1)
            }
        }
    }

    /// Set the uniform address width. Only {3, 4, 5} are accepted; any
    /// other value is rejected without touching the stored width. Only
    /// allowed while Idle.
    pub fn set_address_width(&mut self, width: u8) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        if !(3..=5).contains(&width) {
            return Err(Error::InvalidParam);
        }
        self.addresses.address_width = width;
        self.sync_addresses()
    }

    /// Returns the configured address width in bytes.
    pub fn get_address_width(&self) -> u8 {
        self.addresses.address_width
    }

    /// Replace the base address backing pipe 0.
    ///
    /// Rejected with [`Error::InvalidState`] when the result would leave two
    /// pipes with the same resolved address; nothing is stored in that case.
    /// Only allowed while Idle.
    pub fn set_base_address_0(&mut self, base: [u8; 4]) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        let mut tentative = self.addresses;
        tentative.base_address_0 = base;
        if tentative.has_collision() {
            return Err(Error::InvalidState);
        }
        self.addresses = tentative;
        self.sync_pipe(0)
    }

    /// Replace the base address shared by pipes 1-5.
    ///
    /// Same collision rule as [`Tpll::set_base_address_0()`]. Only allowed
    /// while Idle.
    pub fn set_base_address_1(&mut self, base: [u8; 4]) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        let mut tentative = self.addresses;
        tentative.base_address_1 = base;
        if tentative.has_collision() {
            return Err(Error::InvalidState);
        }
        self.addresses = tentative;
        for pipe in 1..(self.addresses.pipe_count as usize) {
            self.sync_pipe(pipe)?;
        }
        Ok(())
    }

    /// Replace the pipe prefixes; the slice length becomes the active pipe
    /// count.
    ///
    /// More than 6 prefixes is rejected with [`Error::InvalidParam`]; a
    /// prefix set that would make two pipes indistinguishable is rejected
    /// with [`Error::InvalidState`]. Neither failure mutates stored state.
    /// Only allowed while Idle.
    pub fn set_prefixes(&mut self, prefixes: &[u8]) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        if prefixes.len() > PIPE_COUNT {
            return Err(Error::InvalidParam);
        }
        let mut tentative = self.addresses;
        tentative.prefixes[..prefixes.len()].copy_from_slice(prefixes);
        tentative.pipe_count = prefixes.len() as u8;
        if tentative.has_collision() {
            return Err(Error::InvalidState);
        }
        self.addresses = tentative;
        self.open_pipes &= self.active_mask();
        self.sync_addresses()
    }

    /// Select which pipe's transmit queue feeds
    /// [`Tpll::start_tx()`](Tpll::start_tx).
    pub fn set_tx_pipe(&mut self, pipe: PipeId) -> Result<(), Error<RADIO::Error>> {
        self.tx_pipe = self.rx_index(pipe)?;
        Ok(())
    }

    /// The pipe currently selected as the TX pipe.
    pub fn tx_pipe(&self) -> PipeId {
        // tx_pipe is always kept in range by set_tx_pipe
        PipeId::from_index(self.tx_pipe as u8).unwrap_or(PipeId::Pipe0)
    }

    /// Bitmask covering every pipe the address set declares active.
    fn active_mask(&self) -> u8 {
        (1u16 << self.addresses.pipe_count).wrapping_sub(1) as u8
    }

    /// Resolve a single-receive-pipe id against the active pipe count.
    fn rx_index(&self, pipe: PipeId) -> Result<usize, Error<RADIO::Error>> {
        match pipe.index() {
            Some(index) if index < self.addresses.pipe_count as usize => Ok(index),
            _ => Err(Error::InvalidParam),
        }
    }

    /// Push the whole address table down to the back-end.
    pub(crate) fn sync_addresses(&mut self) -> Result<(), Error<RADIO::Error>> {
        self.push_param(RadioParam::AddressWidth(self.addresses.address_width))?;
        for pipe in 0..(self.addresses.pipe_count as usize) {
            self.sync_pipe(pipe)?;
        }
        let tx_address = self.addresses.tx_address;
        self.push_param(RadioParam::TxAddress(tx_address))?;
        let mask = self.open_pipes;
        self.push_param(RadioParam::PipeEnable(mask))
    }

    fn sync_pipe(&mut self, pipe: usize) -> Result<(), Error<RADIO::Error>> {
        let bytes = self.addresses.resolved(pipe);
        self.push_param(RadioParam::PipeAddress {
            pipe: pipe as u8,
            bytes,
        })
    }
}
