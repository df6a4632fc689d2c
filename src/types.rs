//! This module defines types shared across the link layer.
//! These types are meant to be agnostic of the radio back-end in use.

use core::{
    fmt::{Display, Formatter, Result},
    write,
};

/// The role a link-layer context operates in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Primary transmitter: payloads are sent and acknowledgements awaited.
    Ptx,
    /// Primary receiver: the radio listens continuously and returns
    /// acknowledgements for packets that request them.
    Prx,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Mode::Ptx => write!(f, "PTX"),
            Mode::Prx => write!(f, "PRX"),
        }
    }
}

/// How fast data moves through the air. Units are in bits per second (bps).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bitrate {
    /// represents 1 Mbps
    Mbps1,
    /// represents 2 Mbps
    Mbps2,
    /// represents 500 Kbps
    Kbps500,
    /// represents 250 Kbps
    Kbps250,
}

impl Display for Bitrate {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Bitrate::Mbps1 => write!(f, "1 Mbps"),
            Bitrate::Mbps2 => write!(f, "2 Mbps"),
            Bitrate::Kbps500 => write!(f, "500 Kbps"),
            Bitrate::Kbps250 => write!(f, "250 Kbps"),
        }
    }
}

/// The length of the CRC checksum appended to every on-air packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcLength {
    /// represents CRC 8 bit checksum is used
    Bit8,
    /// represents CRC 16 bit checksum is used
    Bit16,
}

impl Display for CrcLength {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CrcLength::Bit8 => write!(f, "8 bit"),
            CrcLength::Bit16 => write!(f, "16 bit"),
        }
    }
}

/// Logical radio transmit power in dBm (decibel-milliwatts).
///
/// The variants map to back-end register encodings through
/// [`TxPower::register_value()`], keeping the public API free of
/// hardware-specific numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxPower {
    /// 10 dBm radio transmit power.
    Dbm10,
    /// 9 dBm radio transmit power.
    Dbm9,
    /// 8 dBm radio transmit power.
    Dbm8,
    /// 7 dBm radio transmit power.
    Dbm7,
    /// 6 dBm radio transmit power.
    Dbm6,
    /// 5 dBm radio transmit power.
    Dbm5,
    /// 4 dBm radio transmit power.
    Dbm4,
    /// 3 dBm radio transmit power.
    Dbm3,
    /// 2 dBm radio transmit power.
    Dbm2,
    /// 1 dBm radio transmit power.
    Dbm1,
    /// 0 dBm radio transmit power.
    Dbm0,
    /// -1 dBm radio transmit power.
    DbmNeg1,
    /// -2 dBm radio transmit power.
    DbmNeg2,
    /// -3 dBm radio transmit power.
    DbmNeg3,
    /// -4 dBm radio transmit power.
    DbmNeg4,
    /// -5 dBm radio transmit power.
    DbmNeg5,
    /// -6 dBm radio transmit power.
    DbmNeg6,
    /// -7 dBm radio transmit power.
    DbmNeg7,
    /// -8 dBm radio transmit power.
    DbmNeg8,
    /// -9 dBm radio transmit power.
    DbmNeg9,
    /// -11 dBm radio transmit power.
    DbmNeg11,
    /// -13 dBm radio transmit power.
    DbmNeg13,
    /// -15 dBm radio transmit power.
    DbmNeg15,
    /// -18 dBm radio transmit power.
    DbmNeg18,
    /// -24 dBm radio transmit power.
    DbmNeg24,
    /// -30 dBm radio transmit power.
    DbmNeg30,
    /// -50 dBm radio transmit power.
    DbmNeg50,
}

impl TxPower {
    /// Look up the back-end register encoding for this power level.
    pub const fn register_value(self) -> u8 {
        match self {
            TxPower::Dbm10 => 51,
            TxPower::Dbm9 => 43,
            TxPower::Dbm8 => 37,
            TxPower::Dbm7 => 33,
            TxPower::Dbm6 => 29,
            TxPower::Dbm5 => 25,
            TxPower::Dbm4 => 25,
            TxPower::Dbm3 => 185,
            TxPower::Dbm2 => 176,
            TxPower::Dbm1 => 169,
            TxPower::Dbm0 => 164,
            TxPower::DbmNeg1 => 160,
            TxPower::DbmNeg2 => 156,
            TxPower::DbmNeg3 => 154,
            TxPower::DbmNeg4 => 150,
            TxPower::DbmNeg5 => 148,
            TxPower::DbmNeg6 => 146,
            TxPower::DbmNeg7 => 144,
            TxPower::DbmNeg8 => 142,
            TxPower::DbmNeg9 => 140,
            TxPower::DbmNeg11 => 138,
            TxPower::DbmNeg13 => 136,
            TxPower::DbmNeg15 => 134,
            TxPower::DbmNeg18 => 132,
            TxPower::DbmNeg24 => 130,
            TxPower::DbmNeg30 => 0xFF,
            TxPower::DbmNeg50 => 128,
        }
    }
}

/// Modulation index of the frequency deviation, in hundredths.
///
/// The frequency deviation follows `bitrate / mi^2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModulationIndex {
    /// MI = 0.00
    Mi000,
    /// MI = 0.32
    Mi032,
    /// MI = 0.5
    Mi050,
    /// MI = 0.6
    Mi060,
    /// MI = 0.7
    Mi070,
    /// MI = 0.8
    Mi080,
    /// MI = 0.9
    Mi090,
    /// MI = 1.2
    Mi120,
    /// MI = 1.3
    Mi130,
    /// MI = 1.4
    Mi140,
}

impl ModulationIndex {
    /// Look up the back-end register encoding for this modulation index.
    pub const fn register_value(self) -> u8 {
        match self {
            ModulationIndex::Mi000 => 0,
            ModulationIndex::Mi032 => 32,
            ModulationIndex::Mi050 => 50,
            ModulationIndex::Mi060 => 60,
            ModulationIndex::Mi070 => 70,
            ModulationIndex::Mi080 => 80,
            ModulationIndex::Mi090 => 90,
            ModulationIndex::Mi120 => 120,
            ModulationIndex::Mi130 => 130,
            ModulationIndex::Mi140 => 140,
        }
    }
}

/// Identity of a logical pipe.
///
/// Pipes 0 through 5 are receive channels; [`PipeId::Tx`] refers to the
/// transmit address, and [`PipeId::All`] is the all-pipes sentinel accepted by
/// operations that act on the whole pipe table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PipeId {
    /// Select pipe 0
    Pipe0,
    /// Select pipe 1
    Pipe1,
    /// Select pipe 2
    Pipe2,
    /// Select pipe 3
    Pipe3,
    /// Select pipe 4
    Pipe4,
    /// Select pipe 5
    Pipe5,
    /// Refer to the TX address
    Tx,
    /// Open or close all pipes
    All,
}

impl PipeId {
    /// The receive-pipe table index for this id, if it names a single
    /// receive pipe.
    pub const fn index(self) -> Option<usize> {
        match self {
            PipeId::Pipe0 => Some(0),
            PipeId::Pipe1 => Some(1),
            PipeId::Pipe2 => Some(2),
            PipeId::Pipe3 => Some(3),
            PipeId::Pipe4 => Some(4),
            PipeId::Pipe5 => Some(5),
            PipeId::Tx | PipeId::All => None,
        }
    }

    /// The inverse of [`PipeId::index()`].
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(PipeId::Pipe0),
            1 => Some(PipeId::Pipe1),
            2 => Some(PipeId::Pipe2),
            3 => Some(PipeId::Pipe3),
            4 => Some(PipeId::Pipe4),
            5 => Some(PipeId::Pipe5),
            _ => None,
        }
    }
}

/// The states of the link-layer machine.
///
/// Exactly one operation is in flight at any time; every state other than
/// [`State::Idle`] belongs to that operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// No operation in flight.
    Idle,
    /// Radio warming up before a transmission.
    TxSettle,
    /// A packet (or acknowledgement) is on the air.
    Tx,
    /// Waiting between the end of a transmission and the start of the
    /// acknowledgement listen window.
    RxWait,
    /// Listening, either for an acknowledgement (PTX) or for traffic (PRX).
    Rx,
    /// Waiting between a received packet and the acknowledgement reply.
    TxWait,
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            State::Idle => write!(f, "Idle"),
            State::TxSettle => write!(f, "TxSettle"),
            State::Tx => write!(f, "Tx"),
            State::RxWait => write!(f, "RxWait"),
            State::Rx => write!(f, "Rx"),
            State::TxWait => write!(f, "TxWait"),
        }
    }
}

/// Terminal outcomes reported through the event channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// A payload was transmitted (and acknowledged, if required).
    TxFinished,
    /// The retry budget was exhausted without an acknowledgement.
    TxFailed,
    /// A new valid packet was stored in the receive queue.
    RxReceived,
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Event::TxFinished => write!(f, "TxFinished"),
            Event::TxFailed => write!(f, "TxFailed"),
            Event::RxReceived => write!(f, "RxReceived"),
        }
    }
}

/// Callback invoked by [`Tpll::poll_events()`](crate::link::Tpll::poll_events)
/// for every drained event.
pub type EventHandler = fn(Event);

/// The closed error set of the link layer, plus a wrapper for errors
/// reported by the injected radio back-end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A required reference was absent (an event handler was not supplied).
    NullParam,
    /// An argument was outside its documented range.
    InvalidParam,
    /// An operation is already in flight.
    Busy,
    /// The request does not fit the machine's current role or stored state.
    InvalidState,
    /// The radio back-end reported a hardware fault.
    Radio(E),
}

impl<E: Display> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Error::NullParam => write!(f, "a required reference was absent"),
            Error::InvalidParam => write!(f, "argument out of range"),
            Error::Busy => write!(f, "an operation is already in flight"),
            Error::InvalidState => write!(f, "request does not fit the current state"),
            Error::Radio(err) => write!(f, "radio back-end fault: {err}"),
        }
    }
}
