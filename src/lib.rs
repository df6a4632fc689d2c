//! A pure-rust TPLL (Telink primary link layer) implementation: addressable
//! multi-pipe packet exchange with automatic acknowledgement and retry on top
//! of an opaque, dependency-injected radio back-end.
//!
//! ## Basic API
//!
//! - [`Tpll::new()`](link/struct.Tpll.html#method.new)
//! - [`Tpll::init()`](link/struct.Tpll.html#method.init)
//! - [`Tpll::open_pipe()`](link/struct.Tpll.html#method.open_pipe)
//! - [`Tpll::write_payload()`](link/struct.Tpll.html#method.write_payload)
//! - [`Tpll::read_rx_payload()`](link/struct.Tpll.html#method.read_rx_payload)
//! - [`Tpll::start_tx()`](link/struct.Tpll.html#method.start_tx)
//! - [`Tpll::start_rx()`](link/struct.Tpll.html#method.start_rx)
//! - [`Tpll::radio_irq()`](link/struct.Tpll.html#method.radio_irq)
//! - [`Tpll::poll_events()`](link/struct.Tpll.html#method.poll_events)
//! - [`Tpll::disable()`](link/struct.Tpll.html#method.disable)
//!
//! ## Advanced API
//!
//! - [`Tpll::reuse_tx()`](link/struct.Tpll.html#method.reuse_tx)
//! - [`Tpll::flush_tx()`](link/struct.Tpll.html#method.flush_tx)
//! - [`Tpll::flush_rx()`](link/struct.Tpll.html#method.flush_rx)
//! - [`Tpll::rx_timestamp()`](link/struct.Tpll.html#method.rx_timestamp)
//! - [`Tpll::transmit_attempts()`](link/struct.Tpll.html#method.transmit_attempts)
//! - [`Tpll::packets_lost()`](link/struct.Tpll.html#method.packets_lost)
//!
//! ## Configuration API
//!
//! - [`TpllConfig`](link/struct.TpllConfig.html)
//! - [`Tpll::set_address()`](link/struct.Tpll.html#method.set_address)
//! - [`Tpll::set_address_width()`](link/struct.Tpll.html#method.set_address_width)
//! - [`Tpll::set_base_address_0()`](link/struct.Tpll.html#method.set_base_address_0)
//! - [`Tpll::set_prefixes()`](link/struct.Tpll.html#method.set_prefixes)
//! - [`Tpll::set_auto_retry()`](link/struct.Tpll.html#method.set_auto_retry)
//! - [`Tpll::set_tx_settle()`](link/struct.Tpll.html#method.set_tx_settle)
//! - [`Tpll::set_rx_timeout()`](link/struct.Tpll.html#method.set_rx_timeout)
#![no_std]

mod types;
pub use types::{
    Bitrate, CrcLength, Error, Event, EventHandler, Mode, ModulationIndex, PipeId, State, TxPower,
};
pub mod hw;
pub mod link;
#[doc(inline)]
pub use link::{Payload, Tpll, TpllConfig};
