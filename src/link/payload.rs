use embedded_hal::delay::DelayNs;

use crate::hw::{Monotonic, RadioBackend};
use crate::types::{Error, PipeId};

use super::constants::MAX_PAYLOAD_LENGTH;
use super::Tpll;

/// A link-layer payload.
///
/// Ownership is transient: [`Tpll::write_payload()`] copies it into the
/// owning pipe's transmit queue, [`Tpll::read_rx_payload()`] copies it back
/// out. The `rssi` field is only meaningful on the receive side.
#[derive(Clone, Debug)]
pub struct Payload {
    /// Number of valid bytes in `data`.
    pub length: u8,
    /// Receive-pipe index (0-5) this payload belongs to.
    pub pipe_id: u8,
    /// Suppress the acknowledgement for this payload.
    pub no_ack: bool,
    /// On-air packet id.
    pub pid: u8,
    /// Received signal strength in dBm; receiver-only.
    pub rssi: i32,
    /// Payload bytes; only the first `length` are valid.
    pub data: [u8; MAX_PAYLOAD_LENGTH],
}

impl Default for Payload {
    fn default() -> Self {
        Self {
            length: 0,
            pipe_id: 0,
            no_ack: false,
            pid: 0,
            rssi: 0,
            data: [0; MAX_PAYLOAD_LENGTH],
        }
    }
}

impl Payload {
    /// Build a payload for `pipe` from `bytes`.
    ///
    /// Anything beyond [`MAX_PAYLOAD_LENGTH`] bytes is dropped.
    pub fn new(pipe: PipeId, bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= MAX_PAYLOAD_LENGTH);
        let length = bytes.len().min(MAX_PAYLOAD_LENGTH);
        let mut payload = Self {
            length: length as u8,
            pipe_id: pipe.index().unwrap_or(0) as u8,
            ..Self::default()
        };
        payload.data[..length].copy_from_slice(&bytes[..length]);
        payload
    }

    /// Same as [`Payload::new()`] with the no-acknowledgement flag set.
    pub fn new_no_ack(pipe: PipeId, bytes: &[u8]) -> Self {
        Self {
            no_ack: true,
            ..Self::new(pipe, bytes)
        }
    }

    /// The valid prefix of `data`.
    pub fn bytes(&self) -> &[u8] {
        &self.data[..(self.length as usize).min(MAX_PAYLOAD_LENGTH)]
    }
}

impl<RADIO, MONO, DELAY> Tpll<RADIO, MONO, DELAY>
where
    RADIO: RadioBackend,
    MONO: Monotonic,
    DELAY: DelayNs,
{
    /// Enqueue a payload into its pipe's transmit queue.
    ///
    /// Returns the number of bytes accepted: the payload's length on
    /// success, 0 when the length is 0 or exceeds [`MAX_PAYLOAD_LENGTH`],
    /// the pipe id is not a receive pipe, or the queue is full.
    pub fn write_payload(&mut self, payload: &Payload) -> usize {
        let length = payload.length as usize;
        if length == 0 || length > MAX_PAYLOAD_LENGTH {
            return 0;
        }
        let Some(queue) = self.tx_queues.get_mut(payload.pipe_id as usize) else {
            return 0;
        };
        if queue.push_back(payload.clone()).is_err() {
            return 0;
        }
        length
    }

    /// Dequeue the oldest ready payload for any pipe with pending data.
    ///
    /// Returns the `(pipe, length)` pair and copies the payload into `out`.
    /// A zero-length result means nothing was pending; `out` is untouched in
    /// that case and the receive timestamp is invalidated.
    pub fn read_rx_payload(&mut self, out: &mut Payload) -> (u8, u8) {
        match self.rx_queue.pop_front() {
            Some((payload, timestamp)) => {
                let pipe = payload.pipe_id;
                let length = payload.length;
                *out = payload;
                self.rx_timestamp = Some(timestamp);
                (pipe, length)
            }
            None => {
                self.rx_timestamp = None;
                (0, 0)
            }
        }
    }

    /// Arrival timestamp (microseconds) of the payload most recently
    /// returned by [`Tpll::read_rx_payload()`].
    ///
    /// Only valid immediately after a successful dequeue; an empty dequeue
    /// clears it.
    pub fn rx_timestamp(&self) -> Option<u32> {
        self.rx_timestamp
    }

    /// Resubmit the most recently transmitted payload without the caller
    /// re-supplying it.
    ///
    /// The payload returns to the front of its pipe's queue, so it is the
    /// next one sent. Fails with [`Error::InvalidState`] when nothing has
    /// been transmitted yet, and with [`Error::InvalidParam`] when `pipe`
    /// does not name the payload's pipe (the TX sentinel resolves to the
    /// current TX pipe).
    pub fn reuse_tx(&mut self, pipe: PipeId) -> Result<(), Error<RADIO::Error>> {
        let index = match pipe {
            PipeId::Tx => self.tx_pipe,
            other => other.index().ok_or(Error::InvalidParam)?,
        };
        let payload = self.reuse_slot.clone().ok_or(Error::InvalidState)?;
        if payload.pipe_id as usize != index {
            return Err(Error::InvalidParam);
        }
        let queue = &mut self.tx_queues[index];
        if queue.push_front(payload).is_err() {
            return Err(Error::InvalidState);
        }
        Ok(())
    }

    /// Discard only the front payload of one pipe's transmit queue, without
    /// transmitting it.
    ///
    /// The TX sentinel resolves to the current TX pipe. Returns whether a
    /// payload was removed; the all-pipes sentinel removes nothing.
    pub fn discard_tx_front(&mut self, pipe: PipeId) -> bool {
        let index = match pipe {
            PipeId::Tx => self.tx_pipe,
            other => match other.index() {
                Some(index) => index,
                None => return false,
            },
        };
        self.tx_queues[index].pop_front().is_some()
    }

    /// Discard queued-but-unsent payloads for one pipe, or all pipes with
    /// [`PipeId::All`]. Safe to call in any state.
    pub fn flush_tx(&mut self, pipe: PipeId) {
        match pipe.index() {
            Some(index) => self.tx_queues[index].clear(),
            None => {
                for queue in self.tx_queues.iter_mut() {
                    queue.clear();
                }
            }
        }
    }

    /// Discard unread received payloads. Safe to call in any state.
    pub fn flush_rx(&mut self) {
        self.rx_queue.clear();
        self.rx_timestamp = None;
    }

    /// Is the pipe's transmit queue empty? [`PipeId::All`] asks about every
    /// pipe at once.
    pub fn tx_fifo_empty(&self, pipe: PipeId) -> bool {
        match pipe.index() {
            Some(index) => self.tx_queues[index].is_empty(),
            None => self.tx_queues.iter().all(|queue| queue.is_empty()),
        }
    }

    /// Is the pipe's transmit queue full? [`PipeId::All`] asks about every
    /// pipe at once.
    pub fn tx_fifo_full(&self, pipe: PipeId) -> bool {
        match pipe.index() {
            Some(index) => self.tx_queues[index].is_full(),
            None => self.tx_queues.iter().all(|queue| queue.is_full()),
        }
    }
}
