//! The operation state machine.
//!
//! A transmit cycle walks Idle -> TxSettle -> Tx, then for acknowledged
//! payloads RxWait -> Rx and either back to Tx (retry) or Idle (terminal).
//! A receiver sits in Rx and answers matched packets through TxWait -> Tx.
//! Hardware completions arrive through [`Tpll::radio_irq()`]; terminal
//! outcomes surface as [`Event`]s on the bounded channel drained by
//! [`Tpll::poll_events()`].

use embedded_hal::delay::DelayNs;

use crate::hw::{Completion, Monotonic, RadioBackend, RadioParam};
use crate::types::{Error, Event, Mode, PipeId, State};

use super::constants::{
    MAX_PAYLOAD_LENGTH, PIPE_COUNT, RX_SETTLE_US_MAX, RX_SETTLE_US_MIN, RX_TIMEOUT_US_MAX,
    RX_TIMEOUT_US_MIN, RX_WAIT_US_MAX, RX_WAIT_US_MIN, TX_SETTLE_US_MAX, TX_SETTLE_US_MIN,
    TX_WAIT_US_MAX, TX_WAIT_US_MIN,
};
use super::retry::Verdict;
use super::{Payload, Tpll};

impl<RADIO, MONO, DELAY> Tpll<RADIO, MONO, DELAY>
where
    RADIO: RadioBackend,
    MONO: Monotonic,
    DELAY: DelayNs,
{
    /// Start transmitting the payload at the front of the TX pipe's queue.
    ///
    /// Fails with [`Error::Busy`] when an operation is already active, and
    /// with [`Error::InvalidState`] when the context is not a transmitter or
    /// the queue is empty. The payload stays at the queue front until the
    /// cycle ends, so a retry resends the same bytes.
    pub fn start_tx(&mut self) -> Result<(), Error<RADIO::Error>> {
        if self.state != State::Idle {
            return Err(Error::Busy);
        }
        if self.config.mode() != Mode::Ptx || self.tx_queues[self.tx_pipe].is_empty() {
            return Err(Error::InvalidState);
        }
        self.retry.begin_cycle();
        self.transmit_front()
    }

    /// Start listening on the open receive pipes.
    ///
    /// Fails with [`Error::Busy`] when an operation is already active, and
    /// with [`Error::InvalidState`] when the context is not a receiver. The
    /// listen window is unbounded; [`Tpll::disable()`] ends it.
    pub fn start_rx(&mut self) -> Result<(), Error<RADIO::Error>> {
        if self.state != State::Idle {
            return Err(Error::Busy);
        }
        if self.config.mode() != Mode::Prx {
            return Err(Error::InvalidState);
        }
        self.delay.delay_us(self.timing.rx_settle as u32);
        self.listen()
    }

    /// Abort whatever is in flight and return to Idle.
    ///
    /// Queued payloads and unread events survive; a deferred channel hop is
    /// applied on the way out. Safe to call in any state.
    pub fn disable(&mut self) -> Result<(), Error<RADIO::Error>> {
        self.radio.stop().map_err(Error::Radio)?;
        self.to_idle()
    }

    /// Service a completed radio operation.
    ///
    /// Call this from the radio's interrupt (or poll it). A call with no
    /// finished operation is a no-op, as is a completion that raced against
    /// [`Tpll::disable()`].
    pub fn radio_irq(&mut self) -> Result<(), Error<RADIO::Error>> {
        if !self.radio.is_done().map_err(Error::Radio)? {
            return Ok(());
        }
        let mut buf = [0u8; MAX_PAYLOAD_LENGTH];
        let completion = self.radio.completion(&mut buf).map_err(Error::Radio)?;
        match (self.state, completion) {
            (State::Tx, Completion::TxDone) => self.after_tx_done(),
            (State::Rx, Completion::RxTimeout) => match self.config.mode() {
                Mode::Ptx => self.after_ack_timeout(),
                Mode::Prx => self.listen(),
            },
            (
                State::Rx,
                Completion::RxPacket {
                    pipe,
                    length,
                    pid,
                    no_ack,
                    crc_ok,
                },
            ) => match self.config.mode() {
                Mode::Ptx => {
                    // a garbled frame in the acknowledgement window must not
                    // fake a delivery confirmation
                    if crc_ok {
                        self.finish_tx(Event::TxFinished)
                    } else {
                        self.after_ack_timeout()
                    }
                }
                Mode::Prx => self.after_packet(pipe, length, pid, no_ack, crc_ok, &buf),
            },
            _ => Ok(()),
        }
    }

    /// Number of events drained. The installed handler sees each one.
    pub fn poll_events(&mut self) -> usize {
        let mut drained = 0;
        while let Some(event) = self.events.pop_front() {
            if let Some(handler) = self.handler {
                handler(event);
            }
            drained += 1;
        }
        drained
    }

    /// Pop the oldest undrained event without invoking the handler.
    pub fn take_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Set the oscillator settle window before a transmission (108-4095 µs).
    /// Only allowed while Idle; out-of-range values are rejected, not
    /// clamped.
    pub fn set_tx_settle(&mut self, period_us: u16) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        if !(TX_SETTLE_US_MIN..=TX_SETTLE_US_MAX).contains(&period_us) {
            return Err(Error::InvalidParam);
        }
        self.timing.tx_settle = period_us;
        Ok(())
    }

    /// Set the oscillator settle window before a listen (85-4095 µs). Only
    /// allowed while Idle.
    pub fn set_rx_settle(&mut self, period_us: u16) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        if !(RX_SETTLE_US_MIN..=RX_SETTLE_US_MAX).contains(&period_us) {
            return Err(Error::InvalidParam);
        }
        self.timing.rx_settle = period_us;
        Ok(())
    }

    /// Set the wait between a transmission's end and the acknowledgement
    /// listen window (5-4096 µs). Only allowed while Idle.
    pub fn set_rx_wait(&mut self, period_us: u16) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        if !(RX_WAIT_US_MIN..=RX_WAIT_US_MAX).contains(&period_us) {
            return Err(Error::InvalidParam);
        }
        self.timing.rx_wait = period_us;
        Ok(())
    }

    /// Set the wait between a received packet and its acknowledgement reply
    /// (5-4096 µs). Only allowed while Idle.
    pub fn set_tx_wait(&mut self, period_us: u16) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        if !(TX_WAIT_US_MIN..=TX_WAIT_US_MAX).contains(&period_us) {
            return Err(Error::InvalidParam);
        }
        self.timing.tx_wait = period_us;
        Ok(())
    }

    /// Set how long a transmitter listens for the acknowledgement
    /// (85-4095 µs). Only allowed while Idle.
    pub fn set_rx_timeout(&mut self, period_us: u16) -> Result<(), Error<RADIO::Error>> {
        self.ensure_idle()?;
        if !(RX_TIMEOUT_US_MIN..=RX_TIMEOUT_US_MAX).contains(&period_us) {
            return Err(Error::InvalidParam);
        }
        self.timing.rx_timeout = period_us;
        Ok(())
    }

    pub(crate) fn push_event(&mut self, event: Event) {
        // an overflowing event is shed; the channel is sized for a drained
        // main loop
        let _ = self.events.push_back(event);
    }

    fn to_idle(&mut self) -> Result<(), Error<RADIO::Error>> {
        self.state = State::Idle;
        match self.pending_channel.take() {
            Some(channel) => self.push_param(RadioParam::Channel(channel)),
            None => Ok(()),
        }
    }

    /// Settle, then put the front of the TX pipe's queue on the air.
    fn transmit_front(&mut self) -> Result<(), Error<RADIO::Error>> {
        self.state = State::TxSettle;
        self.delay.delay_us(self.timing.tx_settle as u32);
        let Some(payload) = self.tx_queues[self.tx_pipe].front().cloned() else {
            self.state = State::Idle;
            return Err(Error::InvalidState);
        };
        self.state = State::Tx;
        self.radio.begin_tx(payload.bytes()).map_err(Error::Radio)
    }

    fn after_tx_done(&mut self) -> Result<(), Error<RADIO::Error>> {
        if self.config.mode() == Mode::Prx {
            // the acknowledgement went out; resume listening
            return self.listen();
        }
        let no_ack = self.tx_queues[self.tx_pipe]
            .front()
            .map(|payload| payload.no_ack)
            .unwrap_or(true);
        if no_ack {
            return self.finish_tx(Event::TxFinished);
        }
        self.state = State::RxWait;
        self.delay.delay_us(self.timing.rx_wait as u32);
        self.state = State::Rx;
        self.radio
            .begin_rx(Some(self.timing.rx_timeout))
            .map_err(Error::Radio)
    }

    fn after_ack_timeout(&mut self) -> Result<(), Error<RADIO::Error>> {
        match self.retry.on_ack_timeout() {
            Verdict::Retry(delay_us) => {
                self.delay.delay_us(delay_us as u32);
                self.transmit_front()
            }
            Verdict::Fail => self.finish_tx(Event::TxFailed),
        }
    }

    /// End the transmit cycle: park the payload for `reuse_tx`, raise the
    /// terminal event, go Idle.
    fn finish_tx(&mut self, event: Event) -> Result<(), Error<RADIO::Error>> {
        if let Some(payload) = self.tx_queues[self.tx_pipe].pop_front() {
            self.reuse_slot = Some(payload);
        }
        self.push_event(event);
        self.to_idle()
    }

    fn after_packet(
        &mut self,
        pipe: u8,
        length: u8,
        pid: u8,
        no_ack: bool,
        crc_ok: bool,
        buf: &[u8; MAX_PAYLOAD_LENGTH],
    ) -> Result<(), Error<RADIO::Error>> {
        let open = (pipe as usize) < PIPE_COUNT && self.open_pipes & (1 << pipe) != 0;
        if !crc_ok {
            // corrupt packets are dropped without an event; the filter-ack
            // policy still acknowledges them to stop the retransmissions
            if self.config.crc_filter_ack() && !no_ack && open {
                return self.send_ack();
            }
            return self.listen();
        }
        let valid = open && length as usize <= MAX_PAYLOAD_LENGTH;
        let Some(id) = PipeId::from_index(pipe).filter(|_| valid) else {
            return self.listen();
        };
        let mut payload = Payload::new(id, &buf[..length as usize]);
        payload.pid = pid;
        payload.no_ack = no_ack;
        payload.rssi = self.radio.rssi().map_err(Error::Radio)?;
        let timestamp = self.clock.now_us();
        if self.rx_queue.push_back((payload, timestamp)).is_err() {
            // no room: no event and no ack, so the sender's retry can
            // redeliver once the queue drains
            return self.listen();
        }
        self.push_event(Event::RxReceived);
        if no_ack {
            self.listen()
        } else {
            self.send_ack()
        }
    }

    fn send_ack(&mut self) -> Result<(), Error<RADIO::Error>> {
        self.state = State::TxWait;
        self.delay.delay_us(self.timing.tx_wait as u32);
        self.state = State::Tx;
        self.radio.begin_tx(&[]).map_err(Error::Radio)
    }

    fn listen(&mut self) -> Result<(), Error<RADIO::Error>> {
        self.state = State::Rx;
        self.radio.begin_rx(None).map_err(Error::Radio)
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use crate::hw::Completion;
    use crate::link::constants::RX_FIFO_DEPTH;
    use crate::link::{Payload, TpllConfig};
    use crate::test::{mk_tpll, noop_handler};
    use crate::types::{Error, Event, Mode, PipeId, State};
    extern crate std;

    const ACK: Completion = Completion::RxPacket {
        pipe: 0,
        length: 0,
        pid: 0,
        no_ack: false,
        crc_ok: true,
    };

    fn packet(pipe: u8, length: u8, no_ack: bool, crc_ok: bool) -> Completion {
        Completion::RxPacket {
            pipe,
            length,
            pid: 1,
            no_ack,
            crc_ok,
        }
    }

    #[test]
    fn start_tx_needs_idle_role_and_payload() {
        let mut tpll = mk_tpll(&[]);
        let config = TpllConfig::default().with_event_handler(noop_handler);
        tpll.init(&config).unwrap();
        // empty queue
        assert_eq!(tpll.start_tx(), Err(Error::InvalidState));
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"hi"));
        tpll.start_tx().unwrap();
        assert_eq!(tpll.state(), State::Tx);
        // already active
        assert_eq!(tpll.start_tx(), Err(Error::Busy));

        let mut tpll = mk_tpll(&[]);
        tpll.init(&config.with_mode(Mode::Prx)).unwrap();
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"hi"));
        // wrong role
        assert_eq!(tpll.start_tx(), Err(Error::InvalidState));
    }

    #[test]
    fn start_rx_needs_idle_and_role() {
        let mut tpll = mk_tpll(&[]);
        let config = TpllConfig::default().with_event_handler(noop_handler);
        tpll.init(&config).unwrap();
        assert_eq!(tpll.start_rx(), Err(Error::InvalidState));

        let mut tpll = mk_tpll(&[]);
        tpll.init(&config.with_mode(Mode::Prx)).unwrap();
        tpll.start_rx().unwrap();
        assert_eq!(tpll.state(), State::Rx);
        // unbounded listen window
        assert_eq!(tpll.radio.rx_started, [None]);
        assert_eq!(tpll.start_rx(), Err(Error::Busy));
    }

    #[test]
    fn irq_without_completion_is_a_no_op() {
        let mut tpll = mk_tpll(&[]);
        let config = TpllConfig::default().with_event_handler(noop_handler);
        tpll.init(&config).unwrap();
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"hi"));
        tpll.start_tx().unwrap();
        tpll.radio_irq().unwrap();
        assert_eq!(tpll.state(), State::Tx);
        assert_eq!(tpll.take_event(), None);
    }

    #[test]
    fn no_ack_payload_finishes_after_tx_done() {
        let mut tpll = mk_tpll(&[(Completion::TxDone, &[])]);
        let config = TpllConfig::default().with_event_handler(noop_handler);
        tpll.init(&config).unwrap();
        tpll.write_payload(&Payload::new_no_ack(PipeId::Pipe0, b"fire and forget"));
        tpll.start_tx().unwrap();
        tpll.radio_irq().unwrap();
        assert_eq!(tpll.state(), State::Idle);
        assert_eq!(tpll.take_event(), Some(Event::TxFinished));
        // no acknowledgement window was opened
        assert!(tpll.radio.rx_started.is_empty());
        assert!(tpll.tx_fifo_empty(PipeId::Pipe0));
    }

    #[test]
    fn acknowledged_payload_round_trip() {
        let mut tpll = mk_tpll(&[(Completion::TxDone, &[]), (ACK, &[])]);
        let config = TpllConfig::default().with_event_handler(noop_handler);
        tpll.init(&config).unwrap();
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"ping"));
        tpll.start_tx().unwrap();

        tpll.radio_irq().unwrap();
        assert_eq!(tpll.state(), State::Rx);
        // ack window uses the configured timeout
        assert_eq!(tpll.radio.rx_started, [Some(500)]);

        tpll.radio_irq().unwrap();
        assert_eq!(tpll.state(), State::Idle);
        assert_eq!(tpll.take_event(), Some(Event::TxFinished));
        assert_eq!(tpll.radio.sent, [b"ping".to_vec()]);
        assert_eq!(tpll.transmit_attempts(), 0);
        // the finished payload is parked for reuse
        tpll.reuse_tx(PipeId::Pipe0).unwrap();
    }

    #[test]
    fn retry_budget_exhausts_into_tx_failed() {
        let mut script = std::vec::Vec::new();
        for _ in 0..5 {
            script.push((Completion::TxDone, &[][..]));
            script.push((Completion::RxTimeout, &[][..]));
        }
        let mut tpll = mk_tpll(&script);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_auto_retry(5, 150);
        tpll.init(&config).unwrap();
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"lost"));
        tpll.start_tx().unwrap();
        for _ in 0..10 {
            tpll.radio_irq().unwrap();
        }
        assert_eq!(tpll.state(), State::Idle);
        assert_eq!(tpll.take_event(), Some(Event::TxFailed));
        // one initial transmission plus four resends
        assert_eq!(tpll.radio.sent.len(), 5);
        assert_eq!(tpll.transmit_attempts(), 5);
        assert_eq!(tpll.packets_lost(), 1);
        assert!(tpll.tx_fifo_empty(PipeId::Pipe0));
    }

    #[test]
    fn zero_retry_budget_fails_on_first_timeout() {
        let mut tpll = mk_tpll(&[(Completion::TxDone, &[]), (Completion::RxTimeout, &[])]);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_auto_retry(0, 150);
        tpll.init(&config).unwrap();
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"once"));
        tpll.start_tx().unwrap();
        tpll.radio_irq().unwrap();
        tpll.radio_irq().unwrap();
        assert_eq!(tpll.take_event(), Some(Event::TxFailed));
        assert_eq!(tpll.radio.sent.len(), 1);
        assert_eq!(tpll.transmit_attempts(), 1);
        assert_eq!(tpll.packets_lost(), 1);
    }

    #[test]
    fn receiver_acks_and_queues_matched_packet() {
        let mut tpll = mk_tpll(&[(packet(2, 5, false, true), b"hello"), (Completion::TxDone, &[])]);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_mode(Mode::Prx);
        tpll.init(&config).unwrap();
        tpll.start_rx().unwrap();

        tpll.radio_irq().unwrap();
        assert_eq!(tpll.take_event(), Some(Event::RxReceived));
        // the acknowledgement frame carries no payload
        assert_eq!(tpll.radio.sent, [b"".to_vec()]);
        assert_eq!(tpll.state(), State::Tx);

        // ack finished, back to listening
        tpll.radio_irq().unwrap();
        assert_eq!(tpll.state(), State::Rx);
        assert_eq!(tpll.radio.rx_started, [None, None]);

        let mut out = Payload::default();
        assert_eq!(tpll.read_rx_payload(&mut out), (2, 5));
        assert_eq!(out.bytes(), b"hello");
        assert_eq!(out.pid, 1);
        assert_eq!(out.rssi, -40);
        assert!(tpll.rx_timestamp().is_some());
    }

    #[test]
    fn receiver_skips_ack_for_no_ack_packet() {
        let mut tpll = mk_tpll(&[(packet(0, 3, true, true), b"one")]);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_mode(Mode::Prx);
        tpll.init(&config).unwrap();
        tpll.start_rx().unwrap();
        tpll.radio_irq().unwrap();
        assert_eq!(tpll.take_event(), Some(Event::RxReceived));
        assert!(tpll.radio.sent.is_empty());
        assert_eq!(tpll.state(), State::Rx);
    }

    #[test]
    fn corrupt_packet_dropped_silently() {
        let mut tpll = mk_tpll(&[(packet(0, 3, false, false), b"bad")]);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_mode(Mode::Prx);
        tpll.init(&config).unwrap();
        tpll.start_rx().unwrap();
        tpll.radio_irq().unwrap();
        assert_eq!(tpll.take_event(), None);
        assert!(tpll.radio.sent.is_empty());
        // the listen resumed
        assert_eq!(tpll.radio.rx_started.len(), 2);
        let mut out = Payload::default();
        assert_eq!(tpll.read_rx_payload(&mut out), (0, 0));
    }

    #[test]
    fn corrupt_packet_still_acked_under_filter_policy() {
        let mut tpll = mk_tpll(&[(packet(0, 3, false, false), b"bad"), (Completion::TxDone, &[])]);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_mode(Mode::Prx)
            .with_crc_filter_ack(true);
        tpll.init(&config).unwrap();
        tpll.start_rx().unwrap();
        tpll.radio_irq().unwrap();
        // acked but never queued or reported
        assert_eq!(tpll.radio.sent, [b"".to_vec()]);
        assert_eq!(tpll.take_event(), None);
        let mut out = Payload::default();
        assert_eq!(tpll.read_rx_payload(&mut out), (0, 0));
        tpll.radio_irq().unwrap();
        assert_eq!(tpll.state(), State::Rx);
    }

    #[test]
    fn full_rx_queue_sheds_packet_without_event_or_ack() {
        let mut script = std::vec::Vec::new();
        for _ in 0..=RX_FIFO_DEPTH {
            script.push((packet(0, 4, true, true), &b"data"[..]));
        }
        let mut tpll = mk_tpll(&script);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_mode(Mode::Prx);
        tpll.init(&config).unwrap();
        tpll.start_rx().unwrap();
        for _ in 0..=RX_FIFO_DEPTH {
            tpll.radio_irq().unwrap();
        }
        // one event per stored payload, none for the shed one
        let mut events = 0;
        while tpll.take_event().is_some() {
            events += 1;
        }
        let mut payloads = 0;
        let mut out = Payload::default();
        while tpll.read_rx_payload(&mut out) != (0, 0) {
            payloads += 1;
        }
        assert_eq!(events, RX_FIFO_DEPTH);
        assert_eq!(events, payloads);
        assert_eq!(tpll.state(), State::Rx);
    }

    #[test]
    fn full_rx_queue_withholds_the_ack() {
        let mut tpll = mk_tpll(&[(packet(0, 4, false, true), b"data")]);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_mode(Mode::Prx);
        tpll.init(&config).unwrap();
        for _ in 0..RX_FIFO_DEPTH {
            tpll.rx_queue
                .push_back((Payload::new(PipeId::Pipe0, b"old"), 0))
                .unwrap();
        }
        tpll.start_rx().unwrap();
        tpll.radio_irq().unwrap();
        // withholding the ack leaves the sender's retry to redeliver
        assert!(tpll.radio.sent.is_empty());
        assert_eq!(tpll.take_event(), None);
        assert_eq!(tpll.state(), State::Rx);
        assert_eq!(tpll.radio.rx_started.len(), 2);
    }

    #[test]
    fn corrupt_ack_frame_does_not_confirm_delivery() {
        let mut tpll = mk_tpll(&[
            (Completion::TxDone, &[]),
            (packet(0, 0, false, false), &[]),
        ]);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_auto_retry(0, 150);
        tpll.init(&config).unwrap();
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"ping"));
        tpll.start_tx().unwrap();
        tpll.radio_irq().unwrap();
        tpll.radio_irq().unwrap();
        // the garbled frame counts as a timeout, not as the ack
        assert_eq!(tpll.take_event(), Some(Event::TxFailed));
        assert_eq!(tpll.transmit_attempts(), 1);
        assert_eq!(tpll.packets_lost(), 1);
    }

    #[test]
    fn corrupt_ack_frame_burns_a_retry() {
        let mut tpll = mk_tpll(&[
            (Completion::TxDone, &[]),
            (packet(0, 0, false, false), &[]),
            (Completion::TxDone, &[]),
            (ACK, &[]),
        ]);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_auto_retry(5, 150);
        tpll.init(&config).unwrap();
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"ping"));
        tpll.start_tx().unwrap();
        for _ in 0..4 {
            tpll.radio_irq().unwrap();
        }
        assert_eq!(tpll.take_event(), Some(Event::TxFinished));
        assert_eq!(tpll.radio.sent.len(), 2);
        assert_eq!(tpll.transmit_attempts(), 1);
    }

    #[test]
    fn closed_pipe_packet_dropped() {
        let mut tpll = mk_tpll(&[(packet(3, 3, false, true), b"who")]);
        let config = TpllConfig::default()
            .with_event_handler(noop_handler)
            .with_mode(Mode::Prx);
        tpll.init(&config).unwrap();
        tpll.close_pipe(PipeId::Pipe3).unwrap();
        tpll.start_rx().unwrap();
        tpll.radio_irq().unwrap();
        assert_eq!(tpll.take_event(), None);
        assert!(tpll.radio.sent.is_empty());
        assert_eq!(tpll.state(), State::Rx);
    }

    #[test]
    fn disable_aborts_and_preserves_queues() {
        let mut tpll = mk_tpll(&[]);
        let config = TpllConfig::default().with_event_handler(noop_handler);
        tpll.init(&config).unwrap();
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"keep"));
        tpll.start_tx().unwrap();
        tpll.disable().unwrap();
        assert_eq!(tpll.state(), State::Idle);
        assert_eq!(tpll.radio.stops, 1);
        assert!(!tpll.tx_fifo_empty(PipeId::Pipe0));
        // restartable right away
        tpll.start_tx().unwrap();
    }

    #[test]
    fn poll_events_drains_through_the_handler() {
        static SEEN: AtomicUsize = AtomicUsize::new(0);
        fn counting_handler(_: Event) {
            SEEN.fetch_add(1, Ordering::Relaxed);
        }

        let mut tpll = mk_tpll(&[]);
        let config = TpllConfig::default().with_event_handler(counting_handler);
        tpll.init(&config).unwrap();
        tpll.push_event(Event::TxFinished);
        tpll.push_event(Event::RxReceived);
        assert_eq!(tpll.poll_events(), 2);
        assert_eq!(SEEN.load(Ordering::Relaxed), 2);
        assert_eq!(tpll.poll_events(), 0);
    }

    #[test]
    fn timing_setters_validate_and_guard() {
        let mut tpll = mk_tpll(&[]);
        let config = TpllConfig::default().with_event_handler(noop_handler);
        tpll.init(&config).unwrap();
        assert_eq!(tpll.set_tx_settle(107), Err(Error::InvalidParam));
        assert_eq!(tpll.set_tx_settle(4096), Err(Error::InvalidParam));
        tpll.set_tx_settle(200).unwrap();
        assert_eq!(tpll.set_rx_settle(84), Err(Error::InvalidParam));
        tpll.set_rx_settle(85).unwrap();
        assert_eq!(tpll.set_rx_wait(4), Err(Error::InvalidParam));
        tpll.set_rx_wait(4096).unwrap();
        assert_eq!(tpll.set_tx_wait(4097), Err(Error::InvalidParam));
        tpll.set_tx_wait(5).unwrap();
        assert_eq!(tpll.set_rx_timeout(84), Err(Error::InvalidParam));
        tpll.set_rx_timeout(1000).unwrap();

        tpll.state = State::Rx;
        assert_eq!(tpll.set_tx_settle(200), Err(Error::Busy));
        assert_eq!(tpll.set_rx_timeout(1000), Err(Error::Busy));
    }

    #[test]
    fn custom_rx_timeout_reaches_the_ack_window() {
        let mut tpll = mk_tpll(&[(Completion::TxDone, &[])]);
        let config = TpllConfig::default().with_event_handler(noop_handler);
        tpll.init(&config).unwrap();
        tpll.set_rx_timeout(1200).unwrap();
        tpll.write_payload(&Payload::new(PipeId::Pipe0, b"ping"));
        tpll.start_tx().unwrap();
        tpll.radio_irq().unwrap();
        assert_eq!(tpll.radio.rx_started, [Some(1200)]);
    }
}
