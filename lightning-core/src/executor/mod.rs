//! Effect execution
//!
//! Carries out a menu effect batch against the display, the serial peer
//! and the message bus, strictly in order. Every effect is best effort: a
//! failure is recorded in the [`Report`] and the rest of the batch still
//! runs, so a dead broker never stops the serial write or the redraw.

use embedded_hal_async::delay::DelayNs;

use crate::menu::{Effect, ModeTable};
use crate::traits::{apply_render, RenderSurface, StatePublisher, TransportSink};

/// Outcome of one effect batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report<SE, TE, PE> {
    /// Render effects drawn and flushed
    pub rendered: usize,
    /// Labels written to the serial peer
    pub transmitted: usize,
    /// Retained states published
    pub published: usize,
    /// Publishes skipped because the broker was offline
    pub publish_skipped: usize,
    /// Last render failure
    pub render_error: Option<SE>,
    /// Last serial failure
    pub transport_error: Option<TE>,
    /// Last publish failure; the session has been marked lost
    pub publish_error: Option<PE>,
}

impl<SE, TE, PE> Report<SE, TE, PE> {
    fn new() -> Self {
        Self {
            rendered: 0,
            transmitted: 0,
            published: 0,
            publish_skipped: 0,
            render_error: None,
            transport_error: None,
            publish_error: None,
        }
    }

    /// Returns true if any effect failed
    pub fn has_errors(&self) -> bool {
        self.render_error.is_some()
            || self.transport_error.is_some()
            || self.publish_error.is_some()
    }
}

/// Runs effect batches against the selector's outputs
pub struct EffectExecutor<S, T, P, D> {
    surface: S,
    transport: T,
    publisher: P,
    delay: D,
}

impl<S, T, P, D> EffectExecutor<S, T, P, D>
where
    S: RenderSurface,
    T: TransportSink,
    P: StatePublisher,
    D: DelayNs,
{
    pub fn new(surface: S, transport: T, publisher: P, delay: D) -> Self {
        Self {
            surface,
            transport,
            publisher,
            delay,
        }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    pub fn into_parts(self) -> (S, T, P, D) {
        (self.surface, self.transport, self.publisher, self.delay)
    }

    /// Execute `effects` in order
    ///
    /// `Hold` blocks for its full duration before the next effect starts.
    /// A failed publish marks the session lost; the publish is not retried.
    pub async fn run(
        &mut self,
        table: &ModeTable,
        effects: &[Effect],
    ) -> Report<S::Error, T::Error, P::Error> {
        let mut report = Report::new();

        for effect in effects {
            match *effect {
                Effect::Redraw { .. } | Effect::Highlight { .. } => {
                    match apply_render(&mut self.surface, table, effect) {
                        Ok(_) => report.rendered += 1,
                        Err(e) => report.render_error = Some(e),
                    }
                }
                Effect::Hold { ms } => self.delay.delay_ms(ms).await,
                Effect::Transmit(id) => {
                    let Some(label) = table.label(id) else {
                        continue;
                    };
                    match self.transport.send_mode(label) {
                        Ok(()) => report.transmitted += 1,
                        Err(e) => report.transport_error = Some(e),
                    }
                }
                Effect::Publish(id) => {
                    let Some(label) = table.label(id) else {
                        continue;
                    };
                    if !self.publisher.is_connected() {
                        report.publish_skipped += 1;
                        continue;
                    }
                    match self.publisher.publish_state(label).await {
                        Ok(()) => report.published += 1,
                        Err(e) => {
                            self.publisher.mark_lost();
                            report.publish_error = Some(e);
                        }
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::Topics;
    use crate::menu::{Direction, HighlightStyle, Menu, ModeId, ModeOption, DEFAULT_FLASH_MS};
    use crate::traits::SerialSink;
    use embassy_futures::block_on;
    use heapless::Vec;
    use lightning_hal::uart::UartTx;
    use lightning_protocol::PacketError;

    #[derive(Default)]
    struct CountingSurface {
        draws: usize,
        fail: bool,
    }

    impl RenderSurface for CountingSurface {
        type Error = ();

        fn clear(&mut self) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            Ok(())
        }

        fn draw_option_list(&mut self, _options: &[ModeOption], _highlighted: ModeId) -> Result<(), ()> {
            self.draws += 1;
            Ok(())
        }

        fn draw_transient_highlight(
            &mut self,
            _options: &[ModeOption],
            _id: ModeId,
            _style: HighlightStyle,
        ) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.draws += 1;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct WireUart {
        wire: Vec<u8, 64>,
        fail: bool,
    }

    impl UartTx for WireUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.wire.extend_from_slice(data).map_err(|_| ())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum BrokerError {
        Encode(PacketError),
        Socket,
    }

    /// Encodes each publish the way the client puts it on the socket
    struct RecordingBroker {
        topics: Topics,
        connected: bool,
        fail: bool,
        wire: Vec<u8, 256>,
        lost: usize,
    }

    impl RecordingBroker {
        fn online() -> Self {
            Self {
                topics: Topics::for_device("lightning_cloud").unwrap(),
                connected: true,
                fail: false,
                wire: Vec::new(),
                lost: 0,
            }
        }
    }

    impl StatePublisher for RecordingBroker {
        type Error = BrokerError;

        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn publish_state(&mut self, label: &str) -> Result<(), BrokerError> {
            if self.fail {
                return Err(BrokerError::Socket);
            }
            let mut buf = [0u8; 128];
            let len = self
                .topics
                .encode_state(label, &mut buf)
                .map_err(BrokerError::Encode)?;
            self.wire
                .extend_from_slice(&buf[..len])
                .map_err(|_| BrokerError::Socket)
        }

        fn mark_lost(&mut self) {
            self.connected = false;
            self.lost += 1;
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        held_ms: Vec<u32, 8>,
    }

    impl DelayNs for RecordingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            let _ = self.held_ms.push(ns / 1_000_000);
        }

        async fn delay_ms(&mut self, ms: u32) {
            let _ = self.held_ms.push(ms);
        }
    }

    type TestExecutor =
        EffectExecutor<CountingSurface, SerialSink<WireUart>, RecordingBroker, RecordingDelay>;

    fn make_executor(broker: RecordingBroker) -> TestExecutor {
        EffectExecutor::new(
            CountingSurface::default(),
            SerialSink::new(WireUart::default()),
            broker,
            RecordingDelay::default(),
        )
    }

    fn make_menu() -> Menu {
        Menu::new(ModeTable::reference().unwrap(), DEFAULT_FLASH_MS)
    }

    /// Retained QoS 0 PUBLISH on state/lightning_cloud/mode
    fn state_publish(label: &str) -> Vec<u8, 128> {
        let topic = b"state/lightning_cloud/mode";
        let remaining = (2 + topic.len() + label.len()) as u8;
        let mut expected = Vec::new();
        expected
            .extend_from_slice(&[0x31, remaining, 0x00, topic.len() as u8])
            .unwrap();
        expected.extend_from_slice(topic).unwrap();
        expected.extend_from_slice(label.as_bytes()).unwrap();
        expected
    }

    #[test]
    fn test_wrap_to_prpl_rain_and_confirm() {
        let mut menu = make_menu();
        let mut executor = make_executor(RecordingBroker::online());

        let effects = menu.cycle(Direction::Prev);
        let report = block_on(executor.run(menu.table(), &effects));
        assert_eq!(report.rendered, 3);
        assert_eq!(report.transmitted + report.published, 0);

        let effects = menu.confirm();
        let report = block_on(executor.run(menu.table(), &effects));
        assert_eq!(report.rendered, 2);
        assert_eq!(report.transmitted, 1);
        assert_eq!(report.published, 1);
        assert!(!report.has_errors());

        let (surface, sink, broker, delay) = executor.into_parts();
        assert_eq!(surface.draws, 5);
        assert_eq!(sink.into_inner().wire.as_slice(), b"PRPL_RAIN\n");
        assert_eq!(broker.wire.as_slice(), state_publish("PRPL_RAIN").as_slice());
        assert_eq!(delay.held_ms.as_slice(), &[500]);
    }

    #[test]
    fn test_remote_red_while_off() {
        let mut menu = make_menu();
        let mut executor = make_executor(RecordingBroker::online());

        menu.cycle(Direction::Next);
        assert_eq!(menu.selected_label(), "OFF");

        let effects = menu.apply_remote("RED");
        let report = block_on(executor.run(menu.table(), &effects));
        assert_eq!(report.rendered, 5);
        assert_eq!((report.transmitted, report.published), (1, 1));

        let (_, sink, broker, _) = executor.into_parts();
        assert_eq!(sink.into_inner().wire.as_slice(), b"RED\n");
        assert_eq!(broker.wire.as_slice(), state_publish("RED").as_slice());
    }

    #[test]
    fn test_confirm_twice_writes_twice() {
        let mut menu = make_menu();
        let mut executor = make_executor(RecordingBroker::online());

        for _ in 0..2 {
            let effects = menu.confirm();
            block_on(executor.run(menu.table(), &effects));
        }

        let (_, sink, broker, delay) = executor.into_parts();
        assert_eq!(sink.into_inner().wire.as_slice(), b"ON\nON\n");
        let once = state_publish("ON");
        assert_eq!(&broker.wire[..once.len()], once.as_slice());
        assert_eq!(&broker.wire[once.len()..], once.as_slice());
        assert_eq!(delay.held_ms.as_slice(), &[500, 500]);
    }

    #[test]
    fn test_offline_publish_skipped_serial_still_sent() {
        let mut menu = make_menu();
        let broker = RecordingBroker {
            connected: false,
            ..RecordingBroker::online()
        };
        let mut executor = make_executor(broker);

        let effects = menu.confirm();
        let report = block_on(executor.run(menu.table(), &effects));
        assert_eq!(report.transmitted, 1);
        assert_eq!(report.published, 0);
        assert_eq!(report.publish_skipped, 1);
        assert!(!report.has_errors());

        let (_, sink, broker, _) = executor.into_parts();
        assert_eq!(sink.into_inner().wire.as_slice(), b"ON\n");
        assert!(broker.wire.is_empty());
        assert_eq!(broker.lost, 0);
    }

    #[test]
    fn test_failed_publish_marks_session_lost() {
        let mut menu = make_menu();
        let broker = RecordingBroker {
            fail: true,
            ..RecordingBroker::online()
        };
        let mut executor = make_executor(broker);

        let effects = menu.apply_remote("ACID");
        let report = block_on(executor.run(menu.table(), &effects));
        assert_eq!(report.transmitted, 1);
        assert_eq!(report.publish_error, Some(BrokerError::Socket));
        assert!(!executor.publisher().is_connected());
        assert_eq!(executor.publisher().lost, 1);

        // Next confirm is skipped, not retried, until the loop reconnects
        let effects = menu.confirm();
        let report = block_on(executor.run(menu.table(), &effects));
        assert_eq!(report.publish_skipped, 1);
        assert_eq!(executor.publisher().lost, 1);
        assert_eq!(menu.selected_label(), "ACID");
    }

    #[test]
    fn test_serial_and_render_failures_do_not_stop_publish() {
        let mut menu = make_menu();
        let mut executor = EffectExecutor::new(
            CountingSurface {
                fail: true,
                ..CountingSurface::default()
            },
            SerialSink::new(WireUart {
                fail: true,
                ..WireUart::default()
            }),
            RecordingBroker::online(),
            RecordingDelay::default(),
        );

        let effects = menu.apply_remote("FADE");
        let report = block_on(executor.run(menu.table(), &effects));
        assert!(report.has_errors());
        assert_eq!(report.render_error, Some(()));
        assert!(report.transport_error.is_some());
        assert_eq!(report.published, 1);

        let (_, _, broker, delay) = executor.into_parts();
        assert_eq!(broker.wire.as_slice(), state_publish("FADE").as_slice());
        assert_eq!(delay.held_ms.as_slice(), &[DEFAULT_FLASH_MS]);
    }
}
