//! Transport sink for the serial peer

use lightning_hal::uart::UartTx;
use lightning_protocol::{encode_mode_line, LineError, MAX_LINE_LEN};

/// Errors from sending a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError<E> {
    /// Label could not be framed
    Frame(LineError),
    /// The underlying link failed
    Link(E),
}

/// Destination for confirmed mode labels
pub trait TransportSink {
    type Error;

    /// Send one label to the peer
    fn send_mode(&mut self, label: &str) -> Result<(), Self::Error>;
}

/// Sends each label as a newline-terminated line over a UART
pub struct SerialSink<T: UartTx> {
    uart: T,
}

impl<T: UartTx> SerialSink<T> {
    pub fn new(uart: T) -> Self {
        Self { uart }
    }

    pub fn into_inner(self) -> T {
        self.uart
    }
}

impl<T: UartTx> TransportSink for SerialSink<T> {
    type Error = TransportError<T::Error>;

    fn send_mode(&mut self, label: &str) -> Result<(), Self::Error> {
        let mut buf = [0u8; MAX_LINE_LEN + 1];
        let len = encode_mode_line(label, &mut buf).map_err(TransportError::Frame)?;
        self.uart
            .write_blocking(&buf[..len])
            .map_err(TransportError::Link)?;
        self.uart.flush().map_err(TransportError::Link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[derive(Default)]
    struct CaptureUart {
        written: Vec<u8, 64>,
        flushes: usize,
        fail: bool,
    }

    impl UartTx for CaptureUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.written.extend_from_slice(data).map_err(|_| ())
        }

        fn flush(&mut self) -> Result<(), ()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_sends_label_with_newline() {
        let mut sink = SerialSink::new(CaptureUart::default());
        sink.send_mode("PRPL_RAIN").unwrap();
        sink.send_mode("OFF").unwrap();

        let uart = sink.into_inner();
        assert_eq!(uart.written.as_slice(), b"PRPL_RAIN\nOFF\n");
        assert_eq!(uart.flushes, 2);
    }

    #[test]
    fn test_frame_error() {
        let mut sink = SerialSink::new(CaptureUart::default());
        assert_eq!(
            sink.send_mode(""),
            Err(TransportError::Frame(LineError::Empty))
        );
        assert!(sink.into_inner().written.is_empty());
    }

    #[test]
    fn test_link_error() {
        let uart = CaptureUart {
            fail: true,
            ..CaptureUart::default()
        };
        let mut sink = SerialSink::new(uart);
        assert_eq!(sink.send_mode("RED"), Err(TransportError::Link(())));
    }
}
