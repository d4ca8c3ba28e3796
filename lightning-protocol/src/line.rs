//! Mode line framing for the peer device link
//!
//! One frame per confirmed mode: the label's UTF-8 bytes followed by `\n`.

/// Maximum label length carried on one line (excluding the newline)
pub const MAX_LINE_LEN: usize = 32;

/// Line terminator
pub const LINE_END: u8 = b'\n';

/// Errors that can occur while framing mode lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Label is empty
    Empty,
    /// Label contains a line terminator
    EmbeddedNewline,
    /// Label exceeds `MAX_LINE_LEN` or the output buffer
    TooLong,
}

/// Encode a mode label as a line frame
///
/// Returns the number of bytes written.
pub fn encode_mode_line(label: &str, buffer: &mut [u8]) -> Result<usize, LineError> {
    if label.is_empty() {
        return Err(LineError::Empty);
    }
    if label.bytes().any(|b| b == LINE_END) {
        return Err(LineError::EmbeddedNewline);
    }

    let len = label.len();
    if len > MAX_LINE_LEN || buffer.len() < len + 1 {
        return Err(LineError::TooLong);
    }

    buffer[..len].copy_from_slice(label.as_bytes());
    buffer[len] = LINE_END;
    Ok(len + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_label() {
        let mut buf = [0u8; 16];
        let len = encode_mode_line("PRPL_RAIN", &mut buf).unwrap();
        assert_eq!(&buf[..len], b"PRPL_RAIN\n");
    }

    #[test]
    fn test_encode_rejects_bad_labels() {
        let mut buf = [0u8; 64];
        assert_eq!(encode_mode_line("", &mut buf), Err(LineError::Empty));
        assert_eq!(
            encode_mode_line("A\nB", &mut buf),
            Err(LineError::EmbeddedNewline)
        );
        let long = core::str::from_utf8(&[b'X'; MAX_LINE_LEN + 1]).unwrap();
        assert_eq!(encode_mode_line(long, &mut buf), Err(LineError::TooLong));
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buf = [0u8; 3];
        assert_eq!(encode_mode_line("RED", &mut buf), Err(LineError::TooLong));
    }
}
