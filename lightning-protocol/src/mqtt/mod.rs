//! MQTT 3.1.1 packet codec
//!
//! Fixed header layout:
//! - TYPE/FLAGS (1 byte): packet type in the high nibble, flags in the low
//! - REMAINING LENGTH (1-4 bytes): variable-length integer, 7 bits per byte
//!
//! Encoding writes into caller-provided buffers; decoding copies topics and
//! payloads into bounded `heapless` containers.

pub mod decode;
pub mod encode;
pub mod parser;

pub use decode::{decode_packet, ConnectReturnCode, Packet, Publish};
pub use encode::{
    encode_connect, encode_pingreq, encode_puback, encode_publish, encode_subscribe, Connect,
    Will,
};
pub use parser::PacketParser;

/// Maximum topic length accepted or produced
pub const MAX_TOPIC_LEN: usize = 64;

/// Maximum application payload length accepted or produced
pub const MAX_PAYLOAD_LEN: usize = 64;

/// Maximum packet body the parser buffers (everything after the fixed header)
pub const MAX_PACKET_SIZE: usize = 256;

/// Largest value a 4-byte remaining length can carry
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// MQTT protocol level for version 3.1.1
pub const PROTOCOL_LEVEL: u8 = 4;

// Packet type identifiers (high nibble of the first header byte)
pub const CONNECT: u8 = 1;
pub const CONNACK: u8 = 2;
pub const PUBLISH: u8 = 3;
pub const PUBACK: u8 = 4;
pub const SUBSCRIBE: u8 = 8;
pub const SUBACK: u8 = 9;
pub const PINGREQ: u8 = 12;
pub const PINGRESP: u8 = 13;

/// Errors that can occur during packet encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Output buffer too small for the encoded packet
    BufferTooSmall,
    /// Remaining length field longer than 4 bytes or out of range
    InvalidLength,
    /// Packet body does not match its declared type
    Malformed,
    /// Topic exceeds `MAX_TOPIC_LEN` or is empty
    InvalidTopic,
    /// Payload exceeds `MAX_PAYLOAD_LEN`
    PayloadTooLarge,
    /// Packet exceeds the parser buffer; its bytes were discarded
    PacketTooLarge,
    /// A password was given without a user name
    PasswordWithoutUser,
}

/// Quality of service level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl QoS {
    /// Parse the two QoS bits of a PUBLISH header
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            2 => Some(QoS::ExactlyOnce),
            _ => None,
        }
    }
}

/// Number of bytes needed to encode `len` as a remaining length
pub fn remaining_length_size(len: usize) -> usize {
    match len {
        0..=127 => 1,
        128..=16_383 => 2,
        16_384..=2_097_151 => 3,
        _ => 4,
    }
}

/// Encode a remaining length into `buffer`
///
/// Returns the number of bytes written.
pub fn encode_remaining_length(mut len: usize, buffer: &mut [u8]) -> Result<usize, PacketError> {
    if len > MAX_REMAINING_LENGTH {
        return Err(PacketError::InvalidLength);
    }

    let mut written = 0;
    loop {
        let mut byte = (len % 128) as u8;
        len /= 128;
        if len > 0 {
            byte |= 0x80;
        }
        *buffer.get_mut(written).ok_or(PacketError::BufferTooSmall)? = byte;
        written += 1;
        if len == 0 {
            return Ok(written);
        }
    }
}

/// Decode a remaining length from the start of `bytes`
///
/// Returns `(length, bytes consumed)`, or `Ok(None)` if more bytes are needed.
pub fn decode_remaining_length(bytes: &[u8]) -> Result<Option<(usize, usize)>, PacketError> {
    let mut value = 0usize;
    let mut multiplier = 1usize;

    for (i, &byte) in bytes.iter().enumerate() {
        if i >= 4 {
            return Err(PacketError::InvalidLength);
        }
        value += (byte & 0x7F) as usize * multiplier;
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
        multiplier *= 128;
    }

    if bytes.len() >= 4 {
        return Err(PacketError::InvalidLength);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_remaining_length_boundaries() {
        let cases: [(usize, &[u8]); 6] = [
            (0, &[0x00]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (16_383, &[0xFF, 0x7F]),
            (16_384, &[0x80, 0x80, 0x01]),
            (MAX_REMAINING_LENGTH, &[0xFF, 0xFF, 0xFF, 0x7F]),
        ];

        for (len, expected) in cases {
            let mut buf = [0u8; 4];
            let n = encode_remaining_length(len, &mut buf).unwrap();
            assert_eq!(&buf[..n], expected);
            assert_eq!(n, remaining_length_size(len));
        }
    }

    #[test]
    fn test_remaining_length_too_large() {
        let mut buf = [0u8; 8];
        assert_eq!(
            encode_remaining_length(MAX_REMAINING_LENGTH + 1, &mut buf),
            Err(PacketError::InvalidLength)
        );
    }

    #[test]
    fn test_decode_needs_more_bytes() {
        assert_eq!(decode_remaining_length(&[0x80]), Ok(None));
        assert_eq!(decode_remaining_length(&[]), Ok(None));
    }

    #[test]
    fn test_decode_rejects_fifth_byte() {
        assert_eq!(
            decode_remaining_length(&[0x80, 0x80, 0x80, 0x80, 0x01]),
            Err(PacketError::InvalidLength)
        );
    }

    #[test]
    fn test_qos_bits() {
        assert_eq!(QoS::from_bits(0), Some(QoS::AtMostOnce));
        assert_eq!(QoS::from_bits(1), Some(QoS::AtLeastOnce));
        assert_eq!(QoS::from_bits(2), Some(QoS::ExactlyOnce));
        assert_eq!(QoS::from_bits(3), None);
    }

    proptest! {
        #[test]
        fn prop_remaining_length_decodes_what_it_encodes(len in 0usize..=MAX_REMAINING_LENGTH) {
            let mut buf = [0u8; 4];
            let n = encode_remaining_length(len, &mut buf).unwrap();
            prop_assert_eq!(decode_remaining_length(&buf[..n]), Ok(Some((len, n))));
        }
    }
}
