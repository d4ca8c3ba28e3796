//! Outbound packet encoding
//!
//! Every encoder computes the remaining length first, then writes the fixed
//! header and body into the caller's buffer in one pass.

use super::{
    encode_remaining_length, remaining_length_size, PacketError, CONNECT, MAX_PAYLOAD_LEN,
    MAX_TOPIC_LEN, PINGREQ, PROTOCOL_LEVEL, PUBACK, PUBLISH, SUBSCRIBE,
};

// CONNECT flag bits
const FLAG_USERNAME: u8 = 0x80;
const FLAG_PASSWORD: u8 = 0x40;
const FLAG_WILL_RETAIN: u8 = 0x20;
const FLAG_WILL: u8 = 0x04;
const FLAG_CLEAN_SESSION: u8 = 0x02;

/// Last will registered with the broker at connect time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Will<'a> {
    pub topic: &'a str,
    pub message: &'a [u8],
    pub retain: bool,
}

/// CONNECT packet contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connect<'a> {
    pub client_id: &'a str,
    /// Keepalive in seconds announced to the broker
    pub keepalive_s: u16,
    pub clean_session: bool,
    pub username: Option<&'a str>,
    pub password: Option<&'a [u8]>,
    pub will: Option<Will<'a>>,
}

/// Cursor over an output buffer
struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put_u8(&mut self, byte: u8) -> Result<(), PacketError> {
        *self.buf.get_mut(self.pos).ok_or(PacketError::BufferTooSmall)? = byte;
        self.pos += 1;
        Ok(())
    }

    fn put_u16(&mut self, value: u16) -> Result<(), PacketError> {
        self.put_bytes(&value.to_be_bytes())
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), PacketError> {
        let end = self.pos + bytes.len();
        self.buf
            .get_mut(self.pos..end)
            .ok_or(PacketError::BufferTooSmall)?
            .copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Write a length-prefixed string or binary field
    fn put_field(&mut self, bytes: &[u8]) -> Result<(), PacketError> {
        let len = u16::try_from(bytes.len()).map_err(|_| PacketError::InvalidLength)?;
        self.put_u16(len)?;
        self.put_bytes(bytes)
    }

    fn put_fixed_header(&mut self, first: u8, remaining: usize) -> Result<(), PacketError> {
        let needed = 1 + remaining_length_size(remaining) + remaining;
        if self.buf.len() < self.pos + needed {
            return Err(PacketError::BufferTooSmall);
        }
        self.put_u8(first)?;
        let n = encode_remaining_length(remaining, &mut self.buf[self.pos..])?;
        self.pos += n;
        Ok(())
    }

    fn finish(self) -> usize {
        self.pos
    }
}

fn check_topic(topic: &str) -> Result<(), PacketError> {
    if topic.is_empty() || topic.len() > MAX_TOPIC_LEN {
        return Err(PacketError::InvalidTopic);
    }
    Ok(())
}

/// Encode a CONNECT packet
///
/// Returns the number of bytes written.
pub fn encode_connect(connect: &Connect<'_>, buffer: &mut [u8]) -> Result<usize, PacketError> {
    if connect.password.is_some() && connect.username.is_none() {
        return Err(PacketError::PasswordWithoutUser);
    }

    let mut flags = 0u8;
    // Variable header: protocol name, level, flags, keepalive
    let mut remaining = 2 + 4 + 1 + 1 + 2;
    remaining += 2 + connect.client_id.len();

    if connect.clean_session {
        flags |= FLAG_CLEAN_SESSION;
    }
    if let Some(will) = &connect.will {
        check_topic(will.topic)?;
        flags |= FLAG_WILL;
        if will.retain {
            flags |= FLAG_WILL_RETAIN;
        }
        remaining += 2 + will.topic.len() + 2 + will.message.len();
    }
    if let Some(user) = connect.username {
        flags |= FLAG_USERNAME;
        remaining += 2 + user.len();
    }
    if let Some(password) = connect.password {
        flags |= FLAG_PASSWORD;
        remaining += 2 + password.len();
    }

    let mut w = Writer::new(buffer);
    w.put_fixed_header(CONNECT << 4, remaining)?;
    w.put_field(b"MQTT")?;
    w.put_u8(PROTOCOL_LEVEL)?;
    w.put_u8(flags)?;
    w.put_u16(connect.keepalive_s)?;
    w.put_field(connect.client_id.as_bytes())?;
    if let Some(will) = &connect.will {
        w.put_field(will.topic.as_bytes())?;
        w.put_field(will.message)?;
    }
    if let Some(user) = connect.username {
        w.put_field(user.as_bytes())?;
    }
    if let Some(password) = connect.password {
        w.put_field(password)?;
    }
    Ok(w.finish())
}

/// Encode a QoS 0 PUBLISH packet
pub fn encode_publish(
    topic: &str,
    payload: &[u8],
    retain: bool,
    buffer: &mut [u8],
) -> Result<usize, PacketError> {
    check_topic(topic)?;
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(PacketError::PayloadTooLarge);
    }

    let first = (PUBLISH << 4) | u8::from(retain);
    let remaining = 2 + topic.len() + payload.len();

    let mut w = Writer::new(buffer);
    w.put_fixed_header(first, remaining)?;
    w.put_field(topic.as_bytes())?;
    w.put_bytes(payload)?;
    Ok(w.finish())
}

/// Encode a SUBSCRIBE packet for a single topic filter at QoS 0
pub fn encode_subscribe(
    packet_id: u16,
    topic: &str,
    buffer: &mut [u8],
) -> Result<usize, PacketError> {
    check_topic(topic)?;

    // SUBSCRIBE carries the mandatory reserved flag bits 0b0010
    let first = (SUBSCRIBE << 4) | 0x02;
    let remaining = 2 + 2 + topic.len() + 1;

    let mut w = Writer::new(buffer);
    w.put_fixed_header(first, remaining)?;
    w.put_u16(packet_id)?;
    w.put_field(topic.as_bytes())?;
    w.put_u8(0)?;
    Ok(w.finish())
}

/// Encode a PUBACK for a QoS 1 delivery
pub fn encode_puback(packet_id: u16, buffer: &mut [u8]) -> Result<usize, PacketError> {
    let mut w = Writer::new(buffer);
    w.put_fixed_header(PUBACK << 4, 2)?;
    w.put_u16(packet_id)?;
    Ok(w.finish())
}

/// Encode a PINGREQ packet
pub fn encode_pingreq(buffer: &mut [u8]) -> Result<usize, PacketError> {
    let mut w = Writer::new(buffer);
    w.put_fixed_header(PINGREQ << 4, 0)?;
    Ok(w.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_connect() -> Connect<'static> {
        Connect {
            client_id: "pico",
            keepalive_s: 3600,
            clean_session: true,
            username: None,
            password: None,
            will: None,
        }
    }

    #[test]
    fn test_connect_minimal() {
        let mut buf = [0u8; 64];
        let len = encode_connect(&basic_connect(), &mut buf).unwrap();

        let expected: &[u8] = &[
            0x10, 16, // fixed header
            0x00, 0x04, b'M', b'Q', b'T', b'T', // protocol name
            0x04, // level
            0x02, // clean session
            0x0E, 0x10, // keepalive 3600
            0x00, 0x04, b'p', b'i', b'c', b'o', // client id
        ];
        assert_eq!(&buf[..len], expected);
    }

    #[test]
    fn test_connect_with_will_and_credentials() {
        let connect = Connect {
            username: Some("u"),
            password: Some(b"pw"),
            will: Some(Will {
                topic: "s/t",
                message: b"gone",
                retain: true,
            }),
            ..basic_connect()
        };
        let mut buf = [0u8; 128];
        let len = encode_connect(&connect, &mut buf).unwrap();

        // flags: user | password | will retain | will | clean session
        assert_eq!(buf[9], 0x80 | 0x40 | 0x20 | 0x04 | 0x02);

        // Payload order: client id, will topic, will message, user, password
        let payload = &buf[12..len];
        let expected: &[u8] = &[
            0x00, 0x04, b'p', b'i', b'c', b'o', //
            0x00, 0x03, b's', b'/', b't', //
            0x00, 0x04, b'g', b'o', b'n', b'e', //
            0x00, 0x01, b'u', //
            0x00, 0x02, b'p', b'w',
        ];
        assert_eq!(payload, expected);
        assert_eq!(buf[1] as usize, len - 2);
    }

    #[test]
    fn test_connect_password_requires_user() {
        let connect = Connect {
            password: Some(b"secret"),
            ..basic_connect()
        };
        let mut buf = [0u8; 64];
        assert_eq!(
            encode_connect(&connect, &mut buf),
            Err(PacketError::PasswordWithoutUser)
        );
    }

    #[test]
    fn test_publish_retained() {
        let mut buf = [0u8; 64];
        let len = encode_publish("state/x/mode", b"RED", true, &mut buf).unwrap();

        assert_eq!(buf[0], 0x31);
        assert_eq!(buf[1] as usize, 2 + 12 + 3);
        assert_eq!(&buf[2..4], &[0x00, 12]);
        assert_eq!(&buf[4..16], b"state/x/mode");
        assert_eq!(&buf[16..len], b"RED");
    }

    #[test]
    fn test_publish_not_retained() {
        let mut buf = [0u8; 32];
        encode_publish("t", b"", false, &mut buf).unwrap();
        assert_eq!(buf[0], 0x30);
    }

    #[test]
    fn test_publish_rejects_bad_topic_and_payload() {
        let mut buf = [0u8; 256];
        assert_eq!(
            encode_publish("", b"x", false, &mut buf),
            Err(PacketError::InvalidTopic)
        );
        let payload = [b'a'; MAX_PAYLOAD_LEN + 1];
        assert_eq!(
            encode_publish("t", &payload, false, &mut buf),
            Err(PacketError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_publish_buffer_too_small() {
        let mut buf = [0u8; 8];
        assert_eq!(
            encode_publish("state/x/mode", b"RED", true, &mut buf),
            Err(PacketError::BufferTooSmall)
        );
    }

    #[test]
    fn test_subscribe() {
        let mut buf = [0u8; 32];
        let len = encode_subscribe(1, "cmd/x/mode", &mut buf).unwrap();

        let mut expected = [0u8; 17];
        expected[..6].copy_from_slice(&[0x82, 15, 0x00, 0x01, 0x00, 10]);
        expected[6..16].copy_from_slice(b"cmd/x/mode");
        expected[16] = 0x00;
        assert_eq!(&buf[..len], &expected);
    }

    #[test]
    fn test_control_packets() {
        let mut buf = [0u8; 4];
        let len = encode_pingreq(&mut buf).unwrap();
        assert_eq!(&buf[..len], &[0xC0, 0x00]);

        let len = encode_puback(0x1234, &mut buf).unwrap();
        assert_eq!(&buf[..len], &[0x40, 0x02, 0x12, 0x34]);
    }
}
