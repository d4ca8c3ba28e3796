//! Inbound packet decoding
//!
//! Decodes a complete packet (fixed header byte plus body) as produced by
//! [`PacketParser`](super::PacketParser).

use heapless::{String, Vec};

use super::{
    PacketError, QoS, CONNACK, MAX_PAYLOAD_LEN, MAX_TOPIC_LEN, PINGRESP, PUBLISH, SUBACK,
};

/// CONNACK return codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectReturnCode {
    Accepted,
    UnacceptableProtocol,
    IdentifierRejected,
    ServerUnavailable,
    BadCredentials,
    NotAuthorized,
    Unknown(u8),
}

impl ConnectReturnCode {
    /// Parse a CONNACK return code byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => ConnectReturnCode::Accepted,
            1 => ConnectReturnCode::UnacceptableProtocol,
            2 => ConnectReturnCode::IdentifierRejected,
            3 => ConnectReturnCode::ServerUnavailable,
            4 => ConnectReturnCode::BadCredentials,
            5 => ConnectReturnCode::NotAuthorized,
            other => ConnectReturnCode::Unknown(other),
        }
    }

    /// Returns true if the broker accepted the connection
    pub fn is_accepted(&self) -> bool {
        matches!(self, ConnectReturnCode::Accepted)
    }
}

/// An application message delivered by the broker
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Publish {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
    pub qos: QoS,
    pub retain: bool,
    /// Present for QoS 1 and 2 deliveries
    pub packet_id: Option<u16>,
}

impl Publish {
    /// Payload as UTF-8 text, if valid
    pub fn payload_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.payload).ok()
    }
}

/// Packets the client understands
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Packet {
    ConnAck {
        session_present: bool,
        code: ConnectReturnCode,
    },
    SubAck {
        packet_id: u16,
        /// First granted QoS, or 0x80 on failure
        return_code: u8,
    },
    Publish(Publish),
    PingResp,
    /// Any other packet type, identified by its type nibble
    Other(u8),
}

fn read_u16(body: &[u8], at: usize) -> Result<u16, PacketError> {
    let bytes = body.get(at..at + 2).ok_or(PacketError::Malformed)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Decode a packet from its first header byte and body
pub fn decode_packet(header: u8, body: &[u8]) -> Result<Packet, PacketError> {
    match header >> 4 {
        CONNACK => {
            if body.len() != 2 {
                return Err(PacketError::Malformed);
            }
            Ok(Packet::ConnAck {
                session_present: body[0] & 0x01 != 0,
                code: ConnectReturnCode::from_byte(body[1]),
            })
        }
        SUBACK => {
            let packet_id = read_u16(body, 0)?;
            let return_code = *body.get(2).ok_or(PacketError::Malformed)?;
            Ok(Packet::SubAck {
                packet_id,
                return_code,
            })
        }
        PUBLISH => decode_publish(header, body).map(Packet::Publish),
        PINGRESP => Ok(Packet::PingResp),
        other => Ok(Packet::Other(other)),
    }
}

fn decode_publish(header: u8, body: &[u8]) -> Result<Publish, PacketError> {
    let qos = QoS::from_bits((header >> 1) & 0x03).ok_or(PacketError::Malformed)?;
    let retain = header & 0x01 != 0;

    let topic_len = read_u16(body, 0)? as usize;
    let topic_bytes = body.get(2..2 + topic_len).ok_or(PacketError::Malformed)?;
    let topic_str = core::str::from_utf8(topic_bytes).map_err(|_| PacketError::Malformed)?;

    let mut topic = String::new();
    topic
        .push_str(topic_str)
        .map_err(|_| PacketError::InvalidTopic)?;

    let mut at = 2 + topic_len;
    let packet_id = if qos == QoS::AtMostOnce {
        None
    } else {
        let id = read_u16(body, at)?;
        at += 2;
        Some(id)
    };

    let mut payload = Vec::new();
    payload
        .extend_from_slice(&body[at..])
        .map_err(|_| PacketError::PayloadTooLarge)?;

    Ok(Publish {
        topic,
        payload,
        qos,
        retain,
        packet_id,
    })
}
