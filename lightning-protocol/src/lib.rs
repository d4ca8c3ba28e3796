//! Wire formats spoken by the Lightning mode selector
//!
//! Two links leave the controller:
//!
//! - **MQTT 3.1.1** to the broker, over TCP. Only the subset the selector
//!   needs is implemented: CONNECT with a last will, SUBSCRIBE, QoS 0
//!   PUBLISH and keepalive PINGREQ on the way out; CONNACK,
//!   SUBACK, PUBLISH and PINGRESP on the way in.
//! - **Mode line** to the peer lighting controller, over UART:
//!
//! ```text
//! ┌──────────────────────┬────┐
//! │ LABEL (UTF-8)        │ \n │
//! │ 1–32B                │ 1B │
//! └──────────────────────┴────┘
//! ```
//!
//! No length prefix, checksum or acknowledgement is used on the mode line.

#![no_std]
#![deny(unsafe_code)]

pub mod line;
pub mod mqtt;

pub use line::{encode_mode_line, LineError, MAX_LINE_LEN};
pub use mqtt::{
    ConnectReturnCode, Packet, PacketError, PacketParser, Publish, QoS, MAX_PACKET_SIZE,
    MAX_PAYLOAD_LEN, MAX_TOPIC_LEN,
};
