//! Message bus link policy
//!
//! Tracks whether the broker session is up, when the next keepalive ping is
//! due, and the topic names for this device. Time is passed in as
//! milliseconds since boot so the policy stays independent of any timer.

use core::fmt::Write;

use heapless::String;
use lightning_protocol::mqtt::encode_publish;
use lightning_protocol::{PacketError, MAX_TOPIC_LEN};

pub mod inbound;

pub use inbound::{Admission, InboundQueue, INBOUND_QUEUE_LEN};

/// Retained status payload while the device is online
pub const STATUS_CONNECTED: &str = "connected";

/// Retained status payload left by the broker when the device drops off
pub const STATUS_DISCONNECTED: &str = "disconnected";

/// Bounded topic name
pub type Topic = String<MAX_TOPIC_LEN>;

/// Timing for the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkPolicy {
    /// Interval between keepalive pings while connected
    pub ping_interval_ms: u64,
    /// Delay between failed connection attempts
    pub retry_backoff_ms: u64,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            ping_interval_ms: 60_000,
            retry_backoff_ms: 500,
        }
    }
}

/// Broker session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectionState {
    policy: LinkPolicy,
    connected: bool,
    last_ping_ms: u64,
}

impl ConnectionState {
    /// Start disconnected
    pub fn new(policy: LinkPolicy) -> Self {
        Self {
            policy,
            connected: false,
            last_ping_ms: 0,
        }
    }

    pub fn policy(&self) -> &LinkPolicy {
        &self.policy
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Record a successful connect; the ping clock restarts now
    pub fn mark_connected(&mut self, now_ms: u64) {
        self.connected = true;
        self.last_ping_ms = now_ms;
    }

    /// Record a failed operation; the next loop iteration reconnects
    pub fn mark_lost(&mut self) {
        self.connected = false;
    }

    /// Returns true when a keepalive ping should be sent
    pub fn ping_due(&self, now_ms: u64) -> bool {
        self.connected && now_ms.saturating_sub(self.last_ping_ms) >= self.policy.ping_interval_ms
    }

    pub fn ping_sent(&mut self, now_ms: u64) {
        self.last_ping_ms = now_ms;
    }
}

/// Errors raised while deriving topic names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicError {
    /// Device name is empty
    EmptyDevice,
    /// Device name contains a level separator or wildcard
    InvalidDevice,
    /// A derived topic exceeds `MAX_TOPIC_LEN`
    TooLong,
}

/// Topic names for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    /// Inbound mode commands
    pub command: Topic,
    /// Retained current mode
    pub state: Topic,
    /// Retained connection status
    pub status: Topic,
}

impl Topics {
    /// Derive the topics for `device`
    pub fn for_device(device: &str) -> Result<Self, TopicError> {
        if device.is_empty() {
            return Err(TopicError::EmptyDevice);
        }
        if device.contains(['/', '+', '#']) {
            return Err(TopicError::InvalidDevice);
        }

        Ok(Self {
            command: topic("cmd", device, "mode")?,
            state: topic("state", device, "mode")?,
            status: topic("state", device, "connection_status")?,
        })
    }

    /// Encode the retained state PUBLISH for a confirmed `label`
    pub fn encode_state(&self, label: &str, buffer: &mut [u8]) -> Result<usize, PacketError> {
        encode_publish(self.state.as_str(), label.as_bytes(), true, buffer)
    }

    /// Encode the retained connection status PUBLISH sent after connecting
    pub fn encode_online(&self, buffer: &mut [u8]) -> Result<usize, PacketError> {
        encode_publish(
            self.status.as_str(),
            STATUS_CONNECTED.as_bytes(),
            true,
            buffer,
        )
    }
}

fn topic(prefix: &str, device: &str, leaf: &str) -> Result<Topic, TopicError> {
    let mut out = Topic::new();
    write!(out, "{}/{}/{}", prefix, device, leaf).map_err(|_| TopicError::TooLong)?;
    Ok(out)
}
