//! MQTT client over an embassy-net TCP socket
//!
//! One socket is reused across reconnects. Inbound application messages for
//! the command topic are queued and handed out one per poll so the control
//! loop interleaves them with button handling.

use defmt::*;
use embassy_net::tcp::{self, ConnectError, TcpSocket};
use embassy_net::IpEndpoint;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use embedded_io_async::Write;

use lightning_core::config::BrokerConfig;
use lightning_core::link::{Admission, ConnectionState, InboundQueue, Topics, STATUS_DISCONNECTED};
use lightning_core::traits::StatePublisher;
use lightning_protocol::mqtt::{
    encode_connect, encode_pingreq, encode_puback, encode_subscribe, Connect, ConnectReturnCode,
    Packet, PacketError, PacketParser, Publish, QoS, Will,
};

/// Outbound packet scratch buffer
const TX_SCRATCH_LEN: usize = 256;

/// Time allowed for the broker to answer CONNECT
const CONNACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Socket read/write timeout
const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the broker session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum MqttError {
    /// TCP connect failed
    Connect(ConnectError),
    /// Socket read or write failed
    Socket(tcp::Error),
    /// Packet could not be encoded or decoded
    Packet(PacketError),
    /// Broker refused the session
    Rejected(ConnectReturnCode),
    /// No CONNACK within the timeout
    Timeout,
    /// Peer closed the connection
    Closed,
}

impl From<tcp::Error> for MqttError {
    fn from(e: tcp::Error) -> Self {
        MqttError::Socket(e)
    }
}

impl From<PacketError> for MqttError {
    fn from(e: PacketError) -> Self {
        MqttError::Packet(e)
    }
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Broker session for one device
pub struct MqttClient<'a> {
    socket: TcpSocket<'a>,
    endpoint: IpEndpoint,
    settings: &'a BrokerConfig,
    topics: Topics,
    link: ConnectionState,
    parser: PacketParser,
    inbound: InboundQueue,
    next_packet_id: u16,
    scratch: [u8; TX_SCRATCH_LEN],
}

impl<'a> MqttClient<'a> {
    pub fn new(
        mut socket: TcpSocket<'a>,
        endpoint: IpEndpoint,
        settings: &'a BrokerConfig,
        topics: Topics,
    ) -> Self {
        socket.set_timeout(Some(SOCKET_TIMEOUT));
        Self {
            socket,
            endpoint,
            settings,
            inbound: InboundQueue::new(topics.command.clone()),
            topics,
            link: ConnectionState::new(settings.link_policy()),
            parser: PacketParser::new(),
            next_packet_id: 1,
            scratch: [0; TX_SCRATCH_LEN],
        }
    }

    /// Connect, retrying with a fixed backoff until the broker accepts
    pub async fn ensure_connected(&mut self) {
        while !self.link.is_connected() {
            match self.connect().await {
                Ok(()) => info!("MQTT connected to {}", self.endpoint),
                Err(e) => {
                    warn!("MQTT connect failed: {:?}", e);
                    self.socket.abort();
                    Timer::after_millis(self.link.policy().retry_backoff_ms).await;
                }
            }
        }
    }

    async fn connect(&mut self) -> Result<(), MqttError> {
        // Let a previous abort finish before reusing the socket
        self.socket.abort();
        let _ = self.socket.flush().await;

        self.socket
            .connect(self.endpoint)
            .await
            .map_err(MqttError::Connect)?;
        self.parser.reset();
        self.inbound.clear();

        let credentials = self.settings.credentials();
        let connect = Connect {
            client_id: self.settings.client_id.as_str(),
            keepalive_s: self.settings.keepalive_s,
            clean_session: true,
            username: credentials.map(|(user, _)| user),
            password: credentials
                .map(|(_, password)| password.as_bytes())
                .filter(|password| !password.is_empty()),
            will: Some(Will {
                topic: self.topics.status.as_str(),
                message: STATUS_DISCONNECTED.as_bytes(),
                retain: true,
            }),
        };
        let len = encode_connect(&connect, &mut self.scratch)?;
        self.send(len).await?;

        match with_timeout(CONNACK_TIMEOUT, self.wait_connack()).await {
            Ok(result) => result?,
            Err(_) => return Err(MqttError::Timeout),
        }

        let packet_id = self.packet_id();
        let len = encode_subscribe(packet_id, self.topics.command.as_str(), &mut self.scratch)?;
        self.send(len).await?;
        debug!("Subscribed to {}", self.topics.command.as_str());

        // Only an announced session counts as up
        let len = self.topics.encode_online(&mut self.scratch)?;
        self.send(len).await?;
        self.link.mark_connected(now_ms());
        Ok(())
    }

    async fn wait_connack(&mut self) -> Result<(), MqttError> {
        let mut chunk = [0u8; 8];
        loop {
            let n = self.socket.read(&mut chunk).await?;
            if n == 0 {
                return Err(MqttError::Closed);
            }
            for &byte in &chunk[..n] {
                match self.parser.feed(byte)? {
                    Some(Packet::ConnAck { code, .. }) if code.is_accepted() => return Ok(()),
                    Some(Packet::ConnAck { code, .. }) => return Err(MqttError::Rejected(code)),
                    Some(other) => debug!("Ignoring packet before CONNACK: {:?}", other),
                    None => {}
                }
            }
        }
    }

    /// Service the session and return at most one inbound message
    ///
    /// Sends a keepalive ping when one is due, then drains whatever bytes
    /// the socket already holds without waiting for more.
    pub async fn poll_incoming(&mut self) -> Result<Option<Publish>, MqttError> {
        let now = now_ms();
        if self.link.ping_due(now) {
            let len = encode_pingreq(&mut self.scratch)?;
            self.send(len).await?;
            self.link.ping_sent(now);
            trace!("PINGREQ sent");
        }

        if !self.socket.may_recv() {
            return Err(MqttError::Closed);
        }

        let mut chunk = [0u8; 64];
        while self.socket.can_recv() {
            let n = self.socket.read(&mut chunk).await?;
            if n == 0 {
                return Err(MqttError::Closed);
            }

            let mut offset = 0;
            while offset < n {
                let (result, used) = self.parser.feed_bytes(&chunk[offset..n]);
                offset += used;
                match result {
                    Ok(Some(packet)) => self.handle_packet(packet).await?,
                    Ok(None) => {}
                    Err(e) => warn!("Dropped inbound packet: {:?}", e),
                }
            }
        }

        Ok(self.inbound.pop())
    }

    async fn handle_packet(&mut self, packet: Packet) -> Result<(), MqttError> {
        match packet {
            Packet::Publish(publish) => {
                if let (QoS::AtLeastOnce, Some(id)) = (publish.qos, publish.packet_id) {
                    let len = encode_puback(id, &mut self.scratch)?;
                    self.send(len).await?;
                }
                match self.inbound.offer(publish) {
                    Admission::Queued => {}
                    Admission::DroppedOldest => warn!("Inbound queue full, dropped oldest command"),
                    Admission::WrongTopic => debug!("Message on unexpected topic ignored"),
                }
            }
            Packet::PingResp => trace!("PINGRESP"),
            Packet::SubAck { return_code, .. } if return_code & 0x80 != 0 => {
                warn!("Broker refused subscription to {}", self.topics.command.as_str())
            }
            other => trace!("Ignoring {:?}", other),
        }
        Ok(())
    }

    async fn send(&mut self, len: usize) -> Result<(), MqttError> {
        self.socket.write_all(&self.scratch[..len]).await?;
        self.socket.flush().await?;
        Ok(())
    }

    fn packet_id(&mut self) -> u16 {
        let id = self.next_packet_id;
        self.next_packet_id = self.next_packet_id.checked_add(1).unwrap_or(1);
        id
    }
}

impl StatePublisher for MqttClient<'_> {
    type Error = MqttError;

    fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// QoS 0 retained publish of the confirmed mode
    async fn publish_state(&mut self, label: &str) -> Result<(), MqttError> {
        let len = self.topics.encode_state(label, &mut self.scratch)?;
        self.send(len).await
    }

    /// Drop the session; the next `ensure_connected` reconnects
    fn mark_lost(&mut self) {
        self.link.mark_lost();
        self.socket.abort();
    }
}
