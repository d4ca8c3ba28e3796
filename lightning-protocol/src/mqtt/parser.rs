//! Streaming packet parser
//!
//! Fed one byte at a time from the TCP socket; yields complete packets.

use heapless::Vec;

use super::{decode_packet, Packet, PacketError, MAX_PACKET_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the type/flags byte
    WaitingForHeader,
    /// Reading remaining length bytes
    ReadingLength,
    /// Reading body bytes into the buffer
    ReadingBody,
    /// Discarding the body of an oversized packet
    Skipping,
}

/// State machine for parsing inbound packets
#[derive(Debug, Clone)]
pub struct PacketParser {
    state: ParseState,
    header: u8,
    length: usize,
    multiplier: usize,
    length_bytes: u8,
    buffer: Vec<u8, MAX_PACKET_SIZE>,
}

impl Default for PacketParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketParser {
    /// Create a new packet parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForHeader,
            header: 0,
            length: 0,
            multiplier: 1,
            length_bytes: 0,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state
    ///
    /// Call after the underlying connection is re-established.
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader;
        self.header = 0;
        self.length = 0;
        self.multiplier = 1;
        self.length_bytes = 0;
        self.buffer.clear();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(packet))` when a complete packet is decoded,
    /// `Ok(None)` when more bytes are needed, or `Err` on a decode error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Packet>, PacketError> {
        match self.state {
            ParseState::WaitingForHeader => {
                self.header = byte;
                self.length = 0;
                self.multiplier = 1;
                self.length_bytes = 0;
                self.buffer.clear();
                self.state = ParseState::ReadingLength;
                Ok(None)
            }
            ParseState::ReadingLength => {
                self.length += (byte & 0x7F) as usize * self.multiplier;
                self.multiplier *= 128;
                self.length_bytes += 1;

                if byte & 0x80 != 0 {
                    if self.length_bytes >= 4 {
                        self.reset();
                        return Err(PacketError::InvalidLength);
                    }
                    return Ok(None);
                }

                if self.length == 0 {
                    return self.complete();
                }
                self.state = if self.length > MAX_PACKET_SIZE {
                    ParseState::Skipping
                } else {
                    ParseState::ReadingBody
                };
                Ok(None)
            }
            ParseState::ReadingBody => {
                // Capacity was checked against the declared length
                let _ = self.buffer.push(byte);
                if self.buffer.len() == self.length {
                    return self.complete();
                }
                Ok(None)
            }
            ParseState::Skipping => {
                self.length -= 1;
                if self.length == 0 {
                    self.reset();
                    return Err(PacketError::PacketTooLarge);
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete packet and the number of bytes consumed.
    /// Remaining bytes after a complete packet are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (Result<Option<Packet>, PacketError>, usize) {
        for (i, &byte) in bytes.iter().enumerate() {
            match self.feed(byte) {
                Ok(None) => {}
                other => return (other, i + 1),
            }
        }
        (Ok(None), bytes.len())
    }

    fn complete(&mut self) -> Result<Option<Packet>, PacketError> {
        let result = decode_packet(self.header, &self.buffer).map(Some);
        self.reset();
        result
    }
}
