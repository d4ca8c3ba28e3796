//! Inbound mode commands waiting for the control loop
//!
//! The broker can deliver several messages in one socket read. They are
//! held here and handed out one per loop pass so button handling is never
//! starved. When the queue is full the oldest command is dropped.

use heapless::Deque;
use lightning_protocol::Publish;

use super::Topic;

/// Commands held between polls
pub const INBOUND_QUEUE_LEN: usize = 4;

/// What happened to an offered message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Admission {
    /// Queued behind any pending commands
    Queued,
    /// Queued after dropping the oldest pending command
    DroppedOldest,
    /// Not on the command topic; discarded
    WrongTopic,
}

/// Bounded FIFO of commands for one topic
#[derive(Debug, Clone)]
pub struct InboundQueue {
    command: Topic,
    pending: Deque<Publish, INBOUND_QUEUE_LEN>,
}

impl InboundQueue {
    /// Accept messages published on `command` only
    pub fn new(command: Topic) -> Self {
        Self {
            command,
            pending: Deque::new(),
        }
    }

    pub fn offer(&mut self, message: Publish) -> Admission {
        if message.topic != self.command {
            return Admission::WrongTopic;
        }

        let admission = if self.pending.is_full() {
            self.pending.pop_front();
            Admission::DroppedOldest
        } else {
            Admission::Queued
        };
        // Room was made above
        let _ = self.pending.push_back(message);
        admission
    }

    /// Oldest pending command, if any
    pub fn pop(&mut self) -> Option<Publish> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Forget pending commands; used when a session is replaced
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
