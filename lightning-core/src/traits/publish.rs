//! State publisher trait for the message bus

use core::future::Future;

/// Destination for the retained current-mode state
///
/// Publishing is best effort. While the session is down nothing is sent
/// and nothing is queued for later.
pub trait StatePublisher {
    type Error;

    /// Whether a broker session is currently up
    fn is_connected(&self) -> bool;

    /// Publish `label` as the retained state
    fn publish_state(&mut self, label: &str) -> impl Future<Output = Result<(), Self::Error>>;

    /// Drop the session after a failed operation; the control loop reconnects
    fn mark_lost(&mut self);
}
