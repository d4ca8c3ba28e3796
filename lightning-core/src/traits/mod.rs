//! Output abstractions
//!
//! These traits define the interface between the menu and the devices it
//! drives: the display, the serial peer and the message bus.

pub mod publish;
pub mod render;
pub mod transport;

pub use publish::StatePublisher;
pub use render::{apply_render, RenderSurface};
pub use transport::{SerialSink, TransportError, TransportSink};
