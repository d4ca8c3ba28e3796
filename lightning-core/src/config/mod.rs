//! Configuration types
//!
//! Board-agnostic configuration structures and the device.toml parser.

pub mod toml;
pub mod types;

pub use toml::{fill, parse_config, parse_ipv4, ParseError};
pub use types::*;
