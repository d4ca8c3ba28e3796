//! Board-agnostic core logic for the Lightning mode selector
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Mode table (ordered labels with a label lookup)
//! - Menu state machine reconciling buttons and remote commands
//! - Effects emitted by the menu (render, serial, publish)
//! - Button panel with priority order and hold-to-repeat
//! - Connection and keepalive policy, topics and the inbound command queue
//! - Configuration types and the device.toml parser
//! - Render surface, transport sink and state publisher traits
//! - The executor that carries out effect batches against those traits

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod executor;
pub mod input;
pub mod link;
pub mod menu;
pub mod traits;
