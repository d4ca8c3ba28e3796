//! Lightning Hardware Abstraction Layer
//!
//! Hardware abstraction traits implemented by chip-specific HALs. The core
//! crate only talks to buttons and the serial link through these traits,
//! so the menu logic can be tested on the host with fake pins and sinks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lightning-core / lightning-firmware    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lightning-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌────────────────┐
//!             │ lightning-hal- │
//!             │     rp2040     │
//!             └────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Digital input (buttons)
//! - [`uart::UartTx`] - Serial transmit (peer device link)

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::InputPin;
pub use uart::{DataBits, Parity, StopBits, UartConfig, UartTx};
