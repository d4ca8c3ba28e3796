//! RP2040-specific HAL for the Lightning firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `lightning-hal` traits:
//!
//! - Button inputs backed by `embassy_rp::gpio::Input`
//! - Blocking UART transmitter for the peer device link
//! - UART pin mapping and configuration conversion

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::Button;
pub use uart::{gpio_to_uart, to_embassy_config, SerialTx, UartId};
