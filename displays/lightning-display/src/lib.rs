//! Stripe-list renderer for the Lightning mode selector
//!
//! This crate provides:
//! - `StripeLayout`: one full-width horizontal stripe per mode
//! - `Palette`: colours for the normal, selected, and flash styles
//! - `StripeSurface`: a `RenderSurface` over any RGB565 `DrawTarget`
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ effects ┌───────────────┐ pixels ┌──────────────┐
//! │ lightning-   │────────►│ StripeSurface │───────►│ DrawTarget   │
//! │ core Menu    │         │ (layout +     │        │ (ST7789 via  │
//! └──────────────┘         │  palette)     │        │  mipidsi)    │
//!                          └───────────────┘        └──────────────┘
//! ```
//!
//! The surface holds no menu state; every call receives the option list.

#![no_std]
#![deny(unsafe_code)]

pub mod layout;
pub mod palette;
pub mod surface;

pub use layout::{StripeLayout, TEXT_INSET};
pub use palette::Palette;
pub use surface::StripeSurface;
