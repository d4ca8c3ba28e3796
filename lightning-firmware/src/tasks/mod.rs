//! Embassy async tasks
//!
//! The selector owns all menu state; the radio and network tasks only keep
//! the link alive underneath it.

pub mod net;
pub mod selector;

pub use net::{cyw43_task, join, net_task};
pub use selector::{selector_task, Selector};
