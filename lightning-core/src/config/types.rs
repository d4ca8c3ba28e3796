//! Configuration type definitions
//!
//! These types represent the device configuration. It is embedded in the
//! firmware image as TOML and parsed once at boot.

use heapless::{String, Vec};
use lightning_hal::uart::{StopBits, UartConfig};

use crate::input::{ButtonMap, RepeatTiming};
use crate::link::LinkPolicy;
use crate::menu::{Label, DEFAULT_FLASH_MS, DEFAULT_MODES, MAX_MODES};

/// Maximum SSID length (IEEE 802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum secret length (WPA2 passphrase, broker password)
pub const MAX_SECRET_LEN: usize = 64;

/// Maximum user, client and device name length
pub const MAX_NAME_LEN: usize = 32;

/// Wireless network settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WifiConfig {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_SECRET_LEN>,
    /// Delay between join attempts
    pub join_retry_ms: u32,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            join_retry_ms: 1000,
        }
    }
}

/// Message broker settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BrokerConfig {
    /// IPv4 address of the broker
    pub host: [u8; 4],
    pub port: u16,
    /// Empty for anonymous sessions
    pub user: String<MAX_NAME_LEN>,
    pub password: String<MAX_SECRET_LEN>,
    pub client_id: String<MAX_NAME_LEN>,
    /// Device name used in topic names
    pub device: String<MAX_NAME_LEN>,
    /// Keepalive announced to the broker
    pub keepalive_s: u16,
    /// Interval between client pings
    pub ping_interval_s: u32,
    /// Delay between failed connection attempts
    pub retry_backoff_ms: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        let mut client_id = String::new();
        let _ = client_id.push_str("lightning_pico_w");
        let mut device = String::new();
        let _ = device.push_str("lightning_cloud");

        Self {
            host: [0, 0, 0, 0],
            port: 1883,
            user: String::new(),
            password: String::new(),
            client_id,
            device,
            keepalive_s: 3600,
            ping_interval_s: 60,
            retry_backoff_ms: 500,
        }
    }
}

impl BrokerConfig {
    /// Connection timing derived from this config
    pub fn link_policy(&self) -> LinkPolicy {
        LinkPolicy {
            ping_interval_ms: self.ping_interval_s as u64 * 1000,
            retry_backoff_ms: self.retry_backoff_ms as u64,
        }
    }

    /// Credentials, if a user name is set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        (!self.user.is_empty()).then(|| (self.user.as_str(), self.password.as_str()))
    }
}

/// Menu settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuConfig {
    /// Mode labels in display order
    pub modes: Vec<Label, MAX_MODES>,
    /// Duration of the confirmation flash
    pub flash_ms: u32,
}

impl Default for MenuConfig {
    fn default() -> Self {
        let mut modes = Vec::new();
        for text in DEFAULT_MODES {
            if let Ok(label) = Label::try_from(text) {
                let _ = modes.push(label);
            }
        }
        Self {
            modes,
            flash_ms: DEFAULT_FLASH_MS,
        }
    }
}

impl MenuConfig {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(|label| label.as_str())
    }
}

/// Button panel settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    pub map: ButtonMap,
    pub active_low: bool,
    pub timing: RepeatTiming,
}

impl ButtonConfig {
    /// Shipped wiring: buttons pull to ground
    pub fn reference() -> Self {
        Self {
            active_low: true,
            ..Self::default()
        }
    }
}

/// Serial peer link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    pub baudrate: u32,
    pub stop_bits: StopBits,
}

impl Default for SerialConfig {
    fn default() -> Self {
        let uart = UartConfig::default();
        Self {
            baudrate: uart.baudrate,
            stop_bits: uart.stop_bits,
        }
    }
}

impl SerialConfig {
    pub fn uart_config(&self) -> UartConfig {
        UartConfig {
            baudrate: self.baudrate,
            stop_bits: self.stop_bits,
            ..UartConfig::default()
        }
    }
}

/// Display settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Backlight level, 0 to 100
    pub backlight_percent: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            backlight_percent: 50,
        }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub wifi: WifiConfig,
    pub broker: BrokerConfig,
    pub menu: MenuConfig,
    pub buttons: ButtonConfig,
    pub serial: SerialConfig,
    pub display: DisplayConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            wifi: WifiConfig::default(),
            broker: BrokerConfig::default(),
            menu: MenuConfig::default(),
            buttons: ButtonConfig::reference(),
            serial: SerialConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}
