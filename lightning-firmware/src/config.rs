//! Configuration loading
//!
//! device.toml is embedded at build time. Secrets and the broker address can
//! be overridden through environment variables when building, so they never
//! need to live in the checked-in file.

use defmt::*;
use heapless::String;

use lightning_core::config::{fill, parse_config, parse_ipv4, DeviceConfig};

/// Embedded device configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../device.toml");

/// Load the embedded configuration and apply build-time overrides
///
/// Falls back to built-in defaults if the embedded file fails to parse.
pub fn load() -> DeviceConfig {
    let mut config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // build.rs validates device.toml, so this only trips on parser gaps
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            DeviceConfig::default()
        }
    };

    apply_overrides(&mut config);
    config
}

fn apply_overrides(config: &mut DeviceConfig) {
    override_string(
        "LIGHTNING_WIFI_SSID",
        option_env!("LIGHTNING_WIFI_SSID"),
        &mut config.wifi.ssid,
    );
    override_string(
        "LIGHTNING_WIFI_PASSWORD",
        option_env!("LIGHTNING_WIFI_PASSWORD"),
        &mut config.wifi.password,
    );
    override_string(
        "LIGHTNING_MQTT_USER",
        option_env!("LIGHTNING_MQTT_USER"),
        &mut config.broker.user,
    );
    override_string(
        "LIGHTNING_MQTT_PASSWORD",
        option_env!("LIGHTNING_MQTT_PASSWORD"),
        &mut config.broker.password,
    );

    if let Some(host) = option_env!("LIGHTNING_MQTT_HOST") {
        match parse_ipv4(host) {
            Some(address) => config.broker.host = address,
            None => warn!("LIGHTNING_MQTT_HOST is not an IPv4 address, ignored"),
        }
    }
}

fn override_string<const N: usize>(name: &str, value: Option<&str>, target: &mut String<N>) {
    let Some(value) = value else {
        return;
    };
    if fill(target, value).is_err() {
        warn!("{} longer than {} bytes, ignored", name, N);
    } else {
        debug!("{} applied", name);
    }
}
