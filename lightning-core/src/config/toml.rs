//! Simple TOML parser for device configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! device.toml. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Single-line string arrays: modes = ["RED", "BLUE"]
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Escape sequences in strings
//! - Multi-line strings and arrays
//! - Inline tables and dotted keys
//!
//! Unknown keys are ignored so older firmware accepts newer files.

use heapless::{String, Vec};
use lightning_hal::uart::StopBits;

use super::types::DeviceConfig;
use crate::input::ButtonAction;
use crate::menu::Label;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Line is neither a section, a comment, nor key = value
    InvalidLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// String longer than its field allows
    ValueTooLong,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Wifi,
    Mqtt,
    Menu,
    Buttons,
    Serial,
    Display,
}

/// Parse device.toml into a DeviceConfig
///
/// Keys that are absent keep their default values.
pub fn parse_config(input: &str) -> Result<DeviceConfig, ParseError> {
    let mut config = DeviceConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

/// Copy `value` into a bounded string field
pub fn fill<const N: usize>(target: &mut String<N>, value: &str) -> Result<(), ParseError> {
    let mut out = String::new();
    out.push_str(value).map_err(|_| ParseError::ValueTooLong)?;
    *target = out;
    Ok(())
}

/// Parse a dotted-quad IPv4 address
pub fn parse_ipv4(value: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = value.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

/// Parse a section header line such as "[mqtt]"
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let line = strip_comment(line);
    let name = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?
        .trim();

    match name {
        "wifi" => Ok(Section::Wifi),
        "mqtt" => Ok(Section::Mqtt),
        "menu" => Ok(Section::Menu),
        "buttons" => Ok(Section::Buttons),
        "serial" => Ok(Section::Serial),
        "display" => Ok(Section::Display),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut DeviceConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Wifi => {
            let wifi = &mut config.wifi;
            match key {
                "ssid" => fill(&mut wifi.ssid, parse_string(value)?)?,
                "password" => fill(&mut wifi.password, parse_string(value)?)?,
                "join_retry_ms" => wifi.join_retry_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Mqtt => {
            let broker = &mut config.broker;
            match key {
                "host" => {
                    broker.host =
                        parse_ipv4(parse_string(value)?).ok_or(ParseError::InvalidValue)?
                }
                "port" => broker.port = parse_int(value)?,
                "user" => fill(&mut broker.user, parse_string(value)?)?,
                "password" => fill(&mut broker.password, parse_string(value)?)?,
                "client_id" => fill(&mut broker.client_id, parse_string(value)?)?,
                "device" => fill(&mut broker.device, parse_string(value)?)?,
                "keepalive_s" => broker.keepalive_s = parse_int(value)?,
                "ping_interval_s" => broker.ping_interval_s = parse_int(value)?,
                "retry_backoff_ms" => broker.retry_backoff_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Menu => match key {
            "modes" => config.menu.modes = parse_label_array(value)?,
            "flash_ms" => config.menu.flash_ms = parse_int(value)?,
            _ => {}
        },
        Section::Buttons => {
            let buttons = &mut config.buttons;
            match key {
                "a" => buttons.map.a = parse_action(value)?,
                "b" => buttons.map.b = parse_action(value)?,
                "x" => buttons.map.x = parse_action(value)?,
                "y" => buttons.map.y = parse_action(value)?,
                "active_low" => buttons.active_low = parse_bool(value)?,
                "hold_ms" => buttons.timing.hold_ms = parse_int(value)?,
                "repeat_ms" => buttons.timing.repeat_ms = parse_int(value)?,
                _ => {}
            }
        }
        Section::Serial => match key {
            "baudrate" => config.serial.baudrate = parse_int(value)?,
            "stop_bits" => {
                config.serial.stop_bits =
                    StopBits::from_count(parse_int(value)?).ok_or(ParseError::InvalidValue)?
            }
            _ => {}
        },
        Section::Display => match key {
            "backlight" => {
                let percent: u8 = parse_int(value)?;
                if percent > 100 {
                    return Err(ParseError::InvalidValue);
                }
                config.display.backlight_percent = percent;
            }
            _ => {}
        },
    }
    Ok(())
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(text: &str) -> &str {
    let mut in_string = false;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return text[..i].trim_end(),
            _ => {}
        }
    }
    text
}

/// Parse a key = value pair
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a quoted string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|inner| !inner.contains('"'))
        .ok_or(ParseError::InvalidValue)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a button binding: "prev", "next", "confirm" or "none"
fn parse_action(value: &str) -> Result<Option<ButtonAction>, ParseError> {
    match parse_string(value)? {
        "prev" => Ok(Some(ButtonAction::Prev)),
        "next" => Ok(Some(ButtonAction::Next)),
        "confirm" => Ok(Some(ButtonAction::Confirm)),
        "none" => Ok(None),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a single-line array of quoted labels
fn parse_label_array<const N: usize>(value: &str) -> Result<Vec<Label, N>, ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut labels = Vec::new();
    if inner.trim().is_empty() {
        return Ok(labels);
    }

    let mut items = inner.split(',').map(str::trim).peekable();
    while let Some(item) = items.next() {
        if item.is_empty() {
            // Trailing comma is allowed; anything else empty is not
            if items.peek().is_none() && !labels.is_empty() {
                break;
            }
            return Err(ParseError::InvalidValue);
        }
        let mut label = Label::new();
        fill(&mut label, parse_string(item)?)?;
        labels.push(label).map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(labels)
}
