//! Build script for lightning-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates device.toml at compile time
//! - Checks that the CYW43 radio firmware blobs are available

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Radio firmware blobs expected in `CYW43_FW_DIR`
const RADIO_BLOBS: [&str; 2] = ["43439A0.bin", "43439A0_clm.bin"];

const MAX_MODES: usize = 16;
const MAX_LABEL_LEN: usize = 16;

fn main() {
    setup_linker();
    validate_config();
    check_radio_firmware();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Print a boxed build error and abort
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Validate device.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=device.toml");

    let config_path = Path::new("device.toml");
    if !config_path.exists() {
        fail(
            "device.toml not found!",
            &["Create device.toml in the lightning-firmware directory".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read device.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in device.toml",
            &e.to_string()
                .lines()
                .map(|line| line.chars().take(62).collect())
                .collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_menu(&config, &mut errors);
    validate_buttons(&config, &mut errors);
    validate_mqtt(&config, &mut errors);
    validate_serial(&config, &mut errors);
    validate_display(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid configuration in device.toml", &errors);
    }

    println!("cargo:warning=device.toml validated successfully");
}

/// Validate the mode list
fn validate_menu(config: &toml::Value, errors: &mut Vec<String>) {
    let modes = match config.get("menu").and_then(|m| m.get("modes")) {
        Some(toml::Value::Array(modes)) => modes,
        Some(_) => {
            errors.push("[menu] modes must be an array of strings".to_string());
            return;
        }
        None => return,
    };

    if modes.is_empty() {
        errors.push("[menu] modes cannot be empty".to_string());
    }
    if modes.len() > MAX_MODES {
        errors.push(format!("[menu] at most {} modes are supported", MAX_MODES));
    }

    let mut seen = HashSet::new();
    for mode in modes {
        match mode.as_str() {
            Some("") => errors.push("[menu] mode labels cannot be empty".to_string()),
            Some(label) if label.len() > MAX_LABEL_LEN => errors.push(format!(
                "[menu] '{}' exceeds {} bytes",
                label, MAX_LABEL_LEN
            )),
            Some(label) if !seen.insert(label) => {
                errors.push(format!("[menu] duplicate mode '{}'", label))
            }
            Some(_) => {}
            None => errors.push("[menu] modes must be strings".to_string()),
        }
    }
}

/// Validate button bindings
fn validate_buttons(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(buttons) = config.get("buttons") else {
        return;
    };

    for key in ["a", "b", "x", "y"] {
        if let Some(value) = buttons.get(key) {
            let valid = value
                .as_str()
                .is_some_and(|v| ["prev", "next", "confirm", "none"].contains(&v));
            if !valid {
                errors.push(format!(
                    "[buttons] {} must be 'prev', 'next', 'confirm' or 'none'",
                    key
                ));
            }
        }
    }
}

/// Validate the broker address unless it is supplied at build time
fn validate_mqtt(config: &toml::Value, errors: &mut Vec<String>) {
    println!("cargo:rerun-if-env-changed=LIGHTNING_MQTT_HOST");
    if env::var_os("LIGHTNING_MQTT_HOST").is_some() {
        return;
    }

    if let Some(host) = config.get("mqtt").and_then(|m| m.get("host")) {
        let valid = host
            .as_str()
            .is_some_and(|h| h.parse::<std::net::Ipv4Addr>().is_ok());
        if !valid {
            errors.push("[mqtt] host must be an IPv4 address".to_string());
        }
    }
}

/// Validate serial link settings
fn validate_serial(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(stop_bits) = config.get("serial").and_then(|s| s.get("stop_bits")) {
        if !matches!(stop_bits.as_integer(), Some(1) | Some(2)) {
            errors.push("[serial] stop_bits must be 1 or 2".to_string());
        }
    }
}

/// Validate display settings
fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(backlight) = config.get("display").and_then(|d| d.get("backlight")) {
        if !matches!(backlight.as_integer(), Some(0..=100)) {
            errors.push("[display] backlight must be 0-100".to_string());
        }
    }
}

/// Check that the radio firmware directory holds the CYW43 blobs
fn check_radio_firmware() {
    println!("cargo:rerun-if-env-changed=CYW43_FW_DIR");

    let dir = match env::var("CYW43_FW_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => fail(
            "CYW43_FW_DIR is not set",
            &[
                "Point CYW43_FW_DIR at a directory containing".to_string(),
                "43439A0.bin and 43439A0_clm.bin from the embassy repo".to_string(),
            ],
        ),
    };

    let missing: Vec<String> = RADIO_BLOBS
        .iter()
        .filter(|blob| !dir.join(blob).exists())
        .map(|blob| format!("{} not found in CYW43_FW_DIR", blob))
        .collect();
    if !missing.is_empty() {
        fail("Radio firmware missing", &missing);
    }

    for blob in RADIO_BLOBS {
        println!("cargo:rerun-if-changed={}", dir.join(blob).display());
    }
}
