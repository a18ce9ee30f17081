//! Build script for co2-gadget-firmware
//!
//! - Passes the esp-hal and defmt linker scripts to the linker
//! - Validates gadget.toml and generates the link configuration constant

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use co2_gadget_protocol::MacAddress;

fn main() {
    setup_linker();
    let espnow = validate_config();
    generate_link_config(&espnow);
}

/// Linker scripts for esp-hal and defmt
fn setup_linker() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validated `[espnow]` section
struct EspNowSection {
    enabled: bool,
    board_id: i64,
    peer: [u8; 6],
    channel: i64,
    publish_interval_s: i64,
}

/// Validate gadget.toml at compile time
fn validate_config() -> EspNowSection {
    println!("cargo:rerun-if-changed=gadget.toml");

    let config_path = Path::new("gadget.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: gadget.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a gadget.toml configuration file.         ║\n\
            ║  Please create one in the co2-gadget-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read gadget.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in gadget.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let espnow = validate_espnow(&config);
    println!("cargo:warning=gadget.toml validated successfully");
    espnow
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fail the build with a list of problems
fn report(title: &str, errors: &[String]) -> ! {
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

/// Validate the `[espnow]` section
fn validate_espnow(config: &toml::Value) -> EspNowSection {
    let section = match config.get("espnow") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => report("Invalid ESP-NOW configuration", &["[espnow] must be a table".into()]),
        None => report(
            "Missing required sections in gadget.toml",
            &["Missing [espnow] section".into()],
        ),
    };

    let mut errors = Vec::new();

    let enabled = match section.get("enabled") {
        Some(toml::Value::Boolean(b)) => *b,
        Some(_) => {
            errors.push("[espnow] enabled must be true or false".to_string());
            false
        }
        None => {
            errors.push("[espnow] missing 'enabled'".to_string());
            false
        }
    };

    let board_id = integer(section, "board_id", &mut errors);
    if !(i32::MIN as i64..=i32::MAX as i64).contains(&board_id) {
        errors.push("[espnow] board_id must fit in 32 bits".to_string());
    }

    let peer = match section.get("peer_mac") {
        Some(toml::Value::String(s)) => match MacAddress::parse(s) {
            Some(mac) => mac.octets(),
            None => {
                errors.push(format!("[espnow] peer_mac '{}' is not aa:bb:cc:dd:ee:ff", s));
                [0; 6]
            }
        },
        Some(_) => {
            errors.push("[espnow] peer_mac must be a string".to_string());
            [0; 6]
        }
        None => {
            errors.push("[espnow] missing 'peer_mac'".to_string());
            [0; 6]
        }
    };

    let channel = integer(section, "channel", &mut errors);
    if !(1..=14).contains(&channel) {
        errors.push("[espnow] channel must be 1-14".to_string());
    }

    let publish_interval_s = integer(section, "publish_interval_s", &mut errors);
    if !(1..=u32::MAX as i64).contains(&publish_interval_s) {
        errors.push("[espnow] publish_interval_s must be at least 1".to_string());
    }

    if !errors.is_empty() {
        report("Invalid ESP-NOW configuration", &errors);
    }

    EspNowSection {
        enabled,
        board_id,
        peer,
        channel,
        publish_interval_s,
    }
}

/// Read a required integer field
fn integer(section: &toml::value::Table, field: &str, errors: &mut Vec<String>) -> i64 {
    match section.get(field) {
        Some(toml::Value::Integer(i)) => *i,
        Some(_) => {
            errors.push(format!("[espnow] {} must be an integer", field));
            0
        }
        None => {
            errors.push(format!("[espnow] missing '{}'", field));
            0
        }
    }
}

/// Write `LINK_CONFIG` into OUT_DIR
fn generate_link_config(espnow: &EspNowSection) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let dest_path = out_dir.join("link_config.rs");

    let peer = espnow
        .peer
        .iter()
        .map(|b| format!("0x{:02X}", b))
        .collect::<Vec<_>>()
        .join(", ");

    let code = format!(
        "/// ESP-NOW link configuration from gadget.toml\n\
        pub const LINK_CONFIG: LinkConfig = LinkConfig {{\n    \
            enabled: {enabled},\n    \
            board_id: {board_id},\n    \
            peer: MacAddress::new([{peer}]),\n    \
            channel: {channel},\n    \
            publish_interval_s: {interval},\n\
        }};\n",
        enabled = espnow.enabled,
        board_id = espnow.board_id,
        peer = peer,
        channel = espnow.channel,
        interval = espnow.publish_interval_s,
    );

    if let Err(e) = fs::write(&dest_path, code) {
        panic!("failed to write {}: {}", dest_path.display(), e);
    }
}
