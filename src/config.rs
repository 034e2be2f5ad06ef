//! Application-wide constants and the runtime device configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

use core::fmt::Write;

use heapless::String;

use crate::error::ConfigError;

// Input

/// Minimum interval between two accepted presses of the same button (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 200;

/// Select held this long finalizes the text-entry dialog (ms).
pub const SELECT_HOLD_MS: u64 = 1_000;

/// Sleep between two input samples while a loop is idle (ms).
pub const INPUT_POLL_MS: u64 = 5;

// Display (SSD1306 128x32)

/// Characters that fit on one display row.
pub const DISPLAY_COLUMNS: usize = 16;

/// Text rows available on the display.
pub const DISPLAY_ROWS: usize = 3;

/// Vertical distance between two text rows (px).
pub const ROW_PITCH: i32 = 10;

// Text capacities

/// Client ids, user names and option labels.
pub const NAME_LEN: usize = 32;

/// Message bodies, questions and composed text.
pub const TEXT_LEN: usize = 64;

/// Maximum number of options a remote question may carry.
pub const MAX_OPTIONS: usize = 8;

/// Stored contacts offered as recipients.
pub const MAX_CONTACTS: usize = 16;

/// Stored canned messages offered by the Send action.
pub const MAX_CANNED_MESSAGES: usize = 16;

/// Persisted configuration values.
pub const CONFIG_VALUE_LEN: usize = 32;

/// Serialized outbound payloads and inbound envelope bodies.
pub const PAYLOAD_LEN: usize = 256;

// Messaging

/// Unread messages kept in memory before the oldest is evicted.
pub const UNREAD_CAPACITY: usize = 16;

/// Client id that addresses every device.
pub const BROADCAST_ID: &str = "all";

/// Prefix of the hardware-derived client id.
pub const CLIENT_ID_PREFIX: &str = "mothership_";

// Heartbeat

/// Heartbeat frequency after boot (Hz).
pub const DEFAULT_HEARTBEAT_HZ: u8 = 1;

/// Accepted range for `hzMulti` reconfiguration.
pub const MIN_HEARTBEAT_HZ: u8 = 1;
pub const MAX_HEARTBEAT_HZ: u8 = 4;

// Co-processor link

/// Longest frame exchanged with the co-processor, newline included.
pub const FRAME_LEN: usize = 320;

/// How long `connect` waits for the co-processor to report `UP` (ms).
pub const LINK_CONNECT_TIMEOUT_MS: u64 = 5_000;

// GPIO pin assignments (nRF52840-DK defaults)
//
//   Button LEFT    → P0.11
//   Button RIGHT   → P0.12
//   Button SELECT  → P0.24
//   Encoder CLK    → P0.03
//   Encoder DT     → P0.04
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   UART TX (link) → P0.06, 115200 8N1
//   UART RX (link) → P0.08

// Config storage

/// Flash page index where configuration storage starts (4 KB per page).
pub const STORAGE_FLASH_PAGE_START: u32 = 252;

/// Number of flash pages reserved for configuration storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;

/// A persisted configuration value.
pub type ConfigValue = String<CONFIG_VALUE_LEN>;

/// Names the five persisted settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigField {
    Username,
    Ssid,
    Password,
    MqttServer,
    MqttPass,
}

impl ConfigField {
    pub const ALL: [ConfigField; 5] = [
        ConfigField::Username,
        ConfigField::Ssid,
        ConfigField::Password,
        ConfigField::MqttServer,
        ConfigField::MqttPass,
    ];

    /// Key used in the `key=value` persisted form.
    pub fn key(self) -> &'static str {
        match self {
            ConfigField::Username => "username",
            ConfigField::Ssid => "ssid",
            ConfigField::Password => "password",
            ConfigField::MqttServer => "mqtt_server",
            ConfigField::MqttPass => "mqtt_pass",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// Runtime configuration read from flash at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    pub username: ConfigValue,
    pub ssid: ConfigValue,
    pub password: ConfigValue,
    pub mqtt_server: ConfigValue,
    pub mqtt_pass: ConfigValue,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            username: literal("X AE A-12"),
            ssid: literal("ssid"),
            password: literal("pass"),
            mqtt_server: literal("mothership.local"),
            mqtt_pass: literal("pass"),
        }
    }
}

impl DeviceConfig {
    /// Parse `key=value` lines.
    ///
    /// Keys that are absent keep their default value; unknown keys are
    /// skipped. A line without `=` or a value longer than
    /// [`CONFIG_VALUE_LEN`] rejects the whole text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or(ConfigError::MalformedLine(line_no))?;
            let Some(field) = ConfigField::from_key(key.trim()) else {
                debug!("config: ignoring unknown key on line {}", line_no);
                continue;
            };
            let slot = config.field_mut(field);
            slot.clear();
            slot.push_str(value.trim())
                .map_err(|_| ConfigError::ValueTooLong(line_no))?;
        }
        Ok(config)
    }

    /// Parse persisted text, substituting the built-in defaults when it is
    /// missing or unreadable.
    pub fn load_or_default(text: Option<&str>) -> Self {
        match text.map(Self::parse) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                warn!("config: {}, using defaults", e);
                Self::default()
            }
            None => {
                info!("config: nothing stored, using defaults");
                Self::default()
            }
        }
    }

    pub fn field(&self, field: ConfigField) -> &str {
        match field {
            ConfigField::Username => self.username.as_str(),
            ConfigField::Ssid => self.ssid.as_str(),
            ConfigField::Password => self.password.as_str(),
            ConfigField::MqttServer => self.mqtt_server.as_str(),
            ConfigField::MqttPass => self.mqtt_pass.as_str(),
        }
    }

    pub fn field_mut(&mut self, field: ConfigField) -> &mut ConfigValue {
        match field {
            ConfigField::Username => &mut self.username,
            ConfigField::Ssid => &mut self.ssid,
            ConfigField::Password => &mut self.password,
            ConfigField::MqttServer => &mut self.mqtt_server,
            ConfigField::MqttPass => &mut self.mqtt_pass,
        }
    }

    /// Write the persisted `key=value` form, one setting per line.
    pub fn write_to<W: Write>(&self, out: &mut W) -> core::fmt::Result {
        for field in ConfigField::ALL {
            writeln!(out, "{}={}", field.key(), self.field(field))?;
        }
        Ok(())
    }
}

fn literal(value: &str) -> ConfigValue {
    let mut out = ConfigValue::new();
    let _ = out.push_str(value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_overrides_present_keys() {
        let config = DeviceConfig::parse("username = Ada\nssid=HomeNet\n").unwrap();
        assert_eq!(config.username.as_str(), "Ada");
        assert_eq!(config.ssid.as_str(), "HomeNet");
        // Absent keys keep their defaults.
        assert_eq!(config.mqtt_server.as_str(), "mothership.local");
    }

    #[test]
    fn parse_keeps_equals_signs_in_values() {
        let config = DeviceConfig::parse("password=a=b\n").unwrap();
        assert_eq!(config.password.as_str(), "a=b");
    }

    #[test]
    fn parse_skips_blank_lines_and_unknown_keys() {
        let config = DeviceConfig::parse("\nbrightness=3\n\nmqtt_pass=secret\n").unwrap();
        assert_eq!(config.mqtt_pass.as_str(), "secret");
    }

    #[test]
    fn parse_rejects_line_without_separator() {
        assert_eq!(
            DeviceConfig::parse("username=Ada\nbroken line\n"),
            Err(ConfigError::MalformedLine(2))
        );
    }

    #[test]
    fn parse_rejects_over_long_value() {
        let text = "ssid=0123456789012345678901234567890123456789";
        assert_eq!(DeviceConfig::parse(text), Err(ConfigError::ValueTooLong(1)));
    }

    #[test]
    fn load_falls_back_to_defaults() {
        assert_eq!(DeviceConfig::load_or_default(None), DeviceConfig::default());
        assert_eq!(
            DeviceConfig::load_or_default(Some("garbage")),
            DeviceConfig::default()
        );
    }

    #[test]
    fn written_form_parses_back() {
        let mut config = DeviceConfig::default();
        config.username = literal("Bob");
        config.mqtt_server = literal("10.0.0.2");

        let mut out: String<256> = String::new();
        config.write_to(&mut out).unwrap();
        assert!(out.starts_with("username=Bob\n"));
        assert_eq!(DeviceConfig::parse(&out).unwrap(), config);
    }
}
