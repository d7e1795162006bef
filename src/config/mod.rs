//! Connection configuration.
//!
//! A [`Config`] bundles everything the connectivity supervisor needs to bring a
//! device online: the Wi-Fi credentials, the broker endpoint, the MQTT client
//! identifier, and the base topic that prefixes every published value.
//!
//! The configuration is validated once when it is built and is read-only
//! afterwards. All strings are stored inline in `heapless` buffers, so a
//! `Config` can be moved into a background task without borrowing from the
//! caller.
//!
//! # Examples
//!
//! ```rust
//! use mqtt_helper::config::Config;
//!
//! let config = Config::new(
//!     "greenhouse",
//!     "hunter2hunter2",
//!     "broker.hivemq.com",
//!     1883,
//!     "sensor-node-7",
//!     "greenhouse/bench-1",
//! )
//! .unwrap();
//!
//! assert_eq!(config.broker_port(), 1883);
//! assert_eq!(config.base_topic(), "greenhouse/bench-1");
//! ```
//!
//! Provisioning data can also be loaded from a JSON document:
//!
//! ```rust
//! use mqtt_helper::config::Config;
//!
//! let json = br#"{
//!     "ssid": "greenhouse",
//!     "password": "hunter2hunter2",
//!     "broker_host": "192.168.1.10",
//!     "client_id": "sensor-node-7",
//!     "base_topic": "greenhouse"
//! }"#;
//!
//! let config = Config::from_json(json).unwrap();
//! assert_eq!(config.broker_port(), mqtt_helper::config::DEFAULT_BROKER_PORT);
//! ```

use heapless::String;
use serde::Deserialize;

/// Configuration error types
pub mod error;

pub use error::ConfigError;

/// Maximum length of an 802.11 SSID in bytes.
pub const MAX_SSID_LEN: usize = 32;
/// Maximum length of a WPA passphrase in bytes.
pub const MAX_PASSWORD_LEN: usize = 64;
/// Maximum length of the broker host name or address.
pub const MAX_HOST_LEN: usize = 128;
/// Maximum length of the MQTT client identifier.
pub const MAX_CLIENT_ID_LEN: usize = 64;
/// Maximum length of the base topic.
pub const MAX_BASE_TOPIC_LEN: usize = 64;
/// The IANA-registered port for unencrypted MQTT.
pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// Validated, immutable connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    ssid: String<MAX_SSID_LEN>,
    password: String<MAX_PASSWORD_LEN>,
    broker_host: String<MAX_HOST_LEN>,
    broker_port: u16,
    client_id: String<MAX_CLIENT_ID_LEN>,
    base_topic: String<MAX_BASE_TOPIC_LEN>,
}

/// The on-the-wire shape of a JSON configuration document.
#[derive(Debug, Deserialize)]
struct ConfigDocument<'a> {
    #[serde(borrow)]
    ssid: &'a str,
    #[serde(borrow, default)]
    password: &'a str,
    #[serde(borrow)]
    broker_host: &'a str,
    #[serde(default = "default_broker_port")]
    broker_port: u16,
    #[serde(borrow)]
    client_id: &'a str,
    #[serde(borrow, default)]
    base_topic: &'a str,
}

fn default_broker_port() -> u16 {
    DEFAULT_BROKER_PORT
}

impl Config {
    /// Build a configuration, validating every field.
    ///
    /// # Arguments
    ///
    /// * `ssid` - Wi-Fi network name (1-32 bytes)
    /// * `password` - Wi-Fi passphrase (empty for open networks)
    /// * `broker_host` - MQTT broker host name or address (e.g. `"broker.hivemq.com"`)
    /// * `broker_port` - MQTT broker port (e.g. `1883`)
    /// * `client_id` - unique MQTT client identifier, must not contain whitespace
    /// * `base_topic` - prefix for every published topic, must not contain
    ///   whitespace or the `+`/`#` wildcards
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] variant naming the first field that failed
    /// validation.
    pub fn new(
        ssid: &str,
        password: &str,
        broker_host: &str,
        broker_port: u16,
        client_id: &str,
        base_topic: &str,
    ) -> Result<Self, ConfigError> {
        if ssid.is_empty() {
            return Err(ConfigError::InvalidSsid);
        }
        let ssid = String::try_from(ssid).map_err(|_| ConfigError::InvalidSsid)?;

        let password = String::try_from(password).map_err(|_| ConfigError::InvalidPassword)?;

        if broker_host.is_empty() || has_whitespace(broker_host) {
            return Err(ConfigError::InvalidBrokerHost);
        }
        let broker_host =
            String::try_from(broker_host).map_err(|_| ConfigError::InvalidBrokerHost)?;

        if broker_port == 0 {
            return Err(ConfigError::InvalidBrokerPort);
        }

        if client_id.is_empty() || has_whitespace(client_id) {
            return Err(ConfigError::InvalidClientId);
        }
        let client_id = String::try_from(client_id).map_err(|_| ConfigError::InvalidClientId)?;

        if has_whitespace(base_topic) || base_topic.contains(['+', '#']) {
            return Err(ConfigError::InvalidBaseTopic);
        }
        let base_topic =
            String::try_from(base_topic).map_err(|_| ConfigError::InvalidBaseTopic)?;

        Ok(Self {
            ssid,
            password,
            broker_host,
            broker_port,
            client_id,
            base_topic,
        })
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// Recognised keys are `ssid`, `password`, `broker_host`, `broker_port`,
    /// `client_id` and `base_topic`. `password` and `base_topic` default to an
    /// empty string and `broker_port` to [`DEFAULT_BROKER_PORT`].
    ///
    /// String values are borrowed from `json`, so they must not contain escape
    /// sequences.
    pub fn from_json(json: &[u8]) -> Result<Self, ConfigError> {
        let (doc, _) = serde_json_core::from_slice::<ConfigDocument<'_>>(json)
            .map_err(|_| ConfigError::Parse)?;

        Self::new(
            doc.ssid,
            doc.password,
            doc.broker_host,
            doc.broker_port,
            doc.client_id,
            doc.base_topic,
        )
    }

    /// The Wi-Fi network name.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// The Wi-Fi passphrase.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// The broker host name or address.
    pub fn broker_host(&self) -> &str {
        &self.broker_host
    }

    /// The broker TCP port.
    pub fn broker_port(&self) -> u16 {
        self.broker_port
    }

    /// The MQTT client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The prefix prepended to every published topic.
    pub fn base_topic(&self) -> &str {
        &self.base_topic
    }
}

fn has_whitespace(s: &str) -> bool {
    s.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests;
