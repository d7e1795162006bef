//! Error types for configuration handling

use core::fmt;

/// An error raised while building a [`Config`](super::Config).
///
/// Each variant names the field that failed validation, so firmware can report
/// a precise provisioning problem without pulling in string formatting.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    /// The network name is empty or longer than 32 bytes.
    InvalidSsid,
    /// The network credential is longer than 64 bytes.
    InvalidPassword,
    /// The broker host is empty, too long or contains whitespace.
    InvalidBrokerHost,
    /// The broker port is zero.
    InvalidBrokerPort,
    /// The client identifier is empty, too long or contains whitespace.
    InvalidClientId,
    /// The base topic is too long, contains whitespace or an MQTT wildcard.
    InvalidBaseTopic,
    /// A JSON configuration document could not be parsed.
    Parse,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::InvalidSsid => "invalid network name",
            ConfigError::InvalidPassword => "invalid network credential",
            ConfigError::InvalidBrokerHost => "invalid broker host",
            ConfigError::InvalidBrokerPort => "invalid broker port",
            ConfigError::InvalidClientId => "invalid client identifier",
            ConfigError::InvalidBaseTopic => "invalid base topic",
            ConfigError::Parse => "malformed configuration document",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConfigError::InvalidSsid => defmt::write!(f, "InvalidSsid"),
            ConfigError::InvalidPassword => defmt::write!(f, "InvalidPassword"),
            ConfigError::InvalidBrokerHost => defmt::write!(f, "InvalidBrokerHost"),
            ConfigError::InvalidBrokerPort => defmt::write!(f, "InvalidBrokerPort"),
            ConfigError::InvalidClientId => defmt::write!(f, "InvalidClientId"),
            ConfigError::InvalidBaseTopic => defmt::write!(f, "InvalidBaseTopic"),
            ConfigError::Parse => defmt::write!(f, "Parse"),
        }
    }
}
