//! Publish API and connection-state query.
//!
//! [`MqttHelper`] owns the Wi-Fi station, the MQTT client and two scratch
//! buffers. Callers publish values under `"<base_topic>/<topic>"`; the helper
//! refuses to publish unless both the network and the broker session are up.
//!
//! # Examples
//!
//! ```rust
//! use mqtt_helper::config::Config;
//! use mqtt_helper::helper::{ConnectionState, MqttHelper};
//! use mqtt_helper::network::{BrokerClient, WifiStation};
//! use mqtt_helper::publish;
//!
//! struct Station;
//! impl WifiStation for Station {
//!     type Error = ();
//!     fn begin(&mut self, _ssid: &str, _password: &str) -> Result<(), ()> { Ok(()) }
//!     fn is_associated(&self) -> bool { true }
//! }
//!
//! struct Client;
//! impl BrokerClient for Client {
//!     type Error = ();
//!     fn set_server(&mut self, _host: &str, _port: u16) {}
//!     fn connect(&mut self, _client_id: &str) -> Result<(), ()> { Ok(()) }
//!     fn is_connected(&self) -> bool { true }
//!     fn poll(&mut self) -> Result<(), ()> { Ok(()) }
//!     fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), ()> { Ok(()) }
//! }
//!
//! let config = Config::new("net", "pw", "broker.local", 1883, "node", "garden").unwrap();
//! let mut helper: MqttHelper<_, _> = MqttHelper::new(&config, Station, Client);
//!
//! assert_eq!(helper.state(), ConnectionState::Connected);
//! assert!(helper.publish_float("temperature", 21.5));
//! assert!(publish!(helper, "status", "up {}s", 42));
//! ```

use core::fmt;

use heapless::String;

use crate::config::{Config, MAX_BASE_TOPIC_LEN};
use crate::network::{BrokerClient, WifiStation};

mod buffer;

pub use buffer::ScratchBuffer;

/// Default capacity, in bytes, of the topic and payload scratch buffers.
pub const DEFAULT_BUFFER_SIZE: usize = 128;

/// The observable connectivity of the helper.
///
/// This is derived from the station and client every time it is queried and
/// is never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// The Wi-Fi station is not associated.
    NetworkDisconnected,
    /// The network is up but there is no broker session.
    BrokerDisconnected,
    /// The network is up and a broker session is open.
    Connected,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConnectionState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ConnectionState::NetworkDisconnected => defmt::write!(f, "NetworkDisconnected"),
            ConnectionState::BrokerDisconnected => defmt::write!(f, "BrokerDisconnected"),
            ConnectionState::Connected => defmt::write!(f, "Connected"),
        }
    }
}

/// Wi-Fi station, MQTT client and publish buffers.
///
/// `N` is the capacity of each scratch buffer. Topics and payloads longer than
/// `N` bytes are silently truncated.
///
/// Publishing takes `&mut self`, so the buffers can never be shared by two
/// concurrent publishes. Use [`runtime::SharedHelper`](crate::runtime) to share
/// a helper between threads.
#[derive(Debug)]
pub struct MqttHelper<W, C, const N: usize = DEFAULT_BUFFER_SIZE> {
    wifi: W,
    client: C,
    base_topic: String<MAX_BASE_TOPIC_LEN>,
    topic: ScratchBuffer<N>,
    payload: ScratchBuffer<N>,
}

impl<W, C, const N: usize> MqttHelper<W, C, N>
where
    W: WifiStation,
    C: BrokerClient,
{
    /// Create a helper publishing under `config.base_topic()`.
    pub fn new(config: &Config, wifi: W, client: C) -> Self {
        // Both strings share the same capacity, so this cannot truncate.
        let mut base_topic = String::new();
        let _ = base_topic.push_str(config.base_topic());

        Self {
            wifi,
            client,
            base_topic,
            topic: ScratchBuffer::new(),
            payload: ScratchBuffer::new(),
        }
    }

    /// Derive the current connection state.
    ///
    /// A missing network always wins over the broker status.
    pub fn state(&self) -> ConnectionState {
        if !self.wifi.is_associated() {
            return ConnectionState::NetworkDisconnected;
        }
        if !self.client.is_connected() {
            return ConnectionState::BrokerDisconnected;
        }
        ConnectionState::Connected
    }

    /// Publish a formatted value on `"<base_topic>/<topic>"`.
    ///
    /// Returns `false` without formatting anything when the helper is not
    /// [`Connected`](ConnectionState::Connected), when formatting fails or
    /// produces an empty payload, and when the client rejects the publish.
    ///
    /// Payloads and topics longer than the buffer capacity are truncated.
    ///
    /// See also the [`publish!`](crate::publish) macro.
    pub fn publish(&mut self, topic: &str, args: fmt::Arguments<'_>) -> bool {
        if self.state() != ConnectionState::Connected {
            return false;
        }

        if self.payload.format(args).is_err() || self.payload.is_empty() {
            return false;
        }

        let _ = self
            .topic
            .format(format_args!("{}/{}", self.base_topic, topic));

        match self
            .client
            .publish(self.topic.as_str(), self.payload.as_str().as_bytes())
        {
            Ok(()) => {
                debug!(
                    "Publish on: {} - value: {}",
                    self.topic.as_str(),
                    self.payload.as_str()
                );
                true
            }
            Err(e) => {
                warn!("Publish on {} failed: {:?}", self.topic.as_str(), e);
                false
            }
        }
    }

    /// Publish a float with six decimal places (`3.5` becomes `"3.500000"`).
    ///
    /// Non-finite values are spelled `nan`, `inf` and `-inf`.
    pub fn publish_float(&mut self, topic: &str, value: f32) -> bool {
        if value.is_nan() {
            self.publish(topic, format_args!("nan"))
        } else if value.is_infinite() {
            let sign = if value.is_sign_negative() { "-" } else { "" };
            self.publish(topic, format_args!("{}inf", sign))
        } else {
            self.publish(topic, format_args!("{:.6}", value))
        }
    }

    /// Publish an integer in decimal (`42` becomes `"42"`).
    pub fn publish_int(&mut self, topic: &str, value: i32) -> bool {
        self.publish(topic, format_args!("{}", value))
    }

    /// The prefix prepended to every topic.
    pub fn base_topic(&self) -> &str {
        &self.base_topic
    }

    /// The Wi-Fi station.
    pub fn wifi(&self) -> &W {
        &self.wifi
    }

    /// Mutable access to the Wi-Fi station.
    pub fn wifi_mut(&mut self) -> &mut W {
        &mut self.wifi
    }

    /// The MQTT client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Mutable access to the MQTT client.
    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }
}

/// Publish a formatted value through an [`MqttHelper`] or a
/// [`SharedHelper`](crate::runtime).
///
/// This is the type-checked equivalent of a `printf`-style publish:
///
/// ```rust,ignore
/// publish!(helper, "battery", "{}mV", millivolts);
/// ```
#[macro_export]
macro_rules! publish {
    ($helper:expr, $topic:expr, $($arg:tt)+) => {
        $helper.publish($topic, ::core::format_args!($($arg)+))
    };
}
