//! Collaborator traits for the network stack and the MQTT client.
//!
//! The helper does not implement Wi-Fi association or the MQTT wire protocol.
//! Instead it drives whatever the platform provides through two small traits:
//!
//! - [`WifiStation`]: starts association with an access point and reports
//!   whether the link is up.
//! - [`BrokerClient`]: a synchronous MQTT client that can connect, publish and
//!   service its protocol loop.
//!
//! Both traits are synchronous and non-blocking where possible: `is_associated`
//! and `is_connected` must only inspect cached driver state, and `poll` should
//! return promptly when there is nothing to do.

#![deny(unsafe_code)]

use core::net::Ipv4Addr;

/// A Wi-Fi station (client) interface.
pub trait WifiStation {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Begin associating with the access point `ssid`.
    ///
    /// This only starts the process; the supervisor polls
    /// [`is_associated`](WifiStation::is_associated) until it completes.
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error>;

    /// Whether the station is currently associated and has network access.
    fn is_associated(&self) -> bool;

    /// The station's IPv4 address, if one has been assigned.
    fn local_ip(&self) -> Option<Ipv4Addr> {
        None
    }
}

/// A synchronous MQTT client.
pub trait BrokerClient {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Set the broker endpoint used by subsequent [`connect`](BrokerClient::connect) calls.
    fn set_server(&mut self, host: &str, port: u16);

    /// Open a session with the broker using `client_id`.
    fn connect(&mut self, client_id: &str) -> Result<(), Self::Error>;

    /// Whether a broker session is currently open.
    fn is_connected(&self) -> bool;

    /// Service the protocol loop once (keep-alive, incoming traffic).
    fn poll(&mut self) -> Result<(), Self::Error>;

    /// Publish `payload` on `topic`.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error>;
}

impl<T: WifiStation + ?Sized> WifiStation for &mut T {
    type Error = T::Error;

    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error> {
        (**self).begin(ssid, password)
    }

    fn is_associated(&self) -> bool {
        (**self).is_associated()
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        (**self).local_ip()
    }
}

impl<T: BrokerClient + ?Sized> BrokerClient for &mut T {
    type Error = T::Error;

    fn set_server(&mut self, host: &str, port: u16) {
        (**self).set_server(host, port)
    }

    fn connect(&mut self, client_id: &str) -> Result<(), Self::Error> {
        (**self).connect(client_id)
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn poll(&mut self) -> Result<(), Self::Error> {
        (**self).poll()
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error> {
        (**self).publish(topic, payload)
    }
}
