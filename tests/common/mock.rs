//! Mock Wi-Fi station and MQTT client for testing the helper and supervisor

use std::cell::Cell;
use std::net::Ipv4Addr;

use mqtt_helper::network::{BrokerClient, WifiStation};

/// Error reported by the mocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// The station refused to start
    RadioOff,
    /// The broker refused the session (PubSubClient-style rc)
    Refused(i8),
    /// The client could not send
    SendFailed,
}

/// Mock Wi-Fi station.
///
/// Associates after `polls_until_associated` status checks following `begin`.
#[derive(Debug, Default)]
pub struct MockStation {
    pub begin_calls: usize,
    pub credentials: Option<(String, String)>,
    pub polls_until_associated: Cell<usize>,
    pub link_up: Cell<bool>,
    pub ip: Option<Ipv4Addr>,
}

impl MockStation {
    /// A station whose link is already up (begin has no effect on state).
    pub fn associated() -> Self {
        let station = Self::default();
        station.link_up.set(true);
        station
    }

    /// A station that associates after `polls` checks.
    pub fn associating_after(polls: usize) -> Self {
        Self {
            polls_until_associated: Cell::new(polls),
            ..Self::default()
        }
    }

    /// Drop or restore the link. A dropped link stays down until restored.
    pub fn set_link(&self, up: bool) {
        if !up {
            self.polls_until_associated.set(usize::MAX);
        }
        self.link_up.set(up);
    }
}

impl WifiStation for MockStation {
    type Error = MockError;

    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error> {
        self.begin_calls += 1;
        self.credentials = Some((ssid.to_string(), password.to_string()));
        Ok(())
    }

    fn is_associated(&self) -> bool {
        if self.link_up.get() {
            return true;
        }
        if self.begin_calls == 0 {
            return false;
        }
        let remaining = self.polls_until_associated.get();
        if remaining == 0 {
            self.link_up.set(true);
            return true;
        }
        self.polls_until_associated.set(remaining - 1);
        false
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.ip
    }
}

/// Mock MQTT client recording everything it is asked to do.
#[derive(Debug, Default)]
pub struct MockBroker {
    pub server: Option<(String, u16)>,
    pub client_ids: Vec<String>,
    pub fail_connects: usize,
    pub connected: bool,
    pub polls: usize,
    pub reject_publish: bool,
    pub published: Vec<(String, Vec<u8>)>,
}

impl MockBroker {
    /// A client with an open session.
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    /// A client that refuses the first `n` connection attempts.
    pub fn failing(n: usize) -> Self {
        Self {
            fail_connects: n,
            ..Self::default()
        }
    }

    /// Payloads sent so far, as strings.
    pub fn payloads(&self) -> Vec<String> {
        self.published
            .iter()
            .map(|(_, payload)| String::from_utf8(payload.clone()).unwrap())
            .collect()
    }

    /// Topics sent so far.
    pub fn topics(&self) -> Vec<String> {
        self.published.iter().map(|(topic, _)| topic.clone()).collect()
    }
}

impl BrokerClient for MockBroker {
    type Error = MockError;

    fn set_server(&mut self, host: &str, port: u16) {
        self.server = Some((host.to_string(), port));
    }

    fn connect(&mut self, client_id: &str) -> Result<(), Self::Error> {
        self.client_ids.push(client_id.to_string());
        if self.fail_connects > 0 {
            self.fail_connects -= 1;
            return Err(MockError::Refused(-2));
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn poll(&mut self) -> Result<(), Self::Error> {
        self.polls += 1;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), Self::Error> {
        if self.reject_publish {
            return Err(MockError::SendFailed);
        }
        self.published.push((topic.to_string(), payload.to_vec()));
        Ok(())
    }
}
