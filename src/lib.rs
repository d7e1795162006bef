//! # mqtt-helper - Wi-Fi + MQTT connectivity for embedded devices
//!
//! A thin convenience layer that keeps a device associated with a Wi-Fi
//! network and connected to an MQTT broker, and publishes values under a
//! per-device topic namespace. It is designed for microcontrollers and
//! supports `no_std` environments.
//!
//! ## Features
//!
//! - **Connectivity supervisor**: associates once, then reconnects to the
//!   broker forever with a fixed retry delay and services the client loop
//! - **Publish API**: formatted, float and integer values published on
//!   `"<base_topic>/<topic>"`, with fixed-size buffers that truncate on overflow
//! - **State query**: `NetworkDisconnected`, `BrokerDisconnected` or `Connected`,
//!   derived live from the station and the client
//! - **Bring your own stack**: the Wi-Fi driver and MQTT client are plugged in
//!   through the [`network`] traits
//!
//! ## Usage
//!
//! ```rust
//! use mqtt_helper::config::Config;
//! use mqtt_helper::helper::{ConnectionState, MqttHelper};
//! use mqtt_helper::supervisor::{RetryPolicy, Step, Supervisor};
//! # use mqtt_helper::network::{BrokerClient, WifiStation};
//! # struct Station;
//! # impl WifiStation for Station {
//! #     type Error = ();
//! #     fn begin(&mut self, _: &str, _: &str) -> Result<(), ()> { Ok(()) }
//! #     fn is_associated(&self) -> bool { true }
//! # }
//! # #[derive(Default)]
//! # struct Client { up: bool }
//! # impl BrokerClient for Client {
//! #     type Error = ();
//! #     fn set_server(&mut self, _: &str, _: u16) {}
//! #     fn connect(&mut self, _: &str) -> Result<(), ()> { self.up = true; Ok(()) }
//! #     fn is_connected(&self) -> bool { self.up }
//! #     fn poll(&mut self) -> Result<(), ()> { Ok(()) }
//! #     fn publish(&mut self, _: &str, _: &[u8]) -> Result<(), ()> { Ok(()) }
//! # }
//!
//! let config = Config::new("home", "secret", "broker.hivemq.com", 1883, "node-1", "home/attic").unwrap();
//! let mut helper: MqttHelper<_, _> = MqttHelper::new(&config, Station, Client::default());
//! let mut supervisor = Supervisor::new(config, RetryPolicy::default());
//!
//! // Nothing is published until the broker session is up.
//! assert!(!helper.publish_int("fan", 1));
//!
//! while helper.state() != ConnectionState::Connected {
//!     if let Step::Sleep(_) = supervisor.step(&mut helper) {
//!         // sleep on the platform timer
//!     }
//! }
//!
//! assert!(helper.publish_float("temperature", 23.5));
//! ```
//!
//! With the `std` feature, [`runtime::init`] runs the supervisor on its own
//! thread and returns a cloneable, thread-safe handle.
//!
//! ## Optional Features
//!
//! - `std`: Enable the threaded [`runtime`] (default: disabled)
//! - `log`: Emit connection and publish diagnostics through the `log` facade
//! - `defmt`: Implement `defmt::Format` for the public state and error types

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Validated connection settings and JSON provisioning.
pub mod config;

/// Collaborator traits for the Wi-Fi station and the MQTT client.
pub mod network;

/// Publish API, scratch buffers and the connection-state query.
pub mod helper;

/// The background connectivity state machine.
pub mod supervisor;

/// Threaded supervisor runtime and shared publish handle.
#[cfg(feature = "std")]
pub mod runtime;

pub use config::Config;
pub use helper::{ConnectionState, MqttHelper};
pub use supervisor::{RetryPolicy, Supervisor};
