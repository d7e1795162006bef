//! Shared fixtures for the integration tests

#![allow(dead_code)]

pub mod mock;

use mqtt_helper::config::Config;

pub const BASE_TOPIC: &str = "home/livingroom";

pub fn config() -> Config {
    Config::new(
        "home-net",
        "correct horse",
        "broker.hivemq.com",
        1883,
        "esp32-livingroom",
        BASE_TOPIC,
    )
    .unwrap()
}
