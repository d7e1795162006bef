use super::*;

fn valid() -> Result<Config, ConfigError> {
    Config::new(
        "home-net",
        "correct horse",
        "broker.hivemq.com",
        1883,
        "esp32-kitchen",
        "home/kitchen",
    )
}

#[test]
fn test_valid_config() {
    let config = valid().unwrap();
    assert_eq!(config.ssid(), "home-net");
    assert_eq!(config.password(), "correct horse");
    assert_eq!(config.broker_host(), "broker.hivemq.com");
    assert_eq!(config.broker_port(), 1883);
    assert_eq!(config.client_id(), "esp32-kitchen");
    assert_eq!(config.base_topic(), "home/kitchen");
}

#[test]
fn test_open_network_and_empty_base_topic() {
    let config = Config::new("cafe", "", "10.0.0.2", 1883, "node", "").unwrap();
    assert_eq!(config.password(), "");
    assert_eq!(config.base_topic(), "");
}

#[test]
fn test_ssid_limits() {
    assert_eq!(
        Config::new("", "pw", "host", 1883, "id", "t"),
        Err(ConfigError::InvalidSsid)
    );

    let longest = "s".repeat(MAX_SSID_LEN);
    assert!(Config::new(&longest, "pw", "host", 1883, "id", "t").is_ok());

    let too_long = "s".repeat(MAX_SSID_LEN + 1);
    assert_eq!(
        Config::new(&too_long, "pw", "host", 1883, "id", "t"),
        Err(ConfigError::InvalidSsid)
    );
}

#[test]
fn test_password_too_long() {
    let too_long = "p".repeat(MAX_PASSWORD_LEN + 1);
    assert_eq!(
        Config::new("net", &too_long, "host", 1883, "id", "t"),
        Err(ConfigError::InvalidPassword)
    );
}

#[test]
fn test_invalid_broker() {
    assert_eq!(
        Config::new("net", "pw", "", 1883, "id", "t"),
        Err(ConfigError::InvalidBrokerHost)
    );
    assert_eq!(
        Config::new("net", "pw", "bad host", 1883, "id", "t"),
        Err(ConfigError::InvalidBrokerHost)
    );
    assert_eq!(
        Config::new("net", "pw", "host", 0, "id", "t"),
        Err(ConfigError::InvalidBrokerPort)
    );
}

#[test]
fn test_invalid_client_id() {
    assert_eq!(
        Config::new("net", "pw", "host", 1883, "", "t"),
        Err(ConfigError::InvalidClientId)
    );
    assert_eq!(
        Config::new("net", "pw", "host", 1883, "my device", "t"),
        Err(ConfigError::InvalidClientId)
    );
}

#[test]
fn test_invalid_base_topic() {
    for topic in ["with space", "sensors/+", "sensors/#", "tab\there"] {
        assert_eq!(
            Config::new("net", "pw", "host", 1883, "id", topic),
            Err(ConfigError::InvalidBaseTopic),
            "{topic:?} should be rejected"
        );
    }
}

#[test]
fn test_from_json() {
    let json = br#"{"ssid":"home-net","password":"pw","broker_host":"10.0.0.5","broker_port":8883,"client_id":"node-1","base_topic":"lab"}"#;
    let config = Config::from_json(json).unwrap();
    assert_eq!(config.ssid(), "home-net");
    assert_eq!(config.broker_host(), "10.0.0.5");
    assert_eq!(config.broker_port(), 8883);
    assert_eq!(config.client_id(), "node-1");
    assert_eq!(config.base_topic(), "lab");
}

#[test]
fn test_from_json_defaults() {
    let json = br#"{"ssid":"open","broker_host":"mqtt.local","client_id":"node-2"}"#;
    let config = Config::from_json(json).unwrap();
    assert_eq!(config.password(), "");
    assert_eq!(config.broker_port(), DEFAULT_BROKER_PORT);
    assert_eq!(config.base_topic(), "");
}

#[test]
fn test_from_json_errors() {
    assert_eq!(Config::from_json(b"not json"), Err(ConfigError::Parse));
    assert_eq!(
        Config::from_json(br#"{"ssid":"net","client_id":"id"}"#),
        Err(ConfigError::Parse)
    );

    // Well-formed but semantically invalid documents are rejected by validation.
    assert_eq!(
        Config::from_json(br#"{"ssid":"net","broker_host":"h","broker_port":0,"client_id":"id"}"#),
        Err(ConfigError::InvalidBrokerPort)
    );
}
