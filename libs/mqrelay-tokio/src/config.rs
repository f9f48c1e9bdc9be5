//! Relay configuration.

/// Connection parameters injected at session construction. Opaque to
/// the relay itself; the broker link is what interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Broker host name or address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// The single topic this session publishes to and subscribes on.
    /// Immutable for the session lifetime.
    pub topic: String,
}

impl RelayConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            topic: topic.into(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "mqtt.eclipseprojects.io".to_string(),
            port: 1883,
            topic: "mqrelay/demo".to_string(),
        }
    }
}
