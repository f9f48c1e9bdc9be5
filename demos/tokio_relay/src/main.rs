//! Relay demo: opens a session, queues one message for publishing,
//! then force-finalizes and tears the session down.
//!
//! The broker link here is a logging stub so the demo runs without a
//! reachable broker; swap in a real `BrokerLink` implementation to
//! talk to an actual MQTT server.

use std::time::Duration;

use log::{info, warn};
use mqrelay_core::options::{PublishOptions, SubAck, SubscribeOptions, SubscribeReturnCode};
use mqrelay_tokio::{BrokerLink, DefaultRelay, Inbound, LinkError, Relay, RelayConfig};

/// Stand-in for a real broker connection: grants every subscription,
/// logs publishes, and emits a single retained message on subscribe.
struct LoggingLink {
    retained: Option<Inbound>,
}

impl LoggingLink {
    fn new(topic: &str) -> Self {
        Self {
            retained: Some(Inbound {
                topic: topic.to_string(),
                payload: "retained greeting".to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl BrokerLink for LoggingLink {
    async fn subscribe(
        &mut self,
        topic: &str,
        options: SubscribeOptions,
    ) -> Result<SubAck, LinkError> {
        info!("Subscribing to '{}' at QoS {:?}", topic, options.qos);
        Ok(SubAck {
            return_code: SubscribeReturnCode::GrantedQos2,
        })
    }

    async fn receive(&mut self) -> Result<Inbound, LinkError> {
        match self.retained.take() {
            Some(message) => Ok(message),
            None => std::future::pending().await,
        }
    }

    async fn publish(
        &mut self,
        topic: &str,
        payload: String,
        options: PublishOptions,
    ) -> Result<(), LinkError> {
        info!(
            "Publishing to '{}' (qos={:?}, retain={}): {}",
            topic, options.qos, options.retain, payload
        );
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), LinkError> {
        info!("Disconnect requested");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = RelayConfig::default();
    let link = LoggingLink::new(&config.topic);
    let relay: DefaultRelay = Relay::open(config, link);

    tokio::time::sleep(Duration::from_millis(1000)).await;

    if let Err(e) = relay.publish("Queued Message") {
        warn!("Publish rejected: {}", e);
    }

    tokio::time::sleep(Duration::from_millis(500)).await;

    while let Ok(message) = relay.receive() {
        info!("Received message from the Broker: {}", message);
    }

    relay.force_finalize();
    relay.close().await;
}
