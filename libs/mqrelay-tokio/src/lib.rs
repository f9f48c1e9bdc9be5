//! # mqrelay-tokio
//!
//! A Tokio-based MQTT relay session built on top of `mqrelay-core`.
//!
//! The relay sits between application threads and a publish/subscribe
//! broker: producers hand messages to a bounded outbound queue, a
//! single owning worker task forwards them over an abstract
//! [`BrokerLink`], and inbound messages from the subscribed topic are
//! buffered for pull-style consumption. When the broker reports
//! session expiry the worker re-subscribes transparently before
//! resuming the receive loop.
//!
//! ## Example
//!
//! ```no_run
//! use mqrelay_tokio::{Relay, RelayConfig, DEFAULT_QUEUE_DEPTH};
//! # use mqrelay_tokio::{BrokerLink, Inbound, LinkError};
//! # use mqrelay_core::{PublishOptions, SubAck, SubscribeOptions, SubscribeReturnCode};
//! # struct MyLink;
//! # #[async_trait::async_trait]
//! # impl BrokerLink for MyLink {
//! #     async fn subscribe(&mut self, _: &str, _: SubscribeOptions) -> Result<SubAck, LinkError> {
//! #         Ok(SubAck { return_code: SubscribeReturnCode::GrantedQos2 })
//! #     }
//! #     async fn receive(&mut self) -> Result<Inbound, LinkError> { std::future::pending().await }
//! #     async fn publish(&mut self, _: &str, _: String, _: PublishOptions) -> Result<(), LinkError> { Ok(()) }
//! #     async fn disconnect(&mut self) -> Result<(), LinkError> { Ok(()) }
//! # }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RelayConfig::default();
//!     let link = MyLink; // any BrokerLink implementation
//!     let relay: Relay<DEFAULT_QUEUE_DEPTH> = Relay::open(config, link);
//!
//!     relay.publish("hello").unwrap();
//!     relay.close().await;
//! }
//! ```

// Re-export core types for convenience
pub use mqrelay_core::{
    BoundedQueue, Error, Result, RingBuffer, SessionEvent, SessionState, DEFAULT_QUEUE_DEPTH,
};

// Public API
pub mod config;
pub mod link;
pub mod relay;

pub use config::RelayConfig;
pub use link::{BrokerLink, Inbound, LinkError};
pub use relay::{DefaultRelay, Relay};

// Modules (private)
mod session;
