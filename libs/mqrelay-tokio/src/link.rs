//! Broker connection abstraction.
//!
//! The physical transport and wire protocol live behind this trait;
//! the relay only ever sees subscribe/receive/publish/disconnect.

use mqrelay_core::options::{PublishOptions, SubAck, SubscribeOptions};

/// One inbound application message from the subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub topic: String,
    pub payload: String,
}

/// Transport-level failures reported by a broker link.
///
/// `SessionExpired` is the one recoverable signal: the broker granted
/// a new session without prior state, so the client must re-subscribe.
/// Everything else is terminal for the receive loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// The prior session was lost on reconnect; subscriptions must be
    /// reinstated.
    SessionExpired,
    /// Any other connection failure.
    Connection { reason: String },
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinkError::SessionExpired => write!(f, "Broker session expired"),
            LinkError::Connection { reason } => write!(f, "Connection error: {}", reason),
        }
    }
}

impl core::error::Error for LinkError {}

/// One logical connection to the message broker.
///
/// Implementations own the socket and framing. The relay guarantees
/// exclusive access: a single worker task is the only caller of any
/// of these methods for the lifetime of the session.
#[async_trait::async_trait]
pub trait BrokerLink: Send {
    /// Issue a subscribe request for `topic`.
    ///
    /// An `Ok` return means the transport acknowledgement was
    /// error-free; the caller still has to inspect the broker return
    /// code inside the ack before treating the subscription as
    /// established.
    async fn subscribe(
        &mut self,
        topic: &str,
        options: SubscribeOptions,
    ) -> Result<SubAck, LinkError>;

    /// Await the next inbound message from the subscribed topic(s).
    ///
    /// Must be cancel-safe: the session loop races this future against
    /// other work and drops it when another branch wins, so a dropped
    /// call must not discard a message.
    async fn receive(&mut self) -> Result<Inbound, LinkError>;

    /// Forward one message to the broker.
    async fn publish(
        &mut self,
        topic: &str,
        payload: String,
        options: PublishOptions,
    ) -> Result<(), LinkError>;

    /// Request disconnect. Best-effort; the session is torn down
    /// regardless of the outcome.
    async fn disconnect(&mut self) -> Result<(), LinkError>;
}
