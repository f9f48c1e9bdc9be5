//! Error taxonomy for the relay.

/// Everything that can go wrong between a caller and the broker
/// session.
///
/// `QueueFull` and `NoData` are ordinary flow-control results and are
/// never escalated. The remaining variants terminate the affected
/// loop; none of them are process-fatal, but a session that reached
/// `Terminated` is unusable and must be recreated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Outbound queue had zero free capacity for the message.
    QueueFull,
    /// No inbound message was buffered; a normal empty result.
    NoData,
    /// The broker rejected the subscription, or the acknowledgement
    /// carried an error. Carries the broker return code.
    SubscribeFailed { code: u8 },
    /// The broker granted a fresh session without prior state; any
    /// previous subscription is void.
    SessionExpired,
    /// Any other transport-level failure on the broker connection.
    Connection { reason: String },
    /// The session has already been terminated; the message will
    /// never be sent.
    Terminated,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::QueueFull => write!(f, "Outbound queue is full"),
            Error::NoData => write!(f, "No buffered message available"),
            Error::SubscribeFailed { code } => {
                write!(f, "Broker rejected subscription: return code {}", code)
            }
            Error::SessionExpired => write!(f, "Broker session expired"),
            Error::Connection { reason } => write!(f, "Connection error: {}", reason),
            Error::Terminated => write!(f, "Session already terminated"),
        }
    }
}

impl core::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let err = Error::SubscribeFailed { code: 0x80 };
        assert_eq!(
            err.to_string(),
            "Broker rejected subscription: return code 128"
        );

        let err = Error::Connection {
            reason: "connection reset".to_string(),
        };
        assert_eq!(err.to_string(), "Connection error: connection reset");
    }
}
