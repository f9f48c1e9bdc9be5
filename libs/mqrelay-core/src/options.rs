//! Subscription and publish parameters fixed by the relay design.

/// MQTT delivery guarantee.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum QoS {
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl QoS {
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            2 => Some(QoS::ExactlyOnce),
            _ => None,
        }
    }
}

/// How the broker treats retained messages when a subscription is
/// established.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RetainHandling {
    /// Send retained messages at the time of the subscribe.
    SendOnSubscribe = 0,
    /// Send retained messages only if the subscription is new.
    SendIfNew = 1,
    /// Do not send retained messages.
    DoNotSend = 2,
}

/// Options attached to a subscribe request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SubscribeOptions {
    pub qos: QoS,
    /// Whether messages published by a client with the same ID are
    /// withheld from this subscription.
    pub no_local: bool,
    /// Keep the original RETAIN flag on forwarded messages.
    pub retain_as_published: bool,
    pub retain_handling: RetainHandling,
}

impl SubscribeOptions {
    /// The subscription parameters the relay always uses: all messages
    /// arrive at QoS 2, same-origin messages are forwarded, the RETAIN
    /// flag passes through, and retained messages are delivered when
    /// the subscription is established.
    pub const fn relay_defaults() -> Self {
        Self {
            qos: QoS::ExactlyOnce,
            no_local: false,
            retain_as_published: true,
            retain_handling: RetainHandling::SendOnSubscribe,
        }
    }
}

/// Options attached to an outbound publish.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PublishOptions {
    pub qos: QoS,
    pub retain: bool,
}

impl PublishOptions {
    /// The publish parameters the relay always uses: fire-and-forget
    /// delivery with the retained flag set.
    pub const fn relay_defaults() -> Self {
        Self {
            qos: QoS::AtMostOnce,
            retain: true,
        }
    }
}

/// Broker-reported result of a subscribe request.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SubscribeReturnCode {
    GrantedQos0 = 0,
    GrantedQos1 = 1,
    GrantedQos2 = 2,
    Failure = 0x80,
}

impl SubscribeReturnCode {
    pub const fn is_granted(&self) -> bool {
        !matches!(self, SubscribeReturnCode::Failure)
    }
}

/// Acknowledgement for a subscribe request. A subscription is only
/// established when the transport ack was error-free and the return
/// code grants it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SubAck {
    pub return_code: SubscribeReturnCode,
}
