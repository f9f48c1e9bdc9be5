//! # mqrelay-core
//!
//! Runtime-free building blocks for the mqrelay MQTT client bridge.
//!
//! This crate holds the pieces that do not depend on any async runtime
//! or transport:
//!
//! - [`RingBuffer`] - fixed-capacity circular storage with wraparound
//!   bulk write/read
//! - [`BoundedQueue`] - a capacity-bounded FIFO channel built on the
//!   ring buffer, used to hand messages between application threads
//!   and the network path without unbounded growth
//! - [`SessionState`] - the tagged-state machine a relay session moves
//!   through, including transparent re-subscription after broker-side
//!   session expiry
//! - Subscription and publish option types fixed by the relay design
//!
//! The Tokio realization of the session lives in `mqrelay-tokio`.

pub mod error;
pub mod options;
pub mod queue;
pub mod ring;
pub mod session;

// Re-export commonly used types
pub use error::{Error, Result};
pub use options::{PublishOptions, QoS, RetainHandling, SubAck, SubscribeOptions, SubscribeReturnCode};
pub use queue::BoundedQueue;
pub use ring::RingBuffer;
pub use session::{SessionEvent, SessionState};

/// Queue depth used by the relay for both directions (one slot per
/// message). Matches the capacity the transport path was sized for.
pub const DEFAULT_QUEUE_DEPTH: usize = 5;
