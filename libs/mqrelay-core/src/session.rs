//! The broker-session state machine.
//!
//! Session bookkeeping runs as sequential steps on a single owning
//! task, so transitions are expressed as a pure function over a
//! tagged-state enum rather than shared mutable flags.

/// Lifecycle of one logical broker session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Initial state, before the connection is opened.
    #[default]
    Disconnected,
    /// The underlying connection is being established.
    Connecting,
    /// A subscribe request is in flight.
    Subscribing,
    /// Subscribed and receiving.
    Active,
    /// The broker reported session expiry; a re-subscribe is in
    /// flight. Re-enters `Active` on success, falls to `Terminated`
    /// on failure.
    ResubscribingAfterExpiry,
    /// Final state, reached via explicit shutdown or an unrecoverable
    /// connection error.
    Terminated,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }
}

/// Events that drive the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ConnectStarted,
    SubscribeIssued,
    SubscribeAccepted,
    SubscribeRejected,
    SessionExpired,
    ConnectionLost,
    ShutdownRequested,
}

impl SessionState {
    /// Apply one event, returning the resulting state. Events that do
    /// not apply in the current state leave it unchanged; `Terminated`
    /// absorbs everything.
    pub fn apply(self, event: SessionEvent) -> SessionState {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Terminated, _) => Terminated,
            (_, ShutdownRequested) => Terminated,
            (_, ConnectionLost) => Terminated,
            (Disconnected, ConnectStarted) => Connecting,
            (Connecting, SubscribeIssued) => Subscribing,
            (Subscribing, SubscribeAccepted) => Active,
            (Subscribing, SubscribeRejected) => Terminated,
            (Active, SessionExpired) => ResubscribingAfterExpiry,
            (ResubscribingAfterExpiry, SubscribeAccepted) => Active,
            (ResubscribingAfterExpiry, SubscribeRejected) => Terminated,
            (state, _) => state,
        }
    }
}
