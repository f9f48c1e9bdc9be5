//! The session worker task.
//!
//! One task owns the broker link exclusively and drives the whole
//! session: subscribe, receive, transparent re-subscription after
//! broker-side session expiry, and draining of the outbound queue.
//! Producers only ever touch the shared queues and the notify handle,
//! so link access needs no locking.

use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use tokio::sync::{watch, Notify};

use mqrelay_core::options::{PublishOptions, SubscribeOptions};
use mqrelay_core::queue::BoundedQueue;
use mqrelay_core::session::{SessionEvent, SessionState};
use mqrelay_core::Error;

use crate::link::{BrokerLink, Inbound, LinkError};

/// State shared between the relay handle and the worker task. The
/// queues are the only cross-thread surface; every access goes
/// through their enqueue/dequeue contract under the mutex.
pub(crate) struct Shared<const DEPTH: usize> {
    pub outbound: Mutex<BoundedQueue<String, DEPTH>>,
    pub inbound: Mutex<BoundedQueue<String, DEPTH>>,
    pub outbound_ready: Notify,
}

impl<const DEPTH: usize> Shared<DEPTH> {
    pub fn new() -> Self {
        Self {
            outbound: Mutex::new(BoundedQueue::new()),
            inbound: Mutex::new(BoundedQueue::new()),
            outbound_ready: Notify::new(),
        }
    }
}

fn advance(
    state: &mut SessionState,
    state_tx: &watch::Sender<SessionState>,
    event: SessionEvent,
) {
    let next = state.apply(event);
    if next != *state {
        debug!("Session state {:?} -> {:?} on {:?}", state, next, event);
        *state = next;
        let _ = state_tx.send(next);
    }
}

/// Issue a subscribe request and interpret the acknowledgement. The
/// subscription is only established when the transport ack was
/// error-free and the broker return code grants it.
async fn establish_subscription<L: BrokerLink>(link: &mut L, topic: &str) -> Result<(), Error> {
    match link.subscribe(topic, SubscribeOptions::relay_defaults()).await {
        Ok(ack) if ack.return_code.is_granted() => {
            info!("Subscription to '{}' granted: {:?}", topic, ack.return_code);
            Ok(())
        }
        Ok(ack) => {
            warn!(
                "Broker rejected subscription to '{}': {:?}",
                topic, ack.return_code
            );
            Err(Error::SubscribeFailed {
                code: ack.return_code as u8,
            })
        }
        Err(LinkError::SessionExpired) => Err(Error::SessionExpired),
        Err(LinkError::Connection { reason }) => {
            warn!("Subscribe request on '{}' failed: {}", topic, reason);
            Err(Error::Connection { reason })
        }
    }
}

/// Buffer one inbound message for pull-style consumption. A full
/// inbound queue drops the message; delivery here is at-most-once.
fn deliver_inbound<const DEPTH: usize>(shared: &Shared<DEPTH>, inbound: Inbound) {
    debug!(
        "Received message on '{}' ({} bytes)",
        inbound.topic,
        inbound.payload.len()
    );

    let mut queue = shared.inbound.lock().unwrap();
    if queue.enqueue(inbound.payload).is_err() {
        warn!(
            "Inbound queue full, dropping message from '{}'",
            inbound.topic
        );
    }
}

/// Forward every pending outbound message. Forwarding failures are
/// logged and the message is not re-enqueued: publishes are
/// at-most-once with no redelivery on transport failure. The lock is
/// released before each await.
async fn drain_outbound<L: BrokerLink, const DEPTH: usize>(
    link: &mut L,
    topic: &str,
    shared: &Shared<DEPTH>,
) {
    loop {
        let message = { shared.outbound.lock().unwrap().dequeue() };
        let Some(message) = message else {
            break;
        };

        debug!("Forwarding queued message to '{}'", topic);
        if let Err(e) = link
            .publish(topic, message, PublishOptions::relay_defaults())
            .await
        {
            warn!("Dropping outbound message after publish failure: {}", e);
        }
    }
}

/// Run one session to completion. Terminates on shutdown request,
/// subscribe failure, or any unrecoverable connection error; a
/// session-expired signal is absorbed by re-subscribing.
pub(crate) async fn run_session<L, const DEPTH: usize>(
    mut link: L,
    topic: String,
    shared: Arc<Shared<DEPTH>>,
    state_tx: watch::Sender<SessionState>,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    L: BrokerLink,
{
    let mut state = SessionState::default();
    advance(&mut state, &state_tx, SessionEvent::ConnectStarted);
    advance(&mut state, &state_tx, SessionEvent::SubscribeIssued);

    // Do not enter the receive loop without an established
    // subscription; the receive future would never resolve. A shutdown
    // request abandons the in-flight subscribe.
    tokio::select! {
        changed = shutdown_rx.changed() => {
            if changed.is_err() || *shutdown_rx.borrow() {
                info!("Shutdown requested before subscribing on '{}'", topic);
                advance(&mut state, &state_tx, SessionEvent::ShutdownRequested);
            }
        }

        result = establish_subscription(&mut link, &topic) => match result {
            Ok(()) => advance(&mut state, &state_tx, SessionEvent::SubscribeAccepted),
            Err(Error::SubscribeFailed { .. }) => {
                advance(&mut state, &state_tx, SessionEvent::SubscribeRejected)
            }
            Err(_) => advance(&mut state, &state_tx, SessionEvent::ConnectionLost),
        }
    }

    while state == SessionState::Active {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                // A closed channel means the handle is gone; treat it
                // the same as an explicit shutdown.
                if changed.is_err() || *shutdown_rx.borrow() {
                    info!("Shutdown requested, terminating session on '{}'", topic);
                    advance(&mut state, &state_tx, SessionEvent::ShutdownRequested);
                }
            }

            event = link.receive() => match event {
                Ok(inbound) => deliver_inbound(&shared, inbound),

                Err(LinkError::SessionExpired) => {
                    // The client has reconnected and the prior session
                    // has expired; the subscription must be reinstated
                    // before receiving again.
                    info!("Session expired on '{}', re-subscribing", topic);
                    advance(&mut state, &state_tx, SessionEvent::SessionExpired);

                    match establish_subscription(&mut link, &topic).await {
                        Ok(()) => {
                            advance(&mut state, &state_tx, SessionEvent::SubscribeAccepted)
                        }
                        Err(Error::SubscribeFailed { .. }) => {
                            advance(&mut state, &state_tx, SessionEvent::SubscribeRejected)
                        }
                        Err(_) => advance(&mut state, &state_tx, SessionEvent::ConnectionLost),
                    }
                }

                Err(LinkError::Connection { reason }) => {
                    warn!("Receive failed on '{}': {}", topic, reason);
                    advance(&mut state, &state_tx, SessionEvent::ConnectionLost);
                }
            },

            _ = shared.outbound_ready.notified() => {
                drain_outbound(&mut link, &topic, &shared).await;
            }
        }
    }

    if let Err(e) = link.disconnect().await {
        debug!("Disconnect request on '{}' failed: {}", topic, e);
    }

    // Covers exits before the loop was entered.
    advance(&mut state, &state_tx, SessionEvent::ShutdownRequested);
    info!("Session on '{}' terminated", topic);
}
