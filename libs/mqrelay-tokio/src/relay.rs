//! The public relay handle.

use std::sync::Arc;

use log::{error, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use mqrelay_core::session::SessionState;
use mqrelay_core::{Error, Result, DEFAULT_QUEUE_DEPTH};

use crate::config::RelayConfig;
use crate::link::BrokerLink;
use crate::session::{run_session, Shared};

/// Default relay configuration: capacity-5 queues in both directions.
pub type DefaultRelay = Relay<DEFAULT_QUEUE_DEPTH>;

/// Handle to one broker session.
///
/// Owns the background worker that drives the [`BrokerLink`]; the
/// handle itself only touches the bounded queues and lifecycle
/// signals, so `publish`/`receive` are cheap and non-blocking.
pub struct Relay<const DEPTH: usize> {
    topic: String,
    shared: Arc<Shared<DEPTH>>,
    state_rx: watch::Receiver<SessionState>,
    shutdown_tx: watch::Sender<bool>,
    worker: Option<JoinHandle<()>>,
}

impl<const DEPTH: usize> Relay<DEPTH> {
    /// Open a session against the topic in `config`, using `link` as
    /// the broker connection. Spawns the background worker that
    /// subscribes and then runs the receive/drain loop.
    pub fn open<L>(config: RelayConfig, link: L) -> Self
    where
        L: BrokerLink + 'static,
    {
        info!(
            "Opening relay session to {}:{} on topic '{}'",
            config.host, config.port, config.topic
        );

        let shared = Arc::new(Shared::new());
        let (state_tx, state_rx) = watch::channel(SessionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = tokio::spawn(run_session(
            link,
            config.topic.clone(),
            Arc::clone(&shared),
            state_tx,
            shutdown_rx,
        ));

        Self {
            topic: config.topic,
            shared,
            state_rx,
            shutdown_tx,
            worker: Some(worker),
        }
    }

    /// Queue one message for forwarding to the broker.
    ///
    /// Fails fast with [`Error::Terminated`] once the session is
    /// terminal (messages would never be sent), and with
    /// [`Error::QueueFull`] when the outbound queue has no free slot.
    pub fn publish(&self, message: impl Into<String>) -> Result<()> {
        if *self.shutdown_tx.borrow() || self.state_rx.borrow().is_terminal() {
            return Err(Error::Terminated);
        }

        {
            let mut queue = self.shared.outbound.lock().unwrap();
            queue.enqueue(message.into()).map_err(|_| Error::QueueFull)?;
        }

        self.shared.outbound_ready.notify_one();
        Ok(())
    }

    /// Take the oldest buffered inbound message, if any.
    /// [`Error::NoData`] is the normal empty-queue result, not a
    /// failure.
    pub fn receive(&self) -> Result<String> {
        self.shared
            .inbound
            .lock()
            .unwrap()
            .dequeue()
            .ok_or(Error::NoData)
    }

    /// Current session state snapshot.
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Unconditionally request disconnect and mark the session
    /// terminal. Idempotent; `publish` fails fast from the moment this
    /// returns, even before the worker has observed the signal.
    pub fn force_finalize(&self) {
        info!("Force-finalizing relay session on '{}'", self.topic);
        let _ = self.shutdown_tx.send(true);
    }

    /// Tear the session down: request disconnect, signal the worker to
    /// stop, and block until it has exited. After this returns no
    /// further access to the broker link occurs.
    pub async fn close(mut self) {
        let _ = self.shutdown_tx.send(true);

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                error!("Relay worker for '{}' failed: {}", self.topic, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Inbound, LinkError};
    use mqrelay_core::options::{
        PublishOptions, QoS, SubAck, SubscribeOptions, SubscribeReturnCode,
    };
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted broker link: plays back a queue of subscribe results
    /// and receive events, records everything published.
    struct MockLink {
        sub_results: VecDeque<std::result::Result<SubAck, LinkError>>,
        events: VecDeque<std::result::Result<Inbound, LinkError>>,
        published: Arc<Mutex<Vec<String>>>,
        publish_options: Arc<Mutex<Vec<PublishOptions>>>,
        subscribe_calls: Arc<AtomicUsize>,
        subscribe_options: Arc<Mutex<Vec<SubscribeOptions>>>,
        receive_calls: Arc<AtomicUsize>,
        disconnected: Arc<AtomicBool>,
        hang_on_subscribe: bool,
    }

    #[derive(Clone)]
    struct MockProbe {
        published: Arc<Mutex<Vec<String>>>,
        publish_options: Arc<Mutex<Vec<PublishOptions>>>,
        subscribe_calls: Arc<AtomicUsize>,
        subscribe_options: Arc<Mutex<Vec<SubscribeOptions>>>,
        receive_calls: Arc<AtomicUsize>,
        disconnected: Arc<AtomicBool>,
    }

    fn granted() -> std::result::Result<SubAck, LinkError> {
        Ok(SubAck {
            return_code: SubscribeReturnCode::GrantedQos2,
        })
    }

    fn rejected() -> std::result::Result<SubAck, LinkError> {
        Ok(SubAck {
            return_code: SubscribeReturnCode::Failure,
        })
    }

    fn message(payload: &str) -> std::result::Result<Inbound, LinkError> {
        Ok(Inbound {
            topic: "t".to_string(),
            payload: payload.to_string(),
        })
    }

    impl MockLink {
        fn new(
            sub_results: Vec<std::result::Result<SubAck, LinkError>>,
            events: Vec<std::result::Result<Inbound, LinkError>>,
        ) -> (Self, MockProbe) {
            let link = Self {
                sub_results: sub_results.into(),
                events: events.into(),
                published: Arc::new(Mutex::new(Vec::new())),
                publish_options: Arc::new(Mutex::new(Vec::new())),
                subscribe_calls: Arc::new(AtomicUsize::new(0)),
                subscribe_options: Arc::new(Mutex::new(Vec::new())),
                receive_calls: Arc::new(AtomicUsize::new(0)),
                disconnected: Arc::new(AtomicBool::new(false)),
                hang_on_subscribe: false,
            };
            let probe = MockProbe {
                published: Arc::clone(&link.published),
                publish_options: Arc::clone(&link.publish_options),
                subscribe_calls: Arc::clone(&link.subscribe_calls),
                subscribe_options: Arc::clone(&link.subscribe_options),
                receive_calls: Arc::clone(&link.receive_calls),
                disconnected: Arc::clone(&link.disconnected),
            };
            (link, probe)
        }
    }

    #[async_trait::async_trait]
    impl BrokerLink for MockLink {
        async fn subscribe(
            &mut self,
            _topic: &str,
            options: SubscribeOptions,
        ) -> std::result::Result<SubAck, LinkError> {
            if self.hang_on_subscribe {
                std::future::pending::<()>().await;
            }
            self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
            self.subscribe_options.lock().unwrap().push(options);
            self.sub_results.pop_front().unwrap_or_else(granted)
        }

        async fn receive(&mut self) -> std::result::Result<Inbound, LinkError> {
            self.receive_calls.fetch_add(1, Ordering::SeqCst);
            match self.events.pop_front() {
                Some(event) => event,
                // Out of scripted events: stay subscribed but quiet.
                None => std::future::pending().await,
            }
        }

        async fn publish(
            &mut self,
            _topic: &str,
            payload: String,
            options: PublishOptions,
        ) -> std::result::Result<(), LinkError> {
            self.published.lock().unwrap().push(payload);
            self.publish_options.lock().unwrap().push(options);
            Ok(())
        }

        async fn disconnect(&mut self) -> std::result::Result<(), LinkError> {
            self.disconnected.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within timeout");
    }

    fn open_default(link: MockLink) -> DefaultRelay {
        Relay::open(RelayConfig::default(), link)
    }

    #[tokio::test]
    async fn test_publish_drains_in_enqueue_order() {
        let (link, probe) = MockLink::new(vec![granted()], vec![]);
        let relay = open_default(link);

        wait_until(|| relay.state() == SessionState::Active).await;

        relay.publish("first").unwrap();
        relay.publish("second").unwrap();
        relay.publish("third").unwrap();

        let published = Arc::clone(&probe.published);
        wait_until(move || published.lock().unwrap().len() == 3).await;
        assert_eq!(
            *probe.published.lock().unwrap(),
            vec!["first", "second", "third"]
        );

        // The drain path always forwards at-most-once with the
        // retained flag set.
        for options in probe.publish_options.lock().unwrap().iter() {
            assert_eq!(options.qos, QoS::AtMostOnce);
            assert!(options.retain);
        }

        relay.close().await;
        assert!(probe.disconnected.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_subscription_uses_fixed_relay_parameters() {
        let (link, probe) = MockLink::new(vec![granted()], vec![]);
        let relay = open_default(link);

        wait_until(|| relay.state() == SessionState::Active).await;

        let recorded = probe.subscribe_options.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0], SubscribeOptions::relay_defaults());
        drop(recorded);

        relay.close().await;
    }

    #[tokio::test]
    async fn test_inbound_messages_are_delivered_in_order() {
        let (link, _probe) = MockLink::new(
            vec![granted()],
            vec![message("one"), message("two")],
        );
        let relay = open_default(link);

        wait_until(|| relay.state() == SessionState::Active).await;

        let shared = Arc::clone(&relay.shared);
        wait_until(move || shared.inbound.lock().unwrap().len() == 2).await;

        assert_eq!(relay.receive().unwrap(), "one");
        assert_eq!(relay.receive().unwrap(), "two");
        assert_eq!(relay.receive(), Err(Error::NoData));

        relay.close().await;
    }

    #[tokio::test]
    async fn test_receive_on_empty_queue_returns_no_data() {
        let (link, _probe) = MockLink::new(vec![granted()], vec![]);
        let relay = open_default(link);

        assert_eq!(relay.receive(), Err(Error::NoData));
        relay.close().await;
    }

    #[tokio::test]
    async fn test_session_expiry_triggers_transparent_resubscribe() {
        let (link, probe) = MockLink::new(
            vec![granted(), granted()],
            vec![
                message("before"),
                Err(LinkError::SessionExpired),
                message("after"),
            ],
        );
        let relay = open_default(link);

        let shared = Arc::clone(&relay.shared);
        wait_until(move || shared.inbound.lock().unwrap().len() == 2).await;

        // The expiry was absorbed: both real messages arrived, the
        // subscription was issued twice, and the session is active.
        assert_eq!(probe.subscribe_calls.load(Ordering::SeqCst), 2);
        assert_eq!(relay.state(), SessionState::Active);
        assert_eq!(relay.receive().unwrap(), "before");
        assert_eq!(relay.receive().unwrap(), "after");

        relay.close().await;
    }

    #[tokio::test]
    async fn test_resubscribe_failure_terminates_session() {
        let (link, probe) = MockLink::new(
            vec![granted(), rejected()],
            vec![Err(LinkError::SessionExpired)],
        );
        let relay = open_default(link);

        wait_until(|| relay.state() == SessionState::Terminated).await;

        assert_eq!(probe.subscribe_calls.load(Ordering::SeqCst), 2);
        assert!(probe.disconnected.load(Ordering::SeqCst));
        assert_eq!(relay.publish("late"), Err(Error::Terminated));

        relay.close().await;
    }

    #[tokio::test]
    async fn test_initial_subscribe_rejection_never_starts_receive_loop() {
        let (link, probe) = MockLink::new(vec![rejected()], vec![message("unseen")]);
        let relay = open_default(link);

        wait_until(|| relay.state() == SessionState::Terminated).await;

        // The receive loop was never entered, so the scripted message
        // stayed untouched and nothing reached the inbound queue.
        assert_eq!(relay.receive(), Err(Error::NoData));
        assert!(probe.disconnected.load(Ordering::SeqCst));
        assert_eq!(relay.publish("late"), Err(Error::Terminated));

        relay.close().await;
    }

    #[tokio::test]
    async fn test_connection_error_terminates_session() {
        let (link, _probe) = MockLink::new(
            vec![granted()],
            vec![Err(LinkError::Connection {
                reason: "connection reset".to_string(),
            })],
        );
        let relay = open_default(link);

        wait_until(|| relay.state() == SessionState::Terminated).await;
        assert_eq!(relay.publish("late"), Err(Error::Terminated));

        relay.close().await;
    }

    #[tokio::test]
    async fn test_publish_after_force_finalize_fails_fast() {
        let (link, probe) = MockLink::new(vec![granted()], vec![]);
        let relay = open_default(link);

        wait_until(|| relay.state() == SessionState::Active).await;
        relay.publish("sent").unwrap();

        relay.force_finalize();
        // Terminal immediately, before the worker has observed it.
        assert_eq!(relay.publish("dropped"), Err(Error::Terminated));

        // Calling it again is fine.
        relay.force_finalize();

        wait_until(|| relay.state() == SessionState::Terminated).await;
        relay.close().await;
        assert!(probe.disconnected.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_outbound_queue_rejects_when_full() {
        // Hang the subscribe so the drain never runs, then fill the
        // capacity-2 outbound queue.
        let (mut link, _probe) = MockLink::new(vec![], vec![]);
        link.hang_on_subscribe = true;
        let relay: Relay<2> = Relay::open(RelayConfig::default(), link);

        relay.publish("a").unwrap();
        relay.publish("b").unwrap();
        assert_eq!(relay.publish("c"), Err(Error::QueueFull));

        relay.close().await;
    }

    #[tokio::test]
    async fn test_inbound_overflow_drops_newest_messages() {
        // Capacity-2 inbound queue, three scripted messages: the third
        // is dropped, the first two survive in order.
        let (link, probe) = MockLink::new(
            vec![granted()],
            vec![message("one"), message("two"), message("three")],
        );
        let relay: Relay<2> = Relay::open(RelayConfig::default(), link);

        // The fourth receive call parks the worker, so by then all
        // three scripted messages have been handled.
        let receive_calls = Arc::clone(&probe.receive_calls);
        wait_until(move || receive_calls.load(Ordering::SeqCst) == 4).await;

        assert_eq!(relay.receive().unwrap(), "one");
        assert_eq!(relay.receive().unwrap(), "two");
        assert_eq!(relay.receive(), Err(Error::NoData));

        relay.close().await;
    }
}
