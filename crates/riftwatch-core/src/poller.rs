// ── Poller ──
//
// Owns the one authoritative ConnectionState. Each tick resolves
// credentials and probes the service, derives at most one event from the
// transition, and publishes the live client through the shared Session.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use riftwatch_api::{LcuClient, RequestError, Resolve};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::CoreConfig;
use crate::event::{
    ConnectEvent, ConnectionState, DisconnectEvent, DisconnectReason, ErrorEvent, LcuEvent,
};
use crate::probe::{ClientProbe, Probe};
use crate::session::Session;

const EVENT_CHANNEL_SIZE: usize = 64;
const MIN_INTERVAL: Duration = Duration::from_millis(50);

/// Synchronous event callback registered through [`Poller::subscribe`].
pub type Handler = Arc<dyn Fn(&LcuEvent) + Send + Sync>;

/// Result of one [`Poller::tick`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Another tick was still in flight; nothing was probed.
    Skipped,
    /// The tick ran and settled on this state.
    Completed(ConnectionState),
}

// ── Poller ───────────────────────────────────────────────────────

/// Connection lifecycle state machine.
///
/// Cheaply cloneable via `Arc<PollerInner>`. Nothing runs until
/// [`start()`](Self::start) or an explicit [`tick()`](Self::tick).
#[derive(Clone)]
pub struct Poller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    config: CoreConfig,
    resolver: Arc<dyn Resolve>,
    probe: Arc<dyn Probe>,
    state: watch::Sender<ConnectionState>,
    event_tx: broadcast::Sender<Arc<LcuEvent>>,
    subscribers: DashMap<u64, Handler>,
    next_subscriber: AtomicU64,
    heartbeat: watch::Sender<u64>,
    session: Session,
    in_flight: AtomicBool,
    suspended: AtomicBool,
    /// Token for the current run. Cancelled and replaced by `stop()`.
    cancel: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Poller {
    /// Create a Poller that probes with a GET on `config.probe_path`.
    pub fn new(config: CoreConfig, resolver: Arc<dyn Resolve>) -> Self {
        let probe = Arc::new(ClientProbe::new(config.probe_path.clone()));
        Self::with_probe(config, resolver, probe)
    }

    pub fn with_probe(config: CoreConfig, resolver: Arc<dyn Resolve>, probe: Arc<dyn Probe>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (heartbeat, _) = watch::channel(0);

        Self {
            inner: Arc::new(PollerInner {
                config,
                resolver,
                probe,
                state,
                event_tx,
                subscribers: DashMap::new(),
                next_subscriber: AtomicU64::new(0),
                heartbeat,
                session: Session::new(),
                in_flight: AtomicBool::new(false),
                suspended: AtomicBool::new(false),
                cancel: Mutex::new(CancellationToken::new()),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    // ── Observation ──────────────────────────────────────────────

    /// Current state, readable at any time.
    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Async event stream. Slow receivers may lag; use
    /// [`subscribe`](Self::subscribe) when every event matters.
    pub fn events(&self) -> broadcast::Receiver<Arc<LcuEvent>> {
        self.inner.event_tx.subscribe()
    }

    /// Register a callback invoked synchronously, in order, for every
    /// event. Dropping the returned [`Subscription`] unregisters it.
    pub fn subscribe(&self, handler: impl Fn(&LcuEvent) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.insert(id, Arc::new(handler));
        Subscription {
            poller: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Bumped after every tick that ends `Connected`.
    pub fn heartbeat(&self) -> watch::Receiver<u64> {
        self.inner.heartbeat.subscribe()
    }

    /// Accessor for the live client, shared with feature modules.
    pub fn session(&self) -> Session {
        self.inner.session.clone()
    }

    // ── Scheduling ───────────────────────────────────────────────

    /// Start ticking every `interval`. The first tick fires immediately.
    /// Calling this while running restarts the timer with the new interval.
    pub async fn start(&self, interval: Duration) {
        self.stop().await;
        let interval = interval.max(MIN_INTERVAL);
        let cancel = self.inner.cancel.lock().await.clone();
        let poller = self.clone();
        let handle = tokio::spawn(poll_task(poller, interval, cancel));
        self.inner.task_handles.lock().await.push(handle);
        debug!(interval_ms = interval.as_millis(), "poller started");
    }

    /// Stop ticking. Returns once no tick is running and none will fire.
    /// Pending [`reconnect_after`](Self::reconnect_after) calls are dropped.
    /// Idempotent.
    pub async fn stop(&self) {
        {
            let mut cancel = self.inner.cancel.lock().await;
            cancel.cancel();
            *cancel = CancellationToken::new();
        }
        let handles: Vec<_> = self.inner.task_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// While suspended, timer ticks are no-ops. State and edges are left
    /// untouched, so resuming never produces a spurious event.
    pub fn set_suspended(&self, suspended: bool) {
        self.inner.suspended.store(suspended, Ordering::Release);
    }

    pub fn is_suspended(&self) -> bool {
        self.inner.suspended.load(Ordering::Acquire)
    }

    /// Wait `delay`, then run one tick. Used after an external login so the
    /// new session is picked up without waiting for the timer.
    pub async fn reconnect_after(&self, delay: Duration) {
        let cancel = self.inner.cancel.lock().await.clone();
        let poller = self.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    debug!("reconnect delay elapsed");
                    poller.tick().await;
                }
            }
        });
        let mut handles = self.inner.task_handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    // ── Tick ─────────────────────────────────────────────────────

    /// Run one resolve + probe cycle now. Shares the single-flight guard
    /// with timer ticks.
    pub async fn tick(&self) -> TickOutcome {
        let Some(_guard) = InFlight::acquire(&self.inner.in_flight) else {
            trace!("tick skipped, probe still in flight");
            return TickOutcome::Skipped;
        };

        match self.state() {
            ConnectionState::Connected => self.check_liveness().await,
            previous => self.attempt_connect(previous).await,
        }

        let state = self.state();
        if state == ConnectionState::Connected {
            self.inner.heartbeat.send_modify(|n| *n = n.wrapping_add(1));
        }
        TickOutcome::Completed(state)
    }

    async fn attempt_connect(&self, previous: ConnectionState) {
        self.settle(ConnectionState::Connecting);

        let credentials = match self.inner.resolver.resolve().await {
            Ok(c) => c,
            Err(e) => {
                trace!(resolver = self.inner.resolver.name(), error = %e, "resolve failed");
                self.settle(ConnectionState::Disconnected);
                return;
            }
        };

        let client = match LcuClient::new(credentials, &self.inner.config.transport) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                warn!(error = %e, "cannot build client");
                self.fail_connect(previous, e.to_string());
                return;
            }
        };

        match self.inner.probe.probe(&client).await {
            Ok(()) => {
                let credentials = client.credentials().clone();
                self.inner.session.publish(client);
                self.settle(ConnectionState::Connected);
                info!(port = credentials.port, "connected to League client");
                self.emit(LcuEvent::Connected(ConnectEvent {
                    timestamp: Utc::now(),
                    credentials,
                }));
            }
            Err(e) if e.is_disconnect() => {
                trace!(error = %e, "service not reachable");
                self.settle(ConnectionState::Disconnected);
            }
            Err(e) => self.fail_connect(previous, e.to_string()),
        }
    }

    /// The service answered but refused the probe. Only the first such
    /// failure after a disconnect is reported.
    fn fail_connect(&self, previous: ConnectionState, error: String) {
        self.settle(ConnectionState::Error);
        if previous == ConnectionState::Error {
            return;
        }
        warn!(%error, "League client rejected connection probe");
        self.emit(LcuEvent::Error(ErrorEvent {
            timestamp: Utc::now(),
            error,
        }));
    }

    async fn check_liveness(&self) {
        let result = match self.inner.session.client() {
            Ok(client) => self.inner.probe.probe(&client).await,
            Err(_) => Err(RequestError::ConnectionRefused),
        };

        match result {
            Ok(()) => {}
            Err(e) if e.is_disconnect() => {
                let reason = DisconnectReason::from(&e);
                self.inner.session.clear();
                self.settle(ConnectionState::Disconnected);
                info!(%reason, "disconnected from League client");
                self.emit(LcuEvent::Disconnected(DisconnectEvent {
                    timestamp: Utc::now(),
                    reason,
                }));
            }
            Err(e) => debug!(error = %e, "liveness probe rejected, session still up"),
        }
    }

    fn settle(&self, state: ConnectionState) {
        let previous = self.inner.state.send_replace(state);
        if previous != state {
            trace!(from = %previous, to = %state, "state change");
        }
    }

    fn emit(&self, event: LcuEvent) {
        let event = Arc::new(event);
        // snapshot first so handlers may (un)subscribe without deadlocking
        let mut handlers: Vec<(u64, Handler)> = self
            .inner
            .subscribers
            .iter()
            .map(|e| (*e.key(), Arc::clone(e.value())))
            .collect();
        handlers.sort_unstable_by_key(|(id, _)| *id);
        for (_, handler) in handlers {
            handler(&event);
        }
        let _ = self.inner.event_tx.send(event);
    }
}

// ── Subscription ─────────────────────────────────────────────────

/// Registration handle returned by [`Poller::subscribe`].
#[must_use = "dropping a Subscription unregisters the handler"]
pub struct Subscription {
    poller: Weak<PollerInner>,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.poller.upgrade() {
            inner.subscribers.remove(&self.id);
        }
    }
}

// ── In-flight guard ──────────────────────────────────────────────

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ── Background task ──────────────────────────────────────────────

async fn poll_task(poller: Poller, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if poller.is_suspended() {
                    trace!("tick suppressed while suspended");
                    continue;
                }
                poller.tick().await;
            }
        }
    }
    debug!("poller stopped");
}
