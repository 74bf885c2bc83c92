//! Subscription orchestration.
//!
//! Ties one diff engine to one poller, applies first-fetch and not-found
//! policy, and delivers events to a caller-supplied [`Handler`]. Each
//! subscription is a single spawned task; there is never more than one
//! request in flight per subscription, and the next tick is not armed until
//! the handler invocation for the previous tick has fully settled.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;

use crate::config::WatchConfig;
use crate::error::{Error, Result};
use crate::metrics::{labels, names};
use crate::poller::{CancelHandle, Poller, Tick};
use crate::subscriber::{Subscriber, Update};
use crate::target::Target;

/// What a subscription delivers to its [`Handler`].
#[derive(Debug)]
pub enum WatchEvent {
    /// New items since the previous poll. Empty when a fresh snapshot held
    /// nothing novel; rounds where the upstream reported "not modified"
    /// deliver nothing at all.
    Update(Update),
    /// A fetch failure. Unless it ends the subscription (see
    /// [`WatchConfig::unsubscribe_on_not_found`]), polling continues at the
    /// next tick.
    Error(Error),
}

/// Receives subscription events.
///
/// Implement this directly for async handling; plain closures taking
/// `(&ListenerContext, WatchEvent)` get a blanket implementation. The next
/// tick is not armed until the returned future settles.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Handles one event.
    async fn handle(&self, context: &ListenerContext, event: WatchEvent);
}

#[async_trait]
impl<F> Handler for F
where
    F: Fn(&ListenerContext, WatchEvent) + Send + Sync + 'static,
{
    async fn handle(&self, context: &ListenerContext, event: WatchEvent) {
        self(context, event);
    }
}

/// Immutable description of what a subscription watches, captured when
/// listening begins. Reconfiguring the watcher afterwards cannot affect a
/// subscription already running.
#[derive(Debug, Clone)]
pub struct ListenerContext {
    board: String,
    thread: Option<u64>,
    config: WatchConfig,
}

impl ListenerContext {
    /// The sanitized board name.
    #[must_use]
    pub fn board(&self) -> &str {
        &self.board
    }

    /// The watched thread number, when watching a thread.
    #[must_use]
    pub fn thread(&self) -> Option<u64> {
        self.thread
    }

    /// The configuration captured at listen time.
    #[must_use]
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }
}

/// Cancellation handle for a running subscription.
///
/// Cloneable; cancelling any clone stops the subscription. Dropping the
/// handle does not cancel — a subscription keeps polling until cancelled.
#[derive(Debug, Clone)]
pub struct Subscription {
    cancel: CancelHandle,
}

impl Subscription {
    /// Stops the subscription. No handler invocation is observable after
    /// this returns; a request already in flight completes and its result
    /// is discarded. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the subscription has been cancelled (by this handle, a
    /// clone, or a terminal not-found).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Entry point: a validated configuration from which subscriptions are
/// built.
#[derive(Debug, Clone)]
pub struct Watcher {
    config: WatchConfig,
}

impl Watcher {
    /// Creates a watcher after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when validation fails, e.g. a
    /// polling interval under the upstream minimum.
    pub fn new(config: WatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Begins building a subscription to `board`'s catalog. Path-separator
    /// characters are stripped from the name.
    #[must_use]
    pub fn board(&self, board: &str) -> WatchBuilder {
        WatchBuilder {
            config: self.config.clone(),
            target: Target::catalog(board),
        }
    }
}

/// One-shot builder for a subscription.
///
/// Consumed by [`WatchBuilder::listen`], which captures an immutable
/// [`ListenerContext`]; subscriptions built from the same [`Watcher`] share
/// no state.
#[derive(Debug, Clone)]
pub struct WatchBuilder {
    config: WatchConfig,
    target: Target,
}

impl WatchBuilder {
    /// Narrows the subscription to a single thread on the board.
    #[must_use]
    pub fn thread(mut self, no: u64) -> Self {
        let board = self.target.board().to_string();
        self.target = Target::thread(&board, no);
        self
    }

    /// Starts polling and returns the subscription's cancellation handle.
    ///
    /// The first fetch happens immediately and delivers the full baseline
    /// unless [`WatchConfig::updates_only`] is set; afterwards one fetch
    /// runs per interval. Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when the board name is empty
    /// after sanitization, and [`Error::Http`] when the HTTP client cannot
    /// be built.
    pub fn listen<H: Handler>(self, handler: H) -> Result<Subscription> {
        if self.target.board().is_empty() {
            return Err(Error::invalid_configuration("board must not be empty"));
        }

        let subscriber = Subscriber::for_target(&self.config, self.target.clone())?;
        let context = Arc::new(ListenerContext {
            board: self.target.board().to_string(),
            thread: self.target.thread_no(),
            config: self.config.clone(),
        });
        let cancel = CancelHandle::new();
        let interval = self.config.interval();

        let mut session = Session {
            subscriber,
            handler,
            context,
            cancel: cancel.clone(),
            updates_only: self.config.updates_only,
            unsubscribe_on_not_found: self.config.unsubscribe_on_not_found,
        };

        tokio::spawn(async move {
            tracing::info!(
                board = %session.context.board(),
                thread = ?session.context.thread(),
                "subscription started"
            );
            session.observe(true).await;
            if session.cancel.is_cancelled() {
                return;
            }
            Poller::new(interval, session.cancel.clone())
                .run(&mut session)
                .await;
        });

        Ok(Subscription { cancel })
    }
}

/// Per-subscription state driven by the poller.
struct Session<H> {
    subscriber: Subscriber,
    handler: H,
    context: Arc<ListenerContext>,
    cancel: CancelHandle,
    updates_only: bool,
    unsubscribe_on_not_found: bool,
}

#[async_trait]
impl<H: Handler> Tick for Session<H> {
    async fn tick(&mut self) {
        self.observe(false).await;
    }
}

impl<H: Handler> Session<H> {
    /// Runs one poll round and applies delivery policy. Diff state settles
    /// before the handler runs, so a panicking handler cannot corrupt it.
    async fn observe(&mut self, first: bool) {
        match self.subscriber.next().await {
            Ok(None) => {
                counter!(names::TICKS_TOTAL, labels::OUTCOME => "not_modified").increment(1);
            }
            Ok(Some(update)) => {
                counter!(names::TICKS_TOTAL, labels::OUTCOME => "update").increment(1);
                if first && self.updates_only {
                    tracing::debug!(items = update.len(), "baseline suppressed");
                    return;
                }
                self.deliver(WatchEvent::Update(update)).await;
            }
            Err(error) => {
                counter!(names::TICKS_TOTAL, labels::OUTCOME => "error").increment(1);
                let terminal = error.is_not_found() && self.unsubscribe_on_not_found;
                self.deliver(WatchEvent::Error(error)).await;
                if terminal {
                    tracing::info!(
                        board = %self.context.board(),
                        thread = ?self.context.thread(),
                        "resource gone, unsubscribing"
                    );
                    self.cancel.cancel();
                }
            }
        }
    }

    /// Invokes the handler unless the subscription was cancelled while the
    /// fetch was in flight; results computed after cancellation are
    /// discarded.
    async fn deliver(&self, event: WatchEvent) {
        if self.cancel.is_cancelled() {
            tracing::debug!("subscription cancelled, discarding event");
            return;
        }
        match &event {
            WatchEvent::Update(update) => {
                counter!(names::UPDATES_DELIVERED_TOTAL).increment(1);
                tracing::debug!(items = update.len(), "delivering update");
            }
            WatchEvent::Error(error) => {
                counter!(names::ERRORS_DELIVERED_TOTAL).increment(1);
                tracing::debug!(%error, "delivering error");
            }
        }
        self.handler.handle(&self.context, event).await;
    }
}
