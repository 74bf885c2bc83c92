//! Interval-driven poll scheduling.
//!
//! A [`Poller`] drives exactly one registered unit of work: sleep one
//! interval, run the work to completion, sleep again. Ticks never overlap —
//! the next delay is not armed until the previous tick's future has fully
//! settled. Cancellation is cooperative through a shared [`CancelHandle`]
//! and takes effect before the next tick fires: while a delay is pending,
//! between ticks, and before the first delay is ever armed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

/// A unit of work driven by a [`Poller`].
#[async_trait]
pub trait Tick: Send {
    /// Runs one tick. The poller arms the next delay only after the returned
    /// future completes. Failures must be handled here; the poller surfaces
    /// nothing.
    async fn tick(&mut self);
}

/// Cooperative cancellation switch shared between a [`Poller`], its unit of
/// work, and the caller's subscription handle.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    /// Creates a live (not yet cancelled) handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the cancelled flag and wakes any pending delay. Idempotent and
    /// safe to call from inside a tick, from other tasks, and before the
    /// poller ever runs.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Returns true once [`CancelHandle::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once the handle is cancelled.
    pub(crate) async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            // Register before re-checking so a cancel between the check and
            // the await cannot be missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Fires a unit of work at a fixed cadence without overlap.
///
/// Lifecycle: `Idle → Armed → Running → Armed → … → Cancelled`.
#[derive(Debug)]
pub struct Poller {
    interval: Duration,
    cancel: CancelHandle,
}

impl Poller {
    /// Creates a poller firing every `interval`, observing `cancel`.
    #[must_use]
    pub fn new(interval: Duration, cancel: CancelHandle) -> Self {
        Self { interval, cancel }
    }

    /// Drives `work` until cancelled. Each cycle sleeps one interval, then
    /// runs one tick to completion. A cancellation observed at any point —
    /// before the first delay, during a delay, or during a tick — stops the
    /// loop without firing again. A pre-cancelled handle suppresses even the
    /// first tick.
    pub async fn run<T: Tick>(self, work: &mut T) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {}
            }
            if self.cancel.is_cancelled() {
                break;
            }
            work.tick().await;
        }
        tracing::debug!("poller stopped");
    }
}
