//! Async driver for the per-attempt countdown.
//!
//! The countdown state lives in the session's `TimerEngine`; this module only owns
//! the tokio task that feeds it one tick per second.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Spawn a task calling `on_tick` once per [`TICK_PERIOD`], first call one period
/// after spawning. The task ends when `on_tick` resolves to `false`.
pub(crate) fn spawn_ticker<F, Fut>(mut on_tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !on_tick().await {
                break;
            }
        }
    })
}

/// Owns the tick task of one attempt. Installing a new task aborts the previous one.
#[derive(Debug, Default)]
pub(crate) struct Countdown {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Countdown {
    pub(crate) fn install(&self, handle: JoinHandle<()>) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    /// Abort the running task, if any. Returns whether one was still alive.
    pub(crate) fn abort(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        match task.take() {
            Some(handle) => {
                let alive = !handle.is_finished();
                handle.abort();
                alive
            }
            None => false,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        task.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.abort();
    }
}
