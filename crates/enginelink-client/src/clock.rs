use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::cancel::CancelToken;

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Cancelled,
}

/// Interruptible wait primitive used for the poll interval and the
/// reconnect backoff.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> Wake;
}

impl<Z: Sleeper + ?Sized> Sleeper for &mut Z {
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> Wake {
        (**self).sleep(duration, cancel)
    }
}

/// Real wall-clock waits on the cancel token's condition variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> Wake {
        if cancel.wait_timeout(duration) {
            Wake::Cancelled
        } else {
            Wake::Elapsed
        }
    }
}

/// Deterministic clock: sleeping advances virtual time instantly.
///
/// Clones share the same timeline, so a test can hand one clone to the
/// client and read `now()` / `waits()` from another.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    inner: Arc<Mutex<ClockState>>,
}

#[derive(Debug, Default)]
struct ClockState {
    now: Duration,
    waits: Vec<Duration>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.state().now
    }

    /// Every completed wait, in order.
    pub fn waits(&self) -> Vec<Duration> {
        self.state().waits.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ClockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sleeper for VirtualClock {
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) -> Wake {
        if cancel.is_cancelled() {
            return Wake::Cancelled;
        }
        let mut state = self.state();
        state.now += duration;
        state.waits.push(duration);
        Wake::Elapsed
    }
}
