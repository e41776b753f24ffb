use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use enginelink_transport::InterruptHandle;

/// Cooperative shutdown signal shared between the client loop and whoever
/// wants to stop it (a Ctrl-C handler, a test, a record counter).
///
/// Cancellation is observed at the top of each loop and during every wait.
/// An armed connection additionally has its in-flight socket I/O aborted.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    cond: Condvar,
}

#[derive(Default)]
struct State {
    cancelled: bool,
    armed: Option<(u64, InterruptHandle)>,
    next_id: u64,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        let armed = {
            let mut state = self.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            state.armed.take()
        };
        self.inner.cond.notify_all();

        // Outside the lock: the trigger may block briefly in the OS.
        if let Some((_, handle)) = armed {
            handle.interrupt();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Block for up to `timeout`, returning early if cancelled.
    ///
    /// Returns `true` when cancellation was observed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while !state.cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .inner
                .cond
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    /// Register `handle` to be triggered on cancellation until the returned
    /// guard is dropped. Replaces any previously armed handle.
    ///
    /// If the token is already cancelled the handle fires immediately.
    pub fn arm(&self, handle: InterruptHandle) -> ArmGuard {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id = state.next_id.wrapping_add(1);

        if state.cancelled {
            drop(state);
            handle.interrupt();
        } else {
            state.armed = Some((id, handle));
        }

        ArmGuard {
            token: self.clone(),
            id,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Disarms an interrupt handle when dropped. See [`CancelToken::arm`].
#[must_use = "the handle is disarmed as soon as the guard is dropped"]
pub struct ArmGuard {
    token: CancelToken,
    id: u64,
}

impl Drop for ArmGuard {
    fn drop(&mut self) {
        let mut state = self.token.lock();
        if matches!(state.armed, Some((id, _)) if id == self.id) {
            state.armed = None;
        }
    }
}
