use std::sync::{Condvar, Mutex, PoisonError};

/// Single-use resume signal for the manual verification step.
///
/// The job arms the gate before it reports `verification`, then blocks in
/// [`VerificationGate::wait`] until an operator releases it. There is no
/// timeout.
#[derive(Debug, Default)]
pub struct VerificationGate {
    released: Mutex<bool>,
    signal: Condvar,
}

impl VerificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear any stale release so the next `wait` blocks.
    pub fn arm(&self) {
        *self.released.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    pub fn release(&self) {
        let mut released = self.released.lock().unwrap_or_else(PoisonError::into_inner);
        *released = true;
        self.signal.notify_all();
    }

    pub fn is_released(&self) -> bool {
        *self.released.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block the calling thread until released. Consumes the release.
    pub fn wait(&self) {
        let mut released = self.released.lock().unwrap_or_else(PoisonError::into_inner);
        while !*released {
            released = self
                .signal
                .wait(released)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *released = false;
    }
}
