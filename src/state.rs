//! Process-wide engine state (§4.7/§4.9): the cancellation flag every running
//! operation polls, generalized from the teacher's per-import cancellation
//! handle (`AppState::cancel_indexing`) into a plain shared flag with no GUI
//! or database binding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct EngineState {
    cancel: Arc<AtomicBool>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of whatever operation is currently running.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Reset the flag before starting a new run.
    pub fn reset(&self) {
        self.cancel.store(false, Ordering::SeqCst);
    }

    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_then_reset() {
        let state = EngineState::new();
        assert!(!state.is_canceled());
        state.cancel();
        assert!(state.is_canceled());
        state.reset();
        assert!(!state.is_canceled());
    }

    #[test]
    fn test_clone_shares_flag() {
        let state = EngineState::new();
        let clone = state.clone();
        clone.cancel();
        assert!(state.is_canceled());
    }
}
