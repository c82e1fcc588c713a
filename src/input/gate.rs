use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared on/off switch for controller-originated answers
///
/// Cloning shares the flag. It is read at the moment an event is about to
/// take effect, never cached.
#[derive(Clone, Debug, Default)]
pub struct InputGate {
    enabled: Arc<AtomicBool>,
}

impl InputGate {
    pub fn enable(&self) {
        self.set(true);
    }

    pub fn disable(&self) {
        self.set(false);
    }

    pub fn set(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::SeqCst);
        if previous != enabled {
            debug!("Input gate {}", if enabled { "opened" } else { "closed" });
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}
