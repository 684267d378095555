use std::sync::atomic::{AtomicBool, Ordering};

/// Latest-value cell shared by the perception and render threads.
///
/// `closed` is overwritten on every perception iteration and read once per
/// render tick; a reader may see a value one iteration old. `running` flips
/// to `false` exactly once and stops both loops. The two flags are
/// independent, so each is its own atomic and nothing ever blocks.
#[derive(Debug)]
pub struct GestureSignal {
    closed: AtomicBool,
    running: AtomicBool,
}

impl Default for GestureSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureSignal {
    pub fn new() -> Self {
        Self {
            closed: AtomicBool::new(false),
            running: AtomicBool::new(true),
        }
    }

    pub fn publish(&self, closed: bool) {
        self.closed.store(closed, Ordering::Relaxed);
    }

    pub fn currently_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    /// Returns `true` if this call is the one that stopped the game.
    pub fn request_stop(&self) -> bool {
        self.running.swap(false, Ordering::AcqRel)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
