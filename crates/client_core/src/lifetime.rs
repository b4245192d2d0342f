use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Liveness flag of the hosting surface, shared by every component that writes state after an await.
#[derive(Debug, Clone, Default)]
pub struct Lifetime {
    torn_down: Arc<AtomicBool>,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tear_down(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        !self.torn_down.load(Ordering::SeqCst)
    }
}
