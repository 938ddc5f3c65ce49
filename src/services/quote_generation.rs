use std::sync::atomic::{AtomicU64, Ordering};

/// Tags quotes issued for one booking session so that a result computed for a
/// context the guest has since changed can be recognised and dropped.
#[derive(Debug, Default)]
pub struct QuoteGenerations {
    latest: AtomicU64,
}

impl QuoteGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new quote, superseding every earlier one.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.latest() == generation
    }
}
