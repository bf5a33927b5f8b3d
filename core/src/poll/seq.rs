use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic request numbering shared by a page's poll loop and its
/// on-demand refreshes.
#[derive(Debug, Default)]
pub struct RequestSeq {
    issued: AtomicU64,
}

impl RequestSeq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number for the next request; the first call returns 1.
    pub fn next(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Tracks the newest applied response so older ones can be dropped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Freshness {
    last_applied: u64,
}

impl Freshness {
    /// Returns false when `seq` is not newer than what is already on screen.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.last_applied {
            return false;
        }
        self.last_applied = seq;
        true
    }

    pub fn last_applied(&self) -> u64 {
        self.last_applied
    }
}
