//! Bounded suppression buffer with batched oldest-first eviction and selective drain.

use std::collections::VecDeque;

use tracing::debug;

use crate::line::{Category, Line};
use crate::mode::BackfillMode;

/// Maximum entries retained before eviction kicks in.
pub const BUFFER_CAPACITY: usize = 400;

/// Entries evicted as a block when a push would exceed capacity. Batched to
/// amortize compaction instead of evicting one entry per push at the rim.
pub const EVICTION_BATCH: usize = 50;

/// A suppressed line together with the category it was assigned on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedEntry {
    pub line: Line,
    pub category: Category,
}

/// Ordered store of suppressed lines. Plain data structure; the filter engine
/// provides the single coarse lock required for concurrent push/drain.
#[derive(Debug, Default)]
pub struct SuppressionBuffer {
    entries: VecDeque<BufferedEntry>,
}

impl SuppressionBuffer {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(BUFFER_CAPACITY),
        }
    }

    /// Append a suppressed line, evicting the oldest batch first if full.
    pub fn push(&mut self, line: Line, category: Category) {
        if self.entries.len() >= BUFFER_CAPACITY {
            let evicted = EVICTION_BATCH.min(self.entries.len());
            self.entries.drain(..evicted);
            debug!(evicted, "suppression buffer at capacity, evicted oldest batch");
        }
        self.entries.push_back(BufferedEntry { line, category });
    }

    /// Remove and return the entries `backfill` releases, in insertion order.
    /// Non-matching entries remain buffered for a future drain.
    pub fn drain(&mut self, backfill: BackfillMode) -> Vec<BufferedEntry> {
        if backfill == BackfillMode::Off {
            return Vec::new();
        }
        let mut released = Vec::new();
        let mut retained = VecDeque::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if backfill.releases(entry.category) {
                released.push(entry);
            } else {
                retained.push_back(entry);
            }
        }
        self.entries = retained;
        released
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
