//! Bounded recent-scans history, newest first.

use std::collections::VecDeque;

use crate::dashboard::models::ScanRecord;

pub const SCAN_HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHistory {
    capacity: usize,
    entries: VecDeque<ScanRecord>,
}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::with_capacity(SCAN_HISTORY_CAPACITY)
    }
}

impl ScanHistory {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a scan, evicting the oldest entry when full.
    pub fn push(&mut self, record: ScanRecord) {
        if self.capacity == 0 {
            return;
        }

        self.entries.push_front(record);
        self.entries.truncate(self.capacity);
    }

    pub fn latest(&self) -> Option<&ScanRecord> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanRecord> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
