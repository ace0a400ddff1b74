use codescan_core::ScanResult;
use std::collections::VecDeque;

/// Most recent scan results, newest first.
#[derive(Debug)]
pub struct ScanHistory {
    entries: VecDeque<ScanResult>,
    limit: usize,
    total: usize,
}

impl ScanHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
            total: 0,
        }
    }

    pub fn push(&mut self, result: ScanResult) {
        self.entries.push_front(result);
        self.entries.truncate(self.limit);
        self.total += 1;
    }

    /// Results recorded since start, including evicted ones.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
