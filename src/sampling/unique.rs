//! Running-total sampler

use super::SampleResult;

/// Counts every successfully indexed entry; each one is assumed unique
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UniqueSampler {
    count: u64,
}

impl UniqueSampler {
    /// Create an empty sampler
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `n` more entries
    pub fn increment(&mut self, n: u64) {
        self.count += n;
    }

    /// Both halves of the result are the running total
    pub fn result(&self) -> SampleResult {
        SampleResult { unique: self.count, size: self.count }
    }

    /// Reset to zero
    pub fn clear(&mut self) {
        self.count = 0;
    }
}
