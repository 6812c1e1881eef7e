//! Distinct-value sampler
//!
//! Values are counted by a 64-bit hash of their string form, so memory stays
//! bounded by the buffer size no matter how many distinct values pass
//! through. Once the buffer holds `buffer_size` distinct hashes it is folded
//! into running totals as one step and cleared. Distinct counts are only
//! exact within a step: a value recurring in several steps is counted once
//! per step.

use super::SampleResult;
use ahash::{AHashMap, RandomState};

// Fixed seeds keep the histogram keys stable across runs.
const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Approximate distinct-value and size sampler
#[derive(Clone, Debug)]
pub struct NonUniqueSampler {
    buffer_size: usize,
    hasher: RandomState,
    histogram: AHashMap<u64, u64>,
    buffered: u64,
    steps: u64,
    accumulated_unique: u64,
    accumulated_size: u64,
}

impl NonUniqueSampler {
    /// Create a sampler folding every `buffer_size` distinct values
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            hasher: RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]),
            histogram: AHashMap::new(),
            buffered: 0,
            steps: 0,
            accumulated_unique: 0,
            accumulated_size: 0,
        }
    }

    /// Count one occurrence of `value`
    pub fn include(&mut self, value: &str) {
        if self.histogram.len() >= self.buffer_size {
            self.next_step();
        }
        let key = self.hasher.hash_one(value);
        *self.histogram.entry(key).or_insert(0) += 1;
        self.buffered += 1;
    }

    /// Forget one occurrence of `value`.
    ///
    /// Occurrences already folded into a step cannot be taken back; those
    /// excludes are dropped.
    pub fn exclude(&mut self, value: &str) {
        let key = self.hasher.hash_one(value);
        if let Some(count) = self.histogram.get_mut(&key) {
            *count -= 1;
            self.buffered -= 1;
            if *count == 0 {
                self.histogram.remove(&key);
            }
        }
    }

    /// Whole-index estimate over every completed step plus the partially
    /// filled buffer.
    ///
    /// `size` is the total number of sampled entries; `unique` sums the
    /// distinct count of each step.
    pub fn result(&self) -> SampleResult {
        SampleResult {
            unique: self.accumulated_unique + self.histogram.len() as u64,
            size: self.accumulated_size + self.buffered,
        }
    }

    /// Average distinct count and size of one step, counting the partial one
    pub fn per_step(&self) -> SampleResult {
        let partial = u64::from(!self.histogram.is_empty());
        let steps = self.steps + partial;
        if steps == 0 {
            return SampleResult::default();
        }
        let total = self.result();
        SampleResult { unique: total.unique / steps, size: total.size / steps }
    }

    /// Number of completed steps
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Reset to an empty sampler, keeping the buffer size
    pub fn clear(&mut self) {
        self.histogram.clear();
        self.buffered = 0;
        self.steps = 0;
        self.accumulated_unique = 0;
        self.accumulated_size = 0;
    }

    fn next_step(&mut self) {
        self.accumulated_unique += self.histogram.len() as u64;
        self.accumulated_size += self.buffered;
        self.steps += 1;
        self.histogram.clear();
        self.buffered = 0;
    }
}

impl Default for NonUniqueSampler {
    fn default() -> Self {
        Self::new(crate::core::config::DEFAULT_SAMPLE_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sampler_reports_zero() {
        assert_eq!(NonUniqueSampler::new(10).result(), SampleResult::default());
    }

    #[test]
    fn counts_distinct_and_total() {
        let mut s = NonUniqueSampler::new(100);
        for v in ["a", "b", "a", "c", "a"] {
            s.include(v);
        }
        assert_eq!(s.result(), SampleResult { unique: 3, size: 5 });
    }

    #[test]
    fn exclude_is_symmetric() {
        let mut s = NonUniqueSampler::new(100);
        s.include("a");
        s.include("a");
        s.include("b");
        s.exclude("a");
        assert_eq!(s.result(), SampleResult { unique: 2, size: 2 });
        s.exclude("b");
        assert_eq!(s.result(), SampleResult { unique: 1, size: 1 });
        // Unknown values are ignored
        s.exclude("zzz");
        assert_eq!(s.result(), SampleResult { unique: 1, size: 1 });
    }

    #[test]
    fn full_buffer_is_folded_into_a_step() {
        let mut s = NonUniqueSampler::new(4);
        for i in 0..8 {
            s.include(&i.to_string());
        }
        // 4 distinct in the first step, 4 buffered
        assert_eq!(s.steps(), 1);
        assert_eq!(s.result(), SampleResult { unique: 8, size: 8 });
        assert_eq!(s.per_step(), SampleResult { unique: 4, size: 4 });
    }

    #[test]
    fn size_keeps_growing_past_the_buffer() {
        let mut s = NonUniqueSampler::new(1000);
        let mut last = 0;
        for i in 0..2500 {
            s.include(&i.to_string());
            let size = s.result().size;
            assert_eq!(size, last + 1);
            last = size;
        }
        assert_eq!(s.steps(), 2);
        assert_eq!(s.result(), SampleResult { unique: 2500, size: 2500 });
    }

    #[test]
    fn repeats_within_a_step_count_once() {
        let mut s = NonUniqueSampler::new(3);
        for v in ["a", "a", "b", "c", "a", "b"] {
            s.include(v);
        }
        // "a" "b" "c" fill the first step; "a" "b" are counted again in the second
        assert_eq!(s.steps(), 1);
        assert_eq!(s.result(), SampleResult { unique: 5, size: 6 });
    }

    #[test]
    fn result_does_not_mutate() {
        let mut s = NonUniqueSampler::new(1000);
        for i in 0..1000 {
            s.include(&i.to_string());
        }
        assert_eq!(s.result(), SampleResult { unique: 1000, size: 1000 });
        assert_eq!(s.result(), SampleResult { unique: 1000, size: 1000 });
        assert_eq!(s.steps(), 0);
    }

    #[test]
    fn clear_resets() {
        let mut s = NonUniqueSampler::new(2);
        for v in ["a", "b", "c"] {
            s.include(v);
        }
        s.clear();
        assert_eq!(s.steps(), 0);
        assert_eq!(s.result(), SampleResult::default());
    }
}
