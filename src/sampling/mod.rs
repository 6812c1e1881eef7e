//! Cardinality sampling
//!
//! Both samplers are O(1) amortised per update and only ever estimate.
//! Callers must not treat a [`SampleResult`] as an exact count.

/// Distinct-value sampler over string forms
pub mod non_unique;

/// Running-total sampler
pub mod unique;

pub use non_unique::NonUniqueSampler;
pub use unique::UniqueSampler;

/// Estimate written by a sampler
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleResult {
    /// Estimated number of distinct values
    pub unique: u64,
    /// Estimated number of indexed entries
    pub size: u64,
}
