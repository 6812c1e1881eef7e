//! System monitoring and observability
//!
//! This module provides logging setup and metrics collection.

pub mod logging;
pub mod metrics;

// Re-export commonly used items
pub use logging::init_logging;
pub use metrics::IndexMetrics;
