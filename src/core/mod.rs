//! Core system types and foundations
//!
//! This module contains the fundamental building blocks of Memory Index:
//! the value model, identifiers, update events, error handling and
//! configuration.

pub mod types;
pub mod value;
pub mod update;
pub mod error;
pub mod config;

// Re-export commonly used items
pub use types::{EntityId, IndexId};
pub use value::{Number, Value, ValueKind};
pub use update::{IndexUpdate, UpdateMode};
pub use error::{Error, Result};
pub use config::IndexConfig;
