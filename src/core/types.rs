//! Identifier types shared across the index

/// Opaque identifier of an indexed entity (a graph node id)
pub type EntityId = u64;

/// Opaque identifier the host assigns to each index
pub type IndexId = u64;
