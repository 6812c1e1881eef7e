//! Property update events consumed by the online write path
//!
//! The host decodes its own transaction changes into one [`IndexUpdate`] per
//! `(entity, property)` pair. Hosts that carry the mode and the before/after
//! values as loose fields go through [`IndexUpdate::from_parts`], which is the
//! only place an update can be rejected.

use crate::core::error::{Error, Result};
use crate::core::types::EntityId;
use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change carried by an update
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateMode {
    /// Property was set on an entity that did not have it
    Added,
    /// Property value was replaced
    Changed,
    /// Property was removed from the entity
    Removed,
}

/// A single property change to apply to an index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum IndexUpdate {
    /// Entity gained the indexed property
    Added {
        /// Entity identifier
        entity_id: EntityId,
        /// Value after the change
        after: Value,
    },
    /// Entity's indexed property changed value
    Changed {
        /// Entity identifier
        entity_id: EntityId,
        /// Value before the change
        before: Value,
        /// Value after the change
        after: Value,
    },
    /// Entity lost the indexed property
    Removed {
        /// Entity identifier
        entity_id: EntityId,
        /// Value before the change
        before: Value,
    },
}

impl IndexUpdate {
    /// Build an added update
    pub fn added(entity_id: EntityId, after: impl Into<Value>) -> Self {
        Self::Added { entity_id, after: after.into() }
    }

    /// Build a changed update
    pub fn changed(entity_id: EntityId, before: impl Into<Value>, after: impl Into<Value>) -> Self {
        Self::Changed { entity_id, before: before.into(), after: after.into() }
    }

    /// Build a removed update
    pub fn removed(entity_id: EntityId, before: impl Into<Value>) -> Self {
        Self::Removed { entity_id, before: before.into() }
    }

    /// Assemble an update from a mode and optional before/after values.
    ///
    /// Fails with [`Error::UnsupportedUpdate`] when a value the mode needs is
    /// missing.
    pub fn from_parts(
        mode: UpdateMode,
        entity_id: EntityId,
        before: Option<Value>,
        after: Option<Value>,
    ) -> Result<Self> {
        match (mode, before, after) {
            (UpdateMode::Added, _, Some(after)) => Ok(Self::Added { entity_id, after }),
            (UpdateMode::Changed, Some(before), Some(after)) => {
                Ok(Self::Changed { entity_id, before, after })
            }
            (UpdateMode::Removed, Some(before), _) => Ok(Self::Removed { entity_id, before }),
            (mode, before, after) => Err(Error::unsupported_update(format!(
                "{} update for entity {} (before: {}, after: {})",
                mode,
                entity_id,
                if before.is_some() { "present" } else { "missing" },
                if after.is_some() { "present" } else { "missing" },
            ))),
        }
    }

    /// Mode of this update
    pub fn mode(&self) -> UpdateMode {
        match self {
            Self::Added { .. } => UpdateMode::Added,
            Self::Changed { .. } => UpdateMode::Changed,
            Self::Removed { .. } => UpdateMode::Removed,
        }
    }

    /// Entity this update applies to
    pub fn entity_id(&self) -> EntityId {
        match self {
            Self::Added { entity_id, .. }
            | Self::Changed { entity_id, .. }
            | Self::Removed { entity_id, .. } => *entity_id,
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateMode::Added => "added",
            UpdateMode::Changed => "changed",
            UpdateMode::Removed => "removed",
        };
        f.write_str(name)
    }
}
