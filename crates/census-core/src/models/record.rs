//! Resource record model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::{from_document, to_document, Document};
use crate::error::Result;

/// Stable identifier of a resource within a collection and scope
pub const FIELD_INDEX: &str = "Index";
/// Content hash used to detect changes between passes
pub const FIELD_CHECKSUM: &str = "Checksum";
/// Sync-pass marker used for staleness detection
pub const FIELD_TIMESTAMP: &str = "Timestamp";
/// Soft-delete flag, written as 0 (active) or 1 (deleted)
pub const FIELD_DELETED: &str = "Deleted";

/// Lifecycle state of a stored resource record.
///
/// Persisted on the wire and in documents as the integers 0/1; the field is
/// absent entirely until a record is first touched or swept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum ResourceState {
    Active,
    Deleted,
}

impl From<ResourceState> for i64 {
    fn from(state: ResourceState) -> Self {
        match state {
            ResourceState::Active => 0,
            ResourceState::Deleted => 1,
        }
    }
}

impl TryFrom<i64> for ResourceState {
    type Error = String;

    fn try_from(flag: i64) -> std::result::Result<Self, Self::Error> {
        match flag {
            0 => Ok(Self::Active),
            1 => Ok(Self::Deleted),
            other => Err(format!("invalid Deleted flag: {other}")),
        }
    }
}

/// One observed external entity.
///
/// The reserved fields are typed; everything else the observer reports rides
/// along in `extra` and is passed through to the store verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(rename = "Index")]
    pub index: String,

    #[serde(rename = "Checksum", default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Stamped by the reconciler with the pass timestamp
    #[serde(rename = "Timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(rename = "Deleted", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ResourceState>,

    /// Caller-supplied fields outside the reserved set
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceRecord {
    /// Create a record carrying only the identity fields.
    pub fn new(index: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            checksum: Some(checksum.into()),
            timestamp: None,
            state: None,
            extra: Map::new(),
        }
    }

    /// Attach a pass-through field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.state == Some(ResourceState::Deleted)
    }

    pub fn to_document(&self) -> Result<Document> {
        to_document(self)
    }

    pub fn from_document(document: Document) -> Result<Self> {
        from_document(document)
    }
}
