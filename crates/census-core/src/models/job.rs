//! Sync job record model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::{from_document, to_document, Document};
use crate::error::Result;

/// Field updated on every job progress transition
pub const FIELD_STATUS: &str = "Status";
/// Completion marker, set when the caller reports one
pub const FIELD_END_AT: &str = "EndAt";

/// Caller-reported state of a sync job.
///
/// The tracker records whatever the caller passes and enforces no
/// transition legality; the enum only types the states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Created,
    Running,
    Ended,
}

impl JobStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Ended => "ended",
        }
    }
}

/// One execution of a synchronization pass.
///
/// `index` correlates every call belonging to the same execution: absent (or
/// empty) on the first call, the tracker generates one; on later calls the
/// caller passes it back and only `status`/`end_at` advance. The remaining
/// fields are immutable once the record exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncJob {
    #[serde(rename = "Index", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,

    #[serde(rename = "Status")]
    pub status: JobStatus,

    /// Job category, e.g. a scheduler or trigger name
    #[serde(rename = "Type")]
    pub kind: String,

    /// Resource kind this job synchronizes
    #[serde(rename = "Resource")]
    pub resource: String,

    /// Opaque job payload passed through verbatim
    #[serde(rename = "Value", default)]
    pub value: Value,

    #[serde(rename = "StartAt")]
    pub start_at: i64,

    #[serde(rename = "EndAt", default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<i64>,
}

impl SyncJob {
    /// Create a freshly started job with no index assigned yet.
    pub fn new(kind: impl Into<String>, resource: impl Into<String>, start_at: i64) -> Self {
        Self {
            index: None,
            status: JobStatus::Created,
            kind: kind.into(),
            resource: resource.into(),
            value: Value::Null,
            start_at,
            end_at: None,
        }
    }

    pub fn to_document(&self) -> Result<Document> {
        to_document(self)
    }

    pub fn from_document(document: Document) -> Result<Self> {
        from_document(document)
    }
}
