//! Sync job lifecycle tracking

use serde_json::Value;
use uuid::Uuid;

use crate::db::{Collection, Document, Filter};
use crate::error::Result;
use crate::models::{SyncJob, FIELD_END_AT, FIELD_INDEX, FIELD_STATUS};

/// Create or advance a job record, keyed by its stable index.
///
/// A job carrying a known index gets a progress update: only `Status` and
/// `EndAt` change, everything else is immutable once created. Any other
/// call (index absent, empty, or unknown to the store) inserts a full
/// record under a freshly generated index. Either way the returned index
/// is the authoritative one for subsequent calls.
pub async fn upsert_job(collection: &Collection, job: &SyncJob) -> Result<String> {
    if let Some(index) = job.index.as_deref().filter(|index| !index.is_empty()) {
        let filter = Filter::new().and_eq(FIELD_INDEX, Value::String(index.to_string()));
        if !collection.find(&filter).await?.is_empty() {
            let mut patch = Document::new();
            patch.insert(FIELD_STATUS.to_string(), serde_json::to_value(job.status)?);
            if let Some(end_at) = job.end_at {
                patch.insert(FIELD_END_AT.to_string(), Value::from(end_at));
            }
            collection.update_one(&filter, &patch).await?;
            tracing::debug!("job '{index}' advanced to {}", job.status.as_str());
            return Ok(index.to_string());
        }
    }

    let index = Uuid::now_v7().to_string();
    let mut record = job.clone();
    record.index = Some(index.clone());
    collection.insert_one(&record.to_document()?).await?;
    tracing::debug!("job '{index}' created as {}", job.status.as_str());
    Ok(index)
}
