//! Checksum-driven reconciliation of observed resources

use serde_json::Value;

use crate::db::{Collection, Document, Filter};
use crate::error::Result;
use crate::models::{
    ResourceRecord, ResourceState, FIELD_CHECKSUM, FIELD_DELETED, FIELD_INDEX, FIELD_TIMESTAMP,
};

/// Per-pass outcome counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Resources seen for the first time under their scope
    pub inserted: u64,
    /// Resources whose content changed since the last pass
    pub updated: u64,
    /// Resources unchanged since the last pass, refreshed and revived
    pub touched: u64,
}

/// Reconcile a batch of observed resources against the stored state.
///
/// Resources are processed strictly in input order. Each one is stamped
/// with the pass timestamp and matched against `(scope, Index)`:
///
/// - no stored match: inserted as a new record;
/// - stored checksum differs (or is absent): the resource's fields
///   overwrite the stored record's, fields outside the resource are kept;
/// - stored checksum is identical: only `Timestamp` and `Deleted = 0` are
///   written, reviving an unchanged resource without rewriting its content.
///
/// The first store failure aborts the call; records written earlier in the
/// batch stay committed. Two concurrent calls racing on the same
/// `(scope, Index)` can both observe "no match" and insert twice; callers
/// needing the uniqueness invariant must serialize writes per scope.
pub async fn reconcile(
    collection: &Collection,
    scope: &Filter,
    timestamp: i64,
    resources: &[ResourceRecord],
) -> Result<PassStats> {
    let mut stats = PassStats::default();

    for resource in resources {
        let mut resource = resource.clone();
        resource.timestamp = Some(timestamp);

        let filter = scope
            .clone()
            .and_eq(FIELD_INDEX, Value::String(resource.index.clone()));
        let matches = collection.find(&filter).await?;

        let Some(existing) = matches.first() else {
            collection.insert_one(&resource.to_document()?).await?;
            stats.inserted += 1;
            continue;
        };
        if matches.len() > 1 {
            tracing::warn!(
                "{} records in '{}' share index '{}'; deciding against the oldest",
                matches.len(),
                collection.name(),
                resource.index
            );
        }

        let stored_checksum = existing.get(FIELD_CHECKSUM).and_then(Value::as_str);
        if stored_checksum.is_some() && stored_checksum == resource.checksum.as_deref() {
            collection
                .update_many(&filter, &touch_patch(timestamp))
                .await?;
            stats.touched += 1;
        } else {
            collection
                .update_many(&filter, &resource.to_document()?)
                .await?;
            stats.updated += 1;
        }
    }

    tracing::debug!(
        "reconciled '{}': {} inserted, {} updated, {} touched",
        collection.name(),
        stats.inserted,
        stats.updated,
        stats.touched
    );
    Ok(stats)
}

fn touch_patch(timestamp: i64) -> Document {
    let mut patch = Document::new();
    patch.insert(FIELD_TIMESTAMP.to_string(), Value::from(timestamp));
    patch.insert(
        FIELD_DELETED.to_string(),
        Value::from(i64::from(ResourceState::Active)),
    );
    patch
}
