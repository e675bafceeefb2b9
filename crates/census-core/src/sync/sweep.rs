//! Soft-delete sweep for records missed by a pass

use serde_json::Value;

use crate::db::{Collection, Document, Filter};
use crate::error::Result;
use crate::models::{ResourceState, FIELD_DELETED, FIELD_TIMESTAMP};

/// Mark every record in scope whose `Timestamp` was not refreshed by the
/// given pass as deleted, including records that never carried a timestamp.
///
/// Returns the number of records swept. Absence from the observed set is
/// the only deletion signal there is, so this must run strictly after
/// [`reconcile`](crate::sync::reconcile) has processed the full batch for
/// the same scope and timestamp; records the reconciler has not reached
/// yet would be swept as stale.
pub async fn sweep(collection: &Collection, scope: &Filter, timestamp: i64) -> Result<u64> {
    let filter = scope
        .clone()
        .and_ne(FIELD_TIMESTAMP, Value::from(timestamp));

    let mut patch = Document::new();
    patch.insert(
        FIELD_DELETED.to_string(),
        Value::from(i64::from(ResourceState::Deleted)),
    );

    let swept = collection.update_many(&filter, &patch).await?;
    tracing::debug!(
        "swept '{}': {} record(s) marked deleted",
        collection.name(),
        swept
    );
    Ok(swept)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::config::StoreConfig;
    use crate::db::Store;
    use crate::models::ResourceRecord;
    use crate::sync::reconcile;

    async fn collection() -> Collection {
        let config = StoreConfig {
            connect_uri: ":memory:".to_string(),
            ..StoreConfig::default()
        };
        let store = Store::connect(&config).await.unwrap();
        store.collection("instances").await.unwrap()
    }

    async fn stored(collection: &Collection) -> Vec<ResourceRecord> {
        collection
            .find(&Filter::new())
            .await
            .unwrap()
            .into_iter()
            .map(|document| ResourceRecord::from_document(document).unwrap())
            .collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sweeps_records_not_refreshed_by_the_pass() {
        let collection = collection().await;
        let first = vec![ResourceRecord::new("a", "c1"), ResourceRecord::new("b", "c2")];
        reconcile(&collection, &Filter::new(), 1, &first)
            .await
            .unwrap();

        // second pass no longer observes "b"
        reconcile(
            &collection,
            &Filter::new(),
            2,
            &[ResourceRecord::new("a", "c1")],
        )
        .await
        .unwrap();
        let swept = sweep(&collection, &Filter::new(), 2).await.unwrap();
        assert_eq!(swept, 1);

        let records = stored(&collection).await;
        assert!(!records[0].is_deleted());
        assert!(records[1].is_deleted());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn matching_timestamp_is_left_untouched() {
        let collection = collection().await;
        reconcile(
            &collection,
            &Filter::new(),
            5,
            &[ResourceRecord::new("a", "c1")],
        )
        .await
        .unwrap();
        let before = stored(&collection).await;

        let swept = sweep(&collection, &Filter::new(), 5).await.unwrap();
        assert_eq!(swept, 0);
        assert_eq!(stored(&collection).await, before);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stale_timestamp_is_swept() {
        let collection = collection().await;
        reconcile(
            &collection,
            &Filter::new(),
            5,
            &[ResourceRecord::new("a", "c1")],
        )
        .await
        .unwrap();

        let swept = sweep(&collection, &Filter::new(), 6).await.unwrap();
        assert_eq!(swept, 1);
        assert!(stored(&collection).await[0].is_deleted());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn records_without_a_timestamp_are_swept() {
        let collection = collection().await;
        collection
            .insert_one(&ResourceRecord::new("legacy", "c0").to_document().unwrap())
            .await
            .unwrap();

        let swept = sweep(&collection, &Filter::new(), 1).await.unwrap();
        assert_eq!(swept, 1);
        assert!(stored(&collection).await[0].is_deleted());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sweep_respects_the_scope_query() {
        let collection = collection().await;
        for (index, region) in [("a", "eu-1"), ("b", "us-1")] {
            collection
                .insert_one(
                    &ResourceRecord::new(index, "c1")
                        .with_field("Region", json!(region))
                        .to_document()
                        .unwrap(),
                )
                .await
                .unwrap();
        }

        let scope = Filter::new().and_eq("Region", json!("eu-1"));
        let swept = sweep(&collection, &scope, 9).await.unwrap();
        assert_eq!(swept, 1);

        let records = stored(&collection).await;
        assert!(records[0].is_deleted());
        assert!(!records[1].is_deleted());
    }
}
