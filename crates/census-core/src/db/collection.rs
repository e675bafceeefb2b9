//! Collection-scoped document operations
//!
//! A collection is one table holding one JSON document per row. Patches set
//! exactly the top-level keys they carry (`json_set`); whole documents are
//! never rewritten by an update. Reads come back in insertion order so that
//! multi-match lookups stay deterministic.

use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::db::filter::{json_path, Filter};
use crate::db::Document;
use crate::error::Result;

/// Handle bound to a named collection within a store
pub struct Collection {
    conn: libsql::Connection,
    name: String,
    table: String,
    permits: Arc<Semaphore>,
}

impl Collection {
    pub(crate) async fn open(
        conn: libsql::Connection,
        permits: Arc<Semaphore>,
        database: &str,
        name: &str,
    ) -> Result<Self> {
        let table = quote_ident(&format!("{database}.{name}"));
        let index = quote_ident(&format!("{database}.{name}.Index"));
        let collection = Self {
            conn,
            name: name.to_string(),
            table,
            permits,
        };

        {
            let _permit = collection.permit().await;
            collection
                .conn
                .execute(
                    &format!(
                        "CREATE TABLE IF NOT EXISTS {} (doc TEXT NOT NULL)",
                        collection.table
                    ),
                    (),
                )
                .await?;
            collection
                .conn
                .execute(
                    &format!(
                        "CREATE INDEX IF NOT EXISTS {index} ON {} (json_extract(doc, '$.\"Index\"'))",
                        collection.table
                    ),
                    (),
                )
                .await?;
        }

        Ok(collection)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch every document matching the filter, in insertion order.
    pub async fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        let (clause, params) = filter.to_sql()?;
        let sql = format!("SELECT doc FROM {} {clause} ORDER BY rowid", self.table);

        let _permit = self.permit().await;
        let mut rows = self.conn.query(&sql, params).await?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            let raw: String = row.get(0)?;
            documents.push(serde_json::from_str(&raw)?);
        }
        Ok(documents)
    }

    /// Insert a single document.
    pub async fn insert_one(&self, document: &Document) -> Result<()> {
        let sql = format!("INSERT INTO {} (doc) VALUES (json(?))", self.table);
        let payload = serde_json::to_string(document)?;

        let _permit = self.permit().await;
        self.conn
            .execute(&sql, vec![libsql::Value::Text(payload)])
            .await?;
        Ok(())
    }

    /// Set the patch's keys on every matching document.
    ///
    /// Returns the number of documents updated. Fields outside the patch
    /// are left untouched; an empty patch updates nothing.
    pub async fn update_many(&self, filter: &Filter, patch: &Document) -> Result<u64> {
        let Some((assignment, mut params)) = patch_sql(patch)? else {
            return Ok(0);
        };
        let (clause, filter_params) = filter.to_sql()?;
        params.extend(filter_params);
        let sql = format!("UPDATE {} SET doc = {assignment} {clause}", self.table);

        let _permit = self.permit().await;
        Ok(self.conn.execute(&sql, params).await?)
    }

    /// Set the patch's keys on the oldest matching document only.
    pub async fn update_one(&self, filter: &Filter, patch: &Document) -> Result<u64> {
        let Some((assignment, mut params)) = patch_sql(patch)? else {
            return Ok(0);
        };
        let (clause, filter_params) = filter.to_sql()?;
        params.extend(filter_params);
        let sql = format!(
            "UPDATE {table} SET doc = {assignment} \
             WHERE rowid IN (SELECT rowid FROM {table} {clause} ORDER BY rowid LIMIT 1)",
            table = self.table
        );

        let _permit = self.permit().await;
        Ok(self.conn.execute(&sql, params).await?)
    }

    async fn permit(&self) -> SemaphorePermit<'_> {
        // the semaphore lives as long as the store and is never closed
        self.permits.acquire().await.expect("store permits closed")
    }
}

/// `json_set` assignment covering each patch key, values bound as JSON so
/// nested structures survive intact.
fn patch_sql(patch: &Document) -> Result<Option<(String, Vec<libsql::Value>)>> {
    if patch.is_empty() {
        return Ok(None);
    }

    let mut pairs = Vec::with_capacity(patch.len());
    let mut params = Vec::with_capacity(patch.len() * 2);
    for (field, value) in patch {
        pairs.push("?, json(?)");
        params.push(libsql::Value::Text(json_path(field)?));
        params.push(libsql::Value::Text(serde_json::to_string(value)?));
    }

    Ok(Some((
        format!("json_set(doc, {})", pairs.join(", ")),
        params,
    )))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
