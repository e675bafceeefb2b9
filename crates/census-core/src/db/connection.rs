//! Store bootstrap and connection management

#![allow(clippy::cast_possible_truncation)] // pool sizes fit usize on supported targets

use std::sync::Arc;

use libsql::Builder;
use tokio::sync::Semaphore;

use crate::config::StoreConfig;
use crate::db::Collection;
use crate::error::{Error, Result};

/// Connected handle to the document store.
///
/// Holds one multiplexed connection plus the permit pool bounding how many
/// operations may be in flight at once. Clones share both.
#[derive(Clone)]
pub struct Store {
    conn: libsql::Connection,
    database: String,
    permits: Arc<Semaphore>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("database", &self.database)
            .field("permits", &self.permits)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Connect to the endpoint named by `config.connect_uri` and verify it
    /// is reachable, all bounded by `config.timeout`.
    ///
    /// Local paths and `:memory:` open an embedded database; `libsql://`
    /// and `http(s)://` URIs open a remote one using `config.auth_token`.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        match tokio::time::timeout(config.timeout, Self::open(config)).await {
            Ok(store) => store,
            Err(_) => Err(Error::Connection {
                uri: config.connect_uri.clone(),
                reason: format!("connect timed out after {:?}", config.timeout),
            }),
        }
    }

    async fn open(config: &StoreConfig) -> Result<Self> {
        let uri = &config.connect_uri;
        let database = if is_remote_uri(uri) {
            let token = config.auth_token.clone().unwrap_or_default();
            Builder::new_remote(uri.clone(), token).build().await
        } else {
            Builder::new_local(uri.as_str()).build().await
        }
        .map_err(|error| connection_error(uri, &error))?;

        let conn = database
            .connect()
            .map_err(|error| connection_error(uri, &error))?;

        // Remote builders defer I/O to the first statement, so reachability
        // is only known after a ping.
        conn.query("SELECT 1", ())
            .await
            .map_err(|error| connection_error(uri, &error))?;

        tracing::debug!("connected to store at {uri}");

        Ok(Self {
            conn,
            database: config.database.clone(),
            permits: Arc::new(Semaphore::new(config.max_pool_size as usize)),
        })
    }

    /// Handle bound to a named collection under the configured database,
    /// created on first use.
    pub async fn collection(&self, name: &str) -> Result<Collection> {
        Collection::open(
            self.conn.clone(),
            Arc::clone(&self.permits),
            &self.database,
            name,
        )
        .await
    }

    /// Logical database namespace this store was configured with.
    pub fn database(&self) -> &str {
        &self.database
    }
}

fn is_remote_uri(uri: &str) -> bool {
    uri.starts_with("libsql://") || uri.starts_with("http://") || uri.starts_with("https://")
}

fn connection_error(uri: &str, error: &libsql::Error) -> Error {
    Error::Connection {
        uri: uri.to_string(),
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::db::{to_document, Filter};

    fn in_memory_config() -> StoreConfig {
        StoreConfig {
            connect_uri: ":memory:".to_string(),
            ..StoreConfig::default()
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn connects_in_memory() {
        let store = Store::connect(&in_memory_config()).await.unwrap();
        assert_eq!(store.database(), "inventory");
        store.collection("instances").await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_path_is_a_connection_error() {
        let config = StoreConfig {
            connect_uri: "/nonexistent/census/census.db".to_string(),
            ..StoreConfig::default()
        };
        let error = Store::connect(&config).await.unwrap_err();
        assert!(matches!(error, Error::Connection { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn local_file_persists_across_connections() {
        let dir = tempdir().unwrap();
        let config = StoreConfig {
            connect_uri: dir.path().join("census.db").to_string_lossy().to_string(),
            ..StoreConfig::default()
        };

        let store = Store::connect(&config).await.unwrap();
        let collection = store.collection("instances").await.unwrap();
        collection
            .insert_one(&to_document(&json!({"Index": "a"})).unwrap())
            .await
            .unwrap();
        drop(collection);
        drop(store);

        let store = Store::connect(&config).await.unwrap();
        let collection = store.collection("instances").await.unwrap();
        let found = collection.find(&Filter::new()).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn databases_namespace_their_collections() {
        let dir = tempdir().unwrap();
        let uri = dir.path().join("census.db").to_string_lossy().to_string();
        let staging = StoreConfig {
            connect_uri: uri.clone(),
            database: "staging".to_string(),
            ..StoreConfig::default()
        };
        let production = StoreConfig {
            connect_uri: uri,
            database: "production".to_string(),
            ..StoreConfig::default()
        };

        let staging_store = Store::connect(&staging).await.unwrap();
        let production_store = Store::connect(&production).await.unwrap();

        let collection = staging_store.collection("instances").await.unwrap();
        collection
            .insert_one(&to_document(&json!({"Index": "a"})).unwrap())
            .await
            .unwrap();

        let other = production_store.collection("instances").await.unwrap();
        assert!(other.find(&Filter::new()).await.unwrap().is_empty());
    }
}
