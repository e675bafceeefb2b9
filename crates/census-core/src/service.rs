//! Host-facing service facade
//!
//! Wraps one connected [`Store`] behind the three operations the host
//! drives, speaking the host's envelope format: PascalCase field names and
//! the 200/500 reply convention. Settings are consumed once at
//! construction; every later call reuses the same store handle.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::StoreConfig;
use crate::db::{Collection, Filter, Store};
use crate::error::{Error, Result};
use crate::models::{ResourceRecord, SyncJob};
use crate::sync::{reconcile, sweep, upsert_job, PassStats};

/// Reply status for a completed operation
pub const STATUS_OK: u16 = 200;
/// Reply status for a failed operation
pub const STATUS_FAILED: u16 = 500;

/// Envelope for a reconcile pass over one resource collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// Collection the resources belong to
    #[serde(rename = "Resource")]
    pub resource: String,

    /// Flat equality filter narrowing the pass's scope
    #[serde(rename = "Query", default)]
    pub query: Map<String, Value>,

    /// Pass marker stamped onto every reconciled record
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,

    /// Observed resources, processed in order
    #[serde(rename = "Input", default)]
    pub input: Vec<ResourceRecord>,
}

/// Envelope for a deletion sweep over the same scope as a reconcile pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRequest {
    #[serde(rename = "Resource")]
    pub resource: String,

    #[serde(rename = "Query", default)]
    pub query: Map<String, Value>,

    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
}

/// Envelope for a job upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Collection job records live in
    #[serde(rename = "Resource")]
    pub resource: String,

    #[serde(rename = "SyncJob")]
    pub sync_job: SyncJob,
}

/// Outcome reported back to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "Status")]
    pub status: u16,

    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub const fn ok() -> Self {
        Self {
            status: STATUS_OK,
            error: None,
        }
    }

    pub fn failed(error: &Error) -> Self {
        Self {
            status: STATUS_FAILED,
            error: Some(error.to_string()),
        }
    }

    pub const fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// The three host operations over one connected store
pub struct SyncService {
    store: Store,
}

impl SyncService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Parse the host's settings document and connect.
    pub async fn connect(settings: &Map<String, Value>) -> Result<Self> {
        let config = StoreConfig::from_settings(settings)?;
        Ok(Self::new(Store::connect(&config).await?))
    }

    /// Reconcile a batch of observed resources; see [`reconcile`].
    pub async fn reconcile(&self, request: &ReconcileRequest) -> Reply {
        match self.run_reconcile(request).await {
            Ok(stats) => {
                tracing::info!(
                    "reconciled '{}': {} inserted, {} updated, {} touched",
                    request.resource,
                    stats.inserted,
                    stats.updated,
                    stats.touched
                );
                Reply::ok()
            }
            Err(error) => Reply::failed(&error),
        }
    }

    /// Retire records the pass did not refresh; see [`sweep`].
    pub async fn sweep(&self, request: &SweepRequest) -> Reply {
        match self.run_sweep(request).await {
            Ok(swept) => {
                tracing::info!("swept '{}': {} record(s) retired", request.resource, swept);
                Reply::ok()
            }
            Err(error) => Reply::failed(&error),
        }
    }

    /// Create or advance a job record; see [`upsert_job`].
    ///
    /// Unlike the pass operations this returns the error directly; there
    /// is no partial index to report.
    pub async fn upsert_job(&self, request: &JobRequest) -> Result<String> {
        let collection = self.collection(&request.resource).await?;
        upsert_job(&collection, &request.sync_job).await
    }

    async fn run_reconcile(&self, request: &ReconcileRequest) -> Result<PassStats> {
        let collection = self.collection(&request.resource).await?;
        let scope = Filter::from_query(&request.query)?;
        reconcile(&collection, &scope, request.timestamp, &request.input).await
    }

    async fn run_sweep(&self, request: &SweepRequest) -> Result<u64> {
        let collection = self.collection(&request.resource).await?;
        let scope = Filter::from_query(&request.query)?;
        sweep(&collection, &scope, request.timestamp).await
    }

    async fn collection(&self, name: &str) -> Result<Collection> {
        self.store.collection(name).await
    }
}
