//! census-core - Core library for Census
//!
//! Reconciles externally observed resource snapshots with persisted state
//! in a document store: checksum-driven insert/update/touch decisions per
//! resource, a soft-delete sweep retiring records missed by the current
//! pass, and idempotent upsert of sync-job records keyed by a stable index.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod sync;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use models::{JobStatus, ResourceRecord, ResourceState, SyncJob};
pub use service::{JobRequest, ReconcileRequest, Reply, SweepRequest, SyncService};
