//! Data models for Census

mod job;
mod record;

pub use job::{JobStatus, SyncJob, FIELD_END_AT, FIELD_STATUS};
pub use record::{
    ResourceRecord, ResourceState, FIELD_CHECKSUM, FIELD_DELETED, FIELD_INDEX, FIELD_TIMESTAMP,
};
