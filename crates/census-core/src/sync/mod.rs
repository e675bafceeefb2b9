//! Synchronization pass engine
//!
//! A sync pass over one resource collection runs in two phases against the
//! same scope and timestamp: [`reconcile`] the observed batch first, then
//! [`sweep`] to retire whatever the pass did not refresh. Sweeping before
//! the batch finishes would mark live resources deleted. Job lifecycle
//! bookkeeping ([`upsert_job`]) is independent of both.

mod jobs;
mod reconcile;
mod sweep;

pub use jobs::upsert_job;
pub use reconcile::{reconcile, PassStats};
pub use sweep::sweep;
