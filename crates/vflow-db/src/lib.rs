//! Postgres metadata store.
//!
//! Canonical home of `VideoRecord` rows and engagement counters. Counter
//! updates are single-statement atomic increments
//! (`UPDATE ... SET views = views + 1 ... RETURNING`), so concurrent
//! recorders never lose updates the way read-modify-write JSON blobs do.

mod error;
mod repo;

pub use error::{DbError, DbResult};
pub use repo::{
    connect, DbConfig, EngagementKind, EngagementTotals, StatsSummary, VideoRepo,
};
