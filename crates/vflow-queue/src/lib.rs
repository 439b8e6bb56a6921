//! Work queue for video processing jobs.
//!
//! Redis Streams with a consumer group give the at-least-once contract the
//! pipeline needs: long-poll receive (`XREADGROUP ... BLOCK`), explicit
//! delete-on-ack (`XACK` + `XDEL`), a pending-entry list standing in for the
//! visibility timeout (`XAUTOCLAIM` recovers messages from crashed
//! consumers), and a dead-letter stream for jobs that exhausted their
//! retries.

mod error;
mod job;
mod queue;

pub use error::{QueueError, QueueResult};
pub use job::Job;
pub use queue::{JobQueue, QueueConfig};
