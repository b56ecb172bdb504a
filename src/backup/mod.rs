//! Pre-apply backups and pending-change exports
//!
//! Both artifacts are [`Snapshot`]s rendered in the registry-export text
//! format (see [`codec`]). Backups hold the values a batch is about to
//! overwrite; exports hold the staged values themselves.

pub mod codec;
mod snapshot;
mod writer;

pub use snapshot::{Snapshot, SnapshotEntry};
pub use writer::{BackupRecord, read_snapshot, write_snapshot};
