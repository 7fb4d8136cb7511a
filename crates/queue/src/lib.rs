//! Filesystem-backed job queue and job directory store.
//!
//! A queue root holds one subdirectory per job state (`new`, `pending`);
//! the presence of an entry in a state directory is the job's state, and
//! renaming the entry is the state transition. Job descriptors live in a
//! separate jobs root, one directory per job.

use std::io;
use std::path::PathBuf;

use gacek_core::error::CoreError;

pub mod queue;
pub mod store;

pub use queue::{JobQueue, QueueEntry, QueueState};
pub use store::JobStore;

/// Errors from queue and job directory operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// A filesystem operation failed.
    #[error("Failed to {op} {}: {source}", .path.display())]
    Io {
        /// Short verb phrase naming the operation, e.g. `read`.
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    /// A descriptor file exists but does not parse.
    #[error("{}: {source}", .path.display())]
    Markup { path: PathBuf, source: CoreError },
}

impl QueueError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}
