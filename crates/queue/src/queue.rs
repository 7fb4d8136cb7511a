//! Queue state directories: listing jobs and moving them between states.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use gacek_core::error::CoreError;
use gacek_core::types::JobName;

use crate::QueueError;

/// Lifecycle location of a job within the queue root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Waiting to be submitted.
    New,
    /// Submitted to Testing Farm, awaiting results.
    Pending,
}

impl QueueState {
    /// Name of the state's subdirectory under the queue root.
    pub fn dir_name(self) -> &'static str {
        match self {
            QueueState::New => "new",
            QueueState::Pending => "pending",
        }
    }
}

/// A raw entry name found in a state directory.
///
/// Listing never rejects a name; whether it is usable as a [`JobName`]
/// is decided per job by [`QueueEntry::job_name`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueueEntry(OsString);

impl QueueEntry {
    pub fn file_name(&self) -> &OsStr {
        &self.0
    }

    pub fn job_name(&self) -> Result<JobName, CoreError> {
        JobName::from_entry(&self.0)
    }
}

impl fmt::Display for QueueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl PartialEq<JobName> for QueueEntry {
    fn eq(&self, other: &JobName) -> bool {
        self.0.as_os_str() == OsStr::new(other.as_str())
    }
}

/// Handle on a queue root directory.
#[derive(Debug, Clone)]
pub struct JobQueue {
    root: PathBuf,
}

impl JobQueue {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the entries of jobs in `state`.
    pub fn state_dir(&self, state: QueueState) -> PathBuf {
        self.root.join(state.dir_name())
    }

    /// Entries currently in the `new` state, sorted.
    pub fn list_new(&self) -> Result<Vec<QueueEntry>, QueueError> {
        self.list(QueueState::New)
    }

    /// Entries currently in `state`, sorted.
    ///
    /// Every directory entry counts as a job regardless of its file type
    /// or name.
    pub fn list(&self, state: QueueState) -> Result<Vec<QueueEntry>, QueueError> {
        let dir = self.state_dir(state);
        let entries = fs::read_dir(&dir).map_err(|e| QueueError::io("open", &dir, e))?;

        let mut listed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| QueueError::io("read", &dir, e))?;
            listed.push(QueueEntry(entry.file_name()));
        }
        listed.sort();

        tracing::debug!(
            state = state.dir_name(),
            count = listed.len(),
            "Listed queue entries",
        );
        Ok(listed)
    }

    /// Whether `job` currently has an entry in `state`.
    pub fn contains(&self, state: QueueState, job: &JobName) -> bool {
        self.state_dir(state).join(job.as_str()).exists()
    }

    /// Move `job` from `new` to `pending`.
    ///
    /// A plain rename, so both state directories must be on the same
    /// filesystem.
    pub fn mark_pending(&self, job: &JobName) -> Result<(), QueueError> {
        let from = self.state_dir(QueueState::New).join(job.as_str());
        let to = self.state_dir(QueueState::Pending).join(job.as_str());
        fs::rename(&from, &to).map_err(|e| QueueError::io("move to pending", &from, e))?;

        tracing::info!(job = %job, "Job marked as pending");
        Ok(())
    }
}
