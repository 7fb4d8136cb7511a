//! Per-job descriptor files under the jobs root.
//!
//! `<jobs_root>/<job>/subject.xml` and `artifacts.xml` are written by the
//! job producer; `tf-dispatch.xml` is written here after a successful
//! submission.

use std::fs;
use std::path::{Path, PathBuf};

use gacek_core::dispatch::DispatchRecord;
use gacek_core::error::CoreError;
use gacek_core::subject::{parse_artifacts, parse_subject, Subject, SubjectArtifact};
use gacek_core::types::JobName;

use crate::QueueError;

pub const SUBJECT_FILE: &str = "subject.xml";
pub const ARTIFACTS_FILE: &str = "artifacts.xml";
pub const DISPATCH_FILE: &str = "tf-dispatch.xml";

/// Handle on the jobs root directory.
#[derive(Debug, Clone)]
pub struct JobStore {
    root: PathBuf,
}

impl JobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn job_dir(&self, job: &JobName) -> PathBuf {
        self.root.join(job.as_str())
    }

    /// Load the job's test subject.
    pub fn read_subject(&self, job: &JobName) -> Result<Subject, QueueError> {
        self.read_document(job, SUBJECT_FILE, parse_subject)
    }

    /// Load the job's artifact list in document order.
    pub fn read_artifacts(&self, job: &JobName) -> Result<Vec<SubjectArtifact>, QueueError> {
        self.read_document(job, ARTIFACTS_FILE, parse_artifacts)
    }

    /// Persist the Testing Farm request id for `job`.
    pub fn write_dispatch_record(
        &self,
        job: &JobName,
        record: &DispatchRecord,
    ) -> Result<(), QueueError> {
        let path = self.job_dir(job).join(DISPATCH_FILE);
        let xml = record.to_xml().map_err(|source| QueueError::Markup {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, xml).map_err(|e| QueueError::io("write", &path, e))?;

        tracing::debug!(job = %job, path = %path.display(), "Dispatch record written");
        Ok(())
    }

    /// Read back a previously written dispatch record.
    pub fn read_dispatch_record(&self, job: &JobName) -> Result<DispatchRecord, QueueError> {
        self.read_document(job, DISPATCH_FILE, DispatchRecord::from_xml)
    }

    fn read_document<T>(
        &self,
        job: &JobName,
        file_name: &str,
        parse: impl FnOnce(&str) -> Result<T, CoreError>,
    ) -> Result<T, QueueError> {
        let path = self.job_dir(job).join(file_name);
        let text = fs::read_to_string(&path).map_err(|e| QueueError::io("read", &path, e))?;
        parse(&text).map_err(|source| QueueError::Markup { path, source })
    }
}
