//! The dispatch loop: one sequential sweep over the `new` queue.
//!
//! Each job goes through `load -> build -> submit -> record -> move` to
//! completion before the next one starts. The dispatch record is always
//! written before the job leaves `new`; if the move then fails, the job
//! stays in `new` with a record and will be submitted again next run.

use gacek_core::dispatch::DispatchRecord;
use gacek_core::error::CoreError;
use gacek_core::types::JobName;
use gacek_queue::{JobQueue, JobStore, QueueEntry, QueueError};
use gacek_testing_farm::api::{ApiKey, TestingFarmApi, TestingFarmApiError};
use gacek_testing_farm::request::build_request;

use crate::config::{DispatcherConfig, FailurePolicy};

/// Why a single job could not be dispatched.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The queue entry's name cannot be used to address the job.
    #[error(transparent)]
    InvalidName(#[from] CoreError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Api(#[from] TestingFarmApiError),
}

/// Why a run stopped early.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The `new` queue could not be listed.
    #[error("Failed to scan queue: {0}")]
    Scan(#[source] QueueError),

    /// A job failed under [`FailurePolicy::Abort`].
    #[error("Failed to dispatch job {job}: {source}")]
    Job { job: QueueEntry, source: JobError },
}

/// A job that reached `pending`.
#[derive(Debug)]
pub struct DispatchedJob {
    pub job: JobName,
    /// Testing Farm request id recorded for the job.
    pub tf_id: String,
}

/// A job left in `new` under [`FailurePolicy::SkipJob`].
#[derive(Debug)]
pub struct FailedJob {
    pub job: QueueEntry,
    pub error: JobError,
}

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct DispatchSummary {
    pub dispatched: Vec<DispatchedJob>,
    pub failed: Vec<FailedJob>,
}

/// Moves jobs from `new` to `pending` by submitting them to Testing Farm.
pub struct Dispatcher {
    queue: JobQueue,
    store: JobStore,
    api: TestingFarmApi,
    policy: FailurePolicy,
}

impl Dispatcher {
    pub fn new(config: &DispatcherConfig, api_key: ApiKey) -> Self {
        Self::from_parts(
            JobQueue::new(&config.queues_dir),
            JobStore::new(&config.jobs_dir),
            TestingFarmApi::new(config.api_url.clone(), api_key),
            config.failure_policy,
        )
    }

    pub fn from_parts(
        queue: JobQueue,
        store: JobStore,
        api: TestingFarmApi,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            queue,
            store,
            api,
            policy,
        }
    }

    /// Dispatch every job currently in `new`, in name order.
    pub async fn run(&self) -> Result<DispatchSummary, DispatchError> {
        tracing::info!(
            api_url = %self.api.api_url(),
            queues_dir = %self.queue.root().display(),
            jobs_dir = %self.store.root().display(),
            policy = ?self.policy,
            "Dispatch started",
        );

        let entries = self.queue.list_new().map_err(DispatchError::Scan)?;
        tracing::info!(count = entries.len(), "Found new jobs");

        let mut summary = DispatchSummary::default();
        for job in entries {
            match self.dispatch_entry(&job).await {
                Ok(dispatched) => summary.dispatched.push(dispatched),
                Err(error) => match self.policy {
                    FailurePolicy::Abort => {
                        return Err(DispatchError::Job { job, source: error });
                    }
                    FailurePolicy::SkipJob => {
                        tracing::error!(job = %job, error = %error, "Job dispatch failed, skipping");
                        summary.failed.push(FailedJob { job, error });
                    }
                },
            }
        }

        tracing::info!(
            dispatched = summary.dispatched.len(),
            failed = summary.failed.len(),
            "Dispatch complete",
        );
        Ok(summary)
    }

    async fn dispatch_entry(&self, entry: &QueueEntry) -> Result<DispatchedJob, JobError> {
        let job = entry.job_name()?;
        let tf_id = self.dispatch_job(&job).await?;
        Ok(DispatchedJob { job, tf_id })
    }

    /// Take one job from `new` to `pending`, returning its Testing Farm id.
    pub async fn dispatch_job(&self, job: &JobName) -> Result<String, JobError> {
        tracing::info!(job = %job, "Attempting to dispatch job");

        let subject = self.store.read_subject(job)?;
        let artifacts = self.store.read_artifacts(job)?;
        let request = build_request(&subject, &artifacts);

        let tf_id = self.api.submit_request(&request).await?;

        self.store
            .write_dispatch_record(job, &DispatchRecord::new(tf_id.clone()))?;
        self.queue.mark_pending(job)?;

        tracing::info!(job = %job, tf_id = %tf_id, "Job dispatched");
        Ok(tf_id)
    }
}
