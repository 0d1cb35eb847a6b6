//! Entry point for the job lifecycle operations.

use std::sync::Arc;

use marea_domain::auth::User;
use marea_domain::jobs::Job;
use marea_domain::ports::{JobProvisioner, JobStore, QuotaLedger, UserDirectory};
use marea_domain::{JobError, Result};
use marea_saga::{Action, Pipeline, PipelineError, PipelineExecutor};

use crate::jobs::actions::{
    InsertJob, JobSagaParam, ProvisionJob, ReserveTeamQuota, ReserveUserQuota, TriggerCron,
    UpdateJobProv, UpdateJobRecord,
};

/// Orchestrates the job lifecycle sagas over the collaborator ports.
///
/// The service is stateless between calls; concurrent operations only
/// contend inside the ports they share.
pub struct JobService {
    store: Arc<dyn JobStore>,
    ledger: Arc<dyn QuotaLedger>,
    provisioner: Arc<dyn JobProvisioner>,
    directory: Arc<dyn UserDirectory>,
    executor: PipelineExecutor,
}

impl JobService {
    pub fn new(
        store: Arc<dyn JobStore>,
        ledger: Arc<dyn QuotaLedger>,
        provisioner: Arc<dyn JobProvisioner>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self::with_executor(store, ledger, provisioner, directory, PipelineExecutor::new())
    }

    pub fn with_executor(
        store: Arc<dyn JobStore>,
        ledger: Arc<dyn QuotaLedger>,
        provisioner: Arc<dyn JobProvisioner>,
        directory: Arc<dyn UserDirectory>,
        executor: PipelineExecutor,
    ) -> Self {
        Self {
            store,
            ledger,
            provisioner,
            directory,
            executor,
        }
    }

    /// Create `job` on behalf of `user`.
    ///
    /// Reserves team and user quota, provisions the job on the
    /// orchestrator, and persists the record, in that order. Any failure
    /// unwinds the completed steps and surfaces the original error.
    #[tracing::instrument(skip_all, fields(job = %job.name))]
    pub async fn create_job(&self, job: Job, user: User) -> Result<Job> {
        job.validate()?;

        let pipeline: Pipeline<JobSagaParam, JobError> = Pipeline::new(vec![
            Arc::new(ReserveTeamQuota::new(self.ledger.clone())) as Arc<dyn Action<_, _>>,
            Arc::new(ReserveUserQuota::new(
                self.ledger.clone(),
                self.directory.clone(),
            )),
            Arc::new(ProvisionJob::new(self.provisioner.clone())),
            Arc::new(InsertJob::new(self.store.clone())),
        ]);
        let params = [JobSagaParam::Job(job.clone()), JobSagaParam::User(user)];

        self.executor
            .execute(&pipeline, &params)
            .await
            .map_err(flatten)?;
        Ok(job)
    }

    /// Replace an existing job's definition with `job`.
    ///
    /// Fails with [`JobError::NotFound`] before any side effect when no job
    /// with that name exists. The orchestrator is updated first, then the
    /// stored record.
    #[tracing::instrument(skip_all, fields(job = %job.name))]
    pub async fn update_job(&self, job: Job) -> Result<()> {
        job.validate()?;
        self.store.get_by_name(&job.name).await?;

        let pipeline: Pipeline<JobSagaParam, JobError> = Pipeline::new(vec![
            Arc::new(UpdateJobProv::new(self.provisioner.clone())) as Arc<dyn Action<_, _>>,
            Arc::new(UpdateJobRecord::new(self.store.clone())),
        ]);
        let params = [JobSagaParam::Job(job)];

        self.executor
            .execute(&pipeline, &params)
            .await
            .map_err(flatten)?;
        Ok(())
    }

    /// Fire one immediate run of the named job.
    #[tracing::instrument(skip_all, fields(job = %name))]
    pub async fn trigger_cron(&self, name: &marea_shared::JobName) -> Result<()> {
        let job = self.store.get_by_name(name).await?;

        let pipeline: Pipeline<JobSagaParam, JobError> = Pipeline::new(vec![Arc::new(
            TriggerCron::new(self.provisioner.clone()),
        )
            as Arc<dyn Action<_, _>>]);
        let params = [JobSagaParam::Job(job)];

        self.executor
            .execute(&pipeline, &params)
            .await
            .map_err(flatten)?;
        Ok(())
    }
}

/// Collapse an executor error into the domain taxonomy. Forward errors pass
/// through untouched; the executor's own conditions map onto the closest
/// domain kinds.
fn flatten(err: PipelineError<JobError>) -> JobError {
    match err {
        PipelineError::Action(err) => err,
        cancelled @ PipelineError::Cancelled { .. } => JobError::Cancelled {
            message: cancelled.to_string(),
        },
        invalid @ PipelineError::InsufficientParams { .. } => JobError::Validation {
            message: invalid.to_string(),
        },
    }
}
