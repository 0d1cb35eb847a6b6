//! Compensable actions composing the job lifecycle pipelines.
//!
//! Every action reads its inputs from the shared parameter list and records
//! in its forward result exactly what it changed, so its backward call can
//! undo that change and nothing else. Actions keep no state of their own
//! between runs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use marea_domain::auth::User;
use marea_domain::jobs::Job;
use marea_domain::ports::{JobProvisioner, JobStore, QuotaLedger, UserDirectory};
use marea_domain::quota::QuotaEntity;
use marea_domain::{JobError, Result};
use marea_saga::{Action, BwContext, FwContext, FwResult};

/// Parameter of a job lifecycle pipeline.
///
/// The job travels in position 0; operations that act on behalf of an
/// identity carry the user in position 1.
#[derive(Debug, Clone)]
pub enum JobSagaParam {
    Job(Job),
    User(User),
}

fn job_param(params: &[JobSagaParam]) -> Result<&Job> {
    match params.first() {
        Some(JobSagaParam::Job(job)) => Ok(job),
        _ => Err(JobError::Validation {
            message: "first parameter must be a job".to_string(),
        }),
    }
}

fn user_param(params: &[JobSagaParam]) -> Result<&User> {
    match params.get(1) {
        Some(JobSagaParam::User(user)) => Ok(user),
        _ => Err(JobError::Validation {
            message: "second parameter must be a user".to_string(),
        }),
    }
}

fn encode_job(job: &Job) -> Result<Value> {
    serde_json::to_value(job).map_err(|e| JobError::Store {
        message: format!("encode job record: {e}"),
    })
}

/// Charges one job against the owning team's quota.
///
/// The forward result records which team was charged; backward releases the
/// charge only when that record is present.
pub struct ReserveTeamQuota {
    ledger: Arc<dyn QuotaLedger>,
}

impl ReserveTeamQuota {
    pub fn new(ledger: Arc<dyn QuotaLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Action<JobSagaParam, JobError> for ReserveTeamQuota {
    fn name(&self) -> &'static str {
        "reserve-team-quota"
    }

    fn min_params(&self) -> usize {
        2
    }

    async fn forward(&self, ctx: FwContext<'_, JobSagaParam>) -> Result<FwResult> {
        let job = job_param(ctx.params)?;
        self.ledger
            .increment(&QuotaEntity::team(&job.team_owner), 1)
            .await?;
        Ok(json!({
            "job": job.name.as_str(),
            "team": job.team_owner.as_str(),
        }))
    }

    async fn backward(&self, ctx: BwContext<'_, JobSagaParam>) -> Result<()> {
        let Some(team) = ctx.fw_result.get("team").and_then(Value::as_str) else {
            return Ok(());
        };
        self.ledger
            .increment(&QuotaEntity::team(&team.into()), -1)
            .await
    }

    fn has_backward(&self) -> bool {
        true
    }
}

/// Charges one job against the acting user's quota.
///
/// Identities derived from a shared team token are exempt: for them forward
/// charges nothing and records no user, so backward is naturally a no-op.
/// For individual users the recorded email is resolved back through the
/// directory during compensation.
pub struct ReserveUserQuota {
    ledger: Arc<dyn QuotaLedger>,
    directory: Arc<dyn UserDirectory>,
}

impl ReserveUserQuota {
    pub fn new(ledger: Arc<dyn QuotaLedger>, directory: Arc<dyn UserDirectory>) -> Self {
        Self { ledger, directory }
    }
}

#[async_trait]
impl Action<JobSagaParam, JobError> for ReserveUserQuota {
    fn name(&self) -> &'static str {
        "reserve-user-quota"
    }

    fn min_params(&self) -> usize {
        2
    }

    async fn forward(&self, ctx: FwContext<'_, JobSagaParam>) -> Result<FwResult> {
        let job = job_param(ctx.params)?;
        let user = user_param(ctx.params)?;
        if user.from_token {
            return Ok(json!({ "job": job.name.as_str() }));
        }
        self.ledger.increment(&QuotaEntity::user(user), 1).await?;
        Ok(json!({
            "job": job.name.as_str(),
            "user": user.email,
        }))
    }

    async fn backward(&self, ctx: BwContext<'_, JobSagaParam>) -> Result<()> {
        let Some(email) = ctx.fw_result.get("user").and_then(Value::as_str) else {
            return Ok(());
        };
        let user = self.directory.lookup_user_by_email(email).await?;
        self.ledger.increment(&QuotaEntity::user(&user), -1).await
    }

    fn has_backward(&self) -> bool {
        true
    }
}

/// Materializes the job on the orchestrator; backward tears it down.
pub struct ProvisionJob {
    provisioner: Arc<dyn JobProvisioner>,
}

impl ProvisionJob {
    pub fn new(provisioner: Arc<dyn JobProvisioner>) -> Self {
        Self { provisioner }
    }
}

#[async_trait]
impl Action<JobSagaParam, JobError> for ProvisionJob {
    fn name(&self) -> &'static str {
        "provision-job"
    }

    fn min_params(&self) -> usize {
        1
    }

    async fn forward(&self, ctx: FwContext<'_, JobSagaParam>) -> Result<FwResult> {
        let job = job_param(ctx.params)?;
        self.provisioner.ensure_job(job).await?;
        Ok(Value::Null)
    }

    async fn backward(&self, ctx: BwContext<'_, JobSagaParam>) -> Result<()> {
        let job = job_param(ctx.params)?;
        self.provisioner.destroy_job(job).await
    }

    fn has_backward(&self) -> bool {
        true
    }
}

/// Persists the job record; backward removes it again.
pub struct InsertJob {
    store: Arc<dyn JobStore>,
}

impl InsertJob {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action<JobSagaParam, JobError> for InsertJob {
    fn name(&self) -> &'static str {
        "insert-job"
    }

    fn min_params(&self) -> usize {
        1
    }

    async fn forward(&self, ctx: FwContext<'_, JobSagaParam>) -> Result<FwResult> {
        let job = job_param(ctx.params)?;
        self.store.insert_if_absent(job).await?;
        encode_job(job)
    }

    // Compensation removes the record captured in the forward result, not
    // whatever the parameter list currently says.
    async fn backward(&self, ctx: BwContext<'_, JobSagaParam>) -> Result<()> {
        let inserted: Job =
            serde_json::from_value(ctx.fw_result.clone()).map_err(|e| JobError::Store {
                message: format!("decode recorded job record: {e}"),
            })?;
        self.store.remove_by_name(&inserted.name).await
    }

    fn has_backward(&self) -> bool {
        true
    }
}

/// Pushes the changed definition to the orchestrator. There is no
/// compensation: the orchestrator-side update is an idempotent upsert and
/// the previous definition is not recoverable from here.
pub struct UpdateJobProv {
    provisioner: Arc<dyn JobProvisioner>,
}

impl UpdateJobProv {
    pub fn new(provisioner: Arc<dyn JobProvisioner>) -> Self {
        Self { provisioner }
    }
}

#[async_trait]
impl Action<JobSagaParam, JobError> for UpdateJobProv {
    fn name(&self) -> &'static str {
        "update-job-prov"
    }

    fn min_params(&self) -> usize {
        1
    }

    async fn forward(&self, ctx: FwContext<'_, JobSagaParam>) -> Result<FwResult> {
        let job = job_param(ctx.params)?;
        self.provisioner.update_job(job).await?;
        Ok(Value::Null)
    }
}

/// Overwrites the stored record with the new definition.
///
/// The current record is read first: an identical record skips the write
/// entirely, and a read failure is logged but does not stop the update.
/// The forward result carries the previous record when one was read, so
/// backward can restore it; after a failed read there is nothing to restore.
///
/// The read and the write are not guarded against a concurrent writer; the
/// last write wins.
pub struct UpdateJobRecord {
    store: Arc<dyn JobStore>,
}

impl UpdateJobRecord {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Action<JobSagaParam, JobError> for UpdateJobRecord {
    fn name(&self) -> &'static str {
        "update-job-record"
    }

    fn min_params(&self) -> usize {
        1
    }

    async fn forward(&self, ctx: FwContext<'_, JobSagaParam>) -> Result<FwResult> {
        let job = job_param(ctx.params)?;
        match self.store.get_by_name(&job.name).await {
            Ok(old) if old == *job => encode_job(&old),
            Ok(old) => {
                self.store.replace_by_name(job).await?;
                encode_job(&old)
            }
            Err(err) => {
                tracing::warn!(
                    job = %job.name,
                    error = %err,
                    "could not read current job record, writing anyway"
                );
                self.store.replace_by_name(job).await?;
                Ok(Value::Null)
            }
        }
    }

    async fn backward(&self, ctx: BwContext<'_, JobSagaParam>) -> Result<()> {
        if ctx.fw_result.is_null() {
            return Ok(());
        }
        let old: Job =
            serde_json::from_value(ctx.fw_result.clone()).map_err(|e| JobError::Store {
                message: format!("decode recorded job record: {e}"),
            })?;
        self.store.replace_by_name(&old).await
    }

    fn has_backward(&self) -> bool {
        true
    }
}

/// Fires one immediate run of the job on its pool. Triggering is not
/// compensable: a run that started cannot be unstarted.
pub struct TriggerCron {
    provisioner: Arc<dyn JobProvisioner>,
}

impl TriggerCron {
    pub fn new(provisioner: Arc<dyn JobProvisioner>) -> Self {
        Self { provisioner }
    }
}

#[async_trait]
impl Action<JobSagaParam, JobError> for TriggerCron {
    fn name(&self) -> &'static str {
        "trigger-cron"
    }

    fn min_params(&self) -> usize {
        1
    }

    async fn forward(&self, ctx: FwContext<'_, JobSagaParam>) -> Result<FwResult> {
        let job = job_param(ctx.params)?;
        self.provisioner.trigger_cron(job, &job.pool).await?;
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_positional() {
        let params = [JobSagaParam::User(User::new("u-1", "dev@example.com"))];
        assert!(matches!(
            job_param(&params),
            Err(JobError::Validation { .. })
        ));
        assert!(matches!(
            user_param(&params),
            Err(JobError::Validation { .. })
        ));
    }

    #[test]
    fn empty_params_are_rejected() {
        assert!(job_param(&[]).is_err());
        assert!(user_param(&[]).is_err());
    }
}
