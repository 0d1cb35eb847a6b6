//! Recording provisioner.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use marea_domain::jobs::Job;
use marea_domain::ports::JobProvisioner;
use marea_domain::{JobError, Result};
use marea_shared::{JobName, PoolName};

/// One call observed by the [`RecordingProvisioner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionerCall {
    Ensure(JobName),
    Destroy(JobName),
    Trigger { job: JobName, pool: PoolName },
    Update(JobName),
}

#[derive(Default)]
struct Failures {
    ensure: Option<String>,
    destroy: Option<String>,
    trigger: Option<String>,
    update: Option<String>,
}

/// [`JobProvisioner`] that records every successful call instead of talking
/// to an orchestrator.
///
/// Per-operation failures can be injected, and `ensure_job` can be slowed
/// down to exercise step timeouts. Failed calls are not recorded.
#[derive(Default)]
pub struct RecordingProvisioner {
    calls: Mutex<Vec<ProvisionerCall>>,
    failures: Mutex<Failures>,
    ensure_delay: Mutex<Option<Duration>>,
}

impl RecordingProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ProvisionerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_ensure(&self, message: impl Into<String>) {
        self.failures.lock().unwrap().ensure = Some(message.into());
    }

    pub fn fail_destroy(&self, message: impl Into<String>) {
        self.failures.lock().unwrap().destroy = Some(message.into());
    }

    pub fn fail_trigger(&self, message: impl Into<String>) {
        self.failures.lock().unwrap().trigger = Some(message.into());
    }

    pub fn fail_update(&self, message: impl Into<String>) {
        self.failures.lock().unwrap().update = Some(message.into());
    }

    /// Delay every `ensure_job` call, for exercising executor timeouts.
    pub fn set_ensure_delay(&self, delay: Duration) {
        *self.ensure_delay.lock().unwrap() = Some(delay);
    }

    fn record(&self, call: ProvisionerCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(failure: &Option<String>) -> Result<()> {
        match failure {
            Some(message) => Err(JobError::Provisioner {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl JobProvisioner for RecordingProvisioner {
    async fn ensure_job(&self, job: &Job) -> Result<()> {
        let delay = *self.ensure_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Self::check(&self.failures.lock().unwrap().ensure)?;
        self.record(ProvisionerCall::Ensure(job.name.clone()));
        Ok(())
    }

    async fn destroy_job(&self, job: &Job) -> Result<()> {
        Self::check(&self.failures.lock().unwrap().destroy)?;
        self.record(ProvisionerCall::Destroy(job.name.clone()));
        Ok(())
    }

    async fn trigger_cron(&self, job: &Job, pool: &PoolName) -> Result<()> {
        Self::check(&self.failures.lock().unwrap().trigger)?;
        self.record(ProvisionerCall::Trigger {
            job: job.name.clone(),
            pool: pool.clone(),
        });
        Ok(())
    }

    async fn update_job(&self, job: &Job) -> Result<()> {
        Self::check(&self.failures.lock().unwrap().update)?;
        self.record(ProvisionerCall::Update(job.name.clone()));
        Ok(())
    }
}
