//! Collaborator ports the lifecycle sagas orchestrate.
//!
//! The sagas only ever see these traits as `Arc<dyn _>`; the concrete
//! adapters live in the infrastructure crate. Every method is fallible and
//! maps its adapter's failure into the shared [`JobError`] taxonomy so that
//! forward errors reach the caller verbatim in kind.

use crate::auth::User;
use crate::error::Result;
use crate::jobs::Job;
use crate::quota::QuotaEntity;
use async_trait::async_trait;
use marea_shared::{JobName, PoolName};

/// Driver for the container orchestrator that materializes jobs.
///
/// `ensure_job` and `update_job` are expected to be idempotent upserts of
/// the orchestrator-side resource; `destroy_job` of an absent resource must
/// succeed so that compensation can always run.
#[async_trait]
pub trait JobProvisioner: Send + Sync {
    /// Create or update the orchestrator resource backing `job`.
    async fn ensure_job(&self, job: &Job) -> Result<()>;

    /// Tear down the orchestrator resource backing `job`, if any.
    async fn destroy_job(&self, job: &Job) -> Result<()>;

    /// Fire one immediate run of `job` on `pool`.
    async fn trigger_cron(&self, job: &Job, pool: &PoolName) -> Result<()>;

    /// Push a changed definition of an existing job to the orchestrator.
    async fn update_job(&self, job: &Job) -> Result<()>;
}

/// Durable store of job records, keyed by name.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch the record named `name`, or [`JobError::NotFound`].
    ///
    /// [`JobError::NotFound`]: crate::error::JobError::NotFound
    async fn get_by_name(&self, name: &JobName) -> Result<Job>;

    /// Insert `job` if no record with its name exists, otherwise fail with
    /// [`JobError::AlreadyExists`]. The check and the insert are a single
    /// atomic operation.
    ///
    /// [`JobError::AlreadyExists`]: crate::error::JobError::AlreadyExists
    async fn insert_if_absent(&self, job: &Job) -> Result<()>;

    /// Overwrite the record named after `job` with `job`'s full state.
    async fn replace_by_name(&self, job: &Job) -> Result<()>;

    /// Delete the record named `name`. Removing an absent record succeeds,
    /// so compensation of a partially applied insert is always safe.
    async fn remove_by_name(&self, name: &JobName) -> Result<()>;
}

/// Per-entity usage counters with fixed ceilings.
#[async_trait]
pub trait QuotaLedger: Send + Sync {
    /// Adjust `entity`'s live-job count by `delta`.
    ///
    /// A positive delta that would push usage past the entity's limit fails
    /// with [`JobError::QuotaExceeded`] and leaves the count untouched. A
    /// negative delta never fails; usage saturates at zero. The ledger
    /// serializes concurrent adjustments per entity.
    ///
    /// [`JobError::QuotaExceeded`]: crate::error::JobError::QuotaExceeded
    async fn increment(&self, entity: &QuotaEntity, delta: i32) -> Result<()>;
}

/// Lookup of acting identities, used when compensation must resolve a
/// recorded email back to the user it charged.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup_user_by_email(&self, email: &str) -> Result<User>;
}
