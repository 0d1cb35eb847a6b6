//! The job record.

use crate::error::{JobError, Result};
use marea_shared::{JobName, PoolName, TeamName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scheduled or triggered background workload.
///
/// The name is the identity: the store's create-if-absent semantics
/// guarantee that two live jobs never share one. A job is created by the
/// creation saga, mutated only through the update saga (never partially),
/// and removed by an explicit deletion or by compensation of a failed
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: JobName,
    pub team_owner: TeamName,
    /// Email of the identity that created the job.
    pub owner: String,
    pub pool: PoolName,
    /// Teams granted access beyond the owning team.
    pub teams: Vec<TeamName>,
    /// Free-form labels carried onto the provisioned resources.
    pub labels: BTreeMap<String, String>,
    pub spec: JobSpec,
}

impl Job {
    pub fn new(
        name: impl Into<JobName>,
        team_owner: impl Into<TeamName>,
        pool: impl Into<PoolName>,
        spec: JobSpec,
    ) -> Self {
        Self {
            name: name.into(),
            team_owner: team_owner.into(),
            owner: String::new(),
            pool: pool.into(),
            teams: Vec::new(),
            labels: BTreeMap::new(),
            spec,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Pre-flight validation run before the creation saga reserves
    /// anything. Names must be valid DNS labels because the orchestrator
    /// uses them to name the provisioned resources.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.spec.container.image.is_empty() {
            return Err(JobError::Validation {
                message: format!("job {}: container image must not be empty", self.name),
            });
        }
        Ok(())
    }
}

/// Runtime specification of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub container: ContainerSpec,
    /// Cron expression; absent for jobs that only run when triggered.
    pub schedule: Option<String>,
    /// Manual jobs are never fired by the schedule, only by an explicit
    /// trigger.
    pub manual: bool,
    pub concurrency_policy: Option<ConcurrencyPolicy>,
    /// Hard deadline for a single run, in seconds.
    pub active_deadline_seconds: Option<i64>,
    pub envs: BTreeMap<String, String>,
}

impl JobSpec {
    pub fn new(container: ContainerSpec) -> Self {
        Self {
            container,
            schedule: None,
            manual: false,
            concurrency_policy: None,
            active_deadline_seconds: None,
            envs: BTreeMap::new(),
        }
    }

    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }
}

/// Container image and command of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub image: String,
    pub command: Vec<String>,
}

impl ContainerSpec {
    pub fn new(image: impl Into<String>, command: Vec<String>) -> Self {
        Self {
            image: image.into(),
            command,
        }
    }
}

/// What happens when a scheduled run fires while the previous one is still
/// going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcurrencyPolicy {
    Allow,
    Forbid,
    Replace,
}

const MAX_NAME_LEN: usize = 63;

fn validate_name(name: &JobName) -> Result<()> {
    let raw = name.as_str();
    let valid = !raw.is_empty()
        && raw.len() <= MAX_NAME_LEN
        && raw.starts_with(|c: char| c.is_ascii_lowercase())
        && raw.ends_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
        && raw
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(JobError::Validation {
            message: format!(
                "invalid job name \"{raw}\": must be a lowercase DNS label of at most {MAX_NAME_LEN} characters"
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str) -> Job {
        Job::new(
            name,
            "platform",
            "p1",
            JobSpec::new(ContainerSpec::new("busybox", vec!["date".to_string()])),
        )
    }

    #[test]
    fn valid_names_pass() {
        for name in ["alpha", "nightly-report", "j0b-2"] {
            job(name).validate().unwrap();
        }
    }

    #[test]
    fn invalid_names_are_rejected() {
        for name in ["", "Alpha", "-alpha", "alpha-", "has_underscore", "1leading"] {
            let err = job(name).validate().unwrap_err();
            assert!(matches!(err, JobError::Validation { .. }), "{name}");
        }
    }

    #[test]
    fn overlong_names_are_rejected() {
        let name = "a".repeat(64);
        assert!(job(name.as_str()).validate().is_err());
        let name = "a".repeat(63);
        assert!(job(name.as_str()).validate().is_ok());
    }

    #[test]
    fn empty_image_is_rejected() {
        let mut j = job("alpha");
        j.spec.container.image.clear();
        assert!(matches!(
            j.validate().unwrap_err(),
            JobError::Validation { .. }
        ));
    }

    #[test]
    fn equality_is_structural_including_the_runtime_spec() {
        let a = job("alpha");
        let mut b = a.clone();
        assert_eq!(a, b);
        b.spec.schedule = Some("*/5 * * * *".to_string());
        assert_ne!(a, b);
    }
}
