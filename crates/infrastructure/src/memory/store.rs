//! In-memory job store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use marea_domain::jobs::Job;
use marea_domain::ports::JobStore;
use marea_domain::{JobError, Result};
use marea_shared::JobName;

/// [`JobStore`] backed by a map behind an async lock.
///
/// Besides the port itself it exposes a mutation counter and one-shot read
/// failure injection, which the lifecycle tests use to observe skipped
/// writes and degraded-read behavior.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobName, Job>>,
    writes: AtomicUsize,
    failing_reads: AtomicUsize,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutations applied so far (inserts, replacements, and
    /// effective removals).
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make the next `n` calls to `get_by_name` fail with a store error.
    pub fn fail_next_reads(&self, n: usize) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }

    fn take_read_failure(&self) -> bool {
        self.failing_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn get_by_name(&self, name: &JobName) -> Result<Job> {
        if self.take_read_failure() {
            return Err(JobError::Store {
                message: format!("read of job {name} failed"),
            });
        }
        self.jobs
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| JobError::NotFound { name: name.clone() })
    }

    async fn insert_if_absent(&self, job: &Job) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.name) {
            return Err(JobError::AlreadyExists {
                name: job.name.clone(),
            });
        }
        jobs.insert(job.name.clone(), job.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn replace_by_name(&self, job: &Job) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        if !jobs.contains_key(&job.name) {
            return Err(JobError::NotFound {
                name: job.name.clone(),
            });
        }
        jobs.insert(job.name.clone(), job.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove_by_name(&self, name: &JobName) -> Result<()> {
        // Removing an absent record succeeds so compensation is idempotent.
        if self.jobs.write().await.remove(name).is_some() {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marea_domain::jobs::{ContainerSpec, JobSpec};

    fn job(name: &str) -> Job {
        Job::new(
            name,
            "platform",
            "p1",
            JobSpec::new(ContainerSpec::new("busybox", vec!["date".to_string()])),
        )
    }

    #[tokio::test]
    async fn insert_is_create_if_absent() {
        let store = InMemoryJobStore::new();
        store.insert_if_absent(&job("alpha")).await.unwrap();
        let err = store.insert_if_absent(&job("alpha")).await.unwrap_err();
        assert!(matches!(err, JobError::AlreadyExists { .. }));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn replace_requires_an_existing_record() {
        let store = InMemoryJobStore::new();
        let err = store.replace_by_name(&job("alpha")).await.unwrap_err();
        assert!(matches!(err, JobError::NotFound { .. }));
    }

    #[tokio::test]
    async fn remove_of_absent_record_succeeds_without_counting_a_write() {
        let store = InMemoryJobStore::new();
        store.remove_by_name(&JobName::from("ghost")).await.unwrap();
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn injected_read_failures_are_one_shot() {
        let store = InMemoryJobStore::new();
        store.insert_if_absent(&job("alpha")).await.unwrap();
        store.fail_next_reads(1);

        let name = JobName::from("alpha");
        assert!(matches!(
            store.get_by_name(&name).await.unwrap_err(),
            JobError::Store { .. }
        ));
        assert!(store.get_by_name(&name).await.is_ok());
    }
}
