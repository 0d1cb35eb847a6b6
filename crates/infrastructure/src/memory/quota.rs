//! In-memory quota ledger.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use marea_domain::ports::QuotaLedger;
use marea_domain::quota::{QuotaEntity, QuotaKind};
use marea_domain::{JobError, Result};
use marea_shared::config::QuotaConfig;

#[derive(Debug, Clone, Copy)]
struct Usage {
    in_use: u32,
    limit: u32,
}

/// [`QuotaLedger`] keeping usage counters under a single mutex, which is
/// what serializes concurrent reservations.
///
/// Entities start at zero usage with the per-kind default limit from
/// [`QuotaConfig`]; individual limits can be overridden with
/// [`set_limit`](Self::set_limit).
pub struct InMemoryQuotaLedger {
    defaults: QuotaConfig,
    usage: Mutex<HashMap<QuotaEntity, Usage>>,
}

impl InMemoryQuotaLedger {
    pub fn new() -> Self {
        Self::from_config(&QuotaConfig::default())
    }

    pub fn from_config(config: &QuotaConfig) -> Self {
        Self {
            defaults: *config,
            usage: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_limit(&self, entity: &QuotaEntity, limit: u32) {
        let mut usage = self.usage.lock().unwrap();
        let entry = usage.entry(entity.clone()).or_insert(Usage {
            in_use: 0,
            limit,
        });
        entry.limit = limit;
    }

    pub fn in_use(&self, entity: &QuotaEntity) -> u32 {
        self.usage
            .lock()
            .unwrap()
            .get(entity)
            .map(|u| u.in_use)
            .unwrap_or(0)
    }

    fn default_limit(&self, kind: QuotaKind) -> u32 {
        match kind {
            QuotaKind::Team => self.defaults.team_job_limit,
            QuotaKind::User => self.defaults.user_job_limit,
        }
    }
}

impl Default for InMemoryQuotaLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuotaLedger for InMemoryQuotaLedger {
    async fn increment(&self, entity: &QuotaEntity, delta: i32) -> Result<()> {
        let mut usage = self.usage.lock().unwrap();
        let limit = self.default_limit(entity.kind);
        let entry = usage
            .entry(entity.clone())
            .or_insert(Usage { in_use: 0, limit });

        if delta >= 0 {
            let requested = entry.in_use.saturating_add(delta as u32);
            if requested > entry.limit {
                return Err(JobError::QuotaExceeded {
                    kind: entity.kind,
                    id: entity.id.clone(),
                    limit: entry.limit,
                });
            }
            entry.in_use = requested;
        } else {
            // Releases never fail; usage saturates at zero.
            entry.in_use = entry.in_use.saturating_sub(delta.unsigned_abs());
        }
        Ok(())
    }
}
