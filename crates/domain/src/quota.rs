//! Quota accounting types.
//!
//! Quotas are fixed per-entity ceilings on the number of live jobs, not a
//! token bucket that refills over time. The ledger itself serializes
//! concurrent reservations per entity; the sagas only rely on its
//! increment/decrement being atomic.

use crate::auth::User;
use marea_shared::TeamName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity a usage counter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuotaKind {
    Team,
    User,
}

impl fmt::Display for QuotaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaKind::Team => write!(f, "team"),
            QuotaKind::User => write!(f, "user"),
        }
    }
}

/// A named entity whose job count is tracked by the quota ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuotaEntity {
    pub kind: QuotaKind,
    pub id: String,
}

impl QuotaEntity {
    pub fn team(name: &TeamName) -> Self {
        Self {
            kind: QuotaKind::Team,
            id: name.as_str().to_string(),
        }
    }

    pub fn user(user: &User) -> Self {
        Self {
            kind: QuotaKind::User,
            id: user.id.clone(),
        }
    }
}

impl fmt::Display for QuotaEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}
