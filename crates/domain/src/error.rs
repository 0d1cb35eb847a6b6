use crate::quota::QuotaKind;
use marea_shared::JobName;

/// Errors surfaced by the job lifecycle sagas.
///
/// Every kind stays distinguishable to the caller: conflicts
/// (`AlreadyExists`, `QuotaExceeded`) and dependency failures
/// (`Provisioner`, `Store`, `Directory`) reach the caller verbatim after
/// compensation has run; `Validation` fails before any side effect;
/// compensation failures are only ever logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job already exists: {name}")]
    AlreadyExists { name: JobName },

    #[error("job not found: {name}")]
    NotFound { name: JobName },

    #[error("quota exceeded for {kind} {id}: limit of {limit} jobs reached")]
    QuotaExceeded {
        kind: QuotaKind,
        id: String,
        limit: u32,
    },

    #[error("provisioner error: {message}")]
    Provisioner { message: String },

    #[error("store error: {message}")]
    Store { message: String },

    #[error("user directory error: {message}")]
    Directory { message: String },

    #[error("invalid request: {message}")]
    Validation { message: String },

    #[error("operation cancelled: {message}")]
    Cancelled { message: String },
}

pub type Result<T> = std::result::Result<T, JobError>;
