//! Domain model for the jobs lifecycle core: the job record, acting
//! identities, quota accounting types, the collaborator ports the sagas
//! orchestrate, and the error taxonomy they surface.

pub mod auth;
pub mod error;
pub mod jobs;
pub mod ports;
pub mod quota;

pub use error::{JobError, Result};
