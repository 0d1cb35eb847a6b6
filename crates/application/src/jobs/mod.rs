//! Job lifecycle sagas: creation, update, and cron trigger.

pub mod actions;
pub mod service;

pub use actions::JobSagaParam;
pub use service::JobService;
