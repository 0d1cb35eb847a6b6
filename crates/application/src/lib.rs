//! Application layer: the job lifecycle sagas.
//!
//! Each lifecycle operation is a pipeline of compensable actions built on
//! the domain ports. [`jobs::JobService`] is the entry point; the actions
//! themselves live in [`jobs::actions`] and are independently testable.

pub mod jobs;

pub use jobs::JobService;
