//! Compensating-action pipelines.
//!
//! A [`Pipeline`] is an ordered, immutable list of [`Action`]s. The
//! [`PipelineExecutor`] drives the forward calls in sequence, threading each
//! action's forward result to the next, and on any forward failure unwinds
//! by calling `backward` on every action that had already succeeded, in
//! strict reverse order.
//!
//! Compensation is best effort: rollback is eventually consistent, a failed
//! or panicked backward call is logged and never replaces the original
//! forward error, and the remaining compensations still run.

pub mod action;
pub mod error;
pub mod pipeline;

pub use action::{Action, BwContext, FwContext, FwResult};
pub use error::PipelineError;
pub use pipeline::{ExecutorConfig, Pipeline, PipelineExecutor};
