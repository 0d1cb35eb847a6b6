//! Pipeline execution errors.

use std::time::Duration;

/// Errors surfaced by [`crate::PipelineExecutor`].
///
/// A forward failure is returned verbatim as [`PipelineError::Action`];
/// whatever happened during compensation never changes it. The two other
/// variants are owned by the executor: `InsufficientParams` fails the run
/// before any side effect, `Cancelled` reports a step that exceeded the
/// configured timeout and, like any forward failure, has already driven
/// compensation by the time the caller sees it.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError<E: std::error::Error> {
    /// Pre-flight validation failure, nothing has run.
    #[error("action \"{action}\" requires at least {required} parameters, {supplied} supplied")]
    InsufficientParams {
        action: &'static str,
        required: usize,
        supplied: usize,
    },

    /// A forward call did not finish within the configured step timeout.
    #[error("action \"{action}\" was cancelled after {timeout:?}")]
    Cancelled {
        action: &'static str,
        timeout: Duration,
    },

    /// The forward error that stopped the pipeline, unmodified.
    #[error(transparent)]
    Action(#[from] E),
}

impl<E: std::error::Error> PipelineError<E> {
    /// Returns the underlying action error, if that is what stopped the run.
    pub fn into_action(self) -> Option<E> {
        match self {
            PipelineError::Action(err) => Some(err),
            _ => None,
        }
    }
}
