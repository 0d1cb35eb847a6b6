//! The atomic unit of work in a pipeline.

use async_trait::async_trait;
use serde_json::Value;

/// Value produced by an action's forward call.
///
/// Results are JSON values so each step can record exactly the keys its own
/// compensation needs (for example a quota reservation records the entity it
/// charged). `Value::Null` is the well-defined "no result".
pub type FwResult = Value;

/// Context handed to an action's forward call.
pub struct FwContext<'a, P> {
    /// The ordered parameters supplied by the caller. Immutable for the
    /// whole run.
    pub params: &'a [P],

    /// The forward result of the most recent prior action, `None` for the
    /// first action in the pipeline.
    pub previous: Option<&'a FwResult>,
}

/// Context handed to an action's backward call.
///
/// A backward call sees the original parameters and its own recorded
/// forward result, nothing else. It has no visibility into other steps'
/// results.
pub struct BwContext<'a, P> {
    /// The ordered parameters supplied by the caller.
    pub params: &'a [P],

    /// This action's own forward result.
    pub fw_result: &'a FwResult,
}

/// One reversible step: a named forward effect plus an optional
/// compensating backward effect.
///
/// Actions are stateless; the same action value may be reused across
/// pipeline runs. `P` is the caller's parameter type and `E` the error type
/// shared by every action in a pipeline.
#[async_trait]
pub trait Action<P, E>: Send + Sync
where
    P: Send + Sync,
    E: std::error::Error + Send + Sync,
{
    /// Name used in logs and validation errors.
    fn name(&self) -> &'static str;

    /// Minimum number of parameters this action needs. Checked for every
    /// action before any forward call runs.
    fn min_params(&self) -> usize {
        0
    }

    /// The forward effect. A failure here stops the pipeline and triggers
    /// compensation of the previously completed actions.
    async fn forward(&self, ctx: FwContext<'_, P>) -> Result<FwResult, E>;

    /// The compensating effect, called with this action's own forward
    /// result when a later action fails. Best effort: errors are logged by
    /// the executor and never override the forward error.
    async fn backward(&self, _ctx: BwContext<'_, P>) -> Result<(), E> {
        Ok(())
    }

    /// Whether this action defines a backward effect. Actions without one
    /// are skipped during compensation.
    fn has_backward(&self) -> bool {
        false
    }
}
