//! Pipeline composition and execution.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use uuid::Uuid;

use crate::action::{Action, BwContext, FwContext, FwResult};
use crate::error::PipelineError;

/// An ordered, immutable sequence of actions. A pipeline is a composition
/// artifact defined once per saga type; it holds no state between runs.
pub struct Pipeline<P, E>
where
    P: Send + Sync,
    E: std::error::Error + Send + Sync,
{
    actions: Vec<Arc<dyn Action<P, E>>>,
}

impl<P, E> Pipeline<P, E>
where
    P: Send + Sync,
    E: std::error::Error + Send + Sync,
{
    pub fn new(actions: Vec<Arc<dyn Action<P, E>>>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[Arc<dyn Action<P, E>>] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Executor configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutorConfig {
    /// Upper bound on each forward call. A step that exceeds it fails with
    /// a cancellation condition and drives the same compensation path as
    /// any other forward failure. `None` means forward calls may block
    /// indefinitely.
    pub step_timeout: Option<Duration>,
}

/// Drives a [`Pipeline`] against a set of input parameters.
///
/// The reported outcome is all-or-nothing even though the underlying side
/// effects are not atomic: on full forward success the last action's result
/// is returned, on any forward failure the original error is returned after
/// reverse-order compensation of the completed steps.
#[derive(Debug, Clone, Default)]
pub struct PipelineExecutor {
    config: ExecutorConfig,
}

impl PipelineExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Run every action of `pipeline` in order.
    ///
    /// Parameter counts are validated for all actions before the first
    /// forward call, so a validation failure performs no side effect and no
    /// compensation. After that, each forward call receives the full
    /// parameter list plus the previous action's result; on failure the
    /// completed actions are compensated in reverse completion order, each
    /// with only its own recorded forward result.
    pub async fn execute<P, E>(
        &self,
        pipeline: &Pipeline<P, E>,
        params: &[P],
    ) -> Result<FwResult, PipelineError<E>>
    where
        P: Send + Sync,
        E: std::error::Error + Send + Sync,
    {
        let run_id = Uuid::new_v4();

        for action in pipeline.actions() {
            if params.len() < action.min_params() {
                return Err(PipelineError::InsufficientParams {
                    action: action.name(),
                    required: action.min_params(),
                    supplied: params.len(),
                });
            }
        }

        let mut results: Vec<FwResult> = Vec::with_capacity(pipeline.len());

        for action in pipeline.actions() {
            let forward = action.forward(FwContext {
                params,
                previous: results.last(),
            });

            let outcome = match self.config.step_timeout {
                Some(limit) => match tokio::time::timeout(limit, forward).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!(
                            %run_id,
                            action = action.name(),
                            timeout = ?limit,
                            "forward call timed out, compensating"
                        );
                        self.compensate(pipeline.actions(), params, &results, run_id)
                            .await;
                        return Err(PipelineError::Cancelled {
                            action: action.name(),
                            timeout: limit,
                        });
                    }
                },
                None => forward.await,
            };

            match outcome {
                Ok(result) => {
                    tracing::debug!(%run_id, action = action.name(), "forward call succeeded");
                    results.push(result);
                }
                Err(err) => {
                    tracing::warn!(
                        %run_id,
                        action = action.name(),
                        error = %err,
                        "forward call failed, compensating"
                    );
                    self.compensate(pipeline.actions(), params, &results, run_id)
                        .await;
                    return Err(PipelineError::Action(err));
                }
            }
        }

        Ok(results.pop().unwrap_or(Value::Null))
    }

    /// Call backward on every completed action, most recent first. Each
    /// backward call gets only its own recorded forward result. Failures
    /// and panics are logged and do not stop the remaining compensations.
    async fn compensate<P, E>(
        &self,
        actions: &[Arc<dyn Action<P, E>>],
        params: &[P],
        results: &[FwResult],
        run_id: Uuid,
    ) where
        P: Send + Sync,
        E: std::error::Error + Send + Sync,
    {
        for idx in (0..results.len()).rev() {
            let action = &actions[idx];
            if !action.has_backward() {
                continue;
            }

            let backward = action.backward(BwContext {
                params,
                fw_result: &results[idx],
            });

            match AssertUnwindSafe(backward).catch_unwind().await {
                Ok(Ok(())) => {
                    tracing::debug!(%run_id, action = action.name(), "compensated");
                }
                Ok(Err(err)) => {
                    tracing::error!(
                        %run_id,
                        action = action.name(),
                        error = %err,
                        "compensation failed"
                    );
                }
                Err(_) => {
                    tracing::error!(%run_id, action = action.name(), "compensation panicked");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("forward failed in {0}")]
        Forward(&'static str),
        #[error("backward failed in {0}")]
        Backward(&'static str),
    }

    #[derive(Clone, Copy)]
    enum ForwardMode {
        Succeed,
        Fail,
        Hang,
    }

    #[derive(Clone, Copy)]
    enum BackwardMode {
        None,
        Succeed,
        Fail,
        Panic,
    }

    struct ScriptedAction {
        name: &'static str,
        min_params: usize,
        forward_mode: ForwardMode,
        backward_mode: BackwardMode,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedAction {
        fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                name,
                min_params: 0,
                forward_mode: ForwardMode::Succeed,
                backward_mode: BackwardMode::Succeed,
                log: log.clone(),
            }
        }

        fn min_params(mut self, n: usize) -> Self {
            self.min_params = n;
            self
        }

        fn forward_mode(mut self, mode: ForwardMode) -> Self {
            self.forward_mode = mode;
            self
        }

        fn backward_mode(mut self, mode: BackwardMode) -> Self {
            self.backward_mode = mode;
            self
        }

        fn record(&self, entry: String) {
            self.log.lock().unwrap().push(entry);
        }
    }

    #[async_trait]
    impl Action<String, TestError> for ScriptedAction {
        fn name(&self) -> &'static str {
            self.name
        }

        fn min_params(&self) -> usize {
            self.min_params
        }

        async fn forward(&self, ctx: FwContext<'_, String>) -> Result<FwResult, TestError> {
            self.record(format!("fw:{}", self.name));
            match self.forward_mode {
                ForwardMode::Succeed => Ok(json!({
                    "step": self.name,
                    "previous": ctx.previous.cloned().unwrap_or(Value::Null),
                })),
                ForwardMode::Fail => Err(TestError::Forward(self.name)),
                ForwardMode::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Value::Null)
                }
            }
        }

        async fn backward(&self, ctx: BwContext<'_, String>) -> Result<(), TestError> {
            // Every backward call must see its own forward result.
            assert_eq!(ctx.fw_result["step"], self.name);
            self.record(format!("bw:{}", self.name));
            match self.backward_mode {
                BackwardMode::Fail => Err(TestError::Backward(self.name)),
                BackwardMode::Panic => panic!("backward panic in {}", self.name),
                _ => Ok(()),
            }
        }

        fn has_backward(&self) -> bool {
            !matches!(self.backward_mode, BackwardMode::None)
        }
    }

    fn pipeline_of(actions: Vec<ScriptedAction>) -> Pipeline<String, TestError> {
        Pipeline::new(
            actions
                .into_iter()
                .map(|a| Arc::new(a) as Arc<dyn Action<String, TestError>>)
                .collect(),
        )
    }

    fn entries(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn full_success_returns_last_result_and_never_compensates() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline_of(vec![
            ScriptedAction::new("one", &log),
            ScriptedAction::new("two", &log),
            ScriptedAction::new("three", &log),
        ]);

        let result = PipelineExecutor::new()
            .execute(&pipeline, &[])
            .await
            .unwrap();

        assert_eq!(result["step"], "three");
        assert_eq!(entries(&log), vec!["fw:one", "fw:two", "fw:three"]);
    }

    #[tokio::test]
    async fn results_are_threaded_to_the_next_action() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline_of(vec![
            ScriptedAction::new("one", &log),
            ScriptedAction::new("two", &log),
        ]);

        let result = PipelineExecutor::new()
            .execute(&pipeline, &[])
            .await
            .unwrap();

        // "two" saw "one"'s result as its previous value; "one" saw none.
        assert_eq!(result["previous"]["step"], "one");
        assert_eq!(result["previous"]["previous"], Value::Null);
    }

    #[tokio::test]
    async fn failure_compensates_completed_steps_in_reverse_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline_of(vec![
            ScriptedAction::new("one", &log),
            ScriptedAction::new("two", &log),
            ScriptedAction::new("three", &log).forward_mode(ForwardMode::Fail),
            ScriptedAction::new("four", &log),
        ]);

        let err = PipelineExecutor::new()
            .execute(&pipeline, &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Action(TestError::Forward("three"))
        ));
        // The failing step's backward is never called, and step four never
        // runs at all.
        assert_eq!(
            entries(&log),
            vec!["fw:one", "fw:two", "fw:three", "bw:two", "bw:one"]
        );
    }

    #[tokio::test]
    async fn failing_backward_does_not_mask_the_error_or_stop_compensation() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline_of(vec![
            ScriptedAction::new("one", &log),
            ScriptedAction::new("two", &log).backward_mode(BackwardMode::Fail),
            ScriptedAction::new("three", &log).forward_mode(ForwardMode::Fail),
        ]);

        let err = PipelineExecutor::new()
            .execute(&pipeline, &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Action(TestError::Forward("three"))
        ));
        assert_eq!(
            entries(&log),
            vec!["fw:one", "fw:two", "fw:three", "bw:two", "bw:one"]
        );
    }

    #[tokio::test]
    async fn panicking_backward_does_not_stop_remaining_compensations() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline_of(vec![
            ScriptedAction::new("one", &log),
            ScriptedAction::new("two", &log).backward_mode(BackwardMode::Panic),
            ScriptedAction::new("three", &log).forward_mode(ForwardMode::Fail),
        ]);

        let err = PipelineExecutor::new()
            .execute(&pipeline, &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Action(TestError::Forward("three"))
        ));
        assert!(entries(&log).contains(&"bw:one".to_string()));
    }

    #[tokio::test]
    async fn steps_without_backward_are_skipped_during_compensation() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline_of(vec![
            ScriptedAction::new("one", &log).backward_mode(BackwardMode::None),
            ScriptedAction::new("two", &log),
            ScriptedAction::new("three", &log).forward_mode(ForwardMode::Fail),
        ]);

        PipelineExecutor::new()
            .execute(&pipeline, &[])
            .await
            .unwrap_err();

        assert_eq!(
            entries(&log),
            vec!["fw:one", "fw:two", "fw:three", "bw:two"]
        );
    }

    #[tokio::test]
    async fn insufficient_params_fail_before_any_side_effect() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline_of(vec![
            ScriptedAction::new("one", &log),
            ScriptedAction::new("two", &log).min_params(2),
        ]);

        let err = PipelineExecutor::new()
            .execute(&pipeline, &["only".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::InsufficientParams {
                action: "two",
                required: 2,
                supplied: 1,
            }
        ));
        assert!(entries(&log).is_empty());
    }

    #[tokio::test]
    async fn empty_pipeline_produces_the_null_result() {
        let pipeline: Pipeline<String, TestError> = Pipeline::new(Vec::new());
        let result = PipelineExecutor::new()
            .execute(&pipeline, &[])
            .await
            .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn step_timeout_cancels_and_compensates() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline_of(vec![
            ScriptedAction::new("one", &log),
            ScriptedAction::new("two", &log).forward_mode(ForwardMode::Hang),
        ]);

        let executor = PipelineExecutor::with_config(ExecutorConfig {
            step_timeout: Some(Duration::from_millis(20)),
        });
        let err = executor.execute(&pipeline, &[]).await.unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled { action: "two", .. }));
        assert_eq!(entries(&log), vec!["fw:one", "fw:two", "bw:one"]);
    }

    #[tokio::test]
    async fn pipelines_hold_no_state_between_runs() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let pipeline = pipeline_of(vec![ScriptedAction::new("one", &log)]);
        let executor = PipelineExecutor::new();

        executor.execute(&pipeline, &[]).await.unwrap();
        executor.execute(&pipeline, &[]).await.unwrap();

        assert_eq!(entries(&log), vec!["fw:one", "fw:one"]);
    }
}
