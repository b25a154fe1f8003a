//! Step handlers: pluggable side-effect commands
//!
//! Each step's real work (account deactivation, permission revocation,
//! content anonymization, farewell dispatch) is an external call injected
//! per step number. The engine wraps every invocation with a bounded
//! timeout and a small retry budget; each retry is logged and the final
//! attempt count lands in the step state and the audit record.
//!
//! Handlers may be re-run: a step that errored stays executable, and a
//! retry re-runs the full handler. Implementations must tolerate re-runs
//! over partially-applied work; the engine performs no compensation.

use crate::EngineConfig;
use async_trait::async_trait;
use offboard_types::{Process, StepNumber, StepPayload};
use std::collections::HashMap;
use std::sync::Arc;

/// A step's side-effect command
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Perform the step's side effect. The process is a read-only view
    /// taken under the process lock.
    async fn run(&self, process: &Process, payload: &StepPayload) -> anyhow::Result<()>;
}

/// Handler that does nothing, for wiring and tests
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStepHandler;

#[async_trait]
impl StepHandler for NoopStepHandler {
    async fn run(&self, _process: &Process, _payload: &StepPayload) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Registry of step handlers, keyed by step number
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<StepNumber, Arc<dyn StepHandler>>,
}

impl HandlerRegistry {
    /// An empty registry; every step must be registered before use
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with a no-op handler on every step
    pub fn noop() -> Self {
        let mut registry = Self::new();
        for step in StepNumber::ALL {
            registry.register(step, Arc::new(NoopStepHandler));
        }
        registry
    }

    /// Register (or replace) the handler for a step
    pub fn register(&mut self, step: StepNumber, handler: Arc<dyn StepHandler>) -> &mut Self {
        self.handlers.insert(step, handler);
        self
    }

    pub fn get(&self, step: StepNumber) -> Option<Arc<dyn StepHandler>> {
        self.handlers.get(&step).cloned()
    }

    pub fn is_complete(&self) -> bool {
        StepNumber::ALL.iter().all(|s| self.handlers.contains_key(s))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("registered", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Outcome of a policy-wrapped handler run: attempts made, and the last
/// failure message if all attempts failed
pub(crate) struct HandlerOutcome {
    pub attempts: u32,
    pub failure: Option<String>,
}

/// Run a handler under the configured timeout, retrying on failure.
///
/// Total invocations are `1 + config.handler_retries`. Stops at the first
/// success.
pub(crate) async fn run_with_policy(
    handler: &dyn StepHandler,
    step: StepNumber,
    process: &Process,
    payload: &StepPayload,
    config: &EngineConfig,
) -> HandlerOutcome {
    let max_attempts = config.handler_retries.saturating_add(1);
    let mut last_failure = String::new();

    for attempt in 1..=max_attempts {
        let result =
            tokio::time::timeout(config.handler_timeout(), handler.run(process, payload)).await;

        match result {
            Ok(Ok(())) => {
                return HandlerOutcome {
                    attempts: attempt,
                    failure: None,
                }
            }
            Ok(Err(error)) => {
                last_failure = format!("{error:#}");
            }
            Err(_) => {
                last_failure = format!(
                    "timed out after {} seconds",
                    config.handler_timeout_secs
                );
            }
        }

        if attempt < max_attempts {
            tracing::warn!(
                process_id = %process.id,
                step = %step,
                attempt,
                error = %last_failure,
                "step handler failed, retrying"
            );
        }
    }

    HandlerOutcome {
        attempts: max_attempts,
        failure: Some(last_failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use offboard_types::{DeactivationPayload, OrgNodeId};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyHandler {
        fail_first: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl StepHandler for FlakyHandler {
        async fn run(&self, _process: &Process, _payload: &StepPayload) -> anyhow::Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                anyhow::bail!("transient directory failure");
            }
            Ok(())
        }
    }

    struct HangingHandler;

    #[async_trait]
    impl StepHandler for HangingHandler {
        async fn run(&self, _process: &Process, _payload: &StepPayload) -> anyhow::Result<()> {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn make_process() -> Process {
        Process::new(OrgNodeId::new("subject"), OrgNodeId::new("initiator"))
    }

    fn payload() -> StepPayload {
        StepPayload::Deactivation(DeactivationPayload::immediate())
    }

    #[test]
    fn test_noop_registry_is_complete() {
        assert!(HandlerRegistry::noop().is_complete());
        assert!(!HandlerRegistry::new().is_complete());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = HandlerRegistry::new();
        registry.register(StepNumber::Deactivation, Arc::new(NoopStepHandler));
        assert!(registry.get(StepNumber::Deactivation).is_some());
        assert!(registry.get(StepNumber::Closure).is_none());
    }

    #[tokio::test]
    async fn test_policy_succeeds_first_try() {
        let handler = NoopStepHandler;
        let outcome = run_with_policy(
            &handler,
            StepNumber::Deactivation,
            &make_process(),
            &payload(),
            &EngineConfig::default(),
        )
        .await;
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.failure.is_none());
    }

    #[tokio::test]
    async fn test_policy_retries_until_success() {
        let handler = FlakyHandler {
            fail_first: 2,
            calls: AtomicU32::new(0),
        };
        let config = EngineConfig::default().with_handler_retries(2);
        let outcome = run_with_policy(
            &handler,
            StepNumber::Deactivation,
            &make_process(),
            &payload(),
            &config,
        )
        .await;
        assert_eq!(outcome.attempts, 3);
        assert!(outcome.failure.is_none());
    }

    #[tokio::test]
    async fn test_policy_exhausts_retries() {
        let handler = FlakyHandler {
            fail_first: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let config = EngineConfig::default().with_handler_retries(1);
        let outcome = run_with_policy(
            &handler,
            StepNumber::Deactivation,
            &make_process(),
            &payload(),
            &config,
        )
        .await;
        assert_eq!(outcome.attempts, 2);
        assert!(outcome.failure.unwrap().contains("transient"));
    }

    #[tokio::test]
    async fn test_policy_times_out() {
        let config = EngineConfig::default()
            .with_handler_timeout_secs(1)
            .with_handler_retries(0);
        let outcome = run_with_policy(
            &HangingHandler,
            StepNumber::Deactivation,
            &make_process(),
            &payload(),
            &config,
        )
        .await;
        assert_eq!(outcome.attempts, 1);
        assert!(outcome.failure.unwrap().contains("timed out"));
    }
}
