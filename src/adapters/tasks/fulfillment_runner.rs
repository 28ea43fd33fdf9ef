//! FulfillmentRunner - Background task execution for fulfillment runs.
//!
//! The webhook intake path must answer the provider quickly, so
//! fulfillment happens off the request path:
//! 1. The intake handler records the order and schedules a task
//! 2. **The runner executes the orchestrator with retries** ← This module
//!
//! ## Why a Background Task?
//!
//! - The provider only cares that the event was accepted
//! - Provisioning and enrollment calls are slow and can flake
//! - Transient failures get retried without another delivery
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `max_retries` | 3 | Additional attempts after the first failure |
//! | `soft_time_limit` | 5s | Per-attempt execution budget |
//! | `retry_base_delay` | 1s | Backoff base, doubled per attempt |
//!
//! ## Retry Semantics
//!
//! Only transport-class adapter failures are retried; refusals, store
//! errors and timeouts are terminal for the task. Every attempt
//! re-enters through the order status guards, so retried work never
//! duplicates provisioning or enrollment calls. A terminal failure
//! forces the order into `Error` when a previous attempt has not
//! already settled it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ChargeId, DomainError};
use crate::domain::fulfillment::{
    Charge, FulfillmentError, FulfillmentOrchestrator, FulfillmentOutcome,
};
use crate::ports::{FulfillmentScheduler, OrderStore};

/// Errors from a scheduled fulfillment task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// An attempt exceeded the soft time limit.
    #[error("Fulfillment attempt exceeded the {limit_secs}s soft time limit")]
    TimedOut { limit_secs: u64 },

    /// The fulfillment run itself failed.
    #[error(transparent)]
    Failed(#[from] FulfillmentError),
}

impl TaskError {
    /// Returns true if the runner should retry the attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            TaskError::Failed(err) => err.is_retryable(),
            TaskError::TimedOut { .. } => false,
        }
    }
}

/// Configuration for the fulfillment runner.
#[derive(Debug, Clone)]
pub struct FulfillmentRunnerConfig {
    /// Additional attempts after the first failure.
    pub max_retries: u32,

    /// Per-attempt execution budget.
    pub soft_time_limit: Duration,

    /// Backoff base delay, doubled per attempt.
    pub retry_base_delay: Duration,
}

impl Default for FulfillmentRunnerConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            soft_time_limit: Duration::from_secs(5),
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

impl FulfillmentRunnerConfig {
    /// Create config with a custom retry budget.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Create config with a custom per-attempt time limit.
    pub fn with_soft_time_limit(mut self, limit: Duration) -> Self {
        self.soft_time_limit = limit;
        self
    }

    /// Create config with a custom backoff base delay.
    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}

/// Tokio-backed fulfillment task runner.
///
/// Implements `FulfillmentScheduler` by spawning a detached task per
/// verified charge. The task drives the orchestrator through bounded
/// retries and records terminal failures on the order.
#[derive(Clone)]
pub struct TokioFulfillmentRunner {
    orchestrator: Arc<FulfillmentOrchestrator>,
    orders: Arc<dyn OrderStore>,
    config: FulfillmentRunnerConfig,
}

impl TokioFulfillmentRunner {
    /// Create a new runner with default configuration.
    pub fn new(orchestrator: Arc<FulfillmentOrchestrator>, orders: Arc<dyn OrderStore>) -> Self {
        Self {
            orchestrator,
            orders,
            config: FulfillmentRunnerConfig::default(),
        }
    }

    /// Create a new runner with custom configuration.
    pub fn with_config(
        orchestrator: Arc<FulfillmentOrchestrator>,
        orders: Arc<dyn OrderStore>,
        config: FulfillmentRunnerConfig,
    ) -> Self {
        Self {
            orchestrator,
            orders,
            config,
        }
    }

    /// Execute fulfillment for a charge, retrying transient failures.
    ///
    /// This method is also useful for testing without spawning.
    pub async fn execute(&self, charge: Charge) -> Result<FulfillmentOutcome, TaskError> {
        let max_attempts = self.config.max_retries + 1;
        let mut attempt = 1;

        loop {
            match self.attempt(&charge).await {
                Ok(outcome) => {
                    tracing::info!(
                        charge_id = %charge.id,
                        attempt,
                        outcome = ?outcome,
                        "Fulfillment run settled"
                    );
                    return Ok(outcome);
                }
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
                    tracing::warn!(
                        charge_id = %charge.id,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Fulfillment attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(
                        charge_id = %charge.id,
                        attempt,
                        error = %err,
                        "Fulfillment failed terminally"
                    );
                    self.force_error(&charge).await;
                    return Err(err);
                }
            }
        }
    }

    /// Run a single attempt under the soft time limit.
    async fn attempt(&self, charge: &Charge) -> Result<FulfillmentOutcome, TaskError> {
        match tokio::time::timeout(self.config.soft_time_limit, self.orchestrator.run(charge)).await
        {
            Ok(result) => result.map_err(TaskError::from),
            Err(_) => Err(TaskError::TimedOut {
                limit_secs: self.config.soft_time_limit.as_secs(),
            }),
        }
    }

    /// Force the order into `Error` after a terminal task failure.
    ///
    /// Best-effort: an order a previous attempt already settled is left
    /// alone, and bookkeeping failures are logged rather than raised.
    async fn force_error(&self, charge: &Charge) {
        let charge_id = match ChargeId::new(charge.id.clone()) {
            Ok(id) => id,
            Err(_) => return,
        };

        let mut order = match self.orders.find(&charge_id).await {
            Ok(Some(order)) => order,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(
                    charge_id = %charge_id,
                    error = %err,
                    "Could not load order to record task failure"
                );
                return;
            }
        };

        if order.is_terminal() {
            return;
        }

        if let Err(err) = order.fail() {
            tracing::warn!(charge_id = %charge_id, error = %err, "Could not mark order failed");
            return;
        }

        if let Err(err) = self.orders.update(&order).await {
            tracing::warn!(
                charge_id = %charge_id,
                error = %err,
                "Could not persist order failure"
            );
        }
    }
}

#[async_trait]
impl FulfillmentScheduler for TokioFulfillmentRunner {
    async fn schedule(&self, charge: Charge) -> Result<(), DomainError> {
        let runner = self.clone();
        let charge_id = charge.id.clone();

        tokio::spawn(async move {
            if let Err(err) = runner.execute(charge).await {
                tracing::error!(
                    charge_id = %charge_id,
                    error = %err,
                    "Scheduled fulfillment task failed"
                );
            }
        });

        Ok(())
    }
}
