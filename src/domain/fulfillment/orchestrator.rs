//! Fulfillment orchestrator - Drives provisioning and enrollment for an order.
//!
//! This module is the coordination layer between a verified charge and the
//! external identity, enrollment and notification services, ensuring each
//! paid line item produces its side effects exactly once.
//!
//! ## Design
//!
//! A run over an order follows these steps:
//! 1. Load the order and apply the order-level status guard
//! 2. For each line item: get-or-create the item row, apply the item-level
//!    status guard, then provision the account and enroll
//! 3. Mark the order processed once every item settled
//!
//! ## Re-entrancy
//!
//! Every mutation goes through the status-guarded transitions on the
//! aggregates. A redelivered task finds `Processed` rows and skips them
//! before any external call is made, which is what makes retries and
//! duplicate deliveries safe.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::domain::foundation::{ChargeId, CourseId};
use crate::ports::{
    EnrollmentProvider, IdentityProvider, LineItemStore, OrderStore, WelcomeNotifier,
};

use super::credentials::{generate_password, DEFAULT_PASSWORD_LENGTH};
use super::{Charge, FulfillmentError, FulfillmentStatus, LineItem, Order};

/// Policy for the remaining items when one item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFailurePolicy {
    /// Abort the run on the first item failure.
    FailFast,
    /// Attempt every item, then fail the order with the collected list.
    ContinueRemaining,
}

impl Default for ItemFailurePolicy {
    fn default() -> Self {
        ItemFailurePolicy::FailFast
    }
}

/// Outcome of a fulfillment run that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// The run settled every item and the order is now `Processed`.
    Completed {
        items_processed: usize,
        items_skipped: usize,
    },
    /// The order was already `Processed`; nothing was done.
    AlreadyProcessed,
    /// The order previously failed; it is not retried automatically.
    PreviouslyFailed,
}

/// How a single item ended within a run.
enum ItemRun {
    Fulfilled,
    Skipped,
}

/// Drives account provisioning, notification and enrollment for the line
/// items of one order.
pub struct FulfillmentOrchestrator {
    orders: Arc<dyn OrderStore>,
    line_items: Arc<dyn LineItemStore>,
    identity: Arc<dyn IdentityProvider>,
    enrollment: Arc<dyn EnrollmentProvider>,
    notifier: Arc<dyn WelcomeNotifier>,
    policy: ItemFailurePolicy,
}

impl FulfillmentOrchestrator {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        line_items: Arc<dyn LineItemStore>,
        identity: Arc<dyn IdentityProvider>,
        enrollment: Arc<dyn EnrollmentProvider>,
        notifier: Arc<dyn WelcomeNotifier>,
        policy: ItemFailurePolicy,
    ) -> Self {
        Self {
            orders,
            line_items,
            identity,
            enrollment,
            notifier,
            policy,
        }
    }

    /// Runs fulfillment for the order belonging to the given charge.
    ///
    /// # Returns
    ///
    /// - `Ok(FulfillmentOutcome::Completed)` - every item settled, order `Processed`
    /// - `Ok(FulfillmentOutcome::AlreadyProcessed)` - duplicate delivery, no-op
    /// - `Ok(FulfillmentOutcome::PreviouslyFailed)` - order is `Error`, no-op
    /// - `Err(_)` - the run aborted; the order was moved to `Error`
    pub async fn run(&self, charge: &Charge) -> Result<FulfillmentOutcome, FulfillmentError> {
        let charge_id =
            ChargeId::new(charge.id.clone()).map_err(|_| FulfillmentError::OrderNotFound {
                charge_id: charge.id.clone(),
            })?;

        let mut order = self
            .orders
            .find(&charge_id)
            .await?
            .ok_or_else(|| FulfillmentError::OrderNotFound {
                charge_id: charge_id.to_string(),
            })?;

        match order.status {
            FulfillmentStatus::Processed => {
                warn!(charge_id = %charge_id, "order already processed, ignoring");
                return Ok(FulfillmentOutcome::AlreadyProcessed);
            }
            FulfillmentStatus::Error => {
                warn!(charge_id = %charge_id, "order previously failed, ignoring");
                return Ok(FulfillmentOutcome::PreviouslyFailed);
            }
            FulfillmentStatus::Processing => {
                warn!(charge_id = %charge_id, "order already being processed, retrying");
            }
            FulfillmentStatus::New => {
                order.start_processing()?;
                self.orders.update(&order).await?;
            }
        }

        let mut items_processed = 0usize;
        let mut items_skipped = 0usize;
        let mut failures: Vec<String> = Vec::new();

        for (index, raw_item) in charge.line_items.iter().enumerate() {
            let email = raw_item.metadata.email.as_deref().unwrap_or("");
            let course_id = raw_item.metadata.course_id.as_deref().unwrap_or("");
            let (email, course_id) = match (email, CourseId::new(course_id)) {
                (email, Ok(course_id)) if !email.is_empty() => (email, course_id),
                _ => {
                    error!(
                        charge_id = %charge_id,
                        index,
                        "line item missing email or courseId metadata, skipping"
                    );
                    items_skipped += 1;
                    continue;
                }
            };

            let result = self
                .process_item(&charge_id, course_id, email, raw_item.sku.clone())
                .await;

            match result {
                Ok(ItemRun::Fulfilled) => items_processed += 1,
                Ok(ItemRun::Skipped) => items_skipped += 1,
                Err(err) => match self.policy {
                    ItemFailurePolicy::FailFast => {
                        error!(charge_id = %charge_id, index, error = %err, "item failed, aborting run");
                        self.fail_order(&mut order).await;
                        return Err(err);
                    }
                    ItemFailurePolicy::ContinueRemaining => {
                        error!(charge_id = %charge_id, index, error = %err, "item failed, continuing");
                        failures.push(err.to_string());
                    }
                },
            }
        }

        if !failures.is_empty() {
            self.fail_order(&mut order).await;
            return Err(FulfillmentError::ItemsFailed { failures });
        }

        order.finish_processing()?;
        self.orders.update(&order).await?;
        info!(
            charge_id = %charge_id,
            items_processed,
            items_skipped,
            "order fulfillment complete"
        );

        Ok(FulfillmentOutcome::Completed {
            items_processed,
            items_skipped,
        })
    }

    /// Settles a single line item: idempotent row creation, status guard,
    /// provisioning, enrollment, completion.
    async fn process_item(
        &self,
        charge_id: &ChargeId,
        course_id: CourseId,
        email: &str,
        sku: Option<String>,
    ) -> Result<ItemRun, FulfillmentError> {
        let candidate = LineItem::new(charge_id.clone(), course_id, email.to_string(), sku);
        let mut item = self.line_items.get_or_create(candidate).await?.into_inner();

        // The guard runs before any external call. An item that already
        // settled produces zero adapter traffic on redelivery.
        match item.status {
            FulfillmentStatus::Processed => {
                warn!(item_id = %item.id, email, "item already processed, ignoring");
                return Ok(ItemRun::Skipped);
            }
            FulfillmentStatus::Error => {
                warn!(item_id = %item.id, email, "item previously failed, skipping");
                return Ok(ItemRun::Skipped);
            }
            FulfillmentStatus::Processing => {
                warn!(item_id = %item.id, email, "item already being processed, retrying");
            }
            FulfillmentStatus::New => {
                item.start_processing()?;
                self.line_items.update(&item).await?;
            }
        }

        if let Err(err) = self.provision_and_enroll(email, &item.course_id).await {
            if self.policy == ItemFailurePolicy::ContinueRemaining {
                if let Err(mark_err) = self.fail_item(&mut item).await {
                    warn!(item_id = %item.id, error = %mark_err, "could not record item failure");
                }
            }
            return Err(err);
        }

        item.finish_processing()?;
        self.line_items.update(&item).await?;
        Ok(ItemRun::Fulfilled)
    }

    /// Ensures an account exists for the recipient, then enrolls them.
    async fn provision_and_enroll(
        &self,
        email: &str,
        course_id: &CourseId,
    ) -> Result<(), FulfillmentError> {
        let exists = self.identity.exists(email).await.map_err(|source| {
            FulfillmentError::IdentityLookup {
                email: email.to_string(),
                source,
            }
        })?;

        if exists {
            info!(email, "learner account already exists");
        } else {
            let password = generate_password(DEFAULT_PASSWORD_LENGTH);

            self.identity.create(email, &password).await.map_err(|source| {
                FulfillmentError::AccountCreation {
                    email: email.to_string(),
                    source,
                }
            })?;
            info!(email, "created learner account");

            // Advisory only. The learner can recover the password through
            // the LMS, so a failed send never blocks enrollment.
            match self.notifier.send_welcome(email, &password).await {
                Ok(()) => info!(email, "sent welcome notification"),
                Err(err) => warn!(email, error = %err, "welcome notification failed, continuing"),
            }
        }

        self.enrollment
            .enroll(course_id, email)
            .await
            .map_err(|source| FulfillmentError::Enrollment {
                course_id: course_id.to_string(),
                email: email.to_string(),
                source,
            })?;
        info!(email, course_id = %course_id, "enrolled learner in course");

        Ok(())
    }

    /// Moves the order to `Error`, logging instead of masking the run's
    /// own error when the bookkeeping itself fails.
    async fn fail_order(&self, order: &mut Order) {
        if let Err(err) = self.try_fail_order(order).await {
            error!(charge_id = %order.charge_id, error = %err, "could not record order failure");
        }
    }

    async fn try_fail_order(&self, order: &mut Order) -> Result<(), FulfillmentError> {
        order.fail()?;
        self.orders.update(order).await?;
        Ok(())
    }

    async fn fail_item(&self, item: &mut LineItem) -> Result<(), FulfillmentError> {
        item.fail()?;
        self.line_items.update(item).await?;
        Ok(())
    }
}
