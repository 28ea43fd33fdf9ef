//! Handler for inbound payment provider webhooks.
//!
//! This is the synchronous intake path: audit the delivery, verify the
//! event against the provider API, record the order idempotently, and
//! hand qualifying charges to the async fulfillment scheduler.
//!
//! ## Trust Boundary
//!
//! The inbound payload is untrusted. The only field read from it is the
//! event id; every business field comes from the event the verifier
//! fetched back from the provider.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{EventId, WebhookRecordId};
use crate::domain::fulfillment::{
    Charge, FulfillmentStatus, OmiseEventType, Order, VerificationError, WebhookError,
    WebhookRecord,
};
use crate::ports::{EventVerifier, FulfillmentScheduler, OrderStore, WebhookRecordStore};

/// Command to handle one webhook delivery.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body as received.
    pub payload: String,
    /// Request headers, flattened to string pairs.
    pub headers: HashMap<String, String>,
}

/// Result of handling a webhook delivery.
///
/// All variants are acknowledged with HTTP 200; the provider only ever
/// sees an error for deliveries that could not be taken in at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// A fulfillment run was scheduled for the charge.
    Scheduled { charge_id: String },
    /// The order exists and is past `New`; nothing was scheduled.
    NoActionTaken { charge_id: String },
    /// A failed charge was recorded; no fulfillment follows.
    ChargeFailed { charge_id: String },
    /// The event type is outside the supported set.
    Ignored { event_type: String },
}

/// Handles webhook deliveries from the payment provider.
pub struct HandlePaymentWebhookHandler {
    records: Arc<dyn WebhookRecordStore>,
    verifier: Arc<dyn EventVerifier>,
    orders: Arc<dyn OrderStore>,
    scheduler: Arc<dyn FulfillmentScheduler>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        records: Arc<dyn WebhookRecordStore>,
        verifier: Arc<dyn EventVerifier>,
        orders: Arc<dyn OrderStore>,
        scheduler: Arc<dyn FulfillmentScheduler>,
    ) -> Self {
        Self {
            records,
            verifier,
            orders,
            scheduler,
        }
    }

    /// Handles one webhook delivery end to end.
    ///
    /// Every call persists exactly one webhook record, whether or not the
    /// payload turns out to be usable. The record settles as `Done` for
    /// handled and ignored events, `Failed` for rejected payloads, and
    /// stays `Processing` when the verification round trip itself fails.
    pub async fn handle(
        &self,
        command: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        let record = WebhookRecord::receive(command.payload.clone(), command.headers);
        let record_id = record.id;
        self.records.persist(record).await?;
        self.records.mark_processing(&record_id).await?;

        let parsed: serde_json::Value = match serde_json::from_str(&command.payload) {
            Ok(value) => value,
            Err(err) => {
                return Err(self
                    .reject(&record_id, WebhookError::MalformedPayload(err.to_string()))
                    .await);
            }
        };

        let event_id = match parsed.get("id").and_then(|id| id.as_str()).map(EventId::new) {
            Some(Ok(event_id)) => event_id,
            _ => return Err(self.reject(&record_id, WebhookError::MissingEventId).await),
        };

        let event = match self.verifier.verify(&event_id).await {
            Ok(event) => event,
            Err(
                err @ (VerificationError::NotFound { .. } | VerificationError::Mismatch { .. }),
            ) => {
                return Err(self.reject(&record_id, err.into()).await);
            }
            Err(err) => return Err(err.into()),
        };

        let event_type = event.parsed_type();
        if !event_type.is_supported() {
            info!(
                event_id = %event_id,
                event_type = %event.event_type,
                "unsupported event type, acknowledging without action"
            );
            self.records.mark_done(&record_id).await?;
            return Ok(HandlePaymentWebhookResult::Ignored {
                event_type: event.event_type,
            });
        }

        let charge = match event.deserialize_object::<Charge>() {
            Ok(charge) => charge,
            Err(err) => {
                return Err(self
                    .reject(&record_id, WebhookError::MalformedPayload(err.to_string()))
                    .await);
            }
        };

        self.records.mark_done(&record_id).await?;

        let candidate = match Order::from_charge(&charge, Some(record_id)) {
            Ok(candidate) => candidate,
            Err(err) => {
                return Err(WebhookError::MalformedPayload(err.to_string()));
            }
        };

        let outcome = self.orders.get_or_create(candidate).await?;
        let order = outcome.get().clone();
        info!(
            charge_id = %order.charge_id,
            was_created = outcome.was_created(),
            event_type = %event.event_type,
            "recorded order for verified event"
        );

        let charge_id = order.charge_id.to_string();
        if event_type == OmiseEventType::ChargeComplete {
            if order.status == FulfillmentStatus::New {
                self.scheduler.schedule(charge).await?;
                info!(charge_id = %charge_id, "scheduled fulfillment");
                Ok(HandlePaymentWebhookResult::Scheduled { charge_id })
            } else {
                info!(
                    charge_id = %charge_id,
                    status = ?order.status,
                    "order already handled, no action taken"
                );
                Ok(HandlePaymentWebhookResult::NoActionTaken { charge_id })
            }
        } else {
            let mut order = order;
            if order.is_terminal() {
                info!(
                    charge_id = %charge_id,
                    status = ?order.status,
                    "charge failed but order already settled"
                );
            } else {
                order.fail()?;
                self.orders.update(&order).await?;
                info!(charge_id = %charge_id, "marked order failed after failed charge");
            }
            Ok(HandlePaymentWebhookResult::ChargeFailed { charge_id })
        }
    }

    /// Best-effort settles the record as `Failed` before surfacing the
    /// rejection, so the provider-facing status never gets masked by a
    /// bookkeeping error.
    async fn reject(&self, record_id: &WebhookRecordId, err: WebhookError) -> WebhookError {
        if let Err(mark_err) = self.records.mark_failed(record_id).await {
            warn!(record_id = %record_id, error = %mark_err, "could not mark record failed");
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DomainError;
    use crate::domain::fulfillment::{OmiseEvent, OmiseEventBuilder, RecordStatus};
    use crate::ports::CreateOutcome;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::RwLock;

    // ════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════

    struct MockWebhookRecordStore {
        records: RwLock<HashMap<WebhookRecordId, WebhookRecord>>,
    }

    impl MockWebhookRecordStore {
        fn new() -> Self {
            Self {
                records: RwLock::new(HashMap::new()),
            }
        }

        async fn record_count(&self) -> usize {
            self.records.read().await.len()
        }

        async fn single_record_status(&self) -> RecordStatus {
            let records = self.records.read().await;
            assert_eq!(records.len(), 1, "expected exactly one record");
            records.values().next().unwrap().status
        }

        async fn apply<F>(&self, id: &WebhookRecordId, mutate: F) -> Result<(), DomainError>
        where
            F: FnOnce(&mut WebhookRecord) -> Result<(), DomainError>,
        {
            let mut records = self.records.write().await;
            let record = records.get_mut(id).ok_or_else(|| {
                DomainError::new(
                    crate::domain::foundation::ErrorCode::WebhookRecordNotFound,
                    format!("No webhook record with id {}", id),
                )
            })?;
            mutate(record)
        }
    }

    #[async_trait]
    impl WebhookRecordStore for MockWebhookRecordStore {
        async fn persist(&self, record: WebhookRecord) -> Result<(), DomainError> {
            let mut records = self.records.write().await;
            records.insert(record.id, record);
            Ok(())
        }

        async fn mark_processing(&self, id: &WebhookRecordId) -> Result<(), DomainError> {
            self.apply(id, |record| record.mark_processing()).await
        }

        async fn mark_done(&self, id: &WebhookRecordId) -> Result<(), DomainError> {
            self.apply(id, |record| record.mark_done()).await
        }

        async fn mark_failed(&self, id: &WebhookRecordId) -> Result<(), DomainError> {
            self.apply(id, |record| record.mark_failed()).await
        }

        async fn find(&self, id: &WebhookRecordId) -> Result<Option<WebhookRecord>, DomainError> {
            let records = self.records.read().await;
            Ok(records.get(id).cloned())
        }
    }

    enum VerifierBehavior {
        Return(Box<OmiseEvent>),
        NotFound,
        Mismatch,
        Transport,
    }

    struct MockEventVerifier {
        behavior: VerifierBehavior,
        calls: AtomicU32,
    }

    impl MockEventVerifier {
        fn returning(event: OmiseEvent) -> Self {
            Self {
                behavior: VerifierBehavior::Return(Box::new(event)),
                calls: AtomicU32::new(0),
            }
        }

        fn not_found() -> Self {
            Self {
                behavior: VerifierBehavior::NotFound,
                calls: AtomicU32::new(0),
            }
        }

        fn mismatching() -> Self {
            Self {
                behavior: VerifierBehavior::Mismatch,
                calls: AtomicU32::new(0),
            }
        }

        fn transport_failing() -> Self {
            Self {
                behavior: VerifierBehavior::Transport,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EventVerifier for MockEventVerifier {
        async fn verify(&self, event_id: &EventId) -> Result<OmiseEvent, VerificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                VerifierBehavior::Return(event) => Ok((**event).clone()),
                VerifierBehavior::NotFound => Err(VerificationError::NotFound {
                    event_id: event_id.to_string(),
                }),
                VerifierBehavior::Mismatch => Err(VerificationError::Mismatch {
                    requested: event_id.to_string(),
                    fetched: "evnt_other".to_string(),
                }),
                VerifierBehavior::Transport => Err(VerificationError::Transport {
                    message: "connection refused".to_string(),
                }),
            }
        }
    }

    struct MockOrderStore {
        orders: RwLock<HashMap<String, Order>>,
    }

    impl MockOrderStore {
        fn new() -> Self {
            Self {
                orders: RwLock::new(HashMap::new()),
            }
        }

        async fn seed(&self, order: Order) {
            let mut orders = self.orders.write().await;
            orders.insert(order.charge_id.to_string(), order);
        }

        async fn order_count(&self) -> usize {
            self.orders.read().await.len()
        }

        async fn status_of(&self, charge_id: &str) -> FulfillmentStatus {
            self.orders.read().await[charge_id].status
        }
    }

    #[async_trait]
    impl OrderStore for MockOrderStore {
        async fn get_or_create(
            &self,
            candidate: Order,
        ) -> Result<CreateOutcome<Order>, DomainError> {
            let mut orders = self.orders.write().await;
            let key = candidate.charge_id.to_string();
            if let Some(existing) = orders.get(&key) {
                Ok(CreateOutcome::Existing(existing.clone()))
            } else {
                orders.insert(key, candidate.clone());
                Ok(CreateOutcome::Created(candidate))
            }
        }

        async fn find(
            &self,
            charge_id: &crate::domain::foundation::ChargeId,
        ) -> Result<Option<Order>, DomainError> {
            let orders = self.orders.read().await;
            Ok(orders.get(charge_id.as_str()).cloned())
        }

        async fn update(&self, order: &Order) -> Result<(), DomainError> {
            let mut orders = self.orders.write().await;
            orders.insert(order.charge_id.to_string(), order.clone());
            Ok(())
        }
    }

    struct MockFulfillmentScheduler {
        scheduled: RwLock<Vec<Charge>>,
    }

    impl MockFulfillmentScheduler {
        fn new() -> Self {
            Self {
                scheduled: RwLock::new(Vec::new()),
            }
        }

        async fn scheduled_charge_ids(&self) -> Vec<String> {
            self.scheduled
                .read()
                .await
                .iter()
                .map(|charge| charge.id.clone())
                .collect()
        }
    }

    #[async_trait]
    impl FulfillmentScheduler for MockFulfillmentScheduler {
        async fn schedule(&self, charge: Charge) -> Result<(), DomainError> {
            let mut scheduled = self.scheduled.write().await;
            scheduled.push(charge);
            Ok(())
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════

    struct Harness {
        records: Arc<MockWebhookRecordStore>,
        verifier: Arc<MockEventVerifier>,
        orders: Arc<MockOrderStore>,
        scheduler: Arc<MockFulfillmentScheduler>,
    }

    impl Harness {
        fn with_verifier(verifier: MockEventVerifier) -> Self {
            Self {
                records: Arc::new(MockWebhookRecordStore::new()),
                verifier: Arc::new(verifier),
                orders: Arc::new(MockOrderStore::new()),
                scheduler: Arc::new(MockFulfillmentScheduler::new()),
            }
        }

        fn handler(&self) -> HandlePaymentWebhookHandler {
            HandlePaymentWebhookHandler::new(
                self.records.clone(),
                self.verifier.clone(),
                self.orders.clone(),
                self.scheduler.clone(),
            )
        }
    }

    fn command(payload: &str) -> HandlePaymentWebhookCommand {
        HandlePaymentWebhookCommand {
            payload: payload.to_string(),
            headers: HashMap::from([("user-agent".to_string(), "Omise/2019-05-29".to_string())]),
        }
    }

    fn charge_object(charge_id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": charge_id,
            "status": "successful",
            "amount": 150000,
            "currency": "thb",
            "metadata": { "email": "buyer@example.com" },
            "card": { "name": "Ada Lovelace" },
            "line_items": [
                { "metadata": { "email": "a@x.com", "courseId": "C1" } }
            ]
        })
    }

    fn complete_event(event_id: &str, charge_id: &str) -> OmiseEvent {
        OmiseEventBuilder::new()
            .id(event_id)
            .event_type("charge.complete")
            .object(charge_object(charge_id))
            .build()
    }

    fn failed_charge_event(event_id: &str, charge_id: &str) -> OmiseEvent {
        let mut object = charge_object(charge_id);
        object["status"] = serde_json::json!("failed");
        OmiseEventBuilder::new()
            .id(event_id)
            .event_type("charge.failed")
            .object(object)
            .build()
    }

    fn inbound_payload(event_id: &str) -> String {
        serde_json::json!({ "id": event_id, "type": "charge.complete" }).to_string()
    }

    // ════════════════════════════════════════════════════════════════
    // Successful Intake Tests
    // ════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn complete_event_schedules_fulfillment() {
        let harness = Harness::with_verifier(MockEventVerifier::returning(complete_event(
            "evnt_1", "chrg_1",
        )));

        let result = harness
            .handler()
            .handle(command(&inbound_payload("evnt_1")))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::Scheduled {
                charge_id: "chrg_1".to_string()
            }
        );
        assert_eq!(harness.verifier.calls(), 1);
        assert_eq!(harness.records.single_record_status().await, RecordStatus::Done);
        assert_eq!(harness.orders.status_of("chrg_1").await, FulfillmentStatus::New);
        assert_eq!(
            harness.scheduler.scheduled_charge_ids().await,
            vec!["chrg_1".to_string()]
        );
    }

    #[tokio::test]
    async fn order_fields_come_from_the_verified_event_not_the_payload() {
        let harness = Harness::with_verifier(MockEventVerifier::returning(complete_event(
            "evnt_1", "chrg_1",
        )));
        // Inbound payload claims a different charge; only its event id is used
        let payload = serde_json::json!({
            "id": "evnt_1",
            "data": { "object": { "id": "chrg_fake", "status": "successful" } }
        })
        .to_string();

        harness.handler().handle(command(&payload)).await.unwrap();

        assert_eq!(harness.orders.order_count().await, 1);
        assert_eq!(harness.orders.status_of("chrg_1").await, FulfillmentStatus::New);
    }

    #[tokio::test]
    async fn settled_order_is_not_rescheduled() {
        let harness = Harness::with_verifier(MockEventVerifier::returning(complete_event(
            "evnt_1", "chrg_1",
        )));
        let charge = complete_event("evnt_1", "chrg_1")
            .deserialize_object::<Charge>()
            .unwrap();
        let mut order = Order::from_charge(&charge, None).unwrap();
        order.status = FulfillmentStatus::Processed;
        harness.orders.seed(order).await;

        let result = harness
            .handler()
            .handle(command(&inbound_payload("evnt_1")))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::NoActionTaken {
                charge_id: "chrg_1".to_string()
            }
        );
        assert!(harness.scheduler.scheduled_charge_ids().await.is_empty());
        assert_eq!(harness.orders.status_of("chrg_1").await, FulfillmentStatus::Processed);
    }

    #[tokio::test]
    async fn every_delivery_gets_its_own_record() {
        let harness = Harness::with_verifier(MockEventVerifier::returning(complete_event(
            "evnt_1", "chrg_1",
        )));
        let handler = harness.handler();

        handler.handle(command(&inbound_payload("evnt_1"))).await.unwrap();
        handler.handle(command(&inbound_payload("evnt_1"))).await.unwrap();

        assert_eq!(harness.records.record_count().await, 2);
        assert_eq!(harness.orders.order_count().await, 1);
    }

    // ════════════════════════════════════════════════════════════════
    // Rejected Payload Tests
    // ════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn malformed_payload_is_recorded_then_rejected() {
        let harness =
            Harness::with_verifier(MockEventVerifier::returning(complete_event("evnt_1", "chrg_1")));

        let err = harness
            .handler()
            .handle(command("this is not json"))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::MalformedPayload(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.records.single_record_status().await, RecordStatus::Failed);
        assert_eq!(harness.verifier.calls(), 0);
        assert_eq!(harness.orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn payload_without_event_id_is_rejected() {
        let harness =
            Harness::with_verifier(MockEventVerifier::returning(complete_event("evnt_1", "chrg_1")));

        let err = harness
            .handler()
            .handle(command(r#"{"type": "charge.complete"}"#))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::MissingEventId));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.records.single_record_status().await, RecordStatus::Failed);
        assert_eq!(harness.verifier.calls(), 0);
    }

    #[tokio::test]
    async fn empty_event_id_is_rejected() {
        let harness =
            Harness::with_verifier(MockEventVerifier::returning(complete_event("evnt_1", "chrg_1")));

        let err = harness
            .handler()
            .handle(command(r#"{"id": ""}"#))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::MissingEventId));
    }

    #[tokio::test]
    async fn charge_without_id_is_rejected() {
        let event = OmiseEventBuilder::new()
            .id("evnt_1")
            .event_type("charge.complete")
            .object(serde_json::json!({ "status": "successful" }))
            .build();
        let harness = Harness::with_verifier(MockEventVerifier::returning(event));

        let err = harness
            .handler()
            .handle(command(&inbound_payload("evnt_1")))
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::MalformedPayload(_)));
        assert_eq!(harness.records.single_record_status().await, RecordStatus::Failed);
        assert_eq!(harness.orders.order_count().await, 0);
    }

    // ════════════════════════════════════════════════════════════════
    // Verification Outcome Tests
    // ════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_event_at_provider_is_rejected() {
        let harness = Harness::with_verifier(MockEventVerifier::not_found());

        let err = harness
            .handler()
            .handle(command(&inbound_payload("evnt_ghost")))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.records.single_record_status().await, RecordStatus::Failed);
        assert_eq!(harness.orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn mismatched_event_id_is_rejected() {
        let harness = Harness::with_verifier(MockEventVerifier::mismatching());

        let err = harness
            .handler()
            .handle(command(&inbound_payload("evnt_1")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WebhookError::Verification(VerificationError::Mismatch { .. })
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.records.single_record_status().await, RecordStatus::Failed);
    }

    #[tokio::test]
    async fn verifier_transport_failure_leaves_record_processing() {
        let harness = Harness::with_verifier(MockEventVerifier::transport_failing());

        let err = harness
            .handler()
            .handle(command(&inbound_payload("evnt_1")))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        // Left mid-flight on purpose: the provider will redeliver
        assert_eq!(
            harness.records.single_record_status().await,
            RecordStatus::Processing
        );
        assert_eq!(harness.orders.order_count().await, 0);
    }

    #[tokio::test]
    async fn unsupported_event_type_is_acknowledged_without_action() {
        let event = OmiseEventBuilder::new()
            .id("evnt_1")
            .event_type("customer.created")
            .build();
        let harness = Harness::with_verifier(MockEventVerifier::returning(event));

        let result = harness
            .handler()
            .handle(command(&inbound_payload("evnt_1")))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::Ignored {
                event_type: "customer.created".to_string()
            }
        );
        assert_eq!(harness.records.single_record_status().await, RecordStatus::Done);
        assert_eq!(harness.orders.order_count().await, 0);
        assert!(harness.scheduler.scheduled_charge_ids().await.is_empty());
    }

    // ════════════════════════════════════════════════════════════════
    // Failed Charge Tests
    // ════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn failed_charge_records_order_in_error_without_scheduling() {
        let harness = Harness::with_verifier(MockEventVerifier::returning(failed_charge_event(
            "evnt_1", "chrg_1",
        )));

        let result = harness
            .handler()
            .handle(command(&inbound_payload("evnt_1")))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::ChargeFailed {
                charge_id: "chrg_1".to_string()
            }
        );
        assert_eq!(harness.orders.status_of("chrg_1").await, FulfillmentStatus::Error);
        assert!(harness.scheduler.scheduled_charge_ids().await.is_empty());
        assert_eq!(harness.records.single_record_status().await, RecordStatus::Done);
    }

    #[tokio::test]
    async fn failed_charge_fails_existing_new_order() {
        let harness = Harness::with_verifier(MockEventVerifier::returning(failed_charge_event(
            "evnt_2", "chrg_1",
        )));
        let charge = complete_event("evnt_1", "chrg_1")
            .deserialize_object::<Charge>()
            .unwrap();
        harness
            .orders
            .seed(Order::from_charge(&charge, None).unwrap())
            .await;

        let result = harness
            .handler()
            .handle(command(&inbound_payload("evnt_2")))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::ChargeFailed {
                charge_id: "chrg_1".to_string()
            }
        );
        assert_eq!(harness.orders.status_of("chrg_1").await, FulfillmentStatus::Error);
    }

    #[tokio::test]
    async fn failed_charge_leaves_settled_order_untouched() {
        let harness = Harness::with_verifier(MockEventVerifier::returning(failed_charge_event(
            "evnt_2", "chrg_1",
        )));
        let charge = complete_event("evnt_1", "chrg_1")
            .deserialize_object::<Charge>()
            .unwrap();
        let mut order = Order::from_charge(&charge, None).unwrap();
        order.status = FulfillmentStatus::Processed;
        harness.orders.seed(order).await;

        let result = harness
            .handler()
            .handle(command(&inbound_payload("evnt_2")))
            .await
            .unwrap();

        assert_eq!(
            result,
            HandlePaymentWebhookResult::ChargeFailed {
                charge_id: "chrg_1".to_string()
            }
        );
        assert_eq!(harness.orders.status_of("chrg_1").await, FulfillmentStatus::Processed);
    }
}
