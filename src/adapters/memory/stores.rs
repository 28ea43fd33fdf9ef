//! In-memory store implementations for testing.
//!
//! Provides deterministic, process-local persistence for unit and
//! integration tests.
//!
//! # Security Note
//!
//! These adapters are for **testing only** and should not be used in
//! production. They use `.expect()` on lock operations which will panic
//! if locks are poisoned. Production code should use the Postgres
//! adapters.

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{
    ChargeId, CourseId, DomainError, ErrorCode, WebhookRecordId,
};
use crate::domain::fulfillment::{LineItem, Order, WebhookRecord};
use crate::ports::{CreateOutcome, LineItemStore, OrderStore, WebhookRecordStore};

/// In-memory webhook record store for testing.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryWebhookRecordStore {
    records: RwLock<HashMap<WebhookRecordId, WebhookRecord>>,
}

impl InMemoryWebhookRecordStore {
    /// Creates a new empty record store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all stored records (for test assertions).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn records(&self) -> Vec<WebhookRecord> {
        self.records
            .read()
            .expect("InMemoryWebhookRecordStore: records lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Returns count of stored records.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn record_count(&self) -> usize {
        self.records
            .read()
            .expect("InMemoryWebhookRecordStore: records lock poisoned")
            .len()
    }

    fn with_record<F>(&self, id: &WebhookRecordId, apply: F) -> Result<(), DomainError>
    where
        F: FnOnce(&mut WebhookRecord) -> Result<(), DomainError>,
    {
        let mut records = self
            .records
            .write()
            .expect("InMemoryWebhookRecordStore: records write lock poisoned");

        let record = records.get_mut(id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::WebhookRecordNotFound,
                format!("No webhook record with id {}", id),
            )
        })?;

        apply(record)
    }
}

impl Default for InMemoryWebhookRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookRecordStore for InMemoryWebhookRecordStore {
    async fn persist(&self, record: WebhookRecord) -> Result<(), DomainError> {
        self.records
            .write()
            .expect("InMemoryWebhookRecordStore: records write lock poisoned")
            .insert(record.id, record);
        Ok(())
    }

    async fn mark_processing(&self, id: &WebhookRecordId) -> Result<(), DomainError> {
        self.with_record(id, |record| record.mark_processing())
    }

    async fn mark_done(&self, id: &WebhookRecordId) -> Result<(), DomainError> {
        self.with_record(id, |record| record.mark_done())
    }

    async fn mark_failed(&self, id: &WebhookRecordId) -> Result<(), DomainError> {
        self.with_record(id, |record| record.mark_failed())
    }

    async fn find(&self, id: &WebhookRecordId) -> Result<Option<WebhookRecord>, DomainError> {
        Ok(self
            .records
            .read()
            .expect("InMemoryWebhookRecordStore: records lock poisoned")
            .get(id)
            .cloned())
    }
}

/// In-memory order store for testing.
///
/// Creation is a single conditional insert under the write lock, so
/// concurrent callers observe first-writer-wins exactly like the
/// Postgres adapter.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<ChargeId, Order>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty order store.
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }

    // === Test Helpers ===

    /// Returns count of stored orders.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn order_count(&self) -> usize {
        self.orders
            .read()
            .expect("InMemoryOrderStore: orders lock poisoned")
            .len()
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get_or_create(&self, candidate: Order) -> Result<CreateOutcome<Order>, DomainError> {
        let mut orders = self
            .orders
            .write()
            .expect("InMemoryOrderStore: orders write lock poisoned");

        match orders.entry(candidate.charge_id.clone()) {
            Entry::Occupied(entry) => Ok(CreateOutcome::Existing(entry.get().clone())),
            Entry::Vacant(entry) => {
                entry.insert(candidate.clone());
                Ok(CreateOutcome::Created(candidate))
            }
        }
    }

    async fn find(&self, charge_id: &ChargeId) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .read()
            .expect("InMemoryOrderStore: orders lock poisoned")
            .get(charge_id)
            .cloned())
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let mut orders = self
            .orders
            .write()
            .expect("InMemoryOrderStore: orders write lock poisoned");

        match orders.get_mut(&order.charge_id) {
            Some(stored) => {
                *stored = order.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("No order for charge {}", order.charge_id),
            )),
        }
    }
}

/// In-memory line item store for testing.
///
/// Items are keyed by the `(order_id, course_id, email)` triple, the
/// same uniqueness the Postgres adapter enforces with a constraint.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
pub struct InMemoryLineItemStore {
    items: RwLock<HashMap<(ChargeId, CourseId, String), LineItem>>,
}

impl InMemoryLineItemStore {
    /// Creates a new empty line item store.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all stored items (for test assertions).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn items(&self) -> Vec<LineItem> {
        self.items
            .read()
            .expect("InMemoryLineItemStore: items lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Returns count of stored items.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn item_count(&self) -> usize {
        self.items
            .read()
            .expect("InMemoryLineItemStore: items lock poisoned")
            .len()
    }

    fn key_of(item: &LineItem) -> (ChargeId, CourseId, String) {
        (
            item.order_id.clone(),
            item.course_id.clone(),
            item.email.clone(),
        )
    }
}

impl Default for InMemoryLineItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineItemStore for InMemoryLineItemStore {
    async fn get_or_create(
        &self,
        candidate: LineItem,
    ) -> Result<CreateOutcome<LineItem>, DomainError> {
        let mut items = self
            .items
            .write()
            .expect("InMemoryLineItemStore: items write lock poisoned");

        match items.entry(Self::key_of(&candidate)) {
            Entry::Occupied(entry) => Ok(CreateOutcome::Existing(entry.get().clone())),
            Entry::Vacant(entry) => {
                entry.insert(candidate.clone());
                Ok(CreateOutcome::Created(candidate))
            }
        }
    }

    async fn update(&self, item: &LineItem) -> Result<(), DomainError> {
        let mut items = self
            .items
            .write()
            .expect("InMemoryLineItemStore: items write lock poisoned");

        match items.get_mut(&Self::key_of(item)) {
            Some(stored) => {
                *stored = item.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::LineItemNotFound,
                format!("No line item with id {}", item.id),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fulfillment::{FulfillmentStatus, RecordStatus};

    fn test_order(charge_id: &str) -> Order {
        Order {
            charge_id: ChargeId::new(charge_id).unwrap(),
            email: "buyer@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            status: FulfillmentStatus::New,
            webhook_id: None,
            received_at: crate::domain::foundation::Timestamp::now(),
            updated_at: crate::domain::foundation::Timestamp::now(),
        }
    }

    fn test_item(charge_id: &str, course_id: &str, email: &str) -> LineItem {
        LineItem::new(
            ChargeId::new(charge_id).unwrap(),
            CourseId::new(course_id).unwrap(),
            email.to_string(),
            None,
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Record Store Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn persist_and_find_record() {
        let store = InMemoryWebhookRecordStore::new();
        let record = WebhookRecord::receive("{}", HashMap::new());
        let id = record.id;

        store.persist(record).await.unwrap();

        let found = store.find(&id).await.unwrap().unwrap();
        assert_eq!(found.status, RecordStatus::Received);
        assert_eq!(store.record_count(), 1);
    }

    #[tokio::test]
    async fn record_walks_through_lifecycle() {
        let store = InMemoryWebhookRecordStore::new();
        let record = WebhookRecord::receive("{}", HashMap::new());
        let id = record.id;
        store.persist(record).await.unwrap();

        store.mark_processing(&id).await.unwrap();
        assert_eq!(
            store.find(&id).await.unwrap().unwrap().status,
            RecordStatus::Processing
        );

        store.mark_done(&id).await.unwrap();
        assert_eq!(
            store.find(&id).await.unwrap().unwrap().status,
            RecordStatus::Done
        );
    }

    #[tokio::test]
    async fn settled_record_cannot_regress() {
        let store = InMemoryWebhookRecordStore::new();
        let record = WebhookRecord::receive("{}", HashMap::new());
        let id = record.id;
        store.persist(record).await.unwrap();

        store.mark_processing(&id).await.unwrap();
        store.mark_failed(&id).await.unwrap();

        let result = store.mark_done(&id).await;
        assert!(result.is_err());
        assert_eq!(
            store.find(&id).await.unwrap().unwrap().status,
            RecordStatus::Failed
        );
    }

    #[tokio::test]
    async fn marking_unknown_record_reports_not_found() {
        let store = InMemoryWebhookRecordStore::new();
        let result = store.mark_processing(&WebhookRecordId::new()).await;

        let err = result.unwrap_err();
        assert_eq!(err.code, ErrorCode::WebhookRecordNotFound);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Order Store Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn first_create_inserts_the_candidate() {
        let store = InMemoryOrderStore::new();

        let outcome = store.get_or_create(test_order("chrg_1")).await.unwrap();

        assert!(outcome.was_created());
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn second_create_returns_the_existing_row() {
        let store = InMemoryOrderStore::new();
        let mut first = test_order("chrg_1");
        first.start_processing().unwrap();
        store.get_or_create(first).await.unwrap();

        let outcome = store.get_or_create(test_order("chrg_1")).await.unwrap();

        assert!(!outcome.was_created());
        // The winner's state is returned, not the new candidate's
        assert_eq!(outcome.get().status, FulfillmentStatus::Processing);
        assert_eq!(store.order_count(), 1);
    }

    #[tokio::test]
    async fn update_replaces_stored_order() {
        let store = InMemoryOrderStore::new();
        let mut order = store
            .get_or_create(test_order("chrg_1"))
            .await
            .unwrap()
            .into_inner();

        order.start_processing().unwrap();
        store.update(&order).await.unwrap();

        let found = store
            .find(&ChargeId::new("chrg_1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.status, FulfillmentStatus::Processing);
    }

    #[tokio::test]
    async fn update_of_unknown_order_reports_not_found() {
        let store = InMemoryOrderStore::new();
        let err = store.update(&test_order("chrg_missing")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn find_returns_none_for_unknown_charge() {
        let store = InMemoryOrderStore::new();
        let found = store
            .find(&ChargeId::new("chrg_nope").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn concurrent_creates_produce_a_single_row() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryOrderStore::new());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.get_or_create(test_order("chrg_race")).await })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap().unwrap().was_created() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.order_count(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Line Item Store Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn items_are_keyed_by_order_course_and_email() {
        let store = InMemoryLineItemStore::new();

        store
            .get_or_create(test_item("chrg_1", "C1", "a@x.com"))
            .await
            .unwrap();
        store
            .get_or_create(test_item("chrg_1", "C2", "a@x.com"))
            .await
            .unwrap();
        store
            .get_or_create(test_item("chrg_1", "C1", "b@x.com"))
            .await
            .unwrap();

        // Same key as the first insert
        let outcome = store
            .get_or_create(test_item("chrg_1", "C1", "a@x.com"))
            .await
            .unwrap();

        assert!(!outcome.was_created());
        assert_eq!(store.item_count(), 3);
    }

    #[tokio::test]
    async fn duplicate_item_keeps_the_winners_state() {
        let store = InMemoryLineItemStore::new();
        let mut first = test_item("chrg_1", "C1", "a@x.com");
        first.start_processing().unwrap();
        first.finish_processing().unwrap();
        store.get_or_create(first).await.unwrap();

        let outcome = store
            .get_or_create(test_item("chrg_1", "C1", "a@x.com"))
            .await
            .unwrap();

        assert_eq!(outcome.get().status, FulfillmentStatus::Processed);
    }

    #[tokio::test]
    async fn update_replaces_stored_item() {
        let store = InMemoryLineItemStore::new();
        let mut item = store
            .get_or_create(test_item("chrg_1", "C1", "a@x.com"))
            .await
            .unwrap()
            .into_inner();

        item.start_processing().unwrap();
        store.update(&item).await.unwrap();

        let stored = store.items();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, FulfillmentStatus::Processing);
    }

    #[tokio::test]
    async fn update_of_unknown_item_reports_not_found() {
        let store = InMemoryLineItemStore::new();
        let err = store
            .update(&test_item("chrg_1", "C1", "a@x.com"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::LineItemNotFound);
    }
}
