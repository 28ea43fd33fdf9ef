//! PostgreSQL implementation of OrderStore.
//!
//! Provides persistent storage for Order aggregates using PostgreSQL.
//! Creation relies on `INSERT .. ON CONFLICT DO NOTHING` against the
//! charge id primary key, so concurrent deliveries of the same charge
//! settle on a single row without application-level locking.

use crate::domain::foundation::{ChargeId, DomainError, ErrorCode, Timestamp, WebhookRecordId};
use crate::domain::fulfillment::{FulfillmentStatus, Order};
use crate::ports::{CreateOutcome, OrderStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the OrderStore port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgresOrderStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an order.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    charge_id: String,
    email: String,
    first_name: String,
    last_name: String,
    status: String,
    webhook_id: Option<Uuid>,
    received_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = parse_fulfillment_status(&row.status)?;

        Ok(Order {
            charge_id: ChargeId::new(row.charge_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid charge_id: {}", e))
            })?,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            status,
            webhook_id: row.webhook_id.map(WebhookRecordId::from_uuid),
            received_at: Timestamp::from_datetime(row.received_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_fulfillment_status(s: &str) -> Result<FulfillmentStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "new" => Ok(FulfillmentStatus::New),
        "processing" => Ok(FulfillmentStatus::Processing),
        "processed" => Ok(FulfillmentStatus::Processed),
        "error" => Ok(FulfillmentStatus::Error),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid status value: {}", s),
        )),
    }
}

fn fulfillment_status_to_string(status: &FulfillmentStatus) -> &'static str {
    match status {
        FulfillmentStatus::New => "new",
        FulfillmentStatus::Processing => "processing",
        FulfillmentStatus::Processed => "processed",
        FulfillmentStatus::Error => "error",
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn get_or_create(&self, candidate: Order) -> Result<CreateOutcome<Order>, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                charge_id, email, first_name, last_name, status,
                webhook_id, received_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (charge_id) DO NOTHING
            "#,
        )
        .bind(candidate.charge_id.as_str())
        .bind(&candidate.email)
        .bind(&candidate.first_name)
        .bind(&candidate.last_name)
        .bind(fulfillment_status_to_string(&candidate.status))
        .bind(candidate.webhook_id.map(|id| *id.as_uuid()))
        .bind(candidate.received_at.as_datetime())
        .bind(candidate.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to insert order: {}", e))
        })?;

        let inserted = result.rows_affected() == 1;

        let stored = self.find(&candidate.charge_id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Order row for {} vanished after insert", candidate.charge_id),
            )
        })?;

        if inserted {
            Ok(CreateOutcome::Created(stored))
        } else {
            Ok(CreateOutcome::Existing(stored))
        }
    }

    async fn find(&self, charge_id: &ChargeId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT charge_id, email, first_name, last_name, status,
                   webhook_id, received_at, updated_at
            FROM orders
            WHERE charge_id = $1
            "#,
        )
        .bind(charge_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find order: {}", e))
        })?;

        row.map(Order::try_from).transpose()
    }

    async fn update(&self, order: &Order) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                email = $2,
                first_name = $3,
                last_name = $4,
                status = $5,
                webhook_id = $6,
                updated_at = $7
            WHERE charge_id = $1
            "#,
        )
        .bind(order.charge_id.as_str())
        .bind(&order.email)
        .bind(&order.first_name)
        .bind(&order.last_name)
        .bind(fulfillment_status_to_string(&order.status))
        .bind(order.webhook_id.map(|id| *id.as_uuid()))
        .bind(order.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update order: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("No order for charge {}", order.charge_id),
            ));
        }

        Ok(())
    }
}
