//! PostgreSQL implementation of LineItemStore.
//!
//! Provides persistent storage for LineItem aggregates using PostgreSQL.
//! The `(order_id, course_id, email)` uniqueness constraint carries the
//! one-fulfillment-per-purchase invariant; creation races resolve to a
//! single row through `INSERT .. ON CONFLICT DO NOTHING`.

use crate::domain::foundation::{
    ChargeId, CourseId, DomainError, ErrorCode, LineItemId, Timestamp,
};
use crate::domain::fulfillment::{FulfillmentStatus, LineItem};
use crate::ports::{CreateOutcome, LineItemStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the LineItemStore port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
pub struct PostgresLineItemStore {
    pool: PgPool,
}

impl PostgresLineItemStore {
    /// Creates a new PostgresLineItemStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_key(
        &self,
        order_id: &ChargeId,
        course_id: &CourseId,
        email: &str,
    ) -> Result<Option<LineItem>, DomainError> {
        let row: Option<LineItemRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, course_id, email, sku, status, created_at, updated_at
            FROM line_items
            WHERE order_id = $1 AND course_id = $2 AND email = $3
            "#,
        )
        .bind(order_id.as_str())
        .bind(course_id.as_str())
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find line item: {}", e))
        })?;

        row.map(LineItem::try_from).transpose()
    }
}

/// Database row representation of a line item.
#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: Uuid,
    order_id: String,
    course_id: String,
    email: String,
    sku: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LineItemRow> for LineItem {
    type Error = DomainError;

    fn try_from(row: LineItemRow) -> Result<Self, Self::Error> {
        let status = parse_fulfillment_status(&row.status)?;

        Ok(LineItem {
            id: LineItemId::from_uuid(row.id),
            order_id: ChargeId::new(row.order_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid order_id: {}", e))
            })?,
            course_id: CourseId::new(row.course_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid course_id: {}", e))
            })?,
            email: row.email,
            sku: row.sku,
            status,
            created_at: Timestamp::from_datetime(row.created_at),
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
impl LineItemStore for PostgresLineItemStore {
    async fn get_or_create(
        &self,
        candidate: LineItem,
    ) -> Result<CreateOutcome<LineItem>, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO line_items (
                id, order_id, course_id, email, sku, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (order_id, course_id, email) DO NOTHING
            "#,
        )
        .bind(candidate.id.as_uuid())
        .bind(candidate.order_id.as_str())
        .bind(candidate.course_id.as_str())
        .bind(&candidate.email)
        .bind(&candidate.sku)
        .bind(fulfillment_status_to_string(&candidate.status))
        .bind(candidate.created_at.as_datetime())
        .bind(candidate.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to insert line item: {}", e))
        })?;

        let inserted = result.rows_affected() == 1;

        let stored = self
            .find_by_key(&candidate.order_id, &candidate.course_id, &candidate.email)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Line item row for {} vanished after insert", candidate.id),
                )
            })?;

        if inserted {
            Ok(CreateOutcome::Created(stored))
        } else {
            Ok(CreateOutcome::Existing(stored))
        }
    }

    async fn update(&self, item: &LineItem) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE line_items SET
                sku = $2,
                status = $3,
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.sku)
        .bind(fulfillment_status_to_string(&item.status))
        .bind(item.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update line item: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::LineItemNotFound,
                format!("No line item with id {}", item.id),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_status_conversion() {
        for status in [
            FulfillmentStatus::New,
            FulfillmentStatus::Processing,
            FulfillmentStatus::Processed,
            FulfillmentStatus::Error,
        ] {
            let s = fulfillment_status_to_string(&status);
            let parsed = parse_fulfillment_status(s).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn parse_fulfillment_status_rejects_invalid_values() {
        assert!(parse_fulfillment_status("done").is_err());
        assert!(parse_fulfillment_status("").is_err());
    }

    #[test]
    fn row_converts_to_entity() {
        let id = Uuid::new_v4();
        let row = LineItemRow {
            id,
            order_id: "chrg_1".to_string(),
            course_id: "course-v1:Org+CS101+2024".to_string(),
            email: "learner@example.com".to_string(),
            sku: Some("CS-101".to_string()),
            status: "processed".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let item = LineItem::try_from(row).unwrap();
        assert_eq!(item.id.as_uuid(), &id);
        assert_eq!(item.order_id.as_str(), "chrg_1");
        assert_eq!(item.course_id.as_str(), "course-v1:Org+CS101+2024");
        assert_eq!(item.status, FulfillmentStatus::Processed);
    }

    #[test]
    fn row_with_empty_course_id_fails_conversion() {
        let row = LineItemRow {
            id: Uuid::new_v4(),
            order_id: "chrg_1".to_string(),
            course_id: "".to_string(),
            email: "learner@example.com".to_string(),
            sku: None,
            status: "new".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(LineItem::try_from(row).is_err());
    }
}
