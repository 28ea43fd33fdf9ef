//! PostgreSQL implementation of WebhookRecordStore.
//!
//! Provides persistent storage for webhook delivery records using PostgreSQL.

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, WebhookRecordId};
use crate::domain::fulfillment::{RecordStatus, WebhookRecord};
use crate::ports::WebhookRecordStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// PostgreSQL implementation of the WebhookRecordStore port.
///
/// Uses sqlx for type-safe database operations with connection pooling.
/// Status updates load the row and apply the entity's guarded
/// transitions before writing back, so settled records never regress.
pub struct PostgresWebhookRecordStore {
    pool: PgPool,
}

impl PostgresWebhookRecordStore {
    /// Creates a new PostgresWebhookRecordStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, id: &WebhookRecordId) -> Result<WebhookRecord, DomainError> {
        self.find(id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::WebhookRecordNotFound,
                format!("No webhook record with id {}", id),
            )
        })
    }

    async fn write_status(&self, record: &WebhookRecord) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE webhook_records SET
                status = $2,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record_status_to_string(&record.status))
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update webhook record: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::WebhookRecordNotFound,
                format!("No webhook record with id {}", record.id),
            ));
        }

        Ok(())
    }
}

/// Database row representation of a webhook record.
#[derive(Debug, sqlx::FromRow)]
struct WebhookRecordRow {
    id: Uuid,
    payload: String,
    headers: String,
    status: String,
    received_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WebhookRecordRow> for WebhookRecord {
    type Error = DomainError;

    fn try_from(row: WebhookRecordRow) -> Result<Self, Self::Error> {
        let status = parse_record_status(&row.status)?;

        let headers: HashMap<String, String> = serde_json::from_str(&row.headers).map_err(|e| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("Invalid stored headers: {}", e),
            )
        })?;

        Ok(WebhookRecord {
            id: WebhookRecordId::from_uuid(row.id),
            payload: row.payload,
            headers,
            status,
            received_at: Timestamp::from_datetime(row.received_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_record_status(s: &str) -> Result<RecordStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "received" => Ok(RecordStatus::Received),
        "processing" => Ok(RecordStatus::Processing),
        "done" => Ok(RecordStatus::Done),
        "failed" => Ok(RecordStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid record status value: {}", s),
        )),
    }
}

fn record_status_to_string(status: &RecordStatus) -> &'static str {
    match status {
        RecordStatus::Received => "received",
        RecordStatus::Processing => "processing",
        RecordStatus::Done => "done",
        RecordStatus::Failed => "failed",
    }
}

fn encode_headers(headers: &HashMap<String, String>) -> Result<String, DomainError> {
    serde_json::to_string(headers).map_err(|e| {
        DomainError::new(
            ErrorCode::SerializationError,
            format!("Failed to encode headers: {}", e),
        )
    })
}

#[async_trait]
impl WebhookRecordStore for PostgresWebhookRecordStore {
    async fn persist(&self, record: WebhookRecord) -> Result<(), DomainError> {
        let headers = encode_headers(&record.headers)?;

        sqlx::query(
            r#"
            INSERT INTO webhook_records (
                id, payload, headers, status, received_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.payload)
        .bind(headers)
        .bind(record_status_to_string(&record.status))
        .bind(record.received_at.as_datetime())
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to persist webhook record: {}", e),
            )
        })?;

        Ok(())
    }

    async fn mark_processing(&self, id: &WebhookRecordId) -> Result<(), DomainError> {
        let mut record = self.load(id).await?;
        record.mark_processing()?;
        self.write_status(&record).await
    }

    async fn mark_done(&self, id: &WebhookRecordId) -> Result<(), DomainError> {
        let mut record = self.load(id).await?;
        record.mark_done()?;
        self.write_status(&record).await
    }

    async fn mark_failed(&self, id: &WebhookRecordId) -> Result<(), DomainError> {
        let mut record = self.load(id).await?;
        record.mark_failed()?;
        self.write_status(&record).await
    }

    async fn find(&self, id: &WebhookRecordId) -> Result<Option<WebhookRecord>, DomainError> {
        let row: Option<WebhookRecordRow> = sqlx::query_as(
            r#"
            SELECT id, payload, headers, status, received_at, updated_at
            FROM webhook_records
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find webhook record: {}", e),
            )
        })?;

        row.map(WebhookRecord::try_from).transpose()
    }
}
