//! PostgreSQL implementation of PaymentStore.
//!
//! Provides persistent storage for PaymentTransaction aggregates and the
//! row-locked unit of work backing webhook processing.

use crate::domain::foundation::{DomainError, ErrorCode, Money, PaymentId, Timestamp, UserId};
use crate::domain::payment::{PaymentMethod, PaymentStatus, PaymentTransaction};
use crate::ports::{PaymentStore, WebhookTxn};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, user_id, order_id, amount_cents, currency, payment_method, \
     status, gateway_transaction_id, snap_token, redirect_url, fraud_status, \
     idempotency_key, webhook_payload, \
     expires_at, created_at, updated_at, paid_at, expired_at";

/// PostgreSQL implementation of the PaymentStore port.
pub struct PostgresPaymentStore {
    pool: PgPool,
}

impl PostgresPaymentStore {
    /// Creates a new PostgresPaymentStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment transaction.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    user_id: Uuid,
    order_id: String,
    amount_cents: i64,
    currency: String,
    payment_method: String,
    status: String,
    gateway_transaction_id: Option<String>,
    snap_token: Option<String>,
    redirect_url: Option<String>,
    fraud_status: Option<String>,
    idempotency_key: Option<String>,
    webhook_payload: Option<serde_json::Value>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    expired_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for PaymentTransaction {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status: PaymentStatus = row.status.parse().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid status: {}", e))
        })?;
        let payment_method: PaymentMethod = row.payment_method.parse().map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid payment method: {}", e),
            )
        })?;

        Ok(PaymentTransaction {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            order_id: row.order_id,
            amount: Money::from_cents(row.amount_cents),
            currency: row.currency,
            payment_method,
            status,
            gateway_transaction_id: row.gateway_transaction_id,
            snap_token: row.snap_token,
            redirect_url: row.redirect_url,
            fraud_status: row.fraud_status,
            idempotency_key: row.idempotency_key,
            webhook_payload: row.webhook_payload,
            expires_at: Timestamp::from_datetime(row.expires_at),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            paid_at: row.paid_at.map(Timestamp::from_datetime),
            expired_at: row.expired_at.map(Timestamp::from_datetime),
        })
    }
}

/// Row-locked transaction over a single payment.
///
/// Holds an open Postgres transaction with a `SELECT ... FOR UPDATE` on
/// the payment row. Dropping without committing rolls back.
struct PgWebhookTxn {
    txn: Transaction<'static, Postgres>,
    payment: PaymentTransaction,
}

#[async_trait]
impl WebhookTxn for PgWebhookTxn {
    fn payment(&mut self) -> &mut PaymentTransaction {
        &mut self.payment
    }

    async fn save_and_commit(self: Box<Self>) -> Result<(), DomainError> {
        let Self { mut txn, payment } = *self;
        update_payment(&mut txn, &payment).await?;
        txn.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit webhook transaction: {}", e),
            )
        })
    }

    async fn commit_unchanged(self: Box<Self>) -> Result<(), DomainError> {
        self.txn.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit webhook transaction: {}", e),
            )
        })
    }
}

async fn update_payment(
    txn: &mut Transaction<'static, Postgres>,
    payment: &PaymentTransaction,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        UPDATE payments SET
            payment_method = $2,
            status = $3,
            gateway_transaction_id = $4,
            snap_token = $5,
            redirect_url = $6,
            fraud_status = $7,
            webhook_payload = $8,
            updated_at = $9,
            paid_at = $10,
            expired_at = $11
        WHERE id = $1
        "#,
    )
    .bind(payment.id.as_uuid())
    .bind(payment.payment_method.as_str())
    .bind(payment.status.as_str())
    .bind(&payment.gateway_transaction_id)
    .bind(&payment.snap_token)
    .bind(&payment.redirect_url)
    .bind(&payment.fraud_status)
    .bind(&payment.webhook_payload)
    .bind(payment.updated_at.as_datetime())
    .bind(payment.paid_at.as_ref().map(Timestamp::as_datetime))
    .bind(payment.expired_at.as_ref().map(Timestamp::as_datetime))
    .execute(&mut **txn)
    .await
    .map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to update payment: {}", e),
        )
    })?;

    Ok(())
}

#[async_trait]
impl PaymentStore for PostgresPaymentStore {
    async fn insert(&self, payment: &PaymentTransaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, order_id, amount_cents, currency, payment_method,
                status, gateway_transaction_id, snap_token, redirect_url, fraud_status,
                idempotency_key, webhook_payload,
                expires_at, created_at, updated_at, paid_at, expired_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_uuid())
        .bind(&payment.order_id)
        .bind(payment.amount.as_cents())
        .bind(&payment.currency)
        .bind(payment.payment_method.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.gateway_transaction_id)
        .bind(&payment.snap_token)
        .bind(&payment.redirect_url)
        .bind(&payment.fraud_status)
        .bind(&payment.idempotency_key)
        .bind(&payment.webhook_payload)
        .bind(payment.expires_at.as_datetime())
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .bind(payment.paid_at.as_ref().map(Timestamp::as_datetime))
        .bind(payment.expired_at.as_ref().map(Timestamp::as_datetime))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("payments_order_id_key") {
                    return DomainError::new(
                        ErrorCode::DuplicatePayment,
                        "A payment with this order id already exists",
                    );
                }
                if db_err.constraint() == Some("payments_user_id_idempotency_key_key") {
                    return DomainError::new(
                        ErrorCode::DuplicatePayment,
                        "A payment with this idempotency key already exists",
                    );
                }
            }
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert payment: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(&self, payment: &PaymentTransaction) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                payment_method = $2,
                status = $3,
                gateway_transaction_id = $4,
                snap_token = $5,
                redirect_url = $6,
                fraud_status = $7,
                webhook_payload = $8,
                updated_at = $9,
                paid_at = $10,
                expired_at = $11
            WHERE id = $1
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.payment_method.as_str())
        .bind(payment.status.as_str())
        .bind(&payment.gateway_transaction_id)
        .bind(&payment.snap_token)
        .bind(&payment.redirect_url)
        .bind(&payment.fraud_status)
        .bind(&payment.webhook_payload)
        .bind(payment.updated_at.as_datetime())
        .bind(payment.paid_at.as_ref().map(Timestamp::as_datetime))
        .bind(payment.expired_at.as_ref().map(Timestamp::as_datetime))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update payment: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                "Payment not found",
            ));
        }

        Ok(())
    }

    async fn find_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<PaymentTransaction>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM payments WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find payment: {}", e),
            )
        })?;

        row.map(PaymentTransaction::try_from).transpose()
    }

    async fn find_open_pending_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<PaymentTransaction>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM payments
            WHERE user_id = $1 AND status = 'PENDING' AND expires_at > $2
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find pending payment: {}", e),
            )
        })?;

        row.map(PaymentTransaction::try_from).transpose()
    }

    async fn find_by_idempotency_key(
        &self,
        user_id: &UserId,
        key: &str,
    ) -> Result<Option<PaymentTransaction>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM payments WHERE user_id = $1 AND idempotency_key = $2"
        ))
        .bind(user_id.as_uuid())
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find payment by idempotency key: {}", e),
            )
        })?;

        row.map(PaymentTransaction::try_from).transpose()
    }

    async fn has_successful_payment(&self, user_id: &UserId) -> Result<bool, DomainError> {
        let exists: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM payments WHERE user_id = $1 AND status = 'SUCCESS' LIMIT 1")
                .bind(user_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to check payment history: {}", e),
                    )
                })?;

        Ok(exists.is_some())
    }

    async fn begin_webhook(
        &self,
        order_id: &str,
    ) -> Result<Option<Box<dyn WebhookTxn>>, DomainError> {
        let mut txn = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin webhook transaction: {}", e),
            )
        })?;

        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM payments WHERE order_id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut *txn)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to lock payment: {}", e),
            )
        })?;

        match row {
            Some(row) => {
                let payment = PaymentTransaction::try_from(row)?;
                Ok(Some(Box::new(PgWebhookTxn { txn, payment })))
            }
            None => Ok(None),
        }
    }
}
