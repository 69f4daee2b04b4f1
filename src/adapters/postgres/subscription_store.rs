//! PostgreSQL implementation of SubscriptionStore.

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{Subscription, SubscriptionPlan, SubscriptionStatus};
use crate::ports::SubscriptionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, user_id, plan, status, started_at, ended_at, \
     provider, provider_reference_id, created_at, updated_at";

/// PostgreSQL implementation of the SubscriptionStore port.
pub struct PostgresSubscriptionStore {
    pool: PgPool,
}

impl PostgresSubscriptionStore {
    /// Creates a new PostgresSubscriptionStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    plan: String,
    status: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    provider: Option<String>,
    provider_reference_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let plan: SubscriptionPlan = row.plan.parse().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid plan: {}", e))
        })?;
        let status: SubscriptionStatus = row.status.parse().map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid status: {}", e))
        })?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            plan,
            status,
            started_at: Timestamp::from_datetime(row.started_at),
            ended_at: row.ended_at.map(Timestamp::from_datetime),
            provider: row.provider,
            provider_reference_id: row.provider_reference_id,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    async fn insert(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan, status, started_at, ended_at,
                provider, provider_reference_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(subscription.plan.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.started_at.as_datetime())
        .bind(subscription.ended_at.as_ref().map(Timestamp::as_datetime))
        .bind(&subscription.provider)
        .bind(&subscription.provider_reference_id)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert subscription: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan = $2,
                status = $3,
                ended_at = $4,
                provider = $5,
                provider_reference_id = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.plan.as_str())
        .bind(subscription.status.as_str())
        .bind(subscription.ended_at.as_ref().map(Timestamp::as_datetime))
        .bind(&subscription.provider)
        .bind(&subscription.provider_reference_id)
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update subscription: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            ));
        }

        Ok(())
    }

    async fn find_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM subscriptions
            WHERE user_id = $1
              AND status = 'ACTIVE'
              AND (ended_at IS NULL OR ended_at > $2)
            ORDER BY started_at DESC
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
                format!("Failed to find subscription: {}", e),
            )
        })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn has_had_plan(
        &self,
        user_id: &UserId,
        plan: SubscriptionPlan,
        statuses: &[SubscriptionStatus],
    ) -> Result<bool, DomainError> {
        let statuses: Vec<&str> = statuses.iter().map(SubscriptionStatus::as_str).collect();

        let exists: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT 1 FROM subscriptions
            WHERE user_id = $1 AND plan = $2 AND status = ANY($3)
            LIMIT 1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(plan.as_str())
        .bind(&statuses)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to check plan history: {}", e),
            )
        })?;

        Ok(exists.is_some())
    }

    async fn expire_due(&self, now: &Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = 'EXPIRED',
                updated_at = $1
            WHERE status = 'ACTIVE' AND ended_at IS NOT NULL AND ended_at <= $1
            "#,
        )
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to expire subscriptions: {}", e),
            )
        })?;

        Ok(result.rows_affected())
    }
}
