//! Registration repository for database operations

use async_trait::async_trait;
use campus_common::error::DatabaseResult;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::{RegistrationRepository, user::decode_role};
use crate::models::{EventSummary, PopularEvent, RegistrationDetails, UserSummary};

/// Columns selected from `registrations r JOIN users u JOIN events e`
const REGISTRATION_COLUMNS: &str = r#"
    r.id, r.created_at,
    u.id AS user_id, u.name AS user_name, u.email AS user_email, u.role AS user_role,
    e.id AS event_id, e.title AS event_title, e.description AS event_description,
    e.date AS event_date
"#;

const REGISTRATION_JOINS: &str = r#"
    JOIN users u ON u.id = r.user_id
    JOIN events e ON e.id = r.event_id
"#;

/// PostgreSQL registration repository
#[derive(Clone)]
pub struct PgRegistrationRepository {
    pool: PgPool,
}

impl PgRegistrationRepository {
    /// Create a new registration repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(
        &self,
        filter: &str,
        order: &str,
        id: Option<Uuid>,
    ) -> DatabaseResult<Vec<RegistrationDetails>> {
        let query = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations r {REGISTRATION_JOINS} {filter} ORDER BY {order}"
        );

        let mut q = sqlx::query(&query);
        if let Some(id) = id {
            q = q.bind(id);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(registration_from_row).collect()
    }
}

fn registration_from_row(row: &PgRow) -> DatabaseResult<RegistrationDetails> {
    let role = decode_role(row, "user_role")?;

    Ok(RegistrationDetails {
        id: row.try_get("id")?,
        user: UserSummary {
            id: row.try_get("user_id")?,
            name: row.try_get("user_name")?,
            email: row.try_get("user_email")?,
            role,
        },
        event: EventSummary {
            id: row.try_get("event_id")?,
            title: row.try_get("event_title")?,
            description: row.try_get("event_description")?,
            date: row.try_get("event_date")?,
        },
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl RegistrationRepository for PgRegistrationRepository {
    async fn create(&self, user_id: Uuid, event_id: Uuid) -> DatabaseResult<RegistrationDetails> {
        info!("Registering user {} for event {}", user_id, event_id);

        let query = format!(
            "WITH r AS (
                 INSERT INTO registrations (user_id, event_id)
                 VALUES ($1, $2)
                 RETURNING *
             )
             SELECT {REGISTRATION_COLUMNS} FROM r {REGISTRATION_JOINS}"
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        registration_from_row(&row)
    }

    async fn exists(&self, user_id: Uuid, event_id: Uuid) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM registrations WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn delete(&self, user_id: Uuid, event_id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM registrations WHERE user_id = $1 AND event_id = $2")
            .bind(user_id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<RegistrationDetails>> {
        self.fetch_where("WHERE r.user_id = $1", "r.created_at DESC", Some(user_id))
            .await
    }

    async fn list_all(&self) -> DatabaseResult<Vec<RegistrationDetails>> {
        self.fetch_where("", "r.created_at DESC", None).await
    }

    async fn list_for_event(&self, event_id: Uuid) -> DatabaseResult<Vec<RegistrationDetails>> {
        self.fetch_where("WHERE r.event_id = $1", "r.created_at ASC", Some(event_id))
            .await
    }

    async fn count(&self) -> DatabaseResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM registrations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> DatabaseResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM registrations WHERE created_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn most_registered(&self, limit: i64) -> DatabaseResult<Vec<PopularEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.title, e.date, COUNT(r.id) AS registration_count
            FROM registrations r
            JOIN events e ON e.id = r.event_id
            GROUP BY e.id, e.title, e.date
            ORDER BY registration_count DESC, MIN(r.created_at) ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> DatabaseResult<PopularEvent> {
                Ok(PopularEvent {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    date: row.try_get("date")?,
                    registration_count: row.try_get("registration_count")?,
                })
            })
            .collect()
    }
}
