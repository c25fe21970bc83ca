//! Event repository for database operations

use async_trait::async_trait;
use campus_common::error::DatabaseResult;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::EventRepository;
use crate::models::{Creator, EventChanges, EventDetails, EventPeriodCounts, NewEvent};

/// Columns selected from an `events e JOIN users u` source
const EVENT_COLUMNS: &str = r#"
    e.id, e.title, e.description, e.date, e.created_at, e.updated_at,
    u.id AS creator_id, u.name AS creator_name, u.email AS creator_email
"#;

/// PostgreSQL event repository
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Create a new event repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn event_from_row(row: &PgRow) -> DatabaseResult<EventDetails> {
    Ok(EventDetails {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        created_by: Creator {
            id: row.try_get("creator_id")?,
            name: row.try_get("creator_name")?,
            email: row.try_get("creator_email")?,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn list(&self) -> DatabaseResult<Vec<EventDetails>> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events e JOIN users u ON u.id = e.created_by
             ORDER BY e.date ASC, e.created_at ASC"
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<EventDetails>> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events e JOIN users u ON u.id = e.created_by
             WHERE e.id = $1"
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn create(&self, new_event: &NewEvent) -> DatabaseResult<EventDetails> {
        info!("Creating event '{}'", new_event.title);

        let query = format!(
            "WITH inserted AS (
                 INSERT INTO events (title, description, date, created_by)
                 VALUES ($1, $2, $3, $4)
                 RETURNING *
             )
             SELECT {EVENT_COLUMNS} FROM inserted e JOIN users u ON u.id = e.created_by"
        );

        let row = sqlx::query(&query)
            .bind(&new_event.title)
            .bind(&new_event.description)
            .bind(new_event.date)
            .bind(new_event.created_by)
            .fetch_one(&self.pool)
            .await?;

        event_from_row(&row)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &EventChanges,
    ) -> DatabaseResult<Option<EventDetails>> {
        let query = format!(
            "WITH updated AS (
                 UPDATE events
                 SET title = COALESCE($2, title),
                     description = CASE WHEN $3 THEN $4 ELSE description END,
                     date = COALESCE($5, date),
                     updated_at = NOW()
                 WHERE id = $1
                 RETURNING *
             )
             SELECT {EVENT_COLUMNS} FROM updated e JOIN users u ON u.id = e.created_by"
        );

        let description = changes.description.clone().flatten();

        let row = sqlx::query(&query)
            .bind(id)
            .bind(&changes.title)
            .bind(changes.description.is_some())
            .bind(description)
            .bind(changes.date)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn delete_with_registrations(&self, id: Uuid) -> DatabaseResult<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        // Row lock makes concurrent registration inserts wait on their
        // foreign key check until this transaction finishes.
        let locked = sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM registrations WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Deleted event {} and {} registrations", id, removed);
        Ok(Some(removed))
    }

    async fn count_by_period(&self, now: DateTime<Utc>) -> DatabaseResult<EventPeriodCounts> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) FILTER (WHERE date >= $1) AS upcoming,
                   COUNT(*) FILTER (WHERE date < $1) AS past
            FROM events
            "#,
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(EventPeriodCounts {
            upcoming: row.try_get("upcoming")?,
            past: row.try_get("past")?,
        })
    }
}
