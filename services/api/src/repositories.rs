//! Repositories for database operations
//!
//! Each store is a trait so the services can run against PostgreSQL in
//! production and against an in-memory store in tests.

use async_trait::async_trait;
use campus_common::error::DatabaseResult;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    EventChanges, EventDetails, EventPeriodCounts, NewEvent, NewUser, PopularEvent,
    RegistrationDetails, RoleCounts, User,
};

pub mod event;
#[cfg(test)]
pub mod memory;
pub mod registration;
pub mod user;

pub use event::PgEventRepository;
pub use registration::PgRegistrationRepository;
pub use user::PgUserRepository;

/// Unique constraint on `users.email`
pub const USERS_EMAIL_KEY: &str = "users_email_key";
/// Unique constraint on `registrations (user_id, event_id)`
pub const REGISTRATIONS_USER_EVENT_KEY: &str = "registrations_user_event_key";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken email fails with a unique violation on [`USERS_EMAIL_KEY`]
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User>;
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;
    /// All users, newest first
    async fn list(&self) -> DatabaseResult<Vec<User>>;
    async fn count_by_role(&self) -> DatabaseResult<RoleCounts>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events ordered by date ascending
    async fn list(&self) -> DatabaseResult<Vec<EventDetails>>;
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<EventDetails>>;
    async fn create(&self, new_event: &NewEvent) -> DatabaseResult<EventDetails>;
    /// Apply a partial update; `None` if the event does not exist
    async fn update(&self, id: Uuid, changes: &EventChanges)
    -> DatabaseResult<Option<EventDetails>>;
    /// Delete the event and every registration referencing it as one atomic
    /// step. Returns the number of registrations removed, or `None` if the
    /// event does not exist.
    async fn delete_with_registrations(&self, id: Uuid) -> DatabaseResult<Option<u64>>;
    /// Events dated at or after `now` are upcoming, earlier ones are past
    async fn count_by_period(&self, now: DateTime<Utc>) -> DatabaseResult<EventPeriodCounts>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Insert a registration. A duplicate pair fails with a unique violation
    /// on [`REGISTRATIONS_USER_EVENT_KEY`], a missing event with a foreign
    /// key violation.
    async fn create(&self, user_id: Uuid, event_id: Uuid) -> DatabaseResult<RegistrationDetails>;
    async fn exists(&self, user_id: Uuid, event_id: Uuid) -> DatabaseResult<bool>;
    /// Returns whether a registration was removed
    async fn delete(&self, user_id: Uuid, event_id: Uuid) -> DatabaseResult<bool>;
    /// Registrations of one user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<RegistrationDetails>>;
    /// Every registration, newest first
    async fn list_all(&self) -> DatabaseResult<Vec<RegistrationDetails>>;
    /// Registrations of one event, oldest first
    async fn list_for_event(&self, event_id: Uuid) -> DatabaseResult<Vec<RegistrationDetails>>;
    async fn count(&self) -> DatabaseResult<i64>;
    async fn count_since(&self, since: DateTime<Utc>) -> DatabaseResult<i64>;
    /// Events ranked by registration count, highest first. Equal counts
    /// are ordered by the earliest registration of each event.
    async fn most_registered(&self, limit: i64) -> DatabaseResult<Vec<PopularEvent>>;
}
