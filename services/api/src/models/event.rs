//! Event models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Creator fields joined into every event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Creator {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Event joined with its creator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub created_by: Creator,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event fields embedded in registration listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
}

/// Validated input for a new event
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub created_by: Uuid,
}

/// Partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default)]
pub struct EventChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date: Option<DateTime<Utc>>,
}

/// Upcoming vs. past split relative to a reference instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventPeriodCounts {
    pub upcoming: i64,
    pub past: i64,
}

impl EventPeriodCounts {
    pub fn total(&self) -> i64 {
        self.upcoming + self.past
    }
}

/// Request for event creation
#[derive(Debug, Default, Deserialize)]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

/// Request for event update. `description: null` clears the description,
/// an absent `description` keeps it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub date: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
