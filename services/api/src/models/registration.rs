//! Registration models for the API service

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{event::EventSummary, user::UserSummary};

/// Registration joined with the registered user and the event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDetails {
    pub id: Uuid,
    pub user: UserSummary,
    pub event: EventSummary,
    pub created_at: DateTime<Utc>,
}

/// Registrations of one event, with the event title echoed back
#[derive(Debug, Clone)]
pub struct EventRegistrations {
    pub event_title: String,
    pub registrations: Vec<RegistrationDetails>,
}
