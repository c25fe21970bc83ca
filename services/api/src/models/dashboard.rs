//! Admin dashboard aggregates

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub overview: Overview,
    pub users: UserBreakdown,
    pub events: EventBreakdown,
    pub registrations: RegistrationBreakdown,
    pub popular_events: Vec<PopularEvent>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_users: i64,
    pub total_events: i64,
    pub total_registrations: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserBreakdown {
    pub total: i64,
    pub students: i64,
    pub admins: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventBreakdown {
    pub total: i64,
    pub upcoming: i64,
    pub past: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationBreakdown {
    pub total: i64,
    pub last_seven_days: i64,
}

/// One entry of the most-registered ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularEvent {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub registration_count: i64,
}
