//! Event CRUD with cascading registration removal

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{CreateEventRequest, EventChanges, EventDetails, NewEvent, UpdateEventRequest},
    repositories::EventRepository,
    validation::parse_event_date,
};

pub(crate) const EVENT_NOT_FOUND: &str = "Event not found";

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
}

/// Trimmed value, or `None` when blank
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    /// All events, soonest first
    pub async fn list(&self) -> ApiResult<Vec<EventDetails>> {
        Ok(self.events.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<EventDetails> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(EVENT_NOT_FOUND.to_string()))
    }

    /// Create an event owned by `creator`
    pub async fn create(
        &self,
        request: CreateEventRequest,
        creator: Uuid,
    ) -> ApiResult<EventDetails> {
        let (Some(title), Some(date)) = (non_blank(request.title), non_blank(request.date)) else {
            return Err(ApiError::Validation(
                "Please provide title and date".to_string(),
            ));
        };

        let date = parse_event_date(&date).map_err(ApiError::Validation)?;

        let event = self
            .events
            .create(&NewEvent {
                title,
                description: non_blank(request.description),
                date,
                created_by: creator,
            })
            .await?;

        info!("Event {} created by {}", event.id, creator);
        Ok(event)
    }

    /// Partial update. A blank title or date leaves the stored value alone;
    /// a present `description`, `null` included, replaces it.
    pub async fn update(&self, id: Uuid, request: UpdateEventRequest) -> ApiResult<EventDetails> {
        let date = match non_blank(request.date) {
            Some(raw) => Some(parse_event_date(&raw).map_err(ApiError::Validation)?),
            None => None,
        };

        let changes = EventChanges {
            title: non_blank(request.title),
            description: request
                .description
                .map(|d| d.map(|d| d.trim().to_string())),
            date,
        };

        self.events
            .update(id, &changes)
            .await?
            .ok_or_else(|| ApiError::NotFound(EVENT_NOT_FOUND.to_string()))
    }

    /// Delete the event together with its registrations.
    /// Returns how many registrations went with it.
    pub async fn delete(&self, id: Uuid) -> ApiResult<u64> {
        let removed = self
            .events
            .delete_with_registrations(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(EVENT_NOT_FOUND.to_string()))?;

        info!("Event {} deleted with {} registrations", id, removed);
        Ok(removed)
    }
}
