//! Student registrations for events

use std::sync::Arc;

use campus_common::error::DatabaseError;
use tracing::info;
use uuid::Uuid;

use super::events::EVENT_NOT_FOUND;
use crate::{
    error::{ApiError, ApiResult},
    models::{EventRegistrations, RegistrationDetails},
    repositories::{EventRepository, REGISTRATIONS_USER_EVENT_KEY, RegistrationRepository},
};

const ALREADY_REGISTERED: &str = "You are already registered for this event";

#[derive(Clone)]
pub struct RegistrationService {
    registrations: Arc<dyn RegistrationRepository>,
    events: Arc<dyn EventRepository>,
}

impl RegistrationService {
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            registrations,
            events,
        }
    }

    /// Register `user_id` for `event_id`, at most once per pair
    pub async fn register(&self, user_id: Uuid, event_id: Uuid) -> ApiResult<RegistrationDetails> {
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(ApiError::NotFound(EVENT_NOT_FOUND.to_string()));
        }

        if self.registrations.exists(user_id, event_id).await? {
            return Err(ApiError::Conflict(ALREADY_REGISTERED.to_string()));
        }

        // The unique index decides when two requests pass the checks above
        // together; a foreign key failure means the event was deleted meanwhile.
        let registration = self
            .registrations
            .create(user_id, event_id)
            .await
            .map_err(|e| match e {
                e if e.is_unique_violation_on(REGISTRATIONS_USER_EVENT_KEY) => {
                    ApiError::Conflict(ALREADY_REGISTERED.to_string())
                }
                DatabaseError::ForeignKeyViolation { .. } => {
                    ApiError::NotFound(EVENT_NOT_FOUND.to_string())
                }
                e => ApiError::from(e),
            })?;

        info!("User {} registered for event {}", user_id, event_id);
        Ok(registration)
    }

    pub async fn cancel(&self, user_id: Uuid, event_id: Uuid) -> ApiResult<()> {
        if !self.registrations.delete(user_id, event_id).await? {
            return Err(ApiError::NotFound("Registration not found".to_string()));
        }

        info!("User {} cancelled registration for event {}", user_id, event_id);
        Ok(())
    }

    /// The user's registrations, newest first
    pub async fn list_mine(&self, user_id: Uuid) -> ApiResult<Vec<RegistrationDetails>> {
        Ok(self.registrations.list_for_user(user_id).await?)
    }

    pub async fn list_all(&self) -> ApiResult<Vec<RegistrationDetails>> {
        Ok(self.registrations.list_all().await?)
    }

    pub async fn list_for_event(&self, event_id: Uuid) -> ApiResult<EventRegistrations> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(EVENT_NOT_FOUND.to_string()))?;

        Ok(EventRegistrations {
            event_title: event.title,
            registrations: self.registrations.list_for_event(event_id).await?,
        })
    }
}
