//! Application state shared across handlers

use sqlx::PgPool;
use std::sync::Arc;

use crate::{
    jwt::JwtService,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{
        EventRepository, PgEventRepository, PgRegistrationRepository, PgUserRepository,
        RegistrationRepository, UserRepository,
    },
    service::{AuthService, DashboardService, EventService, RegistrationService},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub events: EventService,
    pub registrations: RegistrationService,
    pub dashboard: DashboardService,
}

impl AppState {
    /// Wire the services over one set of repositories
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        jwt: JwtService,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            auth: AuthService::new(users.clone(), jwt, limiter),
            events: EventService::new(events.clone()),
            registrations: RegistrationService::new(registrations.clone(), events.clone()),
            dashboard: DashboardService::new(users, events, registrations),
        }
    }

    /// State over the PostgreSQL repositories with default login throttling
    pub fn with_pool(pool: PgPool, jwt: JwtService) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgEventRepository::new(pool.clone())),
            Arc::new(PgRegistrationRepository::new(pool)),
            jwt,
            RateLimiter::new(RateLimiterConfig::default()),
        )
    }
}

#[cfg(test)]
impl AppState {
    /// State over one in-memory store, signed with the test secret
    pub(crate) fn in_memory(store: Arc<crate::repositories::memory::MemoryStore>) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store,
            JwtService::new(crate::jwt::tests::TEST_SECRET).unwrap(),
            RateLimiter::new(RateLimiterConfig::default()),
        )
    }
}
