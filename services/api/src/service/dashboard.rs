//! Admin dashboard aggregates, computed on every request

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    error::ApiResult,
    models::{
        DashboardStats, EventBreakdown, Overview, RegistrationBreakdown, UserBreakdown,
    },
    repositories::{EventRepository, RegistrationRepository, UserRepository},
};

/// Length of the ranking in `popularEvents`
const POPULAR_EVENTS_LIMIT: i64 = 5;
const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct DashboardService {
    users: Arc<dyn UserRepository>,
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationRepository>,
}

impl DashboardService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        events: Arc<dyn EventRepository>,
        registrations: Arc<dyn RegistrationRepository>,
    ) -> Self {
        Self {
            users,
            events,
            registrations,
        }
    }

    pub async fn stats(&self) -> ApiResult<DashboardStats> {
        self.stats_at(Utc::now()).await
    }

    /// Aggregates relative to `now`: events dated at or after it are
    /// upcoming, registrations from the trailing seven days are recent.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> ApiResult<DashboardStats> {
        let roles = self.users.count_by_role().await?;
        let periods = self.events.count_by_period(now).await?;
        let total_registrations = self.registrations.count().await?;
        let last_seven_days = self
            .registrations
            .count_since(now - Duration::days(RECENT_WINDOW_DAYS))
            .await?;
        let popular_events = self
            .registrations
            .most_registered(POPULAR_EVENTS_LIMIT)
            .await?;

        Ok(DashboardStats {
            overview: Overview {
                total_users: roles.total(),
                total_events: periods.total(),
                total_registrations,
            },
            users: UserBreakdown {
                total: roles.total(),
                students: roles.students,
                admins: roles.admins,
            },
            events: EventBreakdown {
                total: periods.total(),
                upcoming: periods.upcoming,
                past: periods.past,
            },
            registrations: RegistrationBreakdown {
                total: total_registrations,
                last_seven_days,
            },
            popular_events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{NewEvent, Role},
        repositories::memory::MemoryStore,
        service::testing::{seed_event, seed_user},
    };

    fn dashboard(store: &Arc<MemoryStore>) -> DashboardService {
        DashboardService::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let stats = dashboard(&store).stats().await.unwrap();

        assert_eq!(stats.overview.total_users, 0);
        assert_eq!(stats.events.total, 0);
        assert!(stats.popular_events.is_empty());
    }

    #[tokio::test]
    async fn test_totals_agree_with_listings() {
        let store = Arc::new(MemoryStore::new());
        let admin = seed_user(&store, "admin@campus.edu", Role::Admin).await;
        let ada = seed_user(&store, "ada@campus.edu", Role::Student).await;
        let bob = seed_user(&store, "bob@campus.edu", Role::Student).await;
        let upcoming = seed_event(&store, "Upcoming", 3, admin.id).await;
        let past = seed_event(&store, "Past", -3, admin.id).await;

        for (user, event) in [(ada.id, upcoming.id), (bob.id, upcoming.id), (ada.id, past.id)] {
            RegistrationRepository::create(store.as_ref(), user, event)
                .await
                .unwrap();
        }

        let stats = dashboard(&store).stats().await.unwrap();
        let listed = store.list_all().await.unwrap();

        assert_eq!(stats.overview.total_registrations, listed.len() as i64);
        assert_eq!(stats.registrations.last_seven_days, 3);
        assert_eq!(stats.users.students, 2);
        assert_eq!(stats.users.admins, 1);
        assert_eq!(stats.overview.total_users, 3);
        assert_eq!(stats.events.upcoming, 1);
        assert_eq!(stats.events.past, 1);
        assert_eq!(
            stats.events.upcoming + stats.events.past,
            stats.overview.total_events
        );
    }

    #[tokio::test]
    async fn test_event_dated_now_is_upcoming() {
        let store = Arc::new(MemoryStore::new());
        let admin = seed_user(&store, "admin@campus.edu", Role::Admin).await;
        let now = Utc::now();

        EventRepository::create(
            store.as_ref(),
            &NewEvent {
                title: "Right now".to_string(),
                description: None,
                date: now,
                created_by: admin.id,
            },
        )
        .await
        .unwrap();

        let stats = dashboard(&store).stats_at(now).await.unwrap();
        assert_eq!(stats.events.upcoming, 1);
        assert_eq!(stats.events.past, 0);
    }

    #[tokio::test]
    async fn test_recent_window_excludes_old_registrations() {
        let store = Arc::new(MemoryStore::new());
        let admin = seed_user(&store, "admin@campus.edu", Role::Admin).await;
        let ada = seed_user(&store, "ada@campus.edu", Role::Student).await;
        let bob = seed_user(&store, "bob@campus.edu", Role::Student).await;
        let event = seed_event(&store, "Tech Talk", 3, admin.id).await;

        RegistrationRepository::create(store.as_ref(), ada.id, event.id)
            .await
            .unwrap();
        RegistrationRepository::create(store.as_ref(), bob.id, event.id)
            .await
            .unwrap();
        store
            .backdate_registration(ada.id, event.id, Utc::now() - Duration::days(8))
            .await;

        let stats = dashboard(&store).stats().await.unwrap();
        assert_eq!(stats.registrations.total, 2);
        assert_eq!(stats.registrations.last_seven_days, 1);
    }

    #[tokio::test]
    async fn test_popular_events_ranked_and_capped() {
        let store = Arc::new(MemoryStore::new());
        let admin = seed_user(&store, "admin@campus.edu", Role::Admin).await;

        let mut students = Vec::new();
        for i in 0..6 {
            students.push(seed_user(&store, &format!("s{}@campus.edu", i), Role::Student).await);
        }

        // Event i gets i + 1 registrations
        let mut events = Vec::new();
        for i in 0..6 {
            let event = seed_event(&store, &format!("Event {}", i), 5, admin.id).await;
            for student in students.iter().take(i + 1) {
                RegistrationRepository::create(store.as_ref(), student.id, event.id)
                    .await
                    .unwrap();
            }
            events.push(event);
        }

        let stats = dashboard(&store).stats().await.unwrap();
        let counts: Vec<i64> = stats
            .popular_events
            .iter()
            .map(|p| p.registration_count)
            .collect();

        assert_eq!(counts, vec![6, 5, 4, 3, 2]);
        assert_eq!(stats.popular_events[0].id, events[5].id);
        assert_eq!(stats.popular_events[0].title, "Event 5");
    }

    #[tokio::test]
    async fn test_equal_counts_ranked_by_first_registration() {
        let store = Arc::new(MemoryStore::new());
        let admin = seed_user(&store, "admin@campus.edu", Role::Admin).await;
        let ada = seed_user(&store, "ada@campus.edu", Role::Student).await;
        let created_first = seed_event(&store, "Created first", 5, admin.id).await;
        let registered_first = seed_event(&store, "Registered first", 5, admin.id).await;

        RegistrationRepository::create(store.as_ref(), ada.id, registered_first.id)
            .await
            .unwrap();
        RegistrationRepository::create(store.as_ref(), ada.id, created_first.id)
            .await
            .unwrap();

        let stats = dashboard(&store).stats().await.unwrap();
        let ranked: Vec<&str> = stats
            .popular_events
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        assert_eq!(ranked, vec!["Registered first", "Created first"]);
    }
}
