//! In-memory store used by service and router tests
//!
//! All three tables live behind one lock, so every operation (the event
//! cascade included) is atomic. Constraint failures are reported with the
//! same tagged errors the PostgreSQL repositories produce.

use async_trait::async_trait;
use campus_common::error::{DatabaseError, DatabaseResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    EventRepository, REGISTRATIONS_USER_EVENT_KEY, RegistrationRepository, USERS_EMAIL_KEY,
    UserRepository,
};
use crate::models::{
    Creator, EventChanges, EventDetails, EventPeriodCounts, EventSummary, NewEvent, NewUser,
    PopularEvent, RegistrationDetails, Role, RoleCounts, User, UserSummary,
};

#[derive(Debug, Clone)]
struct EventRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    date: DateTime<Utc>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Clone)]
struct RegistrationRow {
    id: Uuid,
    user_id: Uuid,
    event_id: Uuid,
    created_at: DateTime<Utc>,
    seq: u64,
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, (User, u64)>,
    events: HashMap<Uuid, EventRow>,
    registrations: Vec<RegistrationRow>,
    // Insertion counter; orders rows created within the same clock tick
    next_seq: u64,
}

impl Tables {
    fn seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn event_details(&self, row: &EventRow) -> DatabaseResult<EventDetails> {
        let (creator, _) = self.users.get(&row.created_by).ok_or_else(|| {
            DatabaseError::ForeignKeyViolation {
                constraint: Some("events_created_by_fkey".to_string()),
            }
        })?;

        Ok(EventDetails {
            id: row.id,
            title: row.title.clone(),
            description: row.description.clone(),
            date: row.date,
            created_by: Creator {
                id: creator.id,
                name: creator.name.clone(),
                email: creator.email.clone(),
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn registration_details(&self, row: &RegistrationRow) -> Option<RegistrationDetails> {
        let (user, _) = self.users.get(&row.user_id)?;
        let event = self.events.get(&row.event_id)?;

        Some(RegistrationDetails {
            id: row.id,
            user: UserSummary::from(user),
            event: EventSummary {
                id: event.id,
                title: event.title.clone(),
                description: event.description.clone(),
                date: event.date,
            },
            created_at: row.created_at,
        })
    }

    fn registrations_where<F>(&self, filter: F, newest_first: bool) -> Vec<RegistrationDetails>
    where
        F: Fn(&RegistrationRow) -> bool,
    {
        let mut rows: Vec<&RegistrationRow> =
            self.registrations.iter().filter(|&r| filter(r)).collect();
        rows.sort_by_key(|r| (r.created_at, r.seq));
        if newest_first {
            rows.reverse();
        }

        rows.into_iter()
            .filter_map(|r| self.registration_details(r))
            .collect()
    }
}

/// In-memory implementation of every repository trait
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift a registration's creation time, for time-window tests
    pub async fn backdate_registration(&self, user_id: Uuid, event_id: Uuid, to: DateTime<Utc>) {
        let mut tables = self.tables.lock().await;
        if let Some(row) = tables
            .registrations
            .iter_mut()
            .find(|r| r.user_id == user_id && r.event_id == event_id)
        {
            row.created_at = to;
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        let mut tables = self.tables.lock().await;

        if tables
            .users
            .values()
            .any(|(user, _)| user.email == new_user.email)
        {
            return Err(DatabaseError::UniqueViolation {
                constraint: Some(USERS_EMAIL_KEY.to_string()),
            });
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            role: new_user.role,
            created_at: Utc::now(),
        };

        let seq = tables.seq();
        tables.users.insert(user.id, (user.clone(), seq));
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| user.email == email)
            .map(|(user, _)| user.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn list(&self) -> DatabaseResult<Vec<User>> {
        let tables = self.tables.lock().await;
        let mut users: Vec<&(User, u64)> = tables.users.values().collect();
        users.sort_by_key(|(user, seq)| (user.created_at, *seq));

        Ok(users.into_iter().rev().map(|(user, _)| user.clone()).collect())
    }

    async fn count_by_role(&self) -> DatabaseResult<RoleCounts> {
        let tables = self.tables.lock().await;
        let mut counts = RoleCounts::default();
        for (user, _) in tables.users.values() {
            match user.role {
                Role::Student => counts.students += 1,
                Role::Admin => counts.admins += 1,
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<EventDetails>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<&EventRow> = tables.events.values().collect();
        rows.sort_by_key(|e| (e.date, e.created_at, e.seq));

        rows.into_iter().map(|e| tables.event_details(e)).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<EventDetails>> {
        let tables = self.tables.lock().await;
        tables
            .events
            .get(&id)
            .map(|e| tables.event_details(e))
            .transpose()
    }

    async fn create(&self, new_event: &NewEvent) -> DatabaseResult<EventDetails> {
        let mut tables = self.tables.lock().await;

        if !tables.users.contains_key(&new_event.created_by) {
            return Err(DatabaseError::ForeignKeyViolation {
                constraint: Some("events_created_by_fkey".to_string()),
            });
        }

        let now = Utc::now();
        let seq = tables.seq();
        let row = EventRow {
            id: Uuid::new_v4(),
            title: new_event.title.clone(),
            description: new_event.description.clone(),
            date: new_event.date,
            created_by: new_event.created_by,
            created_at: now,
            updated_at: now,
            seq,
        };

        let details = tables.event_details(&row)?;
        tables.events.insert(row.id, row);
        Ok(details)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &EventChanges,
    ) -> DatabaseResult<Option<EventDetails>> {
        let mut tables = self.tables.lock().await;

        let Some(row) = tables.events.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = &changes.title {
            row.title = title.clone();
        }
        if let Some(description) = &changes.description {
            row.description = description.clone();
        }
        if let Some(date) = changes.date {
            row.date = date;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        tables.event_details(&row).map(Some)
    }

    async fn delete_with_registrations(&self, id: Uuid) -> DatabaseResult<Option<u64>> {
        let mut tables = self.tables.lock().await;

        if tables.events.remove(&id).is_none() {
            return Ok(None);
        }

        let before = tables.registrations.len();
        tables.registrations.retain(|r| r.event_id != id);
        Ok(Some((before - tables.registrations.len()) as u64))
    }

    async fn count_by_period(&self, now: DateTime<Utc>) -> DatabaseResult<EventPeriodCounts> {
        let tables = self.tables.lock().await;
        let upcoming = tables.events.values().filter(|e| e.date >= now).count() as i64;

        Ok(EventPeriodCounts {
            upcoming,
            past: tables.events.len() as i64 - upcoming,
        })
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn create(&self, user_id: Uuid, event_id: Uuid) -> DatabaseResult<RegistrationDetails> {
        let mut tables = self.tables.lock().await;

        if !tables.events.contains_key(&event_id) {
            return Err(DatabaseError::ForeignKeyViolation {
                constraint: Some("registrations_event_id_fkey".to_string()),
            });
        }
        if !tables.users.contains_key(&user_id) {
            return Err(DatabaseError::ForeignKeyViolation {
                constraint: Some("registrations_user_id_fkey".to_string()),
            });
        }
        if tables
            .registrations
            .iter()
            .any(|r| r.user_id == user_id && r.event_id == event_id)
        {
            return Err(DatabaseError::UniqueViolation {
                constraint: Some(REGISTRATIONS_USER_EVENT_KEY.to_string()),
            });
        }

        let seq = tables.seq();
        let row = RegistrationRow {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            created_at: Utc::now(),
            seq,
        };

        let details = tables
            .registration_details(&row)
            .ok_or_else(|| DatabaseError::ForeignKeyViolation { constraint: None })?;
        tables.registrations.push(row);
        Ok(details)
    }

    async fn exists(&self, user_id: Uuid, event_id: Uuid) -> DatabaseResult<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .registrations
            .iter()
            .any(|r| r.user_id == user_id && r.event_id == event_id))
    }

    async fn delete(&self, user_id: Uuid, event_id: Uuid) -> DatabaseResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.registrations.len();
        tables
            .registrations
            .retain(|r| !(r.user_id == user_id && r.event_id == event_id));
        Ok(tables.registrations.len() < before)
    }

    async fn list_for_user(&self, user_id: Uuid) -> DatabaseResult<Vec<RegistrationDetails>> {
        let tables = self.tables.lock().await;
        Ok(tables.registrations_where(|r| r.user_id == user_id, true))
    }

    async fn list_all(&self) -> DatabaseResult<Vec<RegistrationDetails>> {
        let tables = self.tables.lock().await;
        Ok(tables.registrations_where(|_| true, true))
    }

    async fn list_for_event(&self, event_id: Uuid) -> DatabaseResult<Vec<RegistrationDetails>> {
        let tables = self.tables.lock().await;
        Ok(tables.registrations_where(|r| r.event_id == event_id, false))
    }

    async fn count(&self) -> DatabaseResult<i64> {
        Ok(self.tables.lock().await.registrations.len() as i64)
    }

    async fn count_since(&self, since: DateTime<Utc>) -> DatabaseResult<i64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .registrations
            .iter()
            .filter(|r| r.created_at >= since)
            .count() as i64)
    }

    async fn most_registered(&self, limit: i64) -> DatabaseResult<Vec<PopularEvent>> {
        let tables = self.tables.lock().await;

        // event id -> (count, earliest registration)
        let mut groups: HashMap<Uuid, (i64, (DateTime<Utc>, u64))> = HashMap::new();
        for r in &tables.registrations {
            let entry = groups
                .entry(r.event_id)
                .or_insert((0, (r.created_at, r.seq)));
            entry.0 += 1;
            entry.1 = entry.1.min((r.created_at, r.seq));
        }

        let mut ranked: Vec<(Uuid, i64, (DateTime<Utc>, u64))> = groups
            .into_iter()
            .map(|(id, (count, first))| (id, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        Ok(ranked
            .into_iter()
            .filter_map(|(id, count, _)| {
                tables.events.get(&id).map(|e| PopularEvent {
                    id,
                    title: e.title.clone(),
                    date: e.date,
                    registration_count: count,
                })
            })
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }
}
