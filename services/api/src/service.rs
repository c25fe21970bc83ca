//! Business operations behind the HTTP handlers
//!
//! Each service owns the repositories it needs as trait objects and turns
//! store results into the API error taxonomy.

pub mod auth;
pub mod dashboard;
pub mod events;
pub mod registrations;

pub use auth::AuthService;
pub use dashboard::DashboardService;
pub use events::EventService;
pub use registrations::RegistrationService;
