//! API models for request and response payloads

pub mod dashboard;
pub mod event;
pub mod registration;
pub mod user;

// Re-export for convenience
pub use dashboard::{
    DashboardStats, EventBreakdown, Overview, PopularEvent, RegistrationBreakdown, UserBreakdown,
};
pub use event::{
    CreateEventRequest, Creator, EventChanges, EventDetails, EventPeriodCounts, EventSummary,
    NewEvent, UpdateEventRequest,
};
pub use registration::{EventRegistrations, RegistrationDetails};
pub use user::{
    AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, RoleCounts, User, UserResponse,
    UserSummary,
};
