//! Common library for the CampusConnect services
//!
//! This crate provides the pieces shared by every service binary:
//! PostgreSQL connectivity, the embedded schema migrations and the
//! storage error type.
//!
//! ```rust,no_run
//! use campus_common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     println!("Database health check: {}", health_check(&pool).await?);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
