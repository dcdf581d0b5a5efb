//! # RSISTANC Booking Engine
//!
//! Class-seat reservation and entitlement consumption engine for the
//! RSISTANC studio platform.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core business entities, types and traits
//! - **application**: Business logic and booking flows
//! - **infrastructure**: External concerns (database, in-memory storage)
//! - **shared**: Errors, logging, validation and common types
//!
//! The crate is a library: an HTTP layer (out of scope here) calls the
//! application services with a schedule id, an authenticated user id and
//! the requested resource, and renders the returned outcome as JSON.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::database::repositories::SeaOrmRepositoryProvider;
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export logging init for embedding binaries and tests
pub use shared::logging::init_tracing;
