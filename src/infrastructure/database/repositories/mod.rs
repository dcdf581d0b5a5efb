//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories, the transactional booking writer,
//! and the unified RepositoryProvider.

pub mod booking_writer;
pub mod entitlement_repository;
pub mod footwear_repository;
pub mod mappers;
pub mod repository_provider;
pub mod schedule_repository;
pub mod seat_repository;
pub mod waitlist_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use crate::shared::errors::DomainError;

/// Map a SeaORM error into the domain error space.
pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

/// Unwrap a transaction error: closure errors pass through, connection
/// errors map like any other database error.
pub(crate) fn tx_err(e: sea_orm::TransactionError<DomainError>) -> DomainError {
    match e {
        sea_orm::TransactionError::Connection(e) => db_err(e),
        sea_orm::TransactionError::Transaction(e) => e,
    }
}

/// Claim statuses that count against schedule capacity.
pub(crate) const HELD_STATUSES: [&str; 3] = ["Reserved", "Occupied", "Completed"];

/// Reservation statuses that hold a footwear unit.
pub(crate) const LIVE_RESERVATION_STATUSES: [&str; 2] = ["Pending", "Confirmed"];
