//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider` — unified access to all per-aggregate repositories
//! - `DomainResult` — standard result type for domain operations

use super::booking::BookingWriter;
use super::entitlement::EntitlementRepository;
use super::footwear::FootwearRepository;
use super::schedule::ScheduleRepository;
use super::seat::SeatRepository;
use super::waitlist::WaitlistRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let schedule = repos.schedules().find_by_id(100).await?;
///     let held = repos.seats().held_count(100).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn schedules(&self) -> &dyn ScheduleRepository;
    fn seats(&self) -> &dyn SeatRepository;
    fn entitlements(&self) -> &dyn EntitlementRepository;
    fn footwear(&self) -> &dyn FootwearRepository;
    fn waitlist(&self) -> &dyn WaitlistRepository;
    fn booking(&self) -> &dyn BookingWriter;
}
