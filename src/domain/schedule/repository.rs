//! Class schedule repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::ClassSchedule;
use crate::domain::DomainResult;
use crate::shared::types::{PaginatedResult, PaginationParams};

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Save a new schedule occurrence
    async fn save(&self, schedule: ClassSchedule) -> DomainResult<()>;

    /// Find schedule by ID
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ClassSchedule>>;

    /// Update an existing schedule
    async fn update(&self, schedule: ClassSchedule) -> DomainResult<()>;

    /// Upcoming, still-scheduled occurrences for a discipline
    async fn find_upcoming_for_discipline(
        &self,
        discipline_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<ClassSchedule>>;

    /// All schedules, newest first, paginated
    async fn list(&self, params: PaginationParams) -> DomainResult<PaginatedResult<ClassSchedule>>;
}
