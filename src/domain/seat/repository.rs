//! Seat and seat-claim repository interface

use async_trait::async_trait;

use super::model::{ScheduleSeat, Seat};
use crate::domain::DomainResult;

#[async_trait]
pub trait SeatRepository: Send + Sync {
    /// Save a seat (static reference data)
    async fn save_seat(&self, seat: Seat) -> DomainResult<()>;

    /// Find a seat by ID
    async fn find_seat(&self, id: i32) -> DomainResult<Option<Seat>>;

    /// Active seats of a studio, ordered by row then column
    async fn list_studio_seats(&self, studio_id: i32) -> DomainResult<Vec<Seat>>;

    /// Claim row for a (schedule, seat) pair
    async fn find_claim(&self, schedule_id: i32, seat_id: i32)
        -> DomainResult<Option<ScheduleSeat>>;

    /// A user's live (held) claim for a schedule, if any
    async fn find_user_claim(
        &self,
        schedule_id: i32,
        user_id: i32,
    ) -> DomainResult<Option<ScheduleSeat>>;

    /// All claim rows for a schedule
    async fn list_claims(&self, schedule_id: i32) -> DomainResult<Vec<ScheduleSeat>>;

    /// Number of held (Reserved/Occupied/Completed) claims for a schedule
    async fn held_count(&self, schedule_id: i32) -> DomainResult<u64>;

    /// Insert a new claim row, returning it with its assigned ID
    async fn save_claim(&self, claim: ScheduleSeat) -> DomainResult<ScheduleSeat>;

    /// Update an existing claim row
    async fn update_claim(&self, claim: ScheduleSeat) -> DomainResult<()>;
}
