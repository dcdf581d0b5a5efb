//! Transactional booking writer interface
//!
//! Every method runs as one atomic unit of work: preconditions are
//! re-checked inside the transaction, and any failure rolls back both
//! the resource claim and the entitlement counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::outcome::{CancelOutcome, CheckInOutcome, ReserveOutcome};
use crate::domain::DomainResult;

#[async_trait]
pub trait BookingWriter: Send + Sync {
    /// Claim a seat for a schedule and consume one credit from the best
    /// eligible entitlement source.
    async fn reserve_seat(
        &self,
        schedule_id: i32,
        seat_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<ReserveOutcome>;

    /// Claim a free footwear unit of the requested size for a schedule
    /// and consume one credit. The unit's loan intervals are re-checked
    /// against the schedule window inside the transaction.
    async fn reserve_footwear(
        &self,
        schedule_id: i32,
        size: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<ReserveOutcome>;

    /// Release a user's reserved seat before the schedule starts and
    /// refund the consumed credit. A live footwear reservation for the
    /// same schedule is cancelled alongside.
    async fn cancel_seat_claim(
        &self,
        schedule_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<CancelOutcome>;

    /// Move a user's reserved seat to Occupied; confirm a pending
    /// footwear reservation and open its loan in the same transaction.
    async fn check_in(
        &self,
        schedule_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<CheckInOutcome>;

    /// Mark the schedule Completed and move Occupied claims to
    /// Completed. Returns the number of completed claims.
    async fn complete_schedule(&self, schedule_id: i32, now: DateTime<Utc>) -> DomainResult<u32>;
}
