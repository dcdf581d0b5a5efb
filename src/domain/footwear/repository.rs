//! Footwear repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Footwear, FootwearLoan, FootwearReservation};
use crate::domain::schedule::TimeWindow;
use crate::domain::DomainResult;

#[async_trait]
pub trait FootwearRepository: Send + Sync {
    /// Save a footwear unit (inventory data)
    async fn save_unit(&self, unit: Footwear) -> DomainResult<()>;

    /// Find a unit by ID
    async fn find_unit(&self, id: i32) -> DomainResult<Option<Footwear>>;

    /// Active units of a size, ordered by code
    async fn list_units_by_size(&self, size: i32) -> DomainResult<Vec<Footwear>>;

    /// Live (Pending/Confirmed) reservations for a schedule
    async fn live_reservations_for_schedule(
        &self,
        schedule_id: i32,
    ) -> DomainResult<Vec<FootwearReservation>>;

    /// A user's live reservation for a schedule, if any
    async fn find_live_reservation_for_user(
        &self,
        schedule_id: i32,
        user_id: i32,
    ) -> DomainResult<Option<FootwearReservation>>;

    /// Insert a new reservation, returning it with its assigned ID
    async fn save_reservation(
        &self,
        reservation: FootwearReservation,
    ) -> DomainResult<FootwearReservation>;

    /// Update an existing reservation
    async fn update_reservation(&self, reservation: FootwearReservation) -> DomainResult<()>;

    /// Live reservations past their expiry instant
    async fn find_overdue_reservations(
        &self,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<FootwearReservation>>;

    /// Loans whose interval intersects the window, open loans included
    async fn loans_overlapping(&self, window: TimeWindow) -> DomainResult<Vec<FootwearLoan>>;

    /// Find a loan by ID
    async fn find_loan(&self, id: i32) -> DomainResult<Option<FootwearLoan>>;

    /// Insert a new loan, returning it with its assigned ID
    async fn save_loan(&self, loan: FootwearLoan) -> DomainResult<FootwearLoan>;

    /// Update an existing loan
    async fn update_loan(&self, loan: FootwearLoan) -> DomainResult<()>;
}
