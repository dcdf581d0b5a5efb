//! Footwear domain entities

use chrono::{DateTime, Utc};

use crate::domain::entitlement::EntitlementKind;
use crate::domain::schedule::TimeWindow;
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// One physical pair of rental footwear
#[derive(Debug, Clone)]
pub struct Footwear {
    /// Unique unit ID
    pub id: i32,
    /// Inventory tag printed on the unit
    pub code: String,
    /// EU shoe size
    pub size: i32,
    /// Inactive units are withheld from booking
    pub is_active: bool,
}

impl Footwear {
    pub fn new(id: i32, code: impl Into<String>, size: i32) -> Self {
        Self {
            id,
            code: code.into(),
            size,
            is_active: true,
        }
    }
}

/// Reservation status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FootwearReservationStatus {
    /// Booked, unit not yet handed out
    Pending,
    /// Unit handed out at check-in
    Confirmed,
    /// Cancelled by user or system
    Cancelled,
    /// Reservation lapsed unclaimed
    Expired,
}

impl FootwearReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::Expired => "Expired",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Confirmed" => Self::Confirmed,
            "Expired" => Self::Expired,
            _ => Self::Cancelled,
        }
    }
}

impl std::fmt::Display for FootwearReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A footwear unit reserved for one schedule occurrence
#[derive(Debug, Clone)]
pub struct FootwearReservation {
    /// Unique reservation ID
    pub id: i32,
    /// Reserved unit
    pub footwear_id: i32,
    /// Schedule occurrence the unit is held for
    pub schedule_id: i32,
    /// Reserving user
    pub user_id: i32,
    /// Current status
    pub status: FootwearReservationStatus,
    /// Booking reference handed to the user
    pub reference: String,
    /// Entitlement source the booking consumed
    pub consumed_kind: Option<EntitlementKind>,
    pub consumed_source_id: Option<i32>,
    /// Unclaimed reservations lapse at this instant
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl FootwearReservation {
    pub fn new(
        id: i32,
        footwear_id: i32,
        schedule_id: i32,
        user_id: i32,
        reference: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            footwear_id,
            schedule_id,
            user_id,
            status: FootwearReservationStatus::Pending,
            reference: reference.into(),
            consumed_kind: None,
            consumed_source_id: None,
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// Pending and Confirmed reservations hold the unit.
    pub fn is_live(&self) -> bool {
        matches!(
            self.status,
            FootwearReservationStatus::Pending | FootwearReservationStatus::Confirmed
        )
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_live() && now >= self.expires_at
    }

    fn transition_err(&self, to: &'static str) -> DomainError {
        DomainError::IllegalTransition {
            entity: "FootwearReservation",
            from: self.status.as_str(),
            to,
        }
    }

    /// Pending → Confirmed (unit handed out).
    pub fn confirm(&mut self) -> DomainResult<()> {
        if self.status != FootwearReservationStatus::Pending {
            return Err(self.transition_err("Confirmed"));
        }
        self.status = FootwearReservationStatus::Confirmed;
        Ok(())
    }

    /// Cancel a live reservation.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if !self.is_live() {
            return Err(self.transition_err("Cancelled"));
        }
        self.status = FootwearReservationStatus::Cancelled;
        Ok(())
    }

    /// Mark a live reservation as lapsed.
    pub fn expire(&mut self) -> DomainResult<()> {
        if !self.is_live() {
            return Err(self.transition_err("Expired"));
        }
        self.status = FootwearReservationStatus::Expired;
        Ok(())
    }
}

/// Checkout record for a footwear unit.
///
/// `return_date = None` means the unit is still out; the loan interval
/// is open-ended until the return is recorded.
#[derive(Debug, Clone)]
pub struct FootwearLoan {
    /// Unique loan ID
    pub id: i32,
    pub footwear_id: i32,
    pub user_id: i32,
    /// Reservation the checkout fulfilled, if any
    pub reservation_id: Option<i32>,
    pub loan_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl FootwearLoan {
    pub fn new(
        id: i32,
        footwear_id: i32,
        user_id: i32,
        reservation_id: Option<i32>,
        loan_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            footwear_id,
            user_id,
            reservation_id,
            loan_date,
            return_date: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Whether the loan interval intersects the given window. An open
    /// loan blocks every window from its checkout on.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        if self.loan_date >= window.end {
            return false;
        }
        match self.return_date {
            Some(returned) => returned > window.start,
            None => true,
        }
    }

    /// Record the return. The unit must still be out.
    pub fn close(&mut self, returned_at: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_open() {
            return Err(DomainError::Validation(format!(
                "loan {} is already returned",
                self.id
            )));
        }
        if returned_at < self.loan_date {
            return Err(DomainError::Validation(format!(
                "loan {} return predates checkout",
                self.id
            )));
        }
        self.return_date = Some(returned_at);
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_reservation() -> FootwearReservation {
        FootwearReservation::new(1, 5, 100, 42, "REF-FW-1", Utc::now() + Duration::hours(1))
    }

    #[test]
    fn new_reservation_is_pending_and_live() {
        let r = sample_reservation();
        assert_eq!(r.status, FootwearReservationStatus::Pending);
        assert!(r.is_live());
        assert!(!r.is_overdue(Utc::now()));
    }

    #[test]
    fn confirm_then_cancel_then_reject_expire() {
        let mut r = sample_reservation();
        r.confirm().unwrap();
        assert_eq!(r.status, FootwearReservationStatus::Confirmed);
        r.cancel().unwrap();
        assert_eq!(r.status, FootwearReservationStatus::Cancelled);
        assert!(r.expire().is_err());
    }

    #[test]
    fn confirm_requires_pending() {
        let mut r = sample_reservation();
        r.confirm().unwrap();
        assert!(r.confirm().is_err());
    }

    #[test]
    fn overdue_when_past_expiry() {
        let mut r = sample_reservation();
        r.expires_at = Utc::now() - Duration::minutes(1);
        assert!(r.is_overdue(Utc::now()));
        r.expire().unwrap();
        assert_eq!(r.status, FootwearReservationStatus::Expired);
        assert!(!r.is_live());
        // an expired reservation is no longer overdue
        assert!(!r.is_overdue(Utc::now()));
    }

    #[test]
    fn open_loan_overlaps_later_windows() {
        let base = Utc::now();
        let loan = FootwearLoan::new(1, 5, 42, None, base);
        let later = TimeWindow::new(base + Duration::hours(5), base + Duration::hours(6));
        assert!(loan.is_open());
        assert!(loan.overlaps(&later));
    }

    #[test]
    fn open_loan_does_not_overlap_earlier_windows() {
        let base = Utc::now();
        let loan = FootwearLoan::new(1, 5, 42, None, base);
        let earlier = TimeWindow::new(base - Duration::hours(2), base - Duration::hours(1));
        assert!(!loan.overlaps(&earlier));
    }

    #[test]
    fn closed_loan_overlap_is_bounded() {
        let base = Utc::now();
        let mut loan = FootwearLoan::new(1, 5, 42, None, base);
        loan.close(base + Duration::hours(1)).unwrap();

        let inside = TimeWindow::new(base + Duration::minutes(30), base + Duration::hours(2));
        let after = TimeWindow::new(base + Duration::hours(1), base + Duration::hours(2));
        assert!(loan.overlaps(&inside));
        assert!(!loan.overlaps(&after));
    }

    #[test]
    fn close_twice_fails() {
        let base = Utc::now();
        let mut loan = FootwearLoan::new(1, 5, 42, None, base);
        loan.close(base + Duration::hours(1)).unwrap();
        assert!(loan.close(base + Duration::hours(2)).is_err());
    }

    #[test]
    fn close_before_checkout_fails() {
        let base = Utc::now();
        let mut loan = FootwearLoan::new(1, 5, 42, None, base);
        assert!(loan.close(base - Duration::minutes(1)).is_err());
        assert!(loan.is_open());
    }

    #[test]
    fn status_roundtrip() {
        for status in &[
            FootwearReservationStatus::Pending,
            FootwearReservationStatus::Confirmed,
            FootwearReservationStatus::Cancelled,
            FootwearReservationStatus::Expired,
        ] {
            assert_eq!(&FootwearReservationStatus::from_str(status.as_str()), status);
        }
        assert_eq!(
            FootwearReservationStatus::from_str("???"),
            FootwearReservationStatus::Cancelled
        );
    }
}
