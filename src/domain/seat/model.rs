//! Seat and seat-claim domain entities

use chrono::{DateTime, Utc};

use crate::domain::entitlement::EntitlementKind;
use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// A physical position in a studio. Static reference data.
#[derive(Debug, Clone)]
pub struct Seat {
    /// Unique seat ID
    pub id: i32,
    /// Studio room the seat belongs to
    pub studio_id: i32,
    /// Row number, 1-based
    pub row: i32,
    /// Column number, 1-based
    pub column: i32,
    /// Inactive seats are never offered for booking
    pub is_active: bool,
}

impl Seat {
    pub fn new(id: i32, studio_id: i32, row: i32, column: i32) -> Self {
        Self {
            id,
            studio_id,
            row,
            column,
            is_active: true,
        }
    }

    /// Human-readable position label, e.g. "R2C5"
    pub fn label(&self) -> String {
        format!("R{}C{}", self.row, self.column)
    }
}

/// Claim state of a seat for one schedule occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatClaimStatus {
    /// Free, no holder
    Available,
    /// Held by a user, class not yet attended
    Reserved,
    /// Holder checked in
    Occupied,
    /// Class finished with the holder present
    Completed,
    /// Administratively withheld from booking
    Blocked,
}

impl SeatClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Reserved => "Reserved",
            Self::Occupied => "Occupied",
            Self::Completed => "Completed",
            Self::Blocked => "Blocked",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Available" => Self::Available,
            "Reserved" => Self::Reserved,
            "Occupied" => Self::Occupied,
            "Completed" => Self::Completed,
            _ => Self::Blocked,
        }
    }

    /// Statuses that count against schedule capacity.
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Reserved | Self::Occupied | Self::Completed)
    }
}

impl std::fmt::Display for SeatClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The binding of a seat to one schedule occurrence.
///
/// Invariant: held statuses (Reserved/Occupied/Completed) always carry a
/// holder; Available and Blocked never do.
#[derive(Debug, Clone)]
pub struct ScheduleSeat {
    /// Unique claim row ID
    pub id: i32,
    /// Schedule occurrence
    pub schedule_id: i32,
    /// Physical seat
    pub seat_id: i32,
    /// Claim state
    pub status: SeatClaimStatus,
    /// Holding user, when held
    pub user_id: Option<i32>,
    /// Booking reference handed to the holder
    pub reference: Option<String>,
    /// Entitlement source the booking consumed, for refunds
    pub consumed_kind: Option<EntitlementKind>,
    pub consumed_source_id: Option<i32>,
    /// When the seat was reserved
    pub reserved_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleSeat {
    /// A fresh, free claim row for a (schedule, seat) pair.
    pub fn available(id: i32, schedule_id: i32, seat_id: i32) -> Self {
        Self {
            id,
            schedule_id,
            seat_id,
            status: SeatClaimStatus::Available,
            user_id: None,
            reference: None,
            consumed_kind: None,
            consumed_source_id: None,
            reserved_at: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == SeatClaimStatus::Available
    }

    pub fn is_held(&self) -> bool {
        self.status.is_held()
    }

    fn transition_err(&self, to: &'static str) -> DomainError {
        DomainError::IllegalTransition {
            entity: "ScheduleSeat",
            from: self.status.as_str(),
            to,
        }
    }

    /// Available → Reserved, recording the holder and the consumed source.
    pub fn reserve(
        &mut self,
        user_id: i32,
        reference: String,
        consumed_kind: EntitlementKind,
        consumed_source_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status != SeatClaimStatus::Available {
            return Err(self.transition_err("Reserved"));
        }
        self.status = SeatClaimStatus::Reserved;
        self.user_id = Some(user_id);
        self.reference = Some(reference);
        self.consumed_kind = Some(consumed_kind);
        self.consumed_source_id = Some(consumed_source_id);
        self.reserved_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Reserved → Occupied (holder checked in).
    pub fn occupy(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != SeatClaimStatus::Reserved {
            return Err(self.transition_err("Occupied"));
        }
        self.status = SeatClaimStatus::Occupied;
        self.updated_at = now;
        Ok(())
    }

    /// Occupied → Completed (class finished).
    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != SeatClaimStatus::Occupied {
            return Err(self.transition_err("Completed"));
        }
        self.status = SeatClaimStatus::Completed;
        self.updated_at = now;
        Ok(())
    }

    /// Reserved → Available. Returns the consumed source so the caller can
    /// refund it.
    pub fn release(&mut self, now: DateTime<Utc>) -> DomainResult<Option<(EntitlementKind, i32)>> {
        if self.status != SeatClaimStatus::Reserved {
            return Err(self.transition_err("Available"));
        }
        let consumed = match (self.consumed_kind, self.consumed_source_id) {
            (Some(kind), Some(id)) => Some((kind, id)),
            _ => None,
        };
        self.status = SeatClaimStatus::Available;
        self.user_id = None;
        self.reference = None;
        self.consumed_kind = None;
        self.consumed_source_id = None;
        self.reserved_at = None;
        self.updated_at = now;
        Ok(consumed)
    }

    /// Any non-terminal state → Blocked. Clears the holder.
    pub fn block(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if matches!(
            self.status,
            SeatClaimStatus::Completed | SeatClaimStatus::Blocked
        ) {
            return Err(self.transition_err("Blocked"));
        }
        self.status = SeatClaimStatus::Blocked;
        self.user_id = None;
        self.reference = None;
        self.consumed_kind = None;
        self.consumed_source_id = None;
        self.reserved_at = None;
        self.updated_at = now;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
