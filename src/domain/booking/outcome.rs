//! Booking outcome types
//!
//! Business-rule failures are not errors: following the platform's API
//! convention they are soft outcomes with a machine-readable reason
//! code, serialized into the success/failure payload returned to the
//! caller. `DomainError` stays reserved for malformed input, missing
//! entities and infrastructure failures.

use serde::Serialize;

use crate::domain::entitlement::EntitlementKind;

/// Reason code for a rejected booking request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Schedule is cancelled, completed, or already started
    ScheduleNotBookable,
    /// Held seats reached max capacity
    ScheduleFull,
    /// Seat is missing, inactive, blocked or already held
    SeatUnavailable,
    /// User already holds a live claim for this schedule
    AlreadyBooked,
    /// No active entitlement with remaining credits for the discipline
    NoEntitlement,
    /// No free unit of the requested size for the schedule window
    NoFootwearAvailable,
    /// User is already in line for this schedule
    AlreadyWaiting,
    /// Nothing held by this user for this schedule
    ClaimNotFound,
    /// The schedule already started; the claim can no longer be released
    TooLateToCancel,
    /// Claim was already checked in
    AlreadyCheckedIn,
}

impl RejectReason {
    /// Stable code used in API payloads
    pub fn code(&self) -> &'static str {
        match self {
            Self::ScheduleNotBookable => "schedule_not_bookable",
            Self::ScheduleFull => "schedule_full",
            Self::SeatUnavailable => "seat_unavailable",
            Self::AlreadyBooked => "already_booked",
            Self::NoEntitlement => "no_entitlement",
            Self::NoFootwearAvailable => "no_footwear_available",
            Self::AlreadyWaiting => "already_waiting",
            Self::ClaimNotFound => "claim_not_found",
            Self::TooLateToCancel => "too_late_to_cancel",
            Self::AlreadyCheckedIn => "already_checked_in",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which resource a confirmed booking claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClaimedResource {
    Seat { seat_id: i32 },
    Footwear { footwear_id: i32 },
}

/// The credit spent by a confirmed booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsumedEntitlement {
    pub kind: EntitlementKind,
    pub source_id: i32,
    /// Credits left on the source after this booking
    pub remaining_after: u32,
}

/// A confirmed booking, returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    /// Reference the user presents at the studio
    pub reference: String,
    pub schedule_id: i32,
    pub user_id: i32,
    pub resource: ClaimedResource,
    pub consumed: ConsumedEntitlement,
}

/// Outcome of a reservation attempt
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReserveOutcome {
    Confirmed(BookingConfirmation),
    Rejected { reason: RejectReason },
}

impl ReserveOutcome {
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected { reason }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    pub fn confirmation(&self) -> Option<&BookingConfirmation> {
        match self {
            Self::Confirmed(c) => Some(c),
            Self::Rejected { .. } => None,
        }
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            Self::Confirmed(_) => None,
            Self::Rejected { reason } => Some(*reason),
        }
    }
}

/// Outcome of a cancellation attempt
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CancelOutcome {
    Cancelled {
        reference: String,
        /// The credit given back, when the claim recorded its source
        refunded: Option<ConsumedEntitlement>,
    },
    Rejected {
        reason: RejectReason,
    },
}

impl CancelOutcome {
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected { reason }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Outcome of a check-in attempt
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CheckInOutcome {
    CheckedIn {
        /// Loan opened for a confirmed footwear reservation
        loan_id: Option<i32>,
    },
    Rejected {
        reason: RejectReason,
    },
}

impl CheckInOutcome {
    pub fn rejected(reason: RejectReason) -> Self {
        Self::Rejected { reason }
    }

    pub fn is_checked_in(&self) -> bool {
        matches!(self, Self::CheckedIn { .. })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_codes_are_snake_case() {
        assert_eq!(RejectReason::ScheduleFull.code(), "schedule_full");
        assert_eq!(RejectReason::NoEntitlement.to_string(), "no_entitlement");
    }

    #[test]
    fn outcome_accessors() {
        let outcome = ReserveOutcome::rejected(RejectReason::SeatUnavailable);
        assert!(!outcome.is_confirmed());
        assert_eq!(outcome.reject_reason(), Some(RejectReason::SeatUnavailable));
        assert!(outcome.confirmation().is_none());
    }

    #[test]
    fn serializes_with_result_tag() {
        let outcome = ReserveOutcome::rejected(RejectReason::ScheduleFull);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "rejected");
        assert_eq!(json["reason"], "schedule_full");
    }

    #[test]
    fn confirmation_serializes_resource_and_source() {
        let outcome = ReserveOutcome::Confirmed(BookingConfirmation {
            reference: "REF-1".into(),
            schedule_id: 100,
            user_id: 42,
            resource: ClaimedResource::Seat { seat_id: 7 },
            consumed: ConsumedEntitlement {
                kind: EntitlementKind::Membership,
                source_id: 3,
                remaining_after: 4,
            },
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "confirmed");
        assert_eq!(json["resource"]["type"], "seat");
        assert_eq!(json["resource"]["seat_id"], 7);
        assert_eq!(json["consumed"]["kind"], "membership");
        assert_eq!(json["consumed"]["remaining_after"], 4);
    }
}
