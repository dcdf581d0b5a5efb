//! Entity ↔ domain conversions shared by the repositories and the
//! transactional booking writer.

use sea_orm::Set;

use crate::domain::entitlement::{
    EntitlementKind, MembershipStatus, PackageStatus, UserMembership, UserPackage,
};
use crate::domain::{
    ClassSchedule, Footwear, FootwearLoan, FootwearReservation, FootwearReservationStatus,
    ScheduleSeat, ScheduleStatus, Seat, SeatClaimStatus, WaitingEntry, WaitingStatus,
};

use super::super::entities::{
    class_schedule, footwear, footwear_loan, footwear_reservation, schedule_seat, seat,
    user_membership, user_package, waiting_class,
};

// ── Model → domain ──────────────────────────────────────────────

pub(crate) fn schedule_to_domain(m: class_schedule::Model) -> ClassSchedule {
    ClassSchedule {
        id: m.id,
        discipline_id: m.discipline_id,
        studio_id: m.studio_id,
        instructor_id: m.instructor_id,
        starts_at: m.starts_at,
        ends_at: m.ends_at,
        max_capacity: m.max_capacity.max(0) as u32,
        status: ScheduleStatus::from_str(&m.status),
        created_at: m.created_at,
    }
}

pub(crate) fn seat_to_domain(m: seat::Model) -> Seat {
    Seat {
        id: m.id,
        studio_id: m.studio_id,
        row: m.seat_row,
        column: m.seat_column,
        is_active: m.is_active,
    }
}

pub(crate) fn claim_to_domain(m: schedule_seat::Model) -> ScheduleSeat {
    ScheduleSeat {
        id: m.id,
        schedule_id: m.schedule_id,
        seat_id: m.seat_id,
        status: SeatClaimStatus::from_str(&m.status),
        user_id: m.user_id,
        reference: m.reference,
        consumed_kind: m.consumed_kind.as_deref().and_then(EntitlementKind::from_str),
        consumed_source_id: m.consumed_source_id,
        reserved_at: m.reserved_at,
        updated_at: m.updated_at,
    }
}

pub(crate) fn package_to_domain(m: user_package::Model) -> UserPackage {
    UserPackage {
        id: m.id,
        user_id: m.user_id,
        discipline_id: m.discipline_id,
        total_classes: m.total_classes.max(0) as u32,
        used_classes: m.used_classes.max(0) as u32,
        remaining_classes: m.remaining_classes.max(0) as u32,
        expiry_date: m.expiry_date,
        status: PackageStatus::from_str(&m.status),
        purchased_at: m.purchased_at,
    }
}

pub(crate) fn membership_to_domain(m: user_membership::Model) -> UserMembership {
    UserMembership {
        id: m.id,
        user_id: m.user_id,
        discipline_id: m.discipline_id,
        total_free_classes: m.total_free_classes.max(0) as u32,
        used_free_classes: m.used_free_classes.max(0) as u32,
        remaining_free_classes: m.remaining_free_classes.max(0) as u32,
        starts_on: m.starts_on,
        ends_on: m.ends_on,
        status: MembershipStatus::from_str(&m.status),
    }
}

pub(crate) fn unit_to_domain(m: footwear::Model) -> Footwear {
    Footwear {
        id: m.id,
        code: m.code,
        size: m.size,
        is_active: m.is_active,
    }
}

pub(crate) fn reservation_to_domain(m: footwear_reservation::Model) -> FootwearReservation {
    FootwearReservation {
        id: m.id,
        footwear_id: m.footwear_id,
        schedule_id: m.schedule_id,
        user_id: m.user_id,
        status: FootwearReservationStatus::from_str(&m.status),
        reference: m.reference,
        consumed_kind: m.consumed_kind.as_deref().and_then(EntitlementKind::from_str),
        consumed_source_id: m.consumed_source_id,
        expires_at: m.expires_at,
        created_at: m.created_at,
    }
}

pub(crate) fn loan_to_domain(m: footwear_loan::Model) -> FootwearLoan {
    FootwearLoan {
        id: m.id,
        footwear_id: m.footwear_id,
        user_id: m.user_id,
        reservation_id: m.reservation_id,
        loan_date: m.loan_date,
        return_date: m.return_date,
    }
}

pub(crate) fn waiting_to_domain(m: waiting_class::Model) -> WaitingEntry {
    WaitingEntry {
        id: m.id,
        schedule_id: m.schedule_id,
        user_id: m.user_id,
        status: WaitingStatus::from_str(&m.status),
        created_at: m.created_at,
    }
}

// ── Domain → active model ───────────────────────────────────────
//
// Every field is Set, the row id included; inserts that rely on
// auto-increment override `id` with NotSet.

pub(crate) fn schedule_to_active(s: &ClassSchedule) -> class_schedule::ActiveModel {
    class_schedule::ActiveModel {
        id: Set(s.id),
        discipline_id: Set(s.discipline_id),
        studio_id: Set(s.studio_id),
        instructor_id: Set(s.instructor_id),
        starts_at: Set(s.starts_at),
        ends_at: Set(s.ends_at),
        max_capacity: Set(s.max_capacity as i32),
        status: Set(s.status.as_str().to_string()),
        created_at: Set(s.created_at),
    }
}

pub(crate) fn seat_to_active(s: &Seat) -> seat::ActiveModel {
    seat::ActiveModel {
        id: Set(s.id),
        studio_id: Set(s.studio_id),
        seat_row: Set(s.row),
        seat_column: Set(s.column),
        is_active: Set(s.is_active),
    }
}

pub(crate) fn claim_to_active(c: &ScheduleSeat) -> schedule_seat::ActiveModel {
    schedule_seat::ActiveModel {
        id: Set(c.id),
        schedule_id: Set(c.schedule_id),
        seat_id: Set(c.seat_id),
        status: Set(c.status.as_str().to_string()),
        user_id: Set(c.user_id),
        reference: Set(c.reference.clone()),
        consumed_kind: Set(c.consumed_kind.map(|k| k.as_str().to_string())),
        consumed_source_id: Set(c.consumed_source_id),
        reserved_at: Set(c.reserved_at),
        updated_at: Set(c.updated_at),
    }
}

pub(crate) fn package_to_active(p: &UserPackage) -> user_package::ActiveModel {
    user_package::ActiveModel {
        id: Set(p.id),
        user_id: Set(p.user_id),
        discipline_id: Set(p.discipline_id),
        total_classes: Set(p.total_classes as i32),
        used_classes: Set(p.used_classes as i32),
        remaining_classes: Set(p.remaining_classes as i32),
        expiry_date: Set(p.expiry_date),
        status: Set(p.status.as_str().to_string()),
        purchased_at: Set(p.purchased_at),
    }
}

pub(crate) fn membership_to_active(m: &UserMembership) -> user_membership::ActiveModel {
    user_membership::ActiveModel {
        id: Set(m.id),
        user_id: Set(m.user_id),
        discipline_id: Set(m.discipline_id),
        total_free_classes: Set(m.total_free_classes as i32),
        used_free_classes: Set(m.used_free_classes as i32),
        remaining_free_classes: Set(m.remaining_free_classes as i32),
        starts_on: Set(m.starts_on),
        ends_on: Set(m.ends_on),
        status: Set(m.status.as_str().to_string()),
    }
}

pub(crate) fn unit_to_active(u: &Footwear) -> footwear::ActiveModel {
    footwear::ActiveModel {
        id: Set(u.id),
        code: Set(u.code.clone()),
        size: Set(u.size),
        is_active: Set(u.is_active),
    }
}

pub(crate) fn reservation_to_active(r: &FootwearReservation) -> footwear_reservation::ActiveModel {
    footwear_reservation::ActiveModel {
        id: Set(r.id),
        footwear_id: Set(r.footwear_id),
        schedule_id: Set(r.schedule_id),
        user_id: Set(r.user_id),
        status: Set(r.status.as_str().to_string()),
        reference: Set(r.reference.clone()),
        consumed_kind: Set(r.consumed_kind.map(|k| k.as_str().to_string())),
        consumed_source_id: Set(r.consumed_source_id),
        expires_at: Set(r.expires_at),
        created_at: Set(r.created_at),
    }
}

pub(crate) fn loan_to_active(l: &FootwearLoan) -> footwear_loan::ActiveModel {
    footwear_loan::ActiveModel {
        id: Set(l.id),
        footwear_id: Set(l.footwear_id),
        user_id: Set(l.user_id),
        reservation_id: Set(l.reservation_id),
        loan_date: Set(l.loan_date),
        return_date: Set(l.return_date),
    }
}

pub(crate) fn waiting_to_active(w: &WaitingEntry) -> waiting_class::ActiveModel {
    waiting_class::ActiveModel {
        id: Set(w.id),
        schedule_id: Set(w.schedule_id),
        user_id: Set(w.user_id),
        status: Set(w.status.as_str().to_string()),
        created_at: Set(w.created_at),
    }
}
