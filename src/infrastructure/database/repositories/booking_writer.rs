//! SeaORM implementation of the transactional BookingWriter
//!
//! Each operation runs inside one database transaction and re-checks
//! its preconditions there, so concurrent attempts on the same seat,
//! unit or entitlement serialize through the store. Soft rejects commit
//! nothing; hard errors roll the transaction back.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::booking::{
    BookingConfirmation, BookingWriter, CancelOutcome, CheckInOutcome, ClaimedResource,
    ConsumedEntitlement, RejectReason, ReserveOutcome,
};
use crate::domain::entitlement::{sort_by_policy, EntitlementKind, EntitlementSource};
use crate::domain::footwear::{FootwearLoan, FootwearReservation, FootwearReservationStatus};
use crate::domain::seat::SeatClaimStatus;
use crate::domain::{ClassSchedule, DomainError, DomainResult, ScheduleSeat};
use crate::infrastructure::database::entities::{
    class_schedule, footwear, footwear_loan, footwear_reservation, schedule_seat, seat,
    user_membership, user_package,
};

use super::mappers::{
    claim_to_active, claim_to_domain, loan_to_active, loan_to_domain, membership_to_active,
    membership_to_domain, package_to_active, package_to_domain, reservation_to_active,
    reservation_to_domain, schedule_to_active, schedule_to_domain, unit_to_domain,
};
use super::{db_err, tx_err, HELD_STATUSES, LIVE_RESERVATION_STATUSES};

pub struct SeaOrmBookingWriter {
    db: DatabaseConnection,
}

impl SeaOrmBookingWriter {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn new_reference() -> String {
    format!("BK-{}", Uuid::new_v4().simple())
}

// ── In-transaction queries ──────────────────────────────────────

async fn load_schedule(txn: &DatabaseTransaction, id: i32) -> DomainResult<ClassSchedule> {
    let model = class_schedule::Entity::find_by_id(id)
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(DomainError::NotFound {
            entity: "ClassSchedule",
            field: "id",
            value: id.to_string(),
        })?;
    Ok(schedule_to_domain(model))
}

async fn held_count(txn: &DatabaseTransaction, schedule_id: i32) -> DomainResult<u64> {
    schedule_seat::Entity::find()
        .filter(schedule_seat::Column::ScheduleId.eq(schedule_id))
        .filter(schedule_seat::Column::Status.is_in(HELD_STATUSES))
        .count(txn)
        .await
        .map_err(db_err)
}

async fn find_user_claim(
    txn: &DatabaseTransaction,
    schedule_id: i32,
    user_id: i32,
) -> DomainResult<Option<ScheduleSeat>> {
    let model = schedule_seat::Entity::find()
        .filter(schedule_seat::Column::ScheduleId.eq(schedule_id))
        .filter(schedule_seat::Column::UserId.eq(user_id))
        .filter(schedule_seat::Column::Status.is_in(HELD_STATUSES))
        .one(txn)
        .await
        .map_err(db_err)?;
    Ok(model.map(claim_to_domain))
}

async fn find_claim(
    txn: &DatabaseTransaction,
    schedule_id: i32,
    seat_id: i32,
) -> DomainResult<Option<ScheduleSeat>> {
    let model = schedule_seat::Entity::find()
        .filter(schedule_seat::Column::ScheduleId.eq(schedule_id))
        .filter(schedule_seat::Column::SeatId.eq(seat_id))
        .one(txn)
        .await
        .map_err(db_err)?;
    Ok(model.map(claim_to_domain))
}

async fn seat_is_active(txn: &DatabaseTransaction, seat_id: i32) -> DomainResult<bool> {
    let model = seat::Entity::find_by_id(seat_id)
        .one(txn)
        .await
        .map_err(db_err)?;
    Ok(model.map(|s| s.is_active).unwrap_or(false))
}

async fn find_user_reservation(
    txn: &DatabaseTransaction,
    schedule_id: i32,
    user_id: i32,
) -> DomainResult<Option<FootwearReservation>> {
    let model = footwear_reservation::Entity::find()
        .filter(footwear_reservation::Column::ScheduleId.eq(schedule_id))
        .filter(footwear_reservation::Column::UserId.eq(user_id))
        .filter(footwear_reservation::Column::Status.is_in(LIVE_RESERVATION_STATUSES))
        .one(txn)
        .await
        .map_err(db_err)?;
    Ok(model.map(reservation_to_domain))
}

async fn active_sources(
    txn: &DatabaseTransaction,
    user_id: i32,
    discipline_id: i32,
    now: DateTime<Utc>,
) -> DomainResult<Vec<EntitlementSource>> {
    let memberships = user_membership::Entity::find()
        .filter(user_membership::Column::UserId.eq(user_id))
        .filter(user_membership::Column::DisciplineId.eq(discipline_id))
        .filter(user_membership::Column::Status.eq("Active"))
        .filter(user_membership::Column::StartsOn.lte(now))
        .filter(user_membership::Column::EndsOn.gt(now))
        .filter(user_membership::Column::RemainingFreeClasses.gt(0))
        .all(txn)
        .await
        .map_err(db_err)?;

    let packages = user_package::Entity::find()
        .filter(user_package::Column::UserId.eq(user_id))
        .filter(user_package::Column::DisciplineId.eq(discipline_id))
        .filter(user_package::Column::Status.eq("Active"))
        .filter(user_package::Column::ExpiryDate.gt(now))
        .filter(user_package::Column::RemainingClasses.gt(0))
        .all(txn)
        .await
        .map_err(db_err)?;

    Ok(memberships
        .into_iter()
        .map(|m| EntitlementSource::Membership(membership_to_domain(m)))
        .chain(
            packages
                .into_iter()
                .map(|p| EntitlementSource::Package(package_to_domain(p))),
        )
        .collect())
}

/// Spend one credit from the best eligible source in policy order.
/// Returns None when the user has nothing to consume.
async fn consume_best_source(
    txn: &DatabaseTransaction,
    user_id: i32,
    discipline_id: i32,
    now: DateTime<Utc>,
) -> DomainResult<Option<ConsumedEntitlement>> {
    let mut sources = active_sources(txn, user_id, discipline_id, now).await?;
    sort_by_policy(&mut sources);

    let Some(source) = sources.into_iter().next() else {
        return Ok(None);
    };

    match source {
        EntitlementSource::Membership(mut m) => {
            m.consume(now)?;
            membership_to_active(&m).update(txn).await.map_err(db_err)?;
            Ok(Some(ConsumedEntitlement {
                kind: EntitlementKind::Membership,
                source_id: m.id,
                remaining_after: m.remaining_free_classes,
            }))
        }
        EntitlementSource::Package(mut p) => {
            p.consume(now)?;
            package_to_active(&p).update(txn).await.map_err(db_err)?;
            Ok(Some(ConsumedEntitlement {
                kind: EntitlementKind::Package,
                source_id: p.id,
                remaining_after: p.remaining_classes,
            }))
        }
    }
}

/// Give one credit back to the source a booking consumed from.
async fn refund_source(
    txn: &DatabaseTransaction,
    kind: EntitlementKind,
    source_id: i32,
) -> DomainResult<ConsumedEntitlement> {
    match kind {
        EntitlementKind::Membership => {
            let model = user_membership::Entity::find_by_id(source_id)
                .one(txn)
                .await
                .map_err(db_err)?
                .ok_or(DomainError::NotFound {
                    entity: "UserMembership",
                    field: "id",
                    value: source_id.to_string(),
                })?;
            let mut m = membership_to_domain(model);
            m.refund()?;
            membership_to_active(&m).update(txn).await.map_err(db_err)?;
            Ok(ConsumedEntitlement {
                kind,
                source_id,
                remaining_after: m.remaining_free_classes,
            })
        }
        EntitlementKind::Package => {
            let model = user_package::Entity::find_by_id(source_id)
                .one(txn)
                .await
                .map_err(db_err)?
                .ok_or(DomainError::NotFound {
                    entity: "UserPackage",
                    field: "id",
                    value: source_id.to_string(),
                })?;
            let mut p = package_to_domain(model);
            p.refund()?;
            package_to_active(&p).update(txn).await.map_err(db_err)?;
            Ok(ConsumedEntitlement {
                kind,
                source_id,
                remaining_after: p.remaining_classes,
            })
        }
    }
}

/// First active unit of the size that is neither reserved for the
/// schedule nor out on an overlapping loan.
async fn find_free_unit(
    txn: &DatabaseTransaction,
    schedule: &ClassSchedule,
    size: i32,
) -> DomainResult<Option<i32>> {
    let window = schedule.window();

    let reserved: HashSet<i32> = footwear_reservation::Entity::find()
        .filter(footwear_reservation::Column::ScheduleId.eq(schedule.id))
        .filter(footwear_reservation::Column::Status.is_in(LIVE_RESERVATION_STATUSES))
        .all(txn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|r| r.footwear_id)
        .collect();

    let loaned: HashSet<i32> = footwear_loan::Entity::find()
        .filter(footwear_loan::Column::LoanDate.lt(window.end))
        .filter(
            Condition::any()
                .add(footwear_loan::Column::ReturnDate.is_null())
                .add(footwear_loan::Column::ReturnDate.gt(window.start)),
        )
        .all(txn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(|l| l.footwear_id)
        .collect();

    let unit = footwear::Entity::find()
        .filter(footwear::Column::Size.eq(size))
        .filter(footwear::Column::IsActive.eq(true))
        .order_by_asc(footwear::Column::Code)
        .all(txn)
        .await
        .map_err(db_err)?
        .into_iter()
        .map(unit_to_domain)
        .find(|u| !reserved.contains(&u.id) && !loaned.contains(&u.id));

    Ok(unit.map(|u| u.id))
}

// ── Transaction bodies ──────────────────────────────────────────

async fn reserve_seat_tx(
    txn: &DatabaseTransaction,
    schedule_id: i32,
    seat_id: i32,
    user_id: i32,
    now: DateTime<Utc>,
) -> DomainResult<ReserveOutcome> {
    let schedule = load_schedule(txn, schedule_id).await?;
    if !schedule.is_bookable(now) {
        return Ok(ReserveOutcome::rejected(RejectReason::ScheduleNotBookable));
    }

    if find_user_claim(txn, schedule_id, user_id).await?.is_some() {
        return Ok(ReserveOutcome::rejected(RejectReason::AlreadyBooked));
    }

    let Some(mut claim) = find_claim(txn, schedule_id, seat_id).await? else {
        return Ok(ReserveOutcome::rejected(RejectReason::SeatUnavailable));
    };
    if !claim.is_available() || !seat_is_active(txn, seat_id).await? {
        return Ok(ReserveOutcome::rejected(RejectReason::SeatUnavailable));
    }

    if held_count(txn, schedule_id).await? >= schedule.max_capacity as u64 {
        return Ok(ReserveOutcome::rejected(RejectReason::ScheduleFull));
    }

    let Some(consumed) =
        consume_best_source(txn, user_id, schedule.discipline_id, now).await?
    else {
        return Ok(ReserveOutcome::rejected(RejectReason::NoEntitlement));
    };

    let reference = new_reference();
    claim.reserve(user_id, reference.clone(), consumed.kind, consumed.source_id, now)?;
    claim_to_active(&claim).update(txn).await.map_err(db_err)?;

    Ok(ReserveOutcome::Confirmed(BookingConfirmation {
        reference,
        schedule_id,
        user_id,
        resource: ClaimedResource::Seat { seat_id },
        consumed,
    }))
}

async fn reserve_footwear_tx(
    txn: &DatabaseTransaction,
    schedule_id: i32,
    size: i32,
    user_id: i32,
    now: DateTime<Utc>,
) -> DomainResult<ReserveOutcome> {
    let schedule = load_schedule(txn, schedule_id).await?;
    if !schedule.is_bookable(now) {
        return Ok(ReserveOutcome::rejected(RejectReason::ScheduleNotBookable));
    }

    if find_user_reservation(txn, schedule_id, user_id)
        .await?
        .is_some()
    {
        return Ok(ReserveOutcome::rejected(RejectReason::AlreadyBooked));
    }

    let Some(footwear_id) = find_free_unit(txn, &schedule, size).await? else {
        return Ok(ReserveOutcome::rejected(RejectReason::NoFootwearAvailable));
    };

    let Some(consumed) =
        consume_best_source(txn, user_id, schedule.discipline_id, now).await?
    else {
        return Ok(ReserveOutcome::rejected(RejectReason::NoEntitlement));
    };

    let reference = new_reference();
    // unclaimed reservations lapse at class start
    let mut reservation = FootwearReservation::new(
        0,
        footwear_id,
        schedule_id,
        user_id,
        reference.clone(),
        schedule.starts_at,
    );
    reservation.consumed_kind = Some(consumed.kind);
    reservation.consumed_source_id = Some(consumed.source_id);

    let mut active = reservation_to_active(&reservation);
    active.id = NotSet;
    active.insert(txn).await.map_err(db_err)?;

    Ok(ReserveOutcome::Confirmed(BookingConfirmation {
        reference,
        schedule_id,
        user_id,
        resource: ClaimedResource::Footwear { footwear_id },
        consumed,
    }))
}

async fn cancel_tx(
    txn: &DatabaseTransaction,
    schedule_id: i32,
    user_id: i32,
    now: DateTime<Utc>,
) -> DomainResult<CancelOutcome> {
    let schedule = load_schedule(txn, schedule_id).await?;
    if schedule.has_started(now) {
        return Ok(CancelOutcome::rejected(RejectReason::TooLateToCancel));
    }

    let claim = find_user_claim(txn, schedule_id, user_id).await?;
    let reservation = find_user_reservation(txn, schedule_id, user_id).await?;

    let mut cancelled_reference: Option<String> = None;
    let mut refunded: Option<ConsumedEntitlement> = None;

    if let Some(mut claim) = claim {
        if claim.status != SeatClaimStatus::Reserved {
            return Ok(CancelOutcome::rejected(RejectReason::AlreadyCheckedIn));
        }
        cancelled_reference = claim.reference.clone();
        let consumed = claim.release(now)?;
        claim_to_active(&claim).update(txn).await.map_err(db_err)?;
        if let Some((kind, source_id)) = consumed {
            refunded = Some(refund_source(txn, kind, source_id).await?);
        }
    }

    if let Some(mut reservation) = reservation {
        if reservation.status == FootwearReservationStatus::Pending {
            if cancelled_reference.is_none() {
                cancelled_reference = Some(reservation.reference.clone());
            }
            reservation.cancel()?;
            reservation_to_active(&reservation)
                .update(txn)
                .await
                .map_err(db_err)?;
            if let (Some(kind), Some(source_id)) =
                (reservation.consumed_kind, reservation.consumed_source_id)
            {
                let credit = refund_source(txn, kind, source_id).await?;
                refunded.get_or_insert(credit);
            }
        } else if cancelled_reference.is_none() {
            // the unit was already handed out
            return Ok(CancelOutcome::rejected(RejectReason::AlreadyCheckedIn));
        }
    }

    match cancelled_reference {
        Some(reference) => Ok(CancelOutcome::Cancelled {
            reference,
            refunded,
        }),
        None => Ok(CancelOutcome::rejected(RejectReason::ClaimNotFound)),
    }
}

async fn check_in_tx(
    txn: &DatabaseTransaction,
    schedule_id: i32,
    user_id: i32,
    now: DateTime<Utc>,
) -> DomainResult<CheckInOutcome> {
    let claim = find_user_claim(txn, schedule_id, user_id).await?;
    let reservation = find_user_reservation(txn, schedule_id, user_id).await?;

    if claim.is_none() && reservation.is_none() {
        return Ok(CheckInOutcome::rejected(RejectReason::ClaimNotFound));
    }

    let mut progressed = false;
    let mut loan_id = None;

    if let Some(mut claim) = claim {
        if claim.status == SeatClaimStatus::Reserved {
            claim.occupy(now)?;
            claim_to_active(&claim).update(txn).await.map_err(db_err)?;
            progressed = true;
        }
    }

    if let Some(mut reservation) = reservation {
        if reservation.status == FootwearReservationStatus::Pending {
            reservation.confirm()?;
            reservation_to_active(&reservation)
                .update(txn)
                .await
                .map_err(db_err)?;

            let loan = FootwearLoan::new(0, reservation.footwear_id, user_id, Some(reservation.id), now);
            let mut active = loan_to_active(&loan);
            active.id = NotSet;
            let model = active.insert(txn).await.map_err(db_err)?;
            loan_id = Some(loan_to_domain(model).id);
            progressed = true;
        }
    }

    if !progressed {
        return Ok(CheckInOutcome::rejected(RejectReason::AlreadyCheckedIn));
    }

    Ok(CheckInOutcome::CheckedIn { loan_id })
}

async fn complete_schedule_tx(
    txn: &DatabaseTransaction,
    schedule_id: i32,
    now: DateTime<Utc>,
) -> DomainResult<u32> {
    let mut schedule = load_schedule(txn, schedule_id).await?;
    schedule.complete();
    schedule_to_active(&schedule).update(txn).await.map_err(db_err)?;

    let models = schedule_seat::Entity::find()
        .filter(schedule_seat::Column::ScheduleId.eq(schedule_id))
        .filter(schedule_seat::Column::Status.eq("Occupied"))
        .all(txn)
        .await
        .map_err(db_err)?;

    let mut completed = 0;
    for model in models {
        let mut claim = claim_to_domain(model);
        claim.complete(now)?;
        claim_to_active(&claim).update(txn).await.map_err(db_err)?;
        completed += 1;
    }

    Ok(completed)
}

// ── BookingWriter impl ──────────────────────────────────────────

#[async_trait]
impl BookingWriter for SeaOrmBookingWriter {
    async fn reserve_seat(
        &self,
        schedule_id: i32,
        seat_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<ReserveOutcome> {
        debug!(
            "Reserving seat {} for schedule {} (user {})",
            seat_id, schedule_id, user_id
        );

        self.db
            .transaction::<_, ReserveOutcome, DomainError>(move |txn| {
                Box::pin(async move { reserve_seat_tx(txn, schedule_id, seat_id, user_id, now).await })
            })
            .await
            .map_err(tx_err)
    }

    async fn reserve_footwear(
        &self,
        schedule_id: i32,
        size: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<ReserveOutcome> {
        debug!(
            "Reserving footwear size {} for schedule {} (user {})",
            size, schedule_id, user_id
        );

        self.db
            .transaction::<_, ReserveOutcome, DomainError>(move |txn| {
                Box::pin(async move { reserve_footwear_tx(txn, schedule_id, size, user_id, now).await })
            })
            .await
            .map_err(tx_err)
    }

    async fn cancel_seat_claim(
        &self,
        schedule_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<CancelOutcome> {
        debug!(
            "Cancelling booking for schedule {} (user {})",
            schedule_id, user_id
        );

        self.db
            .transaction::<_, CancelOutcome, DomainError>(move |txn| {
                Box::pin(async move { cancel_tx(txn, schedule_id, user_id, now).await })
            })
            .await
            .map_err(tx_err)
    }

    async fn check_in(
        &self,
        schedule_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<CheckInOutcome> {
        debug!(
            "Checking in user {} for schedule {}",
            user_id, schedule_id
        );

        self.db
            .transaction::<_, CheckInOutcome, DomainError>(move |txn| {
                Box::pin(async move { check_in_tx(txn, schedule_id, user_id, now).await })
            })
            .await
            .map_err(tx_err)
    }

    async fn complete_schedule(&self, schedule_id: i32, now: DateTime<Utc>) -> DomainResult<u32> {
        debug!("Completing schedule {}", schedule_id);

        self.db
            .transaction::<_, u32, DomainError>(move |txn| {
                Box::pin(async move { complete_schedule_tx(txn, schedule_id, now).await })
            })
            .await
            .map_err(tx_err)
    }
}
