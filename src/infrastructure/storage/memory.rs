//! In-memory storage for development and testing
//!
//! Backs every repository trait with a concurrent map. The booking
//! writer serializes its claim-and-consume flows through one async
//! mutex, standing in for the database transaction the SeaORM backend
//! uses; preconditions are re-checked under the lock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::booking::{
    BookingConfirmation, BookingWriter, CancelOutcome, CheckInOutcome, ClaimedResource,
    ConsumedEntitlement, RejectReason, ReserveOutcome,
};
use crate::domain::entitlement::{
    sort_by_policy, EntitlementKind, EntitlementRepository, EntitlementSource, UserMembership,
    UserPackage,
};
use crate::domain::footwear::{
    Footwear, FootwearLoan, FootwearRepository, FootwearReservation, FootwearReservationStatus,
};
use crate::domain::repositories::RepositoryProvider;
use crate::domain::schedule::{ClassSchedule, ScheduleRepository, TimeWindow};
use crate::domain::seat::{ScheduleSeat, Seat, SeatClaimStatus, SeatRepository};
use crate::domain::waitlist::{WaitingEntry, WaitingStatus, WaitlistRepository};
use crate::domain::{DomainError, DomainResult};
use crate::shared::types::{PaginatedResult, PaginationParams};

/// In-memory repository provider
pub struct InMemoryStorage {
    schedules: DashMap<i32, ClassSchedule>,
    seats: DashMap<i32, Seat>,
    claims: DashMap<i32, ScheduleSeat>,
    packages: DashMap<i32, UserPackage>,
    memberships: DashMap<i32, UserMembership>,
    units: DashMap<i32, Footwear>,
    reservations: DashMap<i32, FootwearReservation>,
    loans: DashMap<i32, FootwearLoan>,
    waitlist: DashMap<i32, WaitingEntry>,
    claim_counter: AtomicI32,
    reservation_counter: AtomicI32,
    loan_counter: AtomicI32,
    waiting_counter: AtomicI32,
    booking_lock: Mutex<()>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            schedules: DashMap::new(),
            seats: DashMap::new(),
            claims: DashMap::new(),
            packages: DashMap::new(),
            memberships: DashMap::new(),
            units: DashMap::new(),
            reservations: DashMap::new(),
            loans: DashMap::new(),
            waitlist: DashMap::new(),
            claim_counter: AtomicI32::new(1),
            reservation_counter: AtomicI32::new(1),
            loan_counter: AtomicI32::new(1),
            waiting_counter: AtomicI32::new(1),
            booking_lock: Mutex::new(()),
        }
    }

    fn held(&self, schedule_id: i32) -> u64 {
        self.claims
            .iter()
            .filter(|c| c.schedule_id == schedule_id && c.is_held())
            .count() as u64
    }

    fn user_claim(&self, schedule_id: i32, user_id: i32) -> Option<ScheduleSeat> {
        self.claims
            .iter()
            .find(|c| {
                c.schedule_id == schedule_id && c.user_id == Some(user_id) && c.is_held()
            })
            .map(|c| c.clone())
    }

    fn user_reservation(&self, schedule_id: i32, user_id: i32) -> Option<FootwearReservation> {
        self.reservations
            .iter()
            .find(|r| r.schedule_id == schedule_id && r.user_id == user_id && r.is_live())
            .map(|r| r.clone())
    }

    fn sources_for(
        &self,
        user_id: i32,
        discipline_id: i32,
        now: DateTime<Utc>,
    ) -> Vec<EntitlementSource> {
        let memberships = self
            .memberships
            .iter()
            .filter(|m| {
                m.user_id == user_id && m.discipline_id == discipline_id && m.is_consumable(now)
            })
            .map(|m| EntitlementSource::Membership(m.clone()));

        let packages = self
            .packages
            .iter()
            .filter(|p| {
                p.user_id == user_id && p.discipline_id == discipline_id && p.is_consumable(now)
            })
            .map(|p| EntitlementSource::Package(p.clone()));

        memberships.chain(packages).collect()
    }

    /// Spend one credit from the best eligible source in policy order.
    fn consume_best(
        &self,
        user_id: i32,
        discipline_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<ConsumedEntitlement>> {
        let mut sources = self.sources_for(user_id, discipline_id, now);
        sort_by_policy(&mut sources);

        let Some(source) = sources.into_iter().next() else {
            return Ok(None);
        };

        match source {
            EntitlementSource::Membership(m) => {
                let mut row = self.memberships.get_mut(&m.id).ok_or(DomainError::NotFound {
                    entity: "UserMembership",
                    field: "id",
                    value: m.id.to_string(),
                })?;
                row.consume(now)?;
                Ok(Some(ConsumedEntitlement {
                    kind: EntitlementKind::Membership,
                    source_id: m.id,
                    remaining_after: row.remaining_free_classes,
                }))
            }
            EntitlementSource::Package(p) => {
                let mut row = self.packages.get_mut(&p.id).ok_or(DomainError::NotFound {
                    entity: "UserPackage",
                    field: "id",
                    value: p.id.to_string(),
                })?;
                row.consume(now)?;
                Ok(Some(ConsumedEntitlement {
                    kind: EntitlementKind::Package,
                    source_id: p.id,
                    remaining_after: row.remaining_classes,
                }))
            }
        }
    }

    /// Give one credit back to the source a booking consumed from.
    fn refund_credit(
        &self,
        kind: EntitlementKind,
        source_id: i32,
    ) -> DomainResult<ConsumedEntitlement> {
        match kind {
            EntitlementKind::Membership => {
                let mut row =
                    self.memberships
                        .get_mut(&source_id)
                        .ok_or(DomainError::NotFound {
                            entity: "UserMembership",
                            field: "id",
                            value: source_id.to_string(),
                        })?;
                row.refund()?;
                Ok(ConsumedEntitlement {
                    kind,
                    source_id,
                    remaining_after: row.remaining_free_classes,
                })
            }
            EntitlementKind::Package => {
                let mut row = self.packages.get_mut(&source_id).ok_or(DomainError::NotFound {
                    entity: "UserPackage",
                    field: "id",
                    value: source_id.to_string(),
                })?;
                row.refund()?;
                Ok(ConsumedEntitlement {
                    kind,
                    source_id,
                    remaining_after: row.remaining_classes,
                })
            }
        }
    }

    /// First active unit of the size that is neither reserved for the
    /// schedule nor out on an overlapping loan.
    fn free_unit(&self, schedule: &ClassSchedule, size: i32) -> Option<i32> {
        let window = schedule.window();

        let reserved: HashSet<i32> = self
            .reservations
            .iter()
            .filter(|r| r.schedule_id == schedule.id && r.is_live())
            .map(|r| r.footwear_id)
            .collect();

        let loaned: HashSet<i32> = self
            .loans
            .iter()
            .filter(|l| l.overlaps(&window))
            .map(|l| l.footwear_id)
            .collect();

        let mut candidates: Vec<Footwear> = self
            .units
            .iter()
            .filter(|u| {
                u.size == size
                    && u.is_active
                    && !reserved.contains(&u.id)
                    && !loaned.contains(&u.id)
            })
            .map(|u| u.clone())
            .collect();
        candidates.sort_by(|a, b| a.code.cmp(&b.code));
        candidates.first().map(|u| u.id)
    }

    fn schedule_or_not_found(&self, schedule_id: i32) -> DomainResult<ClassSchedule> {
        self.schedules
            .get(&schedule_id)
            .map(|s| s.clone())
            .ok_or(DomainError::NotFound {
                entity: "ClassSchedule",
                field: "id",
                value: schedule_id.to_string(),
            })
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn new_reference() -> String {
    format!("BK-{}", Uuid::new_v4().simple())
}

// ── ScheduleRepository ──────────────────────────────────────────

#[async_trait]
impl ScheduleRepository for InMemoryStorage {
    async fn save(&self, schedule: ClassSchedule) -> DomainResult<()> {
        if self.schedules.contains_key(&schedule.id) {
            return Err(DomainError::Conflict(format!(
                "schedule {} already exists",
                schedule.id
            )));
        }
        self.schedules.insert(schedule.id, schedule);
        Ok(())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ClassSchedule>> {
        Ok(self.schedules.get(&id).map(|s| s.clone()))
    }

    async fn update(&self, schedule: ClassSchedule) -> DomainResult<()> {
        if !self.schedules.contains_key(&schedule.id) {
            return Err(DomainError::NotFound {
                entity: "ClassSchedule",
                field: "id",
                value: schedule.id.to_string(),
            });
        }
        self.schedules.insert(schedule.id, schedule);
        Ok(())
    }

    async fn find_upcoming_for_discipline(
        &self,
        discipline_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<ClassSchedule>> {
        let mut upcoming: Vec<ClassSchedule> = self
            .schedules
            .iter()
            .filter(|s| {
                s.discipline_id == discipline_id && s.is_bookable(now)
            })
            .map(|s| s.clone())
            .collect();
        upcoming.sort_by_key(|s| s.starts_at);
        Ok(upcoming)
    }

    async fn list(&self, params: PaginationParams) -> DomainResult<PaginatedResult<ClassSchedule>> {
        let mut all: Vec<ClassSchedule> = self.schedules.iter().map(|s| s.clone()).collect();
        all.sort_by(|a, b| b.id.cmp(&a.id));

        let total = all.len() as u64;
        let start = (params.page.saturating_sub(1) * params.limit) as usize;
        let items = all
            .into_iter()
            .skip(start)
            .take(params.limit as usize)
            .collect();

        Ok(PaginatedResult::new(items, total, params.page, params.limit))
    }
}

// ── SeatRepository ──────────────────────────────────────────────

#[async_trait]
impl SeatRepository for InMemoryStorage {
    async fn save_seat(&self, seat: Seat) -> DomainResult<()> {
        if self.seats.contains_key(&seat.id) {
            return Err(DomainError::Conflict(format!(
                "seat {} already exists",
                seat.id
            )));
        }
        self.seats.insert(seat.id, seat);
        Ok(())
    }

    async fn find_seat(&self, id: i32) -> DomainResult<Option<Seat>> {
        Ok(self.seats.get(&id).map(|s| s.clone()))
    }

    async fn list_studio_seats(&self, studio_id: i32) -> DomainResult<Vec<Seat>> {
        let mut seats: Vec<Seat> = self
            .seats
            .iter()
            .filter(|s| s.studio_id == studio_id && s.is_active)
            .map(|s| s.clone())
            .collect();
        seats.sort_by_key(|s| (s.row, s.column));
        Ok(seats)
    }

    async fn find_claim(
        &self,
        schedule_id: i32,
        seat_id: i32,
    ) -> DomainResult<Option<ScheduleSeat>> {
        Ok(self
            .claims
            .iter()
            .find(|c| c.schedule_id == schedule_id && c.seat_id == seat_id)
            .map(|c| c.clone()))
    }

    async fn find_user_claim(
        &self,
        schedule_id: i32,
        user_id: i32,
    ) -> DomainResult<Option<ScheduleSeat>> {
        Ok(self.user_claim(schedule_id, user_id))
    }

    async fn list_claims(&self, schedule_id: i32) -> DomainResult<Vec<ScheduleSeat>> {
        let mut claims: Vec<ScheduleSeat> = self
            .claims
            .iter()
            .filter(|c| c.schedule_id == schedule_id)
            .map(|c| c.clone())
            .collect();
        claims.sort_by_key(|c| c.seat_id);
        Ok(claims)
    }

    async fn held_count(&self, schedule_id: i32) -> DomainResult<u64> {
        Ok(self.held(schedule_id))
    }

    async fn save_claim(&self, claim: ScheduleSeat) -> DomainResult<ScheduleSeat> {
        let mut claim = claim;
        claim.id = self.claim_counter.fetch_add(1, Ordering::SeqCst);
        self.claims.insert(claim.id, claim.clone());
        Ok(claim)
    }

    async fn update_claim(&self, claim: ScheduleSeat) -> DomainResult<()> {
        if !self.claims.contains_key(&claim.id) {
            return Err(DomainError::NotFound {
                entity: "ScheduleSeat",
                field: "id",
                value: claim.id.to_string(),
            });
        }
        self.claims.insert(claim.id, claim);
        Ok(())
    }
}

// ── EntitlementRepository ───────────────────────────────────────

#[async_trait]
impl EntitlementRepository for InMemoryStorage {
    async fn save_package(&self, package: UserPackage) -> DomainResult<()> {
        if self.packages.contains_key(&package.id) {
            return Err(DomainError::Conflict(format!(
                "package {} already exists",
                package.id
            )));
        }
        self.packages.insert(package.id, package);
        Ok(())
    }

    async fn save_membership(&self, membership: UserMembership) -> DomainResult<()> {
        if self.memberships.contains_key(&membership.id) {
            return Err(DomainError::Conflict(format!(
                "membership {} already exists",
                membership.id
            )));
        }
        self.memberships.insert(membership.id, membership);
        Ok(())
    }

    async fn find_package(&self, id: i32) -> DomainResult<Option<UserPackage>> {
        Ok(self.packages.get(&id).map(|p| p.clone()))
    }

    async fn find_membership(&self, id: i32) -> DomainResult<Option<UserMembership>> {
        Ok(self.memberships.get(&id).map(|m| m.clone()))
    }

    async fn update_package(&self, package: UserPackage) -> DomainResult<()> {
        if !self.packages.contains_key(&package.id) {
            return Err(DomainError::NotFound {
                entity: "UserPackage",
                field: "id",
                value: package.id.to_string(),
            });
        }
        self.packages.insert(package.id, package);
        Ok(())
    }

    async fn update_membership(&self, membership: UserMembership) -> DomainResult<()> {
        if !self.memberships.contains_key(&membership.id) {
            return Err(DomainError::NotFound {
                entity: "UserMembership",
                field: "id",
                value: membership.id.to_string(),
            });
        }
        self.memberships.insert(membership.id, membership);
        Ok(())
    }

    async fn active_sources(
        &self,
        user_id: i32,
        discipline_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<EntitlementSource>> {
        Ok(self.sources_for(user_id, discipline_id, now))
    }
}

// ── FootwearRepository ──────────────────────────────────────────

#[async_trait]
impl FootwearRepository for InMemoryStorage {
    async fn save_unit(&self, unit: Footwear) -> DomainResult<()> {
        if self.units.contains_key(&unit.id) {
            return Err(DomainError::Conflict(format!(
                "footwear unit {} already exists",
                unit.id
            )));
        }
        self.units.insert(unit.id, unit);
        Ok(())
    }

    async fn find_unit(&self, id: i32) -> DomainResult<Option<Footwear>> {
        Ok(self.units.get(&id).map(|u| u.clone()))
    }

    async fn list_units_by_size(&self, size: i32) -> DomainResult<Vec<Footwear>> {
        let mut units: Vec<Footwear> = self
            .units
            .iter()
            .filter(|u| u.size == size && u.is_active)
            .map(|u| u.clone())
            .collect();
        units.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(units)
    }

    async fn live_reservations_for_schedule(
        &self,
        schedule_id: i32,
    ) -> DomainResult<Vec<FootwearReservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.schedule_id == schedule_id && r.is_live())
            .map(|r| r.clone())
            .collect())
    }

    async fn find_live_reservation_for_user(
        &self,
        schedule_id: i32,
        user_id: i32,
    ) -> DomainResult<Option<FootwearReservation>> {
        Ok(self.user_reservation(schedule_id, user_id))
    }

    async fn save_reservation(
        &self,
        reservation: FootwearReservation,
    ) -> DomainResult<FootwearReservation> {
        let mut reservation = reservation;
        reservation.id = self.reservation_counter.fetch_add(1, Ordering::SeqCst);
        self.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn update_reservation(&self, reservation: FootwearReservation) -> DomainResult<()> {
        if !self.reservations.contains_key(&reservation.id) {
            return Err(DomainError::NotFound {
                entity: "FootwearReservation",
                field: "id",
                value: reservation.id.to_string(),
            });
        }
        self.reservations.insert(reservation.id, reservation);
        Ok(())
    }

    async fn find_overdue_reservations(
        &self,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<FootwearReservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.is_overdue(now))
            .map(|r| r.clone())
            .collect())
    }

    async fn loans_overlapping(&self, window: TimeWindow) -> DomainResult<Vec<FootwearLoan>> {
        Ok(self
            .loans
            .iter()
            .filter(|l| l.overlaps(&window))
            .map(|l| l.clone())
            .collect())
    }

    async fn find_loan(&self, id: i32) -> DomainResult<Option<FootwearLoan>> {
        Ok(self.loans.get(&id).map(|l| l.clone()))
    }

    async fn save_loan(&self, loan: FootwearLoan) -> DomainResult<FootwearLoan> {
        let mut loan = loan;
        loan.id = self.loan_counter.fetch_add(1, Ordering::SeqCst);
        self.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn update_loan(&self, loan: FootwearLoan) -> DomainResult<()> {
        if !self.loans.contains_key(&loan.id) {
            return Err(DomainError::NotFound {
                entity: "FootwearLoan",
                field: "id",
                value: loan.id.to_string(),
            });
        }
        self.loans.insert(loan.id, loan);
        Ok(())
    }
}

// ── WaitlistRepository ──────────────────────────────────────────

#[async_trait]
impl WaitlistRepository for InMemoryStorage {
    async fn find_entry(
        &self,
        schedule_id: i32,
        user_id: i32,
    ) -> DomainResult<Option<WaitingEntry>> {
        Ok(self
            .waitlist
            .iter()
            .find(|e| e.schedule_id == schedule_id && e.user_id == user_id)
            .map(|e| e.clone()))
    }

    async fn save(&self, entry: WaitingEntry) -> DomainResult<WaitingEntry> {
        // mirror the unique (schedule_id, user_id) index
        if self
            .waitlist
            .iter()
            .any(|e| e.schedule_id == entry.schedule_id && e.user_id == entry.user_id)
        {
            return Err(DomainError::Conflict(format!(
                "user {} already waiting for schedule {}",
                entry.user_id, entry.schedule_id
            )));
        }
        let mut entry = entry;
        entry.id = self.waiting_counter.fetch_add(1, Ordering::SeqCst);
        self.waitlist.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update(&self, entry: WaitingEntry) -> DomainResult<()> {
        if !self.waitlist.contains_key(&entry.id) {
            return Err(DomainError::NotFound {
                entity: "WaitingEntry",
                field: "id",
                value: entry.id.to_string(),
            });
        }
        self.waitlist.insert(entry.id, entry);
        Ok(())
    }

    async fn delete(&self, schedule_id: i32, user_id: i32) -> DomainResult<bool> {
        let id = self
            .waitlist
            .iter()
            .find(|e| e.schedule_id == schedule_id && e.user_id == user_id)
            .map(|e| e.id);
        match id {
            Some(id) => Ok(self.waitlist.remove(&id).is_some()),
            None => Ok(false),
        }
    }

    async fn list_waiting(&self, schedule_id: i32) -> DomainResult<Vec<WaitingEntry>> {
        let mut waiting: Vec<WaitingEntry> = self
            .waitlist
            .iter()
            .filter(|e| e.schedule_id == schedule_id && e.status == WaitingStatus::Waiting)
            .map(|e| e.clone())
            .collect();
        waiting.sort_by_key(|e| (e.created_at, e.id));
        Ok(waiting)
    }
}

// ── BookingWriter ───────────────────────────────────────────────

#[async_trait]
impl BookingWriter for InMemoryStorage {
    async fn reserve_seat(
        &self,
        schedule_id: i32,
        seat_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<ReserveOutcome> {
        let _guard = self.booking_lock.lock().await;

        let schedule = self.schedule_or_not_found(schedule_id)?;
        if !schedule.is_bookable(now) {
            return Ok(ReserveOutcome::rejected(RejectReason::ScheduleNotBookable));
        }

        if self.user_claim(schedule_id, user_id).is_some() {
            return Ok(ReserveOutcome::rejected(RejectReason::AlreadyBooked));
        }

        let claim = self
            .claims
            .iter()
            .find(|c| c.schedule_id == schedule_id && c.seat_id == seat_id)
            .map(|c| c.clone());
        let Some(mut claim) = claim else {
            return Ok(ReserveOutcome::rejected(RejectReason::SeatUnavailable));
        };
        let seat_active = self.seats.get(&seat_id).map(|s| s.is_active).unwrap_or(false);
        if !claim.is_available() || !seat_active {
            return Ok(ReserveOutcome::rejected(RejectReason::SeatUnavailable));
        }

        if self.held(schedule_id) >= schedule.max_capacity as u64 {
            return Ok(ReserveOutcome::rejected(RejectReason::ScheduleFull));
        }

        let Some(consumed) = self.consume_best(user_id, schedule.discipline_id, now)? else {
            return Ok(ReserveOutcome::rejected(RejectReason::NoEntitlement));
        };

        let reference = new_reference();
        claim.reserve(user_id, reference.clone(), consumed.kind, consumed.source_id, now)?;
        self.claims.insert(claim.id, claim);

        Ok(ReserveOutcome::Confirmed(BookingConfirmation {
            reference,
            schedule_id,
            user_id,
            resource: ClaimedResource::Seat { seat_id },
            consumed,
        }))
    }

    async fn reserve_footwear(
        &self,
        schedule_id: i32,
        size: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<ReserveOutcome> {
        let _guard = self.booking_lock.lock().await;

        let schedule = self.schedule_or_not_found(schedule_id)?;
        if !schedule.is_bookable(now) {
            return Ok(ReserveOutcome::rejected(RejectReason::ScheduleNotBookable));
        }

        if self.user_reservation(schedule_id, user_id).is_some() {
            return Ok(ReserveOutcome::rejected(RejectReason::AlreadyBooked));
        }

        let Some(footwear_id) = self.free_unit(&schedule, size) else {
            return Ok(ReserveOutcome::rejected(RejectReason::NoFootwearAvailable));
        };

        let Some(consumed) = self.consume_best(user_id, schedule.discipline_id, now)? else {
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
        reservation.id = self.reservation_counter.fetch_add(1, Ordering::SeqCst);
        self.reservations.insert(reservation.id, reservation);

        Ok(ReserveOutcome::Confirmed(BookingConfirmation {
            reference,
            schedule_id,
            user_id,
            resource: ClaimedResource::Footwear { footwear_id },
            consumed,
        }))
    }

    async fn cancel_seat_claim(
        &self,
        schedule_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<CancelOutcome> {
        let _guard = self.booking_lock.lock().await;

        let schedule = self.schedule_or_not_found(schedule_id)?;
        if schedule.has_started(now) {
            return Ok(CancelOutcome::rejected(RejectReason::TooLateToCancel));
        }

        let claim = self.user_claim(schedule_id, user_id);
        let reservation = self.user_reservation(schedule_id, user_id);

        let mut cancelled_reference: Option<String> = None;
        let mut refunded: Option<ConsumedEntitlement> = None;

        if let Some(mut claim) = claim {
            if claim.status != SeatClaimStatus::Reserved {
                return Ok(CancelOutcome::rejected(RejectReason::AlreadyCheckedIn));
            }
            cancelled_reference = claim.reference.clone();
            let consumed = claim.release(now)?;
            self.claims.insert(claim.id, claim);
            if let Some((kind, source_id)) = consumed {
                refunded = Some(self.refund_credit(kind, source_id)?);
            }
        }

        if let Some(mut reservation) = reservation {
            if reservation.status == FootwearReservationStatus::Pending {
                if cancelled_reference.is_none() {
                    cancelled_reference = Some(reservation.reference.clone());
                }
                reservation.cancel()?;
                let consumed = (reservation.consumed_kind, reservation.consumed_source_id);
                self.reservations.insert(reservation.id, reservation);
                if let (Some(kind), Some(source_id)) = consumed {
                    let credit = self.refund_credit(kind, source_id)?;
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

    async fn check_in(
        &self,
        schedule_id: i32,
        user_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<CheckInOutcome> {
        let _guard = self.booking_lock.lock().await;

        let claim = self.user_claim(schedule_id, user_id);
        let reservation = self.user_reservation(schedule_id, user_id);

        if claim.is_none() && reservation.is_none() {
            return Ok(CheckInOutcome::rejected(RejectReason::ClaimNotFound));
        }

        let mut progressed = false;
        let mut loan_id = None;

        if let Some(mut claim) = claim {
            if claim.status == SeatClaimStatus::Reserved {
                claim.occupy(now)?;
                self.claims.insert(claim.id, claim);
                progressed = true;
            }
        }

        if let Some(mut reservation) = reservation {
            if reservation.status == FootwearReservationStatus::Pending {
                reservation.confirm()?;
                let mut loan =
                    FootwearLoan::new(0, reservation.footwear_id, user_id, Some(reservation.id), now);
                self.reservations.insert(reservation.id, reservation);
                loan.id = self.loan_counter.fetch_add(1, Ordering::SeqCst);
                loan_id = Some(loan.id);
                self.loans.insert(loan.id, loan);
                progressed = true;
            }
        }

        if !progressed {
            return Ok(CheckInOutcome::rejected(RejectReason::AlreadyCheckedIn));
        }

        Ok(CheckInOutcome::CheckedIn { loan_id })
    }

    async fn complete_schedule(&self, schedule_id: i32, now: DateTime<Utc>) -> DomainResult<u32> {
        let _guard = self.booking_lock.lock().await;

        let mut schedule = self.schedule_or_not_found(schedule_id)?;
        schedule.complete();
        self.schedules.insert(schedule.id, schedule);

        let occupied: Vec<i32> = self
            .claims
            .iter()
            .filter(|c| c.schedule_id == schedule_id && c.status == SeatClaimStatus::Occupied)
            .map(|c| c.id)
            .collect();

        let mut completed = 0;
        for id in occupied {
            if let Some(mut claim) = self.claims.get_mut(&id) {
                claim.complete(now)?;
                completed += 1;
            }
        }

        Ok(completed)
    }
}

// ── RepositoryProvider ──────────────────────────────────────────

impl RepositoryProvider for InMemoryStorage {
    fn schedules(&self) -> &dyn ScheduleRepository {
        self
    }

    fn seats(&self) -> &dyn SeatRepository {
        self
    }

    fn entitlements(&self) -> &dyn EntitlementRepository {
        self
    }

    fn footwear(&self) -> &dyn FootwearRepository {
        self
    }

    fn waitlist(&self) -> &dyn WaitlistRepository {
        self
    }

    fn booking(&self) -> &dyn BookingWriter {
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use chrono::Duration;

    fn upcoming_schedule(id: i32, capacity: u32) -> ClassSchedule {
        let start = Utc::now() + Duration::hours(2);
        ClassSchedule::new(id, 10, 1, start, start + Duration::minutes(50), capacity)
    }

    async fn seeded_storage() -> Arc<InMemoryStorage> {
        let storage = Arc::new(InMemoryStorage::new());
        ScheduleRepository::save(&*storage, upcoming_schedule(100, 5))
            .await
            .unwrap();
        storage.save_seat(Seat::new(1, 1, 1, 1)).await.unwrap();
        storage
            .save_claim(ScheduleSeat::available(0, 100, 1))
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn assigns_claim_ids() {
        let storage = InMemoryStorage::new();
        let first = storage
            .save_claim(ScheduleSeat::available(0, 100, 1))
            .await
            .unwrap();
        let second = storage
            .save_claim(ScheduleSeat::available(0, 100, 2))
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn duplicate_waitlist_insert_conflicts() {
        let storage = InMemoryStorage::new();
        WaitlistRepository::save(&storage, WaitingEntry::new(0, 100, 42))
            .await
            .unwrap();
        let err = WaitlistRepository::save(&storage, WaitingEntry::new(0, 100, 42))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn racing_reservations_confirm_exactly_once() {
        let storage = seeded_storage().await;
        for user_id in 1..=8 {
            storage
                .save_package(UserPackage::new(
                    user_id,
                    user_id,
                    10,
                    3,
                    Utc::now() + Duration::days(30),
                ))
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for user_id in 1..=8 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage.reserve_seat(100, 1, user_id, Utc::now()).await
            }));
        }

        let mut confirmed = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if outcome.is_confirmed() {
                confirmed += 1;
            }
        }
        assert_eq!(confirmed, 1);
        assert_eq!(storage.held(100), 1);

        // exactly one credit was spent across all contenders
        let mut spent = 0;
        for user_id in 1..=8 {
            let pkg = storage.find_package(user_id).await.unwrap().unwrap();
            assert_eq!(pkg.used_classes + pkg.remaining_classes, pkg.total_classes);
            spent += pkg.used_classes;
        }
        assert_eq!(spent, 1);
    }

    #[tokio::test]
    async fn rejected_booking_spends_nothing() {
        let storage = seeded_storage().await;
        storage
            .save_package(UserPackage::new(1, 42, 10, 3, Utc::now() + Duration::days(30)))
            .await
            .unwrap();

        // seat 2 has no claim row
        let outcome = storage.reserve_seat(100, 2, 42, Utc::now()).await.unwrap();
        assert_eq!(
            outcome.reject_reason(),
            Some(RejectReason::SeatUnavailable)
        );

        let pkg = storage.find_package(1).await.unwrap().unwrap();
        assert_eq!(pkg.used_classes, 0);
    }
}
