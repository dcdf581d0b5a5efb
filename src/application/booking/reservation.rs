//! Booking flows
//!
//! Validates the request, pre-checks the schedule, then delegates the
//! atomic claim-and-consume to the transactional booking writer. The
//! writer re-checks every precondition inside its transaction, so the
//! pre-checks here only exist to fail fast.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::domain::{
    CancelOutcome, CheckInOutcome, ClassSchedule, DomainError, DomainResult, RejectReason,
    RepositoryProvider, ReserveOutcome,
};

/// Request to claim a seat for a schedule
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReserveSeatCommand {
    #[validate(range(min = 1))]
    pub schedule_id: i32,
    #[validate(range(min = 1))]
    pub seat_id: i32,
    #[validate(range(min = 1))]
    pub user_id: i32,
}

/// Request to claim a footwear unit for a schedule
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReserveFootwearCommand {
    #[validate(range(min = 1))]
    pub schedule_id: i32,
    #[validate(range(min = 1))]
    pub user_id: i32,
    /// EU shoe size
    #[validate(range(min = 20, max = 50))]
    pub size: i32,
}

/// Request addressing a user's claim on a schedule
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ScheduleUserCommand {
    #[validate(range(min = 1))]
    pub schedule_id: i32,
    #[validate(range(min = 1))]
    pub user_id: i32,
}

/// Service for booking operations
pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
}

impl BookingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    async fn load_schedule(&self, schedule_id: i32) -> DomainResult<ClassSchedule> {
        self.repos
            .schedules()
            .find_by_id(schedule_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "ClassSchedule",
                field: "id",
                value: schedule_id.to_string(),
            })
    }

    /// Claim a seat and consume one class credit.
    pub async fn reserve_seat(&self, cmd: ReserveSeatCommand) -> DomainResult<ReserveOutcome> {
        cmd.validate()
            .map_err(|e| DomainError::Validation(e.to_string()))?;

        let now = Utc::now();
        let schedule = self.load_schedule(cmd.schedule_id).await?;
        if !schedule.is_bookable(now) {
            return Ok(ReserveOutcome::rejected(RejectReason::ScheduleNotBookable));
        }

        let outcome = self
            .repos
            .booking()
            .reserve_seat(cmd.schedule_id, cmd.seat_id, cmd.user_id, now)
            .await?;

        match &outcome {
            ReserveOutcome::Confirmed(c) => {
                info!(
                    schedule_id = cmd.schedule_id,
                    seat_id = cmd.seat_id,
                    user_id = cmd.user_id,
                    reference = %c.reference,
                    source = %c.consumed.kind,
                    "Seat reserved"
                );
            }
            ReserveOutcome::Rejected { reason } => {
                info!(
                    schedule_id = cmd.schedule_id,
                    seat_id = cmd.seat_id,
                    user_id = cmd.user_id,
                    reason = %reason,
                    "Seat reservation rejected"
                );
            }
        }

        Ok(outcome)
    }

    /// Claim a footwear unit of the requested size and consume one
    /// class credit.
    pub async fn reserve_footwear(
        &self,
        cmd: ReserveFootwearCommand,
    ) -> DomainResult<ReserveOutcome> {
        cmd.validate()
            .map_err(|e| DomainError::Validation(e.to_string()))?;

        let now = Utc::now();
        let schedule = self.load_schedule(cmd.schedule_id).await?;
        if !schedule.is_bookable(now) {
            return Ok(ReserveOutcome::rejected(RejectReason::ScheduleNotBookable));
        }

        let outcome = self
            .repos
            .booking()
            .reserve_footwear(cmd.schedule_id, cmd.size, cmd.user_id, now)
            .await?;

        match &outcome {
            ReserveOutcome::Confirmed(c) => {
                info!(
                    schedule_id = cmd.schedule_id,
                    user_id = cmd.user_id,
                    size = cmd.size,
                    reference = %c.reference,
                    "Footwear reserved"
                );
            }
            ReserveOutcome::Rejected { reason } => {
                info!(
                    schedule_id = cmd.schedule_id,
                    user_id = cmd.user_id,
                    size = cmd.size,
                    reason = %reason,
                    "Footwear reservation rejected"
                );
            }
        }

        Ok(outcome)
    }

    /// Release a reserved seat before the class starts and refund the
    /// consumed credit.
    pub async fn cancel(&self, cmd: ScheduleUserCommand) -> DomainResult<CancelOutcome> {
        cmd.validate()
            .map_err(|e| DomainError::Validation(e.to_string()))?;

        let now = Utc::now();
        // existence check up front so a bad id is a hard error
        self.load_schedule(cmd.schedule_id).await?;

        let outcome = self
            .repos
            .booking()
            .cancel_seat_claim(cmd.schedule_id, cmd.user_id, now)
            .await?;

        if let CancelOutcome::Cancelled { reference, .. } = &outcome {
            info!(
                schedule_id = cmd.schedule_id,
                user_id = cmd.user_id,
                reference = %reference,
                "Booking cancelled"
            );
        }

        Ok(outcome)
    }

    /// Check a user in: seat claim to Occupied, pending footwear
    /// reservation confirmed and its loan opened.
    pub async fn check_in(&self, cmd: ScheduleUserCommand) -> DomainResult<CheckInOutcome> {
        cmd.validate()
            .map_err(|e| DomainError::Validation(e.to_string()))?;

        let now = Utc::now();
        self.load_schedule(cmd.schedule_id).await?;

        let outcome = self
            .repos
            .booking()
            .check_in(cmd.schedule_id, cmd.user_id, now)
            .await?;

        if let CheckInOutcome::CheckedIn { loan_id } = &outcome {
            info!(
                schedule_id = cmd.schedule_id,
                user_id = cmd.user_id,
                ?loan_id,
                "User checked in"
            );
        }

        Ok(outcome)
    }

    /// Close out a finished class: schedule to Completed, occupied
    /// claims to Completed. Returns the number of completed claims.
    pub async fn complete_schedule(&self, schedule_id: i32) -> DomainResult<u32> {
        let now = Utc::now();
        self.load_schedule(schedule_id).await?;

        let completed = self
            .repos
            .booking()
            .complete_schedule(schedule_id, now)
            .await?;

        info!(schedule_id, completed, "Schedule completed");
        Ok(completed)
    }

    /// Record the return of a loaned footwear unit.
    pub async fn return_footwear(&self, loan_id: i32) -> DomainResult<()> {
        let mut loan = self
            .repos
            .footwear()
            .find_loan(loan_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "FootwearLoan",
                field: "id",
                value: loan_id.to_string(),
            })?;

        loan.close(Utc::now())?;
        self.repos.footwear().update_loan(loan).await?;

        info!(loan_id, "Footwear returned");
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::booking::AvailabilityService;
    use crate::domain::entitlement::{EntitlementKind, UserMembership, UserPackage};
    use crate::domain::{ClassSchedule, Footwear, ScheduleStatus, Seat, SeatClaimStatus};
    use crate::infrastructure::storage::InMemoryStorage;
    use chrono::Duration;

    struct Fixture {
        repos: Arc<dyn RepositoryProvider>,
        service: BookingService,
    }

    async fn fixture() -> Fixture {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        let service = BookingService::new(repos.clone());
        Fixture { repos, service }
    }

    fn upcoming_schedule(id: i32, capacity: u32) -> ClassSchedule {
        let start = Utc::now() + Duration::hours(2);
        ClassSchedule::new(id, 10, 1, start, start + Duration::minutes(50), capacity)
    }

    fn package(id: i32, user_id: i32, remaining: u32) -> UserPackage {
        UserPackage::new(id, user_id, 10, remaining, Utc::now() + Duration::days(30))
    }

    fn membership(id: i32, user_id: i32, free_classes: u32) -> UserMembership {
        UserMembership::new(
            id,
            user_id,
            10,
            free_classes,
            Utc::now() - Duration::days(1),
            Utc::now() + Duration::days(29),
        )
    }

    async fn seed_class(f: &Fixture, schedule_id: i32, capacity: u32, seats: i32) {
        f.repos
            .schedules()
            .save(upcoming_schedule(schedule_id, capacity))
            .await
            .unwrap();
        for seat_id in 1..=seats {
            f.repos
                .seats()
                .save_seat(Seat::new(seat_id, 1, 1, seat_id))
                .await
                .unwrap();
        }
        AvailabilityService::new(f.repos.clone())
            .seed_seat_map(schedule_id)
            .await
            .unwrap();
    }

    fn seat_cmd(schedule_id: i32, seat_id: i32, user_id: i32) -> ReserveSeatCommand {
        ReserveSeatCommand {
            schedule_id,
            seat_id,
            user_id,
        }
    }

    #[tokio::test]
    async fn reserve_consumes_one_credit_and_holds_seat() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();

        let outcome = f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        let confirmation = outcome.confirmation().expect("confirmed");
        assert_eq!(confirmation.consumed.kind, EntitlementKind::Package);
        assert_eq!(confirmation.consumed.remaining_after, 2);

        let pkg = f
            .repos
            .entitlements()
            .find_package(1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pkg.used_classes, 1);
        assert_eq!(pkg.remaining_classes, 2);
        assert_eq!(pkg.used_classes + pkg.remaining_classes, pkg.total_classes);

        let claim = f
            .repos
            .seats()
            .find_claim(100, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claim.status, SeatClaimStatus::Reserved);
        assert_eq!(claim.user_id, Some(42));
    }

    #[tokio::test]
    async fn membership_is_consumed_before_package() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();
        f.repos
            .entitlements()
            .save_membership(membership(2, 42, 2))
            .await
            .unwrap();

        let outcome = f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        let confirmation = outcome.confirmation().unwrap();
        assert_eq!(confirmation.consumed.kind, EntitlementKind::Membership);

        let m = f
            .repos
            .entitlements()
            .find_membership(2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.used_free_classes, 1);
        let p = f
            .repos
            .entitlements()
            .find_package(1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.used_classes, 0);
    }

    #[tokio::test]
    async fn taken_seat_is_rejected_without_consuming() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();
        f.repos
            .entitlements()
            .save_package(package(2, 43, 3))
            .await
            .unwrap();

        f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        let outcome = f.service.reserve_seat(seat_cmd(100, 1, 43)).await.unwrap();
        assert_eq!(
            outcome.reject_reason(),
            Some(RejectReason::SeatUnavailable)
        );

        let p = f
            .repos
            .entitlements()
            .find_package(2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.used_classes, 0);
    }

    #[tokio::test]
    async fn second_booking_by_same_user_is_rejected() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();

        f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        let outcome = f.service.reserve_seat(seat_cmd(100, 2, 42)).await.unwrap();
        assert_eq!(outcome.reject_reason(), Some(RejectReason::AlreadyBooked));
    }

    #[tokio::test]
    async fn no_entitlement_is_rejected() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;

        let outcome = f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        assert_eq!(outcome.reject_reason(), Some(RejectReason::NoEntitlement));
    }

    #[tokio::test]
    async fn full_schedule_is_rejected() {
        let f = fixture().await;
        // capacity 1, two seats seeded would exceed it; seeding caps at 1
        seed_class(&f, 100, 1, 2).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();
        f.repos
            .entitlements()
            .save_package(package(2, 43, 3))
            .await
            .unwrap();

        f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        let outcome = f.service.reserve_seat(seat_cmd(100, 2, 43)).await.unwrap();
        // claim row for seat 2 was never seeded, so the seat is unavailable
        assert!(matches!(
            outcome.reject_reason(),
            Some(RejectReason::SeatUnavailable | RejectReason::ScheduleFull)
        ));
    }

    #[tokio::test]
    async fn cancelled_schedule_is_not_bookable() {
        let f = fixture().await;
        let mut schedule = upcoming_schedule(100, 5);
        schedule.status = ScheduleStatus::Cancelled;
        f.repos.schedules().save(schedule).await.unwrap();

        let outcome = f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        assert_eq!(
            outcome.reject_reason(),
            Some(RejectReason::ScheduleNotBookable)
        );
    }

    #[tokio::test]
    async fn unknown_schedule_is_a_hard_error() {
        let f = fixture().await;
        let err = f
            .service
            .reserve_seat(seat_cmd(999, 1, 42))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn invalid_command_is_a_validation_error() {
        let f = fixture().await;
        let err = f
            .service
            .reserve_seat(seat_cmd(0, 1, 42))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn cancel_refunds_the_credit_and_frees_the_seat() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();

        f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        let outcome = f
            .service
            .cancel(ScheduleUserCommand {
                schedule_id: 100,
                user_id: 42,
            })
            .await
            .unwrap();
        assert!(outcome.is_cancelled());

        let pkg = f
            .repos
            .entitlements()
            .find_package(1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pkg.used_classes, 0);
        assert_eq!(pkg.remaining_classes, 3);

        let claim = f
            .repos
            .seats()
            .find_claim(100, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claim.status, SeatClaimStatus::Available);
        assert!(claim.user_id.is_none());
    }

    #[tokio::test]
    async fn cancel_without_claim_is_rejected() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;

        let outcome = f
            .service
            .cancel(ScheduleUserCommand {
                schedule_id: 100,
                user_id: 42,
            })
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            CancelOutcome::Rejected {
                reason: RejectReason::ClaimNotFound
            }
        ));
    }

    #[tokio::test]
    async fn check_in_then_complete() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();

        f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        let outcome = f
            .service
            .check_in(ScheduleUserCommand {
                schedule_id: 100,
                user_id: 42,
            })
            .await
            .unwrap();
        assert!(outcome.is_checked_in());

        let completed = f.service.complete_schedule(100).await.unwrap();
        assert_eq!(completed, 1);

        let claim = f
            .repos
            .seats()
            .find_claim(100, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claim.status, SeatClaimStatus::Completed);

        let schedule = f
            .repos
            .schedules()
            .find_by_id(100)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(schedule.status, ScheduleStatus::Completed);
    }

    #[tokio::test]
    async fn double_check_in_is_rejected() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();

        f.service.reserve_seat(seat_cmd(100, 1, 42)).await.unwrap();
        let cmd = ScheduleUserCommand {
            schedule_id: 100,
            user_id: 42,
        };
        f.service.check_in(cmd.clone()).await.unwrap();
        let outcome = f.service.check_in(cmd).await.unwrap();
        assert!(matches!(
            outcome,
            CheckInOutcome::Rejected {
                reason: RejectReason::AlreadyCheckedIn
            }
        ));
    }

    #[tokio::test]
    async fn reserve_footwear_consumes_credit_and_opens_loan_on_check_in() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();
        f.repos
            .footwear()
            .save_unit(Footwear::new(1, "FW-01", 40))
            .await
            .unwrap();

        let outcome = f
            .service
            .reserve_footwear(ReserveFootwearCommand {
                schedule_id: 100,
                user_id: 42,
                size: 40,
            })
            .await
            .unwrap();
        assert!(outcome.is_confirmed());

        let pkg = f
            .repos
            .entitlements()
            .find_package(1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pkg.remaining_classes, 2);

        // check-in confirms the reservation and opens the loan
        let check_in = f
            .service
            .check_in(ScheduleUserCommand {
                schedule_id: 100,
                user_id: 42,
            })
            .await
            .unwrap();
        let CheckInOutcome::CheckedIn { loan_id } = check_in else {
            panic!("expected check-in");
        };
        let loan_id = loan_id.expect("loan opened");

        let loan = f
            .repos
            .footwear()
            .find_loan(loan_id)
            .await
            .unwrap()
            .unwrap();
        assert!(loan.is_open());
        assert_eq!(loan.footwear_id, 1);

        // and the return closes it
        f.service.return_footwear(loan_id).await.unwrap();
        let loan = f
            .repos
            .footwear()
            .find_loan(loan_id)
            .await
            .unwrap()
            .unwrap();
        assert!(!loan.is_open());
    }

    #[tokio::test]
    async fn footwear_size_without_units_is_rejected() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;
        f.repos
            .entitlements()
            .save_package(package(1, 42, 3))
            .await
            .unwrap();

        let outcome = f
            .service
            .reserve_footwear(ReserveFootwearCommand {
                schedule_id: 100,
                user_id: 42,
                size: 40,
            })
            .await
            .unwrap();
        assert_eq!(
            outcome.reject_reason(),
            Some(RejectReason::NoFootwearAvailable)
        );
    }

    #[tokio::test]
    async fn held_seats_never_exceed_capacity() {
        let f = fixture().await;
        seed_class(&f, 100, 3, 5).await;
        for user_id in 1..=5 {
            f.repos
                .entitlements()
                .save_package(package(user_id, user_id, 3))
                .await
                .unwrap();
        }

        let mut confirmed = 0;
        for (seat_id, user_id) in (1..=5).zip(1..=5) {
            let outcome = f
                .service
                .reserve_seat(seat_cmd(100, seat_id, user_id))
                .await
                .unwrap();
            if outcome.is_confirmed() {
                confirmed += 1;
            }
        }
        assert_eq!(confirmed, 3);
        assert_eq!(f.repos.seats().held_count(100).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn check_in_without_claim_is_rejected() {
        let f = fixture().await;
        seed_class(&f, 100, 5, 5).await;

        let outcome = f
            .service
            .check_in(ScheduleUserCommand {
                schedule_id: 100,
                user_id: 42,
            })
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            CheckInOutcome::Rejected {
                reason: RejectReason::ClaimNotFound
            }
        ));
    }
}
