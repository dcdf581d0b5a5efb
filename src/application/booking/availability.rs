//! Availability checks
//!
//! Read-only queries that compute free seats and free footwear for a
//! schedule. No side effects; the transactional writer re-checks
//! everything before committing a claim.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use crate::domain::{
    DomainError, DomainResult, Footwear, RepositoryProvider, ScheduleSeat, SeatClaimStatus,
};

/// Free-seat report for one schedule
#[derive(Debug)]
pub struct SeatAvailability {
    pub schedule_id: i32,
    pub capacity: u32,
    /// Claims counting against capacity (Reserved/Occupied/Completed)
    pub held: u32,
    /// Claim rows open for booking
    pub free: Vec<ScheduleSeat>,
}

impl SeatAvailability {
    pub fn has_capacity(&self) -> bool {
        self.held < self.capacity && !self.free.is_empty()
    }
}

/// Free-footwear report for one schedule and size
#[derive(Debug)]
pub struct FootwearAvailability {
    pub schedule_id: i32,
    pub size: i32,
    pub free: Vec<Footwear>,
}

/// Service computing resource availability
pub struct AvailabilityService {
    repos: Arc<dyn RepositoryProvider>,
}

impl AvailabilityService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Free seats for a schedule: Available claim rows whose seat is
    /// still active, plus the held count against capacity.
    pub async fn seat_availability(&self, schedule_id: i32) -> DomainResult<SeatAvailability> {
        let schedule = self
            .repos
            .schedules()
            .find_by_id(schedule_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "ClassSchedule",
                field: "id",
                value: schedule_id.to_string(),
            })?;

        let claims = self.repos.seats().list_claims(schedule_id).await?;
        let active_seats: HashSet<i32> = self
            .repos
            .seats()
            .list_studio_seats(schedule.studio_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let held = claims.iter().filter(|c| c.status.is_held()).count() as u32;
        let free = claims
            .into_iter()
            .filter(|c| c.status == SeatClaimStatus::Available && active_seats.contains(&c.seat_id))
            .collect();

        Ok(SeatAvailability {
            schedule_id,
            capacity: schedule.max_capacity,
            held,
            free,
        })
    }

    /// Free footwear units of a size for a schedule: active units minus
    /// those with a live reservation for the schedule and those whose
    /// loan interval overlaps the schedule window (open loans included).
    pub async fn footwear_availability(
        &self,
        schedule_id: i32,
        size: i32,
    ) -> DomainResult<FootwearAvailability> {
        let schedule = self
            .repos
            .schedules()
            .find_by_id(schedule_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "ClassSchedule",
                field: "id",
                value: schedule_id.to_string(),
            })?;

        let window = schedule.window();

        let reserved: HashSet<i32> = self
            .repos
            .footwear()
            .live_reservations_for_schedule(schedule_id)
            .await?
            .into_iter()
            .map(|r| r.footwear_id)
            .collect();

        let loaned: HashSet<i32> = self
            .repos
            .footwear()
            .loans_overlapping(window)
            .await?
            .into_iter()
            .map(|l| l.footwear_id)
            .collect();

        let free = self
            .repos
            .footwear()
            .list_units_by_size(size)
            .await?
            .into_iter()
            .filter(|u| !reserved.contains(&u.id) && !loaned.contains(&u.id))
            .collect();

        Ok(FootwearAvailability {
            schedule_id,
            size,
            free,
        })
    }

    /// Materialize Available claim rows for every active seat of the
    /// schedule's studio, up to max capacity. Existing rows are kept.
    /// Returns the number of rows created.
    pub async fn seed_seat_map(&self, schedule_id: i32) -> DomainResult<u32> {
        let schedule = self
            .repos
            .schedules()
            .find_by_id(schedule_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "ClassSchedule",
                field: "id",
                value: schedule_id.to_string(),
            })?;

        let existing: HashSet<i32> = self
            .repos
            .seats()
            .list_claims(schedule_id)
            .await?
            .into_iter()
            .map(|c| c.seat_id)
            .collect();

        let seats = self
            .repos
            .seats()
            .list_studio_seats(schedule.studio_id)
            .await?;

        let mut total = existing.len() as u32;
        let mut created = 0;
        for seat in seats {
            if total >= schedule.max_capacity {
                break;
            }
            if existing.contains(&seat.id) {
                continue;
            }
            self.repos
                .seats()
                .save_claim(ScheduleSeat::available(0, schedule_id, seat.id))
                .await?;
            total += 1;
            created += 1;
        }

        if created > 0 {
            info!(schedule_id, created, "Seat map seeded");
        }

        Ok(created)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryStorage;
    use chrono::{Duration, Utc};

    use crate::domain::{ClassSchedule, FootwearLoan, FootwearReservation, Seat};

    async fn setup() -> (Arc<dyn RepositoryProvider>, AvailabilityService) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        let service = AvailabilityService::new(repos.clone());
        (repos, service)
    }

    fn schedule(id: i32, capacity: u32) -> ClassSchedule {
        let start = Utc::now() + Duration::hours(2);
        ClassSchedule::new(id, 10, 1, start, start + Duration::minutes(50), capacity)
    }

    #[tokio::test]
    async fn seeding_respects_capacity() {
        let (repos, service) = setup().await;
        repos.schedules().save(schedule(100, 2)).await.unwrap();
        for seat_id in 1..=4 {
            repos
                .seats()
                .save_seat(Seat::new(seat_id, 1, 1, seat_id))
                .await
                .unwrap();
        }

        let created = service.seed_seat_map(100).await.unwrap();
        assert_eq!(created, 2);

        // re-seeding is a no-op
        assert_eq!(service.seed_seat_map(100).await.unwrap(), 0);

        let avail = service.seat_availability(100).await.unwrap();
        assert_eq!(avail.capacity, 2);
        assert_eq!(avail.held, 0);
        assert_eq!(avail.free.len(), 2);
        assert!(avail.has_capacity());
    }

    #[tokio::test]
    async fn inactive_seats_are_not_offered() {
        let (repos, service) = setup().await;
        repos.schedules().save(schedule(100, 5)).await.unwrap();
        repos.seats().save_seat(Seat::new(1, 1, 1, 1)).await.unwrap();
        let mut inactive = Seat::new(2, 1, 1, 2);
        inactive.is_active = false;
        repos.seats().save_seat(inactive).await.unwrap();

        service.seed_seat_map(100).await.unwrap();
        let avail = service.seat_availability(100).await.unwrap();
        assert_eq!(avail.free.len(), 1);
        assert_eq!(avail.free[0].seat_id, 1);
    }

    #[tokio::test]
    async fn missing_schedule_is_not_found() {
        let (_repos, service) = setup().await;
        assert!(matches!(
            service.seat_availability(999).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn footwear_excludes_reserved_and_loaned_units() {
        let (repos, service) = setup().await;
        let sched = schedule(100, 5);
        let window_start = sched.starts_at;
        repos.schedules().save(sched).await.unwrap();

        for (id, code) in [(1, "FW-01"), (2, "FW-02"), (3, "FW-03")] {
            repos
                .footwear()
                .save_unit(Footwear::new(id, code, 40))
                .await
                .unwrap();
        }

        // unit 1 reserved for this schedule
        repos
            .footwear()
            .save_reservation(FootwearReservation::new(
                0,
                1,
                100,
                7,
                "REF-X",
                window_start,
            ))
            .await
            .unwrap();

        // unit 2 out on an open loan
        repos
            .footwear()
            .save_loan(FootwearLoan::new(0, 2, 8, None, Utc::now()))
            .await
            .unwrap();

        let avail = service.footwear_availability(100, 40).await.unwrap();
        let free_ids: Vec<i32> = avail.free.iter().map(|u| u.id).collect();
        assert_eq!(free_ids, vec![3]);
    }

    #[tokio::test]
    async fn returned_loan_frees_the_unit() {
        let (repos, service) = setup().await;
        repos.schedules().save(schedule(100, 5)).await.unwrap();
        repos
            .footwear()
            .save_unit(Footwear::new(1, "FW-01", 40))
            .await
            .unwrap();

        let mut loan = FootwearLoan::new(0, 1, 8, None, Utc::now() - Duration::hours(3));
        loan.return_date = Some(Utc::now() - Duration::hours(2));
        repos.footwear().save_loan(loan).await.unwrap();

        let avail = service.footwear_availability(100, 40).await.unwrap();
        assert_eq!(avail.free.len(), 1);
    }

    #[tokio::test]
    async fn wrong_size_yields_nothing() {
        let (repos, service) = setup().await;
        repos.schedules().save(schedule(100, 5)).await.unwrap();
        repos
            .footwear()
            .save_unit(Footwear::new(1, "FW-01", 40))
            .await
            .unwrap();

        let avail = service.footwear_availability(100, 38).await.unwrap();
        assert!(avail.free.is_empty());
    }
}
