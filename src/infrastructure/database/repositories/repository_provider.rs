//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingWriter;
use crate::domain::entitlement::EntitlementRepository;
use crate::domain::footwear::FootwearRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::schedule::ScheduleRepository;
use crate::domain::seat::SeatRepository;
use crate::domain::waitlist::WaitlistRepository;

use super::booking_writer::SeaOrmBookingWriter;
use super::entitlement_repository::SeaOrmEntitlementRepository;
use super::footwear_repository::SeaOrmFootwearRepository;
use super::schedule_repository::SeaOrmScheduleRepository;
use super::seat_repository::SeaOrmSeatRepository;
use super::waitlist_repository::SeaOrmWaitlistRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository
/// accessors plus the transactional booking writer.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let schedule = repos.schedules().find_by_id(100).await?;
/// let outcome = repos.booking().reserve_seat(100, 7, 42, Utc::now()).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    schedules: SeaOrmScheduleRepository,
    seats: SeaOrmSeatRepository,
    entitlements: SeaOrmEntitlementRepository,
    footwear: SeaOrmFootwearRepository,
    waitlist: SeaOrmWaitlistRepository,
    booking: SeaOrmBookingWriter,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            schedules: SeaOrmScheduleRepository::new(db.clone()),
            seats: SeaOrmSeatRepository::new(db.clone()),
            entitlements: SeaOrmEntitlementRepository::new(db.clone()),
            footwear: SeaOrmFootwearRepository::new(db.clone()),
            waitlist: SeaOrmWaitlistRepository::new(db.clone()),
            booking: SeaOrmBookingWriter::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn schedules(&self) -> &dyn ScheduleRepository {
        &self.schedules
    }

    fn seats(&self) -> &dyn SeatRepository {
        &self.seats
    }

    fn entitlements(&self) -> &dyn EntitlementRepository {
        &self.entitlements
    }

    fn footwear(&self) -> &dyn FootwearRepository {
        &self.footwear
    }

    fn waitlist(&self) -> &dyn WaitlistRepository {
        &self.waitlist
    }

    fn booking(&self) -> &dyn BookingWriter {
        &self.booking
    }
}
