//! SeaORM implementation of FootwearRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder,
};

use crate::domain::footwear::{Footwear, FootwearLoan, FootwearRepository, FootwearReservation};
use crate::domain::schedule::TimeWindow;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{footwear, footwear_loan, footwear_reservation};

use super::mappers::{
    loan_to_active, loan_to_domain, reservation_to_active, reservation_to_domain, unit_to_active,
    unit_to_domain,
};
use super::{db_err, LIVE_RESERVATION_STATUSES};

pub struct SeaOrmFootwearRepository {
    db: DatabaseConnection,
}

impl SeaOrmFootwearRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FootwearRepository for SeaOrmFootwearRepository {
    async fn save_unit(&self, unit: Footwear) -> DomainResult<()> {
        debug!("Saving footwear unit: {}", unit.id);

        unit_to_active(&unit).insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_unit(&self, id: i32) -> DomainResult<Option<Footwear>> {
        let model = footwear::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(unit_to_domain))
    }

    async fn list_units_by_size(&self, size: i32) -> DomainResult<Vec<Footwear>> {
        let models = footwear::Entity::find()
            .filter(footwear::Column::Size.eq(size))
            .filter(footwear::Column::IsActive.eq(true))
            .order_by_asc(footwear::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(unit_to_domain).collect())
    }

    async fn live_reservations_for_schedule(
        &self,
        schedule_id: i32,
    ) -> DomainResult<Vec<FootwearReservation>> {
        let models = footwear_reservation::Entity::find()
            .filter(footwear_reservation::Column::ScheduleId.eq(schedule_id))
            .filter(footwear_reservation::Column::Status.is_in(LIVE_RESERVATION_STATUSES))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(reservation_to_domain).collect())
    }

    async fn find_live_reservation_for_user(
        &self,
        schedule_id: i32,
        user_id: i32,
    ) -> DomainResult<Option<FootwearReservation>> {
        let model = footwear_reservation::Entity::find()
            .filter(footwear_reservation::Column::ScheduleId.eq(schedule_id))
            .filter(footwear_reservation::Column::UserId.eq(user_id))
            .filter(footwear_reservation::Column::Status.is_in(LIVE_RESERVATION_STATUSES))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(reservation_to_domain))
    }

    async fn save_reservation(
        &self,
        reservation: FootwearReservation,
    ) -> DomainResult<FootwearReservation> {
        let mut active = reservation_to_active(&reservation);
        active.id = NotSet;
        let model = active.insert(&self.db).await.map_err(db_err)?;
        Ok(reservation_to_domain(model))
    }

    async fn update_reservation(&self, reservation: FootwearReservation) -> DomainResult<()> {
        debug!("Updating footwear reservation: {}", reservation.id);

        let existing = footwear_reservation::Entity::find_by_id(reservation.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "FootwearReservation",
                field: "id",
                value: reservation.id.to_string(),
            });
        }

        reservation_to_active(&reservation)
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_overdue_reservations(
        &self,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<FootwearReservation>> {
        let models = footwear_reservation::Entity::find()
            .filter(footwear_reservation::Column::Status.is_in(LIVE_RESERVATION_STATUSES))
            .filter(footwear_reservation::Column::ExpiresAt.lte(now))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(reservation_to_domain).collect())
    }

    async fn loans_overlapping(&self, window: TimeWindow) -> DomainResult<Vec<FootwearLoan>> {
        // a loan intersects the window when it starts before the window
        // ends and is either still open or returned after the window start
        let models = footwear_loan::Entity::find()
            .filter(footwear_loan::Column::LoanDate.lt(window.end))
            .filter(
                Condition::any()
                    .add(footwear_loan::Column::ReturnDate.is_null())
                    .add(footwear_loan::Column::ReturnDate.gt(window.start)),
            )
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(loan_to_domain).collect())
    }

    async fn find_loan(&self, id: i32) -> DomainResult<Option<FootwearLoan>> {
        let model = footwear_loan::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(loan_to_domain))
    }

    async fn save_loan(&self, loan: FootwearLoan) -> DomainResult<FootwearLoan> {
        debug!("Opening loan for footwear unit: {}", loan.footwear_id);

        let mut active = loan_to_active(&loan);
        active.id = NotSet;
        let model = active.insert(&self.db).await.map_err(db_err)?;
        Ok(loan_to_domain(model))
    }

    async fn update_loan(&self, loan: FootwearLoan) -> DomainResult<()> {
        debug!("Updating loan: {}", loan.id);

        let existing = footwear_loan::Entity::find_by_id(loan.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "FootwearLoan",
                field: "id",
                value: loan.id.to_string(),
            });
        }

        loan_to_active(&loan).update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}
