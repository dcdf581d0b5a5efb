//! SeaORM implementation of SeatRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::domain::seat::{ScheduleSeat, Seat, SeatRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{schedule_seat, seat};

use super::mappers::{claim_to_active, claim_to_domain, seat_to_active, seat_to_domain};
use super::{db_err, HELD_STATUSES};

pub struct SeaOrmSeatRepository {
    db: DatabaseConnection,
}

impl SeaOrmSeatRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SeatRepository for SeaOrmSeatRepository {
    async fn save_seat(&self, seat: Seat) -> DomainResult<()> {
        debug!("Saving seat: {}", seat.id);

        seat_to_active(&seat).insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_seat(&self, id: i32) -> DomainResult<Option<Seat>> {
        let model = seat::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(seat_to_domain))
    }

    async fn list_studio_seats(&self, studio_id: i32) -> DomainResult<Vec<Seat>> {
        let models = seat::Entity::find()
            .filter(seat::Column::StudioId.eq(studio_id))
            .filter(seat::Column::IsActive.eq(true))
            .order_by_asc(seat::Column::SeatRow)
            .order_by_asc(seat::Column::SeatColumn)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(seat_to_domain).collect())
    }

    async fn find_claim(
        &self,
        schedule_id: i32,
        seat_id: i32,
    ) -> DomainResult<Option<ScheduleSeat>> {
        let model = schedule_seat::Entity::find()
            .filter(schedule_seat::Column::ScheduleId.eq(schedule_id))
            .filter(schedule_seat::Column::SeatId.eq(seat_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(claim_to_domain))
    }

    async fn find_user_claim(
        &self,
        schedule_id: i32,
        user_id: i32,
    ) -> DomainResult<Option<ScheduleSeat>> {
        let model = schedule_seat::Entity::find()
            .filter(schedule_seat::Column::ScheduleId.eq(schedule_id))
            .filter(schedule_seat::Column::UserId.eq(user_id))
            .filter(schedule_seat::Column::Status.is_in(HELD_STATUSES))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(claim_to_domain))
    }

    async fn list_claims(&self, schedule_id: i32) -> DomainResult<Vec<ScheduleSeat>> {
        let models = schedule_seat::Entity::find()
            .filter(schedule_seat::Column::ScheduleId.eq(schedule_id))
            .order_by_asc(schedule_seat::Column::SeatId)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(claim_to_domain).collect())
    }

    async fn held_count(&self, schedule_id: i32) -> DomainResult<u64> {
        schedule_seat::Entity::find()
            .filter(schedule_seat::Column::ScheduleId.eq(schedule_id))
            .filter(schedule_seat::Column::Status.is_in(HELD_STATUSES))
            .count(&self.db)
            .await
            .map_err(db_err)
    }

    async fn save_claim(&self, claim: ScheduleSeat) -> DomainResult<ScheduleSeat> {
        let mut active = claim_to_active(&claim);
        active.id = NotSet;
        let model = active.insert(&self.db).await.map_err(db_err)?;
        Ok(claim_to_domain(model))
    }

    async fn update_claim(&self, claim: ScheduleSeat) -> DomainResult<()> {
        debug!("Updating seat claim: {}", claim.id);

        let existing = schedule_seat::Entity::find_by_id(claim.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "ScheduleSeat",
                field: "id",
                value: claim.id.to_string(),
            });
        }

        claim_to_active(&claim)
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
