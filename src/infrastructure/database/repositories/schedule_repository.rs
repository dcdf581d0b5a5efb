//! SeaORM implementation of ScheduleRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::domain::schedule::{ClassSchedule, ScheduleRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::class_schedule;
use crate::shared::types::{PaginatedResult, PaginationParams};

use super::db_err;
use super::mappers::{schedule_to_active, schedule_to_domain};

pub struct SeaOrmScheduleRepository {
    db: DatabaseConnection,
}

impl SeaOrmScheduleRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScheduleRepository for SeaOrmScheduleRepository {
    async fn save(&self, schedule: ClassSchedule) -> DomainResult<()> {
        debug!("Saving schedule: {}", schedule.id);

        schedule_to_active(&schedule)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<ClassSchedule>> {
        let model = class_schedule::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(schedule_to_domain))
    }

    async fn update(&self, schedule: ClassSchedule) -> DomainResult<()> {
        debug!("Updating schedule: {}", schedule.id);

        let existing = class_schedule::Entity::find_by_id(schedule.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "ClassSchedule",
                field: "id",
                value: schedule.id.to_string(),
            });
        }

        schedule_to_active(&schedule)
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_upcoming_for_discipline(
        &self,
        discipline_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<ClassSchedule>> {
        let models = class_schedule::Entity::find()
            .filter(class_schedule::Column::DisciplineId.eq(discipline_id))
            .filter(class_schedule::Column::Status.eq("Scheduled"))
            .filter(class_schedule::Column::StartsAt.gt(now))
            .order_by_asc(class_schedule::Column::StartsAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(schedule_to_domain).collect())
    }

    async fn list(&self, params: PaginationParams) -> DomainResult<PaginatedResult<ClassSchedule>> {
        let paginator = class_schedule::Entity::find()
            .order_by_desc(class_schedule::Column::Id)
            .paginate(&self.db, params.limit);

        let total = paginator.num_items().await.map_err(db_err)?;
        let models = paginator
            .fetch_page(params.page.saturating_sub(1))
            .await
            .map_err(db_err)?;

        Ok(PaginatedResult::new(
            models.into_iter().map(schedule_to_domain).collect(),
            total,
            params.page,
            params.limit,
        ))
    }
}
