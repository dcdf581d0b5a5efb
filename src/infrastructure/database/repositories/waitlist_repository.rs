//! SeaORM implementation of WaitlistRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, QueryOrder,
};

use crate::domain::waitlist::{WaitingEntry, WaitlistRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::waiting_class;

use super::db_err;
use super::mappers::{waiting_to_active, waiting_to_domain};

pub struct SeaOrmWaitlistRepository {
    db: DatabaseConnection,
}

impl SeaOrmWaitlistRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WaitlistRepository for SeaOrmWaitlistRepository {
    async fn find_entry(
        &self,
        schedule_id: i32,
        user_id: i32,
    ) -> DomainResult<Option<WaitingEntry>> {
        let model = waiting_class::Entity::find()
            .filter(waiting_class::Column::ScheduleId.eq(schedule_id))
            .filter(waiting_class::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(waiting_to_domain))
    }

    async fn save(&self, entry: WaitingEntry) -> DomainResult<WaitingEntry> {
        debug!(
            "Adding waitlist entry: schedule={} user={}",
            entry.schedule_id, entry.user_id
        );

        let mut active = waiting_to_active(&entry);
        active.id = NotSet;
        // the unique (schedule_id, user_id) index turns a racing double
        // insert into a conflict instead of a duplicate row
        let model = active.insert(&self.db).await.map_err(|e| {
            let msg = e.to_string();
            if msg.to_lowercase().contains("unique") {
                DomainError::Conflict(format!(
                    "user {} already waiting for schedule {}",
                    entry.user_id, entry.schedule_id
                ))
            } else {
                db_err(e)
            }
        })?;
        Ok(waiting_to_domain(model))
    }

    async fn update(&self, entry: WaitingEntry) -> DomainResult<()> {
        debug!("Updating waitlist entry: {}", entry.id);

        let existing = waiting_class::Entity::find_by_id(entry.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "WaitingEntry",
                field: "id",
                value: entry.id.to_string(),
            });
        }

        waiting_to_active(&entry)
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, schedule_id: i32, user_id: i32) -> DomainResult<bool> {
        let result = waiting_class::Entity::delete_many()
            .filter(waiting_class::Column::ScheduleId.eq(schedule_id))
            .filter(waiting_class::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn list_waiting(&self, schedule_id: i32) -> DomainResult<Vec<WaitingEntry>> {
        let models = waiting_class::Entity::find()
            .filter(waiting_class::Column::ScheduleId.eq(schedule_id))
            .filter(waiting_class::Column::Status.eq("Waiting"))
            .order_by_asc(waiting_class::Column::CreatedAt)
            .order_by_asc(waiting_class::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(waiting_to_domain).collect())
    }
}
