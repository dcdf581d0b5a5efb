//! SeaORM implementation of EntitlementRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::entitlement::{
    EntitlementRepository, EntitlementSource, UserMembership, UserPackage,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{user_membership, user_package};

use super::db_err;
use super::mappers::{
    membership_to_active, membership_to_domain, package_to_active, package_to_domain,
};

pub struct SeaOrmEntitlementRepository {
    db: DatabaseConnection,
}

impl SeaOrmEntitlementRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntitlementRepository for SeaOrmEntitlementRepository {
    async fn save_package(&self, package: UserPackage) -> DomainResult<()> {
        debug!("Saving package: {}", package.id);

        package_to_active(&package)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_membership(&self, membership: UserMembership) -> DomainResult<()> {
        debug!("Saving membership: {}", membership.id);

        membership_to_active(&membership)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_package(&self, id: i32) -> DomainResult<Option<UserPackage>> {
        let model = user_package::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(package_to_domain))
    }

    async fn find_membership(&self, id: i32) -> DomainResult<Option<UserMembership>> {
        let model = user_membership::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(membership_to_domain))
    }

    async fn update_package(&self, package: UserPackage) -> DomainResult<()> {
        debug!("Updating package: {}", package.id);

        let existing = user_package::Entity::find_by_id(package.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "UserPackage",
                field: "id",
                value: package.id.to_string(),
            });
        }

        package_to_active(&package)
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_membership(&self, membership: UserMembership) -> DomainResult<()> {
        debug!("Updating membership: {}", membership.id);

        let existing = user_membership::Entity::find_by_id(membership.id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::NotFound {
                entity: "UserMembership",
                field: "id",
                value: membership.id.to_string(),
            });
        }

        membership_to_active(&membership)
            .update(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn active_sources(
        &self,
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
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let packages = user_package::Entity::find()
            .filter(user_package::Column::UserId.eq(user_id))
            .filter(user_package::Column::DisciplineId.eq(discipline_id))
            .filter(user_package::Column::Status.eq("Active"))
            .filter(user_package::Column::ExpiryDate.gt(now))
            .filter(user_package::Column::RemainingClasses.gt(0))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let sources = memberships
            .into_iter()
            .map(|m| EntitlementSource::Membership(membership_to_domain(m)))
            .chain(
                packages
                    .into_iter()
                    .map(|p| EntitlementSource::Package(package_to_domain(p))),
            )
            .collect();

        Ok(sources)
    }
}
