//! Entitlement repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{EntitlementSource, UserMembership, UserPackage};
use crate::domain::DomainResult;

#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// Save a new package
    async fn save_package(&self, package: UserPackage) -> DomainResult<()>;

    /// Save a new membership
    async fn save_membership(&self, membership: UserMembership) -> DomainResult<()>;

    /// Find a package by ID
    async fn find_package(&self, id: i32) -> DomainResult<Option<UserPackage>>;

    /// Find a membership by ID
    async fn find_membership(&self, id: i32) -> DomainResult<Option<UserMembership>>;

    /// Update an existing package
    async fn update_package(&self, package: UserPackage) -> DomainResult<()>;

    /// Update an existing membership
    async fn update_membership(&self, membership: UserMembership) -> DomainResult<()>;

    /// All currently consumable sources for a (user, discipline) pair:
    /// active, unexpired, remaining credits > 0. Unsorted; callers apply
    /// the consumption policy order.
    async fn active_sources(
        &self,
        user_id: i32,
        discipline_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<EntitlementSource>>;
}
