//! Entitlement validation
//!
//! Read-only lookup of a user's eligible credit sources for a
//! discipline. Nothing is reserved or consumed here; the transactional
//! writer re-fetches sources before spending a credit.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::entitlement::{sort_by_policy, EntitlementSource};
use crate::domain::{DomainResult, RepositoryProvider};

/// Result of an entitlement check
#[derive(Debug)]
pub struct EntitlementCheck {
    pub user_id: i32,
    pub discipline_id: i32,
    /// Eligible sources in consumption policy order
    pub sources: Vec<EntitlementSource>,
}

impl EntitlementCheck {
    pub fn is_valid(&self) -> bool {
        !self.sources.is_empty()
    }

    /// The source a booking would consume from first
    pub fn best(&self) -> Option<&EntitlementSource> {
        self.sources.first()
    }

    /// Total credits across all eligible sources
    pub fn total_remaining(&self) -> u32 {
        self.sources.iter().map(|s| s.remaining()).sum()
    }
}

/// Service validating a user's class credits
pub struct EntitlementService {
    repos: Arc<dyn RepositoryProvider>,
}

impl EntitlementService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn check(&self, user_id: i32, discipline_id: i32) -> DomainResult<EntitlementCheck> {
        self.check_at(user_id, discipline_id, Utc::now()).await
    }

    /// Check against an explicit instant, e.g. a schedule start.
    pub async fn check_at(
        &self,
        user_id: i32,
        discipline_id: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<EntitlementCheck> {
        let mut sources = self
            .repos
            .entitlements()
            .active_sources(user_id, discipline_id, now)
            .await?;
        sort_by_policy(&mut sources);

        debug!(
            user_id,
            discipline_id,
            eligible = sources.len(),
            "Entitlement check"
        );

        Ok(EntitlementCheck {
            user_id,
            discipline_id,
            sources,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::{EntitlementKind, UserMembership, UserPackage};
    use crate::infrastructure::storage::InMemoryStorage;
    use chrono::Duration;

    fn active_package(id: i32, user_id: i32, discipline_id: i32, remaining: u32) -> UserPackage {
        UserPackage::new(
            id,
            user_id,
            discipline_id,
            remaining,
            Utc::now() + Duration::days(30),
        )
    }

    fn active_membership(id: i32, user_id: i32, discipline_id: i32) -> UserMembership {
        UserMembership::new(
            id,
            user_id,
            discipline_id,
            4,
            Utc::now() - Duration::days(1),
            Utc::now() + Duration::days(29),
        )
    }

    #[tokio::test]
    async fn no_sources_is_invalid() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        let service = EntitlementService::new(repos);
        let check = service.check(42, 10).await.unwrap();
        assert!(!check.is_valid());
        assert!(check.best().is_none());
        assert_eq!(check.total_remaining(), 0);
    }

    #[tokio::test]
    async fn membership_ranks_before_package() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        repos
            .entitlements()
            .save_package(active_package(1, 42, 10, 5))
            .await
            .unwrap();
        repos
            .entitlements()
            .save_membership(active_membership(2, 42, 10))
            .await
            .unwrap();

        let service = EntitlementService::new(repos);
        let check = service.check(42, 10).await.unwrap();
        assert!(check.is_valid());
        assert_eq!(check.sources.len(), 2);
        assert_eq!(check.best().unwrap().kind(), EntitlementKind::Membership);
        assert_eq!(check.total_remaining(), 9);
    }

    #[tokio::test]
    async fn other_discipline_does_not_count() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        repos
            .entitlements()
            .save_package(active_package(1, 42, 11, 5))
            .await
            .unwrap();

        let service = EntitlementService::new(repos);
        let check = service.check(42, 10).await.unwrap();
        assert!(!check.is_valid());
    }

    #[tokio::test]
    async fn expired_package_does_not_count() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        let mut expired = active_package(1, 42, 10, 5);
        expired.expiry_date = Utc::now() - Duration::days(1);
        repos.entitlements().save_package(expired).await.unwrap();

        let service = EntitlementService::new(repos);
        let check = service.check(42, 10).await.unwrap();
        assert!(!check.is_valid());
    }

    #[tokio::test]
    async fn drained_membership_does_not_count() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        let mut drained = active_membership(1, 42, 10);
        drained.used_free_classes = 4;
        drained.remaining_free_classes = 0;
        repos.entitlements().save_membership(drained).await.unwrap();

        let service = EntitlementService::new(repos);
        let check = service.check(42, 10).await.unwrap();
        assert!(!check.is_valid());
    }
}
