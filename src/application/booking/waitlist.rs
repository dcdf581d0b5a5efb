//! Waitlist flows
//!
//! Joining the list consumes nothing: it only requires that the user
//! holds *some* active entitlement for the discipline. The insert is
//! idempotent per (schedule, user), backed by a unique index.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::domain::{
    DomainError, DomainResult, RejectReason, RepositoryProvider, WaitingEntry,
};

/// Request to join the waitlist of a schedule
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinWaitlistCommand {
    #[validate(range(min = 1))]
    pub schedule_id: i32,
    #[validate(range(min = 1))]
    pub user_id: i32,
}

/// Outcome of a join attempt
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WaitlistOutcome {
    Joined {
        /// 1-based place in line
        position: u64,
    },
    /// The pair already has an entry; nothing was inserted.
    AlreadyWaiting {
        /// Place in line; None when the entry was already promoted
        position: Option<u64>,
    },
    Rejected {
        reason: RejectReason,
    },
}

impl WaitlistOutcome {
    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Joined { .. })
    }
}

/// Service for waitlist operations
pub struct WaitlistService {
    repos: Arc<dyn RepositoryProvider>,
}

impl WaitlistService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    /// Put a user in line for a schedule. Idempotent: a second join for
    /// the same pair reports the existing place instead of inserting.
    pub async fn join(&self, cmd: JoinWaitlistCommand) -> DomainResult<WaitlistOutcome> {
        cmd.validate()
            .map_err(|e| DomainError::Validation(e.to_string()))?;

        let now = Utc::now();
        let schedule = self
            .repos
            .schedules()
            .find_by_id(cmd.schedule_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "ClassSchedule",
                field: "id",
                value: cmd.schedule_id.to_string(),
            })?;

        if !schedule.is_bookable(now) {
            return Ok(WaitlistOutcome::Rejected {
                reason: RejectReason::ScheduleNotBookable,
            });
        }

        // entitlement existence only, nothing is consumed
        let sources = self
            .repos
            .entitlements()
            .active_sources(cmd.user_id, schedule.discipline_id, now)
            .await?;
        if sources.is_empty() {
            return Ok(WaitlistOutcome::Rejected {
                reason: RejectReason::NoEntitlement,
            });
        }

        if let Some(existing) = self
            .repos
            .waitlist()
            .find_entry(cmd.schedule_id, cmd.user_id)
            .await?
        {
            let position = if existing.is_waiting() {
                self.position(cmd.schedule_id, cmd.user_id).await?
            } else {
                None
            };
            return Ok(WaitlistOutcome::AlreadyWaiting { position });
        }

        let entry = WaitingEntry::new(0, cmd.schedule_id, cmd.user_id);
        match self.repos.waitlist().save(entry).await {
            Ok(_) => {}
            // lost the race against a concurrent join; the unique index
            // kept the list duplicate-free
            Err(DomainError::Conflict(_)) => {
                let position = self.position(cmd.schedule_id, cmd.user_id).await?;
                return Ok(WaitlistOutcome::AlreadyWaiting { position });
            }
            Err(e) => return Err(e),
        }

        let position = self
            .position(cmd.schedule_id, cmd.user_id)
            .await?
            .unwrap_or(1);

        info!(
            schedule_id = cmd.schedule_id,
            user_id = cmd.user_id,
            position,
            "Joined waitlist"
        );

        Ok(WaitlistOutcome::Joined { position })
    }

    /// Remove a user from the list. Returns whether an entry existed.
    pub async fn leave(&self, schedule_id: i32, user_id: i32) -> DomainResult<bool> {
        let removed = self.repos.waitlist().delete(schedule_id, user_id).await?;
        if removed {
            info!(schedule_id, user_id, "Left waitlist");
        }
        Ok(removed)
    }

    /// 1-based place in line, oldest first. None when not waiting.
    pub async fn position(&self, schedule_id: i32, user_id: i32) -> DomainResult<Option<u64>> {
        let waiting = self.repos.waitlist().list_waiting(schedule_id).await?;
        Ok(waiting
            .iter()
            .position(|e| e.user_id == user_id)
            .map(|idx| idx as u64 + 1))
    }

    /// Offer the freed spot to the first user in line. The entry stays,
    /// marked Promoted, so the pair cannot re-join while the offer is
    /// out; the actual booking still goes through the normal flow.
    pub async fn promote_next(&self, schedule_id: i32) -> DomainResult<Option<WaitingEntry>> {
        let waiting = self.repos.waitlist().list_waiting(schedule_id).await?;
        let Some(mut entry) = waiting.into_iter().next() else {
            return Ok(None);
        };

        entry.promote();
        self.repos.waitlist().update(entry.clone()).await?;

        info!(
            schedule_id,
            user_id = entry.user_id,
            "Waitlist entry promoted"
        );

        Ok(Some(entry))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::UserPackage;
    use crate::domain::{ClassSchedule, ScheduleStatus};
    use crate::infrastructure::storage::InMemoryStorage;
    use chrono::Duration;

    async fn setup() -> (Arc<dyn RepositoryProvider>, WaitlistService) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        let service = WaitlistService::new(repos.clone());
        (repos, service)
    }

    fn upcoming_schedule(id: i32) -> ClassSchedule {
        let start = Utc::now() + Duration::hours(2);
        ClassSchedule::new(id, 10, 1, start, start + Duration::minutes(50), 10)
    }

    fn package(id: i32, user_id: i32) -> UserPackage {
        UserPackage::new(id, user_id, 10, 5, Utc::now() + Duration::days(30))
    }

    fn join_cmd(schedule_id: i32, user_id: i32) -> JoinWaitlistCommand {
        JoinWaitlistCommand {
            schedule_id,
            user_id,
        }
    }

    #[tokio::test]
    async fn join_inserts_one_row() {
        let (repos, service) = setup().await;
        repos
            .schedules()
            .save(upcoming_schedule(100))
            .await
            .unwrap();
        repos.entitlements().save_package(package(1, 42)).await.unwrap();

        let outcome = service.join(join_cmd(100, 42)).await.unwrap();
        assert!(matches!(outcome, WaitlistOutcome::Joined { position: 1 }));
        assert_eq!(repos.waitlist().list_waiting(100).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejoining_is_a_no_op() {
        let (repos, service) = setup().await;
        repos
            .schedules()
            .save(upcoming_schedule(100))
            .await
            .unwrap();
        repos.entitlements().save_package(package(1, 42)).await.unwrap();

        service.join(join_cmd(100, 42)).await.unwrap();
        let outcome = service.join(join_cmd(100, 42)).await.unwrap();
        assert!(matches!(
            outcome,
            WaitlistOutcome::AlreadyWaiting {
                position: Some(1)
            }
        ));
        assert_eq!(repos.waitlist().list_waiting(100).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn join_requires_some_entitlement() {
        let (repos, service) = setup().await;
        repos
            .schedules()
            .save(upcoming_schedule(100))
            .await
            .unwrap();

        let outcome = service.join(join_cmd(100, 42)).await.unwrap();
        assert!(matches!(
            outcome,
            WaitlistOutcome::Rejected {
                reason: RejectReason::NoEntitlement
            }
        ));
    }

    #[tokio::test]
    async fn join_consumes_nothing() {
        let (repos, service) = setup().await;
        repos
            .schedules()
            .save(upcoming_schedule(100))
            .await
            .unwrap();
        repos.entitlements().save_package(package(1, 42)).await.unwrap();

        service.join(join_cmd(100, 42)).await.unwrap();

        let pkg = repos.entitlements().find_package(1).await.unwrap().unwrap();
        assert_eq!(pkg.used_classes, 0);
        assert_eq!(pkg.remaining_classes, 5);
    }

    #[tokio::test]
    async fn cancelled_schedule_rejects_join() {
        let (repos, service) = setup().await;
        let mut schedule = upcoming_schedule(100);
        schedule.status = ScheduleStatus::Cancelled;
        repos.schedules().save(schedule).await.unwrap();
        repos.entitlements().save_package(package(1, 42)).await.unwrap();

        let outcome = service.join(join_cmd(100, 42)).await.unwrap();
        assert!(matches!(
            outcome,
            WaitlistOutcome::Rejected {
                reason: RejectReason::ScheduleNotBookable
            }
        ));
    }

    #[tokio::test]
    async fn positions_follow_join_order() {
        let (repos, service) = setup().await;
        repos
            .schedules()
            .save(upcoming_schedule(100))
            .await
            .unwrap();
        for user_id in 1..=3 {
            repos
                .entitlements()
                .save_package(package(user_id, user_id))
                .await
                .unwrap();
            service.join(join_cmd(100, user_id)).await.unwrap();
        }

        assert_eq!(service.position(100, 1).await.unwrap(), Some(1));
        assert_eq!(service.position(100, 3).await.unwrap(), Some(3));
        assert_eq!(service.position(100, 9).await.unwrap(), None);
    }

    #[tokio::test]
    async fn leave_then_rejoin_at_the_back() {
        let (repos, service) = setup().await;
        repos
            .schedules()
            .save(upcoming_schedule(100))
            .await
            .unwrap();
        for user_id in 1..=2 {
            repos
                .entitlements()
                .save_package(package(user_id, user_id))
                .await
                .unwrap();
            service.join(join_cmd(100, user_id)).await.unwrap();
        }

        assert!(service.leave(100, 1).await.unwrap());
        assert!(!service.leave(100, 1).await.unwrap());

        let outcome = service.join(join_cmd(100, 1)).await.unwrap();
        assert!(matches!(outcome, WaitlistOutcome::Joined { position: 2 }));
    }

    #[tokio::test]
    async fn promote_takes_the_oldest_entry() {
        let (repos, service) = setup().await;
        repos
            .schedules()
            .save(upcoming_schedule(100))
            .await
            .unwrap();
        for user_id in 1..=2 {
            repos
                .entitlements()
                .save_package(package(user_id, user_id))
                .await
                .unwrap();
            service.join(join_cmd(100, user_id)).await.unwrap();
        }

        let promoted = service.promote_next(100).await.unwrap().unwrap();
        assert_eq!(promoted.user_id, 1);

        // promoted entry leaves the waiting queue but blocks re-joining
        assert_eq!(service.position(100, 1).await.unwrap(), None);
        let outcome = service.join(join_cmd(100, 1)).await.unwrap();
        assert!(matches!(
            outcome,
            WaitlistOutcome::AlreadyWaiting { position: None }
        ));
    }

    #[tokio::test]
    async fn promote_on_empty_list_is_none() {
        let (repos, service) = setup().await;
        repos
            .schedules()
            .save(upcoming_schedule(100))
            .await
            .unwrap();
        assert!(service.promote_next(100).await.unwrap().is_none());
    }
}
