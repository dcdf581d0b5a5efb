//! Waitlist repository interface

use async_trait::async_trait;

use super::model::WaitingEntry;
use crate::domain::DomainResult;

#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    /// Entry for a (schedule, user) pair, any status
    async fn find_entry(
        &self,
        schedule_id: i32,
        user_id: i32,
    ) -> DomainResult<Option<WaitingEntry>>;

    /// Insert a new entry, returning it with its assigned ID.
    /// Fails with `DomainError::Conflict` when the pair already has one.
    async fn save(&self, entry: WaitingEntry) -> DomainResult<WaitingEntry>;

    /// Update an existing entry
    async fn update(&self, entry: WaitingEntry) -> DomainResult<()>;

    /// Delete the entry for a pair. Returns whether a row was removed.
    async fn delete(&self, schedule_id: i32, user_id: i32) -> DomainResult<bool>;

    /// Entries still waiting for a schedule, oldest first
    async fn list_waiting(&self, schedule_id: i32) -> DomainResult<Vec<WaitingEntry>>;
}
