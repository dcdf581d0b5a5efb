//! Overdue-reservation sweep
//!
//! Marks live footwear reservations past their expiry instant as
//! Expired. Consumed credits are forfeited (no-show policy). Exposed as
//! a plain async function for a host scheduler to drive; the engine
//! spawns no background tasks of its own.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{DomainResult, RepositoryProvider};

/// Expire every live reservation with `expires_at <= now`.
///
/// Returns the number of reservations expired. Per-row failures are
/// logged and skipped so one bad row cannot stall the sweep.
pub async fn expire_overdue_reservations(
    repos: &Arc<dyn RepositoryProvider>,
    now: DateTime<Utc>,
) -> DomainResult<u32> {
    let overdue = repos.footwear().find_overdue_reservations(now).await?;

    if overdue.is_empty() {
        return Ok(0);
    }

    info!(count = overdue.len(), "Expiring overdue reservations");

    let mut expired = 0;
    for mut reservation in overdue {
        if let Err(e) = reservation.expire() {
            warn!(reservation_id = reservation.id, error = %e, "Skipping reservation");
            continue;
        }
        match repos.footwear().update_reservation(reservation).await {
            Ok(()) => expired += 1,
            Err(e) => warn!(error = %e, "Failed to expire reservation"),
        }
    }

    Ok(expired)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Footwear, FootwearReservation, FootwearReservationStatus};
    use crate::infrastructure::storage::InMemoryStorage;
    use chrono::Duration;

    #[tokio::test]
    async fn expires_only_overdue_rows() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        repos
            .footwear()
            .save_unit(Footwear::new(1, "FW-01", 40))
            .await
            .unwrap();

        let overdue = FootwearReservation::new(
            0,
            1,
            100,
            42,
            "REF-1",
            Utc::now() - Duration::minutes(10),
        );
        let fresh =
            FootwearReservation::new(0, 1, 101, 42, "REF-2", Utc::now() + Duration::hours(1));
        let overdue = repos.footwear().save_reservation(overdue).await.unwrap();
        let fresh = repos.footwear().save_reservation(fresh).await.unwrap();

        let expired = expire_overdue_reservations(&repos, Utc::now()).await.unwrap();
        assert_eq!(expired, 1);

        let live = repos
            .footwear()
            .live_reservations_for_schedule(100)
            .await
            .unwrap();
        assert!(live.is_empty());
        let still_live = repos
            .footwear()
            .live_reservations_for_schedule(101)
            .await
            .unwrap();
        assert_eq!(still_live.len(), 1);
        assert_eq!(still_live[0].id, fresh.id);
        assert_eq!(still_live[0].status, FootwearReservationStatus::Pending);
        assert_ne!(overdue.id, fresh.id);
    }

    #[tokio::test]
    async fn empty_sweep_is_zero() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryStorage::new());
        assert_eq!(
            expire_overdue_reservations(&repos, Utc::now()).await.unwrap(),
            0
        );
    }
}
