//! Waitlist domain entity

use chrono::{DateTime, Utc};

/// Waitlist entry status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitingStatus {
    /// In line for a spot
    Waiting,
    /// Offered a freed spot
    Promoted,
}

impl WaitingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Promoted => "Promoted",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Promoted" => Self::Promoted,
            _ => Self::Waiting,
        }
    }
}

/// A user's place in line for a schedule without capacity.
///
/// Holds no entitlement; nothing is consumed until an actual booking is
/// made. At most one entry per (schedule, user) pair.
#[derive(Debug, Clone)]
pub struct WaitingEntry {
    /// Unique entry ID
    pub id: i32,
    pub schedule_id: i32,
    pub user_id: i32,
    pub status: WaitingStatus,
    /// Queue order is oldest-first on this timestamp
    pub created_at: DateTime<Utc>,
}

impl WaitingEntry {
    pub fn new(id: i32, schedule_id: i32, user_id: i32) -> Self {
        Self {
            id,
            schedule_id,
            user_id,
            status: WaitingStatus::Waiting,
            created_at: Utc::now(),
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == WaitingStatus::Waiting
    }

    pub fn promote(&mut self) {
        self.status = WaitingStatus::Promoted;
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_is_waiting() {
        let e = WaitingEntry::new(1, 100, 42);
        assert!(e.is_waiting());
        assert_eq!(e.status, WaitingStatus::Waiting);
    }

    #[test]
    fn promote_leaves_queue() {
        let mut e = WaitingEntry::new(1, 100, 42);
        e.promote();
        assert!(!e.is_waiting());
        assert_eq!(e.status, WaitingStatus::Promoted);
    }

    #[test]
    fn status_roundtrip() {
        for status in &[WaitingStatus::Waiting, WaitingStatus::Promoted] {
            assert_eq!(&WaitingStatus::from_str(status.as_str()), status);
        }
    }
}
