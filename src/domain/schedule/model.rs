//! Class schedule domain entity

use chrono::{DateTime, Utc};

/// Half-open time interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Two half-open intervals overlap iff each starts before the other ends.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Schedule lifecycle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleStatus {
    /// Open occurrence, bookable until it starts
    Scheduled,
    /// Class took place
    Completed,
    /// Cancelled by the studio
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Scheduled" => Self::Scheduled,
            "Completed" => Self::Completed,
            "Cancelled" => Self::Cancelled,
            _ => Self::Cancelled,
        }
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A specific class occurrence in a studio
#[derive(Debug, Clone)]
pub struct ClassSchedule {
    /// Unique schedule ID
    pub id: i32,
    /// Discipline taught in this occurrence
    pub discipline_id: i32,
    /// Studio room holding the class
    pub studio_id: i32,
    /// Assigned instructor, if any
    pub instructor_id: Option<i32>,
    /// Class start (UTC)
    pub starts_at: DateTime<Utc>,
    /// Class end (UTC)
    pub ends_at: DateTime<Utc>,
    /// Maximum number of bookable seats
    pub max_capacity: u32,
    /// Lifecycle status
    pub status: ScheduleStatus,
    /// When the occurrence was created
    pub created_at: DateTime<Utc>,
}

impl ClassSchedule {
    pub fn new(
        id: i32,
        discipline_id: i32,
        studio_id: i32,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        max_capacity: u32,
    ) -> Self {
        Self {
            id,
            discipline_id,
            studio_id,
            instructor_id: None,
            starts_at,
            ends_at,
            max_capacity,
            status: ScheduleStatus::Scheduled,
            created_at: Utc::now(),
        }
    }

    /// The `[starts_at, ends_at)` window used for overlap checks.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.starts_at, self.ends_at)
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at
    }

    /// A schedule accepts new claims only while Scheduled and not started.
    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.status == ScheduleStatus::Scheduled && !self.has_started(now)
    }

    pub fn cancel(&mut self) {
        self.status = ScheduleStatus::Cancelled;
    }

    pub fn complete(&mut self) {
        self.status = ScheduleStatus::Completed;
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_schedule() -> ClassSchedule {
        let start = Utc::now() + Duration::hours(2);
        ClassSchedule::new(1, 10, 1, start, start + Duration::minutes(50), 20)
    }

    #[test]
    fn new_schedule_is_bookable() {
        let s = sample_schedule();
        assert_eq!(s.status, ScheduleStatus::Scheduled);
        assert!(s.is_bookable(Utc::now()));
    }

    #[test]
    fn started_schedule_is_not_bookable() {
        let start = Utc::now() - Duration::minutes(5);
        let s = ClassSchedule::new(2, 10, 1, start, start + Duration::minutes(50), 20);
        assert!(!s.is_bookable(Utc::now()));
        assert!(s.has_started(Utc::now()));
    }

    #[test]
    fn cancelled_schedule_is_not_bookable() {
        let mut s = sample_schedule();
        s.cancel();
        assert_eq!(s.status, ScheduleStatus::Cancelled);
        assert!(!s.is_bookable(Utc::now()));
    }

    #[test]
    fn window_matches_times() {
        let s = sample_schedule();
        let w = s.window();
        assert_eq!(w.start, s.starts_at);
        assert_eq!(w.end, s.ends_at);
    }

    #[test]
    fn windows_overlap_when_interleaved() {
        let base = Utc::now();
        let a = TimeWindow::new(base, base + Duration::hours(1));
        let b = TimeWindow::new(base + Duration::minutes(30), base + Duration::hours(2));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let base = Utc::now();
        let a = TimeWindow::new(base, base + Duration::hours(1));
        let b = TimeWindow::new(base + Duration::hours(1), base + Duration::hours(2));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn window_contains_is_half_open() {
        let base = Utc::now();
        let w = TimeWindow::new(base, base + Duration::hours(1));
        assert!(w.contains(base));
        assert!(!w.contains(base + Duration::hours(1)));
    }

    #[test]
    fn status_roundtrip() {
        for status in &[
            ScheduleStatus::Scheduled,
            ScheduleStatus::Completed,
            ScheduleStatus::Cancelled,
        ] {
            assert_eq!(&ScheduleStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_defaults_to_cancelled() {
        assert_eq!(ScheduleStatus::from_str("Bogus"), ScheduleStatus::Cancelled);
    }
}
