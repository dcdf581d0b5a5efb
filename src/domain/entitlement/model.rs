//! Entitlement domain entities
//!
//! A user's right to attend one class comes from a purchased package or
//! an active membership. Both track `used + remaining == total` and may
//! only be consumed while active and unexpired.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::DomainResult;
use crate::shared::errors::DomainError;

/// Which kind of source a credit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementKind {
    Membership,
    Package,
}

impl EntitlementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::Package => "package",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "membership" => Some(Self::Membership),
            "package" => Some(Self::Package),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntitlementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Package lifecycle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    Active,
    /// All classes used up
    Exhausted,
    Expired,
    Cancelled,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Exhausted => "Exhausted",
            Self::Expired => "Expired",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Active" => Self::Active,
            "Exhausted" => Self::Exhausted,
            "Expired" => Self::Expired,
            _ => Self::Cancelled,
        }
    }
}

/// Purchased class-credit bundle
#[derive(Debug, Clone)]
pub struct UserPackage {
    /// Unique package row ID
    pub id: i32,
    pub user_id: i32,
    /// Discipline the classes may be spent on
    pub discipline_id: i32,
    pub total_classes: u32,
    pub used_classes: u32,
    pub remaining_classes: u32,
    /// Credits are unusable from this instant on
    pub expiry_date: DateTime<Utc>,
    pub status: PackageStatus,
    pub purchased_at: DateTime<Utc>,
}

impl UserPackage {
    pub fn new(
        id: i32,
        user_id: i32,
        discipline_id: i32,
        total_classes: u32,
        expiry_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            discipline_id,
            total_classes,
            used_classes: 0,
            remaining_classes: total_classes,
            expiry_date,
            status: PackageStatus::Active,
            purchased_at: Utc::now(),
        }
    }

    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        self.status == PackageStatus::Active && now < self.expiry_date && self.remaining_classes > 0
    }

    /// Spend one class credit. Fails without touching any counter when the
    /// package is not consumable.
    pub fn consume(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_consumable(now) {
            return Err(DomainError::Validation(format!(
                "package {} has no consumable classes",
                self.id
            )));
        }
        self.used_classes += 1;
        self.remaining_classes -= 1;
        if self.remaining_classes == 0 {
            self.status = PackageStatus::Exhausted;
        }
        Ok(())
    }

    /// Give one class credit back, e.g. after a cancellation.
    pub fn refund(&mut self) -> DomainResult<()> {
        if self.used_classes == 0 {
            return Err(DomainError::Validation(format!(
                "package {} has no used classes to refund",
                self.id
            )));
        }
        self.used_classes -= 1;
        self.remaining_classes += 1;
        if self.status == PackageStatus::Exhausted {
            self.status = PackageStatus::Active;
        }
        Ok(())
    }
}

/// Membership lifecycle status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipStatus {
    Active,
    Expired,
    Cancelled,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Active" => Self::Active,
            "Expired" => Self::Expired,
            _ => Self::Cancelled,
        }
    }
}

/// Recurring entitlement with a free-class allowance per period
#[derive(Debug, Clone)]
pub struct UserMembership {
    /// Unique membership row ID
    pub id: i32,
    pub user_id: i32,
    /// Discipline the free classes may be spent on
    pub discipline_id: i32,
    pub total_free_classes: u32,
    pub used_free_classes: u32,
    pub remaining_free_classes: u32,
    pub starts_on: DateTime<Utc>,
    pub ends_on: DateTime<Utc>,
    pub status: MembershipStatus,
}

impl UserMembership {
    pub fn new(
        id: i32,
        user_id: i32,
        discipline_id: i32,
        total_free_classes: u32,
        starts_on: DateTime<Utc>,
        ends_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            discipline_id,
            total_free_classes,
            used_free_classes: 0,
            remaining_free_classes: total_free_classes,
            starts_on,
            ends_on,
            status: MembershipStatus::Active,
        }
    }

    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        self.status == MembershipStatus::Active
            && self.starts_on <= now
            && now < self.ends_on
            && self.remaining_free_classes > 0
    }

    pub fn consume(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_consumable(now) {
            return Err(DomainError::Validation(format!(
                "membership {} has no consumable free classes",
                self.id
            )));
        }
        self.used_free_classes += 1;
        self.remaining_free_classes -= 1;
        Ok(())
    }

    pub fn refund(&mut self) -> DomainResult<()> {
        if self.used_free_classes == 0 {
            return Err(DomainError::Validation(format!(
                "membership {} has no used free classes to refund",
                self.id
            )));
        }
        self.used_free_classes -= 1;
        self.remaining_free_classes += 1;
        Ok(())
    }
}

/// One eligible credit source for a booking
#[derive(Debug, Clone)]
pub enum EntitlementSource {
    Membership(UserMembership),
    Package(UserPackage),
}

impl EntitlementSource {
    pub fn kind(&self) -> EntitlementKind {
        match self {
            Self::Membership(_) => EntitlementKind::Membership,
            Self::Package(_) => EntitlementKind::Package,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Self::Membership(m) => m.id,
            Self::Package(p) => p.id,
        }
    }

    pub fn remaining(&self) -> u32 {
        match self {
            Self::Membership(m) => m.remaining_free_classes,
            Self::Package(p) => p.remaining_classes,
        }
    }

    /// Instant after which the source stops being usable
    pub fn expires_at(&self) -> DateTime<Utc> {
        match self {
            Self::Membership(m) => m.ends_on,
            Self::Package(p) => p.expiry_date,
        }
    }

    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Membership(m) => m.is_consumable(now),
            Self::Package(p) => p.is_consumable(now),
        }
    }

    pub fn consume(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self {
            Self::Membership(m) => m.consume(now),
            Self::Package(p) => p.consume(now),
        }
    }
}

/// Consumption policy order: membership free classes before package
/// classes, earliest expiry first within each kind, lowest id on ties.
pub fn sort_by_policy(sources: &mut [EntitlementSource]) {
    sources.sort_by(|a, b| {
        let rank = |s: &EntitlementSource| match s.kind() {
            EntitlementKind::Membership => 0,
            EntitlementKind::Package => 1,
        };
        rank(a)
            .cmp(&rank(b))
            .then(a.expires_at().cmp(&b.expires_at()))
            .then(a.id().cmp(&b.id()))
    });
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_package(id: i32, total: u32) -> UserPackage {
        UserPackage::new(id, 42, 10, total, Utc::now() + Duration::days(30))
    }

    fn sample_membership(id: i32, total: u32) -> UserMembership {
        UserMembership::new(
            id,
            42,
            10,
            total,
            Utc::now() - Duration::days(1),
            Utc::now() + Duration::days(29),
        )
    }

    #[test]
    fn new_package_counters() {
        let p = sample_package(1, 8);
        assert_eq!(p.used_classes + p.remaining_classes, p.total_classes);
        assert!(p.is_consumable(Utc::now()));
    }

    #[test]
    fn consume_keeps_counter_invariant() {
        let mut p = sample_package(1, 3);
        p.consume(Utc::now()).unwrap();
        p.consume(Utc::now()).unwrap();
        assert_eq!(p.used_classes, 2);
        assert_eq!(p.remaining_classes, 1);
        assert_eq!(p.used_classes + p.remaining_classes, p.total_classes);
    }

    #[test]
    fn consuming_last_class_exhausts_package() {
        let mut p = sample_package(1, 1);
        p.consume(Utc::now()).unwrap();
        assert_eq!(p.status, PackageStatus::Exhausted);
        assert!(!p.is_consumable(Utc::now()));
    }

    #[test]
    fn consume_with_zero_remaining_fails_and_leaves_counters() {
        let mut p = sample_package(1, 1);
        p.consume(Utc::now()).unwrap();
        let before = (p.used_classes, p.remaining_classes);
        assert!(p.consume(Utc::now()).is_err());
        assert_eq!((p.used_classes, p.remaining_classes), before);
    }

    #[test]
    fn expired_package_is_not_consumable() {
        let mut p = sample_package(1, 5);
        p.expiry_date = Utc::now() - Duration::days(1);
        assert!(!p.is_consumable(Utc::now()));
        assert!(p.consume(Utc::now()).is_err());
    }

    #[test]
    fn refund_reactivates_exhausted_package() {
        let mut p = sample_package(1, 1);
        p.consume(Utc::now()).unwrap();
        p.refund().unwrap();
        assert_eq!(p.status, PackageStatus::Active);
        assert_eq!(p.remaining_classes, 1);
        assert_eq!(p.used_classes, 0);
    }

    #[test]
    fn refund_without_usage_fails() {
        let mut p = sample_package(1, 4);
        assert!(p.refund().is_err());
    }

    #[test]
    fn membership_consume_within_period() {
        let mut m = sample_membership(1, 4);
        m.consume(Utc::now()).unwrap();
        assert_eq!(
            m.used_free_classes + m.remaining_free_classes,
            m.total_free_classes
        );
    }

    #[test]
    fn membership_outside_period_is_not_consumable() {
        let mut m = sample_membership(1, 4);
        m.starts_on = Utc::now() + Duration::days(1);
        assert!(!m.is_consumable(Utc::now()));
        assert!(m.consume(Utc::now()).is_err());
    }

    #[test]
    fn policy_prefers_membership_over_package() {
        let mut sources = vec![
            EntitlementSource::Package(sample_package(1, 5)),
            EntitlementSource::Membership(sample_membership(2, 5)),
        ];
        sort_by_policy(&mut sources);
        assert_eq!(sources[0].kind(), EntitlementKind::Membership);
        assert_eq!(sources[1].kind(), EntitlementKind::Package);
    }

    #[test]
    fn policy_prefers_earliest_expiry_within_kind() {
        let mut near = sample_package(1, 5);
        near.expiry_date = Utc::now() + Duration::days(3);
        let mut far = sample_package(2, 5);
        far.expiry_date = Utc::now() + Duration::days(90);
        let mut sources = vec![
            EntitlementSource::Package(far),
            EntitlementSource::Package(near),
        ];
        sort_by_policy(&mut sources);
        assert_eq!(sources[0].id(), 1);
        assert_eq!(sources[1].id(), 2);
    }

    #[test]
    fn policy_breaks_ties_on_lowest_id() {
        let expiry = Utc::now() + Duration::days(10);
        let mut a = sample_package(7, 5);
        a.expiry_date = expiry;
        let mut b = sample_package(3, 5);
        b.expiry_date = expiry;
        let mut sources = vec![EntitlementSource::Package(a), EntitlementSource::Package(b)];
        sort_by_policy(&mut sources);
        assert_eq!(sources[0].id(), 3);
    }

    #[test]
    fn kind_roundtrip() {
        for kind in &[EntitlementKind::Membership, EntitlementKind::Package] {
            assert_eq!(&EntitlementKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(EntitlementKind::from_str("other").is_none());
    }
}
