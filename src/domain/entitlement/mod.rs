//! Entitlement aggregate
//!
//! Contains the package and membership credit sources, the combined
//! source type with the consumption policy order, and the repository
//! interface.

pub mod model;
pub mod repository;

pub use model::{
    sort_by_policy, EntitlementKind, EntitlementSource, MembershipStatus, PackageStatus,
    UserMembership, UserPackage,
};
pub use repository::EntitlementRepository;
