pub mod booking;
pub mod entitlement;
pub mod footwear;
pub mod repositories;
pub mod schedule;
pub mod seat;
pub mod waitlist;

// Re-export commonly used types
pub use booking::{
    BookingConfirmation, BookingWriter, CancelOutcome, CheckInOutcome, ClaimedResource,
    ConsumedEntitlement, RejectReason, ReserveOutcome,
};
pub use entitlement::{
    EntitlementKind, EntitlementSource, MembershipStatus, PackageStatus, UserMembership,
    UserPackage,
};
pub use footwear::{Footwear, FootwearLoan, FootwearReservation, FootwearReservationStatus};
pub use repositories::{DomainResult, RepositoryProvider};
pub use schedule::{ClassSchedule, ScheduleStatus, TimeWindow};
pub use seat::{ScheduleSeat, Seat, SeatClaimStatus};
pub use waitlist::{WaitingEntry, WaitingStatus};

// Re-export DomainError from shared for convenience
pub use crate::shared::errors::DomainError;
