//! Booking application services

pub mod expiry;

mod availability;
mod entitlements;
mod reservation;
mod waitlist;

pub use availability::{AvailabilityService, FootwearAvailability, SeatAvailability};
pub use entitlements::{EntitlementCheck, EntitlementService};
pub use reservation::{
    BookingService, ReserveFootwearCommand, ReserveSeatCommand, ScheduleUserCommand,
};
pub use waitlist::{JoinWaitlistCommand, WaitlistOutcome, WaitlistService};
