//! Seat aggregate
//!
//! Contains the static Seat reference entity, the per-schedule seat
//! claim with its state machine, and the repository interface.

pub mod model;
pub mod repository;

pub use model::{ScheduleSeat, Seat, SeatClaimStatus};
pub use repository::SeatRepository;
