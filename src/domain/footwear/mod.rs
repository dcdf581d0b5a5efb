//! Footwear aggregate
//!
//! Contains the equipment inventory unit, per-schedule reservations with
//! expiry tracking, checkout loans, and the repository interface.

pub mod model;
pub mod repository;

pub use model::{Footwear, FootwearLoan, FootwearReservation, FootwearReservationStatus};
pub use repository::FootwearRepository;
