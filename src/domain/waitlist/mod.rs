//! Waitlist aggregate
//!
//! Contains the non-consuming queue entry for a schedule and the
//! repository interface.

pub mod model;
pub mod repository;

pub use model::{WaitingEntry, WaitingStatus};
pub use repository::WaitlistRepository;
