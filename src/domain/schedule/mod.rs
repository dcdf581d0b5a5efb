//! Class schedule aggregate
//!
//! Contains the ClassSchedule entity, its time window, and the
//! repository interface.

pub mod model;
pub mod repository;

pub use model::{ClassSchedule, ScheduleStatus, TimeWindow};
pub use repository::ScheduleRepository;
