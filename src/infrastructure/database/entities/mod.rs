pub mod class_schedule;
pub mod footwear;
pub mod footwear_loan;
pub mod footwear_reservation;
pub mod schedule_seat;
pub mod seat;
pub mod user_membership;
pub mod user_package;
pub mod waiting_class;
