//! BDD step definitions for the watchdog

pub mod check_steps;
pub mod notification_steps;
