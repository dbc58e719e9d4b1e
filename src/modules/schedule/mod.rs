//! Shift slots, availability, proposal validation and coverage.

pub mod availability;
pub mod controller;
pub mod coverage;
pub mod router;
pub mod service;
pub mod validator;

pub use router::init_schedule_router;
