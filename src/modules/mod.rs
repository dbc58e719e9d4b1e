pub mod permissions_admin;
pub mod schedule;
