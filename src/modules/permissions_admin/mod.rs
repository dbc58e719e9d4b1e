pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_me_router, init_permissions_admin_router};
