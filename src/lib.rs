//! # Shiftdesk API
//!
//! Authorization and schedule-integrity service for small businesses, built
//! with Axum and PostgreSQL.
//!
//! ## Overview
//!
//! - **Permissions**: a fixed catalog of permissions, role defaults and
//!   per-user custom grants resolved into an effective set
//! - **Authorization**: explicit guard checks at the top of every handler
//! - **Administration**: permission, role and activation changes, each
//!   written atomically with an append-only audit entry
//! - **Scheduling**: shift slots, weekly availability, schedule validation
//!   and coverage reports
//!
//! Authentication happens upstream. The gateway forwards the caller's user
//! and business ids as headers (`x-user-id`, `x-business-id` by default).
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── bin/cli.rs        # Offline catalog / validate / coverage commands
//! ├── cli.rs            # Helpers behind the CLI
//! ├── middleware/       # Identity extractors
//! ├── modules/          # Feature modules
//! │   ├── permissions_admin/
//! │   └── schedule/
//! ├── docs.rs           # OpenAPI
//! ├── logging.rs
//! ├── metrics.rs
//! ├── router.rs
//! ├── state.rs
//! └── validator.rs      # ValidatedJson extractor
//! ```
//!
//! Each feature module has `controller.rs` (handlers), `service.rs`
//! (business logic) and `router.rs`.
//!
//! ### API Documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod cli;
pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use shiftdesk_config;
pub use shiftdesk_core;
pub use shiftdesk_db;
pub use shiftdesk_models;
