//! Request extractors.
//!
//! # Modules
//!
//! - [`identity`]: the caller forwarded by the upstream gateway and their profile
//!
//! # Identity Flow
//!
//! 1. The gateway authenticates the request and sets the identity headers
//! 2. [`identity::Principal`] parses the user and business ids
//! 3. [`identity::AuthUser`] loads the caller's profile and checks its business
//! 4. The handler calls `AppState::authorize` with its requirement
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::identity::AuthUser;
//!
//! async fn list_slots(
//!     State(state): State<AppState>,
//!     user: AuthUser,
//! ) -> Result<Json<Vec<ShiftSlot>>, AppError> {
//!     state.authorize(&user, Requirement::Permission(Permission::ViewSchedule))?;
//!     // ...
//! }
//! ```

pub mod identity;
