//! # Shiftdesk Config
//!
//! Configuration loaded from environment variables at startup.
//!
//! - [`server`]: listen addresses and the database URL
//! - [`cors`]: allowed CORS origins
//! - [`identity`]: headers the upstream gateway uses to forward the caller
//!
//! # Example
//!
//! ```ignore
//! use shiftdesk_config::{CorsConfig, IdentityConfig, ServerConfig};
//!
//! let server = ServerConfig::from_env()?;
//! let cors = CorsConfig::from_env();
//! let identity = IdentityConfig::from_env();
//! ```

pub mod cors;
pub mod identity;
pub mod server;

pub use cors::CorsConfig;
pub use identity::IdentityConfig;
pub use server::{ConfigError, ServerConfig};

/// Looks up a variable, treating unset and empty the same.
pub(crate) fn lookup<F>(vars: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    vars(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
