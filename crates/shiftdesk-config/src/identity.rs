//! Identity forwarded by the upstream gateway.
//!
//! Authentication happens before requests reach this service. The gateway
//! forwards the authenticated user and their business as request headers.

use std::env;

use crate::lookup;

pub const DEFAULT_USER_HEADER: &str = "x-user-id";
pub const DEFAULT_BUSINESS_HEADER: &str = "x-business-id";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityConfig {
    pub user_header: String,
    pub business_header: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_header: DEFAULT_USER_HEADER.to_string(),
            business_header: DEFAULT_BUSINESS_HEADER.to_string(),
        }
    }
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|k| env::var(k).ok())
    }

    /// Header names are lowercased so they match `http::HeaderMap` lookups.
    pub fn from_vars<F>(vars: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            user_header: lookup(&vars, "IDENTITY_USER_HEADER")
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or(defaults.user_header),
            business_header: lookup(&vars, "IDENTITY_BUSINESS_HEADER")
                .map(|h| h.to_ascii_lowercase())
                .unwrap_or(defaults.business_header),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_headers() {
        let config = IdentityConfig::from_vars(|_| None);
        assert_eq!(config, IdentityConfig::default());
    }

    #[test]
    fn test_custom_headers_are_lowercased() {
        let config = IdentityConfig::from_vars(|k| match k {
            "IDENTITY_USER_HEADER" => Some("X-Auth-User".to_string()),
            _ => None,
        });
        assert_eq!(config.user_header, "x-auth-user");
        assert_eq!(config.business_header, DEFAULT_BUSINESS_HEADER);
    }
}
