//! # DevConnect Shared Library
//!
//! This crate contains the data layer, authentication primitives and outbound
//! service clients used by the DevConnect API server and the seeder.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their queries
//! - `auth`: Password hashing, JWT, reset tokens and authorization checks
//! - `db`: Connection pool, migrations and startup bootstrap
//! - `services`: Email delivery and object storage clients

pub mod auth;
pub mod db;
pub mod models;
pub mod services;

/// Current version of the DevConnect shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
