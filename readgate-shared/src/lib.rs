//! # readgate Shared Library
//!
//! Types and persistence shared by the readgate API server and by
//! provisioning tooling.
//!
//! ## Module Organization
//!
//! - `db`: SQLite connection pool
//! - `models`: Users and articles with their queries
//! - `session`: Signed client-held session tokens

pub mod db;
pub mod models;
pub mod session;

/// Current version of the readgate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
