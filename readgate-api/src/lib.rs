//! # readgate API Server Library
//!
//! Read-only article access metered per session, plus username-only
//! login backed by a signed session cookie.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `json`: Pretty-printed JSON responses
//! - `middleware`: Session cookie middleware
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod json;
pub mod middleware;
pub mod routes;
