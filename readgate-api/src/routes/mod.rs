/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `articles`: Article listing and metered article views
/// - `auth`: Username login, logout and session check
/// - `session`: Session reset

pub mod articles;
pub mod auth;
pub mod health;
pub mod session;
