//! HTTP request handlers (route handlers).
//!
//! Handlers translate JSON in and out; the rules live in the services layer.

/// API key management endpoints
pub mod api_keys;
/// Service health endpoint
pub mod health;
