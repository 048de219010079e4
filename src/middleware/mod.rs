//! HTTP middleware components.
//!
//! Middleware run before route handlers and can short-circuit a request
//! before it reaches one.

/// API key authentication middleware
pub mod auth;
