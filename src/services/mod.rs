//! Business logic services.
//!
//! Services hold the application rules separated from HTTP handlers. The key
//! service is stateless apart from its injected store and generator, so a
//! single instance is shared across all requests.

pub mod api_key_service;
