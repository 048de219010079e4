//! Data models representing database entities and API payloads.

/// API key record and key issuance payloads
pub mod api_key;
