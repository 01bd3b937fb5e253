//! Identity admin library crate.
//!
//! Provides the admin management layer for OAuth2 / OpenID Connect client and
//! scope configuration: property metadata, object mapping, the admin manager
//! façade, pluggable storage and a JSON HTTP surface.

pub mod admin;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;
