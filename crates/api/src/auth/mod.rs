//! Authentication primitives.
//!
//! Token issuance (login, refresh) lives in the platform's auth service;
//! this crate only validates bearer tokens and reads the identity an
//! import runs under.
//!
//! - [`jwt`] -- JWT access-token validation and the [`jwt::Claims`] payload.

pub mod jwt;
