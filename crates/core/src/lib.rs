//! Pure domain logic for the opsboard platform.
//!
//! This crate has no database access, no HTTP, and no async. It owns the
//! spreadsheet decoding layer ([`sheet`]) and the import pipeline's pure
//! stages ([`import`]): field parsers, row transformers, identity matching,
//! and conflict-strategy decisions. Persistence and orchestration live in
//! `opsboard-db` and `opsboard-importer`.

pub mod error;
pub mod import;
pub mod sheet;
pub mod types;
